use crate::prelude::{println, *};
use regex::Regex;
use serde::de::DeserializeOwned;
use sxtools_core::se::{should_fetch_next, SeEnvelope, SeTag};

pub mod find_users;
pub mod top_tags;

// Re-export public data functions
pub use find_users::find_users_data;
pub use top_tags::top_tags_data;

const SE_API_BASE: &str = "https://api.stackexchange.com/2.3";

// Response-shaping filter tokens registered with the API. The first narrows
// user objects to the fields we consume, the second does the same for tags.
const USERS_FILTER: &str = "!)69Ph.wNi1CqQaOS*r9RLa1PrU0k";
const TOP_TAGS_FILTER: &str = "!9boy9ZEEx";

#[derive(Debug, clap::Parser)]
#[command(name = "se")]
#[command(about = "StackExchange (api.stackexchange.com) operations")]
pub struct App {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, clap::Subcommand)]
pub enum Commands {
    /// Find users matching location and top-tag criteria
    #[clap(name = "find")]
    Find(find_users::FindOptions),

    /// List the top answer tags of a single user
    #[clap(name = "tags")]
    Tags(top_tags::TagsOptions),
}

pub async fn run(app: App, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!("StackExchange API Base: {}", SE_API_BASE);
        println!();
    }

    match app.command {
        Commands::Find(options) => find_users::run(options, global).await,
        Commands::Tags(options) => top_tags::run(options, global).await,
    }
}

// Shared utility functions
pub fn get_api_base() -> &'static str {
    SE_API_BASE
}

pub fn extract_user_id(input: &str) -> Result<u64> {
    // Try to parse as number first
    if let Ok(id) = input.parse::<u64>() {
        return Ok(id);
    }

    // Try to extract from a profile URL
    let re = Regex::new(r"users/(\d+)").unwrap();
    if let Some(caps) = re.captures(input) {
        if let Some(id_match) = caps.get(1) {
            return id_match
                .as_str()
                .parse::<u64>()
                .map_err(|_| eyre!("Failed to parse user ID from URL"));
        }
    }

    Err(eyre!("Invalid user ID or URL: {}", input))
}

/// Fetch a single envelope page from the API
///
/// An empty response body is the API's way of cutting us off and aborts the
/// run; transport, status and parse failures each map to their own error.
pub async fn fetch_page<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
) -> Result<SeEnvelope<T>> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(eyre!("StackExchange API error [{}]: {}", status, body));
    }

    let body = response
        .text()
        .await
        .map_err(|e| Error::Network(e.to_string()))?;

    if body.trim().is_empty() {
        return Err(Error::NoMoreCalls.into());
    }

    serde_json::from_str(&body).map_err(|e| Error::Parse(e.to_string()).into())
}

/// Accumulate every page of an envelope sequence
///
/// Calls `fetch_page_fn` with 1-indexed page numbers, appending each page's
/// items until the API reports no more pages or the optional page cap is
/// reached. With `max_pages = None` the loop runs until exhaustion, however
/// long that takes. Remaining quota is logged after every successful page; a
/// page reporting zero remaining quota aborts the run before the next call
/// is issued.
pub async fn fetch_all_pages<T, F, Fut>(
    mut fetch_page_fn: F,
    max_pages: Option<u32>,
) -> Result<Vec<T>>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<SeEnvelope<T>>>,
{
    let mut items = Vec::new();
    let mut page = 1;

    loop {
        let envelope = fetch_page_fn(page).await?;
        log::info!("quota remaining: {}", envelope.quota_remaining);

        let has_more = envelope.has_more;
        let quota_remaining = envelope.quota_remaining;
        items.extend(envelope.items);

        if !should_fetch_next(has_more, page, max_pages) {
            break;
        }
        if quota_remaining == 0 {
            return Err(Error::QuotaExhausted.into());
        }
        page += 1;
    }

    Ok(items)
}

/// Fetch one page of a user's top answer tags
pub async fn fetch_top_tags_page(
    client: &reqwest::Client,
    user_id: u64,
    site: &str,
    page_size: u32,
    page: u32,
) -> Result<SeEnvelope<SeTag>> {
    let url = format!("{}/users/{}/top-tags", get_api_base(), user_id);
    let page_str = page.to_string();
    let page_size_str = page_size.to_string();

    let query = [
        ("page", page_str.as_str()),
        ("pagesize", page_size_str.as_str()),
        ("site", site),
        ("filter", TOP_TAGS_FILTER),
    ];

    fetch_page(client, &url, &query).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn envelope(items: Vec<SeTag>, has_more: bool, quota_remaining: u32) -> SeEnvelope<SeTag> {
        SeEnvelope {
            items,
            has_more,
            quota_max: 300,
            quota_remaining,
        }
    }

    fn tag(name: &str) -> SeTag {
        SeTag {
            user_id: 1,
            tag_name: name.to_string(),
        }
    }

    #[test]
    fn test_extract_user_id_numeric() {
        assert_eq!(extract_user_id("22656").unwrap(), 22656);
    }

    #[test]
    fn test_extract_user_id_from_url() {
        let id = extract_user_id("https://stackoverflow.com/users/22656/jon-skeet").unwrap();
        assert_eq!(id, 22656);
    }

    #[test]
    fn test_extract_user_id_invalid() {
        assert!(extract_user_id("not-a-user").is_err());
    }

    #[tokio::test]
    async fn test_fetch_all_pages_accumulates_in_order() {
        let pages = vec![
            envelope(vec![tag("java"), tag("docker")], true, 99),
            envelope(vec![tag("rust")], true, 98),
            envelope(vec![tag("go")], false, 97),
        ];
        let mut calls = 0usize;

        let result = fetch_all_pages(
            |page| {
                calls += 1;
                let env = pages[(page - 1) as usize].clone();
                async move { Ok(env) }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(calls, 3);
        let names: Vec<&str> = result.iter().map(|t| t.tag_name.as_str()).collect();
        assert_eq!(names, vec!["java", "docker", "rust", "go"]);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_respects_page_cap() {
        let mut calls = 0u32;

        let result = fetch_all_pages(
            |_page| {
                calls += 1;
                let env = envelope(vec![tag("java")], true, 99);
                async move { Ok(env) }
            },
            Some(2),
        )
        .await
        .unwrap();

        // The API still reports more pages, but the cap wins without an
        // extra call.
        assert_eq!(calls, 2);
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_unbounded_runs_until_exhaustion() {
        let mut calls = 0u32;

        let result = fetch_all_pages(
            |page| {
                calls += 1;
                let env = envelope(vec![tag("java")], page < 5, 99);
                async move { Ok(env) }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(calls, 5);
        assert_eq!(result.len(), 5);
    }

    #[tokio::test]
    async fn test_fetch_all_pages_aborts_on_error() {
        let result: Result<Vec<SeTag>> = fetch_all_pages(
            |page| {
                let out = if page == 1 {
                    Ok(envelope(vec![tag("java")], true, 99))
                } else {
                    Err(Error::NoMoreCalls.into())
                };
                async move { out }
            },
            None,
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::NoMoreCalls)
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_pages_stops_on_exhausted_quota() {
        let result: Result<Vec<SeTag>> = fetch_all_pages(
            |_page| {
                let env = envelope(vec![tag("java")], true, 0);
                async move { Ok(env) }
            },
            None,
        )
        .await;

        let err = result.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<Error>(),
            Some(Error::QuotaExhausted)
        ));
    }

    #[tokio::test]
    async fn test_fetch_all_pages_zero_quota_on_final_page_is_ok() {
        let result = fetch_all_pages(
            |_page| {
                let env = envelope(vec![tag("java")], false, 0);
                async move { Ok(env) }
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(result.len(), 1);
    }
}
