use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use sxtools_core::se::{
    build_user_match, filter_users, format_match_line, has_allowed_tag, FindOutput, SeEnvelope,
    SeTag, SeUser,
};

use super::{fetch_all_pages, fetch_page, fetch_top_tags_page, get_api_base, USERS_FILTER};

// The user listing is always requested by descending reputation.
const SORT_FIELD: &str = "reputation";
const SORT_ORDER: &str = "desc";

#[derive(Debug, clap::Args, Clone)]
pub struct FindOptions {
    /// StackExchange site to query
    #[arg(long, env = "SXTOOLS_SITE", default_value = "stackoverflow")]
    pub site: String,

    /// Number of items per API page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Minimum reputation for the user listing
    #[arg(long, default_value_t = 223)]
    pub min_reputation: u32,

    /// Maximum number of user listing pages to request
    #[arg(long, default_value_t = 2)]
    pub max_pages: u32,

    /// Minimum number of answers a user must have
    #[arg(long, default_value_t = 1)]
    pub min_answers: u64,

    /// Locations to match against user profiles (substring, any of)
    #[arg(long, value_delimiter = ',', default_value = "Romania,Moldova")]
    pub locations: Vec<String>,

    /// Tags to match against each user's top tags (exact, any of)
    #[arg(long, value_delimiter = ',', default_value = "java,.net,docker,C#")]
    pub tags: Vec<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: FindOptions, global: crate::Global) -> Result<()> {
    if global.verbose {
        println!(
            "Searching {} for users in {} with top tags {}...",
            options.site,
            options.locations.join(", "),
            options.tags.join(", ")
        );
    }

    let output = find_users_data(&options).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", format_matches(&output));
        if global.verbose {
            eprintln!(
                "{}",
                format!(
                    "{} of {} fetched user(s) matched",
                    output.matches.len(),
                    output.fetched
                )
                .green()
            );
        }
    }

    Ok(())
}

/// Fetches, filters and cross-references users, returning the structured output
///
/// The user listing is capped at `max_pages` requests; each surviving user's
/// top tags are then fetched to exhaustion, one user at a time.
pub async fn find_users_data(options: &FindOptions) -> Result<FindOutput> {
    let client = reqwest::Client::new();

    let users: Vec<SeUser> = fetch_all_pages(
        |page| fetch_users_page(&client, options, page),
        Some(options.max_pages),
    )
    .await?;
    let fetched = users.len();

    let candidates = filter_users(users, &options.locations, options.min_answers);

    let mut matches = Vec::new();
    for user in &candidates {
        let user_id = user.user_id;
        let tags: Vec<SeTag> = fetch_all_pages(
            |page| fetch_top_tags_page(&client, user_id, &options.site, options.page_size, page),
            None,
        )
        .await?;

        if has_allowed_tag(&tags, &options.tags) {
            matches.push(build_user_match(user, &tags));
        }
    }

    Ok(FindOutput { fetched, matches })
}

async fn fetch_users_page(
    client: &reqwest::Client,
    options: &FindOptions,
    page: u32,
) -> Result<SeEnvelope<SeUser>> {
    let url = format!("{}/users", get_api_base());
    let page_str = page.to_string();
    let page_size_str = options.page_size.to_string();
    let min_reputation_str = options.min_reputation.to_string();

    let query = [
        ("page", page_str.as_str()),
        ("pagesize", page_size_str.as_str()),
        ("order", SORT_ORDER),
        ("min", min_reputation_str.as_str()),
        ("sort", SORT_FIELD),
        ("site", options.site.as_str()),
        ("filter", USERS_FILTER),
    ];

    fetch_page(client, &url, &query).await
}

/// Render the matched users as output lines, one per match
fn format_matches(output: &FindOutput) -> String {
    output
        .matches
        .iter()
        .map(|m| format_match_line(m) + "\n")
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sxtools_core::se::UserMatch;

    fn user_match(name: &str, tags: &[&str]) -> UserMatch {
        UserMatch {
            display_name: name.to_string(),
            location: "Iasi, Romania".to_string(),
            answer_count: 4,
            question_count: 1,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            link: format!("https://stackoverflow.com/users/9/{}", name),
            profile_image: format!("https://i.sstatic.net/{}.png", name),
        }
    }

    #[test]
    fn test_format_matches_one_line_per_match() {
        let output = FindOutput {
            fetched: 200,
            matches: vec![
                user_match("ana", &["java"]),
                user_match("vlad", &["docker", ".net"]),
            ],
        };

        let formatted = format_matches(&output);
        let lines: Vec<&str> = formatted.lines().collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "ana Iasi, Romania 4 1 java \
             https://stackoverflow.com/users/9/ana https://i.sstatic.net/ana.png"
        );
        assert_eq!(
            lines[1],
            "vlad Iasi, Romania 4 1 docker, .net \
             https://stackoverflow.com/users/9/vlad https://i.sstatic.net/vlad.png"
        );
    }

    #[test]
    fn test_format_matches_empty() {
        let output = FindOutput {
            fetched: 200,
            matches: vec![],
        };

        assert_eq!(format_matches(&output), "");
    }
}
