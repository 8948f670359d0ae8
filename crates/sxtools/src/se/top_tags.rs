use crate::prelude::{println, *};
use colored::Colorize;
use sxtools_core::se::SeTag;

use super::{extract_user_id, fetch_all_pages, fetch_top_tags_page};

#[derive(Debug, clap::Args, Clone)]
pub struct TagsOptions {
    /// User ID or profile URL (e.g., "22656" or "https://stackoverflow.com/users/22656/jon-skeet")
    #[arg(value_name = "USER")]
    pub user: String,

    /// StackExchange site to query
    #[arg(long, env = "SXTOOLS_SITE", default_value = "stackoverflow")]
    pub site: String,

    /// Number of items per API page
    #[arg(long, default_value_t = 100)]
    pub page_size: u32,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn run(options: TagsOptions, global: crate::Global) -> Result<()> {
    let user_id = extract_user_id(&options.user)?;

    if global.verbose {
        println!("Fetching top tags for user {}", user_id);
    }

    let tags = top_tags_data(user_id, &options.site, options.page_size).await?;

    if options.json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    println!(
        "{}",
        format!("Top tags for user {} on {}:", user_id, options.site).bold()
    );

    if tags.is_empty() {
        println!("{}", "No tags found.".yellow());
        return Ok(());
    }

    let mut table = crate::prelude::new_table();
    table.add_row(prettytable::row!["#", "Tag"]);
    for (idx, tag) in tags.iter().enumerate() {
        table.add_row(prettytable::row![idx + 1, &tag.tag_name]);
    }
    table.printstd();

    Ok(())
}

/// Fetches the full top-tags list for a user, paging until exhaustion
pub async fn top_tags_data(user_id: u64, site: &str, page_size: u32) -> Result<Vec<SeTag>> {
    let client = reqwest::Client::new();

    fetch_all_pages(
        |page| fetch_top_tags_page(&client, user_id, site, page_size, page),
        None,
    )
    .await
}
