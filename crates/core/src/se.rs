//! Domain models and transformations for StackExchange API data

use serde::{Deserialize, Serialize};

/// StackExchange user from the `users` endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeUser {
    pub user_id: u64,
    #[serde(default)]
    pub reputation: u64,
    #[serde(default)]
    pub answer_count: u64,
    #[serde(default)]
    pub question_count: u64,
    /// Free-text location; the API omits the field when the user never set one.
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub profile_image: String,
    #[serde(default)]
    pub display_name: String,
}

/// Top answer tag for a user from the `users/{id}/top-tags` endpoint
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeTag {
    #[serde(default)]
    pub user_id: u64,
    pub tag_name: String,
}

/// Common envelope wrapping every StackExchange API response page
#[derive(Debug, Deserialize, Clone)]
pub struct SeEnvelope<T> {
    #[serde(default)]
    pub items: Vec<T>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub quota_max: u32,
    #[serde(default)]
    pub quota_remaining: u32,
}

/// Matched user together with their fetched tag names
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct UserMatch {
    pub display_name: String,
    pub location: String,
    pub answer_count: u64,
    pub question_count: u64,
    pub tags: Vec<String>,
    pub link: String,
    pub profile_image: String,
}

/// Complete output of the find pipeline
#[derive(Debug, Serialize, Clone)]
pub struct FindOutput {
    pub fetched: usize,
    pub matches: Vec<UserMatch>,
}

/// Decide whether a paged fetch loop should request another page
///
/// `page` is the 1-indexed page that was just consumed. With a cap the loop
/// never issues more than `max` calls in total: at `page == max` it stops
/// even when the API reports more pages. Without a cap it runs until
/// `has_more` turns false.
pub fn should_fetch_next(has_more: bool, page: u32, max_pages: Option<u32>) -> bool {
    has_more && max_pages.map_or(true, |max| page < max)
}

/// Apply the user filter chain
///
/// Keeps users whose location is non-empty, not all-whitespace, and contains
/// at least one of the allowed substrings, and who have answered at least
/// `min_answers` questions.
pub fn filter_users(
    users: Vec<SeUser>,
    allowed_locations: &[String],
    min_answers: u64,
) -> Vec<SeUser> {
    users
        .into_iter()
        .filter(|u| !u.location.is_empty())
        .filter(|u| !u.location.trim().is_empty())
        .filter(|u| {
            allowed_locations
                .iter()
                .any(|loc| u.location.contains(loc.as_str()))
        })
        .filter(|u| u.answer_count >= min_answers)
        .collect()
}

/// True if any fetched tag name appears in the allow-list (exact match)
pub fn has_allowed_tag(tags: &[SeTag], allowed: &[String]) -> bool {
    tags.iter().any(|t| allowed.iter().any(|a| a == &t.tag_name))
}

/// Join names with a comma separator, without a trailing separator
pub fn join_names(names: &[String]) -> String {
    names.join(", ")
}

/// Flatten a user and their fetched tags into an output record
pub fn build_user_match(user: &SeUser, tags: &[SeTag]) -> UserMatch {
    UserMatch {
        display_name: user.display_name.clone(),
        location: user.location.clone(),
        answer_count: user.answer_count,
        question_count: user.question_count,
        tags: tags.iter().map(|t| t.tag_name.clone()).collect(),
        link: user.link.clone(),
        profile_image: user.profile_image.clone(),
    }
}

/// Render one space-separated output line for a match
///
/// Field order: display name, location, answer count, question count,
/// joined tag names, profile link, profile image URL.
pub fn format_match_line(m: &UserMatch) -> String {
    format!(
        "{} {} {} {} {} {} {}",
        m.display_name,
        m.location,
        m.answer_count,
        m.question_count,
        join_names(&m.tags),
        m.link,
        m.profile_image
    )
}
