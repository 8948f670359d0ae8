#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Network error: {0}")]
    Network(String),

    #[error("No more allowed API calls or no internet connection")]
    NoMoreCalls,

    #[error("API request quota exhausted")]
    QuotaExhausted,

    #[error("Failed to parse API response: {0}")]
    Parse(String),
}
