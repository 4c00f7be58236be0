use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum UpstreamError {
    #[error("API server unavailable: {message}")]
    #[diagnostic(
        code(kanban::upstream::unavailable),
        help(
            "Is the API server running? Try: kanban-api --db /path/to/db\nOr set KANBAN_API_URL to point to the correct server."
        )
    )]
    Unavailable { message: String },

    /// The server answered with a 4xx status.
    #[error("API rejected request ({status}): {message}")]
    #[diagnostic(code(kanban::upstream::rejected))]
    Rejected {
        status: u16,
        kind: Option<String>,
        message: String,
    },

    #[error("Invalid response from API server: {message}")]
    #[diagnostic(
        code(kanban::upstream::invalid_response),
        help("The server returned data in an unexpected format. This might indicate a version mismatch.")
    )]
    InvalidResponse { message: String },

    #[error("Failed to build HTTP client: {message}")]
    #[diagnostic(code(kanban::upstream::client))]
    Client { message: String },
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() || e.is_request() {
            UpstreamError::Unavailable {
                message: e.to_string(),
            }
        } else {
            UpstreamError::InvalidResponse {
                message: e.to_string(),
            }
        }
    }
}

pub type UpstreamResult<T> = Result<T, UpstreamError>;
