use thiserror::Error;

/// Errors from the helpdesk client.
///
/// The chain logic in [`attach`](crate::attach) and
/// [`conversation`](crate::client) classifies [`HelpdeskError::Api`] statuses
/// into "try the next variant" versus "abort" per strategy; everything else
/// here is terminal for the call that produced it.
#[derive(Debug, Error)]
pub enum HelpdeskError {
    /// Transport-level failure (connection, TLS, timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The helpdesk returned a non-success status.
    #[error("helpdesk API error: HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// Client-side configuration is missing required fields.
    #[error("helpdesk not configured: {0}")]
    Configuration(String),

    /// A success response carried no extractable conversation or attachment
    /// id. The raw body rides along for diagnosis.
    #[error("unrecognized response envelope: {0}")]
    UnrecognizedEnvelope(String),

    /// Every creation candidate was tried without obtaining a conversation.
    #[error("conversation creation failed; tried {attempted:?}: {last_error}")]
    CreationExhausted {
        attempted: Vec<String>,
        last_error: String,
    },

    /// Every applicable attachment strategy was tried without success.
    #[error("all attachment strategies failed for '{file_name}'; tried {attempted:?}: {last_error}")]
    AttachmentExhausted {
        file_name: String,
        attempted: Vec<&'static str>,
        last_error: String,
    },

    /// A blob exceeds the configured submission size ceiling. Checked before
    /// any network call.
    #[error("attachment '{file_name}' ({size} bytes) exceeds the {limit} submission limit")]
    TooLarge {
        file_name: String,
        size: u64,
        limit: String,
    },

    /// Ticket body rendering failed.
    #[error("template error: {0}")]
    Template(String),
}

impl HelpdeskError {
    /// HTTP status carried by this error, when there is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<minijinja::Error> for HelpdeskError {
    fn from(err: minijinja::Error) -> Self {
        Self::Template(err.to_string())
    }
}
