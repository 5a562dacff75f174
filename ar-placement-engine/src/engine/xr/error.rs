use thiserror::Error;

/// Failure of an asynchronous device request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XrError {
    #[error("{request} request rejected: {reason}")]
    Rejected {
        request: &'static str,
        reason: String,
    },

    #[error("session mode not supported: {0}")]
    UnsupportedMode(String),

    #[error("host bridge closed before {0} resolved")]
    BridgeClosed(&'static str),
}

impl XrError {
    pub fn rejected(request: &'static str, reason: impl Into<String>) -> Self {
        Self::Rejected {
            request,
            reason: reason.into(),
        }
    }
}
