use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Errors the console core surfaces to a panel.
///
/// `Validation` and `ConfirmationRequired` are resolved locally and never
/// reach the network layer. `SessionExpired` is the 401-class outcome the
/// session collaborator reacts to. Everything else arriving from the wire
/// stays a [`ClientError`] under `Api`.
#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("confirmation required for '{0}'")]
    ConfirmationRequired(&'static str),
    #[error("session expired")]
    SessionExpired,
    #[error("another {0} is still in flight")]
    Busy(&'static str),
    #[error(transparent)]
    Api(#[from] ClientError),
}

/// Errors produced by the HTTP layer, one variant per response class.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("unauthorized")]
    Unauthorized,
    #[error("forbidden")]
    Forbidden,
    #[error("not found")]
    NotFound,
    #[error("conflict: {0}")]
    Conflict(String),
    #[error("validation rejected by server: {0}")]
    Rejected(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("server unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ConsoleError {
    /// True for failures a panel renders as a plain message and moves on from.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::SessionExpired)
    }
}

impl PartialEq for ConsoleError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Validation(a), Self::Validation(b)) => a == b,
            (Self::ConfirmationRequired(a), Self::ConfirmationRequired(b)) => a == b,
            (Self::SessionExpired, Self::SessionExpired) => true,
            (Self::Busy(a), Self::Busy(b)) => a == b,
            (Self::Api(a), Self::Api(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}
