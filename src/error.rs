use thiserror::Error;

use crate::geom::Size;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(PartialEq, Eq, Error, Debug, Clone)]
pub enum Error {
    #[error("geometry: {0}")]
    Geometry(String),

    /// A terminal backend resource failure. Fatal at startup, presented as an
    /// error panel if it happens mid-session.
    #[error("backend: {0}")]
    Backend(String),

    /// A git operation failure, carrying the repository backend's message
    /// verbatim.
    #[error("git: {0}")]
    Git(String),

    #[error("invalid: {0}")]
    Invalid(String),

    #[error("runloop: {0}")]
    RunLoop(String),

    #[error("internal: {0}")]
    Internal(String),

    /// The terminal was resized. Raised out of event sourcing so the caller
    /// rebuilds the window layout before dispatching anything further.
    #[error("terminal resized")]
    Resized(Size),

    /// The user hit a hard interrupt key (Ctrl-C / Ctrl-D).
    #[error("interrupted")]
    Interrupted,
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Backend(e.to_string())
    }
}
