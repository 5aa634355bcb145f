use thiserror::Error;

pub type Result<T> = std::result::Result<T, BridgeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Connect/read failure or timeout. The only retryable kind.
    #[error("{0}")]
    Transport(String),

    #[error("{status} {reason}")]
    HttpStatus { status: u16, reason: String },

    #[error("Binary server '{0}' not found")]
    NotFound(String),

    #[error("No binary found matching filename '{query}'")]
    NoMatch {
        query: String,
        available: Vec<String>,
    },

    #[error("{0}")]
    Validation(String),

    #[error("No Binary Ninja servers available")]
    NoServersAvailable,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<BridgeError>,
    },
}

impl BridgeError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }
}
