use thiserror::Error;

#[derive(Error, Debug)]
pub enum PromflatError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Input '{input}' failed to gather: {message}")]
    Gather { input: String, message: String },

    #[error("Input already registered: {0}")]
    DuplicateInput(String),

    #[error("Write error: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Async task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Result type alias for promflat operations
pub type Result<T> = std::result::Result<T, PromflatError>;

impl PromflatError {
    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new parse error for the given 1-based line
    pub fn parse<S: Into<String>>(line: usize, msg: S) -> Self {
        Self::Parse {
            line,
            message: msg.into(),
        }
    }

    /// Creates a new gather error attributed to an input
    pub fn gather<I: Into<String>, S: Into<String>>(input: I, msg: S) -> Self {
        Self::Gather {
            input: input.into(),
            message: msg.into(),
        }
    }

    /// Creates a new write error
    pub fn write<S: Into<String>>(msg: S) -> Self {
        Self::Write(msg.into())
    }

    /// Returns true if the next collection cycle may succeed where this one failed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Gather { .. } | Self::Io(_) | Self::Parse { .. } | Self::Write(_) => true,
            Self::Config(_) | Self::DuplicateInput(_) | Self::Serialization(_) | Self::Join(_) => {
                false
            },
        }
    }

    /// Returns the error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Config(_) | Self::DuplicateInput(_) => "config",
            Self::Parse { .. } => "parse",
            Self::Gather { .. } => "gather",
            Self::Write(_) => "write",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
            Self::Join(_) => "async",
        }
    }
}
