use thiserror::Error;

/// Raised when a string does not match an identifier's canonical grammar.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentifierError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    #[error("Invalid {kind} '{value}': {reason}")]
    Format {
        kind: &'static str,
        value: String,
        reason: &'static str,
    },
}

impl IdentifierError {
    pub fn format(kind: &'static str, value: &str, reason: &'static str) -> Self {
        Self::Format {
            kind,
            value: value.to_string(),
            reason,
        }
    }
}

/// Wire-level parse and serialization failures.
#[derive(Debug, Clone, Error)]
pub enum CodecError {
    #[error("Missing required element '{field}' in {context}")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },

    #[error("Invalid value for '{field}' in {context}: {reason}")]
    InvalidField {
        context: &'static str,
        field: &'static str,
        reason: String,
    },

    #[error("{context}: {reason}")]
    Choice {
        context: &'static str,
        reason: String,
    },

    #[error("Expected an object for {0}")]
    NotAnObject(&'static str),

    #[error("Request body is not valid UTF-8: {0}")]
    Encoding(String),

    #[error("Invalid JSON: {0}")]
    Json(String),

    #[error("Invalid XML: {0}")]
    Xml(String),

    #[error("Invalid SOAP envelope: {0}")]
    Soap(String),

    #[error("Custom parser failed: {0}")]
    Hook(String),

    #[error("Operation {operation} is not available in OICP {version}")]
    Unsupported {
        operation: &'static str,
        version: &'static str,
    },
}

impl CodecError {
    pub fn invalid(context: &'static str, field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidField {
            context,
            field,
            reason: reason.to_string(),
        }
    }
}

impl From<serde_json::Error> for CodecError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl From<IdentifierError> for CodecError {
    fn from(e: IdentifierError) -> Self {
        Self::Choice {
            context: "identifier",
            reason: e.to_string(),
        }
    }
}

/// Aggregate-level conversion failures between OICP and WWCP.
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    #[error("Could not convert {what} '{value}' to {target}")]
    Identifier {
        what: &'static str,
        value: String,
        target: &'static str,
    },

    #[error("Missing {0} required for the conversion")]
    Missing(&'static str),

    #[error("Invalid {what}: {reason}")]
    Invalid { what: &'static str, reason: String },
}

/// A builder was finalized without one of its required fields.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{builder}: required field '{field}' was not set")]
pub struct BuilderError {
    pub builder: &'static str,
    pub field: &'static str,
}

/// Outbound transport failures (connection, timeout, HTTP client errors).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Connection to {0} failed")]
    Connect(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("Transport error: {0}")]
    Other(String),

    #[error("Transport is shutting down")]
    Closed,
}

impl TransportError {
    /// Whether a retry may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Connect(_) | Self::Other(_))
    }
}

/// Typed lookup failures on the custom-data side channel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CustomDataError {
    #[error("No custom data stored under '{0}'")]
    NotFound(String),

    #[error("Custom data '{key}' is a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Error returned by a request handler registered on the server.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Text of a caught panic payload.
pub fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
