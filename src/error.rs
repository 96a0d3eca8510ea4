use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("I/O error while {context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON parse error while {context}: {source}")]
    Json {
        context: &'static str,
        #[source]
        source: serde_json::Error,
    },
    /// Malformed M2 text. `line` is 1-based within the record when known.
    #[error("malformed M2 record (line {line}): {message}")]
    Format { line: usize, message: String },
    #[error("token source failed while {context}: {message}")]
    Dependency {
        context: &'static str,
        message: String,
    },
    #[error("invalid input: {message}")]
    Validation { message: String },
}

impl EvalError {
    pub(crate) fn io(context: &'static str, source: std::io::Error) -> Self {
        Self::Io { context, source }
    }

    pub(crate) fn json(context: &'static str, source: serde_json::Error) -> Self {
        Self::Json { context, source }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }

    pub fn dependency(context: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Dependency {
            context,
            message: err.to_string(),
        }
    }

    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn is_format(&self) -> bool {
        matches!(self, Self::Format { .. })
    }
}
