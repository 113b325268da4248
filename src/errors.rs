use std::fmt;

/// Client-side error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A required field was blank or missing. Raised before any request is sent.
    Validation(String),
    /// Transport failure, non-2xx status, or an undecodable response body.
    Request(String),
    /// The client was configured in a way that makes the operation undefined.
    InvalidConfiguration(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<ClientError>,
        /// Additional context message.
        context: String,
    },
}

impl ClientError {
    /// Returns the innermost error, skipping any context layers.
    pub fn root(&self) -> &ClientError {
        match self {
            ClientError::WithContext { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), ClientError::Validation(_))
    }

    pub fn is_request(&self) -> bool {
        matches!(self.root(), ClientError::Request(_))
    }

    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self.root(), ClientError::InvalidConfiguration(_))
    }

    /// The single human-readable string shown to the user.
    ///
    /// Context layers are developer diagnostics and are not included.
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Validation(msg) => msg.clone(),
            ClientError::Request(msg) => msg.clone(),
            ClientError::InvalidConfiguration(msg) => format!("Invalid configuration: {}", msg),
            ClientError::WithContext { source, .. } => source.user_message(),
        }
    }
}

impl fmt::Display for ClientError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ClientError::Request(msg) => write!(f, "Request error: {}", msg),
            ClientError::InvalidConfiguration(msg) => {
                write!(f, "Invalid configuration: {}", msg)
            }
            ClientError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for ClientError {}

impl From<reqwest::Error> for ClientError {
    /// Converts a `reqwest::Error` into a `ClientError`.
    fn from(err: reqwest::Error) -> Self {
        ClientError::Request(err.to_string())
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidConfiguration(format!("invalid URL: {}", err))
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `ClientError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, context: impl Into<String>) -> Result<T, ClientError>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F>(self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T, ClientError> {
    fn context(self, context: impl Into<String>) -> Result<T, ClientError> {
        self.map_err(|e| ClientError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| ClientError::WithContext {
            source: Box::new(e),
            context: f(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_preserves_kind() {
        let result: Result<(), ClientError> = Err(ClientError::Request("boom".to_string()));
        let err = result.context("listing notes").unwrap_err();

        assert!(err.is_request());
        assert!(!err.is_validation());
        assert_eq!(err.to_string(), "listing notes: Request error: boom");
    }

    #[test]
    fn test_user_message_hides_context() {
        let result: Result<(), ClientError> =
            Err(ClientError::Validation("Please enter both names.".to_string()));
        let err = result
            .with_context(|| format!("submitting form {}", 1))
            .unwrap_err();

        assert_eq!(err.user_message(), "Please enter both names.");
    }

    #[test]
    fn test_root_unwraps_nested_context() {
        let err = ClientError::WithContext {
            source: Box::new(ClientError::WithContext {
                source: Box::new(ClientError::InvalidConfiguration("no labels".to_string())),
                context: "inner".to_string(),
            }),
            context: "outer".to_string(),
        };

        assert!(err.is_invalid_configuration());
        assert_eq!(err.root(), &ClientError::InvalidConfiguration("no labels".to_string()));
    }
}
