pub type ImagesResult<T> = Result<T, ImagesError>;

/// Code the backend uses for transform-side failures raised by the binding itself.
pub const TRANSFORM_ERROR_CODE: u32 = 9523;
/// Code reported when a transformer is reused after being consumed.
pub const CONSUMED_ERROR_CODE: u32 = 9525;

#[derive(thiserror::Error, Debug)]
pub enum ImagesError {
    #[error(
        "IMAGES_TRANSFORM_ERROR 9525: ImageTransformer consumed; you may only call .output() or draw a transformer once"
    )]
    Consumed,

    #[error("IMAGES_TRANSFORM_ERROR 9523: No content-type on bindings response")]
    MissingContentType,

    /// Failure signalled by the backend through the `cf-images-binding` header.
    #[error("{}", backend_message(.operation, .code, .detail))]
    Backend {
        operation: String,
        code: u32,
        detail: String,
    },

    #[error("Unexpected error response {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },

    #[error("unsupported: {0}")]
    Unsupported(String),

    #[error("serialization error: {0}")]
    Serde(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

fn backend_message(operation: &str, code: &u32, detail: &str) -> String {
    format!("IMAGES_{operation}_ERROR {code}: {detail}")
        .trim()
        .to_string()
}

impl ImagesError {
    pub fn backend(operation: impl Into<String>, code: u32, detail: impl Into<String>) -> Self {
        Self::Backend {
            operation: operation.into(),
            code,
            detail: detail.into(),
        }
    }

    pub fn unexpected_status(status: u16, body: &str) -> Self {
        Self::UnexpectedStatus {
            status,
            body: body.trim().to_string(),
        }
    }

    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }

    /// Numeric error code, when the error belongs to the backend taxonomy.
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Consumed => Some(CONSUMED_ERROR_CODE),
            Self::MissingContentType | Self::UnexpectedStatus { .. } => Some(TRANSFORM_ERROR_CODE),
            Self::Backend { code, .. } => Some(*code),
            Self::Unsupported(_) | Self::Serde(_) | Self::Other(_) => None,
        }
    }
}

impl From<serde_json::Error> for ImagesError {
    fn from(e: serde_json::Error) -> Self {
        Self::serde(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consumed_message_is_stable() {
        let err = ImagesError::Consumed;
        assert_eq!(err.code(), Some(9525));
        assert_eq!(
            err.to_string(),
            "IMAGES_TRANSFORM_ERROR 9525: ImageTransformer consumed; you may only call .output() or draw a transformer once"
        );
    }

    #[test]
    fn backend_message_carries_operation_and_code() {
        let err = ImagesError::backend("INFO", 123, "Bad request");
        assert_eq!(err.code(), Some(123));
        assert_eq!(err.to_string(), "IMAGES_INFO_ERROR 123: Bad request");
    }

    #[test]
    fn backend_message_is_trimmed_when_body_is_empty() {
        let err = ImagesError::backend("TRANSFORM", 9400, "");
        assert_eq!(err.to_string(), "IMAGES_TRANSFORM_ERROR 9400:");
    }

    #[test]
    fn unexpected_status_trims_body_and_uses_fallback_code() {
        let err = ImagesError::unexpected_status(502, "  bad gateway\n");
        assert_eq!(err.code(), Some(9523));
        assert_eq!(err.to_string(), "Unexpected error response 502: bad gateway");
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = ImagesError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
        assert_eq!(err.code(), None);
    }
}
