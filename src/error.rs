#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum MyGeneError {
    #[error("HTTP client initialization failed: {0}")]
    HttpClientInit(reqwest::Error),

    #[error("{message}")]
    Gateway { message: String },

    #[error("Batch size exceeds maximum of {limit}")]
    BatchSizeExceeded { limit: usize },

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool method '{0}' not found")]
    UnknownMethod(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Export failed: {0}")]
    Export(#[from] csv::Error),
}

impl MyGeneError {
    pub(crate) fn gateway(message: impl Into<String>) -> Self {
        Self::Gateway {
            message: message.into(),
        }
    }

    /// Stable kind name reported in the `error` field of a tool error envelope.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpClientInit(_) | Self::Gateway { .. } => "GatewayError",
            Self::BatchSizeExceeded { .. } => "BatchSizeExceeded",
            Self::UnsupportedFormat(_) => "UnsupportedFormatError",
            Self::UnknownTool(_) | Self::UnknownMethod(_) | Self::InvalidArgument(_) => {
                "ValueError"
            }
            Self::Json(_) => "JsonError",
            Self::Export(_) => "ExportError",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MyGeneError;

    #[test]
    fn batch_size_exceeded_display_states_limit() {
        let err = MyGeneError::BatchSizeExceeded { limit: 1000 };
        assert_eq!(err.to_string(), "Batch size exceeds maximum of 1000");
        assert_eq!(err.kind(), "BatchSizeExceeded");
    }

    #[test]
    fn gateway_display_is_message_verbatim() {
        let err = MyGeneError::gateway("HTTP error 404: not found");
        assert_eq!(err.to_string(), "HTTP error 404: not found");
        assert_eq!(err.kind(), "GatewayError");
    }

    #[test]
    fn unknown_tool_maps_to_value_error_kind() {
        let err = MyGeneError::UnknownTool("nope".into());
        assert_eq!(err.to_string(), "Unknown tool: nope");
        assert_eq!(err.kind(), "ValueError");
        assert_eq!(
            MyGeneError::UnknownMethod("query_genes".into()).kind(),
            "ValueError"
        );
    }

    #[test]
    fn unsupported_format_kind_name() {
        let err = MyGeneError::UnsupportedFormat("yaml".into());
        assert!(err.to_string().contains("yaml"));
        assert_eq!(err.kind(), "UnsupportedFormatError");
    }
}
