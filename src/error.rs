//! Errors raised around the converter: loading input, copying output and
//! talking to Discord. Conversion itself never fails.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    /// Input exceeds the configured size ceiling.
    #[error("content too large: {size} bytes exceeds the {limit} byte limit")]
    ContentTooLarge { size: u64, limit: u64 },

    /// Discord answered a webhook request with a non-success status.
    #[error("webhook rejected message ({status}): {message}")]
    WebhookRejected { status: u16, message: String },

    /// No clipboard tool could take the text.
    #[error("clipboard unavailable: {reason}")]
    ClipboardUnavailable { reason: String },

    /// A webhook URL failed verification.
    #[error("invalid webhook: {reason}")]
    InvalidWebhook { reason: String },

    /// Nothing to send to.
    #[error("no webhook URL configured")]
    MissingWebhook,

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_details() {
        let err = BridgeError::WebhookRejected {
            status: 400,
            message: "Invalid Form Body".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "webhook rejected message (400): Invalid Form Body"
        );

        let err = BridgeError::ContentTooLarge { size: 10, limit: 5 };
        assert_eq!(
            err.to_string(),
            "content too large: 10 bytes exceeds the 5 byte limit"
        );
    }
}
