use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Malformed input at byte {position}: {message}")]
    MalformedInput { position: u64, message: String },

    #[error("Parsing aborted by consumer")]
    AbortedByConsumer,
}

impl ParseError {
    pub(crate) fn malformed(position: u64, message: impl Into<String>) -> Self {
        Self::MalformedInput {
            position,
            message: message.into(),
        }
    }
}
