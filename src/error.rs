//! Bridge errors and their stable codes.
//!
//! Every failure is returned to the immediate caller. Nothing here is ever
//! delivered through the notification bus.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

use engine::{EngineError, ObjectId};

/// Stable machine-readable code for an error, plus whether retrying the same
/// call later can succeed.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// An operation ran before `initialize` completed.
    #[error("engine not initialized")]
    NotInitialized,
    /// Engine startup failed or timed out. A later `initialize` may retry.
    #[error("engine failed to start: {0}")]
    EngineInit(String),
    /// Another command is in flight or a buffer view is alive.
    #[error("command channel busy")]
    ChannelBusy,
    #[error("unknown object id: {0}")]
    UnknownObjectId(ObjectId),
    #[error("upload rejected: {0}")]
    UploadValidation(String),
    /// A pixel region was read after the memory it described moved on.
    #[error("pixel region is stale")]
    StaleRegion,
    /// The engine has no object ids left for this session.
    #[error("object ids exhausted")]
    IdsExhausted,
}

impl ErrorCode for BridgeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "E_NOT_INITIALIZED",
            Self::EngineInit(_) => "E_ENGINE_INIT",
            Self::ChannelBusy => "E_CHANNEL_BUSY",
            Self::UnknownObjectId(_) => "E_UNKNOWN_OBJECT",
            Self::UploadValidation(_) => "E_UPLOAD_INVALID",
            Self::StaleRegion => "E_STALE_REGION",
            Self::IdsExhausted => "E_IDS_EXHAUSTED",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::EngineInit(_) | Self::ChannelBusy | Self::StaleRegion)
    }
}

impl From<EngineError> for BridgeError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnknownObject(id) => Self::UnknownObjectId(id),
            EngineError::InvalidUpload(reason) => Self::UploadValidation(reason),
            EngineError::InvalidOptions(reason) => Self::EngineInit(reason),
            EngineError::IdsExhausted => Self::IdsExhausted,
        }
    }
}
