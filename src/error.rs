use thiserror::Error;

use crate::{host::error::StorageError, types::AccountId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaucetErrorKind {
    AlreadyInitialized,
    NotInitialized,
    InvalidConfig,
    InvalidPublicKey,
    InvalidSuffix,
    AlreadyCreated,
    WorkTooWeak,
    CreationSideEffectFailed,
    ReservationConflict,
    InvariantViolation,
    Storage,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FaucetError {
    #[error("the contract is already initialized")]
    AlreadyInitialized,

    #[error("the contract is not initialized")]
    NotInitialized,

    #[error("invalid faucet config: {0}")]
    InvalidConfig(String),

    #[error("public key must be {expected} bytes, got {actual}")]
    InvalidPublicKey { expected: usize, actual: usize },

    #[error("account has to end with the suffix '{suffix}': '{account_id}'")]
    InvalidSuffix { account_id: AccountId, suffix: String },

    #[error("the given account is already created: '{account_id}'")]
    AlreadyCreated { account_id: AccountId },

    #[error("the proof of work is too weak: {difficulty} leading zero bits, need {min_difficulty}")]
    WorkTooWeak { difficulty: u32, min_difficulty: u32 },

    #[error("account creation failed for '{account_id}': {reason}")]
    CreationSideEffectFailed { account_id: AccountId, reason: String },

    #[error("reservation conflict for '{account_id}': {message}")]
    ReservationConflict { account_id: AccountId, message: String },

    #[error("faucet state invariant violated: {0}")]
    InvariantViolation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("internal faucet error: {0}")]
    Internal(String),
}

impl FaucetError {
    pub fn kind(&self) -> FaucetErrorKind {
        match self {
            Self::AlreadyInitialized => FaucetErrorKind::AlreadyInitialized,
            Self::NotInitialized => FaucetErrorKind::NotInitialized,
            Self::InvalidConfig(_) => FaucetErrorKind::InvalidConfig,
            Self::InvalidPublicKey { .. } => FaucetErrorKind::InvalidPublicKey,
            Self::InvalidSuffix { .. } => FaucetErrorKind::InvalidSuffix,
            Self::AlreadyCreated { .. } => FaucetErrorKind::AlreadyCreated,
            Self::WorkTooWeak { .. } => FaucetErrorKind::WorkTooWeak,
            Self::CreationSideEffectFailed { .. } => FaucetErrorKind::CreationSideEffectFailed,
            Self::ReservationConflict { .. } => FaucetErrorKind::ReservationConflict,
            Self::InvariantViolation(_) => FaucetErrorKind::InvariantViolation,
            Self::Storage(_) => FaucetErrorKind::Storage,
            Self::Internal(_) => FaucetErrorKind::Internal,
        }
    }

    /// Rejections produced before any state is written.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self.kind(),
            FaucetErrorKind::AlreadyInitialized
                | FaucetErrorKind::NotInitialized
                | FaucetErrorKind::InvalidConfig
                | FaucetErrorKind::InvalidPublicKey
                | FaucetErrorKind::InvalidSuffix
                | FaucetErrorKind::AlreadyCreated
                | FaucetErrorKind::WorkTooWeak
        )
    }
}

pub fn reservation_conflict(account_id: &str, message: impl Into<String>) -> FaucetError {
    FaucetError::ReservationConflict {
        account_id: account_id.to_string(),
        message: message.into(),
    }
}
