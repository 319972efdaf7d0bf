use async_trait::async_trait;

use crate::{
    host::error::{CreationError, StorageError},
    types::{AccountId, PublicKey},
};

pub trait HashPort: Send + Sync {
    fn sha256(&self, data: &[u8]) -> [u8; 32];
}

/// One mutation inside a batch handed to [`StoragePort::apply_batch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageOp {
    Put { key: String, value: Vec<u8> },
    Delete { key: String },
}

/// Key-value storage that survives across calls.
pub trait StoragePort: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    fn write(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Returns whether the key was present.
    fn remove(&mut self, key: &str) -> Result<bool, StorageError>;

    /// Applies every op or none of them.
    fn apply_batch(&mut self, ops: Vec<StorageOp>) -> Result<(), StorageError>;

    fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StorageError>;
}

#[async_trait]
pub trait AccountCreatorPort: Send + Sync {
    async fn create_account(
        &self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<(), CreationError>;
}
