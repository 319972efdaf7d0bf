use async_trait::async_trait;

use crate::{
    host::{error::CreationError, ports::AccountCreatorPort},
    types::{AccountId, PublicKey},
};

/// Creator that confirms every account without touching any external system.
#[derive(Debug, Clone, Default)]
pub struct AlwaysCreateAccounts;

#[async_trait]
impl AccountCreatorPort for AlwaysCreateAccounts {
    async fn create_account(
        &self,
        _account_id: &AccountId,
        _public_key: &PublicKey,
    ) -> Result<(), CreationError> {
        Ok(())
    }
}
