use crate::{
    error::FaucetError,
    types::{AccountId, PublicKey},
};

/// Ticket for a reservation whose creation side effect is in flight.
///
/// Not `Clone`: the one task that dispatched the side effect owns it until
/// reconciliation, so each reservation is settled at most once.
#[derive(Debug, PartialEq, Eq)]
pub struct PendingCreation {
    account_id: AccountId,
    public_key: PublicKey,
    difficulty: u32,
}

impl PendingCreation {
    pub(crate) fn new(account_id: AccountId, public_key: PublicKey, difficulty: u32) -> Self {
        Self {
            account_id,
            public_key,
            difficulty,
        }
    }

    pub fn account_id(&self) -> &AccountId {
        &self.account_id
    }

    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreationOutcome {
    Created { account_id: AccountId },
    RolledBack { account_id: AccountId, error: FaucetError },
}

impl CreationOutcome {
    pub fn is_created(&self) -> bool {
        matches!(self, Self::Created { .. })
    }

    pub fn account_id(&self) -> &AccountId {
        match self {
            Self::Created { account_id } | Self::RolledBack { account_id, .. } => account_id,
        }
    }
}
