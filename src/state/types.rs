use serde::{Deserialize, Serialize};

use crate::types::{AccountId, PublicKey};

/// Set once by `new`, never rewritten afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaucetConfig {
    pub account_suffix: String,
    pub min_difficulty: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    pub config: FaucetConfig,
    pub num_created_accounts: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationState {
    Reserved,
    Confirmed,
}

/// Membership entry of `created_accounts`. A record that is removed frees the
/// identifier; there is no terminal "failed" state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub account_id: AccountId,
    pub public_key: PublicKey,
    pub state: ReservationState,
}
