use serde::{Serialize, de::DeserializeOwned};

use crate::{
    error::FaucetError,
    host::{
        error::codec_error,
        ports::{StorageOp, StoragePort},
    },
    state::types::{ContractState, ReservationRecord, ReservationState},
    types::{AccountId, PublicKey},
};

pub const STATE_KEY: &str = "STATE";
pub const CREATED_ACCOUNTS_PREFIX: &str = "a:";

/// Typed accessors for the faucet's persistent state over a raw key-value port.
pub struct FaucetStore {
    storage: Box<dyn StoragePort>,
}

impl FaucetStore {
    pub fn new(storage: Box<dyn StoragePort>) -> Self {
        Self { storage }
    }

    pub fn is_initialized(&self) -> Result<bool, FaucetError> {
        Ok(self.storage.read(STATE_KEY)?.is_some())
    }

    pub fn load_state(&self) -> Result<ContractState, FaucetError> {
        self.read_json(STATE_KEY)?
            .ok_or(FaucetError::NotInitialized)
    }

    pub fn save_state(&mut self, state: &ContractState) -> Result<(), FaucetError> {
        self.write_json(STATE_KEY, state)
    }

    pub fn reservation(&self, account_id: &str) -> Result<Option<ReservationRecord>, FaucetError> {
        self.read_json(&account_key(account_id))
    }

    pub fn contains_account(&self, account_id: &str) -> Result<bool, FaucetError> {
        Ok(self.storage.read(&account_key(account_id))?.is_some())
    }

    pub fn insert_reservation(
        &mut self,
        account_id: &AccountId,
        public_key: &PublicKey,
    ) -> Result<ReservationRecord, FaucetError> {
        let record = ReservationRecord {
            account_id: account_id.clone(),
            public_key: *public_key,
            state: ReservationState::Reserved,
        };
        self.write_json(&account_key(account_id), &record)?;
        Ok(record)
    }

    /// Marks the record confirmed and stores the new counter in one batch.
    pub fn confirm_reservation(
        &mut self,
        record: &ReservationRecord,
        state: &ContractState,
    ) -> Result<(), FaucetError> {
        let confirmed = ReservationRecord {
            state: ReservationState::Confirmed,
            ..record.clone()
        };
        let key = account_key(&record.account_id);
        let record_bytes = encode_json(&key, &confirmed)?;
        let state_bytes = encode_json(STATE_KEY, state)?;
        self.storage.apply_batch(vec![
            StorageOp::Put {
                key,
                value: record_bytes,
            },
            StorageOp::Put {
                key: STATE_KEY.to_string(),
                value: state_bytes,
            },
        ])?;
        Ok(())
    }

    pub fn remove_reservation(&mut self, account_id: &str) -> Result<bool, FaucetError> {
        Ok(self.storage.remove(&account_key(account_id))?)
    }

    pub fn reservations(&self) -> Result<Vec<ReservationRecord>, FaucetError> {
        let mut records = Vec::new();
        for key in self.storage.keys_with_prefix(CREATED_ACCOUNTS_PREFIX)? {
            if let Some(record) = self.read_json::<ReservationRecord>(&key)? {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, FaucetError> {
        let Some(bytes) = self.storage.read(key)? else {
            return Ok(None);
        };
        let value = serde_json::from_slice(&bytes)
            .map_err(|err| codec_error(format!("failed to decode '{key}': {err}")))?;
        Ok(Some(value))
    }

    fn write_json<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), FaucetError> {
        let bytes = encode_json(key, value)?;
        self.storage.write(key, bytes)?;
        Ok(())
    }
}

fn encode_json<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>, FaucetError> {
    Ok(serde_json::to_vec(value)
        .map_err(|err| codec_error(format!("failed to encode '{key}': {err}")))?)
}

fn account_key(account_id: &str) -> String {
    format!("{CREATED_ACCOUNTS_PREFIX}{account_id}")
}
