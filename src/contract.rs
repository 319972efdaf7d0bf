use std::sync::Arc;

use crate::{
    admission::AdmissionController,
    error::{FaucetError, reservation_conflict},
    host::{
        error::CreationError,
        ports::{HashPort, StoragePort},
    },
    orchestrator::types::{CreationOutcome, PendingCreation},
    state::{
        store::FaucetStore,
        types::{ContractState, FaucetConfig, ReservationState},
    },
    types::CreationRequest,
};

/// Deterministic faucet state machine. Every entry point reads and writes
/// state through the storage port; nothing is cached between calls.
pub struct FaucetContract {
    store: FaucetStore,
    admission: AdmissionController,
}

impl FaucetContract {
    pub fn new(storage: Box<dyn StoragePort>, hasher: Arc<dyn HashPort>) -> Self {
        Self {
            store: FaucetStore::new(storage),
            admission: AdmissionController::new(hasher),
        }
    }

    pub fn store(&self) -> &FaucetStore {
        &self.store
    }

    pub fn admission(&self) -> &AdmissionController {
        &self.admission
    }

    pub fn is_initialized(&self) -> Result<bool, FaucetError> {
        self.store.is_initialized()
    }

    /// One-time initializer.
    pub fn initialize(
        &mut self,
        account_suffix: impl Into<String>,
        min_difficulty: u32,
    ) -> Result<(), FaucetError> {
        if self.store.is_initialized()? {
            return Err(FaucetError::AlreadyInitialized);
        }

        let account_suffix = account_suffix.into();
        if account_suffix.is_empty() {
            return Err(FaucetError::InvalidConfig(
                "account_suffix must not be empty".to_string(),
            ));
        }

        let state = ContractState {
            config: FaucetConfig {
                account_suffix,
                min_difficulty,
            },
            num_created_accounts: 0,
        };
        self.store.save_state(&state)?;
        tracing::info!(
            target: "faucet.contract",
            account_suffix = %state.config.account_suffix,
            min_difficulty = state.config.min_difficulty,
            "faucet_initialized"
        );
        Ok(())
    }

    pub fn get_account_suffix(&self) -> Result<String, FaucetError> {
        Ok(self.store.load_state()?.config.account_suffix)
    }

    pub fn get_min_difficulty(&self) -> Result<u32, FaucetError> {
        Ok(self.store.load_state()?.config.min_difficulty)
    }

    pub fn get_num_created_accounts(&self) -> Result<u64, FaucetError> {
        Ok(self.store.load_state()?.num_created_accounts)
    }

    pub fn get_account_state(
        &self,
        account_id: &str,
    ) -> Result<Option<ReservationState>, FaucetError> {
        self.store.load_state()?;
        Ok(self
            .store
            .reservation(account_id)?
            .map(|record| record.state))
    }

    /// Admits the request and writes its reservation. Rejections leave state
    /// untouched.
    pub fn begin_creation(
        &mut self,
        request: CreationRequest,
    ) -> Result<PendingCreation, FaucetError> {
        let state = self.store.load_state()?;
        let admitted = match self.admission.validate(request, &state.config, &self.store) {
            Ok(admitted) => admitted,
            Err(err) => {
                tracing::info!(
                    target: "faucet.contract",
                    error = %err,
                    "creation_rejected"
                );
                return Err(err);
            }
        };

        let difficulty = admitted.difficulty();
        let request = admitted.into_request();
        self.store
            .insert_reservation(&request.account_id, &request.public_key)?;
        tracing::info!(
            target: "faucet.contract",
            account_id = %request.account_id,
            difficulty = difficulty,
            "account_reserved"
        );

        Ok(PendingCreation::new(
            request.account_id,
            request.public_key,
            difficulty,
        ))
    }

    /// Reconciliation continuation for a dispatched creation.
    pub fn on_account_created(
        &mut self,
        pending: PendingCreation,
        result: Result<(), CreationError>,
    ) -> Result<CreationOutcome, FaucetError> {
        self.settle_creation(&pending, &result)
    }

    /// Confirms or rolls back the reservation behind `pending`. Each branch
    /// commits a single storage mutation, so a storage failure leaves the
    /// reservation `Reserved` and the call can be repeated with the same
    /// ticket.
    pub fn settle_creation(
        &mut self,
        pending: &PendingCreation,
        result: &Result<(), CreationError>,
    ) -> Result<CreationOutcome, FaucetError> {
        let account_id = pending.account_id().clone();
        let record = self
            .store
            .reservation(&account_id)?
            .ok_or_else(|| reservation_conflict(&account_id, "reservation is missing"))?;
        if record.state != ReservationState::Reserved {
            return Err(reservation_conflict(
                &account_id,
                "reservation is already confirmed",
            ));
        }
        if record.public_key != *pending.public_key() {
            return Err(reservation_conflict(
                &account_id,
                "reservation is bound to a different public key",
            ));
        }

        match result {
            Ok(()) => {
                let mut state = self.store.load_state()?;
                state.num_created_accounts =
                    state.num_created_accounts.checked_add(1).ok_or_else(|| {
                        FaucetError::InvariantViolation(
                            "num_created_accounts overflowed".to_string(),
                        )
                    })?;
                self.store.confirm_reservation(&record, &state)?;
                tracing::info!(
                    target: "faucet.contract",
                    account_id = %account_id,
                    num_created_accounts = state.num_created_accounts,
                    "account_created"
                );
                Ok(CreationOutcome::Created { account_id })
            }
            Err(err) => {
                self.store.remove_reservation(&account_id)?;
                let error = FaucetError::CreationSideEffectFailed {
                    account_id: account_id.clone(),
                    reason: err.message.clone(),
                };
                tracing::warn!(
                    target: "faucet.contract",
                    account_id = %account_id,
                    error = %error,
                    "account_creation_rolled_back"
                );
                Ok(CreationOutcome::RolledBack { account_id, error })
            }
        }
    }
}
