use std::sync::Arc;

use crate::{
    admission::proof_of_work::proof_of_work_difficulty,
    error::FaucetError,
    host::ports::HashPort,
    state::{store::FaucetStore, types::FaucetConfig},
    types::CreationRequest,
};

/// Read-only view of `created_accounts` used by the duplicate check.
pub trait CreatedAccountIndex {
    fn contains(&self, account_id: &str) -> Result<bool, FaucetError>;
}

impl CreatedAccountIndex for FaucetStore {
    fn contains(&self, account_id: &str) -> Result<bool, FaucetError> {
        self.contains_account(account_id)
    }
}

/// A request that passed every admission check. Only the controller builds one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmittedRequest {
    request: CreationRequest,
    difficulty: u32,
}

impl AdmittedRequest {
    pub fn request(&self) -> &CreationRequest {
        &self.request
    }

    pub fn difficulty(&self) -> u32 {
        self.difficulty
    }

    pub fn into_request(self) -> CreationRequest {
        self.request
    }
}

#[derive(Clone)]
pub struct AdmissionController {
    hasher: Arc<dyn HashPort>,
}

impl AdmissionController {
    pub fn new(hasher: Arc<dyn HashPort>) -> Self {
        Self { hasher }
    }

    pub fn hasher(&self) -> &dyn HashPort {
        self.hasher.as_ref()
    }

    pub fn validate(
        &self,
        request: CreationRequest,
        config: &FaucetConfig,
        created: &dyn CreatedAccountIndex,
    ) -> Result<AdmittedRequest, FaucetError> {
        if !request.account_id.ends_with(&config.account_suffix) {
            return Err(FaucetError::InvalidSuffix {
                account_id: request.account_id,
                suffix: config.account_suffix.clone(),
            });
        }

        if created.contains(&request.account_id)? {
            return Err(FaucetError::AlreadyCreated {
                account_id: request.account_id,
            });
        }

        let difficulty = proof_of_work_difficulty(
            self.hasher.as_ref(),
            &request.account_id,
            &request.public_key,
            request.salt,
        );
        if difficulty < config.min_difficulty {
            return Err(FaucetError::WorkTooWeak {
                difficulty,
                min_difficulty: config.min_difficulty,
            });
        }

        tracing::debug!(
            target: "faucet.admission",
            account_id = %request.account_id,
            difficulty = difficulty,
            min_difficulty = config.min_difficulty,
            "request_admitted"
        );
        Ok(AdmittedRequest {
            request,
            difficulty,
        })
    }
}
