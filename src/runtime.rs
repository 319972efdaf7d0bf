use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::Mutex;

use crate::{
    config::Config,
    contract::FaucetContract,
    error::FaucetError,
    host::{
        adapters::{FileStorage, Sha256Hasher},
        ports::{AccountCreatorPort, HashPort, StoragePort},
    },
    logging::{LoggingGuard, init_tracing},
    orchestrator::{CreationOrchestrator, CreationOutcome},
    state::types::ReservationState,
    types::{CreationRequest, PublicKey, Salt},
};

/// The faucet's external call surface, shared between concurrent callers.
#[derive(Clone)]
pub struct FaucetRuntime {
    contract: Arc<Mutex<FaucetContract>>,
    orchestrator: CreationOrchestrator,
}

impl FaucetRuntime {
    pub fn new(
        storage: Box<dyn StoragePort>,
        hasher: Arc<dyn HashPort>,
        creator: Arc<dyn AccountCreatorPort>,
    ) -> Self {
        let contract = Arc::new(Mutex::new(FaucetContract::new(storage, hasher)));
        let orchestrator = CreationOrchestrator::new(Arc::clone(&contract), creator);
        Self {
            contract,
            orchestrator,
        }
    }

    /// Opens file-backed state and runs `new` from config when the state is empty.
    pub async fn bootstrap(config: &Config, creator: Arc<dyn AccountCreatorPort>) -> Result<Self> {
        let storage = FileStorage::open(&config.storage.state_path).with_context(|| {
            format!(
                "failed to open faucet state {}",
                config.storage.state_path.display()
            )
        })?;
        let runtime = Self::new(Box::new(storage), Arc::new(Sha256Hasher), creator);

        let mut contract = runtime.contract.lock().await;
        if contract.is_initialized()? {
            let state = contract.store().load_state()?;
            if state.config.account_suffix != config.faucet.account_suffix
                || state.config.min_difficulty != config.faucet.min_difficulty
            {
                tracing::warn!(
                    target: "faucet.contract",
                    stored_suffix = %state.config.account_suffix,
                    stored_min_difficulty = state.config.min_difficulty,
                    configured_suffix = %config.faucet.account_suffix,
                    configured_min_difficulty = config.faucet.min_difficulty,
                    "stored_config_differs_from_file"
                );
            }
        } else {
            contract
                .initialize(
                    config.faucet.account_suffix.clone(),
                    config.faucet.min_difficulty,
                )
                .context("failed to initialize faucet from config")?;
        }
        drop(contract);

        Ok(runtime)
    }

    /// Installs the tracing subscriber from `config.logging`, then bootstraps.
    /// The returned guard must outlive the runtime for file logs to flush.
    pub async fn bootstrap_with_logging(
        config: &Config,
        creator: Arc<dyn AccountCreatorPort>,
    ) -> Result<(Self, LoggingGuard)> {
        let guard = init_tracing(&config.logging).context("failed to initialize faucet logging")?;
        let runtime = Self::bootstrap(config, creator).await?;
        tracing::info!(
            target: "faucet.runtime",
            run_id = %guard.run_id(),
            state_path = %config.storage.state_path.display(),
            "faucet_runtime_started"
        );
        Ok((runtime, guard))
    }

    pub fn contract(&self) -> Arc<Mutex<FaucetContract>> {
        Arc::clone(&self.contract)
    }

    pub async fn initialize(
        &self,
        account_suffix: impl Into<String>,
        min_difficulty: u32,
    ) -> Result<(), FaucetError> {
        self.contract
            .lock()
            .await
            .initialize(account_suffix, min_difficulty)
    }

    pub async fn get_account_suffix(&self) -> Result<String, FaucetError> {
        self.contract.lock().await.get_account_suffix()
    }

    pub async fn get_min_difficulty(&self) -> Result<u32, FaucetError> {
        self.contract.lock().await.get_min_difficulty()
    }

    pub async fn get_num_created_accounts(&self) -> Result<u64, FaucetError> {
        self.contract.lock().await.get_num_created_accounts()
    }

    pub async fn get_account_state(
        &self,
        account_id: &str,
    ) -> Result<Option<ReservationState>, FaucetError> {
        self.contract.lock().await.get_account_state(account_id)
    }

    /// Accepts the public key as untyped bytes, the way callers submit it.
    pub async fn create_account(
        &self,
        account_id: impl Into<String>,
        public_key: &[u8],
        salt: Salt,
    ) -> Result<CreationOutcome, FaucetError> {
        let public_key = PublicKey::try_from(public_key)?;
        self.orchestrator
            .create(CreationRequest::new(account_id, public_key, salt))
            .await
    }
}
