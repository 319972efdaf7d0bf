use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::Instrument;

use crate::{
    contract::FaucetContract,
    error::{FaucetError, FaucetErrorKind},
    host::{error::CreationError, ports::AccountCreatorPort},
    orchestrator::types::{CreationOutcome, PendingCreation},
    types::CreationRequest,
};

const SETTLE_ATTEMPTS: u32 = 4;
const SETTLE_BACKOFF: Duration = Duration::from_millis(10);

/// Drives one creation: admission and reservation under the contract lock,
/// the side effect outside it, then reconciliation under the lock again.
///
/// Once a reservation exists, dispatch and reconciliation run on a detached
/// task, so a caller that stops waiting cannot strand the reservation.
#[derive(Clone)]
pub struct CreationOrchestrator {
    contract: Arc<Mutex<FaucetContract>>,
    creator: Arc<dyn AccountCreatorPort>,
}

impl CreationOrchestrator {
    pub fn new(contract: Arc<Mutex<FaucetContract>>, creator: Arc<dyn AccountCreatorPort>) -> Self {
        Self { contract, creator }
    }

    #[tracing::instrument(
        name = "faucet_create",
        target = "faucet.orchestrator",
        skip(self, request),
        fields(account_id = %request.account_id)
    )]
    pub async fn create(&self, request: CreationRequest) -> Result<CreationOutcome, FaucetError> {
        let pending = self.contract.lock().await.begin_creation(request)?;
        let account_id = pending.account_id().clone();

        let contract = Arc::clone(&self.contract);
        let creator = Arc::clone(&self.creator);
        let dispatch = async move {
            tracing::debug!(
                target: "faucet.orchestrator",
                account_id = %pending.account_id(),
                "creation_dispatched"
            );
            let result = creator
                .create_account(pending.account_id(), pending.public_key())
                .await;
            settle_with_retry(&contract, pending, result).await
        };
        let handle = tokio::spawn(dispatch.in_current_span());

        let reconciled = match handle.await {
            Ok(reconciled) => reconciled,
            Err(err) => Err(FaucetError::Internal(format!(
                "creation task for '{account_id}' did not complete: {err}"
            ))),
        };
        if let Err(err) = &reconciled {
            tracing::error!(
                target: "faucet.orchestrator",
                account_id = %account_id,
                error = %err,
                "creation_reconciliation_failed"
            );
        }
        reconciled
    }
}

/// Storage failures leave the reservation untouched, so settling again with
/// the same ticket is safe. Other errors are final.
async fn settle_with_retry(
    contract: &Mutex<FaucetContract>,
    pending: PendingCreation,
    result: Result<(), CreationError>,
) -> Result<CreationOutcome, FaucetError> {
    let mut attempt = 1;
    loop {
        let settled = contract.lock().await.settle_creation(&pending, &result);
        match settled {
            Err(err) if err.kind() == FaucetErrorKind::Storage && attempt < SETTLE_ATTEMPTS => {
                tracing::warn!(
                    target: "faucet.orchestrator",
                    account_id = %pending.account_id(),
                    attempt = attempt,
                    error = %err,
                    "creation_settle_retry"
                );
                tokio::time::sleep(SETTLE_BACKOFF * attempt).await;
                attempt += 1;
            }
            settled => return settled,
        }
    }
}
