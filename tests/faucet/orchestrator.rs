use std::{sync::Arc, time::Duration};

use pow_faucet::{
    FaucetErrorKind,
    host::CreationError,
    orchestrator::CreationOutcome,
    state::{ReservationState, assert_counter_consistency},
    types::PublicKey,
};

use crate::support::{
    FailingCreator, GatedCreator, RecordingCreator, ZERO_KEY, runtime_with, wait_for_state,
};

#[tokio::test]
async fn given_side_effect_failure_when_reconciled_then_reservation_is_released_and_retry_admitted() {
    let faucet = runtime_with(Arc::new(FailingCreator));
    faucet.initialize(".faucet", 0).await.expect("init");

    let outcome = faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect("rollback is not a caller error");
    match &outcome {
        CreationOutcome::RolledBack { account_id, error } => {
            assert_eq!(account_id, "test.faucet");
            assert_eq!(error.kind(), FaucetErrorKind::CreationSideEffectFailed);
            assert!(error.to_string().contains("already exists"));
        }
        other => panic!("expected rollback, got {other:?}"),
    }
    assert_eq!(faucet.get_account_state("test.faucet").await.expect("view"), None);
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 0);

    let retry = faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect("retry is admitted");
    assert!(!retry.is_created(), "the failing creator fails again");
}

#[tokio::test]
async fn given_creation_in_flight_when_same_id_requested_then_already_created() {
    let (creator, mut dispatched) = GatedCreator::new();
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");
    let release = creator.gate("test.faucet").await;

    let first = tokio::spawn({
        let faucet = faucet.clone();
        async move { faucet.create_account("test.faucet", &ZERO_KEY, 0).await }
    });
    assert_eq!(dispatched.recv().await.as_deref(), Some("test.faucet"));

    assert_eq!(
        faucet.get_account_state("test.faucet").await.expect("view"),
        Some(ReservationState::Reserved)
    );
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 0);

    let err = faucet
        .create_account("test.faucet", &ZERO_KEY, 1)
        .await
        .expect_err("reservation blocks a concurrent request");
    assert_eq!(err.kind(), FaucetErrorKind::AlreadyCreated);

    release.send(Ok(())).expect("first call is waiting on the gate");
    let outcome = first
        .await
        .expect("task joins")
        .expect("first call succeeds");
    assert!(outcome.is_created());
    assert_eq!(
        faucet.get_account_state("test.faucet").await.expect("view"),
        Some(ReservationState::Confirmed)
    );
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 1);
}

#[tokio::test]
async fn given_in_flight_failure_when_gate_reports_error_then_identifier_becomes_free() {
    let (creator, mut dispatched) = GatedCreator::new();
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");
    let release = creator.gate("test.faucet").await;

    let first = tokio::spawn({
        let faucet = faucet.clone();
        async move { faucet.create_account("test.faucet", &ZERO_KEY, 0).await }
    });
    dispatched.recv().await.expect("creation dispatched");

    release
        .send(Err(CreationError::new("insufficient balance")))
        .expect("first call is waiting on the gate");
    let outcome = first.await.expect("task joins").expect("reconciled");
    assert!(!outcome.is_created());

    let retry = faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect("retry is admitted");
    assert!(retry.is_created());
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 1);
}

#[tokio::test]
async fn given_distinct_ids_in_flight_when_all_complete_then_counter_matches_confirmed_set() {
    let (creator, mut dispatched) = GatedCreator::new();
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");

    let ids = ["a.faucet", "b.faucet", "c.faucet"];
    let mut releases = Vec::new();
    let mut tasks = Vec::new();
    for account_id in ids {
        releases.push(creator.gate(account_id).await);
        tasks.push(tokio::spawn({
            let faucet = faucet.clone();
            async move { faucet.create_account(account_id, &ZERO_KEY, 0).await }
        }));
    }
    for _ in ids {
        dispatched.recv().await.expect("creation dispatched");
    }

    let mut results = releases.into_iter();
    results
        .next()
        .expect("a")
        .send(Ok(()))
        .expect("gate open");
    results
        .next()
        .expect("b")
        .send(Err(CreationError::new("rejected by host")))
        .expect("gate open");
    results
        .next()
        .expect("c")
        .send(Ok(()))
        .expect("gate open");

    let mut created = 0;
    for task in tasks {
        if task.await.expect("task joins").expect("reconciled").is_created() {
            created += 1;
        }
    }
    assert_eq!(created, 2);
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 2);
    assert_eq!(faucet.get_account_state("b.faucet").await.expect("view"), None);

    let contract = faucet.contract();
    let contract = contract.lock().await;
    assert_counter_consistency(contract.store()).expect("counter matches confirmed records");
}

#[tokio::test]
async fn given_admitted_request_when_dispatched_then_creator_receives_id_and_key() {
    let creator = Arc::new(RecordingCreator::default());
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");

    let mut key = [0u8; 33];
    key[0] = 0x02;
    key[32] = 0xff;
    faucet
        .create_account("keyed.faucet", &key, 7)
        .await
        .expect("create succeeds");

    let calls = creator.calls.lock().await;
    assert_eq!(
        calls.as_slice(),
        &[("keyed.faucet".to_string(), PublicKey::new(key))]
    );
}

#[tokio::test]
async fn given_rejected_request_when_validated_then_creator_is_never_called() {
    let creator = Arc::new(RecordingCreator::default());
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 30).await.expect("init");

    faucet
        .create_account("bob", &ZERO_KEY, 0)
        .await
        .expect_err("no suffix");
    faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect_err("work too weak");

    assert!(creator.calls.lock().await.is_empty());
}

#[tokio::test]
async fn given_caller_times_out_when_creation_later_fails_then_reservation_is_released() {
    let (creator, mut dispatched) = GatedCreator::new();
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");
    let release = creator.gate("test.faucet").await;

    let timed_out = tokio::time::timeout(
        Duration::from_millis(20),
        faucet.create_account("test.faucet", &ZERO_KEY, 0),
    )
    .await;
    assert!(timed_out.is_err(), "the caller stops waiting");
    assert_eq!(dispatched.recv().await.as_deref(), Some("test.faucet"));
    assert_eq!(
        faucet.get_account_state("test.faucet").await.expect("view"),
        Some(ReservationState::Reserved)
    );

    release
        .send(Err(CreationError::new("rejected by host")))
        .expect("detached creation is waiting on the gate");
    wait_for_state(&faucet, "test.faucet", None).await;
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 0);

    let retry = faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect("retry is admitted");
    assert!(retry.is_created());
}

#[tokio::test]
async fn given_caller_aborted_when_creation_later_succeeds_then_account_is_counted() {
    let (creator, mut dispatched) = GatedCreator::new();
    let faucet = runtime_with(creator.clone());
    faucet.initialize(".faucet", 0).await.expect("init");
    let release = creator.gate("test.faucet").await;

    let caller = tokio::spawn({
        let faucet = faucet.clone();
        async move { faucet.create_account("test.faucet", &ZERO_KEY, 0).await }
    });
    dispatched.recv().await.expect("creation dispatched");
    caller.abort();
    assert!(caller.await.expect_err("caller was aborted").is_cancelled());

    release
        .send(Ok(()))
        .expect("detached creation is waiting on the gate");
    wait_for_state(&faucet, "test.faucet", Some(ReservationState::Confirmed)).await;
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 1);

    let contract = faucet.contract();
    let contract = contract.lock().await;
    assert_counter_consistency(contract.store()).expect("counter matches confirmed records");
}
