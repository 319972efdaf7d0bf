use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use pow_faucet::{
    FaucetRuntime,
    config::Config,
    host::AlwaysCreateAccounts,
    state::ReservationState,
};
use uuid::Uuid;

use crate::support::ZERO_KEY;

const SCHEMA: &str = include_str!("../../faucet.schema.json");

fn write_config(dir: &Path, min_difficulty: u32) -> PathBuf {
    fs::create_dir_all(dir).expect("temp dir should exist");
    fs::write(dir.join("faucet.schema.json"), SCHEMA).expect("schema should be written");
    let path = dir.join("faucet.jsonc");
    fs::write(
        &path,
        format!(
            r#"{{
                faucet: {{ account_suffix: ".faucet", min_difficulty: {min_difficulty} }},
                storage: {{ state_path: "state/faucet.json" }},
            }}"#
        ),
    )
    .expect("config should be written");
    path
}

#[tokio::test]
async fn given_file_state_when_runtime_restarts_then_config_and_accounts_survive() {
    let dir = std::env::temp_dir().join(format!("pow-faucet-it-{}", Uuid::now_v7()));
    let config = Config::load(&write_config(&dir, 0)).expect("config loads");

    {
        let faucet = FaucetRuntime::bootstrap(&config, Arc::new(AlwaysCreateAccounts))
            .await
            .expect("bootstrap initializes state");
        faucet
            .create_account("test.faucet", &ZERO_KEY, 0)
            .await
            .expect("create succeeds");
    }
    assert!(config.storage.state_path.exists());

    let changed = Config::load(&write_config(&dir, 12)).expect("config loads");
    let faucet = FaucetRuntime::bootstrap(&changed, Arc::new(AlwaysCreateAccounts))
        .await
        .expect("bootstrap reopens state");

    assert_eq!(faucet.get_account_suffix().await.expect("view"), ".faucet");
    assert_eq!(
        faucet.get_min_difficulty().await.expect("view"),
        0,
        "stored config is immutable across restarts"
    );
    assert_eq!(faucet.get_num_created_accounts().await.expect("view"), 1);
    assert_eq!(
        faucet.get_account_state("test.faucet").await.expect("view"),
        Some(ReservationState::Confirmed)
    );

    let err = faucet
        .create_account("test.faucet", &ZERO_KEY, 0)
        .await
        .expect_err("duplicate after restart");
    assert_eq!(err.kind(), pow_faucet::FaucetErrorKind::AlreadyCreated);

    let _ = fs::remove_dir_all(&dir);
}

// The only test in this binary that installs the global subscriber.
#[tokio::test]
async fn given_logging_config_when_bootstrapped_with_logging_then_events_reach_the_log_dir() {
    let dir = std::env::temp_dir().join(format!("pow-faucet-it-{}", Uuid::now_v7()));
    let mut config = Config::load(&write_config(&dir, 0)).expect("config loads");
    config.logging.stderr_warn_enabled = false;

    let (faucet, guard) =
        FaucetRuntime::bootstrap_with_logging(&config, Arc::new(AlwaysCreateAccounts))
            .await
            .expect("logging and state initialize");
    assert!(!guard.run_id().is_empty());
    assert_eq!(guard.log_dir(), config.logging.dir.as_path());
    faucet
        .create_account("logged.faucet", &ZERO_KEY, 0)
        .await
        .expect("create succeeds");

    let second =
        FaucetRuntime::bootstrap_with_logging(&config, Arc::new(AlwaysCreateAccounts)).await;
    let err = match second {
        Ok(_) => panic!("a second subscriber must be refused"),
        Err(err) => err,
    };
    assert!(
        format!("{err:#}").contains("failed to initialize tracing subscriber"),
        "{err:#}"
    );

    drop(guard);
    let logged: String = fs::read_dir(&config.logging.dir)
        .expect("log dir exists")
        .map(|entry| entry.expect("log entry").path())
        .filter(|path| path.is_file())
        .map(|path| fs::read_to_string(path).expect("log file is readable"))
        .collect();
    assert!(logged.contains("faucet_runtime_started"), "{logged}");
    assert!(logged.contains("account_created"), "{logged}");

    let _ = fs::remove_dir_all(&dir);
}
