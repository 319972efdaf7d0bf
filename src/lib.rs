pub mod admission;
pub mod config;
pub mod contract;
pub mod error;
pub mod host;
pub mod logging;
pub mod orchestrator;
pub mod runtime;
pub mod state;
pub mod types;

pub use contract::FaucetContract;
pub use error::{FaucetError, FaucetErrorKind};
pub use runtime::FaucetRuntime;
