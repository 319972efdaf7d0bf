pub mod invariants;
pub mod store;
pub mod types;

pub use invariants::assert_counter_consistency;
pub use store::FaucetStore;
pub use types::{ContractState, FaucetConfig, ReservationRecord, ReservationState};
