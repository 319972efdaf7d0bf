pub mod creation;
pub mod types;

pub use creation::CreationOrchestrator;
pub use types::{CreationOutcome, PendingCreation};
