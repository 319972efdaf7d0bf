pub mod adapters;
pub mod error;
pub mod noop;
pub mod ports;

pub use adapters::{FileStorage, InMemoryStorage, Sha256Hasher};
pub use error::{CreationError, StorageError, StorageErrorKind};
pub use noop::AlwaysCreateAccounts;
pub use ports::{AccountCreatorPort, HashPort, StorageOp, StoragePort};
