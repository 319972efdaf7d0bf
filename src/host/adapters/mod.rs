pub mod file;
pub mod memory;
pub mod sha256;

pub use file::FileStorage;
pub use memory::InMemoryStorage;
pub use sha256::Sha256Hasher;
