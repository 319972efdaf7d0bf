use sha2::{Digest, Sha256};

use crate::host::ports::HashPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Hasher;

impl HashPort for Sha256Hasher {
    fn sha256(&self, data: &[u8]) -> [u8; 32] {
        Sha256::digest(data).into()
    }
}
