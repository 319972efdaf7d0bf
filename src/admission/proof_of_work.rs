//! Proof-of-work digest layout shared with clients.
//!
//! The digest is SHA-256 over `account_id` as UTF-8, followed by the 33 raw
//! public key bytes, followed by `salt` as 8 little-endian bytes. Difficulty is
//! the number of leading zero bits of the digest, most significant bit first.

use crate::{
    host::ports::HashPort,
    types::{PUBLIC_KEY_LEN, PublicKey, Salt},
};

pub fn proof_of_work_message(account_id: &str, public_key: &PublicKey, salt: Salt) -> Vec<u8> {
    let mut message = Vec::with_capacity(account_id.len() + PUBLIC_KEY_LEN + 8);
    message.extend_from_slice(account_id.as_bytes());
    message.extend_from_slice(public_key.as_bytes());
    message.extend_from_slice(&salt.to_le_bytes());
    message
}

pub fn leading_zero_bits(digest: &[u8]) -> u32 {
    let mut count = 0;
    for byte in digest {
        if *byte == 0 {
            count += 8;
        } else {
            count += byte.leading_zeros();
            break;
        }
    }
    count
}

pub fn proof_of_work_difficulty(
    hasher: &dyn HashPort,
    account_id: &str,
    public_key: &PublicKey,
    salt: Salt,
) -> u32 {
    let digest = hasher.sha256(&proof_of_work_message(account_id, public_key, salt));
    leading_zero_bits(&digest)
}

/// Scans salts from `start_salt` until one meets `min_difficulty`.
pub fn find_salt(
    hasher: &dyn HashPort,
    account_id: &str,
    public_key: &PublicKey,
    min_difficulty: u32,
    start_salt: Salt,
    max_attempts: u64,
) -> Option<Salt> {
    let mut salt = start_salt;
    for _ in 0..max_attempts {
        if proof_of_work_difficulty(hasher, account_id, public_key, salt) >= min_difficulty {
            return Some(salt);
        }
        salt = salt.wrapping_add(1);
    }
    None
}
