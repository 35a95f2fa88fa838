#![forbid(unsafe_code)]

use blake2::{Blake2b512, Digest};
use rand::RngCore;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// BLAKE2b-512 over the concatenation of `parts`, truncated to 32 bytes.
pub fn blake2b_256_parts(parts: &[&[u8]]) -> [u8; 32] {
    let mut hasher = Blake2b512::new();
    for part in parts {
        hasher.update(part);
    }
    let result = hasher.finalize();

    let mut output = [0u8; 32];
    output.copy_from_slice(&result[..32]);
    output
}

pub fn random_bytes<const N: usize>() -> [u8; N] {
    let mut bytes = [0u8; N];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

pub fn random_vec(len: usize) -> Zeroizing<Vec<u8>> {
    let mut bytes = Zeroizing::new(vec![0u8; len]);
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
}

/// Length-checked constant-time comparison.
pub fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}
