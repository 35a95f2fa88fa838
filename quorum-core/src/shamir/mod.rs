// SPDX-FileCopyrightText: © 2026 PrivKey LLC
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Shamir secret sharing over GF(2^8).
//!
//! Each byte of the secret gets its own random polynomial of degree
//! `threshold - 1`. A share is the polynomial evaluations followed by a
//! single trailing byte holding the (non-zero) x-coordinate, so a share is
//! always one byte longer than the secret it protects.
//!
//! Reconstruction is deterministic and cannot tell a wrong-but-well-formed
//! share from a correct one. Callers must verify the combined secret.
mod field;

use rand::seq::SliceRandom;
use rand::RngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::error::{QuorumError, Result};
use field::Gf256;

/// Bytes a share adds on top of the secret length.
pub const SHARE_OVERHEAD: usize = 1;

/// Split `secret` into `parts` shares, any `threshold` of which recombine it.
pub fn split(secret: &[u8], threshold: u8, parts: u8) -> Result<Vec<Zeroizing<Vec<u8>>>> {
    if secret.is_empty() {
        return Err(QuorumError::InvalidConfig("cannot split an empty secret".into()));
    }
    if threshold < 2 {
        return Err(QuorumError::InvalidConfig("threshold must be at least 2".into()));
    }
    if parts < threshold {
        return Err(QuorumError::InvalidConfig(
            "parts cannot be less than threshold".into(),
        ));
    }

    let mut rng = rand::thread_rng();

    let mut x_coords: Vec<u8> = (1..=255).collect();
    x_coords.shuffle(&mut rng);
    x_coords.truncate(parts as usize);

    let mut shares: Vec<Zeroizing<Vec<u8>>> = x_coords
        .iter()
        .map(|&x| {
            let mut share = Zeroizing::new(vec![0u8; secret.len() + SHARE_OVERHEAD]);
            share[secret.len()] = x;
            share
        })
        .collect();

    let mut coeffs = vec![Gf256::ZERO; threshold as usize];
    let mut random = Zeroizing::new(vec![0u8; threshold as usize - 1]);

    for (index, &byte) in secret.iter().enumerate() {
        rng.fill_bytes(&mut random);
        coeffs[0] = Gf256::new(byte);
        for (c, &r) in coeffs.iter_mut().skip(1).zip(random.iter()) {
            *c = Gf256::new(r);
        }

        for (share, &x) in shares.iter_mut().zip(x_coords.iter()) {
            share[index] = Gf256::eval_polynomial(&coeffs, Gf256::new(x)).value();
        }
    }

    for c in coeffs.iter_mut() {
        *c = Gf256::ZERO;
    }
    x_coords.zeroize();

    Ok(shares)
}

/// Recombine a secret from shares produced by [`split`].
///
/// Every supplied share takes part in the interpolation, so the caller is
/// responsible for passing exactly the threshold it expects.
pub fn combine<S: AsRef<[u8]>>(parts: &[S]) -> Result<Zeroizing<Vec<u8>>> {
    if parts.len() < 2 {
        return Err(QuorumError::MalformedShares(
            "less than two parts cannot be used to reconstruct the secret".into(),
        ));
    }

    let first_len = parts[0].as_ref().len();
    if first_len < 1 + SHARE_OVERHEAD {
        return Err(QuorumError::MalformedShares("parts must be at least two bytes".into()));
    }

    let mut seen = [false; 256];
    let mut x_coords = Vec::with_capacity(parts.len());
    for part in parts {
        let part = part.as_ref();
        if part.len() != first_len {
            return Err(QuorumError::MalformedShares(
                "all parts must be the same length".into(),
            ));
        }

        let x = part[first_len - 1];
        if x == 0 {
            return Err(QuorumError::MalformedShares("zero x-coordinate".into()));
        }
        if seen[x as usize] {
            return Err(QuorumError::MalformedShares("duplicate part detected".into()));
        }
        seen[x as usize] = true;
        x_coords.push(Gf256::new(x));
    }

    let secret_len = first_len - SHARE_OVERHEAD;
    let mut secret = Zeroizing::new(vec![0u8; secret_len]);
    let mut points = vec![(Gf256::ZERO, Gf256::ZERO); parts.len()];

    for (index, out) in secret.iter_mut().enumerate() {
        for ((point, part), &x) in points.iter_mut().zip(parts).zip(x_coords.iter()) {
            *point = (x, Gf256::new(part.as_ref()[index]));
        }
        *out = Gf256::interpolate_at_zero(&points).value();
    }

    for point in points.iter_mut() {
        *point = (Gf256::ZERO, Gf256::ZERO);
    }

    Ok(secret)
}

/// The x-coordinate carried by a share, if it has one.
pub fn x_coordinate(share: &[u8]) -> Option<u8> {
    match share.last() {
        Some(&x) if share.len() > SHARE_OVERHEAD && x != 0 => Some(x),
        _ => None,
    }
}
