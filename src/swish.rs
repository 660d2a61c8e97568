//! Container codec — the two outer protection layers of a save file.
//!
//! # File layout
//! ```text
//! [ block ]*  [ SHA-256 hash (32 B) ]
//! ```
//! The pre-hash region is the concatenation of every encoded block (see
//! `block.rs`), additionally XOR-scrambled against a fixed 128-byte pad.
//! The trailing hash is SHA-256 over a fixed 64-byte intro constant, the
//! scrambled payload, and a fixed 64-byte outro constant.
//!
//! # Static pad period
//! The pad repeats every 127 bytes, not 128: each chunk is XORed against
//! the pad's first 127 bytes, and the pad's final byte never closes a
//! chunk.  Applying the pad twice is the identity (XOR involution).
//!
//! # Round-trip contract
//! `decrypt(encrypt(blocks)) == blocks` for any legal sequence, and
//! `encrypt(decrypt(file)) == file` byte-for-byte when no block was
//! mutated — the basis of the hash-repair operation.

use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::block::{read_block, write_block, Block, BlockError};

/// Byte length of the trailing integrity hash.
pub const SIZE_HASH: usize = 32;

const INTRO_HASH_BYTES: [u8; 64] = [
    0x9E, 0xC9, 0x9C, 0xD7, 0x0E, 0xD3, 0x3C, 0x44, 0xFB, 0x93, 0x03, 0xDC, 0xEB, 0x39, 0xB4, 0x2A,
    0x19, 0x47, 0xE9, 0x63, 0x4B, 0xA2, 0x33, 0x44, 0x16, 0xBF, 0x82, 0xA2, 0xBA, 0x63, 0x55, 0xB6,
    0x3D, 0x9D, 0xF2, 0x4B, 0x5F, 0x7B, 0x6A, 0xB2, 0x62, 0x1D, 0xC2, 0x1B, 0x68, 0xE5, 0xC8, 0xB5,
    0x3A, 0x05, 0x90, 0x00, 0xE8, 0xA8, 0x10, 0x3D, 0xE2, 0xEC, 0xF0, 0x0C, 0xB2, 0xED, 0x4F, 0x6D,
];

const OUTRO_HASH_BYTES: [u8; 64] = [
    0xD6, 0xC0, 0x1C, 0x59, 0x8B, 0xC8, 0xB8, 0xCB, 0x46, 0xE1, 0x53, 0xFC, 0x82, 0x8C, 0x75, 0x75,
    0x13, 0xE0, 0x45, 0xDF, 0x32, 0x69, 0x3C, 0x75, 0xF0, 0x59, 0xF8, 0xD9, 0xA2, 0x5F, 0xB2, 0x17,
    0xE0, 0x80, 0x52, 0xDB, 0xEA, 0x89, 0x73, 0x99, 0x75, 0x79, 0xAF, 0xCB, 0x2E, 0x80, 0x07, 0xE6,
    0xF1, 0x26, 0xE0, 0x03, 0x0A, 0xE6, 0x6F, 0xF6, 0x41, 0xBF, 0x7E, 0x59, 0xC2, 0xAE, 0x55, 0xFD,
];

// Last byte is zero and is never used as a period boundary; see module docs.
const STATIC_XORPAD: [u8; 128] = [
    0xA0, 0x92, 0xD1, 0x06, 0x07, 0xDB, 0x32, 0xA1, 0xAE, 0x01, 0xF5, 0xC5, 0x1E, 0x84, 0x4F, 0xE3,
    0x53, 0xCA, 0x37, 0xF4, 0xA7, 0xB0, 0x4D, 0xA0, 0x18, 0xB7, 0xC2, 0x97, 0xDA, 0x5F, 0x53, 0x2B,
    0x75, 0xFA, 0x48, 0x16, 0xF8, 0xD4, 0x8A, 0x6F, 0x61, 0x05, 0xF4, 0xE2, 0xFD, 0x04, 0xB5, 0xA3,
    0x0F, 0xFC, 0x44, 0x92, 0xCB, 0x32, 0xE6, 0x1B, 0xB9, 0xB1, 0x2E, 0x01, 0xB0, 0x56, 0x53, 0x36,
    0xD2, 0xD1, 0x50, 0x3D, 0xDE, 0x5B, 0x2E, 0x0E, 0x52, 0xFD, 0xDF, 0x2F, 0x7B, 0xCA, 0x63, 0x50,
    0xA4, 0x67, 0x5D, 0x23, 0x17, 0xC0, 0x52, 0xE1, 0xA6, 0x30, 0x7C, 0x2B, 0xB6, 0x70, 0x36, 0x5B,
    0x2A, 0x27, 0x69, 0x33, 0xF5, 0x63, 0x7B, 0x36, 0x3F, 0x26, 0x9B, 0xA3, 0xED, 0x7A, 0x53, 0x00,
    0xA4, 0x48, 0xB3, 0x50, 0x9E, 0x14, 0xA0, 0x52, 0xDE, 0x7E, 0x10, 0x2B, 0x1B, 0x77, 0x6E, 0x00,
];

#[derive(Error, Debug, PartialEq, Eq)]
pub enum SwishError {
    /// The trailing hash does not match the file's contents.
    #[error("file hash does not match its contents")]
    HashMismatch,
    #[error(transparent)]
    Block(#[from] BlockError),
}

// ── Integrity hash ───────────────────────────────────────────────────────────

/// SHA-256 over `intro ‖ payload ‖ outro`.
pub fn compute_hash(payload: &[u8]) -> [u8; SIZE_HASH] {
    let mut sha = Sha256::new();
    sha.update(INTRO_HASH_BYTES);
    sha.update(payload);
    sha.update(OUTRO_HASH_BYTES);
    sha.finalize().into()
}

/// Check the file's trailing hash.  Files shorter than the hash itself are
/// never valid.
pub fn is_hash_valid(data: &[u8]) -> bool {
    if data.len() < SIZE_HASH {
        return false;
    }
    let (payload, stored) = data.split_at(data.len() - SIZE_HASH);
    compute_hash(payload) == stored
}

/// [`is_hash_valid`] as a hard precondition check.
pub fn verify(data: &[u8]) -> Result<(), SwishError> {
    if is_hash_valid(data) {
        Ok(())
    } else {
        Err(SwishError::HashMismatch)
    }
}

// ── Static scrambling layer ──────────────────────────────────────────────────

/// Apply the static pad in place, with its off-by-one repeat period.
/// Self-inverse: applying twice restores the input.
fn apply_static_xorpad(data: &mut [u8]) {
    let period = STATIC_XORPAD.len() - 1; // 0x7F, not 0x80
    for chunk in data.chunks_mut(period) {
        for (byte, pad) in chunk.iter_mut().zip(&STATIC_XORPAD) {
            *byte ^= pad;
        }
    }
}

// ── Container decode / encode ────────────────────────────────────────────────

/// Decode the full block stream of a scrambled (but pad-free and hash-free)
/// payload.  The offset must land exactly on the buffer's end; a leftover
/// partial block is a decode failure.
pub fn read_blocks(data: &[u8]) -> Result<Vec<Block>, BlockError> {
    let mut blocks = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        blocks.push(read_block(data, &mut offset)?);
    }
    Ok(blocks)
}

/// Unscramble a save file and decode its block sequence.
///
/// The caller is expected to have checked [`is_hash_valid`] already; this
/// operation does not re-verify the hash.
pub fn decrypt(data: &[u8]) -> Result<Vec<Block>, SwishError> {
    if data.len() < SIZE_HASH {
        return Err(BlockError::Truncated("hash trailer").into());
    }
    let mut payload = data[..data.len() - SIZE_HASH].to_vec();
    apply_static_xorpad(&mut payload);
    read_blocks(&payload).map_err(SwishError::from)
}

/// Serialize a block sequence into a complete save file: encoded blocks,
/// static pad, then the freshly computed trailing hash.
pub fn encrypt(blocks: &[Block]) -> Vec<u8> {
    let mut out = Vec::new();
    for block in blocks {
        write_block(block, &mut out);
    }
    apply_static_xorpad(&mut out);
    let digest = compute_hash(&out);
    out.extend_from_slice(&digest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xorpad_is_an_involution() {
        let original: Vec<u8> = (0u8..=255).cycle().take(1000).collect();
        let mut data = original.clone();
        apply_static_xorpad(&mut data);
        assert_ne!(data, original);
        apply_static_xorpad(&mut data);
        assert_eq!(data, original);
    }

    #[test]
    fn xorpad_period_is_127() {
        // Byte 127 sits at the start of the second chunk, so it must be
        // XORed with pad[0], not pad[127].
        let mut data = vec![0u8; 256];
        apply_static_xorpad(&mut data);
        assert_eq!(data[127], STATIC_XORPAD[0]);
        assert_eq!(data[254], STATIC_XORPAD[0]);
        assert_eq!(data[126], STATIC_XORPAD[126]);
    }

    #[test]
    fn hash_framing_known_answer() {
        // SHA-256(intro ‖ outro), i.e. the hash of an empty payload.
        let expected = "15b0e4aedc59858eb288f5c90924cd99721807f9871f89b9a1e3500857941c85";
        assert_eq!(hex::encode(compute_hash(&[])), expected);
    }

    #[test]
    fn short_files_are_never_valid() {
        assert!(!is_hash_valid(&[]));
        assert!(!is_hash_valid(&[0u8; 31]));
        assert_eq!(verify(&[0u8; 31]), Err(SwishError::HashMismatch));
    }

    #[test]
    fn empty_block_sequence_round_trips() {
        let file = encrypt(&[]);
        assert_eq!(file.len(), SIZE_HASH);
        assert!(is_hash_valid(&file));
        assert_eq!(decrypt(&file).unwrap(), Vec::<Block>::new());
    }
}
