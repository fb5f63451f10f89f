//! Nucleotide codes and strand operations.
//!
//! Bases are coded A=0, C=1, G=2, T=3, so the complement of code `c` is
//! `3 - c` and numeric order of packed k-mers equals lexicographic order.

use crate::error::{MotifError, MotifResult};

/// The indexable alphabet, in code order.
pub const ALPHABET: [u8; 4] = *b"ACGT";

/// Two-bit code of an upper-case base, or `None` outside {A, C, G, T}.
#[inline]
pub fn code(base: u8) -> Option<u64> {
    match base {
        b'A' => Some(0),
        b'C' => Some(1),
        b'G' => Some(2),
        b'T' => Some(3),
        _ => None,
    }
}

/// Base for a two-bit code. Only the low two bits are read.
#[inline]
pub fn base(code: u64) -> u8 {
    ALPHABET[(code & 3) as usize]
}

/// Watson-Crick complement; anything outside {A, C, G, T} becomes `N`.
#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        _ => b'N',
    }
}

/// Reverse complement of a sequence.
pub fn reverse_complement(seq: &[u8]) -> Vec<u8> {
    seq.iter().rev().map(|&b| complement(b)).collect()
}

/// Reverse complement of a packed k-mer.
pub fn reverse_complement_index(index: u64, k: usize) -> u64 {
    let mut rc = 0u64;
    let mut rest = index;
    for _ in 0..k {
        rc = (rc << 2) | (3 - (rest & 3));
        rest >>= 2;
    }
    rc
}

/// Canonical form of a packed k-mer: the smaller of it and its reverse
/// complement.
#[inline]
pub fn canonical_index(index: u64, k: usize) -> u64 {
    index.min(reverse_complement_index(index, k))
}

/// Upper-case a sequence and drop whitespace.
pub fn normalize(seq: &str) -> String {
    seq.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// Whether every byte is in {A, C, G, T}.
#[inline]
pub fn is_acgt(seq: &[u8]) -> bool {
    seq.iter().all(|&b| code(b).is_some())
}

/// Reject the first symbol outside {A, C, G, T}.
pub fn validate_acgt(seq: &str, context: &str) -> MotifResult<()> {
    match seq.chars().enumerate().find(|&(_, c)| !matches!(c, 'A' | 'C' | 'G' | 'T')) {
        Some((position, symbol)) => Err(MotifError::InvalidAlphabet {
            context: context.to_string(),
            symbol,
            position,
        }),
        None => Ok(()),
    }
}

/// Hamming distance between equal-length sequences.
#[inline]
pub fn hamming(a: &[u8], b: &[u8]) -> u32 {
    a.iter().zip(b).filter(|(x, y)| x != y).count() as u32
}
