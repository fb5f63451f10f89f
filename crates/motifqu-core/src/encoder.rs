//! Basis encoding: genomic objects to register indices and back.
//!
//! Two encodings are provided:
//!
//! - [`WindowEncoder`]: a sliding window is identified by its 0-based start
//!   offset, so encoding is the identity on `[0, W)`.
//! - [`KmerEncoder`]: a k-mer is packed base-4, first nucleotide most
//!   significant, filling exactly `4^k = 2^(2k)` indices.

use serde::{Deserialize, Serialize};

use crate::error::{MotifError, MotifResult};
use crate::nucleotide;

/// Integer index of a basis state.
pub type EncodedIndex = u64;

/// Largest register this crate will size. Beyond this `2^n` no longer fits
/// comfortably in a `u64` index.
const MAX_REPRESENTABLE_QUBITS: u32 = 62;

/// Size of a search register.
///
/// `size` is `2^num_qubits`. Only the first `reachable` indices correspond
/// to a genomic object; the rest is padding and must never be marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchSpace {
    size: u64,
    num_qubits: u32,
    reachable: u64,
}

impl SearchSpace {
    /// Space for `windows` sliding-window start offsets.
    ///
    /// Uses `max(1, ceil(log2 W))` qubits so a single window still gets a
    /// register. Fails if that exceeds `ceiling`.
    pub fn for_windows(windows: u64, ceiling: u32) -> MotifResult<Self> {
        if windows == 0 {
            return Err(MotifError::InvalidParameter(
                "search space needs at least one window".into(),
            ));
        }
        let num_qubits = ceil_log2(windows).max(1);
        Self::check_ceiling(num_qubits, ceiling)?;
        Ok(Self {
            size: 1u64 << num_qubits,
            num_qubits,
            reachable: windows,
        })
    }

    /// Space for every k-mer of length `k`: `2k` qubits, no padding.
    pub fn for_kmers(k: usize, ceiling: u32) -> MotifResult<Self> {
        if k == 0 {
            return Err(MotifError::InvalidParameter("k must be positive".into()));
        }
        let num_qubits = u32::try_from(k)
            .ok()
            .and_then(|k| k.checked_mul(2))
            .unwrap_or(u32::MAX);
        Self::check_ceiling(num_qubits, ceiling)?;
        let size = 1u64 << num_qubits;
        Ok(Self {
            size,
            num_qubits,
            reachable: size,
        })
    }

    fn check_ceiling(num_qubits: u32, ceiling: u32) -> MotifResult<()> {
        let ceiling = ceiling.min(MAX_REPRESENTABLE_QUBITS);
        if num_qubits > ceiling {
            return Err(MotifError::QubitCeilingExceeded {
                requested: num_qubits,
                ceiling,
            });
        }
        Ok(())
    }

    /// Number of basis states, `N = 2^n`.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Number of qubits, `n`.
    pub fn num_qubits(&self) -> u32 {
        self.num_qubits
    }

    /// Number of indices that map to a genomic object.
    pub fn reachable(&self) -> u64 {
        self.reachable
    }

    /// Number of padding indices.
    pub fn padding(&self) -> u64 {
        self.size - self.reachable
    }

    /// Whether `index` maps to a genomic object.
    pub fn is_reachable(&self, index: EncodedIndex) -> bool {
        index < self.reachable
    }
}

/// `ceil(log2(w))` for `w >= 1`.
fn ceil_log2(w: u64) -> u32 {
    if w <= 1 {
        0
    } else {
        u64::BITS - (w - 1).leading_zeros()
    }
}

/// Bijection between a mode's genomic objects and `[0, reachable)`.
pub trait BasisEncoder {
    /// The genomic object an index stands for.
    type Object;

    /// The register this encoder fills.
    fn space(&self) -> SearchSpace;

    /// Index of `object`, or `None` if it is outside the domain.
    fn encode(&self, object: &Self::Object) -> Option<EncodedIndex>;

    /// Object at `index`, or `None` for padding and out-of-range indices.
    fn decode(&self, index: EncodedIndex) -> Option<Self::Object>;
}

/// A motif-length window on a contig, 0-based half-open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Window {
    /// First base, 0-based inclusive.
    pub start: usize,
    /// One past the last base.
    pub end: usize,
}

/// Encodes sliding windows by start offset.
#[derive(Debug, Clone)]
pub struct WindowEncoder {
    space: SearchSpace,
    motif_len: usize,
}

impl WindowEncoder {
    /// Encoder for every window of `motif_len` bases over `genome_len`
    /// bases. No circular wraparound.
    pub fn new(genome_len: usize, motif_len: usize, ceiling: u32) -> MotifResult<Self> {
        if motif_len == 0 {
            return Err(MotifError::InvalidParameter("motif is empty".into()));
        }
        if motif_len > genome_len {
            return Err(MotifError::MotifLongerThanGenome {
                length: motif_len,
                genome_length: genome_len,
            });
        }
        let windows = (genome_len - motif_len + 1) as u64;
        Ok(Self {
            space: SearchSpace::for_windows(windows, ceiling)?,
            motif_len,
        })
    }

    /// Window length.
    pub fn motif_len(&self) -> usize {
        self.motif_len
    }
}

impl BasisEncoder for WindowEncoder {
    type Object = Window;

    fn space(&self) -> SearchSpace {
        self.space
    }

    fn encode(&self, window: &Window) -> Option<EncodedIndex> {
        let index = window.start as u64;
        (window.end == window.start + self.motif_len && self.space.is_reachable(index))
            .then_some(index)
    }

    fn decode(&self, index: EncodedIndex) -> Option<Window> {
        self.space.is_reachable(index).then(|| {
            let start = index as usize;
            Window {
                start,
                end: start + self.motif_len,
            }
        })
    }
}

/// Encodes k-mers base-4, first nucleotide most significant.
#[derive(Debug, Clone)]
pub struct KmerEncoder {
    space: SearchSpace,
    k: usize,
}

impl KmerEncoder {
    /// Encoder for k-mers of length `k`.
    pub fn new(k: usize, ceiling: u32) -> MotifResult<Self> {
        Ok(Self {
            space: SearchSpace::for_kmers(k, ceiling)?,
            k,
        })
    }

    /// K-mer length.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Pack upper-case bases. `None` on wrong length or a non-ACGT symbol.
    pub fn encode_bytes(&self, kmer: &[u8]) -> Option<EncodedIndex> {
        if kmer.len() != self.k {
            return None;
        }
        kmer.iter()
            .try_fold(0u64, |acc, &b| nucleotide::code(b).map(|c| (acc << 2) | c))
    }

    /// Unpack an index into its bases.
    pub fn decode_bytes(&self, index: EncodedIndex) -> Option<Vec<u8>> {
        if !self.space.is_reachable(index) {
            return None;
        }
        let mut bases = vec![0u8; self.k];
        let mut rest = index;
        for slot in bases.iter_mut().rev() {
            *slot = nucleotide::base(rest);
            rest >>= 2;
        }
        Some(bases)
    }
}

impl BasisEncoder for KmerEncoder {
    type Object = String;

    fn space(&self) -> SearchSpace {
        self.space
    }

    fn encode(&self, kmer: &String) -> Option<EncodedIndex> {
        self.encode_bytes(kmer.as_bytes())
    }

    fn decode(&self, index: EncodedIndex) -> Option<String> {
        self.decode_bytes(index)
            .map(|bases| bases.into_iter().map(char::from).collect())
    }
}
