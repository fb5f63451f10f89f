//! Marking classifiers: the classical scan that decides which basis states
//! are marked.
//!
//! The predicate is evaluated here, once, and the result is frozen into a
//! [`MarkedSet`]. The oracle only ever sees that set, so a classifier can be
//! replaced without touching circuit synthesis, amplification or decoding.

use std::collections::BTreeSet;
use std::collections::btree_set;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::encoder::{BasisEncoder, EncodedIndex, KmerEncoder, SearchSpace, WindowEncoder};
use crate::error::{MotifError, MotifResult};
use crate::nucleotide;

/// A single linear contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    contig: String,
    sequence: String,
}

impl Genome {
    /// Create a genome, upper-casing the sequence and dropping whitespace.
    ///
    /// Symbols outside printable ASCII are rejected so that every offset is
    /// both a byte and a base position. Other letters (`N`, IUPAC codes)
    /// are kept; windows containing them never match.
    pub fn new(contig: impl Into<String>, sequence: &str) -> MotifResult<Self> {
        let sequence = nucleotide::normalize(sequence);
        if sequence.is_empty() {
            return Err(MotifError::EmptySequence);
        }
        if let Some((position, symbol)) = sequence
            .chars()
            .enumerate()
            .find(|(_, c)| !c.is_ascii_graphic())
        {
            return Err(MotifError::InvalidAlphabet {
                context: "genome".into(),
                symbol,
                position,
            });
        }
        Ok(Self {
            contig: contig.into(),
            sequence,
        })
    }

    /// Contig name.
    pub fn contig(&self) -> &str {
        &self.contig
    }

    /// Upper-case sequence.
    pub fn sequence(&self) -> &str {
        &self.sequence
    }

    /// Sequence bytes.
    pub fn as_bytes(&self) -> &[u8] {
        self.sequence.as_bytes()
    }

    /// Sequence length.
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Always false; construction rejects empty sequences.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }
}

/// The set of marked basis indices, ascending.
///
/// Never contains a padding index: construction checks every index against
/// the space's reachable range.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkedSet {
    indices: BTreeSet<EncodedIndex>,
}

impl MarkedSet {
    /// Build a marked set over `space`.
    pub fn new(
        space: &SearchSpace,
        indices: impl IntoIterator<Item = EncodedIndex>,
    ) -> MotifResult<Self> {
        let indices: BTreeSet<_> = indices.into_iter().collect();
        if let Some(&bad) = indices.range(space.reachable()..).next() {
            return Err(MotifError::InvalidParameter(format!(
                "index {bad} is outside the {} reachable states",
                space.reachable()
            )));
        }
        Ok(Self { indices })
    }

    /// Number of marked indices.
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether nothing is marked.
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Whether `index` is marked.
    pub fn contains(&self, index: EncodedIndex) -> bool {
        self.indices.contains(&index)
    }

    /// Marked indices in ascending order.
    pub fn iter(&self) -> btree_set::Iter<'_, EncodedIndex> {
        self.indices.iter()
    }
}

impl<'a> IntoIterator for &'a MarkedSet {
    type Item = &'a EncodedIndex;
    type IntoIter = btree_set::Iter<'a, EncodedIndex>;

    fn into_iter(self) -> Self::IntoIter {
        self.indices.iter()
    }
}

/// Classical score attached to a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ClassicalScore {
    /// Hamming distance to the query motif.
    Hamming(u32),
    /// Occurrence count, strand-merged when merging is enabled.
    Count(u64),
}

impl std::fmt::Display for ClassicalScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassicalScore::Hamming(d) => write!(f, "hd={d}"),
            ClassicalScore::Count(c) => write!(f, "count={c}"),
        }
    }
}

/// Strand of the reported occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strand {
    /// The occurrence reads as reported on the contig.
    #[serde(rename = "+")]
    Forward,
    /// The contig holds the reverse complement at this location.
    #[serde(rename = "-")]
    Reverse,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Strand::Forward => "+",
            Strand::Reverse => "-",
        })
    }
}

/// Where a basis index lands on the contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// 0-based inclusive start.
    pub start: usize,
    /// 0-based exclusive end.
    pub end: usize,
    /// The genomic object the index encodes, read on `strand`.
    pub sequence: String,
    /// Strand of the occurrence. For `-` the contig holds the reverse
    /// complement of `sequence` at `start..end`.
    pub strand: Strand,
    /// Classical score.
    pub score: ClassicalScore,
}

/// Output of a classification: the space, the marked set, and a way back
/// from index to contig.
pub trait Classified {
    /// The register the classification was made over.
    fn space(&self) -> SearchSpace;

    /// The frozen marked set.
    fn marked(&self) -> &MarkedSet;

    /// Contig the indices refer to.
    fn contig(&self) -> &str;

    /// Locate `index` on the contig. `None` for padding and for indices
    /// with no scoreable occurrence.
    fn locate(&self, index: EncodedIndex) -> Option<Location>;
}

/// A classical marking predicate over a genome.
pub trait MarkingClassifier {
    /// What classification produces.
    type Output: Classified;

    /// Scan `genome` and freeze the marked set.
    fn classify(&self, genome: &Genome) -> MotifResult<Self::Output>;
}

// =============================================================================
// Search mode
// =============================================================================

/// Marks every window within a Hamming distance of the query motif.
#[derive(Debug, Clone)]
pub struct HammingClassifier {
    motif: String,
    max_mismatches: u32,
    qubit_ceiling: u32,
}

impl HammingClassifier {
    /// Create a classifier. The motif is upper-cased; any non-ACGT symbol
    /// in it is fatal.
    pub fn new(motif: &str, max_mismatches: u32, qubit_ceiling: u32) -> MotifResult<Self> {
        let motif = nucleotide::normalize(motif);
        if motif.is_empty() {
            return Err(MotifError::InvalidParameter("motif is empty".into()));
        }
        nucleotide::validate_acgt(&motif, "query motif")?;
        Ok(Self {
            motif,
            max_mismatches,
            qubit_ceiling,
        })
    }

    /// The normalized motif.
    pub fn motif(&self) -> &str {
        &self.motif
    }

    /// Mismatch tolerance.
    pub fn max_mismatches(&self) -> u32 {
        self.max_mismatches
    }
}

impl MarkingClassifier for HammingClassifier {
    type Output = WindowScan;

    fn classify(&self, genome: &Genome) -> MotifResult<WindowScan> {
        let motif = self.motif.as_bytes();
        let encoder = WindowEncoder::new(genome.len(), motif.len(), self.qubit_ceiling)?;
        let space = encoder.space();
        let seq = genome.as_bytes();

        let mut skipped = 0usize;
        let distances: Vec<Option<u32>> = seq
            .windows(motif.len())
            .map(|window| {
                if nucleotide::is_acgt(window) {
                    Some(nucleotide::hamming(window, motif))
                } else {
                    skipped += 1;
                    None
                }
            })
            .collect();

        let hits = distances
            .iter()
            .enumerate()
            .filter(|(_, d)| d.is_some_and(|d| d <= self.max_mismatches))
            .map(|(i, _)| i as EncodedIndex);
        let marked = MarkedSet::new(&space, hits)?;

        if skipped > 0 {
            debug!("Skipped {} windows with non-ACGT symbols", skipped);
        }
        info!(
            "Classified {} windows: {} within {} mismatches of {}",
            space.reachable(),
            marked.len(),
            self.max_mismatches,
            self.motif
        );

        Ok(WindowScan {
            contig: genome.contig().to_string(),
            sequence: genome.sequence().to_string(),
            encoder,
            distances,
            marked,
        })
    }
}

/// Result of a Hamming scan.
#[derive(Debug, Clone)]
pub struct WindowScan {
    contig: String,
    sequence: String,
    encoder: WindowEncoder,
    distances: Vec<Option<u32>>,
    marked: MarkedSet,
}

impl WindowScan {
    /// Hamming distance of the window starting at `start`, if it is
    /// scoreable.
    pub fn distance(&self, start: usize) -> Option<u32> {
        self.distances.get(start).copied().flatten()
    }
}

impl Classified for WindowScan {
    fn space(&self) -> SearchSpace {
        self.encoder.space()
    }

    fn marked(&self) -> &MarkedSet {
        &self.marked
    }

    fn contig(&self) -> &str {
        &self.contig
    }

    fn locate(&self, index: EncodedIndex) -> Option<Location> {
        let window = self.encoder.decode(index)?;
        let distance = self.distance(window.start)?;
        Some(Location {
            start: window.start,
            end: window.end,
            sequence: self.sequence[window.start..window.end].to_string(),
            strand: Strand::Forward,
            score: ClassicalScore::Hamming(distance),
        })
    }
}

// =============================================================================
// Discovery mode
// =============================================================================

/// Marks every k-mer occurring at least `min_count` times.
#[derive(Debug, Clone)]
pub struct KmerCountClassifier {
    k: usize,
    min_count: u64,
    merge_revcomp: bool,
    qubit_ceiling: u32,
}

impl KmerCountClassifier {
    /// Create a classifier.
    pub fn new(k: usize, min_count: u64, merge_revcomp: bool, qubit_ceiling: u32) -> MotifResult<Self> {
        if k == 0 {
            return Err(MotifError::InvalidParameter("k must be positive".into()));
        }
        if min_count == 0 {
            return Err(MotifError::InvalidParameter(
                "min_count must be at least 1".into(),
            ));
        }
        Ok(Self {
            k,
            min_count,
            merge_revcomp,
            qubit_ceiling,
        })
    }

    /// K-mer length.
    pub fn k(&self) -> usize {
        self.k
    }
}

impl MarkingClassifier for KmerCountClassifier {
    type Output = KmerTally;

    fn classify(&self, genome: &Genome) -> MotifResult<KmerTally> {
        if self.k > genome.len() {
            return Err(MotifError::MotifLongerThanGenome {
                length: self.k,
                genome_length: genome.len(),
            });
        }
        let encoder = KmerEncoder::new(self.k, self.qubit_ceiling)?;
        let space = encoder.space();

        let mut raw: FxHashMap<EncodedIndex, u64> = FxHashMap::default();
        let mut first_seen: FxHashMap<EncodedIndex, usize> = FxHashMap::default();
        for (pos, window) in genome.as_bytes().windows(self.k).enumerate() {
            if let Some(index) = encoder.encode_bytes(window) {
                *raw.entry(index).or_insert(0) += 1;
                first_seen.entry(index).or_insert(pos);
            }
        }

        let counts = if self.merge_revcomp {
            merge_reverse_complements(&raw, self.k)
        } else {
            raw.clone()
        };

        let marked = MarkedSet::new(
            &space,
            counts
                .iter()
                .filter(|&(_, &c)| c >= self.min_count)
                .map(|(&index, _)| index),
        )?;

        info!(
            "Tallied {} distinct {}-mers ({} after strand merge): {} with count >= {}",
            raw.len(),
            self.k,
            counts.len(),
            marked.len(),
            self.min_count
        );

        Ok(KmerTally {
            contig: genome.contig().to_string(),
            encoder,
            merge_revcomp: self.merge_revcomp,
            counts,
            first_seen,
            marked,
        })
    }
}

/// Fold raw k-mer counts onto canonical k-mers.
///
/// Each raw k-mer contributes its count to its canonical form exactly once,
/// so a palindromic k-mer is not double counted and the result does not
/// depend on which strand a k-mer was observed on.
pub fn merge_reverse_complements(
    raw: &FxHashMap<EncodedIndex, u64>,
    k: usize,
) -> FxHashMap<EncodedIndex, u64> {
    let mut merged = FxHashMap::default();
    for (&index, &count) in raw {
        *merged
            .entry(nucleotide::canonical_index(index, k))
            .or_insert(0) += count;
    }
    merged
}

/// Result of a k-mer tally.
#[derive(Debug, Clone)]
pub struct KmerTally {
    contig: String,
    encoder: KmerEncoder,
    merge_revcomp: bool,
    counts: FxHashMap<EncodedIndex, u64>,
    first_seen: FxHashMap<EncodedIndex, usize>,
    marked: MarkedSet,
}

impl KmerTally {
    /// Count of a k-mer index: merged under its canonical form when strand
    /// merging is on.
    pub fn count(&self, index: EncodedIndex) -> u64 {
        let key = if self.merge_revcomp {
            nucleotide::canonical_index(index, self.encoder.k())
        } else {
            index
        };
        self.counts.get(&key).copied().unwrap_or(0)
    }

    /// Number of distinct (canonical, when merging) k-mers observed.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    /// First occurrence of `index` or, when merging, of its reverse
    /// complement, whichever comes first.
    fn first_occurrence(&self, index: EncodedIndex) -> Option<(usize, Strand)> {
        let forward = self.first_seen.get(&index).map(|&p| (p, Strand::Forward));
        if !self.merge_revcomp {
            return forward;
        }
        let rc = nucleotide::reverse_complement_index(index, self.encoder.k());
        let reverse = (rc != index)
            .then(|| self.first_seen.get(&rc).map(|&p| (p, Strand::Reverse)))
            .flatten();
        match (forward, reverse) {
            (Some(f), Some(r)) => Some(if r.0 < f.0 { r } else { f }),
            (f, r) => f.or(r),
        }
    }
}

impl Classified for KmerTally {
    fn space(&self) -> SearchSpace {
        self.encoder.space()
    }

    fn marked(&self) -> &MarkedSet {
        &self.marked
    }

    fn contig(&self) -> &str {
        &self.contig
    }

    fn locate(&self, index: EncodedIndex) -> Option<Location> {
        if self.merge_revcomp && nucleotide::canonical_index(index, self.encoder.k()) != index {
            // Only canonical forms are scored when strands are merged.
            return None;
        }
        let sequence = self.encoder.decode(index)?;
        let (start, strand) = self.first_occurrence(index)?;
        Some(Location {
            start,
            end: start + self.encoder.k(),
            sequence,
            strand,
            score: ClassicalScore::Count(self.count(index)),
        })
    }
}
