//! Result decoding: ranked basis states back to genomic hits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::{Classified, ClassicalScore, Strand};
use crate::encoder::EncodedIndex;
use crate::engine::AmplitudeState;

/// Absolute tolerance on the probability floor.
const FLOOR_TOLERANCE: f64 = 1e-12;

/// Which states the decoder reports.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopKPolicy {
    /// The `k` most probable decodable states.
    Fixed(usize),
    /// Every decodable state with probability at least `floor_factor / N`,
    /// at most `|M|` of them.
    Auto {
        /// Multiple of the uniform probability used as the floor.
        floor_factor: f64,
    },
}

impl Default for TopKPolicy {
    fn default() -> Self {
        TopKPolicy::Auto { floor_factor: 1.0 }
    }
}

impl TopKPolicy {
    /// `Fixed(k)` when a count is given, `Auto` otherwise.
    pub fn from_options(top_k: Option<usize>, floor_factor: f64) -> Self {
        match top_k {
            Some(k) => TopKPolicy::Fixed(k),
            None => TopKPolicy::Auto { floor_factor },
        }
    }
}

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// 1-based rank by probability.
    pub rank: usize,
    /// Contig name.
    pub contig: String,
    /// 1-based inclusive start.
    pub start_1based: usize,
    /// 1-based inclusive end.
    pub end_1based: usize,
    /// 0-based inclusive start.
    pub start_0based: usize,
    /// 0-based exclusive end.
    pub end_0based: usize,
    /// Sequence read 5'→3' on `strand`: the contig text for `+`, its
    /// reverse complement for `-`. With merged strands a discovery hit
    /// always shows the canonical k-mer.
    pub sequence: String,
    /// Strand of the reported occurrence.
    pub strand: Strand,
    /// Measured probability of the basis state.
    pub probability: f64,
    /// Classical score.
    pub score: ClassicalScore,
    /// Whether the state is in the marked set.
    pub marked: bool,
    /// Basis index the hit was decoded from.
    pub index: EncodedIndex,
}

impl HitRecord {
    /// Length in bases.
    pub fn len(&self) -> usize {
        self.end_0based - self.start_0based
    }

    /// Never true for a decoded hit.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Inverts the basis encoding over a final distribution.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultDecoder {
    policy: TopKPolicy,
}

impl ResultDecoder {
    /// Decoder with the given policy.
    pub fn new(policy: TopKPolicy) -> Self {
        Self { policy }
    }

    /// The policy in use.
    pub fn policy(&self) -> TopKPolicy {
        self.policy
    }

    /// Rank `state` and decode the retained indices against `classified`.
    ///
    /// States are ordered by probability, descending, ties by ascending
    /// index. States with no genomic location are skipped without taking a
    /// rank.
    pub fn decode<C: Classified>(&self, state: &AmplitudeState, classified: &C) -> Vec<HitRecord> {
        let ordered = rank_indices(state.probabilities());
        let marked = classified.marked();

        let (limit, floor) = match self.policy {
            TopKPolicy::Fixed(k) => (k, None),
            TopKPolicy::Auto { floor_factor } => {
                let floor = floor_factor / state.len() as f64 - FLOOR_TOLERANCE;
                (marked.len(), Some(floor))
            }
        };

        let hits: Vec<HitRecord> = ordered
            .into_iter()
            .take_while(|&i| floor.is_none_or(|f| state.probability(i) >= f))
            .filter_map(|i| classified.locate(i).map(|loc| (i, loc)))
            .take(limit)
            .enumerate()
            .map(|(pos, (index, loc))| HitRecord {
                rank: pos + 1,
                contig: classified.contig().to_string(),
                start_1based: loc.start + 1,
                end_1based: loc.end,
                start_0based: loc.start,
                end_0based: loc.end,
                sequence: loc.sequence,
                strand: loc.strand,
                probability: state.probability(index),
                score: loc.score,
                marked: marked.contains(index),
                index,
            })
            .collect();

        debug!("Decoded {} hits with policy {:?}", hits.len(), self.policy);
        hits
    }
}

/// Indices ordered by probability descending, ties by ascending index.
pub fn rank_indices(probabilities: &[f64]) -> Vec<EncodedIndex> {
    let mut order: Vec<EncodedIndex> = (0..probabilities.len() as u64).collect();
    order.sort_by(|&a, &b| {
        probabilities[b as usize]
            .total_cmp(&probabilities[a as usize])
            .then(a.cmp(&b))
    });
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::{Genome, HammingClassifier, MarkingClassifier};

    #[test]
    fn test_rank_indices_tie_break() {
        let order = rank_indices(&[0.1, 0.3, 0.1, 0.3, 0.2]);
        assert_eq!(order, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_policy_from_options() {
        assert_eq!(TopKPolicy::from_options(Some(3), 1.0), TopKPolicy::Fixed(3));
        assert_eq!(
            TopKPolicy::from_options(None, 2.0),
            TopKPolicy::Auto { floor_factor: 2.0 }
        );
        assert_eq!(TopKPolicy::default(), TopKPolicy::Auto { floor_factor: 1.0 });
    }

    #[test]
    fn test_uniform_state_fixed_skips_padding() {
        let genome = Genome::new("chr", "ACGTACGTACGT").unwrap();
        let scan = HammingClassifier::new("ACGT", 0, 20)
            .unwrap()
            .classify(&genome)
            .unwrap();
        // W = 9 windows on 16 states; padding 9..16 must never appear.
        let state = AmplitudeState::uniform(4);
        let hits = ResultDecoder::new(TopKPolicy::Fixed(20)).decode(&state, &scan);
        assert_eq!(hits.len(), 9);
        assert!(hits.iter().all(|h| h.index < 9));
        assert_eq!(hits[0].rank, 1);
        assert_eq!(hits[0].index, 0);
        assert_eq!(hits[8].rank, 9);
    }

    #[test]
    fn test_coordinates_are_dual() {
        let genome = Genome::new("chr", "GGACGTGG").unwrap();
        let scan = HammingClassifier::new("ACGT", 0, 20)
            .unwrap()
            .classify(&genome)
            .unwrap();
        let state = AmplitudeState::uniform(scan.space().num_qubits());
        let hits = ResultDecoder::new(TopKPolicy::Fixed(1)).decode(&state, &scan);
        let hit = &hits[0];
        assert_eq!(hit.start_0based, 0);
        assert_eq!(hit.start_1based, 1);
        assert_eq!(hit.end_1based - hit.start_1based + 1, hit.end_0based - hit.start_0based);
        assert_eq!(hit.start_0based, hit.start_1based - 1);
        assert_eq!(hit.len(), 4);
    }

    #[test]
    fn test_auto_policy_uniform_no_hits() {
        let genome = Genome::new("chr", "AAAAAAAA").unwrap();
        let scan = HammingClassifier::new("CCCC", 0, 20)
            .unwrap()
            .classify(&genome)
            .unwrap();
        let state = AmplitudeState::uniform(scan.space().num_qubits());
        assert!(ResultDecoder::default().decode(&state, &scan).is_empty());
    }
}
