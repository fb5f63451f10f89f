//! End-to-end runs through the search and discovery pipelines.

use std::collections::BTreeSet;

use motifqu_adapter_sim::SimulatorBackend;
use motifqu_core::{
    AmplificationOutcome, ClassicalScore, DiscoveryParams, Genome, IterationScheduler, Mode,
    MotifError, RunOptions, SearchParams, Strand, TopKPolicy, run_discovery, run_search,
};

fn genome(seq: &str) -> Genome {
    Genome::new("chrTest", seq).unwrap()
}

#[tokio::test]
async fn test_search_overlapping_exact_matches() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ATAT", 0).unwrap();
    let report = run_search(
        &genome("ATATATGGGCATATG"),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    let s = &report.summary;
    assert_eq!(s.mode, Mode::Search);
    assert_eq!(s.sequence_length, 15);
    assert_eq!(s.reachable_states, 12);
    assert_eq!(s.search_space_size, 16);
    assert_eq!(s.num_qubits, 4);
    assert_eq!(s.marked_count, 3);
    assert_eq!(s.iterations, 2);
    assert_eq!(s.optimal_iterations, Some(2));
    assert!(!s.iterations_forced);
    assert_eq!(s.outcome, AmplificationOutcome::Amplified);
    assert!(s.exact);
    assert!((s.marked_probability_mass - s.theoretical_success).abs() < 1e-9);
    assert!(s.circuit.is_some());

    assert_eq!(report.hits.len(), 3);
    let starts: BTreeSet<usize> = report.hits.iter().map(|h| h.start_0based).collect();
    assert_eq!(starts, BTreeSet::from([0, 2, 10]));
    let one_based: BTreeSet<(usize, usize)> = report
        .hits
        .iter()
        .map(|h| (h.start_1based, h.end_1based))
        .collect();
    assert_eq!(one_based, BTreeSet::from([(1, 4), (3, 6), (11, 14)]));

    for (i, hit) in report.hits.iter().enumerate() {
        assert_eq!(hit.rank, i + 1);
        assert_eq!(hit.contig, "chrTest");
        assert_eq!(hit.sequence, "ATAT");
        assert_eq!(hit.strand, Strand::Forward);
        assert_eq!(hit.score, ClassicalScore::Hamming(0));
        assert!(hit.marked);
        assert!(hit.probability > 1.0 / 16.0);
        assert_eq!(hit.end_1based - hit.start_1based + 1, hit.end_0based - hit.start_0based);
        assert_eq!(hit.start_0based, hit.start_1based - 1);
    }
}

#[tokio::test]
async fn test_search_fixed_top_k_reports_unmarked_tail() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ATAT", 0).unwrap();
    let options = RunOptions {
        policy: TopKPolicy::Fixed(5),
        ..RunOptions::default()
    };
    let report = run_search(&genome("ATATATGGGCATATG"), &params, &backend, &options)
        .await
        .unwrap();

    assert_eq!(report.hits.len(), 5);
    assert!(report.hits[..3].iter().all(|h| h.marked));
    assert!(report.hits[3..].iter().all(|h| !h.marked));
    for hit in &report.hits[3..] {
        assert!(hit.start_0based < 12, "padding index decoded");
        assert!(matches!(hit.score, ClassicalScore::Hamming(d) if d > 0));
    }
}

#[tokio::test]
async fn test_search_forced_iterations() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ATAT", 0).unwrap();
    let options = RunOptions {
        scheduler: IterationScheduler::forced(1),
        ..RunOptions::default()
    };
    let report = run_search(&genome("ATATATGGGCATATG"), &params, &backend, &options)
        .await
        .unwrap();
    assert_eq!(report.summary.iterations, 1);
    assert_eq!(report.summary.optimal_iterations, Some(2));
    assert!(report.summary.iterations_forced);
}

#[tokio::test]
async fn test_search_no_hits() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("CCCC", 0).unwrap();
    let report = run_search(&genome("AAAAAAAAA"), &params, &backend, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.summary.outcome, AmplificationOutcome::NoHits);
    assert_eq!(report.summary.marked_count, 0);
    assert_eq!(report.summary.iterations, 0);
    assert!(report.summary.circuit.is_none());
    assert!(report.hits.is_empty());
}

#[tokio::test]
async fn test_search_all_candidates_match() {
    // Seven bases, four windows: W = N = 4, every window within 4 mismatches.
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ACGT", 4).unwrap();
    let report = run_search(&genome("ACGTACG"), &params, &backend, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.summary.outcome, AmplificationOutcome::AllCandidatesMatch);
    assert_eq!(report.summary.search_space_size, 4);
    assert_eq!(report.hits.len(), 4);
    for hit in &report.hits {
        assert!((hit.probability - 0.25).abs() < 1e-12);
    }
}

#[tokio::test]
async fn test_search_every_window_matches_with_padding() {
    // Fifteen bases, twelve windows padded to 16 states; all twelve match.
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ACGT", 4).unwrap();
    let report = run_search(
        &genome("ACGTACGTACGTACG"),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    let s = &report.summary;
    assert_eq!(s.reachable_states, 12);
    assert_eq!(s.search_space_size, 16);
    assert_eq!(s.marked_count, 12);
    assert_eq!(s.outcome, AmplificationOutcome::AllCandidatesMatch);
    assert_eq!(s.iterations, 0);
    assert_eq!(report.hits.len(), 12);
    assert!(report.hits.iter().all(|h| h.marked));
}

#[tokio::test]
async fn test_search_majority_of_windows_marked() {
    // AAAA within one mismatch of 11 of the 16 windows.
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("AAAA", 1).unwrap();
    let report = run_search(
        &genome("AAAAAAAAAAAAACCCCCC"),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    let s = &report.summary;
    assert_eq!(s.search_space_size, 16);
    assert_eq!(s.marked_count, 11);
    assert_eq!(s.outcome, AmplificationOutcome::Amplified);
    assert_eq!(s.ancilla_qubits, 1);
    assert!(s.marked_probability_mass > 11.0 / 16.0);
    assert!((s.marked_probability_mass - s.theoretical_success).abs() < 1e-9);

    assert_eq!(report.hits.len(), 11);
    let starts: BTreeSet<usize> = report.hits.iter().map(|h| h.start_0based).collect();
    assert_eq!(starts, (0..11).collect::<BTreeSet<_>>());
    assert!(report.hits.iter().all(|h| h.marked));
}

#[tokio::test]
async fn test_search_skips_ambiguous_windows() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ACGT", 0).unwrap();
    let report = run_search(
        &genome("ACGTNNNNNNACGTAA"),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.summary.reachable_states, 13);
    assert_eq!(report.summary.marked_count, 2);
    let starts: BTreeSet<usize> = report.hits.iter().map(|h| h.start_0based).collect();
    assert_eq!(starts, BTreeSet::from([0, 10]));
}

#[test]
fn test_genome_rejects_multibyte_symbols() {
    let err = Genome::new("chrTest", "ACGTÉACGT").unwrap_err();
    assert!(matches!(
        err,
        MotifError::InvalidAlphabet { position: 4, .. }
    ));
}

#[tokio::test]
async fn test_search_errors() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ACGTACGT", 0).unwrap();
    let err = run_search(&genome("ACGT"), &params, &backend, &RunOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, MotifError::MotifLongerThanGenome { .. }));

    let options = RunOptions {
        qubit_ceiling: 3,
        ..RunOptions::default()
    };
    let params = SearchParams::new("A", 0).unwrap();
    let err = run_search(&genome(&"A".repeat(20)), &params, &backend, &options)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MotifError::QubitCeilingExceeded {
            requested: 5,
            ceiling: 3
        }
    ));
}

#[tokio::test]
async fn test_discovery_merges_reverse_complements() {
    let backend = SimulatorBackend::new();
    // TT x3 folds onto canonical AA; TC/GA and CC/GG stay below threshold.
    let params = DiscoveryParams::new(2, 3, true).unwrap();
    let report = run_discovery(&genome("TTTTCC"), &params, &backend, &RunOptions::default())
        .await
        .unwrap();

    let s = &report.summary;
    assert_eq!(s.mode, Mode::Discovery);
    assert_eq!(s.num_qubits, 4);
    assert_eq!(s.search_space_size, 16);
    assert_eq!(s.reachable_states, 16);
    assert_eq!(s.marked_count, 1);
    assert_eq!(s.iterations, 3);

    assert_eq!(report.hits.len(), 1);
    let hit = &report.hits[0];
    assert_eq!(hit.sequence, "AA");
    assert_eq!(hit.strand, Strand::Reverse);
    assert_eq!(hit.start_0based, 0);
    assert_eq!(hit.end_0based, 2);
    // The contig holds the reverse complement at the reported span.
    assert_eq!(&"TTTTCC"[hit.start_0based..hit.end_0based], "TT");
    assert_eq!(hit.score, ClassicalScore::Count(3));
    assert!(hit.probability > 0.9);
}

#[tokio::test]
async fn test_discovery_without_merge() {
    let backend = SimulatorBackend::new();
    let params = DiscoveryParams::new(2, 3, false).unwrap();
    let report = run_discovery(&genome("TTTTCC"), &params, &backend, &RunOptions::default())
        .await
        .unwrap();

    assert_eq!(report.hits.len(), 1);
    let hit = &report.hits[0];
    assert_eq!(hit.sequence, "TT");
    assert_eq!(hit.strand, Strand::Forward);
    assert_eq!(hit.index, 15);
    assert_eq!(hit.score, ClassicalScore::Count(3));
}

#[tokio::test]
async fn test_discovery_rejects_large_k_before_scanning() {
    let backend = SimulatorBackend::new();
    let params = DiscoveryParams::new(11, 2, true).unwrap();
    let err = run_discovery(
        &genome(&"ACGT".repeat(8)),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        MotifError::QubitCeilingExceeded {
            requested: 22,
            ceiling: 20
        }
    ));
}

#[tokio::test]
async fn test_report_serializes_to_json() {
    let backend = SimulatorBackend::new();
    let params = SearchParams::new("ATAT", 0).unwrap();
    let report = run_search(
        &genome("ATATATGGGCATATG"),
        &params,
        &backend,
        &RunOptions::default(),
    )
    .await
    .unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["mode"], "search");
    assert_eq!(json["summary"]["outcome"], "amplified");
    assert_eq!(json["hits"][0]["strand"], "+");
    assert_eq!(json["hits"][0]["score"]["kind"], "hamming");
}
