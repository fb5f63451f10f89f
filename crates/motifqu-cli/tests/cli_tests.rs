//! CLI tests.
//!
//! The CLI is a binary crate, so these tests drive the compiled `motifqu`
//! executable with temporary FASTA and config files.

use std::collections::BTreeSet;
use std::io::Write;
use std::process::{Command, Output};

use tempfile::NamedTempFile;

fn motifqu(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_motifqu"))
        .args(args)
        .env_remove("MOTIFQU_CONFIG")
        .env_remove("MOTIFQU_LOG")
        .env_remove("MOTIFQU_BACKEND")
        .env_remove("MOTIFQU_FORCE_ITERATIONS")
        .env_remove("MOTIFQU_TOP_K")
        .output()
        .expect("failed to launch motifqu")
}

fn fasta(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".fa").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn json_report(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "motifqu failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

fn path(file: &NamedTempFile) -> &str {
    file.path().to_str().unwrap()
}

// ============================================================================
// search
// ============================================================================

#[test]
fn test_search_json_report() {
    let genome = fasta(">chrTest demo\nATATATGG\nGCATATG\n");
    let report = json_report(&motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "atat",
        "--json",
    ]));

    assert_eq!(report["summary"]["mode"], "search");
    assert_eq!(report["summary"]["contig"], "chrTest");
    assert_eq!(report["summary"]["num_qubits"], 4);
    assert_eq!(report["summary"]["marked_count"], 3);
    assert_eq!(report["summary"]["iterations"], 2);

    let hits = report["hits"].as_array().unwrap();
    let starts: BTreeSet<u64> = hits
        .iter()
        .map(|h| h["start_1based"].as_u64().unwrap())
        .collect();
    assert_eq!(starts, BTreeSet::from([1, 3, 11]));
    assert!(hits.iter().all(|h| h["marked"] == true));
}

#[test]
fn test_search_table_output() {
    let genome = fasta(">chrTest\nATATATGGGCATATG\n");
    let output = motifqu(&["search", "-f", path(&genome), "-m", "ATAT"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("HIT"));
    assert!(stdout.contains("chrTest:11-14"));
    assert!(stdout.contains("hd=0"));
}

#[test]
fn test_search_forced_iterations_and_top_k() {
    let genome = fasta(">chrTest\nATATATGGGCATATG\n");
    let report = json_report(&motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "ATAT",
        "--iters",
        "1",
        "--topk",
        "5",
        "--json",
    ]));

    assert_eq!(report["summary"]["iterations"], 1);
    assert_eq!(report["summary"]["iterations_forced"], true);
    assert_eq!(report["hits"].as_array().unwrap().len(), 5);
}

#[test]
fn test_search_sampler_backend() {
    let genome = fasta(">chrTest\nATATATGGGCATATG\n");
    let report = json_report(&motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "ATAT",
        "--backend",
        "sampler",
        "--seed",
        "42",
        "--json",
    ]));

    assert_eq!(report["summary"]["backend"], "sampler");
    assert_eq!(report["summary"]["exact"], false);
}

#[test]
fn test_search_config_file() {
    let genome = fasta(">chrTest\nATATATGGGCATATG\n");
    let mut config = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    writeln!(config, "engine:\n  force_iterations: 3\ndecoder:\n  top_k: 2").unwrap();

    let report = json_report(&motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "ATAT",
        "--config",
        path(&config),
        "--json",
    ]));
    assert_eq!(report["summary"]["iterations"], 3);
    assert_eq!(report["hits"].as_array().unwrap().len(), 2);
}

// ============================================================================
// discover
// ============================================================================

#[test]
fn test_discover_merges_strands() {
    let genome = fasta(">plasmid\nTTTTCC\n");
    let report = json_report(&motifqu(&[
        "discover",
        "--fasta",
        path(&genome),
        "-k",
        "2",
        "--min-count",
        "3",
        "--json",
    ]));

    assert_eq!(report["summary"]["mode"], "discovery");
    let hits = report["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["sequence"], "AA");
    assert_eq!(hits[0]["strand"], "-");
    assert_eq!(hits[0]["score"]["value"], 3);
}

#[test]
fn test_discover_no_revcomp() {
    let genome = fasta(">plasmid\nTTTTCC\n");
    let report = json_report(&motifqu(&[
        "discover",
        "--fasta",
        path(&genome),
        "-k",
        "2",
        "--min-count",
        "3",
        "--no-revcomp",
        "--json",
    ]));

    let hits = report["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["sequence"], "TT");
    assert_eq!(hits[0]["strand"], "+");
}

// ============================================================================
// Error paths
// ============================================================================

#[test]
fn test_missing_fasta_fails() {
    let output = motifqu(&["search", "--fasta", "/nonexistent/genome.fa", "--motif", "ACGT"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("File not found"));
}

#[test]
fn test_motif_longer_than_genome_fails() {
    let genome = fasta(">short\nACGT\n");
    let output = motifqu(&["search", "--fasta", path(&genome), "--motif", "ACGTACGT"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_negative_mismatches_rejected() {
    let genome = fasta(">c\nACGTACGT\n");
    let output = motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "ACGT",
        "--mismatches",
        "-1",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_invalid_motif_fails() {
    let genome = fasta(">c\nACGTACGT\n");
    let output = motifqu(&["search", "--fasta", path(&genome), "--motif", "ACGN"]);
    assert!(!output.status.success());
}

#[test]
fn test_non_ascii_genome_fails() {
    let genome = fasta(">c\nACGTµACGT\n");
    let output = motifqu(&["search", "--fasta", path(&genome), "--motif", "ACGT"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Invalid FASTA"));
}

#[test]
fn test_unknown_backend_fails() {
    let genome = fasta(">c\nACGTACGT\n");
    let output = motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "ACGT",
        "--backend",
        "quantum-cloud",
    ]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown backend"));
}

#[test]
fn test_qubit_ceiling_flag() {
    let genome = fasta(&format!(">c\n{}\n", "A".repeat(20)));
    let output = motifqu(&[
        "search",
        "--fasta",
        path(&genome),
        "--motif",
        "A",
        "--max-qubits",
        "3",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_subcommand_fails() {
    assert!(!motifqu(&[]).status.success());
}

// ============================================================================
// Catalog and info commands
// ============================================================================

#[test]
fn test_list_motifs() {
    let output = motifqu(&["list-motifs"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("EcoRI"));
    assert!(stdout.contains("TATAWAW"));
}

#[test]
fn test_expand_pattern() {
    let output = motifqu(&["expand", "CANNTG"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 16);
    assert_eq!(lines[0], "CAAATG");
}

#[test]
fn test_expand_catalog_name() {
    let output = motifqu(&["expand", "ecori"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "GAATTC");
}

#[test]
fn test_expand_limit_exceeded() {
    let output = motifqu(&["expand", "NNNNNN", "--limit", "100"]);
    assert!(!output.status.success());
}

#[test]
fn test_backends_lists_simulators() {
    let output = motifqu(&["backends"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("statevector"));
    assert!(stdout.contains("sampler"));
}

#[test]
fn test_version() {
    let output = motifqu(&["version"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains(env!("CARGO_PKG_VERSION")));
}
