//! IUPAC nucleotide codes and a small catalog of well-known motifs.

use serde::Serialize;

use crate::error::{MotifError, MotifResult};

/// Default cap on the number of sequences [`expand_iupac`] may produce.
pub const DEFAULT_EXPANSION_LIMIT: usize = 4096;

/// Concrete bases an IUPAC code stands for, `None` for unknown symbols.
pub fn iupac_bases(symbol: u8) -> Option<&'static [u8]> {
    let bases: &'static [u8] = match symbol.to_ascii_uppercase() {
        b'A' => b"A",
        b'C' => b"C",
        b'G' => b"G",
        b'T' | b'U' => b"T",
        b'R' => b"AG",
        b'Y' => b"CT",
        b'S' => b"CG",
        b'W' => b"AT",
        b'K' => b"GT",
        b'M' => b"AC",
        b'B' => b"CGT",
        b'D' => b"AGT",
        b'H' => b"ACT",
        b'V' => b"ACG",
        b'N' => b"ACGT",
        _ => return None,
    };
    Some(bases)
}

/// Every ACGT sequence matching an IUPAC `pattern`, in lexicographic order.
///
/// Fails on unknown symbols and when the expansion would exceed `limit`
/// sequences; the size is computed before anything is generated.
pub fn expand_iupac(pattern: &str, limit: usize) -> MotifResult<Vec<String>> {
    let pattern = pattern.trim().to_ascii_uppercase();
    let choices = pattern
        .chars()
        .map(|c| {
            u8::try_from(c)
                .ok()
                .and_then(iupac_bases)
                .ok_or(MotifError::InvalidIupac { symbol: c })
        })
        .collect::<MotifResult<Vec<_>>>()?;

    let count = choices
        .iter()
        .try_fold(1u128, |acc, c| acc.checked_mul(c.len() as u128))
        .unwrap_or(u128::MAX);
    if count > limit as u128 {
        return Err(MotifError::ExpansionTooLarge {
            pattern,
            count,
            limit,
        });
    }

    let mut out = vec![String::with_capacity(choices.len())];
    for bases in &choices {
        out = out
            .iter()
            .flat_map(|prefix| {
                bases.iter().map(move |&b| {
                    let mut s = prefix.clone();
                    s.push(char::from(b));
                    s
                })
            })
            .collect();
    }
    Ok(out)
}

/// A catalogued motif.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownMotif {
    /// Short name.
    pub name: &'static str,
    /// IUPAC consensus.
    pub consensus: &'static str,
    /// What binds or cuts there.
    pub description: &'static str,
}

/// Regulatory elements and restriction sites.
pub const KNOWN_MOTIFS: &[KnownMotif] = &[
    KnownMotif {
        name: "TATA_box",
        consensus: "TATAWAW",
        description: "Core promoter element bound by TBP",
    },
    KnownMotif {
        name: "CAAT_box",
        consensus: "GGCCAATCT",
        description: "Promoter element bound by NF-Y",
    },
    KnownMotif {
        name: "GC_box",
        consensus: "GGGCGG",
        description: "Sp1 binding site",
    },
    KnownMotif {
        name: "E_box",
        consensus: "CANNTG",
        description: "bHLH transcription factor binding site",
    },
    KnownMotif {
        name: "Kozak",
        consensus: "GCCRCCATGG",
        description: "Eukaryotic translation initiation context",
    },
    KnownMotif {
        name: "Shine_Dalgarno",
        consensus: "AGGAGG",
        description: "Prokaryotic ribosome binding site",
    },
    KnownMotif {
        name: "PolyA_signal",
        consensus: "AATAAA",
        description: "Polyadenylation signal",
    },
    KnownMotif {
        name: "EcoRI",
        consensus: "GAATTC",
        description: "EcoRI restriction site",
    },
    KnownMotif {
        name: "BamHI",
        consensus: "GGATCC",
        description: "BamHI restriction site",
    },
    KnownMotif {
        name: "HindIII",
        consensus: "AAGCTT",
        description: "HindIII restriction site",
    },
];

/// Look up a catalog entry by name, ignoring case.
pub fn find_motif(name: &str) -> MotifResult<&'static KnownMotif> {
    KNOWN_MOTIFS
        .iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
        .ok_or_else(|| MotifError::UnknownMotif(name.to_string()))
}
