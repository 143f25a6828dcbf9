//! Sequence Ontology consequence-type vocabulary.
//!
//! Consequence types are stored as integer SO accessions and rendered on the wire as
//! `{"soName": ..., "soAccession": "SO:0001583"}` objects. Both forms are read back.

use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

const ACCESSION_TO_TERM: &[(u32, &str)] = &[
    (1566, "regulatory_region_variant"),
    (1567, "stop_retained_variant"),
    (1574, "splice_acceptor_variant"),
    (1575, "splice_donor_variant"),
    (1578, "stop_lost"),
    (1580, "coding_sequence_variant"),
    (1582, "initiator_codon_variant"),
    (1583, "missense_variant"),
    (1587, "stop_gained"),
    (1589, "frameshift_variant"),
    (1619, "non_coding_transcript_variant"),
    (1620, "mature_miRNA_variant"),
    (1621, "NMD_transcript_variant"),
    (1623, "5_prime_UTR_variant"),
    (1624, "3_prime_UTR_variant"),
    (1626, "incomplete_terminal_codon_variant"),
    (1627, "intron_variant"),
    (1628, "intergenic_variant"),
    (1630, "splice_region_variant"),
    (1631, "upstream_gene_variant"),
    (1632, "downstream_gene_variant"),
    (1782, "TF_binding_site_variant"),
    (1792, "non_coding_transcript_exon_variant"),
    (1818, "protein_altering_variant"),
    (1819, "synonymous_variant"),
    (1821, "inframe_insertion"),
    (1822, "inframe_deletion"),
    (1889, "transcript_amplification"),
    (1891, "regulatory_region_amplification"),
    (1892, "TFBS_amplification"),
    (1893, "transcript_ablation"),
    (1894, "regulatory_region_ablation"),
    (1895, "TFBS_ablation"),
    (1906, "feature_truncation"),
    (1907, "feature_elongation"),
    (2012, "start_lost"),
    (2019, "start_retained_variant"),
];

/// Term name for an SO accession number, if it is part of the vocabulary.
pub fn term_name(accession: u32) -> Option<&'static str> {
    ACCESSION_TO_TERM
        .binary_search_by_key(&accession, |(code, _)| *code)
        .ok()
        .map(|idx| ACCESSION_TO_TERM[idx].1)
}

/// Accession number for a term name.
pub fn accession_for(term: &str) -> Option<u32> {
    ACCESSION_TO_TERM
        .iter()
        .find(|(_, name)| *name == term)
        .map(|(code, _)| *code)
}

/// Canonical `SO:NNNNNNN` form of an accession number.
pub fn accession_string(accession: u32) -> String {
    format!("SO:{accession:07}")
}

/// Parses `SO:0001583`, `1583` or a term name like `missense_variant`.
pub fn parse_accession(term: &str) -> Option<u32> {
    let trimmed = term.trim();
    let digits = trimmed.strip_prefix("SO:").unwrap_or(trimmed);
    digits
        .parse::<u32>()
        .ok()
        .or_else(|| accession_for(trimmed))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SoTerm {
    so_name: Option<&'static str>,
    so_accession: String,
}

/// `serialize_with` helper for a set of SO accession numbers.
pub fn serialize<S>(accessions: &BTreeSet<u32>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    let mut seq = serializer.serialize_seq(Some(accessions.len()))?;
    for &accession in accessions {
        seq.serialize_element(&SoTerm {
            so_name: term_name(accession),
            so_accession: accession_string(accession),
        })?;
    }
    seq.end()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredTerm {
    Code(u32),
    Term {
        #[serde(rename = "soAccession")]
        so_accession: String,
    },
}

/// `deserialize_with` counterpart of [`serialize`]: accepts bare accession numbers
/// and `{"soAccession": ...}` objects.
pub fn deserialize<'de, D>(deserializer: D) -> Result<BTreeSet<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Vec::<StoredTerm>::deserialize(deserializer)?
        .into_iter()
        .map(|term| match term {
            StoredTerm::Code(code) => Ok(code),
            StoredTerm::Term { so_accession } => parse_accession(&so_accession).ok_or_else(|| {
                <D::Error as de::Error>::custom(format!("unknown SO accession '{so_accession}'"))
            }),
        })
        .collect()
}
