//! Variant records as returned by the storage layer and projected by the views.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::{Error, Result};

/// A prediction score (PolyPhen, SIFT) with its qualitative label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConsequenceType {
    pub gene_name: Option<String>,
    pub ensembl_gene_id: Option<String>,
    pub ensembl_transcript_id: Option<String>,
    pub strand: Option<String>,
    pub biotype: Option<String>,
    pub c_dna_position: Option<u32>,
    pub cds_position: Option<u32>,
    pub aa_position: Option<u32>,
    pub aa_change: Option<String>,
    pub codon: Option<String>,
    pub polyphen: Option<Score>,
    pub sift: Option<Score>,
    #[serde(
        serialize_with = "crate::so_terms::serialize",
        deserialize_with = "crate::so_terms::deserialize"
    )]
    pub so_accessions: BTreeSet<u32>,
    pub relative_position: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Xref {
    pub id: String,
    pub src: String,
}

/// Output of one VEP annotation run for a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub vep_version: String,
    pub vep_cache_version: String,
    #[serde(default)]
    pub consequence_types: Vec<ConsequenceType>,
    #[serde(default)]
    pub xrefs: Vec<Xref>,
}

/// Allele and genotype statistics for one cohort.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VariantStats {
    pub maf: f64,
    pub mgf: f64,
    pub maf_allele: Option<String>,
    pub mgf_genotype: Option<String>,
    pub missing_alleles: u32,
    pub missing_genotypes: u32,
}

/// Per-study, per-file view of a variant, including sample data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceEntry {
    pub study_id: String,
    pub file_id: String,
    #[serde(default)]
    pub secondary_alternates: Vec<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub cohort_stats: BTreeMap<String, VariantStats>,
    #[serde(default)]
    pub samples_data: BTreeMap<String, BTreeMap<String, String>>,
}

/// A resolved variant with the annotation selected for the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantEntity {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    pub main_id: Option<String>,
    #[serde(default)]
    pub ids: BTreeSet<String>,
    #[serde(default)]
    pub annotation: Option<Annotation>,
    #[serde(default)]
    pub source_entries: Vec<SourceEntry>,
}

impl VariantEntity {
    pub fn source_entry(&self, file_id: &str, study_id: &str) -> Option<&SourceEntry> {
        self.source_entries
            .iter()
            .find(|entry| entry.file_id == file_id && entry.study_id == study_id)
    }
}

/// Reduced variant representation returned by the core-info view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantSummary {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    pub main_id: Option<String>,
    pub ids: BTreeSet<String>,
}

/// `studyId_fileId` key naming one source entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntryKey {
    pub study_id: String,
    pub file_id: String,
}

impl SourceEntryKey {
    /// Accepts exactly one `_` with non-empty text on both sides.
    pub fn parse(raw: &str) -> Result<Self> {
        let mut parts = raw.split('_');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(study_id), Some(file_id), None) if !study_id.is_empty() && !file_id.is_empty() => {
                Ok(Self {
                    study_id: study_id.to_string(),
                    file_id: file_id.to_string(),
                })
            }
            _ => Err(Error::MalformedSourceEntryKey),
        }
    }
}
