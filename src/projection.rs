//! Output shapes for the variant info endpoints.

use serde::Serialize;

use crate::{
    models::{Annotation, SourceEntry, SourceEntryKey, VariantEntity, VariantSummary},
    pipeline::PagedResult,
};

/// Which part of the resolved variants an endpoint returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    CoreInfo,
    Annotations,
    SourceEntries,
    SourceEntry(SourceEntryKey),
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::CoreInfo => "coreinfo",
            View::Annotations => "annotations",
            View::SourceEntries => "source-entries",
            View::SourceEntry(_) => "source-entry",
        }
    }
}

/// One element of a projected result. `None` renders as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProjectedItem {
    Summary(VariantSummary),
    Annotation(Option<Annotation>),
    SourceEntry(Option<SourceEntry>),
}

/// Shapes resolved variants for `view`.
///
/// Core info keeps the resolution total, which for ID lookups counts every match across
/// pages. The other views report how many items they emitted.
pub fn project(view: &View, resolved: PagedResult<VariantEntity>) -> PagedResult<ProjectedItem> {
    match view {
        View::CoreInfo => PagedResult::new(
            resolved
                .items
                .iter()
                .map(|v| ProjectedItem::Summary(summarize(v)))
                .collect(),
            resolved.total,
        ),
        View::Annotations => PagedResult::counted(
            resolved
                .items
                .into_iter()
                .map(|v| ProjectedItem::Annotation(v.annotation))
                .collect(),
        ),
        View::SourceEntries => PagedResult::counted(
            resolved
                .items
                .into_iter()
                .flat_map(|v| v.source_entries)
                .map(|entry| ProjectedItem::SourceEntry(Some(entry)))
                .collect(),
        ),
        View::SourceEntry(key) => PagedResult::counted(
            resolved
                .items
                .iter()
                .map(|v| ProjectedItem::SourceEntry(v.source_entry(&key.file_id, &key.study_id).cloned()))
                .collect(),
        ),
    }
}

/// Core-info summary of a variant.
///
/// The alternate slot carries the reference allele. Existing clients of the core-info
/// endpoint receive it this way, so it is kept until that contract is changed on purpose.
pub fn summarize(variant: &VariantEntity) -> VariantSummary {
    VariantSummary {
        chromosome: variant.chromosome.clone(),
        start: variant.start,
        end: variant.end,
        reference: variant.reference.clone(),
        alternate: variant.reference.clone(),
        main_id: variant.main_id.clone(),
        ids: variant.ids.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeMap, BTreeSet};

    fn source_entry(study_id: &str, file_id: &str) -> SourceEntry {
        SourceEntry {
            study_id: study_id.to_string(),
            file_id: file_id.to_string(),
            secondary_alternates: vec![],
            format: Some("GT".to_string()),
            attributes: BTreeMap::new(),
            cohort_stats: BTreeMap::new(),
            samples_data: BTreeMap::new(),
        }
    }

    fn variant(entries: Vec<SourceEntry>, annotated: bool) -> VariantEntity {
        VariantEntity {
            chromosome: "chr1".to_string(),
            start: 12345,
            end: 12345,
            reference: "A".to_string(),
            alternate: "G".to_string(),
            main_id: Some("rs123".to_string()),
            ids: ["rs123", "ss1"].iter().map(|s| s.to_string()).collect::<BTreeSet<_>>(),
            annotation: annotated.then(|| Annotation {
                chromosome: "chr1".to_string(),
                start: 12345,
                end: 12345,
                vep_version: "78".to_string(),
                vep_cache_version: "78".to_string(),
                consequence_types: vec![],
                xrefs: vec![],
            }),
            source_entries: entries,
        }
    }

    #[test]
    fn test_core_info_duplicates_reference_into_alternate() {
        let projected = project(
            &View::CoreInfo,
            PagedResult::new(vec![variant(vec![], false)], 1),
        );
        match &projected.items[0] {
            ProjectedItem::Summary(summary) => {
                assert_eq!(summary.reference, "A");
                assert_eq!(summary.alternate, "A");
                assert_eq!(summary.main_id.as_deref(), Some("rs123"));
                assert_eq!(summary.ids.len(), 2);
            }
            other => panic!("expected summary, got {other:?}"),
        }
    }

    #[test]
    fn test_core_info_passes_total_through() {
        let projected = project(&View::CoreInfo, PagedResult::new(vec![variant(vec![], false)], 40));
        assert_eq!(projected.items.len(), 1);
        assert_eq!(projected.total, 40);
    }

    #[test]
    fn test_annotations_allow_missing_and_count_emitted() {
        let projected = project(
            &View::Annotations,
            PagedResult::new(vec![variant(vec![], true), variant(vec![], false)], 40),
        );
        assert_eq!(projected.total, 2);
        assert!(matches!(projected.items[1], ProjectedItem::Annotation(None)));
        assert_eq!(serde_json::to_value(&projected.items[1]).unwrap(), serde_json::Value::Null);
    }

    #[test]
    fn test_source_entries_are_flattened() {
        let projected = project(
            &View::SourceEntries,
            PagedResult::new(
                vec![
                    variant(vec![source_entry("s1", "f1"), source_entry("s2", "f2")], false),
                    variant(vec![source_entry("s3", "f3")], false),
                ],
                2,
            ),
        );
        assert_eq!(projected.total, 3);
        assert_eq!(projected.items.len(), 3);
    }

    #[test]
    fn test_single_source_entry_with_placeholder() {
        let key = SourceEntryKey::parse("proj1_file9").unwrap();
        let projected = project(
            &View::SourceEntry(key),
            PagedResult::new(
                vec![
                    variant(vec![source_entry("proj1", "file9")], false),
                    variant(vec![source_entry("proj1", "file1")], false),
                ],
                2,
            ),
        );
        assert_eq!(projected.total, 2);
        assert!(matches!(&projected.items[0], ProjectedItem::SourceEntry(Some(e)) if e.file_id == "file9"));
        assert!(matches!(projected.items[1], ProjectedItem::SourceEntry(None)));
    }
}
