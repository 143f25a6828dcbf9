use super::{DatastoreRouter, PageRequest, VariantStore};
use crate::{
    Error, Result,
    annotation::AnnotationVersionConstraint,
    filters::{FilterSet, VariantFilter},
    models::{Annotation, SourceEntry, VariantEntity},
    so_terms,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::RwLock;

/// One annotation run known to a datastore.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationMetadata {
    pub vep_version: String,
    pub cache_version: String,
    #[serde(default)]
    pub default_version: bool,
}

/// A variant as persisted, carrying the annotations of every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredVariant {
    pub chromosome: String,
    pub start: u64,
    pub end: u64,
    pub reference: String,
    pub alternate: String,
    #[serde(default)]
    pub main_id: Option<String>,
    #[serde(default)]
    pub ids: BTreeSet<String>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub source_entries: Vec<SourceEntry>,
}

/// On-disk layout of a species datastore.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreDocument {
    #[serde(default)]
    pub annotation_metadata: Vec<AnnotationMetadata>,
    #[serde(default)]
    pub variants: Vec<StoredVariant>,
}

/// Read-only variant store held in memory.
pub struct LocalVariantStore {
    document: StoreDocument,
}

impl LocalVariantStore {
    pub fn new(document: StoreDocument) -> Self {
        Self { document }
    }

    pub async fn open(path: &Path) -> Result<Self> {
        let raw = fs::read(path).await?;
        let document: StoreDocument = serde_json::from_slice(&raw)?;
        tracing::debug!(
            path = %path.display(),
            variants = document.variants.len(),
            "loaded variant datastore"
        );
        Ok(Self::new(document))
    }

    /// The annotation run to attach: the requested one, or the store's default.
    fn select_metadata(
        &self,
        constraint: Option<&AnnotationVersionConstraint>,
    ) -> Result<Option<&AnnotationMetadata>> {
        let metadata = &self.document.annotation_metadata;
        match constraint {
            Some(constraint) => metadata
                .iter()
                .find(|m| constraint.matches(&m.vep_version, &m.cache_version))
                .map(Some)
                .ok_or_else(|| {
                    Error::AnnotationMetadataNotFound(format!(
                        "No annotation metadata found for VEP version {} and VEP cache version {}",
                        constraint.vep_version, constraint.vep_cache_version
                    ))
                }),
            None => Ok(metadata
                .iter()
                .find(|m| m.default_version)
                .or_else(|| metadata.last())),
        }
    }

    fn to_entity(stored: &StoredVariant, metadata: Option<&AnnotationMetadata>) -> VariantEntity {
        let annotation = metadata.and_then(|m| {
            stored
                .annotations
                .iter()
                .find(|a| a.vep_version == m.vep_version && a.vep_cache_version == m.cache_version)
                .cloned()
        });

        VariantEntity {
            chromosome: stored.chromosome.clone(),
            start: stored.start,
            end: stored.end,
            reference: stored.reference.clone(),
            alternate: stored.alternate.clone(),
            main_id: stored.main_id.clone(),
            ids: stored.ids.clone(),
            annotation,
            source_entries: stored.source_entries.clone(),
        }
    }

    fn matching<'a>(
        &'a self,
        ids: &'a [String],
        predicates: &'a [Predicate],
    ) -> impl Iterator<Item = &'a StoredVariant> + 'a {
        self.document.variants.iter().filter(move |variant| {
            has_any_id(variant, ids) && predicates.iter().all(|p| p.matches(variant))
        })
    }
}

#[async_trait]
impl VariantStore for LocalVariantStore {
    async fn find_by_coordinates(
        &self,
        chromosome: &str,
        start: u64,
        reference: &str,
        alternate: Option<&str>,
        annotation: Option<&AnnotationVersionConstraint>,
    ) -> Result<Vec<VariantEntity>> {
        let metadata = self.select_metadata(annotation)?;
        Ok(self
            .document
            .variants
            .iter()
            .filter(|v| v.chromosome == chromosome && v.start == start && v.reference == reference)
            .filter(|v| alternate.is_none_or(|alt| v.alternate == alt))
            .map(|v| Self::to_entity(v, metadata))
            .collect())
    }

    async fn find_by_ids_and_filters(
        &self,
        ids: &[String],
        filters: &FilterSet,
        annotation: Option<&AnnotationVersionConstraint>,
        page: PageRequest,
    ) -> Result<Vec<VariantEntity>> {
        let metadata = self.select_metadata(annotation)?;
        let predicates = Predicate::compile(filters)?;
        Ok(self
            .matching(ids, &predicates)
            .skip(page.skip)
            .take(page.limit)
            .map(|v| Self::to_entity(v, metadata))
            .collect())
    }

    async fn count_by_ids_and_filters(&self, ids: &[String], filters: &FilterSet) -> Result<u64> {
        let predicates = Predicate::compile(filters)?;
        Ok(self.matching(ids, &predicates).count() as u64)
    }
}

fn has_any_id(variant: &StoredVariant, ids: &[String]) -> bool {
    ids.iter()
        .any(|id| variant.main_id.as_deref() == Some(id.as_str()) || variant.ids.contains(id))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
}

/// A relational threshold such as `<0.01` or `>=0.5`. A bare number means equality.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Threshold {
    comparison: Comparison,
    value: f64,
}

impl Threshold {
    fn parse(filter: &str, raw: &str) -> Result<Self> {
        let raw = raw.trim();
        let (comparison, number) = if let Some(rest) = raw.strip_prefix("<=") {
            (Comparison::Le, rest)
        } else if let Some(rest) = raw.strip_prefix(">=") {
            (Comparison::Ge, rest)
        } else if let Some(rest) = raw.strip_prefix('<') {
            (Comparison::Lt, rest)
        } else if let Some(rest) = raw.strip_prefix('>') {
            (Comparison::Gt, rest)
        } else if let Some(rest) = raw.strip_prefix('=') {
            (Comparison::Eq, rest)
        } else {
            (Comparison::Eq, raw)
        };

        let value = number
            .trim()
            .parse::<f64>()
            .map_err(|_| Error::InvalidFilter(format!("{filter}: cannot parse '{raw}'")))?;

        Ok(Self { comparison, value })
    }

    fn accepts(&self, value: f64) -> bool {
        match self.comparison {
            Comparison::Lt => value < self.value,
            Comparison::Le => value <= self.value,
            Comparison::Gt => value > self.value,
            Comparison::Ge => value >= self.value,
            Comparison::Eq => value == self.value,
        }
    }
}

/// A [`VariantFilter`] translated into something this store can evaluate.
#[derive(Debug, Clone)]
enum Predicate {
    Maf(Threshold),
    Polyphen(Threshold),
    Sift(Threshold),
    Studies(Vec<String>),
    ConsequenceTypes(BTreeSet<u32>),
}

impl Predicate {
    fn compile(filters: &FilterSet) -> Result<Vec<Self>> {
        filters
            .iter()
            .map(|filter| -> Result<Self> {
                Ok(match filter {
                    VariantFilter::Maf(raw) => Predicate::Maf(Threshold::parse(filter.name(), raw)?),
                    VariantFilter::PolyphenScore(raw) => {
                        Predicate::Polyphen(Threshold::parse(filter.name(), raw)?)
                    }
                    VariantFilter::SiftScore(raw) => {
                        Predicate::Sift(Threshold::parse(filter.name(), raw)?)
                    }
                    VariantFilter::Studies(studies) => Predicate::Studies(studies.clone()),
                    VariantFilter::ConsequenceTypes(terms) => Predicate::ConsequenceTypes(
                        terms
                            .iter()
                            .map(|term| {
                                so_terms::parse_accession(term).ok_or_else(|| {
                                    Error::InvalidFilter(format!(
                                        "{}: unknown consequence type '{term}'",
                                        filter.name()
                                    ))
                                })
                            })
                            .collect::<Result<_>>()?,
                    ),
                })
            })
            .collect()
    }

    fn matches(&self, variant: &StoredVariant) -> bool {
        let consequence_types = || {
            variant
                .annotations
                .iter()
                .flat_map(|a| a.consequence_types.iter())
        };

        match self {
            Predicate::Maf(threshold) => variant
                .source_entries
                .iter()
                .flat_map(|entry| entry.cohort_stats.values())
                .any(|stats| threshold.accepts(stats.maf)),
            Predicate::Polyphen(threshold) => consequence_types()
                .filter_map(|ct| ct.polyphen.as_ref())
                .any(|score| threshold.accepts(score.score)),
            Predicate::Sift(threshold) => consequence_types()
                .filter_map(|ct| ct.sift.as_ref())
                .any(|score| threshold.accepts(score.score)),
            Predicate::Studies(studies) => variant
                .source_entries
                .iter()
                .any(|entry| studies.contains(&entry.study_id)),
            Predicate::ConsequenceTypes(accessions) => consequence_types()
                .any(|ct| !ct.so_accessions.is_disjoint(accessions)),
        }
    }
}

/// Loads one JSON datastore per species database from `data_dir`.
///
/// Stores are loaded on first use and kept for the life of the process.
pub struct LocalDatastoreRouter {
    data_dir: PathBuf,
    db_prefix: String,
    stores: RwLock<HashMap<String, Arc<LocalVariantStore>>>,
}

impl LocalDatastoreRouter {
    pub fn new(data_dir: PathBuf, db_prefix: String) -> Self {
        Self {
            data_dir,
            db_prefix,
            stores: RwLock::new(HashMap::new()),
        }
    }

    /// Database name for a species, e.g. `eva_hsapiens_grch37`.
    pub fn database_name(&self, species: &str) -> String {
        format!("{}{}", self.db_prefix, species)
    }

    /// Path of a database file directly under `data_dir`, or `None` when the name
    /// would resolve anywhere else.
    fn database_path(&self, database: &str) -> Option<PathBuf> {
        let is_plain = !database.is_empty()
            && !database.contains(['/', '\\'])
            && !database.contains("..")
            && Path::new(database).file_name() == Some(OsStr::new(database));
        is_plain.then(|| self.data_dir.join(format!("{database}.json")))
    }
}

#[async_trait]
impl DatastoreRouter for LocalDatastoreRouter {
    async fn activate(&self, species: &str) -> Result<Arc<dyn VariantStore>> {
        let database = self.database_name(species);

        if let Some(store) = self.stores.read().await.get(&database) {
            return Ok(store.clone());
        }

        let Some(path) = self.database_path(&database) else {
            tracing::warn!(species, "rejected species name");
            return Err(Error::SpeciesNotFound(species.to_string()));
        };
        if !fs::try_exists(&path).await? {
            return Err(Error::SpeciesNotFound(species.to_string()));
        }

        let mut stores = self.stores.write().await;
        if let Some(store) = stores.get(&database) {
            return Ok(store.clone());
        }
        let store = Arc::new(LocalVariantStore::open(&path).await?);
        tracing::info!(species, database = %database, "activated datastore");
        stores.insert(database, store.clone());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConsequenceType, Score, VariantStats};
    use std::collections::BTreeMap;

    fn stats(maf: f64) -> BTreeMap<String, VariantStats> {
        [(
            "ALL".to_string(),
            VariantStats {
                maf,
                ..Default::default()
            },
        )]
        .into_iter()
        .collect()
    }

    fn annotation(version: &str, polyphen: f64, so: u32) -> Annotation {
        Annotation {
            chromosome: "1".to_string(),
            start: 1000,
            end: 1000,
            vep_version: version.to_string(),
            vep_cache_version: version.to_string(),
            consequence_types: vec![ConsequenceType {
                polyphen: Some(Score {
                    score: polyphen,
                    description: None,
                }),
                so_accessions: [so].into_iter().collect(),
                ..Default::default()
            }],
            xrefs: vec![],
        }
    }

    fn variant(alternate: &str, id: &str, study: &str, maf: f64) -> StoredVariant {
        StoredVariant {
            chromosome: "1".to_string(),
            start: 1000,
            end: 1000,
            reference: "A".to_string(),
            alternate: alternate.to_string(),
            main_id: Some(id.to_string()),
            ids: [id.to_string(), format!("ss{alternate}")].into_iter().collect(),
            annotations: vec![annotation("78", 0.9, 1583), annotation("82", 0.1, 1631)],
            source_entries: vec![SourceEntry {
                study_id: study.to_string(),
                file_id: "f1".to_string(),
                secondary_alternates: vec![],
                format: None,
                attributes: BTreeMap::new(),
                cohort_stats: stats(maf),
                samples_data: BTreeMap::new(),
            }],
        }
    }

    fn store() -> LocalVariantStore {
        LocalVariantStore::new(StoreDocument {
            annotation_metadata: vec![
                AnnotationMetadata {
                    vep_version: "78".to_string(),
                    cache_version: "78".to_string(),
                    default_version: true,
                },
                AnnotationMetadata {
                    vep_version: "82".to_string(),
                    cache_version: "82".to_string(),
                    default_version: false,
                },
            ],
            variants: vec![
                variant("G", "rs1", "PRJEB1", 0.005),
                variant("T", "rs1", "PRJEB2", 0.3),
                variant("C", "rs2", "PRJEB1", 0.2),
            ],
        })
    }

    fn ids(id: &str) -> Vec<String> {
        vec![id.to_string()]
    }

    #[tokio::test]
    async fn test_find_by_coordinates_with_and_without_alternate() {
        let store = store();
        let all = store.find_by_coordinates("1", 1000, "A", None, None).await.unwrap();
        assert_eq!(all.len(), 3);

        let one = store
            .find_by_coordinates("1", 1000, "A", Some("T"), None)
            .await
            .unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].alternate, "T");
    }

    #[tokio::test]
    async fn test_default_annotation_is_attached() {
        let found = store()
            .find_by_coordinates("1", 1000, "A", Some("G"), None)
            .await
            .unwrap();
        assert_eq!(found[0].annotation.as_ref().unwrap().vep_version, "78");
    }

    #[tokio::test]
    async fn test_requested_annotation_is_attached() {
        let constraint = AnnotationVersionConstraint::new("82", "82");
        let found = store()
            .find_by_coordinates("1", 1000, "A", Some("G"), Some(&constraint))
            .await
            .unwrap();
        assert_eq!(found[0].annotation.as_ref().unwrap().vep_version, "82");
    }

    #[tokio::test]
    async fn test_unknown_annotation_version() {
        let constraint = AnnotationVersionConstraint::new("92", "89");
        let err = store()
            .find_by_ids_and_filters(&ids("rs1"), &FilterSet::default(), Some(&constraint), PageRequest::new(0, 10))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AnnotationMetadataNotFound(ref msg) if msg.contains("92")));
    }

    #[tokio::test]
    async fn test_maf_filter_and_count() {
        let store = store();
        let filters = FilterSet::compose(Some("<0.01"), None, None, &[], &[]);
        let found = store
            .find_by_ids_and_filters(&ids("rs1"), &filters, None, PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].alternate, "G");
        assert_eq!(store.count_by_ids_and_filters(&ids("rs1"), &filters).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_ignores_pagination() {
        let store = store();
        let filters = FilterSet::default();
        let page = store
            .find_by_ids_and_filters(&ids("rs1"), &filters, None, PageRequest::new(0, 1))
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(store.count_by_ids_and_filters(&ids("rs1"), &filters).await.unwrap(), 2);

        let second = store
            .find_by_ids_and_filters(&ids("rs1"), &filters, None, PageRequest::new(1, 1))
            .await
            .unwrap();
        assert_eq!(second[0].alternate, "T");
    }

    #[tokio::test]
    async fn test_cross_reference_ids_match() {
        let found = store()
            .find_by_ids_and_filters(&ids("ssC"), &FilterSet::default(), None, PageRequest::new(0, 10))
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].main_id.as_deref(), Some("rs2"));
    }

    #[tokio::test]
    async fn test_study_polyphen_and_consequence_filters() {
        let store = store();
        let studies = vec!["PRJEB2".to_string()];
        let filters = FilterSet::compose(None, None, None, &studies, &[]);
        assert_eq!(store.count_by_ids_and_filters(&ids("rs1"), &filters).await.unwrap(), 1);

        let filters = FilterSet::compose(None, Some(">0.95"), None, &[], &[]);
        assert_eq!(store.count_by_ids_and_filters(&ids("rs1"), &filters).await.unwrap(), 0);

        let cts = vec!["SO:0001631".to_string()];
        let filters = FilterSet::compose(None, None, None, &[], &cts);
        assert_eq!(store.count_by_ids_and_filters(&ids("rs1"), &filters).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_malformed_threshold_is_invalid_filter() {
        let filters = FilterSet::compose(None, None, Some("low"), &[], &[]);
        let err = store()
            .count_by_ids_and_filters(&ids("rs1"), &filters)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidFilter(_)));
    }

    #[test]
    fn test_threshold_parsing() {
        let t = Threshold::parse("maf", "<=0.5").unwrap();
        assert!(t.accepts(0.5));
        assert!(!t.accepts(0.51));
        assert!(Threshold::parse("maf", "0.2").unwrap().accepts(0.2));
        assert!(Threshold::parse("maf", ">x").is_err());
    }

    #[tokio::test]
    async fn test_router_loads_store_per_species() {
        let dir = tempfile::tempdir().unwrap();
        let document = StoreDocument {
            annotation_metadata: vec![],
            variants: vec![variant("G", "rs1", "PRJEB1", 0.1)],
        };
        std::fs::write(
            dir.path().join("eva_hsapiens.json"),
            serde_json::to_vec(&document).unwrap(),
        )
        .unwrap();

        let router = LocalDatastoreRouter::new(dir.path().to_path_buf(), "eva_".to_string());
        assert_eq!(router.database_name("hsapiens"), "eva_hsapiens");

        let store = router.activate("hsapiens").await.unwrap();
        let found = store
            .find_by_coordinates("1", 1000, "A", None, None)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert!(found[0].annotation.is_none());

        let missing = router.activate("mmusculus").await;
        assert!(matches!(missing, Err(Error::SpeciesNotFound(_))));
    }

    #[tokio::test]
    async fn test_router_rejects_species_outside_data_dir() {
        let root = tempfile::tempdir().unwrap();
        let data_dir = root.path().join("data");
        std::fs::create_dir_all(data_dir.join("eva_sub")).unwrap();
        let document = serde_json::to_vec(&StoreDocument::default()).unwrap();
        std::fs::write(root.path().join("secret.json"), &document).unwrap();
        std::fs::write(data_dir.join("eva_sub").join("x.json"), &document).unwrap();

        let unprefixed = LocalDatastoreRouter::new(data_dir.clone(), String::new());
        for species in ["../secret", "..", "sub\\x", ""] {
            assert!(
                matches!(unprefixed.activate(species).await, Err(Error::SpeciesNotFound(_))),
                "{species}"
            );
        }

        let prefixed = LocalDatastoreRouter::new(data_dir, "eva_".to_string());
        assert!(matches!(
            prefixed.activate("sub/x").await,
            Err(Error::SpeciesNotFound(_))
        ));
    }

    #[test]
    fn test_stored_document_reads_back() {
        let document = store().document;
        let raw = serde_json::to_vec(&document).unwrap();
        let reread: StoreDocument = serde_json::from_slice(&raw).unwrap();
        assert_eq!(reread, document);
    }
}
