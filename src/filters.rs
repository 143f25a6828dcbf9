//! Composition of the optional variant filters.
//!
//! This layer only records which filters were requested and in what order. Parsing the
//! threshold expressions and evaluating them is the storage backend's job.

/// A single filter predicate, carried in its raw request form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantFilter {
    Maf(String),
    PolyphenScore(String),
    SiftScore(String),
    Studies(Vec<String>),
    ConsequenceTypes(Vec<String>),
}

impl VariantFilter {
    pub fn name(&self) -> &'static str {
        match self {
            VariantFilter::Maf(_) => "maf",
            VariantFilter::PolyphenScore(_) => "polyphen",
            VariantFilter::SiftScore(_) => "sift",
            VariantFilter::Studies(_) => "studies",
            VariantFilter::ConsequenceTypes(_) => "annot-ct",
        }
    }
}

/// Ordered, conjunctive set of filters. Empty matches every variant.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet(Vec<VariantFilter>);

impl FilterSet {
    /// Emits one predicate per supplied parameter in the order
    /// MAF, PolyPhen, SIFT, studies, consequence types.
    pub fn compose(
        maf: Option<&str>,
        polyphen: Option<&str>,
        sift: Option<&str>,
        studies: &[String],
        consequence_types: &[String],
    ) -> Self {
        let mut filters = Vec::new();
        if let Some(maf) = maf {
            filters.push(VariantFilter::Maf(maf.to_string()));
        }
        if let Some(polyphen) = polyphen {
            filters.push(VariantFilter::PolyphenScore(polyphen.to_string()));
        }
        if let Some(sift) = sift {
            filters.push(VariantFilter::SiftScore(sift.to_string()));
        }
        if !studies.is_empty() {
            filters.push(VariantFilter::Studies(studies.to_vec()));
        }
        if !consequence_types.is_empty() {
            filters.push(VariantFilter::ConsequenceTypes(consequence_types.to_vec()));
        }
        Self(filters)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VariantFilter> {
        self.0.iter()
    }
}
