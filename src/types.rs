use serde::Serialize;

use crate::{Error, Result, config::PagingConfig, storage::PageRequest};

pub const API_VERSION: &str = "v2";

/// Response envelope shared by every variant info endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResponse<T> {
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub response: Vec<QueryResult<T>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryResult<T> {
    pub id: String,
    pub num_results: usize,
    pub num_total_results: u64,
    pub result: Vec<T>,
}

impl<T> QueryResponse<T> {
    pub fn from_result(id: impl Into<String>, result: Vec<T>, num_total_results: u64) -> Self {
        Self {
            api_version: API_VERSION,
            error: None,
            response: vec![QueryResult {
                id: id.into(),
                num_results: result.len(),
                num_total_results,
                result,
            }],
        }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        Self {
            api_version: API_VERSION,
            error: Some(message.into()),
            response: vec![],
        }
    }
}

/// A hypermedia reference to a related resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

/// A response body accompanied by links to sibling resources.
#[derive(Debug, Serialize)]
pub struct LinkedResponse<T> {
    #[serde(flatten)]
    pub content: QueryResponse<T>,
    pub links: Vec<Link>,
}

/// Query parameters accepted by the variant info endpoints.
///
/// List parameters may be repeated (`studies=a&studies=b`) or comma separated
/// (`studies=a,b`), and also accept the `studies[]` spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariantInfoQuery {
    pub species: Option<String>,
    pub studies: Vec<String>,
    pub consequence_types: Vec<String>,
    pub maf: Option<String>,
    pub polyphen: Option<String>,
    pub sift: Option<String>,
    pub annot_vep_version: Option<String>,
    pub annot_vep_cache_version: Option<String>,
    pub skip: Option<usize>,
    pub limit: Option<usize>,
}

impl VariantInfoQuery {
    pub fn from_pairs(pairs: Vec<(String, String)>) -> Result<Self> {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.trim_end_matches("[]") {
                "species" => query.species = Some(value),
                "studies" => query.studies.extend(split_list(&value)),
                "annot-ct" => query.consequence_types.extend(split_list(&value)),
                "maf" => query.maf = Some(value),
                "polyphen" => query.polyphen = Some(value),
                "sift" => query.sift = Some(value),
                "annot-vep-version" => query.annot_vep_version = Some(value),
                "annot-vep-cache-version" => query.annot_vep_cache_version = Some(value),
                "skip" => query.skip = Some(parse_count("skip", &value)?),
                "limit" => query.limit = Some(parse_count("limit", &value)?),
                other => tracing::trace!(param = other, "ignoring unknown query parameter"),
            }
        }
        Ok(query)
    }

    /// The parameters in canonical order, as used when linking back to an endpoint.
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(species) = &self.species {
            pairs.push(("species", species.clone()));
        }
        pairs.extend(self.studies.iter().map(|s| ("studies", s.clone())));
        pairs.extend(self.consequence_types.iter().map(|ct| ("annot-ct", ct.clone())));
        let optional = [
            ("maf", &self.maf),
            ("polyphen", &self.polyphen),
            ("sift", &self.sift),
            ("annot-vep-version", &self.annot_vep_version),
            ("annot-vep-cache-version", &self.annot_vep_cache_version),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                pairs.push((name, value.clone()));
            }
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit", limit.to_string()));
        }
        pairs
    }

    pub fn page(&self, paging: PagingConfig) -> PageRequest {
        let limit = self.limit.unwrap_or(paging.default_limit).min(paging.max_limit);
        PageRequest::new(self.skip.unwrap_or(0), limit)
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
}

fn parse_count(name: &str, value: &str) -> Result<usize> {
    value
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("{name} must be a non-negative integer, got '{value}'")))
}

/// Version of the GA4GH Beacon model the descriptor follows.
pub const BEACON_API_VERSION: &str = "v1.0";

/// Static GA4GH Beacon descriptor of the service.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    pub id: String,
    pub name: String,
    pub api_version: String,
    pub organization: BeaconOrganization,
    pub description: Option<String>,
    pub version: String,
    pub welcome_url: String,
    pub alternative_url: Option<String>,
    pub create_date_time: Option<String>,
    pub update_date_time: Option<String>,
    pub datasets: Vec<BeaconDataset>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconOrganization {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub welcome_url: String,
}

/// One species datastore advertised by the beacon.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeaconDataset {
    pub id: String,
    pub name: String,
}
