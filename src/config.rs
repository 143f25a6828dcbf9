use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "evaws")]
#[command(about = "Variant info web service")]
pub struct Config {
    /// Host address to bind to
    #[arg(long, env = "EVAWS_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, env = "EVAWS_PORT", default_value = "8080")]
    pub port: u16,

    /// Base URL used for hypermedia links (e.g., https://example.com/eva)
    #[arg(long, env = "EVAWS_BASE_URL")]
    pub base_url: Option<String>,

    /// Directory containing one JSON datastore per species database
    #[arg(long, env = "EVAWS_DATA_DIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Prefix prepended to the species name to form the database name
    #[arg(long, env = "EVAWS_DB_PREFIX", default_value = "eva_")]
    pub db_prefix: String,

    /// Enable CORS for all origins
    #[arg(long, env = "EVAWS_CORS", default_value = "true")]
    pub cors: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    pub log_level: String,

    /// Page size used when the request has no `limit`
    #[arg(long, env = "EVAWS_DEFAULT_LIMIT", default_value = "10")]
    pub default_limit: usize,

    /// Upper bound for the `limit` parameter
    #[arg(long, env = "EVAWS_MAX_LIMIT", default_value = "10000")]
    pub max_limit: usize,

    /// Species shown as the example in the service descriptor
    #[arg(long, env = "EVAWS_DOCS_SPECIES", default_value = "hsapiens_grch37")]
    pub docs_species: String,
}

impl Config {
    pub fn effective_base_url(&self) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| format!("http://{}:{}", self.host, self.port))
    }

    pub fn paging(&self) -> PagingConfig {
        PagingConfig {
            default_limit: self.default_limit,
            max_limit: self.max_limit.max(1),
        }
    }
}

/// Pagination bounds applied to incoming `skip`/`limit` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PagingConfig {
    fn default() -> Self {
        Self {
            default_limit: 10,
            max_limit: 10000,
        }
    }
}
