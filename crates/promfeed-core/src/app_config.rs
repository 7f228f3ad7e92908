use std::path::PathBuf;
use std::str::FromStr;

/// How the `available` attribute of a raw offer is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AvailabilityPolicy {
    /// The attribute (default `"true"`) must equal `"true"` after trimming and
    /// lowercasing; anything else rejects the offer.
    #[default]
    RequireTrue,
    /// The attribute is ignored; an offer is available when its quantity is
    /// positive. Never rejects.
    FromStock,
    /// The attribute is copied through (absent means `true`). Never rejects.
    Passthrough,
}

impl std::fmt::Display for AvailabilityPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityPolicy::RequireTrue => write!(f, "require-true"),
            AvailabilityPolicy::FromStock => write!(f, "from-stock"),
            AvailabilityPolicy::Passthrough => write!(f, "passthrough"),
        }
    }
}

impl FromStr for AvailabilityPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "require-true" => Ok(AvailabilityPolicy::RequireTrue),
            "from-stock" => Ok(AvailabilityPolicy::FromStock),
            "passthrough" => Ok(AvailabilityPolicy::Passthrough),
            other => Err(format!(
                "unknown availability policy '{other}'; expected require-true, from-stock, or passthrough"
            )),
        }
    }
}

/// Identity used to detect repeated offers within one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupKey {
    /// Only offers with a non-empty vendor code are deduplicated.
    #[default]
    VendorCode,
    /// Vendor code when present, otherwise the offer id.
    VendorCodeOrId,
}

impl std::fmt::Display for DedupKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DedupKey::VendorCode => write!(f, "vendor-code"),
            DedupKey::VendorCodeOrId => write!(f, "vendor-code-or-id"),
        }
    }
}

impl FromStr for DedupKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "vendor-code" => Ok(DedupKey::VendorCode),
            "vendor-code-or-id" => Ok(DedupKey::VendorCodeOrId),
            other => Err(format!(
                "unknown dedup key '{other}'; expected vendor-code or vendor-code-or-id"
            )),
        }
    }
}

/// Where raw feed documents come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSourceConfig {
    /// `GET <base_url>/<feed_id>.xml`
    Remote { base_url: String },
    /// `<dir>/<feed_id>.xml`
    Local { dir: PathBuf },
}

impl std::fmt::Display for FeedSourceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedSourceConfig::Remote { base_url } => write!(f, "remote {base_url}"),
            FeedSourceConfig::Local { dir } => write!(f, "local {}", dir.display()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub feeds_path: PathBuf,
    /// Feed ids given directly in the environment; overrides the feeds file.
    pub feed_ids: Option<Vec<String>>,
    pub feed_source: FeedSourceConfig,
    /// Directory where fetched remote feeds are saved as `raw_feed_<id>.xml`.
    pub cache_dir: Option<PathBuf>,
    pub output_dir: PathBuf,
    pub output_prefix: String,
    /// Explicit artifact names. When set, the merged offers are split across
    /// exactly this many files instead of being chunked by `chunk_size`.
    pub output_files: Option<Vec<String>>,
    pub chunk_size: usize,
    pub availability_policy: AvailabilityPolicy,
    pub dedup_key: DedupKey,
    /// Write empty documents when no offer survives validation.
    pub emit_empty: bool,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_secs: u64,
    /// Width of the ordered fetch window. `1` fetches strictly one feed at a time.
    pub max_concurrent_fetches: usize,
}
