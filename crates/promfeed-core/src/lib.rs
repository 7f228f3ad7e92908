pub mod app_config;
pub mod config;
pub mod feeds;
pub mod offers;

pub use app_config::{AppConfig, AvailabilityPolicy, DedupKey, FeedSourceConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use feeds::{load_feeds, validate_feed_ids, validate_output_files, FeedsFile};
pub use offers::{is_xml_char, xml_safe, OfferParam, ValidatedOffer, PASSTHROUGH_FIELDS};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read feeds file {path}: {source}")]
    FeedsFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse feeds file: {0}")]
    FeedsFileParse(#[from] serde_yaml::Error),

    #[error("invalid run configuration: {0}")]
    Validation(String),
}
