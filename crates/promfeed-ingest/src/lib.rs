pub mod client;
pub mod dedup;
pub mod document;
pub mod error;
pub mod extract;
pub mod merge;
mod retry;
pub mod validate;

pub use client::FeedClient;
pub use dedup::Deduplicator;
pub use document::{FeedDocument, XmlElement};
pub use error::FeedError;
pub use extract::{extract_offers, Extraction, ExtractionStrategy};
pub use merge::{FeedReport, FeedStatus, MergedCatalog, OfferMerger};
pub use validate::{OfferValidator, PriceProblem, RejectReason};
