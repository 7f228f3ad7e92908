//! Accumulation of validated, deduplicated offers across feeds.
//!
//! Feeds are ingested one at a time in feed-list order; offers keep their
//! in-feed document order. A feed that failed to fetch or parse contributes
//! nothing and never stops the run.

use promfeed_core::{AvailabilityPolicy, DedupKey, ValidatedOffer};

use crate::dedup::Deduplicator;
use crate::document::FeedDocument;
use crate::error::FeedError;
use crate::extract::{extract_offers, ExtractionStrategy};
use crate::validate::{offer_id, OfferValidator};

const MISSING_ID_LABEL: &str = "<missing>";

/// What happened to one feed during the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedStatus {
    Merged {
        strategy: Option<ExtractionStrategy>,
        extracted: usize,
        accepted: usize,
        rejected: usize,
        duplicates: usize,
    },
    Failed {
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedReport {
    pub feed_id: String,
    pub status: FeedStatus,
}

impl FeedReport {
    /// Offers this feed added to the merged collection.
    #[must_use]
    pub fn accepted(&self) -> usize {
        match self.status {
            FeedStatus::Merged { accepted, .. } => accepted,
            FeedStatus::Failed { .. } => 0,
        }
    }
}

/// Builds the merged offer collection for one run. Owns the run-scoped
/// deduplication state, so separate mergers never share seen identities.
#[derive(Debug)]
pub struct OfferMerger {
    validator: OfferValidator,
    dedup: Deduplicator,
    offers: Vec<ValidatedOffer>,
    reports: Vec<FeedReport>,
}

impl OfferMerger {
    #[must_use]
    pub fn new(availability: AvailabilityPolicy, dedup_key: DedupKey) -> Self {
        Self {
            validator: OfferValidator::new(availability),
            dedup: Deduplicator::new(dedup_key),
            offers: Vec::new(),
            reports: Vec::new(),
        }
    }

    /// Folds one feed's fetch result into the collection and returns its report.
    ///
    /// Call in feed-list order: merged order is exactly call order.
    pub fn ingest(
        &mut self,
        feed_id: &str,
        fetched: Result<FeedDocument, FeedError>,
    ) -> &FeedReport {
        let status = match fetched {
            Ok(doc) => self.merge_document(feed_id, &doc),
            Err(e) => {
                tracing::error!(feed_id, error = %e, "feed failed; skipping");
                FeedStatus::Failed {
                    error: e.to_string(),
                }
            }
        };
        self.reports.push(FeedReport {
            feed_id: feed_id.to_string(),
            status,
        });
        &self.reports[self.reports.len() - 1]
    }

    fn merge_document(&mut self, feed_id: &str, doc: &FeedDocument) -> FeedStatus {
        let extraction = extract_offers(doc);
        let extracted = extraction.offers.len();
        match extraction.strategy {
            Some(strategy) => {
                tracing::debug!(feed_id, %strategy, extracted, "extracted offers");
            }
            None => tracing::info!(feed_id, "feed contains no offers"),
        }

        let mut valid = Vec::with_capacity(extracted);
        let mut rejected = 0usize;
        for node in &extraction.offers {
            match self.validator.validate(node) {
                Ok(offer) => valid.push(offer),
                Err(reason) => {
                    rejected += 1;
                    tracing::warn!(
                        feed_id,
                        offer_id = offer_id(node).unwrap_or(MISSING_ID_LABEL),
                        %reason,
                        "offer rejected"
                    );
                }
            }
        }

        let (unique, duplicates) = self.dedup.retain_unique(valid);
        let accepted = unique.len();
        self.offers.extend(unique);

        tracing::info!(
            feed_id,
            extracted,
            accepted,
            rejected,
            duplicates,
            "feed merged"
        );

        FeedStatus::Merged {
            strategy: extraction.strategy,
            extracted,
            accepted,
            rejected,
            duplicates,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offers.is_empty()
    }

    #[must_use]
    pub fn finish(self) -> MergedCatalog {
        MergedCatalog {
            offers: self.offers,
            reports: self.reports,
            duplicates: self.dedup.duplicates(),
        }
    }
}

/// The ordered result of a run, plus per-feed outcomes.
#[derive(Debug, Clone)]
pub struct MergedCatalog {
    pub offers: Vec<ValidatedOffer>,
    pub reports: Vec<FeedReport>,
    pub duplicates: usize,
}

impl MergedCatalog {
    #[must_use]
    pub fn failed_feeds(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, FeedStatus::Failed { .. }))
            .count()
    }

    #[must_use]
    pub fn rejected(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.status {
                FeedStatus::Merged { rejected, .. } => rejected,
                FeedStatus::Failed { .. } => 0,
            })
            .sum()
    }
}

#[cfg(test)]
#[path = "merge_test.rs"]
mod tests;
