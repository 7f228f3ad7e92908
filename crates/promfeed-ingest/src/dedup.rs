use std::collections::HashSet;

use promfeed_core::{DedupKey, ValidatedOffer};

/// Run-scoped record of offer identities already emitted. First occurrence
/// wins; later repeats are dropped, never merged.
#[derive(Debug, Default)]
pub struct Deduplicator {
    key: DedupKey,
    seen: HashSet<String>,
    duplicates: usize,
}

impl Deduplicator {
    #[must_use]
    pub fn new(key: DedupKey) -> Self {
        Self {
            key,
            seen: HashSet::new(),
            duplicates: 0,
        }
    }

    /// Returns `true` if `offer` has not been seen before (or has no identity
    /// under the configured key) and records it.
    pub fn admit(&mut self, offer: &ValidatedOffer) -> bool {
        let Some(identity) = self.identity(offer) else {
            return true;
        };
        if self.seen.insert(identity) {
            true
        } else {
            self.duplicates += 1;
            false
        }
    }

    /// Keeps the first occurrence of each identity in `offers`, preserving
    /// order. Returns the survivors and how many were dropped by this call.
    pub fn retain_unique(&mut self, offers: Vec<ValidatedOffer>) -> (Vec<ValidatedOffer>, usize) {
        let before = self.duplicates;
        let unique = offers.into_iter().filter(|o| self.admit(o)).collect();
        (unique, self.duplicates - before)
    }

    /// Total duplicates dropped since this deduplicator was created.
    #[must_use]
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    /// Vendor codes and offer ids live in separate namespaces so that a
    /// vendor code `"123"` never collides with an offer id `"123"`.
    fn identity(&self, offer: &ValidatedOffer) -> Option<String> {
        let vendor_code = offer.vendor_code.as_deref().filter(|c| !c.is_empty());
        match (self.key, vendor_code) {
            (_, Some(code)) => Some(format!("vendor:{code}")),
            (DedupKey::VendorCode, None) => None,
            (DedupKey::VendorCodeOrId, None) => Some(format!("id:{}", offer.id)),
        }
    }
}
