//! Locating offer records inside feed documents of varying shape.

use crate::document::{FeedDocument, XmlElement};

/// Document shapes understood by the extractor, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionStrategy {
    /// `shop > offers > offer`, with `shop` either the root or a root child
    /// (YML catalogs).
    ShopOffers,
    /// Any `offer` element at any depth.
    AnyOffer,
    /// Any `item` element at any depth (legacy flat feeds).
    ItemList,
}

impl ExtractionStrategy {
    pub const PRIORITY: [ExtractionStrategy; 3] = [
        ExtractionStrategy::ShopOffers,
        ExtractionStrategy::AnyOffer,
        ExtractionStrategy::ItemList,
    ];

    fn apply(self, root: &XmlElement) -> Vec<&XmlElement> {
        match self {
            ExtractionStrategy::ShopOffers => {
                let shop = if root.name == "shop" {
                    Some(root)
                } else {
                    root.child("shop")
                };
                shop.map(|shop| {
                    shop.children_named("offers")
                        .flat_map(|offers| offers.children_named("offer"))
                        .collect()
                })
                .unwrap_or_default()
            }
            ExtractionStrategy::AnyOffer => root.descendants_named("offer"),
            ExtractionStrategy::ItemList => root.descendants_named("item"),
        }
    }
}

impl std::fmt::Display for ExtractionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionStrategy::ShopOffers => write!(f, "shop/offers/offer"),
            ExtractionStrategy::AnyOffer => write!(f, "//offer"),
            ExtractionStrategy::ItemList => write!(f, "//item"),
        }
    }
}

/// Offer nodes found in one document, borrowed from it.
#[derive(Debug)]
pub struct Extraction<'a> {
    /// The strategy that matched, or `None` when the document has no offers.
    pub strategy: Option<ExtractionStrategy>,
    pub offers: Vec<&'a XmlElement>,
}

/// Returns the offer nodes of `doc` using the first strategy in
/// [`ExtractionStrategy::PRIORITY`] that finds at least one.
///
/// A document with no recognizable offers yields an empty extraction.
#[must_use]
pub fn extract_offers(doc: &FeedDocument) -> Extraction<'_> {
    for strategy in ExtractionStrategy::PRIORITY {
        let offers = strategy.apply(doc.root());
        if !offers.is_empty() {
            return Extraction {
                strategy: Some(strategy),
                offers,
            };
        }
    }
    Extraction {
        strategy: None,
        offers: Vec::new(),
    }
}
