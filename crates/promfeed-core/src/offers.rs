use std::borrow::Cow;
use std::collections::BTreeMap;

/// Optional fields copied verbatim (trimmed) from a raw offer, in the order
/// they are emitted in output documents.
pub const PASSTHROUGH_FIELDS: &[&str] = &[
    "name_ua",
    "oldprice",
    "currencyId",
    "vendor",
    "country_of_origin",
    "url",
    "keywords",
    "description",
    "description_ua",
];

/// A product offer that passed validation, normalized for merging and
/// re-serialization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOffer {
    pub id: String,
    pub available: bool,
    /// Raw `selling_type` attribute (e.g. `"r"` retail, `"w"` wholesale).
    pub selling_type: Option<String>,
    pub name: String,
    /// Price as exact decimal text from the feed, e.g. `"19.99"`.
    /// Guaranteed to parse as a decimal in `0.01..=99999999999999`.
    pub price: String,
    pub category_id: String,
    pub quantity: i64,
    pub vendor_code: Option<String>,
    pub images: Vec<String>,
    /// Keys are drawn from [`PASSTHROUGH_FIELDS`]; values are non-empty.
    pub extra_fields: BTreeMap<String, String>,
    pub params: Vec<OfferParam>,
}

impl ValidatedOffer {
    /// Returns the passthrough value for `field`, if the feed supplied one.
    #[must_use]
    pub fn extra(&self, field: &str) -> Option<&str> {
        self.extra_fields.get(field).map(String::as_str)
    }
}

/// A `<param name=".." unit="..">value</param>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferParam {
    pub name: String,
    pub unit: Option<String>,
    pub value: String,
}

/// `true` for characters allowed in XML 1.0 documents.
#[must_use]
pub fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}')
}

/// Drops characters XML 1.0 cannot represent (C0 controls other than tab,
/// newline and carriage return, plus U+FFFE and U+FFFF). Borrows when the
/// text is already clean.
#[must_use]
pub fn xml_safe(text: &str) -> Cow<'_, str> {
    if text.chars().all(is_xml_char) {
        Cow::Borrowed(text)
    } else {
        Cow::Owned(text.chars().filter(|&c| is_xml_char(c)).collect())
    }
}
