//! Validation and normalization of raw offer nodes into
//! [`promfeed_core::ValidatedOffer`].
//!
//! Checks run in a fixed order and stop at the first failure, so a record
//! missing both its name and its price is always reported as `MissingName`.

use std::collections::BTreeMap;
use std::str::FromStr;

use promfeed_core::{AvailabilityPolicy, OfferParam, ValidatedOffer, PASSTHROUGH_FIELDS};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::document::XmlElement;

/// Why a raw offer was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RejectReason {
    MissingId,
    Unavailable,
    MissingName,
    InvalidPrice(PriceProblem),
    MissingCategory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PriceProblem {
    NotANumber,
    OutOfRange,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejectReason::MissingId => write!(f, "missing id"),
            RejectReason::Unavailable => write!(f, "unavailable"),
            RejectReason::MissingName => write!(f, "missing name"),
            RejectReason::InvalidPrice(PriceProblem::NotANumber) => {
                write!(f, "invalid price (not-a-number)")
            }
            RejectReason::InvalidPrice(PriceProblem::OutOfRange) => {
                write!(f, "invalid price (out-of-range)")
            }
            RejectReason::MissingCategory => write!(f, "missing categoryId"),
        }
    }
}

/// A logical field and the child element names that may carry it, most
/// preferred first.
struct FieldSpec {
    candidates: &'static [&'static str],
}

impl FieldSpec {
    const fn new(candidates: &'static [&'static str]) -> Self {
        Self { candidates }
    }

    /// First candidate with non-empty trimmed text.
    fn lookup<'a>(&self, node: &'a XmlElement) -> Option<&'a str> {
        self.candidates
            .iter()
            .find_map(|candidate| node.child_text(candidate))
    }
}

const ID: FieldSpec = FieldSpec::new(&["id"]);
const NAME: FieldSpec = FieldSpec::new(&["name", "title"]);
const PRICE: FieldSpec = FieldSpec::new(&["price"]);
const CATEGORY: FieldSpec = FieldSpec::new(&["categoryId", "category_id", "category"]);
const QUANTITY: FieldSpec = FieldSpec::new(&["quantity", "quantity_in_stock", "stock_quantity"]);
const VENDOR_CODE: FieldSpec = FieldSpec::new(&["vendorCode", "vendor_code", "sku"]);
const IMAGE_TAGS: &[&str] = &["picture", "image"];

fn min_price() -> Decimal {
    Decimal::new(1, 2)
}

fn max_price() -> Decimal {
    Decimal::new(99_999_999_999_999, 0)
}

/// Turns raw offer nodes into [`ValidatedOffer`]s. Holds no per-run state.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfferValidator {
    availability: AvailabilityPolicy,
}

impl OfferValidator {
    #[must_use]
    pub fn new(availability: AvailabilityPolicy) -> Self {
        Self { availability }
    }

    /// Validates one raw offer node and builds a normalized record from it.
    ///
    /// The node is only read; every kept value is copied out and trimmed.
    ///
    /// # Errors
    ///
    /// Returns the first [`RejectReason`] hit, checking in order: id,
    /// availability, name, price, categoryId.
    pub fn validate(&self, node: &XmlElement) -> Result<ValidatedOffer, RejectReason> {
        let id = offer_id(node).ok_or(RejectReason::MissingId)?;

        let quantity = QUANTITY.lookup(node).map_or(0, |raw| parse_quantity(id, raw));
        let available = self.resolve_availability(node, quantity)?;

        let name = NAME.lookup(node).ok_or(RejectReason::MissingName)?;

        let price = PRICE
            .lookup(node)
            .ok_or(RejectReason::InvalidPrice(PriceProblem::NotANumber))?;
        check_price(price).map_err(RejectReason::InvalidPrice)?;

        let category_id = CATEGORY.lookup(node).ok_or(RejectReason::MissingCategory)?;

        let selling_type = node
            .attr("selling_type")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let images = node
            .children
            .iter()
            .filter(|c| IMAGE_TAGS.contains(&c.name.as_str()))
            .map(XmlElement::trimmed_text)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        let extra_fields: BTreeMap<String, String> = PASSTHROUGH_FIELDS
            .iter()
            .filter_map(|field| {
                node.child_text(field)
                    .map(|value| ((*field).to_string(), value.to_string()))
            })
            .collect();

        Ok(ValidatedOffer {
            id: id.to_string(),
            available,
            selling_type,
            name: name.to_string(),
            price: price.to_string(),
            category_id: category_id.to_string(),
            quantity,
            vendor_code: VENDOR_CODE.lookup(node).map(str::to_string),
            images,
            extra_fields,
            params: extract_params(node),
        })
    }

    fn resolve_availability(&self, node: &XmlElement, quantity: i64) -> Result<bool, RejectReason> {
        let attribute = node.attr("available").map(str::trim);
        match self.availability {
            AvailabilityPolicy::RequireTrue => {
                if attribute.unwrap_or("true").eq_ignore_ascii_case("true") {
                    Ok(true)
                } else {
                    Err(RejectReason::Unavailable)
                }
            }
            AvailabilityPolicy::FromStock => Ok(quantity > 0),
            AvailabilityPolicy::Passthrough => {
                Ok(attribute.is_none_or(|value| value.eq_ignore_ascii_case("true")))
            }
        }
    }
}

/// The offer id: the `id` attribute, or an `<id>` child in item-style feeds.
/// Used for log lines as well as validation.
#[must_use]
pub fn offer_id(node: &XmlElement) -> Option<&str> {
    node.attr("id")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .or_else(|| ID.lookup(node))
}

/// Accepts plain decimals (`"19.99"`) and scientific notation (`"1.5e3"`).
///
/// A well-formed number that `Decimal` cannot hold exactly (too large, or
/// more than 28 significant fractional digits) is out of range, never
/// rounded into range.
fn check_price(raw: &str) -> Result<(), PriceProblem> {
    if !is_numeric_literal(raw) {
        return Err(PriceProblem::NotANumber);
    }
    let value = parse_exact(raw).ok_or(PriceProblem::OutOfRange)?;
    if value < min_price() || value > max_price() {
        return Err(PriceProblem::OutOfRange);
    }
    Ok(())
}

fn parse_exact(raw: &str) -> Option<Decimal> {
    if raw.contains(['e', 'E']) {
        return Decimal::from_scientific(raw).ok();
    }
    let trimmed = if raw.contains('.') {
        raw.trim_end_matches('0').trim_end_matches('.')
    } else {
        raw
    };
    Decimal::from_str_exact(trimmed).ok()
}

/// `[+-]digits[.digits][(e|E)[+-]digits]`, with at least one mantissa digit.
fn is_numeric_literal(raw: &str) -> bool {
    let is_sign = |c: char| c == '+' || c == '-';
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());

    let body = raw.strip_prefix(is_sign).unwrap_or(raw);
    let (mantissa, exponent) = match body.split_once(['e', 'E']) {
        Some((mantissa, exponent)) => (mantissa, Some(exponent)),
        None => (body, None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));

    let mantissa_ok = !(int_part.is_empty() && frac_part.is_empty())
        && all_digits(int_part)
        && all_digits(frac_part);
    let exponent_ok = exponent.is_none_or(|exp| {
        let digits = exp.strip_prefix(is_sign).unwrap_or(exp);
        !digits.is_empty() && all_digits(digits)
    });
    mantissa_ok && exponent_ok
}

/// Integer quantity; `"5.0"` becomes 5, anything unparseable becomes 0.
fn parse_quantity(offer_id: &str, raw: &str) -> i64 {
    if let Ok(n) = raw.parse::<i64>() {
        return n;
    }
    match Decimal::from_str(raw).ok().and_then(|d| d.trunc().to_i64()) {
        Some(n) => n,
        None => {
            tracing::debug!(offer_id, raw, "unparseable quantity; using 0");
            0
        }
    }
}

fn extract_params(node: &XmlElement) -> Vec<OfferParam> {
    node.children_named("param")
        .filter_map(|param| {
            let name = param.attr("name").map(str::trim).filter(|s| !s.is_empty())?;
            let value = param.trimmed_text();
            if value.is_empty() {
                return None;
            }
            let unit = param
                .attr("unit")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string);
            Some(OfferParam {
                name: name.to_string(),
                unit,
                value: value.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
#[path = "validate_test.rs"]
mod tests;
