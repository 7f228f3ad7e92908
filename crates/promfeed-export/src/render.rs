//! Serialization of one chunk of offers into a `yml_catalog` document.

use chrono::{DateTime, SecondsFormat, Utc};
use promfeed_core::{xml_safe, ValidatedOffer};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use sha2::{Digest, Sha256};

use crate::error::ExportError;

/// Passthrough fields emitted between `name` and `price`.
const FIELDS_BEFORE_PRICE: &[&str] = &["name_ua"];
/// Passthrough fields emitted between `price` and `categoryId`.
const FIELDS_AFTER_PRICE: &[&str] = &["oldprice", "currencyId"];
/// Passthrough fields emitted after `vendorCode`.
const TRAILING_FIELDS: &[&str] = &[
    "vendor",
    "country_of_origin",
    "url",
    "keywords",
    "description",
    "description_ua",
];

/// A serialized output document.
#[derive(Debug, Clone)]
pub struct RenderedChunk {
    pub xml: Vec<u8>,
    /// SHA-256 (hex) of the document after the root start tag. Excludes the
    /// generation timestamp, so equal offers give equal digests.
    pub content_digest: String,
    pub offer_count: usize,
}

/// Renders `offers` as a UTF-8 `yml_catalog` document stamped with
/// `generated_at`.
///
/// # Errors
///
/// Returns [`ExportError`] if the XML writer fails.
pub fn render_chunk(
    offers: &[ValidatedOffer],
    generated_at: DateTime<Utc>,
) -> Result<RenderedChunk, ExportError> {
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

    let date = generated_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut root = BytesStart::new("yml_catalog");
    root.push_attribute(("date", date.as_str()));
    writer.write_event(Event::Start(root))?;
    let body_start = writer.get_ref().len();

    writer.write_event(Event::Start(BytesStart::new("shop")))?;
    writer.write_event(Event::Start(BytesStart::new("offers")))?;
    for offer in offers {
        write_offer(&mut writer, offer)?;
    }
    writer.write_event(Event::End(BytesEnd::new("offers")))?;
    writer.write_event(Event::End(BytesEnd::new("shop")))?;
    writer.write_event(Event::End(BytesEnd::new("yml_catalog")))?;

    let xml = writer.into_inner();
    let content_digest = format!("{:x}", Sha256::digest(&xml[body_start..]));

    Ok(RenderedChunk {
        xml,
        content_digest,
        offer_count: offers.len(),
    })
}

fn write_offer(writer: &mut Writer<Vec<u8>>, offer: &ValidatedOffer) -> Result<(), ExportError> {
    let mut start = BytesStart::new("offer");
    start.push_attribute(("id", &*xml_safe(&offer.id)));
    start.push_attribute(("available", if offer.available { "true" } else { "false" }));
    if let Some(selling_type) = &offer.selling_type {
        start.push_attribute(("selling_type", &*xml_safe(selling_type)));
    }
    writer.write_event(Event::Start(start))?;

    write_text_element(writer, "name", &offer.name)?;
    write_extras(writer, offer, FIELDS_BEFORE_PRICE)?;
    write_text_element(writer, "price", &offer.price)?;
    write_extras(writer, offer, FIELDS_AFTER_PRICE)?;
    write_text_element(writer, "categoryId", &offer.category_id)?;
    write_text_element(writer, "quantity", &offer.quantity.to_string())?;
    if let Some(code) = &offer.vendor_code {
        write_text_element(writer, "vendorCode", code)?;
    }
    write_extras(writer, offer, TRAILING_FIELDS)?;

    for image in &offer.images {
        write_text_element(writer, "picture", image)?;
    }

    for param in &offer.params {
        let mut start = BytesStart::new("param");
        start.push_attribute(("name", &*xml_safe(&param.name)));
        if let Some(unit) = &param.unit {
            start.push_attribute(("unit", &*xml_safe(unit)));
        }
        writer.write_event(Event::Start(start))?;
        writer.write_event(Event::Text(BytesText::new(&xml_safe(&param.value))))?;
        writer.write_event(Event::End(BytesEnd::new("param")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("offer")))?;
    Ok(())
}

fn write_extras(
    writer: &mut Writer<Vec<u8>>,
    offer: &ValidatedOffer,
    fields: &[&str],
) -> Result<(), ExportError> {
    for field in fields {
        if let Some(value) = offer.extra(field) {
            write_text_element(writer, field, value)?;
        }
    }
    Ok(())
}

/// Drops characters XML 1.0 cannot carry (see [`xml_safe`]).
fn write_text_element(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), ExportError> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(&xml_safe(text))))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
