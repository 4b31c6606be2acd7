//! Geosite dataset encoder.

use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::Write;

use super::format::*;
use crate::dataset::{Attribute, AttributeValue, Domain, GeoSite, GeoSiteList};
use crate::{Error, Result};

/// Encoder for geosite datasets.
///
/// Output is canonical proto3: fields in number order, default scalars
/// omitted, preserved unknown fields appended last.
pub struct DatasetWriter {
    buffer: Vec<u8>,
}

impl Default for DatasetWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetWriter {
    /// Create a new writer.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Encode a dataset to protobuf bytes.
    pub fn encode(&mut self, list: &GeoSiteList) -> Result<Vec<u8>> {
        let total = list_len(list);
        if total > MAX_MESSAGE_SIZE {
            return Err(Error::Encode(format!(
                "dataset is {} bytes, exceeds the {} byte message limit",
                total, MAX_MESSAGE_SIZE
            )));
        }

        self.buffer.clear();
        self.buffer.reserve(total);

        for site in &list.entries {
            self.write_message_header(list_field::ENTRY, site_len(site));
            self.write_site(site);
        }
        self.buffer.extend_from_slice(&list.unknown_fields);

        debug_assert_eq!(self.buffer.len(), total);
        Ok(std::mem::take(&mut self.buffer))
    }

    /// Encode a dataset and gzip-compress it.
    pub fn encode_gzip(&mut self, list: &GeoSiteList) -> Result<Vec<u8>> {
        let raw = self.encode(list)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).map_err(gzip_error)?;
        encoder.finish().map_err(gzip_error)
    }

    fn write_varint(&mut self, mut v: u64) {
        while v >= 0x80 {
            self.buffer.push((v as u8) | 0x80);
            v >>= 7;
        }
        self.buffer.push(v as u8);
    }

    fn write_key(&mut self, field: u32, wire_type: WireType) {
        self.write_varint(field_key(field, wire_type));
    }

    fn write_message_header(&mut self, field: u32, len: usize) {
        self.write_key(field, WireType::LengthDelimited);
        self.write_varint(len as u64);
    }

    fn write_bytes(&mut self, field: u32, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.write_message_header(field, data.len());
        self.buffer.extend_from_slice(data);
    }

    fn write_site(&mut self, site: &GeoSite) {
        self.write_bytes(site_field::COUNTRY_CODE, site.country_code.as_bytes());
        for domain in &site.domains {
            self.write_message_header(site_field::DOMAIN, domain_len(domain));
            self.write_domain(domain);
        }
        self.write_bytes(site_field::RESOURCE_HASH, &site.resource_hash);
        self.write_bytes(site_field::CODE, site.code.as_bytes());
        self.write_bytes(site_field::FILE_PATH, site.file_path.as_bytes());
        self.buffer.extend_from_slice(&site.unknown_fields);
    }

    fn write_domain(&mut self, domain: &Domain) {
        let kind = domain.kind.as_i32();
        if kind != 0 {
            self.write_key(domain_field::TYPE, WireType::Varint);
            // Negative enum values are sign-extended to 64 bits.
            self.write_varint(i64::from(kind) as u64);
        }
        self.write_bytes(domain_field::VALUE, domain.value.as_bytes());
        for attribute in &domain.attributes {
            self.write_message_header(domain_field::ATTRIBUTE, attribute_len(attribute));
            self.write_attribute(attribute);
        }
        self.buffer.extend_from_slice(&domain.unknown_fields);
    }

    fn write_attribute(&mut self, attribute: &Attribute) {
        self.write_bytes(attribute_field::KEY, attribute.key.as_bytes());
        // Oneof members are written whenever set, even at default values.
        match attribute.value {
            Some(AttributeValue::Bool(b)) => {
                self.write_key(attribute_field::BOOL_VALUE, WireType::Varint);
                self.write_varint(u64::from(b));
            }
            Some(AttributeValue::Int(i)) => {
                self.write_key(attribute_field::INT_VALUE, WireType::Varint);
                self.write_varint(i as u64);
            }
            None => {}
        }
        self.buffer.extend_from_slice(&attribute.unknown_fields);
    }
}

fn gzip_error(e: std::io::Error) -> Error {
    Error::Encode(format!("gzip compression failed: {}", e))
}

fn bytes_field_len(field: u32, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        len_field_len(field, len)
    }
}

fn attribute_len(attribute: &Attribute) -> usize {
    let value_len = match attribute.value {
        Some(AttributeValue::Bool(_)) => key_len(attribute_field::BOOL_VALUE) + 1,
        Some(AttributeValue::Int(i)) => key_len(attribute_field::INT_VALUE) + varint_len(i as u64),
        None => 0,
    };
    bytes_field_len(attribute_field::KEY, attribute.key.len())
        + value_len
        + attribute.unknown_fields.len()
}

fn domain_len(domain: &Domain) -> usize {
    let kind = domain.kind.as_i32();
    let kind_len = if kind != 0 {
        key_len(domain_field::TYPE) + varint_len(i64::from(kind) as u64)
    } else {
        0
    };
    let attributes_len: usize = domain
        .attributes
        .iter()
        .map(|a| len_field_len(domain_field::ATTRIBUTE, attribute_len(a)))
        .sum();
    kind_len
        + bytes_field_len(domain_field::VALUE, domain.value.len())
        + attributes_len
        + domain.unknown_fields.len()
}

fn site_len(site: &GeoSite) -> usize {
    let domains_len: usize = site
        .domains
        .iter()
        .map(|d| len_field_len(site_field::DOMAIN, domain_len(d)))
        .sum();
    bytes_field_len(site_field::COUNTRY_CODE, site.country_code.len())
        + domains_len
        + bytes_field_len(site_field::RESOURCE_HASH, site.resource_hash.len())
        + bytes_field_len(site_field::CODE, site.code.len())
        + bytes_field_len(site_field::FILE_PATH, site.file_path.len())
        + site.unknown_fields.len()
}

fn list_len(list: &GeoSiteList) -> usize {
    let entries_len: usize = list
        .entries
        .iter()
        .map(|s| len_field_len(list_field::ENTRY, site_len(s)))
        .sum();
    entries_len + list.unknown_fields.len()
}
