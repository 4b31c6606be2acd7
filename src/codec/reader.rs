//! Geosite dataset decoder.

use flate2::read::GzDecoder;
use memmap2::Mmap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::format::*;
use crate::dataset::{Attribute, AttributeValue, Domain, GeoSite, GeoSiteList};
use crate::{DomainType, Error, Result};

/// Cursor over a protobuf message.
///
/// Offsets reported in errors are absolute positions in the outermost buffer.
struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    fn new(buf: &'a [u8], base: usize) -> Self {
        Self { buf, pos: 0, base }
    }

    fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    fn read_varint(&mut self) -> Result<u64> {
        let start = self.offset();
        let mut value = 0u64;
        for i in 0..MAX_VARINT_LEN {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or_else(|| Error::decode(start, "truncated varint"))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7f) << (7 * i);
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(Error::decode(start, "varint too long"))
    }

    fn read_key(&mut self) -> Result<(u32, WireType)> {
        let start = self.offset();
        let key = self.read_varint()?;
        split_key(key, start)
    }

    /// Read a length-delimited payload, returning it with its absolute offset.
    fn read_bytes(&mut self) -> Result<(&'a [u8], usize)> {
        let start = self.offset();
        let len = self.read_varint()?;
        let len = usize::try_from(len)
            .ok()
            .filter(|l| *l <= MAX_MESSAGE_SIZE)
            .ok_or_else(|| Error::decode(start, format!("length {} too large", len)))?;
        let data_offset = self.offset();
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| {
                Error::decode(
                    start,
                    format!(
                        "length {} exceeds remaining {} bytes",
                        len,
                        self.buf.len() - self.pos
                    ),
                )
            })?;
        let buf = self.buf;
        let data = &buf[self.pos..end];
        self.pos = end;
        Ok((data, data_offset))
    }

    fn read_string(&mut self) -> Result<String> {
        let (data, offset) = self.read_bytes()?;
        std::str::from_utf8(data)
            .map(str::to_owned)
            .map_err(|e| Error::decode(offset, format!("invalid UTF-8 in string field: {}", e)))
    }

    fn skip_fixed(&mut self, len: usize) -> Result<()> {
        if self.buf.len() - self.pos < len {
            return Err(Error::decode(self.offset(), "truncated fixed-width field"));
        }
        self.pos += len;
        Ok(())
    }

    /// Skip a field value of the given wire type.
    fn skip(&mut self, wire_type: WireType) -> Result<()> {
        match wire_type {
            WireType::Varint => self.read_varint().map(|_| ()),
            WireType::Fixed64 => self.skip_fixed(8),
            WireType::Fixed32 => self.skip_fixed(4),
            WireType::LengthDelimited => self.read_bytes().map(|_| ()),
            WireType::StartGroup | WireType::EndGroup => Err(Error::decode(
                self.offset(),
                "group wire types are not supported",
            )),
        }
    }

    /// Skip the field whose key started at `key_pos`, appending its raw bytes
    /// (key included) to `unknown`.
    fn keep_unknown(
        &mut self,
        key_pos: usize,
        wire_type: WireType,
        unknown: &mut Vec<u8>,
    ) -> Result<()> {
        self.skip(wire_type)?;
        unknown.extend_from_slice(&self.buf[key_pos..self.pos]);
        Ok(())
    }
}

/// Decoder for geosite datasets.
pub struct DatasetReader;

impl DatasetReader {
    /// Decode a dataset from raw protobuf bytes.
    pub fn decode(data: &[u8]) -> Result<GeoSiteList> {
        let mut r = WireReader::new(data, 0);
        let mut list = GeoSiteList::new();

        while !r.is_empty() {
            let key_pos = r.pos;
            let (field, wire_type) = r.read_key()?;
            match (field, wire_type) {
                (list_field::ENTRY, WireType::LengthDelimited) => {
                    let (bytes, offset) = r.read_bytes()?;
                    list.entries.push(decode_site(bytes, offset)?);
                }
                _ => r.keep_unknown(key_pos, wire_type, &mut list.unknown_fields)?,
            }
        }

        log::debug!(
            "Decoded {} entries with {} domains",
            list.len(),
            list.domain_count()
        );
        Ok(list)
    }

    /// Decode a dataset, decompressing it first if it is gzip data.
    pub fn from_bytes(data: &[u8]) -> Result<GeoSiteList> {
        if is_gzip(data) {
            let mut decoder = GzDecoder::new(data);
            let mut raw = Vec::new();
            decoder
                .read_to_end(&mut raw)
                .map_err(|e| Error::decode(0, format!("gzip decompression failed: {}", e)))?;
            log::debug!("Decompressed {} -> {} bytes", data.len(), raw.len());
            return Self::decode(&raw);
        }
        Self::decode(data)
    }

    /// Open and decode a dataset file.
    pub fn open(path: &Path) -> Result<GeoSiteList> {
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(GeoSiteList::new());
        }
        let mmap = unsafe { Mmap::map(&file)? };
        Self::from_bytes(&mmap)
    }
}

fn decode_site(data: &[u8], base: usize) -> Result<GeoSite> {
    let mut r = WireReader::new(data, base);
    let mut site = GeoSite::default();

    while !r.is_empty() {
        let key_pos = r.pos;
        let (field, wire_type) = r.read_key()?;
        match (field, wire_type) {
            (site_field::COUNTRY_CODE, WireType::LengthDelimited) => {
                site.country_code = r.read_string()?;
            }
            (site_field::DOMAIN, WireType::LengthDelimited) => {
                let (bytes, offset) = r.read_bytes()?;
                site.domains.push(decode_domain(bytes, offset)?);
            }
            (site_field::RESOURCE_HASH, WireType::LengthDelimited) => {
                site.resource_hash = r.read_bytes()?.0.to_vec();
            }
            (site_field::CODE, WireType::LengthDelimited) => {
                site.code = r.read_string()?;
            }
            (site_field::FILE_PATH, WireType::LengthDelimited) => {
                site.file_path = r.read_string()?;
            }
            _ => r.keep_unknown(key_pos, wire_type, &mut site.unknown_fields)?,
        }
    }

    Ok(site)
}

fn decode_domain(data: &[u8], base: usize) -> Result<Domain> {
    let mut r = WireReader::new(data, base);
    let mut domain = Domain::default();

    while !r.is_empty() {
        let key_pos = r.pos;
        let (field, wire_type) = r.read_key()?;
        match (field, wire_type) {
            (domain_field::TYPE, WireType::Varint) => {
                // Enums are int32 on the wire; wider values truncate.
                domain.kind = DomainType::from_i32(r.read_varint()? as i32);
            }
            (domain_field::VALUE, WireType::LengthDelimited) => {
                domain.value = r.read_string()?;
            }
            (domain_field::ATTRIBUTE, WireType::LengthDelimited) => {
                let (bytes, offset) = r.read_bytes()?;
                domain.attributes.push(decode_attribute(bytes, offset)?);
            }
            _ => r.keep_unknown(key_pos, wire_type, &mut domain.unknown_fields)?,
        }
    }

    Ok(domain)
}

fn decode_attribute(data: &[u8], base: usize) -> Result<Attribute> {
    let mut r = WireReader::new(data, base);
    let mut attribute = Attribute::default();

    while !r.is_empty() {
        let key_pos = r.pos;
        let (field, wire_type) = r.read_key()?;
        match (field, wire_type) {
            (attribute_field::KEY, WireType::LengthDelimited) => {
                attribute.key = r.read_string()?;
            }
            (attribute_field::BOOL_VALUE, WireType::Varint) => {
                attribute.value = Some(AttributeValue::Bool(r.read_varint()? != 0));
            }
            (attribute_field::INT_VALUE, WireType::Varint) => {
                attribute.value = Some(AttributeValue::Int(r.read_varint()? as i64));
            }
            _ => r.keep_unknown(key_pos, wire_type, &mut attribute.unknown_fields)?,
        }
    }

    Ok(attribute)
}
