//! Protobuf wire format constants for geosite datasets.

use crate::{Error, Result};

/// Gzip stream magic bytes.
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Largest message protobuf implementations accept (2 GiB - 1).
pub const MAX_MESSAGE_SIZE: usize = i32::MAX as usize;

/// Maximum encoded length of a varint.
pub const MAX_VARINT_LEN: usize = 10;

/// `GeoSiteList` field numbers.
pub mod list_field {
    pub const ENTRY: u32 = 1;
}

/// `GeoSite` field numbers.
pub mod site_field {
    pub const COUNTRY_CODE: u32 = 1;
    pub const DOMAIN: u32 = 2;
    pub const RESOURCE_HASH: u32 = 3;
    pub const CODE: u32 = 4;
    pub const FILE_PATH: u32 = 68000;
}

/// `Domain` field numbers.
pub mod domain_field {
    pub const TYPE: u32 = 1;
    pub const VALUE: u32 = 2;
    pub const ATTRIBUTE: u32 = 3;
}

/// `Domain.Attribute` field numbers.
pub mod attribute_field {
    pub const KEY: u32 = 1;
    pub const BOOL_VALUE: u32 = 2;
    pub const INT_VALUE: u32 = 3;
}

/// Protobuf wire types.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Varint = 0,
    Fixed64 = 1,
    LengthDelimited = 2,
    StartGroup = 3,
    EndGroup = 4,
    Fixed32 = 5,
}

impl WireType {
    pub fn from_u8(v: u8) -> Option<Self> {
        match v {
            0 => Some(Self::Varint),
            1 => Some(Self::Fixed64),
            2 => Some(Self::LengthDelimited),
            3 => Some(Self::StartGroup),
            4 => Some(Self::EndGroup),
            5 => Some(Self::Fixed32),
            _ => None,
        }
    }
}

/// Build a field key from a field number and wire type.
pub fn field_key(field: u32, wire_type: WireType) -> u64 {
    (u64::from(field) << 3) | wire_type as u64
}

/// Split a field key into field number and wire type.
pub fn split_key(key: u64, offset: usize) -> Result<(u32, WireType)> {
    let wire_type = WireType::from_u8((key & 0x7) as u8)
        .ok_or_else(|| Error::decode(offset, format!("invalid wire type {}", key & 0x7)))?;
    let field = key >> 3;
    if field == 0 || field > u64::from(u32::MAX >> 3) {
        return Err(Error::decode(offset, format!("invalid field number {}", field)));
    }
    Ok((field as u32, wire_type))
}

/// Number of bytes needed to encode `v` as a varint.
pub fn varint_len(v: u64) -> usize {
    // Each byte carries 7 bits; zero still takes one byte.
    let bits = 64 - (v | 1).leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Encoded size of a field key.
pub fn key_len(field: u32) -> usize {
    varint_len(field_key(field, WireType::Varint))
}

/// Encoded size of a length-delimited field carrying `len` bytes.
pub fn len_field_len(field: u32, len: usize) -> usize {
    key_len(field) + varint_len(len as u64) + len
}

/// Whether `data` starts with the gzip magic bytes.
pub fn is_gzip(data: &[u8]) -> bool {
    data.len() >= GZIP_MAGIC.len() && data[..GZIP_MAGIC.len()] == GZIP_MAGIC
}
