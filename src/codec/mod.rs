//! Protobuf codec for geosite datasets.
//!
//! Datasets use the `GeoSiteList` message layout of V2Ray-family routers:
//!
//! ```text
//! GeoSiteList { repeated GeoSite entry = 1; }
//! GeoSite     { string country_code = 1; repeated Domain domain = 2;
//!               bytes resource_hash = 3; string code = 4; string file_path = 68000; }
//! Domain      { Type type = 1; string value = 2; repeated Attribute attribute = 3; }
//! Attribute   { string key = 1; oneof { bool bool_value = 2; int64 int_value = 3; } }
//! ```
//!
//! Decoding is structural only. Fields this crate does not model are kept as
//! raw bytes and written back unchanged.

mod format;
mod reader;
mod writer;


pub use format::{is_gzip, GZIP_MAGIC, MAX_MESSAGE_SIZE};
pub use reader::DatasetReader;
pub use writer::DatasetWriter;
