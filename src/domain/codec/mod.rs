//! Codec - wire formats for cached payloads
//!
//! Two shapes travel through the cache: structured records (JSON, UTF-8)
//! and tabular snapshots (columnar binary via bincode). Both round-trip
//! exactly for the supported primitive types; mixed-typed table columns are
//! coerced to strings at build time, which is documented lossy behavior.

mod record;
mod table;

pub use record::{decode_record, decode_string_list, encode_record, encode_string_list, Record};
pub use table::{decode_table, encode_table, Column, ColumnValues, TableSnapshot};
