// Bulk loader support
pub mod convert;

pub use convert::{convert_json_to_csv, normalize_record, ConvertError, COLUMNS, FALLBACK_VALUE};
