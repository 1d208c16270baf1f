//! Pharmacy Lookup Common Library
//!
//! CLIと将来のフロントエンドで共有される型と取込ロジック。
//! I/Oは持たず、取得済みのCSVテキストを正規化済みレコードに変換する。

pub mod types;
pub mod error;
pub mod profile;
pub mod csv;
pub mod field_map;
pub mod ingest;
pub mod source_url;
pub mod search;
pub mod prompts;
pub mod parser;

pub use types::{MedicationRecord, Recognition, records_from_json, records_to_json};
pub use error::{Error, Result};
pub use profile::{ColumnProfile, Profile};
pub use field_map::FieldMap;
pub use ingest::{Ingested, ingest_csv, ingest_csv_with_stamp};
pub use source_url::normalize_source_url;
pub use search::{DEFAULT_DISPLAY_LIMIT, filter_records};
pub use prompts::{REFERENCE_LIMIT, build_recognition_prompt, reference_names};
pub use parser::parse_recognition_reply;
