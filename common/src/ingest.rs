//! CSV取込・正規化エンジン
//!
//! 前処理 → 見出し判定・欄位解決 → 行マッピング → 空行除外の順に処理し、
//! 正規化済みレコード一覧とバッチスタンプを返す。

use crate::csv::{cell, prepare_lines, split_csv_line};
use crate::error::{Error, Result};
use crate::field_map::{is_header_row, FieldMap};
use crate::profile::ColumnProfile;
use crate::types::MedicationRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

static LAST_BATCH_STAMP: AtomicU64 = AtomicU64::new(0);

/// 取込結果
#[derive(Debug, Clone)]
pub struct Ingested {
    pub records: Vec<MedicationRecord>,
    pub field_map: FieldMap,
    /// 1行目を見出しとして除外したか
    pub header_detected: bool,
    /// レコードIDに埋め込んだバッチスタンプ（ミリ秒）
    pub batch_stamp: u64,
}

/// 取込バッチ用のスタンプを発行
///
/// 現在時刻（ミリ秒）を基本とし、同一プロセス内では必ず前回より大きい。
pub fn next_batch_stamp() -> u64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);

    let mut last = LAST_BATCH_STAMP.load(Ordering::Relaxed);
    loop {
        let next = now.max(last + 1);
        match LAST_BATCH_STAMP.compare_exchange_weak(
            last,
            next,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return next,
            Err(current) => last = current,
        }
    }
}

/// CSVテキストを取り込む
pub fn ingest_csv(text: &str, profile: &ColumnProfile) -> Result<Ingested> {
    ingest_csv_with_stamp(text, profile, next_batch_stamp())
}

/// バッチスタンプを指定してCSVテキストを取り込む
///
/// # Errors
/// * `Error::EmptyCsv` - 内容行が1行もない
/// * `Error::NoUsableRows` - 全行が名稱・儲位ともに空
pub fn ingest_csv_with_stamp(
    text: &str,
    profile: &ColumnProfile,
    batch_stamp: u64,
) -> Result<Ingested> {
    let lines = prepare_lines(text);
    let Some(first) = lines.first() else {
        return Err(Error::EmptyCsv);
    };

    let header = split_csv_line(first);
    let field_map = FieldMap::resolve(&header, profile);
    let header_detected = is_header_row(&header, profile.header_markers);
    let start = usize::from(header_detected);

    let records: Vec<MedicationRecord> = lines[start..]
        .iter()
        .enumerate()
        .map(|(index, line)| {
            let cells = split_csv_line(line);
            map_row(&cells, &field_map, profile, index, batch_stamp)
        })
        .filter(MedicationRecord::is_usable)
        .collect();

    if records.is_empty() {
        return Err(Error::NoUsableRows);
    }

    Ok(Ingested {
        records,
        field_map,
        header_detected,
        batch_stamp,
    })
}

/// 1行分のセルをレコードに変換
fn map_row(
    cells: &[String],
    map: &FieldMap,
    profile: &ColumnProfile,
    index: usize,
    batch_stamp: u64,
) -> MedicationRecord {
    let optional = |idx: Option<usize>| idx.map(|i| cell(cells, i)).unwrap_or("").to_string();

    let name = cell(cells, map.name).to_string();
    let location = cell(cells, map.location).to_string();
    let description = optional(map.note);
    let is_refrigerated =
        profile.mentions_refrigeration(&[location.as_str(), name.as_str(), description.as_str()]);

    MedicationRecord {
        id: format!("med-{}-{}", index, batch_stamp),
        name,
        english_name: cell(cells, map.english_name).to_string(),
        scientific_name: cell(cells, map.scientific_name).to_string(),
        specification: cell(cells, map.specification).to_string(),
        location,
        is_refrigerated,
        description,
        category: optional(map.category),
    }
}
