//! 藥品検索（クライアント側フィルタ）

use crate::types::MedicationRecord;

/// 一覧に表示する既定件数
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// キーワードでレコードを絞り込む
///
/// 空白のみのキーワードは全件を返す。大文字小文字を区別しない部分一致。
/// 前後の空白は照合前に取り除く。
pub fn filter_records<'a>(records: &'a [MedicationRecord], term: &str) -> Vec<&'a MedicationRecord> {
    let term = term.trim();
    if term.is_empty() {
        return records.iter().collect();
    }

    let keyword = term.to_lowercase();
    records
        .iter()
        .filter(|record| record.matches_lowercase(&keyword))
        .collect()
}
