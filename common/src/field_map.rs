//! 見出し行の判定と欄位マッピング

use crate::profile::ColumnProfile;

/// 論理フィールド → 列番号
///
/// 取込1回につき見出し行から1度だけ解決する。必須5項目は見出しに
/// 一致がなければ固定の位置にフォールバックする。類別・備註は
/// 見出しで名指しされた場合のみ設定される。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub location: usize,
    pub name: usize,
    pub english_name: usize,
    pub scientific_name: usize,
    pub specification: usize,
    pub category: Option<usize>,
    pub note: Option<usize>,
}

impl Default for FieldMap {
    /// 見出しなしの位置規約: 儲位, 名稱, 英文名, 學名, 規格
    fn default() -> Self {
        Self {
            location: 0,
            name: 1,
            english_name: 2,
            scientific_name: 3,
            specification: 4,
            category: None,
            note: None,
        }
    }
}

impl FieldMap {
    /// 見出しセルから欄位を解決
    pub fn resolve(header: &[String], profile: &ColumnProfile) -> Self {
        let lower: Vec<String> = header.iter().map(|h| h.to_lowercase()).collect();
        let defaults = Self::default();

        Self {
            location: find_column(&lower, profile.location).unwrap_or(defaults.location),
            name: find_column(&lower, profile.name).unwrap_or(defaults.name),
            english_name: find_column(&lower, profile.english_name)
                .unwrap_or(defaults.english_name),
            scientific_name: find_column(&lower, profile.scientific_name)
                .unwrap_or(defaults.scientific_name),
            specification: find_column(&lower, profile.specification)
                .unwrap_or(defaults.specification),
            category: find_column(&lower, profile.category),
            note: find_column(&lower, profile.note),
        }
    }
}

/// 同義語のいずれかを部分一致で含む最初の見出しセル
fn find_column(lower_header: &[String], synonyms: &[&str]) -> Option<usize> {
    lower_header
        .iter()
        .position(|cell| synonyms.iter().any(|key| cell.contains(key)))
}

/// 1行目が見出し行かどうか
///
/// マーカー文字を含むセルがあれば見出しとみなす。データのみのCSVで
/// 先頭行の藥名がたまたまマーカーを含むと誤判定する（既知の制限）。
pub fn is_header_row(cells: &[String], markers: &[char]) -> bool {
    cells
        .iter()
        .any(|cell| cell.chars().any(|c| markers.contains(&c)))
}
