//! 検索結果の端末表示

use pharmacy_lookup_common::MedicationRecord;

const NO_LOCATION: &str = "無儲位";

/// 1件分の表示文字列
pub fn format_record(record: &MedicationRecord) -> String {
    let mut title = record.name.clone();
    if !record.specification.is_empty() {
        title.push_str(&format!(" {}", record.specification));
    }
    if record.is_refrigerated {
        title.push_str(" ❄");
    }

    let location = if record.location.is_empty() {
        NO_LOCATION
    } else {
        record.location.as_str()
    };

    let mut lines = vec![title];
    if !record.english_name.is_empty() {
        lines.push(format!("    {}", record.english_name.to_uppercase()));
    }
    lines.push(format!("    📍 {}", location));
    lines.join("\n")
}

/// 検索結果を上限件数まで表示
pub fn print_results(matches: &[&MedicationRecord], limit: usize) {
    if matches.is_empty() {
        println!("找不到相關藥品");
        return;
    }

    for record in matches.iter().take(limit) {
        println!("{}\n", format_record(record));
    }

    if matches.len() > limit {
        println!(
            "僅顯示前 {} 筆結果（共 {} 筆），請輸入關鍵字搜尋更多",
            limit,
            matches.len()
        );
    }
}
