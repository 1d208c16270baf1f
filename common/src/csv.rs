//! CSVテキストの前処理と行分割
//!
//! 公開スプレッドシートのCSVを想定した簡易実装。RFC4180 の `""`
//! エスケープは解釈せず、ダブルクォートは引用状態の切替としてのみ扱う。

const BOM: char = '\u{FEFF}';

/// BOM除去・前後空白除去のうえで改行（CRLF/LF）分割し、空行を捨てる
pub fn prepare_lines(text: &str) -> Vec<&str> {
    text.strip_prefix(BOM)
        .unwrap_or(text)
        .trim()
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .filter(|line| !line.trim().is_empty())
        .collect()
}

/// CSV行をパース（ダブルクォート対応）
///
/// 引用外のカンマでのみ区切る。クォート文字は切替に使われるだけで
/// フィールドには残らない。各フィールドは前後空白を除去する。
pub fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut in_quotes = false;
    let mut current = String::new();

    for c in line.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_string());
                current.clear();
            }
            _ => current.push(c),
        }
    }
    fields.push(current.trim().to_string());

    fields
}

/// 範囲外は空文字として取得
pub fn cell(cells: &[String], index: usize) -> &str {
    cells.get(index).map(|s| s.as_str()).unwrap_or("")
}
