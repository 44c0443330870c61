//! Delimited-text reader with encoding and delimiter auto-detection.
//!
//! Each column is typed as a whole: it becomes `Int`, `Float` or `Bool` only
//! if every non-missing cell parses as such, otherwise it stays `Text`.

use encoding_rs::Encoding;
use serde::Serialize;

use super::unnamed_header;
use crate::error::{LoadError, LoadResult};
use crate::models::{CellValue, Column, Table};

/// Cell contents read as missing values.
const NA_VALUES: &[&str] = &["", "NA", "N/A", "#N/A", "NaN", "nan", "null", "NULL"];

/// Candidate delimiters, in tie-break order.
const DELIMITERS: [u8; 4] = [b',', b';', b'\t', b'|'];

/// How a CSV file was read.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvInfo {
    pub encoding: String,
    pub delimiter: u8,
    pub headers: Vec<String>,
    pub row_count: usize,
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    // valid UTF-8 wins; chardet is unreliable on short multi-byte samples
    if bytes.starts_with(&[0xEF, 0xBB, 0xBF]) || std::str::from_utf8(bytes).is_ok() {
        return "utf-8".to_string();
    }

    let charset = chardet::detect(bytes).0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" | "utf-8-sig" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        "euc-kr" | "cp949" | "uhc" => "euc-kr".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// A leading BOM is stripped. Unknown labels fall back to lossy UTF-8.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let label = match encoding.to_lowercase().as_str() {
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-15".to_string(),
        other => other.to_string(),
    };

    match Encoding::for_label(label.as_bytes()) {
        Some(enc) => enc.decode(bytes).0.into_owned(),
        None => encoding_rs::UTF_8.decode(bytes).0.into_owned(),
    }
}

/// Detect the delimiter by counting occurrences in the first line.
///
/// Defaults to `,` when none of the candidates appear.
pub fn detect_delimiter(content: &str) -> u8 {
    let first_line = content.lines().next().unwrap_or("");

    let mut best_sep = b',';
    let mut best_count = 0;

    for &sep in &DELIMITERS {
        let count = first_line.matches(sep as char).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Display form of a delimiter.
pub fn format_delimiter(d: u8) -> String {
    match d {
        b'\t' => "TAB".to_string(),
        c => (c as char).to_string(),
    }
}

/// Parse CSV bytes into a table.
///
/// Encoding is always auto-detected; the delimiter is detected unless given.
pub fn parse_csv_bytes(bytes: &[u8], delimiter: Option<u8>) -> LoadResult<(Table, CsvInfo)> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));

    let table = parse_csv_str(&content, delimiter)?;

    let info = CsvInfo {
        encoding,
        delimiter,
        headers: table.column_names(),
        row_count: table.row_count(),
    };
    Ok((table, info))
}

/// Parse decoded CSV text with an explicit delimiter.
pub fn parse_csv_str(content: &str, delimiter: u8) -> LoadResult<Table> {
    let mut reader = ::csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(i, h)| if h.trim().is_empty() { unnamed_header(i) } else { h.to_string() })
        .collect();

    if headers.is_empty() {
        return Err(LoadError::EmptyFile);
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in reader.records() {
        let record = record?;
        for (i, column) in raw.iter_mut().enumerate() {
            column.push(record.get(i).unwrap_or("").to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| Column::new(name, infer_column(cells)))
        .collect();

    Ok(Table::new(columns)?)
}

/// Type a column of raw strings as a whole.
fn infer_column(cells: Vec<String>) -> Vec<CellValue> {
    let present = || cells.iter().map(|c| c.trim()).filter(|c| !is_na(c));

    if present().all(|c| c.parse::<i64>().is_ok()) {
        return convert(cells, |c| c.parse().ok().map(CellValue::Int));
    }
    if present().all(|c| c.parse::<f64>().is_ok()) {
        return convert(cells, |c| c.parse().ok().map(CellValue::Float));
    }
    if present().all(|c| parse_bool(c).is_some()) {
        return convert(cells, |c| parse_bool(c).map(CellValue::Bool));
    }

    cells
        .into_iter()
        .map(|c| if is_na(&c) { CellValue::Empty } else { CellValue::Text(c) })
        .collect()
}

fn convert<F>(cells: Vec<String>, parse: F) -> Vec<CellValue>
where
    F: Fn(&str) -> Option<CellValue>,
{
    cells
        .iter()
        .map(|c| {
            let c = c.trim();
            if is_na(c) {
                CellValue::Empty
            } else {
                parse(c).unwrap_or(CellValue::Empty)
            }
        })
        .collect()
}

fn is_na(cell: &str) -> bool {
    NA_VALUES.contains(&cell)
}

fn parse_bool(cell: &str) -> Option<bool> {
    match cell {
        "True" | "TRUE" | "true" => Some(true),
        "False" | "FALSE" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let table = parse_csv_str(" sample 수 ,DOF1, sample 1 \n0,1.1,0\n1,1.2,1\n", b',').unwrap();

        assert_eq!(table.column_names(), vec![" sample 수 ", "DOF1", " sample 1 "]);
        assert_eq!(table.columns()[0].values, vec![CellValue::Int(0), CellValue::Int(1)]);
        assert_eq!(table.columns()[1].values, vec![CellValue::Float(1.1), CellValue::Float(1.2)]);
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let table = parse_csv_str("sample\n1\nA\n", b',').unwrap();
        assert_eq!(
            table.columns()[0].values,
            vec![CellValue::Text("1".into()), CellValue::Text("A".into())]
        );
    }

    #[test]
    fn test_missing_values() {
        let table = parse_csv_str("a;b;c\n1;;3\n2;NaN;4", b';').unwrap();

        assert_eq!(table.columns()[1].values, vec![CellValue::Empty, CellValue::Empty]);
        assert_eq!(table.columns()[2].values, vec![CellValue::Int(3), CellValue::Int(4)]);
    }

    #[test]
    fn test_short_and_long_rows() {
        let table = parse_csv_str("a,b\n1\n2,3,4\n", b',').unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.columns()[1].values, vec![CellValue::Empty, CellValue::Int(3)]);
    }

    #[test]
    fn test_quoted_values() {
        let table = parse_csv_str("name,value\n\"Alice\",\"Hello, World\"\n", b',').unwrap();
        assert_eq!(table.columns()[1].values, vec![CellValue::Text("Hello, World".into())]);
    }

    #[test]
    fn test_unnamed_headers() {
        let table = parse_csv_str("a,,c\n1,2,3\n", b',').unwrap();
        assert_eq!(table.column_names(), vec!["a", "Unnamed: 1", "c"]);
    }

    #[test]
    fn test_bool_column() {
        let table = parse_csv_str("flag\nTrue\nfalse\n", b',').unwrap();
        assert_eq!(table.columns()[0].values, vec![CellValue::Bool(true), CellValue::Bool(false)]);
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(parse_csv_str("", b','), Err(LoadError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), b';');
        assert_eq!(detect_delimiter("a,b,c\n1,2,3"), b',');
        assert_eq!(detect_delimiter("a\tb\tc\n1\t2\t3"), b'\t');
        assert_eq!(detect_delimiter("a|b|c\n1|2|3"), b'|');
        assert_eq!(detect_delimiter("single"), b',');
    }

    #[test]
    fn test_utf8_bom_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("sample,DOF1\n0,1\n".as_bytes());

        let (table, info) = parse_csv_bytes(&bytes, None).unwrap();
        assert_eq!(info.encoding, "utf-8");
        assert_eq!(table.column_names(), vec!["sample", "DOF1"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_euc_kr_decoding() {
        let (encoded, _, _) = encoding_rs::EUC_KR.encode("sample 수");
        assert_eq!(decode_content(&encoded, "euc-kr"), "sample 수");
    }

    #[test]
    fn test_forced_delimiter() {
        let (table, info) = parse_csv_bytes(b"a;b,c\n1;2,3\n", Some(b',')).unwrap();
        assert_eq!(info.delimiter, b',');
        assert_eq!(table.column_names(), vec!["a;b", "c"]);
    }
}
