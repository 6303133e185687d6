//! CSV extraction with encoding and delimiter auto-detection.
//!
//! Turns an input file into a typed [`Relation`]. No category logic here.

use std::io::Read;
use std::path::Path;

use crate::error::{CsvError, CsvResult};
use crate::models::{Cell, Relation};

/// Result of parsing with metadata
#[derive(Debug, Clone)]
pub struct ParseResult {
    /// Parsed rows with inferred cell types
    pub relation: Relation,
    /// Detected encoding
    pub encoding: String,
    /// Detected or used delimiter
    pub delimiter: char,
}

impl ParseResult {
    pub fn headers(&self) -> &[String] {
        self.relation.columns()
    }
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    // Normalize charset names
    match charset.to_lowercase().as_str() {
        "" | "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        other => other.to_string(),
    }
}

/// Decode bytes to string using the specified encoding.
///
/// Unknown encodings fall back to lossy UTF-8. A leading BOM is dropped.
pub fn decode_content(bytes: &[u8], encoding: &str) -> String {
    let codec = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => encoding_rs::UTF_8,
        "iso-8859-1" | "latin-1" | "latin1" | "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252,
        other => encoding_rs::Encoding::for_label(other.as_bytes()).unwrap_or(encoding_rs::UTF_8),
    };
    codec.decode(bytes).0.into_owned()
}

/// Detect the delimiter by counting occurrences in the header line.
///
/// Falls back to `,` when no candidate appears.
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse CSV text into a relation with an explicit delimiter.
///
/// # Example
/// ```ignore
/// use disaster_etl::parser::csv_to_relation;
///
/// let rel = csv_to_relation("id,message\n1,Water needed", ',').unwrap();
/// assert_eq!(rel.columns(), ["id", "message"]);
/// ```
pub fn csv_to_relation(csv: &str, delimiter: char) -> CsvResult<Relation> {
    parse_csv(csv.as_bytes(), delimiter)
}

/// Parse CSV from a reader into a relation.
///
/// Quoting follows RFC 4180. Rows shorter than the header are padded with
/// nulls; longer rows are rejected. Columns whose non-empty values all parse
/// as integers become integer columns.
pub fn parse_csv<R: Read>(reader: R, delimiter: char) -> CsvResult<Relation> {
    if !delimiter.is_ascii() {
        return Err(CsvError::ParseError {
            line: 1,
            message: format!("delimiter '{}' is not a single byte", delimiter),
        });
    }

    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(csv_parse_error)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.is_empty() {
        return Err(CsvError::EmptyFile);
    }
    if headers.iter().all(|h| h.is_empty()) {
        return Err(CsvError::NoHeaders);
    }

    let mut raw_rows: Vec<Vec<Option<String>>> = Vec::new();
    for record in rdr.records() {
        let record = record.map_err(csv_parse_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);

        if record.len() > headers.len() {
            return Err(CsvError::ParseError {
                line,
                message: format!("{} fields, header has {}", record.len(), headers.len()),
            });
        }

        let mut row: Vec<Option<String>> = record
            .iter()
            .map(|v| if v.is_empty() { None } else { Some(v.to_string()) })
            .collect();
        row.resize(headers.len(), None);
        raw_rows.push(row);
    }

    let integer_columns: Vec<bool> = (0..headers.len())
        .map(|i| {
            raw_rows
                .iter()
                .filter_map(|r| r[i].as_deref())
                .all(|v| v.trim().parse::<i64>().is_ok())
        })
        .collect();

    let mut relation = Relation::new(headers);
    for raw in raw_rows {
        let row = raw
            .into_iter()
            .zip(&integer_columns)
            .map(|(value, &is_int)| match value {
                None => Cell::Null,
                Some(v) if is_int => v.trim().parse::<i64>().map(Cell::Integer).unwrap_or(Cell::Text(v)),
                Some(v) => Cell::Text(v),
            })
            .collect();
        // Width is fixed by the resize above
        relation.push_row(row).map_err(|e| CsvError::ParseError {
            line: 0,
            message: e.to_string(),
        })?;
    }

    Ok(relation)
}

fn csv_parse_error(e: csv::Error) -> CsvError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    CsvError::ParseError {
        line,
        message: e.to_string(),
    }
}

/// Parse CSV bytes, detecting the encoding and (unless given) the delimiter.
pub fn parse_bytes(bytes: &[u8], delimiter: Option<char>) -> CsvResult<ParseResult> {
    if bytes.is_empty() {
        return Err(CsvError::EmptyFile);
    }

    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding);
    let delimiter = delimiter.unwrap_or_else(|| detect_delimiter(&content));
    let relation = csv_to_relation(&content, delimiter)?;

    Ok(ParseResult {
        relation,
        encoding,
        delimiter,
    })
}

/// Parse a CSV file, detecting the encoding and (unless given) the delimiter.
pub fn parse_csv_file<P: AsRef<Path>>(path: P, delimiter: Option<char>) -> CsvResult<ParseResult> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| CsvError::IoError {
        path: path.display().to_string(),
        source,
    })?;

    parse_bytes(&bytes, delimiter)
}

/// Parse a CSV file with full auto-detection.
pub fn parse_csv_file_auto<P: AsRef<Path>>(path: P) -> CsvResult<ParseResult> {
    parse_csv_file(path, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_csv() {
        let rel = csv_to_relation("id,message\n1,Water needed\n2,Send food", ',').unwrap();

        assert_eq!(rel.row_count(), 2);
        assert_eq!(rel.get(0, "id"), Some(&Cell::Integer(1)));
        assert_eq!(rel.get(0, "message"), Some(&Cell::from("Water needed")));
        assert_eq!(rel.get(1, "message"), Some(&Cell::from("Send food")));
    }

    #[test]
    fn test_quoted_commas_and_quotes() {
        let csv = "id,message\n1,\"Water, food and \"\"shelter\"\"\"";
        let rel = csv_to_relation(csv, ',').unwrap();

        assert_eq!(
            rel.get(0, "message"),
            Some(&Cell::from("Water, food and \"shelter\""))
        );
    }

    #[test]
    fn test_encoded_categories_survive_comma_parsing() {
        let csv = "id,categories\n2,related-1;request-0;offer-0";
        let rel = csv_to_relation(csv, ',').unwrap();

        assert_eq!(
            rel.get(0, "categories"),
            Some(&Cell::from("related-1;request-0;offer-0"))
        );
    }

    #[test]
    fn test_missing_values_are_null() {
        let rel = csv_to_relation("id,message,original\n1,hi,\n2,yo", ',').unwrap();

        assert_eq!(rel.get(0, "original"), Some(&Cell::Null));
        assert_eq!(rel.get(1, "original"), Some(&Cell::Null));
    }

    #[test]
    fn test_mixed_column_stays_text() {
        let rel = csv_to_relation("code\n12\nabc", ',').unwrap();

        assert_eq!(rel.get(0, "code"), Some(&Cell::from("12")));
        assert_eq!(rel.get(1, "code"), Some(&Cell::from("abc")));
    }

    #[test]
    fn test_extra_fields_rejected() {
        let err = csv_to_relation("a,b\n1,2,3", ',').unwrap_err();
        assert!(matches!(err, CsvError::ParseError { line: 2, .. }));
    }

    #[test]
    fn test_empty_csv_error() {
        assert!(matches!(csv_to_relation("", ','), Err(CsvError::EmptyFile)));
        assert!(matches!(parse_bytes(b"", None), Err(CsvError::EmptyFile)));
    }

    #[test]
    fn test_detect_delimiter() {
        assert_eq!(detect_delimiter("id,message,genre\n1,a,b"), ',');
        assert_eq!(detect_delimiter("a;b;c\n1;2;3"), ';');
        assert_eq!(detect_delimiter("a\tb\tc"), '\t');
        assert_eq!(detect_delimiter("a|b|c"), '|');
        assert_eq!(detect_delimiter("single"), ',');
    }

    #[test]
    fn test_detect_delimiter_ignores_category_semicolons_in_body() {
        let content = "id,categories\n1,related-1;request-0;offer-0;aid_related-0";
        assert_eq!(detect_delimiter(content), ',');
    }

    #[test]
    fn test_auto_parse() {
        let csv = "id;message\n1;Alice\n2;Bob";
        let result = parse_bytes(csv.as_bytes(), None).unwrap();

        assert_eq!(result.delimiter, ';');
        assert_eq!(result.encoding, "utf-8");
        assert_eq!(result.relation.row_count(), 2);
        assert_eq!(result.headers(), ["id", "message"]);
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_latin1_signs_are_not_iso_8859_15() {
        // ¤ ¦ ¨ ´ ¸ ¼ ½ ¾ in ISO-8859-1
        let bytes: &[u8] = &[0xA4, 0xA6, 0xA8, 0xB4, 0xB8, 0xBC, 0xBD, 0xBE];
        let decoded = decode_content(bytes, "iso-8859-1");
        assert_eq!(decoded, "\u{a4}\u{a6}\u{a8}\u{b4}\u{b8}\u{bc}\u{bd}\u{be}");
    }

    #[test]
    fn test_utf8_bom_is_stripped() {
        let bytes = b"\xEF\xBB\xBFid,message\n1,hi";
        let decoded = decode_content(bytes, "utf-8");
        assert!(decoded.starts_with("id,"));
    }

    #[test]
    fn test_missing_file() {
        let err = parse_csv_file_auto("/definitely/not/here.csv").unwrap_err();
        assert!(matches!(err, CsvError::IoError { .. }));
    }
}
