use crate::error::ImportError;
use crate::import::detect::{detect_delimiter, SAMPLE_LINES};
use crate::import::tokenize::tokenize_row;
use common::model::csv::{Delimiter, Header};

/// A non-blank line of the uploaded file.
#[derive(Debug, Clone)]
pub struct RawLine {
    /// 1-based line number in the file.
    pub number: usize,
    pub text: String,
}

/// The uploaded file, held whole in memory.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub lines: Vec<RawLine>,
}

impl RawTable {
    /// Splits text into lines, dropping a leading BOM and blank lines.
    pub fn from_text(text: &str) -> Self {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let lines = text
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(i, line)| RawLine {
                number: i + 1,
                text: line.to_string(),
            })
            .collect();
        Self { lines }
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// One data line aligned to the header list.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRow {
    /// 0-based index among data rows.
    pub index: usize,
    /// 1-based line number in the file.
    pub line: usize,
    /// One value per header; cells past the end of the line are empty.
    pub values: Vec<String>,
    /// Non-empty cells in columns without a header, by 0-based column.
    pub extras: Vec<(usize, String)>,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub delimiter: Delimiter,
    pub headers: Vec<Header>,
    pub rows: Vec<SourceRow>,
}

/// Keeps the non-empty header cells, in order, duplicates included.
pub fn normalize_headers<S: AsRef<str>>(cells: &[S]) -> Vec<Header> {
    cells
        .iter()
        .enumerate()
        .filter_map(|(column, cell)| {
            let name = cell.as_ref().trim();
            (!name.is_empty()).then(|| Header {
                name: name.to_string(),
                column,
            })
        })
        .collect()
}

/// Detects the delimiter, reads the header row and aligns every data row.
pub fn parse_table(raw: &RawTable) -> Result<ParsedTable, ImportError> {
    if raw.is_empty() {
        return Err(ImportError::EmptyFile);
    }

    let sample: Vec<&str> = raw
        .lines
        .iter()
        .take(SAMPLE_LINES)
        .map(|l| l.text.as_str())
        .collect();
    let delimiter = detect_delimiter(&sample);
    log::debug!("Detected delimiter {:?}", delimiter);

    let headers = normalize_headers(&tokenize_row(&raw.lines[0].text, delimiter));
    if headers.is_empty() {
        return Err(ImportError::NoValidHeaders);
    }
    if raw.len() < 2 {
        return Err(ImportError::HeaderOnlyFile);
    }

    let rows = raw.lines[1..]
        .iter()
        .enumerate()
        .map(|(index, line)| align_row(index, line, &headers, delimiter))
        .collect();

    Ok(ParsedTable {
        delimiter,
        headers,
        rows,
    })
}

fn align_row(index: usize, line: &RawLine, headers: &[Header], delimiter: Delimiter) -> SourceRow {
    let cells = tokenize_row(&line.text, delimiter);
    let values = headers
        .iter()
        .map(|h| cells.get(h.column).cloned().unwrap_or_default())
        .collect();
    let extras = cells
        .iter()
        .enumerate()
        .filter(|(column, cell)| !cell.is_empty() && !headers.iter().any(|h| h.column == *column))
        .map(|(column, cell)| (column, cell.clone()))
        .collect();

    SourceRow {
        index,
        line: line.number,
        values,
        extras,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(headers: &[Header]) -> Vec<&str> {
        headers.iter().map(|h| h.name.as_str()).collect()
    }

    #[test]
    fn headers_skip_blanks_and_keep_duplicates() {
        let headers = normalize_headers(&[" Nome ", "", "Email", "Nome"]);
        assert_eq!(names(&headers), vec!["Nome", "Email", "Nome"]);
        assert_eq!(headers[1].column, 2);
    }

    #[test]
    fn header_normalization_is_idempotent() {
        let first = normalize_headers(&["  a", "", "b ", "a"]);
        let again = normalize_headers(&names(&first));
        assert_eq!(names(&first), names(&again));
    }

    #[test]
    fn structural_failures() {
        assert!(matches!(
            parse_table(&RawTable::from_text("")),
            Err(ImportError::EmptyFile)
        ));
        assert!(matches!(
            parse_table(&RawTable::from_text("\n  \n")),
            Err(ImportError::EmptyFile)
        ));
        assert!(matches!(
            parse_table(&RawTable::from_text(",,\n1,2,3")),
            Err(ImportError::NoValidHeaders)
        ));
        assert!(matches!(
            parse_table(&RawTable::from_text("name,email\n")),
            Err(ImportError::HeaderOnlyFile)
        ));
    }

    #[test]
    fn rows_are_padded_and_aligned_by_column() {
        let raw = RawTable::from_text("\u{feff}name;;email\r\nAna;x;ana@x.com\r\n\r\nBeto\r\n");
        let table = parse_table(&raw).unwrap();

        assert_eq!(table.delimiter, Delimiter::Semicolon);
        assert_eq!(names(&table.headers), vec!["name", "email"]);
        assert_eq!(table.rows.len(), 2);

        assert_eq!(table.rows[0].values, vec!["Ana", "ana@x.com"]);
        assert_eq!(table.rows[0].extras, vec![(1, "x".to_string())]);
        assert_eq!(table.rows[0].line, 2);

        assert_eq!(table.rows[1].values, vec!["Beto", ""]);
        assert_eq!(table.rows[1].index, 1);
        assert_eq!(table.rows[1].line, 4);
    }
}
