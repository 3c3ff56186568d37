//! Spreadsheet codec: rows of cells to and from xlsx bytes
//!
//! `decode(encode(rows))` gives back `rows`, except that text longer than
//! an xlsx cell can hold is cut to [`MAX_CELL_CHARS`].

use calamine::{Data, Reader, Xlsx};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use songdesk_core::SHEET_NAME;
use std::io::Cursor;
use tracing::warn;

use crate::error::{LogError, Result};

/// Row limit of an xlsx worksheet
const MAX_ROWS: usize = 1_048_576;

/// Column limit of an xlsx worksheet
const MAX_COLS: usize = 16_384;

/// Character limit of a single xlsx text cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// A cell value as stored in the sheet
///
/// Dates come back as their serial number: the cell's date format is not
/// carried through a rewrite, so Excel shows them as plain numbers after
/// the next append.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_blank(&self) -> bool {
        matches!(self, Cell::Text(s) if s.is_empty())
    }

    /// Display text of the cell
    pub fn text(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

/// Encode rows of text into a single-sheet workbook
///
/// Empty strings leave the cell blank.
pub fn encode(rows: &[Vec<String>]) -> Result<Vec<u8>> {
    let cells: Vec<Vec<Cell>> = rows
        .iter()
        .map(|row| row.iter().map(|s| Cell::from(s.as_str())).collect())
        .collect();
    encode_cells(&cells)
}

/// Decode the first worksheet into rows of display text
pub fn decode(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    Ok(decode_cells(bytes)?
        .into_iter()
        .map(|row| row.iter().map(Cell::text).collect())
        .collect())
}

/// Encode rows into a single-sheet workbook; row 0 is styled as the header
///
/// Text over [`MAX_CELL_CHARS`] is truncated rather than failing the whole
/// write.
pub fn encode_cells(rows: &[Vec<Cell>]) -> Result<Vec<u8>> {
    if rows.len() > MAX_ROWS {
        return Err(LogError::TooManyRows(rows.len()));
    }

    let mut workbook = Workbook::new();
    let header_format = Format::new().set_bold();
    let mut truncated = 0usize;
    {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(SHEET_NAME)?;

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate().take(MAX_COLS) {
                if cell.is_blank() {
                    continue;
                }
                let format = (r == 0).then_some(&header_format);
                if write_cell(worksheet, r as u32, c as u16, cell, format)? {
                    truncated += 1;
                }
            }
        }
    }

    if truncated > 0 {
        warn!(
            cells = truncated,
            limit = MAX_CELL_CHARS,
            "Truncated oversized spreadsheet cells"
        );
    }

    Ok(workbook.save_to_buffer()?)
}

/// Write one cell; returns whether its text had to be truncated
fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &Cell,
    format: Option<&Format>,
) -> Result<bool> {
    let mut truncated = false;
    match (cell, format) {
        (Cell::Text(s), format) => {
            let text = match s.char_indices().nth(MAX_CELL_CHARS) {
                Some((end, _)) => {
                    truncated = true;
                    &s[..end]
                }
                None => s.as_str(),
            };
            match format {
                Some(f) => worksheet.write_string_with_format(row, col, text, f)?,
                None => worksheet.write_string(row, col, text)?,
            };
        }
        (Cell::Number(n), Some(f)) => {
            worksheet.write_number_with_format(row, col, *n, f)?;
        }
        (Cell::Number(n), None) => {
            worksheet.write_number(row, col, *n)?;
        }
        (Cell::Bool(b), Some(f)) => {
            worksheet.write_boolean_with_format(row, col, *b, f)?;
        }
        (Cell::Bool(b), None) => {
            worksheet.write_boolean(row, col, *b)?;
        }
    }
    Ok(truncated)
}

/// Decode the first worksheet into rows of cells
///
/// Positions are absolute: leading blank rows and columns come back as
/// blank cells, so row 0 is always the sheet's first row.
pub fn decode_cells(bytes: &[u8]) -> Result<Vec<Vec<Cell>>> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| LogError::NoWorksheet("workbook has no sheets".to_string()))??;

    let Some((start_row, start_col)) = range.start() else {
        return Ok(Vec::new());
    };

    let mut rows: Vec<Vec<Cell>> = (0..start_row).map(|_| Vec::new()).collect();
    for cells in range.rows() {
        let mut row = vec![Cell::Text(String::new()); start_col as usize];
        row.extend(cells.iter().map(read_cell));
        rows.push(row);
    }

    Ok(rows)
}

fn read_cell(cell: &Data) -> Cell {
    match cell {
        Data::String(s) => Cell::Text(unescape(s)),
        Data::Empty => Cell::Text(String::new()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        other => Cell::Text(other.to_string()),
    }
}

/// Undo the OOXML `_xHHHH_` escaping applied to stored strings
///
/// The writer stores control characters as `_x000D_` and protects literal
/// `_xHHHH_` text as `_x005F_xHHHH_`; the reader hands both back verbatim.
fn unescape(text: &str) -> String {
    if !text.contains("_x") {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find("_x") {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match escaped_char(tail) {
            Some(c) => {
                out.push(c);
                rest = &tail[7..];
            }
            None => {
                out.push_str("_x");
                rest = &tail[2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Character encoded by a leading `_xHHHH_`, if `s` starts with one
fn escaped_char(s: &str) -> Option<char> {
    let bytes = s.as_bytes();
    if bytes.len() < 7 || bytes[6] != b'_' {
        return None;
    }
    let hex = s.get(2..6)?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_encode_produces_xlsx_zip() {
        let bytes = encode(&[row(&["a", "b"])]).unwrap();
        // xlsx is a zip archive
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn test_decode_preserves_cells_and_blanks() {
        let rows = vec![
            row(&["email", "style", "vocal"]),
            row(&["", "pop", "female"]),
            row(&["x@y.z", "", ""]),
        ];
        let decoded = decode(&encode(&rows).unwrap()).unwrap();

        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded[0], rows[0]);
        assert_eq!(decoded[1], rows[1]);
        // trailing blanks are padded to the sheet width
        assert_eq!(decoded[2], row(&["x@y.z", "", ""]));
    }

    #[test]
    fn test_decode_keeps_unicode_text() {
        let rows = vec![row(&["brief"]), row(&["Árvíztűrő tükörfúrógép, 🎵"])];
        let decoded = decode(&encode(&rows).unwrap()).unwrap();
        assert_eq!(decoded[1][0], "Árvíztűrő tükörfúrógép, 🎵");
    }

    #[test]
    fn test_escaped_text_survives_rewrites() {
        let original = vec![
            row(&["brief"]),
            row(&["line1\r\nline2"]),
            row(&["ctl\u{1}x"]),
            row(&["_x0041_"]),
            row(&["_x005F_x0041_"]),
            row(&["_x_x00zz_ _x"]),
        ];

        let mut rows = original.clone();
        for _ in 0..5 {
            rows = decode(&encode(&rows).unwrap()).unwrap();
        }
        assert_eq!(rows, original);
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("plain"), "plain");
        assert_eq!(unescape("a_x000D_b"), "a\rb");
        assert_eq!(unescape("_x005F_x0041_"), "_x0041_");
        assert_eq!(unescape("_x0041"), "_x0041");
        // surrogates are not chars, so the text stays literal
        assert_eq!(unescape("_xD800_"), "_xD800_");
    }

    #[test]
    fn test_oversized_cell_is_truncated() {
        let brief = "á".repeat(40_000);
        let rows = vec![row(&["email", "brief"]), vec!["a@b.c".to_string(), brief]];

        let decoded = decode(&encode(&rows).unwrap()).unwrap();
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[1][0], "a@b.c");
        assert_eq!(decoded[1][1].chars().count(), MAX_CELL_CHARS);
        assert!(decoded[1][1].chars().all(|c| c == 'á'));
    }

    #[test]
    fn test_typed_cells_keep_their_type() {
        let rows = vec![
            vec![Cell::from("id"), Cell::from("paid")],
            vec![Cell::Number(42.0), Cell::Bool(true)],
            vec![Cell::Number(2.5), Cell::from("")],
        ];
        let decoded = decode_cells(&encode_cells(&rows).unwrap()).unwrap();
        assert_eq!(decoded, rows);

        let text = decode(&encode_cells(&rows).unwrap()).unwrap();
        assert_eq!(text[1], row(&["42", "true"]));
    }

    #[test]
    fn test_decode_empty_sheet() {
        let decoded = decode(&encode(&[]).unwrap()).unwrap();
        assert!(decoded.iter().flatten().all(|c| c.is_empty()));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"not a spreadsheet").is_err());
    }
}
