//! Thin wrapper around calamine for reading inventory workbooks.
//!
//! Vendor exports are loose about column naming and cell typing, so all
//! access goes through candidate-list column resolution and lossy
//! cell-to-string coercion rather than a fixed schema.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use calamine::{open_workbook, Data, Range, Reader, Xlsx};

use crate::error::Result;

/// An open xlsx workbook.
pub(crate) struct Workbook<RS: Read + Seek> {
    inner: Xlsx<RS>,
}

impl Workbook<BufReader<File>> {
    /// Open a workbook from a file path.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let inner: Xlsx<_> = open_workbook(path)?;
        Ok(Self { inner })
    }
}

impl Workbook<Cursor<Vec<u8>>> {
    /// Open a workbook from an in-memory buffer.
    pub(crate) fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let inner = Xlsx::new(Cursor::new(bytes))?;
        Ok(Self { inner })
    }
}

impl<RS: Read + Seek> Workbook<RS> {
    /// All sheet names in workbook order.
    pub(crate) fn sheet_names(&self) -> Vec<String> {
        self.inner.sheet_names().to_vec()
    }

    /// Find a sheet by name, ignoring case.
    pub(crate) fn find_sheet(&self, name: &str) -> Option<String> {
        self.sheet_names()
            .into_iter()
            .find(|s| s.eq_ignore_ascii_case(name))
    }

    /// Read the cell range of a sheet.
    pub(crate) fn range(&mut self, sheet: &str) -> Result<Range<Data>> {
        Ok(self.inner.worksheet_range(sheet)?)
    }
}

/// Map lowercased header names (row 0) to column indices.
///
/// Later duplicates do not overwrite earlier columns, matching the
/// first-wins behaviour of spreadsheet tooling.
pub(crate) fn header_index(range: &Range<Data>) -> HashMap<String, usize> {
    let mut headers = HashMap::new();
    if let Some(row) = range.rows().next() {
        for (i, cell) in row.iter().enumerate() {
            let name = cell_to_string(cell);
            if name.is_empty() {
                continue;
            }
            headers.entry(name.to_lowercase()).or_insert(i);
        }
    }
    headers
}

/// Return the column index for the first candidate present in the headers.
pub(crate) fn find_col(headers: &HashMap<String, usize>, candidates: &[&str]) -> Option<usize> {
    candidates
        .iter()
        .find_map(|c| headers.get(&c.to_lowercase()).copied())
}

/// Coerce a cell to a trimmed string; empty cells become `""`.
///
/// Integral floats print without a fractional part, so a count column
/// read as `2.0` comes back as `"2"`.
pub(crate) fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Float(f) => {
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15 {
                format!("{}", *f as i64)
            } else {
                format!("{}", f)
            }
        }
        Data::Int(i) => format!("{}", i),
        Data::Bool(b) => format!("{}", b),
        Data::Error(_) => String::new(),
        other => other.to_string().trim().to_string(),
    }
}

/// String value of `row[col]`, or `""` when the column is absent.
pub(crate) fn cell_str(row: &[Data], col: Option<usize>) -> String {
    col.and_then(|c| row.get(c))
        .map(cell_to_string)
        .unwrap_or_default()
}

/// Non-negative integer value of `row[col]`; anything unparseable is 0.
pub(crate) fn cell_count(row: &[Data], col: Option<usize>) -> u32 {
    let value = match col.and_then(|c| row.get(c)) {
        Some(Data::Float(f)) => *f,
        Some(Data::Int(i)) => *i as f64,
        Some(Data::String(s)) => match s.trim().parse::<f64>() {
            Ok(f) => f,
            Err(_) => return 0,
        },
        _ => return 0,
    };
    if value.is_finite() && value > 0.0 {
        value as u32
    } else {
        0
    }
}

/// Format a raw utilisation value as a rounded percentage.
///
/// Unparseable non-empty values pass through untouched; empty values
/// render as an em dash placeholder.
pub(crate) fn fmt_pct(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Ok(v) = trimmed.parse::<f64>() {
        return format!("{:.0}%", v);
    }
    if trimmed.is_empty() {
        "—".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range_with_headers(headers: &[&str]) -> Range<Data> {
        let mut range = Range::new((0, 0), (0, headers.len() as u32 - 1));
        for (i, h) in headers.iter().enumerate() {
            range.set_value((0, i as u32), Data::String(h.to_string()));
        }
        range
    }

    #[test]
    fn test_header_index_lowercases() {
        let range = range_with_headers(&["VM Host", "Cluster", "# VMs"]);
        let headers = header_index(&range);
        assert_eq!(headers.get("vm host"), Some(&0));
        assert_eq!(headers.get("cluster"), Some(&1));
        assert_eq!(headers.get("# vms"), Some(&2));
    }

    #[test]
    fn test_find_col_first_candidate_wins() {
        let range = range_with_headers(&["Host", "DNS Name"]);
        let headers = header_index(&range);
        let col = find_col(&headers, &["VM Host", "Host", "DNS Name"]);
        assert_eq!(col, Some(0));
    }

    #[test]
    fn test_find_col_case_insensitive() {
        let range = range_with_headers(&["CLUSTER"]);
        let headers = header_index(&range);
        assert_eq!(find_col(&headers, &["Cluster"]), Some(0));
    }

    #[test]
    fn test_find_col_missing() {
        let range = range_with_headers(&["Host"]);
        let headers = header_index(&range);
        assert_eq!(find_col(&headers, &["Cluster", "Cluster Name"]), None);
    }

    #[test]
    fn test_cell_to_string_integral_float() {
        assert_eq!(cell_to_string(&Data::Float(2.0)), "2");
        assert_eq!(cell_to_string(&Data::Float(37.5)), "37.5");
    }

    #[test]
    fn test_cell_to_string_trims() {
        assert_eq!(cell_to_string(&Data::String("  esx01  ".into())), "esx01");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_cell_count_variants() {
        let row = vec![
            Data::Float(2.0),
            Data::Int(16),
            Data::String("24".into()),
            Data::String("not a number".into()),
            Data::Empty,
        ];
        assert_eq!(cell_count(&row, Some(0)), 2);
        assert_eq!(cell_count(&row, Some(1)), 16);
        assert_eq!(cell_count(&row, Some(2)), 24);
        assert_eq!(cell_count(&row, Some(3)), 0);
        assert_eq!(cell_count(&row, Some(4)), 0);
        assert_eq!(cell_count(&row, None), 0);
    }

    #[test]
    fn test_cell_count_truncates_fraction() {
        let row = vec![Data::String("2.0".into()), Data::Float(15.9)];
        assert_eq!(cell_count(&row, Some(0)), 2);
        assert_eq!(cell_count(&row, Some(1)), 15);
    }

    #[test]
    fn test_fmt_pct_rounds() {
        assert_eq!(fmt_pct("37.4"), "37%");
        assert_eq!(fmt_pct("89.6"), "90%");
        assert_eq!(fmt_pct("12"), "12%");
    }

    #[test]
    fn test_fmt_pct_passthrough_and_placeholder() {
        assert_eq!(fmt_pct("n/a"), "n/a");
        assert_eq!(fmt_pct(""), "—");
        assert_eq!(fmt_pct("   "), "—");
    }
}
