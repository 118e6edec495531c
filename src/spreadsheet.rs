//! Spreadsheet writers for exported confirmation tables.

use std::borrow::Cow;
use std::io::{self, Write};

use chrono::NaiveDate;

use crate::workflow::ExportTable;

/// Turns an [`ExportTable`] into a downloadable file.
pub trait SpreadsheetWriter: Send + Sync {
    /// File extension without the dot.
    fn extension(&self) -> &'static str;

    /// MIME type served with the file.
    fn content_type(&self) -> &'static str;

    fn write(&self, table: &ExportTable, out: &mut dyn Write) -> io::Result<()>;

    fn to_bytes(&self, table: &ExportTable) -> io::Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write(table, &mut buf)?;
        Ok(buf)
    }
}

/// RFC 4180 CSV with a UTF-8 byte order mark.
///
/// Cells that a spreadsheet would read as a formula are prefixed with `'`
/// so they open as text. Width hints have no CSV equivalent and are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvWriter;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

impl CsvWriter {
    fn write_record<'a>(
        out: &mut dyn Write,
        cells: impl IntoIterator<Item = &'a str>,
    ) -> io::Result<()> {
        for (i, cell) in cells.into_iter().enumerate() {
            if i > 0 {
                out.write_all(b",")?;
            }
            write_cell(out, cell)?;
        }
        out.write_all(b"\r\n")
    }
}

/// Leading characters that make Excel or LibreOffice evaluate a cell.
const FORMULA_TRIGGERS: [char; 6] = ['=', '+', '-', '@', '\t', '\r'];

fn neutralize(cell: &str) -> Cow<'_, str> {
    if cell.starts_with(FORMULA_TRIGGERS) {
        Cow::Owned(format!("'{}", cell))
    } else {
        Cow::Borrowed(cell)
    }
}

fn write_cell(out: &mut dyn Write, cell: &str) -> io::Result<()> {
    let cell = neutralize(cell);
    if cell.contains([',', '"', '\r', '\n']) {
        write!(out, "\"{}\"", cell.replace('"', "\"\""))
    } else {
        out.write_all(cell.as_bytes())
    }
}

impl SpreadsheetWriter for CsvWriter {
    fn extension(&self) -> &'static str {
        "csv"
    }

    fn content_type(&self) -> &'static str {
        "text/csv; charset=utf-8"
    }

    fn write(&self, table: &ExportTable, out: &mut dyn Write) -> io::Result<()> {
        out.write_all(UTF8_BOM)?;
        Self::write_record(out, table.columns.iter().map(|c| c.header.as_str()))?;
        for row in &table.rows {
            Self::write_record(out, row.iter().map(String::as_str))?;
        }
        Ok(())
    }
}

/// `{prefix}_{YYYY-MM-DD}.{extension}`
pub fn export_file_name(prefix: &str, date: NaiveDate, extension: &str) -> String {
    format!("{}_{}.{}", prefix, date.format("%Y-%m-%d"), extension)
}
