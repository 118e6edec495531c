//! Flat tabular snapshot of the confirmation list.
//!
//! Pure mapping with no I/O. Writing the table to a file format is the job
//! of a [`crate::spreadsheet::SpreadsheetWriter`].

use chrono::FixedOffset;
use serde::Serialize;

use crate::config::{ChoiceField, EventConfig};
use crate::model::ContactKeyKind;
use crate::workflow::ConfirmationListView;

const DATE_FORMAT: &str = "%d/%m/%Y, %H:%M:%S";

/// One column of an export, with a width hint in characters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportColumn {
    pub header: String,
    pub width: u16,
}

impl ExportColumn {
    fn new(header: impl Into<String>, width: u16) -> Self {
        Self {
            header: header.into(),
            width,
        }
    }
}

/// Rows ready for a spreadsheet writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportTable {
    pub sheet_name: String,
    pub columns: Vec<ExportColumn>,
    pub rows: Vec<Vec<String>>,
}

impl ExportTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// How a confirmation list maps onto columns.
#[derive(Debug, Clone)]
pub struct ExportLayout {
    sheet_name: String,
    offset: FixedOffset,
    contact_kind: ContactKeyKind,
    fields: Vec<ChoiceField>,
}

impl ExportLayout {
    pub fn from_config(event: &EventConfig) -> Self {
        Self {
            sheet_name: event.export.sheet_name.clone(),
            offset: event.offset(),
            contact_kind: event.contact.kind,
            fields: event.fields.clone(),
        }
    }

    pub fn columns(&self) -> Vec<ExportColumn> {
        let mut columns = vec![
            ExportColumn::new("No.", 5),
            ExportColumn::new("Fecha de Confirmación", 20),
            ExportColumn::new("Nombre Completo", 30),
            ExportColumn::new(self.contact_kind.column_header(), 15),
        ];
        columns.extend(
            self.fields
                .iter()
                .map(|f| ExportColumn::new(f.label.clone(), f.export_width)),
        );
        columns
    }

    /// Row numbers are 1-based in list order, newest first.
    pub fn build(&self, view: &ConfirmationListView) -> ExportTable {
        let rows = view
            .iter()
            .enumerate()
            .map(|(index, record)| {
                let mut row = Vec::with_capacity(4 + self.fields.len());
                row.push((index + 1).to_string());
                row.push(
                    record
                        .submitted_at
                        .with_timezone(&self.offset)
                        .format(DATE_FORMAT)
                        .to_string(),
                );
                row.push(record.full_name.clone());
                row.push(record.contact_key.clone());
                for field in &self.fields {
                    let value = record
                        .choices
                        .get(&field.name)
                        .map(|v| field.export_label(v))
                        .unwrap_or_default();
                    row.push(value.to_string());
                }
                row
            })
            .collect();

        ExportTable {
            sheet_name: self.sheet_name.clone(),
            columns: self.columns(),
            rows,
        }
    }
}
