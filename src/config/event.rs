//! Event (deployment) configuration: deadline, form fields, export layout.
//!
//! Everything that differs between one wedding deployment and another lives
//! here, so the workflow itself carries no hard-coded menu or key format.
//!
//! ```yaml
//! event:
//!   title: "Confirma tu Asistencia"
//!   deadline: "2026-05-15"
//!   utc_offset_minutes: -300
//!   contact:
//!     kind: phone
//!   fields:
//!     - name: plato
//!       label: "Plato"
//!       required: true
//!       options:
//!         - value: plato1
//!           label: "Plato 1: Lomo de Res"
//!           short_label: "Lomo de Res"
//! ```

use chrono::{DateTime, FixedOffset, NaiveDate, Offset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ContactKeyKind;

/// Display locale for dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

/// Contact key settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactConfig {
    /// Which identifier is the de-duplication key.
    pub kind: ContactKeyKind,
    /// Regex overriding the kind's default pattern.
    pub pattern: Option<String>,
}

impl ContactConfig {
    /// Pattern in effect for this deployment.
    pub fn effective_pattern(&self) -> &str {
        self.pattern
            .as_deref()
            .unwrap_or_else(|| self.kind.default_pattern())
    }
}

/// One selectable value of a choice field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub value: String,
    /// Label shown in the form.
    pub label: String,
    /// Label used in exports. Falls back to `label`.
    #[serde(default, alias = "short_label")]
    pub short_label: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl ChoiceOption {
    pub fn export_label(&self) -> &str {
        self.short_label.as_deref().unwrap_or(&self.label)
    }
}

/// A deployment-declared form field beyond name and contact key.
///
/// With no options the field is free text (a message, an allergy note).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceField {
    pub name: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<ChoiceOption>,
    /// Column width hint for spreadsheet exports.
    #[serde(default = "default_export_width", alias = "export_width")]
    pub export_width: u16,
}

fn default_export_width() -> u16 {
    50
}

impl ChoiceField {
    pub fn option(&self, value: &str) -> Option<&ChoiceOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Human label for a stored value, or the value itself if undeclared.
    pub fn export_label<'a>(&'a self, value: &'a str) -> &'a str {
        self.option(value)
            .map(ChoiceOption::export_label)
            .unwrap_or(value)
    }
}

/// Export naming.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    pub sheet_name: String,
    /// File name prefix; the date stamp and extension are appended.
    pub file_prefix: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            sheet_name: "Confirmaciones".to_string(),
            file_prefix: "Confirmaciones_Boda".to_string(),
        }
    }
}

/// Deployment configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub title: String,
    pub subtitle: String,
    /// Last day to confirm. The deadline passes at the start of this day in
    /// the event's local offset.
    pub deadline: NaiveDate,
    /// Offset of the event's local time from UTC, in minutes.
    pub utc_offset_minutes: i32,
    pub locale: Locale,
    pub contact: ContactConfig,
    /// Minimum length, in characters, of the trimmed guest name.
    pub min_name_len: usize,
    pub fields: Vec<ChoiceField>,
    pub export: ExportConfig,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            title: "Confirma tu Asistencia".to_string(),
            subtitle: "Por favor confirma antes del 15 de mayo de 2026".to_string(),
            deadline: NaiveDate::from_ymd_opt(2026, 5, 15).unwrap_or_default(),
            utc_offset_minutes: -300,
            locale: Locale::Es,
            contact: ContactConfig::default(),
            min_name_len: 3,
            fields: vec![default_dish_field()],
            export: ExportConfig::default(),
        }
    }
}

fn default_dish_field() -> ChoiceField {
    let option = |value: &str, label: &str, short: &str, description: &str| ChoiceOption {
        value: value.to_string(),
        label: label.to_string(),
        short_label: Some(short.to_string()),
        description: description.to_string(),
    };

    ChoiceField {
        name: "plato".to_string(),
        label: "Plato Seleccionado".to_string(),
        required: true,
        options: vec![
            option(
                "plato1",
                "Plato 1: Lomo de Res",
                "Lomo de Res",
                "Lomo de res al vino tinto con papas gratinadas y vegetales asados",
            ),
            option(
                "plato2",
                "Plato 2: Salmón",
                "Salmón",
                "Salmón a la parrilla con salsa de maracuyá, arroz de coco y espárragos",
            ),
            option(
                "plato3",
                "Plato 3: Pollo",
                "Pollo",
                "Pechuga de pollo rellena de espinacas y queso con puré de papa y ensalada",
            ),
        ],
        export_width: 50,
    }
}

impl EventConfig {
    /// The event's local offset. Out-of-range values fall back to UTC.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Instant at which confirmations are considered late.
    ///
    /// Midnight at the start of `deadline` in the event's offset, so the
    /// default cutoff is 05:00 UTC, not 00:00 UTC. Set `utc_offset_minutes`
    /// to 0 for a UTC midnight cutoff.
    pub fn deadline_instant(&self) -> DateTime<Utc> {
        let midnight = self.deadline.and_hms_opt(0, 0, 0).unwrap_or_default();
        self.offset()
            .from_local_datetime(&midnight)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| midnight.and_utc())
    }

    pub fn field(&self, name: &str) -> Option<&ChoiceField> {
        self.fields.iter().find(|f| f.name == name)
    }
}
