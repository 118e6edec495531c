//! Input validation for RSVP form submissions.
//!
//! Every check runs before anything touches the store, and all offending
//! fields are collected so a guest sees every problem at once.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ChoiceField, ConfigError, EventConfig};
use crate::model::{ContactKey, ContactKeyKind, NewConfirmation};

/// Form field names as they appear in error reports.
pub mod fields {
    pub const FULL_NAME: &str = "fullName";
    pub const CONTACT_KEY: &str = "contactKey";
}

/// Error constants for validation failures.
pub mod errmsg {
    pub const REQUIRED: &str = "is required";
    pub const NAME_TOO_SHORT: &str = "must have at least";
    pub const CONTACT_KEY_FORMAT: &str = "does not match the expected format";
    pub const UNKNOWN_OPTION: &str = "is not one of the available options";
    pub const UNKNOWN_FIELD: &str = "is not a field of this form";
}

/// Raw values submitted by a guest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormInput {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub contact_key: String,
    #[serde(default)]
    pub choices: BTreeMap<String, String>,
}

/// One rejected field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn contains(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = self.fields.iter().map(|e| e.field.as_str()).collect();
        write!(f, "invalid fields: {}", names.join(", "))
    }
}

impl std::error::Error for ValidationErrors {}

/// Shape of the RSVP form for one deployment.
#[derive(Debug, Clone)]
pub struct FormSchema {
    contact_kind: ContactKeyKind,
    contact_pattern: Regex,
    min_name_len: usize,
    fields: Vec<ChoiceField>,
}

impl FormSchema {
    /// Build the schema from deployment configuration.
    ///
    /// Fails on an uncompilable contact pattern or on badly declared fields.
    pub fn from_config(event: &EventConfig) -> Result<Self, ConfigError> {
        let pattern = event.contact.effective_pattern();
        let contact_pattern = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;

        let mut seen = Vec::with_capacity(event.fields.len());
        for field in &event.fields {
            let name = field.name.trim();
            if name.is_empty() {
                return Err(ConfigError::EmptyFieldName);
            }
            if name == fields::FULL_NAME || name == fields::CONTACT_KEY {
                return Err(ConfigError::ReservedFieldName(name.to_string()));
            }
            if seen.contains(&name) {
                return Err(ConfigError::DuplicateField(name.to_string()));
            }
            seen.push(name);
        }

        Ok(Self {
            contact_kind: event.contact.kind,
            contact_pattern,
            min_name_len: event.min_name_len,
            fields: event.fields.clone(),
        })
    }

    pub fn contact_kind(&self) -> ContactKeyKind {
        self.contact_kind
    }

    pub fn fields(&self) -> &[ChoiceField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&ChoiceField> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Check the shape of `input` and normalize it into a writable record.
    ///
    /// Names and choice values are trimmed, the contact key is normalized,
    /// and empty optional fields are dropped.
    pub fn validate(&self, input: &FormInput) -> Result<NewConfirmation, ValidationErrors> {
        let mut errors = Vec::new();

        let full_name = input.full_name.trim();
        if full_name.is_empty() {
            errors.push(FieldError::new(fields::FULL_NAME, errmsg::REQUIRED));
        } else if full_name.chars().count() < self.min_name_len {
            errors.push(FieldError::new(
                fields::FULL_NAME,
                format!("{} {} characters", errmsg::NAME_TOO_SHORT, self.min_name_len),
            ));
        }

        let contact_key = ContactKey::normalize(&input.contact_key);
        if contact_key.as_str().is_empty() {
            errors.push(FieldError::new(fields::CONTACT_KEY, errmsg::REQUIRED));
        } else if !self.contact_pattern.is_match(contact_key.as_str()) {
            errors.push(FieldError::new(
                fields::CONTACT_KEY,
                errmsg::CONTACT_KEY_FORMAT,
            ));
        }

        let mut choices = BTreeMap::new();
        for field in &self.fields {
            let value = input
                .choices
                .get(&field.name)
                .map(|v| v.trim())
                .unwrap_or_default();

            if value.is_empty() {
                if field.required {
                    errors.push(FieldError::new(&field.name, errmsg::REQUIRED));
                }
                continue;
            }
            if !field.options.is_empty() && field.option(value).is_none() {
                errors.push(FieldError::new(&field.name, errmsg::UNKNOWN_OPTION));
                continue;
            }
            choices.insert(field.name.clone(), value.to_string());
        }

        for name in input.choices.keys() {
            if self.field(name).is_none() {
                errors.push(FieldError::new(name, errmsg::UNKNOWN_FIELD));
            }
        }

        if !errors.is_empty() {
            return Err(ValidationErrors { fields: errors });
        }

        Ok(NewConfirmation {
            full_name: full_name.to_string(),
            contact_key,
            choices,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChoiceOption;

    fn schema() -> FormSchema {
        FormSchema::from_config(&EventConfig::default()).unwrap()
    }

    fn input(name: &str, key: &str, dish: &str) -> FormInput {
        FormInput {
            full_name: name.to_string(),
            contact_key: key.to_string(),
            choices: BTreeMap::from([("plato".to_string(), dish.to_string())]),
        }
    }

    #[test]
    fn test_valid_input_is_normalized() {
        let record = schema()
            .validate(&input("  Ana Ruiz ", " 3001234567 ", "plato1"))
            .unwrap();
        assert_eq!(record.full_name, "Ana Ruiz");
        assert_eq!(record.contact_key.as_str(), "3001234567");
        assert_eq!(record.choices.get("plato").map(String::as_str), Some("plato1"));
    }

    #[test]
    fn test_collects_every_offending_field() {
        let err = schema().validate(&input("Al", "300123", "")).unwrap_err();
        assert!(err.contains(fields::FULL_NAME));
        assert!(err.contains(fields::CONTACT_KEY));
        assert!(err.contains("plato"));
        assert_eq!(err.fields.len(), 3);
    }

    #[test]
    fn test_name_length_counts_characters() {
        // Three characters, four bytes.
        assert!(schema().validate(&input("Íñe", "3001234567", "plato1")).is_ok());
    }

    #[test]
    fn test_phone_rejects_letters_and_wrong_length() {
        let schema = schema();
        for key in ["300123456a", "30012345678", "300 123 4567"] {
            let err = schema.validate(&input("Ana Ruiz", key, "plato1")).unwrap_err();
            assert!(err.contains(fields::CONTACT_KEY), "{} should be rejected", key);
        }
    }

    #[test]
    fn test_rejects_undeclared_option_and_field() {
        let mut form = input("Ana Ruiz", "3001234567", "plato7");
        form.choices.insert("postre".to_string(), "flan".to_string());
        let err = schema().validate(&form).unwrap_err();
        assert_eq!(
            err.fields,
            vec![
                FieldError::new("plato", errmsg::UNKNOWN_OPTION),
                FieldError::new("postre", errmsg::UNKNOWN_FIELD),
            ]
        );
    }

    #[test]
    fn test_optional_free_text_field() {
        let mut event = EventConfig::default();
        event.fields.push(ChoiceField {
            name: "mensaje".to_string(),
            label: "Mensaje".to_string(),
            required: false,
            options: vec![],
            export_width: 60,
        });
        let schema = FormSchema::from_config(&event).unwrap();

        let record = schema
            .validate(&input("Ana Ruiz", "3001234567", "plato2"))
            .unwrap();
        assert!(!record.choices.contains_key("mensaje"));

        let mut form = input("Ana Ruiz", "3001234567", "plato2");
        form.choices
            .insert("mensaje".to_string(), " ¡Felicidades! ".to_string());
        let record = schema.validate(&form).unwrap();
        assert_eq!(
            record.choices.get("mensaje").map(String::as_str),
            Some("¡Felicidades!")
        );
    }

    #[test]
    fn test_id_document_kind() {
        let mut event = EventConfig::default();
        event.contact.kind = ContactKeyKind::IdDocument;
        let schema = FormSchema::from_config(&event).unwrap();
        assert!(schema.validate(&input("Ana Ruiz", "1020304050", "plato1")).is_ok());
        assert!(schema.validate(&input("Ana Ruiz", "12345", "plato1")).is_err());
    }

    #[test]
    fn test_from_config_rejects_bad_declarations() {
        let mut event = EventConfig::default();
        event.contact.pattern = Some("([0-9".to_string());
        assert!(matches!(
            FormSchema::from_config(&event),
            Err(ConfigError::InvalidPattern { .. })
        ));

        let mut event = EventConfig::default();
        event.fields.push(event.fields[0].clone());
        assert!(matches!(
            FormSchema::from_config(&event),
            Err(ConfigError::DuplicateField(name)) if name == "plato"
        ));

        let mut event = EventConfig::default();
        event.fields[0].name = fields::CONTACT_KEY.to_string();
        assert!(matches!(
            FormSchema::from_config(&event),
            Err(ConfigError::ReservedFieldName(_))
        ));

        let mut event = EventConfig::default();
        event.fields.push(ChoiceField {
            name: "  ".to_string(),
            label: "Vacío".to_string(),
            required: false,
            options: vec![ChoiceOption {
                value: "x".to_string(),
                label: "x".to_string(),
                short_label: None,
                description: String::new(),
            }],
            export_width: 10,
        });
        assert!(matches!(
            FormSchema::from_config(&event),
            Err(ConfigError::EmptyFieldName)
        ));
    }
}
