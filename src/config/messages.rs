//! User-facing messages shown by the presentation layer.

use serde::Deserialize;

/// Banner texts and how long they stay visible.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Seconds before an error or success banner clears itself.
    pub clear_after_secs: u64,
    pub success: String,
    pub duplicate: String,
    pub persistence: String,
    pub validation: String,
    pub busy: String,
    pub empty_export: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            clear_after_secs: 5,
            success: "¡Gracias! Tu asistencia quedó confirmada.".to_string(),
            duplicate: "Este número ya está registrado. Si necesitas modificar tu confirmación, contáctanos."
                .to_string(),
            persistence: "Hubo un error al guardar tu confirmación. Por favor intenta de nuevo."
                .to_string(),
            validation: "Por favor revisa los campos marcados.".to_string(),
            busy: "Estamos guardando tu confirmación, espera un momento.".to_string(),
            empty_export: "No hay confirmaciones registradas aún.".to_string(),
        }
    }
}
