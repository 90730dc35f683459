//! Persona directory configuration.
//!
//! Personas are loaded once at startup, either from a YAML file or from
//! the built-in demo set, into the immutable [`PersonaDirectory`] that the
//! classifier and chat flow receive explicitly.

use serde::Deserialize;

use crate::domain::foundation::AssistantRef;
use crate::domain::lawyer::{Persona, PersonaDirectory, Specialization};

use super::error::ConfigError;

/// Persona configuration section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PersonasConfig {
    /// Path to the persona directory YAML file. When absent, the built-in
    /// demo directory is used.
    pub file: Option<String>,
}

/// On-disk shape of the persona directory file.
#[derive(Debug, Deserialize)]
struct PersonaFile {
    /// Assistant used for request analysis.
    analyzer: String,
    /// Specialization used when classification cannot decide.
    fallback: Specialization,
    lawyers: Vec<PersonaEntry>,
}

#[derive(Debug, Deserialize)]
struct PersonaEntry {
    code: Specialization,
    assistant_id: String,
    name: String,
    #[serde(default)]
    personality: String,
    #[serde(default)]
    response_time: String,
}

impl PersonasConfig {
    /// Loads the persona directory.
    pub fn load(&self) -> Result<PersonaDirectory, ConfigError> {
        let Some(path) = &self.file else {
            return Ok(PersonaDirectory::builtin());
        };

        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::PersonaLoadFailed(format!("{}: {}", path, e)))?;
        let file: PersonaFile = serde_yaml::from_str(&raw)
            .map_err(|e| ConfigError::PersonaLoadFailed(format!("{}: {}", path, e)))?;

        let personas = file
            .lawyers
            .into_iter()
            .map(|entry| Persona {
                code: entry.code,
                assistant_id: AssistantRef::new(entry.assistant_id),
                name: entry.name,
                personality: entry.personality,
                response_time: entry.response_time,
            })
            .collect();

        PersonaDirectory::new(AssistantRef::new(file.analyzer), file.fallback, personas)
            .map_err(|e| ConfigError::PersonaLoadFailed(e.to_string()))
    }
}
