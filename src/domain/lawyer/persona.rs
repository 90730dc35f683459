//! AI lawyer personas and the immutable persona directory.
//!
//! The directory is loaded once at process start (from configuration or the
//! built-in demo set) and passed explicitly to the components that need it.
//! It is never mutated at runtime.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{AssistantRef, DomainError, ErrorCode};

use super::specialization::Specialization;

/// A named AI lawyer identity bound to an external assistant definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Persona {
    /// Specialization this persona handles.
    pub code: Specialization,
    /// External provider reference for the assistant.
    pub assistant_id: AssistantRef,
    /// Display name shown to clients.
    pub name: String,
    /// Short personality blurb.
    pub personality: String,
    /// Advertised response time.
    pub response_time: String,
}

/// Immutable directory of available personas plus routing policy.
#[derive(Debug, Clone)]
pub struct PersonaDirectory {
    /// Assistant used for request analysis (not a lawyer persona).
    analyzer: AssistantRef,
    /// Specialization used when classification cannot decide.
    fallback: Specialization,
    personas: Vec<Persona>,
}

impl PersonaDirectory {
    /// Builds a directory, enforcing that the fallback specialization has a
    /// persona and that no specialization appears twice.
    pub fn new(
        analyzer: AssistantRef,
        fallback: Specialization,
        personas: Vec<Persona>,
    ) -> Result<Self, DomainError> {
        if personas.is_empty() {
            return Err(DomainError::new(
                ErrorCode::PersonaNotFound,
                "persona directory cannot be empty",
            ));
        }
        for (i, persona) in personas.iter().enumerate() {
            if personas[..i].iter().any(|p| p.code == persona.code) {
                return Err(DomainError::new(
                    ErrorCode::InvalidFormat,
                    format!("duplicate persona for specialization '{}'", persona.code),
                ));
            }
        }
        if !personas.iter().any(|p| p.code == fallback) {
            return Err(DomainError::new(
                ErrorCode::PersonaNotFound,
                format!("no persona for fallback specialization '{}'", fallback),
            ));
        }
        Ok(Self {
            analyzer,
            fallback,
            personas,
        })
    }

    /// The built-in demo directory mirroring the original deployment.
    pub fn builtin() -> Self {
        Self::new(
            AssistantRef::new("fvtvd2uu4hpgl9rmptqh"),
            Specialization::Civil,
            vec![
                Persona {
                    code: Specialization::Family,
                    assistant_id: AssistantRef::new("fvtsur6lqll4n4q4lj5g"),
                    name: "Мария Петрова".to_string(),
                    personality: "Эксперт по семейным спорам".to_string(),
                    response_time: "1-2 часа".to_string(),
                },
                Persona {
                    code: Specialization::Labor,
                    assistant_id: AssistantRef::new("fvt0q9er8h746fennfel"),
                    name: "Анна Ковалева".to_string(),
                    personality: "Эмпатичный юрист с 8-летним опытом".to_string(),
                    response_time: "30-60 минут".to_string(),
                },
                Persona {
                    code: Specialization::Auto,
                    assistant_id: AssistantRef::new("fvtmmr90b7m270h1ik5n"),
                    name: "Дмитрий Соколов".to_string(),
                    personality: "Бывший сотрудник ГИБДД".to_string(),
                    response_time: "15-30 минут".to_string(),
                },
                Persona {
                    code: Specialization::Civil,
                    assistant_id: AssistantRef::new("fvtc7p31wk55gmab04vj"),
                    name: "Елена Васильева".to_string(),
                    personality: "Универсальный юрист по гражданским делам".to_string(),
                    response_time: "1-2 часа".to_string(),
                },
            ],
        )
        .expect("builtin persona directory is valid")
    }

    /// Assistant used for request analysis.
    pub fn analyzer(&self) -> &AssistantRef {
        &self.analyzer
    }

    /// Configured fallback specialization.
    pub fn fallback(&self) -> Specialization {
        self.fallback
    }

    /// Looks up the persona for a specialization.
    pub fn get(&self, code: Specialization) -> Option<&Persona> {
        self.personas.iter().find(|p| p.code == code)
    }

    /// Resolves a raw specialization code to a persona.
    pub fn resolve(&self, code: &str) -> Option<&Persona> {
        Specialization::parse(code).and_then(|c| self.get(c))
    }

    /// Persona used when routing cannot decide.
    pub fn fallback_persona(&self) -> &Persona {
        self.get(self.fallback)
            .expect("directory invariant: fallback persona exists")
    }

    /// All personas, in directory order.
    pub fn all(&self) -> &[Persona] {
        &self.personas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_directory_covers_every_specialization() {
        let directory = PersonaDirectory::builtin();
        for spec in Specialization::ALL {
            assert!(directory.get(spec).is_some(), "missing persona for {}", spec);
        }
    }

    #[test]
    fn resolve_parses_and_looks_up() {
        let directory = PersonaDirectory::builtin();
        assert_eq!(directory.resolve("labor").unwrap().name, "Анна Ковалева");
        assert!(directory.resolve("criminal").is_none());
    }

    #[test]
    fn fallback_persona_always_exists() {
        let directory = PersonaDirectory::builtin();
        assert_eq!(directory.fallback_persona().code, Specialization::Civil);
    }

    #[test]
    fn directory_rejects_missing_fallback() {
        let personas = vec![Persona {
            code: Specialization::Auto,
            assistant_id: AssistantRef::new("a1"),
            name: "Тест".to_string(),
            personality: String::new(),
            response_time: String::new(),
        }];
        let result =
            PersonaDirectory::new(AssistantRef::new("gen"), Specialization::Civil, personas);
        assert!(result.is_err());
    }

    #[test]
    fn directory_rejects_duplicate_codes() {
        let persona = Persona {
            code: Specialization::Civil,
            assistant_id: AssistantRef::new("a1"),
            name: "Тест".to_string(),
            personality: String::new(),
            response_time: String::new(),
        };
        let result = PersonaDirectory::new(
            AssistantRef::new("gen"),
            Specialization::Civil,
            vec![persona.clone(), persona],
        );
        assert!(result.is_err());
    }

    #[test]
    fn directory_rejects_empty_set() {
        let result =
            PersonaDirectory::new(AssistantRef::new("gen"), Specialization::Civil, Vec::new());
        assert!(result.is_err());
    }
}
