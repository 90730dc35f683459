//! Legal-domain codes used to route problems to lawyer personas.

use serde::{Deserialize, Serialize};

/// Closed set of legal specializations a problem can be routed to.
///
/// `Civil` is the catch-all domain; routing policy decides the actual
/// fallback (see `PersonaDirectory`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Specialization {
    Auto,
    Labor,
    Family,
    Civil,
}

impl Specialization {
    /// All known codes, in routing-priority order.
    pub const ALL: [Specialization; 4] = [
        Specialization::Auto,
        Specialization::Labor,
        Specialization::Family,
        Specialization::Civil,
    ];

    /// Stable code used in URLs, persistence and classifier prompts.
    pub fn as_code(&self) -> &'static str {
        match self {
            Specialization::Auto => "auto",
            Specialization::Labor => "labor",
            Specialization::Family => "family",
            Specialization::Civil => "civil",
        }
    }

    /// Parses a stable code.
    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "auto" => Some(Specialization::Auto),
            "labor" => Some(Specialization::Labor),
            "family" => Some(Specialization::Family),
            "civil" => Some(Specialization::Civil),
            _ => None,
        }
    }

    /// Human-readable name shown to clients.
    pub fn display_name(&self) -> &'static str {
        match self {
            Specialization::Auto => "ДТП и автострахование",
            Specialization::Labor => "Трудовое право",
            Specialization::Family => "Семейное право",
            Specialization::Civil => "Гражданское право",
        }
    }
}

impl std::fmt::Display for Specialization {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_code())
    }
}
