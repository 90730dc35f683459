//! Rendering of gateway chat replies into display text.

use serde_json::Value;

use crate::application::gateway::TurnReply;

/// Advisory sections a structured reply may carry, with their headings.
const ADVISORY_SECTIONS: [(&str, &str); 3] = [
    ("questions_to_client", "Уточняющие вопросы:"),
    ("action_plan", "План действий:"),
    ("documents_needed", "Необходимые документы:"),
];

/// Normalizes a turn reply into display text plus the structured payload
/// to persist alongside it.
///
/// An explicit `"message"` string wins verbatim. Without one, advisory
/// fields render as a multi-section message; failing that, the payload is
/// stringified so the UI always has something to show.
pub fn display_text(reply: &TurnReply) -> (String, Option<Value>) {
    match reply {
        TurnReply::Text(text) => (text.clone(), None),
        TurnReply::Structured(map) => {
            let payload = Value::Object(map.clone());

            if let Some(message) = map.get("message").and_then(Value::as_str) {
                return (message.to_string(), Some(payload));
            }

            if let Some(sections) = render_advisory_sections(map) {
                return (sections, Some(payload));
            }

            (payload.to_string(), Some(payload))
        }
    }
}

/// Formats the advisory fields of a reply as titled bullet lists.
fn render_advisory_sections(map: &serde_json::Map<String, Value>) -> Option<String> {
    let mut sections = Vec::new();

    for (field, heading) in ADVISORY_SECTIONS {
        let Some(items) = map.get(field).and_then(Value::as_array) else {
            continue;
        };
        let bullets: Vec<String> = items
            .iter()
            .filter_map(Value::as_str)
            .map(|item| format!("- {}", item))
            .collect();
        if !bullets.is_empty() {
            sections.push(format!("{}\n{}", heading, bullets.join("\n")));
        }
    }

    if sections.is_empty() {
        None
    } else {
        Some(sections.join("\n\n"))
    }
}
