//! Placeholder resolution for LLM-produced plans (spec section 4.4): a
//! param value like `path/to/output` is resolved against a context map
//! derived from the goal description's `keyword: value` hints. Ambiguous
//! resolution is a planning failure, never a guess.

use std::collections::HashMap;

use crate::domain::models::PlanAction;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlaceholderError {
    #[error("placeholder keyword '{0}' has no resolution in the goal context")]
    Unresolved(String),
    #[error("placeholder keyword '{0}' resolves ambiguously")]
    Ambiguous(String),
}

/// Derive a `keyword -> candidate values` context map from a goal
/// description by scanning for `keyword: value` segments separated by
/// commas or semicolons, e.g. "generate a report, output: /tmp/report.md".
/// A keyword repeated with different values is kept as multiple candidates
/// so resolution can tell "unresolved" (no candidates) apart from
/// "ambiguous" (more than one candidate) rather than silently dropping it.
pub fn context_from_description(description: &str) -> HashMap<String, Vec<String>> {
    let mut map: HashMap<String, Vec<String>> = HashMap::new();
    for segment in description.split([',', ';']) {
        if let Some((key, value)) = segment.split_once(':') {
            let key = key.trim().to_lowercase();
            let value = value.trim().to_string();
            if !key.is_empty() && !value.is_empty() {
                map.entry(key).or_default().push(value);
            }
        }
    }
    map
}

fn resolve_value(value: &str, context: &HashMap<String, Vec<String>>) -> Result<String, PlaceholderError> {
    if let Some(keyword) = value.strip_prefix("path/to/") {
        return match context.get(keyword).map(Vec::as_slice) {
            Some([single]) => Ok(single.clone()),
            Some(many) if many.len() > 1 => Err(PlaceholderError::Ambiguous(keyword.to_string())),
            _ => Err(PlaceholderError::Unresolved(keyword.to_string())),
        };
    }
    Ok(value.to_string())
}

/// Resolve every `path/to/<keyword>` placeholder found in a plan's string
/// parameters. Fails the whole resolution (and thus the plan) on the first
/// unresolved or ambiguous placeholder rather than guessing.
pub fn resolve_placeholders(actions: &mut [PlanAction], context: &HashMap<String, Vec<String>>) -> Result<(), PlaceholderError> {
    for action in actions.iter_mut() {
        for value in action.params.values_mut() {
            if let serde_json::Value::String(s) = value {
                let resolved = resolve_value(s, context)?;
                *s = resolved;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ActionType;
    use std::collections::HashMap as Map;

    #[test]
    fn resolves_a_known_keyword() {
        let context = context_from_description("write a summary, output: /tmp/summary.md");
        let mut params = Map::new();
        params.insert("file".to_string(), serde_json::json!("path/to/output"));
        let mut actions = vec![PlanAction::new(ActionType::Tool("write_file".into()), params)];
        resolve_placeholders(&mut actions, &context).unwrap();
        assert_eq!(actions[0].params["file"], serde_json::json!("/tmp/summary.md"));
    }

    #[test]
    fn unresolved_keyword_fails_rather_than_guesses() {
        let context = context_from_description("write a summary");
        let mut params = Map::new();
        params.insert("file".to_string(), serde_json::json!("path/to/output"));
        let mut actions = vec![PlanAction::new(ActionType::Tool("write_file".into()), params)];
        let err = resolve_placeholders(&mut actions, &context).unwrap_err();
        assert_eq!(err, PlaceholderError::Unresolved("output".to_string()));
    }

    #[test]
    fn ambiguous_keyword_fails_rather_than_guesses() {
        let context = context_from_description("write a summary, output: /tmp/a.md, output: /tmp/b.md");
        let mut params = Map::new();
        params.insert("file".to_string(), serde_json::json!("path/to/output"));
        let mut actions = vec![PlanAction::new(ActionType::Tool("write_file".into()), params)];
        let err = resolve_placeholders(&mut actions, &context).unwrap_err();
        assert_eq!(err, PlaceholderError::Ambiguous("output".to_string()));
    }
}
