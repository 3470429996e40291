//! Strict schema parsing from raw LLM output to a concrete `PlanAction`
//! list, per the redesign note in spec section 9 ("Runtime reflection on
//! plan objects produced by LLM"): invalid plans are data errors, never
//! exceptions, and nothing enters the BDI execution loop unparsed.

use serde::Deserialize;
use std::collections::HashMap;

use crate::domain::models::{ActionType, PlanAction};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanParseError {
    #[error("LLM output is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("plan must be a JSON array of actions")]
    NotAnArray,
}

#[derive(Debug, Deserialize)]
struct RawAction {
    #[serde(rename = "type")]
    r#type: String,
    #[serde(default)]
    params: HashMap<String, serde_json::Value>,
    #[serde(default)]
    contingency: Option<Box<RawAction>>,
}

fn control_action(type_name: &str) -> Option<ActionType> {
    match type_name {
        "CREATE_AGENT" => Some(ActionType::CreateAgent),
        "UPDATE_BELIEF" => Some(ActionType::UpdateBelief),
        "NO_OP" => Some(ActionType::NoOp),
        _ => None,
    }
}

fn convert(raw: RawAction) -> PlanAction {
    let action_type = control_action(&raw.r#type).unwrap_or_else(|| ActionType::Tool(raw.r#type));
    let mut action = PlanAction::new(action_type, raw.params);
    if let Some(contingency) = raw.contingency {
        action = action.with_contingency(convert(*contingency));
    }
    action
}

/// Parse an LLM completion's raw text into a plan. The only built-in
/// control-action spellings recognized are `CREATE_AGENT`, `UPDATE_BELIEF`,
/// and `NO_OP`; any other `type` string is treated as a tool name to be
/// resolved later against the registry.
pub fn parse_plan(raw_text: &str) -> Result<Vec<PlanAction>, PlanParseError> {
    let value: serde_json::Value =
        serde_json::from_str(raw_text).map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;
    let array = value.as_array().ok_or(PlanParseError::NotAnArray)?;
    let mut actions = Vec::with_capacity(array.len());
    for item in array {
        let raw: RawAction =
            serde_json::from_value(item.clone()).map_err(|e| PlanParseError::InvalidJson(e.to_string()))?;
        actions.push(convert(raw));
    }
    Ok(actions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_tool_action() {
        let plan = parse_plan(r#"[{"type":"echo","params":{"text":"hi"}}]"#).unwrap();
        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].action_type.tool_name(), Some("echo"));
    }

    #[test]
    fn recognizes_control_actions() {
        let plan = parse_plan(r#"[{"type":"CREATE_AGENT","params":{}}]"#).unwrap();
        assert_eq!(plan[0].action_type, ActionType::CreateAgent);
    }

    #[test]
    fn rejects_non_array_payloads() {
        assert_eq!(parse_plan(r#"{"type":"echo"}"#), Err(PlanParseError::NotAnArray));
    }

    #[test]
    fn rejects_malformed_json() {
        assert!(matches!(parse_plan("not json"), Err(PlanParseError::InvalidJson(_))));
    }
}
