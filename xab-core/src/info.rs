//! Parameter schema of the XAB trial, in the shape host frameworks use to
//! type-check and document timeline entries.

use serde::Serialize;
use serde_json::{Value, json};

use crate::config::{
    DEFAULT_LEFT_KEY, DEFAULT_RIGHT_KEY, DEFAULT_X_DURATION_MS, DEFAULT_X_TO_AB_GAP_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParameterType {
    Image,
    #[serde(rename = "KEYCODE")]
    KeyCode,
    String,
    Int,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterInfo {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub array: bool,
    /// `None` marks a required parameter.
    pub default: Option<Value>,
    pub description: &'static str,
}

impl ParameterInfo {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PluginInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Vec<ParameterInfo>,
}

impl PluginInfo {
    pub fn xab() -> Self {
        let param = |name, kind, default, description| ParameterInfo {
            name,
            kind,
            array: false,
            default,
            description,
        };

        Self {
            name: "xab-html",
            description: "Shows X alone, then A and B side by side; the subject picks the one matching X.",
            parameters: vec![
                ParameterInfo {
                    name: "stimuli",
                    kind: ParameterType::Image,
                    array: true,
                    default: None,
                    description: "[x, foil] for exact-match trials or [x, target, foil]; content is used as markup verbatim.",
                },
                param(
                    "left_key",
                    ParameterType::KeyCode,
                    Some(json!(DEFAULT_LEFT_KEY.code())),
                    "Key indicating the left stimulus matches X.",
                ),
                param(
                    "right_key",
                    ParameterType::KeyCode,
                    Some(json!(DEFAULT_RIGHT_KEY.code())),
                    "Key indicating the right stimulus matches X.",
                ),
                param(
                    "prompt",
                    ParameterType::String,
                    Some(json!("")),
                    "Markup shown below the choices.",
                ),
                param(
                    "x_duration",
                    ParameterType::Int,
                    Some(json!(DEFAULT_X_DURATION_MS)),
                    "How long X is shown, in milliseconds.",
                ),
                param(
                    "x_to_ab_gap",
                    ParameterType::Int,
                    Some(json!(DEFAULT_X_TO_AB_GAP_MS)),
                    "Blank interval between X and the choices, in milliseconds.",
                ),
                param(
                    "ab_duration",
                    ParameterType::Int,
                    Some(json!(-1)),
                    "How long the choices stay visible; -1 keeps them up until the response.",
                ),
                param(
                    "trial_duration",
                    ParameterType::Int,
                    Some(json!(-1)),
                    "Response deadline measured from choice onset; -1 waits indefinitely.",
                ),
            ],
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterInfo> {
        self.parameters.iter().find(|p| p.name == name)
    }
}
