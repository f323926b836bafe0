use crate::key::KeyCode;
use crate::sentinel;
use crate::stimulus::ResolvedStimuli;
use serde::{Deserialize, Serialize};

/// How a trial ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Response { key: KeyCode, rt_ms: u64 },
    Timeout,
}

/// Recorded result of one trial. Field names follow the experiment data
/// columns; missing values are written as `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialResult {
    #[serde(rename = "rt", with = "sentinel")]
    pub reaction_time_ms: Option<u64>,
    pub correct: bool,
    /// `[x, target, foil]` as a JSON array string.
    #[serde(rename = "stimulus")]
    pub stimuli: String,
    #[serde(with = "sentinel")]
    pub key_press: Option<KeyCode>,
}

impl TrialResult {
    /// Scores `outcome` against the side the target was shown on.
    pub fn score(
        outcome: Outcome,
        stimuli: &ResolvedStimuli,
        left_key: KeyCode,
        right_key: KeyCode,
        target_on_left: bool,
    ) -> Self {
        match outcome {
            Outcome::Response { key, rt_ms } => {
                let correct = if key == left_key {
                    target_on_left
                } else if key == right_key {
                    !target_on_left
                } else {
                    false
                };
                Self {
                    reaction_time_ms: Some(rt_ms),
                    correct,
                    stimuli: stimuli.to_json_triple(),
                    key_press: Some(key),
                }
            }
            Outcome::Timeout => Self {
                reaction_time_ms: None,
                correct: false,
                stimuli: stimuli.to_json_triple(),
                key_press: None,
            },
        }
    }

    pub fn timed_out(&self) -> bool {
        self.key_press.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stimulus::StimulusContent;
    use proptest::prelude::*;

    fn stimuli() -> ResolvedStimuli {
        let items: Vec<StimulusContent> = ["img_x", "img_a", "img_b"].map(StimulusContent::from).to_vec();
        ResolvedStimuli::resolve(&items).unwrap()
    }

    #[test]
    fn timeout_is_incorrect_with_sentinels() {
        let r = TrialResult::score(Outcome::Timeout, &stimuli(), KeyCode::Q, KeyCode::P, true);
        assert!(!r.correct);
        assert!(r.timed_out());
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["rt"], -1);
        assert_eq!(json["key_press"], -1);
        assert_eq!(json["correct"], false);
        assert_eq!(json["stimulus"], r#"["img_x","img_a","img_b"]"#);
    }

    #[test]
    fn response_serializes_key_code() {
        let r = TrialResult::score(
            Outcome::Response { key: KeyCode::Q, rt_ms: 150 },
            &stimuli(),
            KeyCode::Q,
            KeyCode::P,
            true,
        );
        assert!(r.correct);
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(
            json,
            r#"{"rt":150,"correct":true,"stimulus":"[\"img_x\",\"img_a\",\"img_b\"]","key_press":81}"#
        );
        let back: TrialResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, r);
    }

    #[test]
    fn unknown_key_is_never_correct() {
        for side in [true, false] {
            let r = TrialResult::score(
                Outcome::Response { key: KeyCode(65), rt_ms: 1 },
                &stimuli(),
                KeyCode::Q,
                KeyCode::P,
                side,
            );
            assert!(!r.correct);
        }
    }

    proptest! {
        #[test]
        fn correct_iff_key_side_matches_target_side(left_pressed: bool, target_on_left: bool, rt_ms in 0u64..10_000) {
            let key = if left_pressed { KeyCode::Q } else { KeyCode::P };
            let r = TrialResult::score(
                Outcome::Response { key, rt_ms },
                &stimuli(),
                KeyCode::Q,
                KeyCode::P,
                target_on_left,
            );
            prop_assert_eq!(r.correct, left_pressed == target_on_left);
            prop_assert_eq!(r.reaction_time_ms, Some(rt_ms));
        }
    }
}
