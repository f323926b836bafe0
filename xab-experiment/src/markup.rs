//! Markup for the X and choice screens. Stimulus content is inserted as is.

use xab_core::StimulusContent;

pub const STIMULUS_CLASS: &str = "jspsych-xab-stimulus";
const HIDDEN_STYLE: &str = " style=\"visibility: hidden;\"";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn class(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

pub fn x_screen(x: &StimulusContent) -> String {
    format!("<div class=\"{STIMULUS_CLASS}\">{x}</div>")
}

pub fn choice(side: Side, content: &StimulusContent, hidden: bool) -> String {
    let style = if hidden { HIDDEN_STYLE } else { "" };
    format!(
        "<div class=\"{STIMULUS_CLASS} {}\"{style}>{content}</div>",
        side.class()
    )
}

/// Both choices plus the prompt. With `hidden` the stimuli keep their
/// layout but are invisible; the prompt stays visible.
pub fn choices_screen(
    left: &StimulusContent,
    right: &StimulusContent,
    prompt: &str,
    hidden: bool,
) -> String {
    let mut html = choice(Side::Left, left, hidden);
    html.push_str(&choice(Side::Right, right, hidden));
    html.push_str(prompt);
    html
}
