use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use xab_core::TrialConfig;
use xab_experiment::ScriptedKey;

#[derive(Deserialize)]
#[serde(untagged)]
enum TimelineFile {
    Trials(Vec<TrialConfig>),
    Wrapped { timeline: Vec<TrialConfig> },
}

/// Reads a timeline: either a bare array of trial configs or an object with
/// a `timeline` array.
pub fn load_timeline(path: &Path) -> Result<Vec<TrialConfig>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read timeline {}", path.display()))?;
    let file: TimelineFile = serde_json::from_str(&text)
        .with_context(|| format!("cannot parse timeline {}", path.display()))?;
    Ok(match file {
        TimelineFile::Trials(trials) | TimelineFile::Wrapped { timeline: trials } => trials,
    })
}

/// Reads scripted responses, one list per trial.
pub fn load_responses(path: &Path) -> Result<Vec<Vec<ScriptedKey>>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("cannot read responses {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("cannot parse responses {}", path.display()))
}
