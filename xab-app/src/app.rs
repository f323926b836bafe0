use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use xab_core::{PluginInfo, TrialConfig, TrialResult};
use xab_experiment::{ScriptedKey, TrialRunner, TrialSequencer, TrialSettings};
use xab_timing::{HighPrecisionTimer, ManualClock, Timer};

use crate::cli::RunArgs;
use crate::display::TracingDisplay;
use crate::timeline::{load_responses, load_timeline};

pub struct App {
    trials: Vec<TrialConfig>,
    responses: Vec<Vec<ScriptedKey>>,
    realtime: bool,
    seed: Option<u64>,
    output: Option<PathBuf>,
}

impl App {
    pub fn load(args: &RunArgs) -> Result<Self> {
        let trials = load_timeline(&args.timeline)?;
        let responses = match &args.responses {
            Some(path) => load_responses(path)?,
            None => Vec::new(),
        };
        if responses.len() > trials.len() {
            tracing::warn!(
                scripts = responses.len(),
                trials = trials.len(),
                "more response scripts than trials; extras are ignored"
            );
        }

        Ok(Self {
            trials,
            responses,
            realtime: args.realtime,
            seed: args.seed,
            output: args.output.clone(),
        })
    }

    pub fn run(self) -> Result<()> {
        tracing::info!(
            trials = self.trials.len(),
            realtime = self.realtime,
            seed = ?self.seed,
            "=== XAB TIMELINE ==="
        );

        let results = if self.realtime {
            self.run_with(HighPrecisionTimer::new())?
        } else {
            self.run_with(ManualClock::new())?
        };

        self.write_results(&results)?;
        summarize(&results);
        Ok(())
    }

    fn run_with<T: Timer>(&self, clock: T) -> Result<Vec<TrialResult>> {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let mut runner = TrialRunner::new(clock, TracingDisplay::default());
        let mut sequencer = TrialSequencer::new(rng);

        for (i, config) in self.trials.iter().enumerate() {
            let script = self.responses.get(i).map(Vec::as_slice).unwrap_or(&[]);
            runner
                .run_trial(&mut sequencer, config, script)
                .with_context(|| format!("trial {i} failed"))?;
        }
        Ok(runner.results().to_vec())
    }

    fn write_results(&self, results: &[TrialResult]) -> Result<()> {
        let mut out: Box<dyn Write> = match &self.output {
            Some(path) => Box::new(BufWriter::new(
                File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
            )),
            None => Box::new(io::stdout().lock()),
        };
        for result in results {
            serde_json::to_writer(&mut out, result)?;
            writeln!(out)?;
        }
        out.flush()?;
        if let Some(path) = &self.output {
            tracing::info!(path = %path.display(), "results saved");
        }
        Ok(())
    }
}

/// Accuracy and reaction-time summary over a set of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub trials: usize,
    pub responses: usize,
    pub correct: usize,
    pub mean_rt_ms: Option<f64>,
    pub min_rt_ms: Option<u64>,
    pub max_rt_ms: Option<u64>,
}

impl Summary {
    pub fn from_results(results: &[TrialResult]) -> Self {
        let rts: Vec<u64> = results.iter().filter_map(|r| r.reaction_time_ms).collect();
        let mean_rt_ms = if rts.is_empty() {
            None
        } else {
            Some(rts.iter().sum::<u64>() as f64 / rts.len() as f64)
        };
        Self {
            trials: results.len(),
            responses: rts.len(),
            correct: results.iter().filter(|r| r.correct).count(),
            mean_rt_ms,
            min_rt_ms: rts.iter().copied().min(),
            max_rt_ms: rts.iter().copied().max(),
        }
    }

    pub fn accuracy(&self) -> f64 {
        if self.trials == 0 {
            return 0.0;
        }
        self.correct as f64 / self.trials as f64 * 100.0
    }
}

fn summarize(results: &[TrialResult]) {
    let s = Summary::from_results(results);
    tracing::info!(
        trials = s.trials,
        responses = s.responses,
        accuracy = %format!("{:.1}%", s.accuracy()),
        mean_rt_ms = ?s.mean_rt_ms.map(|m| (m * 10.0).round() / 10.0),
        min_rt_ms = ?s.min_rt_ms,
        max_rt_ms = ?s.max_rt_ms,
        "timeline complete"
    );
}

pub fn print_info() -> Result<()> {
    let json = serde_json::to_string_pretty(&PluginInfo::xab())?;
    println!("{json}");
    Ok(())
}

pub fn validate(path: &Path) -> Result<()> {
    let trials = load_timeline(path)?;
    if trials.is_empty() {
        bail!("timeline {} has no trials", path.display());
    }
    for (i, config) in trials.iter().enumerate() {
        TrialSettings::from_config(config).with_context(|| format!("trial {i} is invalid"))?;
    }
    tracing::info!(trials = trials.len(), path = %path.display(), "timeline is valid");
    Ok(())
}
