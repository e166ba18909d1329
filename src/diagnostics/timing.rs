use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Wall-clock time spent in one stage of a solve, summed over all sweeps.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageTiming {
    pub label: String,
    pub elapsed_ms: f64,
}

impl StageTiming {
    pub fn new(label: impl Into<String>, elapsed_ms: f64) -> Self {
        Self {
            label: label.into(),
            elapsed_ms,
        }
    }
}

/// Aggregated timing trace for a solve.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimingBreakdown {
    pub total_ms: f64,
    pub stages: Vec<StageTiming>,
}

impl TimingBreakdown {
    /// Add `elapsed` to the stage named `label`, appending it on first use so
    /// stages keep their execution order.
    pub fn accumulate(&mut self, label: &str, elapsed: Duration) {
        let ms = elapsed.as_secs_f64() * 1000.0;
        match self.stages.iter_mut().find(|s| s.label == label) {
            Some(stage) => stage.elapsed_ms += ms,
            None => self.stages.push(StageTiming::new(label, ms)),
        }
    }

    pub fn stage_ms(&self, label: &str) -> Option<f64> {
        self.stages
            .iter()
            .find(|s| s.label == label)
            .map(|s| s.elapsed_ms)
    }
}
