//! Hands a finished run to whatever draws it.

use std::io::Write;

use chrono::{SecondsFormat, Utc};
use serde_json::json;

use crate::error::Result;
use crate::outcome::SimulationOutcome;

pub const CSV_HEADER: &str = "t,reward,cumulative_reward,chosen,epsilon";

/// Pretty-printed JSON document with config, per-source summaries, totals,
/// the raw series and the plot panels.
pub fn write_json<W: Write>(outcome: &SimulationOutcome, mut writer: W) -> Result<()> {
    let document = json!({
        "generated_at": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "config": outcome.config,
        "summary": {
            "total_reward": outcome.total_reward(),
            "mean_reward": outcome.mean_reward(),
            "best_index": outcome.best_index,
            "final_epsilon": outcome.final_epsilon,
        },
        "sources": outcome.sources,
        "series": outcome.series,
        "plot": outcome.plot_series(),
    });
    serde_json::to_writer_pretty(&mut writer, &document)?;
    writeln!(writer)?;
    Ok(())
}

/// One row per step.
pub fn write_csv<W: Write>(outcome: &SimulationOutcome, mut writer: W) -> Result<()> {
    let series = &outcome.series;
    writeln!(writer, "{CSV_HEADER}")?;
    for t in 0..series.len() {
        writeln!(
            writer,
            "{},{},{},{},{}",
            t,
            series.reward[t],
            series.cumulative_reward[t],
            series.chosen_index[t],
            series.epsilon_trace[t]
        )?;
    }
    Ok(())
}
