use std::fmt;
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use crate::sequencing::MixPlan;
use crate::types::format_duration;

const NAME_WIDTH: usize = 45;

fn truncate_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let mut out: String = name.chars().take(NAME_WIDTH - 1).collect();
    out.push('\u{2026}');
    out
}

/// Fixed-width table, one row per track in play order.
struct Table<'a>(&'a MixPlan);

impl fmt::Display for Table<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plan = self.0;
        writeln!(
            f,
            "\nBEST PATH FOUND (value={}, {}):\n",
            plan.objective,
            plan.status.describe()
        )?;
        writeln!(
            f,
            "{:<45} |  BPM   | Key | Shifted Key | Shift | Length | Transition",
            "Track name"
        )?;
        writeln!(f, "{}", "-".repeat(110))?;
        for entry in &plan.entries {
            writeln!(
                f,
                "{:<45} | {:6.2} | {:<3} |     {:<3}     |  {:>+3} | {:>6} | {} ({})",
                truncate_name(&entry.track.name),
                entry.track.tempo_bpm,
                entry.track.key.to_string(),
                entry.shifted_key.to_string(),
                entry.shift,
                format_duration(entry.track.duration_seconds),
                entry.transition.label(),
                entry.transition_cost,
            )?;
        }
        writeln!(
            f,
            "\n{} tracks, total length {}",
            plan.entries.len(),
            format_duration(plan.total_duration_seconds())
        )
    }
}

pub fn render_table(plan: &MixPlan) -> String {
    Table(plan).to_string()
}

pub fn render_json(plan: &MixPlan) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(plan)
}

/// Append `report` to `path`, or print it to stdout when no path is given.
pub fn write_report(report: &str, path: Option<&Path>) -> io::Result<()> {
    match path {
        Some(path) => {
            let mut file = OpenOptions::new().create(true).append(true).open(path)?;
            file.write_all(report.as_bytes())?;
            file.write_all(b"\n")
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(report.as_bytes())?;
            stdout.write_all(b"\n")
        }
    }
}
