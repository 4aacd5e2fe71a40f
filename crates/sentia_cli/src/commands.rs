//! REPL command parsing and rendering.

use sentia_core::{TurnMarker, TurnRecord};
use sentia_expression::{MetricsSummary, Trend};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Quit,
    Reset,
    History,
    Metrics,
    Status,
    Help,
    Export(PathBuf),
    /// `export` without a path.
    ExportMissingPath,
    Empty,
    Turn(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };
        match (head, rest.is_empty()) {
            ("", _) => Command::Empty,
            ("quit" | "exit", true) => Command::Quit,
            ("reset", true) => Command::Reset,
            ("history", true) => Command::History,
            ("metrics", true) => Command::Metrics,
            ("status", true) => Command::Status,
            ("help", true) => Command::Help,
            ("export", true) => Command::ExportMissingPath,
            ("export", false) => Command::Export(PathBuf::from(rest)),
            _ => Command::Turn(line.to_string()),
        }
    }
}

pub const HELP: &str = "\
Commands:
  status          current affect levels, mood and working set
  metrics         metric averages over the recent window
  history         one line per turn so far
  export <path>   write history as JSON (.jsonl for one record per line)
  reset           clear history and return to baseline
  quit            leave
Anything else is sent as a dialogue turn.";

fn trend_label(trend: Trend) -> &'static str {
    match trend {
        Trend::Rising => "rising",
        Trend::Falling => "falling",
        Trend::Stable => "stable",
        Trend::InsufficientData => "insufficient data",
    }
}

pub fn format_summary(summary: &MetricsSummary) -> String {
    let binding = summary
        .temporal_binding
        .map(|b| format!("{:.2}", b))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "turns {}  availability {:.2}  depth {:.2}  binding {}  reportability {:.2}  phi {:.2}  overall {:.2}  evictions {}  trend {}",
        summary.turns,
        summary.global_availability,
        summary.meta_depth,
        binding,
        summary.reportability,
        summary.phi,
        summary.overall,
        summary.evictions,
        trend_label(summary.trend)
    )
}

fn marker_label(marker: &TurnMarker) -> String {
    match marker {
        TurnMarker::ClassificationFallback { .. } => "classifier offline".to_string(),
        TurnMarker::ReflectionTruncated { level } => format!("reflection cut at level {}", level),
        TurnMarker::GenerationTimeout => "reply timed out".to_string(),
        TurnMarker::GenerationFailed { .. } => "reply failed".to_string(),
        TurnMarker::CrisisIntervention { .. } => "crisis resources shared".to_string(),
    }
}

/// Reply plus a one-line footer of what happened inside the turn.
pub fn format_turn(record: &TurnRecord) -> String {
    let reply = record.reply.as_deref().unwrap_or("(no reply)");
    let mut footer = format!(
        "[turn {} | depth {} | overall {:.2} | attending: {}",
        record.turn_index,
        record.metrics.meta_depth,
        record.metrics.overall,
        record.attention_ids().collect::<Vec<_>>().join(", ")
    );
    for marker in &record.markers {
        footer.push_str(" | ");
        footer.push_str(&marker_label(marker));
    }
    footer.push(']');
    format!("{}\n{}", reply, footer)
}

pub fn format_history_line(record: &TurnRecord) -> String {
    let clip = |s: &str| -> String {
        if s.chars().count() > 50 {
            format!("{}...", s.chars().take(50).collect::<String>())
        } else {
            s.to_string()
        }
    };
    format!(
        "#{:<3} {} -> {}",
        record.turn_index,
        clip(&record.input),
        clip(record.reply.as_deref().unwrap_or("(no reply)"))
    )
}
