//! Plain-text rendering of dashboard views.

use std::fmt::Write as _;

use chrono::{DateTime, Local, Utc};
use parley_core::entity::LogEntry;

use crate::{
  dashboard::{IntentDetail, IntentRow},
  overview::Overview,
};

const RESPONSE_PREVIEW: usize = 50;

/// Left-aligned columns separated by two spaces.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
  let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
  for row in rows {
    for (i, cell) in row.iter().enumerate() {
      if let Some(w) = widths.get_mut(i) {
        *w = (*w).max(cell.chars().count());
      }
    }
  }

  let mut out = String::new();
  let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
  push_row(&mut out, &header, &widths);
  let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
  push_row(&mut out, &rule, &widths);
  for row in rows {
    push_row(&mut out, row, &widths);
  }
  out
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
  let line = cells
    .iter()
    .zip(widths)
    .map(|(cell, w)| format!("{cell:<w$}"))
    .collect::<Vec<_>>()
    .join("  ");
  out.push_str(line.trim_end());
  out.push('\n');
}

pub fn overview(o: &Overview) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "Total queries:  {}", o.total_queries);
  let _ = writeln!(out, "Success rate:   {}%", o.success_rate);
  let _ = writeln!(out, "Top intent:     {}", o.top_intent_label());
  let _ = writeln!(out, "Intents:        {}", o.intent_count);

  if !o.distribution.is_empty() {
    out.push('\n');
    let rows: Vec<Vec<String>> = o
      .distribution
      .iter()
      .map(|(tag, n)| vec![tag.clone(), n.to_string()])
      .collect();
    out.push_str(&table(&["INTENT", "QUERIES"], &rows));
  }
  out
}

pub fn intents(rows: &[IntentRow]) -> String {
  let rows: Vec<Vec<String>> = rows
    .iter()
    .map(|r| {
      vec![
        r.intent.tag.clone(),
        format!("{} phrases", r.patterns),
        format!("{} answers", r.responses),
        r.intent.id.clone(),
      ]
    })
    .collect();
  table(&["TAG", "PATTERNS", "RESPONSES", "ID"], &rows)
}

pub fn intent_detail(detail: &IntentDetail) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{} ({})", detail.intent.tag, detail.intent.id);
  if let Some(description) = &detail.intent.description {
    let _ = writeln!(out, "{description}");
  }
  out.push_str("\nPatterns:\n");
  for p in &detail.patterns {
    let _ = writeln!(out, "  {}", p.text);
  }
  out.push_str("\nResponses:\n");
  for r in &detail.responses {
    let _ = writeln!(out, "  {}", r.text);
  }
  out
}

pub fn unanswered(logs: &[LogEntry]) -> String {
  let rows: Vec<Vec<String>> = logs
    .iter()
    .map(|l| vec![l.query.clone(), timestamp(l.created_at, "%Y-%m-%d %H:%M:%S")])
    .collect();
  table(&["QUERY", "ASKED"], &rows)
}

pub fn logs(logs: &[LogEntry]) -> String {
  let rows: Vec<Vec<String>> = logs
    .iter()
    .map(|l| {
      vec![
        l.query.clone(),
        preview(&l.response),
        l.intent_tag.clone().unwrap_or_default(),
        if l.matched { "Matched" } else { "Fallback" }.to_string(),
        timestamp(l.created_at, "%H:%M:%S"),
      ]
    })
    .collect();
  table(&["QUERY", "RESPONSE", "INTENT", "STATUS", "TIME"], &rows)
}

fn preview(text: &str) -> String {
  let mut short: String = text.chars().take(RESPONSE_PREVIEW).collect();
  short.push_str("...");
  short
}

fn timestamp(at: Option<DateTime<Utc>>, format: &str) -> String {
  at.map(|t| t.with_timezone(&Local).format(format).to_string())
    .unwrap_or_default()
}
