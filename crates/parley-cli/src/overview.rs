//! Figures on the dashboard's overview screen, derived from one `stats` read.

use parley_core::entity::LogEntry;

/// Tag shown for exchanges the bot could not classify.
pub const UNKNOWN_TAG: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overview {
  /// Server-side count of log documents.
  pub total_queries: u64,
  /// Matched exchanges among the fetched logs.
  pub matched:       usize,
  /// `matched / total_queries` as a rounded percentage.
  pub success_rate:  u32,
  /// Most frequent classified tag, if any exchange was classified.
  pub top_intent:    Option<String>,
  /// Exchanges per tag, in order of first appearance.
  pub distribution:  Vec<(String, usize)>,
  /// Server-side count of intents.
  pub intent_count:  u64,
}

impl Overview {
  /// Compute the overview from the log total, the fetched log page and the
  /// intent total.
  ///
  /// The numerator comes from the fetched page while the denominator is the
  /// server total, so the rate understates once logs outgrow one page.
  pub fn compute(total_queries: u64, logs: &[LogEntry], intent_count: u64) -> Self {
    let matched = logs.iter().filter(|l| l.matched).count();

    let success_rate = if total_queries == 0 {
      0
    } else {
      (matched as f64 / total_queries as f64 * 100.0).round() as u32
    };

    let classified = logs
      .iter()
      .filter_map(|l| l.intent_tag.as_deref())
      .filter(|tag| !tag.is_empty() && *tag != UNKNOWN_TAG);
    let top_intent = most_frequent(tally(classified));

    let distribution = tally(logs.iter().map(|l| match l.intent_tag.as_deref() {
      Some(tag) if !tag.is_empty() => tag,
      _ => UNKNOWN_TAG,
    }));

    Self {
      total_queries,
      matched,
      success_rate,
      top_intent,
      distribution,
      intent_count,
    }
  }

  /// Top intent as displayed, `N/A` when nothing was classified.
  pub fn top_intent_label(&self) -> &str {
    self.top_intent.as_deref().unwrap_or("N/A")
  }
}

/// Count occurrences, keeping first-appearance order.
fn tally<'a>(tags: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
  let mut counts: Vec<(String, usize)> = Vec::new();
  for tag in tags {
    match counts.iter_mut().find(|(t, _)| t == tag) {
      Some((_, n)) => *n += 1,
      None => counts.push((tag.to_owned(), 1)),
    }
  }
  counts
}

/// Highest count; ties go to the tag seen first.
fn most_frequent(counts: Vec<(String, usize)>) -> Option<String> {
  let mut best: Option<(String, usize)> = None;
  for (tag, n) in counts {
    if best.as_ref().is_none_or(|(_, top)| n > *top) {
      best = Some((tag, n));
    }
  }
  best.map(|(tag, _)| tag)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn log(tag: Option<&str>, matched: bool) -> LogEntry {
    LogEntry {
      id:         String::new(),
      query:      "q".into(),
      response:   "r".into(),
      intent_tag: tag.map(str::to_owned),
      matched,
      created_at: None,
    }
  }

  #[test]
  fn empty_logs() {
    let o = Overview::compute(0, &[], 0);
    assert_eq!(o.success_rate, 0);
    assert_eq!(o.top_intent_label(), "N/A");
    assert!(o.distribution.is_empty());
  }

  #[test]
  fn rate_uses_server_total() {
    let logs = vec![
      log(Some("greeting"), true),
      log(Some("greeting"), true),
      log(Some("hours"), false),
    ];
    let o = Overview::compute(3, &logs, 2);
    assert_eq!(o.matched, 2);
    assert_eq!(o.success_rate, 67);

    // Only a page was fetched; the denominator still counts everything.
    let o = Overview::compute(8, &logs, 2);
    assert_eq!(o.success_rate, 25);
  }

  #[test]
  fn top_intent_skips_unknown_and_breaks_ties_by_first_seen() {
    let logs = vec![
      log(Some("unknown"), false),
      log(Some("unknown"), false),
      log(Some("unknown"), false),
      log(Some("hours"), true),
      log(Some("greeting"), true),
      log(None, false),
      log(Some("greeting"), true),
      log(Some("hours"), true),
    ];
    let o = Overview::compute(8, &logs, 2);
    assert_eq!(o.top_intent.as_deref(), Some("hours"));
  }

  #[test]
  fn only_unclassified_means_no_top_intent() {
    let logs = vec![log(None, false), log(Some("unknown"), false), log(Some(""), false)];
    let o = Overview::compute(3, &logs, 0);
    assert_eq!(o.top_intent_label(), "N/A");
  }

  #[test]
  fn distribution_folds_missing_tags_into_unknown() {
    let logs = vec![
      log(Some("greeting"), true),
      log(None, false),
      log(Some("unknown"), false),
      log(Some("greeting"), true),
    ];
    let o = Overview::compute(4, &logs, 1);
    assert_eq!(o.distribution, vec![
      ("greeting".to_string(), 2),
      ("unknown".to_string(), 2),
    ]);
  }
}
