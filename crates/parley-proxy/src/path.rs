//! Inbound path normalization.
//!
//! The proxy is reachable through several hosting front-doors, each of which
//! mounts it under its own prefix. Normalizing removes every known prefix and
//! any leading slashes so that all front-doors share one routing table.

/// Front-door prefixes recognized out of the box, in stripping order.
pub const DEFAULT_PREFIXES: [&str; 3] =
  ["/.netlify/functions/api", "/api", "/.netlify/functions/index"];

/// Strip every occurrence of each prefix, then leading slashes, until the
/// result stops changing.
///
/// The result is a fixed point, so `normalize_path(normalize_path(p)) ==
/// normalize_path(p)` for every `p`.
pub fn normalize_path<S: AsRef<str>>(path: &str, prefixes: &[S]) -> String {
  let mut current = path.to_owned();
  loop {
    let mut next = current.clone();
    for prefix in prefixes {
      let prefix = prefix.as_ref();
      if !prefix.is_empty() {
        next = next.replace(prefix, "");
      }
    }
    let next = next.trim_start_matches('/').to_owned();
    if next == current {
      return next;
    }
    current = next;
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn norm(path: &str) -> String {
    normalize_path(path, &DEFAULT_PREFIXES)
  }

  #[test]
  fn strips_each_front_door() {
    assert_eq!(norm("/.netlify/functions/api/chat"), "chat");
    assert_eq!(norm("/api/data/intents"), "data/intents");
    assert_eq!(norm("/.netlify/functions/index/stats"), "stats");
    assert_eq!(norm("/login"), "login");
  }

  #[test]
  fn strips_repeated_and_mixed_prefixes() {
    assert_eq!(norm("/api/api/ping"), "ping");
    assert_eq!(norm("/.netlify/functions/api/api/data/logs"), "data/logs");
    assert_eq!(norm("//api//stats"), "stats");
  }

  #[test]
  fn empty_and_root_paths() {
    assert_eq!(norm(""), "");
    assert_eq!(norm("/"), "");
    assert_eq!(norm("/api"), "");
  }

  #[test]
  fn prefix_reassembled_by_removal_is_also_stripped() {
    // Removing the inner "/api" joins "x/ap" and "i/ping" into "x/api/ping".
    assert_eq!(norm("x/ap/apii/ping"), "x/ping");
  }

  #[test]
  fn idempotent_over_prefix_combinations() {
    let tails = ["", "ping", "chat", "data/intents", "/data/patterns", "apix", "foo/bar"];
    let mut paths = Vec::new();
    for a in DEFAULT_PREFIXES.iter().chain([&"", &"/"]) {
      for b in DEFAULT_PREFIXES.iter().chain([&"", &"/"]) {
        for tail in tails {
          paths.push(format!("{a}{b}/{tail}"));
          paths.push(format!("{a}{tail}{b}"));
        }
      }
    }

    for path in paths {
      let once = norm(&path);
      assert_eq!(norm(&once), once, "not idempotent for {path:?}");
      assert!(!once.starts_with('/'), "leading slash kept for {path:?}");
      for prefix in DEFAULT_PREFIXES {
        assert!(!once.contains(prefix), "{prefix} kept in {once:?} from {path:?}");
      }
    }
  }

  #[test]
  fn custom_prefixes() {
    let prefixes = vec!["/edge".to_string()];
    assert_eq!(normalize_path("/edge/chat", &prefixes), "chat");
    assert_eq!(normalize_path("/api/chat", &prefixes), "api/chat");
  }
}
