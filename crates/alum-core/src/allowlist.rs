//! The registration allowlist.
//!
//! The source is a newline-delimited list of email addresses. Each line is
//! trimmed and lowercased; blank lines are dropped. Membership gates
//! registration only; login never consults it.

use std::collections::HashSet;

/// Trim and lowercase an email address for comparison and storage.
pub fn normalize_email(email: &str) -> String { email.trim().to_lowercase() }

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Allowlist {
  entries: HashSet<String>,
}

impl Allowlist {
  /// Parse the raw resource text. Both `\n` and `\r\n` line endings are
  /// accepted.
  pub fn parse(text: &str) -> Self {
    let entries = text
      .lines()
      .map(normalize_email)
      .filter(|line| !line.is_empty())
      .collect();
    Self { entries }
  }

  /// Case-insensitive, whitespace-insensitive membership test.
  pub fn contains(&self, email: &str) -> bool {
    self.entries.contains(&normalize_email(email))
  }

  pub fn len(&self) -> usize { self.entries.len() }

  pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

impl<S: AsRef<str>> FromIterator<S> for Allowlist {
  fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
    let entries = iter
      .into_iter()
      .map(|e| normalize_email(e.as_ref()))
      .filter(|e| !e.is_empty())
      .collect();
    Self { entries }
  }
}
