//! Sport → League → Team taxonomy.
//!
//! Rows are resolved by natural key (name) during ingestion and created when
//! absent, so repeated runs never duplicate them.

use serde::{Deserialize, Serialize};

/// Root of the taxonomy. Seeded once, rarely mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
  pub id:   i64,
  pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
  pub id:       i64,
  pub sport_id: i64,
  pub name:     String,
  pub country:  Option<String>,
  pub slug:     String,
}

/// A team is unique per `(league_id, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
  pub id:         i64,
  pub league_id:  i64,
  pub name:       String,
  pub short_name: String,
  pub country:    Option<String>,
  pub logo_url:   Option<String>,
}

/// Derive a team abbreviation: the first letter of each word, at most four
/// characters, uppercased. `"Manchester United"` → `"MU"`.
pub fn derive_short_name(name: &str) -> String {
  name
    .split_whitespace()
    .filter_map(|word| word.chars().next())
    .flat_map(char::to_uppercase)
    .take(4)
    .collect()
}

/// URL slug for a league or plan name: lowercase ASCII alphanumerics with
/// runs of anything else collapsed to a single `-`.
pub fn slugify(name: &str) -> String {
  let mut slug = String::with_capacity(name.len());
  let mut pending_dash = false;
  for c in name.chars() {
    if c.is_ascii_alphanumeric() {
      if pending_dash && !slug.is_empty() {
        slug.push('-');
      }
      pending_dash = false;
      slug.push(c.to_ascii_lowercase());
    } else {
      pending_dash = true;
    }
  }
  slug
}
