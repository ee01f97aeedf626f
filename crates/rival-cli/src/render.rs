//! Plain-text output for the CLI.

use rival_core::{
  nemesis::NemesisReport,
  person::Person,
  pk::{EventDuel, HeadToHead},
  profile::{Profile, RecordEntry},
};

/// Candidates listed when a keyword is ambiguous.
pub const CANDIDATE_LIMIT: usize = 10;

/// Nemesis lists longer than this are summarised by count only.
pub const DEFAULT_LIST_LIMIT: usize = 5;

fn person_line(p: &Person) -> String {
  match p.country_id.as_deref() {
    Some(country) if !country.is_empty() => format!("{} ({}) [{country}]", p.name, p.id),
    _ => format!("{} ({})", p.name, p.id),
  }
}

pub fn candidates(keyword: &str, persons: &[Person]) -> String {
  let mut lines = vec![format!("{keyword:?} matches several persons; use an id:")];
  lines.extend(
    persons
      .iter()
      .take(CANDIDATE_LIMIT)
      .enumerate()
      .map(|(i, p)| format!("{}. {}", i + 1, person_line(p))),
  );
  if persons.len() > CANDIDATE_LIMIT {
    lines.push(format!("... {} more not shown", persons.len() - CANDIDATE_LIMIT));
  }
  lines.join("\n")
}

pub fn profile(profile: &Profile) -> String {
  let mut lines = vec![person_line(&profile.person)];
  if profile.entries.is_empty() {
    lines.push("no results".to_owned());
  }
  lines.extend(profile.entries.iter().map(RecordEntry::line));
  lines.join("\n")
}

/// Counts for every scope, then the members of each non-empty scope with at
/// most `limit` persons.
pub fn nemesis(report: &NemesisReport, limit: usize) -> String {
  if report.world.is_empty() {
    return format!("no nemesis found for {}", person_line(&report.target));
  }

  let mut out = vec![
    format!("Nemeses of {}:", person_line(&report.target)),
    format!(
      "world: {}, continent ({}): {}, country: {}",
      report.world_count(),
      report.continent,
      report.continent_count(),
      report.country_count()
    ),
  ];
  let scopes = [
    ("world", &report.world),
    ("continent", &report.continent_list),
    ("country", &report.country),
  ];
  for (scope, persons) in scopes {
    if persons.is_empty() || persons.len() > limit {
      continue;
    }
    out.push(String::new());
    out.push(format!("{scope}:"));
    out.extend(persons.iter().map(|p| format!("- {}", person_line(p))));
  }
  out.join("\n")
}

pub fn head_to_head(h2h: &HeadToHead) -> String {
  let mut lines = vec![format!("{} vs {}", person_line(&h2h.person_a), person_line(&h2h.person_b))];
  lines.extend(h2h.events.iter().map(EventDuel::line));
  lines.push(h2h.summary());
  lines.join("\n")
}
