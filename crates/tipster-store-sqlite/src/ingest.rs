//! The ingestion pipeline: taxonomy resolution, match and tip upserts and
//! plan assignment, all on one connection inside one transaction.
//!
//! Every function here is synchronous and runs on the connection thread
//! inside a [`tokio_rusqlite::Connection::call`] closure.

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension as _, TransactionBehavior};
use tipster_core::{
  BASE_SPORT,
  fixture::Match,
  ingest::IngestReport,
  market::{MarketCode, Pick},
  payload::{IngestPayload, MatchRow},
  plan::{PlanAssignment, PlanRule},
  taxonomy::{derive_short_name, slugify},
  tip::RiskLevel,
};

use crate::{
  Error, Result,
  encode::{MATCH_COLUMNS, RawMatch, decode_code, decode_features, encode_dt, encode_features},
};

// ─── Taxonomy ────────────────────────────────────────────────────────────────

pub fn find_sport(conn: &Connection, name: &str) -> Result<Option<i64>> {
  Ok(
    conn
      .query_row("SELECT id FROM sports WHERE name = ?1", [name], |r| r.get(0))
      .optional()?,
  )
}

/// Find a league by name or create it under `sport_id`.
pub fn resolve_league(
  conn: &Connection,
  sport_id: i64,
  name: &str,
  country: Option<&str>,
) -> Result<i64> {
  let existing: Option<i64> = conn
    .query_row("SELECT id FROM leagues WHERE name = ?1", [name], |r| r.get(0))
    .optional()?;
  if let Some(id) = existing {
    return Ok(id);
  }

  conn.execute(
    "INSERT INTO leagues (sport_id, name, country, slug) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![sport_id, name, country, slugify(name)],
  )?;
  let id = conn.last_insert_rowid();
  tracing::debug!(league = name, id, "created league");
  Ok(id)
}

/// Find a team by `(league_id, name)` or create it with a derived short name.
pub fn resolve_team(
  conn: &Connection,
  league_id: i64,
  name: &str,
  country: Option<&str>,
) -> Result<i64> {
  let existing: Option<i64> = conn
    .query_row(
      "SELECT id FROM teams WHERE league_id = ?1 AND name = ?2",
      rusqlite::params![league_id, name],
      |r| r.get(0),
    )
    .optional()?;
  if let Some(id) = existing {
    return Ok(id);
  }

  conn.execute(
    "INSERT INTO teams (league_id, name, short_name, country) VALUES (?1, ?2, ?3, ?4)",
    rusqlite::params![league_id, name, derive_short_name(name), country],
  )?;
  Ok(conn.last_insert_rowid())
}

// ─── Matches ─────────────────────────────────────────────────────────────────

/// Create or update the match identified by league, teams and kickoff.
///
/// On update only the fields present in the row overwrite stored values;
/// `tip_confidence` always takes the row's bucket. Returns the stored match
/// and whether it was created.
pub fn upsert_match(
  conn: &Connection,
  league_id: i64,
  home_team_id: i64,
  away_team_id: i64,
  row: &MatchRow,
) -> Result<(Match, bool)> {
  let kickoff = encode_dt(row.kickoff);
  let status = row.status.map(|s| s.as_str());

  let existing: Option<i64> = conn
    .query_row(
      "SELECT id FROM matches
       WHERE league_id = ?1 AND home_team_id = ?2 AND away_team_id = ?3 AND kickoff_at = ?4",
      rusqlite::params![league_id, home_team_id, away_team_id, kickoff],
      |r| r.get(0),
    )
    .optional()?;

  let (id, created) = match existing {
    Some(id) => {
      conn.execute(
        "UPDATE matches SET
           venue          = COALESCE(?2, venue),
           status         = COALESCE(?3, status),
           score_home     = COALESCE(?4, score_home),
           score_away     = COALESCE(?5, score_away),
           tip_confidence = ?6
         WHERE id = ?1",
        rusqlite::params![
          id,
          row.venue,
          status,
          row.score_home,
          row.score_away,
          row.confidence,
        ],
      )?;
      (id, false)
    }
    None => {
      conn.execute(
        "INSERT INTO matches (
           league_id, home_team_id, away_team_id, kickoff_at, venue,
           status, score_home, score_away, tip_confidence
         ) VALUES (?1, ?2, ?3, ?4, ?5, COALESCE(?6, 'scheduled'), ?7, ?8, ?9)",
        rusqlite::params![
          league_id,
          home_team_id,
          away_team_id,
          kickoff,
          row.venue,
          status,
          row.score_home,
          row.score_away,
          row.confidence,
        ],
      )?;
      (conn.last_insert_rowid(), true)
    }
  };

  let raw = conn.query_row(
    &format!("SELECT {MATCH_COLUMNS} FROM matches WHERE id = ?1"),
    [id],
    RawMatch::from_row,
  )?;
  Ok((raw.into_match()?, created))
}

// ─── Tips ────────────────────────────────────────────────────────────────────

/// Create or update the tip keyed by `(match_id, prediction_type, pick_label)`.
/// Returns the tip ID and whether it was created.
pub fn upsert_tip(
  conn: &Connection,
  match_id: i64,
  pick: &Pick,
  risk: RiskLevel,
  now: DateTime<Utc>,
) -> Result<(i64, bool)> {
  let market = pick.prediction_type.as_str();
  let existing: Option<i64> = conn
    .query_row(
      "SELECT id FROM tips WHERE match_id = ?1 AND prediction_type = ?2 AND pick_label = ?3",
      rusqlite::params![match_id, market, pick.pick_label],
      |r| r.get(0),
    )
    .optional()?;

  match existing {
    Some(id) => {
      conn.execute(
        "UPDATE tips SET odds = ?2, prediction_value = ?3, risk_level = ?4 WHERE id = ?1",
        rusqlite::params![id, pick.odds, pick.prediction_value, risk.as_str()],
      )?;
      Ok((id, false))
    }
    None => {
      conn.execute(
        "INSERT INTO tips (
           match_id, prediction_type, prediction_value, pick_label, odds,
           risk_level, publish_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        rusqlite::params![
          match_id,
          market,
          pick.prediction_value,
          pick.pick_label,
          pick.odds,
          risk.as_str(),
          encode_dt(now),
        ],
      )?;
      Ok((conn.last_insert_rowid(), true))
    }
  }
}

/// The subset of `tip_ids` whose stored market is `market`, in input order.
fn eligible_tips(conn: &Connection, tip_ids: &[i64], market: MarketCode) -> Result<Vec<i64>> {
  let mut stmt = conn.prepare_cached("SELECT prediction_type FROM tips WHERE id = ?1")?;
  let mut out = Vec::new();
  for &id in tip_ids {
    let stored: Option<String> = stmt.query_row([id], |r| r.get(0)).optional()?;
    let Some(stored) = stored else { continue };
    if decode_code::<MarketCode>("market", &stored)? == market {
      out.push(id);
    }
  }
  Ok(out)
}

// ─── Assignment ──────────────────────────────────────────────────────────────

/// Append `tip_ids` to every plan whose rule matches `confidence` and
/// `jackpot`.
///
/// Plans named by a rule but absent from the database are ignored. The plan
/// row is only written when at least one tip was appended.
pub fn assign(
  conn: &Connection,
  rules: &[PlanRule],
  tip_ids: &[i64],
  confidence: &str,
  jackpot: Option<&str>,
) -> Result<Vec<PlanAssignment>> {
  if tip_ids.is_empty() {
    return Ok(Vec::new());
  }

  let mut out = Vec::new();
  for rule in rules.iter().filter(|r| r.applies_to(confidence, jackpot)) {
    let plan: Option<(i64, String)> = conn
      .query_row(
        "SELECT id, features FROM subscription_plans WHERE name = ?1",
        [&rule.plan_name],
        |r| Ok((r.get(0)?, r.get(1)?)),
      )
      .optional()?;
    let Some((plan_id, features)) = plan else {
      tracing::debug!(plan = %rule.plan_name, "rule names a missing plan");
      continue;
    };

    let eligible = eligible_tips(conn, tip_ids, rule.tip_type)?;
    let mut features = decode_features(&features)?;
    let added_tips = features.append_capped(&eligible, rule.max_tips);
    if added_tips > 0 {
      conn.execute(
        "UPDATE subscription_plans SET features = ?2 WHERE id = ?1",
        rusqlite::params![plan_id, encode_features(&features)?],
      )?;
    }

    out.push(PlanAssignment { plan_id, plan_name: rule.plan_name.clone(), added_tips });
  }
  Ok(out)
}

// ─── Run ─────────────────────────────────────────────────────────────────────

/// Execute one ingestion run as a single immediate transaction.
pub fn run(
  conn: &mut Connection,
  payload: &IngestPayload,
  rules: &[PlanRule],
  now: DateTime<Utc>,
) -> Result<IngestReport> {
  let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

  let sport_id =
    find_sport(&tx, BASE_SPORT)?.ok_or_else(|| Error::SportNotFound(BASE_SPORT.to_owned()))?;

  let mut report = IngestReport { skipped: payload.skipped.clone(), ..Default::default() };

  for row in &payload.rows {
    let country = row.country.as_deref();
    let league_id = resolve_league(&tx, sport_id, &row.league, country)?;
    let home_id = resolve_team(&tx, league_id, &row.home_team, country)?;
    let away_id = resolve_team(&tx, league_id, &row.away_team, country)?;

    let (fixture, created) = upsert_match(&tx, league_id, home_id, away_id, row)?;
    report.processed += 1;
    if created {
      report.new_matches += 1;
    }

    let risk = RiskLevel::from_confidence(&row.confidence);
    let mut new_ids = Vec::new();
    for pick in row.tips.iter().flat_map(|t| t.picks()) {
      let (tip_id, created) = upsert_tip(&tx, fixture.id, &pick, risk, now)?;
      if created {
        new_ids.push(tip_id);
      }
    }
    report.new_tips += new_ids.len();

    for assignment in assign(&tx, rules, &new_ids, &row.confidence, row.jackpot.as_deref())? {
      report.record_assignment(assignment);
    }
  }

  tx.commit()?;
  Ok(report)
}
