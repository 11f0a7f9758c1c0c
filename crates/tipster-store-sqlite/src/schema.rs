//! SQL schema for the Tipster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sports (
    id    INTEGER PRIMARY KEY AUTOINCREMENT,
    name  TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS leagues (
    id        INTEGER PRIMARY KEY AUTOINCREMENT,
    sport_id  INTEGER NOT NULL REFERENCES sports(id),
    name      TEXT NOT NULL UNIQUE,
    country   TEXT,
    slug      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS teams (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    league_id   INTEGER NOT NULL REFERENCES leagues(id),
    name        TEXT NOT NULL,
    short_name  TEXT NOT NULL,
    country     TEXT,
    logo_url    TEXT,
    UNIQUE (league_id, name)
);

-- home_team_id != away_team_id is validated before insert.
CREATE TABLE IF NOT EXISTS matches (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    league_id       INTEGER NOT NULL REFERENCES leagues(id),
    home_team_id    INTEGER NOT NULL REFERENCES teams(id),
    away_team_id    INTEGER NOT NULL REFERENCES teams(id),
    kickoff_at      TEXT NOT NULL,   -- RFC 3339 UTC, second precision
    venue           TEXT,
    status          TEXT NOT NULL DEFAULT 'scheduled',
    score_home      INTEGER,
    score_away      INTEGER,
    tip_confidence  TEXT,
    UNIQUE (league_id, home_team_id, away_team_id, kickoff_at)
);

CREATE TABLE IF NOT EXISTS tips (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    match_id          INTEGER NOT NULL REFERENCES matches(id),
    author_id         INTEGER,
    prediction_type   TEXT NOT NULL,   -- market code, e.g. '1_X_2'
    prediction_value  TEXT NOT NULL,   -- '-1' | '0' | '1' | decimal threshold
    pick_label        TEXT NOT NULL,
    odds              REAL NOT NULL,
    risk_level        TEXT NOT NULL,
    is_free           INTEGER NOT NULL DEFAULT 0,
    free_for_date     TEXT,
    visibility        TEXT NOT NULL DEFAULT 'premium',
    publish_at        TEXT NOT NULL,
    status            TEXT NOT NULL DEFAULT 'pending',
    result            TEXT NOT NULL DEFAULT 'pending',
    settled_at        TEXT,
    UNIQUE (match_id, prediction_type, pick_label)
);

-- features is a JSON object; features.tips_list is an ordered, duplicate-free
-- array of tip ids.
CREATE TABLE IF NOT EXISTS subscription_plans (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    name              TEXT NOT NULL UNIQUE,
    slug              TEXT NOT NULL,
    price             REAL NOT NULL,
    currency          TEXT NOT NULL,
    billing_interval  TEXT NOT NULL DEFAULT 'month',
    interval_count    INTEGER NOT NULL DEFAULT 1,
    features          TEXT NOT NULL DEFAULT '{\"tips_list\":[]}',
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS plan_rules (
    plan_name    TEXT PRIMARY KEY,
    max_tips     INTEGER,          -- NULL = unbounded
    tip_type     TEXT NOT NULL,
    jackpot_tag  TEXT,             -- NULL = any tag
    confidence   TEXT              -- NULL = any bucket
);

CREATE TABLE IF NOT EXISTS users (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    email       TEXT NOT NULL UNIQUE,
    name        TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS subscriptions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    plan_id     INTEGER NOT NULL REFERENCES subscription_plans(id),
    status      TEXT NOT NULL,
    start_at    TEXT NOT NULL,
    end_at      TEXT,
    renews_at   TEXT,
    auto_renew  INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS transactions (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    reference   TEXT NOT NULL UNIQUE,
    amount      REAL NOT NULL,
    currency    TEXT NOT NULL,
    kind        TEXT NOT NULL,
    status      TEXT NOT NULL,
    gateway     TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tip_purchases (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(id),
    tip_id          INTEGER NOT NULL REFERENCES tips(id),
    transaction_id  INTEGER NOT NULL REFERENCES transactions(id),
    created_at      TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tip_access (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id     INTEGER NOT NULL REFERENCES users(id),
    tip_id      INTEGER NOT NULL REFERENCES tips(id),
    source      TEXT NOT NULL,
    granted_at  TEXT NOT NULL,
    UNIQUE (user_id, tip_id)
);

CREATE INDEX IF NOT EXISTS tips_match_idx          ON tips(match_id);
CREATE INDEX IF NOT EXISTS tips_free_idx           ON tips(is_free, free_for_date);
CREATE INDEX IF NOT EXISTS subscriptions_user_idx  ON subscriptions(user_id);

PRAGMA user_version = 1;
";

/// Seed one rule row; existing rows are left alone so admin edits survive a
/// restart.
pub const SEED_RULE: &str = "
INSERT OR IGNORE INTO plan_rules (plan_name, max_tips, tip_type, jackpot_tag, confidence)
VALUES (?1, ?2, ?3, ?4, ?5)";
