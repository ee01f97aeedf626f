//! SQL schema for the Rival SQLite store.
//!
//! Column names follow the results export, so imported rows map one to one.

/// Tables every usable store must have.
pub const REQUIRED_TABLES: [&str; 5] =
  ["countries", "events", "persons", "ranks_single", "ranks_average"];

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS countries (
    id           TEXT PRIMARY KEY,
    continent_id TEXT NOT NULL,
    iso2         TEXT
);

CREATE TABLE IF NOT EXISTS events (
    id     TEXT PRIMARY KEY,
    name   TEXT NOT NULL,
    format TEXT NOT NULL,            -- 'time' | 'number' | 'multi'
    rank   INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS persons (
    id         TEXT PRIMARY KEY,
    name       TEXT NOT NULL,
    country_id TEXT
);

-- best: 0 = no result, -1 = DNF, -2 = DNS; rank 0 = unranked.
CREATE TABLE IF NOT EXISTS ranks_single (
    person_id      TEXT NOT NULL,
    event_id       TEXT NOT NULL,
    best           INTEGER NOT NULL,
    world_rank     INTEGER NOT NULL DEFAULT 0,
    continent_rank INTEGER NOT NULL DEFAULT 0,
    country_rank   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (person_id, event_id)
);

CREATE TABLE IF NOT EXISTS ranks_average (
    person_id      TEXT NOT NULL,
    event_id       TEXT NOT NULL,
    best           INTEGER NOT NULL,
    world_rank     INTEGER NOT NULL DEFAULT 0,
    continent_rank INTEGER NOT NULL DEFAULT 0,
    country_rank   INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (person_id, event_id)
);

-- Covering indexes for the threshold range scan.
CREATE INDEX IF NOT EXISTS ranks_single_event_best_idx
    ON ranks_single(event_id, best, person_id);
CREATE INDEX IF NOT EXISTS ranks_average_event_best_idx
    ON ranks_average(event_id, best, person_id);

CREATE INDEX IF NOT EXISTS persons_name_idx ON persons(name);
-- Keyword lookups match ids case-insensitively.
CREATE INDEX IF NOT EXISTS persons_id_nocase_idx ON persons(id COLLATE NOCASE);

PRAGMA user_version = 1;
";
