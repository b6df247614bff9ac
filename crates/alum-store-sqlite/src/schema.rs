//! SQL schema for the alum SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    user_id       TEXT PRIMARY KEY,
    email         TEXT NOT NULL UNIQUE,   -- lowercase-normalised
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    created_at    TEXT NOT NULL
);

-- One document per member; rows are upserted, never deleted.
CREATE TABLE IF NOT EXISTS profiles (
    user_id      TEXT PRIMARY KEY,
    email        TEXT NOT NULL UNIQUE,
    name         TEXT NOT NULL DEFAULT '',
    grad_year    INTEGER,
    industries   TEXT NOT NULL DEFAULT '[]',  -- JSON array, ordered
    bio          TEXT NOT NULL DEFAULT '',
    headshot_url TEXT,
    updated_at   TEXT NOT NULL
);

-- Last write wins; no history.
CREATE TABLE IF NOT EXISTS presence (
    user_id   TEXT PRIMARY KEY,
    email     TEXT NOT NULL,
    status    TEXT NOT NULL,   -- 'online' | 'offline'
    last_seen TEXT NOT NULL    -- ISO 8601 UTC; assigned by the store
);

CREATE INDEX IF NOT EXISTS presence_email_idx ON presence(email);

PRAGMA user_version = 1;
";
