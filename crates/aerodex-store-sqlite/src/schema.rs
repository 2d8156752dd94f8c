//! SQL schema for the aerodex SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// Soft-deleted tables carry a `deleted` timestamp instead of losing rows.
/// The `(source, key, hash)` unique indexes let a reappearing record revive
/// its old row in place.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS sources (
    unique_id INTEGER PRIMARY KEY,
    agency    TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS simple_registrations (
    unique_id    INTEGER PRIMARY KEY,
    icao_hex     TEXT NOT NULL,
    registration TEXT NOT NULL,
    data         TEXT NOT NULL,   -- JSON object
    hash         TEXT NOT NULL,
    source       INTEGER NOT NULL REFERENCES sources(unique_id),
    deleted      TEXT             -- RFC 3339 UTC or NULL while live
);

CREATE TABLE IF NOT EXISTS detailed_registrations (
    unique_id    INTEGER PRIMARY KEY,
    icao_hex     TEXT NOT NULL,
    registration TEXT NOT NULL,
    data         TEXT NOT NULL,
    hash         TEXT NOT NULL,
    source       INTEGER NOT NULL REFERENCES sources(unique_id),
    deleted      TEXT
);

CREATE TABLE IF NOT EXISTS operators (
    unique_id          INTEGER PRIMARY KEY,
    airline_designator TEXT NOT NULL,
    name               TEXT NOT NULL,
    callsign           TEXT NOT NULL,
    country            TEXT NOT NULL,
    hash               TEXT NOT NULL,
    source             INTEGER NOT NULL REFERENCES sources(unique_id),
    deleted            TEXT
);

-- Live while expires > now; never soft-deleted.
CREATE TABLE IF NOT EXISTS flight_numbers (
    unique_id          INTEGER PRIMARY KEY,
    ident              TEXT NOT NULL,
    airline_designator TEXT NOT NULL,
    flight_number      TEXT NOT NULL,
    origin             TEXT NOT NULL,
    destination        TEXT NOT NULL,
    expires            TEXT NOT NULL,
    hash               TEXT NOT NULL,
    source             INTEGER NOT NULL REFERENCES sources(unique_id),
    UNIQUE (ident, origin, destination)
);

-- Reloaded wholesale on every import.
CREATE TABLE IF NOT EXISTS airports (
    icao_code TEXT PRIMARY KEY,
    iata_code TEXT,
    name      TEXT NOT NULL,
    city      TEXT NOT NULL,
    region    TEXT NOT NULL,
    country   TEXT NOT NULL,
    phonic    TEXT NOT NULL,
    source    INTEGER NOT NULL REFERENCES sources(unique_id)
);

CREATE UNIQUE INDEX IF NOT EXISTS simple_registrations_identity_idx
    ON simple_registrations(source, icao_hex, hash);
CREATE UNIQUE INDEX IF NOT EXISTS detailed_registrations_identity_idx
    ON detailed_registrations(source, icao_hex, hash);
CREATE UNIQUE INDEX IF NOT EXISTS operators_identity_idx
    ON operators(source, airline_designator, hash);

CREATE INDEX IF NOT EXISTS simple_registrations_icao_idx   ON simple_registrations(icao_hex);
CREATE INDEX IF NOT EXISTS simple_registrations_reg_idx    ON simple_registrations(registration);
CREATE INDEX IF NOT EXISTS detailed_registrations_icao_idx ON detailed_registrations(icao_hex);
CREATE INDEX IF NOT EXISTS detailed_registrations_reg_idx  ON detailed_registrations(registration);
CREATE INDEX IF NOT EXISTS operators_designator_idx        ON operators(airline_designator);
CREATE INDEX IF NOT EXISTS flight_numbers_expires_idx      ON flight_numbers(ident, expires);

PRAGMA user_version = 1;
";
