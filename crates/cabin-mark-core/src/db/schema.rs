//! Database schema and migrations.

/// Current schema version
pub const SCHEMA_VERSION: i32 = 2;

/// Schema for a fresh database (latest version)
pub const INIT_SCHEMA: &str = r#"
-- Photos: one row per captured location photo
CREATE TABLE IF NOT EXISTS photos (
    id              TEXT PRIMARY KEY NOT NULL,
    door_id         TEXT NOT NULL,
    aircraft_type   TEXT NOT NULL,
    full_image      BLOB NOT NULL,
    thumbnail       BLOB,
    timestamp       TEXT NOT NULL
);

-- Inspection header per aircraft scope
CREATE TABLE IF NOT EXISTS inspections (
    aircraft_type     TEXT PRIMARY KEY NOT NULL,
    registration      TEXT NOT NULL,
    inspection_label  TEXT NOT NULL,
    updated_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS schema_version (
    version         INTEGER PRIMARY KEY,
    applied_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_photos_aircraft_type ON photos(aircraft_type);
CREATE INDEX IF NOT EXISTS idx_photos_timestamp ON photos(timestamp);
"#;

/// A schema upgrade step
pub struct Migration {
    pub version: i32,
    pub description: &'static str,
    pub sql: &'static str,
}

/// Upgrades applied in order to databases older than [`SCHEMA_VERSION`].
///
/// Version 1 databases only had the `photos` table.
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 2,
    description: "inspection metadata table and photo indexes",
    sql: r#"
        CREATE TABLE IF NOT EXISTS inspections (
            aircraft_type     TEXT PRIMARY KEY NOT NULL,
            registration      TEXT NOT NULL,
            inspection_label  TEXT NOT NULL,
            updated_at        TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_photos_aircraft_type ON photos(aircraft_type);
        CREATE INDEX IF NOT EXISTS idx_photos_timestamp ON photos(timestamp);
    "#,
}];
