//! SQL schema for the fuel-request SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    username    TEXT NOT NULL UNIQUE,
    email       TEXT,
    role        TEXT NOT NULL,   -- 'Driver' | 'Manager' | 'Finance' | 'Admin'
    push_token  TEXT,            -- NULL means no push delivery
    created_at  TEXT NOT NULL
);

-- Purchase facts are never updated; only `status` moves.
CREATE TABLE IF NOT EXISTS fuel_requests (
    request_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    driver_id       INTEGER NOT NULL REFERENCES users(user_id),
    vehicle_name    TEXT,
    vehicle_number  TEXT,
    odometer        REAL,
    liters          REAL NOT NULL CHECK (liters >= 0),
    rate            REAL NOT NULL CHECK (rate >= 0),
    total           REAL NOT NULL CHECK (total >= 0),
    station         TEXT,
    notes           TEXT,
    status          TEXT NOT NULL DEFAULT 'Pending'
                    CHECK (status IN ('Pending', 'Approved', 'Rejected')),
    created_at      TEXT NOT NULL
);

-- At most one receipt per request, written once.
CREATE TABLE IF NOT EXISTS fuel_receipts (
    request_id  INTEGER PRIMARY KEY REFERENCES fuel_requests(request_id),
    file_ref    TEXT NOT NULL,
    media_type  TEXT NOT NULL,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS notifications (
    notification_id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id         INTEGER NOT NULL REFERENCES users(user_id),
    title           TEXT NOT NULL,
    message         TEXT NOT NULL,
    is_read         INTEGER NOT NULL DEFAULT 0,
    created_at      TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS users_role_idx            ON users(role);
CREATE INDEX IF NOT EXISTS fuel_requests_driver_idx  ON fuel_requests(driver_id);
CREATE INDEX IF NOT EXISTS fuel_requests_status_idx  ON fuel_requests(status);
CREATE INDEX IF NOT EXISTS notifications_user_idx    ON notifications(user_id);

PRAGMA user_version = 1;
";
