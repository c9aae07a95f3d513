// hospital-store-sqlite/src/schema.rs
// ============================================================================
// Module: Schema
// Description: DDL for the durable identity and audit tables, applied once
// at connection open.
// Dependencies: rusqlite
// ============================================================================

use rusqlite::Connection;

use crate::error::SqliteStoreError;

const USERS_TABLE: &str = "
CREATE TABLE IF NOT EXISTS users (
    id                   TEXT PRIMARY KEY,
    tenant_id            TEXT NOT NULL,
    name                 TEXT NOT NULL,
    email                TEXT NOT NULL,
    password_hash        TEXT NOT NULL,
    phone                TEXT,
    active               INTEGER NOT NULL,
    email_verified       INTEGER NOT NULL,
    failed_attempts      INTEGER NOT NULL,
    locked_until         TEXT,
    last_login_at        TEXT,
    password_changed_at  TEXT NOT NULL,
    created_at           TEXT NOT NULL,
    updated_at           TEXT NOT NULL,
    UNIQUE(tenant_id, email)
);";

const AUDIT_TABLE: &str = "
CREATE TABLE IF NOT EXISTS audit_entries (
    id             TEXT PRIMARY KEY,
    tenant_id      TEXT NOT NULL,
    user_id        TEXT,
    user_email     TEXT,
    action         TEXT NOT NULL,
    resource_type  TEXT NOT NULL,
    resource_id    TEXT,
    description    TEXT,
    old_value      TEXT,
    new_value      TEXT,
    ip             TEXT,
    agent          TEXT,
    event_id       TEXT NOT NULL UNIQUE,
    timestamp      TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_audit_tenant_user_ts
    ON audit_entries (tenant_id, user_id, timestamp);
CREATE INDEX IF NOT EXISTS idx_audit_resource_ts
    ON audit_entries (tenant_id, resource_type, resource_id, timestamp);";

/// Creates the durable tables and indexes, idempotently.
pub(crate) fn initialize(connection: &Connection) -> Result<(), SqliteStoreError> {
    connection.execute_batch(USERS_TABLE)?;
    connection.execute_batch(AUDIT_TABLE)?;
    Ok(())
}
