//! Account database schema management.

use rusqlite::{Connection, OptionalExtension};

use crate::error::{StoreError, StoreResult};

const STORE_SCHEMA_VERSION: i64 = 1;

pub(crate) fn ensure_schema(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS store_meta (
            schema_version  INTEGER NOT NULL,
            created_at      INTEGER NOT NULL,
            updated_at      INTEGER NOT NULL
        );",
    )
    .map_err(|err| StoreError::Unavailable(err.to_string()))?;

    let existing: Option<i64> = conn
        .query_row(
            "SELECT schema_version FROM store_meta LIMIT 1;",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|err| StoreError::Unavailable(err.to_string()))?;

    match existing {
        // Unlike a cache, account records must survive schema bumps: any
        // future migration belongs here and must preserve the accounts
        // table. A database written by a newer build is refused outright.
        Some(version) if version > STORE_SCHEMA_VERSION => {
            Err(StoreError::Unavailable(format!(
                "database schema version {version} is newer than this build supports ({STORE_SCHEMA_VERSION})"
            )))
        }
        Some(_) => ensure_tables(conn),
        None => {
            ensure_tables(conn)?;
            insert_meta(conn)
        }
    }
}

fn ensure_tables(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS accounts (
            id           TEXT    NOT NULL,
            address      TEXT    NOT NULL,
            signing_key  TEXT    NOT NULL,
            secret_key   TEXT    NOT NULL,
            salt         TEXT    NOT NULL,
            kind         TEXT    NOT NULL,
            test_index   INTEGER,
            created_at   INTEGER NOT NULL,
            PRIMARY KEY (id)
        );

        CREATE INDEX IF NOT EXISTS idx_accounts_kind
        ON accounts (kind);

        CREATE UNIQUE INDEX IF NOT EXISTS idx_accounts_address
        ON accounts (address);

        CREATE TABLE IF NOT EXISTS settings (
            name   TEXT NOT NULL,
            value  TEXT NOT NULL,
            PRIMARY KEY (name)
        );",
    )
    .map_err(|err| StoreError::Unavailable(err.to_string()))?;
    Ok(())
}

fn insert_meta(conn: &Connection) -> StoreResult<()> {
    conn.execute(
        "INSERT INTO store_meta (schema_version, created_at, updated_at)
         VALUES (?1, strftime('%s','now'), strftime('%s','now'))",
        [STORE_SCHEMA_VERSION],
    )
    .map_err(|err| StoreError::Unavailable(err.to_string()))?;
    Ok(())
}
