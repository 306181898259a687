//! SQLite-backed implementation of the account record store.

use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension, Row};

use crate::error::{StoreError, StoreResult};
use crate::records::{AccountId, AccountKind, AccountKindTag, AccountRecord};
use crate::schema::ensure_schema;

/// Name of the single scalar setting holding the selected account id.
const CURRENT_ACCOUNT_SETTING: &str = "current_account";

/// Durable, crash-safe store for [`AccountRecord`]s and one scalar setting.
///
/// The store is scoped to one physical database. Cloning is cheap and clones
/// share the same underlying connection; all operations are safe to call
/// from multiple threads.
#[derive(Clone)]
pub struct AccountStore {
    conn: Arc<Mutex<Connection>>,
}

impl AccountStore {
    /// Opens (or creates) the database at `path` and ensures its schema.
    ///
    /// Opening an already-initialized database is a no-op beyond validating
    /// the schema version.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened,
    /// configured, or its schema belongs to a newer build.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
        let conn = Connection::open_with_flags(path, flags)
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Self::from_connection(conn)
    }

    /// Opens a fresh in-memory database.
    ///
    /// In-memory stores live exactly as long as the handle (and its clones);
    /// they are intended for development and tests.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be created.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = FULL;",
        )
        .map_err(|err| StoreError::Unavailable(err.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_owned()))
    }

    /// Inserts or replaces the record identified by `record.id`.
    ///
    /// The write is durable before this call returns.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateAddress`] if a different record already
    /// holds `record.address` (the store is left unchanged), or
    /// [`StoreError::Write`] on I/O failure.
    pub fn put(&self, record: &AccountRecord) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|err| StoreError::Write(err.to_string()))?;

        let holder: Option<String> = tx
            .query_row(
                "SELECT id FROM accounts WHERE address = ?1 AND id <> ?2",
                params![record.address, record.id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Query(err.to_string()))?;
        if holder.is_some() {
            return Err(StoreError::DuplicateAddress {
                address: record.address.clone(),
            });
        }

        let created_at = i64::try_from(record.created_at).map_err(|_| {
            StoreError::Write(format!(
                "created_at {} out of range",
                record.created_at
            ))
        })?;
        tx.execute(
            "INSERT OR REPLACE INTO accounts (
                id, address, signing_key, secret_key, salt,
                kind, test_index, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                record.id.as_str(),
                record.address,
                record.signing_key,
                record.secret_key,
                record.salt,
                record.kind.tag().to_string(),
                record.kind.test_index().map(i64::from),
                created_at,
            ],
        )
        .map_err(|err| StoreError::Write(err.to_string()))?;
        tx.commit()
            .map_err(|err| StoreError::Write(err.to_string()))
    }

    /// Returns the record with the given id, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] on I/O failure or
    /// [`StoreError::Corrupted`] if the stored row violates an invariant.
    pub fn get(&self, id: &AccountId) -> StoreResult<Option<AccountRecord>> {
        let conn = self.lock()?;
        let raw = conn
            .query_row(
                "SELECT id, address, signing_key, secret_key, salt,
                        kind, test_index, created_at
                 FROM accounts WHERE id = ?1",
                params![id.as_str()],
                raw_from_row,
            )
            .optional()
            .map_err(|err| StoreError::Query(err.to_string()))?;
        raw.map(record_from_raw).transpose()
    }

    /// Returns all records of the given kind, in no particular order.
    ///
    /// Callers that need display order must sort by `created_at`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] on I/O failure or
    /// [`StoreError::Corrupted`] if a stored row violates an invariant.
    pub fn list_by_kind(&self, tag: AccountKindTag) -> StoreResult<Vec<AccountRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, address, signing_key, secret_key, salt,
                        kind, test_index, created_at
                 FROM accounts WHERE kind = ?1",
            )
            .map_err(|err| StoreError::Query(err.to_string()))?;
        let rows = stmt
            .query_map(params![tag.to_string()], raw_from_row)
            .map_err(|err| StoreError::Query(err.to_string()))?;

        let mut records = Vec::new();
        for raw in rows {
            let raw = raw.map_err(|err| StoreError::Query(err.to_string()))?;
            records.push(record_from_raw(raw)?);
        }
        Ok(records)
    }

    /// Removes the record with the given id; a no-op when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on I/O failure.
    pub fn delete(&self, id: &AccountId) -> StoreResult<()> {
        let conn = self.lock()?;
        conn.execute("DELETE FROM accounts WHERE id = ?1", params![id.as_str()])
            .map_err(|err| StoreError::Write(err.to_string()))?;
        Ok(())
    }

    /// Sets or clears the currently-selected account id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on I/O failure.
    pub fn set_current_account_id(&self, id: Option<&AccountId>) -> StoreResult<()> {
        let conn = self.lock()?;
        match id {
            Some(id) => {
                conn.execute(
                    "INSERT OR REPLACE INTO settings (name, value) VALUES (?1, ?2)",
                    params![CURRENT_ACCOUNT_SETTING, id.as_str()],
                )
                .map_err(|err| StoreError::Write(err.to_string()))?;
            }
            None => {
                conn.execute(
                    "DELETE FROM settings WHERE name = ?1",
                    params![CURRENT_ACCOUNT_SETTING],
                )
                .map_err(|err| StoreError::Write(err.to_string()))?;
            }
        }
        Ok(())
    }

    /// Returns the currently-selected account id, if one is set.
    ///
    /// The store does not validate that the id still references a record;
    /// callers treat a dangling id as a stale reference.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Query`] on I/O failure.
    pub fn current_account_id(&self) -> StoreResult<Option<AccountId>> {
        let conn = self.lock()?;
        let value: Option<String> = conn
            .query_row(
                "SELECT value FROM settings WHERE name = ?1",
                params![CURRENT_ACCOUNT_SETTING],
                |row| row.get(0),
            )
            .optional()
            .map_err(|err| StoreError::Query(err.to_string()))?;
        Ok(value.map(AccountId::new))
    }

    /// Clears both collections in a single transaction.
    ///
    /// All-or-nothing: a failure partway leaves the store unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Write`] on I/O failure.
    pub fn reset_all(&self) -> StoreResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|err| StoreError::Write(err.to_string()))?;
        tx.execute("DELETE FROM accounts", [])
            .map_err(|err| StoreError::Write(err.to_string()))?;
        tx.execute("DELETE FROM settings", [])
            .map_err(|err| StoreError::Write(err.to_string()))?;
        tx.commit()
            .map_err(|err| StoreError::Write(err.to_string()))?;
        debug!("account store reset");
        Ok(())
    }
}

impl std::fmt::Debug for AccountStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountStore").finish_non_exhaustive()
    }
}

type RawRecord = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<i64>,
    i64,
);

fn raw_from_row(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn record_from_raw(raw: RawRecord) -> StoreResult<AccountRecord> {
    let (id, address, signing_key, secret_key, salt, kind, test_index, created_at) =
        raw;

    let tag = AccountKindTag::from_str(&kind).map_err(|_| {
        StoreError::Corrupted(format!("record {id} has unknown kind `{kind}`"))
    })?;
    let kind = match (tag, test_index) {
        (AccountKindTag::TestVector, Some(index)) => AccountKind::TestVector {
            index: u32::try_from(index).map_err(|_| {
                StoreError::Corrupted(format!(
                    "record {id} has invalid test index {index}"
                ))
            })?,
        },
        (AccountKindTag::Created, None) => AccountKind::Created,
        (tag, test_index) => {
            return Err(StoreError::Corrupted(format!(
                "record {id} kind `{tag}` disagrees with test index {test_index:?}"
            )))
        }
    };
    let created_at = u64::try_from(created_at).map_err(|_| {
        StoreError::Corrupted(format!(
            "record {id} has negative creation time {created_at}"
        ))
    })?;

    Ok(AccountRecord {
        id: AccountId::new(id),
        address,
        signing_key,
        secret_key,
        salt,
        kind,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, address: &str, kind: AccountKind) -> AccountRecord {
        AccountRecord {
            id: AccountId::from(id),
            address: address.to_owned(),
            signing_key: "aa".repeat(32),
            secret_key: "bb".repeat(32),
            salt: "cc".repeat(32),
            kind,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = AccountStore::open_in_memory().unwrap();
        let rec = record("test_0", "0x01", AccountKind::TestVector { index: 0 });
        store.put(&rec).unwrap();

        let loaded = store.get(&rec.id).unwrap().unwrap();
        assert_eq!(loaded, rec);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = AccountStore::open_in_memory().unwrap();
        assert!(store.get(&AccountId::from("nope")).unwrap().is_none());
    }

    #[test]
    fn test_put_replaces_whole_record() {
        let store = AccountStore::open_in_memory().unwrap();
        let mut rec = record("created_1", "0x02", AccountKind::Created);
        store.put(&rec).unwrap();

        rec.signing_key = "dd".repeat(32);
        store.put(&rec).unwrap();

        let loaded = store.get(&rec.id).unwrap().unwrap();
        assert_eq!(loaded.signing_key, "dd".repeat(32));
    }

    #[test]
    fn test_duplicate_address_rejected_first_record_survives() {
        let store = AccountStore::open_in_memory().unwrap();
        let first = record("created_1", "0x05", AccountKind::Created);
        let second = record("created_2", "0x05", AccountKind::Created);
        store.put(&first).unwrap();

        let err = store.put(&second).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateAddress { address } if address == "0x05"));

        assert_eq!(store.get(&first.id).unwrap().unwrap(), first);
        assert!(store.get(&second.id).unwrap().is_none());
    }

    #[test]
    fn test_list_by_kind_filters() {
        let store = AccountStore::open_in_memory().unwrap();
        store
            .put(&record("test_0", "0x0a", AccountKind::TestVector { index: 0 }))
            .unwrap();
        store
            .put(&record("test_1", "0x0b", AccountKind::TestVector { index: 1 }))
            .unwrap();
        store
            .put(&record("created_1", "0x0c", AccountKind::Created))
            .unwrap();

        let tests = store.list_by_kind(AccountKindTag::TestVector).unwrap();
        assert_eq!(tests.len(), 2);
        let created = store.list_by_kind(AccountKindTag::Created).unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id.as_str(), "created_1");
    }

    #[test]
    fn test_delete_is_noop_when_absent() {
        let store = AccountStore::open_in_memory().unwrap();
        store.delete(&AccountId::from("missing")).unwrap();
    }

    #[test]
    fn test_current_account_set_get_clear() {
        let store = AccountStore::open_in_memory().unwrap();
        assert!(store.current_account_id().unwrap().is_none());

        let id = AccountId::from("test_0");
        store.set_current_account_id(Some(&id)).unwrap();
        assert_eq!(store.current_account_id().unwrap(), Some(id));

        store.set_current_account_id(None).unwrap();
        assert!(store.current_account_id().unwrap().is_none());
    }

    #[test]
    fn test_reset_all_clears_both_collections() {
        let store = AccountStore::open_in_memory().unwrap();
        let rec = record("test_0", "0x01", AccountKind::TestVector { index: 0 });
        store.put(&rec).unwrap();
        store.set_current_account_id(Some(&rec.id)).unwrap();

        store.reset_all().unwrap();

        assert!(store.get(&rec.id).unwrap().is_none());
        assert!(store
            .list_by_kind(AccountKindTag::TestVector)
            .unwrap()
            .is_empty());
        assert!(store.current_account_id().unwrap().is_none());
    }

    #[test]
    fn test_kind_and_test_index_disagreement_is_corruption() {
        let store = AccountStore::open_in_memory().unwrap();
        let rec = record("test_0", "0x01", AccountKind::TestVector { index: 0 });
        store.put(&rec).unwrap();

        {
            let conn = store.conn.lock().unwrap();
            conn.execute("UPDATE accounts SET test_index = NULL WHERE id = 'test_0'", [])
                .unwrap();
        }

        let err = store.get(&rec.id).unwrap_err();
        assert!(matches!(err, StoreError::Corrupted(_)));
    }

    #[test]
    fn test_reopen_preserves_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wallet.db3");

        let rec = record("created_1", "0x09", AccountKind::Created);
        {
            let store = AccountStore::open(&path).unwrap();
            store.put(&rec).unwrap();
            store.set_current_account_id(Some(&rec.id)).unwrap();
        }

        let store = AccountStore::open(&path).unwrap();
        assert_eq!(store.get(&rec.id).unwrap().unwrap(), rec);
        assert_eq!(store.current_account_id().unwrap(), Some(rec.id));
    }
}
