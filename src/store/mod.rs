//! User table: fixed-width account records in memory, mirrored to an
//! append-only file.
//!
//! ## Design
//! - One `parking_lot::Mutex` guards the whole row vector; every scan and
//!   every mutation holds it for the full sequence
//! - Inserts append to the backing file first and only then grow the
//!   in-memory table, so a failed write never leaves a phantom row
//! - Session updates are in-memory only; the file keeps the row as inserted
//! - A misaligned file is reported loudly and the table starts empty

pub mod backing;
pub mod record;

pub use backing::{FileBacking, RecordBacking};
pub use record::{
    validate_username, UserAccount, HASH_LEN, MAX_PASSWORD_LEN, MAX_USERNAME_LEN, RECORD_SIZE,
    SALT_LEN, SESSION_ID_LEN,
};

use crate::crypto::constant_time_eq;
use crate::error::{AuthError, Result};
use parking_lot::Mutex;

/// Default row limit for a table.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// What happened when the backing file was replayed at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    /// No file yet (fresh install).
    Fresh,
    Loaded { rows: usize },
    /// File size was not a whole number of records; nothing was loaded.
    Corrupt { size: u64 },
    /// The file exists but could not be read; nothing was loaded.
    Unreadable,
}

/// Process-wide user table.
pub struct UserStore {
    backing: Box<dyn RecordBacking>,
    capacity: usize,
    rows: Mutex<Vec<UserAccount>>,
    status: LoadStatus,
}

impl UserStore {
    /// Replay the backing file. Never fails: a corrupt or unreadable file is
    /// logged and the table starts empty.
    pub fn open<B: RecordBacking + 'static>(backing: B, capacity: usize) -> Self {
        let location = backing.location();
        match Self::replay(&backing, capacity) {
            Ok((rows, status)) => Self::assemble(Box::new(backing), capacity, rows, status),
            Err(e) => {
                let status = match &e {
                    AuthError::CorruptDatabase { size, .. } => LoadStatus::Corrupt { size: *size },
                    _ => LoadStatus::Unreadable,
                };
                tracing::error!(
                    path = %location.display(),
                    code = e.code(),
                    "User table failed to load, continuing with ZERO users: {e}"
                );
                Self::assemble(Box::new(backing), capacity, Vec::new(), status)
            }
        }
    }

    /// Replay the backing file, returning the load error instead of
    /// degrading to an empty table.
    pub fn try_open<B: RecordBacking + 'static>(backing: B, capacity: usize) -> Result<Self> {
        let (rows, status) = Self::replay(&backing, capacity)?;
        Ok(Self::assemble(Box::new(backing), capacity, rows, status))
    }

    fn assemble(
        backing: Box<dyn RecordBacking>,
        capacity: usize,
        rows: Vec<UserAccount>,
        status: LoadStatus,
    ) -> Self {
        Self {
            backing,
            capacity,
            rows: Mutex::new(rows),
            status,
        }
    }

    fn replay(
        backing: &dyn RecordBacking,
        capacity: usize,
    ) -> Result<(Vec<UserAccount>, LoadStatus)> {
        let location = backing.location();

        let Some(bytes) = backing.read_all()? else {
            tracing::warn!(
                path = %location.display(),
                "User table file not found, starting with an empty table"
            );
            return Ok((Vec::new(), LoadStatus::Fresh));
        };

        if bytes.len() % RECORD_SIZE != 0 {
            return Err(AuthError::CorruptDatabase {
                path: location,
                size: bytes.len() as u64,
            });
        }

        let total = bytes.len() / RECORD_SIZE;
        if total > capacity {
            tracing::warn!(
                path = %location.display(),
                rows = total,
                capacity,
                "User table file holds more rows than capacity, extra rows not loaded"
            );
        }

        let mut rows: Vec<UserAccount> = Vec::with_capacity(total.min(capacity));
        for (index, chunk) in bytes.chunks_exact(RECORD_SIZE).take(capacity).enumerate() {
            let Some(account) = UserAccount::decode(chunk) else {
                tracing::warn!(
                    path = %location.display(),
                    row = index,
                    "Skipping user record with a non UTF-8 username"
                );
                continue;
            };
            if rows.iter().any(|r| r.username == account.username) {
                tracing::warn!(
                    path = %location.display(),
                    row = index,
                    username = %account.username,
                    "Skipping duplicate user record"
                );
                continue;
            }
            rows.push(account);
        }

        tracing::info!(path = %location.display(), rows = rows.len(), "User table loaded");
        let status = LoadStatus::Loaded { rows: rows.len() };
        Ok((rows, status))
    }

    pub fn load_status(&self) -> LoadStatus {
        self.status
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().len()
    }

    /// Snapshot of all usernames in insertion order.
    pub fn usernames(&self) -> Vec<String> {
        self.rows.lock().iter().map(|r| r.username.clone()).collect()
    }

    pub fn find_by_username(&self, username: &str) -> Option<UserAccount> {
        if username.is_empty() {
            return None;
        }
        let rows = self.rows.lock();
        rows.iter().find(|r| r.username == username).cloned()
    }

    /// Look up the account holding `session_id`. An empty id never matches.
    pub fn find_by_session_id(&self, session_id: &str) -> Option<UserAccount> {
        if session_id.is_empty() {
            return None;
        }
        let rows = self.rows.lock();
        rows.iter()
            .find(|r| {
                r.has_session() && constant_time_eq(r.session_id.as_bytes(), session_id.as_bytes())
            })
            .cloned()
    }

    /// Persist a new account. The record is appended to the backing file
    /// before the in-memory row count moves.
    pub fn insert(
        &self,
        username: &str,
        salt: [u8; SALT_LEN],
        password_hash: [u8; HASH_LEN],
        iteration_count: u32,
    ) -> Result<()> {
        validate_username(username)?;
        let account = UserAccount::new(username, salt, password_hash, iteration_count);

        let mut rows = self.rows.lock();
        if rows.len() >= self.capacity {
            tracing::warn!(capacity = self.capacity, "User table full, insert rejected");
            return Err(AuthError::TableFull {
                capacity: self.capacity,
            });
        }
        // Re-checked under the lock: two registrations may both have passed
        // the caller's lookup.
        if rows.iter().any(|r| r.username == username) {
            return Err(AuthError::AccountExists);
        }

        if let Err(e) = self.backing.append(&account.encode()) {
            tracing::error!(
                path = %self.backing.location().display(),
                "Failed to append user record: {e}"
            );
            return Err(AuthError::Io(e));
        }

        rows.push(account);
        tracing::debug!(rows = rows.len(), "User record appended");
        Ok(())
    }

    /// Overwrite the session id of `username` in place. Returns whether a
    /// row was updated; ids wider than the record field are refused.
    pub fn update_session_id(&self, username: &str, session_id: &str) -> bool {
        if session_id.len() > SESSION_ID_LEN {
            tracing::warn!(
                len = session_id.len(),
                max = SESSION_ID_LEN,
                "Session id does not fit the record, update refused"
            );
            return false;
        }

        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|r| r.username == username) {
            Some(row) => {
                row.session_id.clear();
                row.session_id.push_str(session_id);
                true
            }
            None => false,
        }
    }
}
