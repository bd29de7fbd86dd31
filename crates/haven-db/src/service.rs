//! Service layer hosting every repository method.
//!
//! `HavenService` wraps `HavenDb`. All repo methods are implemented as
//! `impl HavenService` blocks under [`crate::repos`]. The service is
//! constructed once at startup and passed by reference (or `Arc`) to every
//! caller; there is no global handle.

use crate::HavenDb;
use crate::error::DatabaseError;

pub struct HavenService {
    db: HavenDb,
}

impl HavenService {
    /// Create a new service over a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or migrated.
    pub async fn new_local(db_path: &str) -> Result<Self, DatabaseError> {
        let db = HavenDb::open_local(db_path).await?;
        Ok(Self { db })
    }

    /// Create from an existing `HavenDb`.
    #[must_use]
    pub const fn from_db(db: HavenDb) -> Self {
        Self { db }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &HavenDb {
        &self.db
    }
}
