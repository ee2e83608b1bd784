use serde::Deserialize;
use std::num::{NonZeroU32, NonZeroU64};

/// Configuration for connecting to the Postgres database.
#[derive(Deserialize)]
pub struct Database {
    /// Connection URL of the Postgres database.
    ///
    /// **Environment variables**:
    /// - `MURAL_DB_URL` or `DATABASE_URL`
    pub url: String,
    /// Minimum idle database connections kept around so bursts do not
    /// always pay the connection setup cost.
    ///
    /// **Environment variables**:
    /// - `MURAL_DB_MIN_IDLE`
    pub min_idle: Option<NonZeroU32>,
    /// Maximum amount of connections the pool may hold.
    ///
    /// **Environment variables**:
    /// - `MURAL_DB_POOL_SIZE`
    #[serde(default = "Database::default_pool_size")]
    pub pool_size: NonZeroU32,
    /// How long to wait for a connection before the pool gives up.
    ///
    /// **Environment variables**:
    /// - `MURAL_DB_TIMEOUT_SECS`
    #[serde(default = "Database::default_timeout_secs")]
    pub timeout_secs: NonZeroU64,
    /// Prefer TLS-encrypted connections to the database.
    ///
    /// **Environment variables**:
    /// - `MURAL_DB_ENFORCE_TLS`
    #[serde(default = "Database::default_enforce_tls")]
    pub enforce_tls: bool,
}

impl Database {
    const DEFAULT_POOL_SIZE: u32 = 5;
    const DEFAULT_TIMEOUT_SECS: u64 = 5;

    // Required by serde
    const fn default_pool_size() -> NonZeroU32 {
        match NonZeroU32::new(Self::DEFAULT_POOL_SIZE) {
            Some(n) => n,
            None => panic!("DEFAULT_POOL_SIZE is accidentally set to 0"),
        }
    }

    const fn default_timeout_secs() -> NonZeroU64 {
        match NonZeroU64::new(Self::DEFAULT_TIMEOUT_SECS) {
            Some(n) => n,
            None => panic!("DEFAULT_TIMEOUT_SECS is accidentally set to 0"),
        }
    }

    const fn default_enforce_tls() -> bool {
        true
    }
}

// The connection URL may carry credentials.
impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("url", &"<redacted>")
            .field("min_idle", &self.min_idle)
            .field("pool_size", &self.pool_size)
            .field("timeout_secs", &self.timeout_secs)
            .field("enforce_tls", &self.enforce_tls)
            .finish()
    }
}
