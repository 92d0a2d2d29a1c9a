//! Application state shared across handlers.

use database::Database;
use recurrence::Zone;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Database connection.
    pub db: Database,
    /// Zone time phrases are read in.
    pub zone: Zone,
}

impl AppState {
    /// Create new application state.
    pub fn new(db: Database, zone: Zone) -> Self {
        Self { db, zone }
    }
}
