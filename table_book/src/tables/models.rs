//! Table registry data models.

use serde::{Deserialize, Serialize};

/// Table ID type
pub type TableId = i64;

/// A physical table on the restaurant floor.
///
/// Inactive tables are invisible to availability queries but stay in the
/// registry so historical reservations keep a valid reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub id: TableId,
    pub number: i32,
    pub seats: i32,
    pub is_active: bool,
}

/// Request to register a new table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTable {
    pub number: i32,
    pub seats: i32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

/// Request to update an existing table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateTable {
    pub number: i32,
    pub seats: i32,
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}
