//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These stay plain data holders; stock rules live in `inventory` and
//! queries live in `db`.

use std::fmt;

use chrono::{DateTime, Utc};

/// A trackable inventory item. Rows are provisioned outside the application;
/// only `available_quantity` is ever written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Equipment {
    /// Opaque primary key (UUID text).
    pub id: String,
    /// Primary English name, used for ordering and display.
    pub name_en: String,
    /// Optional Arabic name shown beneath the primary one.
    pub name_ar: Option<String>,
    /// Free-text storage location.
    pub location: Option<String>,
    pub total_quantity: i64,
    pub available_quantity: i64,
}

impl Equipment {
    /// Units currently checked out and therefore eligible for return.
    pub fn outstanding(&self) -> i64 {
        self.total_quantity - self.available_quantity
    }

    /// Whether at least one unit is out.
    pub fn is_depleted(&self) -> bool {
        self.available_quantity < self.total_quantity
    }

    /// Location text for the read-only form field.
    pub fn location_label(&self) -> &str {
        self.location
            .as_deref()
            .filter(|loc| !loc.trim().is_empty())
            .unwrap_or("Unknown")
    }
}

impl fmt::Display for Equipment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name_en)
    }
}

/// Direction of a stock movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionType {
    Take,
    Return,
}

impl ActionType {
    /// Value stored in the `action_type` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::Take => "take",
            ActionType::Return => "return",
        }
    }

    /// Parse the stored column value.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "take" => Some(ActionType::Take),
            "return" => Some(ActionType::Return),
            _ => None,
        }
    }

    /// Signed change applied to `available_quantity`.
    pub fn delta(self, quantity: i64) -> i64 {
        match self {
            ActionType::Take => -quantity,
            ActionType::Return => quantity,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable record of a single take or return.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub equipment_id: String,
    pub user_name: String,
    pub quantity: i64,
    pub action_type: ActionType,
    pub created_at: DateTime<Utc>,
}

/// A transaction joined with its equipment's names for the admin feed. The
/// names are optional because deleting equipment does not cascade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTransaction {
    pub transaction: Transaction,
    pub equipment_name_en: Option<String>,
    pub equipment_name_ar: Option<String>,
}

impl RecentTransaction {
    pub fn equipment_label(&self) -> &str {
        self.equipment_name_en.as_deref().unwrap_or("Item")
    }
}
