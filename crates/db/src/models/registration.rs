//! Registration row and its conversion into the domain type.

use gathering_core::registration::{Member, Registration};
use gathering_core::types::{DocId, Timestamp};
use sqlx::types::Json;
use sqlx::FromRow;

pub use gathering_core::registration::{NewRegistration, UpdateRegistration};

/// A row from the `registrations` table.
#[derive(Debug, Clone, FromRow)]
pub struct RegistrationRow {
    pub id: DocId,
    pub platinum_group: String,
    pub leader_name: String,
    pub new_friends: Json<Vec<Member>>,
    pub exported_to_sheet: bool,
    pub exported_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<RegistrationRow> for Registration {
    fn from(row: RegistrationRow) -> Self {
        Self {
            id: row.id,
            platinum_group: row.platinum_group,
            leader_name: row.leader_name,
            new_friends: row.new_friends.0,
            exported_to_sheet: row.exported_to_sheet,
            exported_at: row.exported_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
