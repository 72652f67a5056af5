use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::patch::Patch;

/// A row of the users table.
///
/// `id` and `internal_id` come from two independent counters. Neither can be
/// derived from the other and both are immutable once issued.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
pub struct User {
    /// Primary key, never reused
    pub id: i64,
    /// Separately issued identifier, unique across all rows
    pub internal_id: i64,
    pub one: Option<String>,
    pub two: Option<String>,
}

/// Attributes of a user to be created
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewUser {
    #[serde(default)]
    pub one: Option<String>,
    #[serde(default)]
    pub two: Option<String>,
}

impl NewUser {
    pub fn new(one: Option<&str>, two: Option<&str>) -> Self {
        Self {
            one: one.map(str::to_string),
            two: two.map(str::to_string),
        }
    }
}

/// Partial update of the text attributes. Absent keys leave a field
/// unchanged, `null` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserPatch {
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub one: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_missing")]
    pub two: Patch<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.one.is_missing() && self.two.is_missing()
    }
}

impl From<UserPatch> for NewUser {
    fn from(patch: UserPatch) -> Self {
        Self {
            one: patch.one.into_value(),
            two: patch.two.into_value(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSearchField {
    Id(i64),
    InternalId(i64),
}

impl std::fmt::Display for UserSearchField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserSearchField::Id(id) => write!(f, "id={id}"),
            UserSearchField::InternalId(internal_id) => write!(f, "internal_id={internal_id}"),
        }
    }
}
