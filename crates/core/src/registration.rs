//! Registration data model.
//!
//! A [`Registration`] is one submitted group entry: a platinum group, the
//! leader who brought the group, and at least one [`Member`] ("new friend").
//! Members are value objects embedded in the registration and are never
//! addressed on their own.

use std::collections::HashSet;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocId, Timestamp};

// ---------------------------------------------------------------------------
// Validation messages
// ---------------------------------------------------------------------------

/// Shown when an operation would leave a registration without members.
pub const MSG_MEMBER_REQUIRED: &str = "至少需要一位新朋友資料";

/// Shown when a member is missing a name or a gender.
pub const MSG_MEMBER_INCOMPLETE: &str = "請填寫所有新朋友的姓名和性別";

/// Shown when no platinum group was chosen.
pub const MSG_GROUP_REQUIRED: &str = "請選擇白金小組";

/// Shown when the leader name is blank.
pub const MSG_LEADER_REQUIRED: &str = "請填寫帶領者姓名";

/// Shown when two members share an id.
pub const MSG_DUPLICATE_MEMBER_ID: &str = "新朋友資料重複";

// ---------------------------------------------------------------------------
// Gender
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Human-readable label used in the spreadsheet export.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Male => "男性",
            Self::Female => "女性",
        }
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            other => Err(CoreError::Validation(format!("Unknown gender '{other}'"))),
        }
    }
}

// ---------------------------------------------------------------------------
// Platinum group
// ---------------------------------------------------------------------------

/// The fixed set of organizational units a registration can belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatinumGroup {
    #[serde(rename = "彥淳小組")]
    Yanchun,
    #[serde(rename = "治宏小組")]
    Zhihong,
    #[serde(rename = "威傑小組")]
    Weijie,
    #[serde(rename = "EVANS小組")]
    Evans,
    #[serde(rename = "淑娟小組")]
    Shujuan,
    #[serde(rename = "文硯小組")]
    Wenyan,
}

impl PlatinumGroup {
    /// All groups in the order they are offered on the form.
    pub const ALL: [PlatinumGroup; 6] = [
        Self::Yanchun,
        Self::Zhihong,
        Self::Weijie,
        Self::Evans,
        Self::Shujuan,
        Self::Wenyan,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yanchun => "彥淳小組",
            Self::Zhihong => "治宏小組",
            Self::Weijie => "威傑小組",
            Self::Evans => "EVANS小組",
            Self::Shujuan => "淑娟小組",
            Self::Wenyan => "文硯小組",
        }
    }
}

impl std::fmt::Display for PlatinumGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatinumGroup {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown platinum group '{s}'")))
    }
}

// ---------------------------------------------------------------------------
// Member / Registration
// ---------------------------------------------------------------------------

/// One attendee within a registration.
///
/// `id` is generated by the client and only used to address the member while
/// editing; it is not a store key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub gender: Gender,
}

impl Member {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            id: new_member_id(),
            name: name.into(),
            gender,
        }
    }
}

/// Generate a fresh client-side member id.
pub fn new_member_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A stored registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    pub id: DocId,
    pub platinum_group: String,
    pub leader_name: String,
    pub new_friends: Vec<Member>,
    pub exported_to_sheet: bool,
    pub exported_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A validated registration ready to be stored.
///
/// Carries no id, timestamps or export fields; the store assigns those.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRegistration {
    pub platinum_group: PlatinumGroup,
    pub leader_name: String,
    pub new_friends: Vec<Member>,
}

/// A partial update from the admin edit flow.
///
/// Only the editable fields exist here; export fields cannot be changed
/// through an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateRegistration {
    pub platinum_group: Option<PlatinumGroup>,
    pub leader_name: Option<String>,
    pub new_friends: Option<Vec<Member>>,
}

impl UpdateRegistration {
    /// Validate whichever fields are present.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(leader) = &self.leader_name {
            validate_leader_name(leader)?;
        }
        if let Some(members) = &self.new_friends {
            validate_members(members)?;
        }
        Ok(())
    }
}

impl NewRegistration {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_leader_name(&self.leader_name)?;
        validate_members(&self.new_friends)
    }
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate that a leader name is not blank.
pub fn validate_leader_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::Validation(MSG_LEADER_REQUIRED.to_string()));
    }
    Ok(())
}

/// Validate a member list: at least one member, every name filled in, and
/// member ids unique within the list.
pub fn validate_members(members: &[Member]) -> Result<(), CoreError> {
    if members.is_empty() {
        return Err(CoreError::Validation(MSG_MEMBER_REQUIRED.to_string()));
    }
    if members.iter().any(|m| m.name.trim().is_empty()) {
        return Err(CoreError::Validation(MSG_MEMBER_INCOMPLETE.to_string()));
    }
    let mut seen = HashSet::with_capacity(members.len());
    if !members.iter().all(|m| seen.insert(m.id.as_str())) {
        return Err(CoreError::Validation(MSG_DUPLICATE_MEMBER_ID.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
