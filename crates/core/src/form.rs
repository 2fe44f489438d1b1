//! Registration form state machine.
//!
//! ```text
//! Idle --begin_submit--> Submitting --finish_submit(Ok)--> Success (form reset)
//!   |                        |
//!   |                        +-----finish_submit(Err)--> Error (data kept)
//!   +--begin_submit (invalid)--> Error (store never called)
//! ```
//!
//! The form always holds at least one member draft.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::registration::{
    new_member_id, validate_members, Gender, Member, NewRegistration, PlatinumGroup,
    MSG_DUPLICATE_MEMBER_ID, MSG_GROUP_REQUIRED, MSG_LEADER_REQUIRED, MSG_MEMBER_INCOMPLETE,
    MSG_MEMBER_REQUIRED,
};
use crate::types::DocId;

/// Shown after a registration was stored.
pub const MSG_SUBMIT_SUCCESS: &str = "報名成功！感謝您的報名。";

/// Prefix for a failed store call; the error text is appended.
pub const MSG_SUBMIT_FAILED: &str = "提交失敗，請稍後再試。";

/// A member entry that may still be incomplete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberDraft {
    pub id: String,
    pub name: String,
    pub gender: Option<Gender>,
}

impl MemberDraft {
    pub fn blank() -> Self {
        Self {
            id: new_member_id(),
            name: String::new(),
            gender: None,
        }
    }

    fn is_complete(&self) -> bool {
        !self.name.trim().is_empty() && self.gender.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum FormState {
    Idle,
    Submitting,
    Success(String),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    platinum_group: Option<PlatinumGroup>,
    leader_name: String,
    members: Vec<MemberDraft>,
    state: FormState,
}

impl Default for RegistrationForm {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationForm {
    /// An empty form with a single blank member.
    pub fn new() -> Self {
        Self {
            platinum_group: None,
            leader_name: String::new(),
            members: vec![MemberDraft::blank()],
            state: FormState::Idle,
        }
    }

    /// A form pre-filled with submitted entries.
    ///
    /// An empty member list is kept as-is so that submitting reports it.
    pub fn with_entries(
        platinum_group: Option<PlatinumGroup>,
        leader_name: impl Into<String>,
        members: Vec<MemberDraft>,
    ) -> Self {
        Self {
            platinum_group,
            leader_name: leader_name.into(),
            members,
            state: FormState::Idle,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn members(&self) -> &[MemberDraft] {
        &self.members
    }

    pub fn platinum_group(&self) -> Option<PlatinumGroup> {
        self.platinum_group
    }

    pub fn leader_name(&self) -> &str {
        &self.leader_name
    }

    pub fn set_platinum_group(&mut self, group: PlatinumGroup) {
        self.platinum_group = Some(group);
    }

    pub fn set_leader_name(&mut self, name: impl Into<String>) {
        self.leader_name = name.into();
    }

    /// Append a blank member and return its id.
    pub fn add_member(&mut self) -> String {
        let draft = MemberDraft::blank();
        let id = draft.id.clone();
        self.members.push(draft);
        id
    }

    /// Remove a member, refusing to drop the last one.
    pub fn remove_member(&mut self, id: &str) -> Result<(), CoreError> {
        if self.members.len() <= 1 {
            return Err(CoreError::Validation(MSG_MEMBER_REQUIRED.to_string()));
        }
        self.members.retain(|m| m.id != id);
        Ok(())
    }

    /// Update a member's name and/or gender. Unknown ids are ignored.
    pub fn update_member(&mut self, id: &str, name: Option<&str>, gender: Option<Gender>) {
        if let Some(member) = self.members.iter_mut().find(|m| m.id == id) {
            if let Some(name) = name {
                member.name = name.to_string();
            }
            if gender.is_some() {
                member.gender = gender;
            }
        }
    }

    /// Validate the form and move to `Submitting`.
    ///
    /// On failure the form moves to `Error` and no registration is produced,
    /// so the caller never reaches the store.
    pub fn begin_submit(&mut self) -> Result<NewRegistration, CoreError> {
        if self.state == FormState::Submitting {
            return Err(CoreError::Conflict(
                "Registration is already being submitted".to_string(),
            ));
        }

        match self.validated() {
            Ok(registration) => {
                self.state = FormState::Submitting;
                Ok(registration)
            }
            Err(msg) => {
                self.state = FormState::Error(msg.to_string());
                Err(CoreError::Validation(msg.to_string()))
            }
        }
    }

    /// Record the store outcome. Success resets the form; failure keeps the
    /// entered data so the user can retry.
    pub fn finish_submit<E: std::fmt::Display>(&mut self, outcome: Result<DocId, E>) {
        match outcome {
            Ok(_) => {
                *self = Self::new();
                self.state = FormState::Success(MSG_SUBMIT_SUCCESS.to_string());
            }
            Err(e) => {
                self.state = FormState::Error(format!("{MSG_SUBMIT_FAILED}{e}"));
            }
        }
    }

    fn validated(&self) -> Result<NewRegistration, &'static str> {
        if self.members.is_empty() {
            return Err(MSG_MEMBER_REQUIRED);
        }
        if !self.members.iter().all(MemberDraft::is_complete) {
            return Err(MSG_MEMBER_INCOMPLETE);
        }
        let platinum_group = self.platinum_group.ok_or(MSG_GROUP_REQUIRED)?;
        let leader_name = self.leader_name.trim();
        if leader_name.is_empty() {
            return Err(MSG_LEADER_REQUIRED);
        }

        let new_friends: Vec<Member> = self
            .members
            .iter()
            .filter_map(|d| {
                d.gender.map(|gender| Member {
                    id: d.id.clone(),
                    name: d.name.trim().to_string(),
                    gender,
                })
            })
            .collect();

        // Drafts are complete at this point, so only duplicate ids can fail.
        validate_members(&new_friends).map_err(|_| MSG_DUPLICATE_MEMBER_ID)?;

        Ok(NewRegistration {
            platinum_group,
            leader_name: leader_name.to_string(),
            new_friends,
        })
    }
}
