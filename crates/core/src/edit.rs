//! Admin edit buffer.
//!
//! An [`EditDraft`] is a deep copy of a stored [`Registration`]. Edits go to
//! the draft only; the canonical registration is never mutated in place.
//! Committing validates the draft and yields the update to send to the
//! store, discarding is just dropping the draft.

use serde::Serialize;

use crate::error::CoreError;
use crate::registration::{
    new_member_id, validate_leader_name, validate_members, Gender, Member, PlatinumGroup,
    Registration, UpdateRegistration, MSG_MEMBER_REQUIRED,
};
use crate::types::DocId;

/// Build the confirmation prompt shown before deleting a registration.
pub fn delete_confirmation_prompt(leader_name: &str) -> String {
    format!("確定要刪除「{leader_name}」的報名資料嗎？此操作無法復原。")
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EditDraft {
    id: DocId,
    platinum_group: String,
    leader_name: String,
    new_friends: Vec<Member>,
}

impl EditDraft {
    /// Snapshot a registration into a new draft.
    pub fn snapshot(registration: &Registration) -> Self {
        Self {
            id: registration.id,
            platinum_group: registration.platinum_group.clone(),
            leader_name: registration.leader_name.clone(),
            new_friends: registration.new_friends.clone(),
        }
    }

    pub fn id(&self) -> DocId {
        self.id
    }

    pub fn members(&self) -> &[Member] {
        &self.new_friends
    }

    pub fn set_platinum_group(&mut self, group: PlatinumGroup) {
        self.platinum_group = group.as_str().to_string();
    }

    pub fn set_leader_name(&mut self, name: impl Into<String>) {
        self.leader_name = name.into();
    }

    /// Replace the whole member list. An empty list is refused.
    pub fn replace_members(&mut self, members: Vec<Member>) -> Result<(), CoreError> {
        if members.is_empty() {
            return Err(CoreError::Validation(MSG_MEMBER_REQUIRED.to_string()));
        }
        self.new_friends = members;
        Ok(())
    }

    /// Append a blank member and return its id. New members default to male.
    pub fn add_member(&mut self) -> String {
        let id = new_member_id();
        self.new_friends.push(Member {
            id: id.clone(),
            name: String::new(),
            gender: Gender::Male,
        });
        id
    }

    /// Remove a member, refusing to drop the last one.
    pub fn remove_member(&mut self, id: &str) -> Result<(), CoreError> {
        if self.new_friends.len() <= 1 {
            return Err(CoreError::Validation(MSG_MEMBER_REQUIRED.to_string()));
        }
        self.new_friends.retain(|m| m.id != id);
        Ok(())
    }

    pub fn update_member(&mut self, id: &str, name: Option<&str>, gender: Option<Gender>) {
        if let Some(member) = self.new_friends.iter_mut().find(|m| m.id == id) {
            if let Some(name) = name {
                member.name = name.to_string();
            }
            if let Some(gender) = gender {
                member.gender = gender;
            }
        }
    }

    /// Validate the draft and turn it into a store update.
    ///
    /// The update always carries all three editable fields and never the
    /// export fields.
    pub fn commit(self) -> Result<UpdateRegistration, CoreError> {
        let platinum_group: PlatinumGroup = self.platinum_group.parse()?;
        validate_leader_name(&self.leader_name)?;
        validate_members(&self.new_friends)?;

        Ok(UpdateRegistration {
            platinum_group: Some(platinum_group),
            leader_name: Some(self.leader_name.trim().to_string()),
            new_friends: Some(self.new_friends),
        })
    }
}
