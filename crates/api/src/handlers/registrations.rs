//! Handlers for the `/registrations` resource.
//!
//! Public submission goes through the registration form state machine;
//! admin edits go through an [`EditDraft`] snapshot of the stored record.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use gathering_core::edit::{delete_confirmation_prompt, EditDraft};
use gathering_core::error::CoreError;
use gathering_core::form::{FormState, MemberDraft, RegistrationForm, MSG_SUBMIT_FAILED};
use gathering_core::notice::{
    StatusNotice, MSG_DELETED, MSG_DELETE_FAILED, MSG_UPDATED, MSG_UPDATE_FAILED,
};
use gathering_core::registration::{new_member_id, Member, PlatinumGroup, MSG_MEMBER_INCOMPLETE};
use gathering_core::stats::summarize;
use gathering_core::types::DocId;
use gathering_db::repositories::RegistrationRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::response::{DataResponse, NoticeResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// A member as typed into the public form. Gender may still be unselected.
#[derive(Debug, Deserialize)]
pub struct MemberSubmission {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    pub gender: Option<String>,
}

impl MemberSubmission {
    fn id_or_new(id: Option<String>) -> String {
        id.filter(|id| !id.is_empty()).unwrap_or_else(new_member_id)
    }

    /// A complete member for the edit path. A missing id gets a fresh one;
    /// a missing or unknown gender is a validation error.
    fn into_member(self) -> Result<Member, CoreError> {
        let gender = self
            .gender
            .ok_or_else(|| CoreError::Validation(MSG_MEMBER_INCOMPLETE.to_string()))?
            .parse()?;
        Ok(Member {
            id: Self::id_or_new(self.id),
            name: self.name,
            gender,
        })
    }
}

/// Body of `POST /registrations`.
#[derive(Debug, Deserialize)]
pub struct RegistrationSubmission {
    pub platinum_group: Option<String>,
    #[serde(default)]
    pub leader_name: String,
    #[serde(default)]
    pub new_friends: Vec<MemberSubmission>,
}

impl RegistrationSubmission {
    /// Load the submitted entries into a form. Unknown groups and genders
    /// count as unselected, which the form reports on submit.
    fn into_form(self) -> RegistrationForm {
        let members = self
            .new_friends
            .into_iter()
            .map(|m| MemberDraft {
                id: MemberSubmission::id_or_new(m.id),
                name: m.name,
                gender: m.gender.and_then(|g| g.parse().ok()),
            })
            .collect();
        let group = self
            .platinum_group
            .and_then(|g| g.parse::<PlatinumGroup>().ok());
        RegistrationForm::with_entries(group, self.leader_name, members)
    }
}

#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub id: DocId,
    pub form: FormState,
}

/// Body of `PUT /registrations/{id}`. Absent fields keep their stored value.
/// Members added during the edit may come without an id.
#[derive(Debug, Deserialize)]
pub struct EditSubmission {
    pub platinum_group: Option<String>,
    pub leader_name: Option<String>,
    pub new_friends: Option<Vec<MemberSubmission>>,
}

/// Body of `POST /registrations/mark-exported`.
#[derive(Debug, Deserialize)]
pub struct MarkExportedRequest {
    pub ids: Vec<DocId>,
}

#[derive(Debug, Serialize)]
pub struct MarkExportedResponse {
    pub updated: u64,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub id: DocId,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct DeletePrompt {
    pub id: DocId,
    pub prompt: String,
}

fn not_found(id: DocId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Registration",
        id,
    })
}

// ---------------------------------------------------------------------------
// Public form
// ---------------------------------------------------------------------------

/// GET /api/v1/groups
///
/// The platinum groups offered on the form, in display order.
pub async fn list_groups() -> Json<DataResponse<Vec<&'static str>>> {
    let groups = PlatinumGroup::ALL.iter().map(|g| g.as_str()).collect();
    Json(DataResponse { data: groups })
}

/// POST /api/v1/registrations
///
/// Submit the public registration form. Validation failures return 400 and
/// never reach the store.
pub async fn create_registration(
    State(state): State<AppState>,
    Json(input): Json<RegistrationSubmission>,
) -> AppResult<impl IntoResponse> {
    let mut form = input.into_form();
    let registration = form.begin_submit()?;

    let outcome = RegistrationRepo::add(&state.pool, &registration).await;
    form.finish_submit(outcome.as_ref().copied());
    let id = outcome.map_err(AppError::operation(
        MSG_SUBMIT_FAILED,
        state.config.notice_clear_ms,
    ))?;

    tracing::info!(
        registration_id = %id,
        platinum_group = %registration.platinum_group,
        members = registration.new_friends.len(),
        "Registration created",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: SubmissionResponse {
                id,
                form: form.state().clone(),
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Admin reads
// ---------------------------------------------------------------------------

/// GET /api/v1/registrations
///
/// All registrations, newest first.
pub async fn list_registrations(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let registrations = RegistrationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: registrations,
    }))
}

/// GET /api/v1/registrations/unexported
pub async fn list_unexported(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let registrations = RegistrationRepo::list_unexported(&state.pool).await?;
    Ok(Json(DataResponse {
        data: registrations,
    }))
}

/// GET /api/v1/registrations/stats
///
/// Per-group counts (aggregated in the store) plus overall totals.
pub async fn registration_stats(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let by_group = RegistrationRepo::stats_by_group(&state.pool).await?;
    let registrations = RegistrationRepo::list(&state.pool).await?;
    Ok(Json(DataResponse {
        data: serde_json::json!({
            "by_group": by_group,
            "summary": summarize(&registrations),
        }),
    }))
}

/// GET /api/v1/registrations/{id}
pub async fn get_registration(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<impl IntoResponse> {
    let registration = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse { data: registration }))
}

// ---------------------------------------------------------------------------
// Admin mutations
// ---------------------------------------------------------------------------

/// PUT /api/v1/registrations/{id}
///
/// Edit group, leader and members. The stored record is snapshotted into a
/// draft, the submitted fields are applied to the draft, and the committed
/// draft is written back. Export fields are never touched. Concurrent edits
/// are last-write-wins.
pub async fn update_registration(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
    Json(input): Json<EditSubmission>,
) -> AppResult<impl IntoResponse> {
    let current = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;

    let mut draft = EditDraft::snapshot(&current);
    if let Some(group) = input.platinum_group.as_deref() {
        draft.set_platinum_group(group.parse()?);
    }
    if let Some(leader) = input.leader_name {
        draft.set_leader_name(leader);
    }
    if let Some(members) = input.new_friends {
        let members = members
            .into_iter()
            .map(MemberSubmission::into_member)
            .collect::<Result<Vec<_>, _>>()?;
        draft.replace_members(members)?;
    }
    let update = draft.commit()?;

    let updated = RegistrationRepo::update(&state.pool, id, &update)
        .await
        .map_err(AppError::operation(
            MSG_UPDATE_FAILED,
            state.config.notice_clear_ms,
        ))?
        .ok_or_else(|| not_found(id))?;

    tracing::info!(registration_id = %id, "Registration updated");

    Ok(Json(NoticeResponse {
        data: updated,
        notice: StatusNotice::success(MSG_UPDATED, state.config.notice_clear_ms),
    }))
}

/// GET /api/v1/registrations/{id}/delete-prompt
///
/// The confirmation text to show before deleting, naming the leader.
pub async fn delete_prompt(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<impl IntoResponse> {
    let registration = RegistrationRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(DataResponse {
        data: DeletePrompt {
            id,
            prompt: delete_confirmation_prompt(&registration.leader_name),
        },
    }))
}

/// DELETE /api/v1/registrations/{id}
///
/// Permanently delete a registration. Deleting a missing id succeeds.
pub async fn delete_registration(
    State(state): State<AppState>,
    Path(id): Path<DocId>,
) -> AppResult<impl IntoResponse> {
    let removed = RegistrationRepo::delete(&state.pool, id)
        .await
        .map_err(AppError::operation(
            MSG_DELETE_FAILED,
            state.config.notice_clear_ms,
        ))?;

    tracing::info!(registration_id = %id, removed, "Registration deleted");

    Ok(Json(NoticeResponse {
        data: DeleteResponse { id, removed },
        notice: StatusNotice::success(MSG_DELETED, state.config.notice_clear_ms),
    }))
}

/// POST /api/v1/registrations/mark-exported
///
/// Flag the listed registrations as exported. Repeating is harmless.
pub async fn mark_exported(
    State(state): State<AppState>,
    Json(input): Json<MarkExportedRequest>,
) -> AppResult<impl IntoResponse> {
    let updated = RegistrationRepo::mark_as_exported(&state.pool, &input.ids).await?;

    tracing::info!(requested = input.ids.len(), updated, "Registrations marked as exported");

    Ok(Json(DataResponse {
        data: MarkExportedResponse { updated },
    }))
}
