//! Repository for the `registrations` table.
//!
//! Ordering is always newest first. Export flags are only ever written by
//! [`RegistrationRepo::mark_as_exported`]; the edit path cannot touch them.

use std::collections::BTreeMap;

use gathering_core::registration::{Member, Registration};
use gathering_core::stats::GroupStats;
use gathering_core::types::DocId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::registration::{NewRegistration, RegistrationRow, UpdateRegistration};

/// Column list for `registrations` queries.
const COLUMNS: &str = "\
    id, platinum_group, leader_name, new_friends, exported_to_sheet, \
    exported_at, created_at, updated_at";

/// Provides data access for registrations.
pub struct RegistrationRepo;

impl RegistrationRepo {
    /// Insert a new registration and return its generated id.
    ///
    /// `created_at` and `updated_at` are both stamped with the same `now()`;
    /// `exported_to_sheet` starts out false.
    pub async fn add(pool: &PgPool, dto: &NewRegistration) -> Result<DocId, sqlx::Error> {
        let id: DocId = sqlx::query_scalar(
            "INSERT INTO registrations (platinum_group, leader_name, new_friends) \
             VALUES ($1, $2, $3) \
             RETURNING id",
        )
        .bind(dto.platinum_group.as_str())
        .bind(&dto.leader_name)
        .bind(Json(&dto.new_friends))
        .fetch_one(pool)
        .await?;

        tracing::debug!(registration_id = %id, "Registration row inserted");
        Ok(id)
    }

    /// All registrations, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Registration>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM registrations ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query_as::<_, RegistrationRow>(&query)
            .fetch_all(pool)
            .await?;
        Ok(rows.into_iter().map(Registration::from).collect())
    }

    /// Registrations not yet exported, newest first.
    ///
    /// Fetches everything and filters in memory.
    pub async fn list_unexported(pool: &PgPool) -> Result<Vec<Registration>, sqlx::Error> {
        let mut all = Self::list(pool).await?;
        all.retain(|r| !r.exported_to_sheet);
        Ok(all)
    }

    /// Find a single registration by id.
    pub async fn find_by_id(pool: &PgPool, id: DocId) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM registrations WHERE id = $1");
        let row = sqlx::query_as::<_, RegistrationRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Registration::from))
    }

    /// Flag registrations as exported in a single statement.
    ///
    /// The whole id set is updated atomically. `exported_at` keeps its first
    /// value if a row is marked again, so repeating the call is harmless.
    /// Unknown ids are skipped. Returns the number of rows updated.
    pub async fn mark_as_exported(pool: &PgPool, ids: &[DocId]) -> Result<u64, sqlx::Error> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query(
            "UPDATE registrations SET \
                 exported_to_sheet = TRUE, \
                 exported_at = COALESCE(exported_at, now()), \
                 updated_at = now() \
             WHERE id = ANY($1)",
        )
        .bind(ids)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Merge the supplied editable fields and refresh `updated_at`.
    ///
    /// Uses `COALESCE` so only provided fields are changed. Returns `None`
    /// if the registration does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DocId,
        dto: &UpdateRegistration,
    ) -> Result<Option<Registration>, sqlx::Error> {
        let query = format!(
            "UPDATE registrations SET \
                 platinum_group = COALESCE($2, platinum_group), \
                 leader_name = COALESCE($3, leader_name), \
                 new_friends = COALESCE($4, new_friends), \
                 updated_at = now() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query_as::<_, RegistrationRow>(&query)
            .bind(id)
            .bind(dto.platinum_group.map(|g| g.as_str()))
            .bind(dto.leader_name.as_deref())
            .bind(dto.new_friends.as_deref().map(Json::<&[Member]>))
            .fetch_optional(pool)
            .await?;
        Ok(row.map(Registration::from))
    }

    /// Permanently delete a registration.
    ///
    /// There is no existence check: deleting a missing id succeeds. The
    /// return value only says whether a row was removed.
    pub async fn delete(pool: &PgPool, id: DocId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Registration and member counts per platinum group, aggregated in
    /// the store. Groups without registrations are absent.
    pub async fn stats_by_group(
        pool: &PgPool,
    ) -> Result<BTreeMap<String, GroupStats>, sqlx::Error> {
        let query = "\
            SELECT \
                platinum_group, \
                COUNT(*)::BIGINT AS count, \
                COALESCE(SUM(jsonb_array_length(new_friends)), 0)::BIGINT AS total_friends \
            FROM registrations \
            GROUP BY platinum_group";
        let rows = sqlx::query_as::<_, (String, i64, i64)>(query)
            .fetch_all(pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(group, count, total_friends)| {
                let stats = GroupStats {
                    count: count.max(0) as usize,
                    total_friends: total_friends.max(0) as usize,
                };
                (group, stats)
            })
            .collect())
    }
}
