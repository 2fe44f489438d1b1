//! Integration tests for the registration repository.
//!
//! Exercises the store adapter against a real database:
//! - Create and list ordering
//! - Unexported filtering and export marking (idempotence, atomic batch)
//! - Partial update leaves export fields untouched
//! - Delete of present and missing ids
//! - Table constraints backing the domain invariants

use gathering_core::registration::{
    Gender, Member, NewRegistration, PlatinumGroup, UpdateRegistration,
};
use gathering_db::repositories::RegistrationRepo;
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn new_registration(
    group: PlatinumGroup,
    leader: &str,
    friends: &[(&str, Gender)],
) -> NewRegistration {
    NewRegistration {
        platinum_group: group,
        leader_name: leader.to_string(),
        new_friends: friends
            .iter()
            .map(|(name, gender)| Member::new(*name, *gender))
            .collect(),
    }
}

fn sample() -> NewRegistration {
    new_registration(PlatinumGroup::Yanchun, "王小明", &[("陳小華", Gender::Male)])
}

// ---------------------------------------------------------------------------
// Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn add_stamps_defaults(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();

    let reg = RegistrationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(reg.platinum_group, "彥淳小組");
    assert_eq!(reg.leader_name, "王小明");
    assert_eq!(reg.new_friends.len(), 1);
    assert_eq!(reg.new_friends[0].name, "陳小華");
    assert_eq!(reg.new_friends[0].gender, Gender::Male);
    assert!(!reg.exported_to_sheet);
    assert!(reg.exported_at.is_none());
    assert_eq!(reg.created_at, reg.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn list_is_newest_first(pool: PgPool) {
    let first = RegistrationRepo::add(&pool, &sample()).await.unwrap();
    let second = RegistrationRepo::add(
        &pool,
        &new_registration(PlatinumGroup::Evans, "Evans", &[("Amy", Gender::Female)]),
    )
    .await
    .unwrap();

    let all = RegistrationRepo::list(&pool).await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, second);
    assert_eq!(all[1].id, first);
}

#[sqlx::test(migrations = "./migrations")]
async fn find_missing_returns_none(pool: PgPool) {
    let found = RegistrationRepo::find_by_id(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Export marking
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn unexported_excludes_marked(pool: PgPool) {
    let a = RegistrationRepo::add(&pool, &sample()).await.unwrap();
    let b = RegistrationRepo::add(&pool, &sample()).await.unwrap();

    RegistrationRepo::mark_as_exported(&pool, &[a]).await.unwrap();

    let unexported = RegistrationRepo::list_unexported(&pool).await.unwrap();
    assert_eq!(unexported.len(), 1);
    assert_eq!(unexported[0].id, b);
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_as_exported_is_idempotent(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();

    let first = RegistrationRepo::mark_as_exported(&pool, &[id]).await.unwrap();
    let after_first = RegistrationRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    let second = RegistrationRepo::mark_as_exported(&pool, &[id]).await.unwrap();
    let after_second = RegistrationRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    assert_eq!(first, 1);
    assert_eq!(second, 1);
    assert!(after_second.exported_to_sheet);
    assert!(after_first.exported_at.is_some());
    assert_eq!(after_first.exported_at, after_second.exported_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_as_exported_ignores_unknown_ids(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();

    let updated = RegistrationRepo::mark_as_exported(&pool, &[id, uuid::Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(updated, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn mark_as_exported_empty_set_is_noop(pool: PgPool) {
    RegistrationRepo::add(&pool, &sample()).await.unwrap();
    assert_eq!(RegistrationRepo::mark_as_exported(&pool, &[]).await.unwrap(), 0);
    assert_eq!(RegistrationRepo::list_unexported(&pool).await.unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn update_merges_fields_and_keeps_export_flags(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();
    RegistrationRepo::mark_as_exported(&pool, &[id]).await.unwrap();
    let before = RegistrationRepo::find_by_id(&pool, id).await.unwrap().unwrap();

    let update = UpdateRegistration {
        leader_name: Some("李大同".to_string()),
        ..Default::default()
    };
    let after = RegistrationRepo::update(&pool, id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.leader_name, "李大同");
    assert_eq!(after.platinum_group, before.platinum_group);
    assert_eq!(after.new_friends, before.new_friends);
    assert!(after.exported_to_sheet);
    assert_eq!(after.exported_at, before.exported_at);
    assert_eq!(after.created_at, before.created_at);
    assert!(after.updated_at >= before.updated_at);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_replaces_member_list(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();

    let members = vec![
        Member::new("林小美", Gender::Female),
        Member::new("張大千", Gender::Male),
    ];
    let update = UpdateRegistration {
        platinum_group: Some(PlatinumGroup::Wenyan),
        new_friends: Some(members.clone()),
        ..Default::default()
    };
    let after = RegistrationRepo::update(&pool, id, &update)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(after.platinum_group, "文硯小組");
    assert_eq!(after.new_friends, members);
}

#[sqlx::test(migrations = "./migrations")]
async fn update_missing_returns_none(pool: PgPool) {
    let result = RegistrationRepo::update(
        &pool,
        uuid::Uuid::new_v4(),
        &UpdateRegistration::default(),
    )
    .await
    .unwrap();
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn delete_removes_row(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();
    assert!(RegistrationRepo::delete(&pool, id).await.unwrap());
    assert!(RegistrationRepo::find_by_id(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn delete_missing_is_not_an_error(pool: PgPool) {
    let removed = RegistrationRepo::delete(&pool, uuid::Uuid::new_v4())
        .await
        .unwrap();
    assert!(!removed);
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn stats_by_group_counts_members(pool: PgPool) {
    RegistrationRepo::add(&pool, &sample()).await.unwrap();
    RegistrationRepo::add(
        &pool,
        &new_registration(
            PlatinumGroup::Yanchun,
            "王小明",
            &[("甲", Gender::Male), ("乙", Gender::Female)],
        ),
    )
    .await
    .unwrap();

    let stats = RegistrationRepo::stats_by_group(&pool).await.unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats["彥淳小組"].count, 2);
    assert_eq!(stats["彥淳小組"].total_friends, 3);
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_by_group_separates_groups(pool: PgPool) {
    RegistrationRepo::add(&pool, &sample()).await.unwrap();
    RegistrationRepo::add(
        &pool,
        &new_registration(PlatinumGroup::Zhihong, "李大同", &[("丁", Gender::Female)]),
    )
    .await
    .unwrap();

    let stats = RegistrationRepo::stats_by_group(&pool).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats["治宏小組"].count, 1);
    assert_eq!(stats["治宏小組"].total_friends, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn stats_by_group_empty_store(pool: PgPool) {
    let stats = RegistrationRepo::stats_by_group(&pool).await.unwrap();
    assert!(stats.is_empty());
}

// ---------------------------------------------------------------------------
// Constraints
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "./migrations")]
async fn empty_member_list_rejected_by_store(pool: PgPool) {
    let dto = new_registration(PlatinumGroup::Yanchun, "王小明", &[]);
    assert!(RegistrationRepo::add(&pool, &dto).await.is_err());
}

#[sqlx::test(migrations = "./migrations")]
async fn exported_at_requires_exported_flag(pool: PgPool) {
    let id = RegistrationRepo::add(&pool, &sample()).await.unwrap();
    let result = sqlx::query("UPDATE registrations SET exported_at = now() WHERE id = $1")
        .bind(id)
        .execute(&pool)
        .await;
    assert!(result.is_err());
}
