//! End-to-end tests through SeaORM on a temporary SQLite database

mod common;

use common::*;
use org_registry::contract::*;
use org_registry::domain::{
    plan_migration, AlreadyNormalized, NormalizationStore, NotNormalized, RollbackPlan,
};
use org_registry::infra::storage::{entity, SeaOrmNormalizationStore};
use org_registry::{Config, OrgRegistryModule};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection, EntityTrait, PaginatorTrait,
};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

struct TestDb {
    // Keeps the database file alive
    _dir: TempDir,
    conn: DatabaseConnection,
    module: OrgRegistryModule,
}

async fn setup() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("registry.db").display());
    let conn = Database::connect(&url).await.unwrap();

    let module = OrgRegistryModule::default();
    let config = Config {
        database_url: url,
        ..Default::default()
    };
    module
        .init_with_connection(config, conn.clone())
        .await
        .unwrap();

    TestDb {
        _dir: dir,
        conn,
        module,
    }
}

async fn row_counts(conn: &DatabaseConnection) -> (u64, u64) {
    let members = entity::member::Entity::find().count(conn).await.unwrap();
    let documents = entity::document::Entity::find().count(conn).await.unwrap();
    (members, documents)
}

#[tokio::test]
async fn test_legacy_content_survives_storage() {
    print_test_header(
        "test_legacy_content_survives_storage",
        &["Embedded content is read back exactly as registered"],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let org = junta_de_vecinos();

    let created = service.register_organization(org.clone()).await.unwrap();
    assert_eq!(created.legacy, org.legacy);

    let resolved = service
        .get_organization_with_members(org.id, IncludeOptions::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(resolved.organization.legacy, org.legacy);
    assert_eq!(resolved.organization.schema_version, SchemaVersion::Legacy);

    println!("✅ Legacy content round-tripped through SQLite");
}

#[tokio::test]
async fn test_migrate_and_rollback_through_sqlite() {
    print_test_header(
        "test_migrate_and_rollback_through_sqlite",
        &[
            "A full run writes the normalized rows, reads stay identical,",
            "and rollback removes exactly those rows",
        ],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let junta = service
        .register_organization(junta_de_vecinos())
        .await
        .unwrap();
    let club = service
        .register_organization(single_member_organization())
        .await
        .unwrap();

    let members_before = service.get_organization_members(junta.id).await.unwrap();
    let stats_before = service
        .get_organization_document_stats(junta.id)
        .await
        .unwrap()
        .unwrap();

    let summary = service
        .run_migration(&MigrationOptions {
            batch_size: 1,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.migrated, 2);
    assert_eq!(summary.errors, 0);
    assert_eq!(summary.members_created, 5);
    assert_eq!(summary.documents_created, 6);
    assert_eq!(row_counts(&db.conn).await, (5, 6));

    let members_after = service.get_organization_members(junta.id).await.unwrap();
    assert_eq!(
        members_before.iter().map(|m| m.rut.clone()).collect::<Vec<_>>(),
        members_after.iter().map(|m| m.rut.clone()).collect::<Vec<_>>()
    );
    let stats_after = service
        .get_organization_document_stats(junta.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stats_after.total_size_bytes, stats_before.total_size_bytes);
    assert_eq!(stats_after.document_count, stats_before.document_count);
    assert!(stats_after.is_normalized);

    assert_eq!(
        service.get_signature(junta.id, "ministro").await.unwrap(),
        Some(payload(200))
    );
    let board = service.get_provisional_board(junta.id).await.unwrap().unwrap();
    assert_eq!(
        board.treasurer.and_then(|t| t.rut),
        Some("44.444.444-4".to_string())
    );

    let rollback = service
        .run_rollback(&MigrationOptions::default())
        .await
        .unwrap();
    assert_eq!(rollback.rolled_back, 2);
    assert_eq!(rollback.members_deleted, 5);
    assert_eq!(rollback.documents_deleted, 6);
    assert_eq!(row_counts(&db.conn).await, (0, 0));

    let reverted = service
        .get_organization_with_members(club.id, IncludeOptions::default())
        .await
        .unwrap()
        .unwrap();
    assert!(!reverted.organization.is_normalized);
    assert!(reverted.organization.member_ids.is_empty());
    assert_eq!(reverted.members.len(), 1);

    println!("✅ SQLite round trip complete");
}

/// Accessor views with row ids cleared, sorted so they compare as sets
fn view_set(views: Vec<MemberView>) -> Vec<String> {
    let mut set: Vec<String> = views
        .into_iter()
        .map(|mut view| {
            view.id = None;
            format!("{:?}", view)
        })
        .collect();
    set.sort();
    set
}

#[tokio::test]
async fn test_remigration_after_rollback_is_equivalent() {
    print_test_header(
        "test_remigration_after_rollback_is_equivalent",
        &["Migrating again after a rollback yields the same views and stats"],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let org = service
        .register_organization(junta_de_vecinos())
        .await
        .unwrap();

    service.migrate_organization(org.id, false).await.unwrap();
    let first_members = view_set(service.get_organization_members(org.id).await.unwrap());
    let first_commission = view_set(service.get_electoral_commission(org.id).await.unwrap());
    let first_stats = service
        .get_organization_document_stats(org.id)
        .await
        .unwrap()
        .unwrap();

    service.rollback_organization(org.id, false).await.unwrap();
    assert_eq!(row_counts(&db.conn).await, (0, 0));
    service.migrate_organization(org.id, false).await.unwrap();

    assert_eq!(
        view_set(service.get_organization_members(org.id).await.unwrap()),
        first_members
    );
    assert_eq!(
        view_set(service.get_electoral_commission(org.id).await.unwrap()),
        first_commission
    );
    let second_stats = service
        .get_organization_document_stats(org.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(second_stats, first_stats);
    assert_eq!(row_counts(&db.conn).await, (4, 5));

    println!("✅ Re-migration reproduced the first migration");
}

#[tokio::test]
async fn test_unreadable_record_fails_alone() {
    print_test_header(
        "test_unreadable_record_fails_alone",
        &["A record whose stored content cannot be mapped does not fail its batch"],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let good = service
        .register_organization(single_member_organization())
        .await
        .unwrap();
    let bad = service
        .register_organization(single_member_organization())
        .await
        .unwrap();

    let mut stored: entity::ActiveModel = entity::Entity::find_by_id(bad.id)
        .one(&db.conn)
        .await
        .unwrap()
        .unwrap()
        .into();
    stored.legacy_content = Set(json!("not an object"));
    stored.update(&db.conn).await.unwrap();

    let summary = service
        .run_migration(&MigrationOptions {
            batch_size: 10,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.migrated, 1);
    assert_eq!(summary.errors, 1);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].organization_id, bad.id);
    assert!(summary.failures[0].error.contains("malformed legacy content"));

    let migrated = entity::Entity::find_by_id(good.id)
        .one(&db.conn)
        .await
        .unwrap()
        .unwrap();
    assert!(migrated.is_normalized);
    assert_eq!(row_counts(&db.conn).await, (1, 1));

    println!("✅ Only the unreadable record failed");
}

#[tokio::test]
async fn test_failed_insert_leaves_no_partial_rows() {
    print_test_header(
        "test_failed_insert_leaves_no_partial_rows",
        &["A unique-rut violation mid-transaction rolls back every row"],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let org = service
        .register_organization(junta_de_vecinos())
        .await
        .unwrap();

    let mut plan = plan_migration(&org, chrono::Utc::now());
    let duplicate = Member {
        id: Uuid::new_v4(),
        ..plan.members[0].clone()
    };
    plan.members.push(duplicate);

    let store = SeaOrmNormalizationStore::new(Arc::new(db.conn.clone()));
    assert!(store.commit_migration(&plan).await.is_err());

    assert_eq!(row_counts(&db.conn).await, (0, 0));
    let stored = entity::Entity::find_by_id(org.id)
        .one(&db.conn)
        .await
        .unwrap()
        .unwrap();
    assert!(!stored.is_normalized);
    assert_eq!(stored.schema_version, 1);

    println!("✅ Transaction rolled back");
}

#[tokio::test]
async fn test_conditional_flag_update() {
    print_test_header(
        "test_conditional_flag_update",
        &[
            "A second commit for a normalized organization reports AlreadyNormalized",
            "and a rollback of a legacy organization reports NotNormalized",
        ],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let org = service
        .register_organization(Organization::new_legacy(
            "Junta de Vecinos El Roble",
            LegacyContent {
                ministro_signature: Some(payload(220)),
                ..Default::default()
            },
        ))
        .await
        .unwrap();
    let store = SeaOrmNormalizationStore::new(Arc::new(db.conn.clone()));

    let rollback = store
        .commit_rollback(&RollbackPlan::for_organization(&org))
        .await
        .unwrap_err();
    assert!(rollback.downcast_ref::<NotNormalized>().is_some());

    store
        .commit_migration(&plan_migration(&org, chrono::Utc::now()))
        .await
        .unwrap();
    let again = store
        .commit_migration(&plan_migration(&org, chrono::Utc::now()))
        .await
        .unwrap_err();
    assert!(again.downcast_ref::<AlreadyNormalized>().is_some());
    assert_eq!(row_counts(&db.conn).await, (0, 1));

    println!("✅ Conditional updates enforced");
}

#[tokio::test]
async fn test_document_size_is_derived_on_save() {
    print_test_header(
        "test_document_size_is_derived_on_save",
        &["Stored size always matches floor(len * 3 / 4) of the stored content"],
    );

    let db = setup().await;
    let service = db.module.service().unwrap();
    let org = service
        .register_organization(single_member_organization())
        .await
        .unwrap();
    service.migrate_organization(org.id, false).await.unwrap();

    let documents = entity::document::Entity::find().all(&db.conn).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].size, 135);
    assert_eq!(documents[0].size, (documents[0].content.len() as i64 * 3) / 4);

    println!("✅ Size derived from content");
}
