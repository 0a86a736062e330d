//! REST surface tests: routes, DTO shapes and Problem Details

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use common::*;
use org_registry::api::rest::routes::register_routes;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

fn router(store: &Arc<MockStore>) -> Router {
    register_routes(Router::new(), Arc::new(store.service())).unwrap()
}

async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn test_unknown_organization_is_problem_404() {
    print_test_header(
        "test_unknown_organization_is_problem_404",
        &["Missing organizations answer with RFC 9457 Problem Details"],
    );

    let store = MockStore::new();
    let missing = Uuid::new_v4();

    let (status, body) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}", missing),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert_eq!(body["title"], "organization Not Found");
    assert_eq!(body["instance"], format!("/organizations/{}", missing));

    println!("✅ 404 Problem returned");
}

#[tokio::test]
async fn test_organization_with_signatures() {
    print_test_header(
        "test_organization_with_signatures",
        &["include_signatures attaches payloads; the default omits them"],
    );

    let store = MockStore::new();
    let org_id = store.seed(junta_de_vecinos());

    let (status, plain) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(plain["organization"]["schema_version"], 1);
    assert_eq!(plain["organization"]["is_normalized"], false);
    assert_eq!(plain["members"].as_array().unwrap().len(), 3);

    store.service().migrate_organization(org_id, false).await.unwrap();

    let (status, signed) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}?include_signatures=true", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signed["organization"]["schema_version"], 2);
    let ana = &signed["members"][0];
    assert_eq!(ana["rut"], "11.111.111-1");
    assert_eq!(ana["signature"], payload(180));
    assert!(ana.get("certificate").is_none());

    println!("✅ Organization DTO shaped per request");
}

#[tokio::test]
async fn test_member_lists() {
    print_test_header(
        "test_member_lists",
        &["Member and commission endpoints wrap lists with a total"],
    );

    let store = MockStore::new();
    let org_id = store.seed(junta_de_vecinos());

    let (status, members) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/members", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(members["total"], 4);
    assert_eq!(members["items"][1]["role"], "secretary");

    let (_, commission) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/electoral-commission", org_id),
        None,
    )
    .await;
    assert_eq!(commission["total"], 2);
    assert_eq!(commission["items"][1]["role"], "electoral_commission");

    println!("✅ Member lists served");
}

#[tokio::test]
async fn test_signature_and_stats_endpoints() {
    print_test_header(
        "test_signature_and_stats_endpoints",
        &["Keyed signatures resolve or 404; stats report decoded sizes"],
    );

    let store = MockStore::new();
    let org_id = store.seed(junta_de_vecinos());

    let (status, signature) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/signatures/ministro", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(signature["key"], "ministro");
    assert_eq!(signature["content"], payload(200));

    let (status, missing) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/signatures/tesorero", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        missing["instance"],
        format!("/organizations/{}/signatures/tesorero", org_id)
    );

    let (status, stats) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/document-stats", org_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_size_bytes"], 592);
    assert_eq!(stats["document_count"], 5);
    assert_eq!(stats["schema_version"], 1);

    let (_, board) = send(
        router(&store),
        Method::GET,
        &format!("/organizations/{}/provisional-board", org_id),
        None,
    )
    .await;
    assert_eq!(board["president"]["rut"], "11.111.111-1");
    assert!(board["secretary"].is_null());
    assert!(board.get("unassigned").is_none());

    println!("✅ Signature, stats and board endpoints served");
}

#[tokio::test]
async fn test_admin_normalization_endpoints() {
    print_test_header(
        "test_admin_normalization_endpoints",
        &[
            "Dry run reports counters without writing, a real run migrates,",
            "rollback reverts, and batch_size 0 is rejected",
        ],
    );

    let store = MockStore::new();
    let org_id = store.seed(junta_de_vecinos());

    let (status, dry) = send(
        router(&store),
        Method::POST,
        "/admin/normalization",
        Some(json!({ "dry_run": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dry["dry_run"], true);
    assert_eq!(dry["migrated"], 1);
    assert_eq!(dry["members_created"], 4);
    assert_eq!(store.member_count(), 0);

    let (status, real) = send(
        router(&store),
        Method::POST,
        "/admin/normalization",
        Some(json!({ "organization_id": org_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(real["documents_created"], 5);
    assert!(store.organization(org_id).is_normalized);

    let (status, rollback) = send(
        router(&store),
        Method::POST,
        "/admin/normalization/rollback",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rollback["rolled_back"], 1);
    assert_eq!(rollback["members_deleted"], 4);

    let (status, invalid) = send(
        router(&store),
        Method::POST,
        "/admin/normalization",
        Some(json!({ "batch_size": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid["title"], "Validation Error");

    println!("✅ Admin endpoints drive the engine");
}

#[tokio::test]
async fn test_openapi_document_lists_schemas() {
    print_test_header(
        "test_openapi_document_lists_schemas",
        &["The OpenAPI document exposes the DTO schemas"],
    );

    let store = MockStore::new();
    let (status, doc) = send(router(&store), Method::GET, "/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["components"]["schemas"]["MemberDto"].is_object());
    assert!(doc["components"]["schemas"]["MigrationSummaryDto"].is_object());

    println!("✅ OpenAPI document served");
}
