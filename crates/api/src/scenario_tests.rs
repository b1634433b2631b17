//! End-to-end router flows over a scripted `MockDatabase`.
//!
//! Each test queues the rows the repositories will read, in call order, and
//! drives the router through the same requests a client would send.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{Router, http::StatusCode};
use chrono::Utc;
use herkey_core::storage::{StorageConfig, StorageProvider, StorageService};
use herkey_db::entities::{
    event_attachments, event_participants, events,
    sea_orm_active_enums::{AttachmentType, EventStatus, EventType, ParticipantType},
    users,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use crate::AppState;
use crate::create_router;
use crate::test_support::{bearer, body_json, json_request, send, state_with_db};

const HOST_ID: i32 = 1;

/// Row returned by `SELECT COUNT(*) AS num_items`.
fn count(n: i64) -> BTreeMap<&'static str, Value> {
    BTreeMap::from([("num_items", Value::BigInt(Some(n)))])
}

fn deleted(rows_affected: u64) -> MockExecResult {
    MockExecResult {
        last_insert_id: 0,
        rows_affected,
    }
}

fn event_row(id: Uuid) -> events::Model {
    let now = Utc::now().fixed_offset();
    events::Model {
        id,
        title: "Launch".to_string(),
        description: None,
        status: EventStatus::Active,
        activate_date: Some(now),
        deactivate_date: None,
        event_type: EventType::Live,
        scheduled_date: None,
        active: true,
        stream_session_id: None,
        created: now,
        modified: now,
    }
}

fn host_row(event_id: Uuid) -> event_participants::Model {
    let now = Utc::now().fixed_offset();
    event_participants::Model {
        id: Uuid::now_v7(),
        event_id,
        user_id: HOST_ID,
        active: true,
        participant_type: ParticipantType::Host,
        created: now,
        modified: now,
    }
}

fn banner_row(event_id: Uuid, cloud_id: &str) -> event_attachments::Model {
    let now = Utc::now().fixed_offset();
    event_attachments::Model {
        id: Uuid::now_v7(),
        event_id,
        attachment_cloud_id: Some(cloud_id.to_string()),
        attachment_name: Some("logo.png".to_string()),
        attachment_type: AttachmentType::Banner,
        active: true,
        created: now,
        modified: now,
    }
}

fn user_row(id: i32, username: &str) -> users::Model {
    users::Model {
        id,
        username: username.to_string(),
        email: format!("{username}@herkey.test"),
        first_name: String::new(),
        last_name: String::new(),
        password_hash: "$argon2id$stored".to_string(),
        is_active: true,
        date_joined: Utc::now().fixed_offset(),
    }
}

fn minio() -> Arc<StorageService> {
    let storage = StorageService::from_config(StorageConfig::new(StorageProvider::s3(
        Some("http://127.0.0.1:9000".to_string()),
        "herkey-media",
        "minio",
        "minio-secret",
        "us-east-1",
    )))
    .unwrap();
    Arc::new(storage)
}

fn router_over(db: DatabaseConnection) -> (Router, AppState) {
    let state = AppState {
        storage: Some(minio()),
        ..state_with_db(db)
    };
    (create_router(state.clone()), state)
}

#[tokio::test]
async fn test_event_create_then_delete_twice() {
    let event_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // INSERT ... RETURNING
        .append_query_results([vec![event_row(event_id)]])
        // GET after delete
        .append_query_results([Vec::<events::Model>::new()])
        .append_exec_results([deleted(1), deleted(0)])
        .into_connection();
    let (router, state) = router_over(db);
    let auth = bearer(&state, HOST_ID);

    let response = send(
        router.clone(),
        json_request(
            "POST",
            "/api/events",
            Some(&auth),
            r#"{"title": "Launch", "type": "LIVE"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], event_id.to_string());
    assert_eq!(created["status"], "ACTIVE");
    assert_eq!(created["type"], "LIVE");
    assert_eq!(created["participants"], serde_json::json!([]));

    let delete_body = format!(r#"{{"id": "{event_id}"}}"#);
    let response = send(
        router.clone(),
        json_request("DELETE", "/api/events", Some(&auth), &delete_body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        router.clone(),
        json_request("DELETE", "/api/events", Some(&auth), &delete_body),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "NOT_FOUND");

    let response = send(
        router,
        json_request("GET", &format!("/api/events/{event_id}"), Some(&auth), ""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_host_uploads_one_banner_and_second_conflicts() {
    let event_id = Uuid::now_v7();

    // Event and host registration.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![event_row(event_id)]])
        .append_query_results([vec![count(1)], vec![count(1)]])
        .append_query_results([vec![host_row(event_id)]])
        .into_connection();
    let (router, state) = router_over(db);
    let auth = bearer(&state, HOST_ID);

    let response = send(
        router.clone(),
        json_request(
            "POST",
            "/api/events",
            Some(&auth),
            r#"{"title": "Launch", "type": "LIVE"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = send(
        router.clone(),
        json_request(
            "POST",
            "/api/event-participants",
            Some(&auth),
            &format!(r#"{{"event": "{event_id}", "type": "HOST"}}"#),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let participant = body_json(response).await;
    assert_eq!(participant["type"], "HOST");
    assert_eq!(participant["user_id"], HOST_ID);

    let response = send(
        router,
        json_request(
            "POST",
            "/api/event-attachments/get_pre_signed_url",
            Some(&auth),
            r#"{"file_name": "logo.png"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let target = body_json(response).await;
    let cloud_id = target["cloud_id"].as_str().unwrap().to_string();
    assert!(cloud_id.starts_with("event_attachments/logo_"));

    // Banner uploads: the first finds no banner, the second finds one.
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count(1)], vec![count(0)]])
        .append_query_results([vec![banner_row(event_id, &cloud_id)]])
        .append_query_results([vec![count(1)], vec![count(1)]])
        .into_connection();
    let (router, _) = router_over(db);
    let banner = format!(
        r#"{{"event": "{event_id}", "attachment_cloud_id": "{cloud_id}", "attachment_name": "logo.png", "type": "BANNER"}}"#
    );

    let response = send(
        router.clone(),
        json_request("POST", "/api/event-attachments", Some(&auth), &banner),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let attachment = body_json(response).await;
    assert_eq!(attachment["type"], "BANNER");
    assert!(
        attachment["signed_url"]
            .as_str()
            .unwrap()
            .contains(&cloud_id)
    );

    let response = send(
        router,
        json_request("POST", "/api/event-attachments", Some(&auth), &banner),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "CONFLICT");
}

#[tokio::test]
async fn test_host_gets_publisher_rtc_token() {
    let event_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count(1)]])
        .append_query_results([vec![host_row(event_id)]])
        .into_connection();
    let (router, state) = router_over(db);
    let auth = bearer(&state, HOST_ID);

    let response = send(
        router,
        json_request(
            "POST",
            "/api/agora-token",
            Some(&auth),
            &format!(r#"{{"event_id": "{event_id}"}}"#),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let token = body_json(response).await;
    assert_eq!(token["role"], 1);
    assert_eq!(token["uid"], HOST_ID);
    assert_eq!(token["channel_name"], event_id.to_string());
    assert!(token["token"].as_str().unwrap().starts_with("006"));
}

#[tokio::test]
async fn test_non_participant_gets_no_token() {
    let event_id = Uuid::now_v7();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![count(1)]])
        .append_query_results([Vec::<event_participants::Model>::new()])
        .into_connection();
    let (router, state) = router_over(db);
    let auth = bearer(&state, 2);

    let response = send(
        router,
        json_request(
            "POST",
            "/api/agora-token",
            Some(&auth),
            &format!(r#"{{"event_id": "{event_id}"}}"#),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_user_patch_then_delete() {
    let stored = user_row(2, "guest");
    let updated = users::Model {
        last_name: "Guest".to_string(),
        ..stored.clone()
    };
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        // find_user, then UPDATE ... RETURNING
        .append_query_results([vec![stored], vec![updated]])
        .append_exec_results([deleted(1), deleted(0)])
        .into_connection();
    let (router, state) = router_over(db);
    let auth = bearer(&state, HOST_ID);

    let response = send(
        router.clone(),
        json_request(
            "PATCH",
            "/api/users/2",
            Some(&auth),
            r#"{"last_name": "Guest"}"#,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["last_name"], "Guest");
    assert_eq!(body["username"], "guest");
    assert!(body.get("password_hash").is_none());

    let response = send(
        router.clone(),
        json_request("DELETE", "/api/users/2", Some(&auth), ""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        router,
        json_request("DELETE", "/api/users/2", Some(&auth), ""),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
