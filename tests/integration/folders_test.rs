//! Folder lifecycle over HTTP.

use axum::http::StatusCode;
use serde_json::json;

use mediahub_core::types::FolderId;
use mediahub_database::FolderCatalog;
use mediahub_entity::video::CreateVideo;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_requests_without_token_are_rejected() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/folders", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/folders", None, Some("not-a-token"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_owner_lists_default_folder() {
    let app = TestApp::new();
    let bob = app.owner("bob");

    let response = app
        .request("GET", "/api/folders", None, Some(&bob.token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let folders = response.body["data"].as_array().expect("list expected");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["name"], "bob");
    assert_eq!(folders[0]["is_default"], true);
    assert!(app.catalog.all_folders().is_empty());
}

#[tokio::test]
async fn test_create_folder_makes_directory() {
    let app = TestApp::new();
    let bob = app.owner("bob");

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "  holidays " })),
            Some(&bob.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["name"], "holidays");
    assert_eq!(response.body["data"]["is_default"], false);
    assert_eq!(
        response.body["data"]["server_id"],
        json!(app.server_id.to_string())
    );
    assert!(app.folder_path(&bob.login, "holidays").is_dir());

    let list = app
        .request("GET", "/api/folders", None, Some(&bob.token))
        .await;
    let folders = list.body["data"].as_array().expect("list expected");
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0]["name"], "holidays");
}

#[tokio::test]
async fn test_create_rejects_bad_names() {
    let app = TestApp::new();
    let bob = app.owner("bob");

    for name in ["", "   ", "a/b", "..", "x\0y"] {
        let response = app
            .request(
                "POST",
                "/api/folders",
                Some(json!({ "name": name })),
                Some(&bob.token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "name {name:?}");
        assert_eq!(response.body["error"], "VALIDATION_ERROR");
    }

    assert!(app.catalog.all_folders().is_empty());
}

#[tokio::test]
async fn test_create_duplicate_is_conflict() {
    let app = TestApp::new();
    let bob = app.owner("bob");
    app.create_folder(&bob, "news").await;

    let response = app
        .request(
            "POST",
            "/api/folders",
            Some(json!({ "name": "news" })),
            Some(&bob.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(app.catalog.all_folders().len(), 1);
}

#[tokio::test]
async fn test_rename_moves_directory_and_video_paths() {
    let app = TestApp::new();
    let bob = app.owner("bob");
    let id = app.create_folder(&bob, "alpha").await;
    let folder_id: FolderId = id.parse().expect("uuid");

    app.catalog
        .insert_video(&CreateVideo {
            owner_id: bob.id,
            folder_id,
            name: "intro.mp4".into(),
            path: "/content/bob/alpha/intro.mp4".into(),
            url: "http://media:1935/vod/bob/alpha/intro.mp4".into(),
        })
        .await
        .expect("video");

    let response = app
        .request(
            "PUT",
            &format!("/api/folders/{id}"),
            Some(json!({ "name": "beta" })),
            Some(&bob.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["data"]["old_name"], "alpha");
    assert_eq!(response.body["data"]["new_name"], "beta");
    assert!(!app.folder_path(&bob.login, "alpha").exists());
    assert!(app.folder_path(&bob.login, "beta").is_dir());

    let videos = app.catalog.all_videos();
    assert_eq!(videos[0].path, "/content/bob/beta/intro.mp4");
    assert_eq!(videos[0].url, "http://media:1935/vod/bob/beta/intro.mp4");
}

#[tokio::test]
async fn test_rename_keeps_directory_contents() {
    let app = TestApp::new();
    let bob = app.owner("bob");
    let id = app.create_folder(&bob, "alpha").await;
    std::fs::write(app.folder_path(&bob.login, "alpha").join("clip.mp4"), b"x")
        .expect("write clip");

    let response = app
        .request(
            "PUT",
            &format!("/api/folders/{id}"),
            Some(json!({ "name": "gamma" })),
            Some(&bob.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(app.folder_path(&bob.login, "gamma").join("clip.mp4").is_file());
}

#[tokio::test]
async fn test_delete_removes_directory_and_record() {
    let app = TestApp::new();
    let bob = app.owner("bob");
    let keep = app.create_folder(&bob, "keep").await;
    let id = app.create_folder(&bob, "drop").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/folders/{id}"),
            None,
            Some(&bob.token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["id"], json!(id));
    assert!(!app.folder_path(&bob.login, "drop").exists());
    assert!(app.folder_path(&bob.login, "keep").is_dir());

    let folders = app.catalog.all_folders();
    assert_eq!(folders.len(), 1);
    assert_eq!(folders[0].id.to_string(), keep);

    let again = app
        .request(
            "DELETE",
            &format!("/api/folders/{id}"),
            None,
            Some(&bob.token),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_other_owner_cannot_touch_folder() {
    let app = TestApp::new();
    let bob = app.owner("bob");
    let mallory = app.owner("mallory");
    let id = app.create_folder(&bob, "private").await;

    let rename = app
        .request(
            "PUT",
            &format!("/api/folders/{id}"),
            Some(json!({ "name": "mine" })),
            Some(&mallory.token),
        )
        .await;
    assert_eq!(rename.status, StatusCode::NOT_FOUND);

    let delete = app
        .request(
            "DELETE",
            &format!("/api/folders/{id}"),
            None,
            Some(&mallory.token),
        )
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    assert!(app.folder_path(&bob.login, "private").is_dir());
    assert_eq!(app.catalog.all_folders()[0].name, "private");
}

#[tokio::test]
async fn test_malformed_folder_id_is_bad_request() {
    let app = TestApp::new();
    let bob = app.owner("bob");

    let response = app
        .request("DELETE", "/api/folders/not-a-uuid", None, Some(&bob.token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
