//! Integration tests for the HTTP API
//!
//! Drives the full router with `tower::ServiceExt::oneshot` against a
//! temporary database: auth flow, role and ownership gates, rating flow,
//! and cascade deletion through the admin route.

use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;
use tower::util::ServiceExt;
use tunehub_common::db::songs::{self, NewSong};
use tunehub_common::db::users;
use tunehub_web::{build_router, AppState};

struct TestApp {
    router: Router,
    db: SqlitePool,
    // Held so the root folder outlives the test
    _root: TempDir,
}

async fn test_app() -> TestApp {
    let root = TempDir::new().unwrap();
    let db = tunehub_common::db::init_database(&root.path().join("tunehub.sqlite3"))
        .await
        .unwrap();
    let state = AppState {
        db: db.clone(),
        upload_dir: root.path().join("songs"),
    };
    TestApp {
        router: build_router(state),
        db,
        _root: root,
    }
}

async fn send_json(
    app: &TestApp,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value, Option<String>) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }

    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };

    (status, json, set_cookie)
}

/// Register an account and return its session cookie
async fn register(app: &TestApp, username: &str, role: &str) -> String {
    let (status, _, cookie) = send_json(
        app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": username, "password": "password", "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    cookie.expect("registration did not set a session cookie")
}

async fn login(app: &TestApp, path: &str, username: &str, password: &str) -> (StatusCode, Option<String>) {
    let (status, _, cookie) = send_json(
        app,
        "POST",
        path,
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    (status, cookie)
}

/// Insert a song directly, bypassing the multipart upload route
async fn seed_song(app: &TestApp, owner: &str, title: &str) -> i64 {
    let user = users::find_by_username(&app.db, owner)
        .await
        .unwrap()
        .unwrap();
    songs::insert_song(
        &app.db,
        &NewSong {
            filename: format!("{}.mp3", title),
            title: title.to_string(),
            singer: None,
            artist: owner.to_string(),
            genre: "rock".to_string(),
            lyrics: None,
            release_date: None,
            user_id: user.id,
        },
    )
    .await
    .unwrap()
}

/// Drive the multipart upload route
async fn upload_song(
    app: &TestApp,
    cookie: &str,
    filename: &str,
    title: &str,
    content: &str,
) -> (StatusCode, Value) {
    let boundary = "tunehub-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"genre\"\r\n\r\nrock\r\n\
         --{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
         Content-Type: audio/mpeg\r\n\r\n{content}\r\n\
         --{boundary}--\r\n"
    );

    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(COOKIE, cookie)
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

#[tokio::test]
async fn test_register_login_and_session() {
    let app = test_app().await;

    let cookie = register(&app, "alice", "listener").await;

    // Session cookie grants access to the homepage
    let (status, body, _) = send_json(&app, "GET", "/user", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["role"], "listener");

    // No cookie: 401
    let (status, _, _) = send_json(&app, "GET", "/user", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password: 401
    let (status, _) = login(&app, "/login", "alice", "wrong").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Fresh login issues a new session
    let (status, cookie) = login(&app, "/login", "alice", "password").await;
    assert_eq!(status, StatusCode::OK);
    assert!(cookie.is_some());
}

#[tokio::test]
async fn test_duplicate_username_rejected() {
    let app = test_app().await;
    register(&app, "alice", "listener").await;

    let (status, _, _) = send_json(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "alice", "password": "other", "role": "creator" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_admin_role_cannot_be_self_assigned() {
    let app = test_app().await;

    let (status, _, _) = send_json(
        &app,
        "POST",
        "/register",
        None,
        Some(json!({ "username": "mallory", "password": "pw", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_signs_in_via_admin_login() {
    let app = test_app().await;

    // Seeded admin is rejected at the regular login
    let (status, _) = login(&app, "/login", "admin", "admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, cookie) = login(&app, "/admin/login", "admin", "admin").await;
    assert_eq!(status, StatusCode::OK);
    let cookie = cookie.unwrap();

    let (status, body, _) = send_json(&app, "GET", "/admin_dashboard", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_tracks"], 0);
}

#[tokio::test]
async fn test_non_owner_creator_gets_403() {
    let app = test_app().await;
    let _owner = register(&app, "owner", "creator").await;
    let intruder = register(&app, "intruder", "creator").await;

    let song_id = seed_song(&app, "owner", "mine").await;

    let edit = json!({ "title": "stolen", "genre": "pop" });
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/edit_song/{}", song_id),
        Some(&intruder),
        Some(edit),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/delete_song/{}", song_id),
        Some(&intruder),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_owner_edits_and_admin_deletes() {
    let app = test_app().await;
    let owner = register(&app, "owner", "creator").await;
    let song_id = seed_song(&app, "owner", "mine").await;

    let edit = json!({ "title": "renamed", "genre": "pop", "singer": "someone" });
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/edit_song/{}", song_id),
        Some(&owner),
        Some(edit),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) =
        send_json(&app, "GET", &format!("/songs/{}", song_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["song"]["title"], "renamed");

    // Admin may delete any song
    let (_, admin_cookie) = login(&app, "/admin/login", "admin", "admin").await;
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/delete_song/{}", song_id),
        Some(&admin_cookie.unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send_json(&app, "GET", &format!("/songs/{}", song_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_resources_404() {
    let app = test_app().await;
    let listener = register(&app, "alice", "listener").await;

    let (status, _, _) = send_json(&app, "GET", "/songs/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send_json(
        &app,
        "POST",
        "/rate/999",
        Some(&listener),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _, _) = send_json(&app, "GET", "/show_playlist/999", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rating_flow_over_http() {
    let app = test_app().await;
    register(&app, "owner", "creator").await;
    let song_id = seed_song(&app, "owner", "hit").await;

    let alice = register(&app, "alice", "listener").await;
    let bob = register(&app, "bob", "listener").await;

    // Out-of-range rating rejected before touching the tables
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/rate/{}", song_id),
        Some(&alice),
        Some(json!({ "rating": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send_json(
        &app,
        "POST",
        &format!("/rate/{}", song_id),
        Some(&alice),
        Some(json!({ "rating": 4 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "rated");
    assert_eq!(body["average_rating"], 4.0);

    let (status, body, _) = send_json(
        &app,
        "POST",
        &format!("/rate/{}", song_id),
        Some(&bob),
        Some(json!({ "rating": 5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["average_rating"], 4.5);

    // Repeat rating: notice, not an error, and the average is unchanged
    let (status, body, _) = send_json(
        &app,
        "POST",
        &format!("/rate/{}", song_id),
        Some(&alice),
        Some(json!({ "rating": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "already_rated");
    assert_eq!(body["average_rating"], 4.5);

    let (_, body, _) = send_json(&app, "GET", &format!("/songs/{}", song_id), None, None).await;
    assert_eq!(body["song"]["rating"], 4.5);
    assert_eq!(body["average_rating"], 4.5);
}

#[tokio::test]
async fn test_playlist_flow() {
    let app = test_app().await;
    register(&app, "owner", "creator").await;
    let song_a = seed_song(&app, "owner", "a").await;
    let song_b = seed_song(&app, "owner", "b").await;

    let alice = register(&app, "alice", "listener").await;

    // Name and at least one song are required
    let (status, _, _) = send_json(
        &app,
        "POST",
        "/create_playlist",
        Some(&alice),
        Some(json!({ "name": "", "song_ids": [song_a] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/create_playlist",
        Some(&alice),
        Some(json!({ "name": "mix", "song_ids": [song_a] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let playlist_id = body["playlist_id"].as_i64().unwrap();

    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/add_to_playlist/{}", song_b),
        Some(&alice),
        Some(json!({ "playlist_id": playlist_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body, _) = send_json(
        &app,
        "GET",
        &format!("/show_playlist/{}", playlist_id),
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"].as_array().unwrap().len(), 2);

    // Only the owner may rename
    let bob = register(&app, "bob", "listener").await;
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/edit_playlist/{}", playlist_id),
        Some(&bob),
        Some(json!({ "name": "hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_album_creation_keeps_only_own_songs() {
    let app = test_app().await;
    let owner = register(&app, "owner", "creator").await;
    register(&app, "other", "creator").await;
    let own_song = seed_song(&app, "owner", "own").await;
    let foreign_song = seed_song(&app, "other", "foreign").await;

    let (status, body, _) = send_json(
        &app,
        "POST",
        "/make_album",
        Some(&owner),
        Some(json!({ "name": "debut", "song_ids": [own_song, foreign_song] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let album_id = body["album_id"].as_i64().unwrap();

    let (_, body, _) = send_json(
        &app,
        "GET",
        &format!("/view_album/{}", album_id),
        None,
        None,
    )
    .await;
    let album_songs = body["songs"].as_array().unwrap();
    assert_eq!(album_songs.len(), 1);
    assert_eq!(album_songs[0]["id"], own_song);
}

#[tokio::test]
async fn test_admin_delete_user_cascades() {
    let app = test_app().await;
    let creator = register(&app, "doomed", "creator").await;
    let song_id = seed_song(&app, "doomed", "gone").await;

    let (_, body, _) = send_json(&app, "GET", "/creator_dashboard", Some(&creator), None).await;
    assert_eq!(body["stats"]["total_songs"], 1);

    let user = users::find_by_username(&app.db, "doomed")
        .await
        .unwrap()
        .unwrap();

    let (_, admin_cookie) = login(&app, "/admin/login", "admin", "admin").await;
    let (status, _, _) = send_json(
        &app,
        "POST",
        &format!("/admin/delete_user/{}", user.id),
        Some(&admin_cookie.unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Account, songs and sessions are gone
    let (status, _, _) = send_json(&app, "GET", &format!("/songs/{}", song_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send_json(&app, "GET", "/user", Some(&creator), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_role_gates() {
    let app = test_app().await;
    let listener = register(&app, "alice", "listener").await;

    // Creator-only pages
    let (status, _, _) = send_json(&app, "GET", "/creator", Some(&listener), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _, _) = send_json(&app, "GET", "/manage_songs", Some(&listener), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Admin-only pages
    let (status, _, _) = send_json(&app, "GET", "/admin_dashboard", Some(&listener), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Upgrading unlocks the creator pages
    let (status, _, _) = send_json(&app, "POST", "/become_creator", Some(&listener), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = send_json(&app, "GET", "/creator", Some(&listener), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_session() {
    let app = test_app().await;
    let cookie = register(&app, "alice", "listener").await;

    let (status, _, _) = send_json(&app, "POST", "/logout", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send_json(&app, "GET", "/user", Some(&cookie), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search_and_dashboard_aggregates() {
    let app = test_app().await;
    register(&app, "owner", "creator").await;
    seed_song(&app, "owner", "Midnight Drive").await;
    seed_song(&app, "owner", "Morning Light").await;

    let (status, body, _) = send_json(
        &app,
        "GET",
        "/search_results?query=midnight",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["songs"].as_array().unwrap().len(), 1);

    let (_, admin_cookie) = login(&app, "/admin/login", "admin", "admin").await;
    let (status, body, _) = send_json(
        &app,
        "GET",
        "/admin_dashboard",
        Some(&admin_cookie.unwrap()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_creators"], 1);
    assert_eq!(body["total_tracks"], 2);
    assert_eq!(body["chart_data"]["labels"][0], "rock");
    assert_eq!(body["chart_data"]["data"][0], 2);
}

#[tokio::test]
async fn test_duplicate_upload_filename_rejected_without_clobbering() {
    let app = test_app().await;
    let first = register(&app, "first", "creator").await;
    let second = register(&app, "second", "creator").await;

    let (status, body) = upload_song(&app, &first, "anthem.mp3", "Anthem", "first bytes").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["song_id"].as_i64().unwrap() > 0);

    let stored = app._root.path().join("songs").join("anthem.mp3");
    assert_eq!(std::fs::read_to_string(&stored).unwrap(), "first bytes");

    // Same filename from another creator: 409, stored file untouched
    let (status, body) = upload_song(&app, &second, "anthem.mp3", "Imitation", "second bytes").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
    assert_eq!(std::fs::read_to_string(&stored).unwrap(), "first bytes");

    // Only the first upload made it into the catalog
    let all = songs::list_all(&app.db).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].title, "Anthem");
}
