use std::io::{Cursor, Read};
use std::path::Path;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use fileshare::{routes, AppState, Config};

fn fixture_root() -> TempDir {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("a.txt"), b"hello").unwrap();
    std::fs::create_dir(dir.path().join("b")).unwrap();
    std::fs::write(dir.path().join("b/c.mp4"), vec![7u8; 10]).unwrap();
    dir
}

fn app(root: &Path, show_dotfiles: bool) -> Router {
    let config = Config {
        show_dotfiles,
        ..Config::default()
    };
    routes::file_routes().with_state(AppState::with_config(root.to_path_buf(), config))
}

async fn get(app: &Router, uri: &str) -> Response {
    app.clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_string(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}

fn header_str<'a>(response: &'a Response, name: header::HeaderName) -> &'a str {
    response.headers().get(name).unwrap().to_str().unwrap()
}

// ============================================================================
// Directory listings
// ============================================================================

#[tokio::test]
async fn root_listing_shows_entries_and_total() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let page = body_string(response).await;
    assert!(page.contains("a.txt"));
    assert!(page.contains("5 B"));
    assert!(page.contains("subtitles"));
    assert!(page.contains("10 B"));
    assert!(page.contains("folder"));
    // Recursive directory total: 5 + 10
    assert!(page.contains("15 B"));
    assert!(page.contains(&root.path().display().to_string()));
}

#[tokio::test]
async fn nested_listing_has_parent_and_zip_links() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let page = body_string(get(&app, "/b").await).await;
    assert!(page.contains("c.mp4"));
    assert!(page.contains("video"));
    assert!(page.contains(">..<"));
    assert!(page.contains("/zip/b"));
}

#[tokio::test]
async fn missing_path_is_404_not_found() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response).await, "Not found");
}

// ============================================================================
// File streaming
// ============================================================================

#[tokio::test]
async fn file_request_streams_raw_bytes() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/b/c.mp4").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "video/mp4");
    assert_eq!(header_str(&response, header::CONTENT_LENGTH), "10");
    assert_eq!(body_bytes(response).await, vec![7u8; 10]);
}

#[tokio::test]
async fn file_names_with_spaces_resolve_via_percent_encoding() {
    let root = fixture_root();
    std::fs::write(root.path().join("my file.txt"), b"spaced").unwrap();
    let app = app(root.path(), true);

    let response = get(&app, "/my%20file.txt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"spaced");
}

// ============================================================================
// Dotfile policy
// ============================================================================

#[tokio::test]
async fn hidden_files_are_filtered_and_unreachable() {
    let root = fixture_root();
    std::fs::write(root.path().join(".hidden"), b"x").unwrap();
    let app = app(root.path(), false);

    let page = body_string(get(&app, "/").await).await;
    assert!(!page.contains(".hidden"));
    // Listing is unchanged by the hidden file
    assert!(page.contains("15 B"));

    let response = get(&app, "/.hidden").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn hidden_files_are_served_when_dotfiles_enabled() {
    let root = fixture_root();
    std::fs::write(root.path().join(".hidden"), b"x").unwrap();
    let app = app(root.path(), true);

    let page = body_string(get(&app, "/").await).await;
    assert!(page.contains(".hidden"));

    let response = get(&app, "/.hidden").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ============================================================================
// Confinement
// ============================================================================

#[tokio::test]
async fn traversal_stays_under_root() {
    let dir = TempDir::new().unwrap();
    let root = dir.path().join("root");
    std::fs::create_dir(&root).unwrap();
    std::fs::write(root.join("a.txt"), b"hello").unwrap();
    // A file that only exists next to the root, never under it.
    std::fs::write(dir.path().join("outside.txt"), b"secret").unwrap();
    let app = app(&root, true);

    let response = get(&app, "/../outside.txt").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(&app, "/../../../../etc/passwd").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Static assets
// ============================================================================

#[tokio::test]
async fn stylesheet_is_served_with_css_mime() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/static/styles.css").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "text/css");
}

#[tokio::test]
async fn icons_are_served_with_svg_mime() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/static/icons/folder.svg").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(header_str(&response, header::CONTENT_TYPE), "image/svg+xml");
    assert!(body_string(response).await.contains("<svg"));
}

#[tokio::test]
async fn missing_asset_is_404() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/static/nope.css").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Zip downloads
// ============================================================================

fn read_archive(bytes: Vec<u8>) -> Vec<(String, Vec<u8>)> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.push((entry.name().to_string(), data));
    }
    entries
}

#[tokio::test]
async fn zip_subtree_sets_headers_and_contains_files() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/zip/b").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        header_str(&response, header::CONTENT_TYPE),
        "application/zip"
    );
    assert_eq!(
        header_str(&response, header::CONTENT_DISPOSITION),
        "attachment; filename=b.zip"
    );

    let entries = read_archive(body_bytes(response).await);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].0, "c.mp4");
    assert_eq!(entries[0].1, vec![7u8; 10]);
}

#[tokio::test]
async fn zip_of_root_round_trips_every_file() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/zip").await;
    assert_eq!(response.status(), StatusCode::OK);
    let disposition = header_str(&response, header::CONTENT_DISPOSITION).to_string();
    assert!(disposition.starts_with("attachment; filename="));
    assert!(disposition.ends_with(".zip"));

    let entries = read_archive(body_bytes(response).await);
    let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
    assert!(names.contains(&"a.txt"));
    assert!(names.contains(&"b/"));
    assert!(names.contains(&"b/c.mp4"));

    for (name, data) in &entries {
        match name.as_str() {
            "a.txt" => assert_eq!(data, b"hello"),
            "b/c.mp4" => assert_eq!(data, &vec![7u8; 10]),
            "b/" => assert!(data.is_empty()),
            other => panic!("unexpected entry: {other}"),
        }
    }
}

#[tokio::test]
async fn zip_of_missing_subtree_is_404() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let response = get(&app, "/zip/nope").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn repeated_requests_yield_identical_archives() {
    let root = fixture_root();
    let app = app(root.path(), true);

    let first = read_archive(body_bytes(get(&app, "/zip/b").await).await);
    let second = read_archive(body_bytes(get(&app, "/zip/b").await).await);
    assert_eq!(first, second);
}
