//! File serving, attachments, and upload acceptance.

use std::path::PathBuf;

use skiff::testing::TestClient;
use skiff::{App, Ctx, Method, StatusCode};

struct TempDir {
    root: PathBuf,
}

impl TempDir {
    fn new(tag: &str) -> Self {
        let root = std::env::temp_dir().join(format!("skiff-{tag}-{}", std::process::id()));
        std::fs::create_dir_all(&root).unwrap();
        Self { root }
    }

    fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, contents).unwrap();
        path
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}

#[tokio::test]
async fn serve_file_returns_contents_with_content_type() {
    let dir = TempDir::new("serve-file");
    let file = dir.write("notes.txt", "remember the milk");

    let mut app = App::new();
    app.serve_file("/notes", file);

    let client = TestClient::new(app);
    let response = client.get("/notes").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text(), "remember the milk");
    assert_eq!(response.header("content-type"), Some("text/plain"));
}

#[tokio::test]
async fn serve_file_on_a_missing_path_hits_the_error_policy() {
    let mut app = App::new();
    app.serve_file("/ghost", "/definitely/not/here.txt");

    let client = TestClient::new(app);
    let response = client.get("/ghost").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn serve_dir_mounts_every_file_and_the_index() {
    let dir = TempDir::new("serve-dir");
    dir.write("index.html", "<h1>home</h1>");
    dir.write("css/site.css", "body { margin: 0 }");

    let mut app = App::new();
    app.serve_dir("/site", dir.root.clone());

    let client = TestClient::new(app);

    let index = client.get("/site").await;
    assert_eq!(index.status(), StatusCode::OK);
    assert_eq!(index.text(), "<h1>home</h1>");
    assert_eq!(index.header("content-type"), Some("text/html"));

    let css = client.get("/site/css/site.css").await;
    assert_eq!(css.status(), StatusCode::OK);
    assert_eq!(css.text(), "body { margin: 0 }");
    assert_eq!(css.header("content-type"), Some("text/css"));
}

#[tokio::test]
async fn attachment_adds_content_disposition() {
    let dir = TempDir::new("attachment");
    let file = dir.write("report.pdf", "%PDF-fake");

    let mut app = App::new();
    app.get("/download", move |ctx: Ctx| {
        let file = file.clone();
        async move { ctx.attachment(file, "report.pdf").await }
    });

    let client = TestClient::new(app);
    let response = client.get("/download").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.header("content-disposition"),
        Some("attachment; filename=report.pdf")
    );
    assert_eq!(response.header("content-type"), Some("application/pdf"));
    assert_eq!(response.text(), "%PDF-fake");
}

#[tokio::test]
async fn save_body_stores_the_upload() {
    let dir = TempDir::new("upload");
    let target = dir.root.join("upload.bin");

    let mut app = App::new();
    let stored = target.clone();
    app.post("/upload", move |ctx: Ctx| {
        let stored = stored.clone();
        async move {
            ctx.save_body(&stored).await?;
            ctx.send(StatusCode::CREATED, "stored")
        }
    });

    let client = TestClient::new(app);
    let response = client
        .request(Method::POST, "/upload")
        .body("raw upload bytes")
        .send()
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), "raw upload bytes");
}
