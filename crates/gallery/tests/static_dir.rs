use std::fs;

use gallery::{App, AppContext, Method, Request, Response, StaticFiles, StatusCode};

fn index(_ctx: &AppContext, _req: &mut Request) -> Response {
    Response::html("<h1>Gallery</h1>")
}

#[test]
fn test_static_dir_served_through_app() {
    let root = tempfile::tempdir().unwrap();
    let images = root.path().join("images");
    fs::create_dir_all(images.join("thumbs")).unwrap();
    fs::write(images.join("fern.jpg"), [0xFF, 0xD8, 0xFF, 0xE0]).unwrap();
    fs::write(images.join("thumbs/chess.png"), [0x89, b'P', b'N', b'G']).unwrap();

    let files = StaticFiles::from_dir(&images).unwrap();
    let prefix = images.to_string_lossy().trim_start_matches('/').to_string();
    let app = App::builder()
        .get("/", index)
        .with_static(files)
        .build()
        .unwrap();

    let resp = app.handle(Request::new(Method::Get, format!("/{prefix}/fern.jpg")));
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.header_value("Content-Type"), Some("image/jpeg"));
    assert_eq!(resp.body_bytes(), [0xFF, 0xD8, 0xFF, 0xE0]);

    let resp = app.handle(Request::new(Method::Get, format!("/{prefix}/thumbs/chess.png")));
    assert_eq!(resp.header_value("Content-Type"), Some("image/png"));

    // Routes take precedence over the static table.
    let resp = app.handle(Request::new(Method::Get, "/"));
    assert_eq!(resp.body_bytes(), b"<h1>Gallery</h1>");

    let resp = app.handle(Request::new(Method::Get, format!("/{prefix}/missing.jpg")));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
