//! Upload Gallery Example
//!
//! A photo gallery driven entirely in memory: images are uploaded through a
//! multipart form, kept in a shared list, and listed on the index page.
//!
//! Run with: cargo run --example upload_gallery -p gallery
//!
//! Set `RUST_LOG=debug` to see routing and decoding logs.

use std::sync::{Arc, Mutex};

use gallery::multipart::FormEncoder;
use gallery::{
    App, AppContext, FieldValue, Method, MultipartOptions, Request, Response, StatusCode,
    Templates, UploadedFile,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
struct Photo {
    title: String,
    #[serde(flatten)]
    file: UploadedFile,
}

type Library = Arc<Mutex<Vec<Photo>>>;

fn index(library: &Library) -> impl Fn(&AppContext, &mut Request) -> Response + use<> {
    let library = Arc::clone(library);
    move |ctx, _req| {
        let Ok(photos) = library.lock() else {
            return Response::error(StatusCode::INTERNAL_SERVER_ERROR, "library unavailable");
        };
        let titles: Vec<&str> = photos.iter().map(|p| p.title.as_str()).collect();
        ctx.render_serialize(
            "index.html",
            &serde_json::json!({ "count": photos.len(), "titles": titles }),
        )
    }
}

fn upload(library: &Library) -> impl Fn(&AppContext, &mut Request) -> Response + use<> {
    let library = Arc::clone(library);
    move |ctx, req| {
        let Some(mut form) = req.take_form() else {
            return Response::error(StatusCode::BAD_REQUEST, "expected multipart/form-data");
        };
        let Some(FieldValue::File(file)) = form.take("image") else {
            return Response::error(StatusCode::BAD_REQUEST, "missing image field");
        };
        let title = form
            .text("title")
            .map_or_else(|| file.filename.clone(), str::to_string);
        let photo = Photo { title, file };
        let resp = ctx.render_serialize("uploaded.html", &photo);
        if let Ok(mut photos) = library.lock() {
            photos.push(photo);
        }
        resp
    }
}

fn templates() -> Templates {
    let mut templates = Templates::new();
    templates.insert(
        "index.html",
        "<h1>Gallery</h1><p><%= count %> photos: <%= titles %></p>",
    );
    templates.insert(
        "uploaded.html",
        "<p>Stored <%= title %> (<%= filename %>, <%= content_type %>, <%= size %> bytes)</p>",
    );
    templates
}

fn print(label: &str, resp: &Response) {
    println!(
        "{label} -> {} {}\n   {}",
        resp.status().as_u16(),
        resp.reason_phrase(),
        String::from_utf8_lossy(resp.body_bytes())
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let library: Library = Arc::new(Mutex::new(Vec::new()));
    let app = match App::builder()
        .get("/", index(&library))
        .post("/upload", upload(&library))
        .with_templates(templates())
        .multipart_options(MultipartOptions::from_env())
        .build()
    {
        Ok(app) => app,
        Err(e) => {
            eprintln!("invalid route: {e}");
            std::process::exit(1);
        }
    };

    print("GET /", &app.handle(Request::new(Method::Get, "/")));

    let encoder = FormEncoder::new("----GalleryBoundary8d3f");
    let content_type = encoder.content_type();
    let body = encoder
        .text("title", "Fern")
        .file("image", "fern.jpg", Some("image/jpeg"), &[0xFF, 0xD8, 0xFF, 0xE0])
        .finish();
    let req = Request::new(Method::Post, "/upload")
        .with_header("Content-Type", content_type)
        .with_body(body);
    print("POST /upload", &app.handle(req));

    let req = Request::new(Method::Post, "/upload")
        .with_header("Content-Type", "multipart/form-data; boundary=nope")
        .with_body(b"garbage".to_vec());
    print("POST /upload (garbage)", &app.handle(req));

    print("GET /", &app.handle(Request::new(Method::Get, "/")));
    print("GET /missing", &app.handle(Request::new(Method::Get, "/missing")));
}
