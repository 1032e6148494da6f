#![allow(dead_code)]

use std::{io::Read as _, sync::Mutex};

use imgraph::{
    FetchRequest, FetchResponse, Fetcher, Headers, ImagesResult, config::BindingOpts, image_stream,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Part {
    pub name: String,
    pub filename: Option<String>,
    pub data: String,
}

/// Minimal `multipart/form-data` parser for bodies produced by `MultipartForm`.
pub fn parse_multipart(content_type: &str, body: &str) -> Vec<Part> {
    let (_, boundary) = content_type
        .split_once("boundary=")
        .expect("content-type carries a boundary");

    let opening = format!("--{boundary}\r\n");
    let footer = format!("--{boundary}--\r\n");
    let inner = body
        .strip_prefix(&opening)
        .expect("body starts with the opening boundary")
        .strip_suffix(&footer)
        .expect("body ends with the closing boundary");
    if inner.is_empty() {
        return Vec::new();
    }
    let inner = inner
        .strip_suffix("\r\n")
        .expect("last field ends with CRLF");

    inner
        .split(&format!("\r\n--{boundary}\r\n"))
        .map(|raw| {
            let (header, data) = raw.split_once("\r\n\r\n").expect("header/body separator");
            Part {
                name: quoted(header, "name").expect("field name"),
                filename: quoted(header, "filename"),
                data: data.to_string(),
            }
        })
        .collect()
}

fn quoted(header: &str, key: &str) -> Option<String> {
    let needle = format!("; {key}=\"");
    let start = header.find(&needle)? + needle.len();
    let end = header[start..].find('"')? + start;
    Some(header[start..end].to_string())
}

#[derive(Clone, Debug)]
pub struct Recorded {
    pub url: String,
    pub content_type: String,
    pub parts: Vec<Part>,
}

#[derive(Clone, Debug)]
pub enum Behavior {
    /// Echo the parsed form back as JSON, like the edge mock.
    Echo,
    /// Reply with `cf-images-binding: err=<code>`.
    Signal { status: u16, code: u32, body: String },
    Status { status: u16, body: String },
    /// 200 without a content-type header.
    Bare { body: Option<String> },
}

/// In-memory backend standing in for the transform/info endpoints.
pub struct MockBackend {
    pub behavior: Behavior,
    pub requests: Mutex<Vec<Recorded>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::with(Behavior::Echo)
    }

    pub fn with(behavior: Behavior) -> Self {
        Self {
            behavior,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn echo(&self, url: &str, parts: &[Part]) -> FetchResponse {
        let opts = BindingOpts::default();
        if url == opts.info_url {
            return info_reply(parts);
        }

        let mut out = serde_json::Map::new();
        let mut draw_images = Vec::new();
        for part in parts {
            match part.name.as_str() {
                "draw_image" => draw_images.push(serde_json::Value::from(part.data.clone())),
                "transforms" => {
                    let v: serde_json::Value = serde_json::from_str(&part.data).unwrap();
                    out.insert("transforms".to_string(), v);
                }
                name => {
                    out.insert(name.to_string(), part.data.clone().into());
                }
            }
        }
        if !draw_images.is_empty() {
            out.insert("draw_image".to_string(), draw_images.into());
        }
        json_reply(serde_json::Value::Object(out))
    }
}

fn info_reply(parts: &[Part]) -> FetchResponse {
    let image = parts
        .iter()
        .find(|p| p.name == "image")
        .map(|p| p.data.as_str())
        .unwrap_or_default();

    if image == "BAD" {
        return FetchResponse::new(
            409,
            Headers::new()
                .with("content-type", "text/plain")
                .with("cf-images-binding", "err=123"),
            Some(image_stream("Bad request")),
        );
    }
    if image.starts_with("<svg") {
        return json_reply(serde_json::json!({ "format": "image/svg+xml" }));
    }
    json_reply(serde_json::json!({
        "format": "image/png",
        "file_size": 123,
        "width": 123,
        "height": 123,
    }))
}

fn json_reply(v: serde_json::Value) -> FetchResponse {
    FetchResponse::new(
        200,
        Headers::new().with("content-type", "application/json"),
        Some(image_stream(v.to_string())),
    )
}

impl Fetcher for MockBackend {
    fn fetch(&self, mut request: FetchRequest) -> ImagesResult<FetchResponse> {
        let content_type = request
            .headers
            .get("content-type")
            .expect("request has a content-type")
            .to_string();
        let mut body = String::new();
        request.body.read_to_string(&mut body).unwrap();
        let parts = parse_multipart(&content_type, &body);

        self.requests.lock().unwrap().push(Recorded {
            url: request.url.clone(),
            content_type,
            parts: parts.clone(),
        });

        Ok(match &self.behavior {
            Behavior::Echo => self.echo(&request.url, &parts),
            Behavior::Signal { status, code, body } => FetchResponse::new(
                *status,
                Headers::new().with("cf-images-binding", format!("err={code}")),
                Some(image_stream(body.clone())),
            ),
            Behavior::Status { status, body } => {
                FetchResponse::new(*status, Headers::new(), Some(image_stream(body.clone())))
            }
            Behavior::Bare { body } => {
                FetchResponse::new(200, Headers::new(), body.clone().map(image_stream))
            }
        })
    }
}

pub fn read_string(mut stream: imgraph::ByteStream) -> String {
    let mut out = String::new();
    stream.read_to_string(&mut out).unwrap();
    out
}
