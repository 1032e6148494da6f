use std::io::Read as _;

use anyhow::Context as _;

use crate::{
    encode::multipart::MultipartBody,
    foundation::error::{ImagesError, ImagesResult},
    stream::ByteStream,
};

#[cfg(feature = "http")]
pub mod reqwest_fetcher;

/// Response header through which the backend signals domain failures (`err=<code>`).
pub const BINDING_STATUS_HEADER: &str = "cf-images-binding";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Post,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
        }
    }
}

/// Ordered header list with ASCII case-insensitive lookup. Collecting from pairs keeps repeated
/// names; `get` returns the first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Headers(Vec<(String, String)>);

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Replace any existing value for `name`.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.0.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.0.push((name, value.into()));
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Add a value without touching earlier ones, as repeated response headers require.
    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Every value of `name`, in arrival order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.append(k, v);
        }
        headers
    }
}

pub struct FetchRequest {
    pub method: Method,
    pub url: String,
    pub headers: Headers,
    pub body: ByteStream,
}

impl FetchRequest {
    pub fn multipart(url: impl Into<String>, body: MultipartBody) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            headers: Headers::new().with("content-type", body.content_type),
            body: body.stream,
        }
    }
}

impl std::fmt::Debug for FetchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchRequest")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

pub struct FetchResponse {
    pub status: u16,
    pub headers: Headers,
    /// `None` when the response carried no body at all.
    pub body: Option<ByteStream>,
}

impl FetchResponse {
    pub fn new(status: u16, headers: Headers, body: Option<ByteStream>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Drain the body as UTF-8 text (lossy). A missing body reads as empty.
    pub fn text(self) -> ImagesResult<String> {
        let mut buf = Vec::new();
        if let Some(mut body) = self.body {
            body.read_to_end(&mut buf)
                .context("read bindings response body")?;
        }
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    pub fn json<T: serde::de::DeserializeOwned>(self) -> ImagesResult<T> {
        let text = self.text()?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl std::fmt::Debug for FetchResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Outbound HTTP transport.
///
/// Implementations send the request exactly once. Retries, timeouts and cancellation belong to
/// the implementation, never to callers of this trait.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, request: FetchRequest) -> ImagesResult<FetchResponse>;
}

impl<F: Fetcher + ?Sized> Fetcher for std::sync::Arc<F> {
    fn fetch(&self, request: FetchRequest) -> ImagesResult<FetchResponse> {
        (**self).fetch(request)
    }
}

/// Classify a backend response.
///
/// A `cf-images-binding: err=<code>` header wins over the HTTP status, even on a 200. Otherwise a
/// status above 399 is an unexpected error.
pub fn check_response(operation: &str, response: FetchResponse) -> ImagesResult<FetchResponse> {
    let signalled = response
        .headers
        .get(BINDING_STATUS_HEADER)
        .and_then(parse_error_code);

    if let Some(code) = signalled {
        let detail = response.text()?;
        tracing::debug!(operation, code, "backend signalled error");
        return Err(ImagesError::backend(operation, code, detail));
    }

    if response.status > 399 {
        let status = response.status;
        let body = response.text()?;
        return Err(ImagesError::unexpected_status(status, &body));
    }

    Ok(response)
}

/// First `err=` that is followed by at least one digit.
fn parse_error_code(header: &str) -> Option<u32> {
    header.match_indices("err=").find_map(|(at, marker)| {
        let rest = &header[at + marker.len()..];
        let end = rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(rest.len());
        rest[..end].parse().ok()
    })
}
