use anyhow::Context as _;

use crate::{
    foundation::error::ImagesResult,
    transport::{FetchRequest, FetchResponse, Fetcher, Headers, Method},
};

/// Blocking `reqwest` transport. The request body is streamed straight from the chained
/// multipart reader; the response body is handed back unread.
#[derive(Clone, Debug, Default)]
pub struct ReqwestFetcher {
    client: reqwest::blocking::Client,
}

impl ReqwestFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self { client }
    }
}

impl Fetcher for ReqwestFetcher {
    fn fetch(&self, request: FetchRequest) -> ImagesResult<FetchResponse> {
        let method = match request.method {
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in request.headers.iter() {
            builder = builder.header(name, value);
        }

        let response = builder
            .body(reqwest::blocking::Body::new(request.body))
            .send()
            .with_context(|| format!("send request to '{}'", request.url))?;

        let status = response.status().as_u16();
        let headers: Headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        Ok(FetchResponse::new(status, headers, Some(Box::new(response))))
    }
}
