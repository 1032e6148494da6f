use crate::{
    foundation::error::{ImagesError, ImagesResult},
    stream::{ByteStream, empty_stream},
    transport::{FetchResponse, Headers},
};

/// Backend response to a transform request.
pub struct TransformationResult {
    response: FetchResponse,
}

impl TransformationResult {
    pub(crate) fn new(response: FetchResponse) -> Self {
        Self { response }
    }

    pub fn status(&self) -> u16 {
        self.response.status
    }

    /// Content type of the produced image.
    pub fn content_type(&self) -> ImagesResult<&str> {
        self.response
            .headers
            .get("content-type")
            .filter(|v| !v.is_empty())
            .ok_or(ImagesError::MissingContentType)
    }

    /// The image bytes as returned; an empty stream when the response had no body.
    pub fn image(self) -> ByteStream {
        self.response.body.unwrap_or_else(empty_stream)
    }

    /// A fresh 200 response carrying only the image and its content type, ready to hand to a
    /// cache or an end user. The backend's own status stays available through [`Self::status`].
    pub fn response(self) -> ImagesResult<FetchResponse> {
        let content_type = self.content_type()?.to_string();
        Ok(FetchResponse::new(
            200,
            Headers::new().with("content-type", content_type),
            Some(self.image()),
        ))
    }
}

impl std::fmt::Debug for TransformationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransformationResult")
            .field("response", &self.response)
            .finish()
    }
}
