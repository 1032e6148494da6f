use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    config::BindingOpts,
    encode::multipart::MultipartForm,
    foundation::error::{ImagesError, ImagesResult},
    graph::builder::ImageTransformer,
    metadata::{
        ImageList, ImageListOptions, ImageMetadata, ImageUpdateOptions, ImageUploadOptions,
        ImagesService, ListParams, UploadParams,
    },
    stream::ByteStream,
    transport::{FetchRequest, Fetcher, check_response},
};

pub const SVG_FORMAT: &str = "image/svg+xml";

/// State every transformer created by one binding shares.
pub(crate) struct Shared {
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) opts: BindingOpts,
}

/// Result of an info request.
///
/// SVGs report only their format; raster images also report size and dimensions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ImageInfo {
    #[serde(rename_all = "camelCase")]
    Raster {
        format: String,
        file_size: u64,
        width: u32,
        height: u32,
    },
    Svg { format: String },
}

impl ImageInfo {
    pub fn format(&self) -> &str {
        match self {
            Self::Raster { format, .. } | Self::Svg { format } => format,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawInfo {
    Raster {
        format: String,
        file_size: u64,
        width: u32,
        height: u32,
    },
    Svg {
        format: String,
    },
}

impl From<RawInfo> for ImageInfo {
    fn from(raw: RawInfo) -> Self {
        match raw {
            RawInfo::Raster {
                format,
                file_size,
                width,
                height,
            } => Self::Raster {
                format,
                file_size,
                width,
                height,
            },
            RawInfo::Svg { format } => Self::Svg { format },
        }
    }
}

/// Entry point: wraps image streams as transformers, queries image info and forwards
/// hosted-image metadata calls.
#[derive(Clone)]
pub struct ImagesBinding {
    shared: Arc<Shared>,
    service: Option<Arc<dyn ImagesService>>,
}

impl ImagesBinding {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self::with_opts(fetcher, BindingOpts::default())
    }

    pub fn with_opts(fetcher: Arc<dyn Fetcher>, opts: BindingOpts) -> Self {
        Self {
            shared: Arc::new(Shared { fetcher, opts }),
            service: None,
        }
    }

    /// Attach the hosted-images service used by the metadata calls.
    pub fn with_service(mut self, service: Arc<dyn ImagesService>) -> Self {
        self.service = Some(service);
        self
    }

    pub fn opts(&self) -> &BindingOpts {
        &self.shared.opts
    }

    /// Begin a transform graph rooted at `image`.
    pub fn input(&self, image: ByteStream) -> ImageTransformer {
        ImageTransformer::new(self.shared.clone(), image)
    }

    #[tracing::instrument(skip_all)]
    pub fn info(&self, image: ByteStream) -> ImagesResult<ImageInfo> {
        let mut form = MultipartForm::new();
        form.append_file("image", image);

        let url = self.shared.opts.info_url.clone();
        tracing::debug!(%url, "sending info request");
        let response = self
            .shared
            .fetcher
            .fetch(FetchRequest::multipart(url, form.into_body()))?;
        let response = check_response("INFO", response)?;

        let raw: RawInfo = response.json()?;
        Ok(raw.into())
    }

    fn service(&self) -> ImagesResult<&dyn ImagesService> {
        self.service
            .as_deref()
            .ok_or_else(|| ImagesError::unsupported("no hosted-images service is configured"))
    }

    #[tracing::instrument(skip(self))]
    pub fn get(&self, image_id: &str) -> ImagesResult<Option<ImageMetadata>> {
        self.service()?.get(image_id)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_image(&self, image_id: &str) -> ImagesResult<Option<ByteStream>> {
        self.service()?.get_image(image_id)
    }

    #[tracing::instrument(skip(self, image))]
    pub fn upload(
        &self,
        image: ByteStream,
        options: ImageUploadOptions,
    ) -> ImagesResult<ImageMetadata> {
        self.service()?.upload(UploadParams::new(image, options))
    }

    #[tracing::instrument(skip(self))]
    pub fn update(
        &self,
        image_id: &str,
        options: ImageUpdateOptions,
    ) -> ImagesResult<ImageMetadata> {
        self.service()?.update(image_id, options)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete(&self, image_id: &str) -> ImagesResult<bool> {
        self.service()?.delete(image_id)
    }

    #[tracing::instrument(skip(self))]
    pub fn list(&self, options: ImageListOptions) -> ImagesResult<ImageList> {
        let page = self.service()?.list(ListParams::from(&options))?;
        Ok(page.into())
    }
}

impl std::fmt::Debug for ImagesBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagesBinding")
            .field("opts", &self.shared.opts)
            .field("service", &self.service.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn raster_info_is_renamed() {
        let raw: RawInfo = serde_json::from_value(json!({
            "format": "image/png",
            "file_size": 123,
            "width": 10,
            "height": 20,
        }))
        .unwrap();
        let info = ImageInfo::from(raw);
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            json!({ "format": "image/png", "fileSize": 123, "width": 10, "height": 20 })
        );
    }

    #[test]
    fn svg_info_has_only_format() {
        let raw: RawInfo = serde_json::from_value(json!({ "format": SVG_FORMAT })).unwrap();
        let info = ImageInfo::from(raw);
        assert_eq!(info, ImageInfo::Svg { format: SVG_FORMAT.to_string() });
        assert_eq!(info.format(), SVG_FORMAT);
    }

    #[test]
    fn metadata_calls_need_a_service() {
        struct Never;
        impl Fetcher for Never {
            fn fetch(
                &self,
                _request: FetchRequest,
            ) -> ImagesResult<crate::transport::FetchResponse> {
                unreachable!("metadata calls never hit the fetcher")
            }
        }
        let binding = ImagesBinding::new(Arc::new(Never));
        assert!(matches!(binding.get("x"), Err(ImagesError::Unsupported(_))));
        assert!(matches!(
            binding.list(ImageListOptions::default()),
            Err(ImagesError::Unsupported(_))
        ));
    }
}
