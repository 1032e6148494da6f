//! Hosted-image metadata surface.
//!
//! The public option types follow the binding's camelCase conventions (`limit`, `cursor`,
//! `sortOrder`); the `*Params` types are what the hosted-images service receives (`per_page`,
//! `continuation_token`, `sort_order`).

use serde::{Deserialize, Serialize};

use crate::{foundation::error::ImagesResult, stream::ByteStream};

pub type MetadataMap = serde_json::Map<String, serde_json::Value>;

/// Metadata for a hosted image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMetadata {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded: Option<String>,
    #[serde(rename = "requireSignedURLs")]
    pub require_signed_urls: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<MetadataMap>,
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUploadOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, rename = "requireSignedURLs", skip_serializing_if = "Option::is_none")]
    pub require_signed_urls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataMap>,
}

/// Update payload; shared by the public surface and the service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageUpdateOptions {
    #[serde(default, rename = "requireSignedURLs", skip_serializing_if = "Option::is_none")]
    pub require_signed_urls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataMap>,
}

pub type UpdateParams = ImageUpdateOptions;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageListOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageList {
    pub images: Vec<ImageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub list_complete: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub continuation_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
}

impl From<&ImageListOptions> for ListParams {
    fn from(options: &ImageListOptions) -> Self {
        Self {
            // A zero limit means "service default", same as leaving it out.
            per_page: options.limit.filter(|&n| n > 0),
            continuation_token: options.cursor.clone().filter(|c| !c.is_empty()),
            sort_order: options.sort_order,
            creator: None,
        }
    }
}

/// One page as the service returns it.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ListPage {
    pub images: Vec<ImageMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
}

impl From<ListPage> for ImageList {
    fn from(page: ListPage) -> Self {
        let cursor = page.cursor.filter(|c| !c.is_empty());
        Self {
            images: page.images,
            list_complete: cursor.is_none(),
            cursor,
        }
    }
}

pub struct UploadFile {
    pub data: ByteStream,
    pub filename: Option<String>,
}

pub struct UploadParams {
    pub file: UploadFile,
    pub id: Option<String>,
    pub require_signed_urls: bool,
    pub metadata: Option<MetadataMap>,
}

impl UploadParams {
    pub fn new(data: ByteStream, options: ImageUploadOptions) -> Self {
        Self {
            file: UploadFile {
                data,
                filename: options.filename.filter(|f| !f.is_empty()),
            },
            id: options.id.filter(|id| !id.is_empty()),
            require_signed_urls: options.require_signed_urls.unwrap_or(false),
            metadata: options.metadata,
        }
    }
}

impl std::fmt::Debug for UploadParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadParams")
            .field("filename", &self.file.filename)
            .field("id", &self.id)
            .field("require_signed_urls", &self.require_signed_urls)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Hosted-images service reached over RPC. Account context is supplied by the implementation.
pub trait ImagesService: Send + Sync {
    fn get(&self, image_id: &str) -> ImagesResult<Option<ImageMetadata>>;
    fn get_image(&self, image_id: &str) -> ImagesResult<Option<ByteStream>>;
    fn upload(&self, params: UploadParams) -> ImagesResult<ImageMetadata>;
    fn update(&self, image_id: &str, params: UpdateParams) -> ImagesResult<ImageMetadata>;
    fn delete(&self, image_id: &str) -> ImagesResult<bool>;
    fn list(&self, params: ListParams) -> ImagesResult<ListPage>;
}
