//! imgraph builds declarative image transform/composite graphs and ships them to a remote images
//! backend as a single streamed `multipart/form-data` request.
//!
//! - Wrap an image stream with [`ImagesBinding::input`]
//! - Chain [`ImageTransformer::transform`] and [`ImageTransformer::draw`] (drawing other images
//!   or whole transformers onto the canvas)
//! - Finish with [`ImageTransformer::output`]
//!
//! Image bytes are never buffered: every input is carried as a [`ByteStream`] and chained into
//! the request body as the transport reads it.
#![forbid(unsafe_code)]

mod foundation;

pub mod binding;
pub mod config;
pub mod encode;
pub mod graph;
pub mod metadata;
pub mod recipe;
pub mod result;
pub mod stream;
pub mod transport;

pub use crate::binding::{ImageInfo, ImagesBinding};
pub use crate::config::BindingOpts;
pub use crate::encode::{MultipartBody, MultipartForm};
pub use crate::foundation::error::{
    CONSUMED_ERROR_CODE, ImagesError, ImagesResult, TRANSFORM_ERROR_CODE,
};
pub use crate::graph::{
    DrawOptions, DrawSource, FlatGraph, ImageTransform, ImageTransformer, Instruction,
    OutputFormat, OutputOptions,
};
pub use crate::metadata::{
    ImageList, ImageListOptions, ImageMetadata, ImageUpdateOptions, ImageUploadOptions,
    ImagesService,
};
pub use crate::recipe::Recipe;
pub use crate::result::TransformationResult;
pub use crate::stream::{ByteStream, ChainReader, empty_stream, image_stream};
#[cfg(feature = "http")]
pub use crate::transport::reqwest_fetcher::ReqwestFetcher;
pub use crate::transport::{FetchRequest, FetchResponse, Fetcher, Headers, check_response};
