pub mod multipart;

pub use multipart::{FieldKind, MultipartBody, MultipartForm};
