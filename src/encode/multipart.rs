use rand::Rng as _;

use crate::stream::{ByteStream, ChainReader, image_stream};

const CRLF: &str = "\r\n";
const BOUNDARY_PREFIX: &str = "--------------------------";
const BOUNDARY_DIGITS: usize = 24;

/// How a field is declared in its `content-disposition` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Carries `filename="<field name>"`.
    File,
    Text,
}

struct Field {
    name: String,
    kind: FieldKind,
    value: ByteStream,
}

/// A finished body plus the `content-type` value announcing its boundary.
pub struct MultipartBody {
    pub content_type: String,
    pub stream: ByteStream,
}

impl std::fmt::Debug for MultipartBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartBody")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Streamed `multipart/form-data` body builder.
///
/// Fields keep insertion order. The body is produced lazily by [`MultipartForm::into_stream`];
/// file fields are never read until the consumer pulls their bytes.
pub struct MultipartForm {
    boundary: String,
    fields: Vec<Field>,
}

impl MultipartForm {
    pub fn new() -> Self {
        let mut rng = rand::rng();
        let mut boundary = String::with_capacity(BOUNDARY_PREFIX.len() + BOUNDARY_DIGITS);
        boundary.push_str(BOUNDARY_PREFIX);
        for _ in 0..BOUNDARY_DIGITS {
            let digit: u32 = rng.random_range(0..10);
            boundary.push(char::from_digit(digit, 10).unwrap_or('0'));
        }
        Self::with_boundary(boundary)
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            fields: Vec::new(),
        }
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    pub fn append_file(&mut self, name: impl Into<String>, value: ByteStream) {
        self.fields.push(Field {
            name: name.into(),
            kind: FieldKind::File,
            value,
        });
    }

    pub fn append_text(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push(Field {
            name: name.into(),
            kind: FieldKind::Text,
            value: image_stream(value.into()),
        });
    }

    /// Field names and kinds in body order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, FieldKind)> {
        self.fields.iter().map(|f| (f.name.as_str(), f.kind))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn into_body(self) -> MultipartBody {
        MultipartBody {
            content_type: self.content_type(),
            stream: self.into_stream(),
        }
    }

    /// Chain boundaries, headers and field bodies into one body stream.
    pub fn into_stream(self) -> ByteStream {
        let separator = format!("--{}{CRLF}", self.boundary);
        let footer = format!("--{}--{CRLF}", self.boundary);

        let mut chain = ChainReader::default();
        for (i, field) in self.fields.into_iter().enumerate() {
            if i == 0 {
                chain.push(image_stream(separator.clone()));
            } else {
                chain.push(image_stream(format!("{CRLF}{separator}")));
            }
            chain.push(image_stream(field_header(&field.name, field.kind)));
            chain.push(field.value);
        }
        if chain.pending() == 0 {
            chain.push(image_stream(separator));
            chain.push(image_stream(footer));
        } else {
            chain.push(image_stream(format!("{CRLF}{footer}")));
        }
        Box::new(chain)
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MultipartForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartForm")
            .field("boundary", &self.boundary)
            .field("fields", &self.fields().collect::<Vec<_>>())
            .finish()
    }
}

fn field_header(name: &str, kind: FieldKind) -> String {
    let filename = match kind {
        FieldKind::File => format!("; filename=\"{name}\""),
        FieldKind::Text => String::new(),
    };
    format!("content-disposition: form-data; name=\"{name}\"{filename}{CRLF}{CRLF}")
}
