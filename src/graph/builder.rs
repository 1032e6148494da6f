use std::sync::Arc;

use crate::{
    binding::Shared,
    encode::multipart::{MultipartBody, MultipartForm},
    foundation::error::{ImagesError, ImagesResult},
    graph::{
        flatten::{FlatGraph, flatten},
        model::{DrawOptions, ImageTransform, OutputOptions},
    },
    result::TransformationResult,
    stream::ByteStream,
    transport::{FetchRequest, check_response},
};

/// A root image plus its ordered operations.
pub(crate) struct Graph {
    pub(crate) image: ByteStream,
    pub(crate) ops: Vec<Operation>,
}

impl Graph {
    pub(crate) fn new(image: ByteStream) -> Self {
        Self {
            image,
            ops: Vec::new(),
        }
    }
}

pub(crate) enum Operation {
    Transform(ImageTransform),
    /// Composite `child`'s result onto the current canvas.
    Draw { child: Graph, options: DrawOptions },
}

enum State {
    Building(Graph),
    Consumed,
}

/// What can be drawn onto a canvas: raw image bytes, or another transformer whose graph is moved
/// into this one.
pub enum DrawSource<'a> {
    Stream(ByteStream),
    Transformer(&'a mut ImageTransformer),
}

impl From<ByteStream> for DrawSource<'_> {
    fn from(stream: ByteStream) -> Self {
        Self::Stream(stream)
    }
}

impl<'a> From<&'a mut ImageTransformer> for DrawSource<'a> {
    fn from(transformer: &'a mut ImageTransformer) -> Self {
        Self::Transformer(transformer)
    }
}

/// Handle to a transform graph rooted at one input image.
///
/// A transformer is consumed exactly once: by [`output`](Self::output) (or
/// [`encode`](Self::encode) / [`flatten`](Self::flatten)), or by being drawn onto another
/// transformer. Every later attempt fails with [`ImagesError::Consumed`].
pub struct ImageTransformer {
    shared: Arc<Shared>,
    state: State,
}

impl ImageTransformer {
    pub(crate) fn new(shared: Arc<Shared>, image: ByteStream) -> Self {
        Self {
            shared,
            state: State::Building(Graph::new(image)),
        }
    }

    pub fn is_consumed(&self) -> bool {
        matches!(self.state, State::Consumed)
    }

    /// Number of operations recorded so far (0 once consumed).
    pub fn len(&self) -> usize {
        match &self.state {
            State::Building(g) => g.ops.len(),
            State::Consumed => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a transform applied to this graph's own image.
    ///
    /// Never fails. On a consumed transformer the call is dropped; the consumption error surfaces
    /// from the next `draw`/`output`.
    pub fn transform(&mut self, transform: ImageTransform) -> &mut Self {
        match &mut self.state {
            State::Building(graph) => graph.ops.push(Operation::Transform(transform)),
            State::Consumed => {
                tracing::warn!("transform() on a consumed ImageTransformer was ignored");
            }
        }
        self
    }

    /// Draw `source` onto this graph's canvas.
    ///
    /// A transformer source is consumed immediately, so drawing it twice (or drawing it after
    /// its `output`) fails here rather than at serialization time.
    pub fn draw<'s>(
        &mut self,
        source: impl Into<DrawSource<'s>>,
        options: DrawOptions,
    ) -> ImagesResult<&mut Self> {
        let State::Building(graph) = &mut self.state else {
            return Err(ImagesError::Consumed);
        };
        let child = match source.into() {
            DrawSource::Stream(stream) => Graph::new(stream),
            DrawSource::Transformer(transformer) => transformer.take_graph()?,
        };
        graph.ops.push(Operation::Draw { child, options });
        Ok(self)
    }

    /// Consume the transformer and flatten it into attachments plus an instruction list.
    pub fn flatten(&mut self) -> ImagesResult<FlatGraph> {
        let graph = self.take_graph()?;
        Ok(flatten(graph))
    }

    /// Consume the transformer and build the multipart request body without sending it.
    ///
    /// Fields, in order: `image`, one `draw_image` per attachment, `transforms`,
    /// `output_format`, then `output_quality` and `background` when set.
    pub fn encode(&mut self, options: &OutputOptions) -> ImagesResult<MultipartBody> {
        let flat = self.flatten()?;
        let transforms = serde_json::to_string(&flat.instructions)?;

        let mut form = MultipartForm::new();
        form.append_file("image", flat.image);
        for draw_image in flat.draw_images {
            form.append_file("draw_image", draw_image);
        }
        form.append_text("transforms", transforms);
        form.append_text("output_format", options.format.as_str());
        if let Some(quality) = options.quality {
            form.append_text("output_quality", quality.to_string());
        }
        if let Some(background) = &options.background {
            form.append_text("background", background.as_str());
        }
        Ok(form.into_body())
    }

    /// Consume the transformer, send the graph to the backend and wrap its response.
    #[tracing::instrument(skip_all, fields(format = %options.format))]
    pub fn output(&mut self, options: OutputOptions) -> ImagesResult<TransformationResult> {
        let body = self.encode(&options)?;
        let url = self.shared.opts.transform_url.clone();
        tracing::debug!(%url, content_type = %body.content_type, "sending transform request");

        let response = self
            .shared
            .fetcher
            .fetch(FetchRequest::multipart(url, body))?;
        let response = check_response("TRANSFORM", response)?;
        Ok(TransformationResult::new(response))
    }

    fn take_graph(&mut self) -> ImagesResult<Graph> {
        match std::mem::replace(&mut self.state, State::Consumed) {
            State::Building(graph) => Ok(graph),
            State::Consumed => Err(ImagesError::Consumed),
        }
    }
}

impl std::fmt::Debug for ImageTransformer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageTransformer")
            .field("consumed", &self.is_consumed())
            .field("ops", &self.len())
            .finish()
    }
}
