//! JSON recipes describing a transform graph over files on disk.
//!
//! ```json
//! {
//!   "input": "photo.jpg",
//!   "ops": [
//!     { "transform": { "width": 800, "height": 600, "fit": "cover" } },
//!     { "draw": { "image": "logo.png", "options": { "bottom": 10, "right": 10, "opacity": 0.8 } } },
//!     { "draw": { "image": { "input": "badge.png", "ops": [{ "transform": { "rotate": 90 } }] } } }
//!   ],
//!   "output": { "format": "image/webp", "quality": 80 }
//! }
//! ```

use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::{
    binding::ImagesBinding,
    foundation::error::ImagesResult,
    graph::{
        builder::ImageTransformer,
        model::{DrawOptions, ImageTransform, OutputOptions},
    },
    stream::ByteStream,
};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub input: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ops: Vec<RecipeOp>,
    /// Only meaningful on the outermost recipe.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputOptions>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipeOp {
    Transform(ImageTransform),
    Draw(RecipeDraw),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeDraw {
    pub image: DrawImage,
    #[serde(default)]
    pub options: DrawOptions,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DrawImage {
    Path(PathBuf),
    Recipe(Box<Recipe>),
}

impl Recipe {
    pub fn from_json_file(path: &Path) -> ImagesResult<Self> {
        let f = File::open(path).with_context(|| format!("open recipe '{}'", path.display()))?;
        Ok(serde_json::from_reader(BufReader::new(f))?)
    }

    /// Build the transformer, opening every referenced file relative to `root`.
    pub fn build(&self, binding: &ImagesBinding, root: &Path) -> ImagesResult<ImageTransformer> {
        let mut transformer = binding.input(open_image(root, &self.input)?);
        for op in &self.ops {
            match op {
                RecipeOp::Transform(t) => {
                    transformer.transform(t.clone());
                }
                RecipeOp::Draw(draw) => match &draw.image {
                    DrawImage::Path(path) => {
                        transformer.draw(open_image(root, path)?, draw.options.clone())?;
                    }
                    DrawImage::Recipe(child) => {
                        let mut child = child.build(binding, root)?;
                        transformer.draw(&mut child, draw.options.clone())?;
                    }
                },
            }
        }
        Ok(transformer)
    }

    /// Files attached as `draw_image` fields, in attachment order (index 1 first).
    pub fn draw_image_paths(&self, root: &Path) -> Vec<PathBuf> {
        let mut out = Vec::new();
        self.collect_draw_images(root, &mut out);
        out
    }

    fn collect_draw_images(&self, root: &Path, out: &mut Vec<PathBuf>) {
        for op in &self.ops {
            let RecipeOp::Draw(draw) = op else {
                continue;
            };
            match &draw.image {
                DrawImage::Path(path) => out.push(root.join(path)),
                DrawImage::Recipe(child) => {
                    out.push(root.join(&child.input));
                    child.collect_draw_images(root, out);
                }
            }
        }
    }
}

fn open_image(root: &Path, path: &Path) -> ImagesResult<ByteStream> {
    let path = root.join(path);
    let f = File::open(&path).with_context(|| format!("open image '{}'", path.display()))?;
    Ok(Box::new(BufReader::new(f)))
}
