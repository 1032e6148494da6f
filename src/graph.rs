pub mod builder;
pub mod flatten;
pub mod model;

pub use builder::{DrawSource, ImageTransformer};
pub use flatten::{FlatGraph, ROOT_IMAGE_INDEX};
pub use model::{
    Border, DrawCommand, DrawOptions, Fit, Gravity, GravityMode, GravitySide, ImageTransform,
    Instruction, OutputFormat, OutputOptions, Repeat, TargetedTransform, Trim, TrimBorder,
};
