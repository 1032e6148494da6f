use crate::{
    graph::{
        builder::{Graph, Operation},
        model::{DrawCommand, Instruction, TargetedTransform},
    },
    stream::ByteStream,
};

/// Index of the root canvas in every flattened graph.
pub const ROOT_IMAGE_INDEX: u32 = 0;

/// Wire form of a transform graph.
///
/// `draw_images[i]` is image index `i + 1`; the backend zips attachment order against the indices
/// referenced by `instructions`.
pub struct FlatGraph {
    pub image: ByteStream,
    pub draw_images: Vec<ByteStream>,
    pub instructions: Vec<Instruction>,
}

impl std::fmt::Debug for FlatGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlatGraph")
            .field("draw_images", &self.draw_images.len())
            .field("instructions", &self.instructions)
            .finish_non_exhaustive()
    }
}

struct Walk {
    draw_images: Vec<ByteStream>,
    instructions: Vec<Instruction>,
    next_index: u32,
}

impl Walk {
    fn attach(&mut self, image: ByteStream) -> u32 {
        self.draw_images.push(image);
        let index = self.next_index;
        self.next_index += 1;
        index
    }

    // Pre-order: a drawn image gets its index and its own instructions before the draw command
    // that composites it onto `target`.
    fn visit(&mut self, target: u32, ops: Vec<Operation>) {
        for op in ops {
            match op {
                Operation::Transform(transform) => {
                    self.instructions
                        .push(Instruction::Transform(TargetedTransform {
                            image_index: target,
                            transform,
                        }));
                }
                Operation::Draw { child, options } => {
                    let index = self.attach(child.image);
                    self.visit(index, child.ops);
                    self.instructions.push(Instruction::Draw(DrawCommand {
                        draw_image_index: index,
                        target_image_index: target,
                        options,
                    }));
                }
            }
        }
    }
}

pub(crate) fn flatten(graph: Graph) -> FlatGraph {
    let mut walk = Walk {
        draw_images: Vec::new(),
        instructions: Vec::new(),
        next_index: ROOT_IMAGE_INDEX + 1,
    };
    walk.visit(ROOT_IMAGE_INDEX, graph.ops);

    tracing::debug!(
        draw_images = walk.draw_images.len(),
        instructions = walk.instructions.len(),
        "flattened transform graph"
    );

    FlatGraph {
        image: graph.image,
        draw_images: walk.draw_images,
        instructions: walk.instructions,
    }
}
