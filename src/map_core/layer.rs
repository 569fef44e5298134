use crate::map_core::error::GenerationError;

/// One stage of the generation pipeline.
pub trait Layer<I, O> {
    fn generate(&self, input: I) -> Result<O, GenerationError>;
}
