mod loader;
mod registry;
mod types;

#[cfg(feature = "tch-backend")]
pub mod tch_backend;

#[cfg(test)]
pub(crate) mod testing;

pub use loader::ModelArtifacts;
pub use registry::ModelRegistry;
pub use types::{GenerationResponse, ImageBatch, LabelBatch, LatentBatch, ModelMetadata};

use crate::error::ServiceError;

/// A pre-trained conditional generator, treated as an opaque function from
/// `(latents, labels)` to images.
///
/// Implementations are loaded once and shared read-only between requests.
pub trait Generator: Send + Sync {
    fn metadata(&self) -> ModelMetadata;

    fn predict(
        &self,
        latents: &LatentBatch,
        labels: &LabelBatch,
    ) -> Result<ImageBatch, ServiceError>;
}
