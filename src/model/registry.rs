use std::{sync::Arc, time::Instant};

use tokio::task;
use tracing::info;

use crate::{
    config::AppConfig,
    error::ServiceError,
    model::{Generator, GenerationResponse, ModelMetadata, loader::ModelArtifacts},
    render::{self, OutputTarget, RenderStyle},
    sampling::LatentSampler,
    validation::TargetDigit,
};

pub struct ModelRegistry {
    artifacts: Arc<ModelArtifacts>,
}

impl ModelRegistry {
    pub fn initialize(config: &AppConfig) -> Result<Self, ServiceError> {
        let artifacts = ModelArtifacts::load(config)?;
        Ok(Self {
            artifacts: Arc::new(artifacts),
        })
    }

    pub fn with_generator(generator: Arc<dyn Generator>) -> Self {
        Self {
            artifacts: Arc::new(ModelArtifacts::from_generator(generator)),
        }
    }

    pub fn metadata(&self) -> ModelMetadata {
        self.artifacts.generator.metadata()
    }

    /// Samples a batch for `digit`, runs the generator and writes the composite,
    /// all on the blocking pool.
    pub async fn generate(
        &self,
        digit: TargetDigit,
        config: &AppConfig,
        sampler: Arc<LatentSampler>,
    ) -> Result<GenerationResponse, ServiceError> {
        let generator = self.artifacts.generator.clone();
        let latent_dim = config.latent_dim;
        let grid_size = config.grid_size;
        let samples = config.batch_size();
        let target = OutputTarget::for_request(config);
        let style = RenderStyle::from_config(config);

        let start = Instant::now();
        let rendered = task::spawn_blocking(move || {
            let (latents, labels) = sampler.sample(latent_dim, samples, digit)?;
            render::render(
                generator.as_ref(),
                &latents,
                &labels,
                grid_size,
                &target,
                &style,
            )
        })
        .await
        .map_err(|err| ServiceError::Inference(format!("generation task failed: {err}")))??;
        let elapsed = start.elapsed();

        info!(
            %digit,
            path = %rendered.path.display(),
            elapsed_ms = elapsed.as_millis() as u64,
            "generated digit grid"
        );

        Ok(GenerationResponse {
            image_url: rendered.url,
            samples,
        })
    }
}
