use std::sync::Arc;

use crate::{config::AppConfig, error::ServiceError, model::Generator};

pub struct ModelArtifacts {
    pub generator: Arc<dyn Generator>,
}

impl ModelArtifacts {
    #[cfg(feature = "tch-backend")]
    pub fn load(config: &AppConfig) -> Result<Self, ServiceError> {
        let generator = super::tch_backend::TorchGenerator::load(
            &config.generator_module_path,
            config.device,
        )?;
        Ok(Self {
            generator: Arc::new(generator),
        })
    }

    #[cfg(not(feature = "tch-backend"))]
    pub fn load(config: &AppConfig) -> Result<Self, ServiceError> {
        Err(ServiceError::ModelUnavailable(format!(
            "cannot load {}: built without the tch-backend feature",
            config.generator_module_path.display()
        )))
    }

    pub fn from_generator(generator: Arc<dyn Generator>) -> Self {
        Self { generator }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_artifact_is_reported_as_unavailable() {
        let config = AppConfig {
            generator_module_path: "does/not/exist/generator.pt".into(),
            ..AppConfig::default()
        };
        let err = ModelArtifacts::load(&config).err().unwrap();
        assert!(matches!(err, ServiceError::ModelUnavailable(_)));
    }
}
