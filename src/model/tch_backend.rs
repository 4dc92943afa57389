use std::{fs, path::Path};

use parking_lot::Mutex;
use tch::{Device, Kind, Tensor, no_grad};

use crate::{
    error::ServiceError,
    model::{Generator, ImageBatch, LabelBatch, LatentBatch, ModelMetadata},
};

/// TorchScript export of the conditional generator.
///
/// The module takes `latents: f32[n, latent_dim]` and `labels: i64[n]` and
/// returns one grayscale image per sample, either `[n, 1, h, w]`,
/// `[n, h, w, 1]` or `[n, h, w]`.
pub struct TorchGenerator {
    name: String,
    size_bytes: u64,
    device: Device,
    module: Mutex<tch::CModule>,
}

impl TorchGenerator {
    pub fn load(module_path: &Path, device: Device) -> Result<Self, ServiceError> {
        if !module_path.exists() {
            return Err(ServiceError::ModelUnavailable(format!(
                "model artifact missing: {}",
                module_path.display()
            )));
        }
        let size_bytes = fs::metadata(module_path)?.len();
        let mut module = tch::CModule::load_on_device(module_path, device)
            .map_err(|e| ServiceError::ModelUnavailable(e.to_string()))?;
        module.set_eval();

        let name = module_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "generator".to_string());

        Ok(Self {
            name,
            size_bytes,
            device,
            module: Mutex::new(module),
        })
    }
}

impl Generator for TorchGenerator {
    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            name: self.name.clone(),
            backend: "torchscript".to_string(),
            device: format!("{:?}", self.device),
            size_bytes: self.size_bytes,
        }
    }

    fn predict(
        &self,
        latents: &LatentBatch,
        labels: &LabelBatch,
    ) -> Result<ImageBatch, ServiceError> {
        let n = latents.len() as i64;
        let latent_tensor = Tensor::from_slice(latents.values())
            .reshape([n, latents.dim() as i64])
            .to_device(self.device);
        let label_tensor = Tensor::from_slice(labels.as_slice()).to_device(self.device);

        let output = no_grad(|| {
            let module = self.module.lock();
            module.forward_ts(&[latent_tensor, label_tensor])
        })
        .map_err(|e| ServiceError::Inference(e.to_string()))?;

        let output = output.to_device(Device::Cpu).to_kind(Kind::Float);
        let dims: Vec<usize> = output.size().iter().map(|&d| d as usize).collect();
        let (count, height, width) = match dims.as_slice() {
            [count, 1, height, width] | [count, height, width, 1] | [count, height, width] => {
                (*count, *height, *width)
            }
            other => {
                return Err(ServiceError::Inference(format!(
                    "unexpected generator output shape {other:?}"
                )));
            }
        };

        let pixels = Vec::<f32>::try_from(output.contiguous().view([-1]))
            .map_err(|e| ServiceError::Inference(e.to_string()))?;

        ImageBatch::new(count, height, width, pixels)
    }
}
