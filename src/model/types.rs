use serde::Serialize;

use crate::{error::ServiceError, validation::TargetDigit};

/// `len()` latent vectors of `dim` values each, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LatentBatch {
    dim: usize,
    values: Vec<f32>,
}

impl LatentBatch {
    pub fn new(dim: usize, values: Vec<f32>) -> Result<Self, ServiceError> {
        if dim == 0 || values.len() % dim != 0 {
            return Err(ServiceError::BadRequest(format!(
                "{} latent values cannot be split into vectors of length {dim}",
                values.len()
            )));
        }
        Ok(Self { dim, values })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.values.len() / self.dim
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn vector(&self, index: usize) -> &[f32] {
        &self.values[index * self.dim..(index + 1) * self.dim]
    }

    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

/// Conditioning labels, positionally aligned with a [`LatentBatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelBatch(Vec<i64>);

impl LabelBatch {
    pub fn repeat(digit: TargetDigit, n: usize) -> Self {
        Self(vec![digit.label(); n])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[i64] {
        &self.0
    }
}

/// Grayscale generator output: `len()` images of `height x width` raw intensities.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBatch {
    count: usize,
    height: usize,
    width: usize,
    pixels: Vec<f32>,
}

impl ImageBatch {
    pub fn new(
        count: usize,
        height: usize,
        width: usize,
        pixels: Vec<f32>,
    ) -> Result<Self, ServiceError> {
        if height == 0 || width == 0 {
            return Err(ServiceError::Inference(format!(
                "generator produced empty {height}x{width} images"
            )));
        }
        if pixels.len() != count * height * width {
            return Err(ServiceError::Inference(format!(
                "expected {} pixels for {count} images of {height}x{width}, got {}",
                count * height * width,
                pixels.len()
            )));
        }
        Ok(Self {
            count,
            height,
            width,
            pixels,
        })
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn image(&self, index: usize) -> &[f32] {
        let size = self.height * self.width;
        &self.pixels[index * size..(index + 1) * size]
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    pub name: String,
    pub backend: String,
    pub device: String,
    pub size_bytes: u64,
}

/// Result of one `/generate` pipeline run.
#[derive(Debug, Clone)]
pub struct GenerationResponse {
    pub image_url: String,
    pub samples: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latent_vectors_are_row_major() {
        let batch = LatentBatch::new(2, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.vector(1), &[2.0, 3.0]);
    }

    #[test]
    fn ragged_latent_values_are_rejected() {
        assert!(LatentBatch::new(4, vec![0.0; 10]).is_err());
        assert!(LatentBatch::new(0, Vec::new()).is_err());
    }

    #[test]
    fn image_batch_checks_pixel_count() {
        assert!(ImageBatch::new(2, 2, 2, vec![0.0; 8]).is_ok());
        let err = ImageBatch::new(2, 2, 2, vec![0.0; 7]).unwrap_err();
        assert!(matches!(err, ServiceError::Inference(_)));
    }
}
