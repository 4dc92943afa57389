use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::{
    error::ServiceError,
    model::{Generator, ImageBatch, LabelBatch, LatentBatch, ModelMetadata},
};

/// Fake generator that paints image `i` with the constant ramp
/// `pixel[y][x] = label + x` and records every call.
pub struct RecordingGenerator {
    pub side: usize,
    pub calls: AtomicUsize,
    pub last_batch: Mutex<Option<(usize, Vec<i64>)>>,
    pub fail: bool,
}

impl RecordingGenerator {
    pub fn new(side: usize) -> Self {
        Self {
            side,
            calls: AtomicUsize::new(0),
            last_batch: Mutex::new(None),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(4)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Generator for RecordingGenerator {
    fn metadata(&self) -> ModelMetadata {
        ModelMetadata {
            name: "recording".to_string(),
            backend: "fake".to_string(),
            device: "cpu".to_string(),
            size_bytes: 0,
        }
    }

    fn predict(
        &self,
        latents: &LatentBatch,
        labels: &LabelBatch,
    ) -> Result<ImageBatch, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_batch
            .lock()
            .replace((latents.len(), labels.as_slice().to_vec()));
        if self.fail {
            return Err(ServiceError::Inference("fake generator failure".into()));
        }

        let side = self.side;
        let mut pixels = Vec::with_capacity(labels.len() * side * side);
        for &label in labels.as_slice() {
            for _y in 0..side {
                for x in 0..side {
                    pixels.push(label as f32 + x as f32);
                }
            }
        }
        ImageBatch::new(labels.len(), side, side, pixels)
    }
}
