use parking_lot::Mutex;
use rand::{
    Rng, RngCore, SeedableRng,
    distributions::{Distribution, Uniform},
    rngs::StdRng,
};
use rand_distr::StandardNormal;

use crate::{
    error::ServiceError,
    model::{LabelBatch, LatentBatch},
    validation::TargetDigit,
};

/// Exclusive upper bound of the cache-busting query token.
pub const CACHE_TOKEN_UPPER_BOUND: u32 = 1_000_000;

/// Builds `n` standard-normal latent vectors of length `latent_dim` and `n`
/// copies of `digit` as conditioning labels.
pub fn generate_samples<R: Rng + ?Sized>(
    rng: &mut R,
    latent_dim: usize,
    n: usize,
    digit: TargetDigit,
) -> Result<(LatentBatch, LabelBatch), ServiceError> {
    let values: Vec<f32> = (0..latent_dim * n)
        .map(|_| Distribution::<f32>::sample(&StandardNormal, rng))
        .collect();
    let latents = LatentBatch::new(latent_dim, values)?;
    Ok((latents, LabelBatch::repeat(digit, n)))
}

/// Process-wide random source shared by request handlers.
pub struct LatentSampler {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl LatentSampler {
    pub fn new<R>(rng: R) -> Self
    where
        R: RngCore + Send + 'static,
    {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }

    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn sample(
        &self,
        latent_dim: usize,
        n: usize,
        digit: TargetDigit,
    ) -> Result<(LatentBatch, LabelBatch), ServiceError> {
        let mut rng = self.rng.lock();
        generate_samples(&mut **rng, latent_dim, n, digit)
    }

    pub fn cache_token(&self) -> u32 {
        let mut rng = self.rng.lock();
        Uniform::from(0..CACHE_TOKEN_UPPER_BOUND).sample(&mut **rng)
    }
}
