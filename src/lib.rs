pub mod config;
pub mod error;
pub mod model;
pub mod pages;
pub mod render;
pub mod sampling;
pub mod server;
pub mod validation;

pub use config::AppConfig;
pub use model::{Generator, ModelRegistry};
pub use sampling::LatentSampler;
pub use server::build_router;
pub use validation::{TargetDigit, ValidationError, validate};
