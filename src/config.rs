use std::{
    env,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    str::FromStr,
};

use serde::Serialize;

#[cfg(feature = "tch-backend")]
use tch::Device;

/// Where composite images are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutputMode {
    /// One fixed file rewritten by every request. Concurrent requests race on it.
    Shared,
    /// A uniquely named file per request under `generated/`.
    PerRequest,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "shared" => Ok(OutputMode::Shared),
            "per-request" | "per_request" | "unique" => Ok(OutputMode::PerRequest),
            other => Err(format!("unknown output mode '{other}'")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub generator_module_path: PathBuf,
    pub latent_dim: usize,
    pub grid_size: usize,
    pub static_dir: PathBuf,
    pub output_file: String,
    pub output_mode: OutputMode,
    pub cell_scale: u32,
    pub jpeg_quality: u8,
    #[cfg(feature = "tch-backend")]
    pub device: Device,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            generator_module_path: PathBuf::from("models/generator.pt"),
            latent_dim: 10,
            grid_size: 3,
            static_dir: PathBuf::from("static"),
            output_file: "digimg.jpg".to_string(),
            output_mode: OutputMode::Shared,
            cell_scale: 4,
            jpeg_quality: 90,
            #[cfg(feature = "tch-backend")]
            device: Device::Cpu,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let listen_addr = env::var("SERVER_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:5000".into())
            .parse()
            .unwrap_or_else(|_| default_listen_addr());

        let generator_module_path = env::var("GENERATOR_MODULE_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.generator_module_path);

        let latent_dim = env::var("LATENT_DIM")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&dim| dim > 0)
            .unwrap_or(defaults.latent_dim);
        let grid_size = env::var("GRID_SIZE")
            .ok()
            .and_then(|v| v.parse::<usize>().ok())
            .filter(|&size| size > 0)
            .unwrap_or(defaults.grid_size);

        let static_dir = env::var("STATIC_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.static_dir);
        let output_file = env::var("OUTPUT_FILE").unwrap_or(defaults.output_file);
        let output_mode = env::var("OUTPUT_MODE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.output_mode);

        let cell_scale = env::var("CELL_SCALE")
            .ok()
            .and_then(|v| v.parse::<u32>().ok())
            .filter(|&scale| scale > 0)
            .unwrap_or(defaults.cell_scale);
        let jpeg_quality = env::var("JPEG_QUALITY")
            .ok()
            .and_then(|v| v.parse::<u8>().ok())
            .filter(|q| (1..=100).contains(q))
            .unwrap_or(defaults.jpeg_quality);

        #[cfg(feature = "tch-backend")]
        let device = {
            let raw = env::var("DEVICE").unwrap_or_else(|_| "cpu".into());
            parse_device(&raw)
        };

        Ok(Self {
            listen_addr,
            generator_module_path,
            latent_dim,
            grid_size,
            static_dir,
            output_file,
            output_mode,
            cell_scale,
            jpeg_quality,
            #[cfg(feature = "tch-backend")]
            device,
        })
    }

    /// Number of samples per request, `grid_size²`.
    pub fn batch_size(&self) -> usize {
        self.grid_size * self.grid_size
    }
}

fn default_listen_addr() -> SocketAddr {
    SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 5000)
}

#[cfg(feature = "tch-backend")]
fn parse_device(raw: &str) -> Device {
    let lower = raw.to_lowercase();
    if lower == "cpu" {
        Device::Cpu
    } else if lower.starts_with("cuda") {
        let idx = lower
            .split(':')
            .nth(1)
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(0);
        if tch::Cuda::is_available() {
            Device::Cuda(idx)
        } else {
            tracing::warn!(requested = %raw, "CUDA unavailable, falling back to CPU");
            Device::Cpu
        }
    } else {
        Device::Cpu
    }
}
