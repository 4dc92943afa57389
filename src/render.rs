//! Turns a generator batch into one composite JPEG on disk.

use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use image::{
    GrayImage, Luma,
    codecs::jpeg::JpegEncoder,
    imageops::{self, FilterType},
};
use tracing::debug;

use crate::{
    config::{AppConfig, OutputMode},
    error::ServiceError,
    model::{Generator, ImageBatch, LabelBatch, LatentBatch},
};

/// URL prefix the static directory is mounted under.
pub const STATIC_URL_PREFIX: &str = "/static";

const GENERATED_SUBDIR: &str = "generated";
const BACKGROUND: Luma<u8> = Luma([255]);

#[derive(Debug, Clone, Copy)]
pub struct RenderStyle {
    /// Integer upscaling factor applied to every generated image.
    pub cell_scale: u32,
    /// Blank pixels between cells and around the grid.
    pub gutter: u32,
    pub jpeg_quality: u8,
}

impl RenderStyle {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            cell_scale: config.cell_scale,
            gutter: config.cell_scale * 2,
            jpeg_quality: config.jpeg_quality,
        }
    }
}

/// Filesystem location of a composite and the URL it is served at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub path: PathBuf,
    pub url: String,
}

impl OutputTarget {
    pub fn for_request(config: &AppConfig) -> Self {
        match config.output_mode {
            OutputMode::Shared => Self {
                path: config.static_dir.join(&config.output_file),
                url: format!("{STATIC_URL_PREFIX}/{}", config.output_file),
            },
            OutputMode::PerRequest => {
                let file = Path::new(&config.output_file);
                let stem = file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "digimg".to_string());
                let ext = file
                    .extension()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "jpg".to_string());
                let name = format!("{stem}-{}.{ext}", uuid::Uuid::new_v4().simple());
                Self {
                    path: config.static_dir.join(GENERATED_SUBDIR).join(&name),
                    url: format!("{STATIC_URL_PREFIX}/{GENERATED_SUBDIR}/{name}"),
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub path: PathBuf,
    pub url: String,
    pub width: u32,
    pub height: u32,
}

/// Runs the generator on one batch and writes the `grid_size x grid_size`
/// composite to `target`, blocking until the file is synced.
pub fn render(
    generator: &dyn Generator,
    latents: &LatentBatch,
    labels: &LabelBatch,
    grid_size: usize,
    target: &OutputTarget,
    style: &RenderStyle,
) -> Result<RenderedImage, ServiceError> {
    let expected = grid_size * grid_size;
    for actual in [latents.len(), labels.len()] {
        if actual != expected {
            return Err(ServiceError::ShapeMismatch { expected, actual });
        }
    }

    let images = generator.predict(latents, labels)?;
    if images.len() != expected {
        return Err(ServiceError::ShapeMismatch {
            expected,
            actual: images.len(),
        });
    }

    let composite = compose_grid(&images, grid_size, style)?;
    write_jpeg(&target.path, &composite, style.jpeg_quality)?;
    debug!(path = %target.path.display(), width = composite.width(), "composite written");

    Ok(RenderedImage {
        path: target.path.clone(),
        url: target.url.clone(),
        width: composite.width(),
        height: composite.height(),
    })
}

/// Tiles the first `grid_size²` images row-major on a white canvas.
///
/// Each image is stretched to its own min/max and drawn with a reversed gray
/// map, so the highest intensity is black and constant images are blank.
pub fn compose_grid(
    images: &ImageBatch,
    grid_size: usize,
    style: &RenderStyle,
) -> Result<GrayImage, ServiceError> {
    let cells = grid_size * grid_size;
    if images.len() < cells {
        return Err(ServiceError::ShapeMismatch {
            expected: cells,
            actual: images.len(),
        });
    }

    let scale = style.cell_scale.max(1);
    let (src_w, src_h) = (images.width() as u32, images.height() as u32);
    let (cell_w, cell_h) = (src_w * scale, src_h * scale);
    let grid = grid_size as u32;
    let canvas_w = grid * cell_w + (grid + 1) * style.gutter;
    let canvas_h = grid * cell_h + (grid + 1) * style.gutter;

    let mut canvas = GrayImage::from_pixel(canvas_w, canvas_h, BACKGROUND);
    for index in 0..cells {
        let cell = to_gray_reversed(images.image(index), src_w, src_h);
        let cell = imageops::resize(&cell, cell_w, cell_h, FilterType::Nearest);

        let (row, col) = ((index / grid_size) as u32, (index % grid_size) as u32);
        let x = style.gutter + col * (cell_w + style.gutter);
        let y = style.gutter + row * (cell_h + style.gutter);
        imageops::replace(&mut canvas, &cell, i64::from(x), i64::from(y));
    }

    Ok(canvas)
}

fn to_gray_reversed(pixels: &[f32], width: u32, height: u32) -> GrayImage {
    let (min, max) = pixels
        .iter()
        .filter(|v| v.is_finite())
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = max - min;

    GrayImage::from_fn(width, height, |x, y| {
        let value = pixels[(y * width + x) as usize];
        let norm = if range > 0.0 && value.is_finite() {
            ((value - min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Luma([(255.0 * (1.0 - norm)).round() as u8])
    })
}

fn write_jpeg(path: &Path, image: &GrayImage, quality: u8) -> Result<(), ServiceError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut writer = BufWriter::new(File::create(path)?);
    JpegEncoder::new_with_quality(&mut writer, quality).encode_image(image)?;
    let file = writer.into_inner().map_err(|e| e.into_error())?;
    file.sync_all()?;
    Ok(())
}
