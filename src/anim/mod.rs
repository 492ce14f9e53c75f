pub mod player;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek};
use std::path::{Path, PathBuf};
use std::time::Duration;

use glam::UVec2;
use image::codecs::gif::GifDecoder;
use image::{imageops, AnimationDecoder, RgbaImage};
use thiserror::Error;

pub use self::player::AnimationPlayer;

/// Delays under this are treated as "unspecified" by most GIF viewers.
const MIN_FRAME_DELAY: Duration = Duration::from_millis(20);
/// Delay substituted for unspecified ones.
const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("animation file not found: {path}")]
    Missing { path: PathBuf },
    #[error("failed to open animation {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode animation {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("animation {path} has no frames")]
    Empty { path: PathBuf },
    #[error("animation {path} scales to zero size ({width}x{height} at {scale})")]
    ZeroSize {
        path: PathBuf,
        width: u32,
        height: u32,
        scale: f32,
    },
}

pub type AssetResult<T> = std::result::Result<T, AssetError>;

/// One decoded, composited frame.
#[derive(Debug, Clone)]
pub struct Frame {
    pub image: RgbaImage,
    pub delay: Duration,
}

/// A fully decoded animation, scaled once at load time. Immutable.
#[derive(Debug, Clone)]
pub struct AnimationAsset {
    path: PathBuf,
    frames: Vec<Frame>,
}

impl AnimationAsset {
    /// Load and scale an animated GIF from disk.
    pub fn load(path: &Path, scale: f32) -> AssetResult<Self> {
        if !path.exists() {
            return Err(AssetError::Missing {
                path: path.to_path_buf(),
            });
        }
        let file = File::open(path).map_err(|source| AssetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::decode(BufReader::new(file), path, scale)
    }

    /// Decode an animated GIF from any seekable reader. `path` only labels
    /// the asset in logs and errors.
    pub fn decode<R: BufRead + Seek>(reader: R, path: &Path, scale: f32) -> AssetResult<Self> {
        let decode_err = |source| AssetError::Decode {
            path: path.to_path_buf(),
            source,
        };

        let decoder = GifDecoder::new(reader).map_err(decode_err)?;
        let raw = decoder.into_frames().collect_frames().map_err(decode_err)?;

        let mut frames = Vec::with_capacity(raw.len());
        for frame in raw {
            let delay = frame_delay(frame.delay());
            let image = scale_frame(frame.into_buffer(), path, scale)?;
            frames.push(Frame { image, delay });
        }

        Self::from_frames(path, frames)
    }

    /// Build an asset from already-decoded frames. All frames must share the
    /// first frame's dimensions; GIF decoding always composites to the full
    /// logical screen so this holds for decoded files.
    ///
    /// Delays under 20 ms are replaced with 100 ms, so every frame of an
    /// asset lasts a nonzero time.
    pub fn from_frames(path: &Path, mut frames: Vec<Frame>) -> AssetResult<Self> {
        if frames.is_empty() {
            return Err(AssetError::Empty {
                path: path.to_path_buf(),
            });
        }
        for frame in &mut frames {
            frame.delay = playable_delay(frame.delay);
        }
        Ok(Self {
            path: path.to_path_buf(),
            frames,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Frame at `index`, wrapping around the end.
    pub fn frame(&self, index: usize) -> &Frame {
        &self.frames[index % self.frames.len()]
    }

    /// Pixel size of the first frame.
    pub fn size(&self) -> UVec2 {
        let (w, h) = self.frames[0].image.dimensions();
        UVec2::new(w, h)
    }

    /// Length of one full loop.
    pub fn cycle(&self) -> Duration {
        self.frames.iter().map(|f| f.delay).sum()
    }
}

/// Load an asset, logging and swallowing any failure. A missing sprite is
/// never fatal: the state that would show it simply never binds.
pub fn load_optional(path: &Path, scale: f32) -> Option<AnimationAsset> {
    match AnimationAsset::load(path, scale) {
        Ok(asset) => {
            let size = asset.size();
            log::info!(
                "Loaded {} ({} frames, {}x{} px, {:.2}s loop)",
                asset.path().display(),
                asset.frame_count(),
                size.x,
                size.y,
                asset.cycle().as_secs_f32(),
            );
            Some(asset)
        }
        Err(e) => {
            log::warn!("{e}");
            None
        }
    }
}

/// Directory holding the running executable; assets live next to it.
pub fn asset_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
        .unwrap_or_else(|| PathBuf::from("."))
}

fn frame_delay(delay: image::Delay) -> Duration {
    let (numer, denom) = delay.numer_denom_ms();
    let ms = if denom == 0 { 0 } else { numer / denom };
    Duration::from_millis(u64::from(ms))
}

fn playable_delay(delay: Duration) -> Duration {
    if delay < MIN_FRAME_DELAY {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}

fn scale_frame(image: RgbaImage, path: &Path, scale: f32) -> AssetResult<RgbaImage> {
    let (w, h) = image.dimensions();
    if scale == 1.0 {
        return Ok(image);
    }

    // Truncate like an integer cast of the scaled size.
    let nw = (w as f32 * scale) as u32;
    let nh = (h as f32 * scale) as u32;
    if nw == 0 || nh == 0 {
        return Err(AssetError::ZeroSize {
            path: path.to_path_buf(),
            width: w,
            height: h,
            scale,
        });
    }

    Ok(imageops::resize(&image, nw, nh, imageops::FilterType::Triangle))
}
