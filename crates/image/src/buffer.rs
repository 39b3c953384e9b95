use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::Path;

/// Layout of one pixel in an [`ImageBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb8,
    Rgba8,
    Rgb32F,
    Rgba32F,
}

impl PixelFormat {
    /// Channels per pixel.
    pub fn channels(self) -> usize {
        match self {
            Self::Rgb8 | Self::Rgb32F => 3,
            Self::Rgba8 | Self::Rgba32F => 4,
        }
    }

    /// Full value range of one channel sample.
    pub fn channel_range(self) -> f64 {
        match self {
            Self::Rgb8 | Self::Rgba8 => 255.0,
            Self::Rgb32F | Self::Rgba32F => 1.0,
        }
    }

    pub fn is_float(self) -> bool {
        matches!(self, Self::Rgb32F | Self::Rgba32F)
    }
}

/// Row-major channel samples.
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    U8(Vec<u8>),
    F32(Vec<f32>),
}

impl Samples {
    pub fn len(&self) -> usize {
        match self {
            Self::U8(s) => s.len(),
            Self::F32(s) => s.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Errors from building, loading or comparing image buffers.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("dimension mismatch: actual {actual:?}, reference {reference:?}")]
    DimensionMismatch {
        actual: (u32, u32),
        reference: (u32, u32),
    },
    #[error("pixel format mismatch: actual {actual:?}, reference {reference:?}")]
    FormatMismatch {
        actual: PixelFormat,
        reference: PixelFormat,
    },
    #[error("{format:?} image of {width}x{height} needs {expected} samples, got {actual}")]
    SampleCount {
        format: PixelFormat,
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("image codec error: {0}")]
    Codec(#[from] image::ImageError),
}

/// A captured or reference frame.
///
/// Buffers are immutable once built; comparison only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    samples: Samples,
}

impl ImageBuffer {
    /// Build a buffer, checking that the sample count matches the shape.
    pub fn new(
        width: u32,
        height: u32,
        format: PixelFormat,
        samples: Samples,
    ) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * format.channels();
        let kind_ok = match samples {
            Samples::U8(_) => !format.is_float(),
            Samples::F32(_) => format.is_float(),
        };
        if !kind_ok || samples.len() != expected {
            return Err(ImageError::SampleCount {
                format,
                width,
                height,
                expected,
                actual: samples.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            samples,
        })
    }

    pub fn from_rgba8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelFormat::Rgba8, Samples::U8(data))
    }

    pub fn from_rgb8(width: u32, height: u32, data: Vec<u8>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelFormat::Rgb8, Samples::U8(data))
    }

    pub fn from_rgb32f(width: u32, height: u32, data: Vec<f32>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelFormat::Rgb32F, Samples::F32(data))
    }

    pub fn from_rgba32f(width: u32, height: u32, data: Vec<f32>) -> Result<Self, ImageError> {
        Self::new(width, height, PixelFormat::Rgba32F, Samples::F32(data))
    }

    /// A single-color RGBA8 image.
    pub fn filled_rgba8(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = width as usize * height as usize;
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            format: PixelFormat::Rgba8,
            samples: Samples::U8(data),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn samples(&self) -> &Samples {
        &self.samples
    }

    /// 8-bit samples, if this is an 8-bit image.
    pub fn as_u8(&self) -> Option<&[u8]> {
        match &self.samples {
            Samples::U8(s) => Some(s),
            Samples::F32(_) => None,
        }
    }

    /// RGBA of one pixel, widened to four 8-bit channels.
    pub fn pixel_rgba8(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let channels = self.format.channels();
        let base = (y as usize * self.width as usize + x as usize) * channels;
        let mut out = [0, 0, 0, 255];
        for (c, slot) in out.iter_mut().enumerate().take(channels) {
            *slot = match &self.samples {
                Samples::U8(s) => s[base + c],
                Samples::F32(s) => quantize(s[base + c]),
            };
        }
        Some(out)
    }

    /// The same image as RGBA8, converting float samples and adding opaque alpha.
    pub fn to_rgba8(&self) -> ImageBuffer {
        if self.format == PixelFormat::Rgba8 {
            return self.clone();
        }
        let mut data = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for y in 0..self.height {
            for x in 0..self.width {
                if let Some(px) = self.pixel_rgba8(x, y) {
                    data.extend_from_slice(&px);
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            format: PixelFormat::Rgba8,
            samples: Samples::U8(data),
        }
    }

    /// Content digest over shape, format and samples, prefixed with `sha256:`.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.width.to_le_bytes());
        hasher.update(self.height.to_le_bytes());
        hasher.update([self.format.channels() as u8, self.format.is_float() as u8]);
        match &self.samples {
            Samples::U8(s) => hasher.update(s),
            Samples::F32(s) => {
                for v in s {
                    hasher.update(v.to_le_bytes());
                }
            }
        }
        let hex: String = hasher
            .finalize()
            .iter()
            .map(|b| format!("{b:02x}"))
            .collect();
        format!("sha256:{hex}")
    }

    /// Decode an image file. RGB files stay RGB; everything else becomes RGBA8
    /// unless it is stored as float.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImageError> {
        let decoded = image::ImageReader::open(path.as_ref())?
            .with_guessed_format()?
            .decode()?;
        let (width, height) = (decoded.width(), decoded.height());
        let buffer = match decoded.color() {
            image::ColorType::Rgb8 => Self::from_rgb8(width, height, decoded.into_rgb8().into_raw()),
            image::ColorType::Rgb32F => {
                Self::from_rgb32f(width, height, decoded.into_rgb32f().into_raw())
            }
            image::ColorType::Rgba32F => {
                Self::from_rgba32f(width, height, decoded.into_rgba32f().into_raw())
            }
            _ => Self::from_rgba8(width, height, decoded.into_rgba8().into_raw()),
        }?;
        tracing::trace!(path = %path.as_ref().display(), width, height, "image loaded");
        Ok(buffer)
    }

    /// Encode as PNG. Float images are quantized to 8 bits per channel.
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), ImageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let (bytes, color) = match (&self.samples, self.format) {
            (Samples::U8(s), PixelFormat::Rgb8) => (s.clone(), image::ColorType::Rgb8),
            (Samples::U8(s), _) => (s.clone(), image::ColorType::Rgba8),
            (Samples::F32(s), PixelFormat::Rgb32F) => {
                (s.iter().map(|v| quantize(*v)).collect(), image::ColorType::Rgb8)
            }
            (Samples::F32(s), _) => {
                (s.iter().map(|v| quantize(*v)).collect(), image::ColorType::Rgba8)
            }
        };
        image::save_buffer_with_format(
            path,
            &bytes,
            self.width,
            self.height,
            color,
            image::ImageFormat::Png,
        )?;
        Ok(())
    }

    /// Mutable 8-bit samples, for building reference images.
    pub fn as_u8_mut(&mut self) -> Option<&mut [u8]> {
        match &mut self.samples {
            Samples::U8(s) => Some(s),
            Samples::F32(_) => None,
        }
    }
}

fn quantize(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_wrong_sample_count() {
        let err = ImageBuffer::from_rgba8(2, 2, vec![0; 15]).unwrap_err();
        assert!(matches!(
            err,
            ImageError::SampleCount {
                expected: 16,
                actual: 15,
                ..
            }
        ));
    }

    #[test]
    fn new_rejects_float_samples_for_byte_format() {
        let err = ImageBuffer::new(1, 1, PixelFormat::Rgb8, Samples::F32(vec![0.0; 3]));
        assert!(err.is_err());
    }

    #[test]
    fn filled_image_has_uniform_pixels() {
        let img = ImageBuffer::filled_rgba8(3, 2, [10, 20, 30, 255]);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.pixel_rgba8(2, 1), Some([10, 20, 30, 255]));
        assert_eq!(img.pixel_rgba8(3, 0), None);
    }

    #[test]
    fn float_pixels_quantize_to_bytes() {
        let img = ImageBuffer::from_rgb32f(1, 1, vec![0.75, 0.5, 0.25]).unwrap();
        assert_eq!(img.pixel_rgba8(0, 0), Some([191, 128, 64, 255]));
        assert_eq!(img.to_rgba8().format(), PixelFormat::Rgba8);
    }

    #[test]
    fn digest_changes_with_content() {
        let a = ImageBuffer::filled_rgba8(4, 4, [0, 0, 0, 255]);
        let mut b = a.clone();
        assert_eq!(a.digest(), b.digest());
        b.as_u8_mut().unwrap()[0] = 1;
        assert_ne!(a.digest(), b.digest());
        assert!(a.digest().starts_with("sha256:"));
    }

    #[test]
    fn png_save_and_load_preserves_rgba8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("frame.png");
        let mut img = ImageBuffer::filled_rgba8(5, 3, [191, 128, 64, 255]);
        img.as_u8_mut().unwrap()[7] = 0;
        img.save_png(&path).unwrap();

        let loaded = ImageBuffer::load(&path).unwrap();
        assert_eq!(loaded, img);
    }

    #[test]
    fn png_save_and_load_preserves_rgb8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rgb.png");
        let img = ImageBuffer::from_rgb8(2, 1, vec![1, 2, 3, 4, 5, 6]).unwrap();
        img.save_png(&path).unwrap();
        assert_eq!(ImageBuffer::load(&path).unwrap(), img);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ImageBuffer::load(dir.path().join("absent.png")).unwrap_err();
        assert!(matches!(err, ImageError::Io(_)));
    }
}
