use crate::error::PreprocessError;
use image::{DynamicImage, ImageBuffer, ImageReader, RgbImage};
use ndarray::{ArrayD, s};
use std::path::{Path, PathBuf};

/// Raw pixel array as produced by camera or video decoders.
///
/// Shapes accepted are `(h, w)` and `(h, w, c)` with `c` in 1..=4. Three
/// channel arrays are interpreted as BGR, the OpenCV convention.
#[derive(Debug, Clone)]
pub struct PixelArray(pub ArrayD<u8>);

/// Anything the classifier can take an image from.
#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Pixels(PixelArray),
    Image(DynamicImage),
}

impl From<&Path> for ImageInput {
    fn from(path: &Path) -> Self {
        ImageInput::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for ImageInput {
    fn from(path: PathBuf) -> Self {
        ImageInput::Path(path)
    }
}

impl From<&str> for ImageInput {
    fn from(path: &str) -> Self {
        ImageInput::Path(PathBuf::from(path))
    }
}

impl From<DynamicImage> for ImageInput {
    fn from(image: DynamicImage) -> Self {
        ImageInput::Image(image)
    }
}

impl From<ArrayD<u8>> for ImageInput {
    fn from(pixels: ArrayD<u8>) -> Self {
        ImageInput::Pixels(PixelArray(pixels))
    }
}

impl ImageInput {
    /// Resolve the input to an 8-bit RGB image.
    pub fn into_rgb(self) -> Result<RgbImage, PreprocessError> {
        let image = match self {
            ImageInput::Path(path) => {
                tracing::trace!(path = %path.display(), "Decoding image file");
                ImageReader::open(&path)?.with_guessed_format()?.decode()?
            }
            ImageInput::Pixels(pixels) => pixels.into_dynamic()?,
            ImageInput::Image(image) => image,
        };

        if image.width() == 0 || image.height() == 0 {
            return Err(PreprocessError::UnsupportedShape {
                shape: vec![image.height() as usize, image.width() as usize],
            });
        }
        Ok(image.to_rgb8())
    }
}

impl PixelArray {
    fn into_dynamic(self) -> Result<DynamicImage, PreprocessError> {
        let shape = self.0.shape().to_vec();

        let (height, width, channels) = match shape.as_slice() {
            [h, w] => (*h, *w, 1),
            [h, w, c] if (1..=4).contains(c) => (*h, *w, *c),
            _ => return Err(PreprocessError::UnsupportedShape { shape }),
        };
        if height == 0 || width == 0 {
            return Err(PreprocessError::UnsupportedShape { shape });
        }

        // Iteration is in logical order, so reversed views come out re-packed.
        let raw: Vec<u8> = if channels == 3 {
            self.0.slice(s![.., .., ..;-1]).iter().copied().collect()
        } else {
            self.0.iter().copied().collect()
        };

        let expected = height * width * channels;
        if raw.len() != expected {
            return Err(PreprocessError::SizeMismatch {
                expected,
                actual: raw.len(),
            });
        }

        let (w, h) = (width as u32, height as u32);
        let image = match channels {
            1 => ImageBuffer::from_raw(w, h, raw).map(DynamicImage::ImageLuma8),
            2 => ImageBuffer::from_raw(w, h, raw).map(DynamicImage::ImageLumaA8),
            3 => ImageBuffer::from_raw(w, h, raw).map(DynamicImage::ImageRgb8),
            _ => ImageBuffer::from_raw(w, h, raw).map(DynamicImage::ImageRgba8),
        };

        image.ok_or(PreprocessError::UnsupportedShape { shape })
    }
}
