use crate::config::{CHANNELS, DEFAULT_INPUT_SIZE};
use crate::error::PreprocessError;
use crate::source::ImageInput;
use common::span;
use fast_image_resize::{
    FilterType, PixelType, ResizeAlg, ResizeOptions, Resizer,
    images::{Image, ImageRef},
};
use image::RgbImage;
use ndarray::Array4;
use std::default::Default;

pub struct CpuPreProcessor {
    pub input_size: (u32, u32),
    resizer: Resizer,
}

impl CpuPreProcessor {
    pub fn new(input_size: (u32, u32)) -> Self {
        Self {
            input_size,
            resizer: Resizer::new(),
        }
    }

    /// Decode, resize and scale an image into a `(1, h, w, 3)` tensor in `[0, 1]`.
    pub fn preprocess(&mut self, input: ImageInput) -> Result<Array4<f32>, PreprocessError> {
        let _s = span!("preprocess_image");

        let rgb = {
            let _s = span!("decode_image");
            input.into_rgb()?
        };

        tracing::trace!(
            width = rgb.width(),
            height = rgb.height(),
            "Preprocessing image dimensions"
        );

        let resized = self.resize(&rgb)?;

        Self::normalize(&resized)
    }

    fn resize(&mut self, rgb: &RgbImage) -> Result<Image<'static>, PreprocessError> {
        let _s = span!("resize_lanczos");

        let src = ImageRef::new(rgb.width(), rgb.height(), rgb.as_raw(), PixelType::U8x3)?;
        let mut resized = Image::new(self.input_size.0, self.input_size.1, PixelType::U8x3);

        self.resizer.resize(
            &src,
            &mut resized,
            &ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Lanczos3)),
        )?;

        Ok(resized)
    }

    fn normalize(image: &Image) -> Result<Array4<f32>, PreprocessError> {
        let _s = span!("normalize");

        let width = image.width() as usize;
        let height = image.height() as usize;
        let buf = image.buffer();

        let expected = width * height * CHANNELS;
        if buf.len() != expected {
            return Err(PreprocessError::SizeMismatch {
                expected,
                actual: buf.len(),
            });
        }

        let output: Vec<f32> = buf.iter().map(|&v| v as f32 / 255.0).collect();

        Array4::from_shape_vec((1, height, width, CHANNELS), output).map_err(|_| {
            PreprocessError::SizeMismatch {
                expected,
                actual: buf.len(),
            }
        })
    }

    pub fn input_size(&self) -> (u32, u32) {
        self.input_size
    }
}

impl Default for CpuPreProcessor {
    fn default() -> Self {
        Self::new(DEFAULT_INPUT_SIZE)
    }
}
