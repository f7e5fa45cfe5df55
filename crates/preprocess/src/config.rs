/// Spatial size (width, height) every image is resized to before inference.
pub const DEFAULT_INPUT_SIZE: (u32, u32) = (128, 128);

/// Number of color channels in the normalized tensor.
pub const CHANNELS: usize = 3;
