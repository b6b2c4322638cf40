use image::{DynamicImage, GrayImage, RgbImage};

/// One capture tick: contiguous pixel bytes in row-major order.
///
/// Frames are never mutated once built; annotation and alignment produce
/// new frames.
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    data: Vec<u8>,
    width: u32,
    height: u32,
    channels: u8,
    index: usize,
}

impl Frame {
    pub fn new(data: Vec<u8>, width: u32, height: u32, channels: u8, index: usize) -> Self {
        debug_assert_eq!(
            data.len(),
            (width as usize) * (height as usize) * (channels as usize),
            "data length must equal width * height * channels"
        );
        Self {
            data,
            width,
            height,
            channels,
            index,
        }
    }

    pub fn from_rgb_image(image: RgbImage, index: usize) -> Self {
        let (width, height) = image.dimensions();
        Self::new(image.into_raw(), width, height, 3, index)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Copies the pixels into an `RgbImage`. `None` unless the frame is RGB.
    pub fn to_rgb_image(&self) -> Option<RgbImage> {
        if self.channels != 3 {
            return None;
        }
        RgbImage::from_raw(self.width, self.height, self.data.clone())
    }

    /// Luma image for the cascade classifiers. `None` unless the frame is
    /// RGB or already single-channel.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        match self.channels {
            1 => GrayImage::from_raw(self.width, self.height, self.data.clone()),
            3 => self
                .to_rgb_image()
                .map(|rgb| DynamicImage::ImageRgb8(rgb).to_luma8()),
            _ => None,
        }
    }
}
