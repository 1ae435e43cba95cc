use crate::error::AppError;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use ndarray::Array4;
use serde::Deserialize;

pub const IMAGE_MEAN: f32 = 128.0;
pub const IMAGE_STD: f32 = 128.0;
const CHANNELS: usize = 3;

/// Order in which a pixel's channels are written into the tensor. Must match
/// the order the model was trained with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOrder {
    #[default]
    Rgb,
    Rbg,
    Bgr,
}

impl ChannelOrder {
    fn indices(self) -> [usize; CHANNELS] {
        match self {
            ChannelOrder::Rgb => [0, 1, 2],
            ChannelOrder::Rbg => [0, 2, 1],
            ChannelOrder::Bgr => [2, 1, 0],
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EncoderOptions {
    pub channel_order: ChannelOrder,
    pub mean: f32,
    pub std: f32,
}

impl Default for EncoderOptions {
    fn default() -> Self {
        Self {
            channel_order: ChannelOrder::Rgb,
            mean: IMAGE_MEAN,
            std: IMAGE_STD,
        }
    }
}

/// A batch-of-one image tensor in NHWC layout.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    width: u32,
    height: u32,
    data: Vec<f32>,
}

impl Tensor {
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn shape(&self) -> [usize; 4] {
        [1, self.height as usize, self.width as usize, CHANNELS]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    /// Raw bytes in the platform's native byte order.
    pub fn to_ne_bytes(&self) -> Vec<u8> {
        self.data.iter().flat_map(|v| v.to_ne_bytes()).collect()
    }

    pub fn to_array(&self) -> Result<Array4<f32>, AppError> {
        let [n, h, w, c] = self.shape();
        Array4::from_shape_vec((n, h, w, c), self.data.clone())
            .map_err(|e| AppError::Inference(format!("Failed to create tensor: {}", e)))
    }
}

pub fn encode(image: &DynamicImage, target_width: u32, target_height: u32) -> Result<Tensor, AppError> {
    encode_with(image, target_width, target_height, &EncoderOptions::default())
}

pub fn encode_with(
    image: &DynamicImage,
    target_width: u32,
    target_height: u32,
    options: &EncoderOptions,
) -> Result<Tensor, AppError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(AppError::InvalidImage { width: w, height: h });
    }
    if target_width == 0 || target_height == 0 {
        return Err(AppError::InvalidImage {
            width: target_width,
            height: target_height,
        });
    }

    let rgb = if (w, h) == (target_width, target_height) {
        image.to_rgb8()
    } else {
        image
            .resize_exact(target_width, target_height, FilterType::Triangle)
            .to_rgb8()
    };

    // ImageBuffer stores pixels row-major, so the raw buffer is already in
    // traversal order.
    let order = options.channel_order.indices();
    let raw = rgb.as_raw();
    let mut data = Vec::with_capacity(raw.len());
    for pixel in raw.chunks_exact(CHANNELS) {
        for &c in &order {
            data.push((pixel[c] as f32 - options.mean) / options.std);
        }
    }

    Ok(Tensor {
        width: target_width,
        height: target_height,
        data,
    })
}
