/// Preprocessing functions for input data for the MobileNetV2 classifier.
/// Images are decoded from the uploaded bytes, resized to the fixed input size,
/// and converted into the NHWC layout the Keras export expects.

use image::{imageops::FilterType, DynamicImage};
use ndarray::{Array, Dim};

pub const IMAGE_INPUT_SIZE: usize = 224;
pub const IMAGE_CHANNELS: usize = 3;

/// Decodes an uploaded image. The format is guessed from the bytes themselves;
/// the client's declared content type is not consulted.
pub fn load_image(bytes: &[u8]) -> Result<DynamicImage, image::ImageError>
{
	image::load_from_memory(bytes)
}

/// Resizes to exactly IMAGE_INPUT_SIZE x IMAGE_INPUT_SIZE.
/// The aspect ratio is not preserved.
pub fn resize_image(img: &DynamicImage) -> DynamicImage
{
	img.resize_exact(
		IMAGE_INPUT_SIZE as u32,
		IMAGE_INPUT_SIZE as u32,
		FilterType::CatmullRom)
}

/// Maps a raw channel value from [0, 255] into [-1, 1].
pub fn normalize_channel(value: u8) -> f32
{
	(value as f32) / 127.5 - 1.
}

// Convert the image to the (1, H, W, 3) array expected by MobileNetV2.
// Grayscale, palette and alpha images are flattened to RGB first.
pub fn image_to_mobilenet_format(img: &DynamicImage) -> Array<f32, Dim<[usize; 4]>>
{
	let rgb = img.to_rgb8();
	let (width, height) = rgb.dimensions();

	let mut image_input = Array::zeros((1, height as usize, width as usize, IMAGE_CHANNELS));
	for (x, y, pixel) in rgb.enumerate_pixels()
	{
		let [r, g, b] = pixel.0;
		let (x, y) = (x as usize, y as usize);
		image_input[[0, y, x, 0]] = normalize_channel(r);
		image_input[[0, y, x, 1]] = normalize_channel(g);
		image_input[[0, y, x, 2]] = normalize_channel(b);
	}

	image_input
}

/// Runs the full pipeline from uploaded bytes to a model-ready tensor.
pub fn prepare_input(bytes: &[u8]) -> Result<Array<f32, Dim<[usize; 4]>>, image::ImageError>
{
	let img = load_image(bytes)?;
	let resized = resize_image(&img);
	Ok(image_to_mobilenet_format(&resized))
}

#[cfg(test)]
mod tests
{
	use std::io::Cursor;

	use approx::assert_abs_diff_eq;
	use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, Rgba, RgbaImage};

	use super::*;

	fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8>
	{
		let mut bytes = Vec::new();
		img.write_to(&mut Cursor::new(&mut bytes), format).unwrap();
		bytes
	}

	fn gradient(width: u32, height: u32) -> DynamicImage
	{
		DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
			Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
		}))
	}

	#[test]
	fn tensor_shape_is_fixed_for_any_input_size()
	{
		for (width, height) in [(640, 480), (10, 300), (224, 224), (1, 1), (1000, 37)]
		{
			let bytes = encode(&gradient(width, height), ImageFormat::Png);
			let input = prepare_input(&bytes).unwrap();
			assert_eq!(input.shape(), &[1, IMAGE_INPUT_SIZE, IMAGE_INPUT_SIZE, IMAGE_CHANNELS]);
		}
	}

	#[test]
	fn channel_values_are_scaled_to_unit_range()
	{
		assert_abs_diff_eq!(normalize_channel(0), -1.0);
		assert_abs_diff_eq!(normalize_channel(255), 1.0);
		assert_abs_diff_eq!(normalize_channel(128), 0.0039216, epsilon = 1e-6);

		let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 200, Rgb([255, 255, 255])));
		let input = image_to_mobilenet_format(&resize_image(&white));
		assert_abs_diff_eq!(input, Array::from_elem(input.raw_dim(), 1.0), epsilon = 1e-2);
	}

	#[test]
	fn channels_keep_rgb_order()
	{
		let red = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 80, Rgb([255, 0, 0])));
		let input = image_to_mobilenet_format(&resize_image(&red));
		assert_abs_diff_eq!(input[[0, 10, 20, 0]], 1.0, epsilon = 1e-2);
		assert_abs_diff_eq!(input[[0, 10, 20, 1]], -1.0, epsilon = 1e-2);
		assert_abs_diff_eq!(input[[0, 10, 20, 2]], -1.0, epsilon = 1e-2);
	}

	#[test]
	fn grayscale_and_alpha_images_become_three_channels()
	{
		let gray = DynamicImage::ImageLuma8(GrayImage::from_pixel(64, 64, Luma([0])));
		let input = prepare_input(&encode(&gray, ImageFormat::Png)).unwrap();
		assert_eq!(input.shape(), &[1, 224, 224, 3]);
		assert_abs_diff_eq!(input, Array::from_elem(input.raw_dim(), -1.0), epsilon = 1e-2);

		let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(32, 48, Rgba([0, 255, 0, 128])));
		let input = prepare_input(&encode(&rgba, ImageFormat::Png)).unwrap();
		assert_eq!(input.shape(), &[1, 224, 224, 3]);
		assert_abs_diff_eq!(input[[0, 0, 0, 1]], 1.0, epsilon = 1e-2);
	}

	#[test]
	fn preprocessing_is_deterministic()
	{
		let bytes = encode(&gradient(333, 111), ImageFormat::Png);
		let first = prepare_input(&bytes).unwrap();
		let second = prepare_input(&bytes).unwrap();
		assert_eq!(first, second);
	}

	#[test]
	fn corrupt_bytes_fail_to_decode()
	{
		let err = prepare_input(b"definitely not an image").unwrap_err();
		assert!(!err.to_string().is_empty());

		let png = encode(&gradient(20, 20), ImageFormat::Png);
		let truncated = &png[..png.len() / 2];
		assert!(prepare_input(truncated).is_err());

		assert!(prepare_input(&[]).is_err());
	}
}
