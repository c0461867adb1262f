//! PNG raster codec.
//!
//! Every raster the engine touches is an 8-bit RGBA buffer; whatever the
//! source encoding, decoding normalizes to [`RgbaImage`].

use crate::result::{ComparError, ComparResult};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Decode PNG (or any format the `image` crate recognizes) into RGBA8.
pub fn decode_png(bytes: &[u8]) -> ComparResult<RgbaImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| ComparError::codec(format!("Failed to decode image: {e}")))?;
    Ok(img.to_rgba8())
}

/// Encode an RGBA8 raster as PNG.
pub fn encode_png(raster: &RgbaImage) -> ComparResult<Vec<u8>> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer)
        .write_image(
            raster.as_raw(),
            raster.width(),
            raster.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| ComparError::codec(format!("Failed to encode image: {e}")))?;
    Ok(buffer)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_encoded_png_decodes_to_same_pixels() {
        let mut img = RgbaImage::from_pixel(3, 2, Rgba([10, 20, 30, 255]));
        img.put_pixel(1, 1, Rgba([0, 0, 0, 0]));

        let bytes = encode_png(&img).unwrap();
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);

        let decoded = decode_png(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (3, 2));
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_decode_garbage_is_codec_error() {
        let err = decode_png(&[0, 1, 2, 3]).unwrap_err();
        assert!(matches!(err, ComparError::Codec { .. }));
    }
}
