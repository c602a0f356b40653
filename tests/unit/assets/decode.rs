use super::*;
use crate::test_fixture::{png_gray, png_rgb};

#[test]
fn decode_rgba_png_dimensions_and_opaque_alpha() {
    let prepared = decode_rgba(&png_rgb(3, 2, [100, 50, 200]), None).unwrap();
    assert_eq!(prepared.dims(), ImageDims::new(3, 2));
    assert_eq!(prepared.rgba8.len(), 3 * 2 * 4);
    assert_eq!(&prepared.rgba8[..4], &[100, 50, 200, 255]);
}

#[test]
fn decode_luma_png() {
    let prepared = decode_luma(&png_gray(4, 1, 77)).unwrap();
    assert_eq!(prepared.dims(), ImageDims::new(4, 1));
    assert!(prepared.luma8.iter().all(|&v| v == 77));
}

#[test]
fn garbage_and_wrong_format_fail_as_image_decode() {
    assert!(matches!(
        decode_rgba(b"definitely not an image", None),
        Err(LdiError::ImageDecode(_))
    ));
    assert!(matches!(
        decode_rgba(&png_rgb(1, 1, [0, 0, 0]), Some(image::ImageFormat::Jpeg)),
        Err(LdiError::ImageDecode(_))
    ));
}

#[test]
fn pack_writes_mask_into_alpha() {
    let albedo = decode_rgba(&png_rgb(2, 2, [9, 8, 7]), None).unwrap();
    let mask = decode_luma(&png_gray(2, 2, 40)).unwrap();
    let packed = pack_albedo_mask(&albedo, &mask).unwrap();
    assert_eq!(packed.dims(), albedo.dims());
    for px in packed.rgba8.chunks_exact(4) {
        assert_eq!(px, &[9, 8, 7, 40]);
    }
}

#[test]
fn pack_resamples_smaller_mask() {
    let albedo = decode_rgba(&png_rgb(8, 4, [1, 2, 3]), None).unwrap();
    let mask = decode_luma(&png_gray(2, 1, 200)).unwrap();
    let packed = pack_albedo_mask(&albedo, &mask).unwrap();
    assert_eq!(packed.dims(), ImageDims::new(8, 4));
    // uniform source resamples to the same uniform value
    assert!(packed.rgba8.chunks_exact(4).all(|px| px[3] == 200));
}
