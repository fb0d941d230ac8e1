use anyhow::{anyhow, Result};
use fast_image_resize as fr;
use fr::images::Image;

/// Fit an RGB buffer into a `dst_w x dst_h` canvas, preserving aspect ratio
/// and centering on black (letterbox). SIMD resize via fast_image_resize.
pub fn letterbox_rgb(
    src: &[u8],
    src_w: u32,
    src_h: u32,
    dst_w: u32,
    dst_h: u32,
) -> Result<Vec<u8>> {
    if src_w == 0 || src_h == 0 || dst_w == 0 || dst_h == 0 {
        return Err(anyhow!(
            "Invalid letterbox dimensions: {}x{} -> {}x{}",
            src_w,
            src_h,
            dst_w,
            dst_h
        ));
    }
    if src.len() < (src_w * src_h * 3) as usize {
        return Err(anyhow!(
            "RGB buffer too short: {} bytes for {}x{}",
            src.len(),
            src_w,
            src_h
        ));
    }

    let (new_w, new_h) = fit_dimensions(src_w, src_h, dst_w, dst_h);

    let src_image = Image::from_vec_u8(src_w, src_h, src.to_vec(), fr::PixelType::U8x3)?;
    let mut dst_image = Image::new(new_w, new_h, fr::PixelType::U8x3);

    let mut resizer = fr::Resizer::new();
    resizer.resize(&src_image, &mut dst_image, None)?;

    let mut canvas = vec![0u8; (dst_w * dst_h * 3) as usize];
    let x_off = ((dst_w - new_w) / 2) as usize;
    let y_off = ((dst_h - new_h) / 2) as usize;
    let scaled = dst_image.buffer();

    for y in 0..new_h as usize {
        let src_offset = y * new_w as usize * 3;
        let dst_offset = ((y_off + y) * dst_w as usize + x_off) * 3;
        let len = new_w as usize * 3;
        canvas[dst_offset..dst_offset + len].copy_from_slice(&scaled[src_offset..src_offset + len]);
    }

    Ok(canvas)
}

/// Largest size with the source aspect ratio that fits the target box.
pub fn fit_dimensions(src_w: u32, src_h: u32, dst_w: u32, dst_h: u32) -> (u32, u32) {
    let scale_w = dst_w as f64 / src_w as f64;
    let scale_h = dst_h as f64 / src_h as f64;
    let scale = scale_w.min(scale_h);
    let w = ((src_w as f64 * scale).round() as u32).clamp(1, dst_w);
    let h = ((src_h as f64 * scale).round() as u32).clamp(1, dst_h);
    (w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_dimensions_wide_source() {
        // 1920x1080 into a 100x100 box: width-bound
        assert_eq!(fit_dimensions(1920, 1080, 100, 100), (100, 56));
    }

    #[test]
    fn test_fit_dimensions_tall_source() {
        assert_eq!(fit_dimensions(1080, 1920, 100, 100), (56, 100));
    }

    #[test]
    fn test_fit_dimensions_never_zero() {
        let (w, h) = fit_dimensions(4000, 10, 20, 20);
        assert!(w >= 1 && h >= 1);
    }

    #[test]
    fn test_letterbox_centers_on_black() {
        // 2x2 white into 4x2: one column of padding each side
        let src = vec![255u8; 2 * 2 * 3];
        let canvas = letterbox_rgb(&src, 2, 2, 4, 2).unwrap();
        assert_eq!(canvas.len(), 4 * 2 * 3);
        // first pixel of row 0 is padding
        assert_eq!(&canvas[0..3], &[0, 0, 0]);
        // second pixel is content
        assert_eq!(&canvas[3..6], &[255, 255, 255]);
    }

    #[test]
    fn test_letterbox_rejects_short_buffer() {
        assert!(letterbox_rgb(&[0u8; 3], 2, 2, 4, 4).is_err());
    }
}
