//! Frame type and pixel plumbing — YUYV decoding and bilinear resize.

use thiserror::Error;

/// A captured color frame, packed RGB24 (width * height * 3 bytes).
#[derive(Clone)]
pub struct Frame {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Driver sequence number of the underlying capture buffer.
    pub sequence: u32,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("invalid buffer length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}

impl Frame {
    /// Bilinearly resample into a new resolution.
    pub fn resize(&self, new_width: u32, new_height: u32) -> Frame {
        let src_w = self.width as usize;
        let src_h = self.height as usize;
        let dst_w = new_width as usize;
        let dst_h = new_height as usize;

        let scale_x = src_w as f32 / dst_w as f32;
        let scale_y = src_h as f32 / dst_h as f32;

        let mut data = vec![0u8; dst_w * dst_h * 3];

        for y in 0..dst_h {
            let src_y = (y as f32 + 0.5) * scale_y - 0.5;
            let y0 = (src_y.floor() as i32).clamp(0, src_h as i32 - 1) as usize;
            let y1 = (y0 + 1).min(src_h - 1);
            let fy = (src_y - src_y.floor()).clamp(0.0, 1.0);

            for x in 0..dst_w {
                let src_x = (x as f32 + 0.5) * scale_x - 0.5;
                let x0 = (src_x.floor() as i32).clamp(0, src_w as i32 - 1) as usize;
                let x1 = (x0 + 1).min(src_w - 1);
                let fx = (src_x - src_x.floor()).clamp(0.0, 1.0);

                for c in 0..3 {
                    let tl = self.data[(y0 * src_w + x0) * 3 + c] as f32;
                    let tr = self.data[(y0 * src_w + x1) * 3 + c] as f32;
                    let bl = self.data[(y1 * src_w + x0) * 3 + c] as f32;
                    let br = self.data[(y1 * src_w + x1) * 3 + c] as f32;

                    let val = tl * (1.0 - fx) * (1.0 - fy)
                        + tr * fx * (1.0 - fy)
                        + bl * (1.0 - fx) * fy
                        + br * fx * fy;

                    data[(y * dst_w + x) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
                }
            }
        }

        Frame {
            data,
            width: new_width,
            height: new_height,
            sequence: self.sequence,
        }
    }

    /// Downscale by an integer factor (e.g. 4 for the detection pass).
    pub fn downscale(&self, factor: u32) -> Frame {
        self.resize(
            (self.width / factor).max(1),
            (self.height / factor).max(1),
        )
    }
}

/// Decode packed YUYV 4:2:2 into packed RGB24 using BT.601 coefficients.
///
/// YUYV packs two pixels per 4 bytes: [Y0, U, Y1, V]; both pixels share the
/// chroma pair.
pub fn yuyv_to_rgb(yuyv: &[u8], width: u32, height: u32) -> Result<Vec<u8>, FrameError> {
    let pixels = (width * height) as usize;
    let expected = pixels * 2;
    if yuyv.len() < expected {
        return Err(FrameError::InvalidLength {
            expected,
            actual: yuyv.len(),
        });
    }

    let mut rgb = Vec::with_capacity(pixels * 3);

    for quad in yuyv[..expected].chunks_exact(4) {
        let u = quad[1] as f32 - 128.0;
        let v = quad[3] as f32 - 128.0;

        for &y in [quad[0], quad[2]].iter() {
            let y = y as f32;
            let r = y + 1.402 * v;
            let g = y - 0.344_136 * u - 0.714_136 * v;
            let b = y + 1.772 * u;
            rgb.push(r.round().clamp(0.0, 255.0) as u8);
            rgb.push(g.round().clamp(0.0, 255.0) as u8);
            rgb.push(b.round().clamp(0.0, 255.0) as u8);
        }
    }

    Ok(rgb)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(w: u32, h: u32, px: [u8; 3]) -> Frame {
        let mut data = Vec::with_capacity((w * h * 3) as usize);
        for _ in 0..w * h {
            data.extend_from_slice(&px);
        }
        Frame {
            data,
            width: w,
            height: h,
            sequence: 0,
        }
    }

    #[test]
    fn yuyv_neutral_chroma_decodes_to_gray() {
        // U = V = 128 zeroes both chroma terms.
        let yuyv = vec![100, 128, 200, 128];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb, vec![100, 100, 100, 200, 200, 200]);
    }

    #[test]
    fn yuyv_strong_v_pushes_red() {
        // Y=128, U=128, V=255: r = 128 + 1.402*127 ≈ 306 → clamps to 255,
        // g = 128 - 0.714*127 ≈ 37, b = 128 (neutral U).
        let yuyv = vec![128, 128, 128, 255];
        let rgb = yuyv_to_rgb(&yuyv, 2, 1).unwrap();
        assert_eq!(rgb[0], 255);
        assert_eq!(rgb[1], 37);
        assert_eq!(rgb[2], 128);
    }

    #[test]
    fn yuyv_rejects_short_buffers() {
        let yuyv = vec![100, 128];
        assert!(yuyv_to_rgb(&yuyv, 2, 1).is_err());
    }

    #[test]
    fn yuyv_output_length_matches_pixel_count() {
        let yuyv = vec![0u8; 8 * 2 * 2]; // 8x2 frame
        let rgb = yuyv_to_rgb(&yuyv, 8, 2).unwrap();
        assert_eq!(rgb.len(), 8 * 2 * 3);
    }

    #[test]
    fn resize_keeps_uniform_frames_uniform() {
        let frame = uniform_frame(16, 16, [40, 90, 140]);
        let out = frame.resize(32, 32);
        assert_eq!(out.width, 32);
        assert_eq!(out.height, 32);
        assert!(out
            .data
            .chunks_exact(3)
            .all(|px| px == [40, 90, 140]));
    }

    #[test]
    fn downscale_divides_dimensions() {
        let frame = uniform_frame(64, 48, [10, 10, 10]);
        let out = frame.downscale(4);
        assert_eq!((out.width, out.height), (16, 12));
        assert_eq!(out.data.len(), 16 * 12 * 3);
    }

    #[test]
    fn downscale_never_reaches_zero() {
        let frame = uniform_frame(2, 2, [10, 10, 10]);
        let out = frame.downscale(4);
        assert_eq!((out.width, out.height), (1, 1));
    }
}
