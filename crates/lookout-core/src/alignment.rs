//! Face alignment via 4-DOF similarity transform.
//!
//! Warps a detected face to the canonical 112×112 ArcFace position using the
//! five InsightFace reference landmarks and a least-squares fit.

/// ArcFace reference landmarks for a 112×112 output.
const REFERENCE_LANDMARKS_112: [(f32, f32); 5] = [
    (38.2946, 51.6963), // left eye
    (73.5318, 51.5014), // right eye
    (56.0252, 71.7366), // nose
    (41.5493, 92.3655), // left mouth
    (70.7299, 92.2041), // right mouth
];

pub const ALIGNED_SIZE: usize = 112;

/// Estimate a 2×3 similarity transform (scale, rotation, translation) from
/// `src` landmarks to `dst` landmarks by least squares.
///
/// Returns `[a, -b, tx, b, a, ty]` for the matrix
/// ```text
/// | a  -b  tx |
/// | b   a  ty |
/// ```
fn estimate_similarity_transform(src: &[(f32, f32); 5], dst: &[(f32, f32); 5]) -> [f32; 6] {
    // Normal equations for the overdetermined system: each landmark pair
    // contributes two rows over the unknowns [a, b, tx, ty]:
    //   sx*a - sy*b + tx = dx
    //   sy*a + sx*b + ty = dy
    let mut ata = [0.0f32; 16];
    let mut atb = [0.0f32; 4];

    for i in 0..5 {
        let (sx, sy) = src[i];
        let (dx, dy) = dst[i];
        let rows = [([sx, -sy, 1.0, 0.0], dx), ([sy, sx, 0.0, 1.0], dy)];

        for (row, rhs) in rows {
            for j in 0..4 {
                for k in 0..4 {
                    ata[j * 4 + k] += row[j] * row[k];
                }
                atb[j] += row[j] * rhs;
            }
        }
    }

    let x = solve_4x4(&ata, &atb);
    [x[0], -x[1], x[2], x[1], x[0], x[3]]
}

/// Solve a 4×4 linear system by Gaussian elimination with partial pivoting.
#[allow(clippy::needless_range_loop)]
fn solve_4x4(ata: &[f32; 16], atb: &[f32; 4]) -> [f32; 4] {
    let mut m = [[0.0f32; 5]; 4];
    for i in 0..4 {
        for j in 0..4 {
            m[i][j] = ata[i * 4 + j];
        }
        m[i][4] = atb[i];
    }

    for col in 0..4 {
        let mut pivot_row = col;
        for row in (col + 1)..4 {
            if m[row][col].abs() > m[pivot_row][col].abs() {
                pivot_row = row;
            }
        }
        m.swap(col, pivot_row);

        let pivot = m[col][col];
        if pivot.abs() < 1e-12 {
            // Degenerate landmark layout: fall back to identity-ish.
            return [1.0, 0.0, 0.0, 0.0];
        }

        for row in (col + 1)..4 {
            let factor = m[row][col] / pivot;
            for j in col..5 {
                m[row][j] -= factor * m[col][j];
            }
        }
    }

    let mut x = [0.0f32; 4];
    for i in (0..4).rev() {
        x[i] = m[i][4];
        for j in (i + 1)..4 {
            x[i] -= m[i][j] * x[j];
        }
        x[i] /= m[i][i];
    }
    x
}

/// Apply the inverse of a 2×3 similarity warp to produce an RGB output crop.
///
/// Bilinear interpolation per channel; out-of-bounds samples are black.
fn warp_affine_rgb(
    rgb: &[u8],
    src_width: usize,
    src_height: usize,
    matrix: &[f32; 6],
    out_size: usize,
) -> Vec<u8> {
    let (a, tx) = (matrix[0], matrix[2]);
    let (b, ty) = (matrix[3], matrix[5]);

    // M = [[a, -b], [b, a]], det = a² + b²
    let det = a * a + b * b;
    if det.abs() < 1e-12 {
        return vec![0u8; out_size * out_size * 3];
    }
    let ia = a / det;
    let ib = b / det;

    let mut output = vec![0u8; out_size * out_size * 3];

    for oy in 0..out_size {
        for ox in 0..out_size {
            let dx = ox as f32 - tx;
            let dy = oy as f32 - ty;
            let sx = ia * dx + ib * dy;
            let sy = -ib * dx + ia * dy;

            let x0 = sx.floor() as i32;
            let y0 = sy.floor() as i32;
            let fx = sx - x0 as f32;
            let fy = sy - y0 as f32;

            let sample = |x: i32, y: i32, c: usize| -> f32 {
                if x >= 0 && x < src_width as i32 && y >= 0 && y < src_height as i32 {
                    rgb[(y as usize * src_width + x as usize) * 3 + c] as f32
                } else {
                    0.0
                }
            };

            for c in 0..3 {
                let val = sample(x0, y0, c) * (1.0 - fx) * (1.0 - fy)
                    + sample(x0 + 1, y0, c) * fx * (1.0 - fy)
                    + sample(x0, y0 + 1, c) * (1.0 - fx) * fy
                    + sample(x0 + 1, y0 + 1, c) * fx * fy;
                output[(oy * out_size + ox) * 3 + c] = val.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    output
}

/// Align a detected face to a canonical 112×112 RGB crop.
pub fn align_face(
    rgb: &[u8],
    width: u32,
    height: u32,
    landmarks: &[(f32, f32); 5],
) -> Vec<u8> {
    let matrix = estimate_similarity_transform(landmarks, &REFERENCE_LANDMARKS_112);
    warp_affine_rgb(rgb, width as usize, height as usize, &matrix, ALIGNED_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_when_source_equals_reference() {
        let m = estimate_similarity_transform(&REFERENCE_LANDMARKS_112, &REFERENCE_LANDMARKS_112);
        assert!((m[0] - 1.0).abs() < 1e-4, "a = {}", m[0]);
        assert!(m[1].abs() < 1e-4, "-b = {}", m[1]);
        assert!(m[2].abs() < 1e-3, "tx = {}", m[2]);
        assert!(m[3].abs() < 1e-4, "b = {}", m[3]);
        assert!((m[4] - 1.0).abs() < 1e-4, "a = {}", m[4]);
        assert!(m[5].abs() < 1e-3, "ty = {}", m[5]);
    }

    #[test]
    fn doubled_landmarks_fit_a_half_scale() {
        let src: [(f32, f32); 5] = std::array::from_fn(|i| {
            let (x, y) = REFERENCE_LANDMARKS_112[i];
            (x * 2.0, y * 2.0)
        });
        let m = estimate_similarity_transform(&src, &REFERENCE_LANDMARKS_112);
        assert!((m[0] - 0.5).abs() < 0.05, "a = {}, expected ~0.5", m[0]);
    }

    #[test]
    fn warp_output_is_rgb_sized() {
        let rgb = vec![128u8; 320 * 240 * 3];
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let out = warp_affine_rgb(&rgb, 320, 240, &m, ALIGNED_SIZE);
        assert_eq!(out.len(), ALIGNED_SIZE * ALIGNED_SIZE * 3);
    }

    #[test]
    fn warp_preserves_channel_values() {
        // Uniform red frame stays red under the identity warp inside bounds.
        let w = 200usize;
        let h = 200usize;
        let mut rgb = vec![0u8; w * h * 3];
        for px in rgb.chunks_exact_mut(3) {
            px[0] = 200;
        }
        let m = [1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let out = warp_affine_rgb(&rgb, w, h, &m, 112);
        // Sample the center: fully inside the source.
        let center = (56 * 112 + 56) * 3;
        assert_eq!(out[center], 200);
        assert_eq!(out[center + 1], 0);
        assert_eq!(out[center + 2], 0);
    }

    #[test]
    fn bright_patch_lands_near_reference_eye() {
        let w = 200usize;
        let h = 200usize;
        let mut rgb = vec![0u8; w * h * 3];

        let src_landmarks: [(f32, f32); 5] = [
            (80.0, 60.0),
            (120.0, 60.0),
            (100.0, 85.0),
            (85.0, 110.0),
            (115.0, 110.0),
        ];

        // 5x5 white patch at the left eye; survives bilinear interpolation.
        let (lx, ly) = (src_landmarks[0].0 as usize, src_landmarks[0].1 as usize);
        for dy in 0..5 {
            for dx in 0..5 {
                let px = lx - 2 + dx;
                let py = ly - 2 + dy;
                if px < w && py < h {
                    let off = (py * w + px) * 3;
                    rgb[off] = 255;
                    rgb[off + 1] = 255;
                    rgb[off + 2] = 255;
                }
            }
        }

        let aligned = align_face(&rgb, w as u32, h as u32, &src_landmarks);

        let ref_x = REFERENCE_LANDMARKS_112[0].0.round() as usize;
        let ref_y = REFERENCE_LANDMARKS_112[0].1.round() as usize;

        let mut max_val = 0u8;
        for dy in 0..3 {
            for dx in 0..3 {
                let x = ref_x - 1 + dx;
                let y = ref_y - 1 + dy;
                if x < 112 && y < 112 {
                    max_val = max_val.max(aligned[(y * 112 + x) * 3]);
                }
            }
        }
        assert!(max_val > 100, "expected bright patch near ({ref_x}, {ref_y}), max={max_val}");
    }
}
