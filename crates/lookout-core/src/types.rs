use serde::{Deserialize, Serialize};

/// Factor between the full-resolution frame and the downscaled frame that
/// detection runs on. Detected coordinates are multiplied by this before any
/// full-frame operation (cropping, overlay drawing).
pub const DETECT_DOWNSCALE: u32 = 4;

/// Bounding box for a detected face, with optional facial landmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub confidence: f32,
    /// Five-point facial landmarks: [left_eye, right_eye, nose, left_mouth, right_mouth].
    pub landmarks: Option<[(f32, f32); 5]>,
}

impl BoundingBox {
    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }
}

/// Quantized face location used to deduplicate stranger registrations.
///
/// Built from the unscaled (detection-resolution) box edges, rounded to whole
/// pixels. Exact-match keying: jitter of a pixel between frames produces a
/// different key, which is the reference behavior and is kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl LocationKey {
    pub fn of(face: &BoundingBox) -> Self {
        Self {
            top: face.top().round() as i32,
            right: face.right().round() as i32,
            bottom: face.bottom().round() as i32,
            left: face.left().round() as i32,
        }
    }
}

/// Face encoding vector (512-dimensional for ArcFace), L2-normalized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoding {
    pub values: Vec<f32>,
    /// Model version that produced this encoding (e.g., "w600k_r50").
    pub model_version: Option<String>,
}

impl Encoding {
    /// Euclidean distance to another encoding. On normalized vectors this is
    /// in [0, 2]; lower = more similar.
    pub fn distance(&self, other: &Encoding) -> f32 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// A named gallery entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnownFace {
    pub name: String,
    pub encoding: Encoding,
}

/// Per-frame resolution result for one detected face. Never persisted.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Box in detection (downscaled) coordinates.
    pub face: BoundingBox,
    pub name: String,
    /// `1 - distance` for gallery matches, 1.0 for a freshly minted stranger.
    /// Deliberately not clamped to [0, 1].
    pub confidence: f32,
}

impl Detection {
    pub fn is_stranger(&self) -> bool {
        self.name.starts_with("stranger")
    }
}
