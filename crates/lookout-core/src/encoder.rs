//! ArcFace encoding extraction via ONNX Runtime.
//!
//! Produces 512-dimensional L2-normalized face encodings from aligned RGB
//! crops, using the w600k_r50 ArcFace model.

use crate::alignment::{self, ALIGNED_SIZE};
use crate::types::{BoundingBox, Encoding};
use ndarray::Array4;
use ort::session::Session;
use ort::value::TensorRef;
use std::path::Path;
use thiserror::Error;

const ARCFACE_MEAN: f32 = 127.5;
// ArcFace normalizes symmetrically; this is not the SCRFD 128.0.
const ARCFACE_STD: f32 = 127.5;
const ARCFACE_ENCODING_DIM: usize = 512;
const ARCFACE_MODEL_VERSION: &str = "w600k_r50";

#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("model file not found: {0} — download from insightface and place in models/")]
    ModelNotFound(String),
    #[error("inference failed: {0}")]
    InferenceFailed(String),
    #[error("face has no landmarks — detector must return landmarks for alignment")]
    NoLandmarks,
    #[error("ort: {0}")]
    Ort(#[from] ort::Error),
}

/// ArcFace-based face encoder.
pub struct FaceEncoder {
    session: Session,
}

impl FaceEncoder {
    /// Load the ArcFace ONNX model from the given path.
    pub fn load(model_path: &str) -> Result<Self, EncoderError> {
        if !Path::new(model_path).exists() {
            return Err(EncoderError::ModelNotFound(model_path.to_string()));
        }

        let session = Session::builder()?
            .with_intra_threads(2)?
            .commit_from_file(model_path)?;

        tracing::info!(path = model_path, "loaded ArcFace model");

        Ok(Self { session })
    }

    /// Extract an encoding for a detected face in a packed RGB24 frame.
    ///
    /// The face must carry landmarks; it is warped to the canonical 112×112
    /// position before the model runs.
    pub fn encode(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        face: &BoundingBox,
    ) -> Result<Encoding, EncoderError> {
        let landmarks = face.landmarks.as_ref().ok_or(EncoderError::NoLandmarks)?;

        let aligned = alignment::align_face(rgb, width, height, landmarks);
        let input = Self::preprocess(&aligned);

        let outputs = self
            .session
            .run(ort::inputs![TensorRef::from_array_view(input.view())?])?;

        let (_, raw_data) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| EncoderError::InferenceFailed(format!("encoding extraction: {e}")))?;

        let raw: Vec<f32> = raw_data.to_vec();
        if raw.len() != ARCFACE_ENCODING_DIM {
            return Err(EncoderError::InferenceFailed(format!(
                "expected {ARCFACE_ENCODING_DIM}-dim encoding, got {}",
                raw.len()
            )));
        }

        // L2-normalize so Euclidean distances live on a fixed scale.
        let norm: f32 = raw.iter().map(|x| x * x).sum::<f32>().sqrt();
        let values = if norm > 0.0 {
            raw.iter().map(|x| x / norm).collect()
        } else {
            raw
        };

        Ok(Encoding {
            values,
            model_version: Some(ARCFACE_MODEL_VERSION.to_string()),
        })
    }

    /// Turn a 112×112 aligned RGB crop into a normalized NCHW tensor.
    fn preprocess(aligned_rgb: &[u8]) -> Array4<f32> {
        let size = ALIGNED_SIZE;
        let mut tensor = Array4::<f32>::zeros((1, 3, size, size));

        for y in 0..size {
            for x in 0..size {
                let off = (y * size + x) * 3;
                for c in 0..3 {
                    let pixel = aligned_rgb.get(off + c).copied().unwrap_or(0) as f32;
                    tensor[[0, c, y, x]] = (pixel - ARCFACE_MEAN) / ARCFACE_STD;
                }
            }
        }

        tensor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preprocess_shape() {
        let aligned = vec![128u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        let tensor = FaceEncoder::preprocess(&aligned);
        assert_eq!(tensor.shape(), &[1, 3, ALIGNED_SIZE, ALIGNED_SIZE]);
    }

    #[test]
    fn preprocess_normalization() {
        let aligned = vec![128u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        let tensor = FaceEncoder::preprocess(&aligned);
        let expected = (128.0 - ARCFACE_MEAN) / ARCFACE_STD;
        assert!((tensor[[0, 0, 0, 0]] - expected).abs() < 1e-6);
    }

    #[test]
    fn preprocess_keeps_channels_distinct() {
        // Every pixel (10, 20, 30): the channel planes must not be mixed.
        let mut aligned = vec![0u8; ALIGNED_SIZE * ALIGNED_SIZE * 3];
        for px in aligned.chunks_exact_mut(3) {
            px.copy_from_slice(&[10, 20, 30]);
        }
        let tensor = FaceEncoder::preprocess(&aligned);
        let norm = |v: u8| (v as f32 - ARCFACE_MEAN) / ARCFACE_STD;
        assert!((tensor[[0, 0, 5, 5]] - norm(10)).abs() < 1e-6);
        assert!((tensor[[0, 1, 5, 5]] - norm(20)).abs() < 1e-6);
        assert!((tensor[[0, 2, 5, 5]] - norm(30)).abs() < 1e-6);
    }

    #[test]
    fn landmarks_are_required() {
        let face = BoundingBox {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            confidence: 0.9,
            landmarks: None,
        };
        // A FaceEncoder needs a model file; the landmark requirement is the
        // first check in encode() and is representable at the type level.
        assert!(face.landmarks.is_none());
    }
}
