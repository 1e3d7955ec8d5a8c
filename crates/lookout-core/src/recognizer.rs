//! The recognizer seam: detection plus encoding behind one trait.
//!
//! Everything above this layer (gallery load, stranger registration, identity
//! resolution) talks to a [`Recognizer`] and never to ONNX directly, so the
//! policy code is testable without model files or a camera.

use crate::detector::{DetectorError, FaceDetector};
use crate::encoder::{EncoderError, FaceEncoder};
use crate::types::{BoundingBox, Encoding};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizerError {
    #[error("detection failed: {0}")]
    Detection(#[from] DetectorError),
    #[error("encoding failed: {0}")]
    Encoding(#[from] EncoderError),
}

/// Face detection and encoding over packed RGB24 frames.
pub trait Recognizer {
    /// Detect faces, returning boxes with landmarks sorted by confidence.
    fn detect(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<BoundingBox>, RecognizerError>;

    /// Extract the encoding for one detected face.
    fn encode(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        face: &BoundingBox,
    ) -> Result<Encoding, RecognizerError>;

    /// Detect-then-encode every face in an image.
    ///
    /// Faces whose encoding fails (e.g. missing landmarks) are skipped; an
    /// image with no usable face yields an empty list, not an error.
    fn encodings_of(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Encoding>, RecognizerError> {
        let faces = self.detect(rgb, width, height)?;
        let mut encodings = Vec::with_capacity(faces.len());
        for face in &faces {
            match self.encode(rgb, width, height, face) {
                Ok(encoding) => encodings.push(encoding),
                Err(err) => {
                    tracing::debug!(error = %err, "skipping face without usable encoding");
                }
            }
        }
        Ok(encodings)
    }
}

/// SCRFD + ArcFace pipeline via ONNX Runtime.
pub struct OnnxRecognizer {
    detector: FaceDetector,
    encoder: FaceEncoder,
}

impl OnnxRecognizer {
    /// Load both models, failing fast if either file is missing.
    pub fn load(detector_path: &str, encoder_path: &str) -> Result<Self, RecognizerError> {
        let detector = FaceDetector::load(detector_path)?;
        let encoder = FaceEncoder::load(encoder_path)?;
        Ok(Self { detector, encoder })
    }
}

impl Recognizer for OnnxRecognizer {
    fn detect(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<BoundingBox>, RecognizerError> {
        Ok(self.detector.detect(rgb, width, height)?)
    }

    fn encode(
        &mut self,
        rgb: &[u8],
        width: u32,
        height: u32,
        face: &BoundingBox,
    ) -> Result<Encoding, RecognizerError> {
        Ok(self.encoder.encode(rgb, width, height, face)?)
    }
}


#[cfg(test)]
mod tests {
    use super::stub::{encoding_of, face_at, StubRecognizer};
    use super::*;

    #[test]
    fn default_encodings_of_pairs_faces_with_encodings() {
        // Exercise the provided trait method (detect + per-face encode) via a
        // stub that overrides only detect/encode.
        struct Plain(StubRecognizer);
        impl Recognizer for Plain {
            fn detect(
                &mut self,
                rgb: &[u8],
                w: u32,
                h: u32,
            ) -> Result<Vec<BoundingBox>, RecognizerError> {
                self.0.detect(rgb, w, h)
            }
            fn encode(
                &mut self,
                rgb: &[u8],
                w: u32,
                h: u32,
                face: &BoundingBox,
            ) -> Result<Encoding, RecognizerError> {
                self.0.encode(rgb, w, h, face)
            }
        }

        let mut rec = Plain(StubRecognizer::new(
            vec![vec![face_at(0.0, 0.0, 10.0, 10.0), face_at(20.0, 0.0, 10.0, 10.0)]],
            vec![vec![encoding_of(&[1.0, 0.0])], vec![encoding_of(&[0.0, 1.0])]],
        ));

        let encodings = rec.encodings_of(&[], 64, 64).unwrap();
        assert_eq!(encodings.len(), 2);
        assert_eq!(encodings[0].values, vec![1.0, 0.0]);
        assert_eq!(encodings[1].values, vec![0.0, 1.0]);
    }

    #[test]
    fn default_encodings_of_skips_failed_faces() {
        struct HalfBlind;
        impl Recognizer for HalfBlind {
            fn detect(
                &mut self,
                _rgb: &[u8],
                _w: u32,
                _h: u32,
            ) -> Result<Vec<BoundingBox>, RecognizerError> {
                Ok(vec![
                    face_at(0.0, 0.0, 10.0, 10.0),
                    face_at(20.0, 0.0, 10.0, 10.0),
                ])
            }
            fn encode(
                &mut self,
                _rgb: &[u8],
                _w: u32,
                _h: u32,
                face: &BoundingBox,
            ) -> Result<Encoding, RecognizerError> {
                if face.x > 10.0 {
                    Err(RecognizerError::Encoding(EncoderError::NoLandmarks))
                } else {
                    Ok(encoding_of(&[1.0]))
                }
            }
        }

        let encodings = HalfBlind.encodings_of(&[], 64, 64).unwrap();
        assert_eq!(encodings.len(), 1);
    }
}
