//! Per-detection identity resolution.
//!
//! Each detected face is matched against the gallery by encoding distance;
//! faces that match nothing are handed to the stranger registry, which grows
//! the gallery as a side effect. No identity state survives a frame except
//! through the gallery, the registry counter, and the cooldown table.

use crate::gallery::GalleryStore;
use crate::recognizer::{Recognizer, RecognizerError};
use crate::registry::StrangerRegistry;
use crate::types::{Detection, Encoding};

pub struct IdentityResolver {
    gallery: GalleryStore,
    registry: StrangerRegistry,
    /// Maximum encoding distance for a gallery match.
    tolerance: f32,
}

impl IdentityResolver {
    pub fn new(gallery: GalleryStore, registry: StrangerRegistry, tolerance: f32) -> Self {
        Self {
            gallery,
            registry,
            tolerance,
        }
    }

    pub fn gallery(&self) -> &GalleryStore {
        &self.gallery
    }

    /// Resolve every face in a frame.
    ///
    /// Detection and encoding run on the downscaled frame (`small_*`);
    /// stranger crops are taken from the full-resolution frame (`full_*`).
    /// Faces whose encoding extraction fails are dropped from the result.
    #[allow(clippy::too_many_arguments)]
    pub fn resolve<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &mut R,
        full_rgb: &[u8],
        full_width: u32,
        full_height: u32,
        small_rgb: &[u8],
        small_width: u32,
        small_height: u32,
    ) -> Result<Vec<Detection>, RecognizerError> {
        let faces = recognizer.detect(small_rgb, small_width, small_height)?;
        let mut detections = Vec::with_capacity(faces.len());

        for face in faces {
            let encoding = match recognizer.encode(small_rgb, small_width, small_height, &face) {
                Ok(encoding) => encoding,
                Err(err) => {
                    tracing::debug!(error = %err, "dropping face without encoding");
                    continue;
                }
            };

            let (name, confidence) = match self.best_match(&encoding) {
                Some((index, distance)) => {
                    // Confidence mirrors the distance scale and is knowingly
                    // left unclamped.
                    (self.gallery.entries()[index].name.clone(), 1.0 - distance)
                }
                None => {
                    let name = self.registry.register_if_new(
                        recognizer,
                        &mut self.gallery,
                        full_rgb,
                        full_width,
                        full_height,
                        &face,
                    );
                    (name, 1.0)
                }
            };

            tracing::debug!(name, confidence, "face resolved");
            detections.push(Detection {
                face,
                name,
                confidence,
            });
        }

        Ok(detections)
    }

    /// Index and distance of the nearest gallery entry, if it is within
    /// tolerance. Ties resolve to the lowest index (first registered wins).
    fn best_match(&self, encoding: &Encoding) -> Option<(usize, f32)> {
        let mut best: Option<(usize, f32)> = None;

        for (index, known) in self.gallery.entries().iter().enumerate() {
            let distance = encoding.distance(&known.encoding);
            match best {
                Some((_, best_distance)) if distance >= best_distance => {}
                _ => best = Some((index, distance)),
            }
        }

        best.filter(|&(_, distance)| distance <= self.tolerance)
    }
}
