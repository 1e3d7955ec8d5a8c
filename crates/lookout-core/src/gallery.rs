//! The in-memory gallery of known identities.
//!
//! One ordered collection of (name, encoding) pairs. Bulk-loaded from image
//! directories at startup (filename stem = identity), appended to at runtime
//! when strangers are promoted. Append-only for the life of the session.

use crate::recognizer::{Recognizer, RecognizerError};
use crate::types::{Encoding, KnownFace};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extensions accepted during directory load.
const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Recognizer(#[from] RecognizerError),
}

#[derive(Debug, Default)]
pub struct GalleryStore {
    faces: Vec<KnownFace>,
}

impl GalleryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every decodable image in every given directory.
    ///
    /// An image contributes one entry (its first encoding) named after the
    /// file stem. Images with no detectable face are skipped silently, files
    /// that fail to decode are skipped with a warning, and directories that
    /// do not exist are skipped. Duplicate stems are all kept; loading the
    /// same directory twice simply loads everything twice.
    ///
    /// Returns the number of entries appended.
    pub fn load_from_dirs<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &mut R,
        dirs: &[PathBuf],
    ) -> Result<usize, GalleryError> {
        let mut loaded = 0usize;

        for dir in dirs {
            if !dir.is_dir() {
                tracing::debug!(dir = %dir.display(), "gallery directory missing, skipping");
                continue;
            }

            let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| has_image_extension(path))
                .collect();
            paths.sort();

            for path in paths {
                if self.load_file(recognizer, &path)? {
                    loaded += 1;
                }
            }
        }

        tracing::info!(loaded, total = self.faces.len(), "gallery load complete");
        Ok(loaded)
    }

    /// Load a single image file; returns whether an entry was appended.
    fn load_file<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &mut R,
        path: &Path,
    ) -> Result<bool, GalleryError> {
        let img = match image::open(path) {
            Ok(img) => img.to_rgb8(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "undecodable image, skipping");
                return Ok(false);
            }
        };

        let encodings = recognizer.encodings_of(img.as_raw(), img.width(), img.height())?;
        let Some(encoding) = encodings.into_iter().next() else {
            tracing::debug!(path = %path.display(), "no face found, skipping");
            return Ok(false);
        };

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        self.append(name, encoding);
        Ok(true)
    }

    /// Append a new entry at the end. Never invalidates earlier indices.
    pub fn append(&mut self, name: String, encoding: Encoding) {
        self.faces.push(KnownFace { name, encoding });
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn entries(&self) -> &[KnownFace] {
        &self.faces
    }
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|ok| ext.eq_ignore_ascii_case(ok)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognizer::stub::{encoding_of, face_at, StubRecognizer};

    fn write_test_png(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb([120, 130, 140]));
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn append_preserves_order_and_length() {
        let mut gallery = GalleryStore::new();
        gallery.append("alice".into(), encoding_of(&[1.0, 0.0]));
        gallery.append("bob".into(), encoding_of(&[0.0, 1.0]));

        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.entries()[0].name, "alice");
        assert_eq!(gallery.entries()[1].name, "bob");
    }

    #[test]
    fn load_names_entries_after_file_stems() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "alice.png");

        let mut rec =
            StubRecognizer::constant(face_at(0.0, 0.0, 4.0, 4.0), encoding_of(&[1.0, 0.0]));
        let mut gallery = GalleryStore::new();
        let loaded = gallery
            .load_from_dirs(&mut rec, &[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(loaded, 1);
        assert_eq!(gallery.entries()[0].name, "alice");
    }

    #[test]
    fn images_without_faces_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "landscape.png");

        let mut rec = StubRecognizer::blind();
        let mut gallery = GalleryStore::new();
        let loaded = gallery
            .load_from_dirs(&mut rec, &[dir.path().to_path_buf()])
            .unwrap();

        assert_eq!(loaded, 0);
        assert!(gallery.is_empty());
    }

    #[test]
    fn missing_directories_are_skipped() {
        let mut rec = StubRecognizer::blind();
        let mut gallery = GalleryStore::new();
        let loaded = gallery
            .load_from_dirs(&mut rec, &[PathBuf::from("/does/not/exist")])
            .unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn non_image_and_undecodable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        std::fs::write(dir.path().join("broken.jpg"), b"not a jpeg").unwrap();

        let mut rec =
            StubRecognizer::constant(face_at(0.0, 0.0, 4.0, 4.0), encoding_of(&[1.0]));
        let mut gallery = GalleryStore::new();
        let loaded = gallery
            .load_from_dirs(&mut rec, &[dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(loaded, 0);
    }

    #[test]
    fn loading_twice_doubles_the_gallery() {
        // Documented current behavior: no dedup by filename.
        let dir = tempfile::tempdir().unwrap();
        write_test_png(dir.path(), "alice.png");

        let mut rec = StubRecognizer::new(
            vec![vec![face_at(0.0, 0.0, 4.0, 4.0)]],
            vec![vec![encoding_of(&[1.0, 0.0])]],
        );
        let mut gallery = GalleryStore::new();
        let dirs = [dir.path().to_path_buf(), dir.path().to_path_buf()];
        let loaded = gallery.load_from_dirs(&mut rec, &dirs).unwrap();

        assert_eq!(loaded, 2);
        assert_eq!(gallery.len(), 2);
        assert_eq!(gallery.entries()[0].name, gallery.entries()[1].name);
    }
}
