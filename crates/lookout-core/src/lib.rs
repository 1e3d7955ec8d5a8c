//! lookout-core — Face recognition engine and identity resolution.
//!
//! Detection (SCRFD) and encoding (ArcFace) run via ONNX Runtime behind the
//! [`Recognizer`] trait; the [`GalleryStore`], [`StrangerRegistry`] and
//! [`IdentityResolver`] implement the matching and stranger-enrollment policy
//! on top of it.

pub mod alignment;
pub mod detector;
pub mod encoder;
pub mod gallery;
pub mod recognizer;
pub mod registry;
pub mod resolver;
pub mod types;

pub use gallery::GalleryStore;
pub use recognizer::{OnnxRecognizer, Recognizer, RecognizerError};
pub use registry::StrangerRegistry;
pub use resolver::IdentityResolver;
pub use types::{BoundingBox, Detection, Encoding, KnownFace, LocationKey, DETECT_DOWNSCALE};
