//! lookout-hw — Webcam capture and RGB frame handling.
//!
//! V4L2-based color capture plus the pixel plumbing the frame loop needs:
//! YUYV decoding and bilinear resizing.

pub mod camera;
pub mod frame;

pub use camera::{Camera, CameraError, FrameStream, PixelFormat};
pub use frame::Frame;
