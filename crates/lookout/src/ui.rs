//! Presentation layer: one annotated window over the frame loop.
//!
//! Draws a header bar, per-face boxes with name plates and confidence bars,
//! and polls the quit key. Detection coordinates arrive in downscaled space
//! and are scaled up for drawing.

use chrono::Local;
use lookout_core::{Detection, DETECT_DOWNSCALE};
use lookout_hw::Frame;
use opencv::core::{Mat, Point, Rect, Scalar};
use opencv::prelude::*;
use opencv::{highgui, imgproc};
use thiserror::Error;

pub const WINDOW_TITLE: &str = "Lookout";
const WINDOW_WIDTH: i32 = 1200;
const WINDOW_HEIGHT: i32 = 800;
const HEADER_HEIGHT: i32 = 80;
const CONFIDENCE_BAR_WIDTH: i32 = 200;
const QUIT_KEY: i32 = 'q' as i32;

#[derive(Error, Debug)]
pub enum UiError {
    #[error("opencv: {0}")]
    OpenCv(#[from] opencv::Error),
}

// Colors are BGR.
fn primary() -> Scalar {
    Scalar::new(0.0, 165.0, 255.0, 0.0) // orange
}

fn secondary() -> Scalar {
    Scalar::new(255.0, 255.0, 0.0, 0.0) // cyan
}

fn text_color() -> Scalar {
    Scalar::new(255.0, 255.0, 255.0, 0.0)
}

fn background() -> Scalar {
    Scalar::new(30.0, 30.0, 30.0, 0.0)
}

fn stranger_box() -> Scalar {
    Scalar::new(0.0, 0.0, 255.0, 0.0) // red
}

fn stranger_accent() -> Scalar {
    Scalar::new(0.0, 100.0, 255.0, 0.0)
}

/// The annotated display window. Tears the window down on drop, so every
/// exit path of the frame loop releases it.
pub struct Window;

impl Window {
    pub fn open() -> Result<Self, UiError> {
        highgui::named_window(WINDOW_TITLE, highgui::WINDOW_NORMAL)?;
        highgui::resize_window(WINDOW_TITLE, WINDOW_WIDTH, WINDOW_HEIGHT)?;
        Ok(Self)
    }

    /// Render one frame with its detections.
    pub fn show(&self, frame: &Frame, detections: &[Detection]) -> Result<(), UiError> {
        let mut canvas = bgr_mat(frame)?;

        for detection in detections {
            draw_face_box(&mut canvas, detection)?;
        }
        draw_header(&mut canvas, frame.width as i32, detections.len())?;

        highgui::imshow(WINDOW_TITLE, &canvas)?;
        Ok(())
    }

    /// Pump the event loop for a millisecond and report whether the quit key
    /// was pressed.
    pub fn quit_requested(&self) -> Result<bool, UiError> {
        Ok(highgui::wait_key(1)? == QUIT_KEY)
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if let Err(err) = highgui::destroy_all_windows() {
            tracing::warn!(error = %err, "failed to destroy display windows");
        }
    }
}

/// Copy a packed RGB24 frame into an owned BGR `Mat`.
fn bgr_mat(frame: &Frame) -> Result<Mat, UiError> {
    let mut bgr = Vec::with_capacity(frame.data.len());
    for px in frame.data.chunks_exact(3) {
        bgr.extend_from_slice(&[px[2], px[1], px[0]]);
    }

    let flat = Mat::from_slice(&bgr)?;
    let shaped = flat.reshape(3, frame.height as i32)?;
    Ok(shaped.try_clone()?)
}

fn draw_header(canvas: &mut Mat, width: i32, face_count: usize) -> Result<(), UiError> {
    imgproc::rectangle(
        canvas,
        Rect::new(0, 0, width, HEADER_HEIGHT),
        background(),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;

    imgproc::put_text(
        canvas,
        "LOOKOUT FACE RECOGNITION",
        Point::new(20, 30),
        imgproc::FONT_HERSHEY_DUPLEX,
        1.2,
        primary(),
        2,
        imgproc::LINE_8,
        false,
    )?;

    let clock = Local::now().format("%H:%M:%S").to_string();
    imgproc::put_text(
        canvas,
        &format!("Time: {clock}"),
        Point::new(20, 60),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        text_color(),
        1,
        imgproc::LINE_8,
        false,
    )?;

    imgproc::put_text(
        canvas,
        &format!("Faces Detected: {face_count}"),
        Point::new(width - 200, 60),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.6,
        secondary(),
        1,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}

fn draw_face_box(canvas: &mut Mat, detection: &Detection) -> Result<(), UiError> {
    let scale = DETECT_DOWNSCALE as f32;
    let left = (detection.face.left() * scale) as i32;
    let top = (detection.face.top() * scale) as i32;
    let right = (detection.face.right() * scale) as i32;
    let bottom = (detection.face.bottom() * scale) as i32;

    let (box_color, accent_color) = if detection.is_stranger() {
        (stranger_box(), stranger_accent())
    } else {
        (primary(), secondary())
    };

    // Double rectangle: outer emphasis plus inner accent.
    imgproc::rectangle(
        canvas,
        Rect::new(left - 2, top - 2, right - left + 4, bottom - top + 4),
        box_color,
        3,
        imgproc::LINE_8,
        0,
    )?;
    imgproc::rectangle(
        canvas,
        Rect::new(left, top, right - left, bottom - top),
        accent_color,
        2,
        imgproc::LINE_8,
        0,
    )?;

    // Name plate above the box, sized to the text.
    let mut baseline = 0;
    let text_size = imgproc::get_text_size(
        &detection.name,
        imgproc::FONT_HERSHEY_DUPLEX,
        0.8,
        2,
        &mut baseline,
    )?;
    let plate = Rect::new(left, top - 40, text_size.width + 20, 40);
    imgproc::rectangle(canvas, plate, background(), imgproc::FILLED, imgproc::LINE_8, 0)?;
    imgproc::rectangle(canvas, plate, box_color, 2, imgproc::LINE_8, 0)?;
    imgproc::put_text(
        canvas,
        &detection.name,
        Point::new(left + 10, top - 15),
        imgproc::FONT_HERSHEY_DUPLEX,
        0.8,
        text_color(),
        2,
        imgproc::LINE_8,
        false,
    )?;

    // Confidence bar under the box. Confidence is unclamped upstream; the
    // bar width is floored at zero so the rect stays valid.
    let bar_width = ((detection.confidence * CONFIDENCE_BAR_WIDTH as f32) as i32).max(0);
    imgproc::rectangle(
        canvas,
        Rect::new(left, bottom + 5, CONFIDENCE_BAR_WIDTH, 15),
        background(),
        imgproc::FILLED,
        imgproc::LINE_8,
        0,
    )?;
    if bar_width > 0 {
        imgproc::rectangle(
            canvas,
            Rect::new(left, bottom + 5, bar_width, 15),
            box_color,
            imgproc::FILLED,
            imgproc::LINE_8,
            0,
        )?;
    }
    imgproc::put_text(
        canvas,
        &format!("{:.2}", detection.confidence),
        Point::new(left + CONFIDENCE_BAR_WIDTH + 10, bottom + 18),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.5,
        text_color(),
        1,
        imgproc::LINE_8,
        false,
    )?;

    Ok(())
}
