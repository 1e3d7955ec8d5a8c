//! Stranger registration: mint numbered identities for unmatched faces,
//! persist a cropped face image per new stranger, and suppress duplicate
//! registrations from a face lingering at the same spot.

use crate::gallery::GalleryStore;
use crate::recognizer::Recognizer;
use crate::types::{BoundingBox, LocationKey, DETECT_DOWNSCALE};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Minimum elapsed time before the same location key can mint again.
pub const COOLDOWN_WINDOW: Duration = Duration::from_secs(5);

/// Padding around the scaled face box before cropping, in full-frame pixels.
const CROP_PADDING: i32 = 20;

pub struct StrangerRegistry {
    unknown_dir: PathBuf,
    count: u64,
    /// Last mint time per quantized location. Stale entries are ignored at
    /// lookup; nothing ever removes them.
    last_save: HashMap<LocationKey, Instant>,
}

impl StrangerRegistry {
    /// Open the registry over the unknown-faces directory, creating it if
    /// missing and seeding the counter from persisted stranger files.
    pub fn open(unknown_dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let unknown_dir = unknown_dir.into();
        std::fs::create_dir_all(&unknown_dir)?;

        let count = recover_count(&unknown_dir);
        tracing::info!(dir = %unknown_dir.display(), count, "stranger registry opened");

        Ok(Self {
            unknown_dir,
            count,
            last_save: HashMap::new(),
        })
    }

    /// Highest stranger number minted or recovered so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Register the face as a new stranger unless its location minted within
    /// the cooldown window; returns the stranger name either way.
    ///
    /// `face` is in detection (downscaled) coordinates; `frame` is the
    /// full-resolution RGB24 frame the crop is taken from. Persistence and
    /// crop re-encoding are best-effort: failures are logged and absorbed,
    /// never surfaced.
    pub fn register_if_new<R: Recognizer + ?Sized>(
        &mut self,
        recognizer: &mut R,
        gallery: &mut GalleryStore,
        frame_rgb: &[u8],
        frame_width: u32,
        frame_height: u32,
        face: &BoundingBox,
    ) -> String {
        self.register_at(
            Instant::now(),
            recognizer,
            gallery,
            frame_rgb,
            frame_width,
            frame_height,
            face,
        )
    }

    /// Clock-explicit body of [`register_if_new`].
    #[allow(clippy::too_many_arguments)]
    fn register_at<R: Recognizer + ?Sized>(
        &mut self,
        now: Instant,
        recognizer: &mut R,
        gallery: &mut GalleryStore,
        frame_rgb: &[u8],
        frame_width: u32,
        frame_height: u32,
        face: &BoundingBox,
    ) -> String {
        let key = LocationKey::of(face);

        if let Some(&minted) = self.last_save.get(&key) {
            if now.saturating_duration_since(minted) < COOLDOWN_WINDOW {
                // Lingering face: reuse the most recent count. This is a
                // dedup heuristic keyed on exact coordinates, not a precise
                // re-identification.
                return stranger_name(self.count);
            }
        }

        self.count += 1;
        self.last_save.insert(key, now);
        let name = stranger_name(self.count);

        let Some((x, y, w, h)) = crop_region(face, frame_width, frame_height) else {
            tracing::warn!(name, "face region falls outside the frame, nothing to save");
            return name;
        };

        let crop = extract_crop(frame_rgb, frame_width, x, y, w, h);

        let path = self.unknown_dir.join(format!("{name}.jpg"));
        match image::save_buffer(&path, &crop, w, h, image::ExtendedColorType::Rgb8) {
            Ok(()) => tracing::info!(name, path = %path.display(), "stranger saved"),
            Err(err) => {
                tracing::warn!(name, error = %err, "failed to persist stranger crop")
            }
        }

        // Promote the stranger into the gallery so the next frame matches by
        // name instead of re-registering.
        match recognizer.encodings_of(&crop, w, h) {
            Ok(encodings) => {
                if let Some(encoding) = encodings.into_iter().next() {
                    gallery.append(name.clone(), encoding);
                    tracing::info!(name, "stranger promoted into gallery");
                } else {
                    // Saved but not recognizable: after cooldown the same
                    // person may mint again. Inherent gap, kept as-is.
                    tracing::debug!(name, "no encoding from stranger crop");
                }
            }
            Err(err) => tracing::warn!(name, error = %err, "stranger crop re-encoding failed"),
        }

        name
    }
}

fn stranger_name(count: u64) -> String {
    format!("stranger {count}")
}

/// Best-effort counter recovery: max parseable `stranger <N>.<ext>` suffix.
fn recover_count(dir: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(|entry| entry.ok())
        .filter_map(|entry| stranger_suffix(&entry.file_name().to_string_lossy()))
        .max()
        .unwrap_or(0)
}

/// Parse the numeric suffix out of a stranger filename, if any.
fn stranger_suffix(filename: &str) -> Option<u64> {
    let rest = filename.strip_prefix("stranger")?;
    let digits = rest.split('.').next().unwrap_or(rest);
    digits.trim().parse().ok()
}

/// Scale the detected box to full-frame resolution, pad it, and clamp it.
/// Returns `(x, y, width, height)` or `None` for a degenerate region.
fn crop_region(face: &BoundingBox, frame_width: u32, frame_height: u32) -> Option<(u32, u32, u32, u32)> {
    let scale = DETECT_DOWNSCALE as f32;
    let left = (face.left() * scale) as i32 - CROP_PADDING;
    let top = (face.top() * scale) as i32 - CROP_PADDING;
    let right = (face.right() * scale) as i32 + CROP_PADDING;
    let bottom = (face.bottom() * scale) as i32 + CROP_PADDING;

    let x0 = left.clamp(0, frame_width as i32);
    let y0 = top.clamp(0, frame_height as i32);
    let x1 = right.clamp(0, frame_width as i32);
    let y1 = bottom.clamp(0, frame_height as i32);

    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

/// Copy a rectangular region out of a packed RGB24 frame.
fn extract_crop(frame_rgb: &[u8], frame_width: u32, x: u32, y: u32, w: u32, h: u32) -> Vec<u8> {
    let stride = frame_width as usize * 3;
    let mut crop = Vec::with_capacity(w as usize * h as usize * 3);
    for row in y..y + h {
        let start = row as usize * stride + x as usize * 3;
        crop.extend_from_slice(&frame_rgb[start..start + w as usize * 3]);
    }
    crop
}
