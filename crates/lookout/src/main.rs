use anyhow::{Context, Result};
use lookout_core::{GalleryStore, IdentityResolver, OnnxRecognizer, StrangerRegistry, DETECT_DOWNSCALE};
use lookout_hw::Camera;
use tracing_subscriber::EnvFilter;

mod config;
mod ui;

use config::Config;
use ui::Window;

/// Frames narrower than this are upscaled before processing and display.
const MIN_DISPLAY_WIDTH: u32 = 800;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = Config::from_env();
    tracing::info!(
        camera = %config.camera_device,
        known = %config.known_dir.display(),
        unknown = %config.unknown_dir.display(),
        tolerance = config.tolerance,
        "lookout starting"
    );

    let mut recognizer =
        OnnxRecognizer::load(&config.scrfd_model_path(), &config.arcface_model_path())
            .context("loading recognition models")?;

    let registry =
        StrangerRegistry::open(&config.unknown_dir).context("opening stranger registry")?;

    // Both directories feed the gallery: strangers persisted by earlier
    // sessions are recognized by name in this one.
    let mut gallery = GalleryStore::new();
    gallery
        .load_from_dirs(
            &mut recognizer,
            &[config.known_dir.clone(), config.unknown_dir.clone()],
        )
        .context("loading face gallery")?;

    let mut resolver = IdentityResolver::new(gallery, registry, config.tolerance);

    let camera = Camera::open(&config.camera_device).context("opening camera")?;
    let mut stream = camera.stream().context("starting capture stream")?;
    let window = Window::open().context("opening display window")?;

    loop {
        let captured = match stream.next_frame() {
            Ok(frame) => frame,
            Err(err) => {
                // End-of-stream, not a transient condition: stop and clean up.
                tracing::warn!(error = %err, "capture failed, ending session");
                break;
            }
        };

        let frame = if captured.width < MIN_DISPLAY_WIDTH {
            let scale = MIN_DISPLAY_WIDTH as f32 / captured.width as f32;
            let height = (captured.height as f32 * scale).round() as u32;
            captured.resize(MIN_DISPLAY_WIDTH, height)
        } else {
            captured
        };

        let small = frame.downscale(DETECT_DOWNSCALE);

        let detections = resolver.resolve(
            &mut recognizer,
            &frame.data,
            frame.width,
            frame.height,
            &small.data,
            small.width,
            small.height,
        )?;

        window.show(&frame, &detections)?;

        if window.quit_requested()? {
            tracing::info!("quit requested");
            break;
        }
    }

    tracing::info!(
        gallery = resolver.gallery().len(),
        "lookout shutting down"
    );

    // Stream and camera release on drop; the window tears down in its Drop.
    Ok(())
}
