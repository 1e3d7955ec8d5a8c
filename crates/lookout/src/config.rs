use std::path::PathBuf;

/// Runtime configuration, loaded from environment variables.
///
/// There is deliberately no CLI and no config file; the only interactive
/// control surface is the quit key. Defaults reproduce the reference
/// behavior.
pub struct Config {
    /// V4L2 device path (default: /dev/video0).
    pub camera_device: String,
    /// Directory containing the ONNX model files.
    pub model_dir: PathBuf,
    /// Directory of pre-seeded known-face images (filename stem = name).
    pub known_dir: PathBuf,
    /// Directory stranger crops are recovered from and written to.
    pub unknown_dir: PathBuf,
    /// Maximum encoding distance for a gallery match.
    pub tolerance: f32,
}

impl Config {
    /// Load configuration from `LOOKOUT_*` environment variables with defaults.
    pub fn from_env() -> Self {
        Self {
            camera_device: std::env::var("LOOKOUT_CAMERA_DEVICE")
                .unwrap_or_else(|_| "/dev/video0".to_string()),
            model_dir: env_path("LOOKOUT_MODEL_DIR", "models"),
            known_dir: env_path("LOOKOUT_KNOWN_DIR", "known_faces"),
            unknown_dir: env_path("LOOKOUT_UNKNOWN_DIR", "unknown_faces"),
            tolerance: env_f32("LOOKOUT_TOLERANCE", 0.6),
        }
    }

    /// Path to the SCRFD detection model.
    pub fn scrfd_model_path(&self) -> String {
        self.model_dir
            .join("det_10g.onnx")
            .to_string_lossy()
            .into_owned()
    }

    /// Path to the ArcFace encoding model.
    pub fn arcface_model_path(&self) -> String {
        self.model_dir
            .join("w600k_r50.onnx")
            .to_string_lossy()
            .into_owned()
    }
}

fn env_path(key: &str, default: &str) -> PathBuf {
    std::env::var(key)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(default))
}

fn env_f32(key: &str, default: f32) -> f32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
