//! Engine-wide constants for the camera model.

/// Default square tile size in pixels.
pub const TILE_SIZE: u32 = 256;

/// Steepest pitch the camera may take, in degrees.
pub const MAX_PITCH: f64 = 85.0;

/// Frame interval used by the demo and the tokio frame loop (60 fps).
pub const DEFAULT_FRAME_INTERVAL_MS: u64 = 16;
