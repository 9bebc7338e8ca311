use cubit_engine::voxel::DEFAULT_FILL;

/// Viewer settings.
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    /// Seed for chunk generation.
    pub seed: u64,
    /// Share of cells that hold a block, `0.0..=1.0`.
    pub fill: f32,
    /// Chunks along each horizontal axis.
    pub chunks: i32,
    /// Movement speed in blocks per second.
    pub speed: f32,
    /// Radians per pixel of mouse motion.
    pub sensitivity: f32,
    /// Vertical field of view, degrees.
    pub fov_degrees: f32,
    /// Furthest distance a click can reach.
    pub pick_distance: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            seed: 0x5EED,
            fill: DEFAULT_FILL,
            chunks: 2,
            speed: 8.0,
            sensitivity: 0.004,
            fov_degrees: 45.0,
            pick_distance: 64.0,
        }
    }
}

impl ViewerConfig {
    /// Reads overrides from `CUBIT_SEED` and `CUBIT_FILL`.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Some(seed) = env_parse::<u64>("CUBIT_SEED") {
            cfg.seed = seed;
        }
        if let Some(fill) = env_parse::<f32>("CUBIT_FILL") {
            cfg.fill = fill.clamp(0.0, 1.0);
        }
        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not a valid value");
            None
        }
    }
}
