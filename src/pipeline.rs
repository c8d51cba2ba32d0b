// THEORY:
// The `pipeline` module is the top-level API of the detector. It wires the three
// stages together (scan → cluster → aggregate) behind one call and owns the
// tunables that steer them.
//
// The detector holds no per-frame state: `FaceDetector` is an immutable bundle of
// configuration, so one instance can be shared across threads and called on many
// frames at once. Each call borrows its frame and returns a fresh list of boxes.

use crate::core_modules::face_bounds::aggregate;
use crate::core_modules::region_clusterer::region_clusterer;
use crate::core_modules::region_scanner::{grid_size, scan};
use crate::error::{DetectorError, Result};
use image::RgbaImage;
use log::debug;

// Re-export key data structures for the public API.
pub use crate::core_modules::region::{Cluster, FaceBox, ScoredRegion};

const DEFAULT_GRID_DIVISOR: u32 = 8;
const DEFAULT_SCORE_THRESHOLD: f64 = 0.3;
const DEFAULT_MIN_CLUSTER_SIZE: usize = 3;
const DEFAULT_DISTANCE_MULTIPLIER: f64 = 2.0;

/// Configuration for the FaceDetector, allowing for tunable behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// The scan window side is `min(width, height) / grid_divisor`.
    pub grid_divisor: u32,
    /// A window is kept only when its skin ratio is strictly above this value.
    pub score_threshold: f64,
    /// Clusters with fewer regions than this are not reported.
    pub min_cluster_size: usize,
    /// Regions join a seed closer than `distance_multiplier` window sides.
    pub distance_multiplier: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            grid_divisor: DEFAULT_GRID_DIVISOR,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            min_cluster_size: DEFAULT_MIN_CLUSTER_SIZE,
            distance_multiplier: DEFAULT_DISTANCE_MULTIPLIER,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.grid_divisor == 0 {
            return Err(DetectorError::InvalidConfig("grid_divisor must be > 0".into()));
        }
        if !(0.0..1.0).contains(&self.score_threshold) {
            return Err(DetectorError::InvalidConfig(format!(
                "score_threshold must be in [0, 1), got {}",
                self.score_threshold
            )));
        }
        if self.min_cluster_size == 0 {
            return Err(DetectorError::InvalidConfig("min_cluster_size must be > 0".into()));
        }
        if !self.distance_multiplier.is_finite() || self.distance_multiplier <= 0.0 {
            return Err(DetectorError::InvalidConfig(format!(
                "distance_multiplier must be finite and > 0, got {}",
                self.distance_multiplier
            )));
        }
        Ok(())
    }
}

/// The skin-tone face-region detector.
#[derive(Debug, Clone, Default)]
pub struct FaceDetector {
    config: DetectorConfig,
}

impl FaceDetector {
    /// Builds a detector without checking the configuration. Nonsensical values
    /// never panic; they just make every frame come back empty.
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    /// Builds a detector after validating the configuration.
    pub fn try_new(config: DetectorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(config))
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Runs one detection pass over a row-major RGBA buffer.
    ///
    /// Never fails: empty, short or tiny frames simply produce no faces.
    pub fn detect(&self, image_data: &[u8], width: u32, height: u32) -> Vec<FaceBox> {
        if image_data.is_empty() {
            return Vec::new();
        }

        // Stage 1: Region Scanning
        let regions = scan(image_data, width, height, &self.config);

        // Stage 2: Star Clustering
        let grid = grid_size(width, height, self.config.grid_divisor);
        let threshold = region_clusterer::link_threshold(grid, self.config.distance_multiplier);
        let clusters = region_clusterer::cluster(&regions, threshold);

        // Stage 3: Bounding-Box Aggregation
        let faces = aggregate(&clusters, self.config.min_cluster_size);

        debug!(
            "{}x{} frame: {} skin region(s), {} cluster(s), {} face(s)",
            width,
            height,
            regions.len(),
            clusters.len(),
            faces.len()
        );
        faces
    }

    /// Runs one detection pass over a decoded `image` buffer.
    pub fn detect_image(&self, image: &RgbaImage) -> Vec<FaceBox> {
        self.detect(image.as_raw(), image.width(), image.height())
    }
}

/// Detects faces with the default tunables.
pub fn detect(image_data: &[u8], width: u32, height: u32) -> Vec<FaceBox> {
    FaceDetector::default().detect(image_data, width, height)
}
