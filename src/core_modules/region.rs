// THEORY:
// Plain data containers shared by the scanner, clusterer and aggregator. None of
// them hold references into the pixel buffer, so a detection result outlives the
// frame it came from.
//
// - `ScoredRegion` is a single square scan window and how skin-like it is. It only
//   exists for the duration of one detection pass.
// - `Cluster` is an ordered group of regions. Its first member is the seed the
//   other members were measured against.
// - `FaceBox` is the public result: the box around a qualifying cluster and the
//   mean score of its members.

/// A square scan window and the fraction of its sampled pixels classified as skin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredRegion {
    /// Left edge of the window in pixels.
    pub x: u32,
    /// Top edge of the window in pixels.
    pub y: u32,
    /// Side length of the (square) window in pixels.
    pub size: u32,
    /// Skin pixel ratio in [0, 1].
    pub score: f64,
}

impl ScoredRegion {
    pub fn new(x: u32, y: u32, size: u32, score: f64) -> Self {
        Self { x, y, size, score }
    }

    /// Euclidean distance between the top-left corners of two regions.
    pub fn corner_distance(&self, other: &ScoredRegion) -> f64 {
        let dx = self.x as f64 - other.x as f64;
        let dy = self.y as f64 - other.y as f64;
        (dx * dx + dy * dy).sqrt()
    }

    /// Exclusive right edge, saturating at `u32::MAX`.
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.size)
    }

    /// Exclusive bottom edge, saturating at `u32::MAX`.
    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.size)
    }
}

/// Regions grouped around a seed; the seed is always `cluster[0]`.
pub type Cluster = Vec<ScoredRegion>;

/// A candidate face: an axis-aligned box and the mean skin score of the regions in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceBox {
    /// X coordinate of the top-left corner (pixels).
    pub x: u32,
    /// Y coordinate of the top-left corner (pixels).
    pub y: u32,
    /// Width of the bounding box (pixels).
    pub width: u32,
    /// Height of the bounding box (pixels).
    pub height: u32,
    /// Mean member score, in [0, 1].
    pub confidence: f64,
}

impl FaceBox {
    pub fn right(&self) -> u32 {
        self.x.saturating_add(self.width)
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.height)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// True when `region`'s window lies entirely inside this box.
    pub fn contains(&self, region: &ScoredRegion) -> bool {
        region.x >= self.x
            && region.y >= self.y
            && region.right() <= self.right()
            && region.bottom() <= self.bottom()
    }
}
