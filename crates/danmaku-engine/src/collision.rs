//! Axis-aligned collision geometry for on-screen placements

/// Bounding box in container pixels
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BoundingBox {
    /// Left edge
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Width of the box
    pub width: f32,
    /// Height of the box
    pub height: f32,
}

impl BoundingBox {
    /// Create a new bounding box
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap test; boxes that only share an edge do not intersect
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }
}

/// Occupied-area record kept for every active placement
///
/// The box itself is not stored: the left edge moves every frame, so it is
/// rebuilt from the placement's current position whenever a check needs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OccupiedArea {
    /// First lane held by a scrolling placement; `None` for explicit paths
    pub lane: Option<usize>,
    /// Number of consecutive lanes covered, starting at `lane`
    pub span: usize,
    /// Collision width, padding included
    pub width: f32,
    /// Collision height
    pub height: f32,
}

impl OccupiedArea {
    /// Whether this area holds `lane`
    #[must_use]
    pub fn covers(&self, lane: usize) -> bool {
        self.lane
            .is_some_and(|first| (first..first + self.span).contains(&lane))
    }

    /// Box for this area with its top-left corner at `(x, y)`
    #[must_use]
    pub fn at(&self, x: f32, y: f32) -> BoundingBox {
        BoundingBox::new(x, y, self.width, self.height)
    }
}
