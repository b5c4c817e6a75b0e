use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box in model pixel space, stored as minimum
/// and maximum corner points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Bbox {
    pub min: glam::Vec2,
    pub max: glam::Vec2,
}

impl Bbox {
    /// Creates a bounding box from minimum and maximum corners.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use scanmd_core::analysis::bbox::Bbox;
    /// let bbox = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 20.0));
    /// assert_eq!(bbox.area(), 2000.0);
    /// ```
    pub fn new(min: glam::Vec2, max: glam::Vec2) -> Self {
        Self { min, max }
    }

    /// Builds a box from a flat `[xmin, ymin, xmax, ymax]` slice as the
    /// detection model reports it. Returns `None` for slices that do not
    /// carry exactly four finite values.
    pub fn from_coords(coords: &[f32]) -> Option<Self> {
        match coords {
            [xmin, ymin, xmax, ymax] if coords.iter().all(|c| c.is_finite()) => Some(Self::new(
                glam::Vec2::new(*xmin, *ymin),
                glam::Vec2::new(*xmax, *ymax),
            )),
            _ => None,
        }
    }

    /// Area of the box (width × height). Degenerate boxes have area 0.
    pub fn area(&self) -> f32 {
        let length = self.max - self.min;

        length.x * length.y
    }

    /// Center point of the box.
    pub fn center(&self) -> glam::Vec2 {
        (self.min + self.max) / 2.0
    }

    /// Smallest box that contains both `self` and `other`.
    ///
    /// # Example
    /// ```
    /// use glam::Vec2;
    /// use scanmd_core::analysis::bbox::Bbox;
    /// let a = Bbox::new(Vec2::new(0.0, 0.0), Vec2::new(100.0, 20.0));
    /// let b = Bbox::new(Vec2::new(0.0, 25.0), Vec2::new(100.0, 45.0));
    /// assert_eq!(a.union(&b), Bbox::new(Vec2::ZERO, Vec2::new(100.0, 45.0)));
    /// ```
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Scales x-coordinates by `sx` and y-coordinates by `sy`, mapping model
    /// space onto a rendered raster of a different resolution.
    pub fn scale(&self, sx: f32, sy: f32) -> Self {
        let factor = glam::Vec2::new(sx, sy);
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }

    /// Whether the x-ranges of the two boxes overlap. Used by the
    /// column-aware merge guard.
    pub fn overlaps_horizontally(&self, other: &Self) -> bool {
        self.min.x < other.max.x && other.min.x < self.max.x
    }
}
