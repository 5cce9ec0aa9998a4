//! Collision geometry: bounding boxes, traversal segments and scan arcs.

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub min_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Rect {
    /// Build a box from its center and half-extents.
    #[must_use]
    pub fn from_center(x: f64, y: f64, half_width: f64, half_height: f64) -> Self {
        Self {
            min_x: x - half_width,
            min_y: y - half_height,
            max_x: x + half_width,
            max_y: y + half_height,
        }
    }

    /// Whether two boxes overlap (touching edges count).
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x <= other.max_x
            && other.min_x <= self.max_x
            && self.min_y <= other.max_y
            && other.min_y <= self.max_y
    }

    /// Whether the point lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (self.min_x..=self.max_x).contains(&x) && (self.min_y..=self.max_y).contains(&y)
    }

    fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.min_x, self.min_y),
            (self.max_x, self.min_y),
            (self.max_x, self.max_y),
            (self.min_x, self.max_y),
        ]
    }

    fn edges(&self) -> [Segment; 4] {
        let [a, b, c, d] = self.corners();
        [
            Segment::new(a.0, a.1, b.0, b.1),
            Segment::new(b.0, b.1, c.0, c.1),
            Segment::new(c.0, c.1, d.0, d.1),
            Segment::new(d.0, d.1, a.0, a.1),
        ]
    }
}

/// A directed line segment, e.g. the path a bullet traversed this turn.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Start x.
    pub x1: f64,
    /// Start y.
    pub y1: f64,
    /// End x.
    pub x2: f64,
    /// End y.
    pub y2: f64,
}

impl Segment {
    /// Build a segment between two points.
    #[must_use]
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Degenerate segment at a single point.
    #[must_use]
    pub fn point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Whether the segment touches the box anywhere.
    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        if rect.contains(self.x1, self.y1) || rect.contains(self.x2, self.y2) {
            return true;
        }
        rect.edges().iter().any(|edge| self.intersection(edge).is_some())
    }

    /// Intersection point of two segments, if they cross.
    ///
    /// Parallel and collinear segments yield `None`.
    #[must_use]
    pub fn intersection(&self, other: &Segment) -> Option<(f64, f64)> {
        let dx1 = self.x2 - self.x1;
        let dy1 = self.y2 - self.y1;
        let dx2 = other.x2 - other.x1;
        let dy2 = other.y2 - other.y1;

        let denom = dx1 * dy2 - dy1 * dx2;
        if denom == 0.0 {
            return None;
        }

        let sx = other.x1 - self.x1;
        let sy = other.y1 - self.y1;
        let t = (sx * dy2 - sy * dx2) / denom;
        let u = (sx * dy1 - sy * dx1) / denom;

        if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
            Some((self.x1 + t * dx1, self.y1 + t * dy1))
        } else {
            None
        }
    }
}

/// Radar scan arc: a triangle with its apex at the robot center and legs
/// at the previous and current radar headings.
///
/// At setup both legs coincide and the arc degenerates to a segment,
/// which the intersection test handles through its edge checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScanArc {
    apex: (f64, f64),
    leg_a: (f64, f64),
    leg_b: (f64, f64),
}

impl ScanArc {
    /// Build the arc swept between two radar headings.
    #[must_use]
    pub fn new(x: f64, y: f64, start_heading: f64, end_heading: f64, range: f64) -> Self {
        Self {
            apex: (x, y),
            leg_a: (x + range * start_heading.sin(), y + range * start_heading.cos()),
            leg_b: (x + range * end_heading.sin(), y + range * end_heading.cos()),
        }
    }

    /// Triangle vertices, apex first. Exposed for rendering.
    #[must_use]
    pub fn vertices(&self) -> [(f64, f64); 3] {
        [self.apex, self.leg_a, self.leg_b]
    }

    /// Whether the arc overlaps the box.
    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        // Any vertex inside the box, or the box fully inside the arc.
        if self
            .vertices()
            .iter()
            .any(|&(x, y)| rect.contains(x, y))
        {
            return true;
        }
        if rect
            .corners()
            .iter()
            .any(|&(x, y)| self.contains(x, y))
        {
            return true;
        }
        // Otherwise an arc edge must cross a box edge.
        self.edges()
            .iter()
            .any(|edge| rect.edges().iter().any(|other| edge.intersection(other).is_some()))
    }

    fn edges(&self) -> [Segment; 3] {
        [
            Segment::new(self.apex.0, self.apex.1, self.leg_a.0, self.leg_a.1),
            Segment::new(self.leg_a.0, self.leg_a.1, self.leg_b.0, self.leg_b.1),
            Segment::new(self.leg_b.0, self.leg_b.1, self.apex.0, self.apex.1),
        ]
    }

    fn contains(&self, x: f64, y: f64) -> bool {
        let cross = |a: (f64, f64), b: (f64, f64)| (b.0 - a.0) * (y - a.1) - (b.1 - a.1) * (x - a.0);
        let d1 = cross(self.apex, self.leg_a);
        let d2 = cross(self.leg_a, self.leg_b);
        let d3 = cross(self.leg_b, self.apex);
        let has_neg = d1 < 0.0 || d2 < 0.0 || d3 < 0.0;
        let has_pos = d1 > 0.0 || d2 > 0.0 || d3 > 0.0;
        !(has_neg && has_pos)
    }
}
