//! Aspect-ratio constrained sizing.
//!
//! Ratios are width / height: `16.0 / 9.0` is a wide box.

use tessera_core::Vector2;

/// Inclusive min/max box for a size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeBounds {
    pub min: Vector2,
    pub max: Vector2,
}

impl Default for SizeBounds {
    fn default() -> Self {
        Self::UNBOUNDED
    }
}

impl SizeBounds {
    /// `0..=∞` on both axes.
    pub const UNBOUNDED: SizeBounds = SizeBounds {
        min: Vector2::ZERO,
        max: Vector2::INFINITY,
    };

    pub fn new(min: Vector2, max: Vector2) -> Self {
        Self { min, max }
    }

    pub fn with_min_width(mut self, min_width: f64) -> Self {
        self.min.x = min_width;
        self
    }

    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max.x = max_width;
        self
    }

    pub fn with_min_height(mut self, min_height: f64) -> Self {
        self.min.y = min_height;
        self
    }

    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max.y = max_height;
        self
    }

    /// Whether `size` lies inside the box.
    pub fn contains(&self, size: Vector2) -> bool {
        self.min.x <= size.x && size.x <= self.max.x && self.min.y <= size.y && size.y <= self.max.y
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Solve {
    Width,
    Height,
}

/// Find the size closest to `ratio` given optional preferred sizes and bounds.
///
/// The axis that is not derived from the other keeps its preferred value; when
/// both are given the larger outcome wins. If the exact ratio does not fit the
/// bounds, the largest-area boundary candidate that does is returned, and if
/// none fits the ratio is broken.
pub fn solve(ratio: f64, width: Option<f64>, height: Option<f64>, bounds: SizeBounds) -> Vector2 {
    let solve_for = match (width, height) {
        (Some(_), None) => Solve::Height,
        (None, _) => Solve::Width,
        (Some(w), Some(h)) => {
            if w / ratio > h {
                Solve::Height
            } else {
                Solve::Width
            }
        }
    };
    let major = match solve_for {
        Solve::Width => height.unwrap_or(0.0),
        Solve::Height => width.unwrap_or(0.0),
    };
    if major <= 0.0 {
        return Vector2::new(
            bounds.min.x.max(bounds.max.x.min(0.0)),
            bounds.min.y.max(bounds.max.y.min(0.0)),
        );
    }

    let ideal = match solve_for {
        Solve::Width => Vector2::new(major * ratio, major),
        Solve::Height => Vector2::new(major, major / ratio),
    };
    if bounds.contains(ideal) {
        return ideal;
    }

    let candidates = [
        Vector2::new(bounds.min.x, bounds.min.x / ratio),
        Vector2::new(bounds.max.x, bounds.max.x / ratio),
        Vector2::new(bounds.min.y * ratio, bounds.min.y),
        Vector2::new(bounds.max.y * ratio, bounds.max.y),
    ];
    let mut best: Option<(Vector2, f64)> = None;
    for candidate in candidates {
        let area = candidate.x * candidate.y;
        if !bounds.contains(candidate) || !candidate.is_finite() || !area.is_finite() {
            continue;
        }
        if best.map_or(true, |(_, best_area)| area > best_area) {
            best = Some((candidate, area));
        }
    }

    match best {
        Some((size, _)) => size,
        None => Vector2::new(
            bounds.min.x.max(major.min(ideal.x)),
            bounds.min.y.max(major.min(ideal.y)),
        ),
    }
}
