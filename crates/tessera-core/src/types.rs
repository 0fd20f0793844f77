//! Core value types for the Tessera layout engine.

use std::fmt;

/// A two-dimensional vector used for positions, sizes and anchor points.
pub type Vector2 = glam::DVec2;

/// Unique identifier for a node in a layout tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A one-dimensional length made of a parent-relative scale and an absolute offset.
///
/// `Dimension::new(0.5, 50.0)` is "half of the parent plus 50 pixels".
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Fraction of the parent extent
    pub scale: f64,
    /// Absolute offset in pixels
    pub offset: f64,
}

impl Dimension {
    /// Zero scale, zero offset.
    pub const ZERO: Dimension = Dimension::new(0.0, 0.0);

    pub const fn new(scale: f64, offset: f64) -> Self {
        Self { scale, offset }
    }

    /// A purely parent-relative dimension.
    pub const fn scale(scale: f64) -> Self {
        Self { scale, offset: 0.0 }
    }

    /// A purely absolute dimension.
    pub const fn offset(offset: f64) -> Self {
        Self { scale: 0.0, offset }
    }

    /// Whether the dimension carries a literal (non-zero) offset.
    pub fn has_offset(&self) -> bool {
        self.offset != 0.0
    }

    /// Resolve against the extent of the parent along the same axis.
    ///
    /// A zero scale yields exactly the offset, so an infinite parent extent
    /// never turns `0 * inf` into NaN.
    pub fn resolve(&self, parent_extent: f64) -> f64 {
        if self.scale == 0.0 {
            return self.offset;
        }
        self.scale * parent_extent + self.offset
    }
}

/// Writing direction of the layout environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TextDirection {
    /// Left to right (English, Chinese, ...)
    #[default]
    LeftToRight,
    /// Right to left (Arabic, Hebrew, ...)
    RightToLeft,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        self == TextDirection::RightToLeft
    }
}

/// Four-sided insets, used for padding.
///
/// `leading` and `trailing` follow the text direction unless `absolute` is set,
/// in which case leading is always the left edge.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Insets {
    pub top: f64,
    pub bottom: f64,
    pub leading: f64,
    pub trailing: f64,
    /// Ignore the text direction when resolving
    pub absolute: bool,
}

impl Insets {
    /// No insets.
    pub const ZERO: Insets = Insets::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(top: f64, bottom: f64, leading: f64, trailing: f64) -> Self {
        Self {
            top,
            bottom,
            leading,
            trailing,
            absolute: false,
        }
    }

    /// Create uniform insets.
    pub const fn uniform(value: f64) -> Self {
        Self::new(value, value, value, value)
    }

    /// Create symmetric insets.
    pub const fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self::new(vertical, vertical, horizontal, horizontal)
    }

    /// Mark the insets as absolute (leading is always left).
    pub fn with_absolute(mut self, absolute: bool) -> Self {
        self.absolute = absolute;
        self
    }

    /// Resolve to left-to-right insets for `direction`, flooring negative sides at zero.
    ///
    /// The result is absolute: `leading` is the left inset and `trailing` the right one.
    pub fn resolve(&self, direction: TextDirection) -> Insets {
        let raw = self.resolve_raw(direction);
        Insets {
            top: raw.top.max(0.0),
            bottom: raw.bottom.max(0.0),
            leading: raw.leading.max(0.0),
            trailing: raw.trailing.max(0.0),
            absolute: true,
        }
    }

    /// Like [`Insets::resolve`] but keeps negative sides as they are.
    pub fn resolve_raw(&self, direction: TextDirection) -> Insets {
        let (leading, trailing) = match (self.absolute, direction) {
            (false, TextDirection::RightToLeft) => (self.trailing, self.leading),
            _ => (self.leading, self.trailing),
        };
        Insets {
            top: self.top,
            bottom: self.bottom,
            leading,
            trailing,
            absolute: true,
        }
    }

    /// Total horizontal inset.
    pub fn horizontal(&self) -> f64 {
        self.leading + self.trailing
    }

    /// Total vertical inset.
    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }

    /// Total inset per axis as a vector.
    pub fn total(&self) -> Vector2 {
        Vector2::new(self.horizontal(), self.vertical())
    }
}
