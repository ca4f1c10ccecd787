use std::fmt;
use std::ops::{Add, Sub};

/// Trait for types serving as a coordinate for the geometry types
pub trait Coordinate:
    Sized + Add<Self, Output = Self> + Sub<Self, Output = Self> + PartialOrd + Default + Copy + fmt::Debug
{
    /// A Coordinate that is 0
    const ZERO: Self;
    /// Convert the coordinate to a f64
    fn to_f64(self) -> f64;
    /// Compare and return the smaller one
    fn min(self, other: Self) -> Self {
        if self < other {
            self
        } else {
            other
        }
    }
    /// Compare and return the larger one
    fn max(self, other: Self) -> Self {
        if self > other {
            self
        } else {
            other
        }
    }
}

impl Coordinate for i32 {
    const ZERO: i32 = 0;

    #[inline]
    fn to_f64(self) -> f64 {
        self as f64
    }
}

impl Coordinate for f64 {
    const ZERO: f64 = 0.0;

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/*
 * Point
 */

/// A point as defined by its x and y coordinates
///
/// Points are always relative to the coordinate space of a parent: an
/// element's position is relative to its container, an event's location is
/// relative to the element receiving it.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Point<N> {
    /// horizontal coordinate
    pub x: N,
    /// vertical coordinate
    pub y: N,
}

impl<N> Point<N> {
    /// Create a new point
    pub const fn new(x: N, y: N) -> Self {
        Point { x, y }
    }
}

impl<N: Coordinate> Point<N> {
    /// Convert this [`Point`] to a [`f64`]-based one
    #[inline]
    pub fn to_f64(self) -> Point<f64> {
        Point {
            x: self.x.to_f64(),
            y: self.y.to_f64(),
        }
    }
}

impl Point<f64> {
    /// Whether either coordinate is not-a-number
    #[inline]
    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }
}

impl<N: fmt::Debug> fmt::Debug for Point<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &self.x)
            .field("y", &self.y)
            .finish()
    }
}

impl<N> From<(N, N)> for Point<N> {
    #[inline]
    fn from((x, y): (N, N)) -> Self {
        Point { x, y }
    }
}

impl<N> From<Point<N>> for (N, N) {
    #[inline]
    fn from(point: Point<N>) -> (N, N) {
        (point.x, point.y)
    }
}

impl<N: Coordinate> Add for Point<N> {
    type Output = Point<N>;
    #[inline]
    fn add(self, other: Point<N>) -> Point<N> {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl<N: Coordinate> Sub for Point<N> {
    type Output = Point<N>;
    #[inline]
    fn sub(self, other: Point<N>) -> Point<N> {
        Point {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

/*
 * Size
 */

/// A size as defined by its width and height
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Size<N> {
    /// horizontal extent
    pub w: N,
    /// vertical extent
    pub h: N,
}

impl<N> Size<N> {
    /// Create a new size
    pub const fn new(w: N, h: N) -> Self {
        Size { w, h }
    }
}

impl<N: Coordinate> Size<N> {
    /// Whether this size covers no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.w <= N::ZERO || self.h <= N::ZERO
    }

    /// Convert this [`Size`] to a [`f64`]-based one
    #[inline]
    pub fn to_f64(self) -> Size<f64> {
        Size {
            w: self.w.to_f64(),
            h: self.h.to_f64(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Size<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Size")
            .field("w", &self.w)
            .field("h", &self.h)
            .finish()
    }
}

impl<N> From<(N, N)> for Size<N> {
    #[inline]
    fn from((w, h): (N, N)) -> Self {
        Size { w, h }
    }
}

/*
 * Rectangle
 */

/// An axis-aligned rectangle defined by its top-left corner and dimensions
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Rectangle<N> {
    /// Location of the top-left corner of the rectangle
    pub loc: Point<N>,
    /// Size of the rectangle, as (width, height)
    pub size: Size<N>,
}

impl<N: Coordinate> Rectangle<N> {
    /// Create a new [`Rectangle`] from the coordinates of its top-left corner and its dimensions
    #[inline]
    pub fn from_loc_and_size(loc: impl Into<Point<N>>, size: impl Into<Size<N>>) -> Self {
        Rectangle {
            loc: loc.into(),
            size: size.into(),
        }
    }

    /// Create a new [`Rectangle`] at the origin
    #[inline]
    pub fn from_size(size: impl Into<Size<N>>) -> Self {
        Rectangle {
            loc: Point::new(N::ZERO, N::ZERO),
            size: size.into(),
        }
    }

    /// The degenerate rectangle at the origin
    #[inline]
    pub fn zero() -> Self {
        Rectangle::default()
    }

    /// Create a new [`Rectangle`] from the coordinates of its top-left corner and its bottom-right corner
    #[inline]
    pub fn from_extremities(topleft: impl Into<Point<N>>, bottomright: impl Into<Point<N>>) -> Self {
        let topleft = topleft.into();
        let bottomright = bottomright.into();
        Rectangle {
            loc: topleft,
            size: Size::new(bottomright.x - topleft.x, bottomright.y - topleft.y),
        }
    }

    /// The exclusive right edge
    #[inline]
    pub fn right(&self) -> N {
        self.loc.x + self.size.w
    }

    /// The exclusive bottom edge
    #[inline]
    pub fn bottom(&self) -> N {
        self.loc.y + self.size.h
    }

    /// Whether this rectangle covers no area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Checks whether given [`Point`] is inside the rectangle
    ///
    /// The left and top edges are inclusive, the right and bottom edges are
    /// exclusive. A `NaN` coordinate is never contained.
    #[inline]
    pub fn contains<P: Into<Point<N>>>(self, point: P) -> bool {
        let p: Point<N> = point.into();
        (p.x >= self.loc.x) && (p.x < self.right()) && (p.y >= self.loc.y) && (p.y < self.bottom())
    }

    /// The smallest rectangle covering both `self` and `other`
    #[inline]
    pub fn merge(self, other: Self) -> Self {
        let x1 = Coordinate::min(self.loc.x, other.loc.x);
        let y1 = Coordinate::min(self.loc.y, other.loc.y);
        let x2 = Coordinate::max(self.right(), other.right());
        let y2 = Coordinate::max(self.bottom(), other.bottom());
        Rectangle::from_extremities((x1, y1), (x2, y2))
    }

    /// This rectangle moved by `offset`
    #[inline]
    pub fn translate(self, offset: impl Into<Point<N>>) -> Self {
        Rectangle {
            loc: self.loc + offset.into(),
            size: self.size,
        }
    }

    /// Convert this [`Rectangle`] to a [`f64`]-based one
    #[inline]
    pub fn to_f64(self) -> Rectangle<f64> {
        Rectangle {
            loc: self.loc.to_f64(),
            size: self.size.to_f64(),
        }
    }
}

impl<N: fmt::Debug> fmt::Debug for Rectangle<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rectangle")
            .field("x", &self.loc.x)
            .field("y", &self.loc.y)
            .field("width", &self.size.w)
            .field("height", &self.size.h)
            .finish()
    }
}
