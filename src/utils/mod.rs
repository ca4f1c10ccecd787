//! Various utilities functions and types

mod geometry;
pub mod reentrancy;
pub mod signaling;

pub use self::geometry::{Coordinate, Point, Rectangle, Size};
