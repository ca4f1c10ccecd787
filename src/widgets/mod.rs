//! Elements for building user interfaces
//!
//! Each widget is a handle owning an [`Element`](crate::element::Element)
//! or a [`Container`](crate::container::Container), and is added to the tree
//! through it.

mod box_layout;
mod buffer;
mod button;
mod solid_rect;

pub use self::box_layout::{BoxLayout, BoxStyle, Orientation};
pub use self::buffer::Buffer;
pub use self::button::{Button, ButtonStyle};
pub use self::solid_rect::SolidRect;
