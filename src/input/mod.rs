//! Input event records routed through the element tree
//!
//! The events are plain data. Coordinates of pointer events are always given
//! relative to the element receiving them: containers translate them into
//! each child's coordinate space before forwarding.

pub mod keyboard;
pub mod pointer;

pub use self::keyboard::{KeyState, KeyboardEvent, Keysym, Modifiers};
pub use self::pointer::{
    Axis, AxisEvent, AxisSource, ButtonEvent, ButtonEventKind, ButtonState, PointerMotionEvent, BTN_LEFT,
    BTN_MIDDLE, BTN_RIGHT,
};
