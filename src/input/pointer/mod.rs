//! Pointer-related event types

use smallvec::{smallvec, SmallVec};

use crate::utils::Point;

/// Linux input code of the left (primary) mouse button
pub const BTN_LEFT: u32 = 0x110;
/// Linux input code of the right mouse button
pub const BTN_RIGHT: u32 = 0x111;
/// Linux input code of the middle mouse button
pub const BTN_MIDDLE: u32 = 0x112;

/// Pointer motion event
///
/// A location with a `NaN` coordinate means the pointer is not over the
/// receiving element's tracked area at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerMotionEvent {
    /// Location of the pointer, relative to the receiving element
    pub location: Point<f64>,
    /// Timestamp of the event, with millisecond granularity
    pub time_msec: u32,
}

impl PointerMotionEvent {
    /// Motion to `(x, y)`
    pub fn new(x: f64, y: f64, time_msec: u32) -> Self {
        PointerMotionEvent {
            location: Point::new(x, y),
            time_msec,
        }
    }

    /// Motion leaving the tracked area
    pub fn outside(time_msec: u32) -> Self {
        PointerMotionEvent::new(f64::NAN, f64::NAN, time_msec)
    }

    /// Whether this event places the pointer outside of any tracked area
    pub fn is_outside(&self) -> bool {
        self.location.is_nan()
    }

    /// The same event, in the coordinate space of a child located at `offset`
    pub fn translated(&self, offset: Point<i32>) -> Self {
        PointerMotionEvent {
            location: self.location - offset.to_f64(),
            time_msec: self.time_msec,
        }
    }
}

/// Physical state of a button, as reported by the input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Button is released
    Released,
    /// Button is pressed
    Pressed,
}

/// What happened to a button, as seen by the toolkit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEventKind {
    /// The button got pressed
    Down,
    /// The button got released
    Up,
    /// The button was pressed and released
    Click,
    /// The button was clicked twice in short succession
    DoubleClick,
}

/// Pointer button event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonEvent {
    /// Button that produced the event
    ///
    /// The button is a button code as defined in the
    /// Linux kernel's linux/input-event-codes.h header file, e.g. BTN_LEFT.
    pub button: u32,
    /// What happened to the button
    pub kind: ButtonEventKind,
    /// Timestamp of the event, with millisecond granularity
    pub time_msec: u32,
}

impl ButtonEvent {
    /// Create a new button event
    pub fn new(button: u32, kind: ButtonEventKind, time_msec: u32) -> Self {
        ButtonEvent {
            button,
            kind,
            time_msec,
        }
    }

    /// Translate a raw device press or release into toolkit button events
    ///
    /// A press becomes a [`ButtonEventKind::Down`], a release becomes an
    /// [`ButtonEventKind::Up`] followed by a [`ButtonEventKind::Click`].
    pub fn from_raw(button: u32, state: ButtonState, time_msec: u32) -> SmallVec<[ButtonEvent; 2]> {
        match state {
            ButtonState::Pressed => smallvec![ButtonEvent::new(button, ButtonEventKind::Down, time_msec)],
            ButtonState::Released => smallvec![
                ButtonEvent::new(button, ButtonEventKind::Up, time_msec),
                ButtonEvent::new(button, ButtonEventKind::Click, time_msec),
            ],
        }
    }
}

/// Axis when scrolling
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Axis {
    /// Vertical axis
    Vertical,
    /// Horizontal axis
    Horizontal,
}

/// Source of an axis when scrolling
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AxisSource {
    /// Finger. Mostly used for trackpads.
    Finger,
    /// Continuous scrolling device. Almost identical to `Finger`
    Continuous,
    /// Scroll wheel, scrolling in discrete steps
    Wheel,
    /// Scrolling through tilting the scroll wheel
    WheelTilt,
}

/// Pointer axis (scroll) event
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisEvent {
    /// Source of the axis event
    pub source: AxisSource,
    /// Axis that was scrolled
    pub orientation: Axis,
    /// Scroll distance
    pub delta: f64,
    /// Scroll distance in discrete steps, in multiples of 120 per step
    pub delta_discrete: i32,
    /// Timestamp of the event, with millisecond granularity
    pub time_msec: u32,
}
