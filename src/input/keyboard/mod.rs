//! Keyboard-related event types

pub use xkeysym::Keysym;

bitflags::bitflags! {
    /// Modifiers held while a key event happened
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u32 {
        /// The shift key
        const SHIFT = 1 << 0;
        /// The caps lock key
        const CAPS = 1 << 1;
        /// The control key
        const CTRL = 1 << 2;
        /// The alt key
        const ALT = 1 << 3;
        /// The num lock key
        const MOD2 = 1 << 4;
        /// Usually unmapped
        const MOD3 = 1 << 5;
        /// The "logo" or "super" key
        const LOGO = 1 << 6;
        /// Usually the AltGr key
        const MOD5 = 1 << 7;
    }
}

/// State of a key on a keyboard. Either pressed or released
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum KeyState {
    /// Key is released
    Released,
    /// Key is pressed
    Pressed,
}

/// Raw keyboard key event, before keysym translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    /// Evdev keycode of the key
    pub keycode: u32,
    /// Whether the key was pressed or released
    pub state: KeyState,
    /// Modifiers active when the event happened
    pub modifiers: Modifiers,
    /// Timestamp of the event, with millisecond granularity
    pub time_msec: u32,
}
