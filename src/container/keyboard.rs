//! The keyboard focus chain

use tracing::{debug, instrument, trace};

use super::{holds, Container};
use crate::{
    element::Element,
    input::{KeyState, KeyboardEvent, Keysym, Modifiers},
};

impl Container {
    /// Give keyboard focus to `element`, or take it away
    ///
    /// Enabling blurs the child previously holding the focus. Disabling is
    /// ignored unless `element` holds the focus. A change is propagated to
    /// the parent on behalf of this container, so the focus forms a chain
    /// from the root down to the focused element.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn set_keyboard_focus(&self, element: &Element, enabled: bool) {
        let held = holds(&self.state().roles.borrow().keyboard_focus, element);
        if enabled {
            if held {
                return;
            }
            let previous =
                Container::set_role(&mut self.state().roles.borrow_mut().keyboard_focus, Some(element));
            if let Some(previous) = previous {
                debug!(parent: self.element.span(), previous = previous.id(), "Keyboard focus moved");
                previous.keyboard_blur();
            }
        } else {
            if !held {
                trace!(parent: self.element.span(), element = element.id(), "Not holding keyboard focus");
                return;
            }
            self.state().roles.borrow_mut().keyboard_focus = None;
        }

        if let Some(parent) = self.element.parent() {
            parent.set_keyboard_focus(&self.element, enabled);
        }
    }

    pub(crate) fn handle_keyboard_blur(&self) {
        let previous = Container::set_role(&mut self.state().roles.borrow_mut().keyboard_focus, None);
        if let Some(previous) = previous {
            previous.keyboard_blur();
        }
    }

    pub(crate) fn handle_keyboard_event(&self, event: &KeyboardEvent) -> bool {
        match self.keyboard_focus() {
            Some(focus) => focus.keyboard_event(event),
            None => false,
        }
    }

    pub(crate) fn handle_keyboard_sym(&self, keysym: Keysym, state: KeyState, modifiers: Modifiers) -> bool {
        match self.keyboard_focus() {
            Some(focus) => focus.keyboard_sym(keysym, state, modifiers),
            None => false,
        }
    }
}
