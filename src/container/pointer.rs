//! Pointer input routing and the pointer grab protocol

use tracing::{debug, instrument, trace};

use super::{holds, Container};
use crate::{
    element::{Capabilities, Element},
    input::{AxisEvent, ButtonEvent, ButtonEventKind, ButtonState, PointerMotionEvent, BTN_LEFT},
};

impl Container {
    /// Offer the motion to the children, topmost first
    ///
    /// While a grab is held the holder receives the motion unconditionally.
    /// A child only gains focus if it is still a visible child once it has
    /// accepted the motion, since its enter handlers may change the tree.
    pub(crate) fn handle_pointer_motion(&self, event: &PointerMotionEvent) -> bool {
        self.element.record_pointer_motion(event);

        if let Some(holder) = self.pointer_grab_holder() {
            trace!(parent: self.element.span(), holder = holder.id(), "Routing motion to grab holder");
            return holder.pointer_motion(&event.translated(holder.position()));
        }

        let serial = self.state().motion_serial.get().wrapping_add(1);
        self.state().motion_serial.set(serial);

        let accepted = {
            let _inhibit = self.state().blur_inhibit.enter();
            let mut accepted = None;
            for child in self.children() {
                // an earlier child's handler may have changed the tree
                if !self.can_focus(&child) {
                    continue;
                }
                if !child.pointer_motion(&event.translated(child.position())) {
                    continue;
                }
                if self.can_focus(&child) {
                    accepted = Some(child);
                    break;
                }
                trace!(parent: self.element.span(), child = child.id(), "Child left the tree on enter");
                child.pointer_blur();
            }
            accepted
        };

        if self.state().motion_serial.get() != serial {
            // a nested replay has already assigned the focus
            let focus = self.pointer_focus();
            if let Some(child) = accepted {
                if focus.as_ref() != Some(&child) && child.pointer_inside() {
                    child.pointer_blur();
                }
            }
            return focus.is_some();
        }

        let previous = {
            let mut roles = self.state().roles.borrow_mut();
            Container::set_role(&mut roles.pointer_focus, accepted.as_ref())
        };
        if let Some(previous) = previous {
            if Some(&previous) != accepted.as_ref() && previous.pointer_inside() {
                previous.pointer_blur();
            }
        }
        match accepted {
            Some(child) => {
                trace!(parent: self.element.span(), child = child.id(), "Pointer focus");
                true
            }
            None => false,
        }
    }

    fn can_focus(&self, child: &Element) -> bool {
        child.is_visible() && self.contains(child)
    }

    pub(crate) fn handle_pointer_blur(&self) {
        if self.state().blur_inhibit.is_active() {
            trace!(parent: self.element.span(), "Blur inhibited while probing children");
            return;
        }
        let previous = Container::set_role(&mut self.state().roles.borrow_mut().pointer_focus, None);
        if let Some(previous) = previous {
            previous.pointer_blur();
        }
    }

    pub(crate) fn handle_pointer_button(&self, event: &ButtonEvent) -> bool {
        if let Some(holder) = self.pointer_grab_holder() {
            trace!(
                parent: self.element.span(),
                holder = holder.id(),
                ?event,
                "Routing button to grab holder"
            );
            return holder.pointer_button(event);
        }

        let focus = self.pointer_focus();
        if event.button != BTN_LEFT {
            return focus.map_or(false, |focus| focus.pointer_button(event));
        }

        match event.kind {
            ButtonEventKind::Down => {
                let accepted = focus.as_ref().map_or(false, |focus| focus.pointer_button(event));
                let down = if accepted { focus.as_ref() } else { None };
                Container::set_role(&mut self.state().roles.borrow_mut().left_button_down, down);
                accepted
            }
            ButtonEventKind::Up => self
                .left_button_down()
                .map_or(false, |down| down.pointer_button(event)),
            ButtonEventKind::Click | ButtonEventKind::DoubleClick => {
                match (self.left_button_down(), focus) {
                    (Some(down), Some(focus)) if down == focus => down.pointer_button(event),
                    _ => {
                        trace!(parent: self.element.span(), ?event, "Dropping click off the pressed child");
                        false
                    }
                }
            }
        }
    }

    pub(crate) fn handle_pointer_axis(&self, event: &AxisEvent) -> bool {
        match self.pointer_grab_holder().or_else(|| self.pointer_focus()) {
            Some(target) => target.pointer_axis(event),
            None => false,
        }
    }

    pub(crate) fn handle_pointer_grab_cancel(&self) {
        let holder = Container::set_role(&mut self.state().roles.borrow_mut().pointer_grab, None);
        if let Some(holder) = holder {
            debug!(parent: self.element.span(), holder = holder.id(), "Cancelling pointer grab");
            holder.pointer_grab_cancel();
        }
    }

    /// Translate a raw device button event and dispatch it from this container
    ///
    /// A press is delivered as [`ButtonEventKind::Down`], a release as
    /// [`ButtonEventKind::Up`] followed by [`ButtonEventKind::Click`]. Returns
    /// whether the last delivered event was accepted.
    pub fn pointer_button_raw(&self, button: u32, state: ButtonState, time_msec: u32) -> bool {
        let mut accepted = false;
        for event in ButtonEvent::from_raw(button, state, time_msec) {
            accepted = self.element.pointer_button(&event);
        }
        accepted
    }

    /// Have `element` grab the pointer
    ///
    /// Until released, all pointer events reaching this container are routed
    /// to `element`, regardless of the pointer location. A grab held by
    /// another child is cancelled, and the grab is requested from the parent
    /// on behalf of this container.
    ///
    /// # Panics
    ///
    /// Panics if `element` is not a child of this container, or does not
    /// have the [`Capabilities::POINTER_GRAB`] capability.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn pointer_grab(&self, element: &Element) {
        assert!(
            self.contains(element),
            "pointer grab requested by element {}, which is not a child",
            element.id()
        );
        assert!(
            element.capabilities().contains(Capabilities::POINTER_GRAB),
            "pointer grab requested by element {}, which cannot have its grab cancelled",
            element.id()
        );

        let previous = Container::set_role(&mut self.state().roles.borrow_mut().pointer_grab, Some(element));
        if let Some(previous) = previous {
            if &previous != element {
                debug!(parent: self.element.span(), holder = previous.id(), "Grab taken over");
                previous.pointer_grab_cancel();
            }
        }

        if let Some(focus) = self.pointer_focus() {
            if &focus != element {
                Container::set_role(&mut self.state().roles.borrow_mut().pointer_focus, None);
                focus.pointer_blur();
            }
        }

        if let Some(parent) = self.element.parent() {
            parent.pointer_grab(&self.element);
        }
    }

    /// Release the pointer grab held by `element`
    ///
    /// Ignored unless `element` holds the grab. The release propagates to
    /// the root, which recomputes the pointer focus from the last motion.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn pointer_grab_release(&self, element: &Element) {
        let held = holds(&self.state().roles.borrow().pointer_grab, element);
        if !held {
            trace!(parent: self.element.span(), element = element.id(), "Ignoring release by non-holder");
            return;
        }
        self.state().roles.borrow_mut().pointer_grab = None;

        match self.element.parent() {
            Some(parent) => parent.pointer_grab_release(&self.element),
            None => self.replay_pointer_motion(),
        }
    }
}
