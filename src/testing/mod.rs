//! Test doubles for code built on top of the element tree
//!
//! [`FakeElement`] is an element of configurable size recording every call
//! it receives. [`FakeParent`] is a root container attached to a scene of its
//! own, to add elements under test to.
//!
//! Available to unit tests of this crate, and to other crates through the
//! `test_fakes` feature.

use std::{cell::Cell, rc::Rc};

use crate::{
    container::{Container, DefaultContainer},
    element::{Capabilities, Element, ElementImpl},
    input::{AxisEvent, ButtonEvent, KeyState, KeyboardEvent, Keysym, Modifiers, PointerMotionEvent},
    scene::{Scene, SceneNode},
    utils::Rectangle,
};

/// An element recording the calls it receives
///
/// Button, axis and keyboard events are accepted. The pointer area equals
/// the dimensions unless set explicitly.
#[derive(Debug)]
pub struct FakeElement {
    /// Dimensions reported by the element
    pub dimensions: Cell<Rectangle<i32>>,
    /// Pointer area reported by the element, if different from the dimensions
    pub pointer_area: Cell<Option<Rectangle<i32>>>,
    /// Whether button events are accepted
    pub accept_buttons: Cell<bool>,

    /// Whether `destroy` was called
    pub destroyed: Cell<bool>,
    /// Number of `pointer_motion` calls
    pub motion_count: Cell<u32>,
    /// Number of `pointer_blur` calls
    pub blur_count: Cell<u32>,
    /// Number of `pointer_button` calls
    pub button_count: Cell<u32>,
    /// Number of `pointer_axis` calls
    pub axis_count: Cell<u32>,
    /// Number of `pointer_grab_cancel` calls
    pub grab_cancel_count: Cell<u32>,
    /// Number of `keyboard_blur` calls
    pub keyboard_blur_count: Cell<u32>,
    /// Number of `keyboard_event` calls
    pub keyboard_event_count: Cell<u32>,
    /// Number of `keyboard_sym` calls
    pub keyboard_sym_count: Cell<u32>,

    /// The last motion event received
    pub last_motion: Cell<Option<PointerMotionEvent>>,
    /// The last button event received
    pub last_button: Cell<Option<ButtonEvent>>,
    /// The last axis event received
    pub last_axis: Cell<Option<AxisEvent>>,
    /// The last raw key event received
    pub last_keyboard_event: Cell<Option<KeyboardEvent>>,
    /// The last keysym received
    pub last_keysym: Cell<Option<Keysym>>,
}

impl FakeElement {
    /// A fake element of the given dimensions
    pub fn new(dimensions: Rectangle<i32>) -> FakeElement {
        FakeElement {
            dimensions: Cell::new(dimensions),
            pointer_area: Cell::new(None),
            accept_buttons: Cell::new(true),
            destroyed: Cell::new(false),
            motion_count: Cell::new(0),
            blur_count: Cell::new(0),
            button_count: Cell::new(0),
            axis_count: Cell::new(0),
            grab_cancel_count: Cell::new(0),
            keyboard_blur_count: Cell::new(0),
            keyboard_event_count: Cell::new(0),
            keyboard_sym_count: Cell::new(0),
            last_motion: Cell::new(None),
            last_button: Cell::new(None),
            last_axis: Cell::new(None),
            last_keyboard_event: Cell::new(None),
            last_keysym: Cell::new(None),
        }
    }

    /// Create a visible fake element, returning its handle and the fake itself
    pub fn create(dimensions: Rectangle<i32>) -> (Element, Rc<FakeElement>) {
        let fake = Rc::new(FakeElement::new(dimensions));
        let element = Element::from_impl(fake.clone());
        element.set_visible(true);
        (element, fake)
    }

    /// Reset all counters and recorded events
    pub fn reset(&self) {
        for counter in [
            &self.motion_count,
            &self.blur_count,
            &self.button_count,
            &self.axis_count,
            &self.grab_cancel_count,
            &self.keyboard_blur_count,
            &self.keyboard_event_count,
            &self.keyboard_sym_count,
        ] {
            counter.set(0);
        }
        self.last_motion.set(None);
        self.last_button.set(None);
        self.last_axis.set(None);
        self.last_keyboard_event.set(None);
        self.last_keysym.set(None);
    }
}

fn bump(counter: &Cell<u32>) {
    counter.set(counter.get() + 1);
}

impl ElementImpl for FakeElement {
    fn create_visual_node(&self, _element: &Element, parent: &SceneNode) -> SceneNode {
        let size = self.dimensions.get().size;
        SceneNode::new_buffer(parent, size)
            .unwrap_or_else(|err| panic!("failed to create the visual node of a fake element: {err}"))
    }

    fn dimensions(&self, _element: &Element) -> Rectangle<i32> {
        self.dimensions.get()
    }

    fn destroy(&self, _element: &Element) {
        self.destroyed.set(true);
    }

    fn pointer_area(&self, element: &Element) -> Rectangle<i32> {
        self.pointer_area.get().unwrap_or_else(|| element.default_pointer_area())
    }

    fn pointer_motion(&self, element: &Element, event: &PointerMotionEvent) -> bool {
        bump(&self.motion_count);
        self.last_motion.set(Some(*event));
        element.default_pointer_motion(event)
    }

    fn pointer_blur(&self, element: &Element) {
        bump(&self.blur_count);
        element.default_pointer_blur();
    }

    fn pointer_button(&self, _element: &Element, event: &ButtonEvent) -> bool {
        bump(&self.button_count);
        self.last_button.set(Some(*event));
        self.accept_buttons.get()
    }

    fn pointer_axis(&self, _element: &Element, event: &AxisEvent) -> bool {
        bump(&self.axis_count);
        self.last_axis.set(Some(*event));
        true
    }

    fn pointer_grab_cancel(&self, _element: &Element) {
        bump(&self.grab_cancel_count);
    }

    fn keyboard_blur(&self, _element: &Element) {
        bump(&self.keyboard_blur_count);
    }

    fn keyboard_event(&self, _element: &Element, event: &KeyboardEvent) -> bool {
        bump(&self.keyboard_event_count);
        self.last_keyboard_event.set(Some(*event));
        true
    }

    fn keyboard_sym(
        &self,
        _element: &Element,
        keysym: Keysym,
        _state: KeyState,
        _modifiers: Modifiers,
    ) -> bool {
        bump(&self.keyboard_sym_count);
        self.last_keysym.set(Some(keysym));
        true
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities::POINTER_GRAB
    }
}

/// A root container attached to a scene of its own
///
/// Destroys the container, with all children still in it, when dropped.
#[derive(Debug)]
pub struct FakeParent {
    container: Container,
    scene: Scene,
}

impl FakeParent {
    /// Create a new scene holding an empty root container
    pub fn new() -> FakeParent {
        let scene = Scene::new();
        let container = Container::new_attached(DefaultContainer, scene.root())
            .expect("the root of a new scene accepts children");
        FakeParent { container, scene }
    }

    /// The root container
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The scene the root container is attached to
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
}

impl Default for FakeParent {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FakeParent {
    fn drop(&mut self) {
        self.container.destroy();
    }
}

/// Route log output of the tests through the test harness
#[cfg(test)]
pub(crate) fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
