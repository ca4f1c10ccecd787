use std::{cell::Cell, fmt, rc::Rc};

use tracing::trace;

use crate::{
    element::{Element, ElementImpl},
    input::{ButtonEvent, ButtonEventKind, PointerMotionEvent, BTN_LEFT},
    scene::{Color, SceneNode},
    utils::{signaling::Signaler, Rectangle, Size},
};

/// Appearance of a [`Button`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonStyle {
    /// Size of the button
    pub size: Size<i32>,
    /// Fill while released
    pub released: Color,
    /// Fill while pressed with the pointer inside
    pub pressed: Color,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        ButtonStyle {
            size: Size::new(22, 22),
            released: Color(0xff80_8080),
            pressed: Color(0xff40_4040),
        }
    }
}

#[derive(Debug)]
struct ButtonImpl {
    style: ButtonStyle,
    pressed: Cell<bool>,
    clicked: Signaler<ButtonEvent>,
}

impl ButtonImpl {
    fn update_look(&self, element: &Element, inside: bool) {
        let color = if self.pressed.get() && inside {
            self.style.pressed
        } else {
            self.style.released
        };
        if let Some(node) = element.visual_node() {
            node.set_color(color);
        }
    }
}

impl ElementImpl for ButtonImpl {
    fn create_visual_node(&self, element: &Element, parent: &SceneNode) -> SceneNode {
        let color = if self.pressed.get() && element.pointer_inside() {
            self.style.pressed
        } else {
            self.style.released
        };
        SceneNode::new_rect(parent, self.style.size, color)
            .unwrap_or_else(|err| panic!("failed to create button node: {err}"))
    }

    fn dimensions(&self, _element: &Element) -> Rectangle<i32> {
        Rectangle::from_size(self.style.size)
    }

    fn pointer_motion(&self, element: &Element, event: &PointerMotionEvent) -> bool {
        let inside = element.default_pointer_motion(event);
        self.update_look(element, inside);
        inside
    }

    fn pointer_blur(&self, element: &Element) {
        element.default_pointer_blur();
        self.update_look(element, false);
    }

    fn pointer_button(&self, element: &Element, event: &ButtonEvent) -> bool {
        if event.button != BTN_LEFT {
            return false;
        }
        match event.kind {
            ButtonEventKind::Down => self.pressed.set(true),
            ButtonEventKind::Up => self.pressed.set(false),
            ButtonEventKind::Click => {
                trace!(element = element.id(), "Button clicked");
                self.clicked.signal(event);
            }
            ButtonEventKind::DoubleClick => {}
        }
        self.update_look(element, element.pointer_inside());
        true
    }
}

/// A push button
///
/// Looks pressed while the left button is held down and the pointer is
/// inside, and sends [`Button::clicked_signal`] when clicked.
#[derive(Clone)]
pub struct Button {
    element: Element,
    imp: Rc<ButtonImpl>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("element", &self.element)
            .field("pressed", &self.imp.pressed.get())
            .finish()
    }
}

impl Button {
    /// Create a button of the given style
    pub fn new(style: ButtonStyle) -> Button {
        let imp = Rc::new(ButtonImpl {
            style,
            pressed: Cell::new(false),
            clicked: Signaler::new(),
        });
        Button {
            element: Element::from_impl(imp.clone()),
            imp,
        }
    }

    /// The element of this button
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Whether the left button is held down on this button
    pub fn is_pressed(&self) -> bool {
        self.imp.pressed.get()
    }

    /// Whether the button currently looks pressed
    pub fn looks_pressed(&self) -> bool {
        self.is_pressed() && self.element.pointer_inside()
    }

    /// Signal sent when the button is clicked
    pub fn clicked_signal(&self) -> &Signaler<ButtonEvent> {
        &self.imp.clicked
    }
}
