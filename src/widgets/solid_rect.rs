use std::{cell::Cell, fmt, rc::Rc};

use crate::{
    element::{Element, ElementImpl},
    scene::{Color, SceneNode},
    utils::{Rectangle, Size},
};

#[derive(Debug)]
struct SolidRectImpl {
    size: Cell<Size<i32>>,
    color: Cell<Color>,
}

impl ElementImpl for SolidRectImpl {
    fn create_visual_node(&self, _element: &Element, parent: &SceneNode) -> SceneNode {
        SceneNode::new_rect(parent, self.size.get(), self.color.get())
            .unwrap_or_else(|err| panic!("failed to create rect node: {err}"))
    }

    fn dimensions(&self, _element: &Element) -> Rectangle<i32> {
        Rectangle::from_size(self.size.get())
    }
}

/// A rectangle filled with a solid color
#[derive(Clone)]
pub struct SolidRect {
    element: Element,
    imp: Rc<SolidRectImpl>,
}

impl fmt::Debug for SolidRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolidRect")
            .field("element", &self.element)
            .field("size", &self.imp.size.get())
            .field("color", &self.imp.color.get())
            .finish()
    }
}

impl SolidRect {
    /// Create a rectangle of the given size and color
    pub fn new(size: Size<i32>, color: Color) -> SolidRect {
        let imp = Rc::new(SolidRectImpl {
            size: Cell::new(size),
            color: Cell::new(color),
        });
        SolidRect {
            element: Element::from_impl(imp.clone()),
            imp,
        }
    }

    /// The element of this rectangle
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Color of the rectangle
    pub fn color(&self) -> Color {
        self.imp.color.get()
    }

    /// Change the color of the rectangle
    pub fn set_color(&self, color: Color) {
        self.imp.color.set(color);
        if let Some(node) = self.element.visual_node() {
            node.set_color(color);
        }
    }

    /// Size of the rectangle
    pub fn size(&self) -> Size<i32> {
        self.imp.size.get()
    }

    /// Resize the rectangle, and have the parent update its layout
    pub fn set_size(&self, size: Size<i32>) {
        if self.imp.size.replace(size) == size {
            return;
        }
        if let Some(node) = self.element.visual_node() {
            node.set_size(size);
        }
        if let Some(parent) = self.element.parent() {
            parent.update_layout_and_refocus();
        }
    }
}
