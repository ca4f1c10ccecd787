use std::{cell::Cell, fmt, rc::Rc};

use tracing::debug;

use crate::{
    element::{Element, ElementImpl},
    scene::SceneNode,
    utils::{Rectangle, Size},
};

#[derive(Debug)]
struct BufferImpl {
    size: Cell<Size<i32>>,
}

impl ElementImpl for BufferImpl {
    fn create_visual_node(&self, _element: &Element, parent: &SceneNode) -> SceneNode {
        SceneNode::new_buffer(parent, self.size.get())
            .unwrap_or_else(|err| panic!("failed to create buffer node: {err}"))
    }

    fn dimensions(&self, _element: &Element) -> Rectangle<i32> {
        Rectangle::from_size(self.size.get())
    }
}

/// An element displaying a buffer
#[derive(Clone)]
pub struct Buffer {
    element: Element,
    imp: Rc<BufferImpl>,
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("element", &self.element)
            .field("size", &self.imp.size.get())
            .finish()
    }
}

impl Buffer {
    /// Create a buffer element of the given size
    pub fn new(size: Size<i32>) -> Buffer {
        let imp = Rc::new(BufferImpl { size: Cell::new(size) });
        Buffer {
            element: Element::from_impl(imp.clone()),
            imp,
        }
    }

    /// The element of this buffer
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Size of the buffer
    pub fn size(&self) -> Size<i32> {
        self.imp.size.get()
    }

    /// Resize the buffer, and have the parent update its layout
    pub fn set_size(&self, size: Size<i32>) {
        if self.imp.size.replace(size) == size {
            return;
        }
        debug!(element = self.element.id(), ?size, "Buffer resized");
        if let Some(node) = self.element.visual_node() {
            node.set_size(size);
        }
        if let Some(parent) = self.element.parent() {
            parent.update_layout_and_refocus();
        }
    }
}
