use std::{cell::Cell, fmt, rc::Rc};

use tracing::trace;

use crate::{
    container::{Container, ContainerImpl},
    element::{Element, ElementImpl},
    scene::SceneNode,
    utils::{Point, Rectangle},
};

/// Direction a [`BoxLayout`] arranges its children in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Left to right
    Horizontal,
    /// Top to bottom
    Vertical,
}

/// Appearance of a [`BoxLayout`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BoxStyle {
    /// Gap between two adjacent children
    pub spacing: i32,
}

#[derive(Debug)]
struct BoxImpl {
    orientation: Orientation,
    style: Cell<BoxStyle>,
}

impl ElementImpl for BoxImpl {
    fn create_visual_node(&self, element: &Element, parent: &SceneNode) -> SceneNode {
        Container::of(element).create_scene_tree(parent)
    }

    fn dimensions(&self, element: &Element) -> Rectangle<i32> {
        Container::of(element).bounding_box()
    }
}

impl ContainerImpl for BoxImpl {
    fn update_layout(&self, container: &Container) -> bool {
        let spacing = self.style.get().spacing;
        let mut offset = 0;
        let mut changed = false;
        for child in container.children().iter().filter(|child| child.is_visible()) {
            let dimensions = child.dimensions();
            let position = match self.orientation {
                Orientation::Horizontal => Point::new(offset - dimensions.loc.x, -dimensions.loc.y),
                Orientation::Vertical => Point::new(-dimensions.loc.x, offset - dimensions.loc.y),
            };
            if child.position() != position {
                child.set_position(position);
                changed = true;
            }
            offset += spacing
                + match self.orientation {
                    Orientation::Horizontal => dimensions.size.w,
                    Orientation::Vertical => dimensions.size.h,
                };
        }
        if changed {
            trace!(container = container.element().id(), "Box re-arranged");
        }
        changed
    }
}

/// A container arranging its visible children in a row or a column
///
/// Children are laid out from the head of the child list, so
/// [`Container::add_child`] prepends and [`Container::add_child_above`] with
/// no reference appends.
#[derive(Clone)]
pub struct BoxLayout {
    container: Container,
    imp: Rc<BoxImpl>,
}

impl fmt::Debug for BoxLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxLayout")
            .field("container", &self.container)
            .field("orientation", &self.imp.orientation)
            .field("style", &self.imp.style.get())
            .finish()
    }
}

impl BoxLayout {
    /// Create an empty box
    pub fn new(orientation: Orientation, style: BoxStyle) -> BoxLayout {
        let imp = Rc::new(BoxImpl {
            orientation,
            style: Cell::new(style),
        });
        BoxLayout {
            container: Container::from_impl(imp.clone()),
            imp,
        }
    }

    /// The container of this box
    pub fn container(&self) -> &Container {
        &self.container
    }

    /// The element of this box
    pub fn element(&self) -> &Element {
        self.container.element()
    }

    /// The direction children are arranged in
    pub fn orientation(&self) -> Orientation {
        self.imp.orientation
    }

    /// Change the style, and re-arrange the children
    pub fn set_style(&self, style: BoxStyle) {
        if self.imp.style.replace(style) != style {
            self.container.update_layout_and_refocus();
        }
    }
}
