//! Elements holding and arranging other elements
//!
//! A [`Container`] is an [`Element`] owning an ordered list of children.
//! The order is the z-order: the head of the list is the topmost child.
//!
//! Besides membership the container implements the input routing of the
//! tree. It keeps four roles, each held by at most one child:
//!
//! - the *pointer focus*, the topmost visible child under the pointer,
//! - the *pointer grab*, a child claiming all pointer input regardless of
//!   geometry (see [`Container::pointer_grab`]),
//! - the child that accepted the last press of the left button, which
//!   receives the matching release,
//! - the *keyboard focus* (see [`Container::set_keyboard_focus`]).
//!
//! Roles form chains up to the root: a container holding the grab or the
//! keyboard focus of its parent does so on behalf of one of its own children.
//!
//! Any change to a child's position, visibility or membership triggers a
//! layout update of the container, which bubbles up to the root. The root
//! then replays the last pointer motion to recompute the pointer focus.

use std::{
    cell::{Cell, RefCell},
    fmt,
    rc::Rc,
};

use tracing::{debug, instrument, trace};

use crate::{
    element::{Element, ElementImpl, WeakElement},
    scene::{SceneError, SceneNode},
    utils::{reentrancy::ReentrancyFlag, signaling::SignalToken, Rectangle},
};

mod keyboard;
mod pointer;

/// Behavior of a [`Container`]
///
/// A container implementation is an [`ElementImpl`] whose
/// `create_visual_node` must return the container's scene tree, as created
/// by [`Container::create_scene_tree`]. [`DefaultContainer`] shows the
/// minimal implementation.
pub trait ContainerImpl: ElementImpl {
    /// Arrange the children of `container`
    ///
    /// Called whenever a child was added, removed, raised or changed
    /// visibility. Returns whether the layout changed. Changes to the
    /// children made from within this hook do not trigger a nested update.
    fn update_layout(&self, container: &Container) -> bool {
        let _ = container;
        false
    }
}

/// A container without any layout of its own
///
/// Children stay where they are put and the dimensions are the bounding box
/// of the visible children.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultContainer;

impl ElementImpl for DefaultContainer {
    fn create_visual_node(&self, element: &Element, parent: &SceneNode) -> SceneNode {
        Container::of(element).create_scene_tree(parent)
    }

    fn dimensions(&self, element: &Element) -> Rectangle<i32> {
        Container::of(element).bounding_box()
    }
}

impl ContainerImpl for DefaultContainer {}

#[derive(Debug, Default)]
struct Roles {
    pointer_focus: Option<WeakElement>,
    pointer_grab: Option<WeakElement>,
    left_button_down: Option<WeakElement>,
    keyboard_focus: Option<WeakElement>,
}

/// State a container carries on top of the element state
pub(crate) struct ContainerState {
    imp: Rc<dyn ContainerImpl>,
    // topmost first
    children: RefCell<Vec<Element>>,
    roles: RefCell<Roles>,
    scene_tree: RefCell<Option<SceneNode>>,
    scene_tree_token: RefCell<Option<SignalToken>>,
    owns_scene_tree: Cell<bool>,
    layout_guard: ReentrancyFlag,
    blur_inhibit: ReentrancyFlag,
    // bumped on every probe of the children, to detect nested replays
    motion_serial: Cell<u64>,
}

impl ContainerState {
    fn new(imp: Rc<dyn ContainerImpl>) -> ContainerState {
        ContainerState {
            imp,
            children: RefCell::new(Vec::new()),
            roles: RefCell::new(Roles::default()),
            scene_tree: RefCell::new(None),
            scene_tree_token: RefCell::new(None),
            owns_scene_tree: Cell::new(false),
            layout_guard: ReentrancyFlag::new(),
            blur_inhibit: ReentrancyFlag::new(),
            motion_serial: Cell::new(0),
        }
    }
}

/// Handle to a container element
///
/// The element operations are available through [`Container::element`].
#[derive(Clone, PartialEq, Eq)]
pub struct Container {
    element: Element,
}

impl fmt::Debug for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Container")
            .field("element", &self.element)
            .field("children", &self.state().children.borrow().len())
            .field("roles", &self.state().roles.borrow())
            .finish()
    }
}

impl Container {
    /// Create a new free-standing container behaving as `imp`
    ///
    /// The container is invisible until shown, like any element.
    pub fn new<T: ContainerImpl>(imp: T) -> Container {
        Container::from_impl(Rc::new(imp))
    }

    /// Create a new free-standing container from a shared implementation
    pub fn from_impl<T: ContainerImpl>(imp: Rc<T>) -> Container {
        let container_imp: Rc<dyn ContainerImpl> = imp.clone();
        let element = Element::with_parts(imp, Some(ContainerState::new(container_imp)));
        Container { element }
    }

    /// Create a visible root container, owning a scene tree below `parent`
    ///
    /// The container has no parent container. Input for the tree below it is
    /// dispatched through its element.
    pub fn new_attached<T: ContainerImpl>(
        imp: T,
        parent: &SceneNode,
    ) -> Result<Container, SceneError> {
        let tree = SceneNode::new_tree(parent)?;
        let container = Container::new(imp);
        container.state().owns_scene_tree.set(true);
        container.adopt_scene_tree(tree);
        container.element.set_visible(true);
        debug!(parent: container.element.span(), "Created root container");
        Ok(container)
    }

    pub(crate) fn from_element_unchecked(element: Element) -> Container {
        debug_assert!(element.container_state().is_some());
        Container { element }
    }

    /// The container `element` is, if it is one
    pub fn from_element(element: &Element) -> Option<Container> {
        element.as_container()
    }

    /// The container `element` is
    ///
    /// For use in [`ContainerImpl`] methods, which are only ever called for
    /// containers.
    ///
    /// # Panics
    ///
    /// Panics if `element` is not a container.
    pub fn of(element: &Element) -> Container {
        match element.as_container() {
            Some(container) => container,
            None => panic!("{element:?} is not a container"),
        }
    }

    fn state(&self) -> &ContainerState {
        match self.element.container_state() {
            Some(state) => state,
            None => unreachable!("container handle without container state"),
        }
    }

    /// The element of this container
    pub fn element(&self) -> &Element {
        &self.element
    }

    /// Destroy this container, with all children still in it
    ///
    /// Same as calling [`Element::destroy`] on the container's element.
    pub fn destroy(&self) {
        self.element.destroy();
    }

    pub(crate) fn teardown(&self) {
        let children = self.children();
        for child in children {
            self.remove_child(&child);
            child.destroy();
        }
        if self.state().owns_scene_tree.replace(false) {
            let token = self.state().scene_tree_token.borrow_mut().take();
            drop(token);
            let tree = self.state().scene_tree.borrow_mut().take();
            if let Some(tree) = tree {
                tree.destroy();
            }
        }
    }

    /*
     * Membership
     */

    /// The children, topmost first
    pub fn children(&self) -> Vec<Element> {
        self.state().children.borrow().clone()
    }

    /// Whether `element` is a child of this container
    pub fn contains(&self, element: &Element) -> bool {
        self.state().children.borrow().contains(element)
    }

    fn assert_free(&self, element: &Element) {
        assert!(
            element.parent().is_none(),
            "adding {element:?} to {self:?} while it is held by another container"
        );
        assert!(
            element != &self.element,
            "adding a container to itself"
        );
    }

    /// Add `element` on top of all children
    ///
    /// # Panics
    ///
    /// Panics if `element` already has a parent.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn add_child(&self, element: &Element) {
        self.assert_free(element);
        element.pointer_grab_cancel();
        self.state().children.borrow_mut().insert(0, element.clone());
        element.set_parent(Some(self));
        debug!(parent: self.element.span(), child = element.id(), "Added child");
        self.update_layout_and_refocus();
    }

    /// Add `element` directly above `reference`, or below all children if
    /// `reference` is `None`
    ///
    /// # Panics
    ///
    /// Panics if `element` already has a parent, or if `reference` is not a
    /// child of this container.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn add_child_above(&self, reference: Option<&Element>, element: &Element) {
        self.assert_free(element);
        element.pointer_grab_cancel();
        {
            let mut children = self.state().children.borrow_mut();
            match reference {
                Some(reference) => {
                    let index = match children.iter().position(|c| c == reference) {
                        Some(index) => index,
                        None => panic!("reference element {} is not a child", reference.id()),
                    };
                    children.insert(index, element.clone());
                }
                None => children.push(element.clone()),
            }
        }
        element.set_parent(Some(self));

        if let Some(node) = element.visual_node() {
            match reference.and_then(Element::visual_node) {
                Some(reference_node) => node.place_above(&reference_node),
                None => node.lower_to_bottom(),
            }
        }
        debug!(parent: self.element.span(), child = element.id(), "Added child");
        self.update_layout_and_refocus();
    }

    /// Remove `element` from this container
    ///
    /// The element is detached from the scene and loses every role it held
    /// in this container, but is not destroyed.
    ///
    /// # Panics
    ///
    /// Panics if `element` is not a child of this container.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn remove_child(&self, element: &Element) {
        assert!(
            element.parent().as_ref() == Some(self),
            "removing {element:?} from {self:?}, which is not its parent"
        );
        element.set_parent(None);
        self.state().children.borrow_mut().retain(|c| c != element);

        if take_if_held(&mut self.state().roles.borrow_mut().pointer_focus, element) {
            element.pointer_blur();
        }
        if take_if_held(&mut self.state().roles.borrow_mut().pointer_grab, element) {
            element.pointer_grab_cancel();
            match self.element.parent() {
                Some(parent) => parent.pointer_grab_release(&self.element),
                None => self.replay_pointer_motion(),
            }
        }
        take_if_held(&mut self.state().roles.borrow_mut().left_button_down, element);
        self.set_keyboard_focus(element, false);

        debug!(parent: self.element.span(), child = element.id(), "Removed child");
        self.update_layout_and_refocus();
    }

    /// Move `element` on top of all other children
    ///
    /// # Panics
    ///
    /// Panics if `element` is not a child of this container.
    #[instrument(level = "debug", parent = self.element.span(), skip(self))]
    pub fn raise_to_top(&self, element: &Element) {
        {
            let mut children = self.state().children.borrow_mut();
            let index = match children.iter().position(|c| c == element) {
                Some(index) => index,
                None => panic!("raising element {}, which is not a child", element.id()),
            };
            if index == 0 {
                return;
            }
            let element = children.remove(index);
            children.insert(0, element);
        }
        if let Some(node) = element.visual_node() {
            node.raise_to_top();
        }
        debug!(parent: self.element.span(), child = element.id(), "Raised child");
        self.update_layout_and_refocus();
    }

    /*
     * Roles
     */

    /// The child holding the pointer focus
    pub fn pointer_focus(&self) -> Option<Element> {
        upgrade(&self.state().roles.borrow().pointer_focus)
    }

    /// The child holding the pointer grab
    pub fn pointer_grab_holder(&self) -> Option<Element> {
        upgrade(&self.state().roles.borrow().pointer_grab)
    }

    /// The child that accepted the last press of the left button
    pub fn left_button_down(&self) -> Option<Element> {
        upgrade(&self.state().roles.borrow().left_button_down)
    }

    /// The child holding the keyboard focus
    pub fn keyboard_focus(&self) -> Option<Element> {
        upgrade(&self.state().roles.borrow().keyboard_focus)
    }

    fn set_role(slot: &mut Option<WeakElement>, element: Option<&Element>) -> Option<Element> {
        let previous = slot.take().and_then(|weak| weak.upgrade());
        *slot = element.map(Element::downgrade);
        previous
    }

    /*
     * Layout
     */

    /// Update the layout of this container and recompute the pointer focus
    ///
    /// Runs the [`ContainerImpl::update_layout`] hook, then propagates to the
    /// parent. The root replays the last pointer motion. Calls made while the
    /// hook of this container runs return immediately.
    pub fn update_layout_and_refocus(&self) {
        {
            let Some(_guard) = self.state().layout_guard.enter() else {
                trace!(parent: self.element.span(), "Layout update already in progress");
                return;
            };
            let imp = self.state().imp.clone();
            if imp.update_layout(self) {
                trace!(parent: self.element.span(), "Layout changed");
            }
        }
        match self.element.parent() {
            Some(parent) => parent.update_layout_and_refocus(),
            None => self.refocus_root(),
        }
    }

    /// Recompute the pointer focus, after a child moved
    ///
    /// Propagates to the root, which replays the last pointer motion.
    pub fn update_pointer_focus(&self) {
        if self.state().layout_guard.is_active() {
            return;
        }
        match self.element.parent() {
            Some(parent) => parent.update_pointer_focus(),
            None => self.refocus_root(),
        }
    }

    fn refocus_root(&self) {
        if !self.element.pointer_inside() {
            debug_assert!(
                self.pointer_focus().is_none(),
                "pointer focus held by a child while the pointer is outside the root"
            );
            return;
        }
        self.replay_pointer_motion();
    }

    /// Offer the last pointer motion to the tree again, if there was one
    fn replay_pointer_motion(&self) {
        if let Some(motion) = self.element.last_pointer_motion() {
            trace!(parent: self.element.span(), ?motion, "Replaying pointer motion");
            self.element.pointer_motion(&motion);
        }
    }

    /// Bounding box of the visible children, in this container's coordinates
    ///
    /// An empty box at the origin if no child is visible.
    pub fn bounding_box(&self) -> Rectangle<i32> {
        self.union_of_children(Element::dimensions)
    }

    pub(crate) fn children_pointer_area(&self) -> Rectangle<i32> {
        self.union_of_children(Element::pointer_area)
    }

    fn union_of_children(&self, area: impl Fn(&Element) -> Rectangle<i32>) -> Rectangle<i32> {
        self.children()
            .iter()
            .filter(|child| child.is_visible())
            .map(|child| area(child).translate(child.position()))
            .reduce(Rectangle::merge)
            .unwrap_or_else(Rectangle::zero)
    }

    /*
     * Scene graph
     */

    /// The scene tree the children's visual nodes are attached to
    pub fn scene_tree(&self) -> Option<SceneNode> {
        self.state().scene_tree.borrow().clone()
    }

    /// Create the scene tree of this container below `parent`, and attach
    /// the children to it
    ///
    /// Meant to be returned from [`ElementImpl::create_visual_node`].
    ///
    /// # Panics
    ///
    /// Panics if the container already has a scene tree, or the tree cannot
    /// be created below `parent`.
    pub fn create_scene_tree(&self, parent: &SceneNode) -> SceneNode {
        assert!(
            self.scene_tree().is_none(),
            "{self:?} already has a scene tree"
        );
        let tree = SceneNode::new_tree(parent)
            .unwrap_or_else(|err| panic!("failed to create the scene tree of {self:?}: {err}"));
        self.adopt_scene_tree(tree.clone());
        tree
    }

    fn adopt_scene_tree(&self, tree: SceneNode) {
        let weak = self.element.downgrade();
        let token = tree.destroy_signal().register(move |_| {
            if let Some(element) = weak.upgrade() {
                Container::of(&element).on_scene_tree_destroyed();
            }
        });
        *self.state().scene_tree.borrow_mut() = Some(tree);
        *self.state().scene_tree_token.borrow_mut() = Some(token);

        // bottom-most first, each new node lands on top
        for child in self.children().iter().rev() {
            child.attach_to_scene_graph();
        }
    }

    fn on_scene_tree_destroyed(&self) {
        let tree = self.state().scene_tree.borrow_mut().take();
        let token = self.state().scene_tree_token.borrow_mut().take();
        drop(token);
        self.state().owns_scene_tree.set(false);
        debug!(parent: self.element.span(), tree = ?tree.map(|t| t.id()), "Scene tree destroyed");
        for child in self.children() {
            child.attach_to_scene_graph();
        }
    }
}

fn upgrade(slot: &Option<WeakElement>) -> Option<Element> {
    slot.as_ref().and_then(WeakElement::upgrade)
}

fn holds(slot: &Option<WeakElement>, element: &Element) -> bool {
    slot.as_ref().map_or(false, |weak| weak.is(element))
}

/// Clear `slot` if `element` holds it. Returns whether it did.
fn take_if_held(slot: &mut Option<WeakElement>, element: &Element) -> bool {
    if holds(slot, element) {
        *slot = None;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests;
