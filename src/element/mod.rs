//! The abstract unit of the toolkit's UI tree
//!
//! An [`Element`] is a reference-counted handle to a node of the UI tree. Its
//! behavior is provided by an [`ElementImpl`], a capability set with default
//! methods: implementations override what they need and call the matching
//! `Element::default_*` method to defer to the base behavior.
//!
//! Elements are created free-standing. They join the tree through
//! [`Container::add_child`](crate::container::Container::add_child), which
//! also attaches them to the scene graph if the container is part of a live
//! scene.

use std::{
    cell::{Ref, RefCell, RefMut},
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicUsize, Ordering},
};

use downcast_rs::{impl_downcast, Downcast};
use tracing::{debug, error, instrument, trace, trace_span};

use crate::{
    container::{Container, ContainerState},
    input::{AxisEvent, ButtonEvent, KeyState, KeyboardEvent, Keysym, Modifiers, PointerMotionEvent},
    scene::SceneNode,
    utils::{
        signaling::{SignalToken, Signaler},
        Point, Rectangle,
    },
};

static NEXT_ELEMENT_ID: AtomicUsize = AtomicUsize::new(1);

bitflags::bitflags! {
    /// Optional capabilities an [`ElementImpl`] declares to support
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Capabilities: u32 {
        /// The element implements [`ElementImpl::pointer_grab_cancel`] and
        /// may therefore request a pointer grab.
        const POINTER_GRAB = 1 << 0;
    }
}

/// Behavior of an [`Element`]
///
/// `create_visual_node` and `dimensions` are required. Every other method has
/// a default implementation deferring to the base behavior through the
/// corresponding `Element::default_*` method, which is also what an override
/// calls to chain up.
///
/// All methods receive the element they are invoked for. Implementations may
/// freely call back into the element tree from them: no borrow is held while
/// an implementation method runs.
pub trait ElementImpl: Downcast {
    /// Create the scene node representing this element, as a child of `parent`
    ///
    /// The element sets the node's position and enabled state afterwards.
    fn create_visual_node(&self, element: &Element, parent: &SceneNode) -> SceneNode;

    /// The element's bounding box, relative to its position
    fn dimensions(&self, element: &Element) -> Rectangle<i32>;

    /// The element is being destroyed
    fn destroy(&self, element: &Element) {
        let _ = element;
    }

    /// The area accepting pointer input, relative to the element's position
    ///
    /// Defaults to the [dimensions](ElementImpl::dimensions).
    fn pointer_area(&self, element: &Element) -> Rectangle<i32> {
        element.default_pointer_area()
    }

    /// The pointer moved. Returns whether the pointer is within the element.
    ///
    /// Overrides must treat an event outside of any tracked area
    /// ([`PointerMotionEvent::is_outside`]) as not within the element.
    fn pointer_motion(&self, element: &Element, event: &PointerMotionEvent) -> bool {
        element.default_pointer_motion(event)
    }

    /// The element lost pointer focus
    fn pointer_blur(&self, element: &Element) {
        element.default_pointer_blur()
    }

    /// A button event. Returns whether the event was accepted.
    fn pointer_button(&self, element: &Element, event: &ButtonEvent) -> bool {
        element.default_pointer_button(event)
    }

    /// An axis event. Returns whether the event was accepted.
    fn pointer_axis(&self, element: &Element, event: &AxisEvent) -> bool {
        element.default_pointer_axis(event)
    }

    /// A pointer grab held by this element is cancelled
    fn pointer_grab_cancel(&self, element: &Element) {
        element.default_pointer_grab_cancel()
    }

    /// The element lost keyboard focus
    fn keyboard_blur(&self, element: &Element) {
        element.default_keyboard_blur()
    }

    /// A raw key event. Returns whether the event was consumed.
    fn keyboard_event(&self, element: &Element, event: &KeyboardEvent) -> bool {
        element.default_keyboard_event(event)
    }

    /// A translated key event. Returns whether the event was consumed.
    fn keyboard_sym(&self, element: &Element, keysym: Keysym, state: KeyState, modifiers: Modifiers) -> bool {
        element.default_keyboard_sym(keysym, state, modifiers)
    }

    /// The optional capabilities this implementation provides
    fn capabilities(&self) -> Capabilities {
        Capabilities::empty()
    }
}
impl_downcast!(ElementImpl);

#[derive(Debug)]
struct ElementState {
    position: Point<i32>,
    visible: bool,
    parent: Option<Weak<ElementInner>>,
    visual_node: Option<SceneNode>,
    visual_node_token: Option<SignalToken>,
    last_pointer_motion: Option<PointerMotionEvent>,
    pointer_inside: bool,
}

pub(crate) struct ElementInner {
    id: usize,
    imp: Rc<dyn ElementImpl>,
    state: RefCell<ElementState>,
    container: Option<ContainerState>,
    pointer_enter: Signaler<PointerMotionEvent>,
    pointer_leave: Signaler<PointerMotionEvent>,
    span: tracing::Span,
}

/// Handle to an element of the UI tree
///
/// Cloning the handle does not clone the element.
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

/// Non-owning handle to an [`Element`]
#[derive(Clone)]
pub struct WeakElement {
    inner: Weak<ElementInner>,
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("Element")
            .field("id", &self.inner.id)
            .field("container", &self.inner.container.is_some())
            .field("position", &state.position)
            .field("visible", &state.visible)
            .finish_non_exhaustive()
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(element) => f.debug_tuple("WeakElement").field(&element.id()).finish(),
            None => f.write_str("WeakElement(<dead>)"),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl WeakElement {
    /// Get a strong handle, if the element is still alive
    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(|inner| Element { inner })
    }

    /// Whether this handle refers to `element`
    pub fn is(&self, element: &Element) -> bool {
        Weak::ptr_eq(&self.inner, &Rc::downgrade(&element.inner))
    }
}

impl Element {
    /// Create a new free-standing element behaving as `imp`
    pub fn new<T: ElementImpl>(imp: T) -> Element {
        Element::with_parts(Rc::new(imp), None)
    }

    /// Create a new free-standing element from a shared implementation
    ///
    /// Lets the caller keep its own handle to the implementation.
    pub fn from_impl<T: ElementImpl>(imp: Rc<T>) -> Element {
        Element::with_parts(imp, None)
    }

    pub(crate) fn with_parts(imp: Rc<dyn ElementImpl>, container: Option<ContainerState>) -> Element {
        let id = NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed);
        let span = if container.is_some() {
            trace_span!("wlmtk_container", id)
        } else {
            trace_span!("wlmtk_element", id)
        };
        Element {
            inner: Rc::new(ElementInner {
                id,
                imp,
                state: RefCell::new(ElementState {
                    position: Point::default(),
                    visible: false,
                    parent: None,
                    visual_node: None,
                    visual_node_token: None,
                    last_pointer_motion: None,
                    pointer_inside: false,
                }),
                container,
                pointer_enter: Signaler::new(),
                pointer_leave: Signaler::new(),
                span,
            }),
        }
    }

    fn state(&self) -> Ref<'_, ElementState> {
        self.inner.state.borrow()
    }

    fn state_mut(&self) -> RefMut<'_, ElementState> {
        self.inner.state.borrow_mut()
    }

    fn imp(&self) -> Rc<dyn ElementImpl> {
        self.inner.imp.clone()
    }

    pub(crate) fn container_state(&self) -> Option<&ContainerState> {
        self.inner.container.as_ref()
    }

    pub(crate) fn span(&self) -> &tracing::Span {
        &self.inner.span
    }

    /// A process-unique identifier of this element
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// Get a non-owning handle to this element
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Access the implementation of this element as its concrete type
    pub fn downcast_impl<T: ElementImpl>(&self) -> Option<Rc<T>> {
        self.imp().downcast_rc::<T>().ok()
    }

    /// This element as a [`Container`], if it is one
    pub fn as_container(&self) -> Option<Container> {
        self.inner
            .container
            .as_ref()
            .map(|_| Container::from_element_unchecked(self.clone()))
    }

    /// Capabilities of this element
    ///
    /// Containers always support pointer grabs, on behalf of their children.
    pub fn capabilities(&self) -> Capabilities {
        let caps = self.inner.imp.capabilities();
        if self.inner.container.is_some() {
            caps | Capabilities::POINTER_GRAB
        } else {
            caps
        }
    }

    /// Position of this element, relative to its parent container
    pub fn position(&self) -> Point<i32> {
        self.state().position
    }

    /// Set the position of this element, relative to its parent container
    ///
    /// Moves the visual node, if any, and has the parent container recompute
    /// the pointer focus. Setting an unchanged position is a no-op.
    #[instrument(level = "trace", parent = &self.inner.span, skip(self))]
    pub fn set_position(&self, position: Point<i32>) {
        {
            let mut state = self.state_mut();
            if state.position == position {
                return;
            }
            state.position = position;
        }
        if let Some(node) = self.visual_node() {
            node.set_position(position);
        }
        if let Some(parent) = self.parent() {
            parent.update_pointer_focus();
        }
    }

    /// Whether this element is visible
    pub fn is_visible(&self) -> bool {
        self.state().visible
    }

    /// Show or hide this element
    ///
    /// Invisible elements do not receive pointer focus and do not count
    /// towards their container's dimensions. Setting an unchanged visibility
    /// is a no-op.
    #[instrument(level = "trace", parent = &self.inner.span, skip(self))]
    pub fn set_visible(&self, visible: bool) {
        {
            let mut state = self.state_mut();
            if state.visible == visible {
                return;
            }
            state.visible = visible;
        }
        if let Some(node) = self.visual_node() {
            node.set_enabled(visible);
        }
        if let Some(parent) = self.parent() {
            parent.update_layout_and_refocus();
        }
    }

    /// The container holding this element
    pub fn parent(&self) -> Option<Container> {
        self.state()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| Container::from_element_unchecked(Element { inner }))
    }

    /// Set or clear the parent container, and re-attach to the scene graph
    pub(crate) fn set_parent(&self, parent: Option<&Container>) {
        self.state_mut().parent = parent.map(|p| Rc::downgrade(&p.element().inner));
        self.attach_to_scene_graph();
    }

    /// The scene node representing this element, if attached to a live scene
    pub fn visual_node(&self) -> Option<SceneNode> {
        self.state().visual_node.clone()
    }

    /// Whether the pointer is within this element, as of the last motion
    pub fn pointer_inside(&self) -> bool {
        self.state().pointer_inside
    }

    /// The last motion event this element recorded, unless it was outside
    pub fn last_pointer_motion(&self) -> Option<PointerMotionEvent> {
        self.state().last_pointer_motion
    }

    /// Signal sent when the pointer enters this element
    pub fn pointer_enter_signal(&self) -> &Signaler<PointerMotionEvent> {
        &self.inner.pointer_enter
    }

    /// Signal sent when the pointer leaves this element
    pub fn pointer_leave_signal(&self) -> &Signaler<PointerMotionEvent> {
        &self.inner.pointer_leave
    }

    /// Attach the visual node to the scene tree of the parent container
    ///
    /// Creates the visual node if needed, re-parents it if the parent's tree
    /// changed, and destroys it if there is no parent or the parent is not
    /// attached to a live scene. Calling this repeatedly without a change in
    /// between has no effect.
    pub(crate) fn attach_to_scene_graph(&self) {
        let target = match self.parent().and_then(|parent| parent.scene_tree()) {
            Some(tree) => tree,
            None => {
                self.destroy_visual_node();
                return;
            }
        };

        match self.visual_node() {
            None => {
                let node = self.imp().create_visual_node(self, &target);
                let (visible, position) = {
                    let state = self.state();
                    (state.visible, state.position)
                };
                node.set_enabled(visible);
                node.set_position(position);

                let weak = self.downgrade();
                let token = node.destroy_signal().register(move |node: &SceneNode| {
                    error!(
                        node = node.id(),
                        element = ?weak,
                        "Visual node destroyed while still owned by its element."
                    );
                    panic!("visual node of an element destroyed out-of-band");
                });
                debug!(parent: &self.inner.span, node = node.id(), "Created visual node");
                let mut state = self.state_mut();
                state.visual_node = Some(node);
                state.visual_node_token = Some(token);
            }
            Some(node) if node.parent().as_ref() == Some(&target) => {}
            Some(node) => {
                trace!(parent: &self.inner.span, node = node.id(), "Re-parenting visual node");
                node.reparent(&target);
            }
        }
    }

    fn destroy_visual_node(&self) {
        let (node, token) = {
            let mut state = self.state_mut();
            (state.visual_node.take(), state.visual_node_token.take())
        };
        drop(token);
        if let Some(node) = node {
            debug!(parent: &self.inner.span, node = node.id(), "Destroying visual node");
            node.destroy();
        }
    }

    /// Destroy this element
    ///
    /// The element must have been removed from its container. Containers
    /// destroy all of their remaining children first.
    #[instrument(level = "debug", parent = &self.inner.span, skip(self))]
    pub fn destroy(&self) {
        assert!(
            self.state().parent.is_none(),
            "destroying an element that is still held by a container"
        );
        if let Some(container) = self.as_container() {
            container.teardown();
        }
        self.imp().destroy(self);
        self.destroy_visual_node();
    }

    /*
     * Dispatch through the implementation
     */

    /// The bounding box of this element, relative to its position
    pub fn dimensions(&self) -> Rectangle<i32> {
        self.imp().dimensions(self)
    }

    /// The area accepting pointer input, relative to the element's position
    pub fn pointer_area(&self) -> Rectangle<i32> {
        self.imp().pointer_area(self)
    }

    /// Pass a pointer motion event to this element
    ///
    /// Returns whether the pointer is within the element. Sends
    /// [`pointer_enter`](Element::pointer_enter_signal) when the pointer
    /// enters the element and blurs the element when it leaves.
    pub fn pointer_motion(&self, event: &PointerMotionEvent) -> bool {
        let inside = self.imp().pointer_motion(self, event);
        if inside {
            let entered = !std::mem::replace(&mut self.state_mut().pointer_inside, true);
            if entered {
                trace!(parent: &self.inner.span, ?event, "Pointer entered");
                self.inner.pointer_enter.signal(event);
            }
        } else {
            self.blur(event);
        }
        inside
    }

    /// Remove pointer focus from this element
    ///
    /// Sends [`pointer_leave`](Element::pointer_leave_signal) if the pointer
    /// was within the element.
    pub fn pointer_blur(&self) {
        let time_msec = self.state().last_pointer_motion.map(|m| m.time_msec).unwrap_or(0);
        self.blur(&PointerMotionEvent::outside(time_msec));
    }

    fn blur(&self, event: &PointerMotionEvent) {
        self.imp().pointer_blur(self);
        let left = std::mem::replace(&mut self.state_mut().pointer_inside, false);
        if left {
            trace!(parent: &self.inner.span, ?event, "Pointer left");
            self.inner.pointer_leave.signal(event);
        }
    }

    /// Pass a button event to this element. Returns whether it was accepted.
    pub fn pointer_button(&self, event: &ButtonEvent) -> bool {
        self.imp().pointer_button(self, event)
    }

    /// Pass an axis event to this element. Returns whether it was accepted.
    pub fn pointer_axis(&self, event: &AxisEvent) -> bool {
        self.imp().pointer_axis(self, event)
    }

    /// Cancel any pointer grab held by this element
    pub fn pointer_grab_cancel(&self) {
        self.imp().pointer_grab_cancel(self)
    }

    /// Remove keyboard focus from this element
    pub fn keyboard_blur(&self) {
        self.imp().keyboard_blur(self)
    }

    /// Pass a raw key event to this element. Returns whether it was consumed.
    pub fn keyboard_event(&self, event: &KeyboardEvent) -> bool {
        self.imp().keyboard_event(self, event)
    }

    /// Pass a translated key event to this element. Returns whether it was consumed.
    pub fn keyboard_sym(&self, keysym: Keysym, state: KeyState, modifiers: Modifiers) -> bool {
        self.imp().keyboard_sym(self, keysym, state, modifiers)
    }

    /*
     * Base behavior
     */

    /// Store `event` as the last motion, or forget the last motion if the
    /// event is outside of any tracked area.
    pub(crate) fn record_pointer_motion(&self, event: &PointerMotionEvent) {
        self.state_mut().last_pointer_motion = if event.is_outside() { None } else { Some(*event) };
    }

    /// Base behavior of [`ElementImpl::pointer_area`]
    ///
    /// The dimensions for plain elements, the union of the visible children's
    /// pointer areas for containers.
    pub fn default_pointer_area(&self) -> Rectangle<i32> {
        match self.as_container() {
            Some(container) => container.children_pointer_area(),
            None => self.dimensions(),
        }
    }

    /// Base behavior of [`ElementImpl::pointer_motion`]
    ///
    /// Plain elements record the event and report whether it lies within
    /// their pointer area. Containers route the event to their children.
    pub fn default_pointer_motion(&self, event: &PointerMotionEvent) -> bool {
        if let Some(container) = self.as_container() {
            return container.handle_pointer_motion(event);
        }
        self.record_pointer_motion(event);
        !event.is_outside() && self.pointer_area().to_f64().contains(event.location)
    }

    /// Base behavior of [`ElementImpl::pointer_blur`]
    ///
    /// Containers blur the child holding pointer focus.
    pub fn default_pointer_blur(&self) {
        if let Some(container) = self.as_container() {
            container.handle_pointer_blur();
        }
    }

    /// Base behavior of [`ElementImpl::pointer_button`]
    ///
    /// Plain elements ignore the event. Containers route it to their children.
    pub fn default_pointer_button(&self, event: &ButtonEvent) -> bool {
        match self.as_container() {
            Some(container) => container.handle_pointer_button(event),
            None => false,
        }
    }

    /// Base behavior of [`ElementImpl::pointer_axis`]
    ///
    /// Plain elements ignore the event. Containers route it to their children.
    pub fn default_pointer_axis(&self, event: &AxisEvent) -> bool {
        match self.as_container() {
            Some(container) => container.handle_pointer_axis(event),
            None => false,
        }
    }

    /// Base behavior of [`ElementImpl::pointer_grab_cancel`]
    ///
    /// Containers forward the cancellation to the child holding their grab.
    pub fn default_pointer_grab_cancel(&self) {
        if let Some(container) = self.as_container() {
            container.handle_pointer_grab_cancel();
        }
    }

    /// Base behavior of [`ElementImpl::keyboard_blur`]
    ///
    /// Containers blur the child holding keyboard focus.
    pub fn default_keyboard_blur(&self) {
        if let Some(container) = self.as_container() {
            container.handle_keyboard_blur();
        }
    }

    /// Base behavior of [`ElementImpl::keyboard_event`]
    ///
    /// Containers forward the event to the child holding keyboard focus.
    pub fn default_keyboard_event(&self, event: &KeyboardEvent) -> bool {
        match self.as_container() {
            Some(container) => container.handle_keyboard_event(event),
            None => false,
        }
    }

    /// Base behavior of [`ElementImpl::keyboard_sym`]
    ///
    /// Containers forward the event to the child holding keyboard focus.
    pub fn default_keyboard_sym(&self, keysym: Keysym, state: KeyState, modifiers: Modifiers) -> bool {
        match self.as_container() {
            Some(container) => container.handle_keyboard_sym(keysym, state, modifiers),
            None => false,
        }
    }
}
