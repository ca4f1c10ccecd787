//! Retained scene graph the toolkit's elements render into
//!
//! A scene is a tree of [`SceneNode`]s. Only [`NodeKind::Tree`] nodes can have
//! children; [`NodeKind::Rect`] and [`NodeKind::Buffer`] nodes are the leaves
//! that would be drawn. Siblings are kept in z-order, bottom-most first, and a
//! newly created or re-parented node is placed on top of its new siblings.
//!
//! Nodes are reference-counted handles: cloning a [`SceneNode`] does not
//! create a new node. A node's lifetime in the graph ends with an explicit
//! [`SceneNode::destroy`], which destroys the whole subtree below it and
//! notifies the listeners registered through [`SceneNode::destroy_signal`]
//! *before* any of its children are reaped.

use std::{
    cell::RefCell,
    fmt,
    rc::{Rc, Weak},
    sync::atomic::{AtomicUsize, Ordering},
};

use thiserror::Error;
use tracing::{debug, trace};

use crate::utils::{signaling::Signaler, Point, Size};

static NEXT_NODE_ID: AtomicUsize = AtomicUsize::new(1);

/// Errors when creating a [`SceneNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    /// The requested parent node has already been destroyed
    #[error("the parent scene node has been destroyed")]
    Destroyed,
    /// The requested parent node cannot hold children
    #[error("the parent scene node is not a tree node")]
    NotATree,
}

/// A color, as `0xAARRGGBB`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Color(pub u32);

impl Color {
    /// Fully opaque black
    pub const BLACK: Color = Color(0xff00_0000);
    /// Fully opaque white
    pub const WHITE: Color = Color(0xffff_ffff);
}

/// The kind of a [`SceneNode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Groups child nodes. Only trees may have children.
    Tree,
    /// A rectangle filled with a solid color
    Rect,
    /// Displays a client or toolkit buffer
    Buffer,
}

#[derive(Debug)]
struct NodeState {
    parent: Option<Weak<NodeInner>>,
    // bottom-most first
    children: Vec<SceneNode>,
    position: Point<i32>,
    enabled: bool,
    size: Size<i32>,
    color: Color,
    alive: bool,
}

struct NodeInner {
    id: usize,
    kind: NodeKind,
    state: RefCell<NodeState>,
    destroy: Signaler<SceneNode>,
}

/// Handle to a node of the scene graph
#[derive(Clone)]
pub struct SceneNode {
    inner: Rc<NodeInner>,
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("SceneNode")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("position", &state.position)
            .field("enabled", &state.enabled)
            .field("alive", &state.alive)
            .finish_non_exhaustive()
    }
}

impl PartialEq for SceneNode {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for SceneNode {}

impl SceneNode {
    fn new_detached(kind: NodeKind, size: Size<i32>, color: Color) -> SceneNode {
        SceneNode {
            inner: Rc::new(NodeInner {
                id: NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed),
                kind,
                state: RefCell::new(NodeState {
                    parent: None,
                    children: Vec::new(),
                    position: Point::default(),
                    enabled: true,
                    size,
                    color,
                    alive: true,
                }),
                destroy: Signaler::new(),
            }),
        }
    }

    fn new_child(
        parent: &SceneNode,
        kind: NodeKind,
        size: Size<i32>,
        color: Color,
    ) -> Result<SceneNode, SceneError> {
        if !parent.is_alive() {
            return Err(SceneError::Destroyed);
        }
        if parent.kind() != NodeKind::Tree {
            return Err(SceneError::NotATree);
        }
        let node = SceneNode::new_detached(kind, size, color);
        node.inner.state.borrow_mut().parent = Some(Rc::downgrade(&parent.inner));
        parent.inner.state.borrow_mut().children.push(node.clone());
        debug!(id = node.inner.id, parent = parent.inner.id, ?kind, "Created scene node");
        Ok(node)
    }

    /// Create a tree node on top of the children of `parent`
    pub fn new_tree(parent: &SceneNode) -> Result<SceneNode, SceneError> {
        SceneNode::new_child(parent, NodeKind::Tree, Size::default(), Color::default())
    }

    /// Create a solid rectangle node on top of the children of `parent`
    pub fn new_rect(parent: &SceneNode, size: Size<i32>, color: Color) -> Result<SceneNode, SceneError> {
        SceneNode::new_child(parent, NodeKind::Rect, size, color)
    }

    /// Create a buffer node on top of the children of `parent`
    pub fn new_buffer(parent: &SceneNode, size: Size<i32>) -> Result<SceneNode, SceneError> {
        SceneNode::new_child(parent, NodeKind::Buffer, size, Color::default())
    }

    /// A process-unique identifier of this node
    pub fn id(&self) -> usize {
        self.inner.id
    }

    /// The kind of this node
    pub fn kind(&self) -> NodeKind {
        self.inner.kind
    }

    /// Whether this node has not been destroyed yet
    pub fn is_alive(&self) -> bool {
        self.inner.state.borrow().alive
    }

    /// Signal sent when this node gets destroyed
    ///
    /// The signal is sent before the node's children are destroyed, so
    /// listeners may still detach them.
    pub fn destroy_signal(&self) -> &Signaler<SceneNode> {
        &self.inner.destroy
    }

    /// Destroy this node and all nodes below it
    ///
    /// Destroying a node that is already destroyed is a no-op.
    pub fn destroy(&self) {
        if !self.is_alive() {
            return;
        }
        self.inner.destroy.signal(self);

        let children = std::mem::take(&mut self.inner.state.borrow_mut().children);
        for child in children.iter().rev() {
            child.destroy();
        }

        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
        let mut state = self.inner.state.borrow_mut();
        state.parent = None;
        state.alive = false;
        debug!(id = self.inner.id, "Destroyed scene node");
    }

    fn remove_child(&self, child: &SceneNode) {
        self.inner.state.borrow_mut().children.retain(|c| c != child);
    }

    /// The tree node this node is a child of
    pub fn parent(&self) -> Option<SceneNode> {
        self.inner
            .state
            .borrow()
            .parent
            .as_ref()
            .and_then(Weak::upgrade)
            .map(|inner| SceneNode { inner })
    }

    /// Children of this node in z-order, bottom-most first
    pub fn children(&self) -> Vec<SceneNode> {
        self.inner.state.borrow().children.clone()
    }

    /// Whether `self` is `other` or one of its descendants
    pub fn is_descendant_of(&self, other: &SceneNode) -> bool {
        let mut node = Some(self.clone());
        while let Some(current) = node {
            if &current == other {
                return true;
            }
            node = current.parent();
        }
        false
    }

    /// Move this node, with its subtree, on top of the children of `new_parent`
    pub fn reparent(&self, new_parent: &SceneNode) {
        assert!(self.is_alive(), "re-parenting a destroyed scene node");
        assert!(new_parent.is_alive(), "re-parenting to a destroyed scene node");
        assert_eq!(new_parent.kind(), NodeKind::Tree, "re-parenting to a non-tree node");
        assert!(
            !new_parent.is_descendant_of(self),
            "re-parenting a scene node below itself"
        );
        if let Some(old) = self.parent() {
            old.remove_child(self);
        }
        self.inner.state.borrow_mut().parent = Some(Rc::downgrade(&new_parent.inner));
        new_parent.inner.state.borrow_mut().children.push(self.clone());
        trace!(id = self.inner.id, parent = new_parent.inner.id, "Re-parented scene node");
    }

    /// Position of this node relative to its parent
    pub fn position(&self) -> Point<i32> {
        self.inner.state.borrow().position
    }

    /// Set the position of this node relative to its parent
    pub fn set_position(&self, position: Point<i32>) {
        self.inner.state.borrow_mut().position = position;
    }

    /// Whether this node is enabled. Disabled nodes are not drawn.
    pub fn enabled(&self) -> bool {
        self.inner.state.borrow().enabled
    }

    /// Enable or disable this node
    pub fn set_enabled(&self, enabled: bool) {
        self.inner.state.borrow_mut().enabled = enabled;
    }

    /// Size of a rect or buffer node. Trees report an empty size.
    pub fn size(&self) -> Size<i32> {
        self.inner.state.borrow().size
    }

    /// Set the size of a rect or buffer node
    pub fn set_size(&self, size: Size<i32>) {
        debug_assert_ne!(self.kind(), NodeKind::Tree, "trees have no size of their own");
        self.inner.state.borrow_mut().size = size;
    }

    /// Fill color of a rect node
    pub fn color(&self) -> Color {
        self.inner.state.borrow().color
    }

    /// Set the fill color of a rect node
    pub fn set_color(&self, color: Color) {
        self.inner.state.borrow_mut().color = color;
    }

    fn sibling_index(&self) -> Option<(SceneNode, usize)> {
        let parent = self.parent()?;
        let index = parent
            .inner
            .state
            .borrow()
            .children
            .iter()
            .position(|c| c == self)?;
        Some((parent, index))
    }

    /// Move this node above all of its siblings
    pub fn raise_to_top(&self) {
        if let Some((parent, index)) = self.sibling_index() {
            let mut state = parent.inner.state.borrow_mut();
            let node = state.children.remove(index);
            state.children.push(node);
        }
    }

    /// Move this node below all of its siblings
    pub fn lower_to_bottom(&self) {
        if let Some((parent, index)) = self.sibling_index() {
            let mut state = parent.inner.state.borrow_mut();
            let node = state.children.remove(index);
            state.children.insert(0, node);
        }
    }

    /// Move this node directly above `sibling`
    pub fn place_above(&self, sibling: &SceneNode) {
        self.place_relative(sibling, 1);
    }

    /// Move this node directly below `sibling`
    pub fn place_below(&self, sibling: &SceneNode) {
        self.place_relative(sibling, 0);
    }

    fn place_relative(&self, sibling: &SceneNode, offset: usize) {
        assert_ne!(self, sibling, "placing a scene node relative to itself");
        let parent = match self.parent() {
            Some(parent) if Some(&parent) == sibling.parent().as_ref() => parent,
            _ => panic!("placing a scene node relative to a non-sibling"),
        };
        let mut state = parent.inner.state.borrow_mut();
        state.children.retain(|c| c != self);
        let index = state
            .children
            .iter()
            .position(|c| c == sibling)
            .expect("sibling vanished from its parent");
        state.children.insert(index + offset, self.clone());
    }

    /// Whether this node is the top-most among its siblings
    pub fn is_topmost(&self) -> bool {
        self.parent()
            .map(|p| p.inner.state.borrow().children.last() == Some(self))
            .unwrap_or(false)
    }

    /// Whether this node is the bottom-most among its siblings
    pub fn is_bottommost(&self) -> bool {
        self.parent()
            .map(|p| p.inner.state.borrow().children.first() == Some(self))
            .unwrap_or(false)
    }
}

/// A scene graph, owning its root tree node
#[derive(Debug)]
pub struct Scene {
    root: SceneNode,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    /// Create an empty scene
    pub fn new() -> Scene {
        Scene {
            root: SceneNode::new_detached(NodeKind::Tree, Size::default(), Color::default()),
        }
    }

    /// The root tree of this scene
    pub fn root(&self) -> &SceneNode {
        &self.root
    }
}

impl Drop for Scene {
    fn drop(&mut self) {
        self.root.destroy();
    }
}
