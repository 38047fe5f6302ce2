//! The retained-mode view tree.
//!
//! Nodes live in an arena and are addressed by generational [`ViewId`]
//! handles. The arena never extends a node's lifetime on behalf of a child
//! list: whoever created a node removes it, and stale handles left behind in
//! a parent's list are pruned lazily the next time the list is walked.
//! Behaviour is attached per node as a boxed [`Widget`]; window and panel
//! capabilities are optional facets rather than base classes.

use std::any::Any;

use slotmap::{SlotMap, new_key_type};

use crate::{
    Result,
    backend::{Backend, SurfaceId},
    cursor::Cursor,
    event::Event,
    geom::{Point, Rect, Size},
    render::Draw,
    style::Color,
    traverse::Ctx,
};

new_key_type! {
    /// A generational handle to a node in the [`Tree`]. Cheap to copy and
    /// safe to hold across removals: a handle whose node is gone simply
    /// resolves to nothing.
    pub struct ViewId;
}

/// The behaviour hooks a node can override. All have no-op defaults, so
/// plain container nodes attach `()`.
///
/// During hook dispatch the widget box is taken out of its arena slot, so
/// hooks are free to mutate the tree through `ctx` — including removing the
/// node they run on.
#[allow(unused_variables)]
pub trait Widget: Any {
    /// Position and size child nodes. Called only when the node's
    /// `layout_needed` flag is set.
    fn layout(&mut self, ctx: &mut Ctx, id: ViewId) -> Result<()> {
        Ok(())
    }

    /// Render the node's own content in node-local coordinates.
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        Ok(())
    }

    /// Handle an event whose mouse coordinates have been rebased to
    /// node-local space. Return `true` to consume it.
    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        Ok(false)
    }

    /// The size this node wants when offered `target`. Used by composite
    /// layout hooks; the default accepts the offer.
    fn size_intrinsic(&mut self, target: Size) -> Size {
        target
    }

    /// A cursor placement request, in node-local coordinates. Polled every
    /// frame for nodes inside the focused window.
    fn cursor(&self) -> Option<Cursor> {
        None
    }
}

impl Widget for () {}

impl dyn Widget {
    /// Borrow the concrete widget type, if it matches.
    pub fn downcast_ref<T: Widget>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    pub fn downcast_mut<T: Widget>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut()
    }
}

/// Geometry, flags and dirty state for one node.
#[derive(Debug)]
pub struct ViewState {
    origin: Point,
    size: Size,
    visible: bool,
    enabled: bool,
    interaction: bool,
    layout_needed: bool,
    erase_needed: bool,
    draw_needed: bool,
    border: Option<Color>,
    hit_expand: Size,
    inhibit_erase: bool,
    children: Vec<ViewId>,
    /// Bumped on every structural mutation of `children`. Layout and draw
    /// walks assert this stays put while they iterate.
    child_gen: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            origin: Point::zero(),
            size: Size::zero(),
            visible: true,
            enabled: true,
            interaction: true,
            layout_needed: true,
            erase_needed: false,
            draw_needed: true,
            border: None,
            hit_expand: Size::zero(),
            inhibit_erase: false,
            children: Vec::new(),
            child_gen: 0,
        }
    }
}

impl ViewState {
    pub fn origin(&self) -> Point {
        self.origin
    }

    /// Move the node. A changed value marks layout and draw; setting the
    /// current value is a no-op. Returns whether anything changed.
    pub fn set_origin(&mut self, p: Point) -> bool {
        if self.origin == p {
            return false;
        }
        self.origin = p;
        self.layout_needed = true;
        self.draw_needed = true;
        true
    }

    /// Like `set_origin` but skips the equality check, always dirtying.
    pub fn set_origin_force(&mut self, p: Point) {
        self.origin = p;
        self.layout_needed = true;
        self.draw_needed = true;
    }

    pub fn size(&self) -> Size {
        self.size
    }

    /// Resize the node. Components are clamped to be non-negative.
    pub fn set_size(&mut self, s: Size) -> bool {
        let s = s.max_zero();
        if self.size == s {
            return false;
        }
        self.size = s;
        self.layout_needed = true;
        self.draw_needed = true;
        true
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, v: bool) -> bool {
        if self.enabled == v {
            return false;
        }
        self.enabled = v;
        self.draw_needed = true;
        true
    }

    /// Does this node participate in event dispatch?
    pub fn interaction(&self) -> bool {
        self.interaction
    }

    pub fn set_interaction(&mut self, v: bool) {
        self.interaction = v;
    }

    pub fn border(&self) -> Option<Color> {
        self.border
    }

    pub fn set_border(&mut self, c: Option<Color>) -> bool {
        if self.border == c {
            return false;
        }
        self.border = c;
        self.draw_needed = true;
        true
    }

    pub fn hit_expand(&self) -> Size {
        self.hit_expand
    }

    pub fn set_hit_expand(&mut self, s: Size) {
        self.hit_expand = s;
    }

    pub fn inhibit_erase(&self) -> bool {
        self.inhibit_erase
    }

    pub fn set_inhibit_erase(&mut self, v: bool) {
        self.inhibit_erase = v;
    }

    pub fn layout_needed(&self) -> bool {
        self.layout_needed
    }

    /// Request a fresh layout pass over this node.
    pub fn taint_layout(&mut self) {
        self.layout_needed = true;
        self.draw_needed = true;
    }

    pub fn draw_needed(&self) -> bool {
        self.draw_needed
    }

    /// Request a redraw without relayout.
    pub fn taint(&mut self) {
        self.draw_needed = true;
    }

    pub fn erase_needed(&self) -> bool {
        self.erase_needed
    }

    /// Request that the node's cell region be cleared before the next draw.
    pub fn taint_erase(&mut self) {
        self.erase_needed = true;
        self.draw_needed = true;
    }

    pub(crate) fn clear_layout_needed(&mut self) {
        self.layout_needed = false;
    }

    pub(crate) fn clear_draw_flags(&mut self) {
        self.draw_needed = false;
        self.erase_needed = false;
    }

    /// The node's rect in its own coordinate space.
    pub fn local_rect(&self) -> Rect {
        Rect {
            origin: Point::zero(),
            size: self.size,
        }
    }

    /// Hit test a node-local point against the node's bounds grown by its
    /// hit margin.
    pub fn hit(&self, p: Point) -> bool {
        self.local_rect().hit_test(p, self.hit_expand)
    }

    pub fn children(&self) -> &[ViewId] {
        &self.children
    }

    pub fn child_gen(&self) -> u64 {
        self.child_gen
    }
}

/// The window capability: ownership of one backend surface.
#[derive(Debug)]
pub struct WindowFacet {
    pub surface: SurfaceId,
    /// The size the backend last granted. A mismatch against the live
    /// surface means the backend changed it behind our back (terminal
    /// resize, clipping) and an erase is forced.
    pub size_prev: Size,
    pub focusable: bool,
    /// Shadow of the backend's compositing visibility for this surface,
    /// synced by the screen once per frame.
    pub(crate) shown: bool,
}

/// The panel capability: participation in the screen-global z-order,
/// independent of sibling traversal order.
#[derive(Debug)]
pub struct PanelFacet {
    pub token: u64,
}

pub struct Node {
    pub state: ViewState,
    widget: Option<Box<dyn Widget>>,
    pub window: Option<WindowFacet>,
    pub panel: Option<PanelFacet>,
}

/// The node arena.
pub struct Tree {
    nodes: SlotMap<ViewId, Node>,
    /// Panel occlusion order, bottom to top.
    panel_stack: Vec<ViewId>,
    panels_dirty: bool,
    next_token: u64,
}

impl Tree {
    pub fn new() -> Tree {
        Tree {
            nodes: SlotMap::with_key(),
            panel_stack: Vec::new(),
            panels_dirty: false,
            next_token: 0,
        }
    }

    /// Create a plain node.
    pub fn new_view(&mut self, widget: Box<dyn Widget>) -> ViewId {
        self.nodes.insert(Node {
            state: ViewState::default(),
            widget: Some(widget),
            window: None,
            panel: None,
        })
    }

    /// Create a node owning a backend surface. The surface starts as a 1x1
    /// placeholder; the first layout pass moves it to its real frame.
    pub fn new_window(
        &mut self,
        backend: &mut dyn Backend,
        widget: Box<dyn Widget>,
        focusable: bool,
    ) -> Result<ViewId> {
        let surface = backend.alloc_surface(Rect::new(0, 0, 1, 1))?;
        Ok(self.nodes.insert(Node {
            state: ViewState::default(),
            widget: Some(widget),
            window: Some(WindowFacet {
                surface,
                size_prev: Size::zero(),
                focusable,
                shown: true,
            }),
            panel: None,
        }))
    }

    /// Create a window that additionally takes part in the z-order. New
    /// panels stack above existing ones.
    pub fn new_panel(
        &mut self,
        backend: &mut dyn Backend,
        widget: Box<dyn Widget>,
        focusable: bool,
    ) -> Result<ViewId> {
        let id = self.new_window(backend, widget, focusable)?;
        let token = self.next_token;
        self.next_token += 1;
        self.node_mut(id).panel = Some(PanelFacet { token });
        self.panel_stack.push(id);
        self.panels_dirty = true;
        Ok(id)
    }

    /// Resolve a handle. `None` for anything removed.
    pub fn get(&self, id: ViewId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// Resolve a handle that is known to be live. Panics otherwise: holding
    /// a dead handle here is a programming error.
    pub(crate) fn node(&self, id: ViewId) -> &Node {
        self.get(id).expect("dereferenced a dead view handle")
    }

    pub(crate) fn node_mut(&mut self, id: ViewId) -> &mut Node {
        self.get_mut(id).expect("dereferenced a dead view handle")
    }

    pub fn state(&self, id: ViewId) -> &ViewState {
        &self.node(id).state
    }

    pub fn state_mut(&mut self, id: ViewId) -> &mut ViewState {
        &mut self.node_mut(id).state
    }

    /// Append a child to a parent's traversal list. Children are visited in
    /// insertion order for layout/draw and reverse order for events. A newly
    /// attached panel is also brought to the front of the z-order.
    pub fn add_child(&mut self, parent: ViewId, child: ViewId) {
        let p = self.node_mut(parent);
        p.state.children.push(child);
        p.state.child_gen += 1;
        p.state.layout_needed = true;
        p.state.draw_needed = true;
        if self.get(child).is_some_and(|n| n.panel.is_some()) {
            self.raise_panel(child);
        }
    }

    /// Change a node's visibility. Showing a panel brings it to the front
    /// and schedules a z-order pass before the next draw.
    pub fn set_visible(&mut self, id: ViewId, v: bool) {
        let n = self.node_mut(id);
        if n.state.visible == v {
            return;
        }
        n.state.visible = v;
        n.state.draw_needed = true;
        if v && n.panel.is_some() {
            self.raise_panel(id);
        }
    }

    /// Move a panel to the top of the z-order.
    pub fn raise_panel(&mut self, id: ViewId) {
        self.panel_stack.retain(|p| *p != id);
        self.panel_stack.push(id);
        self.panels_dirty = true;
    }

    /// Move a panel to the bottom of the z-order.
    pub fn lower_panel(&mut self, id: ViewId) {
        self.panel_stack.retain(|p| *p != id);
        self.panel_stack.insert(0, id);
        self.panels_dirty = true;
    }

    /// Remove a node and its whole subtree, releasing any owned surfaces.
    /// Handles to the removed nodes left in other child lists go stale and
    /// are pruned on the next walk; nothing is touched eagerly.
    pub fn remove(&mut self, backend: &mut dyn Backend, id: ViewId) {
        let Some(node) = self.nodes.get_mut(id) else {
            return;
        };
        let children = std::mem::take(&mut node.state.children);
        for c in children {
            self.remove(backend, c);
        }
        if let Some(n) = self.nodes.remove(id) {
            if let Some(w) = n.window {
                backend.free_surface(w.surface);
            }
            if n.panel.is_some() {
                self.panel_stack.retain(|p| *p != id);
                self.panels_dirty = true;
            }
        }
    }

    /// Drop stale handles from a node's child list. Does not count as a
    /// structural mutation: pruning is how removal is observed.
    pub(crate) fn prune_children(&mut self, id: ViewId) {
        let live: Vec<bool> = self
            .node(id)
            .state
            .children
            .iter()
            .map(|c| self.get(*c).is_some())
            .collect();
        let n = self.node_mut(id);
        let mut it = live.iter();
        n.state.children.retain(|_| *it.next().unwrap());
    }

    /// A copy of the child list for mutation-safe event dispatch.
    pub(crate) fn children_snapshot(&self, id: ViewId) -> Vec<ViewId> {
        self.node(id).state.children.clone()
    }

    pub(crate) fn take_widget(&mut self, id: ViewId) -> Option<Box<dyn Widget>> {
        self.get_mut(id).and_then(|n| n.widget.take())
    }

    pub(crate) fn put_widget(&mut self, id: ViewId, w: Box<dyn Widget>) {
        // The hook may have removed its own node; the widget just drops.
        if let Some(n) = self.get_mut(id) {
            n.widget = Some(w);
        }
    }

    /// Borrow a node's widget for inspection outside a traversal.
    pub fn widget(&self, id: ViewId) -> Option<&dyn Widget> {
        self.get(id).and_then(|n| n.widget.as_deref())
    }

    pub fn widget_mut(&mut self, id: ViewId) -> Option<&mut Box<dyn Widget>> {
        self.get_mut(id).and_then(|n| n.widget.as_mut())
    }

    /// Handles of every live node holding a window facet.
    pub(crate) fn window_ids(&self) -> Vec<ViewId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.window.is_some())
            .map(|(id, _)| id)
            .collect()
    }

    pub fn panel_stack(&self) -> &[ViewId] {
        &self.panel_stack
    }

    pub(crate) fn take_panels_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.panels_dirty, false)
    }

    pub(crate) fn panels_dirty(&self) -> bool {
        self.panels_dirty
    }
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}
