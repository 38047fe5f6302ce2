//! The root of the tree: frame loop, palette ownership, cursor placement
//! and event sourcing.

use std::time::Duration;

use tracing::{debug, trace};

use crate::{
    Error, Result,
    backend::{Backend, RawInput, SurfaceId},
    cursor::Cursor,
    event::{Event, EventKind, Key},
    geom::Size,
    style::{Palette, Theme},
    traverse::{self, Ctx, GraphicsState},
    tree::{Tree, ViewId},
};

/// How long event sourcing may block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    /// Block until input arrives.
    Forever,
    /// A single immediate poll; a tracking loop runs exactly one iteration.
    Once,
    /// Return immediately if nothing is pending.
    Poll,
    Timeout(Duration),
}

impl Deadline {
    fn timeout(&self) -> Option<Duration> {
        match self {
            Deadline::Forever => None,
            Deadline::Once | Deadline::Poll => Some(Duration::ZERO),
            Deadline::Timeout(d) => Some(*d),
        }
    }
}

/// Owns the view tree, the backend, the palette and the frame loop. One per
/// process; constructed at startup and alive until exit.
pub struct Screen {
    tree: Tree,
    backend: Box<dyn Backend>,
    palette: Palette,
    root: ViewId,
    next_event_id: u64,
    last_event_id: u64,
    track_stop: bool,
}

impl Screen {
    /// Construct the screen and its root window. Fails loudly if the
    /// backend cannot allocate surfaces or register the palette; the UI
    /// cannot function without either.
    pub fn new(mut backend: Box<dyn Backend>, theme: Theme) -> Result<Screen> {
        let palette = Palette::new(&mut *backend, theme)?;
        let mut tree = Tree::new();
        let root = tree.new_window(&mut *backend, Box::new(()), false)?;
        tree.state_mut(root).set_size(backend.screen_size());
        Ok(Screen {
            tree,
            backend,
            palette,
            root,
            next_event_id: 1,
            last_event_id: 0,
            track_stop: false,
        })
    }

    pub fn root(&self) -> ViewId {
        self.root
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn backend_mut(&mut self) -> &mut dyn Backend {
        &mut *self.backend
    }

    /// Split borrows for a traversal. The cursor accumulator is threaded in
    /// by the caller.
    fn ctx<'a>(&'a mut self, cursor: &'a mut Option<Cursor>) -> Ctx<'a> {
        Ctx {
            tree: &mut self.tree,
            backend: &mut *self.backend,
            palette: &self.palette,
            cursor,
            stop: &mut self.track_stop,
        }
    }

    /// Run a closure with a full traversal context, the way a hook sees one.
    /// This is how application code outside the tree opens menus, builds
    /// columns and otherwise mutates the tree between frames.
    pub fn with_ctx<R>(&mut self, f: impl FnOnce(&mut Ctx, ViewId) -> Result<R>) -> Result<R> {
        let root = self.root;
        let mut cursor = None;
        let mut ctx = self.ctx(&mut cursor);
        f(&mut ctx, root)
    }

    fn root_gstate(&self) -> GraphicsState {
        let surface = self
            .tree
            .node(self.root)
            .window
            .as_ref()
            .expect("root is a window")
            .surface;
        GraphicsState::root(surface)
    }

    /// Run one frame: layout, then draw, then commit, then cursor. If the
    /// layout pass discovered that the z-order is stale, the panel stack is
    /// applied and layout runs a second time so panels never draw one frame
    /// in the wrong order.
    pub fn refresh(&mut self) -> Result<()> {
        trace!("refresh");
        let root = self.root;
        let g = self.root_gstate();
        let mut cursor = None;
        {
            let mut ctx = self.ctx(&mut cursor);
            traverse::layout(&mut ctx, root, g)?;
        }
        if self.tree.take_panels_dirty() {
            debug!("applying panel z-order");
            let order: Vec<SurfaceId> = self
                .tree
                .panel_stack()
                .iter()
                .filter_map(|p| self.tree.get(*p))
                .filter_map(|n| n.window.as_ref().map(|w| w.surface))
                .collect();
            self.backend.restack(&order)?;
            let mut ctx = self.ctx(&mut cursor);
            traverse::layout(&mut ctx, root, g)?;
        }
        self.sync_surface_visibility()?;
        {
            let mut ctx = self.ctx(&mut cursor);
            traverse::draw(&mut ctx, root, g)?;
        }
        self.backend.cursor(cursor)?;
        self.backend.commit()?;
        Ok(())
    }

    /// Hide surfaces whose window nodes are not on a visible path, so a
    /// hidden panel's stale pixels stop occluding whatever is underneath.
    fn sync_surface_visibility(&mut self) -> Result<()> {
        let mut on_path = Vec::new();
        collect_visible_surfaces(&self.tree, self.root, &mut on_path);
        for id in self.tree.window_ids() {
            let facet = self.tree.node(id).window.as_ref().expect("window facet");
            let surface = facet.surface;
            let want = on_path.contains(&surface);
            if want != facet.shown {
                self.backend.set_surface_visible(surface, want)?;
                let facet = self.tree.node_mut(id).window.as_mut().expect("window facet");
                facet.shown = want;
            }
        }
        Ok(())
    }

    /// Render, then block for the next input. There is no separate render
    /// thread; this one call is the whole cadence of the UI.
    ///
    /// Timeouts return the none event. Terminal resize and hard interrupts
    /// surface as [`Error::Resized`] and [`Error::Interrupted`]: they are
    /// process-level signals, not tree events. A garbled read is retried.
    pub fn event_next(&mut self, deadline: Deadline) -> Result<Event> {
        self.refresh()?;
        loop {
            match self.backend.read_input(deadline.timeout())? {
                RawInput::Timeout => return Ok(Event::none()),
                RawInput::Skip => continue,
                RawInput::Event(kind) => match kind {
                    EventKind::Resize(sz) => return Err(Error::Resized(sz)),
                    EventKind::Key(Key::CtrlC) | EventKind::Key(Key::CtrlD) => {
                        return Err(Error::Interrupted);
                    }
                    kind => {
                        let id = self.next_event_id;
                        self.next_event_id += 1;
                        self.last_event_id = id;
                        trace!(id, ?kind, "sourced event");
                        return Ok(Event { id, kind });
                    }
                },
            }
        }
    }

    /// Has any event newer than `ev` been sourced? Used to avoid starting a
    /// drag or track operation on stale input.
    pub fn event_since(&self, ev: &Event) -> bool {
        self.last_event_id > ev.id
    }

    /// Dispatch an event through the whole tree.
    pub fn dispatch(&mut self, ev: &Event) -> Result<bool> {
        let root = self.root;
        self.dispatch_to(root, ev)
    }

    /// Dispatch an event into one subtree, with coordinates converted as if
    /// the full tree had been walked down to it.
    pub fn dispatch_to(&mut self, target: ViewId, ev: &Event) -> Result<bool> {
        let Some(g) = find_gstate(&self.tree, self.root, self.root_gstate(), target) else {
            return Ok(false);
        };
        let mut cursor = None;
        let mut ctx = self.ctx(&mut cursor);
        traverse::dispatch(&mut ctx, target, g, ev)
    }

    /// A nested blocking sub-loop: source events and feed them to one
    /// subtree until [`Ctx::stop_tracking`] is observed, the target is
    /// removed, or the deadline passes. `Once` performs exactly one
    /// iteration regardless of the stop flag.
    pub fn track(&mut self, target: ViewId, deadline: Deadline) -> Result<()> {
        self.track_stop = false;
        loop {
            let ev = self.event_next(deadline)?;
            if !ev.is_none() {
                self.dispatch_to(target, &ev)?;
            }
            if deadline == Deadline::Once {
                return Ok(());
            }
            if self.track_stop || self.tree.get(target).is_none() {
                return Ok(());
            }
            if ev.is_none() {
                // The deadline passed with nothing further to do.
                return Ok(());
            }
        }
    }

    /// Was the current tracking loop asked to stop?
    pub fn track_stop(&self) -> bool {
        self.track_stop
    }

    /// React to a terminal resize: adopt the new size and force a full
    /// relayout and repaint. Window nodes notice their clamped surfaces via
    /// `size_prev` and erase themselves.
    pub fn resize(&mut self, sz: Size) -> Result<()> {
        debug!(?sz, "resize");
        self.backend.resize(sz)?;
        self.tree.state_mut(self.root).set_size(sz);
        taint_tree(&mut self.tree, self.root);
        Ok(())
    }
}

fn collect_visible_surfaces(tree: &Tree, id: ViewId, out: &mut Vec<SurfaceId>) {
    let Some(node) = tree.get(id) else {
        return;
    };
    if !node.state.visible() {
        return;
    }
    if let Some(w) = &node.window {
        out.push(w.surface);
    }
    for c in node.state.children() {
        collect_visible_surfaces(tree, *c, out);
    }
}

fn taint_tree(tree: &mut Tree, id: ViewId) {
    let Some(node) = tree.get_mut(id) else {
        return;
    };
    node.state.taint_layout();
    node.state.taint_erase();
    let children: Vec<ViewId> = node.state.children().to_vec();
    for c in children {
        taint_tree(tree, c);
    }
}

/// Locate the graphics state a full traversal would carry into `target`'s
/// parent frame of reference.
fn find_gstate(
    tree: &Tree,
    id: ViewId,
    g: GraphicsState,
    target: ViewId,
) -> Option<GraphicsState> {
    let node = tree.get(id)?;
    if id == target {
        return Some(g);
    }
    let g = traverse::convert(node, g);
    for c in node.state.children() {
        if let Some(found) = find_gstate(tree, *c, g, target) {
            return Some(found);
        }
    }
    None
}
