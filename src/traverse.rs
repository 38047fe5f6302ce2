//! The three tree passes: layout, draw and event dispatch.
//!
//! The graphics state is an explicit parameter threaded through every call
//! rather than an ambient global; it is only constructible by the screen, so
//! coordinate context cannot leak outside a traversal. Layout and draw visit
//! parents before children in insertion order. Event dispatch visits
//! children before their parent, last-added first, so hit priority matches
//! visual stacking.

use tracing::trace;

use crate::{
    Result,
    backend::{Backend, SurfaceId},
    cursor::Cursor,
    event::Event,
    geom::{Point, Rect},
    render::Draw,
    style::Palette,
    tree::{Node, Tree, ViewId},
};

/// Coordinate and erase context for one traversal step. Copied and adjusted
/// on the way down; the call stack is the undo.
#[derive(Debug, Clone, Copy)]
pub struct GraphicsState {
    /// The surface draws land on.
    pub surface: SurfaceId,
    /// Accumulated origin within the current window's surface. Reset to
    /// zero at every window boundary.
    pub origin_window: Point,
    /// Accumulated origin in screen space. Accumulates across window
    /// boundaries.
    pub origin_screen: Point,
    /// Whether an ancestor already cleared its pixels this frame.
    pub erased: bool,
}

impl GraphicsState {
    pub(crate) fn root(surface: SurfaceId) -> GraphicsState {
        GraphicsState {
            surface,
            origin_window: Point::zero(),
            origin_screen: Point::zero(),
            erased: false,
        }
    }
}

/// Services available to widget hooks: the tree, the backend, the palette,
/// the frame's cursor accumulator and the tracking-loop stop flag.
pub struct Ctx<'a> {
    pub tree: &'a mut Tree,
    pub backend: &'a mut dyn Backend,
    pub palette: &'a Palette,
    pub cursor: &'a mut Option<Cursor>,
    pub stop: &'a mut bool,
}

impl Ctx<'_> {
    /// Ask the current tracking loop to wind down after this event.
    pub fn stop_tracking(&mut self) {
        *self.stop = true;
    }
}

/// Advance the graphics state into a node's coordinate space. A window
/// starts a fresh window-relative space on its own surface with its own
/// erase status; a plain node just offsets both origins.
pub(crate) fn convert(node: &Node, g: GraphicsState) -> GraphicsState {
    let origin = node.state.origin();
    match &node.window {
        Some(w) => GraphicsState {
            surface: w.surface,
            origin_window: Point::zero(),
            origin_screen: g.origin_screen + origin,
            erased: false,
        },
        None => GraphicsState {
            surface: g.surface,
            origin_window: g.origin_window + origin,
            origin_screen: g.origin_screen + origin,
            erased: g.erased,
        },
    }
}

/// Walk a node's children in insertion order, recursing with `f`. The list
/// is pruned of stale handles first; structural mutation while the walk is
/// in progress is a programming error caught by the generation counter.
fn walk_children(
    ctx: &mut Ctx,
    id: ViewId,
    g: GraphicsState,
    f: fn(&mut Ctx, ViewId, GraphicsState) -> Result<()>,
) -> Result<()> {
    ctx.tree.prune_children(id);
    let gen0 = ctx.tree.state(id).child_gen();
    let mut i = 0;
    loop {
        let children = ctx.tree.state(id).children();
        if i >= children.len() {
            return Ok(());
        }
        let child = children[i];
        f(ctx, child, g)?;
        debug_assert_eq!(
            ctx.tree.state(id).child_gen(),
            gen0,
            "child list mutated during an in-progress traversal"
        );
        i += 1;
    }
}

/// The layout pass. Reconciles window surfaces, runs `layout` hooks where
/// `layout_needed` is set, then recurses.
pub fn layout(ctx: &mut Ctx, id: ViewId, g: GraphicsState) -> Result<()> {
    let Some(node) = ctx.tree.get(id) else {
        return Ok(());
    };
    if !node.state.visible() {
        return Ok(());
    }
    let g = if node.window.is_some() {
        window_layout(ctx, id, g)?
    } else {
        convert(node, g)
    };
    if ctx.tree.state(id).layout_needed() {
        trace!(?id, "layout hook");
        if let Some(mut w) = ctx.tree.take_widget(id) {
            let r = w.layout(ctx, id);
            ctx.tree.put_widget(id, w);
            r?;
        }
        if let Some(n) = ctx.tree.get_mut(id) {
            n.state.clear_layout_needed();
        }
    }
    walk_children(ctx, id, g, layout)
}

/// Window-facet reconciliation: detect backend-initiated surface changes,
/// request the desired absolute frame, and fold the granted frame back into
/// the view model.
fn window_layout(ctx: &mut Ctx, id: ViewId, g: GraphicsState) -> Result<GraphicsState> {
    let facet = ctx.tree.node(id).window.as_ref().expect("window facet");
    let surface = facet.surface;
    let size_prev = facet.size_prev;

    let live = ctx.backend.surface_frame(surface)?;
    if live.size != size_prev {
        // The backend changed the surface behind our back; stale pixels.
        ctx.tree.state_mut(id).taint_erase();
    }

    let state = ctx.tree.state(id);
    let desired = Rect {
        origin: g.origin_screen + state.origin(),
        size: state.size(),
    };
    let granted = ctx.backend.move_surface(surface, desired)?;
    let delta = granted.origin - desired.origin;
    if !delta.is_zero() {
        let shifted = ctx.tree.state(id).origin() + delta;
        ctx.tree.state_mut(id).set_origin_force(shifted);
    }
    let node = ctx.tree.node_mut(id);
    node.window.as_mut().expect("window facet").size_prev = granted.size;

    Ok(GraphicsState {
        surface,
        origin_window: Point::zero(),
        origin_screen: granted.origin,
        erased: false,
    })
}

/// The draw pass. Applies the erase policy, runs `draw` hooks where needed,
/// polls cursor requests, then recurses.
pub fn draw(ctx: &mut Ctx, id: ViewId, g: GraphicsState) -> Result<()> {
    let Some(node) = ctx.tree.get(id) else {
        return Ok(());
    };
    if !node.state.visible() {
        return Ok(());
    }
    let focus_window = node.window.as_ref().is_some_and(|w| w.focusable);
    let mut g = convert(node, g);
    if focus_window {
        // The last focusable window drawn wins the cursor.
        *ctx.cursor = None;
    }

    let state = &ctx.tree.node(id).state;
    let needs_erase = state.erase_needed() || g.erased;
    if needs_erase && !g.erased {
        if !state.inhibit_erase() {
            trace!(?id, "erase");
            let mut d = Draw {
                backend: &mut *ctx.backend,
                surface: g.surface,
                origin: g.origin_window,
                size: state.size(),
                palette: ctx.palette,
            };
            d.erase()?;
        }
        g.erased = true;
    }

    // Erasure destroyed the pixels, so it forces a repaint regardless of
    // the dirty flag.
    let state = &ctx.tree.node(id).state;
    if state.draw_needed() || g.erased {
        trace!(?id, "draw hook");
        if let Some(border) = state.border() {
            let rect = state.local_rect();
            let mut d = Draw {
                backend: &mut *ctx.backend,
                surface: g.surface,
                origin: g.origin_window,
                size: state.size(),
                palette: ctx.palette,
            };
            d.box_(border, rect)?;
        }
        if let Some(mut w) = ctx.tree.take_widget(id) {
            let state = &ctx.tree.node(id).state;
            let mut d = Draw {
                backend: &mut *ctx.backend,
                surface: g.surface,
                origin: g.origin_window,
                size: state.size(),
                palette: ctx.palette,
            };
            let r = w.draw(state, &mut d);
            ctx.tree.put_widget(id, w);
            r?;
        }
    }
    if let Some(n) = ctx.tree.get_mut(id) {
        n.state.clear_draw_flags();
    }

    if let Some(req) = ctx.tree.widget(id).and_then(|w| w.cursor()) {
        let abs = g.origin_screen + req.location;
        let frame = ctx.backend.surface_frame(g.surface)?;
        // A request outside the live window hides the cursor.
        *ctx.cursor = if frame.contains(abs) {
            Some(Cursor {
                location: abs,
                ..req
            })
        } else {
            None
        };
    }

    walk_children(ctx, id, g, draw)
}

/// Event dispatch. Children get first refusal in reverse insertion order
/// (topmost drawn first); the event bubbles to the node's own hook only if
/// no child consumes it. The child list is snapshotted because handlers may
/// mutate the tree mid-dispatch.
pub fn dispatch(ctx: &mut Ctx, id: ViewId, g: GraphicsState, ev: &Event) -> Result<bool> {
    let Some(node) = ctx.tree.get(id) else {
        return Ok(false);
    };
    if !node.state.visible() || !node.state.interaction() {
        return Ok(false);
    }
    let g = convert(node, g);
    let snapshot = ctx.tree.children_snapshot(id);
    for child in snapshot.iter().rev() {
        if dispatch(ctx, *child, g, ev)? {
            return Ok(true);
        }
    }
    let local = ev.rebase(g.origin_screen);
    let Some(mut w) = ctx.tree.take_widget(id) else {
        return Ok(false);
    };
    let r = w.handle_event(ctx, id, &local);
    ctx.tree.put_widget(id, w);
    r
}
