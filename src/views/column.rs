//! Vertical columns of commit cards, and the branch list.
//!
//! Columns are plain nodes inside the root window. They position their
//! children themselves: each card is offered the column width, asked how
//! tall it wants to be, and stacked with a one-row gap. Cards scrolled out
//! of the column are hidden rather than clipped, since only window edges
//! clip.

use pad::PadStr;

use crate::{
    Error, Result,
    event::{ButtonSet, Event, Key},
    geom::{Point, Rect, Size},
    git::{Branch, Commit, Oid, Repo},
    render::Draw,
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
    views::commit::{CommitPanel, Selection},
};

pub struct CommitColumn {
    title: String,
    selected: Option<usize>,
    /// Content row offset; 0 shows the first card under the title.
    scroll: i32,
}

/// The column behaviour behind a node, whether the widget is a bare
/// [`CommitColumn`] or a [`RevColumn`] wrapping one.
fn column_of(w: &mut dyn Widget) -> Option<&mut CommitColumn> {
    if w.downcast_ref::<CommitColumn>().is_some() {
        return w.downcast_mut::<CommitColumn>();
    }
    w.downcast_mut::<RevColumn>().map(|r| &mut r.column)
}

impl CommitColumn {
    pub fn new(title: impl Into<String>) -> CommitColumn {
        CommitColumn {
            title: title.into(),
            selected: None,
            scroll: 0,
        }
    }

    /// Create a column node under `parent`. Populate it with
    /// [`CommitColumn::set_commits`].
    pub fn open(ctx: &mut Ctx, parent: ViewId, title: &str) -> Result<ViewId> {
        let id = ctx.tree.new_view(Box::new(CommitColumn::new(title)));
        ctx.tree.add_child(parent, id);
        Ok(id)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Replace the column's cards. Existing children are removed; the
    /// selection resets.
    pub fn set_commits(ctx: &mut Ctx, id: ViewId, commits: &[Commit]) -> Result<()> {
        for child in ctx.tree.children_snapshot(id) {
            ctx.tree.remove(ctx.backend, child);
        }
        ctx.tree.prune_children(id);
        for c in commits {
            let card = ctx.tree.new_view(Box::new(CommitPanel::new(c.clone())));
            ctx.tree.add_child(id, card);
        }
        if let Some(w) = ctx.tree.widget_mut(id) {
            if let Some(col) = column_of(&mut **w) {
                col.selected = None;
                col.scroll = 0;
            }
        }
        ctx.tree.state_mut(id).taint_layout();
        Ok(())
    }

    /// The selected card's commit, if any.
    pub fn selected_commit(ctx: &Ctx, id: ViewId) -> Option<Commit> {
        let col = ctx.tree.widget(id)?;
        let sel = col
            .downcast_ref::<CommitColumn>()
            .map(|c| c.selected)
            .or_else(|| col.downcast_ref::<RevColumn>().map(|r| r.column.selected))??;
        let child = *ctx.tree.state(id).children().get(sel)?;
        ctx.tree
            .widget(child)
            .and_then(|w| w.downcast_ref::<CommitPanel>())
            .map(|p| p.commit().clone())
    }

    /// Change the selection from outside an event handler.
    pub fn select(ctx: &mut Ctx, id: ViewId, sel: Option<usize>) {
        let Some(w) = ctx.tree.take_widget(id) else {
            return;
        };
        let mut w = w;
        if let Some(col) = column_of(&mut *w) {
            col.set_selected(ctx, id, sel);
        }
        ctx.tree.put_widget(id, w);
    }

    /// Mark cards showing `target` as similar to the selection elsewhere.
    /// The primary selection and pending copies keep their own state.
    pub fn mark_similar(ctx: &mut Ctx, id: ViewId, target: Option<&Oid>) {
        for child in ctx.tree.children_snapshot(id) {
            let Some(w) = ctx.tree.widget_mut(child) else {
                continue;
            };
            let Some(p) = w.downcast_mut::<CommitPanel>() else {
                continue;
            };
            match p.selection() {
                Selection::Selected | Selection::Copy => continue,
                _ => {}
            }
            let want = if target.is_some_and(|t| p.commit().id == *t) {
                Selection::Similar
            } else {
                Selection::None
            };
            if p.selection() != want {
                p.set_selection(want);
                ctx.tree.state_mut(child).taint();
            }
        }
    }

    fn set_selected(&mut self, ctx: &mut Ctx, id: ViewId, sel: Option<usize>) {
        self.selected = sel;
        for (i, child) in ctx.tree.children_snapshot(id).iter().enumerate() {
            let want = if Some(i) == self.selected {
                Selection::Selected
            } else {
                Selection::None
            };
            if let Some(w) = ctx.tree.widget_mut(*child) {
                if let Some(p) = w.downcast_mut::<CommitPanel>() {
                    if p.selection() != want {
                        p.set_selection(want);
                        ctx.tree.state_mut(*child).taint();
                    }
                }
            }
        }
        self.scroll_to_selected(ctx, id);
    }

    fn scroll_to_selected(&mut self, ctx: &mut Ctx, id: ViewId) {
        let Some(sel) = self.selected else {
            return;
        };
        let size = ctx.tree.state(id).size();
        let mut y = 1;
        for (i, child) in ctx.tree.children_snapshot(id).iter().enumerate() {
            let h = ctx
                .tree
                .widget_mut(*child)
                .map(|w| w.size_intrinsic(Size::new(size.x, 0)).y.max(1))
                .unwrap_or(1);
            if i == sel {
                if y - self.scroll < 1 {
                    self.scroll = y - 1;
                } else if y + h - self.scroll > size.y {
                    self.scroll = y + h - size.y;
                }
                break;
            }
            y += h + 1;
        }
        ctx.tree.state_mut(id).taint_layout();
    }

    fn card_count(&self, ctx: &Ctx, id: ViewId) -> usize {
        ctx.tree.state(id).children().len()
    }

    fn layout_cards(&mut self, ctx: &mut Ctx, id: ViewId) -> Result<()> {
        let size = ctx.tree.state(id).size();
        let mut y = 1;
        for child in ctx.tree.children_snapshot(id) {
            let h = ctx
                .tree
                .widget_mut(child)
                .map(|w| w.size_intrinsic(Size::new(size.x, 0)).y.max(1))
                .unwrap_or(1);
            let top = y - self.scroll;
            if let Some(n) = ctx.tree.get_mut(child) {
                n.state.set_origin(Point::new(0, top));
                n.state.set_size(Size::new(size.x, h));
            }
            // Row 0 is the title; anything above it or past the bottom edge
            // is hidden rather than clipped.
            ctx.tree
                .set_visible(child, top + h > 1 && top < size.y);
            y += h + 1;
        }
        Ok(())
    }

    fn draw_title(&self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let w = view.size().x.max(0) as usize;
        d.text(d.palette.dimmed, Point::zero(), &self.title.pad_to_width(w))
    }

    fn handle(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        if let Some(key) = ev.key() {
            let Some(sel) = self.selected else {
                return Ok(false);
            };
            let count = self.card_count(ctx, id);
            let next = match key {
                Key::Up => sel.checked_sub(1),
                Key::Down => {
                    if sel + 1 < count {
                        Some(sel + 1)
                    } else {
                        None
                    }
                }
                _ => return Ok(false),
            };
            if let Some(next) = next {
                self.set_selected(ctx, id, Some(next));
            }
            // A selection pinned at either end still owns the key.
            return Ok(true);
        }
        if ev.mouse_down(ButtonSet::LEFT) {
            let (p, _) = ev.mouse().expect("mouse event");
            if !ctx.tree.state(id).hit(p) {
                return Ok(false);
            }
            for (i, child) in ctx.tree.children_snapshot(id).iter().enumerate() {
                let Some(n) = ctx.tree.get(*child) else {
                    continue;
                };
                if !n.state.visible() {
                    continue;
                }
                let rect = Rect {
                    origin: n.state.origin(),
                    size: n.state.size(),
                };
                if rect.contains(p) {
                    self.set_selected(ctx, id, Some(i));
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

impl Widget for CommitColumn {
    fn layout(&mut self, ctx: &mut Ctx, id: ViewId) -> Result<()> {
        self.layout_cards(ctx, id)
    }

    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        self.draw_title(view, d)
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        self.handle(ctx, id, ev)
    }
}

/// A column showing the first-parent log of one revision expression.
pub struct RevColumn {
    rev: String,
    limit: usize,
    column: CommitColumn,
}

impl RevColumn {
    /// Resolve `rev`, walk its first-parent chain and open a populated
    /// column under `parent`.
    pub fn open(
        ctx: &mut Ctx,
        parent: ViewId,
        repo: &dyn Repo,
        rev: &str,
        limit: usize,
    ) -> Result<ViewId> {
        let commits = repo.walk(&repo.resolve(rev)?, limit)?;
        let id = ctx.tree.new_view(Box::new(RevColumn {
            rev: rev.to_string(),
            limit,
            column: CommitColumn::new(rev),
        }));
        ctx.tree.add_child(parent, id);
        CommitColumn::set_commits(ctx, id, &commits)?;
        Ok(id)
    }

    pub fn rev(&self) -> &str {
        &self.rev
    }

    /// Re-resolve the revision and repopulate. Used after history surgery
    /// moves the ref the column is watching.
    pub fn reload(ctx: &mut Ctx, id: ViewId, repo: &dyn Repo) -> Result<()> {
        let (rev, limit) = ctx
            .tree
            .widget(id)
            .and_then(|w| w.downcast_ref::<RevColumn>())
            .map(|r| (r.rev.clone(), r.limit))
            .ok_or_else(|| Error::Invalid("not a rev column".into()))?;
        let commits = repo.walk(&repo.resolve(&rev)?, limit)?;
        CommitColumn::set_commits(ctx, id, &commits)
    }
}

impl Widget for RevColumn {
    fn layout(&mut self, ctx: &mut Ctx, id: ViewId) -> Result<()> {
        self.column.layout_cards(ctx, id)
    }

    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        self.column.draw_title(view, d)
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        self.column.handle(ctx, id, ev)
    }
}

/// The local branch list. Rows are drawn directly; branches are few enough
/// that the column never scrolls.
pub struct BranchColumn {
    branches: Vec<Branch>,
    selected: Option<usize>,
}

impl BranchColumn {
    pub fn open(ctx: &mut Ctx, parent: ViewId, repo: &dyn Repo) -> Result<ViewId> {
        let id = ctx.tree.new_view(Box::new(BranchColumn {
            branches: repo.branches()?,
            selected: None,
        }));
        ctx.tree.add_child(parent, id);
        Ok(id)
    }

    pub fn reload(ctx: &mut Ctx, id: ViewId, repo: &dyn Repo) -> Result<()> {
        let branches = repo.branches()?;
        let w = ctx
            .tree
            .widget_mut(id)
            .and_then(|w| w.downcast_mut::<BranchColumn>())
            .ok_or_else(|| Error::Invalid("not a branch column".into()))?;
        if w.selected.is_some_and(|s| s >= branches.len()) {
            w.selected = None;
        }
        w.branches = branches;
        ctx.tree.state_mut(id).taint();
        Ok(())
    }

    pub fn selected_branch(&self) -> Option<&Branch> {
        self.branches.get(self.selected?)
    }

    fn row_of(&self, p: Point) -> Option<usize> {
        let row = p.y - 1;
        if row < 0 || row as usize >= self.branches.len() {
            return None;
        }
        Some(row as usize)
    }
}

impl Widget for BranchColumn {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let w = view.size().x.max(0) as usize;
        d.text(d.palette.dimmed, Point::zero(), &"branches".pad_to_width(w))?;
        for (i, b) in self.branches.iter().enumerate() {
            let color = if Some(i) == self.selected {
                d.palette.selection
            } else {
                d.palette.normal
            };
            let line = match &b.upstream {
                Some(u) => format!("{} {} [{}]", b.name, b.target.short(), u),
                None => format!("{} {}", b.name, b.target.short()),
            };
            d.text(color, Point::new(0, 1 + i as i32), &line.pad_to_width(w))?;
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        if let Some(key) = ev.key() {
            let Some(sel) = self.selected else {
                return Ok(false);
            };
            match key {
                Key::Up => {
                    if let Some(n) = sel.checked_sub(1) {
                        self.selected = Some(n);
                        ctx.tree.state_mut(id).taint();
                    }
                }
                Key::Down => {
                    if sel + 1 < self.branches.len() {
                        self.selected = Some(sel + 1);
                        ctx.tree.state_mut(id).taint();
                    }
                }
                _ => return Ok(false),
            }
            return Ok(true);
        }
        if ev.mouse_down(ButtonSet::LEFT) {
            let (p, _) = ev.mouse().expect("mouse event");
            if !ctx.tree.state(id).hit(p) {
                return Ok(false);
            }
            if let Some(row) = self.row_of(p) {
                self.selected = Some(row);
                ctx.tree.state_mut(id).taint();
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn size_intrinsic(&mut self, target: Size) -> Size {
        Size::new(target.x, 1 + self.branches.len() as i32)
    }
}
