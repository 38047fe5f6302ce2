//! A modal popup menu.
//!
//! The menu is a panel stacked above everything else; the caller opens it
//! and then runs a tracking loop against it. It swallows every event it
//! receives, so nothing leaks to the UI underneath while it is up: that is
//! the whole of its modality.

use pad::PadStr;

use crate::{
    Result,
    event::{ButtonSet, Event, Key},
    geom::{Point, Size},
    render::Draw,
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
};

pub type ItemAction = Box<dyn FnMut(&mut Ctx) -> Result<()>>;

pub struct MenuItem {
    pub title: String,
    pub action: ItemAction,
}

impl MenuItem {
    pub fn new(title: impl Into<String>, action: ItemAction) -> MenuItem {
        MenuItem {
            title: title.into(),
            action,
        }
    }
}

pub struct Menu {
    items: Vec<MenuItem>,
    selected: usize,
}

impl Menu {
    /// Open a menu panel at a screen origin and attach it under `parent`.
    /// The caller should follow up with a tracking loop on the returned
    /// node; the menu stops the loop when it dismisses itself.
    pub fn open(
        ctx: &mut Ctx,
        parent: ViewId,
        origin: Point,
        items: Vec<MenuItem>,
    ) -> Result<ViewId> {
        let w = items
            .iter()
            .map(|i| i.title.chars().count())
            .max()
            .unwrap_or(0) as i32
            + 2;
        let h = items.len() as i32 + 2;
        let menu = Menu { items, selected: 0 };
        let id = ctx.tree.new_panel(ctx.backend, Box::new(menu), false)?;
        let menu_color = ctx.palette.menu;
        let st = ctx.tree.state_mut(id);
        st.set_origin(origin);
        st.set_size(Size::new(w, h));
        st.set_border(Some(menu_color));
        ctx.tree.add_child(parent, id);
        Ok(id)
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    fn dismiss(&mut self, ctx: &mut Ctx, id: ViewId) {
        ctx.tree.remove(ctx.backend, id);
        ctx.stop_tracking();
    }

    /// The item row under a node-local point, accounting for the border.
    fn row_at(&self, p: Point) -> Option<usize> {
        let row = p.y - 1;
        if p.x < 1 || row < 0 || row as usize >= self.items.len() {
            return None;
        }
        Some(row as usize)
    }
}

impl Widget for Menu {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let w = (view.size().x - 2).max(0) as usize;
        for (i, item) in self.items.iter().enumerate() {
            let color = if i == self.selected {
                d.palette.selection
            } else {
                d.palette.menu
            };
            d.text(
                color,
                Point::new(1, 1 + i as i32),
                &item.title.pad_to_width(w),
            )?;
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        if let Some(key) = ev.key() {
            match key {
                Key::Up => {
                    self.selected = self.selected.saturating_sub(1);
                    ctx.tree.state_mut(id).taint();
                }
                Key::Down => {
                    if self.selected + 1 < self.items.len() {
                        self.selected += 1;
                        ctx.tree.state_mut(id).taint();
                    }
                }
                Key::Return => {
                    let sel = self.selected;
                    (self.items[sel].action)(ctx)?;
                    self.dismiss(ctx, id);
                }
                Key::Escape => self.dismiss(ctx, id),
                // Swallowed: the menu is modal.
                _ => {}
            }
            return Ok(true);
        }
        if let Some((p, _)) = ev.mouse() {
            let row = self.row_at(p);
            if ev.mouse_down(ButtonSet::LEFT) {
                match row {
                    Some(r) => {
                        self.selected = r;
                        ctx.tree.state_mut(id).taint();
                    }
                    None => self.dismiss(ctx, id),
                }
                return Ok(true);
            }
            if ev.mouse_up(ButtonSet::LEFT) {
                if let Some(r) = row {
                    (self.items[r].action)(ctx)?;
                }
                self.dismiss(ctx, id);
                return Ok(true);
            }
            return Ok(true);
        }
        Ok(true)
    }
}
