//! A modal message box.

use textwrap::wrap;

use crate::{
    Result,
    event::{Event, Key},
    geom::{Point, Size},
    render::Draw,
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
    widgets::{Button, Trigger},
};

pub struct Alert {
    lines: Vec<String>,
    error: bool,
}

impl Alert {
    /// Open a centered panel wrapping `text`, attached under `parent`, with
    /// a default "ok" button. Track the returned node to make it modal; the
    /// button, Return, Escape or a click all dismiss it.
    pub fn open(ctx: &mut Ctx, parent: ViewId, text: &str, error: bool) -> Result<ViewId> {
        let screen = ctx.backend.screen_size();
        let body_w = (screen.x - 8).clamp(8, 60) as usize;
        let lines: Vec<String> = wrap(text, body_w).iter().map(|l| l.to_string()).collect();
        let w = (lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as i32 + 4).max(8);
        let h = lines.len() as i32 + 4;
        let size = Size::new(w, h);

        let alert = Alert { lines, error };
        let border = if error {
            ctx.palette.error
        } else {
            ctx.palette.normal
        };
        let id = ctx.tree.new_panel(ctx.backend, Box::new(alert), false)?;
        let st = ctx.tree.state_mut(id);
        st.set_origin(Point::new((screen.x - size.x) / 2, (screen.y - size.y) / 2));
        st.set_size(size);
        st.set_border(Some(border));

        let ok = Button::new(
            "ok",
            Trigger::DownUp,
            Box::new(move |ctx: &mut Ctx| {
                ctx.tree.remove(ctx.backend, id);
                ctx.stop_tracking();
                Ok(())
            }),
        );
        let bid = ctx.tree.new_view(Box::new(ok));
        let bst = ctx.tree.state_mut(bid);
        bst.set_origin(Point::new((w - 4) / 2, h - 2));
        bst.set_size(Size::new(4, 1));
        ctx.tree.add_child(id, bid);

        ctx.tree.add_child(parent, id);
        Ok(id)
    }

    fn dismiss(&mut self, ctx: &mut Ctx, id: ViewId) {
        ctx.tree.remove(ctx.backend, id);
        ctx.stop_tracking();
    }
}

impl Widget for Alert {
    fn draw(&mut self, _view: &ViewState, d: &mut Draw) -> Result<()> {
        let color = if self.error {
            d.palette.error
        } else {
            d.palette.normal
        };
        for (i, line) in self.lines.iter().enumerate() {
            d.text(color, Point::new(2, 1 + i as i32), line)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        match ev.key() {
            Some(Key::Return) | Some(Key::Escape) => {
                self.dismiss(ctx, id);
                return Ok(true);
            }
            Some(_) => return Ok(true),
            None => {}
        }
        if ev.mouse().is_some() {
            // Dismiss on release so the matching press doesn't leak to
            // whatever ends up under the pointer.
            if ev.mouse_up(crate::event::ButtonSet::LEFT) {
                self.dismiss(ctx, id);
            }
            return Ok(true);
        }
        Ok(true)
    }
}
