//! A clickable push button.

use pad::{Alignment, PadStr};

use crate::{
    Result,
    event::{ButtonSet, Event},
    geom::{Point, Size},
    render::Draw,
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
};

/// When the button's action fires relative to the mouse transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fire on press.
    Down,
    /// Fire on release over the button, pressed anywhere.
    Up,
    /// Fire on release only if the press also landed on the button. The
    /// standard single-fire click.
    DownUp,
}

pub type Action = Box<dyn FnMut(&mut Ctx) -> Result<()>>;

pub struct Button {
    label: String,
    trigger: Trigger,
    buttons: ButtonSet,
    armed: bool,
    action: Action,
}

impl Button {
    pub fn new(label: impl Into<String>, trigger: Trigger, action: Action) -> Button {
        Button {
            label: label.into(),
            trigger,
            buttons: ButtonSet::LEFT,
            armed: false,
            action,
        }
    }

    /// Restrict the button to a different mouse button set.
    pub fn with_buttons(mut self, buttons: ButtonSet) -> Button {
        self.buttons = buttons;
        self
    }

    pub fn armed(&self) -> bool {
        self.armed
    }

    fn fire(&mut self, ctx: &mut Ctx) -> Result<()> {
        (self.action)(ctx)
    }
}

impl Widget for Button {
    fn draw(&mut self, view: &ViewState, d: &mut Draw) -> Result<()> {
        let color = if !view.enabled() {
            d.palette.dimmed
        } else if self.armed {
            d.palette.selection
        } else {
            d.palette.normal
        };
        let w = view.size().x.max(0) as usize;
        let txt = self.label.pad_to_width_with_alignment(w, Alignment::Middle);
        d.text(color, Point::zero(), &txt)
    }

    fn handle_event(&mut self, ctx: &mut Ctx, id: ViewId, ev: &Event) -> Result<bool> {
        if !ctx.tree.state(id).enabled() {
            return Ok(false);
        }
        let Some((p, _)) = ev.mouse() else {
            return Ok(false);
        };
        let hit = ctx.tree.state(id).hit(p);
        if ev.mouse_down(self.buttons) && hit {
            match self.trigger {
                Trigger::Down => {
                    self.fire(ctx)?;
                    return Ok(true);
                }
                Trigger::DownUp => {
                    self.armed = true;
                    ctx.tree.state_mut(id).taint();
                    return Ok(true);
                }
                Trigger::Up => {}
            }
        }
        if ev.mouse_up(self.buttons) {
            // Any release disarms, wherever it lands. This is what makes the
            // DownUp trigger single-fire: a press can be walked off.
            let was_armed = std::mem::replace(&mut self.armed, false);
            if was_armed {
                ctx.tree.state_mut(id).taint();
            }
            match self.trigger {
                Trigger::Up if hit => {
                    self.fire(ctx)?;
                    return Ok(true);
                }
                Trigger::DownUp if was_armed && hit => {
                    self.fire(ctx)?;
                    return Ok(true);
                }
                _ => {}
            }
            if was_armed {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn size_intrinsic(&mut self, _target: Size) -> Size {
        Size::new(self.label.chars().count() as i32 + 2, 1)
    }
}
