use std::cell::Cell;
use std::rc::Rc;

use gitweave::{
    Ctx, Deadline, Result,
    event::{ButtonSet, ButtonState, EventKind, Key},
    geom::{Point, Size},
    tutils::Harness,
    widgets::{Alert, Button, FocusRequest, Menu, MenuItem, TextField, Trigger},
};

fn mouse(h: &mut Harness, p: Point, pressed: ButtonSet, released: ButtonSet) {
    h.be_mut().push_event(EventKind::Mouse {
        origin: p,
        state: ButtonState { pressed, released },
    });
}

#[test]
fn tbutton_fires_once_per_click() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    h.build(move |ctx, root| {
        let b = ctx.tree.new_view(Box::new(Button::new(
            "ok",
            Trigger::DownUp,
            Box::new(move |_: &mut Ctx| {
                f.set(f.get() + 1);
                Ok(())
            }),
        )));
        ctx.tree.state_mut(b).set_origin(Point::new(2, 2));
        ctx.tree.state_mut(b).set_size(Size::new(4, 1));
        ctx.tree.add_child(root, b);
        Ok(())
    })?;
    h.screen.refresh()?;

    h.click(Point::new(3, 2));
    h.pump()?;
    assert_eq!(fired.get(), 1);

    // Press on the button, release off it: the press is walked off.
    mouse(&mut h, Point::new(3, 2), ButtonSet::LEFT, ButtonSet::NONE);
    mouse(&mut h, Point::new(0, 0), ButtonSet::NONE, ButtonSet::LEFT);
    h.pump()?;
    assert_eq!(fired.get(), 1);

    // A stray release over the button without a press does nothing.
    mouse(&mut h, Point::new(3, 2), ButtonSet::NONE, ButtonSet::LEFT);
    h.pump()?;
    assert_eq!(fired.get(), 1);

    h.click(Point::new(3, 2));
    h.pump()?;
    assert_eq!(fired.get(), 2);
    Ok(())
}

#[test]
fn tdisabled_button_ignores_clicks() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    let b = h.build(move |ctx, root| {
        let b = ctx.tree.new_view(Box::new(Button::new(
            "go",
            Trigger::DownUp,
            Box::new(move |_: &mut Ctx| {
                f.set(f.get() + 1);
                Ok(())
            }),
        )));
        ctx.tree.state_mut(b).set_size(Size::new(4, 1));
        ctx.tree.state_mut(b).set_enabled(false);
        ctx.tree.add_child(root, b);
        Ok(b)
    })?;
    h.click(Point::new(1, 0));
    h.pump()?;
    assert_eq!(fired.get(), 0);

    h.build(|ctx, _| {
        ctx.tree.state_mut(b).set_enabled(true);
        Ok(())
    })?;
    h.click(Point::new(1, 0));
    h.pump()?;
    assert_eq!(fired.get(), 1);
    Ok(())
}

#[test]
fn tbutton_honours_its_button_mask() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let fired = Rc::new(Cell::new(0));
    let f = fired.clone();
    h.build(move |ctx, root| {
        let b = ctx.tree.new_view(Box::new(
            Button::new(
                "menu",
                Trigger::DownUp,
                Box::new(move |_: &mut Ctx| {
                    f.set(f.get() + 1);
                    Ok(())
                }),
            )
            .with_buttons(ButtonSet::RIGHT),
        ));
        ctx.tree.state_mut(b).set_size(Size::new(6, 1));
        ctx.tree.add_child(root, b);
        Ok(())
    })?;

    // Left clicks are outside the mask.
    h.click(Point::new(1, 0));
    h.pump()?;
    assert_eq!(fired.get(), 0);

    mouse(&mut h, Point::new(1, 0), ButtonSet::RIGHT, ButtonSet::NONE);
    mouse(&mut h, Point::new(1, 0), ButtonSet::NONE, ButtonSet::RIGHT);
    h.pump()?;
    assert_eq!(fired.get(), 1);
    Ok(())
}

#[test]
fn ttextfield_edits_and_parks_the_cursor() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    h.build(|ctx, root| {
        let f = ctx.tree.new_view(Box::new(TextField::new("")));
        ctx.tree.state_mut(f).set_origin(Point::new(0, 1));
        ctx.tree.state_mut(f).set_size(Size::new(6, 1));
        ctx.tree.add_child(root, f);
        Ok(())
    })?;
    h.key(Key::Char('h'));
    h.key(Key::Char('i'));
    h.pump()?;
    assert!(h.contents()[1].starts_with("hi "));
    let c = h.be().current_cursor().expect("cursor parked");
    assert_eq!(c.location, Point::new(2, 1));

    h.key(Key::Left);
    h.key(Key::Char('e'));
    h.pump()?;
    assert!(h.contents()[1].starts_with("hei"));
    Ok(())
}

#[test]
fn ttextfield_surfaces_focus_requests() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let req: Rc<Cell<Option<FocusRequest>>> = Rc::new(Cell::new(None));
    let r = req.clone();
    h.build(move |ctx, root| {
        let f = ctx.tree.new_view(Box::new(
            TextField::new("x").with_focus_handler(Box::new(move |_: &mut Ctx, fr| {
                r.set(Some(fr));
                Ok(())
            })),
        ));
        ctx.tree.state_mut(f).set_size(Size::new(6, 1));
        ctx.tree.add_child(root, f);
        Ok(())
    })?;
    h.key(Key::Tab);
    h.pump()?;
    assert_eq!(req.get(), Some(FocusRequest::Next));
    h.key(Key::Return);
    h.pump()?;
    assert_eq!(req.get(), Some(FocusRequest::Commit));
    h.key(Key::Escape);
    h.pump()?;
    assert_eq!(req.get(), Some(FocusRequest::Cancel));
    Ok(())
}

#[test]
fn tmenu_tracks_and_fires() -> Result<()> {
    let mut h = Harness::new(Size::new(40, 10))?;
    let fired = Rc::new(Cell::new(false));
    let f = fired.clone();
    let menu = h.build(move |ctx, root| {
        Menu::open(
            ctx,
            root,
            Point::new(5, 3),
            vec![
                MenuItem::new("first", Box::new(|_: &mut Ctx| Ok(()))),
                MenuItem::new(
                    "second",
                    Box::new(move |_: &mut Ctx| {
                        f.set(true);
                        Ok(())
                    }),
                ),
            ],
        )
    })?;
    h.screen.refresh()?;
    assert!(h.contains("first"));
    assert!(h.contains("second"));

    h.key(Key::Down);
    h.key(Key::Return);
    h.screen.track(menu, Deadline::Poll)?;
    assert!(fired.get());
    assert!(h.screen.tree().get(menu).is_none());

    // The menu's panel is gone from the screen too.
    h.screen.refresh()?;
    assert!(!h.contains("first"));
    Ok(())
}

#[test]
fn tmenu_dismisses_on_outside_click() -> Result<()> {
    let mut h = Harness::new(Size::new(40, 10))?;
    let menu = h.build(|ctx, root| {
        Menu::open(
            ctx,
            root,
            Point::new(5, 3),
            vec![MenuItem::new("only", Box::new(|_: &mut Ctx| Ok(())))],
        )
    })?;
    mouse(&mut h, Point::new(0, 0), ButtonSet::LEFT, ButtonSet::NONE);
    h.screen.track(menu, Deadline::Poll)?;
    assert!(h.screen.tree().get(menu).is_none());
    Ok(())
}

#[test]
fn talert_wraps_and_dismisses() -> Result<()> {
    let mut h = Harness::new(Size::new(40, 12))?;
    let alert = h.build(|ctx, root| {
        Alert::open(ctx, root, "the rebase failed: branch has diverged", true)
    })?;
    h.screen.refresh()?;
    assert!(h.contains("the rebase failed"));

    h.key(Key::Escape);
    h.screen.track(alert, Deadline::Poll)?;
    assert!(h.screen.tree().get(alert).is_none());
    h.screen.refresh()?;
    assert!(!h.contains("the rebase failed"));
    Ok(())
}

#[test]
fn talert_default_button_dismisses() -> Result<()> {
    let mut h = Harness::new(Size::new(40, 12))?;
    let alert = h.build(|ctx, root| Alert::open(ctx, root, "nothing to undo", false))?;
    h.screen.refresh()?;
    assert!(h.contains("nothing to undo"));
    assert!(h.contains("ok"));

    let p = {
        let t = h.screen.tree();
        let st = t.state(alert);
        let button = st.children()[0];
        st.origin() + t.state(button).origin() + Point::new(1, 0)
    };
    h.click(p);
    h.screen.track(alert, Deadline::Poll)?;
    assert!(h.screen.tree().get(alert).is_none());
    h.screen.refresh()?;
    assert!(!h.contains("nothing to undo"));
    Ok(())
}
