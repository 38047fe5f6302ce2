use gitweave::{
    Result, ViewId,
    event::Key,
    geom::Size,
    tutils::{Harness, LogWidget, log},
};

fn three_children(h: &mut Harness, consume_b: bool) -> Result<(ViewId, ViewId, ViewId)> {
    let l = log();
    let (wa, wb, wc) = (
        LogWidget::new("a", l.clone()),
        if consume_b {
            LogWidget::consuming("b", l.clone())
        } else {
            LogWidget::new("b", l.clone())
        },
        LogWidget::new("c", l.clone()),
    );
    let ids = h.build(|ctx, root| {
        let mut add = |w: LogWidget| {
            let id = ctx.tree.new_view(Box::new(w));
            ctx.tree.state_mut(id).set_size(Size::new(1, 1));
            ctx.tree.add_child(root, id);
            id
        };
        Ok((add(wa), add(wb), add(wc)))
    })?;
    h.log = Some(l);
    Ok(ids)
}

#[test]
fn tlayout_and_draw_visit_in_insertion_order() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    three_children(&mut h, false)?;
    let l = h.log.clone().unwrap();
    h.screen.refresh()?;
    assert_eq!(
        *l.borrow(),
        [
            "layout:a", "layout:b", "layout:c",
            "draw:a", "draw:b", "draw:c",
        ]
    );
    Ok(())
}

#[test]
fn tevents_visit_in_reverse_order() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    three_children(&mut h, false)?;
    let l = h.log.clone().unwrap();
    h.screen.refresh()?;
    l.borrow_mut().clear();

    h.key(Key::Char('x'));
    h.pump()?;
    assert_eq!(*l.borrow(), ["event:c", "event:b", "event:a"]);
    Ok(())
}

#[test]
fn tconsumed_events_stop() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    three_children(&mut h, true)?;
    let l = h.log.clone().unwrap();
    h.screen.refresh()?;
    l.borrow_mut().clear();

    h.key(Key::Char('x'));
    h.pump()?;
    assert_eq!(*l.borrow(), ["event:c", "event:b"]);
    Ok(())
}

#[test]
fn thidden_subtrees_are_skipped() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let (_, b, _) = three_children(&mut h, false)?;
    let l = h.log.clone().unwrap();
    h.screen.refresh()?;
    l.borrow_mut().clear();

    h.build(|ctx, _| {
        ctx.tree.set_visible(b, false);
        Ok(())
    })?;
    h.key(Key::Char('x'));
    h.pump()?;
    assert_eq!(*l.borrow(), ["event:c", "event:a"]);
    Ok(())
}

#[test]
fn tremoved_children_are_pruned_by_the_walk() -> Result<()> {
    let mut h = Harness::new(Size::new(20, 5))?;
    let (_, b, _) = three_children(&mut h, false)?;
    let l = h.log.clone().unwrap();
    h.screen.refresh()?;
    l.borrow_mut().clear();

    h.build(|ctx, _| {
        ctx.tree.remove(ctx.backend, b);
        Ok(())
    })?;
    let root = h.screen.root();
    // The stale handle stays in the list until a traversal observes it.
    assert_eq!(h.screen.tree().state(root).children().len(), 3);
    h.screen.refresh()?;
    assert_eq!(h.screen.tree().state(root).children().len(), 2);

    h.key(Key::Char('x'));
    h.pump()?;
    assert_eq!(*l.borrow(), ["event:c", "event:a"]);
    Ok(())
}
