//! Shared test utilities.
//!
//! Tests drive a real [`Screen`] over a [`TestBackend`]. The backend is held
//! behind a shared handle so a test can script input and inspect the
//! composited output while the screen owns its half.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::time::Duration;

use crate::{
    Result,
    backend::{Backend, RawInput, SurfaceId, test::TestBackend},
    cursor::Cursor,
    event::{ButtonSet, ButtonState, Event, EventKind, Key},
    geom::{Point, Rect, Size},
    render::Draw,
    screen::{Deadline, Screen},
    style::{Attr, Color, TermColor, Theme},
    traverse::Ctx,
    tree::{ViewId, ViewState, Widget},
};

/// A [`Backend`] that delegates to a shared [`TestBackend`].
pub struct SharedBackend(pub Rc<RefCell<TestBackend>>);

impl Backend for SharedBackend {
    fn screen_size(&self) -> Size {
        self.0.borrow().screen_size()
    }

    fn alloc_surface(&mut self, frame: Rect) -> Result<SurfaceId> {
        self.0.borrow_mut().alloc_surface(frame)
    }

    fn move_surface(&mut self, id: SurfaceId, frame: Rect) -> Result<Rect> {
        self.0.borrow_mut().move_surface(id, frame)
    }

    fn surface_frame(&self, id: SurfaceId) -> Result<Rect> {
        self.0.borrow().surface_frame(id)
    }

    fn free_surface(&mut self, id: SurfaceId) {
        self.0.borrow_mut().free_surface(id)
    }

    fn set_surface_visible(&mut self, id: SurfaceId, visible: bool) -> Result<()> {
        self.0.borrow_mut().set_surface_visible(id, visible)
    }

    fn resize(&mut self, sz: Size) -> Result<()> {
        self.0.borrow_mut().resize(sz)
    }

    fn restack(&mut self, order: &[SurfaceId]) -> Result<()> {
        self.0.borrow_mut().restack(order)
    }

    fn register_color(&mut self, fg: TermColor, bg: TermColor) -> Result<Color> {
        self.0.borrow_mut().register_color(fg, bg)
    }

    fn push_attr(&mut self, id: SurfaceId, attr: Attr) -> Result<()> {
        self.0.borrow_mut().push_attr(id, attr)
    }

    fn pop_attr(&mut self, id: SurfaceId) -> Result<()> {
        self.0.borrow_mut().pop_attr(id)
    }

    fn text(&mut self, id: SurfaceId, loc: Point, txt: &str) -> Result<()> {
        self.0.borrow_mut().text(id, loc, txt)
    }

    fn fill(&mut self, id: SurfaceId, rect: Rect, c: char) -> Result<()> {
        self.0.borrow_mut().fill(id, rect, c)
    }

    fn cursor(&mut self, c: Option<Cursor>) -> Result<()> {
        self.0.borrow_mut().cursor(c)
    }

    fn commit(&mut self) -> Result<()> {
        self.0.borrow_mut().commit()
    }

    fn read_input(&mut self, timeout: Option<Duration>) -> Result<RawInput> {
        self.0.borrow_mut().read_input(timeout)
    }
}

/// A screen plus a handle onto the backend underneath it.
pub struct Harness {
    pub screen: Screen,
    backend: Rc<RefCell<TestBackend>>,
    /// Scratch slot for a call log shared with [`LogWidget`]s.
    pub log: Option<Rc<RefCell<Vec<String>>>>,
}

impl Harness {
    pub fn new(size: Size) -> Result<Harness> {
        let backend = Rc::new(RefCell::new(TestBackend::new(size)));
        let screen = Screen::new(
            Box::new(SharedBackend(backend.clone())),
            Theme::default(),
        )?;
        Ok(Harness {
            screen,
            backend,
            log: None,
        })
    }

    pub fn be(&self) -> Ref<'_, TestBackend> {
        self.backend.borrow()
    }

    pub fn be_mut(&self) -> RefMut<'_, TestBackend> {
        self.backend.borrow_mut()
    }

    pub fn contents(&self) -> Vec<String> {
        self.backend.borrow().contents()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.backend.borrow().contains(needle)
    }

    /// Render a frame and pump every queued input through the tree.
    pub fn pump(&mut self) -> Result<()> {
        loop {
            let ev = self.screen.event_next(Deadline::Poll)?;
            if ev.is_none() {
                return Ok(());
            }
            self.screen.dispatch(&ev)?;
        }
    }

    pub fn key(&mut self, k: Key) {
        self.backend.borrow_mut().push_event(EventKind::Key(k));
    }

    /// Queue a full left click at a screen point.
    pub fn click(&mut self, p: Point) {
        let mut be = self.backend.borrow_mut();
        be.push_event(EventKind::Mouse {
            origin: p,
            state: ButtonState {
                pressed: ButtonSet::LEFT,
                released: ButtonSet::NONE,
            },
        });
        be.push_event(EventKind::Mouse {
            origin: p,
            state: ButtonState {
                pressed: ButtonSet::NONE,
                released: ButtonSet::LEFT,
            },
        });
    }

    /// Run a tree-building closure with a traversal context rooted at the
    /// screen, the way a hook would see it.
    pub fn build<R>(
        &mut self,
        f: impl FnOnce(&mut Ctx, ViewId) -> Result<R>,
    ) -> Result<R> {
        self.screen.with_ctx(f)
    }
}

/// A shared call log for [`LogWidget`].
pub fn log() -> Rc<RefCell<Vec<String>>> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Route tracing output to stderr for a test run. Later calls are no-ops.
pub fn setup_logs() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .compact()
        .try_init();
}

/// A widget that records its hook invocations, for asserting on traversal
/// order and event routing.
pub struct LogWidget {
    name: String,
    log: Rc<RefCell<Vec<String>>>,
    /// Whether `handle_event` claims events.
    pub consume: bool,
}

impl LogWidget {
    pub fn new(name: impl Into<String>, log: Rc<RefCell<Vec<String>>>) -> LogWidget {
        LogWidget {
            name: name.into(),
            log,
            consume: false,
        }
    }

    pub fn consuming(name: impl Into<String>, log: Rc<RefCell<Vec<String>>>) -> LogWidget {
        LogWidget {
            name: name.into(),
            log,
            consume: true,
        }
    }
}

impl Widget for LogWidget {
    fn layout(&mut self, _ctx: &mut Ctx, _id: ViewId) -> Result<()> {
        self.log.borrow_mut().push(format!("layout:{}", self.name));
        Ok(())
    }

    fn draw(&mut self, _view: &ViewState, _d: &mut Draw) -> Result<()> {
        self.log.borrow_mut().push(format!("draw:{}", self.name));
        Ok(())
    }

    fn handle_event(&mut self, _ctx: &mut Ctx, _id: ViewId, ev: &Event) -> Result<bool> {
        if ev.is_none() {
            return Ok(false);
        }
        self.log.borrow_mut().push(format!("event:{}", self.name));
        Ok(self.consume)
    }
}
