//! The top-level terminal event loop.

use std::io::stderr;
use std::panic;

use color_backtrace::BacktracePrinter;
use crossterm::{cursor::Show, event::DisableMouseCapture, execute, terminal};
use scopeguard::defer;
use tracing::debug;

use crate::{
    Error, Result,
    screen::{Deadline, Screen},
};

fn restore_terminal() {
    let _ = execute!(
        stderr(),
        terminal::LeaveAlternateScreen,
        DisableMouseCapture,
        Show
    );
    let _ = terminal::disable_raw_mode();
}

/// Run the screen against the live terminal until interrupted. The terminal
/// is restored on every exit path, including panics, so a crash leaves a
/// readable backtrace rather than a wedged shell.
pub fn runloop(screen: &mut Screen) -> Result<()> {
    screen.backend_mut().start()?;
    defer! {
        restore_terminal();
    }
    panic::set_hook(Box::new(|pi| {
        restore_terminal();
        let _ = BacktracePrinter::new()
            .print_panic_info(pi, &mut *color_backtrace::default_output_stream());
    }));
    let result = loop {
        match screen.event_next(Deadline::Forever) {
            Ok(ev) => {
                if ev.is_none() {
                    continue;
                }
                if let Err(e) = screen.dispatch(&ev) {
                    break Err(e);
                }
            }
            Err(Error::Resized(sz)) => {
                debug!(?sz, "terminal resized");
                if let Err(e) = screen.resize(sz) {
                    break Err(e);
                }
            }
            Err(Error::Interrupted) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    let _ = panic::take_hook();
    screen.backend_mut().stop()?;
    result
}
