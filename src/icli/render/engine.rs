use crate::error::RenderError;
use std::ops::{Deref, DerefMut};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    A4,
}

impl PaperSize {
    /// The CSS `@page` size keyword.
    pub fn css_name(&self) -> &'static str {
        match self {
            PaperSize::A4 => "A4",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PdfOptions {
    pub paper: PaperSize,
    pub print_background: bool,
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self {
            paper: PaperSize::A4,
            print_background: true,
        }
    }
}

/// Something that can turn a finished HTML document into PDF bytes.
pub trait RenderEngine {
    type Session: RenderSession;

    /// Start a fresh session. Each render gets its own.
    fn open(&self) -> Result<Self::Session, RenderError>;
}

/// One document's trip through an engine: load, wait, print, close.
///
/// `close` must be safe to call more than once and after any failure.
pub trait RenderSession {
    fn load(&mut self, markup: &str) -> Result<(), RenderError>;

    /// Block until the loaded document and the resources it references have settled.
    fn wait_until_loaded(&mut self) -> Result<(), RenderError>;

    fn print_pdf(&mut self, options: &PdfOptions) -> Result<Vec<u8>, RenderError>;

    fn close(&mut self) -> Result<(), RenderError>;
}

/// Owns a session and closes it on drop unless [`SessionGuard::close`] already did.
pub struct SessionGuard<S: RenderSession> {
    session: S,
    closed: bool,
}

impl<S: RenderSession> SessionGuard<S> {
    pub fn new(session: S) -> Self {
        Self {
            session,
            closed: false,
        }
    }

    pub fn close(mut self) -> Result<(), RenderError> {
        self.closed = true;
        self.session.close()
    }
}

impl<S: RenderSession> Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: RenderSession> DerefMut for SessionGuard<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.session
    }
}

impl<S: RenderSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if self.closed {
            return;
        }
        if let Err(e) = self.session.close() {
            tracing::warn!(error = %e, "failed to close render session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct Counting {
        closes: Rc<Cell<u32>>,
    }

    impl RenderSession for Counting {
        fn load(&mut self, _markup: &str) -> Result<(), RenderError> {
            Ok(())
        }
        fn wait_until_loaded(&mut self) -> Result<(), RenderError> {
            Ok(())
        }
        fn print_pdf(&mut self, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
            Err(RenderError::Engine("no printer".to_string()))
        }
        fn close(&mut self) -> Result<(), RenderError> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let closes = Rc::new(Cell::new(0));
        {
            let mut guard = SessionGuard::new(Counting {
                closes: closes.clone(),
            });
            assert!(guard.print_pdf(&PdfOptions::default()).is_err());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_happens_once() {
        let closes = Rc::new(Cell::new(0));
        let guard = SessionGuard::new(Counting {
            closes: closes.clone(),
        });
        guard.close().unwrap();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_default_options() {
        let options = PdfOptions::default();
        assert_eq!(options.paper.css_name(), "A4");
        assert!(options.print_background);
    }
}
