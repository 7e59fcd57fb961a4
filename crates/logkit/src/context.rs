//! Carrying a logger through request-scoped extensions
//!
//! A handler can bind a derived logger (say, one carrying a request id) to
//! the request's [`Extensions`]; code further down retrieves it with
//! [`from_context`], falling back to the process logger when nothing is bound.

use crate::global;
use crate::logger::Logger;
use http::Extensions;

/// Well-known key under which a logger is stored in [`Extensions`]
#[derive(Debug, Clone)]
pub struct LoggerKey(pub Logger);

/// Anything that owns request extensions
pub trait Carrier {
    fn extensions(&self) -> &Extensions;
    fn extensions_mut(&mut self) -> &mut Extensions;
}

impl Carrier for Extensions {
    fn extensions(&self) -> &Extensions {
        self
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        self
    }
}

impl Carrier for http::request::Parts {
    fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }
}

impl<B> Carrier for http::Request<B> {
    fn extensions(&self) -> &Extensions {
        http::Request::extensions(self)
    }

    fn extensions_mut(&mut self) -> &mut Extensions {
        http::Request::extensions_mut(self)
    }
}

/// Bind `logger` to `ctx`, replacing any logger bound before
pub fn with_logger<C: Carrier + ?Sized>(ctx: &mut C, logger: Logger) {
    ctx.extensions_mut().insert(LoggerKey(logger));
}

/// Logger bound to `ctx`, if any
pub fn bound_logger<C: Carrier + ?Sized>(ctx: &C) -> Option<&Logger> {
    ctx.extensions().get::<LoggerKey>().map(|key| &key.0)
}

/// Logger bound to `ctx`, or the process logger.
///
/// # Panics
///
/// Panics when nothing is bound and the process logger was never initialized.
pub fn from_context<C: Carrier + ?Sized>(ctx: &C) -> Logger {
    match bound_logger(ctx) {
        Some(logger) => logger.clone(),
        None => global::current().clone(),
    }
}
