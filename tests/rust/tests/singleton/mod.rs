//! Process logger lifecycle
//!
//! All tests in this binary share one process logger. They initialize it in
//! the shared directory, so whichever test runs first wins.

mod concurrency;
mod context;
