//! Process logger misuse before initialization
//!
//! Nothing in this binary initializes successfully, so every test sees an
//! empty process logger.

mod precondition;
