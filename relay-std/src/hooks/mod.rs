//! Standard hooks.

pub mod logging;
