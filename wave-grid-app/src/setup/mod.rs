//! Wiring between resolved settings and the WFC engine.

/// Loading rules and running one generation.
pub mod execution;
