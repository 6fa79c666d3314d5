//! Driftchart Core
//!
//! Ambient services shared by the driftchart crates: log subscriber setup and
//! puffin-based profiling.

pub mod logging;
pub mod profiling;
