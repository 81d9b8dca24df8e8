//! # Cooperative scheduling primitives
//!
//! Events, timers and state machines used to express waiting inside a fixed
//! period control loop. Nothing here blocks: a state machine parked on an
//! event simply reports that it is not ready this tick.
//!
//! All primitives share a [`TaskContext`], which owns the mode-elapsed clock
//! and the armed timers. The context is created when a mode starts and
//! dropped when it stops, there is no process-wide state.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod context;
mod event;
mod state_machine;
mod timer;

// ---------------------------------------------------------------------------
// EXPORTS
// ---------------------------------------------------------------------------

pub use context::*;
pub use event::*;
pub use state_machine::*;
pub use timer::*;
