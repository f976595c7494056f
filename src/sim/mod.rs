//! Simulation core - ping-pong buffer bookkeeping and the pass scheduler.
//!
//! Everything here is GPU-agnostic. The scheduler works over any buffer type
//! through [`UpdateProgram`], which is what lets the pass logic run under
//! plain unit tests with in-memory buffers.

mod pair;
mod scheduler;

pub use pair::*;
pub use scheduler::*;
