//! Flipfield - Ping-pong GPU cellular simulation renderer.
//!
//! This crate drives a per-pixel update rule over a pair of fixed-size
//! state textures: each frame reads the buffer written last frame and
//! writes the other, then the freshest buffer is blitted to the window.
//! The update rule itself is an opaque WGSL fragment program, so the same
//! machinery runs anything from a life-like automaton to a reaction
//! diffusion system.
//!
//! # Architecture
//!
//! The crate is split into three main modules:
//!
//! - `schema`: Configuration types and random seeding
//! - `sim`: GPU-agnostic buffer-pair bookkeeping and the pass scheduler
//! - `render`: wgpu textures, the update pass, and surface presentation
//!
//! plus the `app` window shell around them.
//!
//! # Example
//!
//! The scheduler is generic over the buffer type, so the pass logic runs
//! without any GPU at all:
//!
//! ```rust
//! use flipfield::sim::{PingPongScheduler, StepError, UpdateProgram};
//!
//! struct Count(usize);
//!
//! impl UpdateProgram<Vec<f32>> for Count {
//!     fn apply(
//!         &mut self,
//!         source: &Vec<f32>,
//!         _target: &Vec<f32>,
//!         _delta_ms: f32,
//!     ) -> Result<(), StepError> {
//!         self.0 += source.len();
//!         Ok(())
//!     }
//! }
//!
//! let mut scheduler = PingPongScheduler::new(vec![0.0f32; 16], vec![0.0f32; 16]);
//! let mut rule = Count(0);
//!
//! let final_index = scheduler.run_frame(&mut rule, 16.0, 3);
//! assert_eq!(final_index, 0);
//! assert_eq!(rule.0, 48);
//! ```

pub mod app;
pub mod render;
pub mod schema;
pub mod sim;

// Re-export commonly used types
pub use render::{FrameDriver, GpuUpdateProgram, RenderError, StateBuffer};
pub use schema::{SeedGenerator, SimulationConfig};
pub use sim::{PingPongScheduler, StepError, UpdateProgram};
