//! GPU Render Backend for Flipfield
//!
//! Double-buffered state textures, the fullscreen update pass, and the
//! surface blit that presents the result using WebGPU (wgpu).

mod blit;
mod context;
mod driver;
mod geometry;
mod program;
mod state_buffer;

pub use blit::BlitPipeline;
pub use context::GpuContext;
pub use driver::FrameDriver;
pub use geometry::QuadGeometry;
pub use program::{GpuUpdateProgram, DEFAULT_UPDATE_SHADER};
pub use state_buffer::{create_state_sampler, StateBuffer, STATE_TEXTURE_FORMAT};

/// Error type for render operations.
///
/// Everything here is fatal to the renderer except [`RenderError::Surface`],
/// which the window shell inspects: lost or outdated surfaces are
/// reconfigured and the frame retried.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("No suitable GPU adapter found")]
    NoAdapter,

    #[error("Failed to request GPU device: {0}")]
    DeviceRequest(#[from] wgpu::RequestDeviceError),

    #[error("Failed to create rendering surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("Failed to create {label}: {message}")]
    ResourceCreation { label: String, message: String },

    #[error("Update program failed to build: {0}")]
    ProgramLink(String),

    #[error("Surface presentation failed: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("Buffer mapping failed: {0}")]
    BufferMap(#[from] wgpu::BufferAsyncError),
}
