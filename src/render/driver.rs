//! Frame driver - advances the simulation and puts frames on screen.

use std::sync::Arc;
use std::time::Instant;

use winit::window::Window;

use crate::schema::{SeedGenerator, SimulationConfig};
use crate::sim::PingPongScheduler;

use super::blit::BlitPipeline;
use super::context::GpuContext;
use super::program::GpuUpdateProgram;
use super::state_buffer::StateBuffer;
use super::RenderError;

/// Owns the whole per-frame path: delta timing, the scheduled update
/// passes, and the presentation blit with its diagnostic panels.
pub struct FrameDriver {
    context: GpuContext,
    config: SimulationConfig,
    scheduler: PingPongScheduler<StateBuffer>,
    program: GpuUpdateProgram,
    blit: BlitPipeline,
    // Untouched copy of the initial grid, shown in the diagnostics strip.
    seed_buffer: StateBuffer,
    pair_bind_groups: [wgpu::BindGroup; 2],
    seed_bind_group: wgpu::BindGroup,
    last_frame: Instant,
}

impl FrameDriver {
    /// Bring up the GPU, seed the state textures, and build both pipelines.
    ///
    /// Any error out of here is fatal: no pass has run yet and nothing is
    /// on screen, so the shell reports the failure and exits.
    pub async fn new(window: Arc<Window>, config: SimulationConfig) -> Result<Self, RenderError> {
        let context = GpuContext::new(window).await?;
        let device = &context.device;
        let queue = &context.queue;

        // Both pair members and the reference copy start from one seed grid,
        // so the first pass reads the same state regardless of cursor.
        let mut seed = SeedGenerator::new(config.seed_threshold);
        let cells = seed.generate(config.width, config.height);

        let first =
            StateBuffer::create(device, config.width, config.height, "State Buffer 0").await?;
        let second =
            StateBuffer::create(device, config.width, config.height, "State Buffer 1").await?;
        let seed_buffer =
            StateBuffer::create(device, config.width, config.height, "Seed Buffer").await?;
        first.write_cells(queue, &cells);
        second.write_cells(queue, &cells);
        seed_buffer.write_cells(queue, &cells);

        let source = GpuUpdateProgram::load_source(config.update_shader.as_deref())?;
        let program = GpuUpdateProgram::new(device, queue, &source).await?;
        let blit = BlitPipeline::new(device, context.surface_format());

        let pair_bind_groups = [
            blit.bind_texture(device, &first),
            blit.bind_texture(device, &second),
        ];
        let seed_bind_group = blit.bind_texture(device, &seed_buffer);

        log::info!(
            "Flipfield initialized: {}x{} grid, {} sub-step(s) per frame",
            config.width,
            config.height,
            config.substeps
        );

        Ok(Self {
            context,
            scheduler: PingPongScheduler::new(first, second),
            config,
            program,
            blit,
            seed_buffer,
            pair_bind_groups,
            seed_bind_group,
            last_frame: Instant::now(),
        })
    }

    /// Advance the simulation by one displayed frame and present it.
    ///
    /// Pass failures inside the frame are transient and already logged by
    /// the scheduler; surface acquisition and presentation failures
    /// propagate so the shell can reconfigure or bail.
    pub fn frame(&mut self) -> Result<(), RenderError> {
        let now = Instant::now();
        let delta_ms = now.duration_since(self.last_frame).as_secs_f32() * 1000.0;
        self.last_frame = now;

        let final_index =
            self.scheduler
                .run_frame(&mut self.program, delta_ms, self.config.substeps);

        let frame = self.context.acquire_frame()?;
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder =
            self.context
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Present Encoder"),
                });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Present Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    depth_slice: None,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            self.blit.draw(&mut pass, &self.pair_bind_groups[final_index]);

            if self.config.show_diagnostics {
                self.draw_diagnostics(&mut pass);
            }
        }

        self.context.queue.submit(std::iter::once(encoder.finish()));
        frame.present();

        Ok(())
    }

    /// Read-only panels along the bottom edge: the original seed, then both
    /// pair members in index order. The panels look at the live textures;
    /// nothing here writes state.
    fn draw_diagnostics(&self, pass: &mut wgpu::RenderPass<'_>) {
        let (surface_w, surface_h) = self.context.surface_size();
        let panel = (surface_w as f32 / 5.0).min(surface_h as f32 / 4.0);
        let margin = panel * 0.1;
        let y = surface_h as f32 - panel - margin;

        let panels = [
            &self.seed_bind_group,
            &self.pair_bind_groups[0],
            &self.pair_bind_groups[1],
        ];
        for (i, bind_group) in panels.into_iter().enumerate() {
            let x = margin + i as f32 * (panel + margin);
            pass.set_viewport(x, y, panel, panel, 0.0, 1.0);
            self.blit.draw(pass, bind_group);
        }
    }

    /// Read-only access to the never-written seed copy.
    pub fn seed_buffer(&self) -> &StateBuffer {
        &self.seed_buffer
    }

    /// Read-only access to one pair member, for external diagnostics.
    pub fn state_buffer(&self, index: usize) -> &StateBuffer {
        self.scheduler.buffer(index)
    }

    /// Index of the buffer holding the freshest fully written state.
    pub fn latest_index(&self) -> usize {
        self.scheduler.latest_index()
    }

    /// Track a window resize. The state grid keeps its fixed size; only the
    /// presentation surface follows the window.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.context.resize(width, height);
    }

    /// Reconfigure after the surface is reported lost or outdated.
    pub fn reconfigure_surface(&self) {
        self.context.reconfigure();
    }
}
