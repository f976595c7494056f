//! State buffers - fixed-size RGBA float textures holding the cell grid.

use super::RenderError;

/// Texel format for simulation state. Float channels let update rules carry
/// continuous per-cell quantities, not just on/off.
pub const STATE_TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba32Float;

/// Four f32 channels per cell.
const BYTES_PER_CELL: u32 = 16;

/// One simulation state surface.
///
/// The texture serves as both render target (when the pass writes the next
/// generation into it) and shader input (when the other pass reads it), with
/// a fixed size for the lifetime of the renderer. The GPU allocation is
/// released when the value drops.
pub struct StateBuffer {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl StateBuffer {
    /// Allocate a state texture and verify it is usable.
    ///
    /// The surrounding error scope turns silent validation failures into
    /// [`RenderError::ResourceCreation`]; an unusable state texture means
    /// the renderer cannot run at all, so callers treat this as fatal.
    pub async fn create(
        device: &wgpu::Device,
        width: u32,
        height: u32,
        label: &str,
    ) -> Result<Self, RenderError> {
        let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: STATE_TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING
                | wgpu::TextureUsages::RENDER_ATTACHMENT
                | wgpu::TextureUsages::COPY_DST
                | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });

        if let Some(error) = scope.pop().await {
            return Err(RenderError::ResourceCreation {
                label: label.to_string(),
                message: error.to_string(),
            });
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            texture,
            view,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// View bound either as a pass's color attachment or as its input.
    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Upload a full grid of cells, row-major RGBA floats.
    pub fn write_cells(&self, queue: &wgpu::Queue, cells: &[f32]) {
        debug_assert_eq!(cells.len(), (self.width * self.height * 4) as usize);

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            bytemuck::cast_slice(cells),
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(self.width * BYTES_PER_CELL),
                rows_per_image: Some(self.height),
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
    }

    /// Copy the texture back to host memory as row-major RGBA floats.
    ///
    /// Blocks until the copy completes. Diagnostics and tests only; the
    /// steady-state frame never reads state back.
    pub fn read_cells(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<Vec<f32>, RenderError> {
        let unpadded_bytes_per_row = self.width * BYTES_PER_CELL;
        // Texture-to-buffer copies require 256-byte row alignment.
        let padded_bytes_per_row = unpadded_bytes_per_row
            .div_ceil(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
            * wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("State Readback Buffer"),
            size: (padded_bytes_per_row * self.height) as u64,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Readback Encoder"),
        });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded_bytes_per_row),
                    rows_per_image: Some(self.height),
                },
            },
            wgpu::Extent3d {
                width: self.width,
                height: self.height,
                depth_or_array_layers: 1,
            },
        );
        queue.submit(std::iter::once(encoder.finish()));

        let buffer_slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = tx.send(result);
        });

        device.poll(wgpu::PollType::wait_indefinitely()).ok();
        rx.recv().expect("map_async callback dropped")?;

        let cells = {
            let data = buffer_slice.get_mapped_range();
            let mut cells = Vec::with_capacity((self.width * self.height * 4) as usize);
            for row in 0..self.height {
                let start = (row * padded_bytes_per_row) as usize;
                let end = start + unpadded_bytes_per_row as usize;
                cells.extend_from_slice(bytemuck::cast_slice(&data[start..end]));
            }
            cells
        };
        staging.unmap();

        Ok(cells)
    }
}

impl Drop for StateBuffer {
    fn drop(&mut self) {
        // Frees the GPU allocation as soon as pending passes finish, rather
        // than when the device goes away.
        self.texture.destroy();
    }
}

/// Sampler matching the state textures: unfiltered float, nearest
/// neighbour, clamped at the edges.
pub fn create_state_sampler(device: &wgpu::Device) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("State Sampler"),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Nearest,
        min_filter: wgpu::FilterMode::Nearest,
        mipmap_filter: wgpu::MipmapFilterMode::Nearest,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::GpuContext;

    fn headless() -> Option<(wgpu::Device, wgpu::Queue)> {
        match pollster::block_on(GpuContext::headless_device()) {
            Ok(pair) => Some(pair),
            Err(RenderError::NoAdapter) => {
                eprintln!("Skipping GPU test: no usable adapter");
                None
            }
            Err(e) => panic!("Failed to create GPU device: {:?}", e),
        }
    }

    #[test]
    fn test_write_read_round_trip() {
        let Some((device, queue)) = headless() else {
            return;
        };

        // 60 * 16 = 960 bytes per row, not a multiple of 256, so the
        // readback exercises the padded-row path.
        let (width, height) = (60u32, 13u32);
        let buffer = pollster::block_on(StateBuffer::create(&device, width, height, "Test State"))
            .expect("creation failed");

        let cells: Vec<f32> = (0..width * height * 4).map(|i| i as f32 * 0.25).collect();
        buffer.write_cells(&queue, &cells);

        let read = buffer.read_cells(&device, &queue).expect("readback failed");
        assert_eq!(read, cells);
    }

    #[test]
    fn test_zero_sized_creation_is_reported() {
        let Some((device, _queue)) = headless() else {
            return;
        };

        let result = pollster::block_on(StateBuffer::create(&device, 0, 0, "Empty State"));
        match result {
            Err(RenderError::ResourceCreation { label, message }) => {
                assert_eq!(label, "Empty State");
                assert!(!message.is_empty(), "validation diagnostic missing");
            }
            Ok(_) => panic!("zero-sized texture unexpectedly created"),
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    #[test]
    fn test_oversized_creation_is_reported() {
        let Some((device, _queue)) = headless() else {
            return;
        };

        // Far beyond max_texture_dimension_2d under default limits.
        let result = pollster::block_on(StateBuffer::create(&device, 1 << 16, 1, "Huge State"));
        assert!(matches!(
            result,
            Err(RenderError::ResourceCreation { .. })
        ));
    }
}
