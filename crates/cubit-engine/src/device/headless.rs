use std::sync::mpsc::TryRecvError;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::render::DepthTexture;

use super::GpuInit;

/// Device and queue without a surface, rendering into an offscreen target.
///
/// Used by tests and tools that exercise the pipeline without a window.
pub struct HeadlessGpu {
    device: wgpu::Device,
    queue: wgpu::Queue,
    color: wgpu::Texture,
    color_view: wgpu::TextureView,
    depth: DepthTexture,
}

impl HeadlessGpu {
    /// Color format of the offscreen target. Linear, so read-back bytes are
    /// the shader's outputs quantized to 8 bits.
    pub const COLOR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8Unorm;

    pub async fn new(init: &GpuInit, width: u32, height: u32) -> Result<Self> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .context("no GPU adapter available for headless rendering")?;

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("cubit headless device"),
                required_features: init.required_features,
                required_limits: init.required_limits.clone(),
                experimental_features: wgpu::ExperimentalFeatures::disabled(),
                memory_hints: wgpu::MemoryHints::Performance,
                trace: wgpu::Trace::Off,
            })
            .await
            .context("failed to create headless device/queue")?;

        let color = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("cubit headless color"),
            size: wgpu::Extent3d {
                width: width.max(1),
                height: height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::COLOR_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::COPY_SRC,
            view_formats: &[],
        });
        let color_view = color.create_view(&wgpu::TextureViewDescriptor::default());
        let depth = DepthTexture::new(&device, width, height, init.depth_format);

        Ok(Self {
            device,
            queue,
            color,
            color_view,
            depth,
        })
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn color_view(&self) -> &wgpu::TextureView {
        &self.color_view
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        self.depth.view()
    }

    pub fn depth_format(&self) -> wgpu::TextureFormat {
        self.depth.format()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.color.width(), self.color.height())
    }

    /// Copies the color target back to the host as tightly packed RGBA rows,
    /// top row first. Blocks until the copy has landed.
    pub fn read_color(&self) -> Result<Vec<u8>> {
        const BYTES_PER_PIXEL: u32 = 4;
        let (width, height) = self.size();
        let unpadded = width * BYTES_PER_PIXEL;
        let align = wgpu::COPY_BYTES_PER_ROW_ALIGNMENT;
        let padded = unpadded.div_ceil(align) * align;

        let staging = self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("cubit headless readback"),
            size: u64::from(padded) * u64::from(height),
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("cubit headless readback encoder"),
            });
        encoder.copy_texture_to_buffer(
            wgpu::TexelCopyTextureInfo {
                texture: &self.color,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::TexelCopyBufferInfo {
                buffer: &staging,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded),
                    rows_per_image: Some(height),
                },
            },
            wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
        );
        self.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });

        // Map callbacks only fire while the device is polled.
        let deadline = Instant::now() + Duration::from_secs(10);
        let mapped = loop {
            if let Err(e) = self.device.poll(wgpu::PollType::Poll) {
                log::warn!("device poll failed: {e}");
            }
            match rx.try_recv() {
                Ok(res) => break res,
                Err(TryRecvError::Disconnected) => anyhow::bail!("readback callback dropped"),
                Err(TryRecvError::Empty) => {}
            }
            anyhow::ensure!(Instant::now() < deadline, "readback timed out");
            std::thread::sleep(Duration::from_millis(1));
        };
        mapped.context("failed to map readback buffer")?;

        let data = slice.get_mapped_range();
        let mut pixels = Vec::with_capacity((unpadded * height) as usize);
        for row in data.chunks(padded as usize) {
            pixels.extend_from_slice(&row[..unpadded as usize]);
        }
        drop(data);
        staging.unmap();
        Ok(pixels)
    }
}
