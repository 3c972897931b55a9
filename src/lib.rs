mod buffer;
mod compute;
mod config;
mod error;
mod indirect_sizer;
mod preprocessor;
mod radix_sorter;
mod renderer;

pub mod key;
pub mod shader;

use glam::*;

pub use buffer::*;
pub use compute::*;
pub use config::*;
pub use error::*;
pub use indirect_sizer::*;
pub use key::{depth_from_key, depth_key};
pub use preprocessor::*;
pub use radix_sorter::*;
pub use renderer::*;

/// The depth sorted point viewer.
///
/// Every frame is recorded into one command encoder, the live count produced
/// by the preprocessor stays on the GPU until the indirect draw consumes it.
#[derive(Debug)]
pub struct Viewer {
    pub camera_buffer: CameraBuffer,
    pub points_buffer: PointsBuffer,

    pub preprocessor: Preprocessor,
    pub radix_sorter: RadixSorter,
    pub indirect_sizer: IndirectSizer,
    pub renderer: Renderer,
}

impl Viewer {
    /// Create a new viewer.
    ///
    /// The sorter capacity of `config` must fit all `points`.
    pub fn new(
        device: &wgpu::Device,
        texture_format: wgpu::TextureFormat,
        points: &[PointPod],
        config: &RadixSortConfig,
    ) -> Result<Self, ViewerCreateError> {
        log::debug!("Creating camera buffer");
        let camera_buffer = CameraBuffer::new(device);

        log::debug!("Creating points buffer");
        let points_buffer = PointsBuffer::new(device, points);

        log::debug!("Creating radix sorter");
        let radix_sorter = RadixSorter::new(device, config)?;

        log::debug!("Creating preprocessor");
        let preprocessor = Preprocessor::new(device, &camera_buffer, &points_buffer, &radix_sorter)?;

        log::debug!("Creating indirect sizer");
        let indirect_sizer = IndirectSizer::new(device, Renderer::VERTICES_PER_POINT);

        log::debug!("Creating renderer");
        let renderer = Renderer::new(
            device,
            texture_format,
            &camera_buffer,
            &points_buffer,
            radix_sorter.sorted_indices(),
        )?;

        log::info!("Viewer created");

        Ok(Self {
            camera_buffer,
            points_buffer,

            preprocessor,
            radix_sorter,
            indirect_sizer,
            renderer,
        })
    }

    /// Update the camera.
    pub fn update_camera(&mut self, queue: &wgpu::Queue, view: Mat4, proj: Mat4, texture_size: UVec2) {
        self.camera_buffer.update(queue, view, proj, texture_size);
    }

    /// Render the viewer.
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, texture_view: &wgpu::TextureView) {
        self.radix_sorter.reset(encoder);
        self.indirect_sizer.reset(encoder);

        self.preprocessor
            .preprocess(encoder, self.points_buffer.len() as u32);

        self.radix_sorter.sort(encoder);

        self.indirect_sizer
            .size(encoder, self.radix_sorter.info_buffer());

        self.renderer
            .render(encoder, texture_view, self.indirect_sizer.draw_args());
    }
}
