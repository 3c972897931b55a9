use crate::{
    CameraBuffer, ComputeBundle, ComputeBundleBuilder, PointsBuffer, PreprocessorCreateError,
    RadixSorter, SortBufferPair, SortInfoBuffer, buffer::BufferWrapper,
};

/// Preprocessor to generate the sort keys of the points.
///
/// It frustum culls the points, then appends the depth key and the index of
/// each visible point into the input slot of [`RadixSorter`], counting them in
/// the live count. Appends beyond the capacity are dropped.
#[derive(Debug)]
pub struct Preprocessor {
    /// The bind group layout.
    #[allow(dead_code)]
    bind_group_layout: wgpu::BindGroupLayout,
    /// The bind group.
    bind_group: wgpu::BindGroup,
    /// The preprocess bundle.
    bundle: ComputeBundle,
}

impl Preprocessor {
    /// The label.
    const LABEL: &str = "Preprocessor";

    /// The main shader module path.
    const MAIN_SHADER: &str = "wgpu_3dgs_sort::preprocess";

    /// The bind group layout descriptor.
    pub const BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Preprocessor Bind Group Layout"),
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Points storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Sort info storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input keys storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 4,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        };

    /// Create a new preprocessor.
    pub fn new(
        device: &wgpu::Device,
        camera: &CameraBuffer,
        points: &PointsBuffer,
        radix_sorter: &RadixSorter,
    ) -> Result<Self, PreprocessorCreateError> {
        if (device.limits().max_storage_buffer_binding_size as wgpu::BufferAddress)
            < points.buffer().size()
        {
            return Err(PreprocessorCreateError::PointsSizeExceedsDeviceLimit {
                points_size: points.buffer().size(),
                device_limit: device.limits().max_storage_buffer_binding_size,
            });
        }

        let point_count = points.len() as u32;
        if point_count > radix_sorter.capacity() {
            return Err(PreprocessorCreateError::PointCountExceedsCapacity {
                point_count,
                capacity: radix_sorter.capacity(),
            });
        }

        log::debug!("Creating preprocessor bind group layout");
        let bind_group_layout =
            device.create_bind_group_layout(&Self::BIND_GROUP_LAYOUT_DESCRIPTOR);

        log::debug!("Creating preprocessor bind group");
        let bind_group = Self::create_bind_group_static(
            device,
            &bind_group_layout,
            camera,
            points,
            radix_sorter.info_buffer(),
            radix_sorter.input(),
        );

        let bundle = ComputeBundleBuilder::new()
            .label(Self::LABEL)
            .bind_group_layout(&Self::BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("main")
            .main_shader(Self::MAIN_SHADER)
            .workgroup_size(radix_sorter.layout().workgroup_size())
            .build(device)?;

        log::info!("Preprocessor created");

        Ok(Self {
            bind_group_layout,
            bind_group,
            bundle,
        })
    }

    /// Get the number of invocations in one workgroup.
    pub fn workgroup_size(&self) -> u32 {
        self.bundle.workgroup_size()
    }

    /// Preprocess the points.
    ///
    /// [`RadixSorter::reset`] must be recorded before this.
    pub fn preprocess(&self, encoder: &mut wgpu::CommandEncoder, point_count: u32) {
        self.bundle
            .dispatch(encoder, point_count, [&self.bind_group]);
    }

    /// Create the bind group statically.
    fn create_bind_group_static(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        camera: &CameraBuffer,
        points: &PointsBuffer,
        info: &SortInfoBuffer,
        input: &SortBufferPair,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Preprocessor Bind Group"),
            layout: bind_group_layout,
            entries: &[
                // Camera uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera.buffer().as_entire_binding(),
                },
                // Points storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: points.buffer().as_entire_binding(),
                },
                // Sort info storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: info.buffer().as_entire_binding(),
                },
                // Input keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: input.keys().buffer().as_entire_binding(),
                },
                // Input indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: input.indices().buffer().as_entire_binding(),
                },
            ],
        })
    }
}
