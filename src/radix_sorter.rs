use crate::{
    ComputeBundle, ComputeBundleBuilder, DigitOffsetsBuffer, Error, HistogramBuffer,
    RadixPassBuffer, RadixPassPod, RadixSortConfig, RadixSortLayout, RadixSorterCreateError,
    SortBufferPair, SortDispatchArgsBuffer, SortIndicesBuffer, SortInfoBuffer, SortInfoPod,
    SortKeysBuffer, SortPingPong,
    buffer::{BufferWrapper, FixedSizeBufferWrapper},
};

/// GPU radix sorter of `(key, index)` pairs.
///
/// The number of live pairs is only known on the GPU. It is appended by the
/// key generator into [`SortInfoBuffer`], then a control kernel clamps it to the
/// capacity and writes the dispatch sizes of every pass into
/// [`SortDispatchArgsBuffer`], so recording a sort never waits on the GPU.
///
/// The sort is a least significant digit radix sort. Each pass is a stable
/// partition on one digit and runs four stages:
/// 1. Histogram, one workgroup per block counts the digits of its block.
/// 2. Block scan, one workgroup per digit turns the block counts into block
///    offsets and writes the digit total.
/// 3. Digit scan, a single workgroup turns the digit totals into digit offsets.
/// 4. Scatter, one workgroup per block moves its pairs to the other ping-pong
///    slot.
#[derive(Debug)]
pub struct RadixSorter {
    /// The validated layout.
    layout: RadixSortLayout,
    /// The sort info buffer.
    info: SortInfoBuffer,
    /// The sort dispatch args buffer.
    dispatch_args: SortDispatchArgsBuffer,
    /// The ping-pong key and index buffers.
    ping_pong: SortPingPong,
    /// The histogram buffer.
    #[allow(dead_code)]
    histogram: HistogramBuffer,
    /// The digit offsets buffer.
    #[allow(dead_code)]
    digit_offsets: DigitOffsetsBuffer,
    /// The radix pass buffers, one per pass.
    pass_buffers: Vec<RadixPassBuffer>,
    /// The control bind group layout.
    #[allow(dead_code)]
    control_bind_group_layout: wgpu::BindGroupLayout,
    /// The control bind group.
    control_bind_group: wgpu::BindGroup,
    /// The pass bind group layout.
    #[allow(dead_code)]
    pass_bind_group_layout: wgpu::BindGroupLayout,
    /// The pass bind groups, one per pass.
    pass_bind_groups: Vec<wgpu::BindGroup>,
    /// The control bundle.
    control_bundle: ComputeBundle,
    /// The histogram bundle.
    histogram_bundle: ComputeBundle,
    /// The block scan bundle.
    block_scan_bundle: ComputeBundle,
    /// The digit scan bundle.
    digit_scan_bundle: ComputeBundle,
    /// The scatter bundle.
    scatter_bundle: ComputeBundle,
}

impl RadixSorter {
    /// The control bind group layout descriptor.
    pub const CONTROL_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Radix Sort Control Bind Group Layout"),
            entries: &[
                // Radix pass uniform buffer
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
                // Sort info storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Sort dispatch args storage buffer
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
            ],
        };

    /// The pass bind group layout descriptor.
    ///
    /// The sort dispatch args buffer is absent, it is the indirect buffer of
    /// every pass dispatch.
    pub const PASS_BIND_GROUP_LAYOUT_DESCRIPTOR: wgpu::BindGroupLayoutDescriptor<'static> =
        wgpu::BindGroupLayoutDescriptor {
            label: Some("Radix Sort Pass Bind Group Layout"),
            entries: &[
                // Radix pass uniform buffer
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
                // Sort info storage buffer
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
                // Input keys storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Input indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Output keys storage buffer
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
                // Output indices storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Histogram storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 6,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                // Digit offsets storage buffer
                wgpu::BindGroupLayoutEntry {
                    binding: 7,
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

    /// Create a new radix sorter.
    pub fn new(device: &wgpu::Device, config: &RadixSortConfig) -> Result<Self, RadixSorterCreateError> {
        let layout = config.validate(&device.limits())?;

        log::debug!(
            "Creating radix sorter buffers for {} elements in {} passes",
            layout.capacity(),
            layout.pass_count()
        );
        let info = SortInfoBuffer::new(device, layout.capacity());
        let dispatch_args = SortDispatchArgsBuffer::new(device);
        let ping_pong = SortPingPong::new(device, layout.capacity());
        let histogram = HistogramBuffer::new(device, layout.histogram_len());
        let digit_offsets = DigitOffsetsBuffer::new(device);
        let pass_buffers = (0..layout.pass_count())
            .map(|pass| RadixPassBuffer::new(device, &RadixPassPod::new(&layout, pass)))
            .collect::<Vec<_>>();

        log::debug!("Creating radix sort control bind group layout");
        let control_bind_group_layout =
            device.create_bind_group_layout(&Self::CONTROL_BIND_GROUP_LAYOUT_DESCRIPTOR);

        log::debug!("Creating radix sort control bind group");
        let control_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Radix Sort Control Bind Group"),
            layout: &control_bind_group_layout,
            entries: &[
                // Radix pass uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: pass_buffers[0].buffer().as_entire_binding(),
                },
                // Sort info storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: info.buffer().as_entire_binding(),
                },
                // Sort dispatch args storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: dispatch_args.buffer().as_entire_binding(),
                },
            ],
        });

        log::debug!("Creating radix sort pass bind group layout");
        let pass_bind_group_layout =
            device.create_bind_group_layout(&Self::PASS_BIND_GROUP_LAYOUT_DESCRIPTOR);

        log::debug!("Creating radix sort pass bind groups");
        let pass_bind_groups = (0..layout.pass_count())
            .map(|pass| {
                Self::create_pass_bind_group(
                    device,
                    &pass_bind_group_layout,
                    &pass_buffers[pass as usize],
                    &info,
                    ping_pong.slot(layout.read_slot(pass)),
                    ping_pong.slot(layout.write_slot(pass)),
                    &histogram,
                    &digit_offsets,
                )
            })
            .collect::<Vec<_>>();

        log::debug!("Creating radix sort control bundle");
        let control_bundle = ComputeBundleBuilder::new()
            .label("Radix Sort Control")
            .bind_group_layout(&Self::CONTROL_BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("main")
            .main_shader("wgpu_3dgs_sort::sort::control")
            .build(device)?;

        log::debug!("Creating radix sort histogram bundle");
        let histogram_bundle = ComputeBundleBuilder::new()
            .label("Radix Sort Histogram")
            .bind_group_layout(&Self::PASS_BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("main")
            .main_shader("wgpu_3dgs_sort::sort::histogram")
            .workgroup_size(layout.workgroup_size())
            .build(device)?;

        log::debug!("Creating radix sort block scan bundle");
        let block_scan_bundle = ComputeBundleBuilder::new()
            .label("Radix Sort Block Scan")
            .bind_group_layout(&Self::PASS_BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("scan_blocks")
            .main_shader("wgpu_3dgs_sort::sort::prefix")
            .workgroup_size(layout.workgroup_size())
            .build(device)?;

        log::debug!("Creating radix sort digit scan bundle");
        let digit_scan_bundle = ComputeBundleBuilder::new()
            .label("Radix Sort Digit Scan")
            .bind_group_layout(&Self::PASS_BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("scan_digits")
            .main_shader("wgpu_3dgs_sort::sort::prefix")
            .workgroup_size(layout.workgroup_size())
            .build(device)?;

        log::debug!("Creating radix sort scatter bundle");
        let scatter_bundle = ComputeBundleBuilder::new()
            .label("Radix Sort Scatter")
            .bind_group_layout(&Self::PASS_BIND_GROUP_LAYOUT_DESCRIPTOR)
            .entry_point("main")
            .main_shader("wgpu_3dgs_sort::sort::scatter")
            .workgroup_size(layout.workgroup_size())
            .build(device)?;

        log::info!("Radix sorter created");

        Ok(Self {
            layout,
            info,
            dispatch_args,
            ping_pong,
            histogram,
            digit_offsets,
            pass_buffers,
            control_bind_group_layout,
            control_bind_group,
            pass_bind_group_layout,
            pass_bind_groups,
            control_bundle,
            histogram_bundle,
            block_scan_bundle,
            digit_scan_bundle,
            scatter_bundle,
        })
    }

    /// Get the validated layout.
    pub fn layout(&self) -> &RadixSortLayout {
        &self.layout
    }

    /// Get the capacity.
    pub fn capacity(&self) -> u32 {
        self.layout.capacity()
    }

    /// Get the sort info buffer.
    pub fn info_buffer(&self) -> &SortInfoBuffer {
        &self.info
    }

    /// Get the sort dispatch args buffer.
    pub fn dispatch_args_buffer(&self) -> &SortDispatchArgsBuffer {
        &self.dispatch_args
    }

    /// Get the ping-pong buffers.
    pub fn ping_pong(&self) -> &SortPingPong {
        &self.ping_pong
    }

    /// Get the input slot written by the key generator.
    pub fn input(&self) -> &SortBufferPair {
        self.ping_pong.input()
    }

    /// Get the keys buffer holding the sorted keys after [`RadixSorter::sort`].
    pub fn sorted_keys(&self) -> &SortKeysBuffer {
        self.ping_pong.slot(self.layout.sorted_slot()).keys()
    }

    /// Get the indices buffer holding the sorted indices after [`RadixSorter::sort`].
    pub fn sorted_indices(&self) -> &SortIndicesBuffer {
        self.ping_pong.slot(self.layout.sorted_slot()).indices()
    }

    /// Get the radix pass buffers.
    pub fn pass_buffers(&self) -> &[RadixPassBuffer] {
        &self.pass_buffers
    }

    /// Reset the live count and the dispatch sizes for a new frame.
    ///
    /// Must be recorded before the key generator of the frame.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        self.info.reset(encoder);
        self.dispatch_args.reset(encoder);
    }

    /// Sort the live pairs of the input slot.
    ///
    /// Only the first `min(live_count, capacity)` slots are read and written.
    /// Returns the buffer holding the sorted indices.
    pub fn sort(&self, encoder: &mut wgpu::CommandEncoder) -> &SortIndicesBuffer {
        self.control_bundle
            .dispatch(encoder, 1, [&self.control_bind_group]);

        let args = self.dispatch_args.buffer();
        for bind_group in &self.pass_bind_groups {
            self.histogram_bundle.dispatch_indirect(
                encoder,
                args,
                SortDispatchArgsBuffer::BLOCKS_OFFSET,
                [bind_group],
            );
            self.block_scan_bundle.dispatch_indirect(
                encoder,
                args,
                SortDispatchArgsBuffer::BLOCK_SCAN_OFFSET,
                [bind_group],
            );
            self.digit_scan_bundle.dispatch_indirect(
                encoder,
                args,
                SortDispatchArgsBuffer::DIGIT_SCAN_OFFSET,
                [bind_group],
            );
            self.scatter_bundle.dispatch_indirect(
                encoder,
                args,
                SortDispatchArgsBuffer::BLOCKS_OFFSET,
                [bind_group],
            );
        }

        self.sorted_indices()
    }

    /// Upload pairs from the host into the input slot and set the live count.
    ///
    /// This replaces [`RadixSorter::reset`] and the key generator for a frame,
    /// do not record a reset in the same submission, it would clear the live
    /// count written here. Pairs beyond the capacity are dropped while the raw
    /// live count is kept, the same as an overflowing key generator.
    pub fn upload(&self, queue: &wgpu::Queue, keys: &[u32], indices: &[u32]) {
        if keys.len() != indices.len() {
            log::error!(
                "Keys and indices count mismatch, {} keys but {} indices were provided",
                keys.len(),
                indices.len()
            );
            return;
        }

        let live_count = keys.len() as u32;
        if live_count > self.capacity() {
            log::warn!(
                "Uploading {live_count} pairs into a sorter with capacity {}, the excess is dropped",
                self.capacity()
            );
        }

        let written = keys.len().min(self.capacity() as usize);
        if written > 0 {
            let input = self.input();
            queue.write_buffer(
                input.keys().buffer(),
                0,
                bytemuck::cast_slice(&keys[..written]),
            );
            queue.write_buffer(
                input.indices().buffer(),
                0,
                bytemuck::cast_slice(&indices[..written]),
            );
        }

        self.info.write_live_count(queue, live_count);
    }

    /// Download the sort info.
    ///
    /// This is a diagnostic readback and waits on the device. A live count over
    /// the capacity is logged as a warning.
    pub async fn download_info(
        &self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
    ) -> Result<SortInfoPod, Error> {
        let info = self.info.download_pod(device, queue).await?;

        if info.is_over_capacity() {
            log::warn!(
                "Key generator appended {} elements into a sorter with capacity {}, {} were dropped",
                info.live_count,
                info.capacity,
                info.live_count - info.capacity
            );
        }

        Ok(info)
    }

    /// Create the bind group of a pass.
    #[allow(clippy::too_many_arguments)]
    fn create_pass_bind_group(
        device: &wgpu::Device,
        bind_group_layout: &wgpu::BindGroupLayout,
        pass_buffer: &RadixPassBuffer,
        info: &SortInfoBuffer,
        input: &SortBufferPair,
        output: &SortBufferPair,
        histogram: &HistogramBuffer,
        digit_offsets: &DigitOffsetsBuffer,
    ) -> wgpu::BindGroup {
        device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Radix Sort Pass Bind Group"),
            layout: bind_group_layout,
            entries: &[
                // Radix pass uniform buffer
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: pass_buffer.buffer().as_entire_binding(),
                },
                // Sort info storage buffer
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: info.buffer().as_entire_binding(),
                },
                // Input keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: input.keys().buffer().as_entire_binding(),
                },
                // Input indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: input.indices().buffer().as_entire_binding(),
                },
                // Output keys storage buffer
                wgpu::BindGroupEntry {
                    binding: 4,
                    resource: output.keys().buffer().as_entire_binding(),
                },
                // Output indices storage buffer
                wgpu::BindGroupEntry {
                    binding: 5,
                    resource: output.indices().buffer().as_entire_binding(),
                },
                // Histogram storage buffer
                wgpu::BindGroupEntry {
                    binding: 6,
                    resource: histogram.buffer().as_entire_binding(),
                },
                // Digit offsets storage buffer
                wgpu::BindGroupEntry {
                    binding: 7,
                    resource: digit_offsets.buffer().as_entire_binding(),
                },
            ],
        })
    }
}
