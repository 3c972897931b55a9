use bytemuck::Zeroable;
use wgpu::util::DeviceExt;

use crate::{
    FixedSizeBufferWrapperError, RadixSortConfig, RadixSortLayout, SortOrder,
    buffer::{BufferWrapper, FixedSizeBufferWrapper},
};

/// The sort control storage buffer.
///
/// Holds the live count appended by the key generator, and the clamped count
/// and block count derived from it by [`RadixSorter`](crate::RadixSorter).
#[derive(Debug, Clone)]
pub struct SortInfoBuffer(wgpu::Buffer);

impl SortInfoBuffer {
    /// The byte offset of [`SortInfoPod::live_count`].
    pub const LIVE_COUNT_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(SortInfoPod, live_count) as wgpu::BufferAddress;

    /// The byte offset of [`SortInfoPod::sort_count`].
    pub const SORT_COUNT_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(SortInfoPod, sort_count) as wgpu::BufferAddress;

    /// The byte size of the per-frame fields, everything before [`SortInfoPod::capacity`].
    const FRAME_FIELDS_SIZE: wgpu::BufferAddress =
        std::mem::offset_of!(SortInfoPod, capacity) as wgpu::BufferAddress;

    /// Create a new sort info buffer.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sort Info Buffer"),
            contents: bytemuck::bytes_of(&SortInfoPod::new(capacity)),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }

    /// Zero the per-frame fields, the capacity is kept.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.0, 0, Some(Self::FRAME_FIELDS_SIZE));
    }

    /// Write the raw live count from the host.
    pub fn write_live_count(&self, queue: &wgpu::Queue, live_count: u32) {
        queue.write_buffer(
            &self.0,
            Self::LIVE_COUNT_OFFSET,
            bytemuck::bytes_of(&live_count),
        );
    }
}

impl BufferWrapper for SortInfoBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortInfoBuffer> for wgpu::Buffer {
    fn from(wrapper: SortInfoBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for SortInfoBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for SortInfoBuffer {
    type Pod = SortInfoPod;
}

/// The POD representation of the sort control state.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SortInfoPod {
    /// The raw number of appends by the key generator, may exceed the capacity.
    pub live_count: u32,
    /// The live count clamped to the capacity.
    pub sort_count: u32,
    /// The number of blocks covering the clamped count.
    pub block_count: u32,
    /// The capacity, written once at creation.
    pub capacity: u32,
}

impl SortInfoPod {
    /// Create a new sort info with no live elements.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            ..Self::zeroed()
        }
    }

    /// Check if the key generator appended more elements than the capacity.
    pub fn is_over_capacity(&self) -> bool {
        self.live_count > self.capacity
    }
}

/// The dispatch indirect args storage buffer for the passes of [`RadixSorter`](crate::RadixSorter).
///
/// Written every frame by the sort control kernel from the live count.
#[derive(Debug, Clone)]
pub struct SortDispatchArgsBuffer(wgpu::Buffer);

impl SortDispatchArgsBuffer {
    /// The byte offset of [`SortDispatchArgsPod::blocks`].
    pub const BLOCKS_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(SortDispatchArgsPod, blocks) as wgpu::BufferAddress;

    /// The byte offset of [`SortDispatchArgsPod::block_scan`].
    pub const BLOCK_SCAN_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(SortDispatchArgsPod, block_scan) as wgpu::BufferAddress;

    /// The byte offset of [`SortDispatchArgsPod::digit_scan`].
    pub const DIGIT_SCAN_OFFSET: wgpu::BufferAddress =
        std::mem::offset_of!(SortDispatchArgsPod, digit_scan) as wgpu::BufferAddress;

    /// Create a new sort dispatch args buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sort Dispatch Args Buffer"),
            contents: bytemuck::bytes_of(&SortDispatchArgsPod::zeroed()),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }

    /// Zero every dispatch size.
    pub fn reset(&self, encoder: &mut wgpu::CommandEncoder) {
        encoder.clear_buffer(&self.0, 0, None);
    }
}

impl BufferWrapper for SortDispatchArgsBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::STORAGE.bits()
            | wgpu::BufferUsages::INDIRECT.bits()
            | wgpu::BufferUsages::COPY_SRC.bits()
            | wgpu::BufferUsages::COPY_DST.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortDispatchArgsBuffer> for wgpu::Buffer {
    fn from(wrapper: SortDispatchArgsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for SortDispatchArgsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for SortDispatchArgsBuffer {
    type Pod = SortDispatchArgsPod;
}

/// The POD representation of the sort dispatch sizes.
///
/// Each field has the layout of [`wgpu::util::DispatchIndirectArgs`].
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SortDispatchArgsPod {
    /// One workgroup per block, for the histogram and scatter passes.
    pub blocks: [u32; 3],
    /// One workgroup per digit, for the block offsets scan.
    pub block_scan: [u32; 3],
    /// A single workgroup for the digit offsets scan.
    pub digit_scan: [u32; 3],
}

/// The sort keys storage buffer.
#[derive(Debug, Clone)]
pub struct SortKeysBuffer(wgpu::Buffer);

impl SortKeysBuffer {
    /// Create a new sort keys buffer.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sort Keys Buffer"),
            size: (capacity as usize * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    /// Get the number of key slots.
    pub fn len(&self) -> usize {
        self.0.size() as usize / std::mem::size_of::<u32>()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferWrapper for SortKeysBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortKeysBuffer> for wgpu::Buffer {
    fn from(wrapper: SortKeysBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for SortKeysBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// The sort indices storage buffer.
///
/// After [`RadixSorter::sort`](crate::RadixSorter::sort), the buffer in the
/// sorted slot holds the permutation read by [`Renderer`](crate::Renderer).
#[derive(Debug, Clone)]
pub struct SortIndicesBuffer(wgpu::Buffer);

impl SortIndicesBuffer {
    /// Create a new sort indices buffer.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Sort Indices Buffer"),
            size: (capacity as usize * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }

    /// Get the number of index slots.
    pub fn len(&self) -> usize {
        self.0.size() as usize / std::mem::size_of::<u32>()
    }

    /// Check if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl BufferWrapper for SortIndicesBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<SortIndicesBuffer> for wgpu::Buffer {
    fn from(wrapper: SortIndicesBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for SortIndicesBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// One slot of the ping-pong pair, a key array and its index array.
#[derive(Debug, Clone)]
pub struct SortBufferPair {
    keys: SortKeysBuffer,
    indices: SortIndicesBuffer,
}

impl SortBufferPair {
    /// Create a new buffer pair.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        Self {
            keys: SortKeysBuffer::new(device, capacity),
            indices: SortIndicesBuffer::new(device, capacity),
        }
    }

    /// Get the keys.
    pub fn keys(&self) -> &SortKeysBuffer {
        &self.keys
    }

    /// Get the indices.
    pub fn indices(&self) -> &SortIndicesBuffer {
        &self.indices
    }
}

/// The two physical slots the radix passes alternate between.
///
/// Slot 0 is the key generator's input slot. Pass `k` reads slot `k % 2` and
/// writes the other one.
#[derive(Debug, Clone)]
pub struct SortPingPong([SortBufferPair; 2]);

impl SortPingPong {
    /// Create a new ping-pong pair.
    pub fn new(device: &wgpu::Device, capacity: u32) -> Self {
        Self([
            SortBufferPair::new(device, capacity),
            SortBufferPair::new(device, capacity),
        ])
    }

    /// Get a slot.
    ///
    /// Panics if `slot` is not 0 or 1.
    pub fn slot(&self, slot: usize) -> &SortBufferPair {
        &self.0[slot]
    }

    /// Get the input slot written by the key generator.
    pub fn input(&self) -> &SortBufferPair {
        &self.0[0]
    }
}

/// The radix histogram storage buffer.
///
/// Laid out digit-major, `histogram[digit * block_count + block]`.
#[derive(Debug, Clone)]
pub struct HistogramBuffer(wgpu::Buffer);

impl HistogramBuffer {
    /// Create a new histogram buffer.
    pub fn new(device: &wgpu::Device, len: u32) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Histogram Buffer"),
            size: (len as usize * std::mem::size_of::<u32>()) as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for HistogramBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<HistogramBuffer> for wgpu::Buffer {
    fn from(wrapper: HistogramBuffer) -> Self {
        wrapper.0
    }
}

impl From<wgpu::Buffer> for HistogramBuffer {
    fn from(buffer: wgpu::Buffer) -> Self {
        Self(buffer)
    }
}

/// The digit totals and digit offsets storage buffer.
#[derive(Debug, Clone)]
pub struct DigitOffsetsBuffer(wgpu::Buffer);

impl DigitOffsetsBuffer {
    /// Create a new digit offsets buffer.
    pub fn new(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("Digit Offsets Buffer"),
            size: std::mem::size_of::<DigitOffsetsPod>() as wgpu::BufferAddress,
            usage: Self::DEFAULT_USAGES,
            mapped_at_creation: false,
        });

        Self(buffer)
    }
}

impl BufferWrapper for DigitOffsetsBuffer {
    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<DigitOffsetsBuffer> for wgpu::Buffer {
    fn from(wrapper: DigitOffsetsBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for DigitOffsetsBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for DigitOffsetsBuffer {
    type Pod = DigitOffsetsPod;
}

/// The POD representation of the digit totals and offsets of one pass.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DigitOffsetsPod {
    /// The number of live elements with each digit.
    pub totals: [u32; RadixSortConfig::MAX_RADIX_SIZE as usize],
    /// The exclusive prefix sum of [`DigitOffsetsPod::totals`].
    pub offsets: [u32; RadixSortConfig::MAX_RADIX_SIZE as usize],
}

/// The radix pass uniform buffer.
#[derive(Debug, Clone)]
pub struct RadixPassBuffer(wgpu::Buffer);

impl RadixPassBuffer {
    /// Create a new radix pass buffer.
    pub fn new(device: &wgpu::Device, pod: &RadixPassPod) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Radix Pass Buffer"),
            contents: bytemuck::bytes_of(pod),
            usage: Self::DEFAULT_USAGES,
        });

        Self(buffer)
    }
}

impl BufferWrapper for RadixPassBuffer {
    const DEFAULT_USAGES: wgpu::BufferUsages = wgpu::BufferUsages::from_bits_retain(
        wgpu::BufferUsages::UNIFORM.bits() | wgpu::BufferUsages::COPY_DST.bits(),
    );

    fn buffer(&self) -> &wgpu::Buffer {
        &self.0
    }
}

impl From<RadixPassBuffer> for wgpu::Buffer {
    fn from(wrapper: RadixPassBuffer) -> Self {
        wrapper.0
    }
}

impl TryFrom<wgpu::Buffer> for RadixPassBuffer {
    type Error = FixedSizeBufferWrapperError;

    fn try_from(buffer: wgpu::Buffer) -> Result<Self, Self::Error> {
        Self::verify_buffer_size(&buffer).map(|()| Self(buffer))
    }
}

impl FixedSizeBufferWrapper for RadixPassBuffer {
    type Pod = RadixPassPod;
}

/// The POD representation of the parameters of one radix pass.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RadixPassPod {
    pub shift: u32,
    pub radix_bits: u32,
    pub radix_size: u32,
    /// Non-zero for [`SortOrder::Descending`].
    pub descending: u32,
    pub block_size: u32,
    pub elements_per_thread: u32,
}

impl RadixPassPod {
    /// Create the parameters of a pass.
    pub fn new(layout: &RadixSortLayout, pass: u32) -> Self {
        Self {
            shift: layout.pass_shift(pass),
            radix_bits: layout.radix_bits(),
            radix_size: layout.radix_size(),
            descending: (layout.order() == SortOrder::Descending) as u32,
            block_size: layout.block_size(),
            elements_per_thread: layout.elements_per_thread(),
        }
    }

    /// Get the digit of a key in this pass, mirroring the shader.
    pub fn digit(&self, key: u32) -> u32 {
        let digit = (key >> self.shift) & (self.radix_size - 1);
        match self.descending {
            0 => digit,
            _ => self.radix_size - 1 - digit,
        }
    }
}
