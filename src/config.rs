use crate::RadixSortConfigError;

/// The direction of the sorted keys.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortOrder {
    /// Non-decreasing keys.
    #[default]
    Ascending,
    /// Non-increasing keys.
    Descending,
}

/// The construction-time configuration of a [`RadixSorter`](crate::RadixSorter).
///
/// The configuration is fixed for the lifetime of the sorter, changing it
/// requires creating a new sorter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadixSortConfig {
    /// The maximum number of elements.
    pub capacity: u32,
    /// The number of key bits consumed by each pass.
    pub radix_bits: u32,
    /// The number of low key bits that are sorted.
    ///
    /// Bits above this width are ignored.
    pub key_bits: u32,
    /// The number of invocations in one workgroup.
    pub workgroup_size: u32,
    /// The number of elements each invocation handles in one block.
    pub elements_per_thread: u32,
    /// The direction of the sorted keys.
    pub order: SortOrder,
}

impl RadixSortConfig {
    /// The maximum radix bits, the shaders size their digit tables for this.
    pub const MAX_RADIX_BITS: u32 = 8;

    /// The maximum radix size.
    pub const MAX_RADIX_SIZE: u32 = 1 << Self::MAX_RADIX_BITS;

    /// The maximum key bits.
    pub const MAX_KEY_BITS: u32 = u32::BITS;

    /// The maximum workgroup size, the shaders size their row tables for this.
    pub const MAX_WORKGROUP_SIZE: u32 = 256;

    /// Create a new configuration with the default tuning.
    pub fn new(capacity: u32) -> Self {
        Self {
            capacity,
            radix_bits: 8,
            key_bits: 32,
            workgroup_size: 256,
            elements_per_thread: 4,
            order: SortOrder::Ascending,
        }
    }

    /// Set the order.
    pub fn with_order(mut self, order: SortOrder) -> Self {
        self.order = order;
        self
    }

    /// Validate the configuration against the device limits.
    pub fn validate(
        &self,
        limits: &wgpu::Limits,
    ) -> Result<RadixSortLayout, RadixSortConfigError> {
        if self.capacity == 0 {
            return Err(RadixSortConfigError::ZeroCapacity);
        }

        if !(1..=Self::MAX_RADIX_BITS).contains(&self.radix_bits) {
            return Err(RadixSortConfigError::RadixBitsOutOfRange {
                radix_bits: self.radix_bits,
                max: Self::MAX_RADIX_BITS,
            });
        }

        if !(1..=Self::MAX_KEY_BITS).contains(&self.key_bits) {
            return Err(RadixSortConfigError::KeyBitsOutOfRange {
                key_bits: self.key_bits,
                max: Self::MAX_KEY_BITS,
            });
        }

        if self.key_bits % self.radix_bits != 0 {
            return Err(RadixSortConfigError::RadixBitsNotDividingKeyBits {
                radix_bits: self.radix_bits,
                key_bits: self.key_bits,
            });
        }

        if !(1..=Self::MAX_WORKGROUP_SIZE).contains(&self.workgroup_size) {
            return Err(RadixSortConfigError::WorkgroupSizeOutOfRange {
                workgroup_size: self.workgroup_size,
                max: Self::MAX_WORKGROUP_SIZE,
            });
        }

        let device_workgroup_limit = limits
            .max_compute_invocations_per_workgroup
            .min(limits.max_compute_workgroup_size_x);
        if self.workgroup_size > device_workgroup_limit {
            return Err(RadixSortConfigError::WorkgroupSizeExceedsDeviceLimit {
                workgroup_size: self.workgroup_size,
                device_limit: device_workgroup_limit,
            });
        }

        if self.elements_per_thread == 0 {
            return Err(RadixSortConfigError::ZeroElementsPerThread);
        }

        let block_size = self
            .workgroup_size
            .checked_mul(self.elements_per_thread)
            .ok_or(RadixSortConfigError::BlockSizeOverflow {
                workgroup_size: self.workgroup_size,
                elements_per_thread: self.elements_per_thread,
            })?;

        let max_block_count = self.capacity.div_ceil(block_size);
        if max_block_count > limits.max_compute_workgroups_per_dimension {
            return Err(RadixSortConfigError::BlockCountExceedsDeviceLimit {
                block_count: max_block_count,
                device_limit: limits.max_compute_workgroups_per_dimension,
            });
        }

        let radix_size = 1 << self.radix_bits;
        let word_size = std::mem::size_of::<u32>() as wgpu::BufferAddress;
        let device_limit = limits.max_storage_buffer_binding_size;
        for (name, size) in [
            ("keys", self.capacity as wgpu::BufferAddress * word_size),
            (
                "histogram",
                radix_size as wgpu::BufferAddress
                    * max_block_count as wgpu::BufferAddress
                    * word_size,
            ),
        ] {
            if size > device_limit as wgpu::BufferAddress {
                return Err(RadixSortConfigError::BufferSizeExceedsDeviceLimit {
                    name,
                    size,
                    device_limit,
                });
            }
        }

        Ok(RadixSortLayout {
            capacity: self.capacity,
            radix_bits: self.radix_bits,
            radix_size,
            key_bits: self.key_bits,
            pass_count: self.key_bits / self.radix_bits,
            workgroup_size: self.workgroup_size,
            elements_per_thread: self.elements_per_thread,
            block_size,
            max_block_count,
            order: self.order,
        })
    }
}

/// The derived layout of a validated [`RadixSortConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RadixSortLayout {
    capacity: u32,
    radix_bits: u32,
    radix_size: u32,
    key_bits: u32,
    pass_count: u32,
    workgroup_size: u32,
    elements_per_thread: u32,
    block_size: u32,
    max_block_count: u32,
    order: SortOrder,
}

impl RadixSortLayout {
    /// Get the capacity.
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Get the radix bits.
    pub fn radix_bits(&self) -> u32 {
        self.radix_bits
    }

    /// Get the number of digit values, `2^radix_bits`.
    pub fn radix_size(&self) -> u32 {
        self.radix_size
    }

    /// Get the key bits.
    pub fn key_bits(&self) -> u32 {
        self.key_bits
    }

    /// Get the number of radix passes.
    pub fn pass_count(&self) -> u32 {
        self.pass_count
    }

    /// Get the workgroup size.
    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    /// Get the elements per thread.
    pub fn elements_per_thread(&self) -> u32 {
        self.elements_per_thread
    }

    /// Get the number of elements in one block.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Get the number of blocks at full capacity.
    pub fn max_block_count(&self) -> u32 {
        self.max_block_count
    }

    /// Get the order.
    pub fn order(&self) -> SortOrder {
        self.order
    }

    /// Get the number of histogram entries at full capacity.
    pub fn histogram_len(&self) -> u32 {
        self.radix_size * self.max_block_count
    }

    /// Get the number of blocks for a live count.
    ///
    /// Counts above the capacity are clamped, zero live elements give zero
    /// blocks.
    pub fn block_count(&self, live_count: u32) -> u32 {
        live_count.min(self.capacity).div_ceil(self.block_size)
    }

    /// Get the bit shift of the digit of a pass.
    pub fn pass_shift(&self, pass: u32) -> u32 {
        pass * self.radix_bits
    }

    /// Get the ping-pong slot read by a pass.
    pub fn read_slot(&self, pass: u32) -> usize {
        (pass % 2) as usize
    }

    /// Get the ping-pong slot written by a pass.
    pub fn write_slot(&self, pass: u32) -> usize {
        ((pass + 1) % 2) as usize
    }

    /// Get the ping-pong slot holding the result after the final pass.
    pub fn sorted_slot(&self) -> usize {
        self.read_slot(self.pass_count)
    }
}
