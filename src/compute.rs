use crate::{ComputeBundleCreateError, shader};

/// A compute pipeline together with the workgroup size it was built for.
#[derive(Debug)]
pub struct ComputeBundle {
    /// The label.
    label: String,
    /// The number of invocations in one workgroup.
    workgroup_size: u32,
    /// The compute pipeline.
    pipeline: wgpu::ComputePipeline,
}

impl ComputeBundle {
    /// Get the label.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Get the number of invocations in one workgroup.
    pub fn workgroup_size(&self) -> u32 {
        self.workgroup_size
    }

    /// Get the compute pipeline.
    pub fn pipeline(&self) -> &wgpu::ComputePipeline {
        &self.pipeline
    }

    /// Dispatch enough workgroups to cover `invocation_count` invocations.
    ///
    /// Nothing is recorded for zero invocations.
    pub fn dispatch<'a>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        invocation_count: u32,
        bind_groups: impl IntoIterator<Item = &'a wgpu::BindGroup>,
    ) {
        let workgroup_count = invocation_count.div_ceil(self.workgroup_size);
        if workgroup_count == 0 {
            return;
        }

        let mut pass = self.begin_pass(encoder, bind_groups);
        pass.dispatch_workgroups(workgroup_count, 1, 1);
    }

    /// Dispatch with the workgroup count read from `indirect_args` at `offset`.
    ///
    /// The args must have the layout of [`wgpu::util::DispatchIndirectArgs`].
    pub fn dispatch_indirect<'a>(
        &self,
        encoder: &mut wgpu::CommandEncoder,
        indirect_args: &wgpu::Buffer,
        offset: wgpu::BufferAddress,
        bind_groups: impl IntoIterator<Item = &'a wgpu::BindGroup>,
    ) {
        let mut pass = self.begin_pass(encoder, bind_groups);
        pass.dispatch_workgroups_indirect(indirect_args, offset);
    }

    /// Begin a compute pass with the pipeline and bind groups set.
    fn begin_pass<'a, 'e>(
        &self,
        encoder: &'e mut wgpu::CommandEncoder,
        bind_groups: impl IntoIterator<Item = &'a wgpu::BindGroup>,
    ) -> wgpu::ComputePass<'e> {
        let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
            label: Some(&format!("{} Compute Pass", self.label)),
            timestamp_writes: None,
        });

        pass.set_pipeline(&self.pipeline);
        for (i, bind_group) in bind_groups.into_iter().enumerate() {
            pass.set_bind_group(i as u32, bind_group, &[]);
        }

        pass
    }
}

/// The builder of [`ComputeBundle`].
///
/// The main shader is a module path of [`shader::PACKAGE`], the module must
/// declare `override WORKGROUP_SIZE: u32` when
/// [`ComputeBundleBuilder::workgroup_size`] is set.
#[derive(Debug, Default)]
pub struct ComputeBundleBuilder<'a> {
    label: Option<&'a str>,
    bind_group_layouts: Vec<&'a wgpu::BindGroupLayoutDescriptor<'a>>,
    entry_point: Option<&'a str>,
    main_shader: Option<&'a str>,
    workgroup_size: Option<u32>,
}

impl<'a> ComputeBundleBuilder<'a> {
    /// The workgroup size override constant.
    pub const WORKGROUP_SIZE_CONSTANT: &'static str = "WORKGROUP_SIZE";

    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label.
    pub fn label(mut self, label: &'a str) -> Self {
        self.label = Some(label);
        self
    }

    /// Add a bind group layout.
    pub fn bind_group_layout(mut self, layout: &'a wgpu::BindGroupLayoutDescriptor<'a>) -> Self {
        self.bind_group_layouts.push(layout);
        self
    }

    /// Set the entry point.
    pub fn entry_point(mut self, entry_point: &'a str) -> Self {
        self.entry_point = Some(entry_point);
        self
    }

    /// Set the main shader module path.
    pub fn main_shader(mut self, module_path: &'a str) -> Self {
        self.main_shader = Some(module_path);
        self
    }

    /// Set the workgroup size override.
    pub fn workgroup_size(mut self, workgroup_size: u32) -> Self {
        self.workgroup_size = Some(workgroup_size);
        self
    }

    /// Build the compute bundle.
    ///
    /// Without [`ComputeBundleBuilder::workgroup_size`], the bundle assumes a
    /// workgroup size of 1, matching kernels with a fixed `@workgroup_size`
    /// that are only dispatched by workgroup count.
    pub fn build(self, device: &wgpu::Device) -> Result<ComputeBundle, ComputeBundleCreateError> {
        let label = self
            .label
            .ok_or(ComputeBundleCreateError::MissingField("label"))?;
        let entry_point = self
            .entry_point
            .ok_or(ComputeBundleCreateError::MissingField("entry point"))?;
        let main_shader = self
            .main_shader
            .ok_or(ComputeBundleCreateError::MissingField("main shader"))?;

        log::debug!("Compiling {label} shader from {main_shader}");
        let source = shader::compile(main_shader).map_err(|message| {
            ComputeBundleCreateError::ShaderCompile {
                module: main_shader.to_string(),
                message,
            }
        })?;

        let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(&format!("{label} Shader")),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        log::debug!("Creating {label} pipeline layout");
        let bind_group_layouts = self
            .bind_group_layouts
            .iter()
            .map(|descriptor| device.create_bind_group_layout(descriptor))
            .collect::<Vec<_>>();
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} Pipeline Layout")),
            bind_group_layouts: &bind_group_layouts.iter().collect::<Vec<_>>(),
            push_constant_ranges: &[],
        });

        let constants = match self.workgroup_size {
            Some(workgroup_size) => vec![(Self::WORKGROUP_SIZE_CONSTANT, workgroup_size as f64)],
            None => Vec::new(),
        };

        log::debug!("Creating {label} pipeline");
        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some(&format!("{label} Pipeline")),
            layout: Some(&pipeline_layout),
            module: &module,
            entry_point: Some(entry_point),
            compilation_options: wgpu::PipelineCompilationOptions {
                constants: &constants,
                ..Default::default()
            },
            cache: None,
        });

        Ok(ComputeBundle {
            label: label.to_string(),
            workgroup_size: self.workgroup_size.unwrap_or(1),
            pipeline,
        })
    }
}
