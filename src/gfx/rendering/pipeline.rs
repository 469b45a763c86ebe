//! The viewer's forward pipeline.
//!
//! One pipeline draws every mesh: lit, untextured, depth tested and
//! multisampled when the surface format supports it.

use wgpu::*;

use crate::gfx::scene::vertex::Vertex3D;

/// Samples per pixel when the surface format can resolve them
pub const MSAA_SAMPLES: u32 = 4;

/// Settings the viewer pipeline is built from
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub label: String,
    pub bind_group_layouts: Vec<BindGroupLayout>,
    pub cull_mode: Option<Face>,
    pub depth_format: Option<TextureFormat>,
    pub color_target: ColorTargetState,
    pub multisample: MultisampleState,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            label: "Viewer Pipeline".to_string(),
            bind_group_layouts: Vec::new(),
            cull_mode: Some(Face::Back),
            depth_format: None,
            color_target: ColorTargetState {
                format: TextureFormat::Bgra8Unorm,
                blend: Some(BlendState::REPLACE),
                write_mask: ColorWrites::ALL,
            },
            multisample: MultisampleState::default(),
        }
    }
}

impl PipelineConfig {
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn with_cull_mode(mut self, face: Option<Face>) -> Self {
        self.cull_mode = face;
        self
    }

    /// Sets all bind group layouts at once, in slot order
    pub fn with_bind_group_layouts(mut self, layouts: Vec<BindGroupLayout>) -> Self {
        self.bind_group_layouts = layouts;
        self
    }

    /// Enables depth testing against a buffer of the given format
    pub fn with_depth_format(mut self, format: TextureFormat) -> Self {
        self.depth_format = Some(format);
        self
    }

    pub fn with_color_target(mut self, target: ColorTargetState) -> Self {
        self.color_target = target;
        self
    }

    pub fn with_sample_count(mut self, count: u32) -> Self {
        self.multisample.count = count.max(1);
        self
    }

    pub fn sample_count(&self) -> u32 {
        self.multisample.count
    }
}

/// Picks [`MSAA_SAMPLES`] when the format can be multisampled and resolved,
/// single sampling otherwise
pub fn sample_count_for(flags: TextureFormatFeatureFlags) -> u32 {
    if flags.sample_count_supported(MSAA_SAMPLES)
        && flags.contains(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE)
    {
        MSAA_SAMPLES
    } else {
        1
    }
}

/// Compiles `shader_source` and builds the pipeline described by `config`.
/// The shader must provide `vs_main` and `fs_main`.
pub fn create_pipeline(
    device: &Device,
    shader_source: &str,
    config: &PipelineConfig,
) -> RenderPipeline {
    let shader = device.create_shader_module(ShaderModuleDescriptor {
        label: Some(&config.label),
        source: ShaderSource::Wgsl(shader_source.into()),
    });

    let bind_group_layout_refs: Vec<&BindGroupLayout> =
        config.bind_group_layouts.iter().collect();
    let pipeline_layout = device.create_pipeline_layout(&PipelineLayoutDescriptor {
        label: Some(&format!("{} Layout", config.label)),
        bind_group_layouts: &bind_group_layout_refs,
        push_constant_ranges: &[],
    });

    let depth_stencil = config.depth_format.map(|format| DepthStencilState {
        format,
        depth_write_enabled: true,
        depth_compare: CompareFunction::Less,
        stencil: StencilState::default(),
        bias: DepthBiasState::default(),
    });

    device.create_render_pipeline(&RenderPipelineDescriptor {
        label: Some(&config.label),
        layout: Some(&pipeline_layout),
        vertex: VertexState {
            module: &shader,
            entry_point: Some("vs_main"),
            buffers: &[Vertex3D::desc()],
            compilation_options: PipelineCompilationOptions::default(),
        },
        fragment: Some(FragmentState {
            module: &shader,
            entry_point: Some("fs_main"),
            targets: &[Some(config.color_target.clone())],
            compilation_options: PipelineCompilationOptions::default(),
        }),
        primitive: PrimitiveState {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: config.cull_mode,
            polygon_mode: PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil,
        multisample: config.multisample,
        multiview: None,
        cache: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_single_sampled() {
        let config = PipelineConfig::default();
        assert_eq!(config.sample_count(), 1);
        assert_eq!(config.depth_format, None);
        assert_eq!(config.cull_mode, Some(Face::Back));
    }

    #[test]
    fn test_builder_sets_sampling_and_depth() {
        let config = PipelineConfig::default()
            .with_sample_count(MSAA_SAMPLES)
            .with_depth_format(TextureFormat::Depth32Float)
            .with_cull_mode(None);
        assert_eq!(config.sample_count(), 4);
        assert_eq!(config.multisample.mask, !0);
        assert_eq!(config.depth_format, Some(TextureFormat::Depth32Float));
        assert_eq!(config.cull_mode, None);

        assert_eq!(PipelineConfig::default().with_sample_count(0).sample_count(), 1);
    }

    #[test]
    fn test_sample_count_needs_resolve_support() {
        let msaa = TextureFormatFeatureFlags::MULTISAMPLE_X4;
        assert_eq!(sample_count_for(msaa | TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE), 4);
        assert_eq!(sample_count_for(msaa), 1);
        assert_eq!(sample_count_for(TextureFormatFeatureFlags::MULTISAMPLE_RESOLVE), 1);
        assert_eq!(sample_count_for(TextureFormatFeatureFlags::empty()), 1);
    }
}
