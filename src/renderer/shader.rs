use std::path::Path;

use crate::asset::loader::{load_with_prompt, read_to_string};
use crate::asset::AssetErrorPrompt;
use crate::error::{RenderError, RenderResult};

/// A built-in WGSL program. `name` is also the file stem looked up in the
/// override directory.
#[derive(Debug, Clone, Copy)]
pub struct ShaderSource {
    pub name: &'static str,
    pub source: &'static str,
}

pub const GBUFFER_SHADER: ShaderSource = ShaderSource {
    name: "gbuffer",
    source: include_str!("../shader/gbuffer.wgsl"),
};

pub const SHADOW_SHADER: ShaderSource = ShaderSource {
    name: "shadow",
    source: include_str!("../shader/shadow.wgsl"),
};

pub const LIGHTING_SHADER: ShaderSource = ShaderSource {
    name: "lighting",
    source: include_str!("../shader/lighting.wgsl"),
};

pub const FORWARD_SHADER: ShaderSource = ShaderSource {
    name: "forward",
    source: include_str!("../shader/forward.wgsl"),
};

pub const PRESENT_SHADER: ShaderSource = ShaderSource {
    name: "present",
    source: include_str!("../shader/present.wgsl"),
};

/// Compiles WGSL inside a validation error scope so a bad program comes back
/// as an error instead of reaching the uncaptured-error handler.
pub fn compile(device: &wgpu::Device, label: &str, source: &str) -> RenderResult<wgpu::ShaderModule> {
    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    });

    match pollster::block_on(device.pop_error_scope()) {
        Some(error) => Err(RenderError::Shader {
            label: label.to_string(),
            message: error.to_string(),
        }),
        None => Ok(module),
    }
}

/// Loads a shader, preferring `<shader_dir>/<name>.wgsl` when an override
/// directory is configured. Override failures go through the prompt; a
/// cancelled override falls back to the built-in source.
pub(crate) fn load(
    device: &wgpu::Device,
    shader: ShaderSource,
    shader_dir: Option<&Path>,
    prompt: &mut dyn AssetErrorPrompt,
) -> RenderResult<wgpu::ShaderModule> {
    let Some(dir) = shader_dir else {
        return compile(device, shader.name, shader.source);
    };

    let path = dir.join(format!("{}.wgsl", shader.name));
    let loaded = load_with_prompt(prompt, &path, is_retryable, || {
        let source = read_to_string(&path)?;
        compile(device, shader.name, &source)
    });

    match loaded {
        Ok(module) => {
            log::info!("Using shader override {:?}", path);
            Ok(module)
        }
        Err(err) => {
            log::warn!(
                "Shader override {:?} unusable ({}). Using built-in {}.",
                path,
                err,
                shader.name
            );
            compile(device, shader.name, shader.source)
        }
    }
}

fn is_retryable(error: &RenderError) -> bool {
    match error {
        RenderError::Shader { .. } => true,
        RenderError::Load(load) => load.is_recoverable(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_sources_declare_their_entry_points() {
        assert!(GBUFFER_SHADER.source.contains("fn vs_tangent"));
        assert!(GBUFFER_SHADER.source.contains("fn fs_normal_mapped"));
        assert!(LIGHTING_SHADER.source.contains("fn vs_volume"));
        assert!(LIGHTING_SHADER.source.contains("fn vs_fullscreen"));
        assert!(FORWARD_SHADER.source.contains("fn fs_pos_tex"));
        assert!(SHADOW_SHADER.source.contains("fn vs_main"));
        assert!(PRESENT_SHADER.source.contains("fn fs_main"));
    }

    #[test]
    fn only_fixable_failures_are_retried() {
        let compile_error = RenderError::Shader {
            label: "gbuffer".into(),
            message: "bad token".into(),
        };
        assert!(is_retryable(&compile_error));
        assert!(!is_retryable(&RenderError::ShutDown));
    }
}
