use naga::front::glsl;
use naga::valid::{Capabilities, ValidationFlags, Validator};

use super::error::{ShaderError, Stage};
use super::link::{link, LinkedProgram};

/// A single stage parsed and validated by naga.
///
/// Dropping it releases the stage; nothing else holds a reference to it once
/// the program is linked.
#[derive(Debug)]
pub struct CompiledStage {
    stage: Stage,
    module: naga::Module,
}

impl CompiledStage {
    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn module(&self) -> &naga::Module {
        &self.module
    }

    pub(crate) fn into_module(self) -> naga::Module {
        self.module
    }
}

/// Compiles one GLSL stage (`#version 440`/`450`/`460`).
pub fn compile_stage(stage: Stage, source: &str) -> Result<CompiledStage, ShaderError> {
    let Some(naga_stage) = stage.naga_stage() else {
        log::error!("{stage} shaders are not supported by the wgpu backend");
        return Err(ShaderError::UnsupportedStage(stage));
    };

    let mut frontend = glsl::Frontend::default();
    let module = frontend
        .parse(&glsl::Options::from(naga_stage), source)
        .map_err(|errors| compile_failed(stage, errors.emit_to_string(source)))?;

    Validator::new(ValidationFlags::all(), Capabilities::default())
        .validate(&module)
        .map_err(|err| compile_failed(stage, err.emit_to_string(source)))?;

    log::debug!("{stage} shader compiled ({} bytes of source)", source.len());
    Ok(CompiledStage { stage, module })
}

/// Compiles the vertex and fragment stages, then links them.
///
/// Geometry source is rejected up front: wgpu exposes no geometry stage.
pub fn compile_program(
    vertex: &str,
    fragment: &str,
    geometry: Option<&str>,
) -> Result<LinkedProgram, ShaderError> {
    if geometry.is_some() {
        log::error!("{} shaders are not supported by the wgpu backend", Stage::Geometry);
        return Err(ShaderError::UnsupportedStage(Stage::Geometry));
    }

    let vertex = compile_stage(Stage::Vertex, vertex)?;
    let fragment = compile_stage(Stage::Fragment, fragment)?;
    link(vertex, fragment)
}

fn compile_failed(stage: Stage, log: String) -> ShaderError {
    log::error!("shader compiler error, type: {stage}\n{log}");
    ShaderError::Compile { stage, log }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) const VERTEX: &str = r#"#version 450
layout(location = 0) in vec3 a_pos;
layout(location = 0) out vec2 v_uv;

void main() {
    v_uv = a_pos.xy * 0.5 + 0.5;
    gl_Position = vec4(a_pos, 1.0);
}
"#;

    pub(crate) const FRAGMENT: &str = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;

layout(set = 0, binding = 0) uniform Frame {
    float time;
    int frame;
    vec2 pan;
    float zoom;
};

void main() {
    float wave = 0.5 + 0.5 * sin(time + v_uv.x * zoom + pan.x);
    frag_color = vec4(v_uv, wave, 1.0);
}
"#;

    #[test]
    fn valid_program_compiles_and_links() {
        let program = compile_program(VERTEX, FRAGMENT, None).expect("program should link");
        assert!(program.frame_uniforms().member("time").is_some());
        assert!(program.frame_uniforms().member("zoom").is_some());
    }

    #[test]
    fn fragment_syntax_error_is_reported_per_stage() {
        let broken = FRAGMENT.replace("frag_color = vec4(v_uv, wave, 1.0);", "frag_color = vec4(v_uv wave 1.0)");
        let err = compile_program(VERTEX, &broken, None).unwrap_err();
        match err {
            ShaderError::Compile { stage, log } => {
                assert_eq!(stage, Stage::Fragment);
                assert!(!log.is_empty());
            }
            other => panic!("expected fragment compile error, got {other:?}"),
        }
    }

    #[test]
    fn vertex_error_stops_before_fragment() {
        let err = compile_program("#version 450\nvoid main() { undefined_call(); }", "not glsl", None)
            .unwrap_err();
        assert!(matches!(err, ShaderError::Compile { stage: Stage::Vertex, .. }));
    }

    #[test]
    fn geometry_stage_is_rejected() {
        let err = compile_program(VERTEX, FRAGMENT, Some("#version 450\nvoid main() {}")).unwrap_err();
        assert_eq!(err, ShaderError::UnsupportedStage(Stage::Geometry));

        let err = compile_stage(Stage::Geometry, "").unwrap_err();
        assert_eq!(err, ShaderError::UnsupportedStage(Stage::Geometry));
    }

    #[test]
    fn compiled_stage_keeps_its_kind() {
        let stage = compile_stage(Stage::Vertex, VERTEX).unwrap();
        assert_eq!(stage.stage(), Stage::Vertex);
        assert_eq!(stage.module().entry_points.len(), 1);
    }
}
