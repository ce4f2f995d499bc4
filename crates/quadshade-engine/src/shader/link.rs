use std::collections::BTreeMap;

use naga::{AddressSpace, Binding, ImageClass, ImageDimension, Scalar, ScalarKind, TypeInner, VectorSize};

use super::compile::CompiledStage;
use super::error::{ShaderError, Stage};
use super::layout::{
    BIND_GROUP, ENTRY_POINT, FRAME_BINDING, PALETTE_BINDING, POPULATION_BINDING,
    POPULATION_BYTES, SAMPLER_BINDING,
};
use super::uniforms::UniformBlock;

/// Vertex and fragment stages checked against each other and against the
/// fixed resource layout.
#[derive(Debug)]
pub struct LinkedProgram {
    vertex: naga::Module,
    fragment: naga::Module,
    frame_uniforms: UniformBlock,
    uses_population: bool,
}

impl LinkedProgram {
    /// Reflected layout of the `Frame` uniform block (binding 0).
    ///
    /// Empty when neither stage declares the block.
    pub fn frame_uniforms(&self) -> &UniformBlock {
        &self.frame_uniforms
    }

    /// Whether any stage reads the population buffer.
    pub fn uses_population(&self) -> bool {
        self.uses_population
    }

    pub(crate) fn into_parts(self) -> (naga::Module, naga::Module, UniformBlock, bool) {
        (self.vertex, self.fragment, self.frame_uniforms, self.uses_population)
    }
}

/// Links a vertex and a fragment stage.
///
/// Both stage modules are consumed; on failure they are dropped together with
/// the error.
pub fn link(vertex: CompiledStage, fragment: CompiledStage) -> Result<LinkedProgram, ShaderError> {
    let mut log = Vec::new();

    let vs = entry_function(vertex.module(), Stage::Vertex, &mut log);
    let fs = entry_function(fragment.module(), Stage::Fragment, &mut log);

    if let (Some(vs), Some(fs)) = (vs, fs) {
        check_vertex_inputs(vertex.module(), vs, &mut log);
        check_varyings(vertex.module(), vs, fragment.module(), fs, &mut log);
        check_fragment_outputs(fragment.module(), fs, &mut log);
    }

    let vs_resources = collect_resources(vertex.module(), Stage::Vertex, &mut log);
    let fs_resources = collect_resources(fragment.module(), Stage::Fragment, &mut log);

    let frame_uniforms = match (vs_resources.frame, fs_resources.frame) {
        (Some(a), Some(b)) => {
            if a.members() != b.members() || a.size() != b.size() {
                log.push("uniform block at binding 0 differs between VERTEX and FRAGMENT".to_string());
            }
            a
        }
        (Some(block), None) | (None, Some(block)) => block,
        (None, None) => UniformBlock::default(),
    };

    if !log.is_empty() {
        let log = log.join("\n");
        log::error!("shader linker error, type: PROGRAM\n{log}");
        return Err(ShaderError::Link { log });
    }

    log::debug!(
        "program linked ({} frame uniforms, population: {})",
        frame_uniforms.members().len(),
        vs_resources.population || fs_resources.population
    );

    Ok(LinkedProgram {
        uses_population: vs_resources.population || fs_resources.population,
        vertex: vertex.into_module(),
        fragment: fragment.into_module(),
        frame_uniforms,
    })
}

fn entry_function<'m>(
    module: &'m naga::Module,
    stage: Stage,
    log: &mut Vec<String>,
) -> Option<&'m naga::Function> {
    let wanted = stage.naga_stage()?;
    let ep = module
        .entry_points
        .iter()
        .find(|ep| ep.name == ENTRY_POINT && ep.stage == wanted);

    if ep.is_none() {
        log.push(format!("{stage} stage has no `{ENTRY_POINT}` entry point"));
    }
    ep.map(|ep| &ep.function)
}

/// Location-bound values of a stage interface, keyed by location.
type Interface<'m> = BTreeMap<u32, &'m TypeInner>;

fn push_location<'m>(
    module: &'m naga::Module,
    ty: naga::Handle<naga::Type>,
    binding: Option<&Binding>,
    out: &mut Interface<'m>,
) {
    match binding {
        Some(Binding::Location { location, .. }) => {
            out.insert(*location, &module.types[ty].inner);
        }
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for m in members {
                    push_location(module, m.ty, m.binding.as_ref(), out);
                }
            }
        }
    }
}

fn inputs<'m>(module: &'m naga::Module, function: &'m naga::Function) -> Interface<'m> {
    let mut out = Interface::new();
    for arg in &function.arguments {
        push_location(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn outputs<'m>(module: &'m naga::Module, function: &'m naga::Function) -> Interface<'m> {
    let mut out = Interface::new();
    if let Some(result) = &function.result {
        push_location(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

fn check_vertex_inputs(module: &naga::Module, vs: &naga::Function, log: &mut Vec<String>) {
    let position = TypeInner::Vector {
        size: VectorSize::Tri,
        scalar: Scalar::F32,
    };

    for (location, ty) in inputs(module, vs) {
        if location != 0 {
            log.push(format!(
                "VERTEX input at location {location} has no vertex buffer attribute"
            ));
        } else if *ty != position {
            log.push("VERTEX input at location 0 must be a vec3".to_string());
        }
    }
}

fn check_varyings(
    vertex: &naga::Module,
    vs: &naga::Function,
    fragment: &naga::Module,
    fs: &naga::Function,
    log: &mut Vec<String>,
) {
    let written = outputs(vertex, vs);
    for (location, ty) in inputs(fragment, fs) {
        match written.get(&location) {
            None => log.push(format!(
                "FRAGMENT input at location {location} is not written by the VERTEX stage"
            )),
            Some(out_ty) if *out_ty != ty => log.push(format!(
                "type mismatch at location {location} between VERTEX output and FRAGMENT input"
            )),
            Some(_) => {}
        }
    }
}

fn check_fragment_outputs(module: &naga::Module, fs: &naga::Function, log: &mut Vec<String>) {
    if !outputs(module, fs).contains_key(&0) {
        log.push("FRAGMENT stage does not write a color at location 0".to_string());
    }
}

#[derive(Default)]
struct Resources {
    frame: Option<UniformBlock>,
    population: bool,
}

fn collect_resources(module: &naga::Module, stage: Stage, log: &mut Vec<String>) -> Resources {
    let mut res = Resources::default();

    for (_, var) in module.global_variables.iter() {
        let name = var.name.as_deref().unwrap_or("<unnamed>");

        match var.space {
            AddressSpace::Function | AddressSpace::Private | AddressSpace::WorkGroup => continue,
            AddressSpace::Uniform | AddressSpace::Handle => {}
            _ => {
                log.push(format!(
                    "{stage} resource `{name}` uses an address space with no binding in this program"
                ));
                continue;
            }
        }

        let Some(rb) = &var.binding else {
            log.push(format!("{stage} resource `{name}` has no binding"));
            continue;
        };

        if rb.group != BIND_GROUP {
            log.push(format!(
                "{stage} resource `{name}` uses set {}, only set {BIND_GROUP} is bound",
                rb.group
            ));
            continue;
        }

        let inner = &module.types[var.ty].inner;
        match rb.binding {
            FRAME_BINDING => match (var.space, UniformBlock::reflect(module, var.ty)) {
                (AddressSpace::Uniform, Some(block)) => res.frame = Some(block),
                _ => log.push(format!(
                    "{stage} resource `{name}` at binding {FRAME_BINDING} must be a uniform block"
                )),
            },
            POPULATION_BINDING => match (var.space, inner) {
                (AddressSpace::Uniform, TypeInner::Struct { span, .. }) => {
                    if u64::from(*span) > POPULATION_BYTES {
                        log.push(format!(
                            "{stage} population block is {span} bytes, buffer holds {POPULATION_BYTES}"
                        ));
                    }
                    res.population = true;
                }
                _ => log.push(format!(
                    "{stage} resource `{name}` at binding {POPULATION_BINDING} must be a uniform block"
                )),
            },
            PALETTE_BINDING => {
                let ok = matches!(
                    inner,
                    TypeInner::Image {
                        dim: ImageDimension::D2,
                        arrayed: false,
                        class: ImageClass::Sampled {
                            kind: ScalarKind::Float,
                            multi: false,
                        },
                    }
                );
                if !ok {
                    log.push(format!(
                        "{stage} resource `{name}` at binding {PALETTE_BINDING} must be a texture2D"
                    ));
                }
            }
            SAMPLER_BINDING => {
                if !matches!(inner, TypeInner::Sampler { comparison: false }) {
                    log.push(format!(
                        "{stage} resource `{name}` at binding {SAMPLER_BINDING} must be a sampler"
                    ));
                }
            }
            other => log.push(format!(
                "{stage} resource `{name}` uses binding {other}, which is not provided"
            )),
        }
    }

    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile::compile_stage;
    use crate::shader::compile::tests::{FRAGMENT, VERTEX};

    fn link_sources(vs: &str, fs: &str) -> Result<LinkedProgram, ShaderError> {
        link(
            compile_stage(Stage::Vertex, vs).expect("vertex compiles"),
            compile_stage(Stage::Fragment, fs).expect("fragment compiles"),
        )
    }

    fn link_log(vs: &str, fs: &str) -> String {
        match link_sources(vs, fs) {
            Err(ShaderError::Link { log }) => log,
            other => panic!("expected link error, got {other:?}"),
        }
    }

    #[test]
    fn reflects_frame_block_offsets() {
        let program = link_sources(VERTEX, FRAGMENT).unwrap();
        let block = program.frame_uniforms();
        assert_eq!(block.member("time").map(|m| m.offset), Some(0));
        assert_eq!(block.member("frame").map(|m| m.offset), Some(4));
        assert_eq!(block.member("pan").map(|m| m.offset), Some(8));
        assert_eq!(block.member("zoom").map(|m| m.offset), Some(16));
        assert!(!program.uses_population());
    }

    #[test]
    fn unmatched_fragment_input_fails() {
        let fs = r#"#version 450
layout(location = 3) in vec2 v_other;
layout(location = 0) out vec4 frag_color;
void main() { frag_color = vec4(v_other, 0.0, 1.0); }
"#;
        assert!(link_log(VERTEX, fs).contains("location 3"));
    }

    #[test]
    fn varying_type_mismatch_fails() {
        let fs = r#"#version 450
layout(location = 0) in vec3 v_uv;
layout(location = 0) out vec4 frag_color;
void main() { frag_color = vec4(v_uv, 1.0); }
"#;
        assert!(link_log(VERTEX, fs).contains("type mismatch"));
    }

    #[test]
    fn vertex_input_must_match_quad_layout() {
        let vs = r#"#version 450
layout(location = 0) in vec3 a_pos;
layout(location = 1) in vec2 a_uv;
layout(location = 0) out vec2 v_uv;
void main() { v_uv = a_uv; gl_Position = vec4(a_pos, 1.0); }
"#;
        assert!(link_log(vs, FRAGMENT).contains("location 1"));
    }

    #[test]
    fn unknown_binding_fails() {
        let fs = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;
layout(set = 0, binding = 7) uniform Extra { float gain; };
void main() { frag_color = vec4(v_uv, gain, 1.0); }
"#;
        assert!(link_log(VERTEX, fs).contains("binding 7"));
    }

    #[test]
    fn population_and_palette_bindings_link() {
        let fs = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;

layout(set = 0, binding = 0) uniform Frame { float time; int agent_count; };
layout(set = 0, binding = 1) uniform Population { vec4 agents[64]; };
layout(set = 0, binding = 2) uniform texture2D palette;
layout(set = 0, binding = 3) uniform sampler palette_sampler;

void main() {
    float d = 1.0;
    for (int i = 0; i < agent_count; i++) {
        d = min(d, distance(v_uv, agents[i].xy));
    }
    frag_color = texture(sampler2D(palette, palette_sampler), vec2(d, 0.5));
}
"#;
        let program = link_sources(VERTEX, fs).unwrap();
        assert!(program.uses_population());
        assert!(program.frame_uniforms().member("agent_count").is_some());
    }

    #[test]
    fn oversized_population_block_fails() {
        let fs = r#"#version 450
layout(location = 0) in vec2 v_uv;
layout(location = 0) out vec4 frag_color;
layout(set = 0, binding = 1) uniform Population { vec4 agents[128]; };
void main() { frag_color = agents[0]; }
"#;
        assert!(link_log(VERTEX, fs).contains("population block"));
    }

    #[test]
    fn frame_block_must_agree_between_stages() {
        let vs = r#"#version 450
layout(location = 0) in vec3 a_pos;
layout(location = 0) out vec2 v_uv;
layout(set = 0, binding = 0) uniform Frame { float zoom; };
void main() { v_uv = a_pos.xy * zoom; gl_Position = vec4(a_pos, 1.0); }
"#;
        assert!(link_log(vs, FRAGMENT).contains("differs between"));
    }
}
