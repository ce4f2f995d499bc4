use std::fmt;

/// One compiled unit of the graphics pipeline.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Stage {
    Vertex,
    Fragment,
    Geometry,
}

impl Stage {
    /// Upper-case name used in diagnostics (`VERTEX`, `FRAGMENT`, `GEOMETRY`).
    pub fn label(self) -> &'static str {
        match self {
            Stage::Vertex => "VERTEX",
            Stage::Fragment => "FRAGMENT",
            Stage::Geometry => "GEOMETRY",
        }
    }

    /// naga stage for this pipeline stage. wgpu has no geometry stage.
    pub(crate) fn naga_stage(self) -> Option<naga::ShaderStage> {
        match self {
            Stage::Vertex => Some(naga::ShaderStage::Vertex),
            Stage::Fragment => Some(naga::ShaderStage::Fragment),
            Stage::Geometry => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Error returned while loading, compiling or linking a shader program.
#[derive(Debug, Clone, PartialEq)]
pub enum ShaderError {
    /// The vertex or fragment source was empty (usually a failed file read).
    MissingSource {
        vertex_len: usize,
        fragment_len: usize,
    },

    /// A single stage failed to parse or validate.
    Compile { stage: Stage, log: String },

    /// The stage exists in GLSL but cannot be expressed on the wgpu backend.
    UnsupportedStage(Stage),

    /// Stages compiled but do not form a usable program.
    Link { log: String },
}

impl ShaderError {
    /// Diagnostic log text, if the error carries one.
    pub fn log(&self) -> Option<&str> {
        match self {
            ShaderError::Compile { log, .. } | ShaderError::Link { log } => Some(log),
            ShaderError::MissingSource { .. } | ShaderError::UnsupportedStage(_) => None,
        }
    }
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::MissingSource {
                vertex_len,
                fragment_len,
            } => write!(
                f,
                "shader source is empty (vertex: {vertex_len} bytes, fragment: {fragment_len} bytes)"
            ),
            ShaderError::Compile { stage, log } => {
                write!(f, "{stage} shader failed to compile:\n{log}")
            }
            ShaderError::UnsupportedStage(stage) => {
                write!(f, "{stage} stage is not supported by the wgpu backend")
            }
            ShaderError::Link { log } => write!(f, "program failed to link:\n{log}"),
        }
    }
}

impl std::error::Error for ShaderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_labels_match_diagnostic_names() {
        assert_eq!(Stage::Vertex.to_string(), "VERTEX");
        assert_eq!(Stage::Fragment.to_string(), "FRAGMENT");
        assert_eq!(Stage::Geometry.to_string(), "GEOMETRY");
    }

    #[test]
    fn geometry_has_no_naga_stage() {
        assert!(Stage::Geometry.naga_stage().is_none());
        assert_eq!(Stage::Vertex.naga_stage(), Some(naga::ShaderStage::Vertex));
    }

    #[test]
    fn missing_source_reports_both_lengths() {
        let err = ShaderError::MissingSource {
            vertex_len: 0,
            fragment_len: 42,
        };
        let msg = err.to_string();
        assert!(msg.contains("vertex: 0 bytes"));
        assert!(msg.contains("fragment: 42 bytes"));
        assert!(err.log().is_none());
    }

    #[test]
    fn compile_error_carries_log() {
        let err = ShaderError::Compile {
            stage: Stage::Fragment,
            log: "unexpected token".to_string(),
        };
        assert_eq!(err.log(), Some("unexpected token"));
        assert!(err.to_string().starts_with("FRAGMENT shader failed to compile"));
    }
}
