use std::fs;
use std::path::{Path, PathBuf};

use super::compile::compile_program;
use super::error::ShaderError;
use super::link::LinkedProgram;

/// Reads a shader source file.
///
/// Returns an empty string when the file cannot be read; the failure is
/// logged. Empty sources are rejected later by [`load_program`].
pub fn read_file(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            log::error!("could not read file {}: {e}", path.display());
            String::new()
        }
    }
}

/// File locations of a program's stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderPaths {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
    pub geometry: Option<PathBuf>,
}

impl ShaderPaths {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
            geometry: None,
        }
    }

    pub fn with_geometry(mut self, geometry: impl Into<PathBuf>) -> Self {
        self.geometry = Some(geometry.into());
        self
    }
}

/// Reads every stage file and compiles the program.
pub fn load_program(paths: &ShaderPaths) -> Result<LinkedProgram, ShaderError> {
    let vertex = read_file(&paths.vertex);
    let fragment = read_file(&paths.fragment);
    let geometry = paths.geometry.as_ref().map(read_file);

    if vertex.is_empty() || fragment.is_empty() {
        log::error!(
            "shader source is empty (vertex: {} bytes, fragment: {} bytes)",
            vertex.len(),
            fragment.len()
        );
        return Err(ShaderError::MissingSource {
            vertex_len: vertex.len(),
            fragment_len: fragment.len(),
        });
    }

    log::info!(
        "compiling {} + {}",
        paths.vertex.display(),
        paths.fragment.display()
    );
    compile_program(&vertex, &fragment, geometry.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::compile::tests::{FRAGMENT, VERTEX};
    use crate::shader::Stage;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("quadshade-{}-{name}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn read_file_missing_path_is_empty() {
        let text = read_file("/definitely/not/here/demo.vert");
        assert!(text.is_empty());
    }

    #[test]
    fn read_file_returns_contents() {
        let dir = scratch_dir("read");
        let path = dir.join("a.vert");
        fs::write(&path, VERTEX).unwrap();
        assert_eq!(read_file(&path), VERTEX);
    }

    #[test]
    fn load_program_reports_missing_fragment() {
        let dir = scratch_dir("missing");
        let vs = dir.join("demo.vert");
        fs::write(&vs, VERTEX).unwrap();

        let err = load_program(&ShaderPaths::new(&vs, dir.join("nope.frag"))).unwrap_err();
        assert_eq!(
            err,
            ShaderError::MissingSource {
                vertex_len: VERTEX.len(),
                fragment_len: 0,
            }
        );
    }

    #[test]
    fn load_program_compiles_files() {
        let dir = scratch_dir("ok");
        let vs = dir.join("demo.vert");
        let fs_path = dir.join("demo.frag");
        fs::write(&vs, VERTEX).unwrap();
        fs::write(&fs_path, FRAGMENT).unwrap();

        let program = load_program(&ShaderPaths::new(&vs, &fs_path)).unwrap();
        assert!(program.frame_uniforms().member("time").is_some());
    }

    #[test]
    fn load_program_rejects_geometry_file() {
        let dir = scratch_dir("geom");
        let vs = dir.join("demo.vert");
        let fs_path = dir.join("demo.frag");
        fs::write(&vs, VERTEX).unwrap();
        fs::write(&fs_path, FRAGMENT).unwrap();

        let paths = ShaderPaths::new(&vs, &fs_path).with_geometry(dir.join("demo.geom"));
        let err = load_program(&paths).unwrap_err();
        assert_eq!(err, ShaderError::UnsupportedStage(Stage::Geometry));
    }
}
