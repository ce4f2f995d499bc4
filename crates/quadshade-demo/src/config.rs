use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use winit::dpi::LogicalSize;

use quadshade_engine::device::GpuInit;
use quadshade_engine::paint::Color;
use quadshade_engine::shader::ShaderPaths;
use quadshade_engine::window::RuntimeConfig;

const VERTEX_SHADER: &str = "assets/shader/demo.vert";
const FRAGMENT_SHADER: &str = "assets/shader/demo.frag";
const BUNDLED_FONT: &str = "assets/fonts/JetBrainsMono/JetBrainsMono-ExtraLight.ttf";

/// Tried in order when the bundled font is missing.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/TTF/JetBrainsMono-Regular.ttf",
    "/usr/share/fonts/truetype/jetbrains-mono/JetBrainsMono-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/noto/NotoSansMono-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSansMono-Regular.ttf",
    "/System/Library/Fonts/Menlo.ttc",
    "C:\\Windows\\Fonts\\consola.ttf",
];

/// Demo settings. No config file; edit the defaults.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub size: (f64, f64),
    pub min_size: (f64, f64),
    pub background: Color,
    pub hud_font_size: f32,
    pub agent_count: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "AI-Agent Simulation".to_string(),
            size: (1200.0, 800.0),
            min_size: (900.0, 500.0),
            background: Color::from_straight(0.1, 0.3, 0.2, 1.0),
            hud_font_size: 24.0,
            agent_count: 48,
        }
    }
}

impl AppConfig {
    pub fn runtime(&self) -> RuntimeConfig {
        RuntimeConfig {
            title: self.title.clone(),
            initial_size: LogicalSize::new(self.size.0, self.size.1),
            min_size: Some(LogicalSize::new(self.min_size.0, self.min_size.1)),
        }
    }

    pub fn gpu(&self) -> GpuInit {
        // Colors are authored as display values for a non-sRGB framebuffer.
        GpuInit {
            prefer_srgb: false,
            present_mode: wgpu::PresentMode::Fifo,
            ..GpuInit::default()
        }
    }
}

/// Where shaders and fonts are read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPaths {
    /// Directory holding `assets/`.
    pub root: PathBuf,
}

impl AssetPaths {
    /// Resolves the asset root from the process environment.
    pub fn from_env() -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot read current directory")?;
        let argv0 = std::env::args_os().next().map(PathBuf::from).unwrap_or_default();
        log::debug!("current working directory: {}", cwd.display());
        log::debug!("executable: {}", argv0.display());

        let paths = Self::resolve(&cwd, &argv0, Path::new(env!("CARGO_MANIFEST_DIR")));
        log::debug!("asset root: {}", paths.root.display());
        Ok(paths)
    }

    /// Picks the first of `cwd/parent(argv0)`, `cwd` and `fallback` that has
    /// the vertex shader. When none does, keeps the executable directory so
    /// the failure names the path users expect.
    pub fn resolve(cwd: &Path, argv0: &Path, fallback: &Path) -> Self {
        let exe_dir = cwd.join(argv0.parent().unwrap_or_else(|| Path::new("")));
        let root = [exe_dir.as_path(), cwd, fallback]
            .into_iter()
            .find(|dir| dir.join(VERTEX_SHADER).is_file())
            .unwrap_or(&exe_dir)
            .to_path_buf();
        Self { root }
    }

    pub fn shaders(&self) -> ShaderPaths {
        ShaderPaths::new(self.root.join(VERTEX_SHADER), self.root.join(FRAGMENT_SHADER))
    }

    /// Bundled font first, then system fallbacks.
    pub fn font_candidates(&self) -> Vec<PathBuf> {
        std::iter::once(self.root.join(BUNDLED_FONT))
            .chain(SYSTEM_FONTS.iter().map(PathBuf::from))
            .collect()
    }
}
