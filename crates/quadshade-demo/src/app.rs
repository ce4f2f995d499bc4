use anyhow::Context;

use quadshade_engine::coords::Viewport;
use quadshade_engine::core::{App, AppControl, FrameCtx, InitCtx};
use quadshade_engine::input::Key;
use quadshade_engine::render::{FullscreenQuad, HudRenderer};
use quadshade_engine::scene::DrawList;
use quadshade_engine::shader::{load_program, ShaderProgram};
use quadshade_engine::text::{FontId, FontSystem};

use crate::camera::ViewportState;
use crate::config::{AppConfig, AssetPaths};
use crate::hud::{self, HudStats};
use crate::{palette, population};

/// GPU objects created in `on_init` and released in `on_exit`.
struct Scene {
    program: ShaderProgram,
    quad: FullscreenQuad,
    hud: HudRenderer,
}

/// Full-screen shader with a pan/zoom camera and a debug overlay.
pub struct DemoApp {
    config: AppConfig,
    assets: AssetPaths,

    scene: Option<Scene>,
    fonts: FontSystem,
    hud_font: Option<FontId>,
    show_hud: bool,

    camera: ViewportState,
    draw_list: DrawList,
}

impl DemoApp {
    pub fn new(config: AppConfig, assets: AssetPaths) -> Self {
        Self {
            config,
            assets,
            scene: None,
            fonts: FontSystem::new(),
            hud_font: None,
            show_hud: true,
            camera: ViewportState::default(),
            draw_list: DrawList::new(),
        }
    }

    /// Loads the first candidate font that parses. The overlay stays hidden
    /// when none does.
    fn load_hud_font(&mut self) {
        for path in self.assets.font_candidates() {
            match self.fonts.load_font_file(&path) {
                Ok(id) => {
                    self.hud_font = Some(id);
                    return;
                }
                Err(e) => log::debug!("{e}"),
            }
        }
        log::warn!("no usable font found; overlay disabled");
    }

    fn build_overlay(&mut self, stats: HudStats, viewport: Viewport) {
        self.draw_list.clear();
        let Some(font) = self.hud_font.filter(|_| self.show_hud) else {
            return;
        };

        let size = self.config.hud_font_size;
        let fonts = &self.fonts;
        let layout = hud::layout(&stats.lines(), viewport, size * 1.2, |text| {
            fonts.measure_text(text, font, size)
        });
        layout.record(&mut self.draw_list, font, size);
    }
}

/// GLSL `int` value for a counter; saturates instead of wrapping negative.
fn int_uniform(value: u64) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl App for DemoApp {
    fn on_init(&mut self, ctx: &mut InitCtx<'_, '_>) -> anyhow::Result<()> {
        let linked = load_program(&self.assets.shaders()).context("failed to build shader program")?;

        let device = ctx.gpu.device();
        let queue = ctx.gpu.queue();

        let program = ShaderProgram::new(device, ctx.gpu.surface_format(), linked);
        program.write_population(queue, &population::spiral(self.config.agent_count));
        program.write_palette(queue, &palette::gradient());

        self.scene = Some(Scene {
            program,
            quad: FullscreenQuad::new(device),
            hud: HudRenderer::new(),
        });

        self.load_hud_font();
        Ok(())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let viewport = ctx.window.viewport();

        if ctx.input_frame.key_pressed(Key::F1) {
            self.show_hud = !self.show_hud;
        }
        self.camera.update(ctx.input, ctx.input_frame, viewport);

        let stats = HudStats {
            frame_time: ctx.time.smoothed_dt,
            pointer: ctx.input.pointer_pos,
            frame: ctx.time.frame_index,
            view: self.camera,
        };
        self.build_overlay(stats, viewport);

        let Some(scene) = self.scene.as_mut() else {
            return AppControl::Continue;
        };

        let program = &mut scene.program;
        program.set_float("time", ctx.time.elapsed);
        program.set_int("frame", int_uniform(ctx.time.frame_index));
        program.set_vec2("resolution", [viewport.width, viewport.height]);
        program.set_vec2("pan", self.camera.pan.to_array());
        program.set_float("zoom", self.camera.zoom);
        program.set_int("agent_count", int_uniform(self.config.agent_count as u64));
        program.flush_uniforms(ctx.gpu.queue());

        let Scene { program, quad, hud } = scene;
        let list = &self.draw_list;
        let fonts = &self.fonts;
        ctx.render(self.config.background, |rctx, target| {
            program.draw(target, quad);
            hud.render(rctx, target, list, fonts);
        })
    }

    fn on_exit(&mut self) {
        self.scene = None;
    }
}
