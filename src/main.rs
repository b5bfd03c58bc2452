use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use winit::{
    event::*,
    event_loop::EventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::Window,
};

// Import from the library crate
use bodysync::controller::input::native::{key_to_input, scroll_to_input};
use bodysync::controller::{FrameLoopContext, InputEvent};
use bodysync::view::{gpu_init, GpuContext, SceneRenderer};
use bodysync::{logging, DemoConfig, DemoError, SceneKind};

/// Rigid-body demo scenes
#[derive(Parser, Debug)]
#[command(name = "bodysync", version)]
struct Args {
    /// controls, blend or world
    #[arg(long, default_value = "controls", value_parser = parse_scene)]
    scene: SceneKind,

    /// TOML file overriding the default tunables
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_scene(s: &str) -> Result<SceneKind, String> {
    s.parse().map_err(|e: DemoError| e.to_string())
}

struct App {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: SceneRenderer,
    frame_ctx: FrameLoopContext,

    // Orbit drag with the left button
    dragging: bool,
    last_cursor: Option<(f64, f64)>,

    last_frame_time: Instant,
}

impl App {
    async fn new(window: Arc<Window>, config: DemoConfig, kind: SceneKind) -> Result<Self, DemoError> {
        let size = window.inner_size();

        let instance = gpu_init::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let gpu = GpuContext::new_native(&instance, surface, size.width, size.height).await?;
        let renderer = SceneRenderer::new(gpu.device.as_ref(), &gpu.config);
        let frame_ctx = kind.build(config, gpu.config.width, gpu.config.height);

        Ok(Self {
            window,
            gpu,
            renderer,
            frame_ctx,
            dragging: false,
            last_cursor: None,
            last_frame_time: Instant::now(),
        })
    }

    /// Translate a window event for the frame loop. Returns true when the
    /// event was consumed.
    fn input(&mut self, event: &WindowEvent) -> bool {
        let input_event = match event {
            WindowEvent::KeyboardInput { event: KeyEvent { state, physical_key, logical_key, .. }, .. } => {
                if *physical_key == PhysicalKey::Code(KeyCode::Escape) {
                    return false;
                }
                key_to_input(logical_key, *state == ElementState::Pressed)
            }
            WindowEvent::MouseInput { state, button: MouseButton::Left, .. } => {
                self.dragging = *state == ElementState::Pressed;
                self.last_cursor = None;
                None
            }
            WindowEvent::CursorMoved { position, .. } => {
                let current = (position.x, position.y);
                let previous = self.last_cursor.replace(current);
                match previous {
                    Some((x, y)) if self.dragging => Some(InputEvent::PointerDrag {
                        dx: (current.0 - x) as f32,
                        dy: (current.1 - y) as f32,
                    }),
                    _ => None,
                }
            }
            WindowEvent::MouseWheel { delta, .. } => Some(scroll_to_input(delta)),
            WindowEvent::Focused(false) => Some(InputEvent::FocusLost),
            WindowEvent::Occluded(occluded) => Some(InputEvent::VisibilityChanged { visible: !occluded }),
            _ => return false,
        };

        if let Some(input_event) = input_event {
            self.frame_ctx.handle_event(&input_event);
        }
        true
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.renderer
                .resize(self.gpu.device.as_ref(), &self.gpu.surface, new_size.width, new_size.height);
            self.frame_ctx.resize(new_size.width, new_size.height);
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        self.renderer.draw_frame(
            self.gpu.device.as_ref(),
            self.gpu.queue.as_ref(),
            &self.gpu.surface,
            &self.frame_ctx.scene,
            &self.frame_ctx.camera,
        )
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<DemoConfig, DemoError> {
    match path {
        Some(path) => DemoConfig::load(path),
        None => Ok(DemoConfig::default()),
    }
}

fn main() {
    logging::init();
    let args = Args::parse();

    let config = match load_config(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    };

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            tracing::error!("failed to create event loop: {e}");
            std::process::exit(1);
        }
    };
    let window_attributes = Window::default_attributes()
        .with_title(format!("bodysync - {}", args.scene))
        .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));
    #[allow(deprecated)]
    let window = match event_loop.create_window(window_attributes) {
        Ok(window) => Arc::new(window),
        Err(e) => {
            tracing::error!("failed to create window: {e}");
            std::process::exit(1);
        }
    };

    let mut app = match pollster::block_on(App::new(window, config, args.scene)) {
        Ok(app) => app,
        Err(e) => {
            tracing::error!("setup failed: {e}");
            std::process::exit(1);
        }
    };

    #[allow(deprecated)]
    let result = event_loop.run(move |event, elwt| {
        match event {
            Event::WindowEvent {
                ref event,
                window_id,
            } if window_id == app.window.id() => {
                if !app.input(event) {
                    match event {
                        WindowEvent::CloseRequested => elwt.exit(),
                        WindowEvent::KeyboardInput {
                            event: KeyEvent { physical_key: PhysicalKey::Code(KeyCode::Escape), .. },
                            ..
                        } => elwt.exit(),
                        WindowEvent::Resized(physical_size) => {
                            app.resize(*physical_size);
                        }
                        WindowEvent::RedrawRequested => {
                            let now = Instant::now();
                            let dt = (now - app.last_frame_time).as_secs_f32().min(0.1);
                            app.last_frame_time = now;

                            let stats = app.frame_ctx.tick(dt);
                            if stats.frame % 600 == 0 {
                                tracing::debug!(?stats, "frame");
                            }

                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::OutOfMemory) => {
                                    tracing::error!("out of GPU memory");
                                    elwt.exit();
                                }
                                Err(e) => tracing::warn!("frame skipped: {e}"),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.window.request_redraw();
            }
            _ => {}
        }
    });

    if let Err(e) = result {
        tracing::error!("event loop error: {e}");
    }
}
