use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::ActiveEventLoop,
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};
use crate::animation::FrameDriver;
use crate::capability::{launch, CapabilityError, GpuTarget, Launch, SurfaceProbe};
use crate::config::Settings;
use crate::core::{Viewport, WinitController};
use crate::frame::FrameIterator;
use crate::orbit::OrbitControls;
use crate::renderer::Renderer;
use crate::scene::SceneState;
use crate::stats::FpsMeter;

const WINDOW_TITLE: &str = "Cube Scene";
const CONTROLS_BANNER: &str =
    "Cube Scene - Controls: drag to orbit, right-drag or Shift+drag to pan, scroll to zoom, Escape to quit";

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Where the application is in its lifetime
#[derive(Debug, Clone, PartialEq)]
pub enum AppStatus {
    Starting,
    Running,
    /// The capability check failed; nothing was built
    Unsupported(CapabilityError),
    /// Startup failed after the capability check passed
    Failed(String),
}

/// Everything that exists once the scene is up
struct Running {
    window: Arc<Window>,
    scene: SceneState,
    renderer: Renderer,
    driver: FrameDriver,
    controller: WinitController,
    stats: FpsMeter,
    frames: FrameIterator,
}

impl Running {
    fn bootstrap(window: Arc<Window>, target: GpuTarget, settings: &Settings) -> Result<Self> {
        let viewport = Viewport::from(window.inner_size());
        let scene = SceneState::bootstrap(viewport, settings.shadow_map_size);
        let renderer = Renderer::new(window.clone(), target, &scene, settings)?;

        let mut controls = OrbitControls::new(glam::Vec3::ZERO);
        controls.enable_damping = settings.enable_damping;
        controls.damping_factor = settings.damping_factor;
        controls.enable_zoom = settings.enable_zoom;

        Ok(Self {
            window,
            scene,
            renderer,
            driver: FrameDriver::new(controls),
            controller: WinitController::new(),
            stats: FpsMeter::new(),
            frames: FrameIterator::new(),
        })
    }

    fn resize(&mut self, viewport: Viewport) {
        if self.scene.resize(viewport) {
            self.renderer.resize(viewport);
        }
    }

    /// Returns false if rendering cannot continue
    fn redraw(&mut self) -> bool {
        let Some(frame) = self.frames.next() else {
            return true;
        };

        self.stats.begin();
        let result = self
            .driver
            .frame(&mut self.scene, &frame, &self.controller, &mut self.renderer);
        let reading = self.stats.end();

        self.controller.reset_deltas();
        self.renderer.set_reading(reading);

        match result {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                log::debug!("Surface lost or outdated, reconfiguring");
                self.renderer.reconfigure();
                true
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("Surface timeout, skipping frame {}", frame.number);
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("Out of GPU memory");
                false
            }
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                true
            }
        }
    }
}

/// winit application: gates startup on the capability check, then drives
/// one frame per redraw
pub struct App {
    settings: Settings,
    running: Option<Running>,
    status: AppStatus,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            running: None,
            status: AppStatus::Starting,
        }
    }

    pub fn status(&self) -> &AppStatus {
        &self.status
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) {
        let window = match event_loop.create_window(
            Window::default_attributes()
                .with_title(WINDOW_TITLE)
                // Shown once the scene is up, so a failed check leaves no empty window
                .with_visible(false)
                .with_inner_size(winit::dpi::LogicalSize::new(
                    self.settings.width,
                    self.settings.height,
                )),
        ) {
            Ok(w) => Arc::new(w),
            Err(e) => {
                self.fail(event_loop, format!("Failed to create window: {}", e));
                return;
            }
        };

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = match instance.create_surface(window.clone()) {
            Ok(surface) => surface,
            Err(e) => {
                self.unsupported(event_loop, CapabilityError::new(format!("cannot create surface: {e}")));
                return;
            }
        };

        let settings = &self.settings;
        match launch(SurfaceProbe::new(instance, surface), |target| {
            Running::bootstrap(window, target, settings)
        }) {
            Launch::Ready(Ok(running)) => {
                println!("{}", CONTROLS_BANNER);
                running.window.set_visible(true);
                running.window.request_redraw();
                self.running = Some(running);
                self.status = AppStatus::Running;
            }
            Launch::Ready(Err(e)) => self.fail(event_loop, format!("Failed to initialize renderer: {}", e)),
            Launch::Unsupported(e) => self.unsupported(event_loop, e),
        }
    }

    /// The fallback message is the only output on this path
    fn unsupported(&mut self, event_loop: &ActiveEventLoop, error: CapabilityError) {
        eprintln!("{}", error.message());
        self.status = AppStatus::Unsupported(error);
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, message: String) {
        log::error!("{}", message);
        self.status = AppStatus::Failed(message);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.status == AppStatus::Starting {
            self.start(event_loop);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(running) = &mut self.running else {
            return;
        };

        // egui sees the event first; the controller still gets releases and motion
        let overlay_consumed = running.renderer.handle_event(&event);
        running.controller.offer_event(&event, overlay_consumed);
        if overlay_consumed {
            return;
        }

        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => event_loop.exit(),
            WindowEvent::Resized(size) => running.resize(Viewport::from(size)),
            WindowEvent::RedrawRequested => {
                if !running.redraw() {
                    self.status = AppStatus::Failed("out of GPU memory".to_string());
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(running) = &self.running {
            running.window.request_redraw();
        }
    }
}
