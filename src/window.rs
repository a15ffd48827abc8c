use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use anyhow::Result;
use log::{debug, error, info};
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

use crate::{redraw::RedrawState, render::Render};

/// What the window drives. Every call happens on the event loop thread with the renderer alive.
pub trait AppLoop {
    /// Called once, on the first frame the window is visible, right after the renderer exists.
    fn initialize(&mut self, render: &mut Render) -> Result<()>;

    /// Called once per frame. Whatever gets queued on `render` is presented afterwards.
    fn render(&mut self, render: &mut Render) -> Result<()>;

    /// Called before the renderer is dropped. GPU resources owned by the app go here.
    fn teardown(&mut self, _render: &mut Render) {}
}

pub struct App {
    title: String,
    window_size: (u32, u32),
    frame_rate: f32,
    animating: bool,
}

impl App {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_window_size(mut self, size: (u32, u32)) -> Self {
        self.window_size = size;
        self
    }

    pub fn with_framerate(mut self, frame_rate: f32) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    /// Keep redrawing at the frame rate instead of only when the window asks for it.
    pub fn with_animating(mut self, animating: bool) -> Self {
        self.animating = animating;
        self
    }

    fn frame_interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.frame_rate.max(1.0))
    }

    /// Runs the event loop until the window closes or `app_loop` fails.
    pub fn run<T: AppLoop>(self, app_loop: T) -> Result<()> {
        let event_loop = EventLoop::new()?;

        let mut runner = Runner {
            settings: self,
            app_loop,
            window: None,
            render: None,
            redraw: RedrawState::default(),
            exposed: false,
            next_frame: Instant::now(),
            error: None,
        };

        event_loop.run_app(&mut runner)?;
        runner.teardown();

        match runner.error.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

struct Runner<T: AppLoop> {
    settings: App,
    app_loop: T,
    window: Option<Arc<Window>>,
    // created lazily on the first visible frame
    render: Option<Render>,
    redraw: RedrawState,
    exposed: bool,
    next_frame: Instant,
    error: Option<anyhow::Error>,
}

impl<T: AppLoop> Runner<T> {
    // before `resumed` there is no window to ask, and nothing may be left pending
    fn request_redraw(&mut self) {
        self.redraw
            .request_on(self.window.as_deref(), Window::request_redraw);
    }

    fn render_now(&mut self) -> Result<()> {
        if !self.exposed {
            return Ok(());
        }
        let Some(window) = self.window.clone() else {
            return Ok(());
        };

        if self.render.is_none() {
            let mut render = Render::new(window)?;
            self.app_loop.initialize(&mut render)?;
            info!("initialized at {:?}", render.size());
            self.render = Some(render);
        }
        let Some(render) = self.render.as_mut() else {
            return Ok(());
        };

        self.app_loop.render(render)?;
        render.present()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }

    // the app lets go of its textures while the device is still alive
    fn teardown(&mut self) {
        if let Some(mut render) = self.render.take() {
            self.app_loop.teardown(&mut render);
            debug!("{} glyph textures alive at teardown", render.live_textures());
            drop(render);
        }
        self.window = None;
    }
}

impl<T: AppLoop> ApplicationHandler for Runner<T> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let (width, height) = self.settings.window_size;
        let attributes = Window::default_attributes()
            .with_title(self.settings.title.clone())
            .with_inner_size(PhysicalSize::new(width, height));

        match event_loop.create_window(attributes) {
            Ok(window) => {
                self.window = Some(Arc::new(window));
                self.exposed = true;
                self.request_redraw();
            }
            Err(err) => self.fail(event_loop, err.into()),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(new_size) => {
                debug!("resized {:?}", new_size);
                self.exposed = new_size.width > 0 && new_size.height > 0;
                if let Some(render) = self.render.as_mut() {
                    render.resize(new_size);
                }
                self.request_redraw();
            }
            WindowEvent::Occluded(occluded) => {
                self.exposed = !occluded;
                if self.exposed {
                    self.request_redraw();
                }
            }
            WindowEvent::RedrawRequested => {
                self.redraw.take();
                if let Err(err) = self.render_now() {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.settings.animating {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }

        let now = Instant::now();
        if now >= self.next_frame {
            self.next_frame = now + self.settings.frame_interval();
            self.request_redraw();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_frame));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        self.teardown();
    }
}

pub fn make_window() -> App {
    env_logger::init();

    App {
        title: "glyph_blit".into(),
        window_size: (640, 480),
        frame_rate: 60.0,
        animating: false,
    }
}
