//! Browser entry points
//!
//! `mount` builds the scene on the page's canvas and returns a handle that
//! owns every callback the scene registered. Disposing the handle (or
//! dropping it) unregisters them and cancels pending model loads.

mod fetch;
mod listeners;
mod scene;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use anyhow::{Context, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, HtmlCanvasElement, MouseEvent};

pub use listeners::{AnimationLoop, EventListener};

use crate::assets::{CancelOnDrop, LoadToken};
use crate::config::{SceneSettings, VideoCatalog};
use crate::consts::SCREEN_COUNT;
use crate::renderer::SceneRenderer;
use crate::sim::SceneState;
use scene::{ModelSlot, Scene};

pub(crate) fn js_error(value: JsValue) -> anyhow::Error {
    anyhow!("{value:?}")
}

fn init_logging() {
    console_error_panic_hook::set_once();
    // A second mount on the same page finds the logger already installed
    let _ = console_log::init_with_level(log::Level::Info);
}

/// Mount the stadium scene
///
/// `settings_json` overrides any subset of [`SceneSettings`].
#[wasm_bindgen]
pub async fn mount(settings_json: Option<String>) -> Result<SceneHandle, JsValue> {
    init_logging();

    let settings = match settings_json {
        Some(json) => {
            SceneSettings::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        None => SceneSettings::default(),
    };

    mount_scene(settings).await.map_err(|e| {
        log::error!("Mount failed: {e:#}");
        JsValue::from_str(&format!("{e:#}"))
    })
}

async fn mount_scene(settings: SceneSettings) -> anyhow::Result<SceneHandle> {
    log::info!("Stadium scene starting...");

    let window = web_sys::window().context("no window")?;
    let document = window.document().context("no document")?;

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(&settings.canvas_id)
        .with_context(|| format!("no element with id {:?}", settings.canvas_id))?
        .dyn_into()
        .map_err(|_| anyhow!("element {:?} is not a canvas", settings.canvas_id))?;

    // The wall needs a video per slot, so a short manifest stops here
    let manifest = fetch::text(&settings.videos_url)
        .await
        .context("loading video manifest")?;
    let catalog = VideoCatalog::from_json(&manifest, SCREEN_COUNT)?;
    log::info!("Video manifest: {} entries", catalog.len());

    let viewport = scene::window_viewport(&window)?;
    let (width, height) = viewport.surface_size();

    let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
        backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
        ..Default::default()
    });
    let surface = instance
        .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
        .context("creating surface")?;
    let adapter = instance
        .request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        })
        .await
        .context("no suitable GPU adapter")?;
    log::info!("Using adapter: {:?}", adapter.get_info().name);

    let mut renderer = SceneRenderer::new(surface, &adapter, width, height).await?;
    scene::size_canvas(&canvas, &viewport, renderer.size);
    let state = SceneState::new(&settings, viewport);
    renderer.add_screens(&state);

    let videos = (0..SCREEN_COUNT)
        .filter_map(|i| catalog.get(i))
        .map(|entry| scene::create_video(&document, entry))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let scene = Rc::new(RefCell::new(Scene {
        state,
        renderer,
        videos,
        canvas,
        ball_radius: settings.physics.ball_radius,
    }));

    let listeners = register_listeners(&window, &document, &scene);

    let loads = CancelOnDrop::new(LoadToken::new());
    spawn_model_load(
        Rc::downgrade(&scene),
        loads.token().clone(),
        settings.stadium_url.clone(),
        ModelSlot::Stadium,
    );
    spawn_model_load(
        Rc::downgrade(&scene),
        loads.token().clone(),
        settings.football_url.clone(),
        ModelSlot::Ball,
    );

    let weak = Rc::downgrade(&scene);
    let frames = AnimationLoop::start(move |_time| match weak.upgrade() {
        Some(scene) => scene.borrow_mut().frame(),
        None => false,
    });

    log::info!("Stadium scene mounted");

    Ok(SceneHandle {
        mounted: Some(Mounted {
            _frames: frames,
            listeners,
            loads,
            scene,
        }),
    })
}

fn register_listeners(
    window: &web_sys::Window,
    document: &web_sys::Document,
    scene: &Rc<RefCell<Scene>>,
) -> Vec<EventListener> {
    let mut listeners = Vec::new();

    // Pointer down: start a drag
    {
        let scene = Rc::downgrade(scene);
        listeners.push(EventListener::new(document, "pointerdown", move |event: &Event| {
            if let (Some(scene), Some(event)) = (scene.upgrade(), event.dyn_ref::<MouseEvent>()) {
                scene
                    .borrow_mut()
                    .state
                    .pointer_down(event.client_x() as f32, event.client_y() as f32);
            }
        }));
    }

    // Pointer up: kick
    {
        let scene = Rc::downgrade(scene);
        listeners.push(EventListener::new(document, "pointerup", move |event: &Event| {
            if let (Some(scene), Some(event)) = (scene.upgrade(), event.dyn_ref::<MouseEvent>()) {
                scene
                    .borrow_mut()
                    .state
                    .pointer_up(event.client_x() as f32, event.client_y() as f32);
            }
        }));
    }

    // Window resize
    {
        let scene = Rc::downgrade(scene);
        let target = window.clone();
        listeners.push(EventListener::new(window, "resize", move |_event: &Event| {
            let Some(scene) = scene.upgrade() else {
                return;
            };
            match scene::window_viewport(&target) {
                Ok(viewport) => scene.borrow_mut().resize(viewport),
                Err(e) => log::warn!("Resize ignored: {e:#}"),
            }
        }));
    }

    // Video finished: next strike restarts it
    let videos = scene.borrow().videos.clone();
    for (index, video) in videos.iter().enumerate() {
        let scene = Rc::downgrade(scene);
        listeners.push(EventListener::new(video, "ended", move |_event: &Event| {
            if let Some(scene) = scene.upgrade() {
                scene.borrow_mut().state.wall.media_ended(index);
            }
        }));
    }

    listeners
}

fn spawn_model_load(scene: Weak<RefCell<Scene>>, token: LoadToken, url: String, slot: ModelSlot) {
    wasm_bindgen_futures::spawn_local(async move {
        let result = scene::load_model(&url)
            .await
            .with_context(|| format!("loading {url}"));
        let Some(scene) = scene.upgrade() else {
            return;
        };
        token.complete(result, |result| scene.borrow_mut().model_loaded(slot, result));
    });
}

/// Everything a mounted scene keeps alive
struct Mounted {
    _frames: AnimationLoop,
    listeners: Vec<EventListener>,
    loads: CancelOnDrop,
    scene: Rc<RefCell<Scene>>,
}

impl Drop for Mounted {
    fn drop(&mut self) {
        self.loads.token().cancel();
        if let Ok(scene) = self.scene.try_borrow() {
            scene.pause_all();
        }
        log::info!(
            "Stadium scene disposed, removing {} listeners",
            self.listeners.len()
        );
    }
}

/// Handle returned to JavaScript by [`mount`]
#[wasm_bindgen]
pub struct SceneHandle {
    mounted: Option<Mounted>,
}

#[wasm_bindgen]
impl SceneHandle {
    /// Stop the loop, remove listeners and cancel pending loads
    ///
    /// Calling it again does nothing.
    pub fn dispose(&mut self) {
        if let Some(mounted) = self.mounted.take() {
            drop(mounted);
        }
    }

    #[wasm_bindgen(getter)]
    pub fn disposed(&self) -> bool {
        self.mounted.is_none()
    }
}
