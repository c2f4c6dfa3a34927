//! Browser-side scene: simulation, renderer and the video elements

use anyhow::{Context, anyhow};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Blob, BlobPropertyBag, Document, HtmlCanvasElement, HtmlVideoElement, ImageBitmap, Window};

use super::js_error;
use crate::assets::{ImageSource, ModelData};
use crate::config::VideoEntry;
use crate::renderer::SceneRenderer;
use crate::sim::{FrameOutput, SceneState, ScreenEvent, Viewport};

/// `HTMLMediaElement.HAVE_CURRENT_DATA`
const HAVE_CURRENT_DATA: u16 = 2;

/// Which model a finished load belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ModelSlot {
    Stadium,
    Ball,
}

/// A decoded model with its images ready for upload
pub(crate) struct LoadedModel {
    pub data: ModelData,
    /// Indexed like `data.images`
    pub images: Vec<Option<ImageBitmap>>,
}

pub(crate) struct Scene {
    pub state: SceneState,
    pub renderer: SceneRenderer,
    pub videos: Vec<HtmlVideoElement>,
    pub canvas: HtmlCanvasElement,
    pub ball_radius: f32,
}

impl Scene {
    /// One animation frame; `false` stops the loop
    pub fn frame(&mut self) -> bool {
        let FrameOutput {
            screen_events,
            ball_position,
            ball_rotation,
        } = self.state.tick();

        self.apply_events(&screen_events);
        self.upload_video_frames();

        match self
            .renderer
            .render(&self.state, ball_position, ball_rotation)
        {
            Ok(()) => true,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                let (width, height) = self.renderer.size;
                self.renderer.resize(width, height);
                true
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                log::error!("GPU out of memory, stopping the scene");
                false
            }
            Err(e) => {
                log::warn!("Render error: {:?}", e);
                true
            }
        }
    }

    fn apply_events(&self, events: &[ScreenEvent]) {
        for event in events {
            match *event {
                ScreenEvent::Play(index) => {
                    if let Some(video) = self.videos.get(index) {
                        play(video, index);
                    }
                }
                ScreenEvent::Pause(index) => {
                    if let Some(video) = self.videos.get(index)
                        && let Err(e) = video.pause()
                    {
                        log::warn!("Screen {index} could not pause: {e:?}");
                    }
                }
                ScreenEvent::Highlight { index, opacity } => {
                    log::debug!("Screen {index} highlight {opacity}");
                }
            }
        }
    }

    /// Copy the current frame of every playing video into its screen texture
    ///
    /// Screens without a texture yet also take a frame so a paused video
    /// shows its first picture instead of black.
    fn upload_video_frames(&mut self) {
        for (index, video) in self.videos.iter().enumerate() {
            let playing = self
                .state
                .wall
                .screens()
                .get(index)
                .is_some_and(|s| s.playing);
            if !playing && self.renderer.has_video_texture(index) {
                continue;
            }
            if video.ready_state() < HAVE_CURRENT_DATA {
                continue;
            }

            let size = (video.video_width(), video.video_height());
            let Some(texture) = self.renderer.video_texture(index, size) else {
                continue;
            };
            self.renderer.queue.copy_external_image_to_texture(
                &wgpu::CopyExternalImageSourceInfo {
                    source: wgpu::ExternalImageSource::HTMLVideoElement(video.clone()),
                    origin: wgpu::Origin2d::ZERO,
                    flip_y: false,
                },
                wgpu::CopyExternalImageDestInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                    color_space: wgpu::PredefinedColorSpace::Srgb,
                    premultiplied_alpha: false,
                },
                wgpu::Extent3d {
                    width: size.0,
                    height: size.1,
                    depth_or_array_layers: 1,
                },
            );
        }
    }

    pub fn resize(&mut self, viewport: Viewport) {
        let (width, height) = viewport.surface_size();
        self.renderer.resize(width, height);
        size_canvas(&self.canvas, &viewport, self.renderer.size);
        self.state.resize(viewport);
        log::debug!("Resized to {}x{}", self.renderer.size.0, self.renderer.size.1);
    }

    /// Apply a finished model load
    pub fn model_loaded(&mut self, slot: ModelSlot, result: anyhow::Result<LoadedModel>) {
        match (slot, result) {
            (ModelSlot::Stadium, Ok(model)) => {
                log::info!("Stadium loaded ({} meshes)", model.data.meshes.len());
                let textures = self.upload_images(&model.images);
                self.renderer.set_stadium(&model.data, &textures);
            }
            (ModelSlot::Stadium, Err(e)) => {
                log::warn!("Stadium unavailable: {e:#}");
            }
            (ModelSlot::Ball, Ok(model)) => {
                log::info!("Football loaded ({} meshes)", model.data.meshes.len());
                let textures = self.upload_images(&model.images);
                self.renderer.set_ball_model(&model.data, &textures);
                self.state.follow_ball = true;
            }
            (ModelSlot::Ball, Err(e)) => {
                log::warn!("Football unavailable, using a plain sphere: {e:#}");
                self.renderer.set_ball_fallback(self.ball_radius);
                self.state.follow_ball = true;
            }
        }
    }

    fn upload_images(&self, images: &[Option<ImageBitmap>]) -> Vec<Option<wgpu::TextureView>> {
        images
            .iter()
            .map(|image| image.as_ref().and_then(|b| self.renderer.upload_image(b)))
            .collect()
    }

    pub fn pause_all(&self) {
        for video in &self.videos {
            let _ = video.pause();
        }
    }
}

fn play(video: &HtmlVideoElement, index: usize) {
    match video.play() {
        Ok(promise) => wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(promise).await {
                log::warn!("Screen {index} could not start playback: {e:?}");
            }
        }),
        Err(e) => log::warn!("Screen {index} could not start playback: {e:?}"),
    }
}

/// Full-window viewport in CSS pixels
pub(crate) fn window_viewport(window: &Window) -> anyhow::Result<Viewport> {
    let width = window.inner_width().map_err(js_error)?.as_f64().unwrap_or(0.0);
    let height = window
        .inner_height()
        .map_err(js_error)?
        .as_f64()
        .unwrap_or(0.0);
    Ok(Viewport::new(
        width as f32,
        height as f32,
        window.device_pixel_ratio() as f32,
    ))
}

/// CSS size from the viewport, backing store at the renderer's surface size
pub(crate) fn size_canvas(canvas: &HtmlCanvasElement, viewport: &Viewport, backing: (u32, u32)) {
    let (width, height) = backing;
    canvas.set_width(width);
    canvas.set_height(height);
    let style = canvas.style();
    let _ = style.set_property("width", &format!("{}px", viewport.width));
    let _ = style.set_property("height", &format!("{}px", viewport.height));
}

pub(crate) fn create_video(
    document: &Document,
    entry: &VideoEntry,
) -> anyhow::Result<HtmlVideoElement> {
    let video: HtmlVideoElement = document
        .create_element("video")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("created element is not a video"))?;
    video.set_cross_origin(Some("anonymous"));
    video.set_muted(false);
    video.set_attribute("playsinline", "").map_err(js_error)?;
    video.dataset().set("title", &entry.title).map_err(js_error)?;
    video.set_src(&entry.src);
    Ok(video)
}

/// Fetch a glTF document, every buffer it references and its images
pub(crate) async fn load_model(url: &str) -> anyhow::Result<LoadedModel> {
    use crate::assets::{BufferSource, build_model, buffer_sources, parse};

    let bytes = super::fetch::bytes(url).await?;
    let gltf = parse(&bytes, url)?;

    let mut buffers = Vec::new();
    for source in buffer_sources(&gltf, url) {
        match source {
            BufferSource::Blob => buffers.push(Vec::new()),
            BufferSource::Url(buffer_url) => buffers.push(super::fetch::bytes(&buffer_url).await?),
        }
    }

    let data = build_model(&gltf, &buffers, url)?;

    // A texture that fails to decode leaves its meshes flat coloured
    let mut images = Vec::with_capacity(data.images.len());
    for (index, source) in data.images.iter().enumerate() {
        let bitmap = match source {
            Some(source) => match decode_image(source).await {
                Ok(bitmap) => Some(bitmap),
                Err(e) => {
                    log::warn!("{url}: image {index} unavailable: {e:#}");
                    None
                }
            },
            None => None,
        };
        images.push(bitmap);
    }

    Ok(LoadedModel { data, images })
}

async fn decode_image(source: &ImageSource) -> anyhow::Result<ImageBitmap> {
    let blob = match source {
        ImageSource::Url(url) => super::fetch::blob(url).await?,
        ImageSource::Embedded { bytes, mime_type } => {
            let options = BlobPropertyBag::new();
            options.set_type(mime_type);
            let parts = js_sys::Array::of1(&js_sys::Uint8Array::from(bytes.as_slice()));
            Blob::new_with_u8_array_sequence_and_options(&parts, &options).map_err(js_error)?
        }
    };
    let window = web_sys::window().context("no window")?;
    let bitmap = JsFuture::from(window.create_image_bitmap_with_blob(&blob).map_err(js_error)?)
        .await
        .map_err(js_error)
        .context("decoding image")?;
    bitmap.dyn_into().map_err(js_error)
}
