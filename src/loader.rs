//! Texture fetching: photos through `fetch` and the `image` decoder, page
//! images through a scratch 2D canvas, videos as looping muted elements.

use crate::constants::MAX_TEXTURE_EDGE;
use crate::render::TextureSource;
use anyhow::{anyhow, bail, Context};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys as web;

fn js(e: JsValue) -> anyhow::Error {
    anyhow!("{:?}", e)
}

/// Decode an encoded image (webp, png, jpeg) into tightly packed RGBA rows.
pub fn decode_pixels(bytes: &[u8]) -> anyhow::Result<TextureSource> {
    let mut img = image::load_from_memory(bytes).context("decode")?;
    if img.width() > MAX_TEXTURE_EDGE || img.height() > MAX_TEXTURE_EDGE {
        img = img.resize(
            MAX_TEXTURE_EDGE,
            MAX_TEXTURE_EDGE,
            image::imageops::FilterType::Triangle,
        );
    }
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    Ok(TextureSource::Pixels {
        width,
        height,
        rgba: rgba.into_raw(),
    })
}

pub async fn fetch_image(url: &str) -> anyhow::Result<TextureSource> {
    let window = web::window().ok_or_else(|| anyhow!("no window"))?;
    let resp: web::Response = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js)?
        .dyn_into()
        .map_err(js)?;
    if !resp.ok() {
        bail!("{} answered {}", url, resp.status());
    }
    let buf = JsFuture::from(resp.array_buffer().map_err(js)?)
        .await
        .map_err(js)?;
    let bytes = js_sys::Uint8Array::new(&buf).to_vec();
    decode_pixels(&bytes).with_context(|| url.to_string())
}

/// Read back an already decoded `<img>` through a 2D canvas.
pub fn image_element_pixels(img: &web::HtmlImageElement) -> anyhow::Result<TextureSource> {
    let (w, h) = (img.natural_width(), img.natural_height());
    if w == 0 || h == 0 {
        bail!("image is not decoded yet");
    }
    let scale = (MAX_TEXTURE_EDGE as f64 / w.max(h) as f64).min(1.0);
    let width = ((w as f64 * scale) as u32).max(1);
    let height = ((h as f64 * scale) as u32).max(1);

    let document = crate::dom::window_document().ok_or_else(|| anyhow!("no document"))?;
    let canvas: web::HtmlCanvasElement = document
        .create_element("canvas")
        .map_err(js)?
        .dyn_into()
        .map_err(js)?;
    canvas.set_width(width);
    canvas.set_height(height);
    let ctx: web::CanvasRenderingContext2d = canvas
        .get_context("2d")
        .map_err(js)?
        .ok_or_else(|| anyhow!("2d context unavailable"))?
        .dyn_into()
        .map_err(js)?;
    ctx.draw_image_with_html_image_element_and_dw_and_dh(
        img,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )
    .map_err(js)?;
    let data = ctx
        .get_image_data(0.0, 0.0, width as f64, height as f64)
        .map_err(js)?;
    Ok(TextureSource::Pixels {
        width,
        height,
        rgba: data.data().0,
    })
}

/// Resolve once `target` fires `ok`; fail if it fires `fail` first.
async fn wait_for(target: &web::EventTarget, ok: &str, fail: &str) -> anyhow::Result<()> {
    let opts = web::AddEventListenerOptions::new();
    opts.set_once(true);
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            ok, &resolve, &opts,
        );
        _ = target.add_event_listener_with_callback_and_add_event_listener_options(
            fail, &reject, &opts,
        );
    });
    JsFuture::from(promise).await.map_err(js)?;
    Ok(())
}

/// Start a looping, muted, inline video and wait for its first frame.
pub async fn open_video(url: &str) -> anyhow::Result<web::HtmlVideoElement> {
    let document = crate::dom::window_document().ok_or_else(|| anyhow!("no document"))?;
    let video: web::HtmlVideoElement = document
        .create_element("video")
        .map_err(js)?
        .dyn_into()
        .map_err(js)?;
    video.set_cross_origin(Some("anonymous"));
    video.set_loop(true);
    video.set_muted(true);
    _ = video.set_attribute("playsinline", "");
    video.set_src(url);
    if let Ok(p) = video.play() {
        // autoplay refusals surface here; the element still loads
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = JsFuture::from(p).await {
                log::warn!("[texture] video play failed: {:?}", e);
            }
        });
    }
    wait_for(&video, "loadeddata", "error")
        .await
        .with_context(|| url.to_string())?;
    Ok(video)
}
