//! `fetch` wrappers

use anyhow::{Context, bail};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::js_error;

async fn response(url: &str) -> anyhow::Result<Response> {
    let window = web_sys::window().context("no window")?;
    let value = JsFuture::from(window.fetch_with_str(url))
        .await
        .map_err(js_error)
        .with_context(|| format!("request to {url} failed"))?;
    let response: Response = value.dyn_into().map_err(js_error)?;
    if !response.ok() {
        bail!("{url} answered HTTP {}", response.status());
    }
    Ok(response)
}

pub async fn bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let response = response(url).await?;
    let buffer = JsFuture::from(response.array_buffer().map_err(js_error)?)
        .await
        .map_err(js_error)
        .with_context(|| format!("reading body of {url}"))?;
    Ok(js_sys::Uint8Array::new(&buffer).to_vec())
}

pub async fn text(url: &str) -> anyhow::Result<String> {
    let response = response(url).await?;
    let body = JsFuture::from(response.text().map_err(js_error)?)
        .await
        .map_err(js_error)
        .with_context(|| format!("reading body of {url}"))?;
    body.as_string()
        .with_context(|| format!("body of {url} is not text"))
}

pub async fn blob(url: &str) -> anyhow::Result<web_sys::Blob> {
    let response = response(url).await?;
    let body = JsFuture::from(response.blob().map_err(js_error)?)
        .await
        .map_err(js_error)
        .with_context(|| format!("reading body of {url}"))?;
    body.dyn_into().map_err(js_error)
}
