//! Asynchronous `<img>` loading for the zone editor background.

#[cfg(feature = "hydrate")]
use wasm_bindgen::JsValue;
#[cfg(feature = "hydrate")]
use web_sys::HtmlImageElement;

/// Load `url` into a detached image element.
///
/// Resolves once the browser fires `load`; an `error` event rejects. One
/// attempt only.
///
/// # Errors
///
/// Returns the DOM error value when the element cannot be created or the
/// image fails to load.
#[cfg(feature = "hydrate")]
pub async fn load_image(url: &str) -> Result<HtmlImageElement, JsValue> {
    let image = HtmlImageElement::new()?;
    let promise = js_sys::Promise::new(&mut |resolve, reject| {
        image.set_onload(Some(&resolve));
        image.set_onerror(Some(&reject));
    });
    image.set_src(url);
    let outcome = wasm_bindgen_futures::JsFuture::from(promise).await;
    image.set_onload(None);
    image.set_onerror(None);
    outcome?;
    Ok(image)
}
