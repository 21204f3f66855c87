//! Client-side downloads via object URLs

use js_sys::{Array, Uint8Array};
use portal_core::Artifact;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, HtmlAnchorElement, Url, Window};

/// Browsers may still be reading the blob after `click()` returns
const REVOKE_DELAY_MS: i32 = 40_000;

pub fn to_blob(bytes: &[u8], mime: &str) -> Result<Blob, JsValue> {
    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(mime);
    Blob::new_with_u8_array_sequence_and_options(&parts, &options)
}

/// Save an artifact through a temporary anchor element
pub fn trigger_download(artifact: &Artifact) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("No window")?;
    let document = window.document().ok_or("No document")?;

    let blob = to_blob(&artifact.bytes, artifact.mime)?;
    let url = Url::create_object_url_with_blob(&blob)?;

    let anchor: HtmlAnchorElement = document
        .create_element("a")?
        .dyn_into()
        .map_err(|_| JsValue::from_str("Could not create anchor"))?;
    anchor.set_href(&url);
    anchor.set_download(&artifact.filename);
    anchor.click();

    revoke_later(&window, url, REVOKE_DELAY_MS)?;
    web_sys::console::log_1(&format!("Downloaded {}", artifact.filename).into());
    Ok(())
}

/// Release an object URL once the download has had time to start
fn revoke_later(window: &Window, url: String, delay_ms: i32) -> Result<i32, JsValue> {
    let revoke = Closure::once_into_js(move || {
        if let Err(e) = Url::revoke_object_url(&url) {
            web_sys::console::warn_1(&e);
        }
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(revoke.unchecked_ref(), delay_ms)
}

#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    async fn sleep(window: &Window, ms: i32) {
        let promise = js_sys::Promise::new(&mut |resolve, _| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms)
                .unwrap();
        });
        JsFuture::from(promise).await.unwrap();
    }

    #[wasm_bindgen_test]
    async fn test_object_url_outlives_click() {
        let window = web_sys::window().unwrap();
        let blob = to_blob(b"%PDF-1.7", "application/pdf").unwrap();
        let url = Url::create_object_url_with_blob(&blob).unwrap();

        revoke_later(&window, url.clone(), 50).unwrap();
        assert!(JsFuture::from(window.fetch_with_str(&url)).await.is_ok());

        sleep(&window, 150).await;
        assert!(JsFuture::from(window.fetch_with_str(&url)).await.is_err());
    }
}
