//! LexDraft browser front end
//!
//! Binds the portal core to the browser: `sessionStorage` for the token
//! and session ids, `fetch` with `AbortController` deadlines for the
//! webhooks, and object-URL downloads for the generated files. Views talk
//! to a single [`Portal`].

use wasm_bindgen::prelude::*;

pub mod download;
pub mod fetch;
pub mod portal;
pub mod storage;

pub use fetch::FetchTransport;
pub use portal::{Outcome, Portal};
pub use storage::SessionStore;

#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"LexDraft WASM initialized".into());
}
