// ==================== Imports ====================
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
pub mod browser;
pub mod adventure;
pub mod engine;
pub mod scrolly;

use adventure::Adventure;
use engine::GameLoop;

fn to_js(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

// ==================== Entry Points ====================
/// Starts the adventure inside the element `root_id`
/// - loads the areas, from `data-content-src` when the root names a file
/// - binds the page structure
/// - runs the frame loop until the page goes away
#[wasm_bindgen]
pub fn start_adventure(root_id: &str) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    // fail early on a missing root, everything after is async
    browser::element_by_id::<web_sys::HtmlElement>(root_id).map_err(to_js)?;

    let root_id = root_id.to_string();
    browser::spawn_local(async move {
        if let Err(err) = GameLoop::start(Adventure::new(&root_id), &root_id).await {
            error!("Could not start adventure : {:#}", err);
        }
    });

    Ok(())
}

/// Starts the scroll controller over every `section.panel` of the page.
/// Call it once the document has loaded
#[wasm_bindgen]
pub fn start_scrollytelling() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    scrolly::start().map_err(to_js)
}
