use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use std::cell::Cell;
use std::future::Future;
use std::rc::Rc;
use wasm_bindgen::closure::{Closure, WasmClosure};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

#[rustfmt::skip]
use web_sys::{
    AddEventListenerOptions,
    Document,
    Element,
    Event,
    EventTarget,
    HtmlElement,
    Response,
    Storage,
    Window,
};

// ==================== Logging ====================
// Console output for the wiring layers. Pure state code never calls these,
// web_sys imports panic when they run outside of a browser.
macro_rules! log {
    ($($t:tt)*) => {
        web_sys::console::log_1(&format!($($t)*).into())
    }
}

macro_rules! warn {
    ($($t:tt)*) => {
        web_sys::console::warn_1(&format!($($t)*).into())
    }
}

macro_rules! error {
    ($($t:tt)*) => {
        web_sys::console::error_1(&format!($($t)*).into())
    }
}

// ==================== Types ====================
pub type LoopClosure = Closure<dyn FnMut(f64)>;

// ==================== Window / Document ====================
pub fn window() -> Result<Window> {
    web_sys::window().ok_or_else(|| anyhow!("Window not found"))
}

pub fn document() -> Result<Document> {
    window()?
        .document()
        .ok_or_else(|| anyhow!("No Document Found"))
}

pub fn body() -> Result<HtmlElement> {
    document()?
        .body()
        .ok_or_else(|| anyhow!("Document has no body"))
}

pub fn now() -> Result<f64> {
    Ok(window()?
        .performance()
        .ok_or_else(|| anyhow!("Performance object not found"))?
        .now())
}

pub fn viewport_height() -> Result<f64> {
    window()?
        .inner_height()
        .map_err(|err| anyhow!("Could not read innerHeight : {:#?}", err))?
        .as_f64()
        .ok_or_else(|| anyhow!("innerHeight is not a number"))
}

pub fn scroll_y() -> Result<f64> {
    window()?
        .scroll_y()
        .map_err(|err| anyhow!("Could not read scrollY : {:#?}", err))
}

pub fn local_storage() -> Result<Storage> {
    window()?
        .local_storage()
        .map_err(|err| anyhow!("Local storage is blocked : {:#?}", err))?
        .ok_or_else(|| anyhow!("Local storage is not available"))
}

// ==================== Elements ====================
/// Looks up a required element and casts it to the expected type
pub fn element_by_id<T: JsCast>(id: &str) -> Result<T> {
    document()?
        .get_element_by_id(id)
        .ok_or_else(|| anyhow!("No Element found with ID : '{}'", id))?
        .dyn_into::<T>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to {}",
                element,
                std::any::type_name::<T>()
            )
        })
}

/// Optional page controls: a missing or mistyped element is simply absent
pub fn optional_element<T: JsCast>(id: &str) -> Option<T> {
    element_by_id::<T>(id).ok()
}

pub fn query<T: JsCast>(parent: &Element, selector: &str) -> Result<Option<T>> {
    let found = parent
        .query_selector(selector)
        .map_err(|err| anyhow!("Invalid selector '{}' : {:#?}", selector, err))?;
    match found {
        Some(element) => element
            .dyn_into::<T>()
            .map(Some)
            .map_err(|element| anyhow!("Error converting {:#?} for '{}'", element, selector)),
        None => Ok(None),
    }
}

/// All elements of the document matching `selector` that cast to `T`
pub fn query_all<T: JsCast>(selector: &str) -> Result<Vec<T>> {
    let list = document()?
        .query_selector_all(selector)
        .map_err(|err| anyhow!("Invalid selector '{}' : {:#?}", selector, err))?;
    Ok((0..list.length())
        .filter_map(|index| list.item(index))
        .filter_map(|node| node.dyn_into::<T>().ok())
        .collect())
}

pub fn create_element<T: JsCast>(tag: &str) -> Result<T> {
    document()?
        .create_element(tag)
        .map_err(|err| anyhow!("Could not create <{}> : {:#?}", tag, err))?
        .dyn_into::<T>()
        .map_err(|element| {
            anyhow!(
                "Error converting {:#?} to {}",
                element,
                std::any::type_name::<T>()
            )
        })
}

// ==================== Closures / Events ====================
pub fn closure_wrap<T: WasmClosure + ?Sized>(data: Box<T>) -> Closure<T> {
    Closure::wrap(data)
}

pub fn create_raf_closure(f: impl FnMut(f64) + 'static) -> LoopClosure {
    closure_wrap(Box::new(f))
}

pub fn request_animation_frame(callback: &LoopClosure) -> Result<i32> {
    window()?
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Cannot request animation frame {:#?}", err))
}

/// Returns a trigger that runs `run` on the next animation frame. Triggers
/// arriving while a frame is already pending are absorbed into it
pub fn coalesce_frames(mut run: impl FnMut() + 'static) -> Rc<dyn Fn()> {
    let pending = Rc::new(Cell::new(false));
    let frame = {
        let pending = pending.clone();
        Rc::new(create_raf_closure(move |_time| {
            pending.set(false);
            run();
        }))
    };
    Rc::new(move || {
        if pending.replace(true) {
            return;
        }
        if let Err(err) = request_animation_frame(&frame) {
            pending.set(false);
            error!("{:#}", err);
        }
    })
}

/// Attaches a handler for the lifetime of the page
pub fn listen(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = closure_wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    target
        .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
        .map_err(|err| anyhow!("Could not listen for '{}' : {:#?}", event, err))?;
    closure.forget();
    Ok(())
}

/// Same as [`listen`] but tells the browser the handler never cancels the
/// event, scroll listeners stay off the compositor's critical path
pub fn listen_passive(
    target: &EventTarget,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<()> {
    let closure = closure_wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
    let options = AddEventListenerOptions::new();
    options.set_passive(true);
    target
        .add_event_listener_with_callback_and_add_event_listener_options(
            event,
            closure.as_ref().unchecked_ref(),
            &options,
        )
        .map_err(|err| anyhow!("Could not listen for '{}' : {:#?}", event, err))?;
    closure.forget();
    Ok(())
}

// ==================== Async ====================
pub fn spawn_local<F>(future: F)
where
    F: Future<Output = ()> + 'static,
{
    wasm_bindgen_futures::spawn_local(future);
}

pub async fn fetch_json<T>(json_path: &str) -> Result<T>
where
    T: DeserializeOwned,
{
    let resp_value = fetch_with_str(json_path).await?;
    let resp: Response = resp_value
        .dyn_into()
        .map_err(|element| anyhow!("error converting [{:#?}] to Response", element))?;
    if !resp.ok() {
        return Err(anyhow!("{} answered with status {}", json_path, resp.status()));
    }
    let json = resp
        .json()
        .map_err(|err| anyhow!("Could not get JSON from response [{:#?}]", err))?;

    let json_value = JsFuture::from(json)
        .await
        .map_err(|err| anyhow!("error fetching [{:#?}]", err))?;

    serde_wasm_bindgen::from_value(json_value)
        .map_err(|err| anyhow!("error converting response : {:#?}", err))
}

async fn fetch_with_str(resource: &str) -> Result<JsValue> {
    let resp = window()?.fetch_with_str(resource);

    JsFuture::from(resp)
        .await
        .map_err(|err| anyhow!("error fetching : {:#?}", err))
}

/// Awaits a promise we don't care about (media `play()`), only reporting why
/// it was rejected
pub fn settle_quietly(promise: js_sys::Promise, what: &'static str) {
    spawn_local(async move {
        if let Err(err) = JsFuture::from(promise).await {
            log!("{} was refused : {:?}", what, err);
        }
    });
}
