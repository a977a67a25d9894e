use thiserror::Error;
use wasm_bindgen::JsValue;

const KEY_PREFIX: &str = "scrolly:text:";
const RAW_KEY_PREFIX: &str = "scrolly:text:raw:";

/// Plain text to card markup. Blank lines separate paragraphs, single
/// newlines become line breaks
pub fn text_to_html(raw: &str) -> String {
    let mut paragraphs: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in raw.split('\n').map(|line| line.trim_end_matches('\r')) {
        if line.trim().is_empty() {
            if !current.is_empty() {
                paragraphs.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        paragraphs.push(current);
    }

    paragraphs
        .iter()
        .map(|lines| {
            let text = lines.join("\n");
            let body: Vec<String> = text.trim().split('\n').map(escape_html).collect();
            format!("<p>{}</p>", body.join("<br>"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub markup: String,
    pub raw: String,
}

impl StorageKeys {
    pub fn new(base: &str) -> Self {
        StorageKeys {
            markup: format!("{}{}", KEY_PREFIX, base),
            raw: format!("{}{}", RAW_KEY_PREFIX, base),
        }
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is unavailable")]
    Unavailable,
    #[error("could not {action} '{key}': {reason}")]
    Rejected {
        action: &'static str,
        key: String,
        reason: String,
    },
}

/// String key-value storage that outlives the page
pub trait TextStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`, or nothing when the browser refuses it
pub struct BrowserStore {
    storage: Option<web_sys::Storage>,
}

impl BrowserStore {
    pub fn new(storage: Option<web_sys::Storage>) -> Self {
        BrowserStore { storage }
    }

    fn storage(&self) -> Result<&web_sys::Storage, StorageError> {
        self.storage.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn rejected<'a>(action: &'static str, key: &'a str) -> impl FnOnce(JsValue) -> StorageError + 'a {
    move |err| StorageError::Rejected {
        action,
        key: key.to_string(),
        reason: format!("{:?}", err),
    }
}

impl TextStore for BrowserStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?.get_item(key).map_err(rejected("read", key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(rejected("write", key))
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.storage()?
            .remove_item(key)
            .map_err(rejected("remove", key))
    }
}

/// Card markup of one section and the edits saved for it
#[derive(Debug, Clone, PartialEq)]
pub struct CardText {
    keys: StorageKeys,
    default_html: String,
    html: String,
    editing: bool,
}

impl CardText {
    /// `default_html` is the markup the page shipped with
    pub fn new(keys: StorageKeys, default_html: String) -> Self {
        CardText {
            keys,
            html: default_html.clone(),
            default_html,
            editing: false,
        }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
    }

    /// True when saved markup replaced the default
    pub fn load_saved(&mut self, store: &impl TextStore) -> Result<bool, StorageError> {
        match store.get(&self.keys.markup)? {
            Some(saved) if !saved.is_empty() => {
                self.html = saved;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Shows the text without persisting it
    pub fn apply(&mut self, raw: &str) -> &str {
        self.html = text_to_html(raw);
        &self.html
    }

    /// Both keys are written even if the first write fails
    pub fn save(&mut self, raw: &str, store: &impl TextStore) -> Result<(), StorageError> {
        self.apply(raw);
        let markup = store.set(&self.keys.markup, &self.html);
        let raw = store.set(&self.keys.raw, raw);
        markup.and(raw)
    }

    pub fn restore(&mut self, store: &impl TextStore) -> Result<(), StorageError> {
        self.html = self.default_html.clone();
        let markup = store.remove(&self.keys.markup);
        let raw = store.remove(&self.keys.raw);
        markup.and(raw)
    }

    /// Raw text last saved, empty when none
    pub fn saved_raw(&self, store: &impl TextStore) -> Result<String, StorageError> {
        Ok(store.get(&self.keys.raw)?.unwrap_or_default())
    }
}
