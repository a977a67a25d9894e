use serde::{Deserialize, Serialize};
use serde_json::Value;

const VIDEO_EXTENSIONS: [&str; 4] = ["mp4", "webm", "ogg", "ogv"];
const IMAGE_EXTENSIONS: [&str; 8] = ["jpg", "jpeg", "png", "gif", "webp", "avif", "bmp", "svg"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Video,
    Image,
    File,
}

impl MediaKind {
    /// Guess from the file extension
    pub fn from_path(path: &str) -> Self {
        let extension = path
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Video
        } else if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
            MediaKind::Image
        } else {
            MediaKind::File
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "video" => Some(MediaKind::Video),
            "image" => Some(MediaKind::Image),
            "file" => Some(MediaKind::File),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Video => "video",
            MediaKind::Image => "image",
            MediaKind::File => "file",
        }
    }

    fn label_prefix(&self) -> &'static str {
        match self {
            MediaKind::Video => "Video",
            MediaKind::Image => "Image",
            MediaKind::File => "File",
        }
    }
}

/// `(Video) my clip` for `my-clip.mp4`
pub fn friendly_label(name: &str, kind: MediaKind) -> String {
    let stem = match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() => &name[..dot],
        _ => name,
    };
    let words: Vec<&str> = stem
        .split(|c| c == '-' || c == '_')
        .filter(|word| !word.is_empty())
        .collect();
    format!("({}) {}", kind.label_prefix(), words.join(" ").trim())
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetEntry {
    pub src: String,
    /// kept as text so one unknown type does not reject the whole manifest
    pub kind: Option<String>,
    pub label: Option<String>,
}

impl AssetEntry {
    /// `None` unless `value` is an object with a non-empty string `src`.
    /// `type` and `label` only count when they are strings
    fn from_value(value: &Value) -> Option<Self> {
        let text = |key: &str| value.get(key).and_then(Value::as_str).map(str::to_string);
        Some(AssetEntry {
            src: text("src").filter(|src| !src.is_empty())?,
            kind: text("type"),
            label: text("label"),
        })
    }
}

/// Backgrounds embedded in the page as JSON
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetManifest {
    pub assets: Vec<AssetEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundOption {
    pub value: String,
    pub kind: MediaKind,
    pub label: String,
}

impl BackgroundOption {
    /// Option for a source that is not in the manifest
    pub fn for_path(path: &str) -> Self {
        let kind = MediaKind::from_path(path);
        let name = path.rsplit('/').next().unwrap_or(path);
        BackgroundOption {
            value: path.to_string(),
            kind,
            label: friendly_label(name, kind),
        }
    }
}

impl AssetManifest {
    /// Only invalid JSON is an error. Malformed entries are dropped and an
    /// `assets` that is not an array lists nothing
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        let document: Value = serde_json::from_str(text)?;
        let assets = document
            .get("assets")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().filter_map(AssetEntry::from_value).collect())
            .unwrap_or_default();
        Ok(AssetManifest { assets })
    }

    pub fn options(&self) -> Vec<BackgroundOption> {
        self.assets
            .iter()
            .map(|entry| {
                let kind = entry
                    .kind
                    .as_deref()
                    .and_then(MediaKind::parse)
                    .unwrap_or_else(|| MediaKind::from_path(&entry.src));
                let name = entry
                    .label
                    .as_deref()
                    .filter(|label| !label.is_empty())
                    .unwrap_or_else(|| entry.src.rsplit('/').next().unwrap_or(&entry.src));
                BackgroundOption {
                    value: entry.src.clone(),
                    kind,
                    label: friendly_label(name, kind),
                }
            })
            .collect()
    }
}
