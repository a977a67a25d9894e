use super::assets::BackgroundOption;
use super::playback::{self, PlaybackCommand};
use super::progress::ParallaxFrame;
use super::section::{Align, Background, BackgroundKind, SectionConfig};
use crate::browser;
use crate::engine::Renderer;
use anyhow::{anyhow, Result};
use wasm_bindgen::JsCast;
#[rustfmt::skip]
use web_sys::{
    Element,
    HtmlButtonElement,
    HtmlElement,
    HtmlImageElement,
    HtmlInputElement,
    HtmlOptionElement,
    HtmlSelectElement,
    HtmlSourceElement,
    HtmlTextAreaElement,
    HtmlVideoElement,
};

// IDs of the optional control panel
mod html {
    pub const SCRUB: &str = "scrubVideo";
    pub const CROSSFADE: &str = "crossfade";
    pub const SCRUB_FULL_PASS: &str = "scrubFullPass";
    pub const MASK: &str = "maskSelect";
    pub const THEME: &str = "themeSelect";
    pub const BACKGROUND: &str = "bgSelect";
    pub const ALIGN: &str = "alignSelect";
    pub const CARD: &str = "cardToggle";
    pub const EDIT: &str = "editTextToggle";
    pub const TEXT_INPUT: &str = "sectionTextInput";
    pub const APPLY_TEXT: &str = "applyTextBtn";
    pub const SAVE_TEXT: &str = "saveTextBtn";
    pub const RESTORE_TEXT: &str = "restoreTextBtn";
    pub const GRADIENT: &str = "gradientOverlay";
    pub const ASSET_MANIFEST: &str = "assetManifest";
}

const DEFAULT_THEME: &str = "dark";
const HAVE_METADATA: u16 = 1;

/// The DOM of one `section.panel`
pub struct SectionView {
    section: HtmlElement,
    video: HtmlVideoElement,
    image: HtmlImageElement,
    overlay: HtmlElement,
    card: HtmlElement,
}

impl SectionView {
    /// Expects `.sticky`, `video.bg-video` and `.overlay` inside the section.
    /// Wraps the overlay content in a `.card` and adds the still image layer
    pub fn bind(section: HtmlElement, config: &SectionConfig, renderer: &Renderer) -> Result<Self> {
        let sticky: HtmlElement =
            browser::query(&section, ".sticky")?.ok_or_else(|| anyhow!("Section has no .sticky"))?;
        let video: HtmlVideoElement = browser::query(&section, "video.bg-video")?
            .ok_or_else(|| anyhow!("Section has no video.bg-video"))?;
        let overlay: HtmlElement = browser::query(&section, ".overlay")?
            .ok_or_else(|| anyhow!("Section has no .overlay"))?;
        let card = ensure_card(&overlay)?;

        let image: HtmlImageElement = browser::create_element("img")?;
        image.set_class_name("bg-image");
        for (property, value) in [
            ("position", "absolute"),
            ("inset", "0"),
            ("width", "100%"),
            ("height", "100%"),
            ("object-fit", "cover"),
            ("display", "none"),
        ] {
            renderer.set_style(&image, property, value);
        }
        sticky
            .insert_before(&image, Some(video.as_ref()))
            .map_err(|err| anyhow!("Could not insert background image : {:#?}", err))?;

        let view = SectionView {
            section,
            video,
            image,
            overlay,
            card,
        };
        view.apply_presentation(config, renderer);
        if let Some(background) = config.background.as_ref() {
            if background.kind == BackgroundKind::Video {
                view.replace_video_source(background)?;
            }
        }
        Ok(view)
    }

    pub fn element(&self) -> &HtmlElement {
        &self.section
    }

    pub fn is(&self, element: &Element) -> bool {
        self.section.is_same_node(Some(element.as_ref()))
    }

    /// `(top, height)` within the document
    pub fn document_geometry(&self) -> (f64, f64) {
        (
            f64::from(self.section.offset_top()),
            f64::from(self.section.offset_height()),
        )
    }

    /// `(top, height)` within the viewport
    pub fn viewport_geometry(&self) -> (f64, f64) {
        let rect = self.section.get_bounding_client_rect();
        (rect.top(), rect.height())
    }

    pub fn apply_presentation(&self, config: &SectionConfig, renderer: &Renderer) {
        for class in Align::CLASSES {
            renderer.toggle_class(&self.overlay, class, class == config.align.class());
        }
        if let Some(background) = config.card_bg.as_deref() {
            renderer.set_style(&self.card, "--card-bg", background);
        }
        if let Some(radius) = config.card_radius.as_deref() {
            renderer.set_style(&self.card, "--card-radius", radius);
        }
        renderer.toggle_class(&self.card, "no-surface", !config.use_card);
    }

    /// Mirrors a setting back onto the section's `data-*` attribute, `None`
    /// removes it
    pub fn set_data(&self, name: &str, value: Option<&str>) -> Result<()> {
        let attribute = format!("data-{}", name);
        match value {
            Some(value) => self
                .section
                .set_attribute(&attribute, value)
                .map_err(|err| anyhow!("Could not set {} : {:#?}", attribute, err)),
            None => self
                .section
                .remove_attribute(&attribute)
                .map_err(|err| anyhow!("Could not remove {} : {:#?}", attribute, err)),
        }
    }

    pub fn card_html(&self) -> String {
        self.card.inner_html()
    }

    pub fn set_card_html(&self, html: &str) {
        self.card.set_inner_html(html);
    }

    pub fn apply_frame(&self, frame: &ParallaxFrame, renderer: &Renderer) {
        renderer.translate(&self.overlay, 0.0, frame.text_offset);
        renderer.translate(&self.video, 0.0, frame.background_offset);
        renderer.translate(&self.image, 0.0, frame.background_offset);
        // only the background fades, the card stays readable
        let opacity = format!("{:.3}", frame.opacity);
        renderer.set_style(&self.video, "opacity", &opacity);
        renderer.set_style(&self.image, "opacity", &opacity);
    }

    pub fn show_background(&self, background: &Background, renderer: &Renderer) -> Result<()> {
        match background.kind {
            BackgroundKind::Image => {
                self.image.set_src(&background.src);
                renderer.set_style(&self.image, "display", "");
                self.pause()?;
                renderer.set_style(&self.video, "display", "none");
            }
            BackgroundKind::Video => {
                renderer.set_style(&self.image, "display", "none");
                self.replace_video_source(background)?;
                renderer.set_style(&self.video, "display", "");
            }
        }
        Ok(())
    }

    fn replace_video_source(&self, background: &Background) -> Result<()> {
        self.set_data("video-src", Some(&background.src))?;
        self.pause()?;
        self.video
            .remove_attribute("src")
            .map_err(|err| anyhow!("Could not clear video src : {:#?}", err))?;
        let old_sources = self
            .video
            .query_selector_all("source")
            .map_err(|err| anyhow!("Could not list video sources : {:#?}", err))?;
        for index in 0..old_sources.length() {
            if let Some(source) = old_sources
                .item(index)
                .and_then(|node| node.dyn_into::<Element>().ok())
            {
                source.remove();
            }
        }

        let source: HtmlSourceElement = browser::create_element("source")?;
        source.set_src(&background.src);
        source.set_type(background.mime_type());
        self.video
            .append_child(&source)
            .map_err(|err| anyhow!("Could not append video source : {:#?}", err))?;
        self.video.load();
        Ok(())
    }

    pub fn set_loop(&self, looping: bool) {
        self.video.set_loop(looping);
    }

    /// Media time can be set once metadata is in
    pub fn media_ready(&self) -> bool {
        self.video.ready_state() >= HAVE_METADATA
    }

    pub fn media_duration(&self) -> f64 {
        self.video.duration()
    }

    pub fn seek(&self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn pause(&self) -> Result<()> {
        self.video
            .pause()
            .map_err(|err| anyhow!("Could not pause video : {:#?}", err))
    }

    /// Loop flag for the new scrub mode. A visible section also gets the
    /// playback that mode calls for, `scrub_time` is where a scrubbed video
    /// parks
    pub fn apply_scrub_mode(
        &self,
        scrubbing: bool,
        visible: bool,
        kind: BackgroundKind,
        scrub_time: f64,
    ) -> Result<()> {
        self.set_loop(playback::loops(scrubbing));
        if !visible {
            return Ok(());
        }
        self.apply_playback(playback::on_visibility(true, scrubbing, kind, scrub_time))
    }

    pub fn apply_playback(&self, command: PlaybackCommand) -> Result<()> {
        match command {
            PlaybackCommand::Play => {
                let promise = self
                    .video
                    .play()
                    .map_err(|err| anyhow!("Could not start video : {:#?}", err))?;
                browser::settle_quietly(promise, "Video playback");
            }
            PlaybackCommand::Pause => self.pause()?,
            PlaybackCommand::PauseAt(seconds) => {
                self.pause()?;
                self.seek(seconds);
            }
        }
        Ok(())
    }
}

/// The single `.card` child of the overlay. Created around the overlay's
/// content when the page has none
fn ensure_card(overlay: &HtmlElement) -> Result<HtmlElement> {
    if let Some(card) = browser::query::<HtmlElement>(overlay, ":scope > .card")? {
        return Ok(card);
    }
    let card: HtmlElement = browser::create_element("div")?;
    card.set_class_name("card");
    while let Some(child) = overlay.first_child() {
        card.append_child(&child)
            .map_err(|err| anyhow!("Could not move overlay content : {:#?}", err))?;
    }
    overlay
        .append_child(&card)
        .map_err(|err| anyhow!("Could not append card : {:#?}", err))?;
    Ok(card)
}

/// Playback options read each frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollOptions {
    pub scrub: bool,
    pub crossfade: bool,
    pub full_pass: bool,
}

/// Control panel. Every control is optional, a page without any still
/// scrolls
#[derive(Clone, Default)]
pub struct Controls {
    pub scrub: Option<HtmlInputElement>,
    pub crossfade: Option<HtmlInputElement>,
    pub scrub_full_pass: Option<HtmlInputElement>,
    pub mask: Option<HtmlSelectElement>,
    pub theme: Option<HtmlSelectElement>,
    pub background: Option<HtmlSelectElement>,
    pub align: Option<HtmlSelectElement>,
    pub card: Option<HtmlInputElement>,
    pub edit: Option<HtmlInputElement>,
    pub text_input: Option<HtmlTextAreaElement>,
    pub apply_text: Option<HtmlButtonElement>,
    pub save_text: Option<HtmlButtonElement>,
    pub restore_text: Option<HtmlButtonElement>,
    pub gradient: Option<HtmlInputElement>,
}

fn checked(input: &Option<HtmlInputElement>, fallback: bool) -> bool {
    input.as_ref().map_or(fallback, HtmlInputElement::checked)
}

impl Controls {
    pub fn find() -> Self {
        Controls {
            scrub: browser::optional_element(html::SCRUB),
            crossfade: browser::optional_element(html::CROSSFADE),
            scrub_full_pass: browser::optional_element(html::SCRUB_FULL_PASS),
            mask: browser::optional_element(html::MASK),
            theme: browser::optional_element(html::THEME),
            background: browser::optional_element(html::BACKGROUND),
            align: browser::optional_element(html::ALIGN),
            card: browser::optional_element(html::CARD),
            edit: browser::optional_element(html::EDIT),
            text_input: browser::optional_element(html::TEXT_INPUT),
            apply_text: browser::optional_element(html::APPLY_TEXT),
            save_text: browser::optional_element(html::SAVE_TEXT),
            restore_text: browser::optional_element(html::RESTORE_TEXT),
            gradient: browser::optional_element(html::GRADIENT),
        }
    }

    pub fn options(&self) -> ScrollOptions {
        ScrollOptions {
            scrub: checked(&self.scrub, false),
            crossfade: checked(&self.crossfade, true),
            full_pass: checked(&self.scrub_full_pass, false),
        }
    }

    pub fn gradient(&self) -> bool {
        checked(&self.gradient, false)
    }

    pub fn card(&self) -> bool {
        checked(&self.card, true)
    }

    pub fn editing(&self) -> bool {
        checked(&self.edit, false)
    }

    pub fn mask(&self) -> Option<String> {
        select_value(&self.mask)
    }

    pub fn theme(&self) -> String {
        select_value(&self.theme).unwrap_or_else(|| DEFAULT_THEME.to_string())
    }

    pub fn align(&self) -> Option<String> {
        select_value(&self.align)
    }

    pub fn background(&self) -> Option<String> {
        select_value(&self.background)
    }

    pub fn text(&self) -> Option<String> {
        self.text_input.as_ref().map(HtmlTextAreaElement::value)
    }

    /// Puts the active section's settings into the controls
    pub fn reflect(&self, section: &SectionState<'_>) {
        if let Some(align) = &self.align {
            align.set_value(section.config.align.as_str());
        }
        if let Some(card) = &self.card {
            card.set_checked(section.config.use_card);
        }
        if let Some(mask) = &self.mask {
            mask.set_value(section.config.mask.as_deref().unwrap_or(""));
        }
        if let Some(theme) = &self.theme {
            theme.set_value(section.config.theme.as_deref().unwrap_or(DEFAULT_THEME));
        }
        if let Some(background) = &self.background {
            background.set_value(section.background_src);
        }
        if let Some(edit) = &self.edit {
            edit.set_checked(section.editing);
        }
        if let Some(input) = &self.text_input {
            input.set_disabled(false);
            if !has_focus(input) {
                input.set_value(section.saved_raw);
            }
        }
        for button in [&self.apply_text, &self.save_text, &self.restore_text]
            .into_iter()
            .flatten()
        {
            button.set_disabled(!section.editing);
        }
    }

    /// Replaces the background choices
    pub fn fill_backgrounds(&self, options: &[BackgroundOption]) -> Result<()> {
        if let Some(select) = &self.background {
            select.set_inner_html("");
            for option in options {
                append_option(select, option)?;
            }
        }
        Ok(())
    }

    pub fn add_background(&self, option: &BackgroundOption) -> Result<()> {
        match &self.background {
            Some(select) => append_option(select, option),
            None => Ok(()),
        }
    }
}

/// What [`Controls::reflect`] needs to know about a section
pub struct SectionState<'a> {
    pub config: &'a SectionConfig,
    pub background_src: &'a str,
    pub editing: bool,
    pub saved_raw: &'a str,
}

fn select_value(select: &Option<HtmlSelectElement>) -> Option<String> {
    select
        .as_ref()
        .map(HtmlSelectElement::value)
        .filter(|value| !value.is_empty())
}

fn has_focus(element: &HtmlTextAreaElement) -> bool {
    browser::document()
        .ok()
        .and_then(|document| document.active_element())
        .map_or(false, |active| active.is_same_node(Some(element.as_ref())))
}

fn append_option(select: &HtmlSelectElement, option: &BackgroundOption) -> Result<()> {
    let element: HtmlOptionElement = browser::create_element("option")?;
    element.set_value(&option.value);
    element.set_text(&option.label);
    element
        .set_attribute("data-type", option.kind.as_str())
        .map_err(|err| anyhow!("Could not set option type : {:#?}", err))?;
    select
        .append_child(&element)
        .map_err(|err| anyhow!("Could not append option : {:#?}", err))?;
    Ok(())
}

/// Text of the `<script type="application/json" id="assetManifest">` block
pub fn embedded_manifest() -> Option<String> {
    browser::optional_element::<Element>(html::ASSET_MANIFEST)?
        .text_content()
        .filter(|text| !text.trim().is_empty())
}
