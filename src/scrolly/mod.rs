//! Scroll-driven storytelling over the page's `section.panel` elements.
//!
//! Scroll and resize events are coalesced into at most one pending
//! animation frame. Each frame recomputes every section's progress, applies
//! parallax and crossfade, scrubs video when asked to, and moves the control
//! panel to whichever section sits closest to the viewport center. An
//! IntersectionObserver starts and stops playback as sections come and go.

pub mod assets;
pub mod playback;
pub mod progress;
pub mod section;
pub mod text;
pub mod view;

use self::assets::{AssetManifest, BackgroundOption, MediaKind};
use self::progress::{ParallaxFrame, ParallaxTuning, ScrollProgress, ScrubThrottle};
use self::section::{Align, Background, BackgroundKind, SectionConfig, SectionDefaults};
use self::text::{BrowserStore, CardText, StorageKeys};
use self::view::{Controls, ScrollOptions, SectionState, SectionView};
use crate::browser;
use crate::engine::Renderer;
use anyhow::{anyhow, Context, Result};
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
#[rustfmt::skip]
use web_sys::{
    Element,
    HtmlElement,
    IntersectionObserver,
    IntersectionObserverEntry,
    IntersectionObserverInit,
};

const SECTION_SELECTOR: &str = "section.panel";
const VISIBILITY_THRESHOLD: f64 = 0.01;

type SharedStory = Rc<RefCell<ScrollStory>>;

struct Section {
    config: SectionConfig,
    view: SectionView,
    text: CardText,
    progress: ScrollProgress,
    throttle: ScrubThrottle,
    visible: bool,
}

impl Section {
    fn bind(
        element: HtmlElement,
        defaults: &SectionDefaults,
        store: &BrowserStore,
        renderer: &Renderer,
    ) -> Result<Self> {
        let config = SectionConfig::from_attributes(
            |name| element.get_attribute(name),
            &element.id(),
            defaults,
        );
        let view = SectionView::bind(element, &config, renderer)
            .with_context(|| format!("Section '{}'", config.storage_base()))?;

        // default markup is captured before saved edits replace it
        let mut text = CardText::new(StorageKeys::new(config.storage_base()), view.card_html());
        match text.load_saved(store) {
            Ok(true) => view.set_card_html(text.html()),
            Ok(false) => {}
            Err(err) => warn!("Saved text of '{}' not loaded : {}", config.storage_base(), err),
        }

        Ok(Section {
            config,
            view,
            text,
            progress: ScrollProgress::default(),
            throttle: ScrubThrottle::default(),
            visible: false,
        })
    }

    fn background_src(&self) -> &str {
        self.config
            .background
            .as_ref()
            .map_or("", |background| background.src.as_str())
    }

    fn scrub_time(&self, full_pass: bool) -> f64 {
        progress::scrub_time(
            self.progress.select(full_pass),
            self.view.media_duration(),
            self.config.duration_hint,
        )
    }

    fn update(
        &mut self,
        scroll_y: f64,
        viewport_height: f64,
        now: f64,
        options: &ScrollOptions,
        tuning: &ParallaxTuning,
        renderer: &Renderer,
    ) {
        let (top, height) = self.view.document_geometry();
        self.progress = ScrollProgress::compute(scroll_y, viewport_height, top, height);
        let frame = ParallaxFrame::compute(
            self.progress.pinned,
            self.config.text_speed,
            self.config.video_speed,
            options.crossfade,
            tuning,
        );
        self.view.apply_frame(&frame, renderer);

        if options.scrub
            && self.config.background_kind() == BackgroundKind::Video
            && self.view.media_ready()
            && self.throttle.ready(now, tuning.scrub_interval_ms)
        {
            self.view.seek(self.scrub_time(options.full_pass));
        }
    }

    fn apply_scrub_mode(&self, options: &ScrollOptions) -> Result<()> {
        self.view.apply_scrub_mode(
            options.scrub,
            self.visible,
            self.config.background_kind(),
            self.scrub_time(options.full_pass),
        )
    }

    fn apply_playback_policy(&self, options: &ScrollOptions) -> Result<()> {
        let command = playback::on_visibility(
            self.visible,
            options.scrub,
            self.config.background_kind(),
            self.scrub_time(options.full_pass),
        );
        self.view.apply_playback(command)
    }
}

pub struct ScrollStory {
    sections: Vec<Section>,
    active: usize,
    controls: Controls,
    backgrounds: Vec<BackgroundOption>,
    store: BrowserStore,
    tuning: ParallaxTuning,
    renderer: Renderer,
    // held for the life of the page
    _observer: Option<IntersectionObserver>,
}

impl ScrollStory {
    fn bind(defaults: &SectionDefaults, tuning: ParallaxTuning) -> Result<Self> {
        let renderer = Renderer;
        let storage = match browser::local_storage() {
            Ok(storage) => Some(storage),
            Err(err) => {
                warn!("Text edits will not persist : {:#}", err);
                None
            }
        };
        let store = BrowserStore::new(storage);

        let mut sections = Vec::new();
        for element in browser::query_all::<HtmlElement>(SECTION_SELECTOR)? {
            match Section::bind(element, defaults, &store, &renderer) {
                Ok(section) => sections.push(section),
                Err(err) => warn!("Skipping section : {:#}", err),
            }
        }
        log!("Scrollytelling over {} sections", sections.len());

        let controls = Controls::find();
        let backgrounds = load_backgrounds();
        controls.fill_backgrounds(&backgrounds)?;
        let looping = playback::loops(controls.options().scrub);
        for section in &sections {
            section.view.set_loop(looping);
        }

        Ok(ScrollStory {
            sections,
            active: 0,
            controls,
            backgrounds,
            store,
            tuning,
            renderer,
            _observer: None,
        })
    }

    fn on_frame(&mut self) -> Result<()> {
        let scroll_y = browser::scroll_y()?;
        let viewport_height = browser::viewport_height()?;
        let now = browser::now()?;
        let options = self.controls.options();
        for section in &mut self.sections {
            section.update(
                scroll_y,
                viewport_height,
                now,
                &options,
                &self.tuning,
                &self.renderer,
            );
        }

        let active = progress::pick_active(
            self.sections
                .iter()
                .map(|section| section.view.viewport_geometry()),
            viewport_height,
        );
        if active != self.active {
            self.active = active;
            self.reflect_active()?;
        }
        Ok(())
    }

    fn on_visibility(&mut self, target: &Element, visible: bool) -> Result<()> {
        let options = self.controls.options();
        match self.sections.iter_mut().find(|section| section.view.is(target)) {
            Some(section) => {
                section.visible = visible;
                section.apply_playback_policy(&options)
            }
            None => Ok(()),
        }
    }

    fn reflect_active(&mut self) -> Result<()> {
        let Some(section) = self.sections.get(self.active) else {
            return Ok(());
        };
        let src = section.background_src();
        if !src.is_empty() && !self.backgrounds.iter().any(|option| option.value == src) {
            let option = BackgroundOption::for_path(src);
            self.controls.add_background(&option)?;
            self.backgrounds.push(option);
        }
        let saved_raw = section.text.saved_raw(&self.store).unwrap_or_else(|err| {
            warn!("Saved text of '{}' not read : {}", section.config.storage_base(), err);
            String::new()
        });
        self.controls.reflect(&SectionState {
            config: &section.config,
            background_src: src,
            editing: section.text.is_editing(),
            saved_raw: &saved_raw,
        });
        Ok(())
    }

    fn active_section(&mut self) -> Result<&mut Section> {
        self.sections
            .get_mut(self.active)
            .ok_or_else(|| anyhow!("No section is active"))
    }

    // ==================== Controls ====================
    fn align_changed(&mut self) -> Result<()> {
        let Some(align) = self.controls.align().as_deref().and_then(Align::parse) else {
            return Ok(());
        };
        let renderer = Renderer;
        let section = self.active_section()?;
        section.config.align = align;
        section.view.set_data("align", Some(align.as_str()))?;
        section.view.apply_presentation(&section.config, &renderer);
        Ok(())
    }

    fn card_changed(&mut self) -> Result<()> {
        let use_card = self.controls.card();
        let renderer = Renderer;
        let section = self.active_section()?;
        section.config.use_card = use_card;
        section.view.set_data("card", Some(if use_card { "true" } else { "false" }))?;
        section.view.apply_presentation(&section.config, &renderer);
        Ok(())
    }

    fn mask_changed(&mut self) -> Result<()> {
        let mask = self.controls.mask();
        let section = self.active_section()?;
        section.view.set_data("mask", mask.as_deref())?;
        section.config.mask = mask;
        Ok(())
    }

    fn theme_changed(&mut self) -> Result<()> {
        let theme = self.controls.theme();
        let section = self.active_section()?;
        section.view.set_data("theme", Some(theme.as_str()))?;
        section.config.theme = Some(theme);
        Ok(())
    }

    fn background_changed(&mut self) -> Result<()> {
        let Some(src) = self.controls.background() else {
            return Ok(());
        };
        let kind = self
            .backgrounds
            .iter()
            .find(|option| option.value == src)
            .map_or_else(|| MediaKind::from_path(&src), |option| option.kind);
        let background = Background::new(&src, kind);
        let options = self.controls.options();
        let renderer = Renderer;

        let section = self.active_section()?;
        section.view.show_background(&background, &renderer)?;
        section.config.background = Some(background);
        section.apply_playback_policy(&options)
    }

    fn edit_toggled(&mut self) -> Result<()> {
        let editing = self.controls.editing();
        self.active_section()?.text.set_editing(editing);
        self.reflect_active()
    }

    fn apply_text(&mut self) -> Result<()> {
        let Some(raw) = self.controls.text() else {
            return Ok(());
        };
        let section = self.active_section()?;
        let html = section.text.apply(&raw);
        section.view.set_card_html(html);
        Ok(())
    }

    fn save_text(&mut self) -> Result<()> {
        let Some(raw) = self.controls.text() else {
            return Ok(());
        };
        let section = self
            .sections
            .get_mut(self.active)
            .ok_or_else(|| anyhow!("No section is active"))?;
        let saved = section.text.save(&raw, &self.store);
        section.view.set_card_html(section.text.html());
        saved.with_context(|| format!("Saving text of '{}'", section.config.storage_base()))
    }

    fn restore_text(&mut self) -> Result<()> {
        let restored = {
            let section = self
                .sections
                .get_mut(self.active)
                .ok_or_else(|| anyhow!("No section is active"))?;
            let restored = section.text.restore(&self.store);
            section.view.set_card_html(section.text.html());
            restored.with_context(|| {
                format!("Restoring text of '{}'", section.config.storage_base())
            })
        };
        self.reflect_active()?;
        restored
    }

    fn gradient_changed(&mut self) -> Result<()> {
        let body = browser::body()?;
        self.renderer
            .toggle_class(&body, "has-gradient", self.controls.gradient());
        Ok(())
    }

    fn scrub_changed(&mut self) -> Result<()> {
        let options = self.controls.options();
        for section in &self.sections {
            if let Err(err) = section.apply_scrub_mode(&options) {
                warn!("Playback of '{}' not updated : {:#}", section.config.storage_base(), err);
            }
        }
        Ok(())
    }
}

/// Background choices from the page's embedded manifest
fn load_backgrounds() -> Vec<BackgroundOption> {
    let Some(text) = view::embedded_manifest() else {
        return Vec::new();
    };
    match AssetManifest::parse(&text) {
        Ok(manifest) => manifest.options(),
        Err(err) => {
            warn!("Ignoring malformed asset manifest : {}", err);
            Vec::new()
        }
    }
}

/// Binds the page and paints the first frame
pub fn start() -> Result<()> {
    let story = ScrollStory::bind(&SectionDefaults::default(), ParallaxTuning::default())?;
    let story: SharedStory = Rc::new(RefCell::new(story));

    let observer = observe_visibility(&story)?;
    story.borrow_mut()._observer = Some(observer);
    bind_controls(&story)?;

    let schedule = scroll_scheduler(&story);
    let window = browser::window()?;
    {
        let schedule = schedule.clone();
        browser::listen_passive(&window, "scroll", move |_| schedule())?;
    }
    browser::listen(&window, "resize", move |_| schedule())?;

    let mut story = story.borrow_mut();
    story.gradient_changed()?;
    story.on_frame()?;
    story.reflect_active()
}

/// At most one animation frame is pending however many events arrive
fn scroll_scheduler(story: &SharedStory) -> Rc<dyn Fn()> {
    let story = story.clone();
    browser::coalesce_frames(move || {
        if let Err(err) = story.borrow_mut().on_frame() {
            error!("Scroll frame failed : {:#}", err);
        }
    })
}

fn observe_visibility(story: &SharedStory) -> Result<IntersectionObserver> {
    let callback = {
        let story = story.clone();
        browser::closure_wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                let mut story = story.borrow_mut();
                for entry in entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                {
                    let visible = entry.is_intersecting();
                    if let Err(err) = story.on_visibility(&entry.target(), visible) {
                        warn!("Visibility change not applied : {:#}", err);
                    }
                }
            },
        ) as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>)
    };

    let options = IntersectionObserverInit::new();
    options.set_root_margin("0px");
    options.set_threshold(&JsValue::from_f64(VISIBILITY_THRESHOLD));
    let observer =
        IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &options)
            .map_err(|err| anyhow!("Could not create IntersectionObserver : {:#?}", err))?;
    callback.forget();

    for section in &story.borrow().sections {
        observer.observe(section.view.element());
    }
    Ok(observer)
}

fn bind_controls(story: &SharedStory) -> Result<()> {
    let controls = story.borrow().controls.clone();
    on(story, controls.align.as_deref(), "change", ScrollStory::align_changed)?;
    on(story, controls.card.as_deref(), "change", ScrollStory::card_changed)?;
    on(story, controls.mask.as_deref(), "change", ScrollStory::mask_changed)?;
    on(story, controls.theme.as_deref(), "change", ScrollStory::theme_changed)?;
    on(story, controls.background.as_deref(), "change", ScrollStory::background_changed)?;
    on(story, controls.edit.as_deref(), "change", ScrollStory::edit_toggled)?;
    on(story, controls.apply_text.as_deref(), "click", ScrollStory::apply_text)?;
    on(story, controls.save_text.as_deref(), "click", ScrollStory::save_text)?;
    on(story, controls.restore_text.as_deref(), "click", ScrollStory::restore_text)?;
    on(story, controls.gradient.as_deref(), "change", ScrollStory::gradient_changed)?;
    on(story, controls.scrub.as_deref(), "change", ScrollStory::scrub_changed)?;
    Ok(())
}

/// Runs `handler` on the story for every `event` of an optional control
fn on(
    story: &SharedStory,
    target: Option<&HtmlElement>,
    event: &'static str,
    handler: fn(&mut ScrollStory) -> Result<()>,
) -> Result<()> {
    let Some(target) = target else {
        return Ok(());
    };
    let story = story.clone();
    browser::listen(target, event, move |_| {
        if let Err(err) = handler(&mut story.borrow_mut()) {
            warn!("Control {} failed : {:#}", event, err);
        }
    })
}
