//! Browser tests, run with `wasm-pack test --headless --firefox`
#![cfg(target_arch = "wasm32")]

use scrolly_adventure::browser;
use scrolly_adventure::engine::Renderer;
use scrolly_adventure::scrolly::assets::MediaKind;
use scrolly_adventure::scrolly::progress::ParallaxFrame;
use scrolly_adventure::scrolly::section::{
    Background, BackgroundKind, SectionConfig, SectionDefaults,
};
use scrolly_adventure::scrolly::text::{BrowserStore, CardText, StorageKeys, TextStore};
use scrolly_adventure::scrolly::view::SectionView;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use wasm_bindgen_test::*;
use web_sys::{Element, HtmlElement, HtmlVideoElement};

wasm_bindgen_test_configure!(run_in_browser);

fn panel(id: &str, attributes: &[(&str, &str)]) -> HtmlElement {
    let section: HtmlElement = browser::create_element("section").unwrap();
    section.set_id(id);
    section.set_class_name("panel");
    for (name, value) in attributes {
        section.set_attribute(name, value).unwrap();
    }
    section.set_inner_html(
        r#"<div class="sticky"><video class="bg-video"></video><div class="overlay"><h2>Title</h2><p>Body</p></div></div>"#,
    );
    browser::body().unwrap().append_child(&section).unwrap();
    section
}

fn video_of(section: &HtmlElement) -> HtmlVideoElement {
    section
        .query_selector("video")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap()
}

/// Resolves inside the next animation frame callback
async fn next_frame() {
    let promise = js_sys::Promise::new(&mut |resolve, _reject| {
        browser::window()
            .unwrap()
            .request_animation_frame(&resolve)
            .unwrap();
    });
    JsFuture::from(promise).await.unwrap();
}

fn config_of(section: &HtmlElement) -> SectionConfig {
    SectionConfig::from_attributes(
        |name| section.get_attribute(name),
        &section.id(),
        &SectionDefaults::default(),
    )
}

#[wasm_bindgen_test]
fn local_storage_keeps_saved_text() {
    let store = BrowserStore::new(Some(browser::local_storage().unwrap()));
    let keys = StorageKeys::new("web-test");
    let mut text = CardText::new(keys.clone(), "<p>Default</p>".to_string());
    text.save("One\ntwo", &store).unwrap();

    let mut reloaded = CardText::new(keys.clone(), "<p>Default</p>".to_string());
    assert!(reloaded.load_saved(&store).unwrap());
    assert_eq!(reloaded.html(), "<p>One<br>two</p>");
    assert_eq!(reloaded.saved_raw(&store).unwrap(), "One\ntwo");

    reloaded.restore(&store).unwrap();
    assert_eq!(store.get(&keys.markup).unwrap(), None);
    assert_eq!(store.get(&keys.raw).unwrap(), None);
}

#[wasm_bindgen_test]
fn missing_storage_reports_unavailable() {
    let store = BrowserStore::new(None);
    assert!(store.set("scrolly:text:nowhere", "x").is_err());
}

#[wasm_bindgen_test]
fn binding_wraps_overlay_in_a_card() {
    let section = panel(
        "web-card",
        &[
            ("data-align", "left"),
            ("data-card", "false"),
            ("data-card-bg", "red"),
            ("data-video-src", "assets/videos/video2.webm"),
        ],
    );
    let config = config_of(&section);
    let view = SectionView::bind(section.clone(), &config, &Renderer).unwrap();

    let overlay = section.query_selector(".overlay").unwrap().unwrap();
    assert_eq!(overlay.children().length(), 1);
    let card = overlay.query_selector(":scope > .card").unwrap().unwrap();
    assert!(card.inner_html().contains("<h2>Title</h2>"));
    assert!(card.class_list().contains("no-surface"));
    assert!(overlay.class_list().contains("align-left"));
    assert_eq!(view.card_html(), card.inner_html());

    let source = section.query_selector("video > source").unwrap().unwrap();
    assert_eq!(source.get_attribute("type").as_deref(), Some("video/webm"));
    let image: Element = section.query_selector(".sticky > img.bg-image").unwrap().unwrap();
    let next = image.next_element_sibling().unwrap();
    assert!(next.class_list().contains("bg-video"));
}

#[wasm_bindgen_test]
fn switching_backgrounds_swaps_layers() {
    let section = panel("web-background", &[]);
    let config = config_of(&section);
    let renderer = Renderer;
    let view = SectionView::bind(section.clone(), &config, &renderer).unwrap();

    view.show_background(&Background::new("assets/sky.png", MediaKind::Image), &renderer)
        .unwrap();
    let video: HtmlElement = section.query_selector("video").unwrap().unwrap().dyn_into().unwrap();
    assert_eq!(video.style().get_property_value("display").unwrap(), "none");

    view.show_background(&Background::video("assets/videos/video1.mp4"), &renderer)
        .unwrap();
    assert_eq!(section.query_selector_all("video > source").unwrap().length(), 1);
    assert_eq!(
        section.get_attribute("data-video-src").as_deref(),
        Some("assets/videos/video1.mp4")
    );
}

#[wasm_bindgen_test]
fn frame_fades_background_and_moves_overlay() {
    let section = panel("web-frame", &[]);
    let config = config_of(&section);
    let view = SectionView::bind(section.clone(), &config, &Renderer).unwrap();
    view.apply_frame(
        &ParallaxFrame {
            text_offset: -60.0,
            background_offset: 9.0,
            opacity: 0.5,
        },
        &Renderer,
    );
    let overlay: HtmlElement = section
        .query_selector(".overlay")
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    // the card never fades
    assert_eq!(overlay.style().get_property_value("opacity").unwrap(), "");
    let video = video_of(&section);
    assert_eq!(video.style().get_property_value("opacity").unwrap(), "0.5");
    assert!(video
        .style()
        .get_property_value("transform")
        .unwrap()
        .contains("9"));
    assert!(overlay
        .style()
        .get_property_value("transform")
        .unwrap()
        .contains("-60"));
}

#[wasm_bindgen_test]
async fn repeated_triggers_share_one_frame() {
    let runs = Rc::new(Cell::new(0));
    let trigger = {
        let runs = runs.clone();
        browser::coalesce_frames(move || runs.set(runs.get() + 1))
    };
    trigger();
    trigger();
    next_frame().await;
    next_frame().await;
    assert_eq!(runs.get(), 1);

    trigger();
    next_frame().await;
    next_frame().await;
    assert_eq!(runs.get(), 2);
}

#[wasm_bindgen_test]
fn scrub_mode_stops_looping_and_parks_visible_video() {
    let section = panel("web-scrub", &[("data-video-src", "assets/videos/video1.mp4")]);
    let config = config_of(&section);
    let view = SectionView::bind(section.clone(), &config, &Renderer).unwrap();
    let video = video_of(&section);

    view.apply_scrub_mode(false, true, BackgroundKind::Video, 0.0)
        .unwrap();
    assert!(video.loop_());

    view.apply_scrub_mode(true, true, BackgroundKind::Video, 0.0)
        .unwrap();
    assert!(!video.loop_());
    assert!(video.paused());
}

#[wasm_bindgen_test]
fn scrub_mode_only_sets_loop_on_hidden_sections() {
    let section = panel("web-scrub-hidden", &[]);
    let config = config_of(&section);
    let view = SectionView::bind(section.clone(), &config, &Renderer).unwrap();
    let video = video_of(&section);

    view.apply_scrub_mode(true, false, BackgroundKind::Video, 0.0)
        .unwrap();
    assert!(!video.loop_());
    view.apply_scrub_mode(false, false, BackgroundKind::Video, 0.0)
        .unwrap();
    assert!(video.loop_());
    assert!(video.paused());
}
