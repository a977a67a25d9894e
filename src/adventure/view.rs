use super::area::Hotspot;
use super::interaction::{Prompt, PromptLine};
use super::inventory::Inventory;
use super::world::{Viewport, World};
use crate::browser;
use crate::engine::Renderer;
use anyhow::{anyhow, Result};
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, HtmlInputElement};

// Element IDs of the fixed page structure
mod html {
    pub const WORLD: &str = "world";
    pub const PARALLAX: &str = "parallax";
    pub const HOTSPOTS: &str = "hotspots";
    pub const PLAYER: &str = "player";
    pub const INVENTORY: &str = "inventory";
    pub const AREA_NAME: &str = "areaName";
    pub const AREA_PREV: &str = "btnAreaPrev";
    pub const AREA_NEXT: &str = "btnAreaNext";
    pub const MOUSE_FOLLOW: &str = "mouseFollow";
    pub const MODAL: &str = "modal";
    pub const MODAL_TITLE: &str = "modalTitle";
    pub const MODAL_BODY: &str = "modalBody";
    pub const MODAL_CLOSE: &str = "modalClose";
    pub const MODAL_PRIMARY: &str = "modalActionPrimary";
    pub const MODAL_SECONDARY: &str = "modalActionSecondary";
}

/// Clicks on the page, queued for the next frame
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    Hotspot(String),
    PromptPrimary,
    PromptDismiss,
    PreviousArea,
    NextArea,
}

struct Modal {
    root: HtmlElement,
    title: HtmlElement,
    body: HtmlElement,
    primary: HtmlElement,
}

/// Projects a [`World`] onto the page
pub struct AdventureView {
    root: HtmlElement,
    world: HtmlElement,
    parallax: HtmlElement,
    hotspot_layer: HtmlElement,
    player: HtmlElement,
    inventory: HtmlElement,
    area_name: HtmlElement,
    mouse_follow: Option<HtmlInputElement>,
    modal: Modal,
    hotspot_buttons: Vec<(String, HtmlElement)>,
    rendered_area: Option<usize>,
    rendered_inventory: Option<Inventory>,
    rendered_prompt: Option<Prompt>,
}

impl AdventureView {
    pub fn bind(root_id: &str) -> Result<(Self, UnboundedReceiver<UiAction>)> {
        let view = AdventureView {
            root: browser::element_by_id(root_id)?,
            world: browser::element_by_id(html::WORLD)?,
            parallax: browser::element_by_id(html::PARALLAX)?,
            hotspot_layer: browser::element_by_id(html::HOTSPOTS)?,
            player: browser::element_by_id(html::PLAYER)?,
            inventory: browser::element_by_id(html::INVENTORY)?,
            area_name: browser::element_by_id(html::AREA_NAME)?,
            mouse_follow: browser::optional_element(html::MOUSE_FOLLOW),
            modal: Modal {
                root: browser::element_by_id(html::MODAL)?,
                title: browser::element_by_id(html::MODAL_TITLE)?,
                body: browser::element_by_id(html::MODAL_BODY)?,
                primary: browser::element_by_id(html::MODAL_PRIMARY)?,
            },
            hotspot_buttons: Vec::new(),
            rendered_area: None,
            rendered_inventory: None,
            rendered_prompt: None,
        };

        let (tx, rx) = unbounded();
        let buttons = [
            (html::AREA_PREV, UiAction::PreviousArea),
            (html::AREA_NEXT, UiAction::NextArea),
            (html::MODAL_PRIMARY, UiAction::PromptPrimary),
            (html::MODAL_SECONDARY, UiAction::PromptDismiss),
            (html::MODAL_CLOSE, UiAction::PromptDismiss),
        ];
        for (id, action) in buttons {
            let button: HtmlElement = browser::element_by_id(id)?;
            let tx = tx.clone();
            browser::listen(&button, "click", move |_| send(&tx, action.clone()))?;
        }

        // one delegated listener, the buttons underneath are rebuilt per area
        browser::listen(&view.hotspot_layer, "click", move |event| {
            let id = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|element| element.closest(".hotspot").ok().flatten())
                .and_then(|button| button.get_attribute("data-id"));
            if let Some(id) = id {
                send(&tx, UiAction::Hotspot(id));
            }
        })?;

        Ok((view, rx))
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: f64::from(self.root.client_width()),
            height: f64::from(self.root.client_height()),
        }
    }

    pub fn follows_pointer(&self) -> bool {
        self.mouse_follow
            .as_ref()
            .map_or(false, HtmlInputElement::checked)
    }

    pub fn render(&mut self, world: &World, renderer: &Renderer) -> Result<()> {
        let area_changed = self.rendered_area != Some(world.area_index());
        if area_changed {
            self.build_area(world, renderer)?;
            self.rendered_area = Some(world.area_index());
        }
        if self.rendered_inventory.as_ref() != Some(world.inventory()) {
            self.render_inventory(world.inventory(), renderer)?;
            self.rendered_inventory = Some(world.inventory().clone());
        }

        let camera = world.camera();
        let player = world.player();
        renderer.translate(&self.world, -camera.x, 0.0);
        renderer.set_style(
            &self.player,
            "left",
            &format!("{}px", player.x - camera.x - player.w / 2.0),
        );
        renderer.set_style(
            &self.player,
            "bottom",
            &format!("{}px", world.tuning().floor_offset),
        );

        self.hotspot_buttons.retain(|(id, button)| {
            let keep = !world.is_consumed(id);
            if !keep {
                button.remove();
            }
            keep
        });
        let area = world.area();
        for (id, button) in &self.hotspot_buttons {
            if let Some(hotspot) = area.hotspot(id) {
                renderer.toggle_class(button, "near", world.is_near(hotspot));
                renderer.toggle_class(button, "locked", world.is_locked(hotspot));
            }
        }

        if self.rendered_prompt.as_ref() != world.prompt() {
            self.render_prompt(world.prompt(), renderer)?;
            self.rendered_prompt = world.prompt().cloned();
        }
        Ok(())
    }

    fn build_area(&mut self, world: &World, renderer: &Renderer) -> Result<()> {
        let area = world.area();
        renderer.set_text(&self.area_name, &area.name);
        renderer.set_style(&self.world, "width", &format!("{}px", area.width));
        renderer.set_style(&self.parallax, "background", &area.background);

        self.hotspot_layer.set_inner_html("");
        self.hotspot_buttons.clear();
        for hotspot in world.hotspots() {
            let button = hotspot_button(hotspot, world.is_locked(hotspot), renderer)?;
            append(&self.hotspot_layer, &button)?;
            self.hotspot_buttons.push((hotspot.id.clone(), button));
        }
        Ok(())
    }

    fn render_inventory(&self, inventory: &Inventory, renderer: &Renderer) -> Result<()> {
        self.inventory.set_inner_html("");
        for item in inventory.slots() {
            let class = if item.is_some() { "slot filled" } else { "slot" };
            let slot = element("div", class)?;
            renderer.set_text(&slot, item.unwrap_or(""));
            append(&self.inventory, &slot)?;
        }
        Ok(())
    }

    fn render_prompt(&self, prompt: Option<&Prompt>, renderer: &Renderer) -> Result<()> {
        let Some(prompt) = prompt else {
            renderer.toggle_class(&self.modal.root, "hidden", true);
            return Ok(());
        };
        renderer.set_text(&self.modal.title, &prompt.title);
        self.modal.body.set_inner_html("");
        for line in &prompt.body {
            let paragraph = element("p", "")?;
            match line {
                PromptLine::Text(text) => renderer.set_text(&paragraph, text),
                PromptLine::Requirement(item) => {
                    renderer.set_text(&paragraph, "Requires: ");
                    let strong = element("strong", "")?;
                    renderer.set_text(&strong, item);
                    append(&paragraph, &strong)?;
                }
            }
            append(&self.modal.body, &paragraph)?;
        }
        renderer.set_text(&self.modal.primary, prompt.primary_label);
        renderer.toggle_class(&self.modal.root, "hidden", false);
        Ok(())
    }
}

fn hotspot_button(
    hotspot: &Hotspot,
    locked: bool,
    renderer: &Renderer,
) -> Result<HtmlElement> {
    let button = element("button", "hotspot")?;
    renderer.set_style(&button, "left", &format!("{}px", hotspot.x - hotspot.w / 2.0));
    renderer.set_style(&button, "top", &format!("{}px", hotspot.y - hotspot.h));
    renderer.set_style(&button, "width", &format!("{}px", hotspot.w));
    renderer.set_style(&button, "height", &format!("{}px", hotspot.h));
    set_attribute(&button, "data-id", &hotspot.id)?;
    set_attribute(&button, "data-type", hotspot.kind.as_str())?;
    renderer.toggle_class(&button, "locked", locked);

    let label = element("span", "label")?;
    renderer.set_text(&label, &hotspot.label);
    append(&button, &label)?;
    let hint = element("span", "hint")?;
    renderer.set_text(&hint, "Click or press E");
    append(&button, &hint)?;
    Ok(button)
}

fn element(tag: &str, class: &str) -> Result<HtmlElement> {
    let element: HtmlElement = browser::create_element(tag)?;
    if !class.is_empty() {
        element.set_class_name(class);
    }
    Ok(element)
}

fn append(parent: &Element, child: &Element) -> Result<()> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|err| anyhow!("Could not append child : {:#?}", err))
}

fn set_attribute(element: &Element, name: &str, value: &str) -> Result<()> {
    element
        .set_attribute(name, value)
        .map_err(|err| anyhow!("Could not set {} : {:#?}", name, err))
}

fn send(tx: &UnboundedSender<UiAction>, action: UiAction) {
    let _ = tx.unbounded_send(action);
}
