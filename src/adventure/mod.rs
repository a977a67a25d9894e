//! Side-scrolling adventure: a player walks through areas, picks things up
//! and opens doors.
//!
//! ┌────────────── Frame ──────────────┐
//! │ GameLoop ─► Adventure::update     │
//! │             ├─ drain UiAction     │
//! │             └─ World::step        │
//! │ GameLoop ─► Adventure::draw       │
//! │             └─ AdventureView      │
//! └───────────────────────────────────┘
//! `World` is plain data and is tested without a browser, `AdventureView`
//! is the only part that knows about the page.

pub mod area;
pub mod config;
pub mod interaction;
pub mod inventory;
pub mod player;
pub mod view;
pub mod world;

use self::config::{Content, ContentDocument};
use self::view::{AdventureView, UiAction};
use self::world::{FrameInput, Pointer, World};
use crate::browser;
use crate::engine::input::Input;
use crate::engine::{Game, Renderer};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use futures::channel::mpsc::UnboundedReceiver;
use web_sys::HtmlElement;

// optional attribute on the game root pointing at a content document
const CONTENT_SRC_ATTRIBUTE: &str = "data-content-src";

pub enum Adventure {
    /// Content and page are not bound yet
    Loading { root_id: String },
    Playing(Box<Session>),
}

pub struct Session {
    world: World,
    view: AdventureView,
    actions: UnboundedReceiver<UiAction>,
}

impl Adventure {
    pub fn new(root_id: &str) -> Self {
        Adventure::Loading {
            root_id: root_id.to_string(),
        }
    }

    async fn load_content(root_id: &str) -> Result<Content> {
        let root: HtmlElement = browser::element_by_id(root_id)?;
        match root.get_attribute(CONTENT_SRC_ATTRIBUTE) {
            Some(src) => {
                let document = browser::fetch_json::<ContentDocument>(&src)
                    .await
                    .with_context(|| format!("Failed to load adventure content from : {}", src))?;
                log!("Loaded adventure content from {}", src);
                Ok(Content::from_document(document)?)
            }
            None => Ok(Content::builtin()?),
        }
    }
}

#[async_trait(?Send)]
impl Game for Adventure {
    async fn initialize(&self) -> Result<Box<dyn Game>> {
        match self {
            Adventure::Loading { root_id } => {
                let content = Self::load_content(root_id).await?;
                let (view, actions) = AdventureView::bind(root_id)?;
                let world = World::new(content, view.viewport());
                Ok(Box::new(Adventure::Playing(Box::new(Session {
                    world,
                    view,
                    actions,
                }))))
            }
            Adventure::Playing(_) => Err(anyhow!("Adventure is already initialized")),
        }
    }

    fn update(&mut self, dt: f64, input: &Input) {
        if let Adventure::Playing(session) = self {
            session.update(dt, input);
        }
    }

    fn draw(&mut self, renderer: &Renderer) {
        if let Adventure::Playing(session) = self {
            if let Err(err) = session.view.render(&session.world, renderer) {
                error!("Adventure render failed : {:#}", err);
            }
        }
    }

    fn is_suspended(&self) -> bool {
        matches!(self, Adventure::Playing(session) if session.world.prompt().is_some())
    }
}

impl Session {
    fn update(&mut self, dt: f64, input: &Input) {
        while let Ok(action) = self.actions.try_recv() {
            match action {
                UiAction::Hotspot(id) => {
                    self.world.interact(&id);
                }
                UiAction::PromptPrimary => self.world.accept_prompt(),
                UiAction::PromptDismiss => self.world.dismiss_prompt(),
                UiAction::PreviousArea => {
                    self.world.previous_area();
                }
                UiAction::NextArea => {
                    self.world.next_area();
                }
            }
        }

        let keys = &input.keys;
        let frame = FrameInput {
            dt,
            left: keys.is_pressed("ArrowLeft") || keys.is_pressed("KeyA"),
            right: keys.is_pressed("ArrowRight") || keys.is_pressed("KeyD"),
            interact: keys.was_tapped("KeyE"),
            follow_pointer: self.view.follows_pointer(),
            pointer: Pointer {
                x: input.pointer.x,
                y: input.pointer.y,
                inside: input.pointer.inside,
            },
            viewport: self.view.viewport(),
        };
        self.world.step(&frame);
    }
}
