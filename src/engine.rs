use crate::browser;
use anyhow::{anyhow, Result};
// web assembly is a single threaded environment, so Rc RefCell > Mutex
use async_trait::async_trait;
use std::cell::RefCell;
use std::rc::Rc;
use web_sys::{Element, HtmlElement};

use self::input::{Input, InputEvent};
use futures::channel::mpsc::UnboundedReceiver;

#[async_trait(?Send)]
pub trait Game {
    async fn initialize(&self) -> Result<Box<dyn Game>>;
    fn update(&mut self, dt: f64, input: &Input);
    fn draw(&mut self, renderer: &Renderer);
    /// While suspended the loop keeps running but key presses are dropped,
    /// releases still go through so no key stays stuck
    fn is_suspended(&self) -> bool {
        false
    }
}

// longest step we integrate, a tab coming back from the background would
// otherwise teleport everything
pub const MAX_FRAME_SECONDS: f64 = 0.05;

pub struct GameLoop {
    last_frame: f64,
}

type SharedLoopClosure = Rc<RefCell<Option<browser::LoopClosure>>>;

impl GameLoop {
    /// Runs `game` once per display refresh, `surface_id` names the element
    /// pointer coordinates are measured against
    pub async fn start(game: impl Game + 'static, surface_id: &str) -> Result<()> {
        let surface: HtmlElement = browser::element_by_id(surface_id)?;
        let mut events = input::prepare_input(&surface)?;
        let mut game = game.initialize().await?;
        let mut game_loop = GameLoop {
            last_frame: browser::now()?,
        };
        let renderer = Renderer;
        let mut input = Input::default();

        let f: SharedLoopClosure = Rc::new(RefCell::new(None));
        let g = f.clone();
        *g.borrow_mut() = Some(browser::create_raf_closure(move |perf: f64| {
            drain_events(&mut events, &mut input, game.is_suspended());
            let dt = game_loop.frame_delta(perf);
            game.update(dt, &input);
            input.keys.end_frame();
            game.draw(&renderer);
            if let Some(next) = f.borrow().as_ref() {
                if let Err(err) = browser::request_animation_frame(next) {
                    error!("GameLoop stopped : {:#}", err);
                }
            }
        }));

        browser::request_animation_frame(
            g.borrow()
                .as_ref()
                .ok_or_else(|| anyhow!("GameLoop: Loop is None"))?,
        )?;

        Ok(())
    }

    /// Seconds since the previous frame, clamped to [0, MAX_FRAME_SECONDS]
    fn frame_delta(&mut self, perf: f64) -> f64 {
        let dt = ((perf - self.last_frame) / 1000.0).clamp(0.0, MAX_FRAME_SECONDS);
        self.last_frame = perf;
        dt
    }
}

fn drain_events(events: &mut UnboundedReceiver<InputEvent>, input: &mut Input, suspended: bool) {
    while let Ok(event) = events.try_recv() {
        input.apply(event, suspended);
    }
}

/// Projects state onto the DOM. Styles are the only "pixels" we push
pub struct Renderer;

impl Renderer {
    pub fn translate(&self, element: &HtmlElement, x: f64, y: f64) {
        // + 0.0 turns -0 into 0
        self.set_style(
            element,
            "transform",
            &format!("translate3d({:.2}px, {:.2}px, 0)", x + 0.0, y + 0.0),
        );
    }

    pub fn set_style(&self, element: &HtmlElement, property: &str, value: &str) {
        if let Err(err) = element.style().set_property(property, value) {
            error!("Could not set style {} : {:?}", property, err);
        }
    }

    pub fn toggle_class(&self, element: &Element, class: &str, on: bool) {
        if let Err(err) = element.class_list().toggle_with_force(class, on) {
            error!("Could not toggle class {} : {:?}", class, err);
        }
    }

    pub fn set_text(&self, element: &Element, text: &str) {
        element.set_text_content(Some(text));
    }
}

pub mod input {
    use crate::browser;
    use anyhow::Result;
    use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
    use std::collections::HashSet;
    use wasm_bindgen::JsCast;
    use web_sys::{HtmlElement, KeyboardEvent, MouseEvent};

    #[derive(Debug, Clone, PartialEq)]
    pub enum InputEvent {
        KeyDown(String),
        KeyUp(String),
        /// surface relative coordinates
        PointerMove { x: f64, y: f64 },
        PointerEnter,
        PointerLeave,
    }

    /// Held keys plus the keys pressed since the previous frame, by
    /// `KeyboardEvent.code`
    #[derive(Debug, Default)]
    pub struct KeyState {
        pressed: HashSet<String>,
        tapped: Vec<String>,
    }

    impl KeyState {
        pub fn is_pressed(&self, code: &str) -> bool {
            self.pressed.contains(code)
        }

        pub fn was_tapped(&self, code: &str) -> bool {
            self.tapped.iter().any(|tapped| tapped == code)
        }

        fn press(&mut self, code: String) {
            self.pressed.insert(code.clone());
            self.tapped.push(code);
        }

        fn release(&mut self, code: &str) {
            self.pressed.remove(code);
        }

        pub(crate) fn end_frame(&mut self) {
            self.tapped.clear();
        }
    }

    #[derive(Debug, Default, Clone, Copy, PartialEq)]
    pub struct PointerState {
        pub x: f64,
        pub y: f64,
        pub inside: bool,
    }

    #[derive(Debug, Default)]
    pub struct Input {
        pub keys: KeyState,
        pub pointer: PointerState,
    }

    impl Input {
        pub fn apply(&mut self, event: InputEvent, suspended: bool) {
            match event {
                InputEvent::KeyDown(code) => {
                    if !suspended {
                        self.keys.press(code);
                    }
                }
                InputEvent::KeyUp(code) => self.keys.release(&code),
                InputEvent::PointerMove { x, y } => {
                    self.pointer.x = x;
                    self.pointer.y = y;
                }
                InputEvent::PointerEnter => self.pointer.inside = true,
                InputEvent::PointerLeave => self.pointer.inside = false,
            }
        }
    }

    // keys that would otherwise scroll the page under the game
    const CAPTURED_KEYS: [&str; 2] = ["ArrowLeft", "ArrowRight"];

    /// Wires keyboard listeners on the window and pointer listeners on
    /// `surface`; events are queued and drained by the loop once per frame
    pub fn prepare_input(surface: &HtmlElement) -> Result<UnboundedReceiver<InputEvent>> {
        let (tx, rx) = unbounded::<InputEvent>();
        let window = browser::window()?;

        let keydown_tx = tx.clone();
        browser::listen(&window, "keydown", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                if CAPTURED_KEYS.contains(&key.code().as_str()) {
                    key.prevent_default();
                }
                send(&keydown_tx, InputEvent::KeyDown(key.code()));
            }
        })?;

        let keyup_tx = tx.clone();
        browser::listen(&window, "keyup", move |event| {
            if let Some(key) = event.dyn_ref::<KeyboardEvent>() {
                send(&keyup_tx, InputEvent::KeyUp(key.code()));
            }
        })?;

        let enter_tx = tx.clone();
        browser::listen(surface, "mouseenter", move |_| {
            send(&enter_tx, InputEvent::PointerEnter);
        })?;

        let leave_tx = tx.clone();
        browser::listen(surface, "mouseleave", move |_| {
            send(&leave_tx, InputEvent::PointerLeave);
        })?;

        let move_surface = surface.clone();
        browser::listen(surface, "mousemove", move |event| {
            if let Some(mouse) = event.dyn_ref::<MouseEvent>() {
                let rect = move_surface.get_bounding_client_rect();
                send(
                    &tx,
                    InputEvent::PointerMove {
                        x: f64::from(mouse.client_x()) - rect.left(),
                        y: f64::from(mouse.client_y()) - rect.top(),
                    },
                );
            }
        })?;

        Ok(rx)
    }

    fn send(tx: &UnboundedSender<InputEvent>, event: InputEvent) {
        // only fails once the loop (receiver) is gone
        let _ = tx.unbounded_send(event);
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn key_down_is_held_and_tapped_for_one_frame() {
            let mut input = Input::default();
            input.apply(InputEvent::KeyDown("KeyE".into()), false);
            assert!(input.keys.is_pressed("KeyE"));
            assert!(input.keys.was_tapped("KeyE"));

            input.keys.end_frame();
            assert!(input.keys.is_pressed("KeyE"));
            assert!(!input.keys.was_tapped("KeyE"));

            input.apply(InputEvent::KeyUp("KeyE".into()), false);
            assert!(!input.keys.is_pressed("KeyE"));
        }

        #[test]
        fn suspended_input_drops_presses_but_keeps_releases() {
            let mut input = Input::default();
            input.apply(InputEvent::KeyDown("ArrowRight".into()), false);
            input.apply(InputEvent::KeyDown("ArrowLeft".into()), true);
            assert!(!input.keys.is_pressed("ArrowLeft"));

            input.apply(InputEvent::KeyUp("ArrowRight".into()), true);
            assert!(!input.keys.is_pressed("ArrowRight"));
        }

        #[test]
        fn pointer_tracks_position_and_presence() {
            let mut input = Input::default();
            input.apply(InputEvent::PointerEnter, false);
            input.apply(InputEvent::PointerMove { x: 40.0, y: 12.5 }, true);
            assert_eq!(
                input.pointer,
                PointerState {
                    x: 40.0,
                    y: 12.5,
                    inside: true
                }
            );
            input.apply(InputEvent::PointerLeave, false);
            assert!(!input.pointer.inside);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn frame_delta_is_seconds_and_clamped() {
        let mut game_loop = GameLoop { last_frame: 1000.0 };
        assert_relative_eq!(game_loop.frame_delta(1016.0), 0.016);
        // tab was in the background for two seconds
        assert_relative_eq!(game_loop.frame_delta(3016.0), MAX_FRAME_SECONDS);
        assert_relative_eq!(game_loop.frame_delta(3000.0), 0.0);
    }

    #[test]
    fn drain_applies_every_queued_event() {
        let (tx, mut rx) = futures::channel::mpsc::unbounded();
        tx.unbounded_send(InputEvent::KeyDown("KeyE".into())).unwrap();
        tx.unbounded_send(InputEvent::PointerEnter).unwrap();
        let mut input = Input::default();
        drain_events(&mut rx, &mut input, false);
        assert!(input.keys.is_pressed("KeyE"));
        assert!(input.pointer.inside);

        // a closed channel ends the drain too
        tx.unbounded_send(InputEvent::KeyUp("KeyE".into())).unwrap();
        drop(tx);
        drain_events(&mut rx, &mut input, false);
        assert!(!input.keys.is_pressed("KeyE"));
    }
}
