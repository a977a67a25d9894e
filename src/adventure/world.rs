use super::area::{Area, AreaCatalog, Hotspot};
use super::config::{AdventureTuning, Content};
use super::interaction::{self, Prompt, PromptAction};
use super::inventory::Inventory;
use super::player::{Camera, Player, Steering};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

/// Pointer position. Frame input carries it viewport relative, the world
/// keeps it in world coordinates
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Pointer {
    pub x: f64,
    pub y: f64,
    pub inside: bool,
}

/// Everything one step needs from the outside
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameInput {
    pub dt: f64,
    pub left: bool,
    pub right: bool,
    /// interact with the nearest hotspot, if it is near
    pub interact: bool,
    pub follow_pointer: bool,
    pub pointer: Pointer,
    pub viewport: Viewport,
}

fn dist2(ax: f64, ay: f64, bx: f64, by: f64) -> f64 {
    let (dx, dy) = (ax - bx, ay - by);
    dx * dx + dy * dy
}

/// Whole adventure state. Owned by the caller and advanced with [`World::step`],
/// nothing in here touches the DOM
#[derive(Debug, Clone)]
pub struct World {
    catalog: AreaCatalog,
    tuning: AdventureTuning,
    area_index: usize,
    player: Player,
    camera: Camera,
    inventory: Inventory,
    /// (area index, hotspot id) of pickups already taken
    consumed: HashSet<(usize, String)>,
    pointer: Pointer,
    viewport: Viewport,
    prompt: Option<Prompt>,
}

impl World {
    pub fn new(content: Content, viewport: Viewport) -> Self {
        let Content { catalog, tuning } = content;
        let mut world = World {
            catalog,
            tuning,
            area_index: 0,
            player: Player::new(&tuning),
            camera: Camera::default(),
            inventory: Inventory::default(),
            consumed: HashSet::new(),
            pointer: Pointer::default(),
            viewport,
            prompt: None,
        };
        world.enter_area(0, tuning.entry_x);
        world
    }

    pub fn area(&self) -> &Area {
        // the catalog is never empty and area_index only ever holds indices
        // it handed out
        &self.catalog.areas()[self.area_index]
    }

    pub fn area_index(&self) -> usize {
        self.area_index
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn tuning(&self) -> &AdventureTuning {
        &self.tuning
    }

    /// Places the player in another area and nudges the camera once.
    /// Unknown indices leave everything as it was
    pub fn enter_area(&mut self, index: usize, entry_x: f64) -> bool {
        let Some(width) = self.catalog.get(index).map(|area| area.width) else {
            return false;
        };
        self.area_index = index;
        let margin = self.tuning.world_margin;
        self.player.x = entry_x.clamp(margin, width - margin);
        self.camera
            .follow(self.player.x, self.viewport.width, width, self.tuning.camera_lerp);
        true
    }

    pub fn previous_area(&mut self) -> bool {
        let index = self.area_index.saturating_sub(1);
        if index == self.area_index {
            return false;
        }
        match self.catalog.get(index).map(|area| area.width) {
            Some(width) => self.enter_area(index, width - self.tuning.back_entry_inset),
            None => false,
        }
    }

    pub fn next_area(&mut self) -> bool {
        self.advance(self.tuning.entry_x)
    }

    fn advance(&mut self, entry_x: f64) -> bool {
        let index = (self.area_index + 1).min(self.catalog.len() - 1);
        index != self.area_index && self.enter_area(index, entry_x)
    }

    /// Hotspots of the current area that are still on screen
    pub fn hotspots(&self) -> impl Iterator<Item = &Hotspot> + '_ {
        self.area()
            .hotspots
            .iter()
            .filter(move |hotspot| !self.is_consumed(&hotspot.id))
    }

    pub fn is_consumed(&self, hotspot_id: &str) -> bool {
        self.consumed
            .iter()
            .any(|(area, id)| *area == self.area_index && id == hotspot_id)
    }

    pub fn is_locked(&self, hotspot: &Hotspot) -> bool {
        hotspot.is_locked(&self.inventory)
    }

    /// Within reach of the player, or of the pointer while it is over the game
    pub fn is_near(&self, hotspot: &Hotspot) -> bool {
        let (hx, hy) = hotspot.center();
        let radius2 = self.tuning.near_radius * self.tuning.near_radius;
        let player_y = self.player.center_y(self.viewport.height, &self.tuning);
        let near_player = dist2(self.player.x, player_y, hx, hy) <= radius2;
        let near_pointer =
            self.pointer.inside && dist2(self.pointer.x, self.pointer.y, hx, hy) <= radius2;
        near_player || near_pointer
    }

    /// Closest hotspot to the player, near or not
    pub fn nearest_hotspot(&self) -> Option<&Hotspot> {
        let player_y = self.player.center_y(self.viewport.height, &self.tuning);
        self.hotspots()
            .map(|hotspot| {
                let (hx, hy) = hotspot.center();
                (dist2(self.player.x, player_y, hx, hy), hotspot)
            })
            .fold(None, |best: Option<(f64, &Hotspot)>, candidate| match best {
                Some(current) if current.0 <= candidate.0 => Some(current),
                _ => Some(candidate),
            })
            .map(|(_, hotspot)| hotspot)
    }

    /// Opens the prompt for a hotspot of the current area. Ignored while
    /// another prompt is open or when the hotspot is gone
    pub fn interact(&mut self, hotspot_id: &str) -> bool {
        if self.prompt.is_some() {
            return false;
        }
        let prompt = self
            .hotspots()
            .find(|hotspot| hotspot.id == hotspot_id)
            .map(|hotspot| interaction::resolve(hotspot, &self.inventory));
        self.prompt = prompt;
        self.prompt.is_some()
    }

    /// Runs the primary action of the open prompt and closes it
    pub fn accept_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt.action {
            PromptAction::Take { hotspot_id, item } => {
                self.inventory.add(&item);
                self.consumed.insert((self.area_index, hotspot_id));
            }
            PromptAction::EnterNext => {
                self.advance(self.tuning.door_entry_x);
            }
            PromptAction::Close => {}
        }
    }

    pub fn dismiss_prompt(&mut self) {
        self.prompt = None;
    }

    /// One frame: steering, acceleration, integration, camera. Does nothing
    /// while a prompt is open
    pub fn step(&mut self, input: &FrameInput) {
        if self.prompt.is_some() {
            return;
        }
        // NaN.max(0.0) is 0.0
        let dt = input.dt.max(0.0).min(self.tuning.max_dt);
        self.viewport = input.viewport;
        self.pointer = Pointer {
            x: input.pointer.x + self.camera.x,
            ..input.pointer
        };

        if input.interact {
            let target = self
                .nearest_hotspot()
                .filter(|hotspot| self.is_near(hotspot))
                .map(|hotspot| hotspot.id.clone());
            if let Some(id) = target {
                if self.interact(&id) {
                    return;
                }
            }
        }

        let steering = if input.follow_pointer && self.pointer.inside {
            Steering::Follow {
                target_x: self.pointer.x,
            }
        } else {
            Steering::Keys {
                left: input.left,
                right: input.right,
            }
        };
        let target = self.player.target_velocity(steering, &self.tuning);
        self.player.accelerate(target, dt, &self.tuning);

        let width = self.area().width;
        self.player.integrate(dt, width, &self.tuning);
        self.camera.follow(
            self.player.x,
            self.viewport.width,
            width,
            self.tuning.camera_lerp,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adventure::interaction::PromptLine;
    use approx::assert_relative_eq;

    const VIEWPORT: Viewport = Viewport {
        width: 800.0,
        height: 400.0,
    };
    const FRAME: f64 = 1.0 / 60.0;

    fn world() -> World {
        World::new(Content::builtin().unwrap(), VIEWPORT)
    }

    fn frame() -> FrameInput {
        FrameInput {
            dt: FRAME,
            viewport: VIEWPORT,
            ..FrameInput::default()
        }
    }

    #[test]
    fn starts_in_first_area_at_entry() {
        let world = world();
        assert_eq!(world.area().id, "alley");
        assert_eq!(world.player().x, 120.0);
        assert!(world.prompt().is_none());
    }

    #[test]
    fn running_right_for_a_second() {
        let mut world = world();
        let input = FrameInput {
            right: true,
            ..frame()
        };
        for _ in 0..60 {
            world.step(&input);
        }
        let x = world.player().x;
        assert!(x > 120.0 && x < 420.0, "x = {}", x);
        assert!(x <= 2400.0 - 24.0);
        assert!(world.camera().x >= 0.0);
    }

    #[test]
    fn long_frames_are_clamped() {
        let mut world = world();
        world.step(&FrameInput {
            right: true,
            dt: 1.0,
            ..frame()
        });
        // one 0.05 s step: vx = 2000 * 0.05, x = 120 + 100 * 0.05
        assert_relative_eq!(world.player().vx, 100.0);
        assert_relative_eq!(world.player().x, 125.0);

        let before = world.player().x;
        for dt in [-1.0, f64::NAN] {
            world.step(&FrameInput {
                right: true,
                dt,
                ..frame()
            });
        }
        assert_eq!(world.player().x, before);
    }

    #[test]
    fn position_never_leaves_the_world() {
        let mut world = world();
        let input = FrameInput {
            right: true,
            dt: 0.05,
            ..frame()
        };
        for _ in 0..400 {
            world.step(&input);
            assert!(world.player().x <= 2400.0 - 24.0);
        }
        assert_eq!(world.player().x, 2400.0 - 24.0);

        let input = FrameInput {
            left: true,
            dt: 0.05,
            ..frame()
        };
        for _ in 0..400 {
            world.step(&input);
            assert!(world.player().x >= 24.0);
        }
        assert_eq!(world.player().x, 24.0);
    }

    #[test]
    fn pointer_follow_steers_toward_pointer() {
        let mut world = world();
        let input = FrameInput {
            follow_pointer: true,
            pointer: Pointer {
                x: 600.0,
                y: 100.0,
                inside: true,
            },
            ..frame()
        };
        world.step(&input);
        assert!(world.player().vx > 0.0);

        // pointer outside the game: keys decide, none are held
        let mut world = self::world();
        let outside = FrameInput {
            pointer: Pointer {
                inside: false,
                ..input.pointer
            },
            ..input
        };
        world.step(&outside);
        assert_eq!(world.player().vx, 0.0);
    }

    #[test]
    fn locked_door_keeps_player_in_area() {
        let mut world = world();
        assert!(world.interact("door"));
        let prompt = world.prompt().unwrap();
        assert_eq!(prompt.body.last(), Some(&PromptLine::Requirement("Keycard".into())));
        world.accept_prompt();
        assert!(world.prompt().is_none());
        assert_eq!(world.area_index(), 0);
    }

    #[test]
    fn keycard_opens_the_door() {
        let mut world = world();
        let door = world.area().hotspot("door").unwrap().clone();
        assert!(world.is_locked(&door));

        assert!(world.interact("keycard"));
        world.accept_prompt();
        assert!(world.inventory().contains("Keycard"));
        assert!(world.is_consumed("keycard"));
        assert!(!world.hotspots().any(|hotspot| hotspot.id == "keycard"));
        assert!(!world.interact("keycard"));
        assert!(!world.is_locked(&door));

        assert!(world.interact("door"));
        world.accept_prompt();
        assert_eq!(world.area().id, "server");
        assert_eq!(world.player().x, 100.0);
    }

    #[test]
    fn dismissing_a_pickup_takes_nothing() {
        let mut world = world();
        assert!(world.interact("keycard"));
        world.dismiss_prompt();
        assert_eq!(world.inventory().slots().flatten().count(), 0);
        assert!(world.hotspots().any(|hotspot| hotspot.id == "keycard"));
    }

    #[test]
    fn open_prompt_freezes_the_world() {
        let mut world = world();
        assert!(world.interact("poster"));
        assert!(!world.interact("keycard"));
        let input = FrameInput {
            right: true,
            ..frame()
        };
        for _ in 0..30 {
            world.step(&input);
        }
        assert_eq!(world.player().x, 120.0);
    }

    #[test]
    fn interact_key_targets_nearby_hotspot_only() {
        let mut world = world();
        let press = FrameInput {
            interact: true,
            ..frame()
        };
        // nothing within reach of the entry point
        world.step(&press);
        assert!(world.prompt().is_none());

        world.enter_area(0, 820.0);
        world.step(&press);
        assert_eq!(world.prompt().map(|prompt| prompt.title.as_str()), Some("Keycard"));
    }

    #[test]
    fn pointer_makes_distant_hotspot_near() {
        let mut world = world();
        let poster = world.area().hotspot("poster").unwrap().clone();
        world.step(&frame());
        assert!(!world.is_near(&poster));

        let hover = FrameInput {
            pointer: Pointer {
                x: 420.0 - world.camera().x,
                y: 304.0,
                inside: true,
            },
            ..frame()
        };
        world.step(&hover);
        assert!(world.is_near(&poster));
    }

    #[test]
    fn area_buttons_walk_the_catalog() {
        let mut world = world();
        assert!(!world.previous_area());
        assert!(world.next_area());
        assert_eq!(world.area().id, "server");
        assert_eq!(world.player().x, 120.0);
        assert!(!world.next_area());
        assert!(world.previous_area());
        assert_eq!(world.area().id, "alley");
        assert_eq!(world.player().x, 2400.0 - 200.0);
        assert!(!world.enter_area(7, 100.0));
        assert_eq!(world.area().id, "alley");
    }
}
