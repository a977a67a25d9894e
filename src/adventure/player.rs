use super::config::AdventureTuning;

/// Where the player wants to go this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steering {
    Keys { left: bool, right: bool },
    /// walk toward a world x coordinate
    Follow { target_x: f64 },
}

/// Player in world coordinates, `x` is the horizontal center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
    pub vx: f64,
}

impl Player {
    pub fn new(tuning: &AdventureTuning) -> Self {
        Player {
            x: tuning.entry_x,
            y: 0.0,
            w: tuning.player_width,
            h: tuning.player_height,
            vx: 0.0,
        }
    }

    pub fn target_velocity(&self, steering: Steering, tuning: &AdventureTuning) -> f64 {
        match steering {
            Steering::Keys { left, right } => {
                let mut target = 0.0;
                if left {
                    target -= tuning.speed;
                }
                if right {
                    target += tuning.speed;
                }
                target
            }
            Steering::Follow { target_x } => {
                let dx = target_x - self.x;
                if dx.abs() > tuning.follow_deadzone {
                    dx.signum() * tuning.speed
                } else {
                    0.0
                }
            }
        }
    }

    /// Moves `vx` toward `target` at constant acceleration, never past it
    pub fn accelerate(&mut self, target: f64, dt: f64, tuning: &AdventureTuning) {
        let step = tuning.acceleration * dt;
        if self.vx < target {
            self.vx = target.min(self.vx + step);
        } else if self.vx > target {
            self.vx = target.max(self.vx - step);
        }
    }

    /// Integrates velocity and keeps the player inside the world
    pub fn integrate(&mut self, dt: f64, area_width: f64, tuning: &AdventureTuning) {
        self.x += self.vx * dt;
        self.x = self
            .x
            .clamp(tuning.world_margin, area_width - tuning.world_margin);
    }

    /// Vertical center in viewport space, the player stands on the floor line
    pub fn center_y(&self, viewport_height: f64, tuning: &AdventureTuning) -> f64 {
        viewport_height - tuning.floor_offset - self.h / 2.0
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Camera {
    pub x: f64,
}

impl Camera {
    /// Offset that centers `player_x`, without showing past either world edge
    pub fn target(player_x: f64, viewport_width: f64, area_width: f64) -> f64 {
        (player_x - viewport_width / 2.0).clamp(0.0, (area_width - viewport_width).max(0.0))
    }

    /// One smoothing step. Applied once per rendered frame, not scaled by
    /// elapsed time, so the camera settles faster at higher refresh rates
    pub fn follow(&mut self, player_x: f64, viewport_width: f64, area_width: f64, lerp: f64) {
        let target = Self::target(player_x, viewport_width, area_width);
        self.x += (target - self.x) * lerp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const FRAME: f64 = 1.0 / 60.0;

    #[test]
    fn keys_cancel_each_other() {
        let tuning = AdventureTuning::default();
        let player = Player::new(&tuning);
        let both = Steering::Keys {
            left: true,
            right: true,
        };
        assert_eq!(player.target_velocity(both, &tuning), 0.0);
        let left = Steering::Keys {
            left: true,
            right: false,
        };
        assert_eq!(player.target_velocity(left, &tuning), -300.0);
    }

    #[test]
    fn follow_respects_deadzone() {
        let tuning = AdventureTuning::default();
        let player = Player::new(&tuning);
        let near = Steering::Follow { target_x: 131.0 };
        assert_eq!(player.target_velocity(near, &tuning), 0.0);
        let ahead = Steering::Follow { target_x: 133.0 };
        assert_eq!(player.target_velocity(ahead, &tuning), 300.0);
        let behind = Steering::Follow { target_x: 20.0 };
        assert_eq!(player.target_velocity(behind, &tuning), -300.0);
    }

    #[test]
    fn velocity_converges_without_overshoot() {
        let tuning = AdventureTuning::default();
        for dt in [0.0, 0.001, FRAME, 0.033, 0.05] {
            for target in [300.0, -300.0, 0.0] {
                let mut player = Player::new(&tuning);
                player.vx = -target / 2.0;
                let mut previous_gap = (target - player.vx).abs();
                for _ in 0..1000 {
                    player.accelerate(target, dt, &tuning);
                    let gap = (target - player.vx).abs();
                    assert!(gap <= previous_gap);
                    // still on the starting side of the target
                    if target > 0.0 {
                        assert!(player.vx <= target);
                    } else if target < 0.0 {
                        assert!(player.vx >= target);
                    }
                    previous_gap = gap;
                }
                if dt > 0.0 {
                    assert_eq!(player.vx, target);
                }
            }
        }
    }

    #[test]
    fn integration_stays_inside_world() {
        let tuning = AdventureTuning::default();
        let mut player = Player::new(&tuning);
        player.vx = -10_000.0;
        player.integrate(0.05, 2400.0, &tuning);
        assert_eq!(player.x, 24.0);
        player.vx = 10_000.0;
        for _ in 0..20 {
            player.integrate(0.05, 2400.0, &tuning);
        }
        assert_eq!(player.x, 2400.0 - 24.0);
    }

    #[test]
    fn one_second_of_running_right_ramps_up() {
        let tuning = AdventureTuning::default();
        let mut player = Player::new(&tuning);
        let right = Steering::Keys {
            left: false,
            right: true,
        };
        for _ in 0..60 {
            let target = player.target_velocity(right, &tuning);
            player.accelerate(target, FRAME, &tuning);
            player.integrate(FRAME, 2400.0, &tuning);
        }
        assert!(player.x > 120.0);
        assert!(player.x < 120.0 + 300.0);
        assert!(player.x <= 2400.0 - 24.0);
    }

    #[test]
    fn camera_target_is_clamped_to_world() {
        assert_eq!(Camera::target(100.0, 800.0, 2400.0), 0.0);
        assert_eq!(Camera::target(1200.0, 800.0, 2400.0), 800.0);
        assert_eq!(Camera::target(2376.0, 800.0, 2400.0), 1600.0);
        // viewport wider than the world
        assert_eq!(Camera::target(500.0, 3000.0, 2400.0), 0.0);
    }

    #[test]
    fn camera_covers_fixed_fraction_per_frame() {
        let mut camera = Camera::default();
        camera.follow(1200.0, 800.0, 2400.0, 0.15);
        assert_relative_eq!(camera.x, 120.0);
        camera.follow(1200.0, 800.0, 2400.0, 0.15);
        assert_relative_eq!(camera.x, 120.0 + 680.0 * 0.15);
    }
}
