//! Player body: gravity, jump, slide and the derived display pose

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::tuning::PlayerTuning;

/// What the renderer should draw. Derived every frame, never stored on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerPose {
    Run,
    Jump,
    Slide,
}

/// Held intents sampled for this frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerIntent {
    pub jump: bool,
    pub slide: bool,
}

/// What happened to the body during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlayerStep {
    /// Left the ground this frame
    pub jumped: bool,
    /// Touched down this frame after being airborne
    pub landed: bool,
}

/// The runner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner of the visual bounds
    pub pos: Vec2,
    /// Vertical velocity, px/s (negative is up)
    pub vel_y: f32,
    pub grounded: bool,
    pub sliding: bool,
    /// Seconds accumulated towards the next run-cycle frame
    pub anim_timer: f32,
    /// Current run-cycle frame
    pub frame_index: u32,
    tuning: PlayerTuning,
    ground_y: f32,
}

impl Player {
    /// Spawn standing on the ground at the configured start column
    pub fn new(tuning: PlayerTuning, ground_y: f32) -> Self {
        Self {
            pos: Vec2::new(tuning.start_x, ground_y - tuning.height),
            vel_y: 0.0,
            grounded: true,
            sliding: false,
            anim_timer: 0.0,
            frame_index: 0,
            tuning,
            ground_y,
        }
    }

    /// Y of the top edge when standing on the ground
    #[inline]
    pub fn rest_y(&self) -> f32 {
        self.ground_y - self.tuning.height
    }

    /// Advance one frame.
    ///
    /// `jump_multiplier` scales the jump impulse (JUMP power-up).
    pub fn update(&mut self, dt: f32, intent: PlayerIntent, jump_multiplier: f32) -> PlayerStep {
        let was_grounded = self.grounded;
        self.sliding = intent.slide;

        self.vel_y += self.tuning.gravity * dt;

        let mut jumped = false;
        if intent.jump && self.grounded {
            self.vel_y = -self.tuning.jump_impulse * jump_multiplier;
            self.grounded = false;
            jumped = true;
        }

        self.pos.y += self.vel_y * dt;

        let rest_y = self.rest_y();
        if self.pos.y >= rest_y {
            self.pos.y = rest_y;
            self.vel_y = 0.0;
            self.grounded = true;
        }

        self.animate(dt);

        PlayerStep {
            // A zero-length frame re-clamps before the body ever leaves
            jumped: jumped && !self.grounded,
            landed: !was_grounded && self.grounded,
        }
    }

    fn animate(&mut self, dt: f32) {
        if self.pose() == PlayerPose::Run {
            self.anim_timer += dt;
            if self.anim_timer >= self.tuning.run_frame_time {
                self.anim_timer = 0.0;
                self.frame_index = (self.frame_index + 1) % self.tuning.run_frames.max(1);
            }
        } else {
            self.frame_index = 0;
        }
    }

    pub fn pose(&self) -> PlayerPose {
        if !self.grounded {
            PlayerPose::Jump
        } else if self.sliding {
            PlayerPose::Slide
        } else {
            PlayerPose::Run
        }
    }

    /// Sprite rectangle (unaffected by sliding)
    pub fn bounds(&self) -> Rect {
        Rect {
            pos: self.pos,
            size: Vec2::new(self.tuning.width, self.tuning.height),
        }
    }

    /// Collision box: narrower than the sprite, centered horizontally and
    /// bottom-aligned, half height while sliding
    pub fn hitbox(&self) -> Rect {
        let w = self.tuning.hitbox_width;
        let h = if self.sliding {
            self.tuning.hitbox_height * self.tuning.slide_hitbox_scale
        } else {
            self.tuning.hitbox_height
        };
        Rect::new(
            self.pos.x + (self.tuning.width - w) / 2.0,
            self.pos.y + (self.tuning.height - h),
            w,
            h,
        )
    }
}
