//! Time-driven obstacle and eco fragment spawning
//!
//! Two independent timers fire at random intervals. New entities appear at
//! the right edge of the playfield and scroll left until culled.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use crate::tuning::{SpawnTuning, WorldTuning};

/// Collision-relevant obstacle category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleCategory {
    /// Sits on the ground, full height
    GroundRigid,
    /// Sits on the ground, low profile
    GroundShallow,
    /// Floats above the ground, slide under it
    Airborne,
}

/// Concrete obstacle shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Can,
    Puddle,
    Bag,
}

impl ObstacleKind {
    pub fn category(&self) -> ObstacleCategory {
        match self {
            ObstacleKind::Rock | ObstacleKind::Can => ObstacleCategory::GroundRigid,
            ObstacleKind::Puddle => ObstacleCategory::GroundShallow,
            ObstacleKind::Bag => ObstacleCategory::Airborne,
        }
    }

    /// Width and height in pixels
    pub fn size(&self) -> (f32, f32) {
        match self {
            ObstacleKind::Rock | ObstacleKind::Can => (20.0, 20.0),
            ObstacleKind::Puddle => (20.0, 15.0),
            ObstacleKind::Bag => (24.0, 24.0),
        }
    }
}

/// Something that ends the run on contact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub kind: ObstacleKind,
    pub rect: Rect,
}

/// An eco fragment: triggers a power-up choice on pickup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    pub id: u32,
    pub rect: Rect,
}

/// A repeating timer with a randomized period
#[derive(Debug, Clone, Copy, PartialEq)]
struct SpawnTimer {
    elapsed: f32,
    next: f32,
    min: f32,
    max: f32,
}

impl SpawnTimer {
    fn new(min: f32, max: f32, rng: &mut Pcg32) -> Self {
        let mut timer = Self {
            elapsed: 0.0,
            next: 0.0,
            min,
            max,
        };
        timer.redraw(rng);
        timer
    }

    fn redraw(&mut self, rng: &mut Pcg32) {
        self.elapsed = 0.0;
        self.next = if self.max > self.min {
            rng.random_range(self.min..=self.max)
        } else {
            self.min
        };
    }

    /// Advance and report whether the timer fired (and was redrawn)
    fn advance(&mut self, dt: f32, rng: &mut Pcg32) -> bool {
        self.elapsed += dt;
        if self.elapsed >= self.next {
            self.redraw(rng);
            true
        } else {
            false
        }
    }
}

/// What spawned during one update
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpawnReport {
    pub obstacles_spawned: u32,
    pub fragments_spawned: u32,
    pub despawned: u32,
}

/// Owns every scrolling entity
#[derive(Debug, Clone)]
pub struct Spawner {
    pub obstacles: Vec<Obstacle>,
    pub fragments: Vec<Fragment>,
    obstacle_timer: SpawnTimer,
    fragment_timer: SpawnTimer,
    tuning: SpawnTuning,
    world: WorldTuning,
    next_id: u32,
}

impl Spawner {
    pub fn new(tuning: SpawnTuning, world: WorldTuning, rng: &mut Pcg32) -> Self {
        Self {
            obstacles: Vec::new(),
            fragments: Vec::new(),
            obstacle_timer: SpawnTimer::new(
                tuning.obstacle_interval_min,
                tuning.obstacle_interval_max,
                rng,
            ),
            fragment_timer: SpawnTimer::new(
                tuning.fragment_interval_min,
                tuning.fragment_interval_max,
                rng,
            ),
            tuning,
            world,
            next_id: 1,
        }
    }

    /// Empty both lists and redraw both timers
    pub fn reset(&mut self, rng: &mut Pcg32) {
        self.obstacles.clear();
        self.fragments.clear();
        self.obstacle_timer.redraw(rng);
        self.fragment_timer.redraw(rng);
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Seconds until the next obstacle (for debugging overlays)
    pub fn obstacle_countdown(&self) -> f32 {
        (self.obstacle_timer.next - self.obstacle_timer.elapsed).max(0.0)
    }

    /// Seconds until the next eco fragment
    pub fn fragment_countdown(&self) -> f32 {
        (self.fragment_timer.next - self.fragment_timer.elapsed).max(0.0)
    }

    /// Roll an obstacle kind: ground-level share split three ways, rest airborne
    fn roll_kind(&self, rng: &mut Pcg32) -> ObstacleKind {
        if rng.random::<f32>() < self.tuning.ground_share {
            match rng.random_range(0..3u8) {
                0 => ObstacleKind::Rock,
                1 => ObstacleKind::Can,
                _ => ObstacleKind::Puddle,
            }
        } else {
            ObstacleKind::Bag
        }
    }

    pub fn spawn_obstacle(&mut self, rng: &mut Pcg32) {
        let kind = self.roll_kind(rng);
        self.push_obstacle(kind);
    }

    /// Append an obstacle of a known kind at the right edge
    pub fn push_obstacle(&mut self, kind: ObstacleKind) {
        let (w, h) = kind.size();
        let y = match kind.category() {
            ObstacleCategory::GroundRigid | ObstacleCategory::GroundShallow => {
                self.world.ground_y - h
            }
            ObstacleCategory::Airborne => self.world.ground_y - self.tuning.airborne_clearance,
        };
        let id = self.next_entity_id();
        self.obstacles.push(Obstacle {
            id,
            kind,
            rect: Rect::new(self.world.width, y, w, h),
        });
    }

    pub fn spawn_fragment(&mut self, rng: &mut Pcg32) {
        let size = self.tuning.fragment_size;
        let lift = self.tuning.fragment_min_height
            + rng.random::<f32>() * self.tuning.fragment_height_band;
        let id = self.next_entity_id();
        self.fragments.push(Fragment {
            id,
            rect: Rect::new(self.world.width, self.world.ground_y - lift, size, size),
        });
    }

    /// Advance timers and scroll everything left.
    ///
    /// `scroll_multiplier` is difficulty times any active speed boost.
    pub fn update(&mut self, dt: f32, scroll_multiplier: f32, rng: &mut Pcg32) -> SpawnReport {
        let mut report = SpawnReport::default();

        if self.obstacle_timer.advance(dt, rng) {
            self.spawn_obstacle(rng);
            report.obstacles_spawned += 1;
        }
        if self.fragment_timer.advance(dt, rng) {
            self.spawn_fragment(rng);
            report.fragments_spawned += 1;
        }

        let dx = self.world.base_scroll_speed * scroll_multiplier * dt;
        let cull_x = -self.tuning.despawn_margin;

        let before = self.obstacles.len() + self.fragments.len();
        for obstacle in &mut self.obstacles {
            obstacle.rect.pos.x -= dx;
        }
        self.obstacles.retain(|o| o.rect.right() >= cull_x);
        for fragment in &mut self.fragments {
            fragment.rect.pos.x -= dx;
        }
        self.fragments.retain(|f| f.rect.right() >= cull_x);
        report.despawned = (before - self.obstacles.len() - self.fragments.len()) as u32;

        report
    }

    /// Remove a fragment after pickup
    pub fn take_fragment(&mut self, id: u32) -> Option<Fragment> {
        let idx = self.fragments.iter().position(|f| f.id == id)?;
        Some(self.fragments.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn setup(seed: u64) -> (Spawner, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let spawner = Spawner::new(SpawnTuning::default(), WorldTuning::default(), &mut rng);
        (spawner, rng)
    }

    #[test]
    fn test_timers_drawn_within_interval() {
        for seed in 0..50 {
            let (spawner, _) = setup(seed);
            let obs = spawner.obstacle_countdown();
            let eco = spawner.fragment_countdown();
            assert!((1.5..=3.0).contains(&obs), "obstacle interval {}", obs);
            assert!((12.0..=20.0).contains(&eco), "fragment interval {}", eco);
        }
    }

    #[test]
    fn test_obstacle_spawns_at_right_edge() {
        let (mut spawner, mut rng) = setup(7);
        let wait = spawner.obstacle_countdown();
        let report = spawner.update(wait, 1.0, &mut rng);
        assert_eq!(report.obstacles_spawned, 1);
        assert_eq!(spawner.obstacles.len(), 1);

        let obstacle = &spawner.obstacles[0];
        // Spawned at x = 480 then scrolled once by 180 * wait
        let expected_x = 480.0 - 180.0 * wait;
        assert!((obstacle.rect.left() - expected_x).abs() < 0.01);
        // Timer redrawn into range
        assert!((1.5..=3.0).contains(&spawner.obstacle_countdown()));
    }

    #[test]
    fn test_vertical_offsets_per_category() {
        let (mut spawner, _) = setup(1);
        for kind in [
            ObstacleKind::Rock,
            ObstacleKind::Can,
            ObstacleKind::Puddle,
            ObstacleKind::Bag,
        ] {
            spawner.push_obstacle(kind);
        }
        let ground = WorldTuning::default().ground_y;
        assert_eq!(spawner.obstacles[0].rect.bottom(), ground);
        assert_eq!(spawner.obstacles[1].rect.bottom(), ground);
        assert_eq!(spawner.obstacles[2].rect.bottom(), ground);
        assert_eq!(spawner.obstacles[2].rect.size.y, 15.0);
        assert_eq!(spawner.obstacles[3].rect.top(), ground - 50.0);
        assert_eq!(
            spawner.obstacles[3].kind.category(),
            ObstacleCategory::Airborne
        );
    }

    #[test]
    fn test_category_mix_roughly_sixty_forty() {
        let (mut spawner, mut rng) = setup(42);
        for _ in 0..2000 {
            spawner.spawn_obstacle(&mut rng);
        }
        let airborne = spawner
            .obstacles
            .iter()
            .filter(|o| o.kind == ObstacleKind::Bag)
            .count();
        let share = airborne as f32 / 2000.0;
        assert!((0.35..0.45).contains(&share), "airborne share {}", share);
        // All three ground shapes show up
        for kind in [ObstacleKind::Rock, ObstacleKind::Can, ObstacleKind::Puddle] {
            assert!(spawner.obstacles.iter().any(|o| o.kind == kind));
        }
    }

    #[test]
    fn test_fragment_height_band() {
        let (mut spawner, mut rng) = setup(3);
        for _ in 0..200 {
            spawner.spawn_fragment(&mut rng);
        }
        for fragment in &spawner.fragments {
            let lift = 230.0 - fragment.rect.top();
            assert!((60.0..=100.0).contains(&lift), "lift {}", lift);
        }
    }

    #[test]
    fn test_despawn_exactly_past_margin() {
        let (mut spawner, mut rng) = setup(9);
        spawner.push_obstacle(ObstacleKind::Rock);
        // Park it so its right edge sits exactly on the margin
        spawner.obstacles[0].rect.pos.x = -50.0 - 20.0;
        spawner.update(0.0, 1.0, &mut rng);
        assert_eq!(spawner.obstacles.len(), 1, "on the margin is not past it");

        let report = spawner.update(0.001, 1.0, &mut rng);
        assert_eq!(report.despawned, 1);
        assert!(spawner.obstacles.is_empty());
    }

    #[test]
    fn test_scroll_multiplier_scales_motion() {
        let (mut slow, mut rng_a) = setup(5);
        let (mut fast, mut rng_b) = setup(5);
        slow.push_obstacle(ObstacleKind::Can);
        fast.push_obstacle(ObstacleKind::Can);
        slow.update(0.1, 1.0, &mut rng_a);
        fast.update(0.1, 2.5, &mut rng_b);
        let slow_dx = 480.0 - slow.obstacles[0].rect.left();
        let fast_dx = 480.0 - fast.obstacles[0].rect.left();
        assert!((fast_dx - slow_dx * 2.5).abs() < 0.01);
    }

    #[test]
    fn test_reset_clears_and_redraws() {
        let (mut spawner, mut rng) = setup(11);
        spawner.push_obstacle(ObstacleKind::Bag);
        spawner.spawn_fragment(&mut rng);
        spawner.update(0.5, 1.0, &mut rng);
        spawner.reset(&mut rng);
        assert!(spawner.obstacles.is_empty());
        assert!(spawner.fragments.is_empty());
        assert!((1.5..=3.0).contains(&spawner.obstacle_countdown()));
        assert!((12.0..=20.0).contains(&spawner.fragment_countdown()));
    }

    #[test]
    fn test_entities_removed_once_and_never_early() {
        let (mut spawner, mut rng) = setup(21);
        let mut seen_ids = std::collections::HashSet::new();
        for _ in 0..3000 {
            spawner.update(1.0 / 60.0, 1.7, &mut rng);
            for o in &spawner.obstacles {
                // Nothing lingers past the margin after an update
                assert!(o.rect.right() >= -50.0);
                seen_ids.insert(o.id);
            }
            assert!(spawner.obstacle_countdown() >= 0.0);
            assert!(spawner.fragment_countdown() >= 0.0);
        }
        assert!(seen_ids.len() > 10);
    }
}
