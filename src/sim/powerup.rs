//! Power-up catalog, the active effect timer and the stored slot

use rand::seq::SliceRandom;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// Mutually exclusive effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PowerUpCategory {
    /// Obstacles can't end the run
    Shield,
    /// Faster time, faster scroll, more score
    Speed,
    /// Stronger jump
    Jump,
}

/// Immutable catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PowerUpDef {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: PowerUpCategory,
}

impl PowerUpDef {
    pub fn new(id: &str, name: &str, description: &str, category: PowerUpCategory) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            category,
        }
    }

    pub fn default_catalog() -> Vec<Self> {
        vec![
            Self::new(
                "SHIELD",
                "Casca Protetora",
                "Invulnerabilidade",
                PowerUpCategory::Shield,
            ),
            Self::new(
                "SPEED",
                "Corrida Selvagem",
                "Velocidade + Score 2x",
                PowerUpCategory::Speed,
            ),
            Self::new(
                "JUMP",
                "Salto Estendido",
                "Pulo +30% Forte",
                PowerUpCategory::Jump,
            ),
        ]
    }
}

/// A running effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivePowerUp {
    pub def: PowerUpDef,
    /// Seconds left
    pub remaining: f32,
}

/// Active slot, stored slot and the options currently on offer
#[derive(Debug, Clone)]
pub struct PowerUpManager {
    catalog: Vec<PowerUpDef>,
    duration: f32,
    choice_count: usize,
    active: Option<ActivePowerUp>,
    stored: Option<PowerUpDef>,
    choices: Vec<PowerUpDef>,
}

impl PowerUpManager {
    pub fn new(catalog: Vec<PowerUpDef>, duration: f32, choice_count: usize) -> Self {
        Self {
            catalog,
            duration,
            choice_count,
            active: None,
            stored: None,
            choices: Vec::new(),
        }
    }

    pub fn catalog(&self) -> &[PowerUpDef] {
        &self.catalog
    }

    /// Shuffle the catalog and offer a prefix of it. Replaces any options
    /// still on offer.
    pub fn generate_choices(&mut self, rng: &mut Pcg32) -> &[PowerUpDef] {
        let mut pool = self.catalog.clone();
        pool.shuffle(rng);
        pool.truncate(self.choice_count);
        self.choices = pool;
        &self.choices
    }

    pub fn choices(&self) -> &[PowerUpDef] {
        &self.choices
    }

    /// Take the option at `index` off the table. `None` (and no change) when
    /// nothing is on offer at that index.
    pub fn take_choice(&mut self, index: usize) -> Option<PowerUpDef> {
        let picked = self.choices.get(index)?.clone();
        self.choices.clear();
        Some(picked)
    }

    /// Start an effect at full duration, replacing whatever was running
    pub fn activate(&mut self, def: PowerUpDef) {
        log::debug!("Power-up activated: {}", def.id);
        self.active = Some(ActivePowerUp {
            def,
            remaining: self.duration,
        });
    }

    /// Put an effect aside, replacing whatever was stored
    pub fn store(&mut self, def: PowerUpDef) {
        if let Some(old) = &self.stored {
            log::debug!("Stored power-up {} replaced by {}", old.id, def.id);
        }
        self.stored = Some(def);
    }

    /// Activate the stored effect, if any. Returns whether one was consumed.
    pub fn use_stored(&mut self) -> bool {
        match self.stored.take() {
            Some(def) => {
                self.activate(def);
                true
            }
            None => false,
        }
    }

    /// Count the active effect down. Returns the effect that just ran out.
    pub fn tick(&mut self, dt: f32) -> Option<PowerUpDef> {
        let active = self.active.as_mut()?;
        active.remaining -= dt;
        if active.remaining <= 0.0 {
            return self.active.take().map(|a| a.def);
        }
        None
    }

    pub fn is_active(&self, category: PowerUpCategory) -> bool {
        self.active
            .as_ref()
            .is_some_and(|a| a.def.category == category)
    }

    pub fn active(&self) -> Option<&ActivePowerUp> {
        self.active.as_ref()
    }

    pub fn stored(&self) -> Option<&PowerUpDef> {
        self.stored.as_ref()
    }

    /// Whole seconds left on the active effect, for the HUD
    pub fn active_time_left(&self) -> u32 {
        self.active
            .as_ref()
            .map(|a| a.remaining.max(0.0).ceil() as u32)
            .unwrap_or(0)
    }

    pub fn reset(&mut self) {
        self.active = None;
        self.stored = None;
        self.choices.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn manager() -> PowerUpManager {
        PowerUpManager::new(PowerUpDef::default_catalog(), 5.0, 3)
    }

    fn def(category: PowerUpCategory) -> PowerUpDef {
        PowerUpDef::default_catalog()
            .into_iter()
            .find(|d| d.category == category)
            .unwrap()
    }

    #[test]
    fn test_duration_boundary() {
        let mut m = manager();
        m.activate(def(PowerUpCategory::Shield));

        // 4.99s in small steps: still running
        for _ in 0..499 {
            assert!(m.tick(0.01).is_none());
        }
        assert!(m.is_active(PowerUpCategory::Shield));

        // Step past the end
        let expired = m.tick(0.02);
        assert_eq!(expired.map(|d| d.category), Some(PowerUpCategory::Shield));
        assert!(!m.is_active(PowerUpCategory::Shield));
        assert!(m.active().is_none());
    }

    #[test]
    fn test_activate_overwrites_no_stacking() {
        let mut m = manager();
        m.activate(def(PowerUpCategory::Shield));
        m.tick(3.0);
        m.activate(def(PowerUpCategory::Speed));
        assert!(!m.is_active(PowerUpCategory::Shield));
        assert!(m.is_active(PowerUpCategory::Speed));
        assert_eq!(m.active().map(|a| a.remaining), Some(5.0));
    }

    #[test]
    fn test_store_then_use() {
        let mut m = manager();
        m.store(def(PowerUpCategory::Jump));
        assert!(m.use_stored());
        assert!(m.is_active(PowerUpCategory::Jump));
        assert_eq!(m.active().map(|a| a.def.clone()), Some(def(PowerUpCategory::Jump)));
        assert!(m.stored().is_none());
    }

    #[test]
    fn test_store_overwrites() {
        let mut m = manager();
        m.store(def(PowerUpCategory::Jump));
        m.store(def(PowerUpCategory::Shield));
        assert_eq!(m.stored().map(|d| d.category), Some(PowerUpCategory::Shield));
    }

    #[test]
    fn test_use_stored_empty_is_noop() {
        let mut m = manager();
        m.activate(def(PowerUpCategory::Speed));
        m.tick(1.0);
        let before = m.active().cloned();
        assert!(!m.use_stored());
        assert_eq!(m.active().cloned(), before);
        assert!(m.stored().is_none());
    }

    #[test]
    fn test_choices_are_distinct_catalog_entries() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..20 {
            let choices = m.generate_choices(&mut rng).to_vec();
            assert_eq!(choices.len(), 3);
            let mut ids: Vec<_> = choices.iter().map(|c| c.id.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), 3);
        }
    }

    #[test]
    fn test_choices_reproducible_from_seed() {
        let mut a = manager();
        let mut b = manager();
        let mut rng_a = Pcg32::seed_from_u64(5);
        let mut rng_b = Pcg32::seed_from_u64(5);
        assert_eq!(
            a.generate_choices(&mut rng_a).to_vec(),
            b.generate_choices(&mut rng_b).to_vec()
        );
    }

    #[test]
    fn test_small_catalog_offers_everything() {
        let mut m = PowerUpManager::new(vec![def(PowerUpCategory::Jump)], 5.0, 3);
        let mut rng = Pcg32::seed_from_u64(1);
        assert_eq!(m.generate_choices(&mut rng).len(), 1);
    }

    #[test]
    fn test_take_choice_out_of_range() {
        let mut m = manager();
        assert!(m.take_choice(0).is_none());
        let mut rng = Pcg32::seed_from_u64(2);
        m.generate_choices(&mut rng);
        assert!(m.take_choice(7).is_none());
        assert_eq!(m.choices().len(), 3, "bad index leaves options on offer");
        assert!(m.take_choice(2).is_some());
        assert!(m.choices().is_empty());
    }

    #[test]
    fn test_time_left_rounds_up() {
        let mut m = manager();
        assert_eq!(m.active_time_left(), 0);
        m.activate(def(PowerUpCategory::Shield));
        m.tick(0.5);
        assert_eq!(m.active_time_left(), 5);
        m.tick(4.0);
        assert_eq!(m.active_time_left(), 1);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut m = manager();
        let mut rng = Pcg32::seed_from_u64(3);
        m.activate(def(PowerUpCategory::Shield));
        m.store(def(PowerUpCategory::Jump));
        m.generate_choices(&mut rng);
        m.reset();
        assert!(m.active().is_none());
        assert!(m.stored().is_none());
        assert!(m.choices().is_empty());
    }
}
