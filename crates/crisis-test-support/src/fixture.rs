//! A small seeded catalog shared by tests across crates.

use crisis_core::model::{Attribute, Choice, Correctness, Level, Player, Scenario};
use uuid::Uuid;

use crate::clock::fixed_now;
use crate::memory::InMemoryGameStore;

/// One level of three scenarios, each with a good and a bad choice, three
/// attributes and one registered player, loaded into an
/// [`InMemoryGameStore`].
#[derive(Debug, Clone)]
pub struct GameFixture {
    /// The store holding every row below.
    pub store: InMemoryGameStore,
    /// The only level.
    pub level: Level,
    /// The level's scenarios in play order.
    pub scenarios: Vec<Scenario>,
    /// `(good, bad)` choices per scenario, parallel to `scenarios`.
    pub choices: Vec<(Choice, Choice)>,
    /// Attribute catalog, sorted by name.
    pub attributes: Vec<Attribute>,
    /// A registered player aged 24.
    pub player: Player,
}

impl GameFixture {
    /// Builds and loads the fixture into `store`.
    #[must_use]
    pub fn load_into(store: InMemoryGameStore) -> Self {
        let level = Level {
            id: Uuid::new_v4(),
            level_number: 1,
            title: "Krisens första dag".to_owned(),
        };
        store.add_level(level.clone());

        let prompts = [
            "The sirens sound while you are at the university.",
            "The power has been out for a day.",
            "A neighbour asks you to share your water.",
        ];
        let mut scenarios = Vec::new();
        let mut choices = Vec::new();
        for (position, prompt) in (1..).zip(prompts) {
            let scenario = Scenario {
                id: Uuid::new_v4(),
                level_id: level.id,
                ordinal_position: position,
                prompt_text: prompt.to_owned(),
            };
            let good = Choice {
                id: Uuid::new_v4(),
                scenario_id: scenario.id,
                option_text: format!("Follow the official guidance ({position})"),
                outcome_text: "You stay safe and informed.".to_owned(),
                correctness: Correctness::Good,
            };
            let bad = Choice {
                id: Uuid::new_v4(),
                scenario_id: scenario.id,
                option_text: format!("Ignore the guidance ({position})"),
                outcome_text: "You put yourself at risk.".to_owned(),
                correctness: Correctness::Bad,
            };
            store.add_scenario(scenario.clone());
            store.add_choice(good.clone());
            store.add_choice(bad.clone());
            scenarios.push(scenario);
            choices.push((good, bad));
        }

        let attributes: Vec<Attribute> = [
            ("lojal", "Puts the group before themselves."),
            ("moralisk", "Puts ethics before efficiency."),
            ("taktisk", "Plans ahead strategically."),
        ]
        .into_iter()
        .map(|(name, description)| Attribute {
            id: Uuid::new_v4(),
            name: name.to_owned(),
            description: description.to_owned(),
        })
        .collect();
        for attribute in &attributes {
            store.add_attribute(attribute.clone());
        }

        let player = Player {
            user_id: Uuid::new_v4(),
            firstname: "Alex".to_owned(),
            lastname: "Lind".to_owned(),
            age: 24,
            crisis_ready: Some(true),
            created_at: fixed_now(),
        };
        store.add_player(player.clone());

        Self {
            store,
            level,
            scenarios,
            choices,
            attributes,
            player,
        }
    }

    /// Builds the fixture in a fresh store.
    #[must_use]
    pub fn new() -> Self {
        Self::load_into(InMemoryGameStore::new())
    }

    /// The attribute with `name`.
    ///
    /// # Panics
    ///
    /// Panics if the fixture has no attribute with that name.
    #[must_use]
    pub fn attribute(&self, name: &str) -> &Attribute {
        self.attributes
            .iter()
            .find(|a| a.name == name)
            .unwrap_or_else(|| panic!("fixture has no attribute named {name}"))
    }
}

impl Default for GameFixture {
    fn default() -> Self {
        Self::new()
    }
}
