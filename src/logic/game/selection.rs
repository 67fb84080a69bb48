// Random selection of players for in-game events.
use rand::{Rng, seq::IndexedRandom};

use crate::logic::person::{player::Player, skills::Skill};

// Draw one item with a probability proportional to its weight.
// Items are walked in the given order, subtracting each weight from a single uniform draw
// until it is used up. Falls back to a uniform choice if the walk runs off the end.
pub fn weighted_choice<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T], weight: impl Fn(&T) -> f64) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }

    let total: f64 = items.iter().map(&weight).sum();
    let mut draw = rng.random::<f64>() * total;

    for item in items {
        let item_weight = weight(item);
        if draw <= item_weight {
            return Some(item);
        }
        draw -= item_weight;
    }

    items.choose(rng)
}

// Pick a player, favouring the ones who are better at the given skill.
pub fn pick_by_skill<'a, R: Rng + ?Sized>(rng: &mut R, players: &[&'a Player], skill: Skill) -> Option<&'a Player> {
    weighted_choice(rng, players, |player| player.skill(skill) as f64).copied()
}

// Pick a player uniformly at random.
pub fn pick_random<'a, R: Rng + ?Sized>(rng: &mut R, players: &[&'a Player]) -> Option<&'a Player> {
    players.choose(rng).copied()
}
