#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves fights between co-located characters and zombies.
//!
//! Resolution is snapshot-then-apply: every co-located pair is collected from
//! the views before any blow is struck, each pair is resolved against a local
//! health ledger indexed by view position, and the world is asked to drop
//! defeated entities once, after the last pair. An entity defeated earlier in
//! the pass is skipped by the pairs that follow, so no pair is processed twice
//! and none is skipped because of index shifts.

use rand::Rng;
use survival_core::{
    CharacterView, Combatant, Command, ZombieView, STRIKE_ROLL_CEILING, ZOMBIE_UNARMED_DAMAGE,
};

/// Combat system that queues engagement and strike commands.
#[derive(Debug, Default)]
pub struct Combat {
    pairs: Vec<(usize, usize)>,
    character_health: Vec<u32>,
    zombie_health: Vec<u32>,
}

impl Combat {
    /// Creates a new combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits the commands that resolve every fight on the settled board.
    ///
    /// Pairs are visited characters-outer, zombies-inner, in store order. For
    /// each pair the character strikes first for its weapon damage plus a roll
    /// in `0..STRIKE_ROLL_CEILING`; a surviving zombie answers with
    /// [`ZOMBIE_UNARMED_DAMAGE`]. A trailing [`Command::RemoveDefeated`] is
    /// emitted whenever at least one fight took place.
    pub fn handle<R>(
        &mut self,
        characters: &CharacterView,
        zombies: &ZombieView,
        rng: &mut R,
        out: &mut Vec<Command>,
    ) where
        R: Rng + ?Sized,
    {
        self.collect_pairs(characters, zombies);
        if self.pairs.is_empty() {
            return;
        }

        let characters: Vec<_> = characters.iter().collect();
        let zombies: Vec<_> = zombies.iter().collect();
        let mut fought = false;

        for &(character_index, zombie_index) in &self.pairs {
            if self.character_health[character_index] == 0
                || self.zombie_health[zombie_index] == 0
            {
                continue;
            }

            let character = characters[character_index];
            let zombie = zombies[zombie_index];
            fought = true;
            out.push(Command::Engage {
                character: character.id,
                zombie: zombie.id,
            });

            let roll = rng.gen_range(0..STRIKE_ROLL_CEILING);
            let damage = character.weapon.damage.saturating_add(roll);
            tracing::debug!(
                character = character.id.get(),
                zombie = zombie.id.get(),
                roll,
                damage,
                "character strikes"
            );
            out.push(Command::Strike {
                attacker: Combatant::Character(character.id),
                target: Combatant::Zombie(zombie.id),
                damage,
            });

            let zombie_health = &mut self.zombie_health[zombie_index];
            *zombie_health = zombie_health.saturating_sub(damage);
            if *zombie_health == 0 {
                continue;
            }

            out.push(Command::Strike {
                attacker: Combatant::Zombie(zombie.id),
                target: Combatant::Character(character.id),
                damage: ZOMBIE_UNARMED_DAMAGE,
            });
            let character_health = &mut self.character_health[character_index];
            *character_health = character_health.saturating_sub(ZOMBIE_UNARMED_DAMAGE);
        }

        if fought {
            out.push(Command::RemoveDefeated);
        }
    }

    fn collect_pairs(&mut self, characters: &CharacterView, zombies: &ZombieView) {
        self.pairs.clear();
        self.character_health.clear();
        self.zombie_health.clear();
        self.character_health
            .extend(characters.iter().map(|character| character.health));
        self.zombie_health
            .extend(zombies.iter().map(|zombie| zombie.health));

        for (character_index, character) in characters.iter().enumerate() {
            for (zombie_index, zombie) in zombies.iter().enumerate() {
                if character.position == zombie.position {
                    self.pairs.push((character_index, zombie_index));
                }
            }
        }
    }
}
