use std::panic::{self, AssertUnwindSafe};

use survival_core::{
    CharacterId, CharacterSnapshot, Event, Position, Surroundings, Weapon, ZombieId,
    ZombieSnapshot,
};

use crate::WorldError;

#[derive(Clone, Debug)]
pub(crate) struct Character {
    pub(crate) id: CharacterId,
    pub(crate) name: String,
    pub(crate) health: u32,
    pub(crate) position: Position,
    pub(crate) weapon: Weapon,
}

impl Character {
    pub(crate) fn snapshot(&self) -> CharacterSnapshot {
        CharacterSnapshot {
            id: self.id,
            name: self.name.clone(),
            health: self.health,
            position: self.position,
            weapon: self.weapon.clone(),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Zombie {
    pub(crate) id: ZombieId,
    pub(crate) name: String,
    pub(crate) health: u32,
    pub(crate) position: Position,
}

impl Zombie {
    pub(crate) fn snapshot(&self) -> ZombieSnapshot {
        ZombieSnapshot {
            id: self.id,
            name: self.name.clone(),
            health: self.health,
            position: self.position,
        }
    }

    /// Runs the planner for this zombie only and moves it if the answer is legal.
    ///
    /// A legal destination is a valid cell at most one step away, diagonals
    /// included. A panicking planner is reported instead of unwinding through
    /// the parallel join.
    pub(crate) fn take_step<F>(
        &mut self,
        plan: &F,
        surroundings: &Surroundings<'_>,
    ) -> Result<Option<Event>, WorldError>
    where
        F: Fn(&ZombieSnapshot, &Surroundings<'_>) -> Position,
    {
        let snapshot = self.snapshot();
        let destination = panic::catch_unwind(AssertUnwindSafe(|| plan(&snapshot, surroundings)))
            .map_err(|_| WorldError::ZombieTaskPanicked { zombie: self.id })?;

        let from = self.position;
        if destination == from {
            return Ok(None);
        }

        let reach = from.x().abs_diff(destination.x()).max(from.y().abs_diff(destination.y()));
        if reach > 1 || !surroundings.grid.is_valid_position(destination) {
            tracing::debug!(
                zombie = self.id.get(),
                %from,
                to = %destination,
                "discarding illegal zombie step"
            );
            return Ok(None);
        }

        self.position = destination;
        Ok(Some(Event::ZombieMoved {
            zombie: self.id,
            from,
            to: destination,
        }))
    }
}

/// Ordered characters and zombies, addressed by index.
#[derive(Clone, Debug, Default)]
pub(crate) struct EntityStore {
    characters: Vec<Character>,
    zombies: Vec<Zombie>,
    next_character: u32,
    next_zombie: u32,
}

impl EntityStore {
    pub(crate) fn add_character(
        &mut self,
        name: String,
        health: u32,
        weapon: Weapon,
        position: Position,
    ) -> CharacterId {
        let id = CharacterId::new(self.next_character);
        self.next_character = self.next_character.saturating_add(1);
        self.characters.push(Character {
            id,
            name,
            health,
            position,
            weapon,
        });
        id
    }

    pub(crate) fn add_zombie(&mut self, name: String, health: u32, position: Position) -> ZombieId {
        let id = ZombieId::new(self.next_zombie);
        self.next_zombie = self.next_zombie.saturating_add(1);
        self.zombies.push(Zombie {
            id,
            name,
            health,
            position,
        });
        id
    }

    /// Removes and compacts; later indices shift down by one.
    pub(crate) fn remove_character_at(&mut self, index: usize) -> Option<Character> {
        (index < self.characters.len()).then(|| self.characters.remove(index))
    }

    /// Removes and compacts; later indices shift down by one.
    pub(crate) fn remove_zombie_at(&mut self, index: usize) -> Option<Zombie> {
        (index < self.zombies.len()).then(|| self.zombies.remove(index))
    }

    /// Removes every entity whose health reached zero, returning them in store order.
    pub(crate) fn remove_defeated(&mut self) -> (Vec<Character>, Vec<Zombie>) {
        let mut characters = Vec::new();
        for index in (0..self.characters.len()).rev() {
            if self.characters[index].health == 0 {
                characters.extend(self.remove_character_at(index));
            }
        }
        characters.reverse();

        let mut zombies = Vec::new();
        for index in (0..self.zombies.len()).rev() {
            if self.zombies[index].health == 0 {
                zombies.extend(self.remove_zombie_at(index));
            }
        }
        zombies.reverse();

        (characters, zombies)
    }

    /// Manhattan nearest neighbour; the first character in store order wins ties.
    pub(crate) fn find_closest_character(&self, from: Position) -> Option<&Character> {
        let mut closest: Option<(u32, &Character)> = None;
        for character in &self.characters {
            let distance = from.manhattan_distance(character.position);
            match closest {
                Some((best, _)) if best <= distance => {}
                _ => closest = Some((distance, character)),
            }
        }
        closest.map(|(_, character)| character)
    }

    pub(crate) fn character_at(&self, position: Position) -> Option<&Character> {
        self.characters
            .iter()
            .find(|character| character.position == position)
    }

    pub(crate) fn zombie_at(&self, position: Position) -> Option<&Zombie> {
        self.zombies.iter().find(|zombie| zombie.position == position)
    }

    pub(crate) fn character(&self, id: CharacterId) -> Option<&Character> {
        self.characters.iter().find(|character| character.id == id)
    }

    pub(crate) fn zombie(&self, id: ZombieId) -> Option<&Zombie> {
        self.zombies.iter().find(|zombie| zombie.id == id)
    }

    pub(crate) fn character_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters
            .iter_mut()
            .find(|character| character.id == id)
    }

    pub(crate) fn zombie_mut(&mut self, id: ZombieId) -> Option<&mut Zombie> {
        self.zombies.iter_mut().find(|zombie| zombie.id == id)
    }

    pub(crate) fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub(crate) fn zombies(&self) -> &[Zombie] {
        &self.zombies
    }

    /// Exclusive access to the zombie slots. The backing storage cannot be
    /// resized while the returned slice is borrowed.
    pub(crate) fn zombie_slots_mut(&mut self) -> &mut [Zombie] {
        &mut self.zombies
    }
}
