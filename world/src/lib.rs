#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the zombie survival game.

mod grid;
mod store;

use rand::Rng;
use rayon::prelude::*;
use survival_core::{
    Combatant, Command, Event, Position, Surroundings, ZombieSnapshot, WELCOME_BANNER,
};
use thiserror::Error;

pub use grid::Grid;

use store::EntityStore;

const DEFAULT_GRID_WIDTH: u32 = 7;
const DEFAULT_GRID_HEIGHT: u32 = 7;
const DEFAULT_OBSTACLE_ODDS: u32 = 30;

/// Parameters used to generate the grid at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorldConfig {
    width: u32,
    height: u32,
    obstacle_odds: u32,
}

impl WorldConfig {
    /// Creates a configuration; each cell becomes an obstacle with probability `1 / obstacle_odds`.
    #[must_use]
    pub const fn new(width: u32, height: u32, obstacle_odds: u32) -> Self {
        Self {
            width,
            height,
            obstacle_odds,
        }
    }

    /// Number of cells along the first axis.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of cells along the second axis.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Inverse obstacle probability; zero disables obstacles.
    #[must_use]
    pub const fn obstacle_odds(&self) -> u32 {
        self.obstacle_odds
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self::new(
            DEFAULT_GRID_WIDTH,
            DEFAULT_GRID_HEIGHT,
            DEFAULT_OBSTACLE_ODDS,
        )
    }
}

/// Failures surfaced by the world.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The planner panicked while deciding a zombie's move.
    #[error("movement task for zombie {} panicked", zombie.get())]
    ZombieTaskPanicked {
        /// Zombie whose task failed.
        zombie: survival_core::ZombieId,
    },
}

/// Represents the authoritative world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: Grid,
    store: EntityStore,
}

impl World {
    /// Creates an empty world on the provided grid.
    #[must_use]
    pub fn new(grid: Grid) -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid,
            store: EntityStore::default(),
        }
    }

    /// Creates an empty world on a freshly generated grid.
    pub fn generate<R>(config: &WorldConfig, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let grid = Grid::generate(config.width, config.height, config.obstacle_odds, rng);
        Self::new(grid)
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SpawnCharacter {
            name,
            health,
            weapon,
            position,
        } => {
            let character = world
                .store
                .add_character(name.clone(), health, weapon, position);
            out_events.push(Event::CharacterSpawned {
                character,
                name,
                position,
            });
        }
        Command::SpawnZombie {
            name,
            health,
            position,
        } => {
            let zombie = world.store.add_zombie(name.clone(), health, position);
            out_events.push(Event::ZombieSpawned {
                zombie,
                name,
                position,
            });
        }
        Command::StepCharacter {
            character,
            direction,
        } => {
            let grid = &world.grid;
            let Some(entry) = world.store.character_mut(character) else {
                return;
            };

            let from = entry.position;
            match from.step(direction) {
                Some(to) if grid.is_valid_position(to) => {
                    entry.position = to;
                    out_events.push(Event::CharacterMoved { character, from, to });
                }
                _ => {
                    tracing::debug!(
                        character = character.get(),
                        ?direction,
                        "character step blocked"
                    );
                }
            }
        }
        Command::Engage { character, zombie } => {
            let (Some(fighter), Some(undead)) =
                (world.store.character(character), world.store.zombie(zombie))
            else {
                return;
            };

            if fighter.health == 0 || undead.health == 0 || fighter.position != undead.position {
                tracing::debug!(
                    character = character.get(),
                    zombie = zombie.get(),
                    "ignoring engagement between separated or defeated entities"
                );
                return;
            }

            out_events.push(Event::CollisionDetected {
                character,
                zombie,
                position: fighter.position,
            });
        }
        Command::Strike {
            attacker,
            target,
            damage,
        } => match (attacker, target) {
            (Combatant::Character(character), Combatant::Zombie(zombie)) => {
                let attacker_alive = world
                    .store
                    .character(character)
                    .is_some_and(|entry| entry.health > 0);
                if !attacker_alive {
                    return;
                }
                let Some(entry) = world.store.zombie_mut(zombie) else {
                    return;
                };
                if entry.health == 0 {
                    return;
                }

                entry.health = entry.health.saturating_sub(damage);
                out_events.push(Event::ZombieStruck {
                    character,
                    zombie,
                    damage,
                    remaining: entry.health,
                });
                if entry.health == 0 {
                    out_events.push(Event::ZombieDefeated { zombie });
                }
            }
            (Combatant::Zombie(zombie), Combatant::Character(character)) => {
                let attacker_alive = world
                    .store
                    .zombie(zombie)
                    .is_some_and(|entry| entry.health > 0);
                if !attacker_alive {
                    return;
                }
                let Some(entry) = world.store.character_mut(character) else {
                    return;
                };
                if entry.health == 0 {
                    return;
                }

                entry.health = entry.health.saturating_sub(damage);
                out_events.push(Event::CharacterStruck {
                    zombie,
                    character,
                    damage,
                    remaining: entry.health,
                });
                if entry.health == 0 {
                    out_events.push(Event::CharacterDefeated { character });
                }
            }
            _ => {
                tracing::debug!(?attacker, ?target, "ignoring strike between allies");
            }
        },
        Command::RemoveDefeated => {
            let (characters, zombies) = world.store.remove_defeated();
            if !characters.is_empty() || !zombies.is_empty() {
                tracing::debug!(
                    characters = characters.len(),
                    zombies = zombies.len(),
                    "removed defeated entities"
                );
            }
        }
    }
}

/// Moves every zombie concurrently, one task per zombie.
///
/// Each task receives exclusive access to its own zombie slot plus a shared,
/// read-only view of the grid and of the characters as they stood when the
/// phase began. The store cannot be resized until every task has finished:
/// the parallel iterator holds the only mutable borrow and returning from it
/// is the barrier.
///
/// `plan` answers the destination for one zombie. Destinations that are not a
/// valid cell within one step (diagonals included) are discarded and the
/// zombie stays put.
///
/// A panicking task leaves its own zombie in place. Every other task still
/// completes, its move is reported in `out_events`, and the first failure in
/// store order is returned once all events have been pushed.
pub fn advance_zombies<F>(
    world: &mut World,
    plan: F,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError>
where
    F: Fn(&ZombieSnapshot, &Surroundings<'_>) -> Position + Sync,
{
    let characters = query::character_view(world);
    let World { grid, store, .. } = world;
    let surroundings = Surroundings {
        grid: grid.view(),
        characters: &characters,
    };

    let outcomes: Vec<Result<Option<Event>, WorldError>> = store
        .zombie_slots_mut()
        .par_iter_mut()
        .map(|zombie| zombie.take_step(&plan, &surroundings))
        .collect();

    let mut failure = None;
    for outcome in outcomes {
        match outcome {
            Ok(Some(event)) => out_events.push(event),
            Ok(None) => {}
            Err(error) => {
                tracing::warn!(%error, "zombie task failed");
                if failure.is_none() {
                    failure = Some(error);
                }
            }
        }
    }
    failure.map_or(Ok(()), Err)
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::World;
    use survival_core::{
        CharacterSnapshot, CharacterView, GridView, Position, ZombieSnapshot, ZombieView,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the obstacle mask.
    #[must_use]
    pub fn grid_view(world: &World) -> GridView<'_> {
        world.grid.view()
    }

    /// Captures a read-only view of the characters in store order.
    #[must_use]
    pub fn character_view(world: &World) -> CharacterView {
        CharacterView::from_snapshots(
            world
                .store
                .characters()
                .iter()
                .map(|character| character.snapshot())
                .collect(),
        )
    }

    /// Captures a read-only view of the zombies in store order.
    #[must_use]
    pub fn zombie_view(world: &World) -> ZombieView {
        ZombieView::from_snapshots(
            world
                .store
                .zombies()
                .iter()
                .map(|zombie| zombie.snapshot())
                .collect(),
        )
    }

    /// Character nearest to `from` by Manhattan distance, first in store order on ties.
    #[must_use]
    pub fn closest_character(world: &World, from: Position) -> Option<CharacterSnapshot> {
        world
            .store
            .find_closest_character(from)
            .map(|character| character.snapshot())
    }

    /// First character, in store order, standing on the provided cell.
    #[must_use]
    pub fn character_at(world: &World, position: Position) -> Option<CharacterSnapshot> {
        world
            .store
            .character_at(position)
            .map(|character| character.snapshot())
    }

    /// First zombie, in store order, standing on the provided cell.
    #[must_use]
    pub fn zombie_at(world: &World, position: Position) -> Option<ZombieSnapshot> {
        world.store.zombie_at(position).map(|zombie| zombie.snapshot())
    }

    /// True iff no zombie with positive health remains.
    #[must_use]
    pub fn is_game_over(world: &World) -> bool {
        !world.store.zombies().iter().any(|zombie| zombie.health > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_core::{CharacterId, Direction, Weapon, ZombieId};

    fn spawn_character(world: &mut World, health: u32, position: Position) -> CharacterId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnCharacter {
                name: "Sylas".to_owned(),
                health,
                weapon: Weapon::sword(),
                position,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::CharacterSpawned { character, .. }] => *character,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    fn spawn_zombie(world: &mut World, health: u32, position: Position) -> ZombieId {
        let mut events = Vec::new();
        apply(
            world,
            Command::SpawnZombie {
                name: "Walker".to_owned(),
                health,
                position,
            },
            &mut events,
        );
        match events.as_slice() {
            [Event::ZombieSpawned { zombie, .. }] => *zombie,
            other => panic!("unexpected events: {other:?}"),
        }
    }

    fn character_position(world: &World, id: CharacterId) -> Position {
        query::character_view(world)
            .get(id)
            .expect("character present")
            .position
    }

    #[test]
    fn valid_steps_apply_the_unit_delta() {
        let mut world = World::new(Grid::open(5, 5));
        let character = spawn_character(&mut world, 100, Position::new(2, 2));

        let expectations = [
            (Direction::North, Position::new(1, 2)),
            (Direction::East, Position::new(1, 3)),
            (Direction::South, Position::new(2, 3)),
            (Direction::West, Position::new(2, 2)),
        ];
        for (direction, expected) in expectations {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::StepCharacter {
                    character,
                    direction,
                },
                &mut events,
            );
            assert_eq!(character_position(&world, character), expected);
            assert_eq!(events.len(), 1);
        }
    }

    #[test]
    fn blocked_steps_are_silent_no_ops() {
        let grid = Grid::with_obstacles(3, 3, &[Position::new(1, 0)]);
        let mut world = World::new(grid);
        let character = spawn_character(&mut world, 100, Position::new(0, 0));

        for direction in [Direction::North, Direction::West, Direction::South] {
            let mut events = Vec::new();
            apply(
                &mut world,
                Command::StepCharacter {
                    character,
                    direction,
                },
                &mut events,
            );
            assert!(events.is_empty());
            assert_eq!(character_position(&world, character), Position::new(0, 0));
        }
    }

    #[test]
    fn strikes_clamp_health_and_report_defeat() {
        let mut world = World::new(Grid::open(3, 3));
        let character = spawn_character(&mut world, 100, Position::new(1, 1));
        let zombie = spawn_zombie(&mut world, 10, Position::new(1, 1));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Combatant::Character(character),
                target: Combatant::Zombie(zombie),
                damage: 25,
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::ZombieStruck {
                    character,
                    zombie,
                    damage: 25,
                    remaining: 0,
                },
                Event::ZombieDefeated { zombie },
            ]
        );
        assert!(query::is_game_over(&world));
        assert_eq!(query::zombie_view(&world).len(), 1);

        apply(&mut world, Command::RemoveDefeated, &mut events);
        assert!(query::zombie_view(&world).is_empty());
        assert!(query::is_game_over(&world));
    }

    #[test]
    fn defeated_zombies_cannot_strike_back() {
        let mut world = World::new(Grid::open(3, 3));
        let character = spawn_character(&mut world, 100, Position::new(0, 0));
        let zombie = spawn_zombie(&mut world, 0, Position::new(0, 0));

        let mut events = Vec::new();
        apply(
            &mut world,
            Command::Strike {
                attacker: Combatant::Zombie(zombie),
                target: Combatant::Character(character),
                damage: 15,
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert_eq!(query::character_view(&world).get(character).map(|c| c.health), Some(100));
    }

    #[test]
    fn engagement_requires_shared_cell() {
        let mut world = World::new(Grid::open(3, 3));
        let character = spawn_character(&mut world, 100, Position::new(0, 0));
        let zombie = spawn_zombie(&mut world, 10, Position::new(0, 1));

        let mut events = Vec::new();
        apply(&mut world, Command::Engage { character, zombie }, &mut events);
        assert!(events.is_empty());
    }

    #[test]
    fn game_over_tracks_living_zombies() {
        let mut world = World::new(Grid::open(3, 3));
        assert!(query::is_game_over(&world));

        let _ = spawn_zombie(&mut world, 0, Position::new(0, 0));
        assert!(query::is_game_over(&world));

        let _ = spawn_zombie(&mut world, 1, Position::new(0, 0));
        assert!(!query::is_game_over(&world));
    }

    #[test]
    fn zombie_phase_discards_illegal_destinations() {
        let grid = Grid::with_obstacles(4, 4, &[Position::new(1, 1)]);
        let mut world = World::new(grid);
        let _ = spawn_zombie(&mut world, 10, Position::new(0, 0));
        let _ = spawn_zombie(&mut world, 10, Position::new(3, 3));

        let mut events = Vec::new();
        advance_zombies(
            &mut world,
            |zombie, _| match zombie.position.x() {
                0 => Position::new(1, 1),
                _ => Position::new(0, 0),
            },
            &mut events,
        )
        .expect("zombie phase");

        assert!(events.is_empty());
        let positions: Vec<_> = query::zombie_view(&world)
            .iter()
            .map(|zombie| zombie.position)
            .collect();
        assert_eq!(positions, vec![Position::new(0, 0), Position::new(3, 3)]);
    }

    #[test]
    fn zombie_phase_surfaces_panicking_tasks() {
        let mut world = World::new(Grid::open(4, 4));
        let _ = spawn_zombie(&mut world, 10, Position::new(0, 0));
        let doomed = spawn_zombie(&mut world, 10, Position::new(2, 2));

        let mut events = Vec::new();
        let result = advance_zombies(
            &mut world,
            |zombie, _| {
                if zombie.id == doomed {
                    panic!("planner failure");
                }
                zombie.position
            },
            &mut events,
        );

        assert_eq!(result, Err(WorldError::ZombieTaskPanicked { zombie: doomed }));
    }

    #[test]
    fn panicking_task_keeps_other_moves_and_their_events() {
        let mut world = World::new(Grid::open(5, 5));
        let doomed = spawn_zombie(&mut world, 10, Position::new(0, 0));
        let runner = spawn_zombie(&mut world, 10, Position::new(3, 3));

        let mut events = Vec::new();
        let result = advance_zombies(
            &mut world,
            |zombie, _| {
                if zombie.id == doomed {
                    panic!("planner failure");
                }
                Position::new(3, 4)
            },
            &mut events,
        );

        assert_eq!(result, Err(WorldError::ZombieTaskPanicked { zombie: doomed }));
        let zombies = query::zombie_view(&world);
        assert_eq!(
            zombies.get(doomed).map(|zombie| zombie.position),
            Some(Position::new(0, 0))
        );
        assert_eq!(
            zombies.get(runner).map(|zombie| zombie.position),
            Some(Position::new(3, 4))
        );
        assert_eq!(
            events,
            vec![Event::ZombieMoved {
                zombie: runner,
                from: Position::new(3, 3),
                to: Position::new(3, 4),
            }]
        );
    }
}
