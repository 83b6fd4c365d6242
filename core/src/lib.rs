#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the zombie survival engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that adapters narrate. Systems only ever observe the world through the
//! read-only views defined here ([`GridView`], [`CharacterView`],
//! [`ZombieView`]).

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Zombie Survival.";

/// Damage dealt by a zombie's unarmed counter-attack.
pub const ZOMBIE_UNARMED_DAMAGE: u32 = 15;

/// Exclusive upper bound of the random bonus added to every weapon strike.
pub const STRIKE_ROLL_CEILING: u32 = 20;

/// Location of a single grid cell.
///
/// `x` indexes the first grid axis (north/south) and `y` the second
/// (west/east), so the grid is printed with `x` as the row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    x: u32,
    y: u32,
}

impl Position {
    /// Creates a new position from its two coordinates.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Coordinate along the first (north/south) axis.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Coordinate along the second (west/east) axis.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Offsets the position, returning `None` when a coordinate would become negative.
    ///
    /// Upper bounds are not checked here; that is the grid's job.
    #[must_use]
    pub fn offset(self, dx: i32, dy: i32) -> Option<Position> {
        Some(Self {
            x: self.x.checked_add_signed(dx)?,
            y: self.y.checked_add_signed(dy)?,
        })
    }

    /// Position one unit step away in the provided direction.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Cardinal movement directions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward decreasing `x`.
    North,
    /// Movement toward increasing `y`.
    East,
    /// Movement toward increasing `x`.
    South,
    /// Movement toward decreasing `y`.
    West,
}

impl Direction {
    /// Every cardinal direction, in the order used for random walks.
    pub const CARDINAL: [Direction; 4] = [
        Direction::East,
        Direction::West,
        Direction::South,
        Direction::North,
    ];

    /// Unit delta `(dx, dy)` applied by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (-1, 0),
            Self::South => (1, 0),
            Self::West => (0, -1),
            Self::East => (0, 1),
        }
    }

    /// Parses a single `W`/`A`/`S`/`D` command token, ignoring case and surrounding whitespace.
    pub fn from_token(token: &str) -> Result<Self, DirectionError> {
        match token.trim().to_ascii_lowercase().as_str() {
            "w" => Ok(Self::North),
            "a" => Ok(Self::West),
            "s" => Ok(Self::South),
            "d" => Ok(Self::East),
            _ => Err(DirectionError::Unrecognised(token.trim().to_owned())),
        }
    }
}

impl FromStr for Direction {
    type Err = DirectionError;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        Self::from_token(token)
    }
}

/// Reasons a command token cannot be turned into a [`Direction`].
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DirectionError {
    /// The token is not one of `W`, `A`, `S` or `D`.
    #[error("'{0}' is not a valid move, expected one of W, A, S, D")]
    Unrecognised(String),
}

/// Unique identifier assigned to a character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CharacterId(u32);

impl CharacterId {
    /// Creates a new character identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a zombie.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZombieId(u32);

impl ZombieId {
    /// Creates a new zombie identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Either side of a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combatant {
    /// A player-controlled character.
    Character(CharacterId),
    /// An autonomous zombie.
    Zombie(ZombieId),
}

/// Weapon carried by a character.
///
/// `range` is recorded but combat is contact-only, so it never influences a fight.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Weapon {
    /// Display name of the weapon.
    pub name: String,
    /// Base damage added to every strike roll.
    pub damage: u32,
    /// Reach of the weapon in cells.
    #[serde(default)]
    pub range: u32,
}

impl Weapon {
    /// The sword every character carries unless configured otherwise.
    #[must_use]
    pub fn sword() -> Self {
        Self {
            name: "Sword".to_owned(),
            damage: 20,
            range: 0,
        }
    }
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Appends a character to the entity store.
    SpawnCharacter {
        /// Display name of the character.
        name: String,
        /// Starting health; must be positive to take part in the game.
        health: u32,
        /// Weapon equipped by the character.
        weapon: Weapon,
        /// Starting cell.
        position: Position,
    },
    /// Appends a zombie to the entity store.
    SpawnZombie {
        /// Display name of the zombie.
        name: String,
        /// Starting health; must be positive to take part in the game.
        health: u32,
        /// Starting cell.
        position: Position,
    },
    /// Requests that a character advance a single step in the specified direction.
    StepCharacter {
        /// Identifier of the character attempting to move.
        character: CharacterId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Opens a fight between a character and a zombie sharing a cell.
    Engage {
        /// Character taking part in the fight.
        character: CharacterId,
        /// Zombie taking part in the fight.
        zombie: ZombieId,
    },
    /// Applies damage from one combatant to another.
    Strike {
        /// Combatant delivering the blow.
        attacker: Combatant,
        /// Combatant receiving the blow.
        target: Combatant,
        /// Damage subtracted from the target's health.
        damage: u32,
    },
    /// Removes every character and zombie whose health reached zero.
    RemoveDefeated,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a character joined the game.
    CharacterSpawned {
        /// Identifier assigned to the character.
        character: CharacterId,
        /// Display name of the character.
        name: String,
        /// Starting cell.
        position: Position,
    },
    /// Confirms that a zombie joined the game.
    ZombieSpawned {
        /// Identifier assigned to the zombie.
        zombie: ZombieId,
        /// Display name of the zombie.
        name: String,
        /// Starting cell.
        position: Position,
    },
    /// Confirms that a character moved between two cells.
    CharacterMoved {
        /// Identifier of the character that moved.
        character: CharacterId,
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
    },
    /// Confirms that a zombie moved between two cells.
    ZombieMoved {
        /// Identifier of the zombie that moved.
        zombie: ZombieId,
        /// Cell occupied before the move.
        from: Position,
        /// Cell occupied after the move.
        to: Position,
    },
    /// Reports that a character's command token was not a valid move.
    MoveRejected {
        /// Character whose turn was forfeited.
        character: CharacterId,
        /// Raw token received from the input source.
        input: String,
    },
    /// Reports that a character and a zombie share a cell and are about to fight.
    CollisionDetected {
        /// Character involved in the collision.
        character: CharacterId,
        /// Zombie involved in the collision.
        zombie: ZombieId,
        /// Cell shared by both.
        position: Position,
    },
    /// Reports a character's strike against a zombie.
    ZombieStruck {
        /// Character that attacked.
        character: CharacterId,
        /// Zombie that was hit.
        zombie: ZombieId,
        /// Damage dealt.
        damage: u32,
        /// Zombie health after the strike.
        remaining: u32,
    },
    /// Reports a zombie's counter-attack against a character.
    CharacterStruck {
        /// Zombie that attacked.
        zombie: ZombieId,
        /// Character that was hit.
        character: CharacterId,
        /// Damage dealt.
        damage: u32,
        /// Character health after the strike.
        remaining: u32,
    },
    /// Reports that a zombie's health reached zero.
    ZombieDefeated {
        /// Identifier of the defeated zombie.
        zombie: ZombieId,
    },
    /// Reports that a character's health reached zero.
    CharacterDefeated {
        /// Identifier of the defeated character.
        character: CharacterId,
    },
    /// Announces that no zombie with positive health remains.
    GameOver {
        /// Number of ticks played before the game ended.
        ticks: u64,
    },
}

/// Immutable representation of a single character used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CharacterSnapshot {
    /// Unique identifier assigned to the character.
    pub id: CharacterId,
    /// Display name of the character.
    pub name: String,
    /// Current health.
    pub health: u32,
    /// Cell currently occupied.
    pub position: Position,
    /// Equipped weapon.
    pub weapon: Weapon,
}

/// Immutable representation of a single zombie used for queries.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ZombieSnapshot {
    /// Unique identifier assigned to the zombie.
    pub id: ZombieId,
    /// Display name of the zombie.
    pub name: String,
    /// Current health.
    pub health: u32,
    /// Cell currently occupied.
    pub position: Position,
}

/// Read-only snapshot describing all characters, in store order.
#[derive(Clone, Debug, Default)]
pub struct CharacterView {
    snapshots: Vec<CharacterSnapshot>,
}

impl CharacterView {
    /// Creates a new character view, preserving the order of the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<CharacterSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured character snapshots in store order.
    pub fn iter(&self) -> impl Iterator<Item = &CharacterSnapshot> {
        self.snapshots.iter()
    }

    /// Number of characters captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Looks up a character by identifier.
    #[must_use]
    pub fn get(&self, id: CharacterId) -> Option<&CharacterSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Returns the first character, in store order, standing on the provided cell.
    #[must_use]
    pub fn at(&self, position: Position) -> Option<&CharacterSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.position == position)
    }

    /// Returns the character nearest to `from` by Manhattan distance.
    ///
    /// Ties go to the character that comes first in store order.
    #[must_use]
    pub fn closest_to(&self, from: Position) -> Option<&CharacterSnapshot> {
        let mut closest: Option<(u32, &CharacterSnapshot)> = None;
        for snapshot in &self.snapshots {
            let distance = from.manhattan_distance(snapshot.position);
            match closest {
                Some((best, _)) if best <= distance => {}
                _ => closest = Some((distance, snapshot)),
            }
        }
        closest.map(|(_, snapshot)| snapshot)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<CharacterSnapshot> {
        self.snapshots
    }
}

/// Read-only snapshot describing all zombies, in store order.
#[derive(Clone, Debug, Default)]
pub struct ZombieView {
    snapshots: Vec<ZombieSnapshot>,
}

impl ZombieView {
    /// Creates a new zombie view, preserving the order of the provided snapshots.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<ZombieSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured zombie snapshots in store order.
    pub fn iter(&self) -> impl Iterator<Item = &ZombieSnapshot> {
        self.snapshots.iter()
    }

    /// Number of zombies captured by the view.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no zombies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Looks up a zombie by identifier.
    #[must_use]
    pub fn get(&self, id: ZombieId) -> Option<&ZombieSnapshot> {
        self.snapshots.iter().find(|snapshot| snapshot.id == id)
    }

    /// Returns the first zombie, in store order, standing on the provided cell.
    #[must_use]
    pub fn at(&self, position: Position) -> Option<&ZombieSnapshot> {
        self.snapshots
            .iter()
            .find(|snapshot| snapshot.position == position)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<ZombieSnapshot> {
        self.snapshots
    }
}

/// Read-only view into the obstacle mask.
///
/// Cells are stored with `x` as the outer index: the flag for `(x, y)` lives
/// at `x * height + y`.
#[derive(Clone, Copy, Debug)]
pub struct GridView<'a> {
    cells: &'a [bool],
    width: u32,
    height: u32,
}

impl<'a> GridView<'a> {
    /// Captures a new grid view backed by the provided obstacle slice.
    #[must_use]
    pub fn new(cells: &'a [bool], width: u32, height: u32) -> Self {
        Self {
            cells,
            width,
            height,
        }
    }

    /// True iff the position lies inside the grid and is not an obstacle.
    #[must_use]
    pub fn is_valid_position(&self, position: Position) -> bool {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .is_some_and(|obstacle| !obstacle)
    }

    /// Reports whether the in-bounds cell is an obstacle. Out-of-bounds cells are not.
    #[must_use]
    pub fn is_obstacle(&self, position: Position) -> bool {
        self.index(position)
            .and_then(|index| self.cells.get(index).copied())
            .unwrap_or(false)
    }

    /// Provides the `(width, height)` dimensions of the grid.
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns an iterator over every obstacle flag in storage order.
    pub fn iter(&self) -> impl Iterator<Item = bool> + 'a {
        self.cells.iter().copied()
    }

    fn index(&self, position: Position) -> Option<usize> {
        if position.x() < self.width && position.y() < self.height {
            let x = usize::try_from(position.x()).ok()?;
            let y = usize::try_from(position.y()).ok()?;
            let height = usize::try_from(self.height).ok()?;
            Some(x * height + y)
        } else {
            None
        }
    }
}

/// Read-only context handed to every zombie while zombies move concurrently.
#[derive(Clone, Copy, Debug)]
pub struct Surroundings<'a> {
    /// Obstacle mask of the grid.
    pub grid: GridView<'a>,
    /// Characters as they stood when zombie movement began.
    pub characters: &'a CharacterView,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn character(id: u32, x: u32, y: u32) -> CharacterSnapshot {
        CharacterSnapshot {
            id: CharacterId::new(id),
            name: format!("character-{id}"),
            health: 100,
            position: Position::new(x, y),
            weapon: Weapon::sword(),
        }
    }

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = Position::new(1, 1);
        let destination = Position::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn tokens_map_to_unit_deltas() {
        let cases = [
            ("w", (-1, 0)),
            ("A", (0, -1)),
            ("s", (1, 0)),
            ("D", (0, 1)),
        ];
        for (token, delta) in cases {
            let direction: Direction = token.parse().expect("valid token");
            assert_eq!(direction.delta(), delta, "token {token}");
        }
    }

    #[test]
    fn unknown_tokens_are_rejected() {
        for token in ["", "x", "ww", "up", "1"] {
            assert_eq!(
                Direction::from_token(token),
                Err(DirectionError::Unrecognised(token.to_owned()))
            );
        }
    }

    #[test]
    fn step_refuses_negative_coordinates() {
        let origin = Position::new(0, 0);
        assert_eq!(origin.step(Direction::North), None);
        assert_eq!(origin.step(Direction::West), None);
        assert_eq!(origin.step(Direction::South), Some(Position::new(1, 0)));
        assert_eq!(origin.step(Direction::East), Some(Position::new(0, 1)));
    }

    #[test]
    fn closest_character_breaks_ties_by_store_order() {
        let view = CharacterView::from_snapshots(vec![
            character(7, 0, 2),
            character(3, 2, 0),
            character(9, 4, 4),
        ]);
        let closest = view.closest_to(Position::new(1, 1)).expect("closest");
        assert_eq!(closest.id, CharacterId::new(7));
    }

    #[test]
    fn closest_character_is_none_without_characters() {
        assert!(CharacterView::default()
            .closest_to(Position::new(0, 0))
            .is_none());
    }

    #[test]
    fn grid_view_rejects_out_of_bounds_and_obstacles() {
        // 2 x 3 grid with a single obstacle at (1, 2).
        let cells = [false, false, false, false, false, true];
        let view = GridView::new(&cells, 2, 3);

        assert!(view.is_valid_position(Position::new(0, 0)));
        assert!(view.is_valid_position(Position::new(1, 1)));
        assert!(!view.is_valid_position(Position::new(1, 2)));
        assert!(view.is_obstacle(Position::new(1, 2)));
        assert!(!view.is_valid_position(Position::new(2, 0)));
        assert!(!view.is_valid_position(Position::new(0, 3)));
        assert!(!view.is_obstacle(Position::new(5, 5)));
    }

    #[test]
    fn weapon_round_trips_through_bincode() {
        let weapon = Weapon::sword();
        let bytes = bincode::serialize(&weapon).expect("serialize");
        let restored: Weapon = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(restored, weapon);
    }
}
