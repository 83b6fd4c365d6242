#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Text rendering for the zombie survival game.
//!
//! Adapters capture a [`Scene`] from the world between ticks and hand it, plus
//! the events produced during the tick, to a [`RenderingBackend`].
//! [`TextRenderer`] prints both to any [`Write`] sink.

use std::{collections::HashMap, io::Write, thread, time::Duration};

use anyhow::Result;
use survival_core::{
    CharacterSnapshot, CharacterView, Combatant, Event, GridView, Position, ZombieSnapshot,
    ZombieView,
};

const STATE_HEADER: &str = "======= GAME STATE =======";
const STATE_FOOTER: &str = "==========================";

/// Everything a backend needs to draw one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Scene {
    width: u32,
    height: u32,
    obstacles: Vec<bool>,
    characters: Vec<CharacterSnapshot>,
    zombies: Vec<ZombieSnapshot>,
}

impl Scene {
    /// Captures a scene from read-only world views.
    #[must_use]
    pub fn new(grid: GridView<'_>, characters: CharacterView, zombies: ZombieView) -> Self {
        let (width, height) = grid.dimensions();
        Self {
            width,
            height,
            obstacles: grid.iter().collect(),
            characters: characters.into_vec(),
            zombies: zombies.into_vec(),
        }
    }

    /// Characters in store order.
    #[must_use]
    pub fn characters(&self) -> &[CharacterSnapshot] {
        &self.characters
    }

    /// Zombies in store order.
    #[must_use]
    pub fn zombies(&self) -> &[ZombieSnapshot] {
        &self.zombies
    }

    fn track(&mut self, event: &Event) {
        match event {
            Event::CharacterMoved { character, to, .. } => {
                if let Some(entry) = self.characters.iter_mut().find(|c| c.id == *character) {
                    entry.position = *to;
                }
            }
            Event::ZombieMoved { zombie, to, .. } => {
                if let Some(entry) = self.zombies.iter_mut().find(|z| z.id == *zombie) {
                    entry.position = *to;
                }
            }
            Event::CharacterDefeated { character } => {
                self.characters.retain(|c| c.id != *character);
            }
            Event::ZombieDefeated { zombie } => self.zombies.retain(|z| z.id != *zombie),
            _ => {}
        }
    }

    fn grid(&self) -> GridView<'_> {
        GridView::new(&self.obstacles, self.width, self.height)
    }

    fn cell_glyph(&self, position: Position) -> &'static str {
        if self.grid().is_obstacle(position) {
            return "X";
        }

        let has_character = self.characters.iter().any(|c| c.position == position);
        let has_zombie = self.zombies.iter().any(|z| z.position == position);
        match (has_character, has_zombie) {
            (true, true) => "cz",
            (true, false) => "c",
            (false, true) => "z",
            (false, false) => ".",
        }
    }
}

/// Renders the grid, one line per `x`, cells separated by spaces.
///
/// `X` marks an obstacle, `cz` a cell shared by a character and a zombie, `c`
/// a character, `z` a zombie and `.` an empty cell.
#[must_use]
pub fn render_grid(scene: &Scene) -> String {
    let mut text = String::new();
    for x in 0..scene.width {
        let row: Vec<&str> = (0..scene.height)
            .map(|y| scene.cell_glyph(Position::new(x, y)))
            .collect();
        text.push_str(&row.join(" "));
        text.push('\n');
    }
    text
}

/// Renders the framed state listing: grid, characters, then zombies.
#[must_use]
pub fn render_status(scene: &Scene) -> String {
    let mut text = String::new();
    text.push_str(STATE_HEADER);
    text.push('\n');
    text.push_str(&render_grid(scene));
    text.push('\n');
    for character in &scene.characters {
        text.push_str(&status_line(
            &character.name,
            character.position,
            character.health,
        ));
    }
    text.push('\n');
    for zombie in &scene.zombies {
        text.push_str(&status_line(&zombie.name, zombie.position, zombie.health));
    }
    text.push_str(STATE_FOOTER);
    text.push('\n');
    text
}

fn status_line(name: &str, position: Position, health: u32) -> String {
    format!("{name} - position: {position} - health: {health}\n")
}

/// Presentation seam between the game loop and a concrete output.
pub trait RenderingBackend {
    /// Draws the state of the board between ticks.
    fn present(&mut self, scene: &Scene) -> Result<()>;

    /// Narrates the events produced by a tick, in order.
    fn report(&mut self, events: &[Event]) -> Result<()>;

    /// Asks the player for the next move of `character`.
    fn prompt(&mut self, character: &CharacterSnapshot) -> Result<()>;
}

/// Backend that writes plain text.
///
/// The last presented scene is kept up to date with the movement and defeat
/// events reported after it, so a collision is narrated below the board as it
/// stood when the fight broke out.
#[derive(Debug)]
pub struct TextRenderer<W> {
    out: W,
    names: HashMap<Combatant, String>,
    board: Option<Scene>,
    pause: Duration,
}

impl<W: Write> TextRenderer<W> {
    /// Creates a renderer writing to `out`, pausing for `pause` after each combat line.
    pub fn new(out: W, pause: Duration) -> Self {
        Self {
            out,
            names: HashMap::new(),
            board: None,
            pause,
        }
    }

    /// Consumes the renderer, returning the sink.
    pub fn into_inner(self) -> W {
        self.out
    }

    /// Turns one event into a line of narration; spawn and move events stay silent.
    ///
    /// Names are learned from spawn events, so defeated entities keep their
    /// name after they leave the world. A collision is preceded by the grid
    /// once a scene has been presented.
    pub fn narrate(&mut self, event: &Event) -> Option<String> {
        if let Some(board) = self.board.as_mut() {
            board.track(event);
        }

        match event {
            Event::CharacterSpawned {
                character, name, ..
            } => {
                let _ = self
                    .names
                    .insert(Combatant::Character(*character), name.clone());
                None
            }
            Event::ZombieSpawned { zombie, name, .. } => {
                let _ = self.names.insert(Combatant::Zombie(*zombie), name.clone());
                None
            }
            Event::CharacterMoved { .. } | Event::ZombieMoved { .. } => None,
            Event::MoveRejected { character, input } => Some(format!(
                "Invalid move '{input}'. {} stays put.",
                self.name(Combatant::Character(*character))
            )),
            Event::CollisionDetected {
                character,
                zombie,
                position,
            } => {
                let grid = self.board.as_ref().map(render_grid).unwrap_or_default();
                Some(format!(
                    "{grid}{} and {} collided at {position}!",
                    self.name(Combatant::Character(*character)),
                    self.name(Combatant::Zombie(*zombie))
                ))
            }
            Event::ZombieStruck {
                character,
                zombie,
                damage,
                remaining,
            } => {
                let attacker = self.name(Combatant::Character(*character));
                let target = self.name(Combatant::Zombie(*zombie));
                let mut line = format!("{attacker} attacks the zombie {target} for {damage} damage!");
                if *remaining > 0 {
                    line.push_str(&format!(
                        "\nThe zombie {target} has {remaining} health left and strikes back!"
                    ));
                }
                Some(line)
            }
            Event::CharacterStruck {
                zombie,
                character,
                damage,
                remaining,
            } => {
                let attacker = self.name(Combatant::Zombie(*zombie));
                let target = self.name(Combatant::Character(*character));
                Some(format!(
                    "{attacker} hits {target} for {damage} damage. {target} has {remaining} health left."
                ))
            }
            Event::ZombieDefeated { zombie } => Some(format!(
                "The zombie {} has been defeated!",
                self.name(Combatant::Zombie(*zombie))
            )),
            Event::CharacterDefeated { character } => Some(format!(
                "{} has been defeated!",
                self.name(Combatant::Character(*character))
            )),
            Event::GameOver { ticks } => Some(format!(
                "All zombies have been defeated after {ticks} turns!"
            )),
        }
    }

    fn name(&self, combatant: Combatant) -> String {
        match self.names.get(&combatant) {
            Some(name) => name.clone(),
            None => match combatant {
                Combatant::Character(id) => format!("character #{}", id.get()),
                Combatant::Zombie(id) => format!("zombie #{}", id.get()),
            },
        }
    }
}

impl<W: Write> RenderingBackend for TextRenderer<W> {
    fn present(&mut self, scene: &Scene) -> Result<()> {
        self.board = Some(scene.clone());
        self.out.write_all(render_status(scene).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    fn report(&mut self, events: &[Event]) -> Result<()> {
        for event in events {
            let Some(line) = self.narrate(event) else {
                continue;
            };
            writeln!(self.out, "{line}")?;
            self.out.flush()?;

            let combat = matches!(
                event,
                Event::CollisionDetected { .. }
                    | Event::ZombieStruck { .. }
                    | Event::CharacterStruck { .. }
            );
            if combat && !self.pause.is_zero() {
                thread::sleep(self.pause);
            }
        }
        Ok(())
    }

    fn prompt(&mut self, character: &CharacterSnapshot) -> Result<()> {
        write!(self.out, "{}, make your move (WASD): ", character.name)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use survival_core::{CharacterId, Weapon, ZombieId};

    fn scene() -> Scene {
        // 3 x 4 grid with an obstacle at (0, 3).
        let obstacles = [
            false, false, false, true, false, false, false, false, false, false, false, false,
        ];
        let characters = CharacterView::from_snapshots(vec![
            CharacterSnapshot {
                id: CharacterId::new(0),
                name: "Sylas".to_owned(),
                health: 100,
                position: Position::new(0, 0),
                weapon: Weapon::sword(),
            },
            CharacterSnapshot {
                id: CharacterId::new(1),
                name: "Elsa".to_owned(),
                health: 65,
                position: Position::new(2, 1),
                weapon: Weapon::sword(),
            },
        ]);
        let zombies = ZombieView::from_snapshots(vec![
            ZombieSnapshot {
                id: ZombieId::new(0),
                name: "Walker".to_owned(),
                health: 10,
                position: Position::new(2, 1),
            },
            ZombieSnapshot {
                id: ZombieId::new(1),
                name: "Runner".to_owned(),
                health: 15,
                position: Position::new(1, 2),
            },
        ]);
        Scene::new(GridView::new(&obstacles, 3, 4), characters, zombies)
    }

    #[test]
    fn grid_marks_every_cell_kind() {
        assert_eq!(
            render_grid(&scene()),
            "c . . X\n. . z .\n. cz . .\n"
        );
    }

    #[test]
    fn status_lists_characters_then_zombies() {
        let status = render_status(&scene());
        let lines: Vec<&str> = status.lines().collect();

        assert_eq!(lines[0], STATE_HEADER);
        assert_eq!(lines[5], "Sylas - position: (0, 0) - health: 100");
        assert_eq!(lines[6], "Elsa - position: (2, 1) - health: 65");
        assert_eq!(lines[8], "Walker - position: (2, 1) - health: 10");
        assert_eq!(lines[9], "Runner - position: (1, 2) - health: 15");
        assert_eq!(lines.last(), Some(&STATE_FOOTER));
    }

    #[test]
    fn narration_uses_names_learned_from_spawns() {
        let mut renderer = TextRenderer::new(Vec::new(), Duration::ZERO);
        let character = CharacterId::new(0);
        let zombie = ZombieId::new(0);
        let events = [
            Event::CharacterSpawned {
                character,
                name: "Sylas".to_owned(),
                position: Position::new(0, 0),
            },
            Event::ZombieSpawned {
                zombie,
                name: "Walker".to_owned(),
                position: Position::new(0, 1),
            },
            Event::CollisionDetected {
                character,
                zombie,
                position: Position::new(1, 0),
            },
            Event::ZombieStruck {
                character,
                zombie,
                damage: 27,
                remaining: 0,
            },
            Event::ZombieDefeated { zombie },
        ];

        renderer.report(&events).expect("report");
        let text = String::from_utf8(renderer.into_inner()).expect("utf8");

        assert_eq!(
            text,
            "Sylas and Walker collided at (1, 0)!\n\
             Sylas attacks the zombie Walker for 27 damage!\n\
             The zombie Walker has been defeated!\n"
        );
    }

    #[test]
    fn collision_redraws_the_board_after_moves() {
        let mut renderer = TextRenderer::new(Vec::new(), Duration::ZERO);
        renderer.present(&scene()).expect("present");
        let presented = renderer.into_inner().len();

        let mut renderer = TextRenderer::new(Vec::new(), Duration::ZERO);
        renderer.present(&scene()).expect("present");
        let events = [
            Event::ZombieMoved {
                zombie: ZombieId::new(1),
                from: Position::new(1, 2),
                to: Position::new(0, 1),
            },
            Event::CharacterMoved {
                character: CharacterId::new(0),
                from: Position::new(0, 0),
                to: Position::new(0, 1),
            },
            Event::CollisionDetected {
                character: CharacterId::new(0),
                zombie: ZombieId::new(1),
                position: Position::new(0, 1),
            },
        ];
        renderer.report(&events).expect("report");
        let text = String::from_utf8(renderer.into_inner()).expect("utf8");

        assert_eq!(
            &text[presented..],
            ". cz . X\n. . . .\n. cz . .\ncharacter #0 and zombie #1 collided at (0, 1)!\n"
        );
    }

    #[test]
    fn collision_without_a_presented_scene_is_a_single_line() {
        let mut renderer = TextRenderer::new(Vec::new(), Duration::ZERO);
        let line = renderer.narrate(&Event::CollisionDetected {
            character: CharacterId::new(0),
            zombie: ZombieId::new(0),
            position: Position::new(2, 2),
        });
        assert_eq!(
            line.as_deref(),
            Some("character #0 and zombie #0 collided at (2, 2)!")
        );
    }

    #[test]
    fn unknown_entities_fall_back_to_identifiers() {
        let mut renderer = TextRenderer::new(Vec::new(), Duration::ZERO);
        let line = renderer.narrate(&Event::MoveRejected {
            character: CharacterId::new(3),
            input: "q".to_owned(),
        });
        assert_eq!(
            line.as_deref(),
            Some("Invalid move 'q'. character #3 stays put.")
        );
    }
}
