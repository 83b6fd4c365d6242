//! Loading of roster files.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use survival_system_bootstrap::Roster;

/// Reads the roster at `path`, or the built-in line-up when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<Roster> {
    let Some(path) = path else {
        return Ok(Roster::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read roster file {}", path.display()))?;
    parse(&text).with_context(|| format!("invalid roster file {}", path.display()))
}

fn parse(text: &str) -> Result<Roster> {
    let roster: Roster = toml::from_str(text)?;
    roster.validate()?;
    Ok(roster)
}
