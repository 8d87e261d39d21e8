//! The player roster, stored as `name,country,team` lines.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::Result;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Player {
    pub name: String,
    /// Lowercase two-letter code, or empty.
    pub country: String,
    pub team: String,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        country: impl Into<String>,
        team: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            country: country.into(),
            team: team.into(),
        }
    }

    /// Case-insensitive substring match on the name.
    pub fn matches_name(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Names matching `query`, in roster order. An empty query matches all.
pub fn search<'a>(players: &'a [Player], query: &str) -> Vec<&'a str> {
    players
        .iter()
        .filter(|p| query.is_empty() || p.matches_name(query))
        .map(|p| p.name.as_str())
        .collect()
}

/// Country of the first player named exactly `name`, or `""`.
pub fn country_of<'a>(players: &'a [Player], name: &str) -> &'a str {
    players
        .iter()
        .find(|p| p.name == name)
        .map(|p| p.country.as_str())
        .unwrap_or_default()
}

/// Read the roster. A missing file is an empty roster; malformed lines are
/// skipped with a warning.
pub fn load(path: &Path) -> Vec<Player> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "could not read players file");
            return Vec::new();
        }
    };

    let mut players = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Some(player) => players.push(player),
            None => tracing::warn!(
                path = %path.display(),
                line = lineno + 1,
                "skipping malformed player line"
            ),
        }
    }

    tracing::debug!(path = %path.display(), count = players.len(), "players loaded");
    players
}

/// Replace the roster file with `players`.
pub fn save(path: &Path, players: &[Player]) -> Result<()> {
    let mut out = String::new();
    for player in players {
        out.push_str(&quote(&player.name));
        out.push(',');
        out.push_str(&quote(&player.country));
        out.push(',');
        out.push_str(&quote(&player.team));
        out.push('\n');
    }
    fs::write(path, out)?;
    Ok(())
}

fn parse_line(line: &str) -> Option<Player> {
    let fields = split_fields(line)?;
    let mut fields = fields.into_iter();
    let name = fields.next()?;
    if name.is_empty() {
        return None;
    }
    Some(Player {
        name,
        country: fields.next().unwrap_or_default(),
        team: fields.next().unwrap_or_default(),
    })
}

fn split_fields(line: &str) -> Option<Vec<String>> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = line.chars().peekable();
    let mut quoted = false;

    while let Some(c) = chars.next() {
        match (quoted, c) {
            (true, '"') if chars.peek() == Some(&'"') => {
                chars.next();
                field.push('"');
            }
            (true, '"') => quoted = false,
            (false, '"') if field.is_empty() => quoted = true,
            (false, ',') => fields.push(std::mem::take(&mut field)),
            (_, c) => field.push(c),
        }
    }

    if quoted {
        return None;
    }
    fields.push(field);
    Some(fields)
}

fn quote(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
