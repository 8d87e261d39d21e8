use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Number of values `getscoreboard` returns.
pub const SCOREBOARD_FIELDS: usize = 10;
/// Number of values `applyscoreboard` takes.
pub const APPLY_FIELDS: usize = 14;

/// What the overlay shows, persisted as `state.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scoreboard {
    pub description: String,
    pub subtitle: String,
    pub p1name: String,
    pub p1country: String,
    pub p1score: i64,
    pub p1team: String,
    pub p2name: String,
    pub p2country: String,
    pub p2score: i64,
    pub p2team: String,
    pub c1title: String,
    pub c1subtitle: String,
    pub c2title: String,
    pub c2subtitle: String,
}

impl Scoreboard {
    /// Read the state file. Missing or unreadable state is an empty board.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read scoreboard");
                return Self::default();
            }
        };

        match serde_json::from_str(&text) {
            Ok(board) => board,
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid scoreboard");
                Self::default()
            }
        }
    }

    /// Overwrite the state file, pretty-printed with four-space indent.
    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(path, to_pretty_json(self)?)?;
        Ok(())
    }

    /// The ten values the GUI edits, in wire order.
    pub fn to_values(&self) -> Vec<String> {
        vec![
            self.description.clone(),
            self.subtitle.clone(),
            self.p1name.clone(),
            self.p1country.clone(),
            self.p1score.to_string(),
            self.p1team.clone(),
            self.p2name.clone(),
            self.p2country.clone(),
            self.p2score.to_string(),
            self.p2team.clone(),
        ]
    }

    /// Take all fourteen fields from an `applyscoreboard` request.
    ///
    /// Scores that are not integers become 0. Returns `false` and leaves
    /// the board untouched if `fields` has the wrong length.
    pub fn apply(&mut self, fields: &[String]) -> bool {
        let [description, subtitle, p1name, p1country, p1score, p1team, p2name, p2country, p2score, p2team, c1title, c1subtitle, c2title, c2subtitle] =
            fields
        else {
            return false;
        };

        *self = Self {
            description: description.clone(),
            subtitle: subtitle.clone(),
            p1name: p1name.clone(),
            p1country: p1country.clone(),
            p1score: parse_score(p1score),
            p1team: p1team.clone(),
            p2name: p2name.clone(),
            p2country: p2country.clone(),
            p2score: parse_score(p2score),
            p2team: p2team.clone(),
            c1title: c1title.clone(),
            c1subtitle: c1subtitle.clone(),
            c2title: c2title.clone(),
            c2subtitle: c2subtitle.clone(),
        };
        true
    }
}

fn parse_score(text: &str) -> i64 {
    text.trim().parse().unwrap_or(0)
}

/// Serialize with the four-space indent the overlay files use.
pub(crate) fn to_pretty_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn temp_path(tag: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!(
            "scorepipe-board-{tag}-{}-{}.json",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ))
    }

    #[test]
    fn apply_parses_scores_leniently() {
        let mut board = Scoreboard::default();
        let applied = board.apply(&fields(&[
            "Top 8", "Winners Semis", "Daigo", "jp", "2", "RB", "Punk", "us", "two", "TL",
            "Commentary", "left", "Commentary", "right",
        ]));

        assert!(applied);
        assert_eq!(board.p1score, 2);
        assert_eq!(board.p2score, 0);
        assert_eq!(board.c2subtitle, "right");
        assert_eq!(
            board.to_values(),
            fields(&["Top 8", "Winners Semis", "Daigo", "jp", "2", "RB", "Punk", "us", "0", "TL"])
        );
    }

    #[test]
    fn apply_rejects_wrong_length() {
        let mut board = Scoreboard {
            description: "kept".into(),
            ..Scoreboard::default()
        };
        assert!(!board.apply(&fields(&["only", "two"])));
        assert_eq!(board.description, "kept");
    }

    #[test]
    fn empty_board_values() {
        let values = Scoreboard::default().to_values();
        assert_eq!(values.len(), SCOREBOARD_FIELDS);
        assert_eq!(values[4], "0");
        assert_eq!(values[8], "0");
    }

    #[test]
    fn save_uses_four_space_indent() {
        let path = temp_path("indent");
        let board = Scoreboard {
            description: "Grand Finals".into(),
            p1score: 3,
            ..Scoreboard::default()
        };
        board.save(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n    \"description\": \"Grand Finals\",\n"));
        assert!(text.contains("\n    \"p1score\": 3,\n"));
        assert_eq!(Scoreboard::load(&path), board);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn load_tolerates_missing_and_invalid_files() {
        assert_eq!(Scoreboard::load(&temp_path("missing")), Scoreboard::default());

        let path = temp_path("invalid");
        fs::write(&path, "{not json").unwrap();
        assert_eq!(Scoreboard::load(&path), Scoreboard::default());

        fs::write(&path, r#"{"p2name":"MenaRD"}"#).unwrap();
        assert_eq!(Scoreboard::load(&path).p2name, "MenaRD");
        let _ = fs::remove_file(&path);
    }
}
