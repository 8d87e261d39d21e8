use std::path::{Path, PathBuf};

use crate::focus::WindowFocus;
use crate::players::{self, Player};
use crate::scoreboard::Scoreboard;
use crate::startgg::{Credentials, TournamentApi};

pub const DEFAULT_WEB_PORT: u16 = 1337;
pub const DEFAULT_WEB_DIR: &str = "web";
pub const DEFAULT_PLAYERS_FILE: &str = "players.csv";
pub const DEFAULT_STARTGG_FILE: &str = "creds-startgg";

const SCOREBOARD_FILE: &str = "state.json";
const BRACKET_FILE: &str = "bracket.json";

/// Where the controller keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerPaths {
    pub web_dir: PathBuf,
    pub players_file: PathBuf,
    pub startgg_file: PathBuf,
}

impl Default for ControllerPaths {
    fn default() -> Self {
        Self {
            web_dir: PathBuf::from(DEFAULT_WEB_DIR),
            players_file: PathBuf::from(DEFAULT_PLAYERS_FILE),
            startgg_file: PathBuf::from(DEFAULT_STARTGG_FILE),
        }
    }
}

impl ControllerPaths {
    /// All files under `root`, using the default names.
    pub fn under(root: &Path) -> Self {
        let defaults = Self::default();
        Self {
            web_dir: root.join(defaults.web_dir),
            players_file: root.join(defaults.players_file),
            startgg_file: root.join(defaults.startgg_file),
        }
    }

    pub fn scoreboard_file(&self) -> PathBuf {
        self.web_dir.join(SCOREBOARD_FILE)
    }

    pub fn bracket_file(&self) -> PathBuf {
        self.web_dir.join(BRACKET_FILE)
    }
}

/// Everything the command handlers read and mutate.
///
/// Owned by the dispatcher and lent to one handler at a time.
pub struct ControllerState {
    pub players: Vec<Player>,
    pub scoreboard: Scoreboard,
    pub credentials: Credentials,
    pub paths: ControllerPaths,
    /// Port reported to the GUI for the overlay URL.
    pub web_port: u16,
    pub api: Box<dyn TournamentApi>,
    pub focus: Box<dyn WindowFocus>,
}

impl ControllerState {
    /// Read players, scoreboard, and credentials from `paths`.
    pub fn load(
        paths: ControllerPaths,
        web_port: u16,
        api: Box<dyn TournamentApi>,
        focus: Box<dyn WindowFocus>,
    ) -> Self {
        let players = players::load(&paths.players_file);
        let scoreboard = Scoreboard::load(&paths.scoreboard_file());
        let credentials = Credentials::load(&paths.startgg_file);

        tracing::info!(
            players = players.len(),
            has_token = !credentials.token.is_empty(),
            "controller state loaded"
        );

        Self {
            players,
            scoreboard,
            credentials,
            paths,
            web_port,
            api,
            focus,
        }
    }
}

impl std::fmt::Debug for ControllerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControllerState")
            .field("players", &self.players.len())
            .field("scoreboard", &self.scoreboard)
            .field("credentials", &self.credentials)
            .field("paths", &self.paths)
            .field("web_port", &self.web_port)
            .finish_non_exhaustive()
    }
}
