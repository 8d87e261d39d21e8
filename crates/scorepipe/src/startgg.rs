//! start.gg GraphQL client and response parsing.

use std::fmt;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::time::Duration;

use reqwest::{header, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::bracket::{BracketSet, SetSlot};
use crate::countries::code_or_blank;
use crate::error::{ControllerError, Result};
use crate::players::Player;

pub const STARTGG_URL: &str = "https://api.start.gg/gql/alpha";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
const PARTICIPANTS_PER_PAGE: u32 = 500;
const BRACKET_SETS_PER_PAGE: u32 = 12;

const FETCH_PLAYERS_FAILED: &str = "fetch players";
const API_REQUEST_FAILED: &str = "Error making API request";

const PARTICIPANTS_QUERY: &str = r#"
query TournamentParticipants($slug: String!, $page: Int!, $perPage: Int!) {
  tournament(slug: $slug) {
    participants(query: {page: $page, perPage: $perPage}) {
      nodes {
        gamerTag
        prefix
        user { location { country } }
      }
    }
  }
}
"#;

const STREAM_QUEUE_QUERY: &str = r#"
query StreamQueueOnTournament($tourneySlug: String!) {
  tournament(slug: $tourneySlug) {
    streamQueue {
      sets {
        fullRoundText
        slots {
          entrant {
            participants {
              prefix
              gamerTag
              user { location { country } }
            }
          }
        }
      }
    }
  }
}
"#;

const PHASE_GROUP_SETS_QUERY: &str = r#"
query PhaseGroupSets($phaseGroupId: ID!, $page: Int!, $perPage: Int!) {
  phaseGroup(id: $phaseGroupId) {
    sets(page: $page, perPage: $perPage, sortType: ROUND) {
      nodes {
        fullRoundText
        slots {
          entrant { name }
          standing { stats { score { value } } }
        }
      }
    }
  }
}
"#;

/// Token and identifiers the GUI last used, persisted one per line.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub token: String,
    pub slug: String,
    pub phase_group_id: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &format_args!("<redacted:{} bytes>", self.token.len()))
            .field("slug", &self.slug)
            .field("phase_group_id", &self.phase_group_id)
            .finish()
    }
}

impl Credentials {
    /// Read the credentials file. Missing lines are empty; a missing file
    /// is all-empty.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Self::default(),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read credentials");
                return Self::default();
            }
        };

        let mut lines = text.lines().map(str::to_string);
        Self {
            token: lines.next().unwrap_or_default(),
            slug: lines.next().unwrap_or_default(),
            phase_group_id: lines.next().unwrap_or_default(),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        fs::write(
            path,
            format!("{}\n{}\n{}\n", self.token, self.slug, self.phase_group_id),
        )?;
        Ok(())
    }
}

/// The tournament lookups the GUI can trigger.
pub trait TournamentApi {
    /// Participants of the tournament named by `creds.slug`.
    fn fetch_players(&self, creds: &Credentials) -> Result<Vec<Player>>;

    /// The two players of the first set waiting in the stream queue.
    fn fetch_stream_queue(&self, creds: &Credentials) -> Result<(Player, Player)>;

    /// Sets of the phase group `creds.phase_group_id`, sorted by round.
    fn fetch_bracket(&self, creds: &Credentials) -> Result<Vec<BracketSet>>;
}

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

/// Blocking HTTP client for the start.gg GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct StartggClient {
    http: reqwest::blocking::Client,
    endpoint: String,
}

impl StartggClient {
    pub fn new() -> Result<Self> {
        Self::with_endpoint(STARTGG_URL)
    }

    /// Client for a non-default endpoint.
    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("scorepipe/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    /// POST one query. Transport failures are reported under `context`.
    fn post(
        &self,
        context: &'static str,
        token: &str,
        query: &str,
        variables: Value,
    ) -> Result<String> {
        let failed = |source| ControllerError::Request { context, source };
        let body = GraphQlRequest { query, variables };
        let response = self
            .http
            .post(&self.endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .json(&body)
            .send()
            .map_err(failed)?;

        let status = response.status();
        let text = response.text().map_err(failed)?;
        tracing::debug!(status = status.as_u16(), bytes = text.len(), "start.gg response");

        if status != StatusCode::OK {
            return Err(api_error(status.as_u16(), &text));
        }
        Ok(text)
    }
}

impl TournamentApi for StartggClient {
    fn fetch_players(&self, creds: &Credentials) -> Result<Vec<Player>> {
        let body = self.post(
            FETCH_PLAYERS_FAILED,
            &creds.token,
            PARTICIPANTS_QUERY,
            json!({ "slug": creds.slug, "page": 1, "perPage": PARTICIPANTS_PER_PAGE }),
        )?;
        parse_participants(&body)
    }

    fn fetch_stream_queue(&self, creds: &Credentials) -> Result<(Player, Player)> {
        let body = self.post(
            API_REQUEST_FAILED,
            &creds.token,
            STREAM_QUEUE_QUERY,
            json!({ "tourneySlug": creds.slug }),
        )?;
        parse_stream_queue(&body)
    }

    fn fetch_bracket(&self, creds: &Credentials) -> Result<Vec<BracketSet>> {
        let body = self.post(
            API_REQUEST_FAILED,
            &creds.token,
            PHASE_GROUP_SETS_QUERY,
            json!({
                "phaseGroupId": creds.phase_group_id,
                "page": 1,
                "perPage": BRACKET_SETS_PER_PAGE,
            }),
        )?;
        parse_phase_group_sets(&body)
    }
}

/// Error for a non-200 reply: the API's `message` if it sent one.
pub fn api_error(status: u16, body: &str) -> ControllerError {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) => ControllerError::Api(parsed.message),
        Err(_) => ControllerError::UnexpectedResponse {
            status,
            detail: body.to_string(),
        },
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Location {
    country: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct User {
    location: Option<Location>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct Participant {
    gamer_tag: Option<String>,
    prefix: Option<String>,
    user: Option<User>,
}

impl Participant {
    fn country(&self) -> &str {
        self.user
            .as_ref()
            .and_then(|u| u.location.as_ref())
            .and_then(|l| l.country.as_deref())
            .unwrap_or_default()
    }

    fn tag(&self) -> &str {
        self.gamer_tag.as_deref().unwrap_or_default()
    }

    fn prefix(&self) -> &str {
        self.prefix.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

/// How an unreadable 200 reply is described.
#[derive(Debug, Clone, Copy)]
enum BadBody {
    /// Quote the body back.
    Echo,
    /// Give the decoder's error.
    Explain,
}

fn parse_data<T: for<'de> Deserialize<'de> + Default>(body: &str, bad: BadBody) -> Result<T> {
    match serde_json::from_str::<Envelope<T>>(body) {
        Ok(envelope) => Ok(envelope.data.unwrap_or_default()),
        Err(err) => Err(ControllerError::UnexpectedResponse {
            status: StatusCode::OK.as_u16(),
            detail: match bad {
                BadBody::Echo => body.to_string(),
                BadBody::Explain => err.to_string(),
            },
        }),
    }
}

/// Players from a tournament participants response.
///
/// A participant with a prefix is named `"<prefix> <gamerTag>"`.
pub fn parse_participants(body: &str) -> Result<Vec<Player>> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Nodes {
        nodes: Option<Vec<Participant>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Tournament {
        participants: Option<Nodes>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Data {
        tournament: Option<Tournament>,
    }

    let data: Data = parse_data(body, BadBody::Echo)?;
    let nodes = data
        .tournament
        .and_then(|t| t.participants)
        .and_then(|p| p.nodes)
        .unwrap_or_default();

    Ok(nodes
        .iter()
        .map(|part| {
            let name = match part.prefix() {
                "" => part.tag().to_string(),
                prefix => format!("{prefix} {}", part.tag()),
            };
            Player::new(name, code_or_blank(part.country()), "")
        })
        .collect())
}

/// Both players of the first set in the first stream queue.
///
/// The prefix becomes the team.
pub fn parse_stream_queue(body: &str) -> Result<(Player, Player)> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Entrant {
        participants: Option<Vec<Participant>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Slot {
        entrant: Option<Entrant>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Set {
        slots: Option<Vec<Slot>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Queue {
        sets: Option<Vec<Set>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Tournament {
        stream_queue: Option<Vec<Queue>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Data {
        tournament: Option<Tournament>,
    }

    let data: Data = parse_data(body, BadBody::Explain)?;
    let slots = data
        .tournament
        .and_then(|t| t.stream_queue)
        .and_then(|queues| queues.into_iter().next())
        .and_then(|queue| queue.sets)
        .and_then(|sets| sets.into_iter().next())
        .and_then(|set| set.slots)
        .ok_or(ControllerError::EmptyStreamQueue)?;

    let player = |index: usize| -> Result<Player> {
        let part = slots
            .get(index)
            .and_then(|slot| slot.entrant.as_ref())
            .and_then(|entrant| entrant.participants.as_ref())
            .and_then(|parts| parts.first())
            .ok_or(ControllerError::EmptyStreamQueue)?;
        Ok(Player::new(
            part.tag(),
            code_or_blank(part.country()),
            part.prefix(),
        ))
    };

    Ok((player(0)?, player(1)?))
}

/// Sets of a phase group with each slot's entrant name and game score.
pub fn parse_phase_group_sets(body: &str) -> Result<Vec<BracketSet>> {
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Score {
        value: Option<i64>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Stats {
        score: Option<Score>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Standing {
        stats: Option<Stats>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Entrant {
        name: Option<String>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Slot {
        entrant: Option<Entrant>,
        standing: Option<Standing>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Set {
        full_round_text: Option<String>,
        slots: Option<Vec<Slot>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Sets {
        nodes: Option<Vec<Set>>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct PhaseGroup {
        sets: Option<Sets>,
    }
    #[derive(Debug, Default, Deserialize)]
    #[serde(default, rename_all = "camelCase")]
    struct Data {
        phase_group: Option<PhaseGroup>,
    }

    fn slot_of(slots: &[Slot], index: usize) -> SetSlot {
        let Some(slot) = slots.get(index) else {
            return SetSlot::default();
        };
        let score = slot
            .standing
            .as_ref()
            .and_then(|s| s.stats.as_ref())
            .and_then(|s| s.score.as_ref())
            .and_then(|s| s.value)
            .unwrap_or(0);
        SetSlot {
            name: slot
                .entrant
                .as_ref()
                .and_then(|e| e.name.clone())
                .unwrap_or_default(),
            score: score.to_string(),
        }
    }

    let data: Data = parse_data(body, BadBody::Explain)?;
    let nodes = data
        .phase_group
        .and_then(|g| g.sets)
        .and_then(|s| s.nodes)
        .unwrap_or_default();

    Ok(nodes
        .into_iter()
        .map(|set| {
            let slots = set.slots.unwrap_or_default();
            BracketSet {
                round: set.full_round_text.unwrap_or_default(),
                p1: slot_of(&slots, 0),
                p2: slot_of(&slots, 1),
            }
        })
        .collect())
}
