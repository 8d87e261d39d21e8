//! The command table the GUI calls into.
//!
//! Every handler replies exactly once except `clearstartgg`, which the GUI
//! fires without waiting. The three fetch commands announce an async start
//! before contacting start.gg so the GUI can show progress.

use scorepipe_peer::{CommandTable, Reply, Request, Turn};

use crate::bracket;
use crate::countries::country_codes;
use crate::players;
use crate::scoreboard::APPLY_FIELDS;
use crate::startgg::Credentials;
use crate::state::ControllerState;

pub const FETCH_PLAYERS_MARKER: &str = "fetchplayers__resp";
pub const STREAM_QUEUE_MARKER: &str = "getstreamqueue__resp";
pub const BRACKET_MARKER: &str = "getbracket__resp";

/// All methods the GUI may call, with their argument counts.
pub fn command_table() -> CommandTable<ControllerState> {
    CommandTable::new()
        .register("forcefocus", 1, force_focus)
        .register("getstartgg", 0, get_startgg)
        .register("getwebport", 0, get_web_port)
        .register("getcountrycodes", 0, get_country_codes)
        .register("getscoreboard", 0, get_scoreboard)
        .register("applyscoreboard", APPLY_FIELDS, apply_scoreboard)
        .register("searchplayers", 1, search_players)
        .register("getplayercountry", 1, get_player_country)
        .register("fetchplayers", 2, fetch_players)
        .register("fetchlateststreamqueue", 2, fetch_latest_stream_queue)
        .register("fetchbracket", 2, fetch_bracket)
        .register("clearstartgg", 0, clear_startgg)
}

fn force_focus(state: &mut ControllerState, req: &Request, _: &mut Turn<'_>) -> Reply {
    let app = req.arg(0).unwrap_or_default();
    if let Err(err) = state.focus.focus(app) {
        tracing::warn!(app = %app, error = %err, "forcefocus failed");
    }
    Reply::values(["ok"])
}

fn get_startgg(state: &mut ControllerState, _: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::values([
        state.credentials.token.clone(),
        state.credentials.slug.clone(),
    ])
}

fn get_web_port(state: &mut ControllerState, _: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::values([state.web_port.to_string()])
}

fn get_country_codes(_: &mut ControllerState, _: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::values(country_codes())
}

fn get_scoreboard(state: &mut ControllerState, _: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::Values(state.scoreboard.to_values())
}

fn apply_scoreboard(state: &mut ControllerState, req: &Request, _: &mut Turn<'_>) -> Reply {
    let fields = req.args.get(..APPLY_FIELDS).unwrap_or_default();
    state.scoreboard.apply(fields);
    match state.scoreboard.save(&state.paths.scoreboard_file()) {
        Ok(()) => Reply::empty(),
        Err(err) => Reply::error(format!("Error: {err}")),
    }
}

fn search_players(state: &mut ControllerState, req: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::values(players::search(&state.players, req.arg(0).unwrap_or_default()))
}

fn get_player_country(state: &mut ControllerState, req: &Request, _: &mut Turn<'_>) -> Reply {
    Reply::values([players::country_of(
        &state.players,
        req.arg(0).unwrap_or_default(),
    )])
}

/// Token and tournament slug, the leading pair of every fetch call.
fn take_credentials(state: &mut ControllerState, req: &Request) {
    state.credentials.token = req.arg(0).unwrap_or_default().to_string();
    state.credentials.slug = req.arg(1).unwrap_or_default().to_string();
}

fn fetch_players(state: &mut ControllerState, req: &Request, turn: &mut Turn<'_>) -> Reply {
    take_credentials(state, req);

    turn.begin_async(FETCH_PLAYERS_MARKER);
    let fetched = match state.api.fetch_players(&state.credentials) {
        Ok(fetched) => fetched,
        Err(err) => return Reply::error(format!("Error: {err}")),
    };

    state.players = fetched;
    if let Err(err) = state.credentials.save(&state.paths.startgg_file) {
        tracing::warn!(error = %err, "could not save start.gg credentials");
    }
    if let Err(err) = players::save(&state.paths.players_file, &state.players) {
        tracing::warn!(error = %err, "could not save players");
    }

    Reply::ok(format!(
        "Successfully fetched {} players.",
        state.players.len()
    ))
}

fn fetch_latest_stream_queue(
    state: &mut ControllerState,
    req: &Request,
    turn: &mut Turn<'_>,
) -> Reply {
    take_credentials(state, req);

    turn.begin_async(STREAM_QUEUE_MARKER);
    match state.api.fetch_stream_queue(&state.credentials) {
        Ok((p1, p2)) => Reply::values([
            "ok".to_string(),
            "Successfully fetched stream match.".to_string(),
            p1.name,
            p1.country,
            "0".to_string(),
            p1.team,
            p2.name,
            p2.country,
            "0".to_string(),
            p2.team,
        ]),
        Err(err) => Reply::error(format!("Error: {err}")),
    }
}

fn fetch_bracket(state: &mut ControllerState, req: &Request, turn: &mut Turn<'_>) -> Reply {
    state.credentials.token = req.arg(0).unwrap_or_default().to_string();
    state.credentials.phase_group_id = req.arg(1).unwrap_or_default().to_string();

    turn.begin_async(BRACKET_MARKER);
    let saved = state
        .api
        .fetch_bracket(&state.credentials)
        .and_then(|sets| bracket::save(&state.paths.bracket_file(), &sets));
    match saved {
        Ok(()) => Reply::ok("Successfully fetched bracket."),
        Err(err) => Reply::error(format!("Error: {err}")),
    }
}

fn clear_startgg(state: &mut ControllerState, _: &Request, _: &mut Turn<'_>) -> Reply {
    state.credentials = Credentials::default();
    if let Err(err) = state.credentials.save(&state.paths.startgg_file) {
        tracing::warn!(error = %err, "could not save cleared credentials");
    }
    Reply::Silent
}
