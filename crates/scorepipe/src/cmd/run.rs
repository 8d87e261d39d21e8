use std::net::Ipv4Addr;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use scorepipe::commands::command_table;
use scorepipe::focus::SystemFocus;
use scorepipe::startgg::StartggClient;
use scorepipe::state::{ControllerPaths, ControllerState};
use scorepipe::web::OverlayServer;
use scorepipe_peer::{attach, BootstrapConfig, Dispatcher, GuiSession, PeerConfig, SessionEnd};
use scorepipe_transport::{GuiProcess, SpawnConfig};

use crate::cmd::RunArgs;
use crate::exit::{
    io_error, peer_error, transport_error, CliError, CliResult, DATA_INVALID, INTERNAL, SUCCESS,
};
use crate::output::{print_session, OutputFormat};

const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    if !args.no_web {
        start_overlay(&args)?;
    }

    let api = StartggClient::new()
        .map_err(|err| CliError::new(INTERNAL, format!("http client setup failed: {err}")))?;

    let mut spawn = SpawnConfig::new(&args.interpreter);
    for arg in &args.interpreter_args {
        spawn = spawn.arg(arg.as_str());
    }
    let mut process =
        GuiProcess::spawn(&spawn).map_err(|err| transport_error("spawn failed", err))?;

    let peer = PeerConfig {
        marker_mode: args.marker_mode.into(),
        ..PeerConfig::default()
    };
    let GuiSession {
        requests,
        mut responder,
        stderr,
    } = match attach(&mut process, &peer) {
        Ok(session) => session,
        Err(err) => return Err(abort(&mut process, peer_error("attach failed", err))),
    };

    let bootstrap = BootstrapConfig::new(&args.script);
    if let Err(err) = bootstrap.load_script(&mut responder) {
        return Err(abort(&mut process, peer_error("bootstrap failed", err)));
    }

    let paths = ControllerPaths {
        web_dir: args.web_dir.clone(),
        players_file: args.players_file.clone(),
        startgg_file: args.startgg_file.clone(),
    };
    let state = ControllerState::load(paths, args.web_port, Box::new(api), Box::new(SystemFocus));

    if let Err(err) = bootstrap.initialize(&mut responder) {
        return Err(abort(&mut process, peer_error("bootstrap failed", err)));
    }

    let process = Arc::new(Mutex::new(process));
    install_ctrlc_handler(process.clone())?;

    tracing::info!(
        interpreter = %args.interpreter.display(),
        script = %args.script.display(),
        "GUI session started"
    );

    let mut dispatcher = Dispatcher::new(command_table(), state, requests, responder);
    let report = dispatcher.run();
    // Closes the GUI's stdin so it sees end-of-file if it is still running.
    drop(dispatcher);

    let report = match report {
        Ok(report) => report,
        Err(err) => {
            if err.is_disconnect() {
                tracing::info!(error = %err, "GUI went away mid-session");
            }
            let err = peer_error("dispatch failed", err);
            return Err(match process.lock() {
                Ok(mut guard) => abort(&mut guard, err),
                Err(_) => err,
            });
        }
    };
    if let SessionEnd::Desync(reason) = &report.end {
        tracing::warn!(%reason, "GUI stream desynchronized; stopping GUI");
        if let Ok(mut guard) = process.lock() {
            let _ = guard.kill();
        }
    }

    match wait_for_exit(&process) {
        Ok(status) => tracing::info!(%status, turns = report.turns, "GUI exited"),
        Err(err) => tracing::warn!(error = %err, "could not wait for GUI"),
    }

    if let Some(handle) = stderr {
        if let Ok(lines) = handle.join() {
            tracing::debug!(lines, "GUI stderr closed");
        }
    }

    print_session(&report, format);

    match report.end {
        SessionEnd::Closed => Ok(SUCCESS),
        SessionEnd::Desync(_) => Ok(DATA_INVALID),
    }
}

fn start_overlay(args: &RunArgs) -> CliResult<()> {
    let server = OverlayServer::bind((Ipv4Addr::LOCALHOST, args.web_port), &args.web_dir)
        .map_err(|err| io_error("overlay bind failed", err))?;
    let addr = server
        .local_addr()
        .map_err(|err| io_error("overlay bind failed", err))?;
    server
        .spawn()
        .map_err(|err| io_error("overlay thread failed", err))?;
    tracing::info!(%addr, dir = %args.web_dir.display(), "serving overlay");
    Ok(())
}

/// Poll for exit without holding the lock, so Ctrl-C can still kill the GUI.
fn wait_for_exit(process: &Mutex<GuiProcess>) -> CliResult<ExitStatus> {
    loop {
        let exited = process
            .lock()
            .map_err(|_| CliError::new(INTERNAL, "GUI process lock poisoned"))?
            .try_wait()
            .map_err(|err| transport_error("wait failed", err))?;
        if let Some(status) = exited {
            return Ok(status);
        }
        thread::sleep(EXIT_POLL_INTERVAL);
    }
}

fn abort(process: &mut GuiProcess, err: CliError) -> CliError {
    if let Err(kill_err) = process.kill() {
        tracing::warn!(error = %kill_err, "could not stop GUI");
    }
    let _ = process.wait();
    err
}

fn install_ctrlc_handler(process: Arc<Mutex<GuiProcess>>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        tracing::info!("interrupted; stopping GUI");
        if let Ok(mut process) = process.lock() {
            let _ = process.kill();
        }
    })
    .map_err(|err| CliError::new(INTERNAL, format!("failed to install Ctrl-C handler: {err}")))
}
