//! Static file server for the streaming overlay.
//!
//! Serves the web directory on a loopback port so a browser source can poll
//! `state.json` and `bracket.json`. Only `GET` and `HEAD` are answered and
//! nothing is cached, so every poll sees the latest file on disk.

use std::fs;
use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::path::{Component, Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

const READ_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_HEADER_LINES: usize = 100;
const INDEX_FILE: &str = "index.html";

pub struct OverlayServer {
    listener: TcpListener,
    root: PathBuf,
}

impl OverlayServer {
    /// Bind to `addr` and serve files under `root`.
    pub fn bind(addr: impl ToSocketAddrs, root: impl Into<PathBuf>) -> io::Result<Self> {
        Ok(Self {
            listener: TcpListener::bind(addr)?,
            root: root.into(),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve on a background thread for the life of the process.
    pub fn spawn(self) -> io::Result<JoinHandle<()>> {
        thread::Builder::new()
            .name("overlay-http".to_string())
            .spawn(move || self.serve())
    }

    /// Accept connections forever, one thread per client.
    pub fn serve(self) {
        let root = self.root;
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let root = root.clone();
                    let spawned = thread::Builder::new()
                        .name("overlay-client".to_string())
                        .spawn(move || {
                            if let Err(err) = handle_client(stream, &root) {
                                tracing::debug!(error = %err, "overlay client failed");
                            }
                        });
                    if let Err(err) = spawned {
                        tracing::warn!(error = %err, "could not spawn overlay client thread");
                    }
                }
                Err(err) => tracing::warn!(error = %err, "overlay accept failed"),
            }
        }
    }
}

fn handle_client(stream: TcpStream, root: &Path) -> io::Result<()> {
    stream.set_read_timeout(Some(READ_TIMEOUT))?;
    let mut reader = BufReader::new(stream.try_clone()?);
    let mut writer = stream;

    let mut request_line = String::new();
    if reader.read_line(&mut request_line)? == 0 {
        return Ok(());
    }
    for _ in 0..MAX_HEADER_LINES {
        let mut header = String::new();
        if reader.read_line(&mut header)? == 0 || header.trim().is_empty() {
            break;
        }
    }

    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default();
    let target = parts.next().unwrap_or_default();

    let head_only = match method {
        "GET" => false,
        "HEAD" => true,
        _ => {
            return write_response(
                &mut writer,
                "405 Method Not Allowed",
                "text/plain; charset=utf-8",
                b"method not allowed\n",
                false,
            )
        }
    };

    let file = resolve(root, target).and_then(|path| fs::read(&path).ok().map(|body| (path, body)));
    match file {
        Some((path, body)) => {
            tracing::trace!(path = %path.display(), bytes = body.len(), "overlay file served");
            write_response(&mut writer, "200 OK", content_type(&path), &body, head_only)
        }
        None => write_response(
            &mut writer,
            "404 Not Found",
            "text/plain; charset=utf-8",
            b"not found\n",
            head_only,
        ),
    }
}

fn write_response(
    out: &mut impl Write,
    status: &str,
    content_type: &str,
    body: &[u8],
    head_only: bool,
) -> io::Result<()> {
    write!(
        out,
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n",
        body.len()
    )?;
    if !head_only {
        out.write_all(body)?;
    }
    out.flush()
}

/// Map a request target onto a file under `root`.
///
/// Returns `None` for anything that would leave `root`, for undecodable
/// paths, and for paths that do not name an existing file. A directory
/// resolves to its `index.html`.
pub fn resolve(root: &Path, target: &str) -> Option<PathBuf> {
    let path = target.split(['?', '#']).next().unwrap_or_default();
    if !path.starts_with('/') {
        return None;
    }
    let decoded = percent_decode(path)?;

    let mut resolved = root.to_path_buf();
    for component in Path::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => resolved.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if resolved.is_dir() {
        resolved.push(INDEX_FILE);
    }
    resolved.is_file().then_some(resolved)
}

fn percent_decode(text: &str) -> Option<String> {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = text.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    let decoded = String::from_utf8(out).ok()?;
    if decoded.contains(['\0', '\\']) {
        return None;
    }
    Some(decoded)
}

/// Content type by file extension.
pub fn content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "css" => "text/css; charset=utf-8",
        "js" | "mjs" => "text/javascript; charset=utf-8",
        "json" => "application/json",
        "txt" => "text/plain; charset=utf-8",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "otf" => "font/otf",
        _ => "application/octet-stream",
    }
}
