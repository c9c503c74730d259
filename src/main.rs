mod config;
mod db;
mod ipc;
mod session;
mod smartmenu;

use std::io::{self, BufRead, Write};

use anyhow::Context;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("info"));
    // stdout carries the protocol; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let settings = config::load_settings()?;
    init_tracing(&settings.log);

    let urls = smartmenu::urls::PageUrls::new(&settings.wwwroot)
        .with_context(|| format!("invalid wwwroot '{}'", settings.wwwroot))?;
    let mut state = ipc::AppState {
        workspace: None,
        db: None,
        urls,
    };

    if let Some(path) = settings.workspace.as_ref() {
        match db::open_db(path) {
            Ok(conn) => {
                state.workspace = Some(path.clone());
                state.db = Some(conn);
            }
            Err(e) => {
                // Stay up; the host can still select a workspace.
                error!(workspace = %path.display(), error = ?e, "failed to open configured workspace");
            }
        }
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        wwwroot = %settings.wwwroot,
        "smartmenud ready"
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(_) => break,
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // Can't reply without id.
                warn!(error = %e, "unparseable request line");
                let _ = writeln!(
                    stdout,
                    "{}",
                    serde_json::json!({
                        "ok": false,
                        "error": { "code": "bad_json", "message": e.to_string() }
                    })
                );
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }

    info!("stdin closed, shutting down");
    Ok(())
}
