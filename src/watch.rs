//! File watcher: runs `check` on startup, then re-runs when any input
//! file changes.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use notify::{RecursiveMode, Watcher as _};

use crate::commands::{self, Inputs};
use crate::diagnostics;
use crate::error::Error;

/// Debounce delay between filesystem events and re-check.
const DEBOUNCE_MS: u64 = 100;

/// Parent directories of the input files. Watching directories rather than
/// the files themselves survives editors that replace-on-save.
fn collect_watch_dirs(inputs: &Inputs) -> HashSet<PathBuf> {
    let mut dirs = HashSet::new();
    for path in [inputs.config, inputs.local, inputs.snapshot] {
        let parent = path.parent().unwrap_or_else(|| return Path::new("."));
        if parent.as_os_str().is_empty() {
            dirs.insert(PathBuf::from("."));
        } else {
            dirs.insert(parent.to_path_buf());
        }
    }
    return dirs;
}

/// Create a filesystem watcher that sends events on the given channel.
///
/// # Errors
///
/// Returns an error if the watcher cannot be created.
fn create_watcher(
    tx: crossbeam_channel::Sender<()>,
) -> Result<notify::RecommendedWatcher, Error> {
    return notify::recommended_watcher(move |res: Result<notify::Event, notify::Error>| {
        if let Ok(event) = res
            && matches!(
                event.kind,
                notify::EventKind::Create(_)
                    | notify::EventKind::Modify(_)
                    | notify::EventKind::Remove(_)
            )
        {
            let _ = tx.send(());
        }
    })
    .map_err(|e| {
        return Error::Io(std::io::Error::other(format!("watcher setup failed: {e}")));
    });
}

/// Entry point for the watch command.
///
/// Runs an initial check, then re-checks whenever an input file changes.
///
/// # Errors
///
/// Returns errors from watcher setup.
pub fn run(inputs: &Inputs) -> Result<ExitCode, Error> {
    eprintln!("watch: initial check");
    let mut last_code = run_check(inputs);

    let watch_dirs = collect_watch_dirs(inputs);
    let (tx, rx) = crossbeam_channel::unbounded();
    let mut watcher = create_watcher(tx)?;

    for dir in &watch_dirs {
        if dir.exists() {
            let _ = watcher.watch(dir, RecursiveMode::NonRecursive);
        }
    }

    let dir_count = watch_dirs.len();
    eprintln!("watch: monitoring {dir_count} directories, press Ctrl+C to stop");

    while rx.recv().is_ok() {
        let debounce = Duration::from_millis(DEBOUNCE_MS);
        while rx.recv_timeout(debounce).is_ok() {}
        eprintln!("watch: change detected, re-checking...");
        last_code = run_check(inputs);
    }

    return Ok(last_code);
}

/// Run check once and print its result. Fatal errors are reported but do
/// not stop the watch loop.
fn run_check(inputs: &Inputs) -> ExitCode {
    return match commands::check(inputs) {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::from(2)
        },
    };
}
