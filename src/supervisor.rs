use std::process::ExitStatus;
use std::sync::mpsc::{self, Receiver};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};
use tracing::debug;

use crate::cargo_cmd::{CargoCmd, CargoProfile};
use crate::coverage::cleaner::ArtifactCleaner;
use crate::coverage::collector::{CollectorHandle, CoverageCollector, RunContext};

/// Cargo verbs a coverage run can wrap. A bare `build` produces no runtime
/// counters, so it is rejected up front.
pub const SUPPORTED_VERBS: &[&str] = &["run", "test"];

/// What the caller asked the orchestrator to do with the profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestedAction {
    /// Run the command under coverage instrumentation
    CollectCoverage,
    /// Plain execution, no instrumentation
    Execute,
}

/// Result of a completed supervised run: the primary exit status plus the
/// collector handle, handed to the caller directly
#[derive(Debug)]
pub struct RunOutcome {
    pub status: ExitStatus,
    pub collector: Option<CollectorHandle>,
}

/// Owns the watcher for a launched run. `execute` returns immediately;
/// whoever holds the handle decides when to block on the outcome.
#[derive(Debug)]
pub struct RunHandle {
    watcher: JoinHandle<()>,
    outcome: Receiver<Result<RunOutcome>>,
}

impl RunHandle {
    /// Blocks until the primary process has exited and the termination
    /// observer has run
    ///
    /// # Errors
    /// * If the watcher thread disappeared without reporting an outcome
    /// * If waiting on the primary process failed
    pub fn wait(self) -> Result<RunOutcome> {
        let outcome = self
            .outcome
            .recv()
            .context("Run watcher terminated without reporting an outcome")?;
        let _ = self.watcher.join();
        outcome
    }
}

/// Launches an instrumented build/test process and wires its termination to
/// the coverage collector
pub struct Supervisor;

impl Supervisor {
    /// Returns true only for a coverage-collection request whose cleaned
    /// command verb is in the allow-list
    pub fn can_handle(action: RequestedAction, profile: &CargoProfile) -> bool {
        action == RequestedAction::CollectCoverage
            && profile
                .verb()
                .is_some_and(|verb| SUPPORTED_VERBS.contains(&verb))
    }

    /// Cleans stale artifacts, registers the instrumentation patch, spawns
    /// the process and attaches the termination observer.
    ///
    /// Returns `Ok(None)` without spawning anything when a precondition is
    /// not met: grcov unresolved or not installed, or a command shape
    /// outside the allow-list. Does not block on the spawned process.
    ///
    /// # Errors
    /// * If artifact cleanup fails
    /// * If the process could not be spawned
    pub fn execute(
        mut cmd: CargoCmd,
        profile: &CargoProfile,
        ctx: RunContext,
    ) -> Result<Option<RunHandle>> {
        if !Self::can_handle(RequestedAction::CollectCoverage, profile) {
            debug!("Command shape not eligible for coverage collection");
            return Ok(None);
        }

        let installed = ctx
            .run_config
            .as_ref()
            .and_then(|config| config.grcov.as_ref())
            .is_some_and(|grcov| grcov.is_installed());
        if !installed {
            println!("[-] grcov is not installed. Install it with: cargo install grcov");
            return Ok(None);
        }

        // Barrier: stale counters must be gone before the new run can
        // produce fresh ones
        let deleted = ArtifactCleaner::new(cmd.working_dir()).clean()?;
        if deleted > 0 {
            println!("[*] Removed {deleted} stale coverage artifact(s)");
        }

        // Deferred so later patches can still compose before spawn
        cmd.with_env_patch(Box::new(|env| env.patched()));

        let mut child = cmd
            .command()
            .spawn()
            .with_context(|| format!("Failed to spawn: {}", cmd.assemble()))?;

        let (tx, rx) = mpsc::channel();
        let watcher = thread::spawn(move || {
            let status = child
                .wait()
                .context("Failed to wait for the supervised process");

            // Fires exactly once per run, for any exit status: a crashed or
            // killed run may still have emitted partial counter data
            let collector = CoverageCollector::collect(&ctx);

            let _ = tx.send(status.map(|status| RunOutcome { status, collector }));
        });

        Ok(Some(RunHandle {
            watcher,
            outcome: rx,
        }))
    }
}
