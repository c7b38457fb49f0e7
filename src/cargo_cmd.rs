use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::coverage::env::LaunchEnv;

/// Deferred environment transform, applied to the launch environment at
/// spawn time so several patches can compose before the process starts
pub type EnvPatch = Box<dyn Fn(&LaunchEnv) -> LaunchEnv + Send + Sync>;

/// A cargo command line as requested by the user, before normalization.
///
/// Token layout mirrors a shell invocation: an optional leading `cargo`
/// program name, optional `+toolchain` selector, optional leading flags,
/// then the command verb and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CargoProfile {
    command: Vec<String>,
}

impl CargoProfile {
    pub fn new<S: Into<String>>(command: impl IntoIterator<Item = S>) -> Self {
        Self {
            command: command.into_iter().map(Into::into).collect(),
        }
    }

    pub fn command(&self) -> &[String] {
        &self.command
    }

    /// The command verb after cleaning the raw invocation: the program name,
    /// a `+toolchain` selector and leading option flags are skipped
    pub fn verb(&self) -> Option<&str> {
        self.command
            .iter()
            .enumerate()
            .filter(|(idx, token)| {
                !(*idx == 0 && (token.as_str() == "cargo" || token.ends_with("/cargo")))
            })
            .map(|(_, token)| token.as_str())
            .find(|token| !token.starts_with('+') && !token.starts_with('-') && !token.is_empty())
    }

    /// Arguments following the verb (everything cargo itself should see)
    pub fn args_after_program(&self) -> Vec<String> {
        self.command
            .iter()
            .enumerate()
            .filter(|(idx, token)| {
                !(*idx == 0 && (token.as_str() == "cargo" || token.ends_with("/cargo")))
            })
            .map(|(_, token)| token.clone())
            .collect()
    }
}

/// Represents a build/test command configuration ready to spawn
pub struct CargoCmd {
    /// Program to execute (the cargo binary, overridable for tests)
    program: PathBuf,
    /// Command verb plus arguments
    args: Vec<String>,
    /// Directory the process is launched from
    working_dir: PathBuf,
    /// Explicit launch environment
    env: LaunchEnv,
    /// Patches applied to `env` at spawn time, in registration order
    env_patches: Vec<EnvPatch>,
}

impl fmt::Debug for CargoCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CargoCmd")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("env", &self.env)
            .field("env_patches", &self.env_patches.len())
            .finish()
    }
}

impl CargoCmd {
    pub fn new<P: Into<PathBuf>>(working_dir: P, args: Vec<String>) -> Self {
        Self {
            program: PathBuf::from("cargo"),
            args,
            working_dir: working_dir.into(),
            env: LaunchEnv::new(true),
            env_patches: Vec::new(),
        }
    }

    /// Overrides the program to execute
    pub fn with_program<P: Into<PathBuf>>(&mut self, program: P) -> &mut Self {
        self.program = program.into();
        self
    }

    /// Sets the explicit launch environment
    pub fn with_env(&mut self, env: LaunchEnv) -> &mut Self {
        self.env = env;
        self
    }

    /// Registers a deferred environment patch; not applied until spawn time
    pub fn with_env_patch(&mut self, patch: EnvPatch) -> &mut Self {
        self.env_patches.push(patch);
        self
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The environment the process will actually receive, with all
    /// registered patches applied in order
    pub fn effective_env(&self) -> LaunchEnv {
        self.env_patches
            .iter()
            .fold(self.env.clone(), |env, patch| patch(&env))
    }

    /// Assembles the command into a display string for dry runs
    pub fn assemble(&self) -> String {
        let mut parts = Vec::new();
        parts.extend(
            self.effective_env()
                .vars()
                .map(|(k, v)| format!("{k}=\"{v}\"")),
        );
        parts.push(self.program.display().to_string());
        parts.extend(self.args.iter().cloned());
        parts.join(" ")
    }

    /// Builds the spawnable process command, applying deferred patches
    pub fn command(&self) -> Command {
        let env = self.effective_env();
        let mut cmd = Command::new(&self.program);

        if !env.inherit_parent() {
            cmd.env_clear();
        }
        for (key, value) in env.vars() {
            cmd.env(key, value);
        }

        cmd.args(&self.args).current_dir(&self.working_dir);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(tokens: &[&str]) -> CargoProfile {
        CargoProfile::new(tokens.iter().copied())
    }

    #[test]
    fn test_verb_plain() {
        assert_eq!(profile(&["test", "--lib"]).verb(), Some("test"));
        assert_eq!(profile(&["run", "--release"]).verb(), Some("run"));
    }

    #[test]
    fn test_verb_skips_program_and_toolchain() {
        assert_eq!(profile(&["cargo", "test"]).verb(), Some("test"));
        assert_eq!(
            profile(&["cargo", "+nightly", "test", "--lib"]).verb(),
            Some("test")
        );
        assert_eq!(
            profile(&["/usr/bin/cargo", "+nightly", "run"]).verb(),
            Some("run")
        );
    }

    #[test]
    fn test_verb_skips_leading_flags() {
        assert_eq!(
            profile(&["cargo", "--quiet", "test"]).verb(),
            Some("test")
        );
        assert_eq!(profile(&[]).verb(), None);
        assert_eq!(profile(&["cargo"]).verb(), None);
    }

    #[test]
    fn test_deferred_patch_applies_at_spawn_time() {
        let mut cmd = CargoCmd::new("/proj", vec!["test".into()]);
        cmd.with_env_patch(Box::new(|env| env.patched()));

        // Registration did not touch the stored env
        assert!(cmd.env.get("CARGO_INCREMENTAL").is_none());
        // But the effective env carries the override
        assert_eq!(cmd.effective_env().get("CARGO_INCREMENTAL"), Some("0"));
    }

    #[test]
    fn test_patches_compose_in_order() {
        let mut cmd = CargoCmd::new("/proj", vec!["test".into()]);
        cmd.with_env_patch(Box::new(|env| {
            let mut e = env.clone();
            e.set("ORDER", "first");
            e
        }));
        cmd.with_env_patch(Box::new(|env| {
            let mut e = env.clone();
            e.set("ORDER", "second");
            e
        }));

        assert_eq!(cmd.effective_env().get("ORDER"), Some("second"));
    }

    #[test]
    fn test_assemble() {
        let mut env = LaunchEnv::new(true);
        env.set("CARGO_INCREMENTAL", "0");

        let mut cmd = CargoCmd::new("/proj", vec!["test".into(), "--lib".into()]);
        cmd.with_env(env);

        assert_eq!(
            cmd.assemble(),
            "CARGO_INCREMENTAL=\"0\" cargo test --lib"
        );
    }
}
