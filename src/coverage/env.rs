// -----------------------------------------
// Compiler flags for source-based coverage
// Based on: https://github.com/mozilla/grcov#grcov-with-travis
// -----------------------------------------
use std::collections::BTreeMap;

/// Environment overrides required for `-Zprofile` gcov-style instrumentation.
///
/// Incremental compilation and inlining both break counter attribution, so
/// they are forced off; dead code is kept so uncovered functions still show
/// up in the report.
pub const INSTRUMENTATION_OVERRIDES: [(&str, &str); 2] = [
    ("CARGO_INCREMENTAL", "0"),
    (
        "RUSTFLAGS",
        "-Zprofile -Ccodegen-units=1 -Cinline-threshold=0 -Clink-dead-code -Zno-landing-pads",
    ),
];

/// Environment data for a pending launch: an explicit variable map plus a
/// flag deciding whether the parent process environment is inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchEnv {
    vars: BTreeMap<String, String>,
    inherit_parent: bool,
}

impl LaunchEnv {
    pub fn new(inherit_parent: bool) -> Self {
        Self {
            vars: BTreeMap::new(),
            inherit_parent,
        }
    }

    /// Sets a variable, replacing any previous value for the same key
    pub fn set<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) -> &mut Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Variables in deterministic (sorted) order
    pub fn vars(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub const fn inherit_parent(&self) -> bool {
        self.inherit_parent
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns a copy of this environment with the instrumentation overrides
    /// applied on top. Caller-supplied values for the override keys are
    /// replaced, not merged; the inherit flag passes through unchanged.
    ///
    /// This is a pure transform: same input always yields the same map, and
    /// applying it twice is the same as applying it once.
    #[must_use]
    pub fn patched(&self) -> Self {
        let mut patched = self.clone();
        for (key, value) in INSTRUMENTATION_OVERRIDES {
            patched.vars.insert(key.to_string(), value.to_string());
        }
        patched
    }
}
