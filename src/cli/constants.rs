/// Default coverage report location, relative to the working directory
pub const COVERAGE_OUTPUT: &str = "target/coverage/lcov.info";

/// Cargo command wrapped when none is given on the command line
pub const DEFAULT_CARGO_COMMAND: &str = "test";
