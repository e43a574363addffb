//! Command: print version information.

/// Version string: `DEVSTRAP_VERSION` from the build, else the crate version.
#[must_use]
pub fn version() -> &'static str {
    option_env!("DEVSTRAP_VERSION").unwrap_or(env!("CARGO_PKG_VERSION"))
}

/// Print the devstrap version to stdout.
pub fn run() {
    println!("devstrap {}", version());
}
