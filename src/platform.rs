use std::fmt;

/// Detected operating system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Os {
    Linux,
    Mac,
    Windows,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.section_key())
    }
}

impl Os {
    /// Top-level template key for sections specific to this OS.
    #[must_use]
    pub const fn section_key(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::Mac => "mac",
            Self::Windows => "windows",
        }
    }
}

/// Platform family used for section filtering and processor dispatch.
///
/// Linux and Mac share the `Nix` family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    Nix,
    Windows,
}

impl Family {
    /// Top-level template keys owned by this family.
    #[must_use]
    pub const fn section_keys(self) -> &'static [&'static str] {
        match self {
            Self::Nix => &["nix", "linux", "mac"],
            Self::Windows => &["windows"],
        }
    }
}

/// Platform information for the current system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: Os,
}

impl Platform {
    /// Detect the current platform.
    #[must_use]
    pub const fn detect() -> Self {
        Self {
            os: Self::detect_os(),
        }
    }

    /// Create a platform with an explicit OS (for testing and dry runs).
    #[must_use]
    pub const fn new(os: Os) -> Self {
        Self { os }
    }

    #[must_use]
    pub const fn family(&self) -> Family {
        match self.os {
            Os::Linux | Os::Mac => Family::Nix,
            Os::Windows => Family::Windows,
        }
    }

    /// Whether a top-level template section belongs to another platform
    /// family and must be dropped.
    ///
    /// Keys that name no platform are never excluded.
    #[must_use]
    pub fn excludes_section(&self, key: &str) -> bool {
        let other = match self.family() {
            Family::Nix => Family::Windows,
            Family::Windows => Family::Nix,
        };
        other.section_keys().contains(&key)
    }

    /// Section keys whose aliases apply on this host, least specific first.
    #[must_use]
    pub fn alias_section_keys(&self) -> Vec<&'static str> {
        match self.family() {
            Family::Nix => vec!["nix", self.os.section_key()],
            Family::Windows => vec![self.os.section_key()],
        }
    }

    const fn detect_os() -> Os {
        if cfg!(target_os = "windows") {
            Os::Windows
        } else if cfg!(target_os = "macos") {
            Os::Mac
        } else {
            // Default to Linux for other Unix-like systems
            Os::Linux
        }
    }
}
