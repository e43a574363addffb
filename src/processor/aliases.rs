//! Alias collection from rendered shell documents.
//!
//! ```yaml
//! aliases:
//!   ll: ls -la
//! nix:
//!   aliases:
//!     grep: grep --color=auto
//! windows:
//!   aliases:
//!     ll: dir
//! ```
use serde_yaml::{Mapping, Value};

use super::{ShellAliases, scalar_text};
use crate::platform::Platform;

/// Key holding an alias mapping, at top level or inside a platform section.
pub const ALIASES_KEY: &str = "aliases";

/// Merge the general aliases with the host's platform-specific ones.
///
/// Sections are applied from least to most specific, so a platform alias
/// replaces a general alias of the same name. Missing or malformed sections
/// contribute nothing.
#[must_use]
pub fn merged_aliases(doc: &Mapping, platform: &Platform) -> ShellAliases {
    let mut aliases = ShellAliases::new();
    extend_from(&mut aliases, doc.get(ALIASES_KEY));
    for key in platform.alias_section_keys() {
        let section = doc
            .get(key)
            .and_then(Value::as_mapping)
            .and_then(|section| section.get(ALIASES_KEY));
        extend_from(&mut aliases, section);
    }
    aliases
}

fn extend_from(aliases: &mut ShellAliases, section: Option<&Value>) {
    let Some(Value::Mapping(entries)) = section else {
        return;
    };
    for (name, command) in entries {
        match (scalar_text(name), scalar_text(command)) {
            (Some(name), Some(command)) if is_valid_alias_name(&name) => {
                aliases.insert(name, command);
            }
            (Some(name), Some(_)) => tracing::warn!("skipping alias with invalid name '{name}'"),
            _ => tracing::debug!("ignoring malformed alias entry {name:?}"),
        }
    }
}

/// Alias names become file names and shell words: `[A-Za-z0-9_.-]+`, and
/// never a bare `.` or `..`.
#[must_use]
pub fn is_valid_alias_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::platform::Os;
    use crate::template::parse_document;

    const DOC: &str = "aliases:\n  ll: ls -la\n  gs: git status\nnix:\n  aliases:\n    ll: ls -lah\nmac:\n  aliases:\n    ll: ls -lahG\nwindows:\n  aliases:\n    ll: dir\n    cls: clear\n";

    fn merged(os: Os) -> ShellAliases {
        merged_aliases(&parse_document(DOC).unwrap(), &Platform::new(os))
    }

    #[test]
    fn nix_specific_wins_over_general() {
        let aliases = merged(Os::Linux);
        assert_eq!(aliases["ll"], "ls -lah");
        assert_eq!(aliases["gs"], "git status");
        assert!(!aliases.contains_key("cls"));
    }

    #[test]
    fn os_specific_wins_over_family() {
        assert_eq!(merged(Os::Mac)["ll"], "ls -lahG");
    }

    #[test]
    fn windows_specific_wins_over_general() {
        let aliases = merged(Os::Windows);
        assert_eq!(aliases["ll"], "dir");
        assert_eq!(aliases["cls"], "clear");
        assert_eq!(aliases["gs"], "git status");
    }

    #[test]
    fn invalid_names_are_skipped() {
        let doc = parse_document(
            "aliases:\n  ../x: rm -rf /\n  \"a;b\": ls\n  two words: ls\n  git-st.v2_x: git status\n",
        )
        .unwrap();
        let aliases = merged_aliases(&doc, &Platform::new(Os::Windows));
        assert_eq!(aliases.keys().collect::<Vec<_>>(), vec!["git-st.v2_x"]);
    }

    #[test]
    fn alias_name_validation() {
        assert!(is_valid_alias_name("ll"));
        assert!(is_valid_alias_name("git-st.v2_x"));
        assert!(!is_valid_alias_name(""));
        assert!(!is_valid_alias_name(".."));
        assert!(!is_valid_alias_name("a/b"));
        assert!(!is_valid_alias_name("a\\b"));
        assert!(!is_valid_alias_name("a b"));
        assert!(!is_valid_alias_name("a;b"));
    }

    #[test]
    fn missing_or_malformed_sections_are_empty() {
        let platform = Platform::new(Os::Linux);
        assert!(merged_aliases(&Mapping::new(), &platform).is_empty());
        let doc = parse_document("aliases: [ll]\nnix: 3\n").unwrap();
        assert!(merged_aliases(&doc, &platform).is_empty());
    }
}
