//! The registry's `validation` section

use serde::{Deserialize, Serialize};
use serde_yaml::Mapping;

/// Project-wide validation flags.
///
/// Recorded for reporting; lifecycle flows do not act on them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationPolicy {
    #[serde(default)]
    pub require_pinned_commits: bool,
    #[serde(default)]
    pub allow_dirty_submodules: bool,
    #[serde(flatten)]
    pub extra: Mapping,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_empty() {
        let policy: ValidationPolicy = serde_yaml::from_str("{}").unwrap();
        assert_eq!(policy, ValidationPolicy::default());
    }

    #[test]
    fn reads_flags_and_keeps_unknown() {
        let policy: ValidationPolicy =
            serde_yaml::from_str("require_pinned_commits: true\nmax_tools: 10\n").unwrap();
        assert!(policy.require_pinned_commits);
        assert!(!policy.allow_dirty_submodules);
        assert!(policy.extra.contains_key("max_tools"));
    }
}
