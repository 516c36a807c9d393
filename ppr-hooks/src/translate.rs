// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use sha2::{Digest, Sha256};

/// Longest name the synchronizer emits before truncating and hashing
pub const MAX_NAME_LENGTH: usize = 63;
const TRUNCATED_PREFIX_LENGTH: usize = 52;
const DIGEST_LENGTH: usize = 10;

/// Maps a guest object name to the name the synchronizer gives its host copy.
pub trait NameTranslator: Send + Sync {
    fn translate(&self, name: &str, namespace: &str) -> String;
}

/// Translator matching the synchronizer naming scheme
/// `<name>-x-<namespace>-x-<suffix>`, shortened with a digest when the result
/// would not fit in a DNS label.
#[derive(Clone, Debug)]
pub struct SuffixTranslator {
    suffix: String,
}

impl SuffixTranslator {
    pub fn new(suffix: impl Into<String>) -> Self {
        Self { suffix: suffix.into() }
    }
}

impl NameTranslator for SuffixTranslator {
    fn translate(&self, name: &str, namespace: &str) -> String {
        if name.is_empty() {
            return String::new();
        }

        safe_concat_name(&[name, "x", namespace, "x", &self.suffix])
    }
}

/// Join with `-`, replacing the tail of over-long names with a short digest
pub fn safe_concat_name(parts: &[&str]) -> String {
    let full = parts.join("-");
    if full.len() <= MAX_NAME_LENGTH {
        return full;
    }

    let digest = hex::encode(Sha256::digest(full.as_bytes()));
    let prefix: String = full.chars().take(TRUNCATED_PREFIX_LENGTH).collect();

    format!("{}-{}", prefix, &digest[..DIGEST_LENGTH])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_short_names() {
        let translator = SuffixTranslator::new("suffix");

        assert_eq!(translator.translate("app-config", "ns"), "app-config-x-ns-x-suffix");
        assert_eq!(translator.translate("someconfigmap", "test"), "someconfigmap-x-test-x-suffix");
    }

    #[test]
    fn empty_name_stays_empty() {
        let translator = SuffixTranslator::new("suffix");

        assert_eq!(translator.translate("", "test"), "");
    }

    #[test]
    fn long_names_are_truncated_with_digest() {
        let translator = SuffixTranslator::new("vcluster");
        let name = "a".repeat(40);
        let namespace = "b".repeat(20);

        let translated = translator.translate(&name, &namespace);
        let full = format!("{}-x-{}-x-vcluster", name, namespace);

        assert_eq!(translated.len(), MAX_NAME_LENGTH);
        assert_eq!(&translated[..52], &full[..52]);
        assert_eq!(&translated[52..53], "-");
        assert!(translated[53..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        // Deterministic across calls
        assert_eq!(translated, translator.translate(&name, &namespace));
        // Different input, different digest
        assert_ne!(translated, translator.translate(&name, &"c".repeat(20)));
    }

    #[test]
    fn names_at_the_limit_are_kept() {
        let name = "a".repeat(MAX_NAME_LENGTH);

        assert_eq!(safe_concat_name(&[&name]), name);
    }
}
