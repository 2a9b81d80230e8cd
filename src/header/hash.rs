//! Content Hash — Cache Key Embedded in the Header
//!
//! Covers compiler version, target, normalized source text, and the
//! flag set that affects emission (minify, no_tco, no_wrap_types,
//! strict), per spec 4.6. Must be stable across processes and runs
//! (spec 8, invariant 5) -- `sha2` gives a deterministic digest with no
//! per-process randomization, unlike `std::collections::hash_map`'s
//! `RandomState`-seeded hasher.

use crate::config::CompileOptions;
use sha2::{Digest, Sha256};

pub fn content_hash(source_text: &str, options: &CompileOptions) -> String {
    let mut hasher = Sha256::new();
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update(b"\0");
    hasher.update(options.target.0.as_bytes());
    hasher.update(b"\0");
    hasher.update([options.strict as u8, options.minify as u8, options.no_tco as u8, options.no_wrap_types as u8]);
    hasher.update(b"\0");
    hasher.update(source_text.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect::<String>()[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_deterministic() {
        let options = CompileOptions::default();
        let a = content_hash("x = 1", &options);
        let b = content_hash("x = 1", &options);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_changes_with_source() {
        let options = CompileOptions::default();
        assert_ne!(content_hash("x = 1", &options), content_hash("x = 2", &options));
    }

    #[test]
    fn hash_changes_with_strict_flag() {
        let mut options = CompileOptions::default();
        let base = content_hash("x = 1", &options);
        options.strict = true;
        assert_ne!(base, content_hash("x = 1", &options));
    }

    #[test]
    fn hash_changes_with_target() {
        let mut options = CompileOptions::default();
        let base = content_hash("x = 1", &options);
        options.target = crate::config::Target("3".to_string());
        assert_ne!(base, content_hash("x = 1", &options));
    }
}
