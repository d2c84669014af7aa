//! Service descriptor, provider, and metadata (§3 "Service descriptor").

use middleair_wire::Error;

/// Field length cap shared by every descriptor string (§7 `PayloadTooLarge`).
pub const MAX_FIELD_LEN: usize = 256;

/// Number of user-assigned tag slots (§3, separate from the four metadata
/// slots appended on the wire by [`crate::announcement`]).
pub const TAG_COUNT: usize = 12;

/// A reachable endpoint: `{host, port}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Provider {
    /// Hostname or IP literal, overridden by the observed source address on
    /// receive (§4.3 "Listener").
    pub host: String,
    /// TCP port the invoker listens on.
    pub port: u16,
}

/// Local process introspection copied into every registered descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Metadata {
    /// `std::env::consts::OS`.
    pub os: String,
    /// `std::env::consts::ARCH`.
    pub arch: String,
    /// `HOSTNAME`, via OS call.
    pub host: String,
    /// `LANG`, copied from the environment.
    pub lang: String,
}

impl Metadata {
    /// Populate from the current process environment (§6 "Environment").
    pub fn from_env() -> Self {
        Self {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
            host: hostname(),
            lang: std::env::var("LANG").unwrap_or_default(),
        }
    }
}

fn hostname() -> String {
    // No portable stdlib call; fall back to the environment the way a
    // shell would see it, which matches what a real deployment sets.
    std::env::var("HOSTNAME")
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Identity of a service instance (§3 "Service descriptor"). Equality is the
/// full tuple by value — two descriptors with equal fields collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// By convention, the type-identifier string of the service's request
    /// message.
    pub uuid: String,
    /// Where to reach the service.
    pub provider: Provider,
    /// Fixed-width ordered sequence of user tags, opaque to the core.
    pub tags: [String; TAG_COUNT],
    /// Process metadata, populated at registration time.
    pub metadata: Metadata,
}

impl Descriptor {
    /// Validate every string field against [`MAX_FIELD_LEN`] (§7
    /// `PayloadTooLarge`).
    pub fn validate(&self) -> Result<(), Error> {
        let over = |s: &str| s.len() > MAX_FIELD_LEN;
        if over(&self.uuid) || over(&self.provider.host) || self.tags.iter().any(|t| over(t))
            || over(&self.metadata.os) || over(&self.metadata.arch)
            || over(&self.metadata.host) || over(&self.metadata.lang)
        {
            return Err(Error::PayloadTooLarge);
        }
        Ok(())
    }

    /// All tags visible to tag-matching policy: the 12 user tags followed by
    /// {os, arch, host, lang} (§4.5 "tag filter").
    pub fn all_tags(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.tags.iter().map(String::as_str).collect();
        all.push(&self.metadata.os);
        all.push(&self.metadata.arch);
        all.push(&self.metadata.host);
        all.push(&self.metadata.lang);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(uuid: &str) -> Descriptor {
        Descriptor {
            uuid: uuid.to_string(),
            provider: Provider { host: "127.0.0.1".to_string(), port: 9000 },
            tags: Default::default(),
            metadata: Metadata::default(),
        }
    }

    #[test]
    fn equal_fields_collapse() {
        assert_eq!(descriptor("svc.x"), descriptor("svc.x"));
    }

    #[test]
    fn oversized_field_is_rejected() {
        let mut d = descriptor("svc.x");
        d.tags[0] = "a".repeat(MAX_FIELD_LEN + 1);
        assert!(matches!(d.validate(), Err(Error::PayloadTooLarge)));
    }

    #[test]
    fn all_tags_appends_metadata() {
        let mut d = descriptor("svc.x");
        d.tags[0] = "gpu".to_string();
        d.metadata = Metadata { os: "linux".into(), arch: "x86_64".into(), host: "h".into(), lang: "en".into() };
        let all = d.all_tags();
        assert_eq!(all.len(), TAG_COUNT + 4);
        assert!(all.contains(&"gpu"));
        assert!(all.contains(&"linux"));
    }
}
