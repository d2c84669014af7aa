//! Announcement record: the wire form of a descriptor (§3, §6 "Wire —
//! announcement"). `{uuid, port, tags[0..15]}` where slots 12..15 carry the
//! metadata fields appended to the 12 user tags.

use middleair_wire::Error;

use crate::descriptor::{Descriptor, Metadata, Provider, TAG_COUNT};

/// Total tag slots on the wire: 12 user tags + {os, arch, host, lang}.
pub const WIRE_TAG_COUNT: usize = TAG_COUNT + 4;

/// Wire form of a descriptor, independent of the observed source address —
/// the listener overrides `provider.host` after receipt (§4.3).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    /// Same as [`Descriptor::uuid`].
    pub uuid: String,
    /// Same as [`Provider::port`].
    pub port: u16,
    /// 16 entries: 12 user tags followed by {os, arch, host, lang}.
    pub tags: [String; WIRE_TAG_COUNT],
}

impl Announcement {
    /// Build the wire form of a locally registered descriptor.
    pub fn from_descriptor(d: &Descriptor) -> Self {
        let mut tags: [String; WIRE_TAG_COUNT] = Default::default();
        for (slot, tag) in tags.iter_mut().zip(d.tags.iter()) {
            *slot = tag.clone();
        }
        tags[TAG_COUNT] = d.metadata.os.clone();
        tags[TAG_COUNT + 1] = d.metadata.arch.clone();
        tags[TAG_COUNT + 2] = d.metadata.host.clone();
        tags[TAG_COUNT + 3] = d.metadata.lang.clone();
        Self { uuid: d.uuid.clone(), port: d.port(), tags }
    }

    /// Rebuild a descriptor from a received announcement, overriding
    /// `provider.host` with the datagram's source address (§4.3 "Listener":
    /// "observe the source IP as the authoritative `provider.host`").
    pub fn into_descriptor(self, source_host: String) -> Descriptor {
        let mut user_tags: [String; TAG_COUNT] = Default::default();
        user_tags.clone_from_slice(&self.tags[..TAG_COUNT]);
        Descriptor {
            uuid: self.uuid,
            provider: Provider { host: source_host, port: self.port },
            tags: user_tags,
            metadata: Metadata {
                os: self.tags[TAG_COUNT].clone(),
                arch: self.tags[TAG_COUNT + 1].clone(),
                host: self.tags[TAG_COUNT + 2].clone(),
                lang: self.tags[TAG_COUNT + 3].clone(),
            },
        }
    }

    /// Serialize: 4-byte LE uuid length + uuid bytes, 4-byte LE `int32`
    /// port (§6 "Wire — announcement"), then 16 length-prefixed tag
    /// strings (mirrors the length-prefixed string encoding used
    /// throughout `middleair-wire::envelope`).
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_string(&mut out, &self.uuid);
        out.extend_from_slice(&(self.port as u32).to_le_bytes());
        for tag in &self.tags {
            write_string(&mut out, tag);
        }
        out
    }

    /// Inverse of [`Announcement::encode`].
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = 0usize;
        let uuid = read_string(bytes, &mut cursor)?;

        if bytes.len() < cursor + 4 {
            return Err(Error::Codec("announcement: truncated port".into()));
        }
        let port = u32::from_le_bytes(bytes[cursor..cursor + 4].try_into().unwrap()) as u16;
        cursor += 4;

        let mut tags: [String; WIRE_TAG_COUNT] = Default::default();
        for slot in tags.iter_mut() {
            *slot = read_string(bytes, &mut cursor)?;
        }

        Ok(Self { uuid, port, tags })
    }
}

fn write_string(out: &mut Vec<u8>, s: &str) {
    out.extend_from_slice(&(s.len() as u32).to_le_bytes());
    out.extend_from_slice(s.as_bytes());
}

fn read_string(bytes: &[u8], cursor: &mut usize) -> Result<String, Error> {
    if bytes.len() < *cursor + 4 {
        return Err(Error::Codec("announcement: truncated string length".into()));
    }
    let len = u32::from_le_bytes(bytes[*cursor..*cursor + 4].try_into().unwrap()) as usize;
    *cursor += 4;
    if bytes.len() < *cursor + len {
        return Err(Error::Codec("announcement: truncated string body".into()));
    }
    let s = String::from_utf8(bytes[*cursor..*cursor + len].to_vec())
        .map_err(|e| Error::Codec(format!("announcement: invalid utf8: {e}")))?;
    *cursor += len;
    Ok(s)
}

// `Descriptor` carries `provider.port`, not a top-level `port`; this tiny
// accessor keeps `from_descriptor` readable.
impl Descriptor {
    fn port(&self) -> u16 { self.provider.port }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Metadata, Provider};

    fn sample_descriptor() -> Descriptor {
        let mut tags: [String; TAG_COUNT] = Default::default();
        tags[0] = "gpu".to_string();
        Descriptor {
            uuid: "svc.x".to_string(),
            provider: Provider { host: "10.0.0.5".to_string(), port: 9000 },
            tags,
            metadata: Metadata { os: "linux".into(), arch: "x86_64".into(), host: "box".into(), lang: "en".into() },
        }
    }

    #[test]
    fn round_trips_through_wire_bytes() {
        let d = sample_descriptor();
        let ann = Announcement::from_descriptor(&d);
        let bytes = ann.encode();
        let decoded = Announcement::decode(&bytes).unwrap();
        assert_eq!(decoded, ann);

        let rebuilt = decoded.into_descriptor("10.0.0.5".to_string());
        assert_eq!(rebuilt, d);
    }

    #[test]
    fn listener_host_override_wins_over_payload() {
        let d = sample_descriptor();
        let ann = Announcement::from_descriptor(&d);
        let rebuilt = ann.into_descriptor("203.0.113.9".to_string());
        assert_eq!(rebuilt.provider.host, "203.0.113.9");
    }

    #[test]
    fn truncated_bytes_are_rejected() {
        assert!(Announcement::decode(&[1, 2, 3]).is_err());
    }
}
