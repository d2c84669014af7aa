//! Ephemeral RSA-4096 keypair and OpenPGP entity construction (§4.2 steps 1-4).

use std::time::SystemTime;

use sequoia_openpgp as openpgp;
use openpgp::cert::{Cert, CertBuilder, CipherSuite};
use openpgp::serialize::Serialize;
use openpgp::types::KeyFlags;

use middleair_wire::Error;

/// The deterministic self-signature creation time the specification
/// mandates (§4.2 step 4) — Unix epoch 0, so two independently generated
/// identities still produce byte-comparable signature timestamps.
fn epoch() -> SystemTime {
    SystemTime::UNIX_EPOCH
}

/// A local OpenPGP identity: an ephemeral (or environment-supplied)
/// RSA-4096 certificate with a signing+certifying primary key and an
/// encryption-capable subkey, built with the fixed, empty identity and
/// epoch-0 self-signature the specification requires (§4.2 step 4).
pub struct LocalIdentity {
    cert: Cert,
}

impl LocalIdentity {
    /// Generate a fresh ephemeral RSA-4096 identity.
    pub fn generate() -> Result<Self, Error> {
        let (cert, _revocation) = CertBuilder::new()
            .set_cipher_suite(CipherSuite::RSA4k)
            .set_creation_time(epoch())
            .add_userid("")
            .set_primary_key_flags(KeyFlags::empty().set_certification().set_signing())
            .add_subkey(
                KeyFlags::empty().set_transport_encryption().set_storage_encryption(),
                None,
                None,
            )
            .generate()
            .map_err(|e| Error::Codec(format!("generating RSA-4096 identity: {e}")))?;
        Ok(Self { cert })
    }

    /// Load an identity from `MIDDLEAIR_PUBKEY`/`MIDDLEAIR_PRIVKEY`-named
    /// armored key files (§6). Returns `Ok(None)` when either variable is
    /// unset or unreadable, signalling the caller to fall back to
    /// [`LocalIdentity::generate`].
    pub fn from_env() -> Result<Option<Self>, Error> {
        let (pub_path, priv_path) = match (
            std::env::var("MIDDLEAIR_PUBKEY"),
            std::env::var("MIDDLEAIR_PRIVKEY"),
        ) {
            (Ok(p), Ok(s)) => (p, s),
            _ => return Ok(None),
        };
        if std::fs::metadata(&pub_path).is_err() {
            log::warn!("MIDDLEAIR_PUBKEY set to unreadable path {pub_path}, using an ephemeral key");
            return Ok(None);
        }
        let priv_bytes = match std::fs::read(&priv_path) {
            Ok(b) => b,
            Err(e) => {
                log::warn!("MIDDLEAIR_PRIVKEY unreadable ({e}), using an ephemeral key");
                return Ok(None);
            }
        };
        let cert = Cert::from_bytes(&priv_bytes)
            .map_err(|e| Error::Codec(format!("parsing {priv_path}: {e}")))?;
        Ok(Some(Self { cert }))
    }

    /// Construct directly from an already-loaded certificate carrying
    /// secret key material.
    pub fn from_cert(cert: Cert) -> Self {
        Self { cert }
    }

    /// [`LocalIdentity::from_env`], falling back to
    /// [`LocalIdentity::generate`] when the environment doesn't name a key
    /// pair — the shape every caller (invoker accept, client connect)
    /// actually wants (§6 "Environment").
    pub fn from_env_or_generate() -> Result<Self, Error> {
        match Self::from_env()? {
            Some(identity) => Ok(identity),
            None => Self::generate(),
        }
    }

    /// The full certificate, including secret key material. Never leaves
    /// the process — only [`LocalIdentity::public_record`] is sent.
    pub fn cert(&self) -> &Cert { &self.cert }

    /// Serialize the public half as a framed record to exchange with the
    /// peer (§4.2 step 2); `Cert::serialize` omits secret key packets.
    pub fn public_record(&self) -> Result<Vec<u8>, Error> {
        let mut buf = Vec::new();
        self.cert
            .serialize(&mut buf)
            .map_err(|e| Error::Codec(format!("serializing public cert: {e}")))?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_a_public_record() {
        let identity = LocalIdentity::generate().expect("RSA-4096 generation");
        let record = identity.public_record().expect("serialize public cert");
        assert!(!record.is_empty());
    }
}
