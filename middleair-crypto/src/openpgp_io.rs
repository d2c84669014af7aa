//! Thin wrappers over `sequoia_openpgp`'s streaming serializer/parser,
//! isolating the exact API surface the handshake and data records need:
//! encrypt/decrypt to a peer's certificate (asymmetric, handshake
//! contribution) and encrypt/decrypt with a passphrase (symmetric, data
//! records).

use std::io::Write;

use sequoia_openpgp as openpgp;
use openpgp::Cert;
use openpgp::crypto::{Password, SessionKey};
use openpgp::packet::{PKESK, SKESK};
use openpgp::parse::Parse;
use openpgp::parse::stream::{
    DecryptionHelper, DecryptorBuilder, MessageStructure, VerificationHelper,
};
use openpgp::policy::StandardPolicy;
use openpgp::serialize::stream::{Encryptor, LiteralWriter, Message};
use openpgp::types::SymmetricAlgorithm;
use openpgp::{Fingerprint, KeyHandle};

use middleair_wire::Error;

fn policy() -> StandardPolicy<'static> {
    StandardPolicy::new()
}

/// Encrypt `data` to every transport-encryption-capable subkey of `cert`,
/// with no signer — the handshake's local-contribution record (§4.2 step 6).
pub fn encrypt_to_cert(cert: &Cert, data: &[u8]) -> Result<Vec<u8>, Error> {
    let p = policy();
    let recipients: Vec<_> = cert
        .keys()
        .with_policy(&p, None)
        .supported()
        .alive()
        .revoked(false)
        .for_transport_encryption()
        .map(|ka| ka.key().into())
        .collect();
    if recipients.is_empty() {
        return Err(Error::Codec("peer certificate has no encryption subkey".into()));
    }

    let mut sink = Vec::new();
    {
        let message = Message::new(&mut sink);
        let message = Encryptor::for_recipients(message, recipients)
            .build()
            .map_err(|e| Error::Codec(format!("building encryptor: {e}")))?;
        let mut writer = LiteralWriter::new(message)
            .build()
            .map_err(|e| Error::Codec(format!("building literal writer: {e}")))?;
        writer.write_all(data)?;
        writer.finalize().map_err(|e| Error::Codec(format!("finalizing ciphertext: {e}")))?;
    }
    Ok(sink)
}

/// Decrypt an OpenPGP message addressed to `cert`'s encryption subkey — the
/// handshake's reverse path (§4.2 step 7).
pub fn decrypt_with_cert(cert: &Cert, data: &[u8]) -> Result<Vec<u8>, Error> {
    let p = policy();
    let mut helper = CertHelper(cert);
    let mut decryptor = DecryptorBuilder::from_bytes(data)
        .map_err(|e| Error::Codec(format!("parsing ciphertext: {e}")))?
        .with_policy(&p, None, &mut helper)
        .map_err(|e| Error::Codec(format!("starting decryption: {e}")))?;
    let mut out = Vec::new();
    std::io::copy(&mut decryptor, &mut out)?;
    Ok(out)
}

/// Symmetric (passphrase-based) encrypt, keyed by the session's shared
/// secret — every data record after the handshake (§4.2 "Data records").
pub fn encrypt_with_password(passphrase: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let mut sink = Vec::new();
    {
        let message = Message::new(&mut sink);
        let message = Encryptor::with_passwords(message, Some(Password::from(passphrase.to_vec())))
            .build()
            .map_err(|e| Error::Codec(format!("building symmetric encryptor: {e}")))?;
        let mut writer = LiteralWriter::new(message)
            .build()
            .map_err(|e| Error::Codec(format!("building literal writer: {e}")))?;
        writer.write_all(data)?;
        writer.finalize().map_err(|e| Error::Codec(format!("finalizing ciphertext: {e}")))?;
    }
    Ok(sink)
}

/// Reverse of [`encrypt_with_password`].
pub fn decrypt_with_password(passphrase: &[u8], data: &[u8]) -> Result<Vec<u8>, Error> {
    let p = policy();
    let mut helper = PasswordHelper(passphrase);
    let mut decryptor = DecryptorBuilder::from_bytes(data)
        .map_err(|e| Error::Codec(format!("parsing ciphertext: {e}")))?
        .with_policy(&p, None, &mut helper)
        .map_err(|e| Error::Codec(format!("starting decryption: {e}")))?;
    let mut out = Vec::new();
    std::io::copy(&mut decryptor, &mut out)?;
    Ok(out)
}

/// Decryption context for the asymmetric (certificate) path. Since the
/// handshake never signs the contribution (§4.2 step 6: "no signer"),
/// `check` is a no-op.
struct CertHelper<'a>(&'a Cert);

impl<'a> VerificationHelper for CertHelper<'a> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(vec![self.0.clone()])
    }
    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        Ok(())
    }
}

impl<'a> DecryptionHelper for CertHelper<'a> {
    fn decrypt<D>(
        &mut self,
        pkesks: &[PKESK],
        _skesks: &[SKESK],
        sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        let p = policy();
        for ka in self.0.keys().with_policy(&p, None).secret().for_transport_encryption() {
            let mut pair = ka
                .key()
                .clone()
                .into_keypair()
                .map_err(|e| anyhow::anyhow!("preparing decryption key: {e}"))?;
            for pkesk in pkesks {
                if let Some((algo, sk)) = pkesk.decrypt(&mut pair, sym_algo) {
                    if decrypt(algo, &sk) {
                        return Ok(Some(ka.key().fingerprint()));
                    }
                }
            }
        }
        Ok(None)
    }
}

/// Decryption context for the symmetric (passphrase) path.
struct PasswordHelper<'a>(&'a [u8]);

impl<'a> VerificationHelper for PasswordHelper<'a> {
    fn get_certs(&mut self, _ids: &[KeyHandle]) -> openpgp::Result<Vec<Cert>> {
        Ok(vec![])
    }
    fn check(&mut self, _structure: MessageStructure) -> openpgp::Result<()> {
        Ok(())
    }
}

impl<'a> DecryptionHelper for PasswordHelper<'a> {
    fn decrypt<D>(
        &mut self,
        _pkesks: &[PKESK],
        skesks: &[SKESK],
        _sym_algo: Option<SymmetricAlgorithm>,
        mut decrypt: D,
    ) -> openpgp::Result<Option<Fingerprint>>
    where
        D: FnMut(SymmetricAlgorithm, &SessionKey) -> bool,
    {
        let password = Password::from(self.0.to_vec());
        for skesk in skesks {
            if let Ok((algo, sk)) = skesk.decrypt(&password) {
                if decrypt(algo, &sk) {
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }
}
