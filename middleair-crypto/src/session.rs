//! Secure session: the derived shared secret plus framed read/write of
//! double-gzip-wrapped OpenPGP data records (§4.2 "Data records").

use tokio::io::{AsyncRead, AsyncWrite};

use middleair_wire::{Error, FramedStream};

use crate::entity::LocalIdentity;
use crate::gzip::{gunzip, gzip_best_speed};
use crate::handshake::{self, SECRET_LEN};
use crate::openpgp_io::{decrypt_with_password, encrypt_with_password};

/// Per-connection secure-channel state (§3 "Secure session").
pub struct SecureSession {
    shared_secret: [u8; SECRET_LEN],
}

impl SecureSession {
    /// Run the full handshake (§4.2 steps 1-8) over `framed`, consuming
    /// `identity` as the local key pair.
    pub async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(
        framed: &mut FramedStream<S>,
        identity: LocalIdentity,
    ) -> Result<Self, Error> {
        let (rec1, st1) = handshake::step1(identity)?;
        framed.write_frame(&rec1).await?;
        let peer_rec1 = framed.read_frame().await?.ok_or(Error::ShortRead)?;

        let (rec2, st2) = handshake::step2(st1, &peer_rec1)?;
        framed.write_frame(&rec2).await?;
        let peer_rec2 = framed.read_frame().await?.ok_or(Error::ShortRead)?;

        let finished = handshake::finish(st2, &peer_rec2)?;
        log::debug!("[middleair-crypto] handshake complete, shared secret derived");
        Ok(Self { shared_secret: finished.shared_secret })
    }

    /// Build directly from an already-derived secret — used by tests and
    /// by session resumption if a caller persists the secret externally.
    pub fn from_shared_secret(shared_secret: [u8; SECRET_LEN]) -> Self {
        Self { shared_secret }
    }

    /// The 512-byte shared secret (§3, §8 invariant 5).
    pub fn shared_secret(&self) -> &[u8; SECRET_LEN] { &self.shared_secret }

    /// Encrypt one application payload: inner gzip (best-speed) -> OpenPGP
    /// symmetric-encrypt -> outer gzip (best-speed).
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, Error> {
        let inner = gzip_best_speed(plaintext)?;
        let encrypted = encrypt_with_password(&self.shared_secret, &inner)?;
        gzip_best_speed(&encrypted)
    }

    /// Decrypt one wire record: outer gunzip -> OpenPGP decrypt -> inner
    /// gunzip.
    pub fn decrypt(&self, wire: &[u8]) -> Result<Vec<u8>, Error> {
        let outer_gunzipped = gunzip(wire)?;
        let decrypted = decrypt_with_password(&self.shared_secret, &outer_gunzipped)?;
        gunzip(&decrypted)
    }

    /// Encrypt and write one record through `framed`.
    pub async fn write_record<S: AsyncWrite + Unpin>(
        &self,
        framed: &mut FramedStream<S>,
        plaintext: &[u8],
    ) -> Result<(), Error> {
        let wire = self.encrypt(plaintext)?;
        framed.write_frame(&wire).await
    }

    /// Read and decrypt one record through `framed`. `Ok(None)` signals a
    /// clean EOF (§4.4 "On `EOF` during receive, return normally").
    pub async fn read_record<S: AsyncRead + Unpin>(
        &self,
        framed: &mut FramedStream<S>,
    ) -> Result<Option<Vec<u8>>, Error> {
        match framed.read_frame().await? {
            None => Ok(None),
            Some(wire) => Ok(Some(self.decrypt(&wire)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S4/handshake data-record contract: a session built from a fixed
    /// secret round-trips arbitrary payloads through encrypt/decrypt.
    #[test]
    fn encrypt_decrypt_round_trips() {
        let session = SecureSession::from_shared_secret([0x42; SECRET_LEN]);
        let wire = session.encrypt(b"hello, provider").unwrap();
        assert_eq!(session.decrypt(&wire).unwrap(), b"hello, provider");
    }

    #[test]
    fn single_status_byte_round_trips() {
        let session = SecureSession::from_shared_secret([7; SECRET_LEN]);
        let wire = session.encrypt(&[crate::credential::STATUS_OK]).unwrap();
        assert_eq!(session.decrypt(&wire).unwrap(), vec![crate::credential::STATUS_OK]);
    }
}
