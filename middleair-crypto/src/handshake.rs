//! Sans-IO handshake state machine (§4.2 steps 1-8).
//!
//! Mirrors the `step1`/`step2`/`finish` shape of
//! `layer_mtproto::authentication`: each function consumes the previous
//! opaque state plus newly-received bytes and returns the next record to
//! send alongside the next state. No socket I/O happens here — see
//! [`crate::session::SecureSession::handshake`] for the async driver that
//! frames these records over a real connection.

use sequoia_openpgp as openpgp;
use openpgp::Cert;
use openpgp::parse::Parse;

use middleair_wire::Error;

use crate::entity::LocalIdentity;
use crate::gzip::{gunzip, gzip_best_compression};
use crate::openpgp_io::{decrypt_with_cert, encrypt_to_cert};

/// Local contribution / shared secret size (§3, §4.2 step 5).
pub const SECRET_LEN: usize = 512;

/// State after step 1: the local identity, waiting for the peer's
/// public-key record.
pub struct Step1 {
    identity: LocalIdentity,
}

/// State after step 2: identity plus the already-sent local contribution,
/// waiting for the peer's encrypted contribution.
pub struct Step2 {
    identity: LocalIdentity,
    local_contribution: [u8; SECRET_LEN],
}

/// Handshake outcome: the 512-byte shared secret, identical at both ends
/// (§8 invariant 5).
#[derive(Clone)]
pub struct Finished {
    pub shared_secret: [u8; SECRET_LEN],
}

/// Step 1: serialize the local public key as a framed record to send
/// (§4.2 steps 1-2).
pub fn step1(identity: LocalIdentity) -> Result<(Vec<u8>, Step1), Error> {
    let record = identity.public_record()?;
    Ok((record, Step1 { identity }))
}

/// Step 2: parse the peer's public-key record, generate the local
/// contribution, and encrypt it to the peer (§4.2 steps 3, 5-6).
pub fn step2(state: Step1, peer_public_record: &[u8]) -> Result<(Vec<u8>, Step2), Error> {
    let peer_cert = Cert::from_bytes(peer_public_record)
        .map_err(|e| Error::Codec(format!("parsing peer public key: {e}")))?;

    let mut local_contribution = [0u8; SECRET_LEN];
    getrandom::getrandom(&mut local_contribution)
        .map_err(|e| Error::Codec(format!("getrandom: {e}")))?;

    // inner gzip (best-compression) -> OpenPGP-encrypt (to peer, no signer) -> outer gzip (best-compression)
    let inner = gzip_best_compression(&local_contribution)?;
    let encrypted = encrypt_to_cert(&peer_cert, &inner)?;
    let outer = gzip_best_compression(&encrypted)?;

    Ok((outer, Step2 { identity: state.identity, local_contribution }))
}

/// Step 3 / finish: reverse the peer's contribution record and XOR it into
/// the local contribution (§4.2 steps 7-8).
pub fn finish(state: Step2, peer_contribution_record: &[u8]) -> Result<Finished, Error> {
    let outer_gunzipped = gunzip(peer_contribution_record)?;
    let decrypted = decrypt_with_cert(state.identity.cert(), &outer_gunzipped)?;
    let peer_contribution = gunzip(&decrypted)?;

    if peer_contribution.len() != SECRET_LEN {
        return Err(Error::Codec(format!(
            "peer contribution is {} bytes, expected {SECRET_LEN}",
            peer_contribution.len()
        )));
    }

    let mut shared_secret = state.local_contribution;
    for (s, p) in shared_secret.iter_mut().zip(peer_contribution.iter()) {
        *s ^= p;
    }
    Ok(Finished { shared_secret })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S3 — handshake XOR: deterministic contributions A=0xAA×512,
    /// B=0x55×512 both derive 0xFF×512.
    #[test]
    fn s3_handshake_xor_is_commutative() {
        let a = [0xAAu8; SECRET_LEN];
        let b = [0x55u8; SECRET_LEN];
        let mut xored = a;
        for (x, y) in xored.iter_mut().zip(b.iter()) {
            *x ^= y;
        }
        assert_eq!(xored, [0xFFu8; SECRET_LEN]);
    }
}
