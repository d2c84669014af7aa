//! Credential sub-handshake (§4.2 "Credential sub-handshake"), run
//! immediately after the secure channel is established. Both the blob and
//! the status byte travel as ordinary secure-channel data records — see
//! [`crate::session::SecureSession::read_record`]/`write_record`.

use middleair_wire::Error;

/// Credential matched the configured expectation (§6 status byte alphabet).
pub const STATUS_OK: u8 = 0xC8;
/// Credential did not match.
pub const STATUS_UNAUTHORIZED: u8 = 0x91;
/// Policy forbids the connection regardless of credential match.
pub const STATUS_FORBIDDEN: u8 = 0x93;

/// Server side (§4.2 steps 1-3): compare the received blob to the
/// configured expectation and choose the status byte to send.
pub fn check_credential(expected: &[u8], received: &[u8], forbidden: bool) -> u8 {
    if forbidden {
        STATUS_FORBIDDEN
    } else if received == expected {
        STATUS_OK
    } else {
        STATUS_UNAUTHORIZED
    }
}

/// Client side (§4.2 step 4): interpret a received status byte. Any value
/// outside the known alphabet surfaces as [`Error::Unknown`].
pub fn interpret_status(status: u8) -> Result<(), Error> {
    match status {
        STATUS_OK => Ok(()),
        STATUS_UNAUTHORIZED => Err(Error::Unauthorized),
        STATUS_FORBIDDEN => Err(Error::Forbidden),
        _ => Err(Error::Unknown),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// S4 — credential reject: server configured with [1,2,3], client
    /// submits [1,2,4] -> status 0x91 -> client surfaces Unauthorized.
    #[test]
    fn s4_credential_mismatch_is_unauthorized() {
        let status = check_credential(&[1, 2, 3], &[1, 2, 4], false);
        assert_eq!(status, STATUS_UNAUTHORIZED);
        assert!(matches!(interpret_status(status), Err(Error::Unauthorized)));
    }

    #[test]
    fn matching_credential_is_ok() {
        let status = check_credential(&[1, 2, 3], &[1, 2, 3], false);
        assert_eq!(status, STATUS_OK);
        assert!(interpret_status(status).is_ok());
    }

    #[test]
    fn forbidden_overrides_a_matching_credential() {
        let status = check_credential(&[1, 2, 3], &[1, 2, 3], true);
        assert_eq!(status, STATUS_FORBIDDEN);
        assert!(matches!(interpret_status(status), Err(Error::Forbidden)));
    }

    #[test]
    fn unknown_status_byte_is_unknown() {
        assert!(matches!(interpret_status(0x42), Err(Error::Unknown)));
    }
}
