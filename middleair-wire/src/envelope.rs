//! The self-describing envelope (§3, §6): `{type_name, message_data, error?}`.
//!
//! The wire schema types themselves are out of scope (§1) — treated as
//! opaque message types with a stable string-form type identifier and a
//! byte-level codec. [`Schema`] is that seam, analogous to how
//! `layer-tl-types::{Serializable, Deserializable}` seam TL types into
//! `layer-mtproto`.

use crate::Error;

/// A wire schema: a message type with a stable string identity and a
/// byte-level codec. Implemented by callers for their own request/response
/// types; MiddleAir never interprets the bytes itself.
pub trait Schema: Sized {
    /// The stable string-form type identifier carried in the envelope.
    fn type_name() -> &'static str;

    /// Encode `self` to bytes.
    fn encode(&self) -> Vec<u8>;

    /// Decode an instance from bytes.
    fn decode(bytes: &[u8]) -> Result<Self, Error>;
}

/// A structured `{code, message}` error, carried either inside an
/// [`Envelope`] or used standalone by the credential sub-handshake.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WireError {
    pub code: i32,
    pub message: String,
}

impl WireError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl From<&Error> for WireError {
    fn from(e: &Error) -> Self {
        Self { code: e.code(), message: e.to_string() }
    }
}

/// `{type_identifier: string, payload: bytes, error?: {code, message}}`.
///
/// Exactly one of `message_data` or `error` is meaningful per envelope; an
/// envelope carrying `error` is emitted unilaterally by the server to
/// report dispatch failures (§4.4).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Envelope {
    pub type_name: String,
    pub message_data: Vec<u8>,
    pub error: Option<WireError>,
}

impl Envelope {
    /// Wrap an encoded schema value for transmission.
    pub fn pack<S: Schema>(value: &S) -> Self {
        Self {
            type_name: S::type_name().to_string(),
            message_data: value.encode(),
            error: None,
        }
    }

    /// Build an envelope directly from an already-encoded payload, for
    /// callers dispatching by a dynamic type name rather than a concrete
    /// [`Schema`] impl (e.g. the client proxy forwarding a caller-chosen
    /// request type).
    pub fn new(type_name: impl Into<String>, message_data: Vec<u8>) -> Self {
        Self { type_name: type_name.into(), message_data, error: None }
    }

    /// Build a standalone error envelope (no `type_name`/payload), as the
    /// invoker sends on dispatch failure (§4.4).
    pub fn error(code: i32, message: impl Into<String>) -> Self {
        Self {
            type_name: String::new(),
            message_data: Vec::new(),
            error: Some(WireError::new(code, message)),
        }
    }

    /// Decode `message_data` as `S`, failing if this envelope carries an
    /// error instead of a payload.
    pub fn unpack<S: Schema>(&self) -> Result<S, Error> {
        if let Some(e) = &self.error {
            return Err(Error::from_wire(e.code, e.message.clone()));
        }
        S::decode(&self.message_data)
    }

    /// Serialize to the wire form: a length-prefixed `type_name`, a
    /// length-prefixed `message_data`, a presence byte, and — if present —
    /// `error.code` (4 bytes LE) followed by a length-prefixed message.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_lp_string(&mut buf, &self.type_name);
        write_lp_bytes(&mut buf, &self.message_data);
        match &self.error {
            None => buf.push(0),
            Some(e) => {
                buf.push(1);
                buf.extend_from_slice(&e.code.to_le_bytes());
                write_lp_string(&mut buf, &e.message);
            }
        }
        buf
    }

    /// Parse the wire form produced by [`Envelope::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = 0usize;
        let type_name = read_lp_string(bytes, &mut cursor)?;
        let message_data = read_lp_bytes(bytes, &mut cursor)?;
        let has_error = *bytes.get(cursor).ok_or(Error::ShortRead)?;
        cursor += 1;
        let error = if has_error == 0 {
            None
        } else {
            let code_bytes: [u8; 4] = bytes
                .get(cursor..cursor + 4)
                .ok_or(Error::ShortRead)?
                .try_into()
                .unwrap();
            cursor += 4;
            let code = i32::from_le_bytes(code_bytes);
            let message = read_lp_string(bytes, &mut cursor)?;
            Some(WireError { code, message })
        };
        Ok(Self { type_name, message_data, error })
    }
}

fn write_lp_bytes(buf: &mut Vec<u8>, data: &[u8]) {
    buf.extend_from_slice(&(data.len() as u32).to_le_bytes());
    buf.extend_from_slice(data);
}

fn write_lp_string(buf: &mut Vec<u8>, s: &str) {
    write_lp_bytes(buf, s.as_bytes());
}

fn read_lp_bytes(bytes: &[u8], cursor: &mut usize) -> Result<Vec<u8>, Error> {
    let len_bytes: [u8; 4] = bytes
        .get(*cursor..*cursor + 4)
        .ok_or(Error::ShortRead)?
        .try_into()
        .unwrap();
    let len = u32::from_le_bytes(len_bytes) as usize;
    *cursor += 4;
    let data = bytes.get(*cursor..*cursor + len).ok_or(Error::ShortRead)?.to_vec();
    *cursor += len;
    Ok(data)
}

fn read_lp_string(bytes: &[u8], cursor: &mut usize) -> Result<String, Error> {
    let data = read_lp_bytes(bytes, cursor)?;
    String::from_utf8(data).map_err(|e| Error::Codec(e.to_string()))
}
