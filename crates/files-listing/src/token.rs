use std::fmt;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::error::{ListingError, ListingResult};

/// Envelope format version, first byte of every decoded token.
const VERSION_TAG: u8 = 1;

/// Trailing checksum bytes (truncated BLAKE3 of the cursor).
const CHECKSUM_LEN: usize = 4;

/// Public, client-facing encoding of a backend continuation cursor.
///
/// Layout before encoding: `[tag: 1][cursor bytes][checksum: 4]`, then
/// base64url without padding so the token is safe in a query string. The
/// cursor bytes are never interpreted; any backend cursor format can be
/// wrapped. Clients must treat the token as opaque.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageToken(String);

impl PageToken {
    /// Wrap a backend cursor.
    pub fn encode(cursor: &str) -> Self {
        let mut buf = Vec::with_capacity(1 + cursor.len() + CHECKSUM_LEN);
        buf.push(VERSION_TAG);
        buf.extend_from_slice(cursor.as_bytes());
        buf.extend_from_slice(&checksum(cursor.as_bytes()));
        Self(URL_SAFE_NO_PAD.encode(buf))
    }

    /// Take a token string as received from a client. Nothing is validated
    /// until [`PageToken::decode`].
    pub fn from_client(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Recover the backend cursor.
    pub fn decode(&self) -> ListingResult<String> {
        let bytes = URL_SAFE_NO_PAD
            .decode(self.0.as_bytes())
            .map_err(|e| invalid(format!("not base64url: {e}")))?;

        let Some((&tag, rest)) = bytes.split_first() else {
            return Err(invalid("empty token"));
        };
        if tag != VERSION_TAG {
            return Err(invalid(format!("unknown token version {tag}")));
        }
        if rest.len() < CHECKSUM_LEN {
            return Err(invalid("token too short"));
        }

        let (cursor, sum) = rest.split_at(rest.len() - CHECKSUM_LEN);
        if sum != checksum(cursor) {
            return Err(invalid("checksum mismatch"));
        }
        String::from_utf8(cursor.to_vec()).map_err(|e| invalid(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

fn checksum(data: &[u8]) -> [u8; CHECKSUM_LEN] {
    let hash = blake3::hash(data);
    let mut out = [0u8; CHECKSUM_LEN];
    out.copy_from_slice(&hash.as_bytes()[..CHECKSUM_LEN]);
    out
}

fn invalid(reason: impl Into<String>) -> ListingError {
    ListingError::InvalidPageToken(reason.into())
}

impl fmt::Debug for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PageToken({})", self.0)
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn roundtrip_simple_cursors() {
        for cursor in ["", "66696c65322e747874", "1ueGcxLPRx1Tr/XYExHnhbYLgveDs2J/wm36Hy4vbOwM="] {
            let token = PageToken::encode(cursor);
            assert_eq!(token.decode().unwrap(), cursor);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        assert_eq!(PageToken::encode("abc"), PageToken::encode("abc"));
        assert_ne!(PageToken::encode("abc"), PageToken::encode("abd"));
    }

    #[test]
    fn token_is_query_safe() {
        let token = PageToken::encode("a/b+c=d?e&f g");
        assert!(token
            .as_str()
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn garbage_is_rejected() {
        for raw in ["", "!!!", "not a token", "AA"] {
            let err = PageToken::from_client(raw).decode().unwrap_err();
            assert!(matches!(err, ListingError::InvalidPageToken(_)), "{raw:?}");
        }
    }

    #[test]
    fn corrupted_token_is_rejected() {
        let token = PageToken::encode("some-backend-cursor");
        let mut chars: Vec<char> = token.as_str().chars().collect();
        chars[3] = if chars[3] == 'A' { 'B' } else { 'A' };
        let corrupted: String = chars.into_iter().collect();

        let err = PageToken::from_client(corrupted).decode().unwrap_err();
        assert!(matches!(err, ListingError::InvalidPageToken(_)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let mut raw = vec![9u8];
        raw.extend_from_slice(b"cursor");
        raw.extend_from_slice(&checksum(b"cursor"));
        let token = PageToken::from_client(URL_SAFE_NO_PAD.encode(raw));

        let err = token.decode().unwrap_err();
        assert!(err.to_string().contains("version"));
    }

    #[test]
    fn truncated_token_is_rejected() {
        let token = PageToken::encode("cursor");
        let truncated = &token.as_str()[..token.as_str().len() - 4];
        assert!(PageToken::from_client(truncated).decode().is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let token = PageToken::encode("x");
        let json = serde_json::to_string(&token).unwrap();
        assert_eq!(json, format!("\"{}\"", token.as_str()));
        let back: PageToken = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    proptest! {
        #[test]
        fn decode_inverts_encode(cursor in any::<String>()) {
            prop_assert_eq!(PageToken::encode(&cursor).decode().unwrap(), cursor);
        }
    }
}
