//! FCUP ("Fetch Client URL Playlist") request issuer (component E).
//!
//! Formats and writes a `POST /event` request carrying a binary-plist body
//! on the reverse-HTTP (PTTH/1.0) channel. Delivery is fire-and-forget;
//! correlation happens later, when the client's own `POST /action
//! unhandledURLResponse` arrives on the forward channel carrying the same
//! `FCUP_Response_RequestID`.

use plist::Value;

use crate::errors::FcupError;
use crate::reverse_channel::ReverseChannel;

/// Binary-plist body for one FCUP request (spec.md SS4.E).
pub struct FcupRequest {
    pub session_id: String,
    pub request_id: u64,
    pub url: String,
}

impl FcupRequest {
    fn to_plist(&self) -> Value {
        let mut dict = plist::Dictionary::new();
        dict.insert("sessionID".to_string(), Value::String(self.session_id.clone()));
        dict.insert(
            "FCUP_Request_RequestID".to_string(),
            Value::Integer(self.request_id.into()),
        );
        dict.insert("FCUP_Request_URL".to_string(), Value::String(self.url.clone()));
        Value::Dictionary(dict)
    }

    fn to_bytes(&self) -> Result<Vec<u8>, FcupError> {
        let mut buf = Vec::new();
        plist::to_writer_binary(&mut buf, &self.to_plist())
            .map_err(|e| FcupError::WriteFailed { message: e.to_string() })?;
        Ok(buf)
    }
}

/// Send a `POST /event` FCUP request over `channel`. The session mutex must
/// already be released by the caller: this function only takes the
/// already-snapshotted URL and IDs, never a session reference, so it cannot
/// accidentally hold a session lock across the socket write.
pub async fn send_fcup_request(
    channel: &ReverseChannel,
    session_id: &str,
    request_id: u64,
    url: &str,
) -> Result<(), FcupError> {
    let request = FcupRequest {
        session_id: session_id.to_string(),
        request_id,
        url: url.to_string(),
    };
    let body = request.to_bytes()?;

    let head = format!(
        "POST /event HTTP/1.1\r\n\
         Content-Type: application/x-apple-binary-plist\r\n\
         Content-Length: {}\r\n\
         \r\n",
        body.len()
    );

    channel.write_request(head.into_bytes(), body).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_a_dictionary() {
        let request = FcupRequest {
            session_id: "a".repeat(36),
            request_id: 1,
            url: "http://client:7000/x/master.m3u8".to_string(),
        };
        let bytes = request.to_bytes().unwrap();
        assert!(!bytes.is_empty());
        let value: Value = plist::from_bytes(&bytes).unwrap();
        let dict = value.as_dictionary().unwrap();
        assert_eq!(
            dict.get("FCUP_Request_URL").unwrap().as_string().unwrap(),
            "http://client:7000/x/master.m3u8"
        );
        assert_eq!(dict.get("FCUP_Request_RequestID").unwrap().as_signed_integer(), Some(1));
    }
}
