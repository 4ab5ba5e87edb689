//! Reply buffer

use core::fmt;

use heapless::Vec;

use crate::frame::{FrameError, MAX_MESSAGE_LEN};
use crate::messages::REPLY_TAG;

/// Scratch buffer holding one outgoing reply
#[derive(Debug, Clone, Default)]
pub struct Reply {
    buffer: Vec<u8, MAX_MESSAGE_LEN>,
}

impl Reply {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a reply to the request tagged `tag`
    pub fn begin(&mut self, tag: u8) {
        self.buffer.clear();
        // Capacity is far above two bytes
        let _ = self.buffer.extend_from_slice(&[REPLY_TAG, tag]);
    }

    /// Standard reply: `>` + tag + ` OK` or ` FAIL`
    pub fn status(&mut self, tag: u8, ok: bool) {
        self.begin(tag);
        let status: &[u8] = if ok { b" OK" } else { b" FAIL" };
        let _ = self.buffer.extend_from_slice(status);
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<(), FrameError> {
        self.buffer
            .extend_from_slice(bytes)
            .map_err(|_| FrameError::Overflow)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }
}

impl fmt::Write for Reply {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes()).map_err(|_| fmt::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::fmt::Write;

    #[test]
    fn test_status_replies() {
        let mut reply = Reply::new();
        reply.status(b'A', true);
        assert_eq!(reply.as_bytes(), b">A OK");
        reply.status(b'G', false);
        assert_eq!(reply.as_bytes(), b">G FAIL");
    }

    #[test]
    fn test_formatted_reply() {
        let mut reply = Reply::new();
        reply.begin(b'H');
        write!(reply, "{}", 1).unwrap();
        assert_eq!(reply.as_bytes(), b">H1");

        assert_eq!(
            reply.push_bytes(&[b'x'; MAX_MESSAGE_LEN]),
            Err(FrameError::Overflow)
        );
    }
}
