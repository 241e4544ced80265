use anyhow::Result;
use std::collections::VecDeque;

/// Byte buffer that hands out complete lines from an SSE body.
///
/// Network chunks can end in the middle of a line (or in the middle of a
/// multi-byte character), so bytes are held until a `\n` arrives.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
}

impl CircularLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to `\n`) with surrounding whitespace and `\r` removed.
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let newline_pos = self.buffer.iter().position(|&b| b == b'\n')?;

        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();

        match std::str::from_utf8(&line_bytes) {
            Ok(line_str) => Some(Ok(line_str.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8 in stream: {}", e))),
        }
    }

    /// Drain whatever is left once the body has ended. A final event is not
    /// always terminated by a newline.
    pub fn take_remainder(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }

        let rest: Vec<u8> = self.buffer.drain(..).collect();
        match String::from_utf8(rest) {
            Ok(line) => Some(Ok(line.trim().to_string())),
            Err(e) => Some(Err(anyhow::anyhow!("Invalid UTF-8 in stream: {}", e))),
        }
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crlf_lines() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"data: one\r\n\r\ndata: two\r\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: one");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: two");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"data: par");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 9);

        buffer.extend(b"tial\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "data: partial");
    }

    #[test]
    fn test_split_multibyte_character() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        let bytes = "café\n".as_bytes();

        // 'é' is two bytes; split between them
        buffer.extend(&bytes[..4]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&bytes[4..]);

        assert_eq!(buffer.next_line().unwrap().unwrap(), "café");
    }

    #[test]
    fn test_remainder_without_newline() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(b"data: last");

        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.take_remainder().unwrap().unwrap(), "data: last");
        assert!(buffer.take_remainder().is_none());
    }
}
