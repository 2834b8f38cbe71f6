use std::mem;

use super::{Chunks, ChunksError};

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    ChunksError(ChunksError),
    InvalidPayload,
}

/// A type for reading server-sent events from a chunk stream.
///
/// Only the `data` field is surfaced. Multiple `data` lines of one event
/// are joined with `\n`; comments and other fields are skipped. Any of
/// `\r\n`, `\r` and `\n` ends a line, and a blank line ends an event.
pub struct Sse {
    buf: Vec<u8>,
    data: String,
    has_data: bool,
    eof: bool,
    chunks: Chunks,
}

impl Sse {
    #[inline]
    pub fn new(chunks: Chunks) -> Self {
        Self {
            buf: Vec::new(),
            data: String::new(),
            has_data: false,
            eof: false,
            chunks,
        }
    }

    /// Returns the data of the next event, or `None` once the stream ends.
    pub async fn next_event(&mut self) -> Result<Option<String>, Error> {
        loop {
            while let Some(line) = self.take_line()? {
                if let Some(event) = self.process_line(&line) {
                    return Ok(Some(event));
                }
            }

            if self.eof {
                // A trailing line without terminator still counts, and an
                // event that was not closed by a blank line is dispatched.
                if !self.buf.is_empty() {
                    let rest = mem::take(&mut self.buf);
                    let line = String::from_utf8(rest)
                        .map_err(|_| Error::InvalidPayload)?;
                    self.process_line(&line);
                }
                return Ok(self.take_pending_data());
            }

            match self.chunks.next_chunk().await.map_err(Error::ChunksError)? {
                Some(bytes) => self.buf.extend_from_slice(&bytes),
                None => self.eof = true,
            }
        }
    }

    fn take_line(&mut self) -> Result<Option<String>, Error> {
        let Some(pos) = self.buf.iter().position(|b| *b == b'\n' || *b == b'\r')
        else {
            return Ok(None);
        };
        let terminator_len = if self.buf[pos] == b'\r' {
            match self.buf.get(pos + 1) {
                Some(b'\n') => 2,
                Some(_) => 1,
                // Cannot tell `\r` from `\r\n` yet.
                None if !self.eof => return Ok(None),
                None => 1,
            }
        } else {
            1
        };

        let mut line: Vec<u8> = self.buf.drain(..pos + terminator_len).collect();
        line.truncate(pos);
        String::from_utf8(line)
            .map(Some)
            .map_err(|_| Error::InvalidPayload)
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            return self.take_pending_data();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => {
                (field, value.strip_prefix(' ').unwrap_or(value))
            }
            None => (line, ""),
        };
        if field == "data" {
            if self.has_data {
                self.data.push('\n');
            }
            self.data.push_str(value);
            self.has_data = true;
        } else {
            trace!("skipping sse field: {field}");
        }
        None
    }

    #[inline]
    fn take_pending_data(&mut self) -> Option<String> {
        if !self.has_data {
            return None;
        }
        self.has_data = false;
        Some(mem::take(&mut self.data))
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn test_normal_events() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"data: hello\n\n"),
                Bytes::from_static(b"data: bye\n\n"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "hello");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "bye");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_split_framing() {
        let chunks = Chunks::from_static_split(
            b": keep-alive\r\nevent: delta\r\ndata: {\"a\":1}\r\n\r\ndata:x\r\n\r\n",
            3,
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), r#"{"a":1}"#);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "x");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_multi_line_and_unterminated() {
        let chunks = Chunks::from_vec_deque(
            vec![
                Bytes::from_static(b"data: first\ndata: second\n\n"),
                Bytes::from_static(b"data: [DONE]"),
            ]
            .into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "first\nsecond");
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "[DONE]");
        assert_eq!(sse.next_event().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_utf8_split_across_chunks() {
        let data = "data: Café €20\n\n".as_bytes().to_vec();
        let (head, tail) = data.split_at(10);
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from(head.to_vec()), Bytes::from(tail.to_vec())].into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap().unwrap(), "Café €20");
    }

    #[tokio::test]
    async fn test_invalid_data() {
        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"data: \xff\xfe\n\n")].into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap_err(), Error::InvalidPayload);

        let chunks = Chunks::from_vec_deque(
            vec![Bytes::from_static(b"retry: 10\n\n")].into(),
        );
        let mut sse = Sse::new(chunks);
        assert_eq!(sse.next_event().await.unwrap(), None);
    }
}
