//! Decoded, seekable line source over a raw byte stream.
//!
//! Physical lines are delimited by `\n` in the byte stream and decoded
//! with the run's encoding, replacement-character lossy on malformed
//! sequences. Terminators stay attached to the line so the bad-raw sink
//! can reproduce the input verbatim and the splice repair can strip them
//! explicitly.
//!
//! Line splitting is byte-based, so only ASCII-compatible encodings are
//! supported; that covers everything the detector can guess.

use encoding_rs::{Encoding, UTF_8};
use std::io::{self, BufRead as _, BufReader, Read, Seek, SeekFrom};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

pub struct TextSource<R: Read + Seek> {
    reader: BufReader<R>,
    encoding: &'static Encoding,
    buf: Vec<u8>,
    strip_bom: bool,
}

impl<R: Read + Seek> TextSource<R> {
    pub fn new(inner: R, encoding: &'static Encoding) -> Self {
        Self {
            reader: BufReader::new(inner),
            encoding,
            buf: Vec::new(),
            strip_bom: true,
        }
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Reads the next physical line, terminator included. `None` at EOF.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        self.buf.clear();
        let n = self.reader.read_until(b'\n', &mut self.buf)?;
        if n == 0 {
            return Ok(None);
        }

        let mut bytes = self.buf.as_slice();
        if self.strip_bom {
            self.strip_bom = false;
            if self.encoding == UTF_8 && bytes.starts_with(UTF8_BOM) {
                bytes = &bytes[UTF8_BOM.len()..];
            }
        }

        let (text, _had_errors) = self.encoding.decode_without_bom_handling(bytes);
        Ok(Some(text.into_owned()))
    }

    pub fn stream_position(&mut self) -> io::Result<u64> {
        self.reader.stream_position()
    }

    pub fn seek(&mut self, pos: u64) -> io::Result<()> {
        self.reader.seek(SeekFrom::Start(pos))?;
        self.strip_bom = pos == 0;
        Ok(())
    }

    pub fn rewind(&mut self) -> io::Result<()> {
        self.seek(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn lines_keep_their_terminators() {
        let mut src = TextSource::new(Cursor::new(b"a,b\r\nc,d\nlast".to_vec()), UTF_8);
        assert_eq!(src.read_line().unwrap().unwrap(), "a,b\r\n");
        assert_eq!(src.read_line().unwrap().unwrap(), "c,d\n");
        assert_eq!(src.read_line().unwrap().unwrap(), "last");
        assert_eq!(src.read_line().unwrap(), None);
    }

    #[test]
    fn rewind_restarts_from_the_first_line() {
        let mut src = TextSource::new(Cursor::new(b"one\ntwo\n".to_vec()), UTF_8);
        assert_eq!(src.read_line().unwrap().unwrap(), "one\n");
        src.rewind().unwrap();
        assert_eq!(src.read_line().unwrap().unwrap(), "one\n");
    }

    #[test]
    fn position_probe_round_trips() {
        let mut src = TextSource::new(Cursor::new(b"one\ntwo\nthree\n".to_vec()), UTF_8);
        src.read_line().unwrap();
        let pos = src.stream_position().unwrap();
        src.read_line().unwrap();
        src.seek(pos).unwrap();
        assert_eq!(src.read_line().unwrap().unwrap(), "two\n");
    }

    #[test]
    fn utf8_bom_is_stripped_once() {
        let mut data = Vec::new();
        data.extend_from_slice(&[0xEF, 0xBB, 0xBF]);
        data.extend_from_slice(b"h1,h2\nv1,v2\n");
        let mut src = TextSource::new(Cursor::new(data), UTF_8);
        assert_eq!(src.read_line().unwrap().unwrap(), "h1,h2\n");
        // after a rewind the BOM is stripped again
        src.rewind().unwrap();
        assert_eq!(src.read_line().unwrap().unwrap(), "h1,h2\n");
    }

    #[test]
    fn windows_1251_lines_decode() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("имя;город\n");
        let mut src = TextSource::new(Cursor::new(bytes.into_owned()), encoding_rs::WINDOWS_1251);
        assert_eq!(src.read_line().unwrap().unwrap(), "имя;город\n");
    }

    #[test]
    fn malformed_bytes_decode_lossily() {
        let mut src = TextSource::new(Cursor::new(b"a,\xFF\xFE,b\n".to_vec()), UTF_8);
        let line = src.read_line().unwrap().unwrap();
        assert!(line.starts_with("a,"));
        assert!(line.ends_with(",b\n"));
    }
}
