//! Incremental hex transcoding over byte streams.

use std::io::{self, Read};

use hex::FromHexError;

/// Decodes hex text that arrives in arbitrary chunks.
///
/// A chunk may end in the middle of a byte, the dangling digit is carried over
/// to the next call to [`HexDecoder::decode`].
#[derive(Debug, Default, Clone)]
pub struct HexDecoder {
    pending: Option<u8>,
    consumed: usize,
}

impl HexDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `input` and appends the resulting bytes to `out`.
    ///
    /// On error `out` is left as it was before the call.
    pub fn decode(&mut self, input: &[u8], out: &mut Vec<u8>) -> Result<usize, FromHexError> {
        let mut digits = Vec::with_capacity(input.len() + 1);
        digits.extend(self.pending);
        digits.extend_from_slice(input);

        let whole = digits.len() & !1;
        let start = out.len();
        out.resize(start + whole / 2, 0);
        if let Err(err) = hex::decode_to_slice(&digits[..whole], &mut out[start..]) {
            out.truncate(start);
            return Err(self.reposition(err));
        }

        let pending = digits.get(whole).copied();
        if let Some(c) = pending
            && !c.is_ascii_hexdigit()
        {
            out.truncate(start);
            return Err(FromHexError::InvalidHexCharacter {
                c: c as char,
                index: self.consumed + whole,
            });
        }
        self.consumed += whole;
        self.pending = pending;
        Ok(whole / 2)
    }

    /// Ends the stream; a digit still waiting for its partner is an error.
    pub fn finish(&mut self) -> Result<(), FromHexError> {
        match self.pending.take() {
            Some(_) => Err(FromHexError::OddLength),
            None => Ok(()),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    // Report character positions relative to the whole stream, not the chunk.
    fn reposition(&self, err: FromHexError) -> FromHexError {
        match err {
            FromHexError::InvalidHexCharacter { c, index } => FromHexError::InvalidHexCharacter {
                c,
                index: self.consumed + index,
            },
            other => other,
        }
    }
}

/// Reads `source` to the end, returning its content as lowercase hex text.
pub fn encode_reader<R: Read>(mut source: R, chunk_size: usize) -> io::Result<String> {
    let mut out = String::new();
    let mut buf = vec![0u8; chunk_size.max(1)];
    loop {
        let read = match source.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => read,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        out.push_str(&hex::encode(&buf[..read]));
    }
    Ok(out)
}
