use byteorder::{BigEndian, ByteOrder};

use crate::{Error, Result};

/// Upper bound on token and line reads, matching the fixed scratch
/// buffers the format was designed around.
const READ_LIMIT: usize = 255;

/// Parse one primitive value from an ASCII token.
///
/// Integer and float parsing is period-decimal regardless of the process
/// locale. The `i8`/`u8` impls go through `i32` and keep only the low
/// byte; out-of-range tokens are truncated, not rejected, which is what
/// files in the wild rely on.
pub trait FromAscii
where
    Self: Sized,
{
    fn from_ascii(token: &str) -> Option<Self>;
}

macro_rules! impl_from_ascii {
    ($($t:ty),*) => {
        $(impl FromAscii for $t {
            fn from_ascii(token: &str) -> Option<Self> {
                token.parse().ok()
            }
        })*
    };
}

impl_from_ascii!(i16, u16, i32, u32, i64, u64, f32, f64, usize);

impl FromAscii for i8 {
    fn from_ascii(token: &str) -> Option<Self> {
        token.parse::<i32>().ok().map(|v| v as i8)
    }
}

impl FromAscii for u8 {
    fn from_ascii(token: &str) -> Option<Self> {
        token.parse::<i32>().ok().map(|v| v as u8)
    }
}

/// Scanner over a fully buffered source.
///
/// Reads whitespace-delimited tokens and whole lines for the ASCII parts
/// of a file, and raw blocks plus big-endian words for binary payloads.
/// `peek` never moves the position.
#[derive(Debug)]
pub struct Tokenizer {
    data: Vec<u8>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(data: Vec<u8>) -> Self {
        Tokenizer { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn at_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Skip over any run of ASCII whitespace.
    pub fn skip_whitespace(&mut self) {
        while let Some(b) = self.data.get(self.pos) {
            if !b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
    }

    /// Skip spaces, carriage returns and newlines. Used to resynchronize
    /// between an array payload and its optional metadata tail.
    pub fn skip_separators(&mut self) {
        while let Some(&b) = self.data.get(self.pos) {
            if b != b' ' && b != b'\r' && b != b'\n' {
                break;
            }
            self.pos += 1;
        }
    }

    /// Read one line. At most 255 characters are kept; the remainder of
    /// an overlong line is discarded. A trailing `'\r'` is stripped. The
    /// final line of the input may lack its newline.
    pub fn read_line(&mut self) -> Result<String> {
        if self.at_eof() {
            return Err(Error::TruncatedStream);
        }
        let mut out: Vec<u8> = Vec::new();
        while let Some(&b) = self.data.get(self.pos) {
            self.pos += 1;
            if b == b'\n' {
                break;
            }
            if out.len() < READ_LIMIT {
                out.push(b);
            }
        }
        if out.last() == Some(&b'\r') {
            out.pop();
        }
        Ok(String::from_utf8_lossy(&out).into_owned())
    }

    /// Read one whitespace-delimited token of at most 255 characters.
    /// An overlong token is split; the remainder is left for the next
    /// read. Never consumes past the token into following input.
    pub fn read_token(&mut self) -> Result<String> {
        self.skip_whitespace();
        if self.at_eof() {
            return Err(Error::TruncatedStream);
        }
        let start = self.pos;
        while let Some(b) = self.data.get(self.pos) {
            if b.is_ascii_whitespace() || self.pos - start >= READ_LIMIT {
                break;
            }
            self.pos += 1;
        }
        Ok(String::from_utf8_lossy(&self.data[start..self.pos]).into_owned())
    }

    /// Skip whitespace and parse one primitive value.
    pub fn read_primitive<T: FromAscii>(&mut self) -> Result<T> {
        let token = self.read_token()?;
        T::from_ascii(&token).ok_or(Error::MalformedNumber(token))
    }

    /// Read exactly `n` raw bytes.
    pub fn read_block(&mut self, n: usize) -> Result<Vec<u8>> {
        if self.data.len() - self.pos < n {
            self.pos = self.data.len();
            return Err(Error::TruncatedStream);
        }
        let out = self.data[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(out)
    }

    pub fn read_byte(&mut self) -> Result<u8> {
        let b = *self.data.get(self.pos).ok_or(Error::TruncatedStream)?;
        self.pos += 1;
        Ok(b)
    }

    pub fn read_be_u16(&mut self) -> Result<u16> {
        let block = self.read_block(2)?;
        Ok(BigEndian::read_u16(&block))
    }

    pub fn read_be_u32(&mut self) -> Result<u32> {
        let block = self.read_block(4)?;
        Ok(BigEndian::read_u32(&block))
    }

    pub fn read_be_u64(&mut self) -> Result<u64> {
        let block = self.read_block(8)?;
        Ok(BigEndian::read_u64(&block))
    }

    /// Look at up to `n` upcoming bytes without advancing.
    pub fn peek(&self, n: usize) -> &[u8] {
        let end = (self.pos + n).min(self.data.len());
        &self.data[self.pos..end]
    }
}
