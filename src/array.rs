use log::warn;
use num_traits::FromPrimitive;

use crate::coding::decode_string;
use crate::model::{
    ByteOrder, DataArray, FileType, IOBuffer, IdType, ScalarType, Variant, VariantType,
};
use crate::reader::Reader;
use crate::{Error, Result};

impl Reader {
    /// Read one typed array: `num_tuples * num_comp` values of the type
    /// named by `type_tag`, followed by an optional METADATA tail.
    pub fn read_array(
        &mut self,
        type_tag: &str,
        num_tuples: usize,
        num_comp: usize,
    ) -> Result<DataArray> {
        let r = self.typed_array(type_tag, num_tuples, num_comp);
        self.seal(r)
    }

    pub(crate) fn typed_array(
        &mut self,
        type_tag: &str,
        num_tuples: usize,
        num_comp: usize,
    ) -> Result<DataArray> {
        let scalar_type = ScalarType::from_tag(type_tag)
            .ok_or_else(|| Error::InvalidArrayType(type_tag.to_string()))?;
        let total = num_tuples * num_comp;
        let data = match scalar_type {
            ScalarType::Bit => self.bit_data(total)?,
            ScalarType::Str => self.string_data(total)?,
            ScalarType::Variant => self.variant_data(total)?,
            numeric => self.numeric_data(numeric, total)?,
        };
        let mut array = DataArray {
            num_tuples,
            num_comp,
            data,
            ..Default::default()
        };
        self.metadata_tail(&mut array)?;
        Ok(array)
    }

    fn numeric_data(&mut self, scalar_type: ScalarType, total: usize) -> Result<IOBuffer> {
        match self.file_type {
            FileType::Binary => {
                if total == 0 {
                    return IOBuffer::from_bytes(Vec::new(), scalar_type, ByteOrder::BigEndian);
                }
                // the newline separating the payload from its header
                self.read_line()?;
                let size = scalar_type
                    .wire_size()
                    .ok_or_else(|| Error::InvalidArrayType(scalar_type.to_string()))?;
                let bytes = self.read_block(total * size)?;
                IOBuffer::from_bytes(bytes, scalar_type, ByteOrder::BigEndian)
            }
            FileType::ASCII => self.ascii_data(scalar_type, total),
        }
    }

    fn ascii_data(&mut self, scalar_type: ScalarType, total: usize) -> Result<IOBuffer> {
        macro_rules! fill {
            ($t:ty) => {{
                let mut values: Vec<$t> = Vec::with_capacity(total);
                for _ in 0..total {
                    values.push(self.read_primitive()?);
                }
                Ok(IOBuffer::from(values))
            }};
        }
        match scalar_type {
            ScalarType::I8 => fill!(i8),
            ScalarType::U8 => fill!(u8),
            ScalarType::I16 => fill!(i16),
            ScalarType::U16 => fill!(u16),
            ScalarType::I32 => fill!(i32),
            ScalarType::U32 => fill!(u32),
            ScalarType::I64 | ScalarType::Long => fill!(i64),
            ScalarType::U64 | ScalarType::ULong => fill!(u64),
            ScalarType::F32 => fill!(f32),
            ScalarType::F64 => fill!(f64),
            ScalarType::Id => {
                // 32 bit in the file, widened on materialization
                let mut values = Vec::with_capacity(total);
                for _ in 0..total {
                    let v: i32 = self.read_primitive()?;
                    values.push(IdType::from(v));
                }
                Ok(IOBuffer::Id(values))
            }
            other => Err(Error::InvalidArrayType(other.to_string())),
        }
    }

    fn bit_data(&mut self, total: usize) -> Result<IOBuffer> {
        if total == 0 {
            return Ok(IOBuffer::Bit(Vec::new()));
        }
        match self.file_type {
            FileType::Binary => {
                self.read_line()?;
                let bytes = self.read_block((total + 7) / 8)?;
                Ok(IOBuffer::Bit(bytes))
            }
            FileType::ASCII => {
                let mut bytes = vec![0u8; (total + 7) / 8];
                for i in 0..total {
                    let bit: i64 = self.read_primitive()?;
                    if bit != 0 {
                        bytes[i >> 3] |= 1 << (7 - (i & 7));
                    }
                }
                Ok(IOBuffer::Bit(bytes))
            }
        }
    }

    /// String values: length-prefixed raw bytes in binary, one
    /// percent-hex encoded value per line in ASCII.
    fn string_data(&mut self, total: usize) -> Result<IOBuffer> {
        // the line break following the header
        self.read_line()?;
        let mut values = Vec::with_capacity(total);
        match self.file_type {
            FileType::Binary => {
                for _ in 0..total {
                    let first = self.read_byte()?;
                    // The top two bits of the first byte select the
                    // length encoding; length words are big endian with
                    // their top two bits masked off.
                    let length = match first >> 6 {
                        3 => usize::from(first & 0x3f),
                        2 => usize::from(self.read_be_u16()? & 0x3fff),
                        1 => (self.read_be_u32()? & 0x3fff_ffff) as usize,
                        _ => self.read_be_u64()? as usize,
                    };
                    let bytes = self.read_block(length)?;
                    values.push(String::from_utf8_lossy(&bytes).into_owned());
                }
            }
            FileType::ASCII => {
                for _ in 0..total {
                    let line = self.read_line()?;
                    values.push(decode_string(&line));
                }
            }
        }
        Ok(IOBuffer::Str(values))
    }

    /// Variant values: a type code and a percent-hex encoded token per
    /// value.
    fn variant_data(&mut self, total: usize) -> Result<IOBuffer> {
        let mut values = Vec::with_capacity(total);
        for _ in 0..total {
            let code: i32 = self.read_primitive()?;
            let token = self.read_token()?;
            let text = decode_string(&token);
            let variant_type = VariantType::from_i32(code)
                .ok_or_else(|| Error::InvalidArrayType(format!("variant type code {}", code)))?;
            values.push(parse_variant(variant_type, &text)?);
        }
        Ok(IOBuffer::Variant(values))
    }

    /// Consume the optional METADATA block following an array payload.
    ///
    /// Inter-array whitespace is swallowed first; if the next eight bytes
    /// do not spell "metadata" the stream is left right there. A blank
    /// line (or the end of the input) terminates the block.
    fn metadata_tail(&mut self, array: &mut DataArray) -> Result<()> {
        {
            let tok = self.tok()?;
            tok.skip_separators();
            let peeked = tok.peek(8);
            if peeked.len() < 8 || !peeked.eq_ignore_ascii_case(b"metadata") {
                return Ok(());
            }
        }
        self.read_line()?;
        loop {
            let line = match self.read_line() {
                Ok(line) => line,
                Err(_) => break,
            };
            if line.is_empty() {
                break;
            }
            let lower = line.to_ascii_lowercase();
            if lower.starts_with("component_names") {
                let mut names = Vec::with_capacity(array.num_comp);
                for i in 0..array.num_comp {
                    match self.read_line() {
                        Ok(name) => names.push(decode_string(&name)),
                        Err(_) => {
                            warn!("missing component name {} in metadata block", i);
                            break;
                        }
                    }
                }
                array.component_names = names;
            } else if lower.starts_with("information") {
                match lower
                    .split_whitespace()
                    .nth(1)
                    .and_then(|n| n.parse::<usize>().ok())
                {
                    Some(num_keys) => {
                        let info = self.information_block(num_keys)?;
                        array.information.entries.extend(info.entries);
                    }
                    None => warn!("invalid information header: {:?}", line),
                }
            } else {
                warn!("unrecognized metadata entry: {:?}", line);
            }
        }
        Ok(())
    }
}

fn parse_variant(variant_type: VariantType, text: &str) -> Result<Variant> {
    use crate::tokenizer::FromAscii;
    macro_rules! number {
        ($t:ty, $v:ident) => {
            <$t>::from_ascii(text)
                .map(Variant::$v)
                .ok_or_else(|| Error::MalformedNumber(text.to_string()))
        };
    }
    match variant_type {
        VariantType::Char | VariantType::SignedChar => number!(i8, I8),
        VariantType::UnsignedChar => number!(u8, U8),
        VariantType::Short => number!(i16, I16),
        VariantType::UnsignedShort => number!(u16, U16),
        VariantType::Int => number!(i32, I32),
        VariantType::UnsignedInt => number!(u32, U32),
        VariantType::Long | VariantType::LongLong | VariantType::IdType => number!(i64, I64),
        VariantType::UnsignedLong | VariantType::UnsignedLongLong => number!(u64, U64),
        VariantType::Float => number!(f32, F32),
        VariantType::Double => number!(f64, F64),
        VariantType::String => Ok(Variant::String(text.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ascii_reader(payload: &str) -> Reader {
        let input = format!(
            "# vtk DataFile Version 4.2\nt\nASCII\n{}",
            payload
        );
        let mut reader = Reader::from_buffer(input.into_bytes());
        reader.open().unwrap();
        reader.read_header().unwrap();
        reader
    }

    fn binary_reader(payload: &[u8]) -> Reader {
        let mut input = b"# vtk DataFile Version 4.2\nt\nBINARY\n".to_vec();
        input.extend_from_slice(payload);
        let mut reader = Reader::from_buffer(input);
        reader.open().unwrap();
        reader.read_header().unwrap();
        reader
    }

    #[test]
    fn ascii_floats() {
        let mut reader = ascii_reader("3.5 -1\n");
        let array = reader.read_array("float", 2, 1).unwrap();
        assert_eq!(array.data, IOBuffer::F32(vec![3.5, -1.0]));
        assert_eq!(array.len(), 2);
    }

    #[test]
    fn ascii_char_truncates_like_atoi() {
        let mut reader = ascii_reader("300 -1 7\n");
        let array = reader.read_array("unsigned_char", 3, 1).unwrap();
        assert_eq!(array.data, IOBuffer::U8(vec![44, 255, 7]));
    }

    #[test]
    fn binary_int_is_byte_swapped() {
        // The encoding line's newline doubles as the payload preamble
        // here; read_array consumes it, then one big-endian i32.
        let mut reader = binary_reader(b"\x00\x00\x00\x2a");
        let array = reader.read_array("int", 1, 1).unwrap();
        assert_eq!(array.data, IOBuffer::I32(vec![42]));
    }

    #[test]
    fn binary_empty_array_reads_no_preamble() {
        let mut reader = binary_reader(b"");
        let array = reader.read_array("double", 0, 3).unwrap();
        assert_eq!(array.data, IOBuffer::F64(vec![]));
    }

    #[test]
    fn binary_truncated_payload_fails() {
        let mut reader = binary_reader(b"\x00\x00");
        match reader.read_array("int", 1, 1) {
            Err(Error::TruncatedStream) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let mut reader = ascii_reader("1 2 3\n");
        match reader.read_array("quaternion", 3, 1) {
            Err(Error::InvalidArrayType(tag)) => assert_eq!(tag, "quaternion"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn ascii_bits_pack_msb_first() {
        let mut reader = ascii_reader("1 0 1 0 0 0 0 1 1\n");
        let array = reader.read_array("bit", 9, 1).unwrap();
        assert_eq!(array.data, IOBuffer::Bit(vec![0b1010_0001, 0b1000_0000]));
    }

    #[test]
    fn binary_bits_consume_packed_bytes() {
        let mut reader = binary_reader(b"\xa1\x80rest");
        let array = reader.read_array("bit", 9, 1).unwrap();
        assert_eq!(array.data, IOBuffer::Bit(vec![0xa1, 0x80]));
        assert_eq!(reader.read_token().unwrap(), "rest");
    }

    #[test]
    fn binary_string_length_headers() {
        // H=3: length in the low six bits of the flag byte.
        // H=2: two further big-endian bytes, top two bits masked.
        let mut reader = binary_reader(b"\xc3abc\x80\x00\x04wxyz");
        let array = reader.read_array("string", 2, 1).unwrap();
        assert_eq!(
            array.data,
            IOBuffer::Str(vec![String::from("abc"), String::from("wxyz")])
        );
    }

    #[test]
    fn ascii_strings_decode_percent_escapes() {
        let mut reader = ascii_reader("my%20name%2E\nplain\n");
        let array = reader.read_array("string", 2, 1).unwrap();
        assert_eq!(
            array.data,
            IOBuffer::Str(vec![String::from("my name."), String::from("plain")])
        );
    }

    #[test]
    fn variants_parse_per_type_code() {
        let mut reader = ascii_reader("6 42 10 1.5 13 two%20words\n");
        let array = reader.read_array("variant", 3, 1).unwrap();
        assert_eq!(
            array.data,
            IOBuffer::Variant(vec![
                Variant::I32(42),
                Variant::F32(1.5),
                Variant::String(String::from("two words")),
            ])
        );
    }

    #[test]
    fn metadata_component_names() {
        let mut reader = ascii_reader("1 2\nMETADATA\nCOMPONENT_NAMES\nx\ny\n\nrest");
        let array = reader.read_array("float", 1, 2).unwrap();
        assert_eq!(array.component_names, vec!["x", "y"]);
        assert_eq!(reader.read_token().unwrap(), "rest");
    }

    #[test]
    fn metadata_tolerates_eof_in_place_of_blank_line() {
        let mut reader = ascii_reader("1 2\nMETADATA\nCOMPONENT_NAMES\nx\ny\n");
        let array = reader.read_array("float", 1, 2).unwrap();
        assert_eq!(array.component_names, vec!["x", "y"]);
    }

    #[test]
    fn metadata_unknown_entries_are_skipped() {
        let mut reader = ascii_reader("5\nMETADATA\nSOMETHING else\n\nrest");
        let array = reader.read_array("int", 1, 1).unwrap();
        assert!(array.component_names.is_empty());
        assert_eq!(reader.read_token().unwrap(), "rest");
    }

    #[test]
    fn no_metadata_leaves_stream_alone() {
        let mut reader = ascii_reader("5\nSCALARS s float\n");
        let array = reader.read_array("int", 1, 1).unwrap();
        assert!(array.information.is_empty());
        assert_eq!(reader.read_token().unwrap(), "SCALARS");
    }
}
