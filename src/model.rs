use std::fmt;
use std::io::Cursor;

use byteorder::ReadBytesExt;
use bytemuck::cast_vec;
use num_derive::FromPrimitive;

use crate::Error;

/**
 * Data model for the legacy VTK format reader.
 */

/// Widened identifier type. On the wire `vtkidtype` payloads are 32 bit
/// integers; they are widened to this type when materialized.
pub type IdType = i64;

/// Canonical name given to converted ghost-level arrays.
pub const GHOST_ARRAY_NAME: &str = "vtkGhostType";
/// Marker written for duplicated points when converting pre-4.0 ghost levels.
pub const DUPLICATE_POINT: u8 = 1;
/// Marker written for duplicated cells when converting pre-4.0 ghost levels.
pub const DUPLICATE_CELL: u8 = 1;

/// File version (e.g. `4.2 => Version { major: 4, minor: 2 }`).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Default)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
}

impl Version {
    pub fn new(pair: (u8, u8)) -> Self {
        Version {
            major: pair.0,
            minor: pair.1,
        }
    }

    /// Composed version number: `10 * major + minor`.
    pub fn as_number(self) -> u32 {
        10 * u32::from(self.major) + u32::from(self.minor)
    }
}

impl From<(u8, u8)> for Version {
    fn from(pair: (u8, u8)) -> Self {
        Version::new(pair)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// This enum indicates if bulk data is saved in binary.
/// NOTE: VTK files are saved in ASCII format with bulk data optionally saved in
/// Binary among ASCII type keywords. Binary data must be placed into the file
/// immediately after the "newline" (`\n`) character from the previous ASCII
/// keyword and parameter sequence.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum FileType {
    Binary,
    ASCII,
}

impl Default for FileType {
    fn default() -> FileType {
        FileType::ASCII
    }
}

/// Byte order of multi-byte words in a binary payload.
///
/// The legacy wire format is big endian; the little endian arm exists for
/// buffers produced by non-conforming writers.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ByteOrder {
    BigEndian,
    LittleEndian,
}

/// Element types recognized by the array reader.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ScalarType {
    /// Single bits, packed MSB-first into bytes.
    Bit,
    /// `char` / `signed_char` on disk.
    I8,
    /// `unsigned_char` on disk.
    U8,
    I16,
    U16,
    I32,
    U32,
    /// `vtktypeint64` on disk.
    I64,
    /// `vtktypeuint64` on disk.
    U64,
    /// Legacy `long` tag. The format does not record the writer's word
    /// width; this reader decodes 8 byte words (the LP64 convention).
    Long,
    /// Legacy `unsigned_long` tag, same width policy as `Long`.
    ULong,
    F32,
    F64,
    /// `vtkidtype` on disk: 32 bit on the wire, widened to [`IdType`].
    ///
    /// [`IdType`]: type.IdType.html
    Id,
    /// `string` / `utf8_string`: length-prefixed in binary, one
    /// percent-hex encoded value per line in ASCII.
    Str,
    /// `variant`: a type code and an encoded token per value, ASCII only.
    Variant,
}

impl ScalarType {
    /// Match a type tag as it appears on disk. Matching is case
    /// insensitive and prefix based, except `char`/`signed_char` which
    /// must match exactly so that they cannot shadow other tags.
    pub fn from_tag(tag: &str) -> Option<ScalarType> {
        let t = tag.to_ascii_lowercase();
        let ty = if t.starts_with("bit") {
            ScalarType::Bit
        } else if t == "char" || t == "signed_char" {
            ScalarType::I8
        } else if t.starts_with("unsigned_char") {
            ScalarType::U8
        } else if t.starts_with("short") {
            ScalarType::I16
        } else if t.starts_with("unsigned_short") {
            ScalarType::U16
        } else if t.starts_with("vtkidtype") {
            ScalarType::Id
        } else if t.starts_with("int") {
            ScalarType::I32
        } else if t.starts_with("unsigned_int") {
            ScalarType::U32
        } else if t.starts_with("vtktypeint64") {
            ScalarType::I64
        } else if t.starts_with("vtktypeuint64") {
            ScalarType::U64
        } else if t.starts_with("unsigned_long") {
            ScalarType::ULong
        } else if t.starts_with("long") {
            ScalarType::Long
        } else if t.starts_with("float") {
            ScalarType::F32
        } else if t.starts_with("double") {
            ScalarType::F64
        } else if t.starts_with("string") || t.starts_with("utf8_string") {
            ScalarType::Str
        } else if t.starts_with("variant") {
            ScalarType::Variant
        } else {
            return None;
        };
        Some(ty)
    }

    /// Size in bytes of one element in a binary payload, or `None` for
    /// kinds without a fixed wire width.
    pub fn wire_size(self) -> Option<usize> {
        match self {
            ScalarType::I8 | ScalarType::U8 => Some(1),
            ScalarType::I16 | ScalarType::U16 => Some(2),
            ScalarType::I32 | ScalarType::U32 | ScalarType::F32 | ScalarType::Id => Some(4),
            ScalarType::I64
            | ScalarType::U64
            | ScalarType::Long
            | ScalarType::ULong
            | ScalarType::F64 => Some(8),
            ScalarType::Bit | ScalarType::Str | ScalarType::Variant => None,
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            ScalarType::Bit => write!(f, "bit"),
            ScalarType::I8 => write!(f, "char"),
            ScalarType::U8 => write!(f, "unsigned_char"),
            ScalarType::I16 => write!(f, "short"),
            ScalarType::U16 => write!(f, "unsigned_short"),
            ScalarType::I32 => write!(f, "int"),
            ScalarType::U32 => write!(f, "unsigned_int"),
            ScalarType::I64 => write!(f, "vtktypeint64"),
            ScalarType::U64 => write!(f, "vtktypeuint64"),
            ScalarType::Long => write!(f, "long"),
            ScalarType::ULong => write!(f, "unsigned_long"),
            ScalarType::F32 => write!(f, "float"),
            ScalarType::F64 => write!(f, "double"),
            ScalarType::Id => write!(f, "vtkidtype"),
            ScalarType::Str => write!(f, "string"),
            ScalarType::Variant => write!(f, "variant"),
        }
    }
}

/// Data loaded from either binary or ASCII payloads.
///
/// A single tagged buffer whose arm carries a homogeneous vector of the
/// element type, so typed data can be passed around without the type being
/// known at compile time.
#[derive(Clone, PartialEq, Debug)]
pub enum IOBuffer {
    /// Bit array, packed MSB-first into bytes.
    Bit(Vec<u8>),
    U8(Vec<u8>),
    I8(Vec<i8>),
    U16(Vec<u16>),
    I16(Vec<i16>),
    U32(Vec<u32>),
    I32(Vec<i32>),
    U64(Vec<u64>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
    /// Widened identifiers.
    Id(Vec<IdType>),
    /// Decoded strings.
    Str(Vec<String>),
    /// Tagged variant values.
    Variant(Vec<Variant>),
}

impl Default for IOBuffer {
    fn default() -> IOBuffer {
        IOBuffer::F32(Vec::new())
    }
}

macro_rules! impl_io_buffer_convert {
    ($t:ident <=> $v:ident) => {
        impl From<Vec<$t>> for IOBuffer {
            fn from(v: Vec<$t>) -> IOBuffer {
                IOBuffer::$v(v)
            }
        }

        impl std::iter::FromIterator<$t> for IOBuffer {
            fn from_iter<T>(iter: T) -> Self
            where
                T: IntoIterator<Item = $t>,
            {
                iter.into_iter().collect::<Vec<$t>>().into()
            }
        }
    };
}

impl_io_buffer_convert!(u8 <=> U8);
impl_io_buffer_convert!(i8 <=> I8);
impl_io_buffer_convert!(u16 <=> U16);
impl_io_buffer_convert!(i16 <=> I16);
impl_io_buffer_convert!(u32 <=> U32);
impl_io_buffer_convert!(i32 <=> I32);
impl_io_buffer_convert!(u64 <=> U64);
impl_io_buffer_convert!(i64 <=> I64);
impl_io_buffer_convert!(f32 <=> F32);
impl_io_buffer_convert!(f64 <=> F64);

/// Evaluate the expression `$e` given a `Vec` `$v`.
#[macro_export]
macro_rules! match_buf {
    ($buf:expr; $v:pat => $e:expr) => {
        match $buf {
            IOBuffer::Bit($v) => $e,
            IOBuffer::U8($v) => $e,
            IOBuffer::I8($v) => $e,
            IOBuffer::U16($v) => $e,
            IOBuffer::I16($v) => $e,
            IOBuffer::U32($v) => $e,
            IOBuffer::I32($v) => $e,
            IOBuffer::U64($v) => $e,
            IOBuffer::I64($v) => $e,
            IOBuffer::F32($v) => $e,
            IOBuffer::F64($v) => $e,
            IOBuffer::Id($v) => $e,
            IOBuffer::Str($v) => $e,
            IOBuffer::Variant($v) => $e,
        }
    };
}

macro_rules! impl_bytes_constructor {
    ($bytes:ident, $bo:ident, $read:ident, $t:ty, $variant:ident) => {{
        let mut out: Vec<$t> =
            vec![num_traits::Zero::zero(); $bytes.len() / std::mem::size_of::<$t>()];
        let mut reader = Cursor::new($bytes);
        match $bo {
            ByteOrder::BigEndian => reader
                .$read::<byteorder::BE>(out.as_mut_slice())
                .map_err(|_| Error::TruncatedStream)?,
            ByteOrder::LittleEndian => reader
                .$read::<byteorder::LE>(out.as_mut_slice())
                .map_err(|_| Error::TruncatedStream)?,
        }
        Ok(IOBuffer::$variant(out))
    }};
}

impl IOBuffer {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            IOBuffer::Bit(_) => ScalarType::Bit,
            IOBuffer::U8(_) => ScalarType::U8,
            IOBuffer::I8(_) => ScalarType::I8,
            IOBuffer::U16(_) => ScalarType::U16,
            IOBuffer::I16(_) => ScalarType::I16,
            IOBuffer::U32(_) => ScalarType::U32,
            IOBuffer::I32(_) => ScalarType::I32,
            IOBuffer::U64(_) => ScalarType::U64,
            IOBuffer::I64(_) => ScalarType::I64,
            IOBuffer::F32(_) => ScalarType::F32,
            IOBuffer::F64(_) => ScalarType::F64,
            IOBuffer::Id(_) => ScalarType::Id,
            IOBuffer::Str(_) => ScalarType::Str,
            IOBuffer::Variant(_) => ScalarType::Variant,
        }
    }

    /// Number of stored values. For `Bit` buffers this is the packed byte
    /// count; the owning array knows the logical bit count.
    pub fn len(&self) -> usize {
        match_buf!(self; v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True for buffers holding whole numbers (including identifiers).
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            IOBuffer::U8(_)
                | IOBuffer::I8(_)
                | IOBuffer::U16(_)
                | IOBuffer::I16(_)
                | IOBuffer::U32(_)
                | IOBuffer::I32(_)
                | IOBuffer::U64(_)
                | IOBuffer::I64(_)
                | IOBuffer::Id(_)
        )
    }

    /// Value of the `i`-th bit of a `Bit` buffer. Bits are packed
    /// MSB-first within each byte.
    pub fn bit(&self, i: usize) -> Option<u8> {
        if let IOBuffer::Bit(bytes) = self {
            bytes.get(i >> 3).map(|b| (b >> (7 - (i & 7))) & 1)
        } else {
            None
        }
    }

    /// Construct an `IOBuffer` from raw payload bytes and a corresponding
    /// scalar type. Multi-byte words are swapped from `bo` to host order.
    pub fn from_bytes(
        bytes: Vec<u8>,
        scalar_type: ScalarType,
        bo: ByteOrder,
    ) -> Result<Self, Error> {
        match scalar_type {
            ScalarType::Bit => Ok(IOBuffer::Bit(bytes)),
            ScalarType::U8 => Ok(IOBuffer::U8(bytes)),
            ScalarType::I8 => Ok(IOBuffer::I8(cast_vec(bytes))),
            ScalarType::I16 => IOBuffer::i16_from_bytes(bytes, bo),
            ScalarType::U16 => IOBuffer::u16_from_bytes(bytes, bo),
            ScalarType::I32 => IOBuffer::i32_from_bytes(bytes, bo),
            ScalarType::U32 => IOBuffer::u32_from_bytes(bytes, bo),
            ScalarType::I64 | ScalarType::Long => IOBuffer::i64_from_bytes(bytes, bo),
            ScalarType::U64 | ScalarType::ULong => IOBuffer::u64_from_bytes(bytes, bo),
            ScalarType::F32 => IOBuffer::f32_from_bytes(bytes, bo),
            ScalarType::F64 => IOBuffer::f64_from_bytes(bytes, bo),
            ScalarType::Id => {
                // 32 bit on the wire, widened on materialization.
                let ids = match IOBuffer::i32_from_bytes(bytes, bo)? {
                    IOBuffer::I32(v) => v.into_iter().map(IdType::from).collect(),
                    _ => Vec::new(),
                };
                Ok(IOBuffer::Id(ids))
            }
            ScalarType::Str | ScalarType::Variant => {
                Err(Error::InvalidArrayType(scalar_type.to_string()))
            }
        }
    }

    /// Construct an `IOBuffer` with `u16` elements from the given bytes.
    pub fn u16_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_u16_into, u16, U16)
    }
    /// Construct an `IOBuffer` with `i16` elements from the given bytes.
    pub fn i16_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_i16_into, i16, I16)
    }
    /// Construct an `IOBuffer` with `u32` elements from the given bytes.
    pub fn u32_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_u32_into, u32, U32)
    }
    /// Construct an `IOBuffer` with `i32` elements from the given bytes.
    pub fn i32_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_i32_into, i32, I32)
    }
    /// Construct an `IOBuffer` with `u64` elements from the given bytes.
    pub fn u64_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_u64_into, u64, U64)
    }
    /// Construct an `IOBuffer` with `i64` elements from the given bytes.
    pub fn i64_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_i64_into, i64, I64)
    }
    /// Construct an `IOBuffer` with `f32` elements from the given bytes.
    pub fn f32_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_f32_into, f32, F32)
    }
    /// Construct an `IOBuffer` with `f64` elements from the given bytes.
    pub fn f64_from_bytes(bytes: Vec<u8>, bo: ByteOrder) -> Result<Self, Error> {
        impl_bytes_constructor!(bytes, bo, read_f64_into, f64, F64)
    }

    /// Returns an iterator over elements with type `T`, or `None` on a
    /// type mismatch.
    pub fn iter<T: Scalar>(&self) -> Option<std::slice::Iter<T>> {
        T::io_buf_vec_ref(self).map(|v| v.iter())
    }

    /// Converts this buffer into the underlying `Vec` representation, or
    /// `None` on a type mismatch.
    pub fn into_vec<T: Scalar>(self) -> Option<Vec<T>> {
        T::io_buf_into_vec(self)
    }
}

pub trait Scalar
where
    Self: Sized,
{
    fn io_buf_vec_ref(io_buf: &IOBuffer) -> Option<&Vec<Self>>;
    fn io_buf_into_vec(io_buf: IOBuffer) -> Option<Vec<Self>>;
}

macro_rules! impl_scalar {
    ($t:ty, $v:ident) => {
        impl Scalar for $t {
            fn io_buf_vec_ref(io_buf: &IOBuffer) -> Option<&Vec<Self>> {
                match io_buf {
                    IOBuffer::$v(v) => Some(v),
                    _ => None,
                }
            }
            fn io_buf_into_vec(io_buf: IOBuffer) -> Option<Vec<Self>> {
                match io_buf {
                    IOBuffer::$v(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_scalar!(u8, U8);
impl_scalar!(i8, I8);
impl_scalar!(u16, U16);
impl_scalar!(i16, I16);
impl_scalar!(u32, U32);
impl_scalar!(i32, I32);
impl_scalar!(u64, U64);
impl_scalar!(i64, I64);
impl_scalar!(f32, F32);
impl_scalar!(f64, F64);
impl_scalar!(String, Str);
impl_scalar!(Variant, Variant);

/// Type codes carried by `variant` payloads, one per scalar element kind.
#[derive(Copy, Clone, PartialEq, Eq, Debug, FromPrimitive)]
pub enum VariantType {
    Char = 2,
    UnsignedChar = 3,
    Short = 4,
    UnsignedShort = 5,
    Int = 6,
    UnsignedInt = 7,
    Long = 8,
    UnsignedLong = 9,
    Float = 10,
    Double = 11,
    IdType = 12,
    String = 13,
    SignedChar = 15,
    LongLong = 16,
    UnsignedLongLong = 17,
}

/// One decoded `variant` value.
#[derive(Clone, PartialEq, Debug)]
pub enum Variant {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    String(String),
}

/// A typed information value attached to an array.
#[derive(Clone, PartialEq, Debug)]
pub enum InfoValue {
    Double(f64),
    DoubleVector(Vec<f64>),
    Id(IdType),
    Integer(i32),
    IntegerVector(Vec<i32>),
    String(String),
    StringVector(Vec<String>),
    UnsignedLong(u64),
}

/// One deserialized information entry, identified by a registered key.
#[derive(Clone, PartialEq, Debug)]
pub struct InfoEntry {
    pub location: String,
    pub name: String,
    pub value: InfoValue,
}

/// The information entries deserialized from an array's METADATA tail.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Information {
    pub entries: Vec<InfoEntry>,
}

impl Information {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get(&self, location: &str, name: &str) -> Option<&InfoValue> {
        self.entries
            .iter()
            .find(|e| e.location == location && e.name == name)
            .map(|e| &e.value)
    }

    pub fn push(&mut self, location: String, name: String, value: InfoValue) {
        self.entries.push(InfoEntry {
            location,
            name,
            value,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// An RGBA color table attached to a scalars slot.
#[derive(Clone, PartialEq, Debug)]
pub struct LookupTable {
    pub name: String,
    /// Flat RGBA bytes, four per table entry.
    pub colors: Vec<u8>,
}

impl LookupTable {
    pub fn num_colors(&self) -> usize {
        self.colors.len() / 4
    }
}

/// A named array of elements, stored as contiguous tuples of `num_comp`
/// components each.
#[derive(Clone, PartialEq, Debug)]
pub struct DataArray {
    pub name: String,
    pub num_tuples: usize,
    pub num_comp: usize,
    /// A contiguous typed storage buffer holding the attribute values.
    pub data: IOBuffer,
    /// Per-component labels from a COMPONENT_NAMES metadata entry. Empty
    /// when the array carried none.
    pub component_names: Vec<String>,
    /// Typed key/value entries from an INFORMATION metadata entry.
    pub information: Information,
    /// Color table attached by a LOOKUP_TABLE section (scalars only).
    pub lookup_table: Option<LookupTable>,
}

impl Default for DataArray {
    fn default() -> DataArray {
        DataArray {
            name: String::new(),
            num_tuples: 0,
            num_comp: 1,
            data: IOBuffer::default(),
            component_names: Vec::new(),
            information: Information::new(),
            lookup_table: None,
        }
    }
}

impl DataArray {
    pub fn new(
        name: impl Into<String>,
        num_tuples: usize,
        num_comp: usize,
        data: IOBuffer,
    ) -> Self {
        DataArray {
            name: name.into(),
            num_tuples,
            num_comp,
            data,
            ..Default::default()
        }
    }

    pub fn scalar_type(&self) -> ScalarType {
        self.data.scalar_type()
    }

    /// Total number of logical values: `num_tuples * num_comp`.
    pub fn len(&self) -> usize {
        self.num_tuples * self.num_comp
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Attribute container for one association scope.
///
/// Each designated slot holds at most one array; arrays displaced by a
/// filled slot or a name filter land in `arrays` when the matching
/// read-all toggle is on.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct DataSetAttributes {
    pub scalars: Option<DataArray>,
    pub vectors: Option<DataArray>,
    pub normals: Option<DataArray>,
    pub tensors: Option<DataArray>,
    pub tcoords: Option<DataArray>,
    pub global_ids: Option<DataArray>,
    pub pedigree_ids: Option<DataArray>,
    pub edge_flags: Option<DataArray>,
    /// Extra arrays: read-all spillover and field-data members.
    pub arrays: Vec<DataArray>,
}

impl DataSetAttributes {
    pub fn new() -> Self {
        Default::default()
    }
}

/// Attribute containers for all five association scopes.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct Attributes {
    pub point: DataSetAttributes,
    pub cell: DataSetAttributes,
    pub vertex: DataSetAttributes,
    pub edge: DataSetAttributes,
    pub row: DataSetAttributes,
}

impl Attributes {
    pub fn new() -> Self {
        Default::default()
    }
}

/// Association of an attribute with the dataset's points, cells, graph
/// vertices, graph edges, or table rows.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AttributeScope {
    Point,
    Cell,
    Vertex,
    Edge,
    Row,
}

impl AttributeScope {
    /// The scope's container on the full sink.
    pub fn attributes(self, all: &mut Attributes) -> &mut DataSetAttributes {
        match self {
            AttributeScope::Point => &mut all.point,
            AttributeScope::Cell => &mut all.cell,
            AttributeScope::Vertex => &mut all.vertex,
            AttributeScope::Edge => &mut all.edge,
            AttributeScope::Row => &mut all.row,
        }
    }

    /// Legal cross-scope transition inside a keyword loop: the section
    /// keyword announcing the sibling scope, and that scope. Rows have
    /// none.
    pub(crate) fn sibling(self) -> Option<(&'static str, AttributeScope)> {
        match self {
            AttributeScope::Point => Some(("cell_data", AttributeScope::Cell)),
            AttributeScope::Cell => Some(("point_data", AttributeScope::Point)),
            AttributeScope::Vertex => Some(("edge_data", AttributeScope::Edge)),
            AttributeScope::Edge => Some(("vertex_data", AttributeScope::Vertex)),
            AttributeScope::Row => None,
        }
    }
}

impl fmt::Display for AttributeScope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AttributeScope::Point => write!(f, "point"),
            AttributeScope::Cell => write!(f, "cell"),
            AttributeScope::Vertex => write!(f, "vertex"),
            AttributeScope::Edge => write!(f, "edge"),
            AttributeScope::Row => write!(f, "row"),
        }
    }
}

/// A group of independently typed arrays read from a FIELD section.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct FieldData {
    pub name: String,
    pub arrays: Vec<DataArray>,
}

/// Cell connectivity in offsets/connectivity form.
///
/// `offsets` is non-decreasing starting at 0 with one entry per cell plus
/// one; `connectivity` holds the concatenated point ids.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct CellArray {
    pub offsets: IOBuffer,
    pub connectivity: IOBuffer,
}

impl CellArray {
    pub fn num_cells(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.len() <= 1
    }
}

/// A contiguous sub-range of a legacy flat cell stream: cells to skip
/// before, cells to read, and cells to skip after.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct PieceWindow {
    pub skip_before: usize,
    pub read: usize,
    pub skip_after: usize,
}
