use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::model::{FileType, Version};
use crate::tokenizer::{FromAscii, Tokenizer};
use crate::{Error, ErrorKind, Result};

/// Newest file version this reader understands. Newer files are read
/// anyway, with a warning.
pub const MAX_FILE_VERSION: Version = Version { major: 5, minor: 1 };

const HEADER_PREFIX: &str = "# vtk DataFile Version";

/// Attribute kinds that carry a name filter and a read-all toggle.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AttributeKind {
    Scalars,
    Vectors,
    Normals,
    Tensors,
    TCoords,
    ColorScalars,
    Fields,
}

const NUM_KINDS: usize = 7;

#[derive(Clone, Debug, Default)]
struct KindConfig {
    name: Option<String>,
    read_all: bool,
}

/// Attribute names found by the characterization pre-scan, one list per
/// header keyword kind.
#[derive(Clone, Debug, Default)]
struct Characteristics {
    scalars: Vec<String>,
    vectors: Vec<String>,
    tensors: Vec<String>,
    normals: Vec<String>,
    tcoords: Vec<String>,
    fields: Vec<String>,
}

impl Characteristics {
    fn prepare() -> Self {
        Characteristics {
            scalars: Vec::with_capacity(25),
            vectors: Vec::with_capacity(25),
            tensors: Vec::with_capacity(25),
            normals: Vec::with_capacity(25),
            tcoords: Vec::with_capacity(25),
            fields: Vec::with_capacity(25),
        }
    }
}

/// The reading facade.
///
/// A `Reader` owns its source (a file name or a caller-supplied buffer,
/// exactly one active at a time), the per-kind name filters and read-all
/// toggles, and the parsed header state. The source is buffered in full
/// on [`open`], so binary payloads are read from the same position the
/// ASCII headers were tokenized from, and numeric parsing is
/// period-decimal regardless of the process locale.
///
/// A single `Reader` is not meant to be driven from multiple threads;
/// distinct instances are independent.
///
/// [`open`]: struct.Reader.html#method.open
#[derive(Debug, Default)]
pub struct Reader {
    file_name: Option<PathBuf>,
    input_buffer: Option<Vec<u8>>,
    pub(crate) source: Option<Tokenizer>,
    pub(crate) file_type: FileType,
    pub(crate) version: Version,
    title: String,
    kinds: [KindConfig; NUM_KINDS],
    lookup_table_name: Option<String>,
    pub(crate) scalar_lut: Option<String>,
    last_error: Option<ErrorKind>,
    characteristics: Option<Characteristics>,
    modified: u64,
    scanned: u64,
}

impl Reader {
    pub fn new() -> Self {
        Default::default()
    }

    /// A reader configured to read from the file at `path`.
    pub fn from_file(path: impl AsRef<Path>) -> Self {
        let mut reader = Reader::new();
        reader.set_file_name(path);
        reader
    }

    /// A reader configured to read from an in-memory buffer.
    pub fn from_buffer(buffer: impl Into<Vec<u8>>) -> Self {
        let mut reader = Reader::new();
        reader.set_input_buffer(buffer);
        reader
    }

    /// Read from the file at `path`. Deactivates any input buffer.
    pub fn set_file_name(&mut self, path: impl AsRef<Path>) {
        self.file_name = Some(path.as_ref().to_path_buf());
        self.input_buffer = None;
        self.touch();
    }

    pub fn file_name(&self) -> Option<&Path> {
        self.file_name.as_deref()
    }

    /// Read from the given bytes (or characters). Deactivates any file
    /// name.
    pub fn set_input_buffer(&mut self, buffer: impl Into<Vec<u8>>) {
        self.input_buffer = Some(buffer.into());
        self.file_name = None;
        self.touch();
    }

    /// Restrict the named attribute kind to arrays with this exact
    /// decoded name; `None` removes the restriction.
    pub fn set_filter(&mut self, kind: AttributeKind, name: Option<&str>) {
        self.kinds[kind as usize].name = name.map(String::from);
        self.touch();
    }

    pub fn filter(&self, kind: AttributeKind) -> Option<&str> {
        self.kinds[kind as usize].name.as_deref()
    }

    /// When on, arrays displaced by a filled slot or a name filter are
    /// kept as named extras instead of dropped.
    pub fn set_read_all(&mut self, kind: AttributeKind, on: bool) {
        self.kinds[kind as usize].read_all = on;
        self.touch();
    }

    pub fn read_all(&self, kind: AttributeKind) -> bool {
        self.kinds[kind as usize].read_all
    }

    /// Only attach lookup tables with this name; `None` attaches any.
    pub fn set_lookup_table_name(&mut self, name: Option<&str>) {
        self.lookup_table_name = name.map(String::from);
        self.touch();
    }

    pub(crate) fn lookup_table_filter(&self) -> Option<&str> {
        self.lookup_table_name.as_deref()
    }

    /// Version parsed from the header, `0.0` before [`read_header`].
    ///
    /// [`read_header`]: struct.Reader.html#method.read_header
    pub fn version(&self) -> Version {
        self.version
    }

    /// Title line of the header, verbatim.
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn file_type(&self) -> FileType {
        self.file_type
    }

    /// The kind of the most recent failure, if any.
    pub fn last_error(&self) -> Option<ErrorKind> {
        self.last_error
    }

    fn touch(&mut self) {
        self.modified += 1;
    }

    /// Acquire the configured source, closing any previously open one.
    pub fn open(&mut self) -> Result<()> {
        self.close();
        let r = self.acquire();
        self.seal(r)
    }

    fn acquire(&mut self) -> Result<()> {
        if let Some(buffer) = &self.input_buffer {
            debug!("reading from input buffer ({} bytes)", buffer.len());
            self.source = Some(Tokenizer::new(buffer.clone()));
            return Ok(());
        }
        let path = self.file_name.clone().ok_or(Error::NoSource)?;
        debug!("opening {:?}", path);
        let data = fs::read(&path).map_err(|source| Error::SourceUnavailable { path, source })?;
        self.source = Some(Tokenizer::new(data));
        Ok(())
    }

    /// Release the source. Idempotent.
    pub fn close(&mut self) {
        if self.source.take().is_some() {
            debug!("closing source");
        }
    }

    pub(crate) fn tok(&mut self) -> Result<&mut Tokenizer> {
        self.source.as_mut().ok_or(Error::NoSource)
    }

    /// Record the kind of a failed operation and close the source, per
    /// the error contract. Warnings never come through here.
    pub(crate) fn seal<T>(&mut self, r: Result<T>) -> Result<T> {
        if let Err(e) = &r {
            self.last_error = Some(e.kind());
            self.close();
        }
        r
    }

    /*
     * Token-level reads, delegated to the open source. Public so that
     * dataset readers layered on this core can consume their geometry
     * sections with the same primitives.
     */

    pub fn read_line(&mut self) -> Result<String> {
        self.tok()?.read_line()
    }

    pub fn read_token(&mut self) -> Result<String> {
        self.tok()?.read_token()
    }

    pub fn read_primitive<T: FromAscii>(&mut self) -> Result<T> {
        self.tok()?.read_primitive()
    }

    pub fn read_block(&mut self, n: usize) -> Result<Vec<u8>> {
        self.tok()?.read_block(n)
    }

    /// Look at up to `n` upcoming bytes without consuming them.
    pub fn peek(&mut self, n: usize) -> Result<Vec<u8>> {
        Ok(self.tok()?.peek(n).to_vec())
    }

    pub(crate) fn read_byte(&mut self) -> Result<u8> {
        self.tok()?.read_byte()
    }

    pub(crate) fn read_be_u16(&mut self) -> Result<u16> {
        self.tok()?.read_be_u16()
    }

    pub(crate) fn read_be_u32(&mut self) -> Result<u32> {
        self.tok()?.read_be_u32()
    }

    pub(crate) fn read_be_u64(&mut self) -> Result<u64> {
        self.tok()?.read_be_u64()
    }

    /// Read and validate the four-line header: magic prefix and version,
    /// title, and the ASCII|BINARY encoding token.
    pub fn read_header(&mut self) -> Result<()> {
        let r = self.header();
        self.seal(r)
    }

    pub(crate) fn header(&mut self) -> Result<()> {
        debug!("reading file header");
        let line = self.read_line()?;
        if !line.starts_with(HEADER_PREFIX) {
            return Err(Error::UnrecognizedFormat(line));
        }
        self.version = match parse_version(line[HEADER_PREFIX.len()..].trim()) {
            Some(v) => v,
            None => {
                warn!("cannot read file version: {:?}", line);
                Version::default()
            }
        };
        if self.version > MAX_FILE_VERSION {
            warn!(
                "reading file version {} with older reader version {}",
                self.version, MAX_FILE_VERSION
            );
        }

        self.title = self.read_line()?;
        debug!("reading file entitled: {}", self.title);

        let encoding = self.read_token()?;
        let lower = encoding.to_ascii_lowercase();
        if lower.starts_with("ascii") {
            self.file_type = FileType::ASCII;
        } else if lower.starts_with("binary") {
            self.file_type = FileType::Binary;
        } else {
            return Err(Error::UnrecognizedFormat(encoding));
        }
        // The source is buffered in full, so binary mode needs no reopen
        // and the stream is already positioned past the header.
        Ok(())
    }

    /// Open the source and verify that it declares a dataset of the given
    /// kind (case-insensitive prefix match). The source is closed again
    /// regardless of the outcome.
    pub fn is_valid_dataset(&mut self, kind: &str) -> Result<()> {
        let r = self.validate(kind);
        if let Err(e) = &r {
            self.last_error = Some(e.kind());
        }
        self.close();
        r
    }

    fn validate(&mut self, kind: &str) -> Result<()> {
        self.open()?;
        self.header()?;
        let token = self.read_token()?;
        if !token.to_ascii_lowercase().starts_with("dataset") {
            return Err(Error::SchemaMismatch {
                expected: String::from("DATASET"),
                found: token,
            });
        }
        let found = self.read_token()?;
        if !found
            .to_ascii_lowercase()
            .starts_with(&kind.to_ascii_lowercase())
        {
            return Err(Error::SchemaMismatch {
                expected: kind.to_string(),
                found,
            });
        }
        Ok(())
    }

    /*
     * Characterization: a pre-scan that indexes attribute names per
     * section kind without parsing any payloads.
     */

    fn characterize(&mut self) -> Result<()> {
        if self.characteristics.is_some() && self.scanned == self.modified {
            return Ok(());
        }
        self.open()?;
        let r = self.scan();
        self.close();
        match r {
            Ok(ch) => {
                self.characteristics = Some(ch);
                self.scanned = self.modified;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.kind());
                Err(e)
            }
        }
    }

    fn scan(&mut self) -> Result<Characteristics> {
        self.header()?;
        let mut ch = Characteristics::prepare();
        while let Ok(line) = self.read_line() {
            check_for("scalars", &line, &mut ch.scalars);
            check_for("vectors", &line, &mut ch.vectors);
            check_for("tensors", &line, &mut ch.tensors);
            check_for("normals", &line, &mut ch.normals);
            check_for("tcoords", &line, &mut ch.tcoords);
            check_for("field", &line, &mut ch.fields);
        }
        Ok(ch)
    }

    /// Name of the `i`-th SCALARS section in the file, rescanning if the
    /// configuration changed since the last scan.
    pub fn scalars_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.scalars.get(i).cloned()
    }

    /// Name of the `i`-th VECTORS section in the file.
    pub fn vectors_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.vectors.get(i).cloned()
    }

    /// Name of the `i`-th TENSORS section in the file.
    pub fn tensors_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.tensors.get(i).cloned()
    }

    /// Name of the `i`-th NORMALS section in the file.
    pub fn normals_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.normals.get(i).cloned()
    }

    /// Name of the `i`-th TCOORDS section in the file.
    pub fn tcoords_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.tcoords.get(i).cloned()
    }

    /// Name of the `i`-th FIELD section in the file.
    pub fn field_data_name_in_file(&mut self, i: usize) -> Option<String> {
        self.characterize().ok()?;
        self.characteristics.as_ref()?.fields.get(i).cloned()
    }
}

fn parse_version(s: &str) -> Option<Version> {
    let mut parts = s.splitn(2, '.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    Some(Version { major, minor })
}

fn check_for(keyword: &str, line: &str, names: &mut Vec<String>) {
    let bytes = line.as_bytes();
    if bytes.len() >= keyword.len() && bytes[..keyword.len()].eq_ignore_ascii_case(keyword.as_bytes())
    {
        let name = line.split_whitespace().nth(1).unwrap_or("");
        names.push(name.to_string());
    }
}
