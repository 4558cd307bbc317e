//! Information keys: typed key/value entries attached to arrays.
//!
//! Keys are identified by a (location, name) pair and carry a declared
//! value kind. The registry is process wide and meant to be populated
//! during program initialization; the deserializer only accepts entries
//! whose key it can find, warning about and skipping everything else.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use log::warn;

use crate::coding::decode_string;
use crate::model::{InfoValue, Information};
use crate::reader::Reader;
use crate::tokenizer::FromAscii;
use crate::Result;

/// Value kind declared by a registered information key.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum InfoValueKind {
    Double,
    DoubleVector,
    Id,
    Integer,
    IntegerVector,
    String,
    StringVector,
    UnsignedLong,
}

type KeyMap = HashMap<(String, String), InfoValueKind>;

static REGISTRY: OnceLock<RwLock<KeyMap>> = OnceLock::new();

fn registry() -> &'static RwLock<KeyMap> {
    REGISTRY.get_or_init(|| {
        let mut map = KeyMap::new();
        // Keys the matching writer serializes out of the box.
        map.insert(
            (String::from("vtkDataArray"), String::from("L2_NORM_RANGE")),
            InfoValueKind::DoubleVector,
        );
        map.insert(
            (
                String::from("vtkDataArray"),
                String::from("L2_NORM_FINITE_RANGE"),
            ),
            InfoValueKind::DoubleVector,
        );
        map.insert(
            (String::from("vtkDataArray"), String::from("UNITS_LABEL")),
            InfoValueKind::String,
        );
        map.insert(
            (String::from("vtkAbstractArray"), String::from("GUI_HIDE")),
            InfoValueKind::Integer,
        );
        RwLock::new(map)
    })
}

/// Register an information key so the deserializer can accept entries
/// carrying it. Process wide; call during program initialization.
pub fn register_information_key(location: &str, name: &str, kind: InfoValueKind) {
    if let Ok(mut map) = registry().write() {
        map.insert((location.to_string(), name.to_string()), kind);
    }
}

fn find_information_key(location: &str, name: &str) -> Option<InfoValueKind> {
    registry()
        .read()
        .ok()?
        .get(&(location.to_string(), name.to_string()))
        .copied()
}

impl Reader {
    /// Deserialize `num_keys` information entries from the stream.
    ///
    /// Malformed entries and unknown keys are warned about and skipped;
    /// only a truncated stream fails the whole block.
    pub fn read_information(&mut self, num_keys: usize) -> Result<Information> {
        let r = self.information_block(num_keys);
        self.seal(r)
    }

    pub(crate) fn information_block(&mut self, num_keys: usize) -> Result<Information> {
        let mut info = Information::new();
        for _ in 0..num_keys {
            let line = loop {
                let line = self.read_line()?;
                if !line.is_empty() {
                    break line;
                }
            };
            if !line.starts_with("NAME ") {
                warn!("ignoring line in information block: {:?}", line);
                continue;
            }

            let mut words = line.split_whitespace();
            let name = words.nth(1);
            let location_kw = words.next();
            let location = words.next();
            let (name, location) = match (name, location_kw, location) {
                (Some(name), Some("LOCATION"), Some(location)) => {
                    (name.to_string(), location.to_string())
                }
                _ => {
                    warn!("invalid information key header: {:?}", line);
                    continue;
                }
            };

            let kind = match find_information_key(&location, &name) {
                Some(kind) => kind,
                None => {
                    warn!("no registered information key {}::{}", location, name);
                    // keep the remaining entries in sync
                    let _ = self.read_line();
                    continue;
                }
            };

            let value = match kind {
                InfoValueKind::Double => self.scalar_entry::<f64>().map(InfoValue::Double),
                InfoValueKind::DoubleVector => {
                    self.vector_entry::<f64>().map(InfoValue::DoubleVector)
                }
                InfoValueKind::Id => self.scalar_entry::<i64>().map(InfoValue::Id),
                InfoValueKind::Integer => self.scalar_entry::<i32>().map(InfoValue::Integer),
                InfoValueKind::IntegerVector => {
                    self.vector_entry::<i32>().map(InfoValue::IntegerVector)
                }
                InfoValueKind::String => self.string_entry().map(InfoValue::String),
                InfoValueKind::StringVector => {
                    self.string_vector_entry().map(InfoValue::StringVector)
                }
                InfoValueKind::UnsignedLong => {
                    self.scalar_entry::<u64>().map(InfoValue::UnsignedLong)
                }
            };
            match value {
                Some(value) => info.push(location, name, value),
                None => warn!("malformed data block for key {}::{}", location, name),
            }
        }
        Ok(info)
    }

    /// `DATA <value>` with the trailing newline consumed.
    fn scalar_entry<T: FromAscii>(&mut self) -> Option<T> {
        let data = self.read_token().ok()?;
        if !data.starts_with("DATA") {
            return None;
        }
        let value = self.read_primitive::<T>().ok()?;
        let _ = self.read_line();
        Some(value)
    }

    /// `DATA <len> <values...>`; a zero length stores an empty vector.
    fn vector_entry<T: FromAscii>(&mut self) -> Option<Vec<T>> {
        let data = self.read_token().ok()?;
        if !data.starts_with("DATA") {
            return None;
        }
        let length = self.read_primitive::<i32>().ok()?;
        if length == 0 {
            return Some(Vec::new());
        }
        if length < 0 {
            let _ = self.read_line();
            return None;
        }
        let mut values = Vec::with_capacity(length as usize);
        for _ in 0..length {
            match self.read_primitive::<T>() {
                Ok(v) => values.push(v),
                Err(_) => {
                    let _ = self.read_line();
                    return None;
                }
            }
        }
        let _ = self.read_line();
        Some(values)
    }

    /// `DATA <percent-hex>` on one line.
    fn string_entry(&mut self) -> Option<String> {
        let line = self.read_line().ok()?;
        let rest = line.trim_start().strip_prefix("DATA")?;
        let token = rest.split_whitespace().next()?;
        Some(decode_string(token))
    }

    /// `DATA <len>` then `len` percent-hex lines. Any failure discards
    /// the accumulated value.
    fn string_vector_entry(&mut self) -> Option<Vec<String>> {
        let data = self.read_token().ok()?;
        if !data.starts_with("DATA") {
            return None;
        }
        let length = self.read_primitive::<i32>().ok()?;
        let _ = self.read_line();
        if length <= 0 {
            return if length == 0 { Some(Vec::new()) } else { None };
        }
        let mut values = Vec::with_capacity(length as usize);
        for _ in 0..length {
            let line = self.read_line().ok()?;
            values.push(decode_string(&line));
        }
        Some(values)
    }
}
