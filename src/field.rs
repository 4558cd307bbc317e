use log::debug;

use crate::coding::decode_string;
use crate::model::{
    AttributeScope, DataArray, FieldData, IOBuffer, DUPLICATE_CELL, DUPLICATE_POINT,
    GHOST_ARRAY_NAME,
};
use crate::reader::{AttributeKind, Reader};
use crate::{Error, Result};

impl Reader {
    /// Read a FIELD group: `<name> <numArrays>` followed by that many
    /// independently shaped arrays. `NULL_ARRAY` placeholders occupy a
    /// slot in the count but produce no array.
    ///
    /// `scope` is the association the field is being read under; pass
    /// `None` for a stand-alone field dataset. Point and cell fields
    /// from files older than major version 4 get their ghost-level
    /// arrays converted to the current ghost encoding.
    pub fn read_field_data(&mut self, scope: Option<AttributeScope>) -> Result<FieldData> {
        let r = self.field_block(scope);
        self.seal(r)
    }

    pub(crate) fn field_block(&mut self, scope: Option<AttributeScope>) -> Result<FieldData> {
        let name = self.read_token()?;
        let num_arrays: i64 = self.read_primitive()?;
        debug!("reading field {:?} with {} arrays", name, num_arrays);

        let skip = self
            .filter(AttributeKind::Fields)
            .map_or(false, |f| f != name);
        let read_all = self.read_all(AttributeKind::Fields);

        let mut field = FieldData {
            name,
            arrays: Vec::new(),
        };
        for _ in 0..num_arrays {
            let raw = self.read_token()?;
            if raw == "NULL_ARRAY" {
                continue;
            }
            let array_name = decode_string(&raw);
            let num_comp: i64 = self.read_primitive()?;
            let num_tuples: i64 = self.read_primitive()?;
            if num_comp < 0 || num_tuples < 0 {
                return Err(Error::MalformedNumber(format!(
                    "{} {}",
                    num_comp, num_tuples
                )));
            }
            let type_tag = self.read_token()?;
            let mut array = self.typed_array(&type_tag, num_tuples as usize, num_comp as usize)?;
            if !skip || read_all {
                array.name = array_name;
                self.convert_ghost_levels(scope, &mut array);
                field.arrays.push(array);
            }
        }
        Ok(field)
    }

    /// Files older than major version 4 store ghost levels; newer
    /// consumers expect ghost type bytes. A one-component `u8` array
    /// named `vtkGhostLevels` under a point or cell scope is renamed and
    /// every nonzero level becomes the scope's duplicate marker.
    fn convert_ghost_levels(&self, scope: Option<AttributeScope>, array: &mut DataArray) {
        let applies = matches!(
            scope,
            Some(AttributeScope::Point) | Some(AttributeScope::Cell)
        );
        if self.version.major >= 4 || !applies || array.num_comp != 1 || array.name != "vtkGhostLevels"
        {
            return;
        }
        if let IOBuffer::U8(levels) = &mut array.data {
            let marker = if scope == Some(AttributeScope::Cell) {
                DUPLICATE_CELL
            } else {
                DUPLICATE_POINT
            };
            for level in levels.iter_mut() {
                if *level > 0 {
                    *level = marker;
                }
            }
            array.name = String::from(GHOST_ARRAY_NAME);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reader_for(version: &str, body: &str) -> Reader {
        let input = format!("# vtk DataFile Version {}\nt\nASCII\n{}", version, body);
        let mut reader = Reader::from_buffer(input.into_bytes());
        reader.open().unwrap();
        reader.read_header().unwrap();
        reader
    }

    #[test]
    fn field_groups_arrays() {
        let body = "FieldData 2\nZeros 1 3 float\n0 0 0\nIds 1 2 vtkidtype\n4 5\n";
        let mut reader = reader_for("4.2", body);
        let field = reader.read_field_data(None).unwrap();
        assert_eq!(field.name, "FieldData");
        assert_eq!(field.arrays.len(), 2);
        assert_eq!(field.arrays[0].name, "Zeros");
        assert_eq!(field.arrays[0].data, IOBuffer::F32(vec![0.0, 0.0, 0.0]));
        assert_eq!(field.arrays[1].data, IOBuffer::Id(vec![4, 5]));
    }

    #[test]
    fn null_array_placeholders_are_skipped() {
        let body = "FieldData 2\nNULL_ARRAY\nIds 1 1 int\n9\n";
        let mut reader = reader_for("4.2", body);
        let field = reader.read_field_data(None).unwrap();
        assert_eq!(field.arrays.len(), 1);
        assert_eq!(field.arrays[0].name, "Ids");
    }

    #[test]
    fn field_array_names_are_decoded() {
        let body = "FieldData 1\nmy%20array 1 1 int\n3\n";
        let mut reader = reader_for("4.2", body);
        let field = reader.read_field_data(None).unwrap();
        assert_eq!(field.arrays[0].name, "my array");
    }

    #[test]
    fn field_name_filter_drops_arrays_but_consumes_them() {
        let body = "Unwanted 1\nIds 1 1 int\n9\nrest\n";
        let mut reader = reader_for("4.2", body);
        reader.set_filter(AttributeKind::Fields, Some("Wanted"));
        let field = reader.read_field_data(None).unwrap();
        assert!(field.arrays.is_empty());
        assert_eq!(reader.read_token().unwrap(), "rest");
    }

    #[test]
    fn read_all_fields_overrides_the_filter() {
        let body = "Unwanted 1\nIds 1 1 int\n9\n";
        let mut reader = reader_for("4.2", body);
        reader.set_filter(AttributeKind::Fields, Some("Wanted"));
        reader.set_read_all(AttributeKind::Fields, true);
        let field = reader.read_field_data(None).unwrap();
        assert_eq!(field.arrays.len(), 1);
    }

    #[test]
    fn old_ghost_levels_become_ghost_types() {
        let body = "FieldData 1\nvtkGhostLevels 1 4 unsigned_char\n0 1 2 0\n";
        let mut reader = reader_for("3.0", body);
        let field = reader
            .read_field_data(Some(AttributeScope::Point))
            .unwrap();
        let ghosts = &field.arrays[0];
        assert_eq!(ghosts.name, GHOST_ARRAY_NAME);
        assert_eq!(
            ghosts.data,
            IOBuffer::U8(vec![0, DUPLICATE_POINT, DUPLICATE_POINT, 0])
        );
    }

    #[test]
    fn ghost_conversion_is_version_gated() {
        let body = "FieldData 1\nvtkGhostLevels 1 4 unsigned_char\n0 1 2 0\n";
        let mut reader = reader_for("4.0", body);
        let field = reader
            .read_field_data(Some(AttributeScope::Point))
            .unwrap();
        let ghosts = &field.arrays[0];
        assert_eq!(ghosts.name, "vtkGhostLevels");
        assert_eq!(ghosts.data, IOBuffer::U8(vec![0, 1, 2, 0]));
    }

    #[test]
    fn ghost_conversion_skips_other_scopes() {
        let body = "FieldData 1\nvtkGhostLevels 1 2 unsigned_char\n1 0\n";
        let mut reader = reader_for("3.0", body);
        let field = reader.read_field_data(Some(AttributeScope::Row)).unwrap();
        assert_eq!(field.arrays[0].name, "vtkGhostLevels");
    }
}
