use log::debug;

use crate::coding::decode_string;
use crate::model::{AttributeScope, Attributes, FileType, IOBuffer, LookupTable};
use crate::reader::{AttributeKind, Reader};
use crate::{Error, Result};

impl Reader {
    /// Consume attribute sections for the given scope until the end of
    /// the input, inserting arrays into the matching container on `sink`.
    ///
    /// `num_elements` is the element count declared by the enclosing
    /// `*_DATA` line. Sibling-scope sections (`POINT_DATA`/`CELL_DATA`,
    /// `VERTEX_DATA`/`EDGE_DATA`) switch scope in place; any other
    /// unrecognized keyword fails the read.
    pub fn read_attributes(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let r = self.attribute_sections(scope, num_elements, sink);
        self.seal(r)
    }

    pub(crate) fn attribute_sections(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        debug!("reading {} data attributes for {} elements", scope, num_elements);
        loop {
            let keyword = {
                let tok = self.tok()?;
                tok.skip_whitespace();
                if tok.at_eof() {
                    break;
                }
                tok.read_token()?
            };
            let kw = keyword.to_ascii_lowercase();
            if kw.starts_with("scalars") {
                self.scalars_section(scope, num_elements, sink)?;
            } else if kw.starts_with("vectors") {
                self.vectors_section(scope, num_elements, sink)?;
            } else if kw.starts_with("tensors6") {
                self.tensors_section(scope, num_elements, 6, sink)?;
            } else if kw.starts_with("tensors") {
                self.tensors_section(scope, num_elements, 9, sink)?;
            } else if kw.starts_with("normals") {
                self.normals_section(scope, num_elements, sink)?;
            } else if kw.starts_with("texture_coordinates") {
                self.tcoords_section(scope, num_elements, sink)?;
            } else if kw.starts_with("global_ids") {
                self.global_ids_section(scope, num_elements, sink)?;
            } else if kw.starts_with("pedigree_ids") {
                self.pedigree_ids_section(scope, num_elements, sink)?;
            } else if kw.starts_with("edge_flags") {
                if scope != AttributeScope::Point {
                    return Err(Error::UnsupportedAttribute { scope, keyword });
                }
                self.edge_flags_section(scope, num_elements, sink)?;
            } else if kw.starts_with("color_scalars") {
                self.color_scalars_section(scope, num_elements, sink)?;
            } else if kw.starts_with("lookup_table") {
                self.lookup_table_section(scope, sink)?;
            } else if kw.starts_with("field") {
                let field = self.field_block(Some(scope))?;
                scope.attributes(sink).arrays.extend(field.arrays);
            } else {
                match scope.sibling() {
                    Some((sibling_kw, sibling)) if kw.starts_with(sibling_kw) => {
                        let n: usize = self.read_primitive()?;
                        self.attribute_sections(sibling, n, sink)?;
                    }
                    _ => return Err(Error::UnsupportedAttribute { scope, keyword }),
                }
            }
        }
        Ok(())
    }

    /// `SCALARS <name> <type> [<numComp>]` followed by a mandatory
    /// `LOOKUP_TABLE <table>` line.
    fn scalars_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let mut key = self.read_token()?;
        let mut num_comp = 1usize;
        if !key.eq_ignore_ascii_case("lookup_table") {
            num_comp = key.parse().unwrap_or(0);
            if num_comp < 1 {
                return Err(Error::MalformedNumber(key));
            }
            key = self.read_token()?;
        }
        if !key.eq_ignore_ascii_case("lookup_table") {
            return Err(Error::UnrecognizedFormat(format!(
                "scalars {:?} must declare a lookup table",
                name
            )));
        }
        let table_name = self.read_token()?;

        let skip = scope.attributes(sink).scalars.is_some()
            || self
                .filter(AttributeKind::Scalars)
                .map_or(false, |f| f != name);
        if !skip {
            self.scalar_lut = Some(table_name);
        }

        let mut data = self.typed_array(&type_tag, num_elements, num_comp)?;
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.scalars = Some(data);
        } else if self.read_all(AttributeKind::Scalars) {
            a.arrays.push(data);
        }
        Ok(())
    }

    fn vectors_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).vectors.is_some()
            || self
                .filter(AttributeKind::Vectors)
                .map_or(false, |f| f != name);
        let mut data = self.typed_array(&type_tag, num_elements, 3)?;
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.vectors = Some(data);
        } else if self.read_all(AttributeKind::Vectors) {
            a.arrays.push(data);
        }
        Ok(())
    }

    fn normals_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).normals.is_some()
            || self
                .filter(AttributeKind::Normals)
                .map_or(false, |f| f != name);
        let mut data = self.typed_array(&type_tag, num_elements, 3)?;
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.normals = Some(data);
        } else if self.read_all(AttributeKind::Normals) {
            a.arrays.push(data);
        }
        Ok(())
    }

    /// `num_comp` is 9 for full tensors, 6 for the symmetric form.
    fn tensors_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        num_comp: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).tensors.is_some()
            || self
                .filter(AttributeKind::Tensors)
                .map_or(false, |f| f != name);
        let mut data = self.typed_array(&type_tag, num_elements, num_comp)?;
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.tensors = Some(data);
        } else if self.read_all(AttributeKind::Tensors) {
            a.arrays.push(data);
        }
        Ok(())
    }

    fn tcoords_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let dim: i64 = self.read_primitive()?;
        let type_tag = self.read_token()?;
        if !(1..=3).contains(&dim) {
            return Err(Error::DimOutOfRange(dim));
        }
        let skip = scope.attributes(sink).tcoords.is_some()
            || self
                .filter(AttributeKind::TCoords)
                .map_or(false, |f| f != name);
        let mut data = self.typed_array(&type_tag, num_elements, dim as usize)?;
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.tcoords = Some(data);
        } else if self.read_all(AttributeKind::TCoords) {
            a.arrays.push(data);
        }
        Ok(())
    }

    // Global ids, pedigree ids and edge flags have no read-all spillover:
    // a second section of the same kind is dropped outright.

    fn global_ids_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).global_ids.is_some();
        let mut data = self.typed_array(&type_tag, num_elements, 1)?;
        data.name = name;
        if !skip {
            scope.attributes(sink).global_ids = Some(data);
        }
        Ok(())
    }

    fn pedigree_ids_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).pedigree_ids.is_some();
        let mut data = self.typed_array(&type_tag, num_elements, 1)?;
        data.name = name;
        if !skip {
            scope.attributes(sink).pedigree_ids = Some(data);
        }
        Ok(())
    }

    fn edge_flags_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let type_tag = self.read_token()?;
        let skip = scope.attributes(sink).edge_flags.is_some();
        let mut data = self.typed_array(&type_tag, num_elements, 1)?;
        data.name = name;
        if !skip {
            scope.attributes(sink).edge_flags = Some(data);
        }
        Ok(())
    }

    /// `COLOR_SCALARS <name> <numComp>`. Binary payloads are unsigned
    /// bytes; ASCII payloads are floats in [0, 1] quantized to unsigned
    /// bytes. Either way the materialized array is `u8` in the scalars
    /// slot.
    fn color_scalars_section(
        &mut self,
        scope: AttributeScope,
        num_elements: usize,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = decode_string(&self.read_token()?);
        let num_comp: usize = self.read_primitive()?;
        let skip = scope.attributes(sink).scalars.is_some()
            || self
                .filter(AttributeKind::ColorScalars)
                .map_or(false, |f| f != name);

        let mut data = match self.file_type {
            FileType::Binary => self.typed_array("unsigned_char", num_elements, num_comp)?,
            FileType::ASCII => {
                let mut floats = self.typed_array("float", num_elements, num_comp)?;
                let quantized: Vec<u8> = floats
                    .data
                    .into_vec::<f32>()
                    .unwrap_or_default()
                    .into_iter()
                    .map(|v| (255.0 * v + 0.5) as u8)
                    .collect();
                floats.data = IOBuffer::U8(quantized);
                floats
            }
        };
        data.name = name;
        let a = scope.attributes(sink);
        if !skip {
            a.scalars = Some(data);
        } else if self.read_all(AttributeKind::ColorScalars) {
            a.arrays.push(data);
        }
        Ok(())
    }

    /// `LOOKUP_TABLE <name> <size>` with `4 * size` RGBA bytes (floats in
    /// ASCII). Attached to the scope's current scalars slot unless a
    /// table-name filter or the table declared by the scalars section
    /// excludes it.
    fn lookup_table_section(
        &mut self,
        scope: AttributeScope,
        sink: &mut Attributes,
    ) -> Result<()> {
        let name = self.read_token()?;
        let size: usize = self.read_primitive()?;
        let skip = scope.attributes(sink).scalars.is_none()
            || self.lookup_table_filter().map_or(false, |f| f != name)
            || self.scalar_lut.as_deref().map_or(false, |f| f != name);

        let colors = match self.file_type {
            FileType::Binary => {
                self.read_line()?;
                self.read_block(4 * size)?
            }
            FileType::ASCII => {
                let mut colors = Vec::with_capacity(4 * size);
                for _ in 0..4 * size {
                    let v: f32 = self.read_primitive()?;
                    colors.push((255.0 * v + 0.5) as u8);
                }
                colors
            }
        };

        if !skip {
            if let Some(scalars) = &mut scope.attributes(sink).scalars {
                scalars.lookup_table = Some(LookupTable { name, colors });
            }
        }
        Ok(())
    }
}
