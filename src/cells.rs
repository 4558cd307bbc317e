use crate::model::{ByteOrder, CellArray, FileType, IOBuffer, PieceWindow};
use crate::reader::Reader;
use crate::{Error, Result};

impl Reader {
    /// Read a cell array in offsets/connectivity form.
    ///
    /// The header line declares the two array sizes; an offsets size
    /// below one yields an empty cell array. Both payloads must be of
    /// integer kinds and are moved into the result without copying.
    pub fn read_cells(&mut self) -> Result<CellArray> {
        let r = self.cells();
        self.seal(r)
    }

    fn cells(&mut self) -> Result<CellArray> {
        let offsets_size: i64 = self.read_primitive()?;
        let conn_size: i64 = self.read_primitive()?;
        if offsets_size < 1 {
            return Ok(CellArray::default());
        }
        if conn_size < 0 {
            return Err(Error::MalformedNumber(conn_size.to_string()));
        }

        let keyword = self.read_token()?;
        if !keyword.eq_ignore_ascii_case("offsets") {
            return Err(Error::UnrecognizedFormat(format!(
                "expected OFFSETS, found {:?}",
                keyword
            )));
        }
        let tag = self.read_token()?;
        let offsets = self.typed_array(&tag, offsets_size as usize, 1)?;
        if !offsets.data.is_integer() {
            return Err(Error::InvalidArrayType(tag));
        }

        let keyword = self.read_token()?;
        if !keyword.eq_ignore_ascii_case("connectivity") {
            return Err(Error::UnrecognizedFormat(format!(
                "expected CONNECTIVITY, found {:?}",
                keyword
            )));
        }
        let tag = self.read_token()?;
        let connectivity = self.typed_array(&tag, conn_size as usize, 1)?;
        if !connectivity.data.is_integer() {
            return Err(Error::InvalidArrayType(tag));
        }

        Ok(CellArray {
            offsets: offsets.data,
            connectivity: connectivity.data,
        })
    }

    /// Read a legacy flat cell stream of `size` integers:
    /// `K, K ids, K, K ids, ...`.
    pub fn read_cells_legacy(&mut self, size: usize) -> Result<Vec<i32>> {
        let r = self.cells_legacy(size, None);
        self.seal(r)
    }

    /// Read one piece of a legacy flat cell stream, skipping whole cells
    /// before and after the window. `skip_before + read + skip_after`
    /// must equal the stream's total cell count.
    pub fn read_cells_legacy_piece(
        &mut self,
        size: usize,
        window: PieceWindow,
    ) -> Result<Vec<i32>> {
        let r = self.cells_legacy(size, Some(window));
        self.seal(r)
    }

    fn cells_legacy(&mut self, size: usize, window: Option<PieceWindow>) -> Result<Vec<i32>> {
        match self.file_type {
            FileType::Binary => {
                // All cells arrive as one block (each cell has its own
                // length); the window is applied after the swap.
                self.read_line()?;
                let bytes = self.read_block(size * 4)?;
                let all = IOBuffer::i32_from_bytes(bytes, ByteOrder::BigEndian)?
                    .into_vec::<i32>()
                    .unwrap_or_default();
                match window {
                    None => Ok(all),
                    Some(w) if w.skip_before == 0 && w.skip_after == 0 => Ok(all),
                    Some(w) => {
                        let mut out = Vec::new();
                        let mut idx = 0usize;
                        for _ in 0..w.skip_before {
                            let k = cell_len(&all, idx)?;
                            idx += k + 1;
                        }
                        for _ in 0..w.read {
                            let k = cell_len(&all, idx)?;
                            out.push(all[idx]);
                            for j in 1..=k {
                                out.push(*all.get(idx + j).ok_or(Error::TruncatedStream)?);
                            }
                            idx += k + 1;
                        }
                        Ok(out)
                    }
                }
            }
            FileType::ASCII => match window {
                None => {
                    let mut out = Vec::with_capacity(size);
                    for _ in 0..size {
                        out.push(self.read_primitive()?);
                    }
                    Ok(out)
                }
                Some(w) => {
                    let mut out = Vec::new();
                    for _ in 0..w.skip_before {
                        self.skip_one_cell()?;
                    }
                    for _ in 0..w.read {
                        let k: i32 = self.read_primitive()?;
                        out.push(k);
                        for _ in 0..k {
                            out.push(self.read_primitive()?);
                        }
                    }
                    for _ in 0..w.skip_after {
                        self.skip_one_cell()?;
                    }
                    Ok(out)
                }
            },
        }
    }

    fn skip_one_cell(&mut self) -> Result<()> {
        let k: i32 = self.read_primitive()?;
        for _ in 0..k {
            let _: i32 = self.read_primitive()?;
        }
        Ok(())
    }
}

fn cell_len(data: &[i32], idx: usize) -> Result<usize> {
    let k = *data.get(idx).ok_or(Error::TruncatedStream)?;
    if k < 0 {
        return Err(Error::MalformedNumber(k.to_string()));
    }
    Ok(k as usize)
}
