use std::io::Write;

use vtkread::model::*;
use vtkread::{AttributeKind, ErrorKind, Reader};

type Result = std::result::Result<(), vtkread::Error>;

const POLYDATA_ASCII: &str = "\
# vtk DataFile Version 4.2
demo
ASCII
DATASET POLYDATA
POINTS 2 float
0 0 0 1 0 0
POINT_DATA 2
SCALARS s float 1
LOOKUP_TABLE default
3.5 -1
";

/// Consume the DATASET/POINTS sections the way a polydata reader would,
/// returning the point count.
fn consume_polydata_geometry(reader: &mut Reader) -> std::result::Result<usize, vtkread::Error> {
    assert_eq!(reader.read_token()?, "DATASET");
    assert_eq!(reader.read_token()?, "POLYDATA");
    assert_eq!(reader.read_token()?, "POINTS");
    let num_points: usize = reader.read_primitive()?;
    let _type_tag = reader.read_token()?;
    for _ in 0..3 * num_points {
        let _: f32 = reader.read_primitive()?;
    }
    Ok(num_points)
}

#[test]
fn ascii_point_scalars_end_to_end() -> Result {
    let mut reader = Reader::from_buffer(POLYDATA_ASCII);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.version(), Version::new((4, 2)));
    assert_eq!(reader.title(), "demo");
    assert_eq!(reader.file_type(), FileType::ASCII);

    let num_points = consume_polydata_geometry(&mut reader)?;
    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;
    assert_eq!(n, num_points);

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;

    let scalars = sink.point.scalars.expect("scalars slot");
    assert_eq!(scalars.name, "s");
    assert_eq!(scalars.scalar_type(), ScalarType::F32);
    assert_eq!(scalars.num_comp, 1);
    assert_eq!(scalars.num_tuples, 2);
    assert_eq!(scalars.data, IOBuffer::F32(vec![3.5, -1.0]));
    Ok(())
}

#[test]
fn binary_point_scalars_are_byte_swapped() -> Result {
    let mut input = b"# vtk DataFile Version 4.2\ndemo\nBINARY\n".to_vec();
    input.extend_from_slice(b"POINT_DATA 1\nSCALARS id int 1\nLOOKUP_TABLE default\n");
    input.extend_from_slice(&[0x00, 0x00, 0x00, 0x2a]);

    let mut reader = Reader::from_buffer(input);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.file_type(), FileType::Binary);

    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;

    let scalars = sink.point.scalars.expect("scalars slot");
    assert_eq!(scalars.name, "id");
    assert_eq!(scalars.data, IOBuffer::I32(vec![42]));
    Ok(())
}

#[test]
fn pre_version_4_ghost_levels_are_converted() -> Result {
    let input = "\
# vtk DataFile Version 3.0
ghosts
ASCII
POINT_DATA 4
FIELD FieldData 1
vtkGhostLevels 1 4 unsigned_char
0 1 2 0
";
    let mut reader = Reader::from_buffer(input);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;

    assert_eq!(sink.point.arrays.len(), 1);
    let ghosts = &sink.point.arrays[0];
    assert_eq!(ghosts.name, GHOST_ARRAY_NAME);
    assert_eq!(
        ghosts.data,
        IOBuffer::U8(vec![0, DUPLICATE_POINT, DUPLICATE_POINT, 0])
    );
    Ok(())
}

#[test]
fn metadata_tail_travels_with_the_array() -> Result {
    let input = "\
# vtk DataFile Version 4.2
meta
ASCII
POINT_DATA 2
VECTORS v float
1 0 0 0 1 0
METADATA
COMPONENT_NAMES
x
y%20axis
z

SCALARS s int
LOOKUP_TABLE default
5 6
";
    let mut reader = Reader::from_buffer(input);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;

    let vectors = sink.point.vectors.expect("vectors slot");
    assert_eq!(vectors.component_names, vec!["x", "y axis", "z"]);
    let scalars = sink.point.scalars.expect("scalars slot");
    assert_eq!(scalars.data, IOBuffer::I32(vec![5, 6]));
    Ok(())
}

#[test]
fn graph_scopes_transition_between_vertex_and_edge() -> Result {
    let input = "\
# vtk DataFile Version 4.2
graph
ASCII
VERTEX_DATA 2
SCALARS weight float
LOOKUP_TABLE default
0.5 0.75
EDGE_DATA 1
SCALARS cost int
LOOKUP_TABLE default
3
";
    let mut reader = Reader::from_buffer(input);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.read_token()?, "VERTEX_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Vertex, n, &mut sink)?;

    assert_eq!(
        sink.vertex.scalars.expect("vertex scalars").data,
        IOBuffer::F32(vec![0.5, 0.75])
    );
    assert_eq!(
        sink.edge.scalars.expect("edge scalars").data,
        IOBuffer::I32(vec![3])
    );
    Ok(())
}

#[test]
fn row_data_feeds_the_table_scope() -> Result {
    let input = "\
# vtk DataFile Version 4.2
table
ASCII
ROW_DATA 2
FIELD columns 2
name 1 2 string
alice
bob
age 1 2 int
31 27
";
    let mut reader = Reader::from_buffer(input);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.read_token()?, "ROW_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Row, n, &mut sink)?;

    assert_eq!(sink.row.arrays.len(), 2);
    assert_eq!(
        sink.row.arrays[0].data,
        IOBuffer::Str(vec![String::from("alice"), String::from("bob")])
    );
    assert_eq!(sink.row.arrays[1].data, IOBuffer::I32(vec![31, 27]));
    Ok(())
}

#[test]
fn reading_from_a_file_path() -> Result {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(POLYDATA_ASCII.as_bytes()).expect("write");

    let mut reader = Reader::from_file(file.path());
    reader.is_valid_dataset("polydata")?;
    assert!(reader.is_valid_dataset("unstructured_grid").is_err());
    assert_eq!(reader.last_error(), Some(ErrorKind::SchemaMismatch));

    assert_eq!(reader.scalars_name_in_file(0).as_deref(), Some("s"));
    assert_eq!(reader.scalars_name_in_file(1), None);

    reader.open()?;
    reader.read_header()?;
    let num_points = consume_polydata_geometry(&mut reader)?;
    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;
    assert_eq!(n, num_points);
    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;
    assert!(sink.point.scalars.is_some());
    Ok(())
}

#[test]
fn missing_file_reports_source_unavailable() {
    let mut reader = Reader::from_file("/definitely/not/here.vtk");
    assert!(reader.open().is_err());
    assert_eq!(reader.last_error(), Some(ErrorKind::SourceUnavailable));
}

#[test]
fn filters_and_read_all_compose_through_the_facade() -> Result {
    let input = "\
# vtk DataFile Version 4.2
filters
ASCII
POINT_DATA 2
SCALARS first int 1
LOOKUP_TABLE default
1 2
SCALARS second int 1
LOOKUP_TABLE default
3 4
";
    let mut reader = Reader::from_buffer(input);
    reader.set_filter(AttributeKind::Scalars, Some("second"));
    reader.set_read_all(AttributeKind::Scalars, true);
    reader.open()?;
    reader.read_header()?;
    assert_eq!(reader.read_token()?, "POINT_DATA");
    let n: usize = reader.read_primitive()?;

    let mut sink = Attributes::new();
    reader.read_attributes(AttributeScope::Point, n, &mut sink)?;

    assert_eq!(sink.point.scalars.expect("scalars slot").name, "second");
    assert_eq!(sink.point.arrays.len(), 1);
    assert_eq!(sink.point.arrays[0].name, "first");
    Ok(())
}

#[test]
fn unsupported_keyword_closes_the_source() {
    let input = "\
# vtk DataFile Version 4.2
bad
ASCII
POINT_DATA 1
WAVELETS w float
";
    let mut reader = Reader::from_buffer(input);
    reader.open().unwrap();
    reader.read_header().unwrap();
    assert_eq!(reader.read_token().unwrap(), "POINT_DATA");
    let n: usize = reader.read_primitive().unwrap();

    let mut sink = Attributes::new();
    let err = reader
        .read_attributes(AttributeScope::Point, n, &mut sink)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedAttribute);
    assert_eq!(reader.last_error(), Some(ErrorKind::UnsupportedAttribute));
    // the source was closed on failure
    assert!(reader.read_token().is_err());
}
