use fds_testkit::{FdsSchemaBuilder, IntoDatum, encode};
use fds_wire::BinaryDecoder;

use fds_decode::datum::Datum;
use fds_decode::dtype::DataType;
use fds_decode::element::Element;
use fds_decode::fds_decoder::FdsDecoder;
use fds_decode::metadata::VarlenMetadata;
use fds_decode::shape::PartialShape;

use super::{expect_buffer, make_buffer};

/// Decodes a one-column varlen record and checks the buffer. The expected
/// coordinate rows are the nested traversal positions, supplied explicitly.
fn run_varlen_test<T>(
    rank: usize,
    dtype: DataType,
    value: Datum,
    expected_values: &[T],
    expected_indices: &[i64],
    offset: usize,
) where
    T: Element + PartialEq + std::fmt::Debug,
{
    let schema = FdsSchemaBuilder::new()
        .add_varlen_feature("feature", dtype, rank)
        .build_schema()
        .unwrap();

    let shape = PartialShape::new(std::iter::repeat(-1).take(rank));
    let mut fds = FdsDecoder::new(
        Vec::new(),
        Vec::new(),
        vec![VarlenMetadata::new("feature", dtype, shape, 0, 0)],
    );
    fds.initialize(&schema).unwrap();

    let mut buffer = make_buffer(dtype, 1, 1);
    let mut skipped = fds.skipped_data().to_vec();
    let bytes = encode(&Datum::Record(vec![value]));
    let mut wire = BinaryDecoder::new(&bytes);
    fds.decode_record(&mut wire, &mut [], &mut buffer, &mut skipped, offset)
        .unwrap();

    assert_eq!(wire.remaining(), 0);
    expect_buffer(
        &buffer,
        0,
        0,
        expected_indices,
        expected_values,
        expected_values.len(),
    );
}

#[test]
fn test_bool_1d() {
    run_varlen_test(
        1,
        DataType::Bool,
        vec![true, false, true].into_datum(),
        &[true, false, true],
        &[0, 0, 0, 1, 0, 2],
        0,
    );
}

#[test]
fn test_int32_1d_with_offset() {
    run_varlen_test(
        1,
        DataType::Int32,
        vec![7i32, -8].into_datum(),
        &[7i32, -8],
        &[4, 0, 4, 1],
        4,
    );
}

#[test]
fn test_string_2d_with_empty_middle_row() {
    run_varlen_test(
        2,
        DataType::String,
        vec![vec!["ABC"], vec![], vec!["DEF"]].into_datum(),
        &[b"ABC".to_vec(), b"DEF".to_vec()],
        &[0, 0, 0, 0, 2, 0],
        0,
    );
}

#[test]
fn test_float64_2d_ragged_rows() {
    run_varlen_test(
        2,
        DataType::Float64,
        vec![vec![1.0f64, 2.0], vec![3.0]].into_datum(),
        &[1.0f64, 2.0, 3.0],
        &[0, 0, 0, 0, 0, 1, 0, 1, 0],
        0,
    );
}

#[test]
fn test_empty_column_yields_nothing() {
    run_varlen_test::<i64>(
        1,
        DataType::Int64,
        Vec::<i64>::new().into_datum(),
        &[],
        &[],
        0,
    );
}

#[test]
fn test_multi_record_offsets_thread_through() {
    let schema = FdsSchemaBuilder::new()
        .add_varlen_feature("feature", DataType::Int64, 1)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        Vec::new(),
        Vec::new(),
        vec![VarlenMetadata::new(
            "feature",
            DataType::Int64,
            PartialShape::new([-1]),
            0,
            0,
        )],
    );
    fds.initialize(&schema).unwrap();

    let mut buffer = make_buffer(DataType::Int64, 1, 1);
    let mut skipped = fds.skipped_data().to_vec();
    let rows: [Vec<i64>; 3] = [vec![5, 6], vec![], vec![7]];
    for (row, values) in rows.iter().enumerate() {
        let bytes = encode(&Datum::Record(vec![values.clone().into_datum()]));
        let mut wire = BinaryDecoder::new(&bytes);
        fds.decode_record(&mut wire, &mut [], &mut buffer, &mut skipped, row)
            .unwrap();
    }

    expect_buffer(&buffer, 0, 0, &[0, 0, 0, 1, 2, 0], &[5i64, 6, 7], 3);
}

#[test]
fn test_random_values_round_trip() {
    fastrand::seed(553211);
    for _ in 0..10 {
        let values: Vec<i64> = (0..fastrand::usize(1..9)).map(|_| fastrand::i64(..)).collect();
        let expected_indices: Vec<i64> = (0..values.len() as i64).flat_map(|i| [0, i]).collect();
        run_varlen_test(
            1,
            DataType::Int64,
            values.clone().into_datum(),
            &values,
            &expected_indices,
            0,
        );
    }
}
