use fds_common::error::ErrorKind;
use fds_format::Schema;
use fds_testkit::{FdsSchemaBuilder, IntoDatum, encode, null_datum, nullable, sparse_datum};
use fds_wire::BinaryDecoder;

use fds_decode::buffer::ValueBuffer;
use fds_decode::datum::Datum;
use fds_decode::dtype::DataType;
use fds_decode::fds_decoder::FdsDecoder;
use fds_decode::metadata::{DenseMetadata, FeatureKind, SparseMetadata, VarlenMetadata};
use fds_decode::shape::PartialShape;
use fds_decode::tensor::DenseTensor;

use super::expect_buffer;

#[test]
fn test_mixed_features_with_skipped_columns() {
    let schema = FdsSchemaBuilder::new()
        .add_dense_feature("dense_float_1d", DataType::Float32, 1)
        .add_dense_feature("dense_long_2d", DataType::Int64, 2)
        .add_dense_feature("unused_dense", DataType::Float32, 2)
        .add_sparse_feature("sparse_int_1d", DataType::Int32, 1)
        .add_sparse_feature("unused_sparse", DataType::Float64, 1)
        .add_sparse_feature("sparse_string_2d", DataType::String, 2)
        .add_dense_feature("unused_varlen", DataType::Bool, 0)
        .add_varlen_feature("varlen_bool_1d", DataType::Bool, 1)
        .add_varlen_feature("varlen_string_2d", DataType::String, 2)
        .build_schema()
        .unwrap();

    let mut fds = FdsDecoder::new(
        vec![
            DenseMetadata::new("dense_float_1d", DataType::Float32, PartialShape::new([3]), 0),
            DenseMetadata::new(
                "dense_long_2d",
                DataType::Int64,
                PartialShape::new([2, 2]),
                1,
            ),
        ],
        vec![
            SparseMetadata::new(
                "sparse_int_1d",
                DataType::Int32,
                PartialShape::new([101]),
                0,
                0,
            ),
            SparseMetadata::new(
                "sparse_string_2d",
                DataType::String,
                PartialShape::new([6, 10]),
                1,
                0,
            ),
        ],
        vec![
            VarlenMetadata::new("varlen_bool_1d", DataType::Bool, PartialShape::new([-1]), 2, 0),
            VarlenMetadata::new(
                "varlen_string_2d",
                DataType::String,
                PartialShape::new([-1, -1]),
                3,
                1,
            ),
        ],
    );
    fds.initialize(&schema).unwrap();
    assert_eq!(fds.skipped_data().len(), 3);
    assert_eq!(
        fds.feature_kinds(),
        &[
            FeatureKind::Dense,
            FeatureKind::Dense,
            FeatureKind::Skipped,
            FeatureKind::Sparse,
            FeatureKind::Skipped,
            FeatureKind::Sparse,
            FeatureKind::Skipped,
            FeatureKind::Varlen,
            FeatureKind::Varlen,
        ]
    );

    let record = Datum::Record(vec![
        vec![1.0f32, 2.0, 3.0].into_datum(),
        vec![vec![1i64, 3], vec![2, 4]].into_datum(),
        vec![vec![1.0f32, 2.0]].into_datum(),
        sparse_datum(&[vec![100]], vec![100i32], &[0, 1]),
        sparse_datum(&[vec![0, 1]], vec![1.0f64, -1.0], &[0, 1]),
        sparse_datum(&[vec![5, 5], vec![4, 8]], vec!["alpha", "omega"], &[0, 1, 2]),
        true.into_datum(),
        vec![true, false, true].into_datum(),
        vec![vec!["ABC"], vec![], vec!["DEF"]].into_datum(),
    ]);

    let mut tensors = vec![
        DenseTensor::zeroed(DataType::Float32, [1, 3]),
        DenseTensor::zeroed(DataType::Int64, [1, 2, 2]),
    ];
    let mut buffer = ValueBuffer::new();
    buffer.indices.resize(4, Vec::new());
    buffer.num_of_elements.resize(4, 0);
    buffer.int32_values.resize(1, Vec::new());
    buffer.bool_values.resize(1, Vec::new());
    buffer.string_values.resize(2, Vec::new());
    let mut skipped = fds.skipped_data().to_vec();

    let bytes = encode(&record);
    let mut wire = BinaryDecoder::new(&bytes);
    fds.decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
        .unwrap();
    assert_eq!(wire.remaining(), 0);

    assert_eq!(tensors[0].values::<f32>().unwrap(), &[1.0, 2.0, 3.0]);
    assert_eq!(tensors[1].values::<i64>().unwrap(), &[1, 3, 2, 4]);
    expect_buffer(&buffer, 0, 0, &[0, 100], &[100i32], 1);
    expect_buffer(
        &buffer,
        1,
        0,
        &[0, 5, 4, 0, 5, 8],
        &[b"alpha".to_vec(), b"omega".to_vec()],
        2,
    );
    expect_buffer(&buffer, 2, 0, &[0, 0, 0, 1, 0, 2], &[true, false, true], 3);
    expect_buffer(
        &buffer,
        3,
        1,
        &[0, 0, 0, 0, 2, 0],
        &[b"ABC".to_vec(), b"DEF".to_vec()],
        2,
    );

    // The skipped sink received every unused column of this record.
    assert_eq!(skipped.len(), 3);
    assert_eq!(
        skipped[0].value(),
        &vec![vec![1.0f32, 2.0]].into_datum()
    );
    assert_eq!(skipped[2].value(), &Datum::Boolean(true));
}

#[test]
fn test_skipped_columns_do_not_disturb_declared_ones() {
    // The same declared column decodes identically with and without unused
    // neighbors in the schema.
    let declared = DenseMetadata::new("feature", DataType::Int32, PartialShape::new([2]), 0);

    let plain_schema = FdsSchemaBuilder::new()
        .add_dense_feature("feature", DataType::Int32, 1)
        .build_schema()
        .unwrap();
    let padded_schema = FdsSchemaBuilder::new()
        .add_dense_feature("before", DataType::String, 1)
        .add_dense_feature("feature", DataType::Int32, 1)
        .add_sparse_feature("after", DataType::Float64, 1)
        .build_schema()
        .unwrap();

    let decode = |schema: &Schema, record: Datum| {
        let mut fds = FdsDecoder::new(vec![declared.clone()], Vec::new(), Vec::new());
        fds.initialize(schema).unwrap();
        let mut tensors = vec![DenseTensor::zeroed(DataType::Int32, [1, 2])];
        let mut buffer = ValueBuffer::new();
        let mut skipped = fds.skipped_data().to_vec();
        let bytes = encode(&record);
        let mut wire = BinaryDecoder::new(&bytes);
        fds.decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
            .unwrap();
        assert_eq!(wire.remaining(), 0);
        (tensors[0].values::<i32>().unwrap().to_vec(), skipped.len())
    };

    let (plain, plain_skipped) =
        decode(&plain_schema, Datum::Record(vec![vec![8i32, 9].into_datum()]));
    let (padded, padded_skipped) = decode(
        &padded_schema,
        Datum::Record(vec![
            vec!["noise"].into_datum(),
            vec![8i32, 9].into_datum(),
            sparse_datum(&[vec![3]], vec![0.5f64], &[0, 1]),
        ]),
    );

    assert_eq!(plain, padded);
    assert_eq!(plain_skipped, 0);
    assert_eq!(padded_skipped, 2);
}

#[test]
fn test_nullable_feature_decodes_like_plain() {
    let schema = FdsSchemaBuilder::new()
        .add_nullable_dense_feature("feature", DataType::Int32, 0)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::scalar(),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    fds.initialize(&schema).unwrap();

    let mut tensors = vec![DenseTensor::zeroed(DataType::Int32, [1])];
    let mut buffer = ValueBuffer::new();
    let mut skipped = fds.skipped_data().to_vec();
    let bytes = encode(&Datum::Record(vec![nullable(-5i32)]));
    let mut wire = BinaryDecoder::new(&bytes);
    fds.decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
        .unwrap();
    assert_eq!(tensors[0].values::<i32>().unwrap(), &[-5]);
}

#[test]
fn test_null_branch_fails_the_record() {
    let schema = FdsSchemaBuilder::new()
        .add_nullable_dense_feature("feature", DataType::Int32, 0)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::scalar(),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    fds.initialize(&schema).unwrap();

    let mut tensors = vec![DenseTensor::zeroed(DataType::Int32, [1])];
    let mut buffer = ValueBuffer::new();
    let mut skipped = fds.skipped_data().to_vec();
    let bytes = encode(&Datum::Record(vec![null_datum()]));
    let mut wire = BinaryDecoder::new(&bytes);
    let err = fds
        .decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
        .unwrap_err();

    let ErrorKind::FeatureDecode { name, source } = err.kind() else {
        panic!("expected a feature decode error, got {err}");
    };
    assert_eq!(name, "feature");
    assert!(matches!(source.kind(), ErrorKind::NullValue { name } if name == "feature"));
}

#[test]
fn test_single_branch_union_carries_the_value() {
    let schema = Schema::from_json(
        r#"{
            "type": "record",
            "name": "FeaturizedDataset",
            "fields": [{"name": "feature", "type": ["long"]}]
        }"#,
    )
    .unwrap();
    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "feature",
            DataType::Int64,
            PartialShape::scalar(),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    fds.initialize(&schema).unwrap();

    let mut tensors = vec![DenseTensor::zeroed(DataType::Int64, [1])];
    let mut buffer = ValueBuffer::new();
    let mut skipped = fds.skipped_data().to_vec();
    let record = Datum::Record(vec![Datum::Union {
        branch: 0,
        value: Box::new(Datum::Long(17)),
    }]);
    let bytes = encode(&record);
    let mut wire = BinaryDecoder::new(&bytes);
    fds.decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
        .unwrap();
    assert_eq!(tensors[0].values::<i64>().unwrap(), &[17]);
}

#[test]
fn test_root_must_be_a_record() {
    let schema = Schema::from_json(r#"{"type": "array", "items": "int"}"#).unwrap();
    let mut fds = FdsDecoder::new(Vec::new(), Vec::new(), Vec::new());
    let err = fds.initialize(&schema).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::NotRecord { kind, .. } if kind == "array"));
}

#[test]
fn test_missing_feature_is_reported() {
    let schema = FdsSchemaBuilder::new()
        .add_dense_feature("present", DataType::Int32, 0)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "absent",
            DataType::Int32,
            PartialShape::scalar(),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    let err = fds.initialize(&schema).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::FeatureNotFound { name, .. } if name == "absent"));
}

#[test]
fn test_unsupported_unions_are_rejected() {
    for union_type in [r#"["null", "int", "long"]"#, r#"["int", "long"]"#, r#"["null", "null"]"#] {
        let text = format!(
            r#"{{
                "type": "record",
                "name": "FeaturizedDataset",
                "fields": [{{"name": "feature", "type": {union_type}}}]
            }}"#
        );
        let schema = Schema::from_json(&text).unwrap();
        let mut fds = FdsDecoder::new(
            vec![DenseMetadata::new(
                "feature",
                DataType::Int32,
                PartialShape::scalar(),
                0,
            )],
            Vec::new(),
            Vec::new(),
        );
        let err = fds.initialize(&schema).unwrap_err();
        assert!(
            matches!(err.kind(), ErrorKind::InvalidUnionType { name, .. } if name == "feature"),
            "union {union_type} produced {err}"
        );
    }
}

#[test]
fn test_carrier_type_must_match_metadata() {
    let schema = FdsSchemaBuilder::new()
        .add_dense_feature("feature", DataType::String, 1)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::new([3]),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    let err = fds.initialize(&schema).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SchemaMismatch { name, .. } if name == "feature"));
}

#[test]
fn test_sparse_subrecord_shape_is_validated() {
    // An indices field whose suffix is not a decimal dimension.
    let text = r#"{
        "type": "record",
        "name": "FeaturizedDataset",
        "fields": [{
            "name": "feature",
            "type": {
                "type": "record",
                "name": "feature",
                "fields": [
                    {"name": "indicesX", "type": {"type": "array", "items": "long"}},
                    {"name": "values", "type": {"type": "array", "items": "int"}}
                ]
            }
        }]
    }"#;
    let schema = Schema::from_json(text).unwrap();
    let mut fds = FdsDecoder::new(
        Vec::new(),
        vec![SparseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::new([10]),
            0,
            0,
        )],
        Vec::new(),
    );
    let err = fds.initialize(&schema).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SchemaMismatch { .. }));

    // A field count that cannot carry rank + 1 sub-fields.
    let schema = FdsSchemaBuilder::new()
        .add_sparse_feature("feature", DataType::Int32, 2)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        Vec::new(),
        vec![SparseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::new([10]),
            0,
            0,
        )],
        Vec::new(),
    );
    let err = fds.initialize(&schema).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SchemaMismatch { .. }));
}

#[test]
fn test_reinitialize_requires_identical_schema() {
    let build = |extra: bool| {
        let mut builder =
            FdsSchemaBuilder::new().add_dense_feature("feature", DataType::Int32, 0);
        if extra {
            builder = builder.add_dense_feature("other", DataType::Int64, 0);
        }
        builder.build_schema().unwrap()
    };

    let mut fds = FdsDecoder::new(
        vec![DenseMetadata::new(
            "feature",
            DataType::Int32,
            PartialShape::scalar(),
            0,
        )],
        Vec::new(),
        Vec::new(),
    );
    fds.initialize(&build(false)).unwrap();
    assert_eq!(fds.schema(), Some(&build(false)));

    // Identical schema: a no-op. Different schema: refused.
    fds.initialize(&build(false)).unwrap();
    let err = fds.initialize(&build(true)).unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::SchemaMismatch { .. }));
}

#[test]
fn test_decode_before_initialize_is_an_error() {
    let fds = FdsDecoder::new(Vec::new(), Vec::new(), Vec::new());
    let mut wire = BinaryDecoder::new(&[]);
    let result = fds.decode_record(&mut wire, &mut [], &mut ValueBuffer::new(), &mut [], 0);
    assert!(result.is_err());
}

#[test]
fn test_decode_failure_names_the_column() {
    let schema = FdsSchemaBuilder::new()
        .add_dense_feature("good", DataType::Int32, 0)
        .add_dense_feature("bad", DataType::Bool, 0)
        .build_schema()
        .unwrap();
    let mut fds = FdsDecoder::new(
        vec![
            DenseMetadata::new("good", DataType::Int32, PartialShape::scalar(), 0),
            DenseMetadata::new("bad", DataType::Bool, PartialShape::scalar(), 1),
        ],
        Vec::new(),
        Vec::new(),
    );
    fds.initialize(&schema).unwrap();

    let mut tensors = vec![
        DenseTensor::zeroed(DataType::Int32, [1]),
        DenseTensor::zeroed(DataType::Bool, [1]),
    ];
    let mut buffer = ValueBuffer::new();
    let mut skipped = fds.skipped_data().to_vec();

    // The boolean column holds an invalid byte; the int column before it is fine.
    let mut bytes = encode(&Datum::Record(vec![3i32.into_datum()]));
    bytes.push(7);
    let mut wire = BinaryDecoder::new(&bytes);
    let err = fds
        .decode_record(&mut wire, &mut tensors, &mut buffer, &mut skipped, 0)
        .unwrap_err();
    assert!(matches!(err.kind(), ErrorKind::FeatureDecode { name, .. } if name == "bad"));
    // The column that decoded before the failure keeps its write.
    assert_eq!(tensors[0].values::<i32>().unwrap(), &[3]);
}
