//! Schema JSON generation in the FeaturizedDataset conventions.

use fds_decode::DataType;
use fds_format::Schema;
use serde_json::{Value, json};

/// Assembles the JSON text of a FeaturizedDataset record schema, one feature
/// column at a time.
///
/// Dense and varlen columns are nests of arrays around a primitive; sparse
/// columns are sub-records of `indicesK` and `values` fields whose order is
/// controllable for permutation tests. `String` and `Bytes` dtypes pick the
/// `"string"` and `"bytes"` carriers respectively, which lets a test pair
/// either carrier with either declared dtype.
#[derive(Default)]
pub struct FdsSchemaBuilder {
    fields: Vec<Value>,
}

impl FdsSchemaBuilder {
    pub fn new() -> FdsSchemaBuilder {
        FdsSchemaBuilder::default()
    }

    /// Adds a feature with an arbitrary type, for columns outside the
    /// dense/sparse/varlen conventions.
    pub fn add_feature(mut self, name: &str, feature_type: Value) -> FdsSchemaBuilder {
        self.fields.push(json!({ "name": name, "type": feature_type }));
        self
    }

    /// Adds a dense feature: `rank` nested arrays around the dtype's
    /// primitive carrier, or the bare primitive for rank 0.
    pub fn add_dense_feature(self, name: &str, dtype: DataType, rank: usize) -> FdsSchemaBuilder {
        let feature_type = array_type(dtype, rank);
        self.add_feature(name, feature_type)
    }

    /// Adds a dense feature wrapped in a `[null, T]` union.
    pub fn add_nullable_dense_feature(
        self,
        name: &str,
        dtype: DataType,
        rank: usize,
    ) -> FdsSchemaBuilder {
        let feature_type = json!(["null", array_type(dtype, rank)]);
        self.add_feature(name, feature_type)
    }

    /// Adds a varlen feature, which is wire-identical to a dense feature.
    pub fn add_varlen_feature(self, name: &str, dtype: DataType, rank: usize) -> FdsSchemaBuilder {
        self.add_dense_feature(name, dtype, rank)
    }

    /// Adds a sparse feature with the canonical sub-record order:
    /// `indices0 .. indices{rank-1}` followed by `values`.
    pub fn add_sparse_feature(self, name: &str, dtype: DataType, rank: usize) -> FdsSchemaBuilder {
        let order: Vec<usize> = (0..=rank).collect();
        self.add_sparse_feature_with_order(name, dtype, &order)
    }

    /// Adds a sparse feature with an explicit sub-record field order.
    ///
    /// `order` has `rank + 1` entries; entry `i` names the logical field at
    /// sub-record position `i`: the value `rank` places the `values` field,
    /// any other value `K` places `indicesK`.
    pub fn add_sparse_feature_with_order(
        self,
        name: &str,
        dtype: DataType,
        order: &[usize],
    ) -> FdsSchemaBuilder {
        let rank = order.len() - 1;
        let fields: Vec<Value> = order
            .iter()
            .map(|&slot| {
                if slot == rank {
                    json!({ "name": "values", "type": array_type(dtype, 1) })
                } else {
                    json!({
                        "name": format!("indices{slot}"),
                        "type": array_type(DataType::Int64, 1),
                    })
                }
            })
            .collect();
        let feature_type = json!({
            "type": "record",
            "name": name,
            "fields": fields,
        });
        self.add_feature(name, feature_type)
    }

    /// The assembled schema JSON text.
    pub fn build(&self) -> String {
        json!({
            "type": "record",
            "name": "FeaturizedDataset",
            "fields": self.fields.clone(),
        })
        .to_string()
    }

    /// Parses the assembled text into a [`Schema`].
    pub fn build_schema(&self) -> anyhow::Result<Schema> {
        Ok(Schema::from_json(&self.build())?)
    }
}

fn primitive_type(dtype: DataType) -> Value {
    let name = match dtype {
        DataType::Int32 => "int",
        DataType::Int64 => "long",
        DataType::Float32 => "float",
        DataType::Float64 => "double",
        DataType::Bool => "boolean",
        DataType::String => "string",
        DataType::Bytes => "bytes",
    };
    Value::String(name.to_string())
}

fn array_type(dtype: DataType, rank: usize) -> Value {
    let mut node = primitive_type(dtype);
    for _ in 0..rank {
        node = json!({ "type": "array", "items": node });
    }
    node
}
