//! The record-local orchestrator.

use fds_common::{Result, error::Error};
use fds_format::{BasicType, Schema, SchemaNode};
use fds_wire::BinaryDecoder;
use tracing::warn;

use crate::buffer::ValueBuffer;
use crate::datum::SkippedDatum;
use crate::decoder::{
    DenseDecoder, FeatureDecoder, NullableDecoder, SkippedDecoder, SparseDecoder, VarlenDecoder,
};
use crate::metadata::{DenseMetadata, FeatureKind, SparseMetadata, VarlenMetadata};
use crate::tensor::DenseTensor;

/// Binds declared feature metadata to a record schema and executes the
/// compiled per-column plan for each record of a batch.
///
/// [`FdsDecoder::initialize`] maps every declared feature to its column
/// position, validates the carrier node, and installs one decoder per schema
/// column; columns no metadata matched get a skip decoder bound to a slot of
/// the skipped-data sink. [`FdsDecoder::decode_record`] then runs the plan in
/// schema order against the wire decoder. The plan is immutable once built,
/// and the schema captured at initialization is authoritative for the
/// decoder's lifetime.
pub struct FdsDecoder {
    dense_features: Vec<DenseMetadata>,
    sparse_features: Vec<SparseMetadata>,
    varlen_features: Vec<VarlenMetadata>,
    feature_names: Vec<String>,
    feature_kinds: Vec<FeatureKind>,
    decoders: Vec<FeatureDecoder>,
    skipped_data: Vec<SkippedDatum>,
    schema: Option<Schema>,
}

impl FdsDecoder {
    pub fn new(
        dense_features: Vec<DenseMetadata>,
        sparse_features: Vec<SparseMetadata>,
        varlen_features: Vec<VarlenMetadata>,
    ) -> FdsDecoder {
        FdsDecoder {
            dense_features,
            sparse_features,
            varlen_features,
            feature_names: Vec::new(),
            feature_kinds: Vec::new(),
            decoders: Vec::new(),
            skipped_data: Vec::new(),
            schema: None,
        }
    }

    /// Compiles the column plan against `schema`.
    ///
    /// The root must be a record. Repeated initialization is idempotent only
    /// for a structurally identical schema; a different schema is rejected,
    /// as all records of all batches must share the schema captured here.
    pub fn initialize(&mut self, schema: &Schema) -> Result<()> {
        if let Some(current) = &self.schema {
            if current == schema {
                return Ok(());
            }
            return Err(Error::schema_mismatch(
                "schema",
                current.text(),
                schema.text(),
            ));
        }

        let root = schema.root().clone();
        if root.basic_type() != BasicType::Record {
            return Err(Error::not_record(root.basic_type().as_str(), schema.text()));
        }

        let columns = root.child_count();
        let mut plan: Vec<Option<FeatureDecoder>> = (0..columns).map(|_| None).collect();
        let mut names = vec![String::new(); columns];
        let mut kinds = vec![FeatureKind::Skipped; columns];

        for metadata in &self.dense_features {
            Self::install(
                schema,
                &root,
                &mut plan,
                &mut names,
                &mut kinds,
                &metadata.name,
                FeatureKind::Dense,
                |node| DenseDecoder::bind(node, metadata).map(FeatureDecoder::Dense),
            )?;
        }
        for metadata in &self.sparse_features {
            Self::install(
                schema,
                &root,
                &mut plan,
                &mut names,
                &mut kinds,
                &metadata.name,
                FeatureKind::Sparse,
                |node| SparseDecoder::bind(node, metadata).map(FeatureDecoder::Sparse),
            )?;
        }
        for metadata in &self.varlen_features {
            Self::install(
                schema,
                &root,
                &mut plan,
                &mut names,
                &mut kinds,
                &metadata.name,
                FeatureKind::Varlen,
                |node| VarlenDecoder::bind(node, metadata).map(FeatureDecoder::Varlen),
            )?;
        }

        let mut decoders = Vec::with_capacity(columns);
        let mut skipped_data = Vec::new();
        for (position, slot) in plan.into_iter().enumerate() {
            match slot {
                Some(decoder) => decoders.push(decoder),
                None => {
                    let node = root.child_at(position).clone();
                    if let Some(name) = node.name() {
                        names[position] = name.to_string();
                        warn!(
                            "column '{name}' from the input data is not used; \
                             parsing an unused column is costly, consider dropping \
                             it from the schema"
                        );
                    }
                    decoders.push(FeatureDecoder::Skipped(SkippedDecoder::new(
                        skipped_data.len(),
                    )));
                    skipped_data.push(SkippedDatum::new(node));
                }
            }
        }

        self.feature_names = names;
        self.feature_kinds = kinds;
        self.decoders = decoders;
        self.skipped_data = skipped_data;
        self.schema = Some(schema.clone());
        Ok(())
    }

    /// Decodes one record, invoking every column decoder in schema order.
    ///
    /// On the first column failure the error is annotated with the column
    /// name and returned; the remaining columns are not read, so the stream
    /// may be left mid-record and the batch must be abandoned. Partial
    /// writes into `tensors` and `buffer` are not unwound.
    pub fn decode_record(
        &self,
        decoder: &mut BinaryDecoder,
        tensors: &mut [DenseTensor],
        buffer: &mut ValueBuffer,
        skipped: &mut [SkippedDatum],
        row_offset: usize,
    ) -> Result<()> {
        if self.schema.is_none() {
            return Err(Error::invalid_arg(
                "decoder",
                "decode_record called before initialize",
            ));
        }
        for (position, column) in self.decoders.iter().enumerate() {
            column
                .decode(decoder, tensors, buffer, skipped, row_offset)
                .map_err(|source| {
                    Error::feature_decode(&self.feature_names[position], source)
                })?;
        }
        Ok(())
    }

    /// The skipped-data sink template built at initialization, one slot per
    /// undeclared column in schema order. Drivers clone it and thread the
    /// clone through `decode_record`.
    pub fn skipped_data(&self) -> &[SkippedDatum] {
        &self.skipped_data
    }

    /// The schema captured at initialization.
    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_ref()
    }

    /// The materialization kind of every schema column, in schema order.
    /// Empty before initialization.
    pub fn feature_kinds(&self) -> &[FeatureKind] {
        &self.feature_kinds
    }

    #[allow(clippy::too_many_arguments)]
    fn install(
        schema: &Schema,
        root: &SchemaNode,
        plan: &mut [Option<FeatureDecoder>],
        names: &mut [String],
        kinds: &mut [FeatureKind],
        name: &str,
        kind: FeatureKind,
        bind: impl FnOnce(&SchemaNode) -> Result<FeatureDecoder>,
    ) -> Result<()> {
        let position = root
            .position_of(name)
            .ok_or_else(|| Error::feature_not_found(name, schema.text()))?;
        if plan[position].is_some() {
            return Err(Error::invalid_arg(
                "features",
                format!("feature '{name}' is declared more than once"),
            ));
        }

        let feature_node = root.child_at(position);
        let decoder = if feature_node.basic_type() == BasicType::Union {
            let non_null_branch = non_null_branch(feature_node).ok_or_else(|| {
                Error::invalid_union_type(name, feature_node.to_json().to_string())
            })?;
            let inner = bind(feature_node.child_at(non_null_branch))?;
            FeatureDecoder::Nullable(NullableDecoder::new(name, non_null_branch, inner))
        } else {
            bind(feature_node)?
        };

        plan[position] = Some(decoder);
        names[position] = name.to_string();
        kinds[position] = kind;
        Ok(())
    }
}

/// The carrier branch of a supported union: the lone branch of a one-branch
/// union, or the non-null branch when exactly one of two branches is null.
fn non_null_branch(node: &SchemaNode) -> Option<usize> {
    match node.child_count() {
        1 => Some(0),
        2 => {
            let null0 = node.child_at(0).basic_type() == BasicType::Null;
            let null1 = node.child_at(1).basic_type() == BasicType::Null;
            match (null0, null1) {
                (true, false) => Some(1),
                (false, true) => Some(0),
                _ => None,
            }
        }
        _ => None,
    }
}
