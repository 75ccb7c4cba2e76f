use std::fmt;
use std::sync::Arc;

use ahash::AHashMap;
use fds_common::{Result, error::Error};

/// The kind tag of a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Null,
    Boolean,
    Int,
    Long,
    Float,
    Double,
    Bytes,
    String,
    Record,
    Array,
    Union,
}

impl BasicType {
    /// Returns `true` for the leaf kinds that carry a single wire value.
    pub fn is_primitive(&self) -> bool {
        !matches!(self, BasicType::Record | BasicType::Array | BasicType::Union)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BasicType::Null => "null",
            BasicType::Boolean => "boolean",
            BasicType::Int => "int",
            BasicType::Long => "long",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::Bytes => "bytes",
            BasicType::String => "string",
            BasicType::Record => "record",
            BasicType::Array => "array",
            BasicType::Union => "union",
        }
    }
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single node of the schema tree.
///
/// The `name` of a node is the record field name it is bound to in its parent,
/// when the parent is a record; array items, union branches and the root carry
/// no name. Record nodes additionally index their fields by name.
#[derive(Debug, PartialEq)]
pub struct SchemaNode {
    basic_type: BasicType,
    name: Option<String>,
    children: Vec<Arc<SchemaNode>>,
    field_index: AHashMap<String, usize>,
}

impl SchemaNode {
    /// Creates a leaf node of a primitive kind.
    ///
    /// # Panics
    ///
    /// Panics if `basic_type` is a composite kind.
    pub fn primitive(basic_type: BasicType) -> SchemaNode {
        assert!(basic_type.is_primitive());
        SchemaNode {
            basic_type,
            name: None,
            children: Vec::new(),
            field_index: AHashMap::new(),
        }
    }

    /// Creates an array node with the given item type.
    pub fn array(items: SchemaNode) -> SchemaNode {
        SchemaNode {
            basic_type: BasicType::Array,
            name: None,
            children: vec![Arc::new(items)],
            field_index: AHashMap::new(),
        }
    }

    /// Creates a union node with the given branches, in order.
    pub fn union(branches: Vec<SchemaNode>) -> SchemaNode {
        SchemaNode {
            basic_type: BasicType::Union,
            name: None,
            children: branches.into_iter().map(Arc::new).collect(),
            field_index: AHashMap::new(),
        }
    }

    /// Creates a record node from named fields, in declaration order.
    ///
    /// Fails when two fields share a name.
    pub fn record(fields: Vec<(String, SchemaNode)>) -> Result<SchemaNode> {
        let mut children = Vec::with_capacity(fields.len());
        let mut field_index = AHashMap::with_capacity(fields.len());
        for (position, (name, mut node)) in fields.into_iter().enumerate() {
            if field_index.insert(name.clone(), position).is_some() {
                return Err(Error::invalid_schema(format!(
                    "duplicate record field '{name}'"
                )));
            }
            node.name = Some(name);
            children.push(Arc::new(node));
        }
        Ok(SchemaNode {
            basic_type: BasicType::Record,
            name: None,
            children,
            field_index,
        })
    }

    pub fn basic_type(&self) -> BasicType {
        self.basic_type
    }

    /// The record field name this node is bound to, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn children(&self) -> &[Arc<SchemaNode>] {
        &self.children
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    pub fn child_at(&self, index: usize) -> &Arc<SchemaNode> {
        &self.children[index]
    }

    /// Looks up a record field position by name.
    pub fn position_of(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }
}

/// A parsed schema: the root node plus the JSON text it was parsed from.
///
/// The retained text is used verbatim in error messages and diagnostics.
/// Equality is structural over the node tree, so two schemas that differ
/// only in JSON formatting still compare equal.
#[derive(Debug, Clone)]
pub struct Schema {
    root: Arc<SchemaNode>,
    text: String,
}

impl Schema {
    pub(crate) fn new(root: Arc<SchemaNode>, text: String) -> Schema {
        Schema { root, text }
    }

    pub fn root(&self) -> &Arc<SchemaNode> {
        &self.root
    }

    /// The JSON text this schema was parsed from.
    pub fn text(&self) -> &str {
        &self.text
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Schema) -> bool {
        self.root == other.root
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
