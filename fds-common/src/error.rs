use thiserror::Error;

#[derive(Debug, Error)]
#[error(transparent)]
pub struct Error(Box<ErrorKind>);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        self.0.as_ref()
    }

    pub fn into_kind(self) -> ErrorKind {
        *self.0
    }

    pub fn not_record(kind: impl Into<String>, schema: impl Into<String>) -> Error {
        Error(
            ErrorKind::NotRecord {
                kind: kind.into(),
                schema: schema.into(),
            }
            .into(),
        )
    }

    pub fn feature_not_found(name: impl Into<String>, schema: impl Into<String>) -> Error {
        Error(
            ErrorKind::FeatureNotFound {
                name: name.into(),
                schema: schema.into(),
            }
            .into(),
        )
    }

    pub fn invalid_union_type(name: impl Into<String>, node: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidUnionType {
                name: name.into(),
                node: node.into(),
            }
            .into(),
        )
    }

    pub fn schema_mismatch(
        name: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::SchemaMismatch {
                name: name.into(),
                expected: expected.into(),
                actual: actual.into(),
            }
            .into(),
        )
    }

    pub fn null_value(name: impl Into<String>) -> Error {
        Error(ErrorKind::NullValue { name: name.into() }.into())
    }

    pub fn feature_decode(name: impl Into<String>, source: Error) -> Error {
        Error(
            ErrorKind::FeatureDecode {
                name: name.into(),
                source: Box::new(source),
            }
            .into(),
        )
    }

    pub fn decode(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::Decode {
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_schema(message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidSchema {
                message: message.into(),
            }
            .into(),
        )
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("expected a record schema at the root, found '{kind}': {schema}")]
    NotRecord { kind: String, schema: String },

    #[error("feature '{name}' is not part of the schema: {schema}")]
    FeatureNotFound { name: String, schema: String },

    #[error("feature '{name}' carries an unsupported union arrangement: {node}")]
    InvalidUnionType { name: String, node: String },

    #[error("schema mismatch for feature '{name}': expected {expected}, found {actual}")]
    SchemaMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("nullable feature '{name}' holds a null value")]
    NullValue { name: String },

    #[error("failed to decode feature '{name}': {source}")]
    FeatureDecode { name: String, source: Box<Error> },

    #[error("decode error: {message}")]
    Decode { message: String },

    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid schema: {message}")]
    InvalidSchema { message: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
