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

    pub fn invalid_arg(name: impl Into<String>, message: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidArgument {
                name: name.into(),
                message: message.into(),
            }
            .into(),
        )
    }

    pub fn invalid_operation(name: impl Into<String>) -> Error {
        Error(ErrorKind::InvalidOperation { name: name.into() }.into())
    }

    pub fn duplicate_target_group(group: i32) -> Error {
        Error(ErrorKind::DuplicateTargetGroup { group }.into())
    }

    pub fn type_mismatch(
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Error {
        Error(
            ErrorKind::TypeMismatch {
                field: field.into(),
                expected: expected.into(),
                actual: actual.into(),
            }
            .into(),
        )
    }

    pub fn ambiguous_regroup(doc: usize, source_group: i32) -> Error {
        Error(ErrorKind::AmbiguousRegroup { doc, source_group }.into())
    }

    pub fn field_not_found(field: impl Into<String>) -> Error {
        Error(
            ErrorKind::FieldNotFound {
                field: field.into(),
            }
            .into(),
        )
    }

    pub fn build(field: impl Into<String>, source: Error) -> Error {
        Error(
            ErrorKind::Build {
                field: field.into(),
                source,
            }
            .into(),
        )
    }

    pub fn invalid_handle(handle: impl Into<String>) -> Error {
        Error(
            ErrorKind::InvalidHandle {
                handle: handle.into(),
            }
            .into(),
        )
    }

    /// Returns `true` if this error reports a field missing from a shard.
    pub fn is_field_not_found(&self) -> bool {
        matches!(self.kind(), ErrorKind::FieldNotFound { .. })
    }
}

#[derive(Debug, Error)]
pub enum ErrorKind {
    #[error("invalid argument {name}: {message}")]
    InvalidArgument { name: String, message: String },

    #[error("invalid operation {name}")]
    InvalidOperation { name: String },

    #[error("duplicate remap rule for source group {group}")]
    DuplicateTargetGroup { group: i32 },

    #[error("type mismatch for field '{field}': expected {expected}, found {actual}")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: String,
    },

    #[error("document {doc} in group {source_group} matches more than one positive condition")]
    AmbiguousRegroup { doc: usize, source_group: i32 },

    #[error("field '{field}' not found")]
    FieldNotFound { field: String },

    #[error("failed to build term provider for field '{field}': {source}")]
    Build { field: String, source: Error },

    #[error("invalid or released handle {handle}")]
    InvalidHandle { handle: String },
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error(kind.into())
    }
}
