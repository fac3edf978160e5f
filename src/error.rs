use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::types::Protocol;

/// Misuse of the type model, caught where it happens.
#[derive(Debug, Error)]
pub enum TypeError {
    #[error("coercion is not supported for {0}")]
    UnsupportedCoercion(Protocol),
    #[error("{protocol} does not have a {attribute}")]
    MissingAttribute {
        protocol: Protocol,
        attribute: &'static str,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to access {}", path.display())]
    Io {
        #[source]
        error: io::Error,
        path: PathBuf,
    },
    #[error(transparent)]
    Type(#[from] TypeError),

    #[error("field id {id} in {owner} is out of range, ids must be between 1 and 32767")]
    InvalidFieldId { owner: String, id: i16 },
    #[error("field id {id} is used more than once in {owner}")]
    DuplicateFieldId { owner: String, id: i16 },
    #[error("the name '{name}' is declared more than once in {owner}")]
    DuplicateName { owner: String, name: String },
    #[error("struct '{0}' does not belong to this catalog")]
    UnknownStruct(String),
    #[error("the fields of struct '{0}' have already been defined")]
    AlreadyDefined(String),

    #[error("there is no service named '{0}'")]
    UnknownService(String),
    #[error("no services are declared")]
    NoService,
    #[error("more than one service is declared ({}), pick one by name", .0.join(", "))]
    AmbiguousService(Vec<String>),

    #[error("{0} has no IDL representation")]
    Unrepresentable(String),
    #[error("error walking type {name}")]
    Walk {
        name: String,
        #[source]
        source: Box<Error>,
    },
    #[error("failed to render IDL")]
    Render(#[from] io::Error),

    #[error("{0} is malformed")]
    Malformed(String),
}

pub trait ResultExt {
    type Result;

    fn with_path<P: AsRef<Path>>(self, path: P) -> Self::Result;
    fn with_stdout(self) -> Self::Result;
}

impl<T> ResultExt for Result<T, io::Error> {
    type Result = Result<T, Error>;

    fn with_path<P: AsRef<Path>>(self, path: P) -> Self::Result {
        self.map_err(|error| Error::Io {
            error,
            path: path.as_ref().to_path_buf(),
        })
    }

    fn with_stdout(self) -> Self::Result {
        self.map_err(|error| Error::Io {
            error,
            path: "standard output".into(),
        })
    }
}
