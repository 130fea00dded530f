pub mod types;

pub use types::{
    DateContext, DateContextError, ErrorKind, ErrorRecord, ProjectMetadata, ProofreadContext,
};
