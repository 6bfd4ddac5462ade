//! Retrieval layer for Compliance Hub
//!
//! Defines the collaborator interfaces the context assembler depends on
//! (similarity search + expansion, external search) and provides an
//! in-memory index for development and testing.

pub mod corpus;
pub mod error;
pub mod external;
pub mod memory;
pub mod traits;

pub use corpus::{CorpusDocument, load_corpus};
pub use error::RetrievalError;
pub use external::{DisabledExternalSearch, HttpExternalSearch};
pub use memory::InMemoryIndex;
pub use traits::{ExternalSearch, RetrievalBackend, ScoredUnit};
