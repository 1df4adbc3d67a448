pub mod app;
pub mod crypto;
pub mod domain;
pub mod infra;
pub mod storage;

// Convenience re-exports (keeps call-sites clean)
pub use app::bootstrap::{prepare_registry, PreparedCatalog};
pub use crypto::hashing::statement_id;
pub use domain::codec::{CompositeKeyCodec, DecodeError, KeyValue, RawColumn, WideMapMeta};
pub use domain::model::{EntityMeta, EntityRegistry, MetadataError, PropertyKind, PropertyMeta};
pub use domain::statement::{GeneratorError, StatementGenerator};
pub use storage::{LocalPreparer, PreparedTemplate, StatementPreparer};
