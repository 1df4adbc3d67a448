pub mod prepare;

pub use prepare::{LocalPreparer, PrepareError, PreparedTemplate, StatementPreparer};
