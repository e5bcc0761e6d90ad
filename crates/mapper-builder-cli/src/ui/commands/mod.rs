pub mod check;
pub mod convert;
pub mod inspect;

pub use check::{CheckConfig, check_document};
pub use convert::convert_document;
pub use inspect::inspect_schema;
