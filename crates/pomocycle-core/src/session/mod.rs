mod catalog;

pub use catalog::{Category, SessionCatalog, SessionKind, SessionSpec};
