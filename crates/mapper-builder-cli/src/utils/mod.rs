pub mod document;

pub(crate) use document::{DocumentFormat, DocumentLoader, load_registry, render};
