//! Data models for Biblioteca

pub mod book;
pub mod document;
pub mod loan;
pub mod person;

// Re-export commonly used types
pub use book::NewBook;
pub use document::{Document, Fields, REQUIRED_FIELDS_MESSAGE};
pub use loan::NewLoan;
pub use person::{NewPerson, PersonRecord};

use validator::Validate;

/// A creatable record kind stored in its own collection
pub trait Record: Validate + Send + Sync + 'static {
    /// Collection the records live in
    const COLLECTION: &'static str;
    /// Message returned when a lookup misses
    const NOT_FOUND: &'static str;

    /// Fields to persist for this record
    fn into_fields(self) -> Fields;
}
