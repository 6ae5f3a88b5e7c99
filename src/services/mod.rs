//! Business logic services

pub mod people;
pub mod records;

use crate::{
    models::{NewBook, NewLoan},
    repository::Repository,
};

pub type BooksService = records::RecordService<NewBook>;
pub type LoansService = records::RecordService<NewLoan>;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: BooksService,
    pub people: people::PeopleService,
    pub loans: LoansService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository) -> Self {
        Self {
            books: BooksService::new(repository.clone()),
            people: people::PeopleService::new(repository.clone()),
            loans: LoansService::new(repository),
        }
    }
}
