//! Generic CRUD service for single-collection records (books, loans)

use std::marker::PhantomData;

use crate::{
    error::{AppError, AppResult},
    models::{Document, Fields, Record},
    repository::Repository,
};

pub struct RecordService<R> {
    repository: Repository,
    _record: PhantomData<fn() -> R>,
}

impl<R> Clone for RecordService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: self.repository.clone(),
            _record: PhantomData,
        }
    }
}

impl<R: Record> RecordService<R> {
    pub fn new(repository: Repository) -> Self {
        Self {
            repository,
            _record: PhantomData,
        }
    }

    /// Every record of the collection, in store order
    pub async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.repository.documents.list(R::COLLECTION).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Document> {
        self.repository
            .documents
            .get(R::COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::NotFound(R::NOT_FOUND.to_string()))
    }

    /// Validate and insert a record, returning its generated id
    pub async fn create(&self, record: R) -> AppResult<String> {
        record.validate()?;

        let id = self
            .repository
            .documents
            .insert(R::COLLECTION, record.into_fields())
            .await?;
        tracing::info!("Created {}/{}", R::COLLECTION, id);
        Ok(id)
    }

    /// Merge a partial record; fields are not validated
    pub async fn update(&self, id: &str, fields: Fields) -> AppResult<()> {
        self.repository.documents.merge(R::COLLECTION, id, fields).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> AppResult<()> {
        self.repository.documents.delete(R::COLLECTION, id).await?;
        tracing::info!("Deleted {}/{}", R::COLLECTION, id);
        Ok(())
    }

    /// Validate every record, then insert them one by one.
    ///
    /// A validation failure anywhere means nothing is inserted. Inserts are
    /// independent: a store failure midway leaves the earlier ones in place.
    pub async fn bulk_create(&self, records: Vec<R>) -> AppResult<Vec<String>> {
        for (index, record) in records.iter().enumerate() {
            if let Err(errors) = record.validate() {
                tracing::debug!("Bulk {} rejected at element {}", R::COLLECTION, index);
                return Err(errors.into());
            }
        }

        let total = records.len();
        let mut ids = Vec::with_capacity(total);
        for record in records {
            match self
                .repository
                .documents
                .insert(R::COLLECTION, record.into_fields())
                .await
            {
                Ok(id) => ids.push(id),
                Err(e) if ids.is_empty() => return Err(e.into()),
                Err(e) => {
                    tracing::warn!(
                        "Bulk {} stopped after {} of {} inserts: {}",
                        R::COLLECTION,
                        ids.len(),
                        total,
                        e
                    );
                    return Err(AppError::Incomplete(format!(
                        "{} of {} {} inserted ({}): {}",
                        ids.len(),
                        total,
                        R::COLLECTION,
                        ids.join(", "),
                        e
                    )));
                }
            }
        }

        tracing::info!("Bulk created {} {}", ids.len(), R::COLLECTION);
        Ok(ids)
    }
}
