//! People service: person documents paired with authentication principals

use crate::{
    error::{AppError, AppResult},
    models::{Document, Fields, NewPerson, PersonRecord},
    repository::{Repository, StoreError},
};

/// Outcome of an operation made of two dependent external effects
#[derive(Debug)]
pub enum TwoPhase {
    /// Both effects applied
    Completed { id: String },
    /// The first effect applied, the second failed and was not rolled back
    Partial { id: String, error: StoreError },
    /// The first effect failed; nothing changed
    Failed(StoreError),
}

impl TwoPhase {
    /// Collapse into the id on success or an application error otherwise
    pub fn into_result(self) -> AppResult<String> {
        match self {
            TwoPhase::Completed { id } => Ok(id),
            TwoPhase::Partial { id, error } => Err(AppError::Incomplete(format!(
                "authentication principal {} left orphaned: {}",
                id, error
            ))),
            TwoPhase::Failed(error) => Err(error.into()),
        }
    }
}

#[derive(Clone)]
pub struct PeopleService {
    repository: Repository,
}

impl PeopleService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Document>> {
        Ok(self.repository.documents.list(PersonRecord::COLLECTION).await?)
    }

    pub async fn get(&self, id: &str) -> AppResult<Document> {
        self.repository
            .documents
            .get(PersonRecord::COLLECTION, id)
            .await?
            .ok_or_else(|| AppError::NotFound(PersonRecord::NOT_FOUND.to_string()))
    }

    /// Provision the principal, then write the person document under its id.
    ///
    /// Validation failures are returned as errors before anything happens;
    /// store outcomes are reported through [`TwoPhase`].
    pub async fn create(&self, person: NewPerson) -> AppResult<TwoPhase> {
        let (credentials, record) = person.split()?;

        let id = match self
            .repository
            .identities
            .create_principal(&credentials.email, &credentials.password)
            .await
        {
            Ok(id) => id,
            Err(error) => return Ok(TwoPhase::Failed(error)),
        };

        let outcome = match self
            .repository
            .documents
            .set(PersonRecord::COLLECTION, &id, record.into_fields())
            .await
        {
            Ok(()) => {
                tracing::info!("Created person {}", id);
                TwoPhase::Completed { id }
            }
            Err(error) => {
                tracing::warn!("Person document for principal {} not written: {}", id, error);
                TwoPhase::Partial { id, error }
            }
        };
        Ok(outcome)
    }

    /// Merge a partial person; no validation, the dni is not re-checked
    pub async fn update(&self, id: &str, fields: Fields) -> AppResult<()> {
        self.repository
            .documents
            .merge(PersonRecord::COLLECTION, id, fields)
            .await?;
        Ok(())
    }

    /// Delete the person document, then its authentication principal
    pub async fn delete(&self, id: &str) -> TwoPhase {
        if let Err(error) = self
            .repository
            .documents
            .delete(PersonRecord::COLLECTION, id)
            .await
        {
            return TwoPhase::Failed(error);
        }

        match self.repository.identities.delete_principal(id).await {
            Ok(()) => {
                tracing::info!("Deleted person {}", id);
                TwoPhase::Completed { id: id.to_string() }
            }
            Err(error) => {
                tracing::warn!("Person {} deleted but principal remains: {}", id, error);
                TwoPhase::Partial {
                    id: id.to_string(),
                    error,
                }
            }
        }
    }
}
