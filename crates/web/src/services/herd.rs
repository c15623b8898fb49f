//! Herd service: the signed-in rancher's animals and their health records.
//!
//! Every read is scoped to the rancher (`ganadero_id`) and made with their
//! access token. Forms are validated locally before anything is sent.

use agrotrack_core::animal::{Animal, AnimalForm, AnimalLocation};
use agrotrack_core::health::{HealthForm, HealthRecord};
use agrotrack_core::pedigree::{Pedigree, PedigreeLimits, build_pedigree};
use agrotrack_core::{AnimalId, ValidationError};
use thiserror::Error;
use tracing::{info, instrument};

use crate::models::UserIdentity;
use crate::supabase::{DataApi, Order, SupabaseError, TableQuery};

const ANIMALS: &str = "animals";
const HEALTH_RECORDS: &str = "health_records";

/// Errors that can occur during herd operations.
#[derive(Debug, Error)]
pub enum HerdError {
    /// Form input rejected before contacting the backend.
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// The backend read or write failed.
    #[error("query failed: {0}")]
    Query(#[from] SupabaseError),
}

impl HerdError {
    /// Message suitable for showing next to the form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Query(e) => e.user_message(),
        }
    }
}

/// Herd operations for one rancher.
pub struct HerdService<'a, D> {
    data: &'a D,
    rancher: &'a UserIdentity,
}

impl<'a, D: DataApi> HerdService<'a, D> {
    #[must_use]
    pub const fn new(data: &'a D, rancher: &'a UserIdentity) -> Self {
        Self { data, rancher }
    }

    fn token(&self) -> Option<&str> {
        Some(self.rancher.access_token())
    }

    fn owned_animals(&self) -> TableQuery {
        TableQuery::new(ANIMALS).eq("ganadero_id", self.rancher.id)
    }

    /// All of the rancher's animals, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Query` if the backend read fails.
    #[instrument(skip(self), fields(rancher_id = %self.rancher.id))]
    pub async fn animals(&self) -> Result<Vec<Animal>, HerdError> {
        let query = self.owned_animals().order("created_at", Order::Descending);
        Ok(self.data.select(&query, self.token()).await?)
    }

    /// Map markers for the rancher's animals.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Query` if the backend read fails.
    #[instrument(skip(self), fields(rancher_id = %self.rancher.id))]
    pub async fn locations(&self) -> Result<Vec<AnimalLocation>, HerdError> {
        let query = self
            .owned_animals()
            .columns("name,location,latitude,longitude");
        Ok(self.data.select(&query, self.token()).await?)
    }

    /// Validate and register a new animal.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Validation` without contacting the backend when
    /// the form is invalid, or `HerdError::Query` if the insert fails.
    #[instrument(skip(self, form), fields(rancher_id = %self.rancher.id))]
    pub async fn register(&self, form: &AnimalForm) -> Result<Animal, HerdError> {
        let new_animal = form.validate(self.rancher.id)?;
        let animal: Animal = self
            .data
            .insert(ANIMALS, &new_animal, self.token())
            .await?;
        info!(animal_id = %animal.id, "Animal registered");
        Ok(animal)
    }

    /// Ancestry tree rooted at `root`, or `None` if the rancher has no such
    /// animal. Branches beyond `limits` are cut and flagged.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Query` if the backend read fails.
    #[instrument(skip(self), fields(rancher_id = %self.rancher.id))]
    pub async fn pedigree(
        &self,
        root: AnimalId,
        limits: PedigreeLimits,
    ) -> Result<Option<Pedigree>, HerdError> {
        let animals: Vec<Animal> = self
            .data
            .select(&self.owned_animals(), self.token())
            .await?;
        Ok(build_pedigree(&animals, root, limits))
    }

    /// Health records for one animal, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Query` if the backend read fails.
    #[instrument(skip(self), fields(rancher_id = %self.rancher.id))]
    pub async fn health_records(&self, animal: AnimalId) -> Result<Vec<HealthRecord>, HerdError> {
        let query = TableQuery::new(HEALTH_RECORDS)
            .eq("animal_id", animal)
            .order("created_at", Order::Descending);
        Ok(self.data.select(&query, self.token()).await?)
    }

    /// Validate and store a health record.
    ///
    /// # Errors
    ///
    /// Returns `HerdError::Validation` without contacting the backend when
    /// the form is invalid, or `HerdError::Query` if the insert fails.
    #[instrument(skip(self, form), fields(rancher_id = %self.rancher.id))]
    pub async fn add_health_record(&self, form: &HealthForm) -> Result<HealthRecord, HerdError> {
        let new_record = form.validate()?;
        let record: HealthRecord = self
            .data
            .insert(HEALTH_RECORDS, &new_record, self.token())
            .await?;
        info!(animal_id = %record.animal_id, sick = record.is_sick(), "Health record added");
        Ok(record)
    }
}
