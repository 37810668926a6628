//! Location service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::{
        localisation::{CreateLocalisation, Localisation},
        user::User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct LocalisationsService {
    repository: Repository,
}

impl LocalisationsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Locations visible to `user`: all of them for admins, owned ones otherwise
    pub async fn list(&self, user: &User, search: Option<&str>) -> AppResult<Vec<Localisation>> {
        let owner = if user.is_admin { None } else { Some(user.id) };
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        self.repository.localisations_list(owner, search).await
    }

    pub async fn get(&self, user: &User, id: i32) -> AppResult<Localisation> {
        let localisation = self.repository.localisations_get_by_id(id).await?;
        if !user.can_access(localisation.owner_id) {
            return Err(AppError::Authorization("Not allowed to access this location".to_string()));
        }
        Ok(localisation)
    }

    pub async fn create(&self, user: &User, data: CreateLocalisation) -> AppResult<Localisation> {
        data.validate()?;

        let owner_id = match data.owner_id {
            Some(owner_id) if user.is_admin => {
                self.repository.users_get_by_id(owner_id).await?;
                owner_id
            }
            _ => user.id,
        };

        let localisation = self.repository.localisations_create(&data, owner_id).await?;
        tracing::info!(localisation_id = localisation.id, owner_id, "location created");
        Ok(localisation)
    }

    pub async fn update(&self, user: &User, id: i32, data: CreateLocalisation) -> AppResult<Localisation> {
        data.validate()?;
        let current = self.get(user, id).await?;

        let owner_id = match data.owner_id {
            Some(owner_id) if user.is_admin => {
                self.repository.users_get_by_id(owner_id).await?;
                Some(owner_id)
            }
            _ => current.owner_id,
        };

        self.repository.localisations_update(id, &data, owner_id).await
    }

    /// Delete a location; equipment placed there keeps no location
    pub async fn delete(&self, user: &User, id: i32) -> AppResult<()> {
        self.get(user, id).await?;
        self.repository.localisations_delete(id).await?;
        tracing::info!(localisation_id = id, "location deleted");
        Ok(())
    }
}
