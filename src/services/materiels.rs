//! Equipment service

use crate::{
    error::{AppError, AppResult},
    models::{
        materiel::{CreateMateriel, Materiel, MaterielFilter},
        user::User,
    },
    repository::Repository,
};

#[derive(Clone)]
pub struct MaterielsService {
    repository: Repository,
}

impl MaterielsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Equipment visible to `user` matching `filter`
    pub async fn list(&self, user: &User, filter: MaterielFilter) -> AppResult<Vec<Materiel>> {
        let owner = if user.is_admin { None } else { Some(user.id) };
        self.repository.materiels_list(owner, &filter.normalized()).await
    }

    /// Get equipment, checking that `user` may access it
    pub async fn get(&self, user: &User, id: i32) -> AppResult<Materiel> {
        let materiel = self.repository.materiels_get_by_id(id).await?;
        if !user.can_access(materiel.owner_id) {
            return Err(AppError::Authorization("Not allowed to access this equipment".to_string()));
        }
        Ok(materiel)
    }

    /// Referenced category, location and owner must exist
    async fn check_references(&self, data: &CreateMateriel, owner_id: Option<i32>) -> AppResult<()> {
        if let Some(type_id) = data.material_type_id {
            self.repository.material_types_get_by_id(type_id).await?;
        }
        if let Some(localisation_id) = data.localisation_id {
            self.repository.localisations_get_by_id(localisation_id).await?;
        }
        if let Some(owner_id) = owner_id {
            self.repository.users_get_by_id(owner_id).await?;
        }
        Ok(())
    }

    pub async fn create(&self, user: &User, data: CreateMateriel) -> AppResult<Materiel> {
        let owner_id = match data.owner_id {
            Some(owner_id) if user.is_admin => owner_id,
            _ => user.id,
        };
        self.check_references(&data, Some(owner_id)).await?;

        let materiel = self.repository.materiels_create(&data, Some(owner_id)).await?;
        tracing::info!(materiel_id = materiel.id, owner_id, "equipment created");
        Ok(materiel)
    }

    /// Replace the fields of an equipment record
    ///
    /// Admins set the owner to the supplied value, which may detach the record;
    /// other users keep the current owner.
    pub async fn update(&self, user: &User, id: i32, data: CreateMateriel) -> AppResult<Materiel> {
        let current = self.get(user, id).await?;
        let owner_id = if user.is_admin { data.owner_id } else { current.owner_id };
        self.check_references(&data, owner_id).await?;
        self.repository.materiels_update(id, &data, owner_id).await
    }

    pub async fn delete(&self, user: &User, id: i32) -> AppResult<()> {
        self.get(user, id).await?;
        self.repository.materiels_delete(id).await?;
        tracing::info!(materiel_id = id, "equipment deleted");
        Ok(())
    }
}
