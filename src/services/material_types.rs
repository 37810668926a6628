//! Equipment category service

use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::material_type::{CreateMaterialType, MaterialType},
    repository::Repository,
};

#[derive(Clone)]
pub struct MaterialTypesService {
    repository: Repository,
}

impl MaterialTypesService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<MaterialType>> {
        self.repository.material_types_list().await
    }

    pub async fn create(&self, data: CreateMaterialType) -> AppResult<MaterialType> {
        let name = normalized_name(&data)?;
        if self.repository.material_types_name_exists(name, None).await? {
            return Err(AppError::Conflict(format!("Material type '{}' already exists", name)));
        }
        self.repository.material_types_create(name).await
    }

    pub async fn update(&self, id: i32, data: CreateMaterialType) -> AppResult<MaterialType> {
        let name = normalized_name(&data)?;
        if self.repository.material_types_name_exists(name, Some(id)).await? {
            return Err(AppError::Conflict(format!("Material type '{}' already exists", name)));
        }
        self.repository.material_types_update(id, name).await
    }

    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.material_types_delete(id).await?;
        tracing::info!(material_type_id = id, "material type deleted");
        Ok(())
    }
}

/// Validate and trim a category name; blank names are rejected
fn normalized_name(data: &CreateMaterialType) -> AppResult<&str> {
    data.validate()?;
    let name = data.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    Ok(name)
}
