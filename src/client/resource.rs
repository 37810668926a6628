//! Generic CRUD client for one registry

use std::marker::PhantomData;

use serde::{de::DeserializeOwned, Serialize};
use validator::Validate;

use super::{ApiClient, ClientResult};
use crate::models::{
    localisation::{CreateLocalisation, Localisation},
    material_type::{CreateMaterialType, MaterialType},
    materiel::{CreateMateriel, Materiel},
    user::{CreateUser, User},
};

/// List/create/update/delete over `path` (e.g. `/materiels/`)
///
/// `T` is the record returned by the server, `I` the form sent to it.
/// Required fields of `I` are checked before anything is sent.
pub struct Resource<T, I> {
    client: ApiClient,
    path: &'static str,
    _marker: PhantomData<fn() -> (T, I)>,
}

impl<T, I> Clone for Resource<T, I> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            path: self.path,
            _marker: PhantomData,
        }
    }
}

pub type Materiels = Resource<Materiel, CreateMateriel>;
pub type Localisations = Resource<Localisation, CreateLocalisation>;
pub type MaterialTypes = Resource<MaterialType, CreateMaterialType>;
pub type Users = Resource<User, CreateUser>;

impl<T, I> Resource<T, I>
where
    T: DeserializeOwned,
    I: Serialize + Validate,
{
    pub fn new(client: ApiClient, path: &'static str) -> Self {
        Self {
            client,
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }

    fn item_path(&self, id: i32) -> String {
        format!("{}/{}", self.path.trim_end_matches('/'), id)
    }

    pub async fn list<Q: Serialize + ?Sized>(&self, query: &Q) -> ClientResult<Vec<T>> {
        self.client.get(self.path, query).await
    }

    pub async fn create(&self, input: &I) -> ClientResult<T> {
        input.validate()?;
        self.client.post(self.path, input).await
    }

    pub async fn update(&self, id: i32, input: &I) -> ClientResult<T> {
        input.validate()?;
        self.client.put(&self.item_path(id), input).await
    }

    pub async fn delete(&self, id: i32) -> ClientResult<()> {
        self.client.delete(&self.item_path(id)).await
    }
}

impl Materiels {
    pub fn materiels(client: ApiClient) -> Self {
        Self::new(client, "/materiels/")
    }
}

impl Localisations {
    pub fn localisations(client: ApiClient) -> Self {
        Self::new(client, "/localisations/")
    }
}

impl MaterialTypes {
    pub fn material_types(client: ApiClient) -> Self {
        Self::new(client, "/material_types/")
    }
}

impl Users {
    pub fn users(client: ApiClient) -> Self {
        Self::new(client, "/users/")
    }
}
