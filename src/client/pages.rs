//! Screen-level flows
//!
//! Each page keeps its own copy of the rows it shows, fetches them when
//! opened and fetches them again after every mutation. Failures are logged
//! and returned; local rows are only replaced by a successful fetch.

use serde::Serialize;
use validator::Validate;

use super::{
    resource::{Localisations, MaterialTypes, Materiels, Resource, Users},
    table::{self, Table},
    ApiClient, ClientResult,
};
use crate::models::{
    cart::{Cart, CartItem, SubmitCartResponse},
    enums::{RequestStatus, RequestType},
    localisation::{CreateLocalisation, Localisation, LocalisationQuery},
    material_type::{CreateMaterialType, MaterialType},
    materiel::{CreateMateriel, Materiel, MaterielFilter},
    request::{RequestDraft, ServiceRequest, UpdateRequestStatus},
    user::{CreateUser, User},
};

pub const DELETE_REQUEST_PROMPT: &str = "Êtes-vous sûr de vouloir supprimer cette demande ?";
pub const DIRECT_REQUEST_CREATED: &str = "Demande directe créée avec succès !";

/// Query string with no parameters
#[derive(Debug, Clone, Default, Serialize)]
pub struct NoQuery {}

/// List plus create/update/delete over one registry
pub struct RegistryPage<T, I, Q = NoQuery> {
    resource: Resource<T, I>,
    pub query: Q,
    pub rows: Vec<T>,
}

impl<T, I, Q> RegistryPage<T, I, Q>
where
    T: serde::de::DeserializeOwned,
    I: Serialize + Validate,
    Q: Serialize + Default,
{
    pub fn new(resource: Resource<T, I>) -> Self {
        Self {
            resource,
            query: Q::default(),
            rows: Vec::new(),
        }
    }

    pub async fn refresh(&mut self) -> ClientResult<&[T]> {
        match self.resource.list(&self.query).await {
            Ok(rows) => {
                self.rows = rows;
                Ok(&self.rows)
            }
            Err(e) => {
                tracing::error!(path = self.resource.path(), "Failed to fetch list: {}", e);
                Err(e)
            }
        }
    }

    pub async fn create(&mut self, input: &I) -> ClientResult<T> {
        let created = self
            .resource
            .create(input)
            .await
            .inspect_err(|e| tracing::error!(path = self.resource.path(), "Failed to create: {}", e))?;
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: i32, input: &I) -> ClientResult<T> {
        let updated = self
            .resource
            .update(id, input)
            .await
            .inspect_err(|e| tracing::error!(path = self.resource.path(), id, "Failed to update: {}", e))?;
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: i32) -> ClientResult<()> {
        self.resource
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!(path = self.resource.path(), id, "Failed to delete: {}", e))?;
        self.refresh().await?;
        Ok(())
    }
}

pub type InventoryPage = RegistryPage<Materiel, CreateMateriel>;

impl InventoryPage {
    pub async fn open(client: &ApiClient) -> ClientResult<Self> {
        let mut page = Self::new(Materiels::materiels(client.clone()));
        page.refresh().await?;
        Ok(page)
    }

    pub fn table(&self) -> Table {
        table::materiels(&self.rows)
    }
}

/// Locations plus the equipment rows their deletion may affect
pub struct LocationsPage {
    pub registry: RegistryPage<Localisation, CreateLocalisation, LocalisationQuery>,
    pub inventory: InventoryPage,
}

impl LocationsPage {
    pub async fn open(client: &ApiClient, search: Option<String>) -> ClientResult<Self> {
        let mut registry: RegistryPage<_, _, LocalisationQuery> = RegistryPage::new(Localisations::localisations(client.clone()));
        registry.query.search_query = search.filter(|s| !s.trim().is_empty());
        registry.refresh().await?;
        let inventory = InventoryPage::open(client).await?;
        Ok(Self { registry, inventory })
    }

    pub async fn create(&mut self, input: &CreateLocalisation) -> ClientResult<Localisation> {
        self.registry.create(input).await
    }

    pub async fn update(&mut self, id: i32, input: &CreateLocalisation) -> ClientResult<Localisation> {
        self.registry.update(id, input).await
    }

    /// Delete a location, then refresh equipment that pointed at it
    pub async fn delete(&mut self, id: i32) -> ClientResult<()> {
        self.registry.delete(id).await?;
        self.inventory.refresh().await?;
        Ok(())
    }

    pub fn table(&self) -> Table {
        table::localisations(&self.registry.rows)
    }
}

/// Categories plus the equipment rows their deletion may affect
pub struct CategoriesPage {
    pub registry: RegistryPage<MaterialType, CreateMaterialType>,
    pub inventory: InventoryPage,
}

impl CategoriesPage {
    pub async fn open(client: &ApiClient) -> ClientResult<Self> {
        let mut registry = RegistryPage::new(MaterialTypes::material_types(client.clone()));
        registry.refresh().await?;
        let inventory = InventoryPage::open(client).await?;
        Ok(Self { registry, inventory })
    }

    pub async fn create(&mut self, name: &str) -> ClientResult<MaterialType> {
        self.registry
            .create(&CreateMaterialType { name: name.to_string() })
            .await
    }

    pub async fn rename(&mut self, id: i32, name: &str) -> ClientResult<MaterialType> {
        self.registry
            .update(id, &CreateMaterialType { name: name.to_string() })
            .await
    }

    pub async fn delete(&mut self, id: i32) -> ClientResult<()> {
        self.registry.delete(id).await?;
        self.inventory.refresh().await?;
        Ok(())
    }

    pub fn table(&self) -> Table {
        table::material_types(&self.registry.rows)
    }
}

/// User accounts (admin) plus the records a deletion detaches
pub struct UsersPage {
    pub registry: RegistryPage<User, CreateUser>,
    pub inventory: InventoryPage,
    pub locations: RegistryPage<Localisation, CreateLocalisation, LocalisationQuery>,
}

impl UsersPage {
    pub async fn open(client: &ApiClient) -> ClientResult<Self> {
        let mut registry = RegistryPage::new(Users::users(client.clone()));
        registry.refresh().await?;
        let inventory = InventoryPage::open(client).await?;
        let mut locations = RegistryPage::new(Localisations::localisations(client.clone()));
        locations.refresh().await?;
        Ok(Self {
            registry,
            inventory,
            locations,
        })
    }

    pub async fn create(&mut self, input: &CreateUser) -> ClientResult<User> {
        self.registry.create(input).await
    }

    pub async fn delete(&mut self, id: i32) -> ClientResult<()> {
        self.registry.delete(id).await?;
        self.inventory.refresh().await?;
        self.locations.refresh().await?;
        Ok(())
    }

    pub fn table(&self) -> Table {
        table::users(&self.registry.rows)
    }
}

/// Read-only equipment search
pub struct FilterPage {
    materiels: Materiels,
    pub filter: MaterielFilter,
    pub results: Vec<Materiel>,
}

impl FilterPage {
    pub fn new(client: &ApiClient) -> Self {
        Self {
            materiels: Materiels::materiels(client.clone()),
            filter: MaterielFilter::default(),
            results: Vec::new(),
        }
    }

    /// Run `filter`; the result set replaces the displayed rows
    pub async fn apply(&mut self, filter: MaterielFilter) -> ClientResult<&[Materiel]> {
        let filter = filter.normalized();
        match self.materiels.list(&filter).await {
            Ok(rows) => {
                self.filter = filter;
                self.results = rows;
                Ok(&self.results)
            }
            Err(e) => {
                tracing::error!("Failed to fetch filtered equipment: {}", e);
                Err(e)
            }
        }
    }

    pub fn table(&self) -> Table {
        table::filter_results(&self.results)
    }
}

/// The caller's cart
pub struct CartPage {
    client: ApiClient,
    pub cart: Option<Cart>,
}

impl CartPage {
    pub async fn open(client: &ApiClient) -> ClientResult<Self> {
        let mut page = Self {
            client: client.clone(),
            cart: None,
        };
        page.refresh().await?;
        Ok(page)
    }

    pub async fn refresh(&mut self) -> ClientResult<&Cart> {
        let cart: Cart = self
            .client
            .get("/cart/", &NoQuery {})
            .await
            .inspect_err(|e| tracing::error!("Failed to fetch cart: {}", e))?;
        Ok(self.cart.insert(cart))
    }

    pub fn items(&self) -> &[CartItem] {
        self.cart.as_ref().map(|c| c.items.as_slice()).unwrap_or_default()
    }

    pub async fn add(&mut self, materiel_id: i32, request_type: RequestType, description: Option<String>) -> ClientResult<CartItem> {
        let draft = RequestDraft {
            materiel_id,
            request_type,
            description,
        };
        let item: CartItem = self
            .client
            .post("/cart/items", &draft)
            .await
            .inspect_err(|e| tracing::error!(materiel_id, "Failed to add to cart: {}", e))?;
        self.refresh().await?;
        Ok(item)
    }

    pub async fn remove(&mut self, item_id: i32) -> ClientResult<()> {
        self.client
            .delete(&format!("/cart/items/{}", item_id))
            .await
            .inspect_err(|e| tracing::error!(item_id, "Failed to remove cart item: {}", e))?;
        self.refresh().await?;
        Ok(())
    }

    /// Submit every draft in one call
    ///
    /// When the call fails the local items are left as they were.
    pub async fn submit(&mut self) -> ClientResult<SubmitCartResponse> {
        let response: SubmitCartResponse = self
            .client
            .post_empty("/cart/submit")
            .await
            .inspect_err(|e| tracing::error!("Failed to submit cart: {}", e))?;
        tracing::info!(batch_id = %response.batch_id, requests = response.requests_created, "cart submitted");
        self.refresh().await?;
        Ok(response)
    }

    pub fn table(&self) -> Table {
        match &self.cart {
            Some(cart) => table::cart(cart),
            None => Table::new(Vec::new(), table::EMPTY_CART),
        }
    }
}

/// Admin shortcut creating one request without going through the cart
///
/// Failures are only logged.
pub async fn direct_request(client: &ApiClient, draft: &RequestDraft) -> Option<ServiceRequest> {
    match client.post::<ServiceRequest, _>("/requests/direct", draft).await {
        Ok(request) => {
            tracing::info!(request_id = request.id, "{}", DIRECT_REQUEST_CREATED);
            Some(request)
        }
        Err(e) => {
            tracing::error!(materiel_id = draft.materiel_id, "Failed to create direct request: {}", e);
            None
        }
    }
}

/// Requests visible to the caller
pub struct RequestsPage {
    client: ApiClient,
    pub rows: Vec<ServiceRequest>,
}

impl RequestsPage {
    pub async fn open(client: &ApiClient) -> ClientResult<Self> {
        let mut page = Self {
            client: client.clone(),
            rows: Vec::new(),
        };
        page.refresh().await?;
        Ok(page)
    }

    pub async fn refresh(&mut self) -> ClientResult<&[ServiceRequest]> {
        self.rows = self
            .client
            .get("/requests/", &NoQuery {})
            .await
            .inspect_err(|e| tracing::error!("Failed to fetch requests: {}", e))?;
        Ok(&self.rows)
    }

    /// Set a status, then re-fetch the list
    pub async fn set_status(&mut self, id: i32, status: RequestStatus) -> ClientResult<()> {
        let _: ServiceRequest = self
            .client
            .put(&format!("/requests/{}", id), &UpdateRequestStatus { status })
            .await
            .inspect_err(|e| tracing::error!(request_id = id, "Failed to update status: {}", e))?;
        self.refresh().await?;
        Ok(())
    }

    /// Delete a request once `confirm` accepts [`DELETE_REQUEST_PROMPT`]
    ///
    /// Returns `false` when the user declined.
    pub async fn delete(&mut self, id: i32, confirm: impl FnOnce(&str) -> bool) -> ClientResult<bool> {
        if !confirm(DELETE_REQUEST_PROMPT) {
            return Ok(false);
        }
        self.client
            .delete(&format!("/requests/{}", id))
            .await
            .inspect_err(|e| tracing::error!(request_id = id, "Failed to delete request: {}", e))?;
        self.refresh().await?;
        Ok(true)
    }

    pub fn table(&self) -> Table {
        table::requests(&self.rows)
    }
}
