//! Business logic services

pub mod cart;
pub mod email;
pub mod localisations;
pub mod material_types;
pub mod materiels;
pub mod requests;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, EmailConfig},
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub users: users::UsersService,
    pub material_types: material_types::MaterialTypesService,
    pub localisations: localisations::LocalisationsService,
    pub materiels: materiels::MaterielsService,
    pub requests: requests::RequestsService,
    pub cart: cart::CartService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, auth_config: AuthConfig, email_config: EmailConfig) -> Self {
        let notifier: Arc<dyn email::Notifier> = Arc::new(email::EmailService::new(email_config));
        Self::with_notifier(repository, auth_config, notifier)
    }

    /// Create all services with a custom batch notifier
    pub fn with_notifier(repository: Repository, auth_config: AuthConfig, notifier: Arc<dyn email::Notifier>) -> Self {
        Self {
            users: users::UsersService::new(repository.clone(), auth_config),
            material_types: material_types::MaterialTypesService::new(repository.clone()),
            localisations: localisations::LocalisationsService::new(repository.clone()),
            materiels: materiels::MaterielsService::new(repository.clone()),
            requests: requests::RequestsService::new(repository.clone()),
            cart: cart::CartService::new(repository, notifier),
        }
    }
}
