//! Data models shared by the server and the client

pub mod cart;
pub mod dates;
pub mod enums;
pub mod localisation;
pub mod material_type;
pub mod materiel;
pub mod request;
pub mod user;

// Re-export commonly used types
pub use cart::{Cart, CartItem, SubmitCartResponse};
pub use enums::{RequestStatus, RequestType};
pub use localisation::{CreateLocalisation, Localisation};
pub use material_type::{CreateMaterialType, MaterialType};
pub use materiel::{CreateMateriel, Materiel, MaterielFilter};
pub use request::{RequestDraft, ServiceRequest, UpdateRequestStatus};
pub use user::{CreateUser, User};
