pub mod errors;
pub mod models;
pub mod ports;
pub mod service;

pub use errors::AuthError;
pub use errors::ErrorKind;
pub use models::AccessScope;
pub use models::Credential;
pub use models::LoginResponse;
pub use models::LoginStatus;
pub use models::RefreshResponse;
pub use models::Role;
pub use models::RoleId;
pub use models::User;
pub use models::UserId;
pub use service::AuthService;
