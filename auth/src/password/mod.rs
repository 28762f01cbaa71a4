pub mod errors;
pub mod policy;

pub use errors::PasswordError;
pub use policy::CredentialMaterial;
pub use policy::PasswordPolicy;
