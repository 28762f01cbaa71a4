pub mod claims;
pub mod errors;
pub mod service;

pub use claims::IssuedContext;
pub use claims::RoleClaims;
pub use claims::TokenClaims;
pub use claims::TokenKind;
pub use errors::TokenError;
pub use service::TokenConfig;
pub use service::TokenKindConfig;
pub use service::TokenService;
