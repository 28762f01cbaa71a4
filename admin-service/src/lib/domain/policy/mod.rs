pub mod consent;
pub mod errors;
pub mod guard;
pub mod models;
pub mod ports;

pub use consent::PolicyConsentService;
pub use errors::GuardError;
pub use guard::GuardPipeline;
pub use guard::PolicyAcceptanceGuard;
pub use guard::RequestGuard;
pub use models::AcceptanceRecord;
pub use models::GuardContext;
pub use models::PolicyId;
pub use models::PolicyRecord;
pub use models::PolicyType;
pub use models::StalePolicyDetails;
