pub mod audit;
pub mod dns;

pub use audit::AuditQueryUseCase;
pub use dns::{HandleDnsQueryUseCase, Resolution, ResolveQueryUseCase};
