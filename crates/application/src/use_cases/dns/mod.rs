pub mod handle_dns_query;
mod record_locks;
pub mod resolve_query;

pub use handle_dns_query::HandleDnsQueryUseCase;
pub use resolve_query::{Resolution, ResolveQueryUseCase};
