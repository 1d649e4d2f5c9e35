use rotor_dns_domain::ZoneDefaults;
use rotor_dns_infrastructure::repositories::{
    SqliteAuditLogRepository, SqliteStoredRecordRepository, SqliteSubdomainRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;

pub struct Repositories {
    pub records: Arc<SqliteStoredRecordRepository>,
    pub subdomains: Arc<SqliteSubdomainRepository>,
    pub audit_log: Arc<SqliteAuditLogRepository>,
}

impl Repositories {
    pub fn new(pool: SqlitePool, zone: &ZoneDefaults) -> Self {
        Self {
            records: Arc::new(SqliteStoredRecordRepository::new(pool.clone())),
            subdomains: Arc::new(SqliteSubdomainRepository::new(
                pool.clone(),
                zone.server_domain.clone(),
            )),
            audit_log: Arc::new(SqliteAuditLogRepository::new(pool)),
        }
    }
}
