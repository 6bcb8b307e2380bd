/// PostgreSQL plumbing
///
/// - `pool`: connection pool creation, health check and shutdown
/// - `migrations`: embedded schema migrations and their status
///
/// Row-level queries live next to the models in `crate::models`; services
/// reach them through `crate::store::PgStore`.

pub mod migrations;
pub mod pool;
