use anyhow::{Context, Result};
use diesel::{Connection, ConnectionError, PgConnection};
use diesel_tracing::pg::InstrumentedPgConnection;
use mobc::{async_trait, Manager, Pool};

/// Every query issued through this connection is recorded as a tracing span.
pub type DbConnection = InstrumentedPgConnection;

embed_migrations!();

pub struct PgConnectionManager {
    database_url: String,
}

impl PgConnectionManager {
    pub fn new(database_url: impl Into<String>) -> Self {
        PgConnectionManager {
            database_url: database_url.into(),
        }
    }
}

#[async_trait]
impl Manager for PgConnectionManager {
    type Connection = DbConnection;
    type Error = ConnectionError;

    async fn connect(&self) -> Result<Self::Connection, Self::Error> {
        DbConnection::establish(&self.database_url)
    }

    async fn check(&self, conn: Self::Connection) -> Result<Self::Connection, Self::Error> {
        Ok(conn)
    }
}

pub fn establish_connection_pool(database_url: &str) -> Pool<PgConnectionManager> {
    Pool::new(PgConnectionManager::new(database_url))
}

pub fn run_migrations(database_url: &str) -> Result<()> {
    let conn = PgConnection::establish(database_url)
        .with_context(|| "Failed to connect to the database to run migrations.")?;
    embedded_migrations::run(&conn).with_context(|| "Failed to run database migrations.")?;
    Ok(())
}
