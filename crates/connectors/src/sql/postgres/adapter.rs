use crate::{
    error::{ConnectorError, DbError},
    sql::postgres::utils::connect_client,
};
use std::sync::Arc;
use tokio_postgres::{Client, Row, types::ToSql};
use tracing::debug;

/// Shared handle on a single PostgreSQL connection.
#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<Client>,
}

impl PgAdapter {
    pub async fn connect(url: &str) -> Result<Self, ConnectorError> {
        let client = connect_client(url).await?;
        Ok(PgAdapter {
            client: Arc::new(client),
        })
    }

    /// Runs one or more statements without parameters.
    pub async fn exec(&self, sql: &str) -> Result<(), DbError> {
        debug!(sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    pub async fn exec_params(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<u64, DbError> {
        Ok(self.client.execute(sql, params).await?)
    }

    pub async fn query_one(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Row, DbError> {
        Ok(self.client.query_one(sql, params).await?)
    }

    pub async fn query_opt(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> Result<Option<Row>, DbError> {
        Ok(self.client.query_opt(sql, params).await?)
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}
