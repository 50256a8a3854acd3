use super::{Connection, Credentials};
use crate::error::Result;
use crate::jdbc;
use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection as _;

struct MySqlSession {
    conn: MySqlConnection,
}

pub(super) async fn connect(credentials: &Credentials) -> Result<Box<dyn Connection>> {
    let endpoint = jdbc::parse_mysql(&credentials.url)?;

    let mut options = MySqlConnectOptions::new()
        .host(&endpoint.host)
        .username(&credentials.user)
        .password(&credentials.password);
    if let Some(port) = endpoint.port {
        options = options.port(port);
    }
    if let Some(database) = &endpoint.database {
        options = options.database(database);
    }

    let conn = MySqlConnection::connect_with(&options).await?;
    Ok(Box::new(MySqlSession { conn }))
}

#[async_trait]
impl Connection for MySqlSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        // text protocol, so DDL and multi-row inserts pass unprepared
        sqlx::Executor::execute(&mut self.conn, sqlx::raw_sql(sql)).await?;
        Ok(())
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.conn.close().await?;
        Ok(())
    }
}
