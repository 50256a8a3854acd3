use super::{Connection, Credentials};
use crate::error::Result;

#[cfg(feature = "oracle")]
pub(super) async fn connect(credentials: &Credentials) -> Result<Box<dyn Connection>> {
    session::connect(credentials).await
}

#[cfg(not(feature = "oracle"))]
pub(super) async fn connect(_credentials: &Credentials) -> Result<Box<dyn Connection>> {
    Err(crate::error::Error::Unsupported {
        vendor: "ORACLE".to_string(),
        feature: "oracle",
    })
}

/// The Oracle client is blocking; every call runs on the blocking pool
#[cfg(feature = "oracle")]
mod session {
    use super::{Connection, Credentials};
    use crate::error::{Error, Result};
    use crate::jdbc;
    use async_trait::async_trait;
    use std::sync::Arc;

    struct OracleSession {
        conn: Arc<::oracle::Connection>,
    }

    async fn blocking<T, F>(f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        tokio::task::spawn_blocking(f)
            .await
            .map_err(|e| Error::Sql(format!("Oracle task failed: {}", e)))?
    }

    pub(super) async fn connect(credentials: &Credentials) -> Result<Box<dyn Connection>> {
        let connect_string = jdbc::parse_oracle(&credentials.url)?;
        let user = credentials.user.clone();
        let password = credentials.password.clone();

        let conn = blocking(move || {
            let mut conn = ::oracle::Connection::connect(&user, &password, &connect_string)?;
            conn.set_autocommit(true);
            Ok(conn)
        })
        .await?;

        Ok(Box::new(OracleSession {
            conn: Arc::new(conn),
        }))
    }

    #[async_trait]
    impl Connection for OracleSession {
        async fn execute(&mut self, sql: &str) -> Result<()> {
            let conn = Arc::clone(&self.conn);
            let sql = sql.to_string();
            blocking(move || {
                conn.execute(&sql, &[])?;
                Ok(())
            })
            .await
        }

        async fn query_count(&mut self, sql: &str) -> Result<i64> {
            let conn = Arc::clone(&self.conn);
            let sql = sql.to_string();
            blocking(move || Ok(conn.query_row_as::<i64>(&sql, &[])?)).await
        }

        async fn close(self: Box<Self>) -> Result<()> {
            let conn = self.conn;
            blocking(move || Ok(conn.close()?)).await
        }
    }
}
