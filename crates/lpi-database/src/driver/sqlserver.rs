use super::{Connection, Credentials};
use crate::error::{Error, Result};
use crate::jdbc;
use async_trait::async_trait;
use tiberius::{AuthMethod, Client, Config};
use tokio::net::TcpStream;
use tokio_util::compat::{Compat, TokioAsyncWriteCompatExt};

const DEFAULT_PORT: u16 = 1433;

struct SqlServerSession {
    client: Client<Compat<TcpStream>>,
}

pub(super) async fn connect(credentials: &Credentials) -> Result<Box<dyn Connection>> {
    let endpoint = jdbc::parse_sqlserver(&credentials.url)?;

    let mut config = Config::new();
    config.host(&endpoint.host);
    config.port(endpoint.port.unwrap_or(DEFAULT_PORT));
    if let Some(database) = &endpoint.database {
        config.database(database);
    }
    if let Some(instance) = &endpoint.instance {
        config.instance_name(instance);
    }
    config.authentication(AuthMethod::sql_server(&credentials.user, &credentials.password));
    config.trust_cert();

    let tcp = TcpStream::connect(config.get_addr()).await?;
    tcp.set_nodelay(true)?;
    let client = Client::connect(config, tcp.compat_write()).await?;

    Ok(Box::new(SqlServerSession { client }))
}

#[async_trait]
impl Connection for SqlServerSession {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.client.simple_query(sql).await?.into_results().await?;
        Ok(())
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        let row = self.client.simple_query(sql).await?.into_row().await?;
        row.and_then(|row| row.get::<i32, _>(0))
            .map(i64::from)
            .ok_or_else(|| Error::Sql(format!("No count returned by: {}", sql)))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.client.close().await?;
        Ok(())
    }
}
