//! Mapping of JDBC URLs onto native connection endpoints
//!
//! Install properties carry the JDBC URL the portal itself uses, so the
//! installer derives host, port and database for its own drivers from it.

use crate::error::{Error, Result};
use url::Url;

/// Network location of a database
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: Option<u16>,
    pub database: Option<String>,
    pub instance: Option<String>,
}

/// `jdbc:mysql://host[:port]/database[?properties]`
pub fn parse_mysql(jdbc_url: &str) -> Result<Endpoint> {
    let raw = jdbc_url
        .strip_prefix("jdbc:")
        .filter(|rest| rest.starts_with("mysql://"))
        .ok_or_else(|| Error::invalid_url(jdbc_url, "expected jdbc:mysql://"))?;
    let url = Url::parse(raw).map_err(|e| Error::invalid_url(jdbc_url, e.to_string()))?;

    let host = url
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| Error::invalid_url(jdbc_url, "missing host"))?;
    let database = url.path().trim_start_matches('/');

    Ok(Endpoint {
        host: host.to_string(),
        port: url.port(),
        database: (!database.is_empty()).then(|| database.to_string()),
        instance: None,
    })
}

/// `jdbc:jtds:sqlserver://host[:port][/database][;property=value...]`
///
/// The Microsoft form `jdbc:sqlserver://host[\instance][:port];...` is
/// accepted as well. `databaseName` and `instance`/`instanceName`
/// properties fill the matching fields.
pub fn parse_sqlserver(jdbc_url: &str) -> Result<Endpoint> {
    let raw = jdbc_url
        .strip_prefix("jdbc:jtds:sqlserver://")
        .or_else(|| jdbc_url.strip_prefix("jdbc:sqlserver://"))
        .ok_or_else(|| Error::invalid_url(jdbc_url, "expected jdbc:jtds:sqlserver://"))?;

    let mut parts = raw.split(';');
    let location = parts.next().unwrap_or_default();
    let (address, database) = match location.split_once('/') {
        Some((address, database)) => (address, Some(database)),
        None => (location, None),
    };
    let (host, port) = match address.split_once(':') {
        Some((host, port)) => {
            let port = port
                .parse::<u16>()
                .map_err(|_| Error::invalid_url(jdbc_url, format!("invalid port '{}'", port)))?;
            (host, Some(port))
        }
        None => (address, None),
    };
    let (host, instance) = match host.split_once('\\') {
        Some((host, instance)) => (host, Some(instance)),
        None => (host, None),
    };
    if host.is_empty() {
        return Err(Error::invalid_url(jdbc_url, "missing host"));
    }

    let mut endpoint = Endpoint {
        host: host.to_string(),
        port,
        database: database.filter(|d| !d.is_empty()).map(str::to_string),
        instance: instance.map(str::to_string),
    };

    for property in parts {
        let Some((key, value)) = property.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "databasename" | "database" => endpoint.database = Some(value.trim().to_string()),
            "instance" | "instancename" => endpoint.instance = Some(value.trim().to_string()),
            _ => {}
        }
    }

    Ok(endpoint)
}

/// Oracle connect string from `jdbc:oracle:thin:@...`
///
/// `@host:port:SID` becomes a full connect descriptor, `@//host:port/service`
/// and `@(DESCRIPTION=...)` are passed through.
pub fn parse_oracle(jdbc_url: &str) -> Result<String> {
    let raw = jdbc_url
        .strip_prefix("jdbc:oracle:thin:@")
        .ok_or_else(|| Error::invalid_url(jdbc_url, "expected jdbc:oracle:thin:@"))?;

    if raw.starts_with("//") || raw.starts_with('(') {
        return Ok(raw.to_string());
    }

    let fields: Vec<&str> = raw.split(':').collect();
    match fields.as_slice() {
        [host, port, sid] if !host.is_empty() && !sid.is_empty() => {
            port.parse::<u16>()
                .map_err(|_| Error::invalid_url(jdbc_url, format!("invalid port '{}'", port)))?;
            Ok(format!(
                "(DESCRIPTION=(ADDRESS=(PROTOCOL=TCP)(HOST={})(PORT={}))(CONNECT_DATA=(SID={})))",
                host, port, sid
            ))
        }
        _ => Err(Error::invalid_url(jdbc_url, "expected host:port:SID")),
    }
}
