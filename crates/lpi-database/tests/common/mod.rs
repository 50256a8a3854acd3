//! Common test infrastructure for lpi-database tests

#![allow(dead_code)]

use async_trait::async_trait;
use lpi_core::config::DatabaseSettings;
use lpi_database::{Connection, Credentials, Driver, Error, Result};
use std::sync::{Arc, Mutex};

/// What a recording driver saw
#[derive(Debug, Default)]
pub struct Journal {
    pub connects: usize,
    pub closes: usize,
    pub statements: Vec<String>,
}

/// In-memory driver that records statements and fails on demand
#[derive(Clone, Default)]
pub struct RecordingDriver {
    pub journal: Arc<Mutex<Journal>>,
    /// Statements containing this text fail
    pub fail_on: Option<String>,
    /// Count returned by count queries; `None` makes them fail
    pub count: Option<i64>,
    /// Every connection attempt is refused
    pub refuse: bool,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(text: &str) -> Self {
        Self {
            fail_on: Some(text.to_string()),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self {
            refuse: true,
            ..Self::default()
        }
    }

    pub fn with_count(count: i64) -> Self {
        Self {
            count: Some(count),
            ..Self::default()
        }
    }

    pub fn statements(&self) -> Vec<String> {
        self.journal.lock().unwrap().statements.clone()
    }

    pub fn connects(&self) -> usize {
        self.journal.lock().unwrap().connects
    }

    pub fn closes(&self) -> usize {
        self.journal.lock().unwrap().closes
    }
}

struct RecordingConnection {
    driver: RecordingDriver,
}

#[async_trait]
impl Connection for RecordingConnection {
    async fn execute(&mut self, sql: &str) -> Result<()> {
        self.driver
            .journal
            .lock()
            .unwrap()
            .statements
            .push(sql.to_string());
        match &self.driver.fail_on {
            Some(text) if sql.contains(text.as_str()) => {
                Err(Error::Sql(format!("Table '{}' doesn't exist", text)))
            }
            _ => Ok(()),
        }
    }

    async fn query_count(&mut self, sql: &str) -> Result<i64> {
        self.driver
            .journal
            .lock()
            .unwrap()
            .statements
            .push(sql.to_string());
        self.driver
            .count
            .ok_or_else(|| Error::Sql("Table 'lumisportal.lum_User' doesn't exist".into()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.driver.journal.lock().unwrap().closes += 1;
        Ok(())
    }
}

#[async_trait]
impl Driver for RecordingDriver {
    fn name(&self) -> &str {
        "recording"
    }

    async fn connect(&self, _credentials: &Credentials) -> Result<Box<dyn Connection>> {
        self.journal.lock().unwrap().connects += 1;
        if self.refuse {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Connection refused",
            )));
        }
        Ok(Box::new(RecordingConnection {
            driver: self.clone(),
        }))
    }
}

/// Database settings pointing at an unreachable server
pub fn database_settings(kind: &str, url: &str) -> DatabaseSettings {
    DatabaseSettings {
        kind: kind.to_string(),
        driver_file: String::new(),
        user: "lumis".to_string(),
        password: "lumisEIP".to_string(),
        url: url.to_string(),
    }
}

pub fn mysql_settings() -> DatabaseSettings {
    database_settings("MYSQL", "jdbc:mysql://localhost/lumisportal")
}
