//! Application server variants for the portal installer
//!
//! Every variant drives the same two steps: unpack the server archive, then
//! wire the portal into it. Configuring copies the portal libraries into the
//! server, optionally packs the portal as a web archive, rewrites the
//! server's descriptors and launch scripts and marks shell scripts
//! executable.
//!
//! - `NONE` (portal only)
//! - `TOMCAT7`, `TOMCAT8`
//! - `JBOSS5`
//! - `JBOSSAS71`, `JBOSSEAP6`

pub mod common;
pub mod context;
pub mod jboss;
pub mod jboss5;
pub mod none;
pub mod tomcat;
pub mod traits;

pub use context::InstallContext;
pub use traits::ApplicationServer;

/// Registry keys of every server variant
pub const SERVER_KEYS: &[&str] = &[
    none::KEY,
    tomcat::TOMCAT7,
    tomcat::TOMCAT8,
    jboss5::KEY,
    jboss::JBOSSAS71,
    jboss::JBOSSEAP6,
];

/// Create the server variant registered under `key`
pub fn create_server(key: &str) -> Option<Box<dyn ApplicationServer>> {
    let server: Box<dyn ApplicationServer> = match key.trim().to_ascii_uppercase().as_str() {
        none::KEY => Box::new(none::NoServer),
        tomcat::TOMCAT7 => Box::new(tomcat::Tomcat::tomcat7()),
        tomcat::TOMCAT8 => Box::new(tomcat::Tomcat::tomcat8()),
        jboss5::KEY => Box::new(jboss5::JBoss5::new()),
        jboss::JBOSSAS71 => Box::new(jboss::JBoss::as71()),
        jboss::JBOSSEAP6 => Box::new(jboss::JBoss::eap6()),
        _ => return None,
    };
    Some(server)
}
