//! Template resources and flat `{{var}}` rendering
//!
//! Server descriptors, environment scripts and profile snippets ship inside
//! the binary and are addressed by a [`Resource`] name. Rendering is a single
//! pass of plain substitution: no escaping, sections or partials. A key the
//! scope does not hold renders as the empty string.

use crate::error::{Error, Result};
use regex::{Captures, Regex};
use rust_embed::RustEmbed;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Embedded template resources
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/src/templates/resources/"]
struct EmbeddedResources;

static PLACEHOLDER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([^{}\s]+)\s*\}\}").expect("placeholder regex is valid")
});

/// Logical names of the embedded text resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// Sample `lpi.yaml` written by `lpi sample`
    SampleConfig,
    /// Persistence config variant bound to a container datasource
    PersistenceDatasource,
    TomcatContext,
    TomcatSetenvBat,
    TomcatSetenvSh,
    JBoss5Datasource,
    JBossDomainEe,
    JBossDomainSecurity,
    JBossSystemProperties,
    JBossDatasource,
    JBossDriver,
    JBossDeployment,
    JBossServerGroups,
    JBossServers,
}

impl Resource {
    /// Path of the resource inside the embedded folder
    pub fn name(self) -> &'static str {
        match self {
            Self::SampleConfig => "installer/lpi.yaml",
            Self::PersistenceDatasource => "portal/lumishibernate.cfg.xml.datasource",
            Self::TomcatContext => "tomcat/portal.xml",
            Self::TomcatSetenvBat => "tomcat/setenv.bat",
            Self::TomcatSetenvSh => "tomcat/setenv.sh",
            Self::JBoss5Datasource => "jboss5/lumisportal-ds.xml",
            Self::JBossDomainEe => "jboss/jboss-domain-ee.config",
            Self::JBossDomainSecurity => "jboss/jboss-domain-security.config",
            Self::JBossSystemProperties => "jboss/system-properties.config",
            Self::JBossDatasource => "jboss/datasource.config",
            Self::JBossDriver => "jboss/driver.config",
            Self::JBossDeployment => "jboss/deployment.config",
            Self::JBossServerGroups => "jboss/server-groups.config",
            Self::JBossServers => "jboss/servers.config",
        }
    }

    /// Full text of the resource
    pub fn text(self) -> Result<String> {
        let name = self.name();
        let file = EmbeddedResources::get(name).ok_or_else(|| Error::resource_not_found(name))?;
        String::from_utf8(file.data.into_owned()).map_err(|_| Error::ResourceEncoding {
            name: name.to_string(),
        })
    }

    /// Resource text split into lines
    pub fn lines(self) -> Result<Vec<String>> {
        Ok(self.text()?.lines().map(str::to_string).collect())
    }
}

/// Variables available to one render call
#[derive(Debug, Clone, Default)]
pub struct TemplateScope {
    values: HashMap<String, Option<String>>,
}

impl TemplateScope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a key to a value
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), Some(value.into()));
        self
    }

    /// Bind a key that may have no value; `None` renders empty
    pub fn set_opt(&mut self, key: impl Into<String>, value: Option<String>) -> &mut Self {
        self.values.insert(key.into(), value);
        self
    }

    /// Builder-style [`set`](Self::set)
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Value bound to `key`, if any
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(|v| v.as_deref())
    }
}

/// Replace every `{{key}}` in `template` with its scope value
pub fn render(template: &str, scope: &TemplateScope) -> String {
    PLACEHOLDER_RE
        .replace_all(template, |caps: &Captures| {
            scope.get(&caps[1]).unwrap_or_default().to_string()
        })
        .into_owned()
}

/// Escape a value for use inside an XML attribute or element
///
/// Rendering never escapes; callers escape values bound for XML targets.
pub fn xml_escape(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render an embedded resource
pub fn render_resource(resource: Resource, scope: &TemplateScope) -> Result<String> {
    Ok(render(&resource.text()?, scope))
}
