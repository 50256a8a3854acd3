//! Common test infrastructure for lpi-fetch tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zip::write::FileOptions;
use zip::ZipWriter;

/// Entries of a small server distribution: three directories, four files
pub const SERVER_ENTRIES: &[(&str, Option<&str>)] = &[
    ("apache-tomcat-7.0.50/", None),
    ("apache-tomcat-7.0.50/bin/", None),
    ("apache-tomcat-7.0.50/bin/catalina.sh", Some("#!/bin/sh")),
    ("apache-tomcat-7.0.50/conf/", None),
    ("apache-tomcat-7.0.50/conf/server.xml", Some("<Server port=\"8005\"/>")),
    ("apache-tomcat-7.0.50/RELEASE-NOTES", Some("notes")),
    ("apache-tomcat-7.0.50/conf/web.xml", Some("<web-app/>")),
];

/// Entries of a small portal distribution, including documentation
pub const PORTAL_ENTRIES: &[(&str, Option<&str>)] = &[
    ("www/", None),
    ("www/lumis/", None),
    ("www/lumis/doc/", None),
    ("www/lumis/doc/index.html", Some("doc")),
    ("www/lumis/portal.css", Some("css")),
    ("setup/", None),
    ("setup/generatesql.sh", Some("#!/bin/sh")),
];

/// Write a ZIP archive; `None` content marks a directory entry
pub fn write_zip(path: &Path, entries: &[(&str, Option<&str>)]) -> PathBuf {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();
    for (name, content) in entries {
        match content {
            Some(content) => {
                zip.start_file(*name, options).unwrap();
                zip.write_all(content.as_bytes()).unwrap();
            }
            None => {
                zip.add_directory(name.trim_end_matches('/'), options).unwrap();
            }
        }
    }
    zip.finish().unwrap();
    path.to_path_buf()
}

/// Mount a GET endpoint serving `body`, expecting exactly `expected` calls
pub async fn mock_archive(server: &MockServer, route: &str, body: &[u8], expected: u64) {
    Mock::given(method("GET"))
        .and(path(route.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .expect(expected)
        .mount(server)
        .await;
}
