//! Extraction and packaging tests over real ZIP files

mod common;

use common::*;
use lpi_fetch::{extract, package, Downloader, Fetcher};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_extract_counts_every_entry() {
    let temp = TempDir::new().unwrap();
    let archive = write_zip(&temp.path().join("tomcat.zip"), SERVER_ENTRIES);

    let target = temp.path().join("out");
    let total = extract(&archive, &target, None, false).unwrap();

    assert_eq!(total, SERVER_ENTRIES.len());
    assert!(target.join("apache-tomcat-7.0.50/conf/server.xml").exists());
}

#[test]
fn test_extract_skipped_entries_still_count() {
    let temp = TempDir::new().unwrap();
    let archive = write_zip(&temp.path().join("portal.zip"), PORTAL_ENTRIES);

    let target = temp.path().join("lumisportal");
    let total = extract(&archive, &target, Some("www/lumis/doc.*"), false).unwrap();

    assert_eq!(total, PORTAL_ENTRIES.len());
    assert!(!target.join("www/lumis/doc").exists());
    assert!(target.join("www/lumis/portal.css").exists());
    assert!(target.join("setup/generatesql.sh").exists());
}

#[test]
fn test_ignore_pattern_matches_whole_name() {
    let temp = TempDir::new().unwrap();
    let archive = write_zip(&temp.path().join("portal.zip"), PORTAL_ENTRIES);

    let target = temp.path().join("lumisportal");
    extract(&archive, &target, Some("lumis/doc.*"), false).unwrap();

    // a partial match does not skip the entry
    assert!(target.join("www/lumis/doc/index.html").exists());
}

#[test]
fn test_extract_strip_root() {
    let temp = TempDir::new().unwrap();
    let archive = write_zip(&temp.path().join("tomcat.zip"), SERVER_ENTRIES);

    let target = temp.path().join("tomcat7");
    extract(&archive, &target, None, true).unwrap();

    for (name, content) in SERVER_ENTRIES.iter().filter(|(_, c)| c.is_some()) {
        let stripped = name.split_once('/').unwrap().1;
        assert_eq!(
            fs::read_to_string(target.join(stripped)).unwrap(),
            content.unwrap()
        );
    }
    assert!(!target.join("apache-tomcat-7.0.50").exists());
}

#[test]
fn test_package_then_extract() {
    let temp = TempDir::new().unwrap();
    let www = temp.path().join("www");
    fs::create_dir_all(www.join("WEB-INF/lib")).unwrap();
    fs::write(www.join("index.jsp"), "<%-- index --%>").unwrap();
    fs::write(www.join("WEB-INF/web.xml"), "<web-app/>").unwrap();
    fs::write(www.join("WEB-INF/lib/portal.jar"), "jar").unwrap();

    let war = temp.path().join("lumisportal.war");
    assert_eq!(package(&www, &war).unwrap(), 3);

    let out = temp.path().join("out");
    extract(&war, &out, None, false).unwrap();
    assert_eq!(
        fs::read_to_string(out.join("WEB-INF/web.xml")).unwrap(),
        "<web-app/>"
    );
}

#[tokio::test]
async fn test_fetcher_extracts_local_source() {
    let temp = TempDir::new().unwrap();
    let archive = write_zip(&temp.path().join("tomcat.zip"), SERVER_ENTRIES);
    let fetcher = Fetcher::with_downloader(Downloader::with_cache_dir(temp.path().join("cache")).unwrap());

    let total = fetcher
        .extract(
            archive.to_str().unwrap(),
            &temp.path().join("tomcat7"),
            None,
            true,
        )
        .await
        .unwrap();

    assert_eq!(total, SERVER_ENTRIES.len());
    assert!(temp.path().join("tomcat7/bin/catalina.sh").exists());
}
