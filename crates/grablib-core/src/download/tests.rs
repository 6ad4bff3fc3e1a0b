//! Engine tests driven by an in-memory fetcher.

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;

use super::*;
use crate::config::EntryTarget;
use crate::fetch::AliasTable;

/// Serves fixed bodies and records every URL requested.
struct MemoryFetcher {
    aliases: AliasTable,
    bodies: HashMap<String, Vec<u8>>,
    requested: RefCell<Vec<String>>,
}

impl MemoryFetcher {
    fn new(bodies: &[(&str, Vec<u8>)]) -> Self {
        Self {
            aliases: AliasTable::default(),
            bodies: bodies
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            requested: RefCell::new(Vec::new()),
        }
    }
}

impl Fetch for &MemoryFetcher {
    fn expand(&self, key: &str) -> String {
        self.aliases.expand(key)
    }

    fn get(&self, url: &str) -> Result<Vec<u8>> {
        self.requested.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| GrablibError::FetchFailed {
                url: url.to_string(),
                cause: "HTTP 404".to_string(),
            })
    }
}

fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ::zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = ::zip::write::SimpleFileOptions::default()
        .compression_method(::zip::CompressionMethod::Stored);
    for (name, data) in entries {
        if name.ends_with('/') {
            writer.add_directory(*name, options).unwrap();
        } else {
            writer.start_file(*name, options).unwrap();
            writer.write_all(data).unwrap();
        }
    }
    writer.finish().unwrap().into_inner()
}

fn rules(pairs: &[(&str, EntryTarget)]) -> DownloadTarget {
    DownloadTarget::Archive(
        pairs
            .iter()
            .map(|(p, t)| (p.to_string(), t.clone()))
            .collect(),
    )
}

fn one(t: &str) -> EntryTarget {
    EntryTarget::One(t.to_string())
}

fn files_under(root: &Path) -> Vec<String> {
    let mut out: Vec<String> = walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            e.path()
                .strip_prefix(root)
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    out.sort();
    out
}

#[test]
fn plain_file_is_written_under_alias_expanded_name() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://raw.githubusercontent.com/lodash/lodash/4.17.4/dist/lodash.js";
    let fetcher = MemoryFetcher::new(&[(url, b"var _ = 1;".to_vec())]);
    let download: OrderedMap<String, DownloadTarget> = [(
        "GITHUB/lodash/lodash/4.17.4/dist/lodash.js".to_string(),
        DownloadTarget::File("lodash/".to_string()),
    )]
    .into_iter()
    .collect();

    let mut d = Downloader::new(dir.path(), &download, &fetcher);
    let report = d.run().unwrap();

    assert_eq!(report.downloaded, 1);
    assert_eq!(fetcher.requested.borrow().as_slice(), [url]);
    let written = fs::read(dir.path().join("lodash/lodash.js")).unwrap();
    assert_eq!(written, b"var _ = 1;");
}

#[test]
fn existing_file_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.js"), "old").unwrap();
    let fetcher = MemoryFetcher::new(&[("https://e.com/a.js", b"new".to_vec())]);
    let download: OrderedMap<String, DownloadTarget> =
        [("https://e.com/a.js".to_string(), DownloadTarget::File(String::new()))]
            .into_iter()
            .collect();
    Downloader::new(dir.path(), &download, &fetcher).run().unwrap();
    assert_eq!(fs::read_to_string(dir.path().join("a.js")).unwrap(), "new");
}

#[test]
fn escaping_destination_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("libs");
    let fetcher = MemoryFetcher::new(&[("https://e.com/a.js", b"x".to_vec())]);
    let download: OrderedMap<String, DownloadTarget> = [(
        "https://e.com/a.js".to_string(),
        DownloadTarget::File("../outside/".to_string()),
    )]
    .into_iter()
    .collect();

    let err = Downloader::new(&root, &download, &fetcher).run().unwrap_err();
    match err {
        GrablibError::Entry { source, .. } => {
            assert!(matches!(*source, GrablibError::PathEscape { .. }))
        }
        other => panic!("expected Entry, got {other:?}"),
    }
    assert!(fetcher.requested.borrow().is_empty());
    assert!(files_under(dir.path()).is_empty());
}

#[test]
fn first_failure_aborts_and_keeps_earlier_files() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MemoryFetcher::new(&[("https://e.com/a.js", b"a".to_vec())]);
    let download: OrderedMap<String, DownloadTarget> = [
        ("https://e.com/a.js".to_string(), DownloadTarget::File("js/".to_string())),
        ("https://e.com/missing.js".to_string(), DownloadTarget::File("js/".to_string())),
        ("https://e.com/a.js?again".to_string(), DownloadTarget::File("js/b.js".to_string())),
    ]
    .into_iter()
    .collect();

    let mut d = Downloader::new(dir.path(), &download, &fetcher);
    let err = d.run().unwrap_err();
    assert!(err.to_string().contains("https://e.com/missing.js"));
    assert_eq!(d.report().downloaded, 1);
    assert_eq!(files_under(dir.path()), ["js/a.js"]);
    assert_eq!(fetcher.requested.borrow().len(), 2);
}

#[test]
fn url_without_file_name_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let fetcher = MemoryFetcher::new(&[]);
    let download: OrderedMap<String, DownloadTarget> =
        [("https://e.com/".to_string(), DownloadTarget::File("x/".to_string()))]
            .into_iter()
            .collect();
    let err = Downloader::new(dir.path(), &download, &fetcher).run().unwrap_err();
    match err {
        GrablibError::Entry { source, .. } => assert!(source.is_no_match()),
        other => panic!("expected Entry, got {other:?}"),
    }
}

#[test]
fn archive_first_match_wins() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://e.com/pkg.zip";
    let body = zip_bytes(&[("pkg/", b""), ("pkg/js/app.min.js", b"min")]);
    let fetcher = MemoryFetcher::new(&[(url, body)]);
    let download: OrderedMap<String, DownloadTarget> = [(
        url.to_string(),
        rules(&[
            (r"pkg/js/(.+\.min\.js)", one("first/")),
            (r"pkg/js/(.+\.js)", one("second/")),
        ]),
    )]
    .into_iter()
    .collect();

    let report = Downloader::new(dir.path(), &download, &fetcher).run().unwrap();
    assert_eq!(files_under(dir.path()), ["first/app.min.js"]);
    assert_eq!(report.downloaded, 1);
    assert_eq!(report.copied, 1);
}

#[test]
fn archive_null_rule_discards_and_fan_out_duplicates() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://e.com/pkg.zip";
    let body = zip_bytes(&[
        ("pkg/docs/readme.md", b"docs"),
        ("pkg/css/site.css", b".a{}"),
        ("pkg/other.txt", b"?"),
    ]);
    let fetcher = MemoryFetcher::new(&[(url, body)]);
    let download: OrderedMap<String, DownloadTarget> = [(
        url.to_string(),
        rules(&[
            ("pkg/docs/", EntryTarget::Skip),
            (
                r"pkg/css/(.+)",
                EntryTarget::Many(vec!["a/".to_string(), "b/".to_string(), "c/x.css".to_string()]),
            ),
        ]),
    )]
    .into_iter()
    .collect();

    let report = Downloader::new(dir.path(), &download, &fetcher).run().unwrap();
    assert_eq!(files_under(dir.path()), ["a/site.css", "b/site.css", "c/x.css"]);
    for f in ["a/site.css", "b/site.css", "c/x.css"] {
        assert_eq!(fs::read(dir.path().join(f)).unwrap(), b".a{}");
    }
    assert_eq!(report.copied, 3);
    assert_eq!(report.ignored, 2);
}

#[test]
fn archive_rule_is_anchored_at_entry_start() {
    let rules = archive::ArchiveRules::compile(
        &[("js/.*".to_string(), one("js/"))].into_iter().collect(),
    )
    .unwrap();
    assert!(rules.first_match("js/a.js").is_some());
    assert!(rules.first_match("pkg/js/a.js").is_none());
}

#[test]
fn archive_named_groups_build_paths() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://e.com/fa.zip";
    let body = zip_bytes(&[("font-awesome-4.7.0/fonts/fa.woff", b"w")]);
    let fetcher = MemoryFetcher::new(&[(url, body)]);
    let download: OrderedMap<String, DownloadTarget> = [(
        url.to_string(),
        rules(&[(
            r"font-awesome-(?P<version>[\d.]+)/fonts/(?P<filename>.+)",
            one("fa-{version}/"),
        )]),
    )]
    .into_iter()
    .collect();

    Downloader::new(dir.path(), &download, &fetcher).run().unwrap();
    assert_eq!(files_under(dir.path()), ["fa-4.7.0/fa.woff"]);
}

#[test]
fn invalid_archive_bytes_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://e.com/broken.zip";
    let fetcher = MemoryFetcher::new(&[(url, b"not a zip".to_vec())]);
    let download: OrderedMap<String, DownloadTarget> =
        [(url.to_string(), rules(&[(".*", one("x/"))]))].into_iter().collect();
    let err = Downloader::new(dir.path(), &download, &fetcher).run().unwrap_err();
    match err {
        GrablibError::Entry { source, .. } => {
            assert!(matches!(*source, GrablibError::Archive { .. }))
        }
        other => panic!("expected Entry, got {other:?}"),
    }
}

#[test]
fn invalid_rule_pattern_fails_before_fetch() {
    let dir = tempfile::tempdir().unwrap();
    let url = "https://e.com/pkg.zip";
    let fetcher = MemoryFetcher::new(&[]);
    let download: OrderedMap<String, DownloadTarget> =
        [(url.to_string(), rules(&[("(unclosed", one("x/"))]))].into_iter().collect();
    let err = Downloader::new(dir.path(), &download, &fetcher).run().unwrap_err();
    match err {
        GrablibError::Entry { source, .. } => {
            assert!(matches!(*source, GrablibError::InvalidPattern { .. }))
        }
        other => panic!("expected Entry, got {other:?}"),
    }
    assert!(fetcher.requested.borrow().is_empty());
}
