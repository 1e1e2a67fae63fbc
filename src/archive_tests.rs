//! Unit tests for the zip primitives.

use super::*;
use rstest::rstest;
use std::io::{Read, Write};
use tempfile::TempDir;

fn utf8(dir: &TempDir) -> Utf8PathBuf {
    Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 temp dir")
}

fn write_zip(path: &Utf8Path, entries: &[(&str, &str)]) {
    let mut writer = ZipWriter::new(File::create(path).expect("create zip"));
    for (name, contents) in entries {
        if name.ends_with('/') {
            writer
                .add_directory(*name, SimpleFileOptions::default())
                .expect("add directory");
        } else {
            writer
                .start_file(*name, SimpleFileOptions::default())
                .expect("start file");
            writer.write_all(contents.as_bytes()).expect("write entry");
        }
    }
    writer.finish().expect("finish zip");
}

#[test]
fn extracts_entries_and_reports_each_path() {
    let temp = TempDir::new().expect("temp dir");
    let root = utf8(&temp);
    let archive = root.join("web.war");
    write_zip(
        &archive,
        &[
            ("WEB-INF/", ""),
            ("WEB-INF/web.xml", "<web-app/>"),
            ("index.html", "hello"),
        ],
    );

    let mut seen = Vec::new();
    let dest = root.join("out/web.war");
    let count = extract(&archive, &dest, |path| seen.push(path.to_owned())).expect("extract");

    assert_eq!(count, 3);
    assert_eq!(seen, ["WEB-INF", "WEB-INF/web.xml", "index.html"]);
    assert_eq!(
        fs::read_to_string(dest.join("WEB-INF/web.xml")).expect("read entry"),
        "<web-app/>"
    );
}

#[test]
fn extraction_rejects_escaping_entries() {
    let temp = TempDir::new().expect("temp dir");
    let root = utf8(&temp);
    let archive = root.join("evil.jar");
    write_zip(&archive, &[("../escape.txt", "gotcha")]);

    let err = extract(&archive, &root.join("out"), |_| {}).expect_err("traversal");
    assert!(matches!(err, ArchiveError::PathTraversal { .. }));
    assert!(!root.join("escape.txt").exists());
}

#[rstest]
#[case::parent("../escape.txt")]
#[case::nested_parent("lib/../../escape.txt")]
#[case::absolute("/etc/passwd")]
#[case::backslash_parent("..\\escape.txt")]
#[case::drive("C:/windows/system.ini")]
fn rejects_escaping_names(#[case] name: &str) {
    assert!(matches!(
        validate_entry_name(name),
        Err(ArchiveError::PathTraversal { .. })
    ));
}

#[rstest]
#[case("META-INF/MANIFEST.MF")]
#[case("lib/a..b.jar")]
#[case("WEB-INF/")]
fn accepts_ordinary_names(#[case] name: &str) {
    assert!(validate_entry_name(name).is_ok());
}

#[test]
fn creates_filtered_archive() {
    let temp = TempDir::new().expect("temp dir");
    let root = utf8(&temp);
    let work = root.join("work");
    fs::create_dir_all(work.join("META-INF")).expect("mkdir");
    fs::write(work.join("META-INF/application.xml"), "<application/>").expect("write");
    fs::write(work.join("notes.bak"), "scratch").expect("write");

    let filter = PathFilter::new(&[], &["**/*.bak".to_owned()]).expect("filter");
    let dest = root.join("target/app.ear");
    let files = create(&dest, &work, &filter, Some(1_577_836_800)).expect("create");
    assert_eq!(files, 1);

    let mut zip = ZipArchive::new(File::open(&dest).expect("open")).expect("zip");
    let names: Vec<String> = zip.file_names().map(str::to_owned).collect();
    assert!(names.contains(&"META-INF/".to_owned()));
    assert!(!names.iter().any(|name| name.ends_with(".bak")));

    let mut contents = String::new();
    zip.by_name("META-INF/application.xml")
        .expect("entry")
        .read_to_string(&mut contents)
        .expect("read");
    assert_eq!(contents, "<application/>");
}

#[rstest]
#[case::new_year_2020(1_577_836_800, (2020, 1, 1, 0, 0, 0))]
#[case::leap_day(1_709_210_096, (2024, 2, 29, 12, 34, 56))]
#[case::late_2023(1_700_000_000, (2023, 11, 14, 22, 13, 20))]
fn converts_epoch_seconds(#[case] seconds: i64, #[case] expected: (u16, u8, u8, u8, u8, u8)) {
    let time = zip_timestamp(seconds).expect("representable");
    assert_eq!(
        (time.year(), time.month(), time.day(), time.hour(), time.minute(), time.second()),
        expected
    );
}

#[test]
fn pre_1980_timestamps_are_unrepresentable() {
    assert!(zip_timestamp(0).is_none());
}
