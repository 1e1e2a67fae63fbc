//! Shared helpers for the behaviour suites.
//!
//! Builds throwaway artifact archives and reads back what the assembly
//! wrote, so scenarios can stay focused on module layout.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs::{self, File};
use std::io::{Read, Write};
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Manifest entry name inside module archives.
pub const MANIFEST: &str = "META-INF/MANIFEST.MF";

/// Create a temporary directory with a UTF-8 path.
pub fn utf8_temp_dir() -> (TempDir, Utf8PathBuf) {
    let temp = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf()).expect("utf-8 temp dir");
    (temp, root)
}

/// Write a zip archive holding `entries`.
pub fn write_archive(path: &Utf8Path, entries: &[(&str, &[u8])]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    let mut writer = ZipWriter::new(File::create(path).expect("create archive"));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("start entry");
        writer.write_all(contents).expect("write entry");
    }
    writer.finish().expect("finish archive");
}

/// Render a manifest, with a `Class-Path` attribute when `class_path` is set.
pub fn manifest(class_path: Option<&str>) -> Vec<u8> {
    let mut text = String::from("Manifest-Version: 1.0\r\nCreated-By: behaviour\r\n");
    if let Some(entries) = class_path {
        text.push_str(&format!("Class-Path: {entries}\r\n"));
    }
    text.push_str("\r\n");
    text.into_bytes()
}

/// Read one entry of a zip archive, if present.
pub fn read_entry(archive: &Utf8Path, name: &str) -> Option<Vec<u8>> {
    let mut zip = ZipArchive::new(File::open(archive).expect("open archive")).expect("read archive");
    let mut entry = zip.by_name(name).ok()?;
    let mut contents = Vec::new();
    entry.read_to_end(&mut contents).expect("read entry");
    Some(contents)
}

/// List the entry names of a zip archive.
pub fn entry_names(archive: &Utf8Path) -> Vec<String> {
    let zip = ZipArchive::new(File::open(archive).expect("open archive")).expect("read archive");
    zip.file_names().map(str::to_owned).collect()
}
