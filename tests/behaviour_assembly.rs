//! Behaviour-driven tests for end-to-end archive assembly.
//!
//! Scenarios build real artifact archives in a temporary project, run the
//! whole assembly and inspect the work directory and the final archive.

mod support;

use camino::Utf8PathBuf;
use earsmith::classpath::manifest::Manifest;
use earsmith::{
    AssemblyReport, BuildConfig, ConfiguredDependencies, EarError, ResolvedArtifact, Scope,
    assemble,
};
use filetime::FileTime;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::collections::BTreeMap;
use std::fs;
use std::time::{Duration, SystemTime};
use support::{MANIFEST, entry_names, manifest, read_entry, utf8_temp_dir, write_archive};
use tempfile::TempDir;
use walkdir::WalkDir;

const GROUP: &str = "eartest";
const VERSION: &str = "1.0";
const HOUR: Duration = Duration::from_secs(3600);

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

#[derive(Default)]
struct AssemblyWorld {
    _temp: Option<TempDir>,
    root: Utf8PathBuf,
    config: BuildConfig,
    dependencies: Vec<ResolvedArtifact>,
    report: Option<AssemblyReport>,
    error: Option<EarError>,
    previous: BTreeMap<String, Vec<u8>>,
}

#[fixture]
fn world() -> AssemblyWorld {
    let (temp, root) = utf8_temp_dir();
    let mut config = BuildConfig::default();
    config.work_dir = root.join("target/earsmith");
    config.output_dir = root.join("target");
    config.source_dir = root.join("src/main/application");
    AssemblyWorld {
        _temp: Some(temp),
        root,
        config,
        ..AssemblyWorld::default()
    }
}

impl AssemblyWorld {
    fn work_dir(&self) -> Utf8PathBuf {
        self.config.work_dir.clone()
    }

    fn add_dependency(&mut self, artifact_id: &str, artifact_type: &str, entries: &[(&str, &[u8])]) -> ResolvedArtifact {
        let file = self
            .root
            .join("repository")
            .join(format!("{artifact_id}-{VERSION}.{artifact_type}"));
        write_archive(&file, entries);
        ResolvedArtifact::new(GROUP, artifact_id, VERSION, artifact_type).with_file(file)
    }

    fn run(&mut self) {
        let provider = ConfiguredDependencies::from(self.dependencies.clone());
        match assemble(&self.config, &provider) {
            Ok(report) => {
                self.report = Some(report);
                self.error = None;
            }
            Err(err) => {
                self.report = None;
                self.error = Some(err);
            }
        }
    }

    fn archive(&self) -> Utf8PathBuf {
        self.report.as_ref().expect("assembly succeeded").archive.clone()
    }
}

fn set_mtime(path: &Utf8PathBuf, time: SystemTime) {
    filetime::set_file_mtime(path, FileTime::from_system_time(time)).expect("set mtime");
}

fn write_work_file(world: &AssemblyWorld, relative: &str) -> Utf8PathBuf {
    let path = world.work_dir().join(relative);
    fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
    fs::write(&path, relative).expect("write");
    path
}

// ---------------------------------------------------------------------------
// Step definitions
// ---------------------------------------------------------------------------

#[given("a shared library directory \"{dir}\"")]
fn given_lib_dir(world: &mut AssemblyWorld, dir: String) {
    world.config.default_lib_bundle_dir = Some(dir);
}

#[given("the Java EE version \"{version}\"")]
fn given_version(world: &mut AssemblyWorld, version: String) {
    world.config.java_ee_version = version;
}

#[given("connectors are unpacked")]
fn given_unpacked_connectors(world: &mut AssemblyWorld) {
    world.config.unpack_types = vec!["rar".to_owned()];
}

#[given("a library \"{artifact_id}\"")]
fn given_library(world: &mut AssemblyWorld, artifact_id: String) {
    let artifact = world.add_dependency(&artifact_id, "jar", &[("acme/Library.class", b"class")]);
    world.dependencies.push(artifact);
}

#[given("a provided library \"{artifact_id}\"")]
fn given_provided_library(world: &mut AssemblyWorld, artifact_id: String) {
    let artifact = world
        .add_dependency(&artifact_id, "jar", &[("acme/Api.class", b"class")])
        .with_scope(Scope::Provided);
    world.dependencies.push(artifact);
}

#[given("a connector \"{artifact_id}\" without a manifest")]
fn given_bare_connector(world: &mut AssemblyWorld, artifact_id: String) {
    let artifact = world.add_dependency(&artifact_id, "rar", &[("META-INF/ra.xml", b"<connector/>")]);
    world.dependencies.push(artifact);
}

#[given("a connector \"{artifact_id}\" whose class path is \"{entries}\"")]
fn given_connector(world: &mut AssemblyWorld, artifact_id: String, entries: String) {
    let manifest = manifest(Some(&entries));
    let artifact = world.add_dependency(
        &artifact_id,
        "rar",
        &[(MANIFEST, manifest.as_slice()), ("META-INF/ra.xml", b"<connector/>")],
    );
    world.dependencies.push(artifact);
}

#[given("a stale file \"{relative}\" in the work directory")]
fn given_stale_file(world: &mut AssemblyWorld, relative: String) {
    let path = write_work_file(world, &relative);
    set_mtime(&path, SystemTime::now() - HOUR);
}

#[given("a recent file \"{relative}\" in the work directory")]
fn given_recent_file(world: &mut AssemblyWorld, relative: String) {
    let path = write_work_file(world, &relative);
    set_mtime(&path, SystemTime::now() + HOUR);
}

#[when("the archive is assembled")]
fn when_assembled(world: &mut AssemblyWorld) {
    world.run();
}

#[when("the archive is assembled again")]
fn when_assembled_again(world: &mut AssemblyWorld) {
    let work_dir = world.work_dir();
    world.previous = world
        .report
        .as_ref()
        .expect("first build succeeded")
        .placements
        .iter()
        .map(|(uri, _)| (uri.clone(), fs::read(work_dir.join(uri)).expect("placed module")))
        .collect();
    world.run();
}

#[when("the work directory ages by an hour")]
fn when_work_dir_ages(world: &mut AssemblyWorld) {
    let earlier = SystemTime::now() - HOUR;
    for entry in WalkDir::new(world.work_dir()) {
        let entry = entry.expect("walk work dir");
        if entry.file_type().is_file() {
            filetime::set_file_mtime(entry.path(), FileTime::from_system_time(earlier))
                .expect("set mtime");
        }
    }
}

#[when("the library \"{artifact_id}\" is removed")]
fn when_library_removed(world: &mut AssemblyWorld, artifact_id: String) {
    world
        .dependencies
        .retain(|artifact| artifact.artifact_id != artifact_id);
}

#[then("the class path of \"{uri}\" is \"{expected}\"")]
fn then_class_path(world: &mut AssemblyWorld, uri: String, expected: String) {
    assert!(world.error.is_none(), "assembly failed: {:?}", world.error);
    let placed = world.work_dir().join(&uri);
    let bytes = read_entry(&placed, MANIFEST).expect("module manifest");
    let class_path = Manifest::from_bytes(&bytes)
        .expect("manifest parses")
        .class_path()
        .unwrap_or_default();
    assert_eq!(class_path.join(" "), expected);
}

#[then("the unpacked class path of \"{uri}\" is \"{expected}\"")]
fn then_unpacked_class_path(world: &mut AssemblyWorld, uri: String, expected: String) {
    assert!(world.error.is_none(), "assembly failed: {:?}", world.error);
    let bytes = fs::read(world.work_dir().join(&uri).join(MANIFEST)).expect("module manifest");
    let class_path = Manifest::from_bytes(&bytes)
        .expect("manifest parses")
        .class_path()
        .unwrap_or_default();
    assert_eq!(class_path.join(" "), expected);
}

#[then("the archive contains \"{entry}\"")]
fn then_archive_contains(world: &mut AssemblyWorld, entry: String) {
    assert!(entry_names(&world.archive()).contains(&entry));
}

#[then("the archive does not contain \"{entry}\"")]
fn then_archive_lacks(world: &mut AssemblyWorld, entry: String) {
    assert!(!entry_names(&world.archive()).contains(&entry));
}

#[then("the work directory contains \"{relative}\"")]
fn then_work_dir_contains(world: &mut AssemblyWorld, relative: String) {
    assert!(world.work_dir().join(relative).exists());
}

#[then("the work directory does not contain \"{relative}\"")]
fn then_work_dir_lacks(world: &mut AssemblyWorld, relative: String) {
    assert!(!world.work_dir().join(relative).exists());
}

#[then("\"{uri}\" is byte-identical to the previous build")]
fn then_byte_identical(world: &mut AssemblyWorld, uri: String) {
    let current = fs::read(world.work_dir().join(&uri)).expect("placed module");
    assert_eq!(world.previous.get(&uri), Some(&current));
}

#[then("assembly fails because the deployment descriptor is missing")]
fn then_descriptor_missing(world: &mut AssemblyWorld) {
    match &world.error {
        Some(EarError::MissingDescriptor { path }) => {
            assert!(path.ends_with("META-INF/application.xml"));
        }
        other => panic!("expected a missing descriptor, got {other:?}"),
    }
    assert!(!world.root.join("target/application.ear").exists());
}

// ---------------------------------------------------------------------------
// Scenario bindings
// ---------------------------------------------------------------------------

#[scenario(
    path = "tests/features/assembly.feature",
    name = "A connector references the shared libraries"
)]
fn scenario_connector_references_libraries(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "A removed library disappears from the class path and the work directory"
)]
fn scenario_removed_library(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "An unpacked connector forgets a removed library"
)]
fn scenario_unpacked_connector_round_trip(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "Assembling twice produces identical modules"
)]
fn scenario_idempotent_assembly(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "Provided libraries are stripped from the class path"
)]
fn scenario_provided_stripped(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "Files older than the build that were not rewritten are deleted"
)]
fn scenario_stale_files(world: AssemblyWorld) {
    let _ = world;
}

#[scenario(
    path = "tests/features/assembly.feature",
    name = "Java EE 1.4 builds need a deployment descriptor"
)]
fn scenario_descriptor_required(world: AssemblyWorld) {
    let _ = world;
}
