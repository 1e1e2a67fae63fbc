//! Unit tests for module classification and partitioning.

use super::*;
use crate::artifact::Scope;
use rstest::{fixture, rstest};

#[fixture]
fn context() -> ExecutionContext {
    ExecutionContext::default().with_default_lib_bundle_dir(Some("lib"))
}

fn declaration(module_type: &str, group_id: &str, artifact_id: &str) -> ModuleDeclaration {
    ModuleDeclaration {
        module_type: module_type.to_owned(),
        group_id: Some(group_id.to_owned()),
        artifact_id: Some(artifact_id.to_owned()),
        ..ModuleDeclaration::default()
    }
}

#[rstest]
#[case::jar("jar", "library", Some("lib/"))]
#[case::ejb("ejb", "ejb", None)]
#[case::war("war", "web", None)]
#[case::rar("rar", "connector", None)]
#[case::jboss_sar("jboss-sar", "service", None)]
fn classifies_standard_types(
    context: ExecutionContext,
    #[case] artifact_type: &str,
    #[case] kind: &str,
    #[case] bundle_dir: Option<&str>,
) {
    let artifact = ResolvedArtifact::new("eartest", "module", "1.0", artifact_type);
    let module = classify(&artifact, &context).expect("classified");
    assert_eq!(module.kind().name(), kind);
    assert_eq!(module.bundle_dir(), bundle_dir);
}

#[rstest]
#[case::j2ee_1_3(JavaEeVersion::V1_3, None)]
#[case::j2ee_1_4(JavaEeVersion::V1_4, None)]
#[case::javaee_5(JavaEeVersion::V5, Some("lib/"))]
#[case::javaee_7(JavaEeVersion::V7, Some("lib/"))]
fn ejb_client_bundle_dir_depends_on_platform(
    #[case] version: JavaEeVersion,
    #[case] expected: Option<&str>,
) {
    let context = ExecutionContext::new(version).with_default_lib_bundle_dir(Some("lib"));
    let artifact = ResolvedArtifact::new("eartest", "ejb", "1.0", "ejb-client");
    let module = classify(&artifact, &context).expect("classified");
    assert_eq!(module.bundle_dir(), expected);
    assert_eq!(module.uri(), format!("{}eartest-ejb-1.0.jar", expected.unwrap_or_default()));
}

#[rstest]
fn unknown_type_fails_classification(context: ExecutionContext) {
    let artifact = ResolvedArtifact::new("eartest", "bundle-lib", "1.0", "bundle");
    let err = classify(&artifact, &context).expect_err("unknown type");
    assert!(matches!(err, EarError::UnknownArtifactType { ref artifact_id, .. } if artifact_id == "bundle-lib"));
}

#[rstest]
fn implicit_modules_skip_ineligible_artifacts(context: ExecutionContext) {
    let artifacts = vec![
        ResolvedArtifact::new("eartest", "parent", "1.0", "pom"),
        ResolvedArtifact::new("eartest", "maybe", "1.0", "jar").optional(),
        ResolvedArtifact::new("eartest", "junit", "4.13", "jar").with_scope(Scope::Test),
        ResolvedArtifact::new("eartest", "api", "1.0", "jar").with_scope(Scope::Provided),
        ResolvedArtifact::new("eartest", "core", "1.0", "jar"),
        ResolvedArtifact::new("eartest", "driver", "1.0", "jar").with_scope(Scope::Runtime),
    ];
    let set = ModuleSet::build(&[], &artifacts, &context).expect("built");

    let all: Vec<_> = set.all().map(|module| module.artifact().artifact_id.as_str()).collect();
    let runtime: Vec<_> = set.runtime().map(|module| module.artifact().artifact_id.as_str()).collect();
    let provided: Vec<_> = set.provided().map(|module| module.artifact().artifact_id.as_str()).collect();
    assert_eq!(all, ["api", "core", "driver"]);
    assert_eq!(runtime, ["core", "driver"]);
    assert_eq!(provided, ["api"]);
}

#[rstest]
fn explicit_declaration_wins(context: ExecutionContext) {
    let artifacts = vec![ResolvedArtifact::new("eartest", "shop", "1.0", "war")];
    let mut web = declaration("war", "eartest", "shop");
    web.context_root = Some("/store".to_owned());
    web.bundle_file_name = Some("shop.war".to_owned());

    let set = ModuleSet::build(&[web], &artifacts, &context).expect("built");
    assert_eq!(set.len(), 1);
    let module = set.all().next().expect("module");
    assert_eq!(module.kind().context_root(), Some("/store"));
    assert_eq!(module.uri(), "shop.war");
}

#[rstest]
fn declared_library_gets_the_shared_directory(context: ExecutionContext) {
    let artifacts = vec![ResolvedArtifact::new("eartest", "util", "1.0", "jar")];
    let set = ModuleSet::build(&[declaration("jar", "eartest", "util")], &artifacts, &context)
        .expect("built");
    assert_eq!(set.all().next().map(Module::uri), Some("lib/eartest-util-1.0.jar"));
}

#[rstest]
fn declaration_overrides_flags(context: ExecutionContext) {
    let artifacts = vec![ResolvedArtifact::new("eartest", "ra", "1.0", "rar")];
    let mut rar = declaration("rar", "eartest", "ra");
    rar.lib_directory = Some("/META-INF/lib".to_owned());
    rar.class_path_item = Some(true);
    rar.unpack = Some(true);
    rar.uri = Some("connectors/ra.rar".to_owned());

    let set = ModuleSet::build(&[rar], &artifacts, &context).expect("built");
    let module = set.all().next().expect("module");
    assert_eq!(module.lib_dir(), Some("META-INF/lib/"));
    assert!(module.is_class_path_item());
    assert_eq!(module.unpack(), Some(true));
    assert_eq!(module.uri(), "connectors/ra.rar");
}

#[rstest]
fn missing_coordinates_fail_before_resolution(context: ExecutionContext) {
    let mut broken = declaration("ejb", "eartest", "ignored");
    broken.artifact_id = None;
    let unresolvable = declaration("war", "eartest", "absent");

    let err = ModuleSet::build(&[unresolvable, broken], &[], &context).expect_err("invalid");
    assert!(
        matches!(err, EarError::MissingCoordinates { ref artifact_id, .. } if artifact_id == "null"),
        "unexpected error: {err}"
    );
}

#[rstest]
fn unresolved_declaration_is_not_found(context: ExecutionContext) {
    let err = ModuleSet::build(&[declaration("war", "eartest", "absent")], &[], &context)
        .expect_err("not found");
    assert!(matches!(err, EarError::ArtifactNotFound { .. }));
}

#[rstest]
#[case::no_classifier(None)]
#[case::wrong_classifier(Some("wrong"))]
fn several_candidates_are_ambiguous(context: ExecutionContext, #[case] classifier: Option<&str>) {
    let artifacts = vec![
        ResolvedArtifact::new("eartest", "lib", "1.0", "jar").with_classifier("class1"),
        ResolvedArtifact::new("eartest", "lib", "1.0", "jar").with_classifier("class2"),
    ];
    let mut jar = declaration("jar", "eartest", "lib");
    jar.classifier = classifier.map(str::to_owned);

    let err = ModuleSet::build(&[jar], &artifacts, &context).expect_err("ambiguous");
    assert!(matches!(err, EarError::AmbiguousArtifact { candidates: 2, .. }));
}

#[rstest]
fn excluded_modules_leave_every_partition(context: ExecutionContext) {
    let artifacts = vec![
        ResolvedArtifact::new("eartest", "core", "1.0", "jar"),
        ResolvedArtifact::new("eartest", "ejb", "1.0", "ejb"),
    ];
    let mut core = declaration("jar", "eartest", "core");
    core.excluded = true;

    let set = ModuleSet::build(&[core], &artifacts, &context).expect("built");
    assert_eq!(set.len(), 1);
    assert_eq!(set.runtime().count(), 1);
    assert_eq!(set.excluded().count(), 1);
    assert_eq!(
        set.excluded().next().map(|module| module.artifact().artifact_id.as_str()),
        Some("core")
    );
}

#[rstest]
fn duplicate_declarations_collapse(context: ExecutionContext) {
    let artifacts = vec![ResolvedArtifact::new("eartest", "ejb", "1.0", "ejb")];
    let first = declaration("ejb", "eartest", "ejb");
    let mut second = first.clone();
    second.bundle_dir = Some("other".to_owned());

    let set = ModuleSet::build(&[first, second], &artifacts, &context).expect("built");
    assert_eq!(set.len(), 1);
    assert_eq!(set.all().next().and_then(Module::bundle_dir), None);
}

#[test]
fn declarations_deserialise_from_toml() {
    let declaration: ModuleDeclaration = toml::from_str(
        "type = \"war\"\ngroup_id = \"eartest\"\nartifact_id = \"shop\"\ncontext_root = \"/shop\"\n",
    )
    .expect("declaration parses");
    assert_eq!(declaration.module_type, "war");
    assert_eq!(declaration.context_root.as_deref(), Some("/shop"));
    assert!(!declaration.excluded);
}
