use anyhow::Context;
use assert_cmd::Command;
use camino::Utf8PathBuf;
use cucumber::{World, given, then, when};
use extpatch_bdd::{FIXTURE_MANIFEST, copy_tree, count_isa, fixture_root};
use fs_err as fs;
use tempfile::TempDir;

#[derive(Debug, Default, World)]
pub struct ExtpatchWorld {
    temp: Option<TempDir>,
    project_root: Option<Utf8PathBuf>,
    manifest_before: Option<String>,
    manifest_first_install: Option<String>,
    last_stdout: Option<String>,
}

fn project_root(world: &ExtpatchWorld) -> &Utf8PathBuf {
    world.project_root.as_ref().expect("project_root set")
}

fn manifest(world: &ExtpatchWorld) -> String {
    fs::read_to_string(project_root(world).join(FIXTURE_MANIFEST))
        .context("read project.pbxproj")
        .unwrap()
}

#[allow(deprecated)]
fn extpatch(world: &ExtpatchWorld) -> Command {
    let mut cmd = Command::cargo_bin("extpatch").expect("extpatch binary");
    cmd.current_dir(project_root(world).as_str());
    cmd
}

fn run_success(world: &mut ExtpatchWorld, args: &[&str]) {
    let output = extpatch(world).args(args).assert().success();
    world.last_stdout = Some(String::from_utf8_lossy(&output.get_output().stdout).into_owned());
}

// ============================================================================
// Given
// ============================================================================

#[given("a Cordova project with the openwith plugin")]
async fn cordova_project(world: &mut ExtpatchWorld) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    copy_tree(&fixture_root(), &root).expect("copy fixture");

    world.temp = Some(td);
    world.project_root = Some(root);
    world.manifest_before = Some(manifest(world));
}

#[given(expr = "an extpatch.toml that names parent group {string}")]
async fn config_with_parent_group(world: &mut ExtpatchWorld, group: String) {
    let root = project_root(world).clone();
    fs::write(
        root.join("extpatch.toml"),
        format!("[extension]\nparent_group = \"{group}\"\n"),
    )
    .unwrap();
}

// ============================================================================
// When
// ============================================================================

#[when("I run extpatch install")]
async fn run_install(world: &mut ExtpatchWorld) {
    run_success(world, &["install"]);
    world.manifest_first_install = Some(manifest(world));
}

#[when("I run extpatch install again")]
async fn run_install_again(world: &mut ExtpatchWorld) {
    run_success(world, &["install"]);
}

#[when("I run extpatch install with --dry-run")]
async fn run_install_dry(world: &mut ExtpatchWorld) {
    run_success(world, &["install", "--dry-run"]);
}

#[when(expr = "I run extpatch install with --out-dir {word}")]
async fn run_install_out_dir(world: &mut ExtpatchWorld, out_dir: String) {
    run_success(world, &["install", "--out-dir", out_dir.as_str()]);
}

#[when("I run extpatch add-target expecting a layout error")]
async fn run_add_target_layout_error(world: &mut ExtpatchWorld) {
    extpatch(world).arg("add-target").assert().code(2);
}

#[when("I run extpatch install expecting a layout error")]
async fn run_install_layout_error(world: &mut ExtpatchWorld) {
    extpatch(world).arg("install").assert().code(2);
}

// ============================================================================
// Then
// ============================================================================

#[then(expr = "the project has {int} {string} more than before")]
async fn assert_isa_delta(world: &mut ExtpatchWorld, delta: usize, kind: String) {
    let before = world.manifest_before.as_deref().expect("manifest_before set");
    let after = manifest(world);
    assert_eq!(
        count_isa(&after, &kind),
        count_isa(before, &kind) + delta,
        "unexpected number of {kind} objects"
    );
}

#[then(expr = "the extension bundle identifier is {string}")]
async fn assert_bundle_identifier(world: &mut ExtpatchWorld, expected: String) {
    let contents = manifest(world);
    let line = format!("PRODUCT_BUNDLE_IDENTIFIER = \"{expected}\";");
    assert!(
        contents.matches(&line).count() >= 2,
        "expected {line} in both extension configurations, got:\n{contents}"
    );
}

#[then("the copied Info.plist has no template tokens left")]
async fn assert_plist_filled(world: &mut ExtpatchWorld) {
    let plist = project_root(world).join("platforms/ios/ShareExtension/ShareExtension-Info.plist");
    let contents = fs::read_to_string(&plist).unwrap();
    assert!(!contents.contains("__"), "unreplaced token in:\n{contents}");
}

#[then("the manifest is byte-identical to the first install")]
async fn assert_same_as_first(world: &mut ExtpatchWorld) {
    let first = world
        .manifest_first_install
        .as_deref()
        .expect("first install recorded");
    assert_eq!(manifest(world), first);
}

#[then("the output says the target already exists")]
async fn assert_target_exists_message(world: &mut ExtpatchWorld) {
    let stdout = world.last_stdout.as_deref().expect("stdout captured");
    assert!(
        stdout.contains("ShareExt target already exists"),
        "stdout was:\n{stdout}"
    );
}

#[then("the manifest is unchanged")]
async fn assert_manifest_unchanged(world: &mut ExtpatchWorld) {
    let before = world.manifest_before.as_deref().expect("manifest_before set");
    assert_eq!(manifest(world), before);
}

#[then("the output contains a diff for the manifest")]
async fn assert_diff_printed(world: &mut ExtpatchWorld) {
    let stdout = world.last_stdout.as_deref().expect("stdout captured");
    assert!(
        stdout.contains(&format!("+++ b/{FIXTURE_MANIFEST}")),
        "stdout was:\n{stdout}"
    );
}

fn report_json(world: &ExtpatchWorld) -> serde_json::Value {
    let path = project_root(world)
        .join("artifacts")
        .join("extpatch")
        .join("report.json");
    let report_str = fs::read_to_string(&path).unwrap();
    serde_json::from_str(&report_str).unwrap()
}

#[then(expr = "the report.json has schema {string}")]
async fn assert_report_schema(world: &mut ExtpatchWorld, expected: String) {
    let v = report_json(world);
    assert_eq!(v["schema"].as_str(), Some(expected.as_str()));
}

#[then(expr = "the report.json status is {string}")]
async fn assert_report_status(world: &mut ExtpatchWorld, expected: String) {
    let v = report_json(world);
    assert_eq!(v["status"].as_str(), Some(expected.as_str()));
}

#[tokio::main]
async fn main() {
    let features_path = std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("features");
    ExtpatchWorld::cucumber().run(features_path).await;
}
