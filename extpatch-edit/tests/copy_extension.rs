//! Copy planning against a scratch Cordova project.

use camino::{Utf8Path, Utf8PathBuf};
use extpatch_edit::{
    EditError, LayoutError, TokenTable, TokenValues, list_candidates, plan_extension_copy,
};
use extpatch_types::file::CandidateFile;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::TempDir;

fn scratch_project() -> (TempDir, Utf8PathBuf) {
    let td = tempfile::tempdir().expect("tempdir");
    let root = Utf8PathBuf::from_path_buf(td.path().to_path_buf()).unwrap();
    let ext = root.join("plugins/p/src/ios/ShareExtension");
    fs::create_dir_all(ext.join("Assets.xcassets")).unwrap();
    fs::create_dir_all(root.join("platforms/ios")).unwrap();

    fs::write(
        ext.join("ShareViewController.h"),
        "// __DISPLAY_NAME__\n#define G @\"__GROUP_IDENTIFIER__\"\n",
    )
    .unwrap();
    fs::write(ext.join("ShareViewController.m"), "#import \"ShareViewController.h\"\n").unwrap();
    fs::write(
        ext.join("ShareExtension-Info.plist"),
        "<string>__BUNDLE_SHORT_VERSION_STRING__</string><string>__BUNDLE_VERSION__</string>\n",
    )
    .unwrap();
    fs::write(ext.join("MainInterface.storyboard"), "<!-- __DISPLAY_NAME__ -->\n").unwrap();
    fs::write(ext.join("Assets.xcassets/Contents.json"), "{\"x\": \"__DISPLAY_NAME__\"}\n").unwrap();
    fs::write(ext.join(".DS_Store"), [0u8, 1, 2]).unwrap();
    (td, root)
}

fn table() -> TokenTable {
    TokenTable::standard(&TokenValues {
        display_name: "HelloCordova".to_string(),
        app_id: "io.cordova.hellocordova".to_string(),
        bundle_suffix: ".shareextension".to_string(),
        short_version: "1.0.0".to_string(),
        bundle_version: "1.0.0.17".to_string(),
        url_scheme: "openwithcxm".to_string(),
        uniform_type_identifier: "public.data".to_string(),
    })
}

fn apply(plan: &extpatch_edit::CopyPlan) {
    for write in &plan.writes {
        fs::create_dir_all(write.path.parent().unwrap()).unwrap();
        fs::write(&write.path, &write.contents).unwrap();
    }
}

fn source(root: &Utf8Path) -> Utf8PathBuf {
    root.join("plugins/p/src/ios/ShareExtension")
}

#[test]
fn first_plan_writes_every_file_with_tokens_in_sources_and_plists() {
    let (_td, root) = scratch_project();
    let dest = root.join("platforms/ios");
    let plan = plan_extension_copy(&source(&root), &dest, &table()).unwrap();

    assert_eq!(plan.folder, dest.join("ShareExtension"));
    let written: Vec<&str> = plan.writes.iter().map(|w| w.relative.as_str()).collect();
    assert_eq!(
        written,
        vec![
            "ShareExtension/.DS_Store",
            "ShareExtension/Assets.xcassets/Contents.json",
            "ShareExtension/MainInterface.storyboard",
            "ShareExtension/ShareExtension-Info.plist",
            "ShareExtension/ShareViewController.h",
            "ShareExtension/ShareViewController.m",
        ]
    );
    assert!(plan.writes.iter().all(|w| w.before.is_none()));

    let header = plan
        .writes
        .iter()
        .find(|w| w.relative.ends_with(".h"))
        .unwrap();
    assert_eq!(header.replacements, 2);
    assert_eq!(
        String::from_utf8(header.contents.clone()).unwrap(),
        "// HelloCordova\n#define G @\"group.io.cordova.hellocordova.shareextension\"\n"
    );

    let storyboard = plan
        .writes
        .iter()
        .find(|w| w.relative.ends_with(".storyboard"))
        .unwrap();
    assert_eq!(storyboard.replacements, 0);
    assert_eq!(storyboard.contents, b"<!-- __DISPLAY_NAME__ -->\n");

    let nested = plan
        .writes
        .iter()
        .find(|w| w.relative.ends_with("Contents.json"))
        .unwrap();
    assert_eq!(nested.replacements, 0);
}

#[test]
fn replanning_after_apply_is_a_no_op() {
    let (_td, root) = scratch_project();
    let dest = root.join("platforms/ios");
    let plan = plan_extension_copy(&source(&root), &dest, &table()).unwrap();
    apply(&plan);

    let again = plan_extension_copy(&source(&root), &dest, &table()).unwrap();
    assert!(again.is_noop(), "{:?}", again.writes);
    assert_eq!(again.unchanged.len(), 6);
}

#[test]
fn edited_destination_file_is_planned_for_overwrite() {
    let (_td, root) = scratch_project();
    let dest = root.join("platforms/ios");
    apply(&plan_extension_copy(&source(&root), &dest, &table()).unwrap());
    fs::write(dest.join("ShareExtension/ShareViewController.m"), "// local edit\n").unwrap();

    let plan = plan_extension_copy(&source(&root), &dest, &table()).unwrap();
    assert_eq!(plan.writes.len(), 1);
    assert_eq!(
        plan.writes[0].before.as_deref(),
        Some(b"// local edit\n".as_slice())
    );
}

#[test]
fn missing_source_folder_is_a_layout_error() {
    let (_td, root) = scratch_project();
    let err = plan_extension_copy(
        &root.join("plugins/absent/src/ios/ShareExtension"),
        &root.join("platforms/ios"),
        &table(),
    )
    .unwrap_err();
    assert!(matches!(err, EditError::Layout(LayoutError::SourceFolderMissing { .. })));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn candidates_skip_dotfiles_and_keep_directories() {
    let (_td, root) = scratch_project();
    let names: Vec<String> = list_candidates(&source(&root))
        .unwrap()
        .into_iter()
        .map(|c: CandidateFile| c.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Assets.xcassets",
            "MainInterface.storyboard",
            "ShareExtension-Info.plist",
            "ShareViewController.h",
            "ShareViewController.m",
        ]
    );
}

#[test]
fn listing_a_missing_folder_names_it() {
    let (_td, root) = scratch_project();
    let missing = root.join("platforms/ios/ShareExtension");
    let err = list_candidates(&missing).unwrap_err();
    assert!(err.to_string().contains(missing.as_str()));
}
