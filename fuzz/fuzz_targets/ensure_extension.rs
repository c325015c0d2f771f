#![no_main]

//! Fuzz target for the extension workflow over arbitrary project graphs.
//!
//! Whatever the input graph looks like, the workflow either fails cleanly or
//! leaves a graph that passes the integrity check and is stable on a rerun.

use extpatch_domain::{ExtensionPlan, ProjectGraph, TargetKind, ensure_extension, ensure_integrity};
use extpatch_types::event::PatchEvent;
use extpatch_types::file::CandidateFile;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(mut graph) = ProjectGraph::parse(s) else {
        return;
    };

    let plan = ExtensionPlan {
        target_name: "ShareExt".to_string(),
        kind: TargetKind::AppExtension,
        subfolder: "ShareExtension".to_string(),
        group_name: "ShareExtension".to_string(),
        group_path: "ShareExtension".to_string(),
        parent_group: "CustomTemplate".to_string(),
        bundle_identifier: "io.example.app.shareextension".to_string(),
    };
    let files = [
        CandidateFile::from_name("ShareViewController.m", "ShareViewController.m"),
        CandidateFile::from_name("MainInterface.storyboard", "MainInterface.storyboard"),
    ];

    let mut events = Vec::<PatchEvent>::new();
    if ensure_extension(&mut graph, &plan, &files, &mut events).is_err() {
        return;
    }
    if ensure_integrity(&graph).is_err() {
        return;
    }

    let once = graph.to_pbxproj();
    let mut again = Vec::<PatchEvent>::new();
    let outcome = ensure_extension(&mut graph, &plan, &files, &mut again)
        .expect("second run over a patched graph must succeed");
    assert!(!outcome.target_created && !outcome.group_created);
    assert_eq!(graph.to_pbxproj(), once);
});
