//! Scenario tests for the document resolver.
//!
//! These exercise the full resolution pipeline over the in-memory
//! provider: parsing, conversion, grant matching, the fallback chain,
//! and the request surface.

use std::sync::Arc;

use document_resolver::{
    dispatch, DocumentIdentifier, DocumentProvider, DocumentResolver, InMemoryProvider,
    ListMode, ResolutionResult, ResolverRequest, ResolverResponse,
};

// ─────────────────────────────────────────────────────────────────────────────
// Test Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn id(raw: &str) -> DocumentIdentifier {
    DocumentIdentifier::parse(raw).unwrap()
}

/// Download/ with a.json, b.zip and sub/deep.json, all backed by paths
/// under shared storage.
fn shared_download_tree() -> InMemoryProvider {
    let mut p = InMemoryProvider::new();
    let root = id("external-storage:primary:Download");
    let a = id("external-storage:primary:Download/a.json");
    let sub = id("external-storage:primary:Download/sub");
    let deep = id("external-storage:primary:Download/sub/deep.json");
    let b = id("external-storage:primary:Download/b.zip");
    p.insert_directory(root.clone());
    p.insert_file(a.clone());
    p.insert_directory(sub.clone());
    p.insert_file(deep.clone());
    p.insert_file(b.clone());
    p.link_child(&root, &a);
    p.link_child(&root, &sub);
    p.link_child(&root, &b);
    p.link_child(&sub, &deep);
    p.set_fs_path(&root, "/storage/emulated/0/Download");
    p.set_fs_path(&a, "/storage/emulated/0/Download/a.json");
    p.set_fs_path(&sub, "/storage/emulated/0/Download/sub");
    p.set_fs_path(&deep, "/storage/emulated/0/Download/sub/deep.json");
    p.set_fs_path(&b, "/storage/emulated/0/Download/b.zip");
    p
}

fn resolver(p: InMemoryProvider) -> DocumentResolver<InMemoryProvider> {
    DocumentResolver::new(Arc::new(p))
}

fn children(result: ResolutionResult) -> Vec<String> {
    match result {
        ResolutionResult::Children(children) => {
            children.into_iter().map(|c| c.to_string()).collect()
        }
        other => panic!("Expected children, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversion Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn legacy_raw_identifier_converts_to_external_storage() {
    let converted = document_resolver::convert::prefer_external_storage(&id(
        "legacy-downloads:raw:/storage/emulated/0/Download/report.json",
    ));
    assert_eq!(
        converted.to_string(),
        "external-storage:primary:Download/report.json"
    );
}

#[test]
fn legacy_picked_file_lists_its_siblings() {
    // A file picked through the legacy provider resolves through
    // conversion to its external storage directory and lists siblings.
    let r = resolver(shared_download_tree());
    let siblings = children(r.resolve_children(
        &id("legacy-downloads:raw:/storage/emulated/0/Download/a.json"),
        ListMode::Flat,
    ));
    assert_eq!(
        siblings,
        vec![
            "external-storage:primary:Download/a.json",
            "external-storage:primary:Download/b.zip",
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Grant Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn download_grant_covers_nested_file_but_pictures_does_not() {
    let p = shared_download_tree();
    p.persist_grant(&id("tree:external-storage:primary:Download"))
        .unwrap();
    p.persist_grant(&id("tree:external-storage:primary:Pictures"))
        .unwrap();
    let r = resolver(p);

    let covering = r
        .find_covering_grant(&id("external-storage:primary:Download/sub/file.json"))
        .expect("Download grant should cover the nested file");
    assert_eq!(
        covering.root.to_string(),
        "tree:external-storage:primary:Download"
    );

    assert!(r
        .find_covering_grant(&id("external-storage:primary:Music/song.mp3"))
        .is_none());
}

#[test]
fn restricted_subdirectory_is_listed_through_broader_grant() {
    let mut p = shared_download_tree();
    p.restrict_listing(&id("external-storage:primary:Download/sub"));
    p.persist_grant(&id("tree:external-storage:primary:Download"))
        .unwrap();
    let r = resolver(p);

    let files = children(r.resolve_children(
        &id("external-storage:primary:Download/sub"),
        ListMode::Flat,
    ));
    assert_eq!(
        files,
        vec!["external-storage:primary:Download/sub/deep.json"]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Fallback Chain Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn hidden_parent_yields_empty_flat_listing_not_an_error() {
    let mut p = shared_download_tree();
    p.hide_parent(&id("external-storage:primary:Download/a.json"));
    let r = resolver(p);

    let response = dispatch(
        &r,
        &ResolverRequest::ResolveChildrenFlat {
            identifier: "external-storage:primary:Download/a.json".to_string(),
        },
    )
    .unwrap();
    assert_eq!(response, ResolverResponse::Identifiers(Vec::new()));
}

#[test]
fn recursive_walk_skips_unreadable_subtree() {
    // No covering grant and no backing paths, so the restricted
    // subdirectory is genuinely unreadable.
    let mut p = InMemoryProvider::new();
    let root = id("external-storage:primary:Download");
    let a = id("external-storage:primary:Download/a.json");
    let sub = id("external-storage:primary:Download/sub");
    let deep = id("external-storage:primary:Download/sub/deep.json");
    let b = id("external-storage:primary:Download/b.zip");
    p.insert_directory(root.clone());
    p.insert_file(a.clone());
    p.insert_directory(sub.clone());
    p.insert_file(deep.clone());
    p.insert_file(b.clone());
    p.link_child(&root, &a);
    p.link_child(&root, &sub);
    p.link_child(&root, &b);
    p.link_child(&sub, &deep);
    p.restrict_listing(&sub);
    let r = resolver(p);

    let files = children(r.resolve_children(
        &id("tree:external-storage:primary:Download"),
        ListMode::Recursive,
    ));
    assert_eq!(
        files,
        vec![
            "external-storage:primary:Download/a.json",
            "external-storage:primary:Download/b.zip",
        ]
    );
}

#[test]
fn metadata_index_answers_when_legacy_listing_is_restricted() {
    let mut p = InMemoryProvider::new();
    let dir = id("legacy-downloads:raw:/sdcard/Queue");
    let one = id("legacy-downloads:raw:/sdcard/Queue/one.pdf");
    let two = id("legacy-downloads:raw:/sdcard/Queue/two.pdf");
    p.insert_directory(dir.clone());
    p.insert_file(one.clone());
    p.insert_file(two.clone());
    p.restrict_listing(&dir);
    p.set_fs_path(&one, "/sdcard/Queue/one.pdf");
    p.set_fs_path(&two, "/sdcard/Queue/two.pdf");
    let r = resolver(p);

    let files = children(r.resolve_children(&dir, ListMode::Flat));
    assert_eq!(
        files,
        vec![
            "legacy-downloads:raw:/sdcard/Queue/one.pdf",
            "legacy-downloads:raw:/sdcard/Queue/two.pdf",
        ]
    );

    // Recursive resolution of the same directory yields the files too,
    // never the directory identifier itself.
    let recursive = children(r.resolve_children(&dir, ListMode::Recursive));
    assert_eq!(recursive, files);
}

// ─────────────────────────────────────────────────────────────────────────────
// Request Surface Scenarios
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn parent_of_legacy_file_resolves_over_the_wire() {
    let r = resolver(shared_download_tree());
    let response = dispatch(
        &r,
        &ResolverRequest::ResolveParent {
            identifier: "legacy-downloads:raw:/storage/emulated/0/Download/a.json".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        response,
        ResolverResponse::Identifier(Some("external-storage:primary:Download".to_string()))
    );
}

#[test]
fn recursive_listing_over_the_wire_returns_all_files() {
    let r = resolver(shared_download_tree());
    let response = dispatch(
        &r,
        &ResolverRequest::ResolveChildrenRecursive {
            identifier: "tree:external-storage:primary:Download".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        response,
        ResolverResponse::Identifiers(vec![
            "external-storage:primary:Download/a.json".to_string(),
            "external-storage:primary:Download/sub/deep.json".to_string(),
            "external-storage:primary:Download/b.zip".to_string(),
        ])
    );
}

#[test]
fn grants_round_trip_over_the_wire() {
    let p = shared_download_tree();
    p.persist_grant(&id("tree:external-storage:primary:Download"))
        .unwrap();
    let r = resolver(p);

    let listed = dispatch(&r, &ResolverRequest::ListGrants).unwrap();
    assert_eq!(
        listed,
        ResolverResponse::Identifiers(vec![
            "tree:external-storage:primary:Download".to_string()
        ])
    );

    let covering = dispatch(
        &r,
        &ResolverRequest::FindCoveringGrant {
            identifier: "external-storage:primary:Download/sub/deep.json".to_string(),
        },
    )
    .unwrap();
    assert_eq!(
        covering,
        ResolverResponse::Identifier(Some(
            "tree:external-storage:primary:Download".to_string()
        ))
    );
}
