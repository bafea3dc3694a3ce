//! End-to-end resolution over a real directory tree.
//!
//! Builds the built-in stream table from an INI configuration rooted in a
//! temporary installation and checks overlay precedence on disk.

use std::fs;
use std::path::{Path, PathBuf};

use streamlayer::config::ConfigFile;
use streamlayer::platform::{build_registry_with, ConfiguredPlatform, BUILTIN_STREAMS};
use streamlayer::stream::{StreamError, StreamResolver};
use tempfile::TempDir;

fn touch(root: &Path, relative: &str) -> PathBuf {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, relative).unwrap();
    path
}

fn installation() -> (TempDir, StreamResolver) {
    let temp = TempDir::new().unwrap();
    let config = ConfigFile::parse(&format!(
        r#"
[platform]
root = {}
cache = cache/gantry5

[resolver]
parallel_probe = true

[paths.themes]
root = templates

[paths.theme]
root = templates/hydrogen, templates/hydrogen-base

[paths.engine]
root = media/gantry5/engines/nucleus

[paths.media]
root = images

[stream.gantry-admin]
root = administrator/gantry5
"#,
        temp.path().display()
    ))
    .unwrap();

    let platform = ConfiguredPlatform::new(config);
    let registry = build_registry_with(&platform, platform.empty_registry()).unwrap();
    let resolver = StreamResolver::new(registry.into_shared()).with_parallel_probe(true);
    (temp, resolver)
}

#[test]
fn test_all_builtins_registered() {
    let (_temp, resolver) = installation();
    let names: Vec<_> = resolver
        .registry()
        .namespaces()
        .map(|ns| ns.name.clone())
        .collect();
    assert_eq!(names, BUILTIN_STREAMS);
}

#[test]
fn test_child_theme_shadows_parent() {
    let (temp, resolver) = installation();
    let root = temp.path();
    touch(root, "templates/hydrogen-base/layouts/home.yaml");
    let child = touch(root, "templates/hydrogen/layouts/home.yaml");
    let parent_only = touch(root, "templates/hydrogen-base/layouts/blank.yaml");

    assert_eq!(resolver.resolve("gantry-layouts://home.yaml").unwrap(), child);
    assert_eq!(
        resolver.resolve("gantry-layouts://blank.yaml").unwrap(),
        parent_only
    );
}

#[test]
fn test_particles_overlay_lists_every_layer() {
    let (temp, resolver) = installation();
    let root = temp.path();
    let engine = touch(root, "media/gantry5/engines/nucleus/particles/menu.yaml");
    let theme = touch(root, "templates/hydrogen/particles/menu.yaml");

    assert_eq!(
        resolver.list("gantry-particles://menu.yaml").unwrap(),
        vec![theme.clone(), engine.clone()]
    );
    assert_eq!(
        resolver
            .list("gantry-blueprints://particles/menu.yaml")
            .unwrap(),
        vec![theme, engine]
    );
}

#[test]
fn test_blueprints_prefer_engine() {
    let (temp, resolver) = installation();
    let root = temp.path();
    let engine = touch(root, "media/gantry5/engines/nucleus/blueprints/page/head.yaml");
    touch(root, "templates/hydrogen/blueprints/page/head.yaml");

    assert_eq!(
        resolver.resolve("gantry-blueprints://page/head.yaml").unwrap(),
        engine
    );
}

#[test]
fn test_missing_file_reports_candidate_count() {
    let (_temp, resolver) = installation();
    match resolver.resolve("gantry-config://default/styles.yaml") {
        Err(StreamError::NotFound { candidates, .. }) => assert_eq!(candidates, 2),
        other => panic!("expected NotFound, got {:?}", other),
    }
    assert!(resolver
        .list("gantry-config://default/styles.yaml")
        .unwrap()
        .is_empty());
}

#[test]
fn test_cache_is_only_writable_stream() {
    let (temp, resolver) = installation();

    let target = resolver.resolve_for_write("gantry-cache://css/main.css").unwrap();
    assert_eq!(target, temp.path().join("cache/gantry5/css/main.css"));
    assert!(temp.path().join("cache/gantry5").is_dir());

    for name in BUILTIN_STREAMS.iter().filter(|n| **n != "gantry-cache") {
        let reference = format!("{}://x", name);
        assert!(matches!(
            resolver.resolve_for_write(&reference),
            Err(StreamError::NotWritable { .. })
        ));
    }
}

#[test]
fn test_configured_admin_stream() {
    let (temp, resolver) = installation();
    let menu = touch(temp.path(), "administrator/gantry5/menu.yaml");
    assert!(resolver.exists("gantry-admin://menu.yaml"));
    assert_eq!(resolver.resolve("gantry-admin://menu.yaml").unwrap(), menu);
}

#[test]
fn test_escape_rejected_everywhere() {
    let (_temp, resolver) = installation();
    for name in BUILTIN_STREAMS {
        let reference = format!("{}://../secret", name);
        assert!(matches!(
            resolver.expand(&reference),
            Err(StreamError::PathEscape { .. })
        ));
    }
}

#[test]
fn test_find_all_keeps_input_order() {
    let (temp, resolver) = installation();
    let logo = touch(temp.path(), "images/logo.png");

    let references = vec![
        "gantry-media://logo.png".to_string(),
        "gantry-media://missing.png".to_string(),
    ];
    let results = resolver.find_all(&references);
    assert_eq!(results[0].as_ref().unwrap(), &logo);
    assert!(results[1].is_err());
}
