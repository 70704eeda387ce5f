//! Integration tests for tmplset-registry

use std::collections::BTreeSet;
use std::fs;

use flate2::Compression;
use flate2::write::GzEncoder;
use pretty_assertions::assert_eq;
use serde_json::json;
use tempfile::tempdir;
use tmplset::{
    ElementDelivery, InMemoryHost, Placement, RenderOptions, StreamDelivery, TemplateError,
    TemplateKind, TemplateSetConfig,
};
use tmplset_registry::codec::decode;
use tmplset_registry::*;

fn resolvable(set: &TemplateSet, name: &str) -> BTreeSet<String> {
    set.get(name)
        .unwrap()
        .associations()
        .map(String::from)
        .collect()
}

#[test]
fn test_end_to_end_import() {
    let mut set = TemplateSet::new();
    let bundle = TemplateBundle::new("app")
        .with_item(
            "views/home",
            "Hello {{ name }} | {% include \"app/partials/footer\" %}",
        )
        .with_item("partials/footer", "\u{a9} {{ year }}");

    set.import_bundle("app", bundle).unwrap();

    let home = set.lookup("app/views/home").unwrap();
    let footer = set.lookup("app/partials/footer").unwrap();
    assert_eq!(home.kind(), TemplateKind::View);
    assert_eq!(footer.kind(), TemplateKind::Partial);
    assert!(home.resolves("app/partials/footer"));

    let page = set
        .render("app/views/home", &json!({"name": "Ada", "year": 2024}))
        .unwrap();
    assert_eq!(String::from_utf8(page).unwrap(), "Hello Ada | \u{a9} 2024");
}

#[test]
fn test_association_across_separate_imports() {
    let mut set = TemplateSet::new();
    set.import_bundle(
        "n1",
        TemplateBundle::new("n1").with_item("partials/x", "x from n1"),
    )
    .unwrap();
    set.import_bundle(
        "n2",
        TemplateBundle::new("n2").with_item("views/y", "y includes [{% include \"n1/partials/x\" %}]"),
    )
    .unwrap();

    assert!(set.get("n2/views/y").unwrap().resolves("n1/partials/x"));
    assert!(set.get("n1/partials/x").unwrap().resolves("n2/views/y"));
    assert_eq!(
        set.render("n2/views/y", &json!({})).unwrap(),
        b"y includes [x from n1]"
    );
}

#[test]
fn test_association_is_idempotent() {
    let mut set = TemplateSet::new();
    set.import_bundle(
        "app",
        TemplateBundle::new("app")
            .with_item("views/a", "a")
            .with_item("views/b", "b")
            .with_item("layouts/c", "c"),
    )
    .unwrap();

    let before: Vec<_> = set.members().keys().map(|name| resolvable(&set, name)).collect();
    set.make_all_associations().unwrap();
    let after: Vec<_> = set.members().keys().map(|name| resolvable(&set, name)).collect();

    assert_eq!(before, after);
    assert_eq!(before[0].len(), 3);
}

#[test]
fn test_import_of_hundreds_of_templates() {
    let mut bundle = TemplateBundle::new("big");
    for i in 0..400 {
        bundle.insert(format!("partials/p{i:03}"), format!("part {i}"));
    }
    bundle.insert(
        "views/index",
        "{% include \"big/partials/p000\" %}, {% include \"big/partials/p399\" %}",
    );

    let mut set = TemplateSet::new();
    set.import_bundle("big", bundle).unwrap();

    assert_eq!(set.len(), 401);
    assert!(
        set.members()
            .values()
            .all(|member| member.associations().count() == 401)
    );
    assert_eq!(
        set.render("big/views/index", &json!({})).unwrap(),
        b"part 0, part 399"
    );

    // A later single-item import links into the existing mesh
    set.import_bundle("big", TemplateBundle::new("big").with_item("views/extra", "extra"))
        .unwrap();
    assert!(set.get("big/partials/p123").unwrap().resolves("big/views/extra"));
    assert!(set.get("big/views/extra").unwrap().resolves("big/partials/p123"));
}

#[test]
fn test_reimport_overwrites_member_and_raw_text() {
    let mut set = TemplateSet::new();
    set.import_bundle("app", TemplateBundle::new("app").with_item("views/home", "first"))
        .unwrap();
    set.import_bundle("app", TemplateBundle::new("app").with_item("views/home", "second"))
        .unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.get("app/views/home").unwrap().source(), "second");
    assert_eq!(set.bundle("app").unwrap().get("views/home"), Some("second"));
    assert_eq!(set.render("app/views/home", &json!({})).unwrap(), b"second");
}

#[test]
fn test_associations_are_not_replaced_by_reimport() {
    let mut set = TemplateSet::new();
    set.import_bundle(
        "app",
        TemplateBundle::new("app")
            .with_item("views/home", "[{% include \"app/partials/nav\" %}]")
            .with_item("partials/nav", "old nav"),
    )
    .unwrap();

    // The nav member is replaced, but home keeps the association it already has
    set.import_bundle("app", TemplateBundle::new("app").with_item("partials/nav", "new nav"))
        .unwrap();

    assert_eq!(set.render("app/partials/nav", &json!({})).unwrap(), b"new nav");
    assert_eq!(set.render("app/views/home", &json!({})).unwrap(), b"[old nav]");
}

#[test]
fn test_partial_import_on_parse_error() {
    let mut set = TemplateSet::new();
    let bundle = TemplateBundle::new("app")
        .with_item("a", "first")
        .with_item("b", "{% if %}")
        .with_item("c", "third");

    let err = set.import_bundle("app", bundle).unwrap_err();

    assert!(matches!(
        err,
        RegistryError::Template(TemplateError::Parse { ref name, .. }) if name == "app/b"
    ));
    assert!(set.lookup("app/a").is_some());
    assert!(set.lookup("app/b").is_none());
    assert!(set.lookup("app/c").is_none());

    let raw = set.bundle("app").unwrap();
    assert_eq!(raw.get("a"), Some("first"));
    assert!(!raw.contains("c"));

    // Re-importing a fixed bundle is safe
    set.import_bundle(
        "app",
        TemplateBundle::new("app")
            .with_item("a", "first")
            .with_item("b", "fixed")
            .with_item("c", "third"),
    )
    .unwrap();
    assert_eq!(set.len(), 3);
    assert!(set.get("app/a").unwrap().resolves("app/c"));
}

#[test]
fn test_persistence_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("templates.bin");

    let mut set = TemplateSet::new();
    set.import_bundle(
        "app",
        TemplateBundle::new("app")
            .with_item("views/home", "Hello {{ name }}\r\n  {% include \"lib/partials/sig\" %}")
            .with_item("index", ""),
    )
    .unwrap();
    set.import_bundle(
        "lib",
        TemplateBundle::new("lib").with_item("partials/sig", "-- \u{1F600} {{ name }}"),
    )
    .unwrap();
    set.persist_to_disk(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(set.binary_bundle(), Some(bytes.as_slice()));
    assert_eq!(decode(&bytes).unwrap(), set.raw_text());

    let mut restored = TemplateSet::new();
    restored.restore_from_disk(&path).unwrap();

    assert_eq!(restored.raw_text(), set.raw_text());
    assert_eq!(restored.binary_bundle_digest(), set.binary_bundle_digest());
    assert_eq!(
        restored.members().keys().collect::<Vec<_>>(),
        set.members().keys().collect::<Vec<_>>()
    );
    assert_eq!(
        restored.render("app/views/home", &json!({"name": "Ada"})).unwrap(),
        set.render("app/views/home", &json!({"name": "Ada"})).unwrap()
    );
    assert_eq!(
        restored.get("lib/partials/sig").unwrap().kind(),
        TemplateKind::Partial
    );
}

#[test]
fn test_persisted_bundle_is_not_kept_in_sync() {
    let dir = tempdir().unwrap();
    let mut set = TemplateSet::new();
    set.import_bundle("app", TemplateBundle::new("app").with_item("a", "a"))
        .unwrap();
    set.persist_to_disk(dir.path().join("set.bin")).unwrap();
    let persisted = set.binary_bundle().unwrap().to_vec();

    set.import_bundle("app", TemplateBundle::new("app").with_item("b", "b"))
        .unwrap();

    assert_eq!(set.binary_bundle(), Some(persisted.as_slice()));
    assert_ne!(set.encode().unwrap(), persisted);
}

#[test]
fn test_persist_requires_existing_directory() {
    let dir = tempdir().unwrap();
    let mut set = TemplateSet::new();

    let err = set
        .persist_to_disk(dir.path().join("missing").join("set.bin"))
        .unwrap_err();

    assert!(matches!(err, RegistryError::Codec(CodecError::MissingDirectory { .. })));
    assert!(set.binary_bundle().is_none());
}

#[test]
fn test_restore_errors() {
    let dir = tempdir().unwrap();
    let mut set = TemplateSet::new();

    let err = set.restore_from_disk(dir.path().join("absent.bin")).unwrap_err();
    assert!(matches!(err, RegistryError::Codec(CodecError::MissingBundle { .. })));

    let err = set.restore_from_binary(vec![0xFF, 0xFF, 0xFF]).unwrap_err();
    assert!(matches!(err, RegistryError::Codec(CodecError::Malformed { .. })));
    assert!(!err.is_recoverable());
    assert!(set.is_empty());
}

#[test]
fn test_gather_from_path_with_custom_extension() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("views")).unwrap();
    fs::create_dir_all(dir.path().join("partials")).unwrap();
    fs::write(
        dir.path().join("views/home.html"),
        "<h1>{{ title }}</h1>{% include \"site/partials/footer\" %}",
    )
    .unwrap();
    fs::write(dir.path().join("partials/footer.html"), "<footer/>").unwrap();
    fs::write(dir.path().join("partials/footer.tmpl"), "not a template here").unwrap();

    let config = TemplateSetConfig::default().with_file_extension(".html");
    let mut set = TemplateSet::with_config(config).unwrap();
    set.gather_from_path("site", dir.path()).unwrap();

    assert_eq!(set.len(), 2);
    assert_eq!(
        set.render("site/views/home", &json!({"title": "A & B"})).unwrap(),
        b"<h1>A &amp; B</h1><footer/>"
    );
}

#[test]
fn test_gather_from_gzip_archive() {
    let mut builder = tar::Builder::new(Vec::new());
    for (path, content) in [
        ("bundle/templates/components/card.tmpl", "card {{ n }}"),
        ("bundle/templates/views/list.tmpl", "{% include \"ui/components/card\" %}"),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, path, content.as_bytes()).unwrap();
    }
    let tar = builder.into_inner().unwrap();
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    std::io::Write::write_all(&mut encoder, &tar).unwrap();
    let gz = encoder.finish().unwrap();

    let mut set = TemplateSet::new();
    set.gather_from_archive("ui", gz.as_slice(), "bundle/templates")
        .unwrap();

    assert_eq!(
        set.get("ui/components/card").unwrap().kind(),
        TemplateKind::Component
    );
    assert_eq!(set.render("ui/views/list", &json!({"n": 3})).unwrap(), b"card 3");
}

#[test]
fn test_add_template_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("signup.tmpl");
    fs::write(&path, "Sign up, {{ who }}").unwrap();

    let mut set = TemplateSet::new();
    set.add_template_file("auth", TemplateKind::Form, "signup", &path)
        .unwrap();

    assert_eq!(set.bundle("auth").unwrap().get("forms/signup"), Some("Sign up, {{ who }}"));
    assert_eq!(set.render("auth/forms/signup", &json!({"who": "Ada"})).unwrap(), b"Sign up, Ada");

    let err = set
        .add_template_file("auth", TemplateKind::Form, "missing", dir.path().join("missing.tmpl"))
        .unwrap_err();
    assert!(matches!(err, RegistryError::Source(SourceError::Read { .. })));
}

#[test]
fn test_render_with_deliveries() {
    let mut set = TemplateSet::new();
    set.import_bundle(
        "app",
        TemplateBundle::new("app").with_item("components/badge", "{{ count }} new"),
    )
    .unwrap();

    let mut stream = StreamDelivery::new(Vec::new());
    let outcome = set
        .render_with(
            "app/components/badge",
            &json!({"count": 2}),
            &mut stream,
            RenderOptions::default(),
        )
        .unwrap();
    assert!(outcome.delivered);
    assert_eq!(stream.into_inner(), b"2 new");

    let mut element = ElementDelivery::new(InMemoryHost::with_inner("<span>0 new</span>"))
        .with_placement(Placement::ReplaceInnerContents)
        .with_class("badge");
    let outcome = set
        .render_with(
            "app/components/badge",
            &json!({"count": 5}),
            &mut element,
            RenderOptions {
                populate_rendered_content: true,
                skip_final_step: false,
            },
        )
        .unwrap();
    assert_eq!(outcome.rendered_content.as_deref(), Some("5 new"));
    assert_eq!(element.host().inner, "<div class=\"badge\">5 new</div>");

    let err = set
        .render_with("app/missing", &json!({}), &mut stream_sink(), RenderOptions::default())
        .unwrap_err();
    assert!(matches!(err, RegistryError::Template(TemplateError::NotFound { .. })));
}

fn stream_sink() -> StreamDelivery<Vec<u8>> {
    StreamDelivery::new(Vec::new())
}
