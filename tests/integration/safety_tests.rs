//! Integration tests for the safety rules: serialization hooks, keep-unused
//! markers, side-effecting initializers, and the exclusion registry.

use deadsweep::{
    CleanConfig, Cleaner, ConfigError, DeclKind, EffectKind, Marker, MarkerValue, Program,
    SerializationSupport, TreeBuilder,
};

fn clean(program: &mut Program) {
    clean_with(program, &CleanConfig::default());
}

fn clean_with(program: &mut Program, config: &CleanConfig) {
    let cleaner = Cleaner::new(config).expect("config should be valid");
    cleaner.clean(program);
}

fn suppress_unused() -> Marker {
    Marker::new("SuppressWarnings").with_value(MarkerValue::Str("unused".to_string()))
}

#[test]
fn test_serialization_hooks_are_preserved() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Payload", false);
    b.serialization(SerializationSupport::Serializable);
    b.begin_method("readResolve", true, &[]);
    b.end_method();
    b.begin_method("writeObject", true, &["java.io.ObjectOutputStream"]);
    b.end_method();
    b.begin_method("readObject", true, &["java.io.ObjectInputStream"]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 3, "all hooks should survive");
}

#[test]
fn test_serialization_hooks_removed_when_protection_is_off() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Payload", false);
    b.serialization(SerializationSupport::Serializable);
    b.begin_method("readResolve", true, &[]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        ignore_serialization_contract_methods: true,
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_hook_named_method_outside_the_contract_is_removed() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Plain", false);
    b.begin_method("readResolve", true, &[]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_hook_with_wrong_signature_is_removed() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Payload", false);
    b.serialization(SerializationSupport::Serializable);
    b.begin_method("readResolve", true, &["java.lang.String"]);
    b.end_method();
    b.begin_method("readObject", true, &["java.lang.String"]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_externalizable_protects_only_replacement_hooks() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Payload", false);
    b.serialization(SerializationSupport::Externalizable);
    let keep = b.begin_method("writeReplace", true, &[]);
    b.end_method();
    b.begin_method("readObjectNoData", true, &[]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1);
    assert!(!program.decl(keep).is_removed());
}

#[test]
fn test_serial_version_field_is_preserved() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Payload", false);
    b.serialization(SerializationSupport::Serializable);
    let group = b.begin_group(true, None);
    b.declarator("serialVersionUID");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1);
    assert_eq!(program.declarators(group).len(), 1);
}

#[test]
fn test_serial_version_field_in_plain_class_is_removed() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Plain", false);
    b.begin_group(true, None);
    b.declarator("serialVersionUID");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_marker_with_direct_sentinel_preserves_method() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.begin_method("spare", true, &[]);
    b.marker(suppress_unused());
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1);
}

#[test]
fn test_marker_with_sentinel_in_array_preserves_class() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.begin_type(DeclKind::Class, "Spare", true);
    b.marker(Marker::new("SuppressWarnings").with_value(MarkerValue::Array(vec![
        MarkerValue::Str("deprecation".to_string()),
        MarkerValue::Str("unused".to_string()),
    ])));
    b.end_type();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1);
}

#[test]
fn test_marker_without_sentinel_does_not_protect() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.begin_method("spare", true, &[]);
    b.marker(Marker::new("SuppressWarnings").with_value(MarkerValue::Str("all".to_string())));
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_marker_on_declaration_statement_protects_its_declarators() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let group = b.begin_group(true, None);
    b.marker(suppress_unused());
    b.declarator("spare");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1);
    assert_eq!(program.declarators(group).len(), 1);
}

#[test]
fn test_side_effecting_initializers_are_preserved() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.begin_group(true, None);
    b.begin_declarator("connected");
    b.init_effect(EffectKind::Call);
    b.end_declarator();
    b.end_group();
    b.begin_group(true, None);
    b.begin_declarator("instance");
    b.init_effect(EffectKind::Construct);
    b.end_declarator();
    b.end_group();
    b.begin_group(true, None);
    b.begin_declarator("token");
    b.init_effect(EffectKind::ClassLiteral);
    b.end_declarator();
    b.end_group();
    b.begin_group(true, None);
    b.declarator("plain");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(
        program.members(foo).len(),
        3,
        "only the literal-initialized field should be removed"
    );
}

#[test]
fn test_side_effecting_local_initializer_is_preserved() {
    let mut b = TreeBuilder::new();
    b.begin_type(DeclKind::Class, "Foo", false);
    let entry = b.begin_method("entry", false, &[]);
    b.begin_group(true, None);
    b.begin_declarator("handle");
    b.init_effect(EffectKind::Call);
    b.end_declarator();
    b.end_group();
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    let body = program.method_body(entry).expect("entry has a body");
    assert_eq!(program.stmts(body).len(), 1);
}

#[test]
fn test_excluded_method_signature_is_preserved() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.qualified_name("com.example.Foo");
    b.begin_method("helper", true, &["java.lang.String"]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        excluded_methods: vec!["com.example.Foo#helper(java.lang.String)".to_string()],
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    assert_eq!(program.members(foo).len(), 1);
}

#[test]
fn test_exclusion_requires_exact_parameter_sequence() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.qualified_name("com.example.Foo");
    b.begin_method("helper", true, &["java.lang.String"]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        excluded_methods: vec!["com.example.Foo#helper(int)".to_string()],
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    assert!(program.members(foo).is_empty());
}

#[test]
fn test_excluded_field_is_preserved() {
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.qualified_name("com.example.Foo");
    b.begin_group(true, None);
    b.declarator("cache");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        excluded_fields: vec!["com.example.Foo#cache".to_string()],
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    assert_eq!(program.members(foo).len(), 1);
}

#[test]
fn test_malformed_exclusion_fails_at_setup() {
    let config = CleanConfig {
        excluded_methods: vec!["not a signature".to_string()],
        ..CleanConfig::default()
    };
    let err = Cleaner::new(&config).expect_err("setup should fail");
    assert!(matches!(err, ConfigError::InvalidMethodExclusion { .. }));
}

#[test]
fn test_marker_excluded_local_type_is_kept() {
    let mut b = TreeBuilder::new();
    b.begin_type(DeclKind::Class, "Foo", false);
    let entry = b.begin_method("entry", false, &[]);
    b.begin_type(DeclKind::Class, "Spare", true);
    b.marker(suppress_unused());
    b.end_type();
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    let body = program.method_body(entry).expect("entry has a body");
    assert_eq!(program.stmts(body).len(), 1);
}
