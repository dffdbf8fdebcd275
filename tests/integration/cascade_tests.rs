//! Integration tests for cascade propagation: removals that detach the
//! references removed code held, orphaning further declarations.

use deadsweep::{CleanConfig, Cleaner, DeclKind, Program, TreeBuilder};

fn clean(program: &mut Program) {
    clean_with(program, &CleanConfig::default());
}

fn clean_with(program: &mut Program, config: &CleanConfig) {
    let cleaner = Cleaner::new(config).expect("config should be valid");
    cleaner.clean(program);
}

#[test]
fn test_transitive_chain_is_fully_removed() {
    // private a() { b(); }  private b() { c(); }  private c() {}
    // No external caller of a: all three go in one pass.
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let m_c = b.begin_method("c", true, &[]);
    b.end_method();
    let m_b = b.begin_method("b", true, &[]);
    b.usage(m_c);
    b.end_method();
    b.begin_method("a", true, &[]);
    b.usage(m_b);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(
        program.members(foo).is_empty(),
        "the whole dead chain should be eliminated"
    );
}

#[test]
fn test_cascade_stops_at_a_live_target() {
    // a -> b -> c, but c is also called from a public method.
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let m_c = b.begin_method("c", true, &[]);
    b.end_method();
    let m_b = b.begin_method("b", true, &[]);
    b.usage(m_c);
    b.end_method();
    b.begin_method("a", true, &[]);
    b.usage(m_b);
    b.end_method();
    b.begin_method("entry", false, &[]);
    b.usage(m_c);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 2);
    assert!(!program.decl(m_c).is_removed());
    assert!(program.decl(m_b).is_removed());
}

#[test]
fn test_mutual_reference_cycle_is_kept() {
    // a and b only call each other; neither ever reaches zero usages, so
    // the zero-usage policy leaves both in place.
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let m_a = b.begin_method("a", true, &[]);
    b.end_method();
    let m_b = b.begin_method("b", true, &[]);
    b.usage(m_a);
    b.end_method();
    b.late_usage(m_a, m_b);
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 2);
    assert!(!program.decl(m_a).is_removed());
    assert!(!program.decl(m_b).is_removed());
}

#[test]
fn test_field_collapse_orphans_its_declared_type() {
    // private class Helper {}  private Helper h;  -> both removed
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let helper = b.begin_type(DeclKind::Class, "Helper", true);
    b.end_type();
    b.begin_group(true, Some(helper));
    b.declarator("h");
    b.end_group();
    b.begin_method("entry", false, &[]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 1, "only the public method remains");
    assert!(program.decl(helper).is_removed());
}

#[test]
fn test_field_collapse_orphans_its_import() {
    let mut b = TreeBuilder::new();
    let import = b.import("java.util.Map");
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    b.begin_group(true, Some(import));
    b.declarator("cache");
    b.end_group();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.imports().is_empty());
    assert!(program.members(foo).is_empty());
}

#[test]
fn test_partially_used_declarator_group_is_kept() {
    // private int a, b;  with b read from a public method
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let group = b.begin_group(true, None);
    let var_a = b.declarator("a");
    let var_b = b.declarator("b");
    b.end_group();
    b.begin_method("entry", false, &[]);
    b.usage(var_b);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert_eq!(program.members(foo).len(), 2);
    assert_eq!(program.declarators(group), &[var_b]);
    assert!(program.decl(var_a).is_removed());
}

#[test]
fn test_removed_method_releases_its_local_variable_types() {
    // An unused private method declares a variable of a private class; the
    // method's removal must free the class too.
    let mut b = TreeBuilder::new();
    let foo = b.begin_type(DeclKind::Class, "Foo", false);
    let helper = b.begin_type(DeclKind::Class, "Helper", true);
    b.end_type();
    b.begin_method("dead", true, &[]);
    b.begin_group(true, Some(helper));
    let var = b.declarator("h");
    b.end_group();
    b.usage(var);
    b.end_method();
    b.begin_method("entry", false, &[]);
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    assert!(program.decl(helper).is_removed());
    assert_eq!(program.members(foo).len(), 1);
}

#[test]
fn test_empty_statements_survive_by_default() {
    let mut b = TreeBuilder::new();
    b.begin_type(DeclKind::Class, "Foo", false);
    let entry = b.begin_method("entry", false, &[]);
    b.begin_if();
    b.end_if();
    b.empty_stmt();
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    clean(&mut program);

    let body = program.method_body(entry).expect("entry has a body");
    assert_eq!(program.stmts(body).len(), 2);
}

#[test]
fn test_empty_statements_are_pruned_when_enabled() {
    let mut b = TreeBuilder::new();
    b.begin_type(DeclKind::Class, "Foo", false);
    let entry = b.begin_method("entry", false, &[]);
    b.begin_if();
    b.end_if();
    b.empty_stmt();
    b.begin_loop();
    b.expr_stmt();
    b.end_loop();
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        prune_empty_statements: true,
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    let body = program.method_body(entry).expect("entry has a body");
    assert_eq!(
        program.stmts(body).len(),
        1,
        "only the loop with a non-empty body should remain"
    );
}

#[test]
fn test_emptied_variable_statement_is_pruned_through_collapse() {
    // An if-branch holding only a dead variable statement: the statement
    // collapses through liveness, and with pruning on the emptied branch
    // disappears as well.
    let mut b = TreeBuilder::new();
    b.begin_type(DeclKind::Class, "Foo", false);
    let entry = b.begin_method("entry", false, &[]);
    b.begin_if();
    b.begin_group(true, None);
    b.declarator("scratch");
    b.end_group();
    b.end_if();
    b.end_method();
    b.end_type();
    let mut program = b.finish();

    let config = CleanConfig {
        prune_empty_statements: true,
        ..CleanConfig::default()
    };
    clean_with(&mut program, &config);

    let body = program.method_body(entry).expect("entry has a body");
    assert!(program.stmts(body).is_empty());
}
