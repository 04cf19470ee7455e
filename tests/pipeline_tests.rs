//! End-to-End Pipeline Tests
//!
//! Drives tokenizer → parser → analyzer through the public API, using the
//! fixtures in `tests/fixtures`.

use carch::lint::SchemaLinter;
use carch::{compile, parse, Diagnostics, LintConfig, TypeExprKind};

fn compile_err(src: &str) -> Diagnostics {
    match compile(src) {
        Ok(schema) => panic!("expected failure, got {} valid definitions", schema.len()),
        Err(diagnostics) => diagnostics,
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_simple_struct() {
    let schema = compile("Position : struct { x: f32, y: f32, z: f32 }").unwrap();
    assert_eq!(schema.len(), 1);
    match &schema.definitions[0].ty.kind {
        TypeExprKind::Struct { fields } => {
            let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
            assert_eq!(names, vec!["x", "y", "z"]);
        }
        other => panic!("Expected struct, got {:?}", other),
    }
}

#[test]
fn test_duplicate_definition() {
    let diags = compile_err(include_str!("fixtures/duplicate.carch"));
    assert!(diags.contains("Duplicate type definition: 'Position'"));
    assert!(diags.contains("Line 2, Column 1"));
}

#[test]
fn test_undefined_type() {
    let diags = compile_err(include_str!("fixtures/undefined.carch"));
    assert_eq!(diags.len(), 1);
    assert!(diags.contains("Undefined type 'Position'"));
}

#[test]
fn test_mutual_cycle() {
    let diags = compile_err(include_str!("fixtures/mutual_cycle.carch"));
    assert!(diags.contains("Circular type dependency detected for: 'A'"));
}

#[test]
fn test_ref_breaks_self_relationship() {
    let schema = compile(include_str!("fixtures/ref_cycle.carch")).unwrap();
    assert_eq!(schema.definitions[0].name, "Node");
}

#[test]
fn test_nested_optional() {
    let diags = compile_err(include_str!("fixtures/nested_optional.carch"));
    assert!(diags.contains("Nested optional types"));
}

#[test]
fn test_realistic_schema() {
    let schema = compile(include_str!("fixtures/game.carch")).unwrap();
    let names: Vec<&str> = schema.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["Faction", "Position", "Stats", "Inventory", "Action", "Entity"]
    );

    let graph = schema.graph();
    assert_eq!(graph.edge_count(), 6);
    assert_eq!(
        graph.dependencies_of("Entity"),
        vec!["Faction", "Position", "Stats", "Inventory", "Action"]
    );
    assert_eq!(graph.emission_order().unwrap().last(), Some(&"Entity"));

    let lint = SchemaLinter::new(LintConfig::default())
        .unwrap()
        .lint("game.carch", schema.schema());
    assert!(lint.is_clean() && !lint.has_warnings(), "{:?}", lint);
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_any_number_of_duplicates_fails() {
    for k in 2..6 {
        let src: String = (0..k).map(|i| format!("Twice : struct {{ f{}: u8 }}\n", i)).collect();
        let diags = compile_err(&src);
        assert!(diags.contains("Duplicate type definition: 'Twice'"), "k = {}", k);
        assert_eq!(diags.len(), k - 1);
    }
}

#[test]
fn test_forward_reference_fixed_by_reordering() {
    let forward = "A : struct { b: B }\nB : struct { x: u8 }";
    let diags = compile_err(forward);
    assert!(diags.contains("Illegal forward reference to type 'B'"));

    let ordered = "B : struct { x: u8 }\nA : struct { b: B }";
    assert!(compile(ordered).is_ok());
}

#[test]
fn test_self_reference_needs_ref() {
    assert!(compile_err("Node : struct { child: Node }").contains("Circular type dependency"));
    assert!(compile("Node : struct { next: ref<entity> }").is_ok());
}

#[test]
fn test_nested_optional_fails_identically_everywhere() {
    let placements = [
        "T : struct { v: optional<optional<u32>> }",
        "T : struct { v: array<optional<optional<u32>>> }",
        "T : struct { v: map<str, optional<optional<u32>>> }",
    ];
    for src in placements {
        let diags = compile_err(src);
        assert_eq!(diags.len(), 1, "{}", src);
        assert!(diags.contains("Nested optional types (optional<optional<T>>) are not allowed"));
    }
}

#[test]
fn test_compact_and_expanded_layouts_agree() {
    let compact = "Pair : struct { left: array<u8>, right: map<str, variant { A, B: i64 }> }";
    let expanded = "Pair : struct {\n    left: array<u8>,\n    right: map<\n        str,\n        variant {\n            A,\n            B: i64,\n        }\n    >,\n}\n";
    // spans differ, so compare the rendered trees
    let compact = compile(compact).unwrap().schema().to_string();
    let expanded = compile(expanded).unwrap().schema().to_string();
    assert_eq!(compact, expanded);
    assert!(compact.contains("right: map<str, variant { A, B: i64 }>"));
}

// =============================================================================
// Syntax Errors
// =============================================================================

#[test]
fn test_syntax_errors_skip_analysis() {
    // `Missing` is undefined, but analysis never runs on a broken parse
    let diags = compile_err("A : struct { x: Missing, y: }");
    assert_eq!(diags.len(), 1);
    assert!(diags.contains("Expected type expression"));
}

#[test]
fn test_recovery_collects_every_error() {
    let output = parse(include_str!("fixtures/syntax_errors.carch"));
    assert_eq!(
        output.diagnostics.messages(),
        vec![
            "Line 2, Column 22: Expected type expression",
            "Line 2, Column 27: Expected type expression",
            "Line 3, Column 21: Unexpected character: '@'",
            "Line 5, Column 1: Expected '}' after enum values",
        ]
    );
    let names: Vec<&str> = output.schema.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Good", "Broken", "Strange", "Tail"]);
}

#[test]
fn test_lexical_errors_are_reported_with_positions() {
    let diags = compile_err("A : struct { s: u8 }\nB : struct { t: \"unterminated");
    assert!(diags.contains("Line 2, Column 17: Unterminated string literal"));

    let diags = compile_err("A : u8 /* never closed");
    assert!(diags.contains("Line 1, Column 8: Unterminated multi-line comment"));
}

#[test]
fn test_diagnostics_render_as_lines() {
    let diags = compile_err(include_str!("fixtures/undefined.carch"));
    let rendered = diags.to_string();
    assert!(rendered.starts_with("Line 1, Column 24: Undefined type 'Position' referenced in 'Entity.pos'\n"));
    assert!(rendered.ends_with("1 error(s)\n"));
}

// =============================================================================
// Files and Threads
// =============================================================================

#[test]
fn test_compile_file() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.carch");
    let bad = dir.path().join("bad.carch");
    std::fs::write(&good, include_str!("fixtures/game.carch")).unwrap();
    std::fs::write(&bad, include_str!("fixtures/mutual_cycle.carch")).unwrap();

    assert_eq!(carch::compile_file(&good).unwrap().len(), 6);

    let err = carch::compile_file(&bad).unwrap_err().to_string();
    assert!(err.contains("bad.carch"), "{}", err);

    let missing = dir.path().join("missing.carch");
    assert!(carch::compile_file(&missing).is_err());
}

#[test]
fn test_independent_compilations_run_in_parallel() {
    let inputs = [
        include_str!("fixtures/game.carch"),
        include_str!("fixtures/mutual_cycle.carch"),
        include_str!("fixtures/ref_cycle.carch"),
        include_str!("fixtures/undefined.carch"),
    ];
    let results: Vec<bool> = std::thread::scope(|scope| {
        let handles: Vec<_> = inputs
            .iter()
            .map(|src| scope.spawn(move || compile(src).is_ok()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(results, vec![true, false, true, false]);
}
