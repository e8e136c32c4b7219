use std::path::PathBuf;

use sprocket_ir::{Graph, InstructionKind};
use sprocket_lower::{
    ForeignFunction, ForeignModuleSpec, ForeignRegistry, ForeignSource, LoadError, Lowerer, LoweringError,
    MemoryLoader, PrimitiveType,
};
use sprocket_syntax::{Expr, Program, Stmt};

mod common;
use common::{body_of, func, import, lower_with, namespace_named, MAIN};

fn util_program() -> Program {
    Program::new(vec![
        import("test.h"),
        func("answer", &[], Some("int"), vec![Stmt::Return(Expr::number("42"))]),
    ])
}

fn main_importing_util() -> Program {
    Program::new(vec![
        import("util.spng"),
        import("test.h"),
        func(
            "main",
            &[],
            Some("int"),
            vec![Stmt::Return(Expr::call(Expr::attr(Expr::var("util"), "answer"), vec![]))],
        ),
    ])
}

#[test]
fn test_same_language_import_is_lowered_into_its_own_module() -> Result<(), LoweringError> {
    let mut loader = MemoryLoader::new().with("src/util.spng", util_program());
    let mut graph = Graph::new();
    let compilation = lower_with(&mut graph, &mut loader, &main_importing_util())?;

    let util = namespace_named(&graph, "util");
    let builtins = namespace_named(&graph, "builtins");
    // Primary first, then imported units, then foreign modules; the header
    // imported by both units is instantiated once.
    assert_eq!(compilation.modules, vec![compilation.primary, util, builtins]);

    let answer = graph.lookup(util, "answer").unwrap();
    let body = body_of(&graph, compilation.primary, "main");
    match &graph.body(body)[0].kind {
        InstructionKind::Call { func, .. } => assert_eq!(func.value, answer),
        other => panic!("expected call, got {:?}", other),
    }
    // The imported function is not visible unqualified.
    assert!(graph.lookup(compilation.primary, "answer").is_err());
    Ok(())
}

#[test]
fn test_unit_imported_twice_is_lowered_once() -> Result<(), LoweringError> {
    let main = Program::new(vec![import("util.spng"), import("./util.spng")]);
    let mut loader = MemoryLoader::new().with("src/util.spng", util_program());
    let mut graph = Graph::new();
    let compilation = lower_with(&mut graph, &mut loader, &main)?;

    let units = graph
        .namespaces()
        .filter(|(_, namespace)| namespace.is_module() && namespace.name() == "util")
        .count();
    assert_eq!(units, 1);
    assert_eq!(compilation.modules.len(), 3);
    Ok(())
}

#[test]
fn test_import_cycle_is_rejected() {
    let a = Program::new(vec![import("b.spng")]);
    let b = Program::new(vec![import("main.spng")]);
    let mut loader = MemoryLoader::new().with("src/b.spng", b);
    let mut graph = Graph::new();

    match lower_with(&mut graph, &mut loader, &a).unwrap_err() {
        LoweringError::ImportCycle { cycle, .. } => {
            assert_eq!(
                cycle,
                vec![
                    PathBuf::from(MAIN),
                    PathBuf::from("src/b.spng"),
                    PathBuf::from(MAIN)
                ]
            );
        }
        other => panic!("expected ImportCycle, got {:?}", other),
    }
}

#[test]
fn test_missing_unit_fails_to_load() {
    let mut graph = Graph::new();
    let err = lower_with(&mut graph, &mut MemoryLoader::new(), &main_importing_util()).unwrap_err();
    match err {
        LoweringError::Load { path, source, .. } => {
            assert_eq!(path, PathBuf::from("src/util.spng"));
            assert!(matches!(source, LoadError::NotFound));
        }
        other => panic!("expected Load, got {:?}", other),
    }
}

#[test]
fn test_alias_bound_to_two_modules_is_rejected() {
    // `test.spng` and `test.h` would both be bound as `test`.
    let main = Program::new(vec![import("test.h"), import("test.spng")]);
    let mut loader = MemoryLoader::new().with("src/test.spng", Program::default());
    let mut graph = Graph::new();
    let err = lower_with(&mut graph, &mut loader, &main).unwrap_err();
    assert!(matches!(err, LoweringError::DuplicateAlias { ref alias, .. } if alias == "test"));
}

#[test]
fn test_registered_foreign_module_is_importable() -> Result<(), LoweringError> {
    let mut registry = ForeignRegistry::builtin();
    registry.register(ForeignModuleSpec {
        name: "mathlib".to_string(),
        header: PathBuf::from("native/mathlib.h"),
        source: ForeignSource::File(PathBuf::from("native/mathlib.c")),
        functions: vec![ForeignFunction::new(
            "add",
            vec![PrimitiveType::Int, PrimitiveType::Int],
            PrimitiveType::Int,
        )],
    });
    let program = Program::new(vec![
        import("mathlib.h"),
        func(
            "main",
            &[],
            Some("int"),
            vec![Stmt::Return(Expr::call(
                Expr::attr(Expr::var("mathlib"), "add"),
                vec![Expr::number("1"), Expr::number("2")],
            ))],
        ),
    ]);

    let mut graph = Graph::new();
    let mut loader = MemoryLoader::new();
    let compilation = Lowerer::new(&mut graph, registry, &mut loader).lower_program(&program, MAIN)?;

    assert_eq!(
        compilation.foreign_sources(),
        [ForeignSource::File(PathBuf::from("native/mathlib.c"))]
    );
    let body = body_of(&graph, compilation.primary, "main");
    assert_eq!(graph.body(body).len(), 4);
    Ok(())
}
