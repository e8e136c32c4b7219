use sprocket_ir::{Builder, Graph, NamespaceId, Signature, ValueId};
use sprocket_native::{compile_modules, FunctionEntry, NativeError};

fn entry(name: &str, module: &str, defined: bool) -> FunctionEntry {
    FunctionEntry {
        name: name.to_string(),
        module: module.to_string(),
        defined,
    }
}

fn body(graph: &Graph, func: ValueId) -> NamespaceId {
    graph.func(func).and_then(|decl| decl.body).expect("function has a body")
}

/// `main() -> void { return test(); }` with `test` declared in a foreign module.
fn hello_graph() -> (Graph, Vec<NamespaceId>) {
    let mut graph = Graph::new();
    let void = graph.primitives().void;
    let main_module = graph.add_module("main", "main.spng");
    let builtins = graph.add_foreign_module("builtins", "test.h", "test.c");
    let test = graph
        .declare_func_decl(builtins, &Signature::new("test", vec![], void))
        .unwrap();
    let main = graph
        .declare_function(main_module, &Signature::new("main", vec![], void))
        .unwrap();

    let block = body(&graph, main);
    let mut builder = Builder::new(&mut graph, block).unwrap();
    let result = builder.emit_call(test, &[], void).unwrap();
    builder.emit_return(result);
    builder.commit().unwrap();

    (graph, vec![main_module, builtins])
}

#[test]
fn test_hello_compiles_to_two_function_entries() -> Result<(), NativeError> {
    let (graph, modules) = hello_graph();
    let artifact = compile_modules(&graph, &modules)?;

    assert_eq!(
        artifact.functions,
        vec![entry("main", "main", true), entry("test", "builtins", false)]
    );
    assert_eq!(artifact.defined().count(), 1);
    assert_eq!(artifact.declared().count(), 1);
    assert!(!artifact.bytes.is_empty());
    // Both symbols appear in the object's symbol table.
    assert!(artifact.bytes.windows(4).any(|w| w == b"main"));
    assert!(artifact.bytes.windows(4).any(|w| w == b"test"));
    #[cfg(target_os = "linux")]
    assert_eq!(&artifact.bytes[..4], b"\x7fELF");
    Ok(())
}

#[test]
fn test_calls_may_target_later_functions() -> Result<(), NativeError> {
    // a() -> int { return b(7); }  b(x: int) -> int { return x; }
    let mut graph = Graph::new();
    let int = graph.primitives().int;
    let module = graph.add_module("main", "main.spng");
    let a = graph
        .declare_function(module, &Signature::new("a", vec![], int))
        .unwrap();
    let b = graph
        .declare_function(module, &Signature::new("b", vec![("x".into(), int)], int))
        .unwrap();

    let block = body(&graph, a);
    let mut builder = Builder::new(&mut graph, block).unwrap();
    let seven = builder.emit_int_constant(7, None);
    let result = builder.emit_call(b, &[seven], int).unwrap();
    builder.emit_return(result);
    builder.commit().unwrap();

    let block = body(&graph, b);
    let mut builder = Builder::new(&mut graph, block).unwrap();
    let x = builder.emit_get("x").unwrap();
    builder.emit_return(x);
    builder.commit().unwrap();

    let artifact = compile_modules(&graph, &[module])?;
    assert_eq!(
        artifact.functions,
        vec![entry("a", "main", true), entry("b", "main", true)]
    );
    Ok(())
}

#[test]
fn test_temporaries_are_not_visible_across_functions() {
    // f() -> int { return 1; }  g() -> int { return <f's temporary>; }
    let mut graph = Graph::new();
    let int = graph.primitives().int;
    let module = graph.add_module("main", "main.spng");
    let f = graph
        .declare_function(module, &Signature::new("f", vec![], int))
        .unwrap();
    let g = graph
        .declare_function(module, &Signature::new("g", vec![], int))
        .unwrap();

    let block = body(&graph, f);
    let mut builder = Builder::new(&mut graph, block).unwrap();
    let one = builder.emit_int_constant(1, None);
    builder.emit_return(one);
    builder.commit().unwrap();

    let block = body(&graph, g);
    let mut builder = Builder::new(&mut graph, block).unwrap();
    builder.emit_return(one);
    builder.commit().unwrap();

    let err = compile_modules(&graph, &[module]).unwrap_err();
    match &err {
        NativeError::UnboundValue { function, .. } => assert_eq!(function, "g"),
        other => panic!("expected UnboundValue, got {:?}", other),
    }
    assert!(err.is_internal());
}

#[test]
fn test_type_without_backend_representation() {
    let mut graph = Graph::new();
    let void = graph.primitives().void;
    let module = graph.add_module("main", "main.spng");
    let point = graph.add_type(module, "point").unwrap();
    graph
        .declare_func_decl(module, &Signature::new("draw", vec![("p".into(), point)], void))
        .unwrap();

    let err = compile_modules(&graph, &[module]).unwrap_err();
    assert!(matches!(err, NativeError::UnboundType { ref ty } if ty == "point"));
    assert!(err.is_internal());
}

#[test]
fn test_same_symbol_in_two_modules() {
    let mut graph = Graph::new();
    let void = graph.primitives().void;
    let first = graph.add_module("main", "main.spng");
    let second = graph.add_module("util", "util.spng");
    graph
        .declare_function(first, &Signature::new("helper", vec![], void))
        .unwrap();
    graph
        .declare_function(second, &Signature::new("helper", vec![], void))
        .unwrap();

    let err = compile_modules(&graph, &[first, second]).unwrap_err();
    match &err {
        NativeError::DuplicateSymbol { name, first, second } => {
            assert_eq!(name, "helper");
            assert_eq!(first, "main");
            assert_eq!(second, "util");
        }
        other => panic!("expected DuplicateSymbol, got {:?}", other),
    }
    assert!(!err.is_internal());
}

#[test]
fn test_void_function_without_return() -> Result<(), NativeError> {
    let mut graph = Graph::new();
    let void = graph.primitives().void;
    let module = graph.add_module("main", "main.spng");
    graph
        .declare_function(module, &Signature::new("nothing", vec![], void))
        .unwrap();

    let artifact = compile_modules(&graph, &[module])?;
    assert_eq!(artifact.defined().count(), 1);
    Ok(())
}

#[test]
fn test_write_object_file() -> Result<(), NativeError> {
    let (graph, modules) = hello_graph();
    let artifact = compile_modules(&graph, &modules)?;

    let dir = tempfile::tempdir()?;
    let path = dir.path().join("main.o");
    artifact.write_to(&path)?;
    assert_eq!(std::fs::read(&path)?, artifact.bytes);
    Ok(())
}
