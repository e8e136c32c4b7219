// Common helpers for lowering integration tests

#![allow(dead_code)]

use sprocket_ir::{Graph, NamespaceId};
use sprocket_lower::{Compilation, ForeignRegistry, Lowerer, LoweringError, MemoryLoader};
use sprocket_syntax::{Expr, FunctionDef, Ident, Import, Literal, LiteralKind, Param, Program, Span, Stmt, TopLevel, TypeExpr};

pub const MAIN: &str = "src/main.spng";

pub fn import(file: &str) -> TopLevel {
    TopLevel::Import(Import {
        file: file.to_string(),
        span: Span::default(),
    })
}

pub fn func(name: &str, params: &[(&str, &str)], ret: Option<&str>, body: Vec<Stmt>) -> TopLevel {
    TopLevel::Function(FunctionDef {
        name: Ident::new(name),
        params: params
            .iter()
            .map(|(name, ty)| Param {
                name: Ident::new(*name),
                ty: TypeExpr::Name(Ident::new(*ty)),
            })
            .collect(),
        ret: ret.map(|ty| TypeExpr::Name(Ident::new(ty))),
        body,
        span: Span::default(),
    })
}

pub fn literal(kind: LiteralKind, text: &str) -> Expr {
    Expr::Literal(Literal {
        kind,
        text: text.to_string(),
        span: Span::default(),
    })
}

/// `main() -> void { return test.test(); }` after `import "test.h";`
pub fn hello_program() -> Program {
    Program::new(vec![
        import("test.h"),
        func(
            "main",
            &[],
            None,
            vec![Stmt::Return(Expr::call(Expr::attr(Expr::var("test"), "test"), vec![]))],
        ),
    ])
}

pub fn lower_with(graph: &mut Graph, loader: &mut MemoryLoader, program: &Program) -> Result<Compilation, LoweringError> {
    Lowerer::new(graph, ForeignRegistry::builtin(), loader).lower_program(program, MAIN)
}

pub fn lower(graph: &mut Graph, program: &Program) -> Result<Compilation, LoweringError> {
    lower_with(graph, &mut MemoryLoader::new(), program)
}

/// Finds a namespace by name; panics if missing.
pub fn namespace_named(graph: &Graph, name: &str) -> NamespaceId {
    graph
        .namespaces()
        .find(|(_, namespace)| namespace.is_module() && namespace.name() == name)
        .map(|(id, _)| id)
        .unwrap_or_else(|| panic!("no module named `{}`", name))
}

/// The body block of function `name` in `module`.
pub fn body_of(graph: &Graph, module: NamespaceId, name: &str) -> NamespaceId {
    let func = graph.lookup(module, name).expect("function is declared");
    graph.func(func).and_then(|decl| decl.body).expect("function has a body")
}
