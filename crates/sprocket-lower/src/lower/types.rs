use sprocket_ir::{Graph, TypeId};
use sprocket_syntax::TypeExpr;

use crate::error::{LoweringError, Result};

/// Resolves a type written in a parameter position.
///
/// `int` is the only type that exists for now.
pub fn resolve_type(graph: &Graph, ty: &TypeExpr) -> Result<TypeId> {
    match ty {
        TypeExpr::Name(ident) if ident.name == "int" => Ok(graph.primitives().int),
        TypeExpr::Name(ident) => Err(LoweringError::UnknownType {
            name: ident.name.clone(),
            span: ident.span.into(),
        }),
    }
}

/// Resolves a return type. An omitted return type and `void` mean void.
pub fn resolve_return_type(graph: &Graph, ty: Option<&TypeExpr>) -> Result<TypeId> {
    match ty {
        None => Ok(graph.primitives().void),
        Some(TypeExpr::Name(ident)) if ident.name == "void" => Ok(graph.primitives().void),
        Some(ty) => resolve_type(graph, ty),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprocket_syntax::Ident;

    #[test]
    fn test_only_int_resolves() {
        let graph = Graph::new();
        let int = TypeExpr::Name(Ident::new("int"));
        assert_eq!(resolve_type(&graph, &int).unwrap(), graph.primitives().int);

        let void = TypeExpr::Name(Ident::new("void"));
        assert!(matches!(
            resolve_type(&graph, &void),
            Err(LoweringError::UnknownType { .. })
        ));
        assert_eq!(resolve_return_type(&graph, Some(&void)).unwrap(), graph.primitives().void);
        assert_eq!(resolve_return_type(&graph, None).unwrap(), graph.primitives().void);

        let string = TypeExpr::Name(Ident::new("string"));
        match resolve_return_type(&graph, Some(&string)) {
            Err(LoweringError::UnknownType { name, .. }) => assert_eq!(name, "string"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }
}
