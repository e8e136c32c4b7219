use miette::Diagnostic;
use thiserror::Error;

use crate::namespace::NamespaceKind;
use crate::value::DeclKind;

/// Structural errors raised by the symbol graph.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The namespace variant does not accept this kind of declaration,
    /// e.g. a function body inside a foreign module.
    #[error("Cannot add {kind} `{name}` to {namespace_kind} `{namespace}`")]
    #[diagnostic(code(sprocket_ir::kind_mismatch))]
    KindMismatch {
        name: String,
        kind: DeclKind,
        namespace: String,
        namespace_kind: NamespaceKind,
    },

    #[error("Cannot define type `{name}` in {namespace_kind} `{namespace}`")]
    #[diagnostic(code(sprocket_ir::type_kind_mismatch))]
    TypeKindMismatch {
        name: String,
        namespace: String,
        namespace_kind: NamespaceKind,
    },

    #[error("`{name}` is already declared in `{namespace}`")]
    #[diagnostic(code(sprocket_ir::duplicate_name))]
    DuplicateName { name: String, namespace: String },

    #[error("Type `{name}` is already declared in `{namespace}`")]
    #[diagnostic(code(sprocket_ir::duplicate_type))]
    DuplicateType { name: String, namespace: String },

    #[error("`{name}` is not declared in `{namespace}`")]
    #[diagnostic(code(sprocket_ir::name_not_found))]
    NameNotFound { name: String, namespace: String },

    #[error("Type `{name}` is not declared in `{namespace}`")]
    #[diagnostic(code(sprocket_ir::type_not_found))]
    TypeNotFound { name: String, namespace: String },

    /// A call target whose static type is not a function signature.
    #[error("`{name}` has type `{ty}` and cannot be called")]
    #[diagnostic(code(sprocket_ir::not_callable))]
    NotCallable { name: String, ty: String },

    #[error("`{namespace}` is a {namespace_kind}, not a block")]
    #[diagnostic(code(sprocket_ir::not_a_block))]
    NotABlock {
        namespace: String,
        namespace_kind: NamespaceKind,
    },
}
