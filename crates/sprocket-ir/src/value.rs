use std::fmt;

use crate::ids::{NamespaceId, TypedUsageId, UsageId, ValueId};

/// The declaration kinds a namespace may accept or reject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// A signature without a body.
    FuncDecl,
    /// A signature with a body block.
    Function,
    Param,
    Temp,
}

impl fmt::Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeclKind::FuncDecl => write!(f, "function declaration"),
            DeclKind::Function => write!(f, "function definition"),
            DeclKind::Param => write!(f, "parameter"),
            DeclKind::Temp => write!(f, "temporary"),
        }
    }
}

/// Signature data of a function value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuncDecl {
    pub params: Vec<ValueId>,
    /// The return type, held as a typed usage.
    pub ret: TypedUsageId,
    /// Block holding the parameters. For definitions this is also the body.
    pub scope: NamespaceId,
    /// `Some` for definitions, `None` for bodiless declarations.
    pub body: Option<NamespaceId>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueKind {
    Func(FuncDecl),
    Param { index: usize },
    Temp,
}

/// A named declaration with exactly one static type.
///
/// Values compare by [`ValueId`], never structurally: two temporaries with the
/// same name and type are still distinct.
#[derive(Debug, Clone)]
pub struct Value {
    pub name: String,
    pub(crate) namespace: NamespaceId,
    pub(crate) ty: TypedUsageId,
    pub(crate) usages: Vec<UsageId>,
    pub kind: ValueKind,
}

impl Value {
    /// The namespace the value was declared in. Fixed at construction.
    pub fn namespace(&self) -> NamespaceId {
        self.namespace
    }

    /// The typed usage carrying this value's static type.
    pub fn type_usage(&self) -> TypedUsageId {
        self.ty
    }

    /// Every named usage of this value, in creation order.
    pub fn usages(&self) -> &[UsageId] {
        &self.usages
    }

    pub fn decl_kind(&self) -> DeclKind {
        match &self.kind {
            ValueKind::Func(FuncDecl { body: Some(_), .. }) => DeclKind::Function,
            ValueKind::Func(FuncDecl { body: None, .. }) => DeclKind::FuncDecl,
            ValueKind::Param { .. } => DeclKind::Param,
            ValueKind::Temp => DeclKind::Temp,
        }
    }

    pub fn as_func(&self) -> Option<&FuncDecl> {
        match &self.kind {
            ValueKind::Func(func) => Some(func),
            _ => None,
        }
    }
}

/// A reference to a value from inside some namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamedUsage {
    pub decl: ValueId,
    /// The namespace the reference appears in (the calling block for a call site).
    pub from: NamespaceId,
}
