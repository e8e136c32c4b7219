use crate::ids::{NamespaceId, TypeId, TypedUsageId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A named type registered in its namespace's type table.
    Identified { name: String, namespace: NamespaceId },
    /// An anonymous function-signature type. Parameter and return types are
    /// held through typed usages of the constituent types.
    Function {
        params: Vec<TypedUsageId>,
        ret: TypedUsageId,
    },
}

#[derive(Debug, Clone)]
pub struct TypeDecl {
    pub kind: TypeKind,
    pub(crate) typed_usages: Vec<TypedUsageId>,
}

impl TypeDecl {
    pub(crate) fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            typed_usages: Vec::new(),
        }
    }

    /// Every typed usage of this type, in creation order.
    pub fn typed_usages(&self) -> &[TypedUsageId] {
        &self.typed_usages
    }

    pub fn is_function(&self) -> bool {
        matches!(self.kind, TypeKind::Function { .. })
    }
}

/// A reference to a type from a value, a function return, a signature type or
/// an instruction result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypedUsage {
    pub ty: TypeId,
}

/// The fixed set of primitive types every graph starts with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitives {
    pub int: TypeId,
    pub void: TypeId,
}
