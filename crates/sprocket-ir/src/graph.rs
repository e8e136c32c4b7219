//! The per-compilation symbol graph.
//!
//! Declarations and usages live in flat arenas addressed by stable indices. A
//! value holds the list of its usage indices and every usage holds the index of
//! its value, so the bidirectional edges never need shared ownership. Nothing is
//! ever removed: the graph only grows until the compilation ends.

use std::path::PathBuf;

use indexmap::IndexMap;

use crate::error::GraphError;
use crate::ids::{NamespaceId, TypeId, TypedUsageId, UsageId, ValueId};
use crate::instr::Instruction;
use crate::namespace::{Block, ForeignModule, Module, ModuleTables, Namespace};
use crate::types::{Primitives, TypeDecl, TypeKind, TypedUsage};
use crate::value::{DeclKind, FuncDecl, NamedUsage, Value, ValueKind};

/// Name and types of a function about to be declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub name: String,
    pub params: Vec<(String, TypeId)>,
    pub ret: TypeId,
}

impl Signature {
    pub fn new(name: impl Into<String>, params: Vec<(String, TypeId)>, ret: TypeId) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Graph {
    namespaces: Vec<Namespace>,
    values: Vec<Value>,
    types: Vec<TypeDecl>,
    usages: Vec<NamedUsage>,
    typed_usages: Vec<TypedUsage>,
    core: NamespaceId,
    primitives: Primitives,
    /// Source of synthetic temporary names, unique within this compilation.
    next_temp: u32,
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

/// Arena sizes at one point in time, see [`Graph::rollback`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct Checkpoint {
    values: usize,
    usages: usize,
    typed_usages: usize,
    next_temp: u32,
}

impl Graph {
    /// Creates a graph holding only the `core` module with the primitive types.
    pub fn new() -> Self {
        let mut graph = Graph {
            namespaces: Vec::new(),
            values: Vec::new(),
            types: Vec::new(),
            usages: Vec::new(),
            typed_usages: Vec::new(),
            core: NamespaceId::new(0),
            primitives: Primitives {
                int: TypeId::new(0),
                void: TypeId::new(1),
            },
            next_temp: 0,
        };
        let core = graph.add_module("core", PathBuf::new());
        graph.core = core;
        let int = graph.new_identified_type(core, "int");
        let void = graph.new_identified_type(core, "void");
        graph.primitives = Primitives { int, void };
        graph
    }

    pub fn primitives(&self) -> Primitives {
        self.primitives
    }

    /// The module owning the primitive types.
    pub fn core_module(&self) -> NamespaceId {
        self.core
    }

    // --- Namespaces ---

    pub fn add_module(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> NamespaceId {
        self.push_namespace(Namespace::Module(Module {
            name: name.into(),
            path: path.into(),
            tables: ModuleTables::default(),
        }))
    }

    pub fn add_foreign_module(
        &mut self,
        name: impl Into<String>,
        header: impl Into<PathBuf>,
        source: impl Into<PathBuf>,
    ) -> NamespaceId {
        self.push_namespace(Namespace::ForeignModule(ForeignModule {
            name: name.into(),
            header: header.into(),
            source: source.into(),
            tables: ModuleTables::default(),
        }))
    }

    pub fn add_block(&mut self, label: impl Into<String>, parent: Option<NamespaceId>) -> NamespaceId {
        self.push_namespace(Namespace::Block(Block {
            label: label.into(),
            parent,
            names: IndexMap::new(),
            body: Vec::new(),
        }))
    }

    fn push_namespace(&mut self, namespace: Namespace) -> NamespaceId {
        let id = NamespaceId::new(self.namespaces.len());
        self.namespaces.push(namespace);
        id
    }

    pub fn namespace(&self, id: NamespaceId) -> &Namespace {
        &self.namespaces[id.index()]
    }

    /// Every namespace in creation order.
    pub fn namespaces(&self) -> impl Iterator<Item = (NamespaceId, &Namespace)> + '_ {
        self.namespaces
            .iter()
            .enumerate()
            .map(|(index, namespace)| (NamespaceId::new(index), namespace))
    }

    /// Modules and foreign modules (not blocks), including `core`.
    pub fn modules(&self) -> impl Iterator<Item = NamespaceId> + '_ {
        self.namespaces()
            .filter(|(_, namespace)| namespace.is_module())
            .map(|(id, _)| id)
    }

    /// The committed instructions of a block.
    pub fn body(&self, block: NamespaceId) -> &[Instruction] {
        self.namespace(block).body()
    }

    // --- Arena access ---

    pub fn value(&self, id: ValueId) -> &Value {
        &self.values[id.index()]
    }

    pub fn type_decl(&self, id: TypeId) -> &TypeDecl {
        &self.types[id.index()]
    }

    pub fn usage(&self, id: UsageId) -> &NamedUsage {
        &self.usages[id.index()]
    }

    pub fn typed_usage(&self, id: TypedUsageId) -> &TypedUsage {
        &self.typed_usages[id.index()]
    }

    /// The static type of a value.
    pub fn value_type(&self, id: ValueId) -> TypeId {
        self.typed_usage(self.value(id).ty).ty
    }

    pub fn func(&self, id: ValueId) -> Option<&FuncDecl> {
        self.value(id).as_func()
    }

    pub fn func_return_type(&self, id: ValueId) -> Option<TypeId> {
        self.func(id).map(|func| self.typed_usage(func.ret).ty)
    }

    // --- Usage edges ---

    /// Records a reference to `value` made from inside `from`.
    ///
    /// Never fails: the usage is appended to the value's usage list before the
    /// id is handed out.
    pub fn reference(&mut self, value: ValueId, from: NamespaceId) -> UsageId {
        let id = UsageId::new(self.usages.len());
        self.usages.push(NamedUsage { decl: value, from });
        self.values[value.index()].usages.push(id);
        id
    }

    /// Records a reference to the type `ty`, appending it to the type's usages.
    pub fn type_usage(&mut self, ty: TypeId) -> TypedUsageId {
        let id = TypedUsageId::new(self.typed_usages.len());
        self.typed_usages.push(TypedUsage { ty });
        self.types[ty.index()].typed_usages.push(id);
        id
    }

    // --- Types ---

    /// Registers a named type in a module's type table.
    pub fn add_type(&mut self, namespace: NamespaceId, name: &str) -> Result<TypeId, GraphError> {
        let ns = self.namespace(namespace);
        if !ns.is_module() {
            return Err(GraphError::TypeKindMismatch {
                name: name.to_string(),
                namespace: ns.name().to_string(),
                namespace_kind: ns.kind(),
            });
        }
        if ns.get_type(name).is_some() {
            return Err(GraphError::DuplicateType {
                name: name.to_string(),
                namespace: ns.name().to_string(),
            });
        }
        Ok(self.new_identified_type(namespace, name))
    }

    fn new_identified_type(&mut self, namespace: NamespaceId, name: &str) -> TypeId {
        let id = TypeId::new(self.types.len());
        self.types.push(TypeDecl::new(TypeKind::Identified {
            name: name.to_string(),
            namespace,
        }));
        self.namespaces[namespace.index()].insert_type(name.to_string(), id);
        id
    }

    /// Builds an anonymous function-signature type.
    pub fn function_type(&mut self, params: &[TypeId], ret: TypeId) -> TypeId {
        let ret = self.type_usage(ret);
        let params = params.iter().map(|param| self.type_usage(*param)).collect();
        let id = TypeId::new(self.types.len());
        self.types.push(TypeDecl::new(TypeKind::Function { params, ret }));
        id
    }

    pub fn is_function_type(&self, ty: TypeId) -> bool {
        self.type_decl(ty).is_function()
    }

    /// Parameter and return types of a function-signature type.
    pub fn function_signature(&self, ty: TypeId) -> Option<(Vec<TypeId>, TypeId)> {
        match &self.type_decl(ty).kind {
            TypeKind::Function { params, ret } => Some((
                params.iter().map(|usage| self.typed_usage(*usage).ty).collect(),
                self.typed_usage(*ret).ty,
            )),
            TypeKind::Identified { .. } => None,
        }
    }

    /// Human readable rendering of a type, for diagnostics.
    pub fn type_name(&self, ty: TypeId) -> String {
        match &self.type_decl(ty).kind {
            TypeKind::Identified { name, .. } => name.clone(),
            TypeKind::Function { params, ret } => {
                let params: Vec<String> = params
                    .iter()
                    .map(|usage| self.type_name(self.typed_usage(*usage).ty))
                    .collect();
                format!("({}) -> {}", params.join(", "), self.type_name(self.typed_usage(*ret).ty))
            }
        }
    }

    pub fn lookup_type(&self, namespace: NamespaceId, name: &str) -> Result<TypeId, GraphError> {
        let ns = self.namespace(namespace);
        ns.get_type(name).ok_or_else(|| GraphError::TypeNotFound {
            name: name.to_string(),
            namespace: ns.name().to_string(),
        })
    }

    // --- Declarations ---

    /// Looks `name` up in exactly this namespace. Parents are not searched.
    pub fn lookup(&self, namespace: NamespaceId, name: &str) -> Result<ValueId, GraphError> {
        let ns = self.namespace(namespace);
        ns.get_decl(name).ok_or_else(|| GraphError::NameNotFound {
            name: name.to_string(),
            namespace: ns.name().to_string(),
        })
    }

    /// Checks that `namespace` accepts a declaration; nothing is mutated.
    fn check_declare(&self, namespace: NamespaceId, name: &str, kind: DeclKind) -> Result<(), GraphError> {
        let ns = self.namespace(namespace);
        if !ns.accepts(kind) {
            return Err(GraphError::KindMismatch {
                name: name.to_string(),
                kind,
                namespace: ns.name().to_string(),
                namespace_kind: ns.kind(),
            });
        }
        if ns.get_decl(name).is_some() {
            return Err(GraphError::DuplicateName {
                name: name.to_string(),
                namespace: ns.name().to_string(),
            });
        }
        Ok(())
    }

    /// Declares a function with an (initially empty) body block.
    pub fn declare_function(&mut self, namespace: NamespaceId, sig: &Signature) -> Result<ValueId, GraphError> {
        self.declare_func(namespace, sig, true)
    }

    /// Declares a bodiless function, the only kind foreign modules accept.
    pub fn declare_func_decl(&mut self, namespace: NamespaceId, sig: &Signature) -> Result<ValueId, GraphError> {
        self.declare_func(namespace, sig, false)
    }

    fn declare_func(&mut self, namespace: NamespaceId, sig: &Signature, with_body: bool) -> Result<ValueId, GraphError> {
        let kind = if with_body { DeclKind::Function } else { DeclKind::FuncDecl };
        self.check_declare(namespace, &sig.name, kind)?;
        for (index, (name, _)) in sig.params.iter().enumerate() {
            if sig.params[..index].iter().any(|(other, _)| other == name) {
                return Err(GraphError::DuplicateName {
                    name: name.clone(),
                    namespace: sig.name.clone(),
                });
            }
        }

        let scope = self.add_block(sig.name.clone(), Some(namespace));
        let params = sig
            .params
            .iter()
            .enumerate()
            .map(|(index, (name, ty))| self.push_value(scope, name, *ty, ValueKind::Param { index }))
            .collect::<Vec<_>>();
        let param_types: Vec<TypeId> = sig.params.iter().map(|(_, ty)| *ty).collect();
        let func_ty = self.function_type(&param_types, sig.ret);
        let ret = self.type_usage(sig.ret);

        let func = self.push_value(
            namespace,
            &sig.name,
            func_ty,
            ValueKind::Func(FuncDecl {
                params,
                ret,
                scope,
                body: with_body.then_some(scope),
            }),
        );
        log::trace!(
            "declared {} `{}` in `{}`",
            kind,
            sig.name,
            self.namespace(namespace).name()
        );
        Ok(func)
    }

    /// Declares a parameter directly in a block.
    pub fn declare_param(
        &mut self,
        block: NamespaceId,
        name: &str,
        ty: TypeId,
        index: usize,
    ) -> Result<ValueId, GraphError> {
        self.check_declare(block, name, DeclKind::Param)?;
        Ok(self.push_value(block, name, ty, ValueKind::Param { index }))
    }

    /// Creates a value and registers it in its namespace.
    fn push_value(&mut self, namespace: NamespaceId, name: &str, ty: TypeId, kind: ValueKind) -> ValueId {
        let value = self.new_value(namespace, name.to_string(), ty, kind);
        self.namespaces[namespace.index()].insert_decl(name.to_string(), value);
        value
    }

    fn new_value(&mut self, namespace: NamespaceId, name: String, ty: TypeId, kind: ValueKind) -> ValueId {
        let ty = self.type_usage(ty);
        let id = ValueId::new(self.values.len());
        self.values.push(Value {
            name,
            namespace,
            ty,
            usages: Vec::new(),
            kind,
        });
        id
    }

    // --- Builder support ---

    /// Allocates a temporary owned by `block` without registering its name.
    pub(crate) fn new_temp(&mut self, block: NamespaceId, ty: TypeId) -> ValueId {
        let name = self.next_temp.to_string();
        self.next_temp += 1;
        self.new_value(block, name, ty, ValueKind::Temp)
    }

    pub(crate) fn block_mut(&mut self, block: NamespaceId) -> Result<&mut Block, GraphError> {
        match &mut self.namespaces[block.index()] {
            Namespace::Block(b) => Ok(b),
            other => Err(GraphError::NotABlock {
                namespace: other.name().to_string(),
                namespace_kind: other.kind(),
            }),
        }
    }

    /// Replaces a block's instructions and publishes its temporaries.
    pub(crate) fn commit_block(
        &mut self,
        block: NamespaceId,
        body: Vec<Instruction>,
        temps: &[ValueId],
    ) -> Result<(), GraphError> {
        let names: Vec<(String, ValueId)> = temps
            .iter()
            .map(|temp| (self.value(*temp).name.clone(), *temp))
            .collect();
        let b = self.block_mut(block)?;
        b.body = body;
        b.names.extend(names);
        Ok(())
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            values: self.values.len(),
            usages: self.usages.len(),
            typed_usages: self.typed_usages.len(),
            next_temp: self.next_temp,
        }
    }

    /// Undoes every value, usage and typed usage created since `checkpoint`,
    /// including their entries in older usage lists.
    pub(crate) fn rollback(&mut self, checkpoint: Checkpoint) {
        for usage in self.usages.drain(checkpoint.usages..) {
            if let Some(value) = self.values.get_mut(usage.decl.index()) {
                value.usages.retain(|id| id.index() < checkpoint.usages);
            }
        }
        for usage in self.typed_usages.drain(checkpoint.typed_usages..) {
            self.types[usage.ty.index()]
                .typed_usages
                .retain(|id| id.index() < checkpoint.typed_usages);
        }
        self.values.truncate(checkpoint.values);
        self.next_temp = checkpoint.next_temp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph_has_primitives_in_core() {
        let graph = Graph::new();
        let core = graph.core_module();
        let prims = graph.primitives();
        assert_eq!(graph.lookup_type(core, "int").unwrap(), prims.int);
        assert_eq!(graph.lookup_type(core, "void").unwrap(), prims.void);
        assert_eq!(graph.type_name(prims.int), "int");
        assert_eq!(graph.modules().collect::<Vec<_>>(), vec![core]);
    }

    #[test]
    fn test_function_type_records_constituent_usages() {
        let mut graph = Graph::new();
        let prims = graph.primitives();
        let before = graph.type_decl(prims.int).typed_usages().len();

        let fn_ty = graph.function_type(&[prims.int, prims.int], prims.void);

        assert_eq!(graph.type_decl(prims.int).typed_usages().len(), before + 2);
        assert_eq!(graph.type_name(fn_ty), "(int, int) -> void");
        assert_eq!(
            graph.function_signature(fn_ty),
            Some((vec![prims.int, prims.int], prims.void))
        );
        assert!(graph.function_signature(prims.int).is_none());
    }

    #[test]
    fn test_commit_to_non_block_is_an_error() {
        let mut graph = Graph::new();
        let module = graph.add_module("main", "main.spng");
        let err = graph.commit_block(module, Vec::new(), &[]).unwrap_err();
        assert!(matches!(err, GraphError::NotABlock { .. }));
    }

    #[test]
    fn test_temps_get_unique_names() {
        let mut graph = Graph::new();
        let block = graph.add_block("f", None);
        let int = graph.primitives().int;
        let a = graph.new_temp(block, int);
        let b = graph.new_temp(block, int);
        assert_ne!(a, b);
        assert_ne!(graph.value(a).name, graph.value(b).name);
    }

    #[test]
    fn test_duplicate_type_rejected() {
        let mut graph = Graph::new();
        let module = graph.add_module("m", "m.spng");
        graph.add_type(module, "point").unwrap();
        let err = graph.add_type(module, "point").unwrap_err();
        assert!(matches!(err, GraphError::DuplicateType { .. }));
    }
}
