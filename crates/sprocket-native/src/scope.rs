//! Mapping of IR values and types onto backend entities.

use cranelift_codegen::ir::{types, Type, Value};
use cranelift_module::FuncId;
use rustc_hash::FxHashMap;
use sprocket_ir::{Primitives, TypeId, ValueId};

/// What an IR value stands for in the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendValue {
    /// A declared function.
    Function(FuncId),
    /// An SSA value inside the function being translated.
    Value(Value),
    /// The result of a call to a void function.
    Unit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    Int(Type),
    Void,
}

#[derive(Debug, Clone, Default)]
pub struct Scope {
    values: FxHashMap<ValueId, BackendValue>,
    types: FxHashMap<TypeId, BackendType>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && self.types.is_empty()
    }
}

/// Stack of scopes, innermost last. Lookups search from the innermost scope
/// outwards and the first match wins.
///
/// The root scope holds the primitive types and every declared function; each
/// function body gets its own scope on top, popped once the body is done, so
/// parameters and temporaries never leak between functions.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    scopes: Vec<Scope>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    /// A stack holding one empty root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new()],
        }
    }

    /// A stack whose root scope maps `int` to `i32` and `void` to no value.
    pub fn with_primitives(prims: Primitives) -> Self {
        let mut stack = Self::new();
        stack.bind_type(prims.int, BackendType::Int(types::I32));
        stack.bind_type(prims.void, BackendType::Void);
        stack
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope::new());
    }

    /// Pops the innermost scope. The root scope is never popped.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    fn innermost(&mut self) -> &mut Scope {
        let last = self.scopes.len() - 1;
        &mut self.scopes[last]
    }

    /// Binds `value` in the innermost scope.
    pub fn bind_value(&mut self, value: ValueId, backend: BackendValue) {
        self.innermost().values.insert(value, backend);
    }

    /// Binds `ty` in the innermost scope.
    pub fn bind_type(&mut self, ty: TypeId, backend: BackendType) {
        self.innermost().types.insert(ty, backend);
    }

    pub fn lookup_value(&self, value: ValueId) -> Option<BackendValue> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.values.get(&value).copied())
    }

    pub fn lookup_type(&self, ty: TypeId) -> Option<BackendType> {
        self.scopes.iter().rev().find_map(|scope| scope.types.get(&ty).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cranelift_codegen::entity::EntityRef;
    use sprocket_ir::Graph;

    #[test]
    fn test_primitives_live_in_root_scope() {
        let graph = Graph::new();
        let prims = graph.primitives();
        let mut stack = ScopeStack::with_primitives(prims);
        stack.push();
        assert_eq!(stack.lookup_type(prims.int), Some(BackendType::Int(types::I32)));
        assert_eq!(stack.lookup_type(prims.void), Some(BackendType::Void));
    }

    #[test]
    fn test_inner_binding_shadows_and_is_dropped_on_pop() {
        let mut graph = Graph::new();
        let module = graph.add_module("m", "m.spng");
        let int = graph.primitives().int;
        let f = graph
            .declare_function(module, &sprocket_ir::Signature::new("f", vec![("x".into(), int)], int))
            .unwrap();
        let x = graph.func(f).unwrap().params[0];

        let mut stack = ScopeStack::new();
        stack.bind_value(x, BackendValue::Function(FuncId::new(0)));
        stack.push();
        stack.bind_value(x, BackendValue::Unit);
        assert_eq!(stack.lookup_value(x), Some(BackendValue::Unit));

        let popped = stack.pop().expect("inner scope");
        assert!(!popped.is_empty());
        assert_eq!(stack.lookup_value(x), Some(BackendValue::Function(FuncId::new(0))));
    }

    #[test]
    fn test_root_scope_is_never_popped() {
        let mut stack = ScopeStack::new();
        assert!(stack.pop().is_none());
        assert_eq!(stack.depth(), 1);
    }
}
