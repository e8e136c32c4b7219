//! Per-block instruction builder.
//!
//! A [`Builder`] owns a private pending list of instructions and temporaries.
//! They become visible in the graph only through [`Builder::commit`]. A builder
//! dropped without committing (for instance when an error is propagated with
//! `?` halfway through a function) rolls the graph back: the block keeps its
//! old body, and the temporaries and usage edges it created are removed.

use crate::error::GraphError;
use crate::graph::{Checkpoint, Graph};
use crate::ids::{NamespaceId, TypeId, ValueId};
use crate::instr::{Instruction, InstructionKind, Operand};

pub struct Builder<'g> {
    graph: &'g mut Graph,
    block: NamespaceId,
    instrs: Vec<Instruction>,
    temps: Vec<ValueId>,
    checkpoint: Checkpoint,
    committed: bool,
}

impl<'g> Builder<'g> {
    /// Binds a builder to `block`, which must be a block namespace.
    pub fn new(graph: &'g mut Graph, block: NamespaceId) -> Result<Self, GraphError> {
        graph.block_mut(block)?;
        let checkpoint = graph.checkpoint();
        Ok(Self {
            graph,
            block,
            instrs: Vec::new(),
            temps: Vec::new(),
            checkpoint,
            committed: false,
        })
    }

    pub fn graph(&self) -> &Graph {
        self.graph
    }

    pub fn block(&self) -> NamespaceId {
        self.block
    }

    /// Instructions emitted so far and not yet committed.
    pub fn pending(&self) -> &[Instruction] {
        &self.instrs
    }

    /// Allocates a fresh temporary of type `ty`. No instruction is emitted.
    pub fn next_temp(&mut self, ty: TypeId) -> ValueId {
        let temp = self.graph.new_temp(self.block, ty);
        self.temps.push(temp);
        temp
    }

    fn operand(&mut self, value: ValueId) -> Operand {
        let usage = self.graph.reference(value, self.block);
        Operand { value, usage }
    }

    fn push(&mut self, ty: TypeId, to: Option<ValueId>, kind: InstructionKind) {
        let ty = self.graph.type_usage(ty);
        self.instrs.push(Instruction {
            block: self.block,
            ty,
            to,
            kind,
        });
    }

    /// Emits a call of `func` and returns the temporary holding its result.
    ///
    /// `func` must have a function-signature type.
    pub fn emit_call(&mut self, func: ValueId, args: &[ValueId], result_ty: TypeId) -> Result<ValueId, GraphError> {
        let func_ty = self.graph.value_type(func);
        if !self.graph.is_function_type(func_ty) {
            return Err(GraphError::NotCallable {
                name: self.graph.value(func).name.clone(),
                ty: self.graph.type_name(func_ty),
            });
        }
        let to = self.next_temp(result_ty);
        let func = self.operand(func);
        let args = args.iter().map(|arg| self.operand(*arg)).collect();
        self.push(result_ty, Some(to), InstructionKind::Call { func, args });
        Ok(to)
    }

    /// Emits a return of `value`. No control-flow validation happens here.
    pub fn emit_return(&mut self, value: ValueId) {
        let ty = self.graph.value_type(value);
        let value = self.operand(value);
        self.push(ty, None, InstructionKind::Return { value });
    }

    /// Reads the block-local value called `name` into a fresh temporary.
    pub fn emit_get(&mut self, name: &str) -> Result<ValueId, GraphError> {
        let var = self.graph.lookup(self.block, name)?;
        let ty = self.graph.value_type(var);
        let to = self.next_temp(ty);
        let var = self.operand(var);
        self.push(
            ty,
            Some(to),
            InstructionKind::Get {
                name: name.to_string(),
                var,
            },
        );
        Ok(to)
    }

    /// Materializes an integer constant, into `to` if given.
    pub fn emit_int_constant(&mut self, value: i64, to: Option<ValueId>) -> ValueId {
        let int = self.graph.primitives().int;
        let to = to.unwrap_or_else(|| self.next_temp(int));
        self.push(int, Some(to), InstructionKind::IntConstant { value });
        to
    }

    /// Publishes the pending instructions as the block's body.
    pub fn commit(mut self) -> Result<(), GraphError> {
        log::trace!(
            "committing {} instructions to `{}`",
            self.instrs.len(),
            self.graph.namespace(self.block).name()
        );
        let instrs = std::mem::take(&mut self.instrs);
        self.graph.commit_block(self.block, instrs, &self.temps)?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Builder<'_> {
    fn drop(&mut self) {
        if !self.committed {
            log::trace!("discarding builder of `{}`", self.graph.namespace(self.block).name());
            self.graph.rollback(self.checkpoint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Signature;

    fn setup() -> (Graph, NamespaceId, ValueId) {
        let mut graph = Graph::new();
        let module = graph.add_module("main", "main.spng");
        let void = graph.primitives().void;
        let func = graph
            .declare_function(module, &Signature::new("main", vec![], void))
            .unwrap();
        (graph, module, func)
    }

    #[test]
    fn test_builder_requires_block() {
        let (mut graph, module, _) = setup();
        let err = Builder::new(&mut graph, module).err().expect("module is not a block");
        assert!(matches!(err, GraphError::NotABlock { .. }));
    }

    #[test]
    fn test_constant_then_return() {
        let (mut graph, _, func) = setup();
        let body = graph.func(func).unwrap().body.unwrap();

        let mut builder = Builder::new(&mut graph, body).unwrap();
        let temp = builder.emit_int_constant(42, None);
        builder.emit_return(temp);
        builder.commit().unwrap();

        let instrs = graph.body(body);
        assert_eq!(instrs.len(), 2);
        assert_eq!(instrs[0].kind, InstructionKind::IntConstant { value: 42 });
        assert_eq!(instrs[0].to, Some(temp));
        match &instrs[1].kind {
            InstructionKind::Return { value } => assert_eq!(value.value, temp),
            other => panic!("expected return, got {:?}", other),
        }
        assert_eq!(instrs[1].to, None);
        // Committed temporaries become block-local names.
        let name = graph.value(temp).name.clone();
        assert_eq!(graph.lookup(body, &name).unwrap(), temp);
    }

    #[test]
    fn test_dropped_builder_leaves_block_untouched() {
        let (mut graph, _, func) = setup();
        let body = graph.func(func).unwrap().body.unwrap();
        let int = graph.primitives().int;
        let int_usages = graph.type_decl(int).typed_usages().len();

        {
            let mut builder = Builder::new(&mut graph, body).unwrap();
            let one = builder.emit_int_constant(1, None);
            builder.emit_return(one);
            assert_eq!(builder.pending().len(), 2);
        }

        assert!(graph.body(body).is_empty());
        assert_eq!(graph.namespace(body).names().count(), 0);
        assert_eq!(graph.type_decl(int).typed_usages().len(), int_usages);
    }

    #[test]
    fn test_dropped_builder_removes_call_usages() {
        let (mut graph, module, main) = setup();
        let int = graph.primitives().int;
        let callee = graph
            .declare_function(module, &Signature::new("answer", vec![], int))
            .unwrap();
        let body = graph.func(main).unwrap().body.unwrap();

        {
            let mut builder = Builder::new(&mut graph, body).unwrap();
            builder.emit_call(callee, &[], int).unwrap();
            assert_eq!(builder.graph().value(callee).usages().len(), 1);
        }
        assert!(graph.value(callee).usages().is_empty());

        // Temp names are handed out again after a rollback.
        let mut builder = Builder::new(&mut graph, body).unwrap();
        let temp = builder.emit_call(callee, &[], int).unwrap();
        builder.commit().unwrap();
        let usages = graph.value(callee).usages();
        assert_eq!(usages.len(), 1);
        assert_eq!(graph.usage(usages[0]).from, body);
        assert_eq!(graph.value(temp).name, "0");
    }

    #[test]
    fn test_call_of_non_function_is_rejected() {
        let (mut graph, _, func) = setup();
        let body = graph.func(func).unwrap().body.unwrap();
        let int = graph.primitives().int;

        let mut builder = Builder::new(&mut graph, body).unwrap();
        let temp = builder.emit_int_constant(3, None);
        let err = builder.emit_call(temp, &[], int).unwrap_err();
        assert!(matches!(err, GraphError::NotCallable { .. }));
    }

    #[test]
    fn test_explicit_destination_temp() {
        let (mut graph, _, func) = setup();
        let body = graph.func(func).unwrap().body.unwrap();
        let int = graph.primitives().int;

        let mut builder = Builder::new(&mut graph, body).unwrap();
        let to = builder.next_temp(int);
        let got = builder.emit_int_constant(7, Some(to));
        assert_eq!(got, to);
        assert_eq!(builder.pending().len(), 1);
    }
}
