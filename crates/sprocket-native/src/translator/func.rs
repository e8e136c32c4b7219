use cranelift_codegen::ir::{InstBuilder, UserFuncName, Value};
use cranelift_codegen::Context;
use cranelift_frontend::{FunctionBuilder, FunctionBuilderContext};
use cranelift_module::{FuncId, Module};
use sprocket_ir::{Graph, Instruction, InstructionKind, ValueId};

use crate::scope::{BackendType, BackendValue, ScopeStack};
use crate::translator::types::{translate_signature, translate_type};
use crate::NativeError;

/// Translates the body of the IR function `func` into `ctx.func`.
///
/// A fresh scope is pushed for the parameters and temporaries of the body
/// and popped again before returning.
pub fn translate_function<M: Module>(
    graph: &Graph,
    module: &mut M,
    scopes: &mut ScopeStack,
    ctx: &mut Context,
    builder_ctx: &mut FunctionBuilderContext,
    func: ValueId,
    func_id: FuncId,
) -> Result<(), NativeError> {
    let value = graph.value(func);
    let name = value.name.clone();
    let decl = value.as_func().ok_or_else(|| NativeError::InvalidOperand {
        value: name.clone(),
        expected: "a function",
        function: name.clone(),
    })?;
    let body = decl.body.ok_or_else(|| NativeError::MissingReturn { function: name.clone() })?;
    let ret = translate_type(graph, scopes, graph.typed_usage(decl.ret).ty)?;

    ctx.func.signature = translate_signature(graph, scopes, module, graph.value_type(func))?;
    ctx.func.name = UserFuncName::user(0, func_id.as_u32());

    let mut builder = FunctionBuilder::new(&mut ctx.func, builder_ctx);
    let entry = builder.create_block();
    builder.append_block_params_for_function_params(entry);
    builder.switch_to_block(entry);
    builder.seal_block(entry);

    scopes.push();
    let args = builder.block_params(entry).to_vec();
    for (param, arg) in decl.params.iter().zip(args) {
        scopes.bind_value(*param, BackendValue::Value(arg));
    }

    let mut translator = FunctionTranslator {
        graph,
        module,
        scopes,
        builder,
        function: &name,
    };
    let mut returned = false;
    for instr in graph.body(body) {
        if returned {
            return Err(NativeError::InstructionAfterReturn { function: name.clone() });
        }
        returned = translator.translate_instruction(instr)?;
    }
    if !returned {
        // Void functions may fall off the end of their body.
        match ret {
            BackendType::Void => {
                translator.builder.ins().return_(&[]);
            }
            BackendType::Int(_) => return Err(NativeError::MissingReturn { function: name.clone() }),
        }
    }

    translator.builder.finalize();
    scopes.pop();
    log::trace!("translated `{}`", name);
    Ok(())
}

struct FunctionTranslator<'a, 'f, M: Module> {
    graph: &'a Graph,
    module: &'a mut M,
    scopes: &'a mut ScopeStack,
    builder: FunctionBuilder<'f>,
    function: &'a str,
}

impl<M: Module> FunctionTranslator<'_, '_, M> {
    /// Translates one instruction. Returns whether it terminated the block.
    fn translate_instruction(&mut self, instr: &Instruction) -> Result<bool, NativeError> {
        match &instr.kind {
            InstructionKind::IntConstant { value } => {
                let ty = self.graph.typed_usage(instr.ty).ty;
                let cl_ty = match translate_type(self.graph, self.scopes, ty)? {
                    BackendType::Int(cl_ty) => cl_ty,
                    BackendType::Void => {
                        return Err(NativeError::UnboundType {
                            ty: self.graph.type_name(ty),
                        })
                    }
                };
                let constant = self.builder.ins().iconst(cl_ty, *value);
                self.bind_result(instr, BackendValue::Value(constant));
                Ok(false)
            }
            InstructionKind::Get { var, .. } => {
                let value = self.lookup(var.value)?;
                self.bind_result(instr, value);
                Ok(false)
            }
            InstructionKind::Call { func, args } => {
                let callee = match self.lookup(func.value)? {
                    BackendValue::Function(id) => id,
                    _ => return Err(self.invalid_operand(func.value, "a call target")),
                };
                let args = args
                    .iter()
                    .map(|arg| self.operand(arg.value))
                    .collect::<Result<Vec<_>, _>>()?;
                let callee = self.module.declare_func_in_func(callee, self.builder.func);
                let call = self.builder.ins().call(callee, &args);
                let result = match self.builder.inst_results(call).first() {
                    Some(value) => BackendValue::Value(*value),
                    None => BackendValue::Unit,
                };
                self.bind_result(instr, result);
                Ok(false)
            }
            InstructionKind::Return { value } => {
                match self.lookup(value.value)? {
                    BackendValue::Value(value) => self.builder.ins().return_(&[value]),
                    BackendValue::Unit => self.builder.ins().return_(&[]),
                    BackendValue::Function(_) => return Err(self.invalid_operand(value.value, "a return value")),
                };
                Ok(true)
            }
        }
    }

    fn lookup(&self, value: ValueId) -> Result<BackendValue, NativeError> {
        self.scopes
            .lookup_value(value)
            .ok_or_else(|| NativeError::UnboundValue {
                value: self.graph.value(value).name.clone(),
                function: self.function.to_string(),
            })
    }

    /// A value usable as a call argument.
    fn operand(&self, value: ValueId) -> Result<Value, NativeError> {
        match self.lookup(value)? {
            BackendValue::Value(cl_value) => Ok(cl_value),
            _ => Err(self.invalid_operand(value, "a call argument")),
        }
    }

    /// Binds an instruction's result in the innermost scope, which is local
    /// to the function being translated.
    fn bind_result(&mut self, instr: &Instruction, value: BackendValue) {
        if let Some(to) = instr.to {
            self.scopes.bind_value(to, value);
        }
    }

    fn invalid_operand(&self, value: ValueId, expected: &'static str) -> NativeError {
        NativeError::InvalidOperand {
            value: self.graph.value(value).name.clone(),
            expected,
            function: self.function.to_string(),
        }
    }
}
