use cranelift_codegen::ir::{AbiParam, Signature};
use cranelift_module::Module;
use sprocket_ir::{Graph, TypeId};

use crate::scope::{BackendType, ScopeStack};
use crate::NativeError;

/// Looks up the backend representation of an IR type.
pub fn translate_type(graph: &Graph, scopes: &ScopeStack, ty: TypeId) -> Result<BackendType, NativeError> {
    scopes.lookup_type(ty).ok_or_else(|| NativeError::UnboundType {
        ty: graph.type_name(ty),
    })
}

/// Builds the Cranelift signature for a function-signature type.
pub fn translate_signature<M: Module>(
    graph: &Graph,
    scopes: &ScopeStack,
    module: &M,
    func_ty: TypeId,
) -> Result<Signature, NativeError> {
    let (params, ret) = graph
        .function_signature(func_ty)
        .ok_or_else(|| NativeError::UnboundType {
            ty: graph.type_name(func_ty),
        })?;

    let mut sig = module.make_signature();
    for param in params {
        match translate_type(graph, scopes, param)? {
            BackendType::Int(ty) => sig.params.push(AbiParam::new(ty)),
            // A void parameter has no representation.
            BackendType::Void => {
                return Err(NativeError::UnboundType {
                    ty: graph.type_name(func_ty),
                })
            }
        }
    }
    if let BackendType::Int(ty) = translate_type(graph, scopes, ret)? {
        sig.returns.push(AbiParam::new(ty));
    }
    Ok(sig)
}
