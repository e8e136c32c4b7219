use std::fs;
use std::path::Path;

use cranelift_codegen::isa::OwnedTargetIsa;
use cranelift_codegen::settings::{self, Configurable};
use cranelift_frontend::FunctionBuilderContext;
use cranelift_module::{default_libcall_names, Linkage, Module};
use cranelift_object::{ObjectBuilder, ObjectModule};
use rustc_hash::FxHashMap;
use sprocket_ir::{Graph, NamespaceId};

use crate::scope::{BackendValue, ScopeStack};
use crate::translator::func::translate_function;
use crate::translator::types::translate_signature;
use crate::NativeError;

/// A function symbol of the emitted object file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionEntry {
    pub name: String,
    /// Name of the module that declared the function.
    pub module: String,
    /// `true` if the object contains the function's code, `false` for
    /// declarations resolved at link time (foreign functions).
    pub defined: bool,
}

/// A relocatable object file holding every compiled function.
#[derive(Debug, Clone)]
pub struct ObjectArtifact {
    /// Function symbols in declaration order.
    pub functions: Vec<FunctionEntry>,
    pub bytes: Vec<u8>,
}

impl ObjectArtifact {
    pub fn defined(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.iter().filter(|entry| entry.defined)
    }

    pub fn declared(&self) -> impl Iterator<Item = &FunctionEntry> {
        self.functions.iter().filter(|entry| !entry.defined)
    }

    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.iter().find(|entry| entry.name == name)
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), NativeError> {
        fs::write(path.as_ref(), &self.bytes)?;
        log::info!("wrote object file `{}`", path.as_ref().display());
        Ok(())
    }
}

/// Target ISA of the host with position-independent code.
fn host_isa() -> Result<OwnedTargetIsa, NativeError> {
    let mut flag_builder = settings::builder();
    flag_builder.enable("is_pic")?;
    #[cfg(debug_assertions)]
    flag_builder.set("enable_verifier", "true")?;
    flag_builder.set("opt_level", "none")?;
    let flags = settings::Flags::new(flag_builder);

    let isa_builder = cranelift_native::builder()
        .map_err(|e| NativeError::IsaSetupError(format!("Host target lookup failed: {}", e)))?;
    isa_builder
        .finish(flags)
        .map_err(|e| NativeError::IsaSetupError(format!("ISA construction failed: {}", e)))
}

/// Compiles `modules` of `graph` into one object file for the host.
///
/// Every function of every module is declared before any body is translated,
/// so calls may target functions defined later or in other modules. Functions
/// with a body are exported, bodiless ones are imported.
pub fn compile_modules(graph: &Graph, modules: &[NamespaceId]) -> Result<ObjectArtifact, NativeError> {
    let isa = host_isa()?;
    let builder = ObjectBuilder::new(isa, "sprocket", default_libcall_names())?;
    let mut object = ObjectModule::new(builder);
    let mut scopes = ScopeStack::with_primitives(graph.primitives());

    // --- Declare every function --- //
    let mut functions = Vec::new();
    let mut owners: FxHashMap<String, String> = FxHashMap::default();
    for module in modules {
        let namespace = graph.namespace(*module);
        for (name, value) in namespace.funcs() {
            if let Some(first) = owners.insert(name.to_string(), namespace.name().to_string()) {
                return Err(NativeError::DuplicateSymbol {
                    name: name.to_string(),
                    first,
                    second: namespace.name().to_string(),
                });
            }

            let defined = graph.func(value).is_some_and(|decl| decl.body.is_some());
            let linkage = if defined { Linkage::Export } else { Linkage::Import };
            let sig = translate_signature(graph, &scopes, &object, graph.value_type(value))?;
            let func_id = object.declare_function(name, linkage, &sig)?;
            scopes.bind_value(value, BackendValue::Function(func_id));
            log::trace!("declared `{}` ({:?})", name, linkage);

            functions.push(FunctionEntry {
                name: name.to_string(),
                module: namespace.name().to_string(),
                defined,
            });
        }
    }

    // --- Define every function with a body --- //
    let mut builder_ctx = FunctionBuilderContext::new();
    let mut ctx = object.make_context();
    for module in modules {
        log::debug!("compiling module `{}`", graph.namespace(*module).name());
        for (name, value) in graph.namespace(*module).funcs() {
            if graph.func(value).and_then(|decl| decl.body).is_none() {
                continue;
            }
            let func_id = match scopes.lookup_value(value) {
                Some(BackendValue::Function(id)) => id,
                _ => {
                    return Err(NativeError::UnboundValue {
                        value: name.to_string(),
                        function: name.to_string(),
                    })
                }
            };

            translate_function(graph, &mut object, &mut scopes, &mut ctx, &mut builder_ctx, value, func_id)?;
            object.define_function(func_id, &mut ctx)?;
            object.clear_context(&mut ctx);
        }
    }

    let product = object.finish();
    let bytes = product.emit().map_err(|e| NativeError::Emit(e.to_string()))?;
    log::debug!(
        "emitted object with {} function(s), {} bytes",
        functions.len(),
        bytes.len()
    );
    Ok(ObjectArtifact { functions, bytes })
}
