use cranelift_codegen::settings::SetError;
use thiserror::Error;

/// Errors that can occur during native code generation.
#[derive(Error, Debug)]
pub enum NativeError {
    #[error("Failed during Cranelift code generation: {0}")]
    CraneliftGen(#[from] cranelift_codegen::CodegenError),

    #[error("Failed during module processing: {0}")]
    CraneliftModule(#[from] cranelift_module::ModuleError),

    #[error("Failed to configure Cranelift settings: {0}")]
    SettingsError(#[from] SetError),

    #[error("ISA setup failed: {0}")]
    IsaSetupError(String),

    #[error("Failed to emit object file: {0}")]
    Emit(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Two modules export a function under the same symbol name.
    #[error("Symbol `{name}` is defined by both `{first}` and `{second}`")]
    DuplicateSymbol { name: String, first: String, second: String },

    /// A value used by an instruction was never bound in any active scope.
    #[error("Value `{value}` used in `{function}` is not bound in any active scope")]
    UnboundValue { value: String, function: String },

    /// An IR type without a backend representation.
    #[error("Type `{ty}` has no backend representation")]
    UnboundType { ty: String },

    /// A value bound to something an instruction cannot take as operand,
    /// such as a function used as a call argument.
    #[error("Value `{value}` cannot be used as {expected} in `{function}`")]
    InvalidOperand {
        value: String,
        expected: &'static str,
        function: String,
    },

    #[error("Function `{function}` has instructions after its return")]
    InstructionAfterReturn { function: String },

    #[error("Function `{function}` does not end with a return")]
    MissingReturn { function: String },
}

impl NativeError {
    /// Whether the error reveals an inconsistency in the IR handed to the
    /// backend rather than a problem with the program or the host.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            NativeError::UnboundValue { .. }
                | NativeError::UnboundType { .. }
                | NativeError::InvalidOperand { .. }
                | NativeError::InstructionAfterReturn { .. }
                | NativeError::MissingReturn { .. }
        )
    }
}
