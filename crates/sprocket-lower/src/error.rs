use std::path::PathBuf;

use miette::{Diagnostic, SourceSpan};
use sprocket_ir::GraphError;
use thiserror::Error;

use crate::loader::LoadError;

/// Errors raised while lowering syntax trees into the symbol graph.
///
/// Every error is fatal: the lowering pass never recovers and never leaves a
/// partially populated function body behind.
#[derive(Debug, Error, Diagnostic)]
pub enum LoweringError {
    /// The import names a file kind that cannot be compiled or linked.
    #[error("Unsupported import: `{file}`")]
    #[diagnostic(
        code(sprocket_lower::unsupported_import),
        help("Only `.spng` units and `.h` headers of known foreign modules can be imported")
    )]
    UnsupportedImport {
        file: String,
        #[label("imported here")]
        span: SourceSpan,
    },

    #[error("No foreign module is registered for header `{header}`")]
    #[diagnostic(
        code(sprocket_lower::unknown_foreign_module),
        help("Declare it in the `[[foreign]]` section of sprocket.toml")
    )]
    UnknownForeignModule {
        header: String,
        #[label("imported here")]
        span: SourceSpan,
    },

    /// Two imports of a unit would bind different namespaces to one alias.
    #[error("Import alias `{alias}` is already bound in this unit")]
    #[diagnostic(code(sprocket_lower::duplicate_alias))]
    DuplicateAlias {
        alias: String,
        #[label("second import here")]
        span: SourceSpan,
    },

    #[error("Import cycle: {}", .cycle.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(" -> "))]
    #[diagnostic(code(sprocket_lower::import_cycle))]
    ImportCycle {
        cycle: Vec<PathBuf>,
        #[label("imported here")]
        span: SourceSpan,
    },

    #[error("Failed to load `{}`", .path.display())]
    #[diagnostic(code(sprocket_lower::load_failed))]
    Load {
        path: PathBuf,
        #[source]
        source: LoadError,
        #[label("imported here")]
        span: SourceSpan,
    },

    #[error("Unknown type `{name}`")]
    #[diagnostic(code(sprocket_lower::unknown_type), help("The only type available is `int`"))]
    UnknownType {
        name: String,
        #[label("not a known type")]
        span: SourceSpan,
    },

    #[error("Name not found: could not find `{name}` in `{scope}`")]
    #[diagnostic(code(sprocket_lower::name_not_found))]
    NameNotFound {
        name: String,
        scope: String,
        #[label("referenced here")]
        span: SourceSpan,
    },

    #[error("`{name}` has type `{ty}` and cannot be called")]
    #[diagnostic(code(sprocket_lower::not_callable))]
    NotCallable {
        name: String,
        ty: String,
        #[label("called here")]
        span: SourceSpan,
    },

    #[error("`{name}` is not a module")]
    #[diagnostic(code(sprocket_lower::not_a_module))]
    NotAModule {
        name: String,
        #[label("attribute accessed here")]
        span: SourceSpan,
    },

    /// A module alias used where a value is required.
    #[error("Expected a value, found module `{name}`")]
    #[diagnostic(code(sprocket_lower::expected_value))]
    ExpectedValue {
        name: String,
        #[label("modules can only be used with `.`")]
        span: SourceSpan,
    },

    #[error("Unsupported literal `{text}`")]
    #[diagnostic(code(sprocket_lower::unsupported_literal), help("Only integer literals are supported"))]
    UnsupportedLiteral {
        text: String,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("Integer literal `{text}` does not fit in 32 bits")]
    #[diagnostic(code(sprocket_lower::int_literal_out_of_range))]
    IntLiteralOutOfRange {
        text: String,
        #[label("out of range")]
        span: SourceSpan,
    },

    #[error("Type mismatch: expected `{expected}`, found `{found}`")]
    #[diagnostic(code(sprocket_lower::type_mismatch))]
    TypeMismatch {
        expected: String,
        found: String,
        #[label("this expression has type `{found}`")]
        span: SourceSpan,
    },

    #[error("`{name}` takes {expected} argument(s) but {found} were supplied")]
    #[diagnostic(code(sprocket_lower::argument_count))]
    ArgumentCount {
        name: String,
        expected: usize,
        found: usize,
        #[label("in this call")]
        span: SourceSpan,
    },

    #[error("Function `{name}` must end with a `return` of type `{ret}`")]
    #[diagnostic(code(sprocket_lower::missing_return))]
    MissingReturn {
        name: String,
        ret: String,
        #[label("function defined here")]
        span: SourceSpan,
    },

    #[error("Unreachable statement after `return`")]
    #[diagnostic(code(sprocket_lower::unreachable_statement))]
    UnreachableStatement {
        #[label("never executed")]
        span: SourceSpan,
    },

    /// A structural graph error, e.g. a duplicate function name.
    #[error("{source}")]
    #[diagnostic(code(sprocket_lower::graph))]
    Graph {
        #[source]
        source: GraphError,
        #[label("while lowering this")]
        span: SourceSpan,
    },
}

pub type Result<T, E = LoweringError> = std::result::Result<T, E>;

/// Attaches the span of the node being lowered to a graph error.
pub(crate) trait GraphResultExt<T> {
    fn at(self, span: impl Into<SourceSpan>) -> Result<T>;
}

impl<T> GraphResultExt<T> for std::result::Result<T, GraphError> {
    fn at(self, span: impl Into<SourceSpan>) -> Result<T> {
        self.map_err(|source| LoweringError::Graph {
            source,
            span: span.into(),
        })
    }
}
