use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("Malformed syntax tree: {0}")]
    #[diagnostic(
        code(sprocket_syntax::malformed_tree),
        help("The syntax tree must be the JSON output of the Sprocket parser")
    )]
    MalformedTree(#[from] serde_json::Error),
}
