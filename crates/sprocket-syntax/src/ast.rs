use miette::SourceSpan;
use serde::{Deserialize, Serialize};

use crate::error::SyntaxError;

/// Byte range of a node in its source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl From<Span> for SourceSpan {
    fn from(span: Span) -> Self {
        SourceSpan::from((span.start, span.end.saturating_sub(span.start)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    pub name: String,
    #[serde(default)]
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            span: Span::default(),
        }
    }
}

/// A whole compilation unit as produced by the parser.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Program {
    pub top_levels: Vec<TopLevel>,
}

impl Program {
    pub fn new(top_levels: Vec<TopLevel>) -> Self {
        Self { top_levels }
    }

    /// Deserializes a tree written by the parser.
    pub fn from_json(text: &str) -> Result<Self, SyntaxError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, SyntaxError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.top_levels.iter().filter_map(|top_level| match top_level {
            TopLevel::Function(function) => Some(function),
            TopLevel::Import(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TopLevel {
    Import(Import),
    Function(FunctionDef),
}

/// `import "file";`
///
/// The file is either another Sprocket unit (`.spng`) or a C header (`.h`)
/// that selects one of the known foreign modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Import {
    pub file: String,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionDef {
    pub name: Ident,
    #[serde(default)]
    pub params: Vec<Param>,
    /// `None` when the source omits the return type, which means `void`.
    #[serde(default)]
    pub ret: Option<TypeExpr>,
    #[serde(default)]
    pub body: Vec<Stmt>,
    #[serde(default)]
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TypeExpr {
    Name(Ident),
}

impl TypeExpr {
    pub fn span(&self) -> Span {
        match self {
            TypeExpr::Name(ident) => ident.span,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Stmt {
    Expr(Expr),
    Return(Expr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    Call {
        callee: Box<Expr>,
        #[serde(default)]
        args: Vec<Expr>,
        #[serde(default)]
        span: Span,
    },
    GetVar(Ident),
    GetAttr {
        object: Box<Expr>,
        attr: Ident,
        #[serde(default)]
        span: Span,
    },
    Literal(Literal),
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Call { span, .. } | Expr::GetAttr { span, .. } => *span,
            Expr::GetVar(ident) => ident.span,
            Expr::Literal(literal) => literal.span,
        }
    }

    pub fn var(name: impl Into<String>) -> Self {
        Expr::GetVar(Ident::new(name))
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
            span: Span::default(),
        }
    }

    pub fn attr(object: Expr, attr: impl Into<String>) -> Self {
        Expr::GetAttr {
            object: Box::new(object),
            attr: Ident::new(attr),
            span: Span::default(),
        }
    }

    pub fn number(text: impl Into<String>) -> Self {
        Expr::Literal(Literal {
            kind: LiteralKind::Number,
            text: text.into(),
            span: Span::default(),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    Number,
    String,
    Bool,
}

/// A literal keeps the token text; interpretation happens during lowering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: String,
    #[serde(default)]
    pub span: Span,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_program() {
        let json = r#"{
            "top_levels": [
                { "Import": { "file": "test.h" } },
                { "Function": {
                    "name": { "name": "main" },
                    "body": [
                        { "Return": { "Call": {
                            "callee": { "GetAttr": {
                                "object": { "GetVar": { "name": "test" } },
                                "attr": { "name": "test" }
                            } }
                        } } }
                    ]
                } }
            ]
        }"#;

        let program = Program::from_json(json).expect("valid tree");
        assert_eq!(program.top_levels.len(), 2);

        let main = program.functions().next().expect("main is defined");
        assert_eq!(main.name.name, "main");
        assert!(main.params.is_empty());
        assert!(main.ret.is_none());
        match &main.body[0] {
            Stmt::Return(Expr::Call { callee, args, .. }) => {
                assert!(args.is_empty());
                assert!(matches!(**callee, Expr::GetAttr { .. }));
            }
            other => panic!("expected a return of a call, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_tree_is_rejected() {
        let err = Program::from_json(r#"{ "top_levels": [ { "Class": {} } ] }"#).unwrap_err();
        assert!(matches!(err, SyntaxError::MalformedTree(_)));
    }

    #[test]
    fn test_span_converts_to_source_span() {
        let span: SourceSpan = Span::new(4, 10).into();
        assert_eq!(span.offset(), 4);
        assert_eq!(span.len(), 6);
    }
}
