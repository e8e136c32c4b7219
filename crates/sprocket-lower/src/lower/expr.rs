//! Body phase: statements and expressions of one function.

use std::num::IntErrorKind;

use sprocket_ir::{Builder, Graph, NamespaceId, TypeId, ValueId};
use sprocket_syntax::{Expr, FunctionDef, Ident, Literal, LiteralKind, Span, Stmt};

use super::items::UnitScope;
use crate::error::{GraphResultExt, LoweringError, Result};

/// What an expression evaluated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lowered {
    Value(ValueId),
    /// A module alias, only usable on the left of an attribute access.
    Namespace(NamespaceId),
}

/// Lowers the body of `def` into the block of `func` and commits it.
///
/// Instructions go through a [`Builder`] that is only committed once the
/// whole body lowered successfully, so an error leaves the block untouched.
pub(super) fn lower_body(graph: &mut Graph, unit: &UnitScope, def: &FunctionDef, func: ValueId) -> Result<()> {
    let block = graph
        .func(func)
        .map(|decl| decl.scope)
        .unwrap_or_else(|| graph.value(func).namespace());
    let ret = graph.func_return_type(func).unwrap_or(graph.primitives().void);
    let void = graph.primitives().void;
    log::trace!("lowering body of `{}`", def.name.name);

    let mut body = BodyLowerer {
        builder: Builder::new(graph, block).at(def.span)?,
        unit,
        function: &def.name.name,
    };

    let mut returned = false;
    for stmt in &def.body {
        match stmt {
            _ if returned => {
                return Err(LoweringError::UnreachableStatement {
                    span: stmt_span(stmt).into(),
                })
            }
            Stmt::Expr(expr) => {
                body.lower_value(expr)?;
            }
            Stmt::Return(expr) => {
                let value = body.lower_value(expr)?;
                body.expect_type(value, ret, expr.span())?;
                body.builder.emit_return(value);
                returned = true;
            }
        }
    }

    if !returned && ret != void {
        return Err(LoweringError::MissingReturn {
            name: def.name.name.clone(),
            ret: body.builder.graph().type_name(ret),
            span: def.name.span.into(),
        });
    }

    body.builder.commit().at(def.span)
}

fn stmt_span(stmt: &Stmt) -> Span {
    match stmt {
        Stmt::Expr(expr) | Stmt::Return(expr) => expr.span(),
    }
}

struct BodyLowerer<'g, 'u> {
    builder: Builder<'g>,
    unit: &'u UnitScope,
    function: &'u str,
}

impl BodyLowerer<'_, '_> {
    fn graph(&self) -> &Graph {
        self.builder.graph()
    }

    fn lower_value(&mut self, expr: &Expr) -> Result<ValueId> {
        match self.lower_expr(expr)? {
            Lowered::Value(value) => Ok(value),
            Lowered::Namespace(namespace) => Err(LoweringError::ExpectedValue {
                name: self.graph().namespace(namespace).name().to_string(),
                span: expr.span().into(),
            }),
        }
    }

    fn lower_expr(&mut self, expr: &Expr) -> Result<Lowered> {
        match expr {
            Expr::GetVar(ident) => self.lower_var(ident),
            Expr::GetAttr { object, attr, span } => self.lower_attr(object, attr, *span),
            Expr::Call { callee, args, span } => self.lower_call(callee, args, *span).map(Lowered::Value),
            Expr::Literal(literal) => self.lower_literal(literal).map(Lowered::Value),
        }
    }

    /// Parameters of the function, then functions of the module, then
    /// import aliases.
    fn lower_var(&mut self, ident: &Ident) -> Result<Lowered> {
        let name = ident.name.as_str();
        let block = self.builder.block();

        if self.graph().lookup(block, name).is_ok() {
            return self.builder.emit_get(name).at(ident.span).map(Lowered::Value);
        }
        if let Ok(func) = self.graph().lookup(self.unit.module, name) {
            return Ok(Lowered::Value(func));
        }
        if let Some(namespace) = self.unit.aliases.get(name) {
            return Ok(Lowered::Namespace(*namespace));
        }
        Err(LoweringError::NameNotFound {
            name: name.to_string(),
            scope: self.function.to_string(),
            span: ident.span.into(),
        })
    }

    fn lower_attr(&mut self, object: &Expr, attr: &Ident, span: Span) -> Result<Lowered> {
        match self.lower_expr(object)? {
            Lowered::Namespace(namespace) => self
                .graph()
                .lookup(namespace, &attr.name)
                .map(Lowered::Value)
                .map_err(|_| LoweringError::NameNotFound {
                    name: attr.name.clone(),
                    scope: self.graph().namespace(namespace).name().to_string(),
                    span: attr.span.into(),
                }),
            Lowered::Value(_) => Err(LoweringError::NotAModule {
                name: describe(object),
                span: span.into(),
            }),
        }
    }

    fn lower_call(&mut self, callee: &Expr, args: &[Expr], span: Span) -> Result<ValueId> {
        let func = match self.lower_expr(callee)? {
            Lowered::Value(func) => func,
            Lowered::Namespace(_) => {
                return Err(LoweringError::NotCallable {
                    name: describe(callee),
                    ty: "module".to_string(),
                    span: callee.span().into(),
                })
            }
        };

        let func_ty = self.graph().value_type(func);
        let (params, ret) = self
            .graph()
            .function_signature(func_ty)
            .ok_or_else(|| LoweringError::NotCallable {
                name: describe(callee),
                ty: self.graph().type_name(func_ty),
                span: callee.span().into(),
            })?;

        if params.len() != args.len() {
            return Err(LoweringError::ArgumentCount {
                name: describe(callee),
                expected: params.len(),
                found: args.len(),
                span: span.into(),
            });
        }

        let mut values = Vec::with_capacity(args.len());
        for (arg, param) in args.iter().zip(&params) {
            let value = self.lower_value(arg)?;
            self.expect_type(value, *param, arg.span())?;
            values.push(value);
        }

        self.builder.emit_call(func, &values, ret).at(span)
    }

    fn lower_literal(&mut self, literal: &Literal) -> Result<ValueId> {
        if literal.kind != LiteralKind::Number {
            return Err(LoweringError::UnsupportedLiteral {
                text: literal.text.clone(),
                span: literal.span.into(),
            });
        }
        match literal.text.parse::<i32>() {
            Ok(value) => Ok(self.builder.emit_int_constant(i64::from(value), None)),
            Err(err) if matches!(err.kind(), IntErrorKind::PosOverflow | IntErrorKind::NegOverflow) => {
                Err(LoweringError::IntLiteralOutOfRange {
                    text: literal.text.clone(),
                    span: literal.span.into(),
                })
            }
            Err(_) => Err(LoweringError::UnsupportedLiteral {
                text: literal.text.clone(),
                span: literal.span.into(),
            }),
        }
    }

    fn expect_type(&self, value: ValueId, expected: TypeId, span: Span) -> Result<()> {
        let found = self.graph().value_type(value);
        if found == expected {
            return Ok(());
        }
        Err(LoweringError::TypeMismatch {
            expected: self.graph().type_name(expected),
            found: self.graph().type_name(found),
            span: span.into(),
        })
    }
}

/// Short source-like rendering of an expression for diagnostics.
fn describe(expr: &Expr) -> String {
    match expr {
        Expr::GetVar(ident) => ident.name.clone(),
        Expr::GetAttr { object, attr, .. } => format!("{}.{}", describe(object), attr.name),
        Expr::Call { callee, .. } => format!("{}(..)", describe(callee)),
        Expr::Literal(literal) => literal.text.clone(),
    }
}
