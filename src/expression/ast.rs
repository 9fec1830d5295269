use std::collections::BTreeSet;
use std::fmt;

use crate::foundation::core::Ident;
use crate::foundation::error::{ScriptError, ScriptResult};

/// A symbolic expression as handed over by the front end.
///
/// Expressions stay symbolic until every free variable has a concrete
/// numeric binding; substitution is variable-for-value, never
/// simplification.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Expr {
    /// Numeric literal.
    Num(f64),
    /// Free variable.
    Var(Ident),
    /// Unary operation.
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        expr: Box<Expr>,
    },
    /// Binary operation.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Builtin function application.
    Call {
        /// The builtin.
        func: Func,
        /// The single argument.
        arg: Box<Expr>,
    },
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum UnaryOp {
    /// Arithmetic negation.
    Neg,
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Remainder.
    Mod,
    /// Exponentiation.
    Pow,
}

/// Builtin unary functions available to programs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Func {
    /// Sine.
    Sin,
    /// Cosine.
    Cos,
    /// Tangent.
    Tan,
    /// Square root.
    Sqrt,
    /// Natural exponential.
    Exp,
    /// Natural logarithm.
    Ln,
    /// Absolute value.
    Abs,
}

impl Expr {
    /// A variable reference.
    pub fn var(name: impl Into<String>) -> Self {
        Self::Var(Ident::new(name))
    }

    /// A numeric literal.
    pub fn num(value: f64) -> Self {
        Self::Num(value)
    }

    /// `-self`.
    pub fn neg(self) -> Self {
        Self::Unary {
            op: UnaryOp::Neg,
            expr: Box::new(self),
        }
    }

    /// A binary combination of two expressions.
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// A builtin function application.
    pub fn call(func: Func, arg: Expr) -> Self {
        Self::Call {
            func,
            arg: Box::new(arg),
        }
    }

    /// If this expression is a bare variable, its name.
    pub fn as_var(&self) -> Option<&Ident> {
        match self {
            Self::Var(name) => Some(name),
            _ => None,
        }
    }

    /// All free variable names, in name order.
    pub fn free_vars(&self) -> BTreeSet<Ident> {
        let mut vars = BTreeSet::new();
        self.collect_vars(&mut vars);
        vars
    }

    fn collect_vars(&self, vars: &mut BTreeSet<Ident>) {
        match self {
            Self::Num(_) => {}
            Self::Var(name) => {
                vars.insert(name.clone());
            }
            Self::Unary { expr, .. } => expr.collect_vars(vars),
            Self::Binary { left, right, .. } => {
                left.collect_vars(vars);
                right.collect_vars(vars);
            }
            Self::Call { arg, .. } => arg.collect_vars(vars),
        }
    }

    /// Substitute a numeric value for every occurrence of `name`.
    pub fn subs_num(&self, name: &Ident, value: f64) -> Self {
        self.subs(name, &Expr::Num(value))
    }

    /// Substitute an expression for every occurrence of `name`.
    pub fn subs(&self, name: &Ident, replacement: &Expr) -> Self {
        match self {
            Self::Num(n) => Self::Num(*n),
            Self::Var(v) => {
                if v == name {
                    replacement.clone()
                } else {
                    Self::Var(v.clone())
                }
            }
            Self::Unary { op, expr } => Self::Unary {
                op: *op,
                expr: Box::new(expr.subs(name, replacement)),
            },
            Self::Binary { op, left, right } => Self::Binary {
                op: *op,
                left: Box::new(left.subs(name, replacement)),
                right: Box::new(right.subs(name, replacement)),
            },
            Self::Call { func, arg } => Self::Call {
                func: *func,
                arg: Box::new(arg.subs(name, replacement)),
            },
        }
    }

    /// Evaluate numerically with `name` bound to `value`.
    ///
    /// Any other free variable is a [`ScriptError::Type`]: sampling requires
    /// a fully numeric expression.
    pub fn eval_at(&self, name: &Ident, value: f64) -> ScriptResult<f64> {
        match self {
            Self::Num(n) => Ok(*n),
            Self::Var(v) => {
                if v == name {
                    Ok(value)
                } else {
                    Err(ScriptError::type_error(format!(
                        "expression still contains unbound symbol `{v}`"
                    )))
                }
            }
            Self::Unary {
                op: UnaryOp::Neg,
                expr,
            } => Ok(-expr.eval_at(name, value)?),
            Self::Binary { op, left, right } => {
                let l = left.eval_at(name, value)?;
                let r = right.eval_at(name, value)?;
                Ok(match op {
                    BinaryOp::Add => l + r,
                    BinaryOp::Sub => l - r,
                    BinaryOp::Mul => l * r,
                    BinaryOp::Div => l / r,
                    BinaryOp::Mod => l % r,
                    BinaryOp::Pow => l.powf(r),
                })
            }
            Self::Call { func, arg } => {
                let a = arg.eval_at(name, value)?;
                Ok(match func {
                    Func::Sin => a.sin(),
                    Func::Cos => a.cos(),
                    Func::Tan => a.tan(),
                    Func::Sqrt => a.sqrt(),
                    Func::Exp => a.exp(),
                    Func::Ln => a.ln(),
                    Func::Abs => a.abs(),
                })
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(n) => write!(f, "{n}"),
            Self::Var(v) => write!(f, "{v}"),
            Self::Unary {
                op: UnaryOp::Neg,
                expr,
            } => write!(f, "-({expr})"),
            Self::Binary { op, left, right } => {
                let sym = match op {
                    BinaryOp::Add => "+",
                    BinaryOp::Sub => "-",
                    BinaryOp::Mul => "*",
                    BinaryOp::Div => "/",
                    BinaryOp::Mod => "%",
                    BinaryOp::Pow => "^",
                };
                write!(f, "({left} {sym} {right})")
            }
            Self::Call { func, arg } => {
                let name = match func {
                    Func::Sin => "sin",
                    Func::Cos => "cos",
                    Func::Tan => "tan",
                    Func::Sqrt => "sqrt",
                    Func::Exp => "exp",
                    Func::Ln => "ln",
                    Func::Abs => "abs",
                };
                write!(f, "{name}({arg})")
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/expression/ast.rs"]
mod tests;
