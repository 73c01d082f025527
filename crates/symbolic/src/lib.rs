//! Symbolic reverse-mode gradient oracle.
//!
//! [`SymbolicOracle`] implements [`GradientOracle`] over [`Expr`], a small
//! scalar expression type. A reverse pass builds adjoints as expressions, so a
//! gradient can itself be differentiated, which is all a Fisher-vector product
//! needs. Structural dependence is tracked exactly: a parameter that an output
//! never touches gets a `None` gradient.
//!
//! This is a reference backend for wiring and testing. It has no tensor
//! kernels and no broadcasting; objectives are written element by element.
//!
//! # Example
//!
//! ```rust
//! use natgrad_core::{GradientOracle, ParameterVector};
//! use natgrad_symbolic::{Expr, SymbolicOracle};
//! use ndarray::arr1;
//!
//! let params = ParameterVector::new([("theta", arr1(&[3.0]).into_dyn())]).unwrap();
//! let oracle = SymbolicOracle::new();
//! let theta = oracle.variables(&params).remove(0);
//!
//! // f(θ) = θ³, so f'(θ) = 3θ² and f''(θ) = 6θ.
//! let f = theta[[0]].powi(3);
//! let grad = oracle.gradient(&f, &params).unwrap().remove(0).unwrap();
//! assert_eq!(oracle.value(&grad, &params).unwrap()[[0]], 27.0);
//!
//! let second = oracle.gradient(&grad[[0]], &params).unwrap().remove(0).unwrap();
//! assert_eq!(oracle.value(&second, &params).unwrap()[[0]], 18.0);
//! # let _: Expr = f;
//! ```
//!
//! [`GradientOracle`]: natgrad_core::GradientOracle

mod backward;
mod error;
mod expr;
mod oracle;

pub use error::SymbolicError;
pub use expr::{Expr, Var};
pub use oracle::{ExprTensor, SymbolicOracle};
