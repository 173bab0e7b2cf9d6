/// Argument list reconstruction.
use crate::node::{Argument, Expr};

/// Wrap raw expressions into positional, unnamed arguments.
pub fn build_arguments(values: Vec<Expr>) -> Vec<Argument> {
    values.into_iter().map(Argument::positional).collect()
}

/// Replace the first argument of `original` with `replacements`.
///
/// Arguments after the first keep their order and their original text, so
/// a trailing failure message travels along untouched.
pub fn replace_first_argument(original: Vec<Argument>, replacements: Vec<Expr>) -> Vec<Argument> {
    let mut arguments = build_arguments(replacements);
    arguments.extend(original.into_iter().skip(1));
    arguments
}
