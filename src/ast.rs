//! # Query Abstract Syntax Tree
//!
//! This module defines the tree that the parser produces, the compiler
//! consumes and the stringifier renders back to text.
//!
//! ## Architecture Overview
//!
//! - **[query]** - The [`Query`] node: a literal, a function call, or the
//!   mapping argument of `object`
//! - **[operators]** - Precedence groups mapping function names to infix
//!   symbols, extensible with custom operators
//!
//! ## Text and JSON forms
//!
//! Every query has two serializations. The text form is what people write:
//!
//! ```text
//! .friends | filter(.city == "New York") | sort(.age) | pick(.name, .age)
//! ```
//!
//! The JSON form is what programs exchange. A list whose head is a string is
//! a call, and everything else is a literal:
//!
//! ```text
//! ["pipe",
//!   ["get", "friends"],
//!   ["filter", ["eq", ["get", "city"], "New York"]],
//!   ["sort", ["get", "age"]],
//!   ["pick", ["get", "name"], ["get", "age"]]]
//! ```
//!
//! Literal containers never appear bare in the JSON form: arrays are written
//! `["array", ...items]` and objects `["object", {...}]`, so a list of values
//! can never be mistaken for a call.
//!
//! ## Operators
//!
//! Operators are sugar for two-argument calls. `.age >= 18` is
//! `["gte", ["get", "age"], 18]`. From tightest to loosest binding:
//!
//! ```text
//! ^            pow
//! * / %        multiply divide mod
//! + -          add subtract
//! > >= < <= in "not in"
//! == !=        eq ne
//! and
//! or
//! |            pipe
//! ```
pub mod operators;
pub mod query;

pub use operators::{CustomOperator, Insertion, OperatorGroup, OperatorTable};
pub use query::Query;
