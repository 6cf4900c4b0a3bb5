//! strsmt - Symbolic rewriter for strings, sequences, and regular expressions
//!
//! This crate implements the algebraic core of an SMT-style string solver:
//! given a term of the theory of sequences, strings, and regular
//! expressions, the rewriter returns an equivalent but simpler term,
//! driving it toward a canonical form.
//!
//! - **String/sequence simplification**: concat, length, extract, at, nth,
//!   indexof, contains, prefix/suffix, replace, itos/stoi, lexicographic
//!   comparison
//! - **Regex normalization**: union and intersection as ordered sets,
//!   concat/star/plus/opt/loop/range/reverse/complement cascades
//! - **Symbolic derivatives**: Antimirov derivatives with path conditions,
//!   kept in a BDD normal form over simple character predicates
//! - **Equation reduction**: front/back cancellation, length pruning,
//!   value clash, subsequence matching, non-overlap refutation
//! - **Membership and sampling**: `s ∈ R` rewriting through derivatives,
//!   and bounded search for a concrete accepted word
//!
//! # Examples
//!
//! ## Simplifying a length constraint
//!
//! ```
//! use strsmt::{SeqRewriter, SeqRewriterConfig, TermManager};
//!
//! let mut rw = SeqRewriter::new(TermManager::new(), SeqRewriterConfig::default());
//! let string_sort = rw.tm().sorts.string_sort;
//! let x = rw.tm_mut().mk_var("x", string_sort);
//! let abc = rw.tm_mut().mk_str_s("abc");
//! let cat = rw.tm_mut().mk_seq_concat(abc, x);
//! let len = rw.tm_mut().mk_seq_len(cat);
//!
//! // len("abc" ++ x) becomes len(x) + 3.
//! let simplified = rw.simplify(len);
//! let len_x = rw.tm_mut().mk_seq_len(x);
//! let three = rw.tm_mut().mk_int_i64(3);
//! assert_eq!(simplified, rw.tm_mut().mk_add(vec![len_x, three]));
//! ```
//!
//! ## Membership through derivatives
//!
//! ```
//! use strsmt::SeqRewriter;
//!
//! let mut rw = SeqRewriter::default();
//! let s = rw.tm_mut().mk_str_s("ab");
//! let re = rw.tm_mut().mk_to_re(s);
//! let star = rw.tm_mut().mk_re_star(re);
//! let w = rw.tm_mut().mk_str_s("abab");
//! let mem = rw.tm_mut().mk_str_in_re(w, star);
//! let verdict = rw.simplify(mem);
//! assert!(rw.tm().is_true(verdict));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod ast;
pub mod automaton;
pub mod cache;
pub mod charpred;
pub mod error;
pub mod length;
pub mod membership;
pub mod zstring;

mod derivative;
mod eq_reducer;
mod regex_ops;
mod rewriter;
mod string_ops;

pub use ast::{Lbool, SortId, SortKind, Term, TermId, TermKind, TermManager};
pub use automaton::{Automaton, Move, StateId};
pub use cache::{CacheOp, OpCache};
pub use charpred::{CharAlgebra, CharPred, ExprSolver, NoSolver};
pub use error::{Error, Result};
pub use membership::Witness;
pub use rewriter::{RewriteResult, SeqRewriter, SeqRewriterConfig, SeqRewriterStats};
pub use zstring::{ZString, MAX_CHAR};
