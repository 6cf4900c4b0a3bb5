//! Symbolic Antimirov derivatives in BDD normal form.
//!
//! `mk_derivative(e, r)` computes the derivative of a regex by a symbolic
//! element under a path condition, producing a regex whose outer structure
//! is a union of Antimirov branches over `ite` BDDs with simple character
//! conditions. `mk_der_op`/`mk_der_compl`/`mk_der_cond` combine normal
//! forms; `simplify_path` prunes infeasible branches by character-range
//! reasoning. Nullability is computed as a formula and cached.

use crate::ast::{Lbool, SortId, TermId, TermKind};
use crate::cache::CacheOp;
use crate::length::re_nullable_hint;
use crate::regex_ops::{
    as_antimirov_union, as_complement, as_ite, as_re_inter, as_re_union, as_to_re, is_re_allchar,
    is_re_empty, is_re_full,
};
use crate::rewriter::SeqRewriter;
use crate::zstring::MAX_CHAR;

/// Binary operations that preserve derivative normal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DerOp {
    Union,
    Inter,
    Concat,
    AntimirovUnion,
}

impl DerOp {
    fn cache_op(self) -> CacheOp {
        match self {
            DerOp::Union => CacheOp::DerUnion,
            DerOp::Inter => CacheOp::DerInter,
            DerOp::Concat => CacheOp::DerConcat,
            DerOp::AntimirovUnion => CacheOp::DerAntimirovUnion,
        }
    }
}

impl SeqRewriter {
    // ------------------------------------------------------------------
    // Nullability
    // ------------------------------------------------------------------

    /// Formula expressing that the empty word belongs to `r`; cached.
    pub fn is_nullable(&mut self, r: TermId) -> TermId {
        if let Some(cached) = self.cache.find(CacheOp::Nullable, r, None, None) {
            self.stats.cache_hits += 1;
            return cached;
        }
        self.stats.cache_misses += 1;
        let result = self.is_nullable_rec(r);
        self.cache.insert(CacheOp::Nullable, r, None, None, result);
        result
    }

    fn is_nullable_rec(&mut self, r: TermId) -> TermId {
        let kind = self.tm.kind(r).clone();
        match kind {
            TermKind::ReConcat(r1, r2) | TermKind::ReInter(r1, r2) => {
                let n1 = self.is_nullable(r1);
                let n2 = self.is_nullable(r2);
                self.tm.mk_and2(n1, n2)
            }
            TermKind::ReUnion(r1, r2) | TermKind::ReAntimirovUnion(r1, r2) => {
                let n1 = self.is_nullable(r1);
                let n2 = self.is_nullable(r2);
                self.tm.mk_or2(n1, n2)
            }
            TermKind::ReDiff(r1, r2) => {
                let n2 = self.is_nullable(r2);
                let not_n2 = self.tm.mk_not(n2);
                let n1 = self.is_nullable(r1);
                self.tm.mk_and2(not_n2, n1)
            }
            TermKind::ReStar(_) | TermKind::ReOpt(_) | TermKind::ReFull(_) => self.tm.mk_true(),
            TermKind::ReLoop(r1, lo, hi) => {
                if hi.is_some_and(|h| h < lo) {
                    self.tm.mk_false()
                } else if lo == 0 {
                    self.tm.mk_true()
                } else {
                    self.is_nullable(r1)
                }
            }
            TermKind::RePower(r1, n) => {
                if n == 0 {
                    self.tm.mk_true()
                } else {
                    self.is_nullable(r1)
                }
            }
            TermKind::ReAllChar(_)
            | TermKind::ReEmpty(_)
            | TermKind::ReOfPred(_)
            | TermKind::ReRange(..) => self.tm.mk_false(),
            TermKind::RePlus(r1) | TermKind::ReReverse(r1) => self.is_nullable(r1),
            TermKind::ReComplement(r1) => {
                let n = self.is_nullable(r1);
                self.tm.mk_not(n)
            }
            TermKind::ToRe(r1) => self.is_nullable(r1),
            TermKind::Ite(c, r1, r2) => {
                let n1 = self.is_nullable(r1);
                let n2 = self.is_nullable(r2);
                self.tm.mk_ite(c, n1, n2)
            }
            TermKind::ReDerivative(..) => {
                let seq = self
                    .tm
                    .sorts
                    .re_seq(self.tm.sort(r))
                    .unwrap_or(self.tm.sorts.string_sort);
                self.is_nullable_symbolic_regex(r, seq)
            }
            // Sequence-level nullability.
            TermKind::SeqConcat(r1, r2) => {
                let n1 = self.is_nullable(r1);
                let n2 = self.is_nullable(r2);
                self.tm.mk_and2(n1, n2)
            }
            TermKind::SeqEmpty(_) => self.tm.mk_true(),
            TermKind::SeqUnit(_) => self.tm.mk_false(),
            TermKind::Str(s) => {
                let v = s.is_empty();
                self.tm.mk_bool(v)
            }
            _ if self.tm.sorts.is_re(self.tm.sort(r)) => {
                let seq = self
                    .tm
                    .sorts
                    .re_seq(self.tm.sort(r))
                    .unwrap_or(self.tm.sorts.string_sort);
                self.is_nullable_symbolic_regex(r, seq)
            }
            _ => {
                debug_assert!(self.tm.sorts.is_seq(self.tm.sort(r)));
                let empty = self.tm.mk_seq_empty(self.tm.sort(r));
                self.tm.mk_eq(empty, r)
            }
        }
    }

    /// Nullability of a chain of unevaluated derivatives over `to_re`:
    /// nullable iff the inner sequence equals the consumed elements.
    fn is_nullable_symbolic_regex(&mut self, r: TermId, seq_sort: SortId) -> TermId {
        let mut elems = self.tm.mk_seq_empty(seq_sort);
        let mut r1 = r;
        while let TermKind::ReDerivative(elem, r2) = *self.tm.kind(r1) {
            let u = self.tm.mk_seq_unit(elem);
            elems = if self.tm.is_seq_empty(elems) {
                u
            } else {
                self.tm.mk_seq_concat(u, elems)
            };
            r1 = r2;
        }
        if let Some(s) = as_to_re(&self.tm, r1) {
            return self.tm.mk_eq(elems, s);
        }
        let empty = self.tm.mk_seq_empty(seq_sort);
        self.tm.mk_str_in_re(empty, r)
    }

    // ------------------------------------------------------------------
    // Sequence access helpers
    // ------------------------------------------------------------------

    /// First element of a non-empty sequence; peeks through `extract`.
    pub(crate) fn mk_seq_first(&mut self, t: TermId) -> TermId {
        if let TermKind::SeqExtract(s, j, _) = *self.tm.kind(t) {
            return self.tm.mk_seq_nth_i(s, j);
        }
        let zero = self.zero();
        self.tm.mk_seq_nth_i(t, zero)
    }

    /// All but the first element of a non-empty sequence.
    pub(crate) fn mk_seq_rest(&mut self, t: TermId) -> TermId {
        if let TermKind::SeqExtract(s, j, k) = *self.tm.kind(t) {
            if let Some(jv) = self.tm.int_value(j).cloned() {
                if jv.sign() != num_bigint::Sign::Minus {
                    let j1 = self.tm.mk_int(jv + 1);
                    let k1 = self.mk_sub_const(k, 1);
                    return self.tm.mk_seq_extract(s, j1, k1);
                }
            }
        }
        let one = self.one();
        let len = self.tm.mk_seq_len(t);
        let len1 = self.mk_sub_const(len, 1);
        self.tm.mk_seq_extract(t, one, len1)
    }

    /// Last element of a non-empty sequence.
    pub(crate) fn mk_seq_last(&mut self, t: TermId) -> TermId {
        if let TermKind::SeqExtract(s, j, k) = *self.tm.kind(t) {
            let jv = self.tm.int_value(j).cloned();
            if let (Some(jv), TermKind::Sub(l, i)) = (jv, self.tm.kind(k).clone()) {
                let iv = self.tm.int_value(i).cloned();
                if let (TermKind::SeqLen(s2), Some(iv)) = (self.tm.kind(l).clone(), iv) {
                    if jv.sign() != num_bigint::Sign::Minus && s2 == s && jv == iv {
                        let lastpos = self.mk_sub_const(l, 1);
                        return self.tm.mk_seq_nth_i(s, lastpos);
                    }
                }
            }
        }
        let len = self.tm.mk_seq_len(t);
        let pos = self.mk_sub_const(len, 1);
        self.tm.mk_seq_nth_i(t, pos)
    }

    /// All but the last element of a non-empty sequence.
    pub(crate) fn mk_seq_butlast(&mut self, t: TermId) -> TermId {
        let zero = self.zero();
        let len = self.tm.mk_seq_len(t);
        let len1 = self.mk_sub_const(len, 1);
        self.tm.mk_seq_extract(t, zero, len1)
    }

    /// Split `s = unit(head) · tail`, when the head is syntactically
    /// available.
    pub(crate) fn get_head_tail(&mut self, s: TermId) -> Option<(TermId, TermId)> {
        match self.tm.kind(s).clone() {
            TermKind::SeqUnit(h) => {
                let tail = self.tm.mk_seq_empty(self.tm.sort(s));
                Some((h, tail))
            }
            TermKind::Str(z) if !z.is_empty() => {
                let h = self.tm.mk_char(z.at(0));
                let tail = self.tm.mk_str(z.extract(1, z.len()));
                Some((h, tail))
            }
            TermKind::SeqConcat(h, t) => {
                let (head, tail) = self.get_head_tail(h)?;
                let tail = self.mk_seq_concat_rw(tail, t);
                Some((head, tail))
            }
            _ => None,
        }
    }

    /// Split `s = head · unit(last)`, when the last element is
    /// syntactically available.
    pub(crate) fn get_head_tail_reversed(&mut self, s: TermId) -> Option<(TermId, TermId)> {
        match self.tm.kind(s).clone() {
            TermKind::SeqUnit(t) => {
                let head = self.tm.mk_seq_empty(self.tm.sort(s));
                Some((head, t))
            }
            TermKind::Str(z) if !z.is_empty() => {
                let head = self.tm.mk_str(z.extract(0, z.len() - 1));
                let last = self.tm.mk_char(z.at(z.len() - 1));
                Some((head, last))
            }
            TermKind::SeqConcat(h, t) => {
                let (head, last) = self.get_head_tail_reversed(t)?;
                let head = self.mk_seq_concat_rw(h, head);
                Some((head, last))
            }
            _ => None,
        }
    }

    /// `ite(cond, r, ∅)`.
    pub(crate) fn re_and(&mut self, cond: TermId, r: TermId) -> TermId {
        if self.tm.is_true(cond) {
            return r;
        }
        let empty = self.tm.mk_re_empty(self.tm.sort(r));
        if self.tm.is_false(cond) {
            return empty;
        }
        self.tm.mk_ite(cond, r, empty)
    }

    /// `ite(cond, ε, ∅)` over the given sequence sort.
    pub(crate) fn re_predicate(&mut self, cond: TermId, seq_sort: SortId) -> TermId {
        let eps = self.tm.mk_re_epsilon(seq_sort);
        self.re_and(cond, eps)
    }

    // ------------------------------------------------------------------
    // Antimirov derivative
    // ------------------------------------------------------------------

    /// Derivative by `e` with a true path condition.
    pub fn mk_derivative(&mut self, e: TermId, r: TermId) -> TermId {
        let t = self.tm.mk_true();
        self.mk_antimirov_deriv(e, r, t)
    }

    /// Derivative with respect to the designated element variable.
    pub fn mk_derivative_elem(&mut self, r: TermId) -> TermId {
        let seq = self
            .tm
            .sorts
            .re_seq(self.tm.sort(r))
            .unwrap_or(self.tm.sorts.string_sort);
        let elem = self
            .tm
            .sorts
            .seq_elem(seq)
            .unwrap_or(self.tm.sorts.char_sort);
        let v = self.tm.element_var(elem);
        let t = self.tm.mk_true();
        self.mk_antimirov_deriv(v, r, t)
    }

    /// Cached Antimirov derivative under a path condition.
    pub(crate) fn mk_antimirov_deriv(&mut self, e: TermId, r: TermId, path: TermId) -> TermId {
        if let Some(cached) = self.cache.find(CacheOp::Derivative, e, Some(r), Some(path)) {
            self.stats.cache_hits += 1;
            return cached;
        }
        self.stats.cache_misses += 1;
        self.stats.derivative_calls += 1;
        let result = self.mk_antimirov_deriv_rec(e, r, path);
        self.cache.insert(CacheOp::Derivative, e, Some(r), Some(path), result);
        result
    }

    fn mk_antimirov_deriv_rec(&mut self, e: TermId, r: TermId, path: TermId) -> TermId {
        let re_sort = self.tm.sort(r);
        let seq_sort = self
            .tm
            .sorts
            .re_seq(re_sort)
            .unwrap_or(self.tm.sorts.string_sort);
        let nothing = |this: &mut Self| this.tm.mk_re_empty(re_sort);

        let kind = self.tm.kind(r).clone();
        if is_re_empty(&self.tm, r) || self.tm.is_re_epsilon(r) {
            return nothing(self);
        }
        if is_re_full(&self.tm, r) || self.tm.is_re_dot_plus(r) {
            return self.tm.mk_re_full(re_sort);
        }
        if is_re_allchar(&self.tm, r) {
            return self.tm.mk_re_epsilon(seq_sort);
        }
        match kind {
            TermKind::ToRe(r1) => {
                if let Some((h, t)) = self.get_head_tail(r1) {
                    if e == h {
                        return self.tm.mk_to_re(t);
                    }
                    if self.tm.are_distinct(e, h) {
                        return nothing(self);
                    }
                    let cond = self.tm.mk_eq(e, h);
                    let then = self.tm.mk_to_re(t);
                    let empty = nothing(self);
                    return self.tm.mk_ite(cond, then, empty);
                }
                // Non-ground sequence: guard on non-emptiness and on the
                // first element matching.
                let empty_s = self.tm.mk_seq_empty(seq_sort);
                let ne = self.tm.mk_eq(r1, empty_s);
                let ne = self.tm.mk_not(ne);
                let first = self.mk_seq_first(r1);
                let head_eq = self.tm.mk_eq(first, e);
                let c1 = self.tm.mk_and2(ne, head_eq);
                let c2 = self.tm.mk_and2(path, c1);
                if self.tm.is_false(c2) {
                    return nothing(self);
                }
                let rest = self.mk_seq_rest(r1);
                let then = self.tm.mk_to_re(rest);
                let empty = nothing(self);
                self.tm.mk_ite(c1, then, empty)
            }
            TermKind::ReReverse(r2) => {
                if let Some(r1) = as_to_re(&self.tm, r2) {
                    let empty_s = self.tm.mk_seq_empty(seq_sort);
                    let ne = self.tm.mk_eq(r1, empty_s);
                    let ne = self.tm.mk_not(ne);
                    let last = self.mk_seq_last(r1);
                    let last_eq = self.tm.mk_eq(last, e);
                    let c1 = self.tm.mk_and2(ne, last_eq);
                    let c2 = self.tm.mk_and2(path, c1);
                    if self.tm.is_false(c2) {
                        return nothing(self);
                    }
                    let butlast = self.mk_seq_butlast(r1);
                    let then0 = self.tm.mk_to_re(butlast);
                    let then = self.tm.mk_re_reverse(then0);
                    let empty = nothing(self);
                    return self.tm.mk_ite(c1, then, empty);
                }
                let rev = self.mk_regex_reverse(r2);
                if rev == r {
                    // Stuck, e.g. the reverse of a regex variable.
                    self.tm.mk_re_derivative(e, rev)
                } else {
                    self.mk_antimirov_deriv(e, rev, path)
                }
            }
            TermKind::ReConcat(r1, r2) => {
                let r1_nullable = self.is_nullable(r1);
                let d1 = self.mk_antimirov_deriv(e, r1, path);
                let c1 = self.mk_antimirov_deriv_concat(d1, r2);
                let nullable_and_path = self.tm.mk_and2(r1_nullable, path);
                if self.tm.is_false(nullable_and_path) {
                    return c1;
                }
                let d2 = self.mk_antimirov_deriv(e, r2, path);
                let empty = nothing(self);
                let guarded = self.tm.mk_ite(r1_nullable, d2, empty);
                self.mk_antimirov_deriv_union(c1, guarded)
            }
            TermKind::Ite(c, r1, r2) => {
                let pc = self.tm.mk_and2(c, path);
                let c1 = self.simplify_path(e, pc);
                let nc = self.tm.mk_not(c);
                let pnc = self.tm.mk_and2(nc, path);
                let c2 = self.simplify_path(e, pnc);
                if self.tm.is_false(c1) {
                    return self.mk_antimirov_deriv(e, r2, c2);
                }
                if self.tm.is_false(c2) {
                    return self.mk_antimirov_deriv(e, r1, c1);
                }
                let d1 = self.mk_antimirov_deriv(e, r1, c1);
                let d2 = self.mk_antimirov_deriv(e, r2, c2);
                self.tm.mk_ite(c, d1, d2)
            }
            TermKind::ReRange(r1, r2) => {
                let c1 = unit_string_char(self, r1);
                let c2 = unit_string_char(self, r2);
                let range = match (c1, c2) {
                    (Some(c1), Some(c2)) => {
                        let le1 = self.tm.mk_char_le(c1, e);
                        let le2 = self.tm.mk_char_le(e, c2);
                        let both = self.tm.mk_and2(le1, le2);
                        Some(self.simplify_path(e, both))
                    }
                    (None, Some(c2)) if self.tm.str_value(r1).is_none() => {
                        let g = self.length_one_guard(r1);
                        let r1_0 = self.nth0(r1);
                        let le1 = self.tm.mk_char_le(r1_0, e);
                        let le2 = self.tm.mk_char_le(e, c2);
                        let cs = self.tm.mk_and(vec![g, le1, le2]);
                        Some(self.simplify_path(e, cs))
                    }
                    (Some(c1), None) if self.tm.str_value(r2).is_none() => {
                        let g = self.length_one_guard(r2);
                        let r2_0 = self.nth0(r2);
                        let le1 = self.tm.mk_char_le(c1, e);
                        let le2 = self.tm.mk_char_le(e, r2_0);
                        let cs = self.tm.mk_and(vec![g, le1, le2]);
                        Some(self.simplify_path(e, cs))
                    }
                    (None, None)
                        if self.tm.str_value(r1).is_none() && self.tm.str_value(r2).is_none() =>
                    {
                        let g1 = self.length_one_guard(r1);
                        let g2 = self.length_one_guard(r2);
                        let r1_0 = self.nth0(r1);
                        let r2_0 = self.nth0(r2);
                        let le1 = self.tm.mk_char_le(r1_0, e);
                        let le2 = self.tm.mk_char_le(e, r2_0);
                        let cs = self.tm.mk_and(vec![g1, g2, le1, le2]);
                        Some(self.simplify_path(e, cs))
                    }
                    _ => None,
                };
                match range {
                    None => nothing(self),
                    Some(range) => {
                        let pr = self.tm.mk_and2(path, range);
                        let psi = self.simplify_path(e, pr);
                        if self.tm.is_false(psi) {
                            nothing(self)
                        } else {
                            let eps = self.tm.mk_re_epsilon(seq_sort);
                            let empty = nothing(self);
                            self.tm.mk_ite(range, eps, empty)
                        }
                    }
                }
            }
            TermKind::ReUnion(r1, r2) => {
                let d1 = self.mk_antimirov_deriv(e, r1, path);
                let d2 = self.mk_antimirov_deriv(e, r2, path);
                self.mk_antimirov_deriv_union(d1, d2)
            }
            TermKind::ReInter(r1, r2) => {
                let d1 = self.mk_antimirov_deriv(e, r1, path);
                let d2 = self.mk_antimirov_deriv(e, r2, path);
                let t = self.tm.mk_true();
                self.mk_antimirov_deriv_intersection(e, d1, d2, t)
            }
            TermKind::ReStar(r1) | TermKind::RePlus(r1) => {
                let d = self.mk_antimirov_deriv(e, r1, path);
                let star = self.tm.mk_re_star(r1);
                self.mk_antimirov_deriv_concat(d, star)
            }
            TermKind::ReLoop(r1, lo, None) => {
                if lo <= 1 {
                    let d = self.mk_antimirov_deriv(e, r1, path);
                    let star = self.tm.mk_re_star(r1);
                    return self.mk_antimirov_deriv_concat(d, star);
                }
                let d = self.mk_antimirov_deriv(e, r1, path);
                let tail = self.tm.mk_re_loop(r1, lo - 1, None);
                self.mk_antimirov_deriv_concat(d, tail)
            }
            TermKind::ReLoop(r1, lo, Some(hi)) => {
                if (lo == 0 && hi == 0) || hi < lo {
                    return nothing(self);
                }
                let tail = self.tm.mk_re_loop(r1, lo.saturating_sub(1), Some(hi - 1));
                let d = self.mk_antimirov_deriv(e, r1, path);
                self.mk_antimirov_deriv_concat(d, tail)
            }
            TermKind::RePower(r1, n) => {
                let loop_r = self.tm.mk_re_loop(r1, n, Some(n));
                self.mk_antimirov_deriv(e, loop_r, path)
            }
            TermKind::ReOpt(r1) => self.mk_antimirov_deriv(e, r1, path),
            TermKind::ReComplement(r1) => {
                let d = self.mk_antimirov_deriv(e, r1, path);
                self.mk_antimirov_deriv_negate(d)
            }
            TermKind::ReDiff(r1, r2) => {
                let d1 = self.mk_antimirov_deriv(e, r1, path);
                let d2 = self.mk_antimirov_deriv(e, r2, path);
                let nd2 = self.mk_antimirov_deriv_negate(d2);
                let t = self.tm.mk_true();
                self.mk_antimirov_deriv_intersection(e, d1, nd2, t)
            }
            TermKind::ReOfPred(p) => {
                let sel = self.tm.mk_select(vec![p, e]);
                self.mk_der_cond(sel, e, seq_sort)
            }
            _ => self.tm.mk_re_derivative(e, r),
        }
    }

    fn length_one_guard(&mut self, s: TermId) -> TermId {
        let len = self.tm.mk_seq_len(s);
        let one = self.one();
        self.tm.mk_eq(len, one)
    }

    fn nth0(&mut self, s: TermId) -> TermId {
        let zero = self.zero();
        self.tm.mk_seq_nth_i(s, zero)
    }

    fn mk_antimirov_deriv_intersection(
        &mut self,
        e: TermId,
        d1: TermId,
        d2: TermId,
        path: TermId,
    ) -> TermId {
        if is_re_empty(&self.tm, d1) {
            return d1;
        }
        if is_re_empty(&self.tm, d2) {
            return d2;
        }
        if let Some((c, a, b)) = as_ite(&self.tm, d1) {
            let pc = self.tm.mk_and2(path, c);
            let path_and_c = self.simplify_path(e, pc);
            let nc = self.tm.mk_not(c);
            let pnc = self.tm.mk_and2(path, nc);
            let path_and_notc = self.simplify_path(e, pnc);
            if self.tm.is_false(path_and_c) {
                return self.mk_antimirov_deriv_intersection(e, b, d2, path);
            }
            if self.tm.is_false(path_and_notc) {
                return self.mk_antimirov_deriv_intersection(e, a, d2, path);
            }
            let i1 = self.mk_antimirov_deriv_intersection(e, a, d2, path_and_c);
            let i2 = self.mk_antimirov_deriv_intersection(e, b, d2, path_and_notc);
            return self.tm.mk_ite(c, i1, i2);
        }
        if as_ite(&self.tm, d2).is_some() {
            return self.mk_antimirov_deriv_intersection(e, d2, d1, path);
        }
        if d1 == d2 || is_re_full(&self.tm, d2) {
            return self.mk_antimirov_deriv_restrict(e, d1, path);
        }
        if is_re_full(&self.tm, d1) {
            return self.mk_antimirov_deriv_restrict(e, d2, path);
        }
        if let Some((a, b)) = as_re_union(&self.tm, d1) {
            let i1 = self.mk_antimirov_deriv_intersection(e, a, d2, path);
            let i2 = self.mk_antimirov_deriv_intersection(e, b, d2, path);
            return self.mk_antimirov_deriv_union(i1, i2);
        }
        if let Some((a, b)) = as_re_union(&self.tm, d2) {
            let i1 = self.mk_antimirov_deriv_intersection(e, d1, a, path);
            let i2 = self.mk_antimirov_deriv_intersection(e, d1, b, path);
            return self.mk_antimirov_deriv_union(i1, i2);
        }
        self.mk_regex_inter_normalize(d1, d2)
    }

    fn mk_antimirov_deriv_concat(&mut self, d: TermId, r: TermId) -> TermId {
        if let Some((c, t, e)) = as_ite(&self.tm, d) {
            let r2 = self.mk_antimirov_deriv_concat(e, r);
            let r1 = self.mk_antimirov_deriv_concat(t, r);
            return self.tm.mk_ite(c, r1, r2);
        }
        if let Some((t, e)) = as_re_union(&self.tm, d) {
            let u1 = self.mk_antimirov_deriv_concat(t, r);
            let u2 = self.mk_antimirov_deriv_concat(e, r);
            return self.mk_antimirov_deriv_union(u1, u2);
        }
        self.mk_regex_concat(d, r)
    }

    fn mk_antimirov_deriv_negate(&mut self, d: TermId) -> TermId {
        let sort = self.tm.sort(d);
        let seq = self
            .tm
            .sorts
            .re_seq(sort)
            .unwrap_or(self.tm.sorts.string_sort);
        if is_re_empty(&self.tm, d) {
            return self.tm.mk_re_full(sort);
        }
        if self.tm.is_re_epsilon(d) {
            let all = self.tm.mk_re_allchar(sort);
            return self.tm.mk_re_plus(all);
        }
        if is_re_full(&self.tm, d) {
            return self.tm.mk_re_empty(sort);
        }
        if self.tm.is_re_dot_plus(d) {
            return self.tm.mk_re_epsilon(seq);
        }
        if let Some((c, t, e)) = as_ite(&self.tm, d) {
            let n1 = self.mk_antimirov_deriv_negate(t);
            let n2 = self.mk_antimirov_deriv_negate(e);
            return self.tm.mk_ite(c, n1, n2);
        }
        if let Some((t, e)) = as_re_union(&self.tm, d) {
            let n1 = self.mk_antimirov_deriv_negate(t);
            let n2 = self.mk_antimirov_deriv_negate(e);
            // The element is irrelevant for pure set combination.
            let tt = self.tm.mk_true();
            let seq_elem = self
                .tm
                .sorts
                .seq_elem(seq)
                .unwrap_or(self.tm.sorts.char_sort);
            let v = self.tm.element_var(seq_elem);
            return self.mk_antimirov_deriv_intersection(v, n1, n2, tt);
        }
        if let Some((t, e)) = as_re_inter(&self.tm, d) {
            let n1 = self.mk_antimirov_deriv_negate(t);
            let n2 = self.mk_antimirov_deriv_negate(e);
            return self.mk_antimirov_deriv_union(n1, n2);
        }
        if let Some(t) = as_complement(&self.tm, d) {
            return t;
        }
        self.tm.mk_re_complement(d)
    }

    fn mk_antimirov_deriv_union(&mut self, d1: TermId, d2: TermId) -> TermId {
        if let (Some((c1, t1, e1)), Some((c2, t2, e2))) =
            (as_ite(&self.tm, d1), as_ite(&self.tm, d2))
        {
            if c1 == c2 {
                let t = self.mk_antimirov_deriv_union(t1, t2);
                let e = self.mk_antimirov_deriv_union(e1, e2);
                return self.tm.mk_ite(c1, t, e);
            }
        }
        self.mk_regex_union_normalize(d1, d2)
    }

    /// Restrict the guards of the conditionals in `d` under `cond`,
    /// dropping branches that became infeasible.
    fn mk_antimirov_deriv_restrict(&mut self, e: TermId, d: TermId, cond: TermId) -> TermId {
        if self.tm.is_false(cond) {
            return self.tm.mk_re_empty(self.tm.sort(d));
        }
        if is_re_empty(&self.tm, d) || self.tm.is_true(cond) {
            return d;
        }
        if let Some((c, a, b)) = as_ite(&self.tm, d) {
            let cc = self.tm.mk_and2(cond, c);
            let path_and_c = self.simplify_path(e, cc);
            let nc = self.tm.mk_not(c);
            let cnc = self.tm.mk_and2(cond, nc);
            let path_and_notc = self.simplify_path(e, cnc);
            let a1 = self.mk_antimirov_deriv_restrict(e, a, path_and_c);
            let b1 = self.mk_antimirov_deriv_restrict(e, b, path_and_notc);
            return self.tm.mk_ite(c, a1, b1);
        }
        if let Some((a, b)) = as_re_union(&self.tm, d) {
            let a1 = self.mk_antimirov_deriv_restrict(e, a, cond);
            let b1 = self.mk_antimirov_deriv_restrict(e, b, cond);
            return self.mk_antimirov_deriv_union(a1, b1);
        }
        d
    }

    // ------------------------------------------------------------------
    // Path simplification
    // ------------------------------------------------------------------

    /// Simplify a path condition with respect to the derivative element.
    pub(crate) fn simplify_path(&mut self, elem: TermId, path: TermId) -> TermId {
        self.elim_condition(elem, path)
    }

    fn elim_condition(&mut self, elem: TermId, cond: TermId) -> TermId {
        let mut conds = Vec::new();
        self.tm.flatten_and(cond, &mut conds);
        let mut all_ranges = false;
        let mut conds_range: Vec<TermId> = Vec::new();
        if self.tm.sort(elem) == self.tm.sorts.char_sort {
            all_ranges = true;
            let mut ranges: Vec<(u32, u32)> = vec![(0, MAX_CHAR)];
            for &c in &conds {
                if let Some((lo, hi, negated)) = self.char_const_range(elem, c) {
                    if lo > hi {
                        if negated {
                            continue;
                        }
                        ranges.clear();
                    } else if negated {
                        exclude_range(&mut ranges, lo, hi);
                    } else {
                        intersect_ranges(&mut ranges, lo, hi);
                    }
                    conds_range.push(c);
                } else if self.tm.is_true(c) {
                    continue;
                } else if self.tm.is_false(c) {
                    ranges.clear();
                } else {
                    all_ranges = false;
                    break;
                }
                if ranges.is_empty() {
                    break;
                }
            }
            if all_ranges {
                if ranges.is_empty() {
                    return self.tm.mk_false();
                }
                // For an uninterpreted element the feasible non-empty range
                // set makes the condition an existential truth. The internal
                // element variable is not projected away; its conditions are
                // the BDD structure itself.
                if self.tm.is_var(elem) && !self.tm.is_element_var(elem) {
                    return self.tm.mk_true();
                }
                conds = conds_range;
            }
        }

        let mut solution = None;
        for &c in &conds {
            if let TermKind::Eq(lhs, rhs) = *self.tm.kind(c) {
                if lhs == elem {
                    solution = Some(rhs);
                    break;
                }
                if rhs == elem {
                    solution = Some(lhs);
                    break;
                }
            }
        }
        if let Some(v) = solution {
            let folded = self.tm.mk_and(conds.clone());
            let substituted = self.tm.substitute(folded, elem, v);
            if self.tm.is_var(elem) && !self.tm.is_element_var(elem) {
                return substituted;
            }
            let eq = self.tm.mk_eq(elem, v);
            return self.tm.mk_and2(eq, substituted);
        }
        self.tm.mk_and(conds)
    }

    /// Recognize a conjunct as a constant character range on `elem`;
    /// returns `(lo, hi, negated)`.
    fn char_const_range(&self, elem: TermId, c: TermId) -> Option<(u32, u32, bool)> {
        let (inner, negated) = match self.tm.as_not(c) {
            Some(i) => (i, true),
            None => (c, false),
        };
        match *self.tm.kind(inner) {
            TermKind::CharLe(a, b) => {
                if a == elem {
                    let hi = self.tm.char_value(b)?;
                    Some((0, hi, negated))
                } else if b == elem {
                    let lo = self.tm.char_value(a)?;
                    Some((lo, MAX_CHAR, negated))
                } else {
                    None
                }
            }
            TermKind::Eq(a, b) => {
                if a == elem {
                    let v = self.tm.char_value(b)?;
                    Some((v, v, negated))
                } else if b == elem {
                    let v = self.tm.char_value(a)?;
                    Some((v, v, negated))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Normal-form combination
    // ------------------------------------------------------------------

    /// Combine two normal-form regexes under a binary operation,
    /// preserving the BDD discipline; cached.
    pub(crate) fn mk_der_op(&mut self, k: DerOp, a: TermId, b: TermId) -> TermId {
        match k {
            DerOp::Inter => {
                if let Some(r) = self.mk_re_inter0(a, b) {
                    return r;
                }
            }
            DerOp::Union => {
                if let Some(r) = self.mk_re_union0(a, b) {
                    return r;
                }
            }
            DerOp::Concat => {
                if let Some(r) = self.mk_re_concat(a, b).term() {
                    return r;
                }
            }
            DerOp::AntimirovUnion => {}
        }
        if let Some(cached) = self.cache.find(k.cache_op(), a, Some(b), None) {
            self.stats.cache_hits += 1;
            return cached;
        }
        self.stats.cache_misses += 1;
        let result = self.mk_der_op_rec(k, a, b);
        self.cache.insert(k.cache_op(), a, Some(b), None, result);
        debug_assert!(self.check_deriv_normal_form(result));
        result
    }

    fn mk_der_op_rec(&mut self, k: DerOp, a: TermId, b: TermId) -> TermId {
        let mut k = k;
        // A union with an Antimirov operand lifts to an Antimirov union so
        // the tagged nodes stay above every BDD.
        if k == DerOp::Union
            && (as_antimirov_union(&self.tm, a).is_some()
                || as_antimirov_union(&self.tm, b).is_some())
        {
            k = DerOp::AntimirovUnion;
        }
        if k == DerOp::AntimirovUnion {
            return self.tm.mk_re_antimirov_union(a, b);
        }
        if let Some((a1, a2)) = as_antimirov_union(&self.tm, a) {
            let r1 = self.mk_der_op(k, a1, b);
            let r2 = self.mk_der_op(k, a2, b);
            return self.tm.mk_re_antimirov_union(r1, r2);
        }
        if let Some((b1, b2)) = as_antimirov_union(&self.tm, b) {
            let r1 = self.mk_der_op(k, a, b1);
            let r2 = self.mk_der_op(k, a, b2);
            return self.tm.mk_re_antimirov_union(r1, r2);
        }
        if let Some((ca, a1, a2)) = as_ite(&self.tm, a) {
            let mut r1 = None;
            let mut r2 = None;
            let (mut a, mut b) = (a, b);
            let (mut ca, mut a1, mut a2) = (ca, a1, a2);
            if let Some((cb, b1, b2)) = as_ite(&self.tm, b) {
                if ca == cb {
                    let t = self.mk_der_op(k, a1, b1);
                    let e = self.mk_der_op(k, a2, b2);
                    return self.tm.mk_ite(ca, t, e);
                }
                let is_symmetric = k == DerOp::Union || k == DerOp::Inter;
                let (mut cb, mut b1, mut b2) = (cb, b1, b2);
                if is_symmetric && self.cond_order_id(ca) < self.cond_order_id(cb) {
                    std::mem::swap(&mut a, &mut b);
                    std::mem::swap(&mut ca, &mut cb);
                    std::mem::swap(&mut a1, &mut b1);
                    std::mem::swap(&mut a2, &mut b2);
                }
                let notca = self.tm.mk_not(ca);
                let notcb = self.tm.mk_not(cb);
                if self.pred_implies(ca, cb) {
                    r1 = Some(self.mk_der_op(k, a1, b1));
                } else if self.pred_implies(ca, notcb) {
                    r1 = Some(self.mk_der_op(k, a1, b2));
                }
                if self.pred_implies(notca, cb) {
                    r2 = Some(self.mk_der_op(k, a2, b1));
                } else if self.pred_implies(notca, notcb) {
                    r2 = Some(self.mk_der_op(k, a2, b2));
                }
            }
            let r1 = match r1 {
                Some(r) => r,
                None => self.mk_der_op(k, a1, b),
            };
            let r2 = match r2 {
                Some(r) => r,
                None => self.mk_der_op(k, a2, b),
            };
            return self.tm.mk_ite(ca, r1, r2);
        }
        if let Some((cb, b1, b2)) = as_ite(&self.tm, b) {
            let r1 = self.mk_der_op(k, a, b1);
            let r2 = self.mk_der_op(k, a, b2);
            return self.tm.mk_ite(cb, r1, r2);
        }
        match k {
            DerOp::Inter => self.mk_regex_inter_normalize(a, b),
            DerOp::Union => self.mk_regex_union_normalize(a, b),
            DerOp::Concat => match self.mk_re_concat(a, b).term() {
                Some(r) => r,
                None => self.tm.mk_re_concat(a, b),
            },
            DerOp::AntimirovUnion => unreachable!(),
        }
    }

    /// Complement of a normal-form regex; cached.
    pub(crate) fn mk_der_compl(&mut self, r: TermId) -> TermId {
        if let Some(cached) = self.cache.find(CacheOp::DerComplement, r, None, None) {
            self.stats.cache_hits += 1;
            return cached;
        }
        self.stats.cache_misses += 1;
        let result = if let Some((r1, r2)) = as_antimirov_union(&self.tm, r) {
            // De Morgan: the tagged union becomes an intersection, losing
            // the Antimirov layer.
            let c1 = self.mk_der_compl(r1);
            let c2 = self.mk_der_compl(r2);
            self.mk_der_op(DerOp::Inter, c1, c2)
        } else if let Some((c, r1, r2)) = as_ite(&self.tm, r) {
            let n1 = self.mk_der_compl(r1);
            let n2 = self.mk_der_compl(r2);
            self.tm.mk_ite(c, n1, n2)
        } else {
            match self.mk_re_complement(r).term() {
                Some(result) => result,
                None => self.tm.mk_re_complement(r),
            }
        };
        self.cache.insert(CacheOp::DerComplement, r, None, None, result);
        debug_assert!(self.check_deriv_normal_form(result));
        result
    }

    /// Normalize an arbitrary branch condition into the canonical BDD form
    /// built from `char ≤` constraints.
    pub(crate) fn mk_der_cond(&mut self, cond: TermId, ele: TermId, seq_sort: SortId) -> TermId {
        let kind = self.tm.kind(cond).clone();
        match kind {
            TermKind::Eq(ch1, ch2) if self.tm.sort(ch1) == self.tm.sorts.char_sort => {
                let le1 = self.tm.mk_char_le(ch1, ch2);
                let r1 = self.mk_der_cond(le1, ele, seq_sort);
                let le2 = self.tm.mk_char_le(ch2, ch1);
                let r2 = self.mk_der_cond(le2, ele, seq_sort);
                self.mk_der_op(DerOp::Inter, r1, r2)
            }
            TermKind::CharLe(ch1, ch2) if ch2 == ele && self.tm.char_value(ch1).is_some() => {
                let ch = self.tm.char_value(ch1).unwrap_or(0);
                if ch > 0 {
                    let below = self.tm.mk_char(ch - 1);
                    let le = self.tm.mk_char_le(ele, below);
                    let pred = self.re_predicate(le, seq_sort);
                    self.mk_der_compl(pred)
                } else {
                    let t = self.tm.mk_true();
                    self.re_predicate(t, seq_sort)
                }
            }
            TermKind::Not(c1) => {
                let inner = self.mk_der_cond(c1, ele, seq_sort);
                self.mk_der_compl(inner)
            }
            TermKind::And(cs) => {
                let mut iter = cs.into_iter();
                let first = match iter.next() {
                    Some(c) => self.mk_der_cond(c, ele, seq_sort),
                    None => {
                        let t = self.tm.mk_true();
                        return self.re_predicate(t, seq_sort);
                    }
                };
                iter.fold(first, |acc, c| {
                    let rc = self.mk_der_cond(c, ele, seq_sort);
                    self.mk_der_op(DerOp::Inter, acc, rc)
                })
            }
            TermKind::Or(cs) => {
                let mut iter = cs.into_iter();
                let first = match iter.next() {
                    Some(c) => self.mk_der_cond(c, ele, seq_sort),
                    None => {
                        let f = self.tm.mk_false();
                        return self.re_predicate(f, seq_sort);
                    }
                };
                iter.fold(first, |acc, c| {
                    let rc = self.mk_der_cond(c, ele, seq_sort);
                    self.mk_der_op(DerOp::Union, acc, rc)
                })
            }
            _ => self.re_predicate(cond, seq_sort),
        }
    }

    /// Ordering key for BDD conditions: the character code when the
    /// condition is `ele ≤ c`, the (complement-folded) term id otherwise.
    fn cond_order_id(&self, cond: TermId) -> u32 {
        if let TermKind::CharLe(_, ch2) = *self.tm.kind(cond) {
            if let Some(c) = self.tm.char_value(ch2) {
                return c;
            }
        }
        let stripped = self.tm.as_not(cond).unwrap_or(cond);
        stripped.raw()
    }

    fn lt_char(&self, c1: TermId, c2: TermId) -> bool {
        matches!(
            (self.tm.char_value(c1), self.tm.char_value(c2)),
            (Some(a), Some(b)) if a < b
        )
    }

    fn le_char(&self, c1: TermId, c2: TermId) -> bool {
        c1 == c2 || self.lt_char(c1, c2)
    }

    /// Sound, partial implication on the simple character predicates that
    /// appear as BDD conditions.
    fn pred_implies(&self, a: TermId, b: TermId) -> bool {
        match (self.tm.as_not(a), self.tm.as_not(b)) {
            (Some(na), Some(nb)) => return self.pred_implies(nb, na),
            _ => {}
        }
        let as_le = |t: TermId| match *self.tm.kind(t) {
            TermKind::CharLe(x, y) => Some((x, y)),
            _ => None,
        };
        if let (Some((a1, a2)), Some((b1, b2))) = (as_le(a), as_le(b)) {
            return self.le_char(b1, a1) && self.le_char(a2, b2);
        }
        if let (Some((a1, a2)), Some(nb)) = (as_le(a), self.tm.as_not(b)) {
            if let Some((b1, b2)) = as_le(nb) {
                return (self.le_char(b2, a1) && self.lt_char(a2, b1))
                    || (self.lt_char(b2, a1) && self.le_char(a2, b1));
            }
        }
        if let (Some((b1, b2)), Some(na)) = (as_le(b), self.tm.as_not(a)) {
            if let Some((a1, a2)) = as_le(na) {
                return self.le_char(b1, a2) && self.le_char(a1, b2);
            }
        }
        false
    }

    // ------------------------------------------------------------------
    // Normal-form checking
    // ------------------------------------------------------------------

    /// Structural check of the derivative normal form: no `diff`, `opt`,
    /// `plus` nodes (apart from the `Σ+` constant); Antimirov unions only
    /// above `ite`s; `ite`s only above leaves.
    pub fn check_deriv_normal_form(&self, r: TermId) -> bool {
        self.check_deriv_normal_form_rec(r, 3)
    }

    fn check_deriv_normal_form_rec(&self, r: TermId, level: u8) -> bool {
        let tm = &self.tm;
        let new_level = if as_antimirov_union(tm, r).is_some() {
            if level < 2 {
                return false;
            }
            2
        } else if as_ite(tm, r).is_some() {
            if level < 1 {
                return false;
            }
            1
        } else {
            0
        };
        match *tm.kind(r) {
            TermKind::ReDiff(..) | TermKind::ReOpt(_) => return false,
            TermKind::RePlus(_) if !tm.is_re_dot_plus(r) => return false,
            _ => {}
        }
        match *tm.kind(r) {
            TermKind::ReAntimirovUnion(r1, r2)
            | TermKind::ReConcat(r1, r2)
            | TermKind::ReUnion(r1, r2)
            | TermKind::ReInter(r1, r2) => {
                self.check_deriv_normal_form_rec(r1, new_level)
                    && self.check_deriv_normal_form_rec(r2, new_level)
            }
            TermKind::Ite(_, r1, r2) => {
                self.check_deriv_normal_form_rec(r1, new_level)
                    && self.check_deriv_normal_form_rec(r2, new_level)
            }
            TermKind::ReStar(r1) | TermKind::ReComplement(r1) | TermKind::ReLoop(r1, _, _) => {
                self.check_deriv_normal_form_rec(r1, new_level)
            }
            TermKind::ReReverse(r1) => as_to_re(tm, r1).is_some(),
            _ => true,
        }
    }

    /// Quick nullability reading for ground regexes.
    pub(crate) fn nullable_value(&mut self, r: TermId) -> Lbool {
        match re_nullable_hint(&self.tm, r) {
            Lbool::Undef => {
                let n = self.is_nullable(r);
                match self.tm.bool_value(n) {
                    Some(true) => Lbool::True,
                    Some(false) => Lbool::False,
                    None => Lbool::Undef,
                }
            }
            v => v,
        }
    }
}

fn unit_string_char(rw: &mut SeqRewriter, s: TermId) -> Option<TermId> {
    match rw.tm.kind(s).clone() {
        TermKind::Str(z) if z.len() == 1 => Some(rw.tm.mk_char(z.at(0))),
        TermKind::SeqUnit(c) => Some(c),
        _ => None,
    }
}

/// Intersect the sorted disjoint range set with `[lo, hi]`.
fn intersect_ranges(ranges: &mut Vec<(u32, u32)>, lo: u32, hi: u32) {
    let mut out = Vec::with_capacity(ranges.len());
    for &(lo1, hi1) in ranges.iter() {
        if hi < lo1 {
            break;
        }
        if hi1 >= lo {
            out.push((u32::max(lo1, lo), u32::min(hi1, hi)));
        }
    }
    *ranges = out;
}

/// Remove `[lo, hi]` from the range set.
fn exclude_range(ranges: &mut Vec<(u32, u32)>, lo: u32, hi: u32) {
    debug_assert!(lo <= hi);
    if lo == 0 {
        if hi == MAX_CHAR {
            ranges.clear();
        } else {
            intersect_ranges(ranges, hi + 1, MAX_CHAR);
        }
    } else if hi == MAX_CHAR {
        intersect_ranges(ranges, 0, lo - 1);
    } else {
        let mut upper = ranges.clone();
        intersect_ranges(ranges, 0, lo - 1);
        intersect_ranges(&mut upper, hi + 1, MAX_CHAR);
        ranges.append(&mut upper);
        ranges.sort_unstable();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;
    use crate::rewriter::SeqRewriterConfig;

    fn rw() -> SeqRewriter {
        SeqRewriter::new(TermManager::new(), SeqRewriterConfig::default())
    }

    #[test]
    fn test_nullable_basics() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("ab");
        let r = rw.tm_mut().mk_to_re(s);
        let n = rw.is_nullable(r);
        assert!(rw.tm().is_false(n));
        let star = rw.tm_mut().mk_re_star(r);
        let n = rw.is_nullable(star);
        assert!(rw.tm().is_true(n));
        let __string_sort = rw.tm().sorts.string_sort;
        let eps = rw.tm_mut().mk_re_epsilon(__string_sort);
        let n = rw.is_nullable(eps);
        assert!(rw.tm().is_true(n));
    }

    #[test]
    fn test_derivative_of_literal() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("ab");
        let r = rw.tm_mut().mk_to_re(s);
        let a = rw.tm_mut().mk_char('a' as u32);
        let d = rw.mk_derivative(a, r);
        let b = rw.tm_mut().mk_str_s("b");
        let expect = rw.tm_mut().mk_to_re(b);
        assert_eq!(d, expect);
        // A distinct character kills the language.
        let z = rw.tm_mut().mk_char('z' as u32);
        let d = rw.mk_derivative(z, r);
        assert!(is_re_empty(rw.tm(), d));
    }

    #[test]
    fn test_derivative_of_star() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r0 = rw.tm_mut().mk_to_re(s);
        let star = rw.tm_mut().mk_re_star(r0);
        let a = rw.tm_mut().mk_char('a' as u32);
        let d = rw.mk_derivative(a, star);
        // D(a, a*) = ε · a* = a*
        assert_eq!(d, star);
        let n = rw.is_nullable(d);
        assert!(rw.tm().is_true(n));
    }

    #[test]
    fn test_derivative_of_union() {
        let mut rw = rw();
        let sa = rw.tm_mut().mk_str_s("ax");
        let sb = rw.tm_mut().mk_str_s("by");
        let ra = rw.tm_mut().mk_to_re(sa);
        let rb = rw.tm_mut().mk_to_re(sb);
        let u = rw.tm_mut().mk_re_union(ra, rb);
        let a = rw.tm_mut().mk_char('a' as u32);
        let d = rw.mk_derivative(a, u);
        let x = rw.tm_mut().mk_str_s("x");
        let expect = rw.tm_mut().mk_to_re(x);
        assert_eq!(d, expect);
    }

    #[test]
    fn test_derivative_of_range() {
        let mut rw = rw();
        let lo = rw.tm_mut().mk_str_s("a");
        let hi = rw.tm_mut().mk_str_s("f");
        let r = rw.tm_mut().mk_re_range(lo, hi);
        let c = rw.tm_mut().mk_char('c' as u32);
        let d = rw.mk_derivative(c, r);
        assert!(rw.tm().is_re_epsilon(d));
        let z = rw.tm_mut().mk_char('z' as u32);
        let d = rw.mk_derivative(z, r);
        assert!(is_re_empty(rw.tm(), d));
    }

    #[test]
    fn test_derivative_symbolic_element_keeps_guard() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("ab");
        let r = rw.tm_mut().mk_to_re(s);
        let __char_sort = rw.tm().sorts.char_sort;
        let e = rw.tm_mut().mk_var("e", __char_sort);
        let d = rw.mk_derivative(e, r);
        // ite(e = 'a', to_re("b"), ∅)
        let (c, th, el) = as_ite(rw.tm(), d).unwrap();
        assert!(matches!(*rw.tm().kind(c), TermKind::Eq(..)));
        let b = rw.tm_mut().mk_str_s("b");
        let expect = rw.tm_mut().mk_to_re(b);
        assert_eq!(th, expect);
        assert!(is_re_empty(rw.tm(), el));
        assert!(rw.check_deriv_normal_form(d));
    }

    #[test]
    fn test_derivative_of_concat_with_nullable_head() {
        let mut rw = rw();
        let sa = rw.tm_mut().mk_str_s("a");
        let ra = rw.tm_mut().mk_to_re(sa);
        let star = rw.tm_mut().mk_re_star(ra);
        let sb = rw.tm_mut().mk_str_s("b");
        let rb = rw.tm_mut().mk_to_re(sb);
        let cat = rw.tm_mut().mk_re_concat(star, rb);
        // D(b, a*·b) must include ε through the nullable head.
        let b = rw.tm_mut().mk_char('b' as u32);
        let d = rw.mk_derivative(b, cat);
        let n = rw.is_nullable(d);
        assert!(rw.tm().is_true(n));
        // D(a, a*·b) = a*·b
        let a = rw.tm_mut().mk_char('a' as u32);
        let d = rw.mk_derivative(a, cat);
        let n = rw.is_nullable(d);
        assert!(rw.tm().is_false(n));
    }

    #[test]
    fn test_elim_condition_ranges() {
        let mut rw = rw();
        let __char_sort = rw.tm().sorts.char_sort;
        let elem = rw.tm_mut().mk_var("e", __char_sort);
        let c10 = rw.tm_mut().mk_char(10);
        let c5 = rw.tm_mut().mk_char(5);
        // e <= 10 && !(e <= 5): feasible for an uninterpreted element.
        let le10 = rw.tm_mut().mk_char_le(elem, c10);
        let le5 = rw.tm_mut().mk_char_le(elem, c5);
        let nle5 = rw.tm_mut().mk_not(le5);
        let cond = rw.tm_mut().mk_and2(le10, nle5);
        let s = rw.simplify_path(elem, cond);
        assert!(rw.tm().is_true(s));
        // e <= 5 && !(e <= 10): infeasible.
        let nle10 = rw.tm_mut().mk_not(le10);
        let cond = rw.tm_mut().mk_and2(le5, nle10);
        let s = rw.simplify_path(elem, cond);
        assert!(rw.tm().is_false(s));
    }

    #[test]
    fn test_der_op_merges_same_condition() {
        let mut rw = rw();
        let seq = rw.tm().sorts.string_sort;
        let __char_sort = rw.tm().sorts.char_sort;
        let elem = rw.tm_mut().mk_var("e", __char_sort);
        let c = rw.tm_mut().mk_char('a' as u32);
        let le = rw.tm_mut().mk_char_le(elem, c);
        let p1 = rw.re_predicate(le, seq);
        let p2 = rw.re_predicate(le, seq);
        let r = rw.mk_der_op(DerOp::Inter, p1, p2);
        assert_eq!(r, p1);
        assert!(rw.check_deriv_normal_form(r));
    }

    #[test]
    fn test_der_cond_low_bound() {
        let mut rw = rw();
        let seq = rw.tm().sorts.string_sort;
        let __char_sort = rw.tm().sorts.char_sort;
        let elem = rw.tm_mut().mk_var("e", __char_sort);
        let zero_ch = rw.tm_mut().mk_char(0);
        let cond = rw.tm_mut().mk_char_le(zero_ch, elem);
        // 0 <= e is trivially true.
        let r = rw.mk_der_cond(cond, elem, seq);
        assert!(rw.tm().is_re_epsilon(r));
    }

    #[test]
    fn test_range_exclusion() {
        let mut ranges = vec![(0u32, MAX_CHAR)];
        exclude_range(&mut ranges, 5, 10);
        assert_eq!(ranges, vec![(0, 4), (11, MAX_CHAR)]);
        intersect_ranges(&mut ranges, 0, 20);
        assert_eq!(ranges, vec![(0, 4), (11, 20)]);
        exclude_range(&mut ranges, 0, 20);
        assert!(ranges.is_empty());
    }
}
