//! Regex rewriting and normalization.
//!
//! Construction-level cascades for the regex operators, the ordered-set
//! merge discipline for unions and intersections, the sound-but-partial
//! subset test, reversal, and the emptiness reduction used by regex
//! equalities.

use crate::ast::{Lbool, TermId, TermKind, TermManager};
use crate::length::{min_length1, re_min_length, re_nullable_hint};
use crate::rewriter::{RewriteResult, SeqRewriter};

/// Which of the two set-like regex operators is being merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SetOp {
    Union,
    Inter,
}

// Small recognizers shared by the regex, derivative, and membership code.

pub(crate) fn is_re_empty(tm: &TermManager, t: TermId) -> bool {
    matches!(tm.kind(t), TermKind::ReEmpty(_))
}

pub(crate) fn is_re_full(tm: &TermManager, t: TermId) -> bool {
    matches!(tm.kind(t), TermKind::ReFull(_))
}

pub(crate) fn is_re_allchar(tm: &TermManager, t: TermId) -> bool {
    matches!(tm.kind(t), TermKind::ReAllChar(_))
}

pub(crate) fn as_to_re(tm: &TermManager, t: TermId) -> Option<TermId> {
    match tm.kind(t) {
        TermKind::ToRe(s) => Some(*s),
        _ => None,
    }
}

pub(crate) fn as_star(tm: &TermManager, t: TermId) -> Option<TermId> {
    match tm.kind(t) {
        TermKind::ReStar(r) => Some(*r),
        _ => None,
    }
}

pub(crate) fn as_complement(tm: &TermManager, t: TermId) -> Option<TermId> {
    match tm.kind(t) {
        TermKind::ReComplement(r) => Some(*r),
        _ => None,
    }
}

pub(crate) fn as_re_concat(tm: &TermManager, t: TermId) -> Option<(TermId, TermId)> {
    match tm.kind(t) {
        TermKind::ReConcat(a, b) => Some((*a, *b)),
        _ => None,
    }
}

pub(crate) fn as_re_union(tm: &TermManager, t: TermId) -> Option<(TermId, TermId)> {
    match tm.kind(t) {
        TermKind::ReUnion(a, b) => Some((*a, *b)),
        _ => None,
    }
}

pub(crate) fn as_re_inter(tm: &TermManager, t: TermId) -> Option<(TermId, TermId)> {
    match tm.kind(t) {
        TermKind::ReInter(a, b) => Some((*a, *b)),
        _ => None,
    }
}

pub(crate) fn as_antimirov_union(tm: &TermManager, t: TermId) -> Option<(TermId, TermId)> {
    match tm.kind(t) {
        TermKind::ReAntimirovUnion(a, b) => Some((*a, *b)),
        _ => None,
    }
}

pub(crate) fn as_loop(tm: &TermManager, t: TermId) -> Option<(TermId, u32, Option<u32>)> {
    match tm.kind(t) {
        TermKind::ReLoop(r, lo, hi) => Some((*r, *lo, *hi)),
        _ => None,
    }
}

pub(crate) fn as_ite(tm: &TermManager, t: TermId) -> Option<(TermId, TermId, TermId)> {
    match tm.kind(t) {
        TermKind::Ite(c, a, b) => Some((*c, *a, *b)),
        _ => None,
    }
}

/// Ordering key for the set merge: a complement compares as its body, so a
/// term and its complement collide and annihilate.
fn stable_id(tm: &TermManager, t: TermId) -> u32 {
    match as_complement(tm, t) {
        Some(inner) => inner.raw(),
        None => t.raw(),
    }
}

impl SeqRewriter {
    /// `to_re` has no construction-level rules of its own.
    pub(crate) fn mk_str_to_regexp(&mut self, _a: TermId) -> RewriteResult {
        RewriteResult::Failed
    }

    /// True iff one term is the complement of the other.
    pub(crate) fn are_complements(&self, r1: TermId, r2: TermId) -> bool {
        as_complement(&self.tm, r1) == Some(r2) || as_complement(&self.tm, r2) == Some(r1)
    }

    // ------------------------------------------------------------------
    // Concatenation
    // ------------------------------------------------------------------

    /// Regex concatenation cascade.
    pub(crate) fn mk_re_concat(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let tm = &self.tm;
        if is_re_full(tm, a) && is_re_full(tm, b) {
            return RewriteResult::Done(a);
        }
        if is_re_empty(tm, a) {
            return RewriteResult::Done(a);
        }
        if is_re_empty(tm, b) {
            return RewriteResult::Done(b);
        }
        if tm.is_re_epsilon(a) {
            return RewriteResult::Done(b);
        }
        if tm.is_re_epsilon(b) {
            return RewriteResult::Done(a);
        }
        if is_re_allchar(tm, a) && is_re_full(tm, b) {
            let r = self.tm.mk_re_plus(a);
            return RewriteResult::Done(r);
        }
        if is_re_allchar(tm, b) && is_re_full(tm, a) {
            let r = self.tm.mk_re_plus(b);
            return RewriteResult::Done(r);
        }
        if let (Some(sa), Some(sb)) = (self.lift_str_from_to_re(a), self.lift_str_from_to_re(b)) {
            let s = self.mk_seq_concat_rw(sa, sb);
            let r = self.tm.mk_to_re(s);
            return RewriteResult::Rewrite2(r);
        }
        let tm = &self.tm;
        if let (Some(a1), Some(b1)) = (as_star(tm, a), as_star(tm, b)) {
            if a1 == b1 {
                return RewriteResult::Done(a);
            }
        }
        if let Some(a1) = as_star(tm, a) {
            if a1 == b {
                let r = self.tm.mk_re_concat(b, a);
                return RewriteResult::Done(r);
            }
        }
        if let (Some((a1, lo1, Some(hi1))), Some((b1, lo2, Some(hi2)))) =
            (as_loop(tm, a), as_loop(tm, b))
        {
            if lo1 <= hi1 && lo2 <= hi2 && a1 == b1 {
                let r = self.tm.mk_re_loop(a1, lo1 + lo2, Some(hi1 + hi2));
                return RewriteResult::Done(r);
            }
        }
        if let (Some((a1, lo1, None)), Some((b1, lo2, None))) = (as_loop(tm, a), as_loop(tm, b)) {
            if a1 == b1 {
                let r = self.tm.mk_re_loop(a1, lo1 + lo2, None);
                return RewriteResult::Done(r);
            }
        }
        let mut x = a;
        let mut y = b;
        for _ in 0..2 {
            let tm = &self.tm;
            if let (Some((x1, lo1, None)), Some((y1, lo2, Some(hi2)))) =
                (as_loop(tm, x), as_loop(tm, y))
            {
                if lo2 <= hi2 && x1 == y1 {
                    let r = self.tm.mk_re_loop(x1, lo1 + lo2, None);
                    return RewriteResult::Done(r);
                }
            }
            let tm = &self.tm;
            if let (Some((x1, lo1, Some(hi1))), Some(y1)) = (as_loop(tm, x), as_star(tm, y)) {
                if lo1 <= hi1 && x1 == y1 {
                    let r = self.tm.mk_re_loop(x1, lo1, None);
                    return RewriteResult::Done(r);
                }
            }
            let tm = &self.tm;
            if let (Some((x1, lo1, None)), Some(y1)) = (as_loop(tm, x), as_star(tm, y)) {
                if x1 == y1 {
                    let r = self.tm.mk_re_loop(x1, lo1, None);
                    return RewriteResult::Done(r);
                }
            }
            let tm = &self.tm;
            if let Some((x1, lo1, Some(hi1))) = as_loop(tm, x) {
                if lo1 <= hi1 && x1 == y {
                    let r = self.tm.mk_re_loop(x1, lo1 + 1, Some(hi1 + 1));
                    return RewriteResult::Done(r);
                }
            }
            std::mem::swap(&mut x, &mut y);
        }
        RewriteResult::Failed
    }

    /// Concatenation, rewritten when possible and structural otherwise,
    /// kept in right-associative form.
    pub(crate) fn mk_regex_concat(&mut self, r: TermId, s: TermId) -> TermId {
        let tm = &self.tm;
        if tm.is_re_epsilon(r) || is_re_empty(tm, s) {
            return s;
        }
        if tm.is_re_epsilon(s) || is_re_empty(tm, r) {
            return r;
        }
        if is_re_full(tm, r) && is_re_full(tm, s) {
            return r;
        }
        if (is_re_allchar(tm, r) && is_re_full(tm, s))
            || (is_re_full(tm, r) && is_re_allchar(tm, s))
        {
            let sort = self.tm.sort(r);
            let all = self.tm.mk_re_allchar(sort);
            return self.tm.mk_re_plus(all);
        }
        if let Some((r1, r2)) = as_re_concat(&self.tm, r) {
            let tail = self.mk_regex_concat(r2, s);
            return self.mk_regex_concat(r1, tail);
        }
        self.tm.mk_re_concat(r, s)
    }

    // ------------------------------------------------------------------
    // Union / intersection / difference / complement
    // ------------------------------------------------------------------

    /// Pre-simplification of unions, cheap cases only.
    pub(crate) fn mk_re_union0(&mut self, a: TermId, b: TermId) -> Option<TermId> {
        let tm = &self.tm;
        if a == b || is_re_empty(tm, b) || is_re_full(tm, a) {
            return Some(a);
        }
        if is_re_empty(tm, a) || is_re_full(tm, b) {
            return Some(b);
        }
        if as_star(tm, a).is_some() && tm.is_re_epsilon(b) {
            return Some(a);
        }
        if as_star(tm, b).is_some() && tm.is_re_epsilon(a) {
            return Some(b);
        }
        None
    }

    /// Pre-simplification of intersections, cheap cases only.
    pub(crate) fn mk_re_inter0(&mut self, a: TermId, b: TermId) -> Option<TermId> {
        let tm = &self.tm;
        if a == b || is_re_empty(tm, a) || is_re_full(tm, b) {
            return Some(a);
        }
        if is_re_empty(tm, b) || is_re_full(tm, a) {
            return Some(b);
        }
        None
    }

    /// Normalized union.
    pub(crate) fn mk_re_union(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let r = self.mk_regex_union_normalize(a, b);
        RewriteResult::Done(r)
    }

    /// Normalized intersection.
    pub(crate) fn mk_re_inter(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let r = self.mk_regex_inter_normalize(a, b);
        RewriteResult::Done(r)
    }

    /// `a \ b  =  a ∩ ¬b`.
    pub(crate) fn mk_re_diff(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let nb = self.tm.mk_re_complement(b);
        let r = self.mk_regex_inter_normalize(a, nb);
        RewriteResult::Rewrite2(r)
    }

    /// Complement cascade: de Morgan, involution, constants.
    pub(crate) fn mk_re_complement(&mut self, a: TermId) -> RewriteResult {
        let tm = &self.tm;
        if let Some((e1, e2)) = as_re_inter(tm, a) {
            let c1 = self.tm.mk_re_complement(e1);
            let c2 = self.tm.mk_re_complement(e2);
            let r = self.tm.mk_re_union(c1, c2);
            return RewriteResult::Rewrite2(r);
        }
        if let Some((e1, e2)) = as_re_union(tm, a) {
            let c1 = self.tm.mk_re_complement(e1);
            let c2 = self.tm.mk_re_complement(e2);
            let r = self.tm.mk_re_inter(c1, c2);
            return RewriteResult::Rewrite2(r);
        }
        if is_re_empty(tm, a) {
            let sort = self.tm.sort(a);
            let r = self.tm.mk_re_full(sort);
            return RewriteResult::Done(r);
        }
        if is_re_full(tm, a) {
            let sort = self.tm.sort(a);
            let r = self.tm.mk_re_empty(sort);
            return RewriteResult::Done(r);
        }
        if let Some(e1) = as_complement(tm, a) {
            return RewriteResult::Done(e1);
        }
        if self.tm.is_re_epsilon(a) {
            let sort = self.tm.sort(a);
            let all = self.tm.mk_re_allchar(sort);
            let r = self.tm.mk_re_plus(all);
            return RewriteResult::Done(r);
        }
        RewriteResult::Failed
    }

    /// Normalized union, merging the operand chains as ordered sets.
    pub(crate) fn mk_regex_union_normalize(&mut self, r1: TermId, r2: TermId) -> TermId {
        debug_assert!(self.tm.sorts.is_re(self.tm.sort(r1)));
        let tm = &self.tm;
        if r1 == r2 || is_re_empty(tm, r2) || is_re_full(tm, r1) {
            return r1;
        }
        if is_re_empty(tm, r1) || is_re_full(tm, r2) {
            return r2;
        }
        if tm.is_re_dot_plus(r1) && re_min_length(tm, r2) > 0 {
            return r1;
        }
        if tm.is_re_dot_plus(r2) && re_min_length(tm, r1) > 0 {
            return r2;
        }
        let sort = self.tm.sort(r1);
        let unit = self.tm.mk_re_full(sort);
        self.merge_regex_sets(r1, r2, unit, SetOp::Union)
    }

    /// Normalized intersection, dual to the union normalizer, with the
    /// ε shortcuts through nullability.
    pub(crate) fn mk_regex_inter_normalize(&mut self, r1: TermId, r2: TermId) -> TermId {
        debug_assert!(self.tm.sorts.is_re(self.tm.sort(r1)));
        let (mut r1, mut r2) = (r1, r2);
        if self.tm.is_re_epsilon(r2) {
            std::mem::swap(&mut r1, &mut r2);
        }
        let tm = &self.tm;
        if r1 == r2 || is_re_empty(tm, r1) || is_re_full(tm, r2) {
            return r1;
        }
        if is_re_empty(tm, r2) || is_re_full(tm, r1) {
            return r2;
        }
        if tm.is_re_epsilon(r1) {
            match re_nullable_hint(tm, r2) {
                Lbool::True => return r1,
                Lbool::False => {
                    let sort = self.tm.sort(r1);
                    return self.tm.mk_re_empty(sort);
                }
                Lbool::Undef => {
                    let sort = self.tm.sort(r1);
                    let unit = self.tm.mk_re_empty(sort);
                    return self.merge_regex_sets(r1, r2, unit, SetOp::Inter);
                }
            }
        }
        if tm.is_re_dot_plus(r1) && re_min_length(tm, r2) > 0 {
            return r2;
        }
        if tm.is_re_dot_plus(r2) && re_min_length(tm, r1) > 0 {
            return r1;
        }
        let sort = self.tm.sort(r1);
        let unit = self.tm.mk_re_empty(sort);
        self.merge_regex_sets(r1, r2, unit, SetOp::Inter)
    }

    fn set_decompose(&self, op: SetOp, t: TermId) -> Option<(TermId, TermId)> {
        match op {
            SetOp::Union => as_re_union(&self.tm, t),
            SetOp::Inter => as_re_inter(&self.tm, t),
        }
    }

    fn set_compose(&mut self, op: SetOp, a: TermId, b: TermId) -> TermId {
        match op {
            SetOp::Union => {
                if self.is_subset(a, b) {
                    b
                } else if self.is_subset(b, a) {
                    a
                } else {
                    self.tm.mk_re_union(a, b)
                }
            }
            SetOp::Inter => {
                if self.is_subset(a, b) {
                    a
                } else if self.is_subset(b, a) {
                    b
                } else {
                    self.tm.mk_re_inter(a, b)
                }
            }
        }
    }

    /// Merge two operand chains of a commutative, associative, idempotent
    /// operator into one ordered chain. `unit` is the operator's
    /// annihilator (`Σ*` for union, `∅` for intersection), produced when a
    /// term meets its complement.
    fn merge_regex_sets(&mut self, r1: TermId, r2: TermId, unit: TermId, op: SetOp) -> TermId {
        let mut prefix: Vec<TermId> = Vec::new();
        let mut ar = r1;
        let mut br = r2;
        let compose_result = |this: &mut Self, prefix: &mut Vec<TermId>, suffix: TermId| {
            let mut result = suffix;
            while let Some(p) = prefix.pop() {
                result = this.set_compose(op, p, result);
            }
            result
        };
        loop {
            if ar == br {
                return compose_result(self, &mut prefix, ar);
            }
            if self.are_complements(ar, br) {
                return unit;
            }
            if self.set_decompose(op, br).is_some() && self.set_decompose(op, ar).is_none() {
                std::mem::swap(&mut ar, &mut br);
            }
            if let Some((b, br1)) = self.set_decompose(op, br) {
                let Some((a, ar1)) = self.set_decompose(op, ar) else { unreachable!() };
                if self.are_complements(a, b) {
                    return unit;
                }
                if a == b {
                    prefix.push(a);
                    ar = ar1;
                    br = br1;
                } else if stable_id(&self.tm, a) < stable_id(&self.tm, b) {
                    prefix.push(a);
                    ar = ar1;
                } else {
                    prefix.push(b);
                    br = br1;
                }
                continue;
            }
            if let Some((a, ar1)) = self.set_decompose(op, ar) {
                if self.are_complements(a, br) {
                    return unit;
                }
                if a == br {
                    return compose_result(self, &mut prefix, ar);
                }
                if stable_id(&self.tm, a) < stable_id(&self.tm, br) {
                    prefix.push(a);
                    ar = ar1;
                    continue;
                }
                prefix.push(br);
                return compose_result(self, &mut prefix, ar);
            }
            // Neither side is decomposable.
            if stable_id(&self.tm, ar) < stable_id(&self.tm, br) {
                std::mem::swap(&mut ar, &mut br);
            }
            prefix.push(br);
            return compose_result(self, &mut prefix, ar);
        }
    }

    /// Sound, incomplete subset test on regexes.
    pub(crate) fn is_subset(&self, r1: TermId, r2: TermId) -> bool {
        let tm = &self.tm;
        if let (Some(ra), Some(rb)) = (as_complement(tm, r1), as_complement(tm, r2)) {
            return self.is_subset(rb, ra);
        }
        let concat3 = |t: TermId| -> Option<(TermId, TermId, TermId)> {
            let (a, bc) = as_re_concat(tm, t)?;
            let (b, c) = as_re_concat(tm, bc)?;
            Some((a, b, c))
        };
        let mut r1 = r1;
        let mut r2 = r2;
        loop {
            if r1 == r2 {
                return true;
            }
            if is_re_full(tm, r2) {
                return true;
            }
            if tm.is_re_dot_plus(r2) && re_nullable_hint(tm, r1) == Lbool::False {
                return true;
            }
            if let (Some((a1, a2, a3)), Some((b1, b2, b3))) = (concat3(r1), concat3(r2)) {
                if a1 == b1 && a2 == b2 {
                    r1 = a3;
                    r2 = b3;
                    continue;
                }
            }
            if let (Some((_, a2)), Some((b1, _))) = (as_re_concat(tm, r1), as_re_concat(tm, r2))
            {
                if is_re_full(tm, b1) {
                    r1 = a2;
                    continue;
                }
            }
            if let (Some((ha, ta)), Some((hb, tb))) = (as_re_concat(tm, r1), as_re_concat(tm, r2))
            {
                if let (Some((ba, la, Some(ua))), Some((bb, lb, Some(ub)))) =
                    (as_loop(tm, ha), as_loop(tm, hb))
                {
                    if ba == bb && lb <= la && ua <= ub {
                        r1 = ta;
                        r2 = tb;
                        continue;
                    }
                }
            }
            if let (Some((ba, la, Some(ua))), Some((bb, lb, Some(ub)))) =
                (as_loop(tm, r1), as_loop(tm, r2))
            {
                if ba == bb && lb <= la && ua <= ub {
                    return true;
                }
            }
            return false;
        }
    }

    // ------------------------------------------------------------------
    // Star / plus / opt / loop / power / range
    // ------------------------------------------------------------------

    /// Star cascade.
    pub(crate) fn mk_re_star(&mut self, a: TermId) -> RewriteResult {
        let tm = &self.tm;
        if as_star(tm, a).is_some() || is_re_full(tm, a) {
            return RewriteResult::Done(a);
        }
        if is_re_allchar(tm, a) {
            let sort = self.tm.sort(a);
            let r = self.tm.mk_re_full(sort);
            return RewriteResult::Done(r);
        }
        if is_re_empty(tm, a) {
            let sort = self.tm.sort(a);
            let seq = self.tm.sorts.re_seq(sort).unwrap_or(self.tm.sorts.string_sort);
            let r = self.tm.mk_re_epsilon(seq);
            return RewriteResult::Done(r);
        }
        if tm.is_re_epsilon(a) {
            return RewriteResult::Done(a);
        }
        if let TermKind::RePlus(b) = *tm.kind(a) {
            let r = if is_re_allchar(&self.tm, b) {
                let sort = self.tm.sort(a);
                self.tm.mk_re_full(sort)
            } else {
                self.tm.mk_re_star(b)
            };
            return RewriteResult::Done(r);
        }
        if let Some((b, c)) = as_re_union(tm, a) {
            if let Some(b1) = as_star(&self.tm, b) {
                let u = self.tm.mk_re_union(b1, c);
                let r = self.tm.mk_re_star(u);
                return RewriteResult::Rewrite2(r);
            }
            if let Some(c1) = as_star(&self.tm, c) {
                let u = self.tm.mk_re_union(b, c1);
                let r = self.tm.mk_re_star(u);
                return RewriteResult::Rewrite2(r);
            }
            if self.tm.is_re_epsilon(b) {
                let r = self.tm.mk_re_star(c);
                return RewriteResult::Rewrite2(r);
            }
            if self.tm.is_re_epsilon(c) {
                let r = self.tm.mk_re_star(b);
                return RewriteResult::Rewrite2(r);
            }
        }
        if let Some((b, c)) = as_re_concat(&self.tm, a) {
            if let (Some(b1), Some(c1)) = (as_star(&self.tm, b), as_star(&self.tm, c)) {
                let u = self.tm.mk_re_union(b1, c1);
                let r = self.tm.mk_re_star(u);
                return RewriteResult::Rewrite2(r);
            }
        }
        if let Some((_, b1, c1)) = as_ite(&self.tm, a) {
            let tm = &self.tm;
            let full_like = |t: TermId| is_re_allchar(tm, t) || is_re_full(tm, t);
            if full_like(b1) && full_like(c1) {
                let sort = self.tm.sort(b1);
                let r = self.tm.mk_re_full(sort);
                return RewriteResult::Rewrite2(r);
            }
        }
        RewriteResult::Failed
    }

    /// Plus cascade; the generic fallback expands `R+` to `R · R*`.
    pub(crate) fn mk_re_plus(&mut self, a: TermId) -> RewriteResult {
        let tm = &self.tm;
        if is_re_empty(tm, a)
            || is_re_full(tm, a)
            || tm.is_re_epsilon(a)
            || matches!(tm.kind(a), TermKind::RePlus(_))
            || as_star(tm, a).is_some()
        {
            return RewriteResult::Done(a);
        }
        // Σ+ is the canonical non-empty-language constant; keep it.
        if is_re_allchar(tm, a) {
            return RewriteResult::Failed;
        }
        let star = self.tm.mk_re_star(a);
        let r = self.tm.mk_re_concat(a, star);
        RewriteResult::Rewrite2(r)
    }

    /// `R? = ε ∪ R`.
    pub(crate) fn mk_re_opt(&mut self, a: TermId) -> RewriteResult {
        let sort = self.tm.sort(a);
        let seq = self.tm.sorts.re_seq(sort).unwrap_or(self.tm.sorts.string_sort);
        let eps = self.tm.mk_re_epsilon(seq);
        let r = self.tm.mk_re_union(eps, a);
        RewriteResult::Rewrite1(r)
    }

    /// Loop cascade over structural repetition bounds.
    pub(crate) fn mk_re_loop(&mut self, a: TermId, lo: u32, hi: Option<u32>) -> RewriteResult {
        if let Some(h) = hi {
            if h < lo {
                let sort = self.tm.sort(a);
                let r = self.tm.mk_re_empty(sort);
                return RewriteResult::Done(r);
            }
            if lo == 0 && h == 0 {
                let sort = self.tm.sort(a);
                let seq = self.tm.sorts.re_seq(sort).unwrap_or(self.tm.sorts.string_sort);
                let r = self.tm.mk_re_epsilon(seq);
                return RewriteResult::Done(r);
            }
            if lo == 1 && h == 1 {
                return RewriteResult::Done(a);
            }
            if lo == h {
                if let Some((b, l2, Some(h2))) = as_loop(&self.tm, a) {
                    if l2 == h2 {
                        let r = self.tm.mk_re_loop(b, lo * l2, Some(lo * l2));
                        return RewriteResult::Rewrite1(r);
                    }
                }
            }
        } else {
            if lo == 0 {
                let r = self.tm.mk_re_star(a);
                return RewriteResult::Done(r);
            }
            if let Some((b, l2, None)) = as_loop(&self.tm, a) {
                let r = self.tm.mk_re_loop(b, lo.saturating_mul(l2), None);
                return RewriteResult::Rewrite1(r);
            }
        }
        RewriteResult::Failed
    }

    /// `power(R, n) = loop(R, n, n)`.
    pub(crate) fn mk_re_power(&mut self, a: TermId, n: u32) -> RewriteResult {
        let r = self.tm.mk_re_loop(a, n, Some(n));
        RewriteResult::Rewrite1(r)
    }

    /// Range cascade: degenerate bounds denote the empty language.
    pub(crate) fn mk_re_range(&mut self, lo: TermId, hi: TermId) -> RewriteResult {
        let tm = &self.tm;
        let mut empty = false;
        let (mut clo, mut chi) = (None, None);
        if let Some(s) = tm.str_value(lo) {
            if s.len() != 1 {
                empty = true;
            } else {
                clo = Some(s.at(0));
            }
        }
        if let Some(s) = tm.str_value(hi) {
            if s.len() != 1 {
                empty = true;
            } else {
                chi = Some(s.at(0));
            }
        }
        if let (Some(l), Some(h)) = (clo, chi) {
            if l > h {
                empty = true;
            }
        }
        if min_length1(tm, lo).1 > 1 || min_length1(tm, hi).1 > 1 {
            empty = true;
        }
        if crate::length::max_length(tm, lo) == (true, 0)
            || crate::length::max_length(tm, hi) == (true, 0)
        {
            empty = true;
        }
        if empty {
            let sort = self.tm.re_sort_of_seq(lo);
            let r = self.tm.mk_re_empty(sort);
            return RewriteResult::Done(r);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // Reverse
    // ------------------------------------------------------------------

    /// Reverse cascade used at dispatch: pushes `reverse` inward.
    pub(crate) fn mk_re_reverse_rw(&mut self, r: TermId) -> RewriteResult {
        let kind = self.tm.kind(r).clone();
        match kind {
            TermKind::ReConcat(r1, r2) => {
                let a = self.tm.mk_re_reverse(r2);
                let b = self.tm.mk_re_reverse(r1);
                let result = self.tm.mk_re_concat(a, b);
                RewriteResult::Rewrite2(result)
            }
            TermKind::ReStar(r1) => {
                let a = self.tm.mk_re_reverse(r1);
                RewriteResult::Rewrite2(self.tm.mk_re_star(a))
            }
            TermKind::RePlus(r1) => {
                let a = self.tm.mk_re_reverse(r1);
                RewriteResult::Rewrite2(self.tm.mk_re_plus(a))
            }
            TermKind::ReUnion(r1, r2) => {
                let a = self.tm.mk_re_reverse(r1);
                let b = self.tm.mk_re_reverse(r2);
                RewriteResult::Rewrite2(self.tm.mk_re_union(a, b))
            }
            TermKind::ReInter(r1, r2) => {
                let a = self.tm.mk_re_reverse(r1);
                let b = self.tm.mk_re_reverse(r2);
                RewriteResult::Rewrite2(self.tm.mk_re_inter(a, b))
            }
            TermKind::ReDiff(r1, r2) => {
                let a = self.tm.mk_re_reverse(r1);
                let b = self.tm.mk_re_reverse(r2);
                RewriteResult::Rewrite2(self.tm.mk_re_diff(a, b))
            }
            TermKind::Ite(p, r1, r2) => {
                let a = self.tm.mk_re_reverse(r1);
                let b = self.tm.mk_re_reverse(r2);
                RewriteResult::Rewrite2(self.tm.mk_ite(p, a, b))
            }
            TermKind::ReOpt(r1) => {
                let a = self.tm.mk_re_reverse(r1);
                RewriteResult::Rewrite2(self.tm.mk_re_opt(a))
            }
            TermKind::ReComplement(r1) => {
                let a = self.tm.mk_re_reverse(r1);
                RewriteResult::Rewrite2(self.tm.mk_re_complement(a))
            }
            TermKind::ReLoop(r1, lo, hi) => {
                let a = self.tm.mk_re_reverse(r1);
                RewriteResult::Rewrite2(self.tm.mk_re_loop(a, lo, hi))
            }
            TermKind::ReReverse(r1) => RewriteResult::Done(r1),
            TermKind::ReFull(_)
            | TermKind::ReEmpty(_)
            | TermKind::ReRange(..)
            | TermKind::ReAllChar(_)
            | TermKind::ReOfPred(_) => RewriteResult::Done(r),
            TermKind::ToRe(s) => {
                if let Some(z) = self.tm.str_value(s).cloned() {
                    let rs = self.tm.mk_str(z.reverse());
                    return RewriteResult::Done(self.tm.mk_to_re(rs));
                }
                if self.tm.as_seq_unit(s).is_some() {
                    return RewriteResult::Done(r);
                }
                if let TermKind::SeqConcat(s1, s2) = *self.tm.kind(s) {
                    let a = self.tm.mk_to_re(s2);
                    let ra = self.tm.mk_re_reverse(a);
                    let b = self.tm.mk_to_re(s1);
                    let rb = self.tm.mk_re_reverse(b);
                    let result = self.tm.mk_re_concat(ra, rb);
                    return RewriteResult::Rewrite3(result);
                }
                RewriteResult::Failed
            }
            _ => RewriteResult::Failed,
        }
    }

    /// Reverse as a total function, used by the derivative engine.
    pub(crate) fn mk_regex_reverse(&mut self, r: TermId) -> TermId {
        let kind = self.tm.kind(r).clone();
        match kind {
            TermKind::ReEmpty(_)
            | TermKind::ReRange(..)
            | TermKind::ReFull(_)
            | TermKind::ReAllChar(_)
            | TermKind::ReOfPred(_) => r,
            _ if self.tm.is_re_epsilon(r) || self.tm.is_re_dot_plus(r) => r,
            TermKind::ToRe(_) => self.tm.mk_re_reverse(r),
            TermKind::ReReverse(r1) => r1,
            TermKind::ReConcat(r1, r2) => {
                let a = self.mk_regex_reverse(r2);
                let b = self.mk_regex_reverse(r1);
                self.mk_regex_concat(a, b)
            }
            TermKind::Ite(c, r1, r2) => {
                let a = self.mk_regex_reverse(r1);
                let b = self.mk_regex_reverse(r2);
                self.tm.mk_ite(c, a, b)
            }
            TermKind::ReUnion(r1, r2) => {
                let a = self.mk_regex_reverse(r1);
                let b = self.mk_regex_reverse(r2);
                self.tm.mk_re_union(a, b)
            }
            TermKind::ReInter(r1, r2) => {
                let a = self.mk_regex_reverse(r1);
                let b = self.mk_regex_reverse(r2);
                self.tm.mk_re_inter(a, b)
            }
            TermKind::ReDiff(r1, r2) => {
                let a = self.mk_regex_reverse(r1);
                let b = self.mk_regex_reverse(r2);
                self.tm.mk_re_diff(a, b)
            }
            TermKind::ReStar(r1) => {
                let a = self.mk_regex_reverse(r1);
                self.tm.mk_re_star(a)
            }
            TermKind::RePlus(r1) => {
                let a = self.mk_regex_reverse(r1);
                self.tm.mk_re_plus(a)
            }
            TermKind::ReLoop(r1, lo, hi) => {
                let a = self.mk_regex_reverse(r1);
                self.tm.mk_re_loop(a, lo, hi)
            }
            TermKind::ReOpt(r1) => {
                let a = self.mk_regex_reverse(r1);
                self.tm.mk_re_opt(a)
            }
            TermKind::ReComplement(r1) => {
                let a = self.mk_regex_reverse(r1);
                self.tm.mk_re_complement(a)
            }
            _ => self.tm.mk_re_reverse(r),
        }
    }

    // ------------------------------------------------------------------
    // Regex equalities with ∅
    // ------------------------------------------------------------------

    /// Equality between regexes; only comparisons against the empty
    /// language reduce.
    pub(crate) fn reduce_re_eq(&mut self, l: TermId, r: TermId) -> RewriteResult {
        let (l, r) = if is_re_empty(&self.tm, l) { (r, l) } else { (l, r) };
        if is_re_empty(&self.tm, r) {
            return self.reduce_re_is_empty(l);
        }
        RewriteResult::Failed
    }

    /// Reduction of `r = ∅`.
    pub(crate) fn reduce_re_is_empty(&mut self, r: TermId) -> RewriteResult {
        let sort = self.tm.sort(r);
        let kind = self.tm.kind(r).clone();
        let empty = self.tm.mk_re_empty(sort);
        let mut eq_empty = |this: &mut Self, x: TermId| this.tm.mk_eq(x, empty);
        match kind {
            TermKind::ReUnion(r1, r2) => {
                let e1 = eq_empty(self, r1);
                let e2 = eq_empty(self, r2);
                let result = self.tm.mk_and2(e1, e2);
                RewriteResult::Rewrite2(result)
            }
            TermKind::ReStar(_) | TermKind::ToRe(_) | TermKind::ReAllChar(_)
            | TermKind::ReFull(_) => RewriteResult::Done(self.tm.mk_false()),
            TermKind::ReConcat(r1, r2) => {
                let e1 = eq_empty(self, r1);
                let e2 = eq_empty(self, r2);
                let result = self.tm.mk_or2(e1, e2);
                RewriteResult::Rewrite2(result)
            }
            TermKind::ReRange(r1, r2) => {
                let s1 = self.tm.str_value(r1).cloned();
                let s2 = self.tm.str_value(r2).cloned();
                match (s1, s2) {
                    (Some(a), Some(b)) if a.len() == 1 && b.len() == 1 => {
                        let v = a.at(0) > b.at(0);
                        RewriteResult::Done(self.tm.mk_bool(v))
                    }
                    (Some(a), _) if a.len() != 1 => RewriteResult::Done(self.tm.mk_true()),
                    (_, Some(b)) if b.len() != 1 => RewriteResult::Done(self.tm.mk_true()),
                    _ => RewriteResult::Failed,
                }
            }
            TermKind::ReLoop(r1, lo, hi) => {
                if hi.is_some_and(|h| h < lo) {
                    return RewriteResult::Done(self.tm.mk_true());
                }
                if lo == 0 {
                    return RewriteResult::Done(self.tm.mk_false());
                }
                let result = eq_empty(self, r1);
                RewriteResult::Rewrite1(result)
            }
            TermKind::ReInter(r1, r2) => {
                let distribute = |this: &mut Self, u1: TermId, u2: TermId, other: TermId| {
                    let i1 = this.tm.mk_re_inter(u1, other);
                    let i2 = this.tm.mk_re_inter(u2, other);
                    let u = this.tm.mk_re_union(i1, i2);
                    this.tm.mk_eq(u, empty)
                };
                if let Some((r3, r4)) = as_re_union(&self.tm, r1) {
                    let result = distribute(self, r3, r4, r2);
                    return RewriteResult::Rewrite3(result);
                }
                if let Some((r3, r4)) = as_re_union(&self.tm, r2) {
                    let result = distribute(self, r3, r4, r1);
                    return RewriteResult::Rewrite3(result);
                }
                RewriteResult::Failed
            }
            _ => RewriteResult::Failed,
        }
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
    fn test_union_idempotent_and_absorbing() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        assert_eq!(rw.mk_regex_union_normalize(r, r), r);
        let sort = rw.tm().sort(r);
        let empty = rw.tm_mut().mk_re_empty(sort);
        let full = rw.tm_mut().mk_re_full(sort);
        assert_eq!(rw.mk_regex_union_normalize(empty, r), r);
        assert_eq!(rw.mk_regex_union_normalize(full, r), full);
    }

    #[test]
    fn test_union_with_complement_is_full() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        let nr = rw.tm_mut().mk_re_complement(r);
        let sort = rw.tm().sort(r);
        let full = rw.tm_mut().mk_re_full(sort);
        assert_eq!(rw.mk_regex_union_normalize(r, nr), full);
    }

    #[test]
    fn test_inter_with_complement_is_empty() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        let nr = rw.tm_mut().mk_re_complement(r);
        let sort = rw.tm().sort(r);
        let empty = rw.tm_mut().mk_re_empty(sort);
        assert_eq!(rw.mk_regex_inter_normalize(r, nr), empty);
    }

    #[test]
    fn test_union_merge_is_order_insensitive() {
        let mut rw = rw();
        let sa = rw.tm_mut().mk_str_s("a");
        let sb = rw.tm_mut().mk_str_s("b");
        let sc = rw.tm_mut().mk_str_s("c");
        let ra = rw.tm_mut().mk_to_re(sa);
        let rb = rw.tm_mut().mk_to_re(sb);
        let rc = rw.tm_mut().mk_to_re(sc);
        let ab = rw.mk_regex_union_normalize(ra, rb);
        let abc1 = rw.mk_regex_union_normalize(ab, rc);
        let cb = rw.mk_regex_union_normalize(rc, rb);
        let abc2 = rw.mk_regex_union_normalize(cb, ra);
        assert_eq!(abc1, abc2);
    }

    #[test]
    fn test_concat_identities() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        let sort = rw.tm().sort(r);
        let empty = rw.tm_mut().mk_re_empty(sort);
        let seq = rw.tm().sorts.string_sort;
        let eps = rw.tm_mut().mk_re_epsilon(seq);
        assert_eq!(rw.mk_re_concat(empty, r), RewriteResult::Done(empty));
        assert_eq!(rw.mk_re_concat(eps, r), RewriteResult::Done(r));
        assert_eq!(rw.mk_re_concat(r, eps), RewriteResult::Done(r));
    }

    #[test]
    fn test_concat_of_literals() {
        let mut rw = rw();
        let sa = rw.tm_mut().mk_str_s("ab");
        let sb = rw.tm_mut().mk_str_s("cd");
        let ra = rw.tm_mut().mk_to_re(sa);
        let rb = rw.tm_mut().mk_to_re(sb);
        let result = rw.mk_re_concat(ra, rb).term().unwrap();
        let abcd = rw.tm_mut().mk_str_s("abcd");
        let expect = rw.tm_mut().mk_to_re(abcd);
        assert_eq!(result, expect);
    }

    #[test]
    fn test_star_of_empty_is_epsilon() {
        let mut rw = rw();
        let sort = rw.tm().sorts.re_string_sort;
        let empty = rw.tm_mut().mk_re_empty(sort);
        let result = rw.mk_re_star(empty).term().unwrap();
        assert!(rw.tm().is_re_epsilon(result));
    }

    #[test]
    fn test_loop_cascades() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        assert_eq!(rw.mk_re_loop(r, 1, Some(1)), RewriteResult::Done(r));
        let star = rw.mk_re_loop(r, 0, None).term().unwrap();
        assert_eq!(star, rw.tm_mut().mk_re_star(r));
        let e = rw.mk_re_loop(r, 3, Some(2)).term().unwrap();
        assert!(is_re_empty(rw.tm(), e));
    }

    #[test]
    fn test_subset() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        let sort = rw.tm().sort(r);
        let full = rw.tm_mut().mk_re_full(sort);
        assert!(rw.is_subset(r, full));
        assert!(rw.is_subset(r, r));
        let l1 = rw.tm_mut().mk_re_loop(r, 2, Some(3));
        let l2 = rw.tm_mut().mk_re_loop(r, 1, Some(4));
        assert!(rw.is_subset(l1, l2));
        assert!(!rw.is_subset(l2, l1));
    }

    #[test]
    fn test_complement_cascade() {
        let mut rw = rw();
        let sort = rw.tm().sorts.re_string_sort;
        let empty = rw.tm_mut().mk_re_empty(sort);
        let full = rw.tm_mut().mk_re_full(sort);
        assert_eq!(rw.mk_re_complement(empty), RewriteResult::Done(full));
        assert_eq!(rw.mk_re_complement(full), RewriteResult::Done(empty));
        let s = rw.tm_mut().mk_str_s("a");
        let r = rw.tm_mut().mk_to_re(s);
        let nr = rw.tm_mut().mk_re_complement(r);
        assert_eq!(rw.mk_re_complement(nr), RewriteResult::Done(r));
    }
}
