//! Equation reduction over concatenations.
//!
//! `reduce_eq` simplifies `ls = rs` for two flattened concatenations:
//! symmetric head/tail cancellation, itos-literal matching, value clash,
//! length pruning, subsequence matching, and non-overlap refutation. Each
//! stage either refutes the equation, shrinks it, or leaves it alone; the
//! caller receives the residual equations.

use rustc_hash::FxHashSet;

use crate::ast::{TermId, TermKind};
use crate::length::{min_length, min_length1};
use crate::rewriter::SeqRewriter;
use crate::zstring::ZString;

type EqPairs = Vec<(TermId, TermId)>;

impl SeqRewriter {
    /// Reduce the equation `l = r` into residual equations; `None` means
    /// the equation is provably unsatisfiable, and `changed` reports
    /// whether anything shrank.
    pub fn reduce_eq_terms(
        &mut self,
        l: TermId,
        r: TermId,
        changed: &mut bool,
    ) -> Option<EqPairs> {
        let mut ls = Vec::new();
        let mut rs = Vec::new();
        self.tm.get_concat(l, &mut ls);
        self.tm.get_concat(r, &mut rs);
        let mut eqs = EqPairs::new();
        let mut change = false;
        if self.reduce_eq(&mut ls, &mut rs, &mut eqs, &mut change) {
            if !change {
                eqs.clear();
                eqs.push((l, r));
            } else {
                self.add_seqs(&ls, &rs, &mut eqs);
            }
            *changed |= change;
            return Some(eqs);
        }
        None
    }

    /// Simplify the equation `ls = rs` over flattened concatenations.
    /// Residual equations land in `eqs`; returns `false` iff the equation
    /// is refuted; `change` reports whether anything shrank.
    pub fn reduce_eq(
        &mut self,
        ls: &mut Vec<TermId>,
        rs: &mut Vec<TermId>,
        eqs: &mut EqPairs,
        change: &mut bool,
    ) -> bool {
        let watermark = (ls.clone(), rs.clone(), eqs.len());
        self.remove_empty_and_concats(ls);
        self.remove_empty_and_concats(rs);
        let ok = self.reduce_back(ls, rs, eqs)
            && self.reduce_front(ls, rs, eqs)
            && self.reduce_itos(ls, rs, eqs)
            && self.reduce_itos(rs, ls, eqs)
            && self.reduce_value_clash(ls, rs)
            && self.reduce_by_length(ls, rs, eqs)
            && self.reduce_subsequence(ls, rs, eqs)
            && self.reduce_non_overlap(ls, rs)
            && self.reduce_non_overlap(rs, ls);
        if !ok {
            return false;
        }
        *change = watermark != (ls.clone(), rs.clone(), eqs.len());
        true
    }

    fn add_seqs(&mut self, ls: &[TermId], rs: &[TermId], eqs: &mut EqPairs) {
        if ls.is_empty() && rs.is_empty() {
            return;
        }
        let sort = self.tm.sort(if ls.is_empty() { rs[0] } else { ls[0] });
        let l = self.tm.mk_concat_list(ls, sort);
        let r = self.tm.mk_concat_list(rs, sort);
        eqs.push((l, r));
    }

    fn remove_empty_and_concats(&mut self, es: &mut Vec<TermId>) {
        let mut out = Vec::with_capacity(es.len());
        for &e in es.iter() {
            if self.tm.is_seq_empty(e) {
                continue;
            }
            self.tm.get_concat(e, &mut out);
        }
        out.retain(|&e| !self.tm.is_seq_empty(e));
        *es = out;
    }

    /// Cancel matching atoms from the back of both sides.
    fn reduce_back(&mut self, ls: &mut Vec<TermId>, rs: &mut Vec<TermId>, eqs: &mut EqPairs) -> bool {
        loop {
            let (Some(&l0), Some(&r0)) = (ls.last(), rs.last()) else {
                return true;
            };
            let mut l = l0;
            let mut r = r0;
            if self.is_unit_atom(r) && self.tm.str_value(l).is_some() {
                std::mem::swap(&mut l, &mut r);
                std::mem::swap(ls, rs);
            }
            if l == r {
                ls.pop();
                rs.pop();
                continue;
            }
            let lu = self.tm.as_seq_unit(l);
            let ru = self.tm.as_seq_unit(r);
            if let (Some(a), Some(b)) = (lu, ru) {
                if self.tm.are_distinct(a, b) {
                    return false;
                }
                eqs.push((a, b));
                ls.pop();
                rs.pop();
                continue;
            }
            if let (Some(a), Some(s)) = (lu, self.tm.str_value(r).cloned()) {
                debug_assert!(!s.is_empty());
                let ch = self.tm.mk_char(s.at(s.len() - 1));
                eqs.push((ch, a));
                ls.pop();
                if s.len() == 1 {
                    rs.pop();
                } else {
                    let shortened = self.tm.mk_str(s.extract(0, s.len() - 1));
                    let last = rs.len() - 1;
                    rs[last] = shortened;
                }
                continue;
            }
            let sl = self.tm.str_value(l).cloned();
            let sr = self.tm.str_value(r).cloned();
            if let (Some(s1), Some(s2)) = (sl, sr) {
                let n = usize::min(s1.len(), s2.len());
                for i in 0..n {
                    if s1.at(s1.len() - i - 1) != s2.at(s2.len() - i - 1) {
                        return false;
                    }
                }
                ls.pop();
                rs.pop();
                if n < s1.len() {
                    ls.push(self.tm.mk_str(s1.extract(0, s1.len() - n)));
                }
                if n < s2.len() {
                    rs.push(self.tm.mk_str(s2.extract(0, s2.len() - n)));
                }
                continue;
            }
            return true;
        }
    }

    /// Cancel matching atoms from the front of both sides.
    fn reduce_front(&mut self, ls: &mut Vec<TermId>, rs: &mut Vec<TermId>, eqs: &mut EqPairs) -> bool {
        let mut head1 = 0usize;
        let mut head2 = 0usize;
        loop {
            if head1 == ls.len() || head2 == rs.len() {
                break;
            }
            let mut l = ls[head1];
            let mut r = rs[head2];
            if self.is_unit_atom(r) && self.tm.str_value(l).is_some() {
                std::mem::swap(&mut l, &mut r);
                std::mem::swap(ls, rs);
                std::mem::swap(&mut head1, &mut head2);
            }
            if l == r {
                head1 += 1;
                head2 += 1;
                continue;
            }
            let lu = self.tm.as_seq_unit(l);
            let ru = self.tm.as_seq_unit(r);
            if let (Some(a), Some(b)) = (lu, ru) {
                if self.tm.are_distinct(a, b) {
                    return false;
                }
                eqs.push((a, b));
                head1 += 1;
                head2 += 1;
                continue;
            }
            if let (Some(a), Some(s)) = (lu, self.tm.str_value(r).cloned()) {
                debug_assert!(!s.is_empty());
                let ch = self.tm.mk_char(s.at(0));
                eqs.push((ch, a));
                head1 += 1;
                if s.len() == 1 {
                    head2 += 1;
                } else {
                    rs[head2] = self.tm.mk_str(s.extract(1, s.len() - 1));
                }
                continue;
            }
            let sl = self.tm.str_value(l).cloned();
            let sr = self.tm.str_value(r).cloned();
            if let (Some(s1), Some(s2)) = (sl, sr) {
                let n = usize::min(s1.len(), s2.len());
                for i in 0..n {
                    if s1.at(i) != s2.at(i) {
                        return false;
                    }
                }
                if n == s1.len() {
                    head1 += 1;
                } else {
                    ls[head1] = self.tm.mk_str(s1.extract(n, s1.len() - n));
                }
                if n == s2.len() {
                    head2 += 1;
                } else {
                    rs[head2] = self.tm.mk_str(s2.extract(n, s2.len() - n));
                }
                continue;
            }
            break;
        }
        ls.drain(..head1);
        rs.drain(..head2);
        true
    }

    fn is_unit_atom(&self, t: TermId) -> bool {
        self.tm.as_seq_unit(t).is_some()
    }

    /// Compose a side into one literal string, when it is entirely
    /// literal strings and constant-character units.
    fn side_as_string(&self, es: &[TermId]) -> Option<ZString> {
        let mut out = Vec::new();
        for &e in es {
            match self.tm.kind(e) {
                TermKind::Str(s) => out.extend_from_slice(s.code_points()),
                TermKind::SeqUnit(u) => out.push(self.tm.char_value(*u)?),
                _ => return None,
            }
        }
        Some(ZString::from_code_points(out))
    }

    /// `itos(n) = <decimal literal>` pins `n` when the literal is a
    /// canonical numeral; refuted on a malformed literal.
    fn reduce_itos(&mut self, ls: &mut Vec<TermId>, rs: &mut Vec<TermId>, eqs: &mut EqPairs) -> bool {
        if ls.len() != 1 {
            return true;
        }
        let TermKind::StrItos(n) = *self.tm.kind(ls[0]) else {
            return true;
        };
        let Some(s) = self.side_as_string(rs) else {
            return true;
        };
        if s.is_empty() {
            return true;
        }
        if s.to_decimal().is_none() {
            // itos output is all digits.
            return false;
        }
        if !s.is_canonical_decimal() {
            // itos output never has leading zeros.
            return false;
        }
        let Some(v) = s.to_decimal() else { return true };
        let num = self.tm.mk_int(v);
        eqs.push((n, num));
        ls.clear();
        rs.clear();
        true
    }

    fn is_unit_value(&self, t: TermId) -> bool {
        self.is_unit_atom(t) && self.tm.is_value(t)
    }

    /// Partial clash check: after positional cancellation, a leftover
    /// interpreted unit on one side refutes the equation.
    fn reduce_value_clash(&mut self, ls: &[TermId], rs: &[TermId]) -> bool {
        if ls.is_empty() || rs.is_empty() {
            return true;
        }
        let mut es: Vec<TermId> = ls.to_vec();
        for &r in rs {
            if let Some(i) = es.iter().position(|&e| e == r) {
                es.swap_remove(i);
                continue;
            }
            if !self.is_unit_value(r) {
                return true;
            }
        }
        if es.is_empty() {
            return true;
        }
        es.iter().any(|&e| !self.is_unit_value(e))
    }

    fn has_var(&self, es: &[TermId]) -> bool {
        es.iter().any(|&e| min_length1(&self.tm, e).1 == 0)
    }

    /// Assign every possibly-empty atom to the empty sequence. With `all`
    /// set, fail instead when an atom has positive minimum length.
    fn set_empty(&mut self, es: &[TermId], all: bool, eqs: &mut EqPairs) -> bool {
        for &e in es {
            let (exact, len) = min_length1(&self.tm, e);
            if len > 0 {
                if all {
                    return false;
                }
                continue;
            }
            if exact && len == 0 {
                continue;
            }
            let empty = self.tm.mk_seq_empty(self.tm.sort(e));
            eqs.push((empty, e));
        }
        true
    }

    fn concat_non_empty(&mut self, es: &[TermId]) -> TermId {
        let sort = self.tm.sort(es[0]);
        let kept: Vec<TermId> = es
            .iter()
            .copied()
            .filter(|&e| {
                self.is_unit_atom(e)
                    || self.tm.str_value(e).is_some()
                    || matches!(self.tm.kind(e), TermKind::Ite(..))
            })
            .collect();
        self.tm.mk_concat_list(&kept, sort)
    }

    /// Prune by exact lengths: equal bounded lengths with a variable side
    /// force every variable atom on that side to be empty.
    fn reduce_by_length(&mut self, ls: &mut Vec<TermId>, rs: &mut Vec<TermId>, eqs: &mut EqPairs) -> bool {
        if ls.is_empty() && rs.is_empty() {
            return true;
        }
        let (exact1, len1) = min_length(&self.tm, ls);
        let (exact2, len2) = min_length(&self.tm, rs);
        if exact1 && len1 < len2 {
            return false;
        }
        if exact2 && len2 < len1 {
            return false;
        }
        if exact1 && len1 == len2 && len1 > 0 && self.has_var(rs) {
            if !self.set_empty(&rs.clone(), false, eqs) {
                return false;
            }
            let l = self.concat_non_empty(&ls.clone());
            let r = self.concat_non_empty(&rs.clone());
            eqs.push((l, r));
            ls.clear();
            rs.clear();
        } else if exact2 && len1 == len2 && len1 > 0 && self.has_var(ls) {
            if !self.set_empty(&ls.clone(), false, eqs) {
                return false;
            }
            let l = self.concat_non_empty(&ls.clone());
            let r = self.concat_non_empty(&rs.clone());
            eqs.push((l, r));
            ls.clear();
            rs.clear();
        }
        true
    }

    /// When every atom of the shorter side occurs, in order, on the longer
    /// side, the unmatched longer-side atoms must be empty.
    fn reduce_subsequence(&mut self, ls: &mut Vec<TermId>, rs: &mut Vec<TermId>, eqs: &mut EqPairs) -> bool {
        if ls.len() > rs.len() {
            std::mem::swap(ls, rs);
        }
        if ls.len() == rs.len() {
            return true;
        }
        if ls.is_empty() && rs.len() == 1 {
            return true;
        }
        let mut rpos = FxHashSet::default();
        for &x in ls.iter() {
            let is_unit = self.is_unit_atom(x);
            let mut matched = None;
            for (j, &y) in rs.iter().enumerate() {
                if !rpos.contains(&j) && (x == y || (is_unit && self.is_unit_atom(y))) {
                    matched = Some(j);
                    break;
                }
            }
            match matched {
                Some(j) => {
                    rpos.insert(j);
                }
                None => return true,
            }
        }
        let mut kept = Vec::with_capacity(ls.len());
        for (i, &y) in rs.iter().enumerate() {
            if rpos.contains(&i) {
                kept.push(y);
            } else if !self.set_empty(&[y], true, eqs) {
                return false;
            }
        }
        if kept.len() == rs.len() {
            return true;
        }
        *rs = kept;
        debug_assert_eq!(ls.len(), rs.len());
        if !ls.is_empty() {
            let sort = self.tm.sort(ls[0]);
            let l = self.tm.mk_concat_list(ls, sort);
            let r = self.tm.mk_concat_list(rs, sort);
            eqs.push((l, r));
            ls.clear();
            rs.clear();
        }
        true
    }

    /// Refute when a contiguous value-unit pattern on `ls` cannot occur
    /// anywhere inside `rs`, which must be all units.
    fn reduce_non_overlap(&mut self, ls: &[TermId], rs: &[TermId]) -> bool {
        if rs.iter().any(|&u| !self.is_unit_atom(u)) {
            return true;
        }
        let mut pattern: Vec<TermId> = Vec::new();
        for &x in ls {
            if self.is_unit_atom(x) {
                pattern.push(x);
            } else if !pattern.is_empty() {
                if self.non_overlap_units(&pattern, rs) {
                    return false;
                }
                pattern.clear();
            }
        }
        if !pattern.is_empty() && self.non_overlap_units(&pattern, rs) {
            return false;
        }
        true
    }

    /// True iff the two atom vectors cannot overlap in any way: no suffix
    /// of one is a prefix of the other and neither sits inside the other.
    pub(crate) fn non_overlap_units(&self, p1: &[TermId], p2: &[TermId]) -> bool {
        let (p1, p2) = if p1.len() > p2.len() { (p2, p1) } else { (p1, p2) };
        let (sz1, sz2) = (p1.len(), p2.len());
        if sz1 == 0 || sz2 == 0 {
            return false;
        }
        if sz1 == 1 && sz2 == 1 {
            if let (Some(s1), Some(s2)) = (self.tm.str_value(p1[0]), self.tm.str_value(p2[0])) {
                return self.non_overlap_strings(s1, s2);
            }
        }
        if p1.iter().chain(p2.iter()).any(|&e| !self.is_unit_atom(e)) {
            return false;
        }
        let can_overlap = |start1: usize, end1: usize, start2: usize| {
            for i in start1..end1 {
                if self.tm.are_distinct(p1[i], p2[start2 + i]) {
                    return false;
                }
                if !self.tm.are_equal(p1[i], p2[start2 + i]) {
                    return true;
                }
            }
            true
        };
        for i in 1..sz1 {
            if can_overlap(i, sz1, 0) {
                return false;
            }
        }
        let mut j = 0;
        while j + sz1 < sz2 {
            if can_overlap(0, sz1, j) {
                return false;
            }
            j += 1;
        }
        for j in (sz2 - sz1)..sz2 {
            if can_overlap(0, sz2 - j, j) {
                return false;
            }
        }
        true
    }

    /// Literal-string non-overlap, used by the contains machinery.
    pub(crate) fn non_overlap_strings(&self, s1: &ZString, s2: &ZString) -> bool {
        let (s1, s2) = if s1.len() > s2.len() { (s2, s1) } else { (s1, s2) };
        let (sz1, sz2) = (s1.len(), s2.len());
        let can_overlap = |start1: usize, end1: usize, start2: usize| {
            for i in start1..end1 {
                if s1.at(i) != s2.at(start2 + i) {
                    return false;
                }
            }
            true
        };
        for i in 1..sz1 {
            if can_overlap(i, sz1, 0) {
                return false;
            }
        }
        let mut j = 0;
        while j + sz1 < sz2 {
            if can_overlap(0, sz1, j) {
                return false;
            }
            j += 1;
        }
        for j in (sz2 - sz1)..sz2 {
            if can_overlap(0, sz2 - j, j) {
                return false;
            }
        }
        true
    }

    /// Expansions for `"" = r` with structured `r`.
    pub(crate) fn reduce_eq_empty(&mut self, l: TermId, r: TermId) -> Option<TermId> {
        let (l, r) = if self.tm.is_seq_empty(r) { (r, l) } else { (l, r) };
        if !self.tm.is_seq_empty(l) {
            return None;
        }
        match self.tm.kind(r).clone() {
            TermKind::SeqExtract(s, offset, len) => {
                let zero = self.zero();
                let len_s = self.tm.mk_seq_len(s);
                let neg_off = self.tm.mk_lt(offset, zero);
                let s_empty = self.tm.mk_eq(s, l);
                let len_nonpos = self.tm.mk_le(len, zero);
                let off_past = self.tm.mk_le(len_s, offset);
                Some(self.tm.mk_or(vec![neg_off, s_empty, len_nonpos, off_past]))
            }
            TermKind::StrItos(s) => {
                let zero = self.zero();
                Some(self.tm.mk_lt(s, zero))
            }
            TermKind::SeqAt(s, offset) => {
                let zero = self.zero();
                let len_s = self.tm.mk_seq_len(s);
                let past = self.tm.mk_le(len_s, offset);
                let neg = self.tm.mk_lt(offset, zero);
                Some(self.tm.mk_or2(past, neg))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;
    use crate::rewriter::SeqRewriterConfig;
    use num_bigint::BigInt;

    fn rw() -> SeqRewriter {
        SeqRewriter::new(TermManager::new(), SeqRewriterConfig::default())
    }

    #[test]
    fn test_front_cancel() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let __string_sort = rw.tm().sorts.string_sort;
        let y = rw.tm_mut().mk_var("y", __string_sort);
        let abc = rw.tm_mut().mk_str_s("abc");
        let l = rw.tm_mut().mk_seq_concat(abc, x);
        let r = rw.tm_mut().mk_seq_concat(abc, y);
        let mut changed = false;
        let eqs = rw.reduce_eq_terms(l, r, &mut changed).unwrap();
        assert!(changed);
        assert_eq!(eqs, vec![(x, y)]);
    }

    #[test]
    fn test_literal_mismatch_is_refuted() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let ab = rw.tm_mut().mk_str_s("ab");
        let cd = rw.tm_mut().mk_str_s("cd");
        let l = rw.tm_mut().mk_seq_concat(ab, x);
        let r = rw.tm_mut().mk_seq_concat(cd, x);
        let mut changed = false;
        assert!(rw.reduce_eq_terms(l, r, &mut changed).is_none());
    }

    #[test]
    fn test_unit_front_emits_char_equation() {
        let mut rw = rw();
        let __char_sort = rw.tm().sorts.char_sort;
        let u = rw.tm_mut().mk_var("u", __char_sort);
        let uu = rw.tm_mut().mk_seq_unit(u);
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let l = rw.tm_mut().mk_seq_concat(uu, x);
        let ab = rw.tm_mut().mk_str_s("ab");
        let mut changed = false;
        let eqs = rw.reduce_eq_terms(l, ab, &mut changed).unwrap();
        assert!(changed);
        // First equation pins the character, the residue pins x.
        let a_ch = rw.tm_mut().mk_char('a' as u32);
        assert_eq!(eqs[0], (a_ch, u));
        let b = rw.tm_mut().mk_str_s("b");
        assert!(eqs.contains(&(x, b)));
    }

    #[test]
    fn test_two_sided_var_equation_not_refuted() {
        let mut rw = rw();
        // unit('a') ++ x  =  y ++ unit('b') must not be refuted.
        let a = rw.tm_mut().mk_char('a' as u32);
        let b = rw.tm_mut().mk_char('b' as u32);
        let ua = rw.tm_mut().mk_seq_unit(a);
        let ub = rw.tm_mut().mk_seq_unit(b);
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let __string_sort = rw.tm().sorts.string_sort;
        let y = rw.tm_mut().mk_var("y", __string_sort);
        let l = rw.tm_mut().mk_seq_concat(ua, x);
        let r = rw.tm_mut().mk_seq_concat(y, ub);
        let mut changed = false;
        assert!(rw.reduce_eq_terms(l, r, &mut changed).is_some());
    }

    #[test]
    fn test_itos_literal() {
        let mut rw = rw();
        let __int_sort = rw.tm().sorts.int_sort;
        let n = rw.tm_mut().mk_var("n", __int_sort);
        let itos = rw.tm_mut().mk_str_itos(n);
        let lit = rw.tm_mut().mk_str_s("42");
        let mut changed = false;
        let eqs = rw.reduce_eq_terms(itos, lit, &mut changed).unwrap();
        let forty_two = rw.tm_mut().mk_int(BigInt::from(42));
        assert_eq!(eqs, vec![(n, forty_two)]);
        // Leading zero refutes: itos never prints "07".
        let bad = rw.tm_mut().mk_str_s("07");
        let mut changed = false;
        assert!(rw.reduce_eq_terms(itos, bad, &mut changed).is_none());
    }

    #[test]
    fn test_value_clash() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_char('a' as u32);
        let b = rw.tm_mut().mk_char('b' as u32);
        let ua = rw.tm_mut().mk_seq_unit(a);
        let ub = rw.tm_mut().mk_seq_unit(b);
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        // x ++ 'a' = x ++ 'b' cancels the tail first and refutes there;
        // use interleaved shapes instead: 'a' ++ x = 'b' ++ x.
        let l = rw.tm_mut().mk_seq_concat(ua, x);
        let r = rw.tm_mut().mk_seq_concat(ub, x);
        let mut changed = false;
        assert!(rw.reduce_eq_terms(l, r, &mut changed).is_none());
    }

    #[test]
    fn test_length_pruning_sets_vars_empty() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("ab");
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let cd = rw.tm_mut().mk_str_s("cd");
        let r = rw.tm_mut().mk_seq_concat(x, cd);
        // "ab" = x ++ "cd" is refuted outright: 2 = |x| + 2 forces x empty,
        // then "ab" != "cd".
        let mut changed = false;
        assert!(rw.reduce_eq_terms(a, r, &mut changed).is_none());
    }

    #[test]
    fn test_subsequence_reduction() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let __string_sort = rw.tm().sorts.string_sort;
        let y = rw.tm_mut().mk_var("y", __string_sort);
        let l = x;
        let r0 = rw.tm_mut().mk_seq_concat(y, x);
        let mut changed = false;
        let eqs = rw.reduce_eq_terms(l, r0, &mut changed).unwrap();
        assert!(changed);
        // y is forced empty.
        let __string_sort = rw.tm().sorts.string_sort;
        let empty = rw.tm_mut().mk_seq_empty(__string_sort);
        assert!(eqs.contains(&(empty, y)));
    }

    #[test]
    fn test_non_overlap_units() {
        let rw = {
            let mut rw = rw();
            let a = rw.tm_mut().mk_char('a' as u32);
            let b = rw.tm_mut().mk_char('b' as u32);
            let ua = rw.tm_mut().mk_seq_unit(a);
            let ub = rw.tm_mut().mk_seq_unit(b);
            // "ab" never overlaps "cc".
            let c = rw.tm_mut().mk_char('c' as u32);
            let uc = rw.tm_mut().mk_seq_unit(c);
            assert!(rw.non_overlap_units(&[ua, ub], &[uc, uc]));
            // "ab" overlaps "ba" (suffix/prefix).
            assert!(!rw.non_overlap_units(&[ua, ub], &[ub, ua]));
            rw
        };
        let _ = rw;
    }

    #[test]
    fn test_non_overlap_strings() {
        let rw = rw();
        assert!(rw.non_overlap_strings(&ZString::from("ab"), &ZString::from("cd")));
        assert!(!rw.non_overlap_strings(&ZString::from("ab"), &ZString::from("bc")));
        assert!(!rw.non_overlap_strings(&ZString::from("ab"), &ZString::from("xabx")));
    }

    #[test]
    fn test_reduce_eq_empty_extract() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let s = rw.tm_mut().mk_var("s", __string_sort);
        let __int_sort = rw.tm().sorts.int_sort;
        let i = rw.tm_mut().mk_var("i", __int_sort);
        let __int_sort = rw.tm().sorts.int_sort;
        let l = rw.tm_mut().mk_var("l", __int_sort);
        let ext = rw.tm_mut().mk_seq_extract(s, i, l);
        let __string_sort = rw.tm().sorts.string_sort;
        let empty = rw.tm_mut().mk_seq_empty(__string_sort);
        let r = rw.reduce_eq_empty(empty, ext).unwrap();
        assert!(matches!(*rw.tm().kind(r), TermKind::Or(_)));
    }
}
