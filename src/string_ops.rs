//! String and sequence rule cascades.
//!
//! One function per operator; within a function the rules form a
//! prioritized cascade where the first match wins. Everything leans on the
//! length analyzer for "can this shrink" decisions and on the term
//! manager's value reasoning for constant folding.

use num_bigint::BigInt;
use num_traits::{One, Signed, ToPrimitive, Zero};
use smallvec::SmallVec;

use crate::ast::{Lbool, TermId, TermKind};
use crate::length::{eq_length, max_length, min_length, min_length1};
use crate::rewriter::{RewriteResult, SeqRewriter};
use crate::zstring::{ZString, MAX_CHAR};

/// Sign classification for integer terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Zero,
    Pos,
    Neg,
}

type Atoms = SmallVec<[TermId; 8]>;

impl SeqRewriter {
    fn concat_units(&mut self, t: TermId) -> Vec<TermId> {
        let mut out = Vec::new();
        self.tm.get_concat_units(t, &mut out);
        out
    }

    fn concat_atoms(&self, t: TermId) -> Atoms {
        let mut out = Vec::new();
        self.tm.get_concat(t, &mut out);
        out.into_iter().collect()
    }

    fn is_unit(&self, t: TermId) -> bool {
        self.tm.as_seq_unit(t).is_some()
    }

    // ------------------------------------------------------------------
    // unit / literal expansion
    // ------------------------------------------------------------------

    /// `unit(c)` with a constant character becomes a one-character literal
    /// when coalescing is enabled.
    pub(crate) fn mk_seq_unit_rw(&mut self, e: TermId) -> RewriteResult {
        if self.config.coalesce_chars {
            if let Some(ch) = self.tm.char_value(e) {
                let s = self.tm.mk_str(ZString::of_char(ch));
                return RewriteResult::Done(s);
            }
        }
        RewriteResult::Failed
    }

    /// With coalescing disabled, a string literal expands into units.
    pub(crate) fn mk_str_units(&mut self, t: TermId) -> RewriteResult {
        let Some(z) = self.tm.str_value(t).cloned() else {
            return RewriteResult::Failed;
        };
        if z.is_empty() {
            return RewriteResult::Failed;
        }
        let sort = self.tm.sort(t);
        let mut es = Vec::with_capacity(z.len());
        for &c in z.code_points() {
            let ch = self.tm.mk_char(c);
            let u = self.tm.mk_seq_unit(ch);
            es.push(u);
        }
        let result = self.tm.mk_concat_list(&es, sort);
        RewriteResult::Done(result)
    }

    // ------------------------------------------------------------------
    // concat
    // ------------------------------------------------------------------

    /// Concatenation cascade: literal coalescing, right association,
    /// empty stripping, literal absorption into a literal-headed tail.
    pub(crate) fn mk_seq_concat_core(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let coalesce = self.config.coalesce_chars;
        let s1 = if coalesce { self.tm.str_value(a).cloned() } else { None };
        let s2 = if coalesce { self.tm.str_value(b).cloned() } else { None };
        if let (Some(x), Some(y)) = (&s1, &s2) {
            let result = self.tm.mk_str(x.concat(y));
            return RewriteResult::Done(result);
        }
        if let TermKind::SeqConcat(c, d) = *self.tm.kind(a) {
            let db = self.tm.mk_seq_concat(d, b);
            let result = self.tm.mk_seq_concat(c, db);
            return RewriteResult::Rewrite2(result);
        }
        if self.tm.is_seq_empty(a) {
            return RewriteResult::Done(b);
        }
        if self.tm.is_seq_empty(b) {
            return RewriteResult::Done(a);
        }
        if let Some(x) = s1 {
            if let TermKind::SeqConcat(c, d) = *self.tm.kind(b) {
                if let Some(y) = self.tm.str_value(c).cloned() {
                    let head = self.tm.mk_str(x.concat(&y));
                    let result = self.tm.mk_seq_concat(head, d);
                    return RewriteResult::Done(result);
                }
            }
        }
        RewriteResult::Failed
    }

    /// Concatenation as a total function.
    pub(crate) fn mk_seq_concat_rw(&mut self, a: TermId, b: TermId) -> TermId {
        match self.mk_seq_concat_core(a, b).term() {
            Some(r) => r,
            None => self.tm.mk_seq_concat(a, b),
        }
    }

    // ------------------------------------------------------------------
    // length
    // ------------------------------------------------------------------

    /// Length cascade: fold the exactly-bounded atoms into a numeral and
    /// keep the rest symbolic.
    pub(crate) fn mk_seq_length(&mut self, a: TermId) -> RewriteResult {
        let es = self.concat_atoms(a);
        let mut kept: Atoms = SmallVec::new();
        let mut len: u64 = 0;
        for &e in &es {
            let (exact, l) = min_length1(&self.tm, e);
            if exact {
                len += l;
            } else {
                kept.push(e);
            }
        }
        if kept.is_empty() {
            let result = self.tm.mk_int(BigInt::from(len));
            return RewriteResult::Done(result);
        }
        if kept.len() != es.len() || kept.len() != 1 {
            let mut sum: Vec<TermId> = kept.iter().map(|&e| self.tm.mk_seq_len(e)).collect();
            if len != 0 {
                sum.push(self.tm.mk_int(BigInt::from(len)));
            }
            let result = self.tm.mk_add(sum);
            return RewriteResult::Rewrite2(result);
        }
        match self.tm.kind(a).clone() {
            TermKind::SeqReplace(x, y, z) => {
                if eq_length(&self.tm, y, z) == Lbool::True {
                    let result = self.tm.mk_seq_len(x);
                    return RewriteResult::Rewrite1(result);
                }
            }
            TermKind::SeqMap(_, y) => {
                let result = self.tm.mk_seq_len(y);
                return RewriteResult::Rewrite1(result);
            }
            TermKind::SeqMapi(_, _, z) => {
                let result = self.tm.mk_seq_len(z);
                return RewriteResult::Rewrite1(result);
            }
            TermKind::SeqExtract(x, y, z) => {
                // len(extract(x, 0, k)) = min(len(x), k) for constant k >= 0.
                let y_zero = matches!(self.tm.int_value(y), Some(n) if n.is_zero());
                let k_ok = matches!(self.tm.int_value(z), Some(n) if !n.is_negative());
                if y_zero && k_ok {
                    let len_x = self.tm.mk_seq_len(x);
                    let le = self.tm.mk_le(len_x, z);
                    let result = self.tm.mk_ite(le, len_x, z);
                    return RewriteResult::RewriteFull(result);
                }
            }
            _ => {}
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // extract
    // ------------------------------------------------------------------

    /// Decompose `e` into referenced lengths plus a numeric offset:
    /// `e = Σ len(xᵢ) + pos`.
    pub(crate) fn get_lengths(&self, e: TermId, lens: &mut Vec<TermId>, pos: &mut BigInt) -> bool {
        match self.tm.kind(e).clone() {
            TermKind::Add(args) => args.iter().all(|&arg| self.get_lengths(arg, lens, pos)),
            TermKind::SeqLen(arg) => {
                lens.push(arg);
                true
            }
            TermKind::Mul(e1, e2) => {
                let (k, arg) = match (self.tm.int_value(e1), self.tm.kind(e2)) {
                    (Some(k), TermKind::SeqLen(arg)) => (k.clone(), *arg),
                    _ => return false,
                };
                if k.is_negative() || k > BigInt::from(10) {
                    return false;
                }
                let mut k = k;
                while k.is_positive() {
                    lens.push(arg);
                    k -= 1;
                }
                true
            }
            TermKind::IntConst(n) => {
                *pos += n;
                true
            }
            _ => false,
        }
    }

    /// `pos + Σ len(xᵢ)` as a term.
    fn mk_len(&mut self, pos: &BigInt, lens: &[TermId]) -> TermId {
        let mut args = vec![self.tm.mk_int(pos.clone())];
        for &e in lens {
            args.push(self.tm.mk_seq_len(e));
        }
        self.tm.mk_add(args)
    }

    /// A window `extract(s, offset, len)` that runs to the end of `s`.
    fn is_suffix_window(&self, s: TermId, offset: TermId, len: TermId) -> bool {
        let mut lens = Vec::new();
        let mut a = BigInt::zero();
        if !self.get_lengths(len, &mut lens, &mut a) {
            return false;
        }
        let a = -a;
        match self.tm.int_value(offset) {
            Some(b) => b.is_positive() && a == *b && lens.contains(&s),
            None => false,
        }
    }

    /// A window `extract(s, 0, len(s) + negative)` starting at the front.
    fn is_prefix_window(&self, s: TermId, offset: TermId, len: TermId) -> bool {
        let mut lens = Vec::new();
        let mut a = BigInt::zero();
        self.get_lengths(len, &mut lens, &mut a)
            && a.is_negative()
            && matches!(self.tm.int_value(offset), Some(b) if b.is_zero())
            && lens.len() == 1
            && lens.contains(&s)
    }

    fn sign_is_determined(&self, e: TermId) -> Option<Sign> {
        match self.tm.kind(e).clone() {
            TermKind::Add(args) => {
                let mut s = Sign::Zero;
                for arg in args {
                    let s1 = self.sign_is_determined(arg)?;
                    if s == Sign::Zero {
                        s = s1;
                    } else if s1 == Sign::Zero {
                        continue;
                    } else if s1 != s {
                        return None;
                    }
                }
                Some(s)
            }
            TermKind::Mul(a, b) => {
                let sa = self.sign_is_determined(a)?;
                let sb = self.sign_is_determined(b)?;
                Some(match (sa, sb) {
                    (Sign::Zero, _) | (_, Sign::Zero) => Sign::Zero,
                    (x, y) if x == y => Sign::Pos,
                    _ => Sign::Neg,
                })
            }
            TermKind::SeqLen(_) => Some(Sign::Pos),
            TermKind::IntConst(n) => Some(if n.is_positive() {
                Sign::Pos
            } else if n.is_negative() {
                Sign::Neg
            } else {
                Sign::Zero
            }),
            _ => None,
        }
    }

    /// Drop atoms after the point where the window `[pos, pos+len)` is
    /// fully covered by a known-length prefix.
    fn extract_pop_suffix(&mut self, as_: &[TermId], b: TermId, c: TermId) -> Option<TermId> {
        let (_, total) = min_length(&self.tm, as_);
        let pos = self.tm.int_value(b)?.to_u64()?;
        let len = self.tm.int_value(c)?.to_u64()?;
        if as_.is_empty() || total < pos + len {
            return None;
        }
        let mut covered = 0u64;
        let mut i = 0;
        while i < as_.len() && covered < pos + len {
            covered += min_length1(&self.tm, as_[i]).1;
            i += 1;
        }
        if i < as_.len() {
            let sort = self.tm.sort(as_[0]);
            let a = self.tm.mk_concat_list(&as_[..i], sort);
            Some(self.tm.mk_seq_extract(a, b, c))
        } else {
            None
        }
    }

    /// When the offset is a sum of the leading atoms' lengths, drop those
    /// atoms and extract from the remainder.
    fn extract_push_offset(&mut self, as_: &[TermId], b: TermId, c: TermId) -> Option<TermId> {
        let mut lens = Vec::new();
        let mut pos1 = BigInt::zero();
        if !self.get_lengths(b, &mut lens, &mut pos1) || pos1.is_negative() {
            return None;
        }
        let mut i = 0;
        while i < as_.len() {
            let lhs = as_[i];
            if let Some(k) = lens.iter().position(|&x| x == lhs) {
                lens.remove(k);
            } else if self.is_unit(lhs) && pos1.is_positive() {
                pos1 -= 1;
            } else {
                break;
            }
            i += 1;
        }
        if i == 0 {
            return None;
        }
        let sort = self.tm.sort(as_[0]);
        let t1 = self.tm.mk_concat_list(&as_[i..], sort);
        let t2 = self.mk_len(&pos1, &lens);
        Some(self.tm.mk_seq_extract(t1, t2, c))
    }

    /// When the offset is zero and the length is a sum of the leading
    /// atoms' lengths, the result is exactly those atoms.
    fn extract_push_length(&mut self, as_: &mut Vec<TermId>, b: TermId, c: TermId) -> Option<TermId> {
        if as_.is_empty() {
            return None;
        }
        if !matches!(self.tm.int_value(b), Some(n) if n.is_zero()) {
            return None;
        }
        let mut lens = Vec::new();
        let mut pos = BigInt::zero();
        if !self.get_lengths(c, &mut lens, &mut pos) || pos.is_negative() {
            return None;
        }
        let mut i = 0;
        while i < as_.len() {
            let lhs = as_[i];
            if let Some(k) = lens.iter().position(|&x| x == lhs) {
                lens.remove(k);
            } else if self.is_unit(lhs) && pos.is_positive() {
                pos -= 1;
            } else {
                break;
            }
            i += 1;
        }
        let sort = self.tm.sort(as_[0]);
        if i == as_.len() {
            return Some(self.tm.mk_concat_list(as_, sort));
        }
        if i == 0 {
            return None;
        }
        let t1 = self.tm.mk_concat_list(&as_[i..], sort);
        let t2 = self.mk_len(&pos, &lens);
        let rest = self.tm.mk_seq_extract(t1, b, t2);
        as_[i] = rest;
        Some(self.tm.mk_concat_list(&as_[..=i], sort))
    }

    /// Extract cascade.
    pub(crate) fn mk_seq_extract(&mut self, a: TermId, b: TermId, c: TermId) -> RewriteResult {
        let a_sort = self.tm.sort(a);
        let base = self.tm.str_value(a).cloned();
        let pos = self.tm.int_value(b).cloned();
        let len = self.tm.int_value(c).cloned();

        if self.sign_is_determined(c) == Some(Sign::Neg) {
            let result = self.tm.mk_seq_empty(a_sort);
            return RewriteResult::Done(result);
        }
        if pos.as_ref().is_some_and(|p| p.is_negative())
            || len.as_ref().is_some_and(|l| !l.is_positive())
        {
            let result = self.tm.mk_seq_empty(a_sort);
            return RewriteResult::Done(result);
        }
        if let (Some(p), Some(s)) = (&pos, &base) {
            if *p >= BigInt::from(s.len()) {
                let result = self.tm.mk_seq_empty(a_sort);
                return RewriteResult::Done(result);
            }
        }
        if let Some(p) = &pos {
            let (bounded, max_a) = max_length(&self.tm, a);
            if bounded && BigInt::from(max_a) <= *p {
                let result = self.tm.mk_seq_empty(a_sort);
                return RewriteResult::Done(result);
            }
        }

        let upos = pos.as_ref().and_then(|p| p.to_u64());
        let ulen = len.as_ref().and_then(|l| l.to_u64());

        if upos.is_some() && ulen == Some(1) {
            let result = self.tm.mk_seq_at(a, b);
            return RewriteResult::Rewrite1(result);
        }
        if let (Some(p), Some(l), Some(s)) = (upos, ulen, &base) {
            let result = self.tm.mk_str(s.extract(p as usize, l as usize));
            return RewriteResult::Done(result);
        }

        let as_ = self.concat_units(a);
        if as_.is_empty() {
            let result = self.tm.mk_seq_empty(a_sort);
            return RewriteResult::Done(result);
        }

        if let Some(result) = self.extract_pop_suffix(&as_, b, c) {
            return RewriteResult::Rewrite1(result);
        }
        if let Some(result) = self.extract_push_offset(&as_, b, c) {
            return RewriteResult::Rewrite3(result);
        }
        let mut as_vec = as_.clone();
        if let Some(result) = self.extract_push_length(&mut as_vec, b, c) {
            return RewriteResult::Rewrite3(result);
        }

        if let TermKind::SeqExtract(a1, b1, c1) = *self.tm.kind(a) {
            if self.is_suffix_window(a1, b1, c1) && self.is_suffix_window(a, b, c) {
                let off = self.tm.mk_add2(b1, b);
                let ln = self.tm.mk_sub(c1, b);
                let result = self.tm.mk_seq_extract(a1, off, ln);
                return RewriteResult::Rewrite3(result);
            }
            let r1 = self.tm.int_value(b1).and_then(|n| n.to_u64());
            let r2 = self.tm.int_value(c1).and_then(|n| n.to_u64());
            if let (Some(r1), Some(r2), Some(p), Some(l)) = (r1, r2, upos, ulen) {
                if r1 == 0 && r2 >= p + l {
                    let result = self.tm.mk_seq_extract(a1, b, c);
                    return RewriteResult::Rewrite1(result);
                }
                // extract(extract(x, p1, l1), p2, l2)
                //   = extract(x, p1 + p2, min(l1 - p2, l2)) when p2 <= l1.
                if p <= r2 {
                    let np = self.tm.mk_int(BigInt::from(r1 + p));
                    let nl = self.tm.mk_int(BigInt::from(u64::min(r2 - p, l)));
                    let result = self.tm.mk_seq_extract(a1, np, nl);
                    return RewriteResult::Rewrite1(result);
                }
            }
            if self.is_prefix_window(a1, b1, c1) && self.is_prefix_window(a, b, c) {
                let len_a = self.tm.mk_seq_len(a);
                let cut = self.tm.mk_sub(len_a, c);
                let ln = self.tm.mk_sub(c1, cut);
                let result = self.tm.mk_seq_extract(a1, b, ln);
                return RewriteResult::Rewrite3(result);
            }
            if self.is_prefix_window(a, b, c) && self.is_suffix_window(a1, b1, c1) {
                let len_a = self.tm.mk_seq_len(a);
                let q = self.tm.mk_sub(c, len_a);
                let ln = self.tm.mk_add2(c1, q);
                let result = self.tm.mk_seq_extract(a1, b1, ln);
                return RewriteResult::Rewrite3(result);
            }
            // extract(extract(x, p, l), 0, len(x)) = extract(x, p, l)
            if upos == Some(0) {
                if let TermKind::SeqLen(x) = *self.tm.kind(c) {
                    if x == a1 {
                        return RewriteResult::Done(a);
                    }
                }
                if c == c1 {
                    return RewriteResult::Done(a);
                }
            }
            if self.is_suffix_window(a, b, c)
                && self.tm.int_value(c1).is_some()
                && self.tm.int_value(b1).is_some()
            {
                let off = self.tm.mk_add2(b, b1);
                let ln = self.tm.mk_sub(c1, b);
                let result = self.tm.mk_seq_extract(a1, off, ln);
                return RewriteResult::Rewrite2(result);
            }
        }

        let Some(p) = upos else {
            return RewriteResult::Failed;
        };

        let mut offset = 0usize;
        while offset < as_.len() && self.is_unit(as_[offset]) && (offset as u64) < p {
            offset += 1;
        }
        if offset == 0 && p > 0 {
            return RewriteResult::Failed;
        }
        let all_units = as_.iter().all(|&e| self.is_unit(e));
        if p == 0 && all_units {
            let mut result = self.tm.mk_seq_empty(a_sort);
            for i in 1..=as_.len() {
                let bound = self.tm.mk_int_usize(i);
                let ge = self.tm.mk_ge(c, bound);
                let prefix = self.tm.mk_concat_list(&as_[..i], a_sort);
                result = self.tm.mk_ite(ge, prefix, result);
            }
            return RewriteResult::RewriteFull(result);
        }
        if p == 0 && ulen.is_none() {
            return RewriteResult::Failed;
        }
        if offset == as_.len() {
            let result = self.tm.mk_seq_empty(a_sort);
            return RewriteResult::Done(result);
        }
        if let Some(l) = ulen {
            if p == offset as u64 {
                let mut i = offset;
                while i < as_.len() && self.is_unit(as_[i]) && ((i - offset) as u64) < l {
                    i += 1;
                }
                if (i - offset) as u64 == l {
                    let result = self.tm.mk_concat_list(&as_[offset..i], a_sort);
                    return RewriteResult::Done(result);
                }
                if i == as_.len() {
                    let result = self.tm.mk_concat_list(&as_[offset..], a_sort);
                    return RewriteResult::Done(result);
                }
            }
        }
        if offset == 0 {
            return RewriteResult::Failed;
        }
        let off = self.tm.mk_int_usize(offset);
        let position = self.tm.mk_sub(b, off);
        let rest = self.tm.mk_concat_list(&as_[offset..], a_sort);
        let result = self.tm.mk_seq_extract(rest, position, c);
        RewriteResult::Rewrite3(result)
    }

    // ------------------------------------------------------------------
    // at / nth
    // ------------------------------------------------------------------

    /// `at` cascade.
    pub(crate) fn mk_seq_at(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let sort_a = self.tm.sort(a);
        if let TermKind::SeqExtract(a1, offset, len) = *self.tm.kind(a) {
            let off_zero = matches!(self.tm.int_value(offset), Some(n) if n.is_zero());
            if off_zero {
                if let (Some(len_r), Some(r)) = (self.tm.int_value(len), self.tm.int_value(b)) {
                    if r < len_r {
                        let result = self.tm.mk_seq_at(a1, b);
                        return RewriteResult::Rewrite1(result);
                    }
                }
            }
        }
        let mut lens = Vec::new();
        let mut r = BigInt::zero();
        if !self.get_lengths(b, &mut lens, &mut r) {
            return RewriteResult::Failed;
        }
        if lens.is_empty() && r.is_negative() {
            let result = self.tm.mk_seq_empty(sort_a);
            return RewriteResult::Done(result);
        }
        if lens.is_empty() {
            if let TermKind::SeqAt(..) = *self.tm.kind(a) {
                let result = if r.is_positive() {
                    self.tm.mk_seq_empty(sort_a)
                } else {
                    a
                };
                return RewriteResult::Done(result);
            }
        }

        let lhs = self.concat_units(a);
        if lhs.is_empty() {
            let result = self.tm.mk_seq_empty(sort_a);
            return RewriteResult::Done(result);
        }
        let mut i = 0;
        while i < lhs.len() {
            let e = lhs[i];
            if !r.is_negative() && lens.contains(&e) {
                let k = lens.iter().position(|&x| x == e).unwrap_or(0);
                lens.remove(k);
            } else if self.is_unit(e) && r.is_zero() && lens.is_empty() {
                return RewriteResult::Rewrite1(e);
            } else if self.is_unit(e) && r.is_positive() {
                r -= 1;
            } else {
                break;
            }
            i += 1;
        }
        if i == 0 {
            return RewriteResult::Failed;
        }
        if i == lhs.len() {
            let result = self.tm.mk_seq_empty(sort_a);
            return RewriteResult::Done(result);
        }
        let mut pos = self.tm.mk_int(r);
        for &rhs in &lens {
            let l = self.tm.mk_seq_len(rhs);
            pos = self.tm.mk_add2(pos, l);
        }
        let rest = self.tm.mk_concat_list(&lhs[i..], sort_a);
        let result = self.tm.mk_seq_at(rest, pos);
        RewriteResult::Rewrite2(result)
    }

    /// Generic `nth`: splits into the in-bounds and out-of-bounds function
    /// symbols.
    pub(crate) fn mk_seq_nth(&mut self, a: TermId, b: TermId) -> RewriteResult {
        if let Some(s) = self.tm.as_seq_unit(a) {
            if matches!(self.tm.int_value(b), Some(n) if n.is_zero()) {
                return RewriteResult::Done(s);
            }
        }
        if let TermKind::SeqExtract(s, p, len) = *self.tm.kind(a) {
            if let Some(pos1) = self.tm.int_value(p).cloned() {
                if pos1.is_positive() {
                    let mut lens = Vec::new();
                    let mut pos2 = BigInt::zero();
                    if self.get_lengths(len, &mut lens, &mut pos2)
                        && pos1 == -pos2.clone()
                        && lens.len() == 1
                        && lens[0] == s
                    {
                        // nth(s[k, |s| - k], b) case split on where b lands.
                        let k = self.tm.mk_int(pos1);
                        let bk = self.tm.mk_add2(b, k);
                        let case1 = self.tm.mk_seq_nth_i(s, bk);
                        let empty = self.tm.mk_seq_empty(self.tm.sort(s));
                        let case2 = self.tm.mk_seq_nth_u(empty, b);
                        let case3 = self.tm.mk_seq_nth_u(a, b);
                        let len_s = self.tm.mk_seq_len(s);
                        let in_range = self.tm.mk_lt(bk, len_s);
                        let mut result = self.tm.mk_ite(in_range, case1, case3);
                        let k_past = self.tm.mk_ge(k, len_s);
                        result = self.tm.mk_ite(k_past, case2, result);
                        let zero = self.zero();
                        let b_neg = self.tm.mk_lt(b, zero);
                        result = self.tm.mk_ite(b_neg, case3, result);
                        return RewriteResult::RewriteFull(result);
                    }
                }
            }
        }
        let (exact, len_a) = min_length1(&self.tm, a);
        if exact {
            if let Some(p) = self.tm.int_value(b).cloned() {
                let result = if !p.is_negative() && p < BigInt::from(len_a) {
                    self.tm.mk_seq_nth_i(a, b)
                } else {
                    self.tm.mk_seq_nth_u(a, b)
                };
                return RewriteResult::RewriteFull(result);
            }
        }
        let la = self.tm.mk_seq_len(a);
        let zero = self.zero();
        let b_ge = self.tm.mk_ge(b, zero);
        let le = self.tm.mk_le(la, b);
        let not_le = self.tm.mk_not(le);
        let in_bounds = self.tm.mk_and2(b_ge, not_le);
        let nth_i = self.tm.mk_seq_nth_i(a, b);
        let nth_u = self.tm.mk_seq_nth_u(a, b);
        let result = self.tm.mk_ite(in_bounds, nth_i, nth_u);
        RewriteResult::RewriteFull(result)
    }

    /// In-bounds `nth` cascade.
    pub(crate) fn mk_seq_nth_i(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let Some(offset) = self.tm.int_value(b).and_then(|n| n.to_u64()) else {
            return RewriteResult::Failed;
        };
        if offset == 0 {
            if let TermKind::SeqAt(a2, i2) = *self.tm.kind(a) {
                if matches!(self.tm.int_value(i2), Some(n) if n.is_zero()) {
                    let result = self.tm.mk_seq_nth_i(a2, i2);
                    return RewriteResult::Rewrite1(result);
                }
            }
        }
        if let TermKind::SeqMap(f, s) = *self.tm.kind(a) {
            let inner = self.tm.mk_seq_nth_i(s, b);
            let result = self.tm.mk_select(vec![f, inner]);
            return RewriteResult::Rewrite1(result);
        }
        let as_ = self.concat_units(a);
        let mut offset = offset;
        for (i, &e) in as_.iter().enumerate() {
            if let Some(u) = self.tm.as_seq_unit(e) {
                if offset == i as u64 {
                    return RewriteResult::Done(u);
                }
                continue;
            }
            if let TermKind::Ite(cond, th, el) = *self.tm.kind(e) {
                let (exact, len1) = min_length1(&self.tm, e);
                if !exact {
                    break;
                }
                if (i as u64) + len1 < offset {
                    offset -= len1;
                    continue;
                }
                let idx = self.tm.mk_int(BigInt::from(offset - i as u64));
                let th = self.tm.mk_seq_nth_i(th, idx);
                let el = self.tm.mk_seq_nth_i(el, idx);
                let result = self.tm.mk_ite(cond, th, el);
                return RewriteResult::Rewrite2(result);
            }
            break;
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // indexof / last_indexof
    // ------------------------------------------------------------------

    fn compare_lengths(&self, as_: &[TermId], bs: &[TermId]) -> LengthClass {
        let mut units_a = 0usize;
        let mut units_b = 0usize;
        let mut mults: Vec<(TermId, usize)> = Vec::new();
        let mut b_has_foreign = false;
        for &x in as_ {
            if self.is_unit(x) {
                units_a += 1;
            } else if let Some(e) = mults.iter_mut().find(|(t, _)| *t == x) {
                e.1 += 1;
            } else {
                mults.push((x, 1));
            }
        }
        for &y in bs {
            if self.is_unit(y) {
                units_b += 1;
            } else if let Some(k) = mults.iter().position(|(t, _)| *t == y) {
                if mults[k].1 == 1 {
                    mults.remove(k);
                } else {
                    mults[k].1 -= 1;
                }
            } else {
                b_has_foreign = true;
            }
        }
        if units_a > units_b && !b_has_foreign {
            LengthClass::Longer
        } else if units_a == units_b && !b_has_foreign && mults.is_empty() {
            LengthClass::Same
        } else if units_b > units_a && mults.is_empty() {
            LengthClass::Shorter
        } else {
            LengthClass::Unknown
        }
    }

    /// `indexof` cascade.
    pub(crate) fn mk_seq_index(&mut self, a: TermId, b: TermId, c: TermId) -> RewriteResult {
        let sort_a = self.tm.sort(a);
        let s1 = self.tm.str_value(a).cloned();
        let s2 = self.tm.str_value(b).cloned();
        if let (Some(x), Some(y), Some(r)) = (&s1, &s2, self.tm.int_value(c)) {
            if let Some(start) = r.to_u64() {
                let idx = match x.indexof(y, start as usize) {
                    Some(i) => BigInt::from(i),
                    None => BigInt::from(-1),
                };
                let result = self.tm.mk_int(idx);
                return RewriteResult::Done(result);
            }
        }
        if matches!(self.tm.int_value(c), Some(n) if n.is_negative()) {
            let result = self.minus_one();
            return RewriteResult::Done(result);
        }
        let c_zero = matches!(self.tm.int_value(c), Some(n) if n.is_zero());
        if self.tm.is_seq_empty(b) && c_zero {
            return RewriteResult::Done(c);
        }
        if self.tm.is_seq_empty(b) {
            let zero = self.zero();
            let lo = self.tm.mk_le(zero, c);
            let len_a = self.tm.mk_seq_len(a);
            let hi = self.tm.mk_le(c, len_a);
            let cond = self.tm.mk_and2(lo, hi);
            let m1 = self.minus_one();
            let result = self.tm.mk_ite(cond, c, m1);
            return RewriteResult::Rewrite2(result);
        }
        if self.tm.is_seq_empty(a) {
            let emp = self.tm.mk_seq_is_empty(b);
            let zero = self.zero();
            let at_start = self.tm.mk_eq(c, zero);
            let cond = self.tm.mk_and2(at_start, emp);
            let m1 = self.minus_one();
            let result = self.tm.mk_ite(cond, zero, m1);
            return RewriteResult::Rewrite2(result);
        }
        if a == b {
            if let Some(r) = self.tm.int_value(c) {
                let result = if r.is_zero() { self.zero() } else { self.minus_one() };
                return RewriteResult::Done(result);
            }
            let zero = self.zero();
            let cond = self.tm.mk_eq(zero, c);
            let m1 = self.minus_one();
            let result = self.tm.mk_ite(cond, zero, m1);
            return RewriteResult::Rewrite2(result);
        }
        if let TermKind::SeqExtract(_, _, len1) = *self.tm.kind(a) {
            if let (Some(r1), Some(r2)) = (self.tm.int_value(len1), self.tm.int_value(c)) {
                if r2 > r1 {
                    let result = self.minus_one();
                    return RewriteResult::Done(result);
                }
            }
        }

        let as_ = self.concat_units(a);
        if let Some(mut r) = self.tm.int_value(c).cloned() {
            let mut i = 0usize;
            while r.is_positive() && i < as_.len() && self.is_unit(as_[i]) {
                r -= 1;
                i += 1;
            }
            if i > 0 {
                let a1 = self.tm.mk_concat_list(&as_[i..], sort_a);
                let start = self.tm.mk_int(r);
                let idx = self.tm.mk_seq_indexof(a1, b, start);
                let zero = self.zero();
                let found = self.tm.mk_ge(idx, zero);
                let skipped = self.tm.mk_int_usize(i);
                let shifted = self.tm.mk_add2(skipped, idx);
                let m1 = self.minus_one();
                let result = self.tm.mk_ite(found, shifted, m1);
                return RewriteResult::RewriteFull(result);
            }
        }
        let is_zero = c_zero;
        let bs = self.concat_units(b);
        let mut i = 0usize;
        while is_zero
            && i < as_.len()
            && !bs.is_empty()
            && self.is_unit(as_[i])
            && self.is_unit(bs[0])
            && self.tm.are_distinct(as_[i], bs[0])
        {
            i += 1;
        }
        if i > 0 {
            let a1 = self.tm.mk_concat_list(&as_[i..], sort_a);
            let idx = self.tm.mk_seq_indexof(a1, b, c);
            let zero = self.zero();
            let found = self.tm.mk_ge(idx, zero);
            let skipped = self.tm.mk_int_usize(i);
            let shifted = self.tm.mk_add2(skipped, idx);
            let m1 = self.minus_one();
            let result = self.tm.mk_ite(found, shifted, m1);
            return RewriteResult::RewriteFull(result);
        }

        match self.compare_lengths(&as_, &bs) {
            LengthClass::Shorter if is_zero => {
                let result = self.minus_one();
                return RewriteResult::Done(result);
            }
            LengthClass::Same => {
                let zero = self.zero();
                let m1 = self.minus_one();
                let eq_ab = self.tm.mk_eq(a, b);
                let if_eq = self.tm.mk_ite(eq_ab, zero, m1);
                let at_zero = self.tm.mk_eq(c, zero);
                let inner = self.tm.mk_ite(at_zero, if_eq, m1);
                let le = self.tm.mk_le(c, m1);
                let result = self.tm.mk_ite(le, m1, inner);
                return RewriteResult::RewriteFull(result);
            }
            _ => {}
        }
        if is_zero && !as_.is_empty() && self.is_unit(as_[0]) {
            let a1 = self.tm.mk_concat_list(&as_[1..], sort_a);
            let b1 = self.tm.mk_seq_indexof(a1, b, c);
            let zero = self.zero();
            let one = self.one();
            let m1 = self.minus_one();
            let prefix = self.tm.mk_seq_prefixof(b, a);
            let found = self.tm.mk_ge(b1, zero);
            let shifted = self.tm.mk_add2(one, b1);
            let shifted = self.tm.mk_ite(found, shifted, m1);
            let result = self.tm.mk_ite(prefix, zero, shifted);
            return RewriteResult::Rewrite3(result);
        }
        if self.is_unit(b) && self.tm.is_value(b) {
            if let Some(ra) = self.reduce_by_char(a, b, 4) {
                let result = self.tm.mk_seq_indexof(ra, b, c);
                return RewriteResult::Rewrite1(result);
            }
        }
        RewriteResult::Failed
    }

    /// `last_indexof` cascade.
    pub(crate) fn mk_seq_last_index(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let s1 = self.tm.str_value(a).cloned();
        let s2 = self.tm.str_value(b).cloned();
        if let (Some(x), Some(y)) = (s1, s2) {
            let idx = match x.last_indexof(&y) {
                Some(i) => BigInt::from(i),
                None => BigInt::from(-1),
            };
            let result = self.tm.mk_int(idx);
            return RewriteResult::Done(result);
        }
        if a == b {
            let result = self.zero();
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // contains
    // ------------------------------------------------------------------

    /// No prefix of `b` can appear at the end of `a`.
    pub(crate) fn cannot_contain_suffix(&self, a: TermId, b: TermId) -> bool {
        if self.is_unit(a) && self.is_unit(b) && self.tm.are_distinct(a, b) {
            return true;
        }
        if let (Some(x), Some(y)) = (self.tm.str_value(a), self.tm.str_value(b)) {
            for i in 1..=x.len() {
                if x.extract(0, i).suffix_of(y) {
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// No suffix of `a` is a prefix of `b`, so `b` cannot start inside `a`.
    pub(crate) fn cannot_contain_prefix(&self, a: TermId, b: TermId) -> bool {
        if self.is_unit(a) && self.is_unit(b) && self.tm.are_distinct(a, b) {
            return true;
        }
        if let (Some(x), Some(y)) = (self.tm.str_value(a), self.tm.str_value(b)) {
            for i in 0..x.len() {
                if x.extract(i, x.len() - i).suffix_of(y) {
                    return false;
                }
            }
            return true;
        }
        false
    }

    /// Strip `replace`/`concat`/`extract` layers that cannot affect whether
    /// the value unit `ch` occurs; depth-throttled.
    fn reduce_by_char(&mut self, r: TermId, ch: TermId, depth: u32) -> Option<TermId> {
        match self.tm.kind(r).clone() {
            TermKind::SeqReplace(x, y, z) => {
                let value_unit =
                    |this: &Self, t: TermId| this.is_unit(t) && this.tm.is_value(t);
                if value_unit(self, y) && value_unit(self, z) && ch != y && ch != z {
                    let mut out = x;
                    if depth > 0 {
                        if let Some(x2) = self.reduce_by_char(x, ch, depth - 1) {
                            out = x2;
                        }
                    }
                    return Some(out);
                }
                None
            }
            TermKind::SeqConcat(x, y) if depth > 0 => {
                let rx = self.reduce_by_char(x, ch, depth - 1);
                let ry = self.reduce_by_char(y, ch, depth - 1);
                if rx.is_none() && ry.is_none() {
                    return None;
                }
                let nx = rx.unwrap_or(x);
                let ny = ry.unwrap_or(y);
                Some(self.tm.mk_seq_concat(nx, ny))
            }
            TermKind::SeqExtract(x, y, z) if depth > 0 => {
                let x2 = self.reduce_by_char(x, ch, depth - 1)?;
                Some(self.tm.mk_seq_extract(x2, y, z))
            }
            _ => None,
        }
    }

    /// `contains` cascade.
    pub(crate) fn mk_seq_contains(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let sort_a = self.tm.sort(a);
        if let (Some(x), Some(y)) = (self.tm.str_value(a), self.tm.str_value(b)) {
            let v = x.contains(y);
            let result = self.tm.mk_bool(v);
            return RewriteResult::Done(result);
        }
        if let TermKind::SeqExtract(x, _, _) = *self.tm.kind(b) {
            if x == a {
                let result = self.tm.mk_true();
                return RewriteResult::Done(result);
            }
        }
        let as_ = self.concat_units(a);
        let bs = self.concat_units(b);
        if bs.is_empty() {
            let result = self.tm.mk_true();
            return RewriteResult::Done(result);
        }
        if as_.is_empty() {
            let result = self.tm.mk_seq_is_empty(b);
            return RewriteResult::Rewrite2(result);
        }
        // Syntactic subsequence match at the atom level.
        for i in 0..=(as_.len().saturating_sub(bs.len())) {
            if as_[i..i + bs.len()] == bs[..] {
                let result = self.tm.mk_true();
                return RewriteResult::Done(result);
            }
        }
        let all_values_a = as_.iter().all(|&e| self.tm.is_value(e));
        let all_values_b = bs.iter().all(|&e| self.tm.is_value(e));
        if all_values_a && all_values_b {
            // All values and no positional match above.
            let result = self.tm.mk_false();
            return RewriteResult::Done(result);
        }
        let (exact_a, len_a) = min_length(&self.tm, &as_);
        if exact_a {
            let len_b = min_length(&self.tm, &bs).1;
            if len_b > len_a {
                let result = self.tm.mk_false();
                return RewriteResult::Done(result);
            }
        }
        let b0 = bs[0];
        let b_last = bs[bs.len() - 1];
        let mut offs = 0usize;
        while offs < as_.len() && self.cannot_contain_prefix(as_[offs], b0) {
            offs += 1;
        }
        let mut sz = as_.len();
        while sz > offs && self.cannot_contain_suffix(as_[sz - 1], b_last) {
            sz -= 1;
        }
        if offs == sz {
            let result = self.tm.mk_seq_is_empty(b);
            return RewriteResult::Rewrite2(result);
        }
        if offs > 0 || sz < as_.len() {
            let mid = self.tm.mk_concat_list(&as_[offs..sz], sort_a);
            let result = self.tm.mk_seq_contains(mid, b);
            return RewriteResult::Rewrite2(result);
        }

        let all_units_a = as_.iter().all(|&e| self.is_unit(e));
        let all_units_b = bs.iter().all(|&e| self.is_unit(e));
        if all_units_a && all_units_b {
            if bs.len() > as_.len() {
                let result = self.tm.mk_false();
                return RewriteResult::Done(result);
            }
            let mut ors = Vec::new();
            for i in 0..=(as_.len() - bs.len()) {
                let mut ands = Vec::with_capacity(bs.len());
                for j in 0..bs.len() {
                    ands.push(self.tm.mk_eq(as_[i + j], bs[j]));
                }
                ors.push(self.tm.mk_and(ands));
            }
            let result = self.tm.mk_or(ors);
            return RewriteResult::RewriteFull(result);
        }
        if bs.len() == 1 && all_units_b && as_.len() > 1 {
            let mut ors = Vec::with_capacity(as_.len());
            for &ai in &as_ {
                ors.push(self.tm.mk_seq_contains(ai, bs[0]));
            }
            let result = self.tm.mk_or(ors);
            return RewriteResult::RewriteFull(result);
        }
        if self.is_unit(b) && self.tm.is_value(b) {
            if let Some(ra) = self.reduce_by_char(a, b, 4) {
                let result = self.tm.mk_seq_contains(ra, b);
                return RewriteResult::Rewrite1(result);
            }
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // prefix / suffix
    // ------------------------------------------------------------------

    fn leftmost_concat(&self, mut t: TermId) -> TermId {
        while let TermKind::SeqConcat(l, _) = *self.tm.kind(t) {
            t = l;
        }
        t
    }

    /// `prefixof` cascade.
    pub(crate) fn mk_seq_prefix(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let sort_a = self.tm.sort(a);
        if let (Some(x), Some(y)) = (self.tm.str_value(a), self.tm.str_value(b)) {
            let v = x.prefix_of(y);
            let result = self.tm.mk_bool(v);
            return RewriteResult::Done(result);
        }
        if self.tm.is_seq_empty(a) {
            let result = self.tm.mk_true();
            return RewriteResult::Done(result);
        }
        let a1 = self.leftmost_concat(a);
        let b1 = self.leftmost_concat(b);
        let sa = self.tm.str_value(a1).cloned();
        let sb = self.tm.str_value(b1).cloned();
        if a1 != b1 {
            if let (Some(s1), Some(s2)) = (sa, sb) {
                if s1.len() <= s2.len() {
                    if s1.prefix_of(&s2) {
                        if a == a1 {
                            let result = self.tm.mk_true();
                            return RewriteResult::Done(result);
                        }
                        let as_ = self.concat_atoms(a);
                        let mut bs = self.concat_atoms(b);
                        let rest = s2.extract(s1.len(), s2.len() - s1.len());
                        bs[0] = self.tm.mk_str(rest);
                        let na = self.tm.mk_concat_list(&as_[1..], sort_a);
                        let nb = self.tm.mk_concat_list(&bs, sort_a);
                        let result = self.tm.mk_seq_prefixof(na, nb);
                        return RewriteResult::RewriteFull(result);
                    }
                    let result = self.tm.mk_false();
                    return RewriteResult::Done(result);
                }
                if s2.prefix_of(&s1) {
                    if b == b1 {
                        let result = self.tm.mk_false();
                        return RewriteResult::Done(result);
                    }
                    let mut as_ = self.concat_atoms(a);
                    let bs = self.concat_atoms(b);
                    let rest = s1.extract(s2.len(), s1.len() - s2.len());
                    as_[0] = self.tm.mk_str(rest);
                    let na = self.tm.mk_concat_list(&as_, sort_a);
                    let nb = self.tm.mk_concat_list(&bs[1..], sort_a);
                    let result = self.tm.mk_seq_prefixof(na, nb);
                    return RewriteResult::RewriteFull(result);
                }
                let result = self.tm.mk_false();
                return RewriteResult::Done(result);
            }
        }
        let as_ = self.concat_units(a);
        let bs = self.concat_units(b);
        let mut eqs = Vec::new();
        let mut i = 0usize;
        while i < as_.len() && i < bs.len() {
            let (ai, bi) = (as_[i], bs[i]);
            if self.tm.are_equal(ai, bi) {
                i += 1;
                continue;
            }
            if self.tm.are_distinct(ai, bi) {
                let result = self.tm.mk_false();
                return RewriteResult::Done(result);
            }
            if self.is_unit(ai) && self.is_unit(bi) {
                eqs.push(self.tm.mk_eq(ai, bi));
                i += 1;
                continue;
            }
            break;
        }
        if i == as_.len() {
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if i == bs.len() {
            for &aj in &as_[i..] {
                let e = self.tm.mk_seq_is_empty(aj);
                eqs.push(e);
            }
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if i > 0 {
            let na = self.tm.mk_concat_list(&as_[i..], sort_a);
            let nb = self.tm.mk_concat_list(&bs[i..], sort_a);
            eqs.push(self.tm.mk_seq_prefixof(na, nb));
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if let TermKind::SeqReplace(r1, r2, r3) = *self.tm.kind(a) {
            if r1 == r3 && r2 == b {
                let result = self.tm.mk_seq_prefixof(r1, b);
                return RewriteResult::Done(result);
            }
        }
        let (bounded_b, len_b) = max_length(&self.tm, b);
        if bounded_b {
            let (_, len_a) = min_length1(&self.tm, a);
            if len_b <= len_a {
                let result = self.tm.mk_eq(a, b);
                return RewriteResult::Rewrite1(result);
            }
        }
        RewriteResult::Failed
    }

    /// `suffixof` cascade.
    pub(crate) fn mk_seq_suffix(&mut self, a: TermId, b: TermId) -> RewriteResult {
        if a == b {
            let result = self.tm.mk_true();
            return RewriteResult::Done(result);
        }
        let sort_a = self.tm.sort(a);
        if self.tm.is_seq_empty(a) {
            let result = self.tm.mk_true();
            return RewriteResult::Done(result);
        }
        if self.tm.is_seq_empty(b) {
            let result = self.tm.mk_seq_is_empty(a);
            return RewriteResult::Rewrite3(result);
        }
        let as_ = self.concat_units(a);
        let bs = self.concat_units(b);
        let (sza, szb) = (as_.len(), bs.len());
        let mut eqs = Vec::new();
        let mut i = 1usize;
        while i <= sza && i <= szb {
            let (ai, bi) = (as_[sza - i], bs[szb - i]);
            if self.tm.are_equal(ai, bi) {
                i += 1;
                continue;
            }
            if self.tm.are_distinct(ai, bi) {
                let result = self.tm.mk_false();
                return RewriteResult::Done(result);
            }
            if self.is_unit(ai) && self.is_unit(bi) {
                eqs.push(self.tm.mk_eq(ai, bi));
                i += 1;
                continue;
            }
            break;
        }
        if i > sza {
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if i > szb {
            for j in i..=sza {
                let e = self.tm.mk_seq_is_empty(as_[sza - j]);
                eqs.push(e);
            }
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if i > 1 {
            let na = self.tm.mk_concat_list(&as_[..sza - i + 1], sort_a);
            let nb = self.tm.mk_concat_list(&bs[..szb - i + 1], sort_a);
            eqs.push(self.tm.mk_seq_suffixof(na, nb));
            let result = self.tm.mk_and(eqs);
            return RewriteResult::Rewrite3(result);
        }
        if let TermKind::SeqReplace(r1, r2, r3) = *self.tm.kind(a) {
            if r1 == r3 && r2 == b {
                let result = self.tm.mk_seq_suffixof(r1, b);
                return RewriteResult::Done(result);
            }
        }
        let (bounded_b, len_b) = max_length(&self.tm, b);
        if bounded_b {
            let (_, len_a) = min_length1(&self.tm, a);
            if len_b <= len_a {
                let result = self.tm.mk_eq(a, b);
                return RewriteResult::Rewrite1(result);
            }
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // replace / replace_all
    // ------------------------------------------------------------------

    /// `replace` cascade.
    pub(crate) fn mk_seq_replace(&mut self, a: TermId, b: TermId, c: TermId) -> RewriteResult {
        let sort_a = self.tm.sort(a);
        if let (Some(x), Some(y), Some(z)) = (
            self.tm.str_value(a).cloned(),
            self.tm.str_value(b).cloned(),
            self.tm.str_value(c).cloned(),
        ) {
            let result = self.tm.mk_str(x.replace(&y, &z));
            return RewriteResult::Done(result);
        }
        if b == c {
            return RewriteResult::Done(a);
        }
        if a == b {
            return RewriteResult::Done(c);
        }
        if self.tm.is_seq_empty(b) {
            let result = self.tm.mk_seq_concat(c, a);
            return RewriteResult::Rewrite1(result);
        }
        if self.tm.is_seq_empty(a) && self.tm.is_seq_empty(c) {
            return RewriteResult::Done(a);
        }
        let lhs_atoms = self.concat_atoms(a);
        if lhs_atoms.is_empty() {
            let b_atoms = self.concat_atoms(b);
            let len = min_length(&self.tm, &b_atoms).1;
            if len > 0 {
                return RewriteResult::Done(a);
            }
            return RewriteResult::Failed;
        }
        // a = b + rest
        if lhs_atoms[0] == b {
            let mut atoms = lhs_atoms.clone();
            atoms[0] = c;
            let result = self.tm.mk_concat_list(&atoms, sort_a);
            return RewriteResult::Rewrite1(result);
        }
        if let (Some(s2), Some(s3), Some(s1)) = (
            self.tm.str_value(b).cloned(),
            self.tm.str_value(c).cloned(),
            self.tm.str_value(lhs_atoms[0]).cloned(),
        ) {
            if s1.contains(&s2) {
                let mut atoms = lhs_atoms.clone();
                atoms[0] = self.tm.mk_str(s1.replace(&s2, &s3));
                let result = self.tm.mk_concat_list(&atoms, sort_a);
                return RewriteResult::Rewrite1(result);
            }
        }
        let lhs = self.concat_units(a);
        let rhs = self.concat_units(b);
        if rhs.is_empty() {
            let result = self.tm.mk_seq_concat(c, a);
            return RewriteResult::Rewrite1(result);
        }
        // Is b a prefix of the atoms of a at position i?
        let compare_at = |this: &Self, i: usize| -> Lbool {
            for j in 0..rhs.len() {
                if i + j >= lhs.len() {
                    break;
                }
                let b0 = rhs[j];
                let a0 = lhs[i + j];
                if this.tm.are_equal(a0, b0) {
                    continue;
                }
                if !this.is_unit(b0) || !this.is_unit(a0) {
                    return Lbool::Undef;
                }
                if this.tm.are_distinct(a0, b0) {
                    return Lbool::False;
                }
                return Lbool::Undef;
            }
            Lbool::True
        };
        let mut i = 0usize;
        while i < lhs.len() {
            let cmp = compare_at(self, i);
            if cmp == Lbool::False && self.is_unit(lhs[i]) {
                i += 1;
                continue;
            }
            if cmp == Lbool::True && lhs.len() < i + rhs.len() {
                let a1 = self.tm.mk_concat_list(&lhs[..i], sort_a);
                let a2 = self.tm.mk_concat_list(&lhs[i..], sort_a);
                let matched = self.tm.mk_eq(a2, b);
                let replaced = self.tm.mk_seq_concat(a1, c);
                let result = self.tm.mk_ite(matched, replaced, a);
                return RewriteResult::RewriteFull(result);
            }
            if cmp == Lbool::True {
                let mut es = Vec::new();
                es.extend_from_slice(&lhs[..i]);
                es.push(c);
                es.extend_from_slice(&lhs[i + rhs.len()..]);
                let result = self.tm.mk_concat_list(&es, sort_a);
                return RewriteResult::RewriteFull(result);
            }
            break;
        }
        if i > 0 {
            let a1 = self.tm.mk_concat_list(&lhs[..i], sort_a);
            let a2 = self.tm.mk_concat_list(&lhs[i..], sort_a);
            let tail = self.tm.mk_seq_replace(a2, b, c);
            let result = self.tm.mk_seq_concat(a1, tail);
            return RewriteResult::RewriteFull(result);
        }
        RewriteResult::Failed
    }

    /// All unit values of `s`, when `s` is entirely unit values.
    fn try_get_unit_values(&mut self, s: TermId) -> Option<Vec<TermId>> {
        let units = self.concat_units(s);
        for &u in &units {
            let v = self.tm.as_seq_unit(u)?;
            if !self.tm.is_value(v) {
                return None;
            }
        }
        Some(units)
    }

    /// Replace every (non-overlapping, left-to-right) occurrence of the
    /// unit vector `b` within `a` by `c`.
    fn replace_all_subvectors(&self, a: &[TermId], b: &[TermId], c: TermId) -> Vec<TermId> {
        let k = b.len();
        let mut result = Vec::with_capacity(a.len());
        let mut i = 0usize;
        while i + k <= a.len() {
            if a[i..i + k] == b[..] {
                result.push(c);
                i += k;
            } else {
                result.push(a[i]);
                i += 1;
            }
        }
        while i < a.len() {
            result.push(a[i]);
            i += 1;
        }
        result
    }

    /// `replace_all` cascade.
    pub(crate) fn mk_seq_replace_all(&mut self, a: TermId, b: TermId, c: TermId) -> RewriteResult {
        if self.tm.is_seq_empty(b) || b == c {
            return RewriteResult::Done(a);
        }
        if a == b {
            let empty = self.tm.mk_seq_empty(self.tm.sort(a));
            let is_empty = self.tm.mk_seq_is_empty(b);
            let result = self.tm.mk_ite(is_empty, empty, c);
            return RewriteResult::Rewrite2(result);
        }
        if self.tm.is_seq_empty(a) && self.tm.is_seq_empty(c) {
            return RewriteResult::Done(a);
        }
        let sort_a = self.tm.sort(a);
        if let (Some(s1), Some(s2)) = (self.tm.str_value(a).cloned(), self.tm.str_value(b).cloned())
        {
            debug_assert!(!s2.is_empty());
            if s1.len() < s2.len() {
                return RewriteResult::Done(a);
            }
            let mut strs = Vec::new();
            let mut i = 0usize;
            while i < s1.len() {
                if s1.len() >= s2.len() + i && s2.code_points() == &s1.code_points()[i..i + s2.len()]
                {
                    strs.push(c);
                    i += s2.len();
                } else {
                    let ch = self.tm.mk_char(s1.at(i));
                    strs.push(self.tm.mk_seq_unit(ch));
                    i += 1;
                }
            }
            let result = self.tm.mk_concat_list(&strs, sort_a);
            return RewriteResult::RewriteFull(result);
        }
        if let (Some(a_vals), Some(b_vals)) =
            (self.try_get_unit_values(a), self.try_get_unit_values(b))
        {
            let strs = self.replace_all_subvectors(&a_vals, &b_vals, c);
            let result = self.tm.mk_concat_list(&strs, sort_a);
            return RewriteResult::RewriteFull(result);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // map / fold
    // ------------------------------------------------------------------

    /// `map` pushes through empty, unit, and concat.
    pub(crate) fn mk_seq_map(&mut self, f: TermId, s: TermId) -> RewriteResult {
        if self.tm.is_seq_empty(s) {
            let range = self
                .tm
                .sorts
                .array_range(self.tm.sort(f))
                .unwrap_or(self.tm.sorts.char_sort);
            let sort = self.tm.sorts.mk_seq(range);
            let result = self.tm.mk_seq_empty(sort);
            return RewriteResult::Done(result);
        }
        if let Some(e) = self.tm.as_seq_unit(s) {
            let applied = self.tm.mk_select(vec![f, e]);
            let result = self.tm.mk_seq_unit(applied);
            return RewriteResult::Rewrite2(result);
        }
        if let TermKind::SeqConcat(s1, s2) = *self.tm.kind(s) {
            let m1 = self.tm.mk_seq_map(f, s1);
            let m2 = self.tm.mk_seq_map(f, s2);
            let result = self.tm.mk_seq_concat(m1, m2);
            return RewriteResult::Rewrite2(result);
        }
        RewriteResult::Failed
    }

    /// `mapi` with index shifting through concat.
    pub(crate) fn mk_seq_mapi(&mut self, f: TermId, i: TermId, s: TermId) -> RewriteResult {
        if self.tm.is_seq_empty(s) {
            let range = self
                .tm
                .sorts
                .array_range(self.tm.sort(f))
                .unwrap_or(self.tm.sorts.char_sort);
            let sort = self.tm.sorts.mk_seq(range);
            let result = self.tm.mk_seq_empty(sort);
            return RewriteResult::Done(result);
        }
        if let Some(e) = self.tm.as_seq_unit(s) {
            let applied = self.tm.mk_select(vec![f, i, e]);
            let result = self.tm.mk_seq_unit(applied);
            return RewriteResult::Rewrite2(result);
        }
        if let TermKind::SeqConcat(s1, s2) = *self.tm.kind(s) {
            let len1 = self.tm.mk_seq_len(s1);
            let j = self.tm.mk_add2(i, len1);
            let m1 = self.tm.mk_seq_mapi(f, i, s1);
            let m2 = self.tm.mk_seq_mapi(f, j, s2);
            let result = self.tm.mk_seq_concat(m1, m2);
            return RewriteResult::Rewrite2(result);
        }
        RewriteResult::Failed
    }

    /// `foldl` unrolls over empty, unit, and concat.
    pub(crate) fn mk_seq_foldl(&mut self, f: TermId, b: TermId, s: TermId) -> RewriteResult {
        if self.tm.is_seq_empty(s) {
            return RewriteResult::Done(b);
        }
        if let Some(e) = self.tm.as_seq_unit(s) {
            let result = self.tm.mk_select(vec![f, b, e]);
            return RewriteResult::Rewrite1(result);
        }
        if let TermKind::SeqConcat(s1, s2) = *self.tm.kind(s) {
            let acc = self.tm.mk_seq_foldl(f, b, s1);
            let result = self.tm.mk_seq_foldl(f, acc, s2);
            return RewriteResult::Rewrite3(result);
        }
        RewriteResult::Failed
    }

    /// `foldli` with index shifting through concat.
    pub(crate) fn mk_seq_foldli(
        &mut self,
        f: TermId,
        i: TermId,
        b: TermId,
        s: TermId,
    ) -> RewriteResult {
        if self.tm.is_seq_empty(s) {
            return RewriteResult::Done(b);
        }
        if let Some(e) = self.tm.as_seq_unit(s) {
            let result = self.tm.mk_select(vec![f, i, b, e]);
            return RewriteResult::Rewrite1(result);
        }
        if let TermKind::SeqConcat(s1, s2) = *self.tm.kind(s) {
            let len1 = self.tm.mk_seq_len(s1);
            let j = self.tm.mk_add2(i, len1);
            let acc = self.tm.mk_seq_foldli(f, i, b, s1);
            let result = self.tm.mk_seq_foldli(f, j, acc, s2);
            return RewriteResult::Rewrite3(result);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // itos / stoi / bit-vector conversions / codes
    // ------------------------------------------------------------------

    /// `itos` cascade.
    pub(crate) fn mk_str_itos(&mut self, a: TermId) -> RewriteResult {
        if let Some(r) = self.tm.int_value(a).cloned() {
            let s = if r.is_negative() {
                ZString::empty()
            } else {
                ZString::from_digits(&r.to_string())
            };
            let result = self.tm.mk_str(s);
            return RewriteResult::Done(result);
        }
        // itos(stoi(s)) with |s| <= 1 is s when s is a digit, "" otherwise.
        if let TermKind::StrStoi(b) = *self.tm.kind(a) {
            let (bounded, l) = max_length(&self.tm, b);
            if bounded && l <= 1 {
                let mut eqs = Vec::with_capacity(10);
                for d in 0..10u32 {
                    let digit = self.tm.mk_str(ZString::of_char('0' as u32 + d));
                    eqs.push(self.tm.mk_eq(b, digit));
                }
                let is_digit = self.tm.mk_or(eqs);
                let empty = self.tm.mk_str(ZString::empty());
                let result = self.tm.mk_ite(is_digit, b, empty);
                return RewriteResult::Rewrite2(result);
            }
        }
        RewriteResult::Failed
    }

    /// `stoi` cascade.
    pub(crate) fn mk_str_stoi(&mut self, a: TermId) -> RewriteResult {
        if let Some(s) = self.tm.str_value(a) {
            let result = match s.to_decimal() {
                Some(n) => self.tm.mk_int(n),
                None => self.minus_one(),
            };
            return RewriteResult::Done(result);
        }
        match self.tm.kind(a).clone() {
            TermKind::StrItos(b) => {
                let zero = self.zero();
                let ge = self.tm.mk_ge(b, zero);
                let m1 = self.minus_one();
                let result = self.tm.mk_ite(ge, b, m1);
                return RewriteResult::Done(result);
            }
            TermKind::StrFromUbv(b) => {
                let result = self.tm.mk_bv2int(b);
                return RewriteResult::Done(result);
            }
            TermKind::Ite(c, t, e) => {
                let st = self.tm.mk_str_stoi(t);
                let se = self.tm.mk_str_stoi(e);
                let result = self.tm.mk_ite(c, st, se);
                return RewriteResult::RewriteFull(result);
            }
            TermKind::SeqUnit(u) => {
                if let Some(ch) = self.tm.char_value(u) {
                    let result = if (('0' as u32)..=('9' as u32)).contains(&ch) {
                        self.tm.mk_int(BigInt::from(ch - '0' as u32))
                    } else {
                        self.minus_one()
                    };
                    return RewriteResult::Done(result);
                }
            }
            _ => {}
        }
        let as_ = self.concat_units(a);
        if as_.is_empty() {
            let result = self.minus_one();
            return RewriteResult::Done(result);
        }
        let sort_a = self.tm.sort(a);
        let last = as_[as_.len() - 1];
        if self.is_unit(last) {
            // Recurse digit by digit from the back:
            //   stoi(head · u) = 10 * stoi(head) + stoi(u), guarded.
            let tail = self.tm.mk_str_stoi(last);
            let head = self.tm.mk_concat_list(&as_[..as_.len() - 1], sort_a);
            let stoi_head = self.tm.mk_str_stoi(head);
            let zero = self.zero();
            let m1 = self.minus_one();
            let ten = self.tm.mk_int_i64(10);
            let scaled = self.tm.mk_mul(ten, stoi_head);
            let combined = self.tm.mk_add2(scaled, tail);
            let head_ok = self.tm.mk_ge(stoi_head, zero);
            let mut result = self.tm.mk_ite(head_ok, combined, m1);
            let tail_ok = self.tm.mk_ge(tail, zero);
            result = self.tm.mk_ite(tail_ok, result, tail);
            let head_empty = self.tm.mk_seq_is_empty(head);
            result = self.tm.mk_ite(head_empty, tail, result);
            return RewriteResult::RewriteFull(result);
        }
        if let Some(u) = self.tm.as_seq_unit(as_[0]) {
            if self.tm.char_value(u) == Some('0' as u32) {
                let rest = self.tm.mk_concat_list(&as_[1..], sort_a);
                let empty = self.tm.mk_seq_is_empty(rest);
                let zero = self.zero();
                let stoi_rest = self.tm.mk_str_stoi(rest);
                let result = self.tm.mk_ite(empty, zero, stoi_rest);
                return RewriteResult::RewriteFull(result);
            }
        }
        RewriteResult::Failed
    }

    /// `ubv→s` folds bit-vector numerals.
    pub(crate) fn mk_str_ubv2s(&mut self, a: TermId) -> RewriteResult {
        if let Some((v, _)) = self.tm.bv_value(a) {
            let s = ZString::from_digits(&v.to_string());
            let result = self.tm.mk_str(s);
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    /// `sbv→s` folds numerals and otherwise expands through a sign test.
    pub(crate) fn mk_str_sbv2s(&mut self, a: TermId) -> RewriteResult {
        if let Some((v, w)) = self.tm.bv_value(a) {
            let mut val = v.clone();
            let half = BigInt::one() << (w - 1);
            if val >= half {
                val -= BigInt::one() << w;
            }
            let s = ZString::from_digits(&val.to_string());
            let result = self.tm.mk_str(s);
            return RewriteResult::Done(result);
        }
        let crate::ast::SortKind::BitVec(w) = *self.tm.sorts.kind(self.tm.sort(a)) else {
            return RewriteResult::Failed;
        };
        let zero_bv = self.tm.mk_bv(BigInt::zero(), w);
        let is_neg = self.tm.mk_bv_slt(a, zero_bv);
        let minus = self.tm.mk_str_s("-");
        let neg = self.tm.mk_bv_neg(a);
        let mag = self.tm.mk_str_from_ubv(neg);
        let neg_str = self.tm.mk_seq_concat(minus, mag);
        let pos_str = self.tm.mk_str_from_ubv(a);
        let result = self.tm.mk_ite(is_neg, neg_str, pos_str);
        RewriteResult::RewriteFull(result)
    }

    /// `to_code` folds literal strings.
    pub(crate) fn mk_str_to_code(&mut self, a: TermId) -> RewriteResult {
        if let Some(s) = self.tm.str_value(a).cloned() {
            let result = if s.len() == 1 {
                self.tm.mk_int(BigInt::from(s.at(0)))
            } else {
                self.minus_one()
            };
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    /// `from_code` folds numerals; out-of-range codes give `""`.
    pub(crate) fn mk_str_from_code(&mut self, a: TermId) -> RewriteResult {
        if let Some(r) = self.tm.int_value(a).cloned() {
            let result = if r.is_negative() || r > BigInt::from(MAX_CHAR) {
                self.tm.mk_str(ZString::empty())
            } else {
                let ch = r.to_u32().unwrap_or(0);
                self.tm.mk_str(ZString::of_char(ch))
            };
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    /// `is_digit` folds literal strings and the empty string.
    pub(crate) fn mk_str_is_digit(&mut self, a: TermId) -> RewriteResult {
        if let Some(s) = self.tm.str_value(a) {
            let v = s.len() == 1 && (('0' as u32)..=('9' as u32)).contains(&s.at(0));
            let result = self.tm.mk_bool(v);
            return RewriteResult::Done(result);
        }
        if self.tm.is_seq_empty(a) {
            let result = self.tm.mk_false();
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // lexicographic order
    // ------------------------------------------------------------------

    /// `str.lt` folds constants and empty operands.
    pub(crate) fn mk_str_lt(&mut self, a: TermId, b: TermId) -> RewriteResult {
        if self.tm.is_seq_empty(b) {
            let result = self.tm.mk_false();
            return RewriteResult::Done(result);
        }
        if self.tm.is_seq_empty(a) {
            let eq = self.tm.mk_eq(a, b);
            let result = self.tm.mk_not(eq);
            return RewriteResult::Rewrite1(result);
        }
        if let (Some(x), Some(y)) = (self.tm.str_value(a), self.tm.str_value(b)) {
            let n = usize::min(x.len(), y.len());
            for i in 0..n {
                if x.at(i) < y.at(i) {
                    let result = self.tm.mk_true();
                    return RewriteResult::Done(result);
                }
                if x.at(i) > y.at(i) {
                    let result = self.tm.mk_false();
                    return RewriteResult::Done(result);
                }
            }
            let v = x.len() < y.len();
            let result = self.tm.mk_bool(v);
            return RewriteResult::Done(result);
        }
        RewriteResult::Failed
    }

    /// `str.le(a, b) = ¬ str.lt(b, a)`.
    pub(crate) fn mk_str_le(&mut self, a: TermId, b: TermId) -> RewriteResult {
        let lt = self.tm.mk_str_lt(b, a);
        let result = self.tm.mk_not(lt);
        RewriteResult::Rewrite2(result)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LengthClass {
    Shorter,
    Same,
    Longer,
    Unknown,
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
    fn test_concat_literal_fold() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("ab");
        let b = rw.tm_mut().mk_str_s("cd");
        let r = rw.mk_seq_concat_core(a, b).term().unwrap();
        assert_eq!(rw.tm().str_value(r), Some(&ZString::from("abcd")));
    }

    #[test]
    fn test_length_of_mixed_concat() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let abc = rw.tm_mut().mk_str_s("abc");
        let de = rw.tm_mut().mk_str_s("de");
        let inner = rw.tm_mut().mk_seq_concat(x, de);
        let t = rw.tm_mut().mk_seq_concat(abc, inner);
        let r = rw.mk_seq_length(t).term().unwrap();
        // 5 + len(x)
        let len_x = rw.tm_mut().mk_seq_len(x);
        let five = rw.tm_mut().mk_int_i64(5);
        let expect = rw.tm_mut().mk_add(vec![len_x, five]);
        assert_eq!(r, expect);
    }

    #[test]
    fn test_extract_literal() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("abcdef");
        let one = rw.tm_mut().mk_int_i64(1);
        let three = rw.tm_mut().mk_int_i64(3);
        let r = rw.mk_seq_extract(s, one, three).term().unwrap();
        assert_eq!(rw.tm().str_value(r), Some(&ZString::from("bcd")));
    }

    #[test]
    fn test_extract_negative_len_is_empty() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let zero = rw.tm_mut().mk_int_i64(0);
        let neg = rw.tm_mut().mk_int_i64(-2);
        let r = rw.mk_seq_extract(x, zero, neg).term().unwrap();
        assert!(rw.tm().is_seq_empty(r));
    }

    #[test]
    fn test_contains_literal() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("hello world");
        let b = rw.tm_mut().mk_str_s("world");
        let r = rw.mk_seq_contains(a, b).term().unwrap();
        assert!(rw.tm().is_true(r));
        let c = rw.tm_mut().mk_str_s("worlds");
        let r = rw.mk_seq_contains(a, c).term().unwrap();
        assert!(rw.tm().is_false(r));
    }

    #[test]
    fn test_contains_extract_of_self() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let a = rw.tm_mut().mk_var("a", __string_sort);
        let __int_sort = rw.tm().sorts.int_sort;
        let i = rw.tm_mut().mk_var("i", __int_sort);
        let __int_sort = rw.tm().sorts.int_sort;
        let l = rw.tm_mut().mk_var("l", __int_sort);
        let sub = rw.tm_mut().mk_seq_extract(a, i, l);
        let r = rw.mk_seq_contains(a, sub).term().unwrap();
        assert!(rw.tm().is_true(r));
    }

    #[test]
    fn test_indexof_literals() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("abcabc");
        let b = rw.tm_mut().mk_str_s("bc");
        let two = rw.tm_mut().mk_int_i64(2);
        let r = rw.mk_seq_index(a, b, two).term().unwrap();
        assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(4)));
        let neg = rw.tm_mut().mk_int_i64(-1);
        let r = rw.mk_seq_index(a, b, neg).term().unwrap();
        assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(-1)));
    }

    #[test]
    fn test_replace_literals() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("hello");
        let b = rw.tm_mut().mk_str_s("l");
        let c = rw.tm_mut().mk_str_s("L");
        let r = rw.mk_seq_replace(a, b, c).term().unwrap();
        assert_eq!(rw.tm().str_value(r), Some(&ZString::from("heLlo")));
    }

    #[test]
    fn test_replace_all_literals() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("abababa");
        let b = rw.tm_mut().mk_str_s("aba");
        let c = rw.tm_mut().mk_str_s("X");
        let r = rw.mk_seq_replace_all(a, b, c).term().unwrap();
        let r = rw.simplify(r);
        assert_eq!(rw.tm().str_value(r), Some(&ZString::from("XbX")));
    }

    #[test]
    fn test_prefix_suffix_literals() {
        let mut rw = rw();
        let ab = rw.tm_mut().mk_str_s("ab");
        let abc = rw.tm_mut().mk_str_s("abc");
        let r = rw.mk_seq_prefix(ab, abc).term().unwrap();
        assert!(rw.tm().is_true(r));
        let bc = rw.tm_mut().mk_str_s("bc");
        let r = rw.mk_seq_suffix(bc, abc).term().unwrap();
        assert!(rw.tm().is_true(r));
        let r = rw.mk_seq_suffix(ab, abc).term().unwrap();
        assert!(rw.tm().is_false(r));
    }

    #[test]
    fn test_prefix_peels_literal_heads() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let ab = rw.tm_mut().mk_str_s("ab");
        let abcd = rw.tm_mut().mk_str_s("abcd");
        let lhs = rw.tm_mut().mk_seq_concat(ab, x);
        let r = rw.mk_seq_prefix(lhs, abcd);
        // "ab" + x prefixof "abcd" peels to x prefixof "cd".
        let got = r.term().unwrap();
        let cd = rw.tm_mut().mk_str_s("cd");
        let expect = rw.tm_mut().mk_seq_prefixof(x, cd);
        assert_eq!(got, expect);
    }

    #[test]
    fn test_stoi_itos_roundtrips() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("07");
        let r = rw.mk_str_stoi(s).term().unwrap();
        assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(7)));
        let bad = rw.tm_mut().mk_str_s("a");
        let r = rw.mk_str_stoi(bad).term().unwrap();
        assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(-1)));
        // stoi(itos(x)) = ite(x >= 0, x, -1)
        let __int_sort = rw.tm().sorts.int_sort;
        let x = rw.tm_mut().mk_var("x", __int_sort);
        let itos = rw.tm_mut().mk_str_itos(x);
        let r = rw.mk_str_stoi(itos).term().unwrap();
        assert!(matches!(*rw.tm().kind(r), TermKind::Ite(..)));
        // itos(-3) = ""
        let m3 = rw.tm_mut().mk_int_i64(-3);
        let r = rw.mk_str_itos(m3).term().unwrap();
        assert!(rw.tm().is_seq_empty(r));
    }

    #[test]
    fn test_from_code_bounds() {
        let mut rw = rw();
        let ok = rw.tm_mut().mk_int_i64('a' as i64);
        let r = rw.mk_str_from_code(ok).term().unwrap();
        assert_eq!(rw.tm().str_value(r), Some(&ZString::from("a")));
        let neg = rw.tm_mut().mk_int_i64(-1);
        let r = rw.mk_str_from_code(neg).term().unwrap();
        assert!(rw.tm().is_seq_empty(r));
        let big = rw.tm_mut().mk_int_i64(MAX_CHAR as i64 + 1);
        let r = rw.mk_str_from_code(big).term().unwrap();
        assert!(rw.tm().is_seq_empty(r));
    }

    #[test]
    fn test_str_lt_literals() {
        let mut rw = rw();
        let a = rw.tm_mut().mk_str_s("abc");
        let b = rw.tm_mut().mk_str_s("abd");
        let r = rw.mk_str_lt(a, b).term().unwrap();
        assert!(rw.tm().is_true(r));
        let r = rw.mk_str_lt(b, a).term().unwrap();
        assert!(rw.tm().is_false(r));
        let prefix = rw.tm_mut().mk_str_s("ab");
        let r = rw.mk_str_lt(prefix, a).term().unwrap();
        assert!(rw.tm().is_true(r));
    }

    #[test]
    fn test_map_over_unit() {
        let mut rw = rw();
        let char_sort = rw.tm().sorts.char_sort;
        let f_sort = rw.tm_mut().sorts.mk_array(vec![char_sort], char_sort);
        let f = rw.tm_mut().mk_var("f", f_sort);
        let c = rw.tm_mut().mk_char('a' as u32);
        let u = rw.tm_mut().mk_seq_unit(c);
        let r = rw.mk_seq_map(f, u).term().unwrap();
        let applied = rw.tm_mut().mk_select(vec![f, c]);
        let expect = rw.tm_mut().mk_seq_unit(applied);
        assert_eq!(r, expect);
    }
}
