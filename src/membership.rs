//! Regex membership rewriting and word sampling.
//!
//! `mk_str_in_regexp` drives `s ∈ R` toward smaller problems: constant
//! evaluation through iterated derivatives, syntactic contains/prefix/
//! suffix patterns, head and tail peeling into derivatives, and splitting
//! off fixed-length regex heads. `some_string_in_re` searches the
//! derivative tree for a concrete accepted word.

use rustc_hash::FxHashSet;

use crate::ast::{Lbool, TermId, TermKind};
use crate::length::{re_max_length, re_min_length};
use crate::regex_ops::{as_ite, as_re_concat, as_re_union, as_to_re, is_re_empty, is_re_full};
use crate::rewriter::{RewriteResult, SeqRewriter};
use crate::zstring::{ZString, MAX_CHAR};

/// Outcome of sampling a word from a regex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Witness {
    /// A concrete accepted word.
    Found(ZString),
    /// The language is empty.
    Empty,
    /// Acceptance depends on uninterpreted terms.
    Unknown,
}

impl SeqRewriter {
    /// `to_re(s)` under an `ite` collapses to an `ite` of the strings.
    pub(crate) fn lift_str_from_to_re(&mut self, r: TermId) -> Option<TermId> {
        if let Some(s) = as_to_re(&self.tm, r) {
            return Some(s);
        }
        let (c, t, e) = as_ite(&self.tm, r)?;
        let ts = self.lift_str_from_to_re(t)?;
        let es = self.lift_str_from_to_re(e)?;
        Some(self.tm.mk_ite(c, ts, es))
    }

    /// `R = hd · tl` with `hd` of fixed word length.
    fn get_re_head_tail(&self, r: TermId) -> Option<(TermId, TermId)> {
        let (r1, r2) = as_re_concat(&self.tm, r)?;
        let min = re_min_length(&self.tm, r1);
        if min != u64::MAX && re_max_length(&self.tm, r1) == Some(min) {
            Some((r1, r2))
        } else {
            None
        }
    }

    /// `R = hd · tl` with `tl` of fixed word length, re-associating
    /// through nested concatenations.
    fn get_re_head_tail_reversed(&mut self, r: TermId) -> Option<(TermId, TermId)> {
        let (r1, r2) = as_re_concat(&self.tm, r)?;
        let min = re_min_length(&self.tm, r2);
        if min != u64::MAX && re_max_length(&self.tm, r2) == Some(min) {
            if let Some((head, tail)) = self.get_re_head_tail_reversed(r1) {
                let tail = self.mk_regex_concat(tail, r2);
                return Some((head, tail));
            }
            return Some((r1, r2));
        }
        let (head, tail) = self.get_re_head_tail_reversed(r2)?;
        let head = self.mk_regex_concat(r1, head);
        Some((head, tail))
    }

    /// Push a membership through the branches of a derivative tree.
    fn mk_in_antimirov(&mut self, s: TermId, d: TermId) -> TermId {
        let (_, min_s) = crate::length::min_length1(&self.tm, s);
        if is_re_full(&self.tm, d) || (min_s > 0 && self.tm.is_re_dot_plus(d)) {
            return self.tm.mk_true();
        }
        if is_re_empty(&self.tm, d) || (min_s > 0 && self.tm.is_re_epsilon(d)) {
            return self.tm.mk_false();
        }
        if let Some((c, d1, d2)) = as_ite(&self.tm, d) {
            let r1 = self.mk_in_antimirov(s, d1);
            let r2 = self.mk_in_antimirov(s, d2);
            return self.tm.mk_ite(c, r1, r2);
        }
        if let Some((d1, d2)) = as_re_union(&self.tm, d) {
            let r1 = self.mk_in_antimirov(s, d1);
            let r2 = self.mk_in_antimirov(s, d2);
            return self.tm.mk_or2(r1, r2);
        }
        self.tm.mk_str_in_re(s, d)
    }

    /// Recognize `Σ* · to_re(u) · Σ*` (in either association) and return
    /// `u`.
    fn as_contains_pattern(&self, r: TermId) -> Option<TermId> {
        let (c, d) = as_re_concat(&self.tm, r)?;
        if is_re_full(&self.tm, c) {
            let (m, e) = as_re_concat(&self.tm, d)?;
            let u = as_to_re(&self.tm, m)?;
            if is_re_full(&self.tm, e) {
                return Some(u);
            }
            return None;
        }
        // Left-associated form: (Σ* · to_re(u)) · Σ*.
        if is_re_full(&self.tm, d) {
            let (f, m) = as_re_concat(&self.tm, c)?;
            let u = as_to_re(&self.tm, m)?;
            if is_re_full(&self.tm, f) {
                return Some(u);
            }
        }
        None
    }

    /// Membership cascade.
    pub(crate) fn mk_str_in_regexp(&mut self, a: TermId, b: TermId) -> RewriteResult {
        if is_re_empty(&self.tm, b) {
            let result = self.tm.mk_false();
            return RewriteResult::Done(result);
        }
        if is_re_full(&self.tm, b) {
            let result = self.tm.mk_true();
            return RewriteResult::Done(result);
        }
        // Constant word against a ground regex: run the derivatives.
        if let Some(s) = self.tm.str_value(a).cloned() {
            if self.tm.is_ground(b) {
                let mut r = b;
                let mut decided = true;
                for &ch in s.code_points() {
                    if is_re_empty(&self.tm, r) {
                        let result = self.tm.mk_false();
                        return RewriteResult::Done(result);
                    }
                    let c = self.tm.mk_char(ch);
                    r = self.mk_derivative(c, r);
                    if !self.tm.is_ground(r) {
                        decided = false;
                        break;
                    }
                }
                if decided {
                    match self.nullable_value(r) {
                        Lbool::True => {
                            let result = self.tm.mk_true();
                            return RewriteResult::Done(result);
                        }
                        Lbool::False => {
                            let result = self.tm.mk_false();
                            return RewriteResult::Done(result);
                        }
                        Lbool::Undef => {}
                    }
                }
            }
        }
        if let Some(bs) = self.lift_str_from_to_re(b) {
            let result = self.tm.mk_eq(a, bs);
            return RewriteResult::RewriteFull(result);
        }
        if let Some(u) = self.as_contains_pattern(b) {
            let result = self.tm.mk_seq_contains(a, u);
            return RewriteResult::Rewrite1(result);
        }
        if let Some((c, d)) = as_re_concat(&self.tm, b) {
            if let Some(e) = as_to_re(&self.tm, c) {
                if is_re_full(&self.tm, d) {
                    let result = self.tm.mk_seq_prefixof(e, a);
                    return RewriteResult::Rewrite1(result);
                }
            }
            if let Some(e) = as_to_re(&self.tm, d) {
                if is_re_full(&self.tm, c) {
                    let result = self.tm.mk_seq_suffixof(e, a);
                    return RewriteResult::Rewrite1(result);
                }
            }
        }
        // R? (or R ∪ ε): case split on the empty word.
        let opt_body = match self.tm.kind(b).clone() {
            TermKind::ReOpt(b1) => Some(b1),
            TermKind::ReUnion(b1, eps) if self.tm.is_re_epsilon(eps) => Some(b1),
            TermKind::ReUnion(eps, b1) if self.tm.is_re_epsilon(eps) => Some(b1),
            _ => None,
        };
        if let Some(b1) = opt_body {
            let len = self.tm.mk_seq_len(a);
            let zero = self.zero();
            let is_empty = self.tm.mk_eq(len, zero);
            let t = self.tm.mk_true();
            let inner = self.tm.mk_str_in_re(a, b1);
            let result = self.tm.mk_ite(is_empty, t, inner);
            return RewriteResult::RewriteFull(result);
        }
        if self.tm.is_seq_empty(a) {
            let result = self.is_nullable(b);
            if matches!(self.tm.kind(result), TermKind::StrInRe(..)) {
                return RewriteResult::Done(result);
            }
            return RewriteResult::RewriteFull(result);
        }
        if let Some((hd, tl)) = self.get_head_tail(a) {
            let t = self.tm.mk_true();
            let d = self.mk_antimirov_deriv(hd, b, t);
            let result = self.mk_in_antimirov(tl, d);
            return RewriteResult::RewriteFull(result);
        }
        if let Some((hd, tl)) = self.get_head_tail_reversed(a) {
            let rb = self.tm.mk_re_reverse(b);
            let d = self.tm.mk_re_derivative(tl, rb);
            let rd = self.tm.mk_re_reverse(d);
            let result = self.tm.mk_str_in_re(hd, rd);
            return RewriteResult::RewriteFull(result);
        }
        if let Some((hd, tl)) = self.get_re_head_tail(b) {
            let min = re_min_length(&self.tm, hd);
            let len_hd = self.tm.mk_int_i64(min as i64);
            let len_a = self.tm.mk_seq_len(a);
            let len_tl = self.tm.mk_sub(len_a, len_hd);
            let long_enough = self.tm.mk_ge(len_a, len_hd);
            let zero = self.zero();
            let front = self.tm.mk_seq_extract(a, zero, len_hd);
            let front_in = self.tm.mk_str_in_re(front, hd);
            let back = self.tm.mk_seq_extract(a, len_hd, len_tl);
            let back_in = self.tm.mk_str_in_re(back, tl);
            let result = self.tm.mk_and(vec![long_enough, front_in, back_in]);
            return RewriteResult::RewriteFull(result);
        }
        if let Some((hd, tl)) = self.get_re_head_tail_reversed(b) {
            let min = re_min_length(&self.tm, tl);
            let len_tl = self.tm.mk_int_i64(min as i64);
            let len_a = self.tm.mk_seq_len(a);
            let len_hd = self.tm.mk_sub(len_a, len_tl);
            let long_enough = self.tm.mk_ge(len_a, len_tl);
            let zero = self.zero();
            let front = self.tm.mk_seq_extract(a, zero, len_hd);
            let front_in = self.tm.mk_str_in_re(front, hd);
            let back = self.tm.mk_seq_extract(a, len_hd, len_tl);
            let back_in = match as_to_re(&self.tm, tl) {
                Some(s) => self.tm.mk_eq(s, back),
                None => self.tm.mk_str_in_re(back, tl),
            };
            let result = self.tm.mk_and(vec![long_enough, front_in, back_in]);
            return RewriteResult::RewriteFull(result);
        }
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // Sampling
    // ------------------------------------------------------------------

    /// Search for a concrete word accepted by `r` over the derivative
    /// tree.
    pub fn some_string_in_re(&mut self, r: TermId) -> Witness {
        let mut visited: FxHashSet<TermId> = FxHashSet::default();
        let mut todo: Vec<SearchState> = vec![SearchState {
            re: r,
            str_len: 0,
            exclude: Vec::new(),
            needs_derivation: true,
        }];
        let mut word: Vec<u32> = Vec::new();
        while let Some(current) = todo.pop() {
            let mut r = current.re;
            word.truncate(current.str_len);
            if current.needs_derivation {
                debug_assert!(current.exclude.is_empty());
                if visited.contains(&r) || is_re_empty(&self.tm, r) {
                    continue;
                }
                if self.nullable_value(r) == Lbool::True {
                    return Witness::Found(ZString::from_code_points(word));
                }
                visited.insert(r);
                if as_re_union(&self.tm, r).is_some() {
                    for arg in self.union_operands(r) {
                        todo.push(SearchState {
                            re: arg,
                            str_len: word.len(),
                            exclude: Vec::new(),
                            needs_derivation: true,
                        });
                    }
                    continue;
                }
                r = self.mk_derivative_elem(r);
            }
            let exclude = current.exclude;
            if is_re_empty(&self.tm, r) {
                continue;
            }
            if as_re_union(&self.tm, r).is_some() {
                for arg in self.union_operands(r) {
                    todo.push(SearchState {
                        re: arg,
                        str_len: word.len(),
                        exclude: exclude.clone(),
                        needs_derivation: false,
                    });
                }
                continue;
            }
            if let Some((c, th, el)) = as_ite(&self.tm, r) {
                let bounds = self.get_bounds(c);
                if !is_re_empty(&self.tm, el) {
                    let mut el_exclude = exclude.clone();
                    if let Some((low, high)) = bounds {
                        el_exclude.push((low, high));
                    }
                    todo.push(SearchState {
                        re: el,
                        str_len: word.len(),
                        exclude: el_exclude,
                        needs_derivation: false,
                    });
                }
                if let Some((low, _)) = bounds {
                    // Process the then-branch first: the current word is
                    // extended, never discarded.
                    word.push(low);
                    todo.push(SearchState {
                        re: th,
                        str_len: word.len(),
                        exclude: Vec::new(),
                        needs_derivation: true,
                    });
                }
                continue;
            }
            if self.tm.is_ground(r) {
                let Some(ch) = pick_excluded_char(&exclude) else {
                    continue;
                };
                word.push(ch);
                todo.push(SearchState {
                    re: r,
                    str_len: word.len(),
                    exclude: Vec::new(),
                    needs_derivation: true,
                });
                continue;
            }
            return Witness::Unknown;
        }
        Witness::Empty
    }

    fn union_operands(&self, r: TermId) -> Vec<TermId> {
        let mut out = Vec::new();
        let mut todo = vec![r];
        while let Some(t) = todo.pop() {
            match as_re_union(&self.tm, t) {
                Some((a, b)) => {
                    todo.push(b);
                    todo.push(a);
                }
                None => out.push(t),
            }
        }
        out
    }

    /// Feasible character interval of a conjunction of `≤`/`=` constraints
    /// over the element variable.
    pub(crate) fn get_bounds(&self, e: TermId) -> Option<(u32, u32)> {
        let mut low = 0u32;
        let mut high = MAX_CHAR;
        let mut todo = vec![e];
        while let Some(e) = todo.pop() {
            match self.tm.kind(e).clone() {
                TermKind::And(args) => todo.extend(args),
                TermKind::CharLe(x, y) => {
                    match (self.tm.char_value(x), self.tm.char_value(y)) {
                        (Some(c), None) if self.tm.is_var(y) => low = u32::max(c, low),
                        (None, Some(c)) if self.tm.is_var(x) => high = u32::min(c, high),
                        _ => return None,
                    }
                }
                TermKind::Eq(x, y) => {
                    let c = match (self.tm.char_value(x), self.tm.char_value(y)) {
                        (Some(c), None) if self.tm.is_var(y) => c,
                        (None, Some(c)) if self.tm.is_var(x) => c,
                        _ => return None,
                    };
                    low = u32::max(c, low);
                    high = u32::min(c, high);
                }
                _ => return None,
            }
        }
        (low <= high).then_some((low, high))
    }
}

#[derive(Debug, Clone)]
struct SearchState {
    re: TermId,
    str_len: usize,
    exclude: Vec<(u32, u32)>,
    needs_derivation: bool,
}

/// First character, starting from `'a'` and wrapping, that avoids every
/// excluded interval.
fn pick_excluded_char(exclude: &[(u32, u32)]) -> Option<u32> {
    let mut ch = 'a' as u32;
    let mut wrapped = false;
    loop {
        let mut moved = false;
        for &(l, h) in exclude {
            if l <= ch && ch <= h {
                ch = h + 1;
                moved = true;
            }
        }
        if !moved {
            return Some(ch);
        }
        if ch > MAX_CHAR {
            if wrapped {
                return None;
            }
            ch = 0;
            wrapped = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;
    use crate::rewriter::{SeqRewriter, SeqRewriterConfig};

    fn rw() -> SeqRewriter {
        SeqRewriter::new(TermManager::new(), SeqRewriterConfig::default())
    }

    #[test]
    fn test_membership_in_empty_and_full() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let a = rw.tm_mut().mk_var("a", __string_sort);
        let sort = rw.tm().sorts.re_string_sort;
        let empty = rw.tm_mut().mk_re_empty(sort);
        let full = rw.tm_mut().mk_re_full(sort);
        let r = rw.mk_str_in_regexp(a, empty).term().unwrap();
        assert!(rw.tm().is_false(r));
        let r = rw.mk_str_in_regexp(a, full).term().unwrap();
        assert!(rw.tm().is_true(r));
    }

    #[test]
    fn test_ground_membership_by_derivatives() {
        let mut rw = rw();
        // "abc" ∈ to_re("a") · range('a','c')*
        let sa = rw.tm_mut().mk_str_s("a");
        let ra = rw.tm_mut().mk_to_re(sa);
        let lo = rw.tm_mut().mk_str_s("a");
        let hi = rw.tm_mut().mk_str_s("c");
        let range = rw.tm_mut().mk_re_range(lo, hi);
        let star = rw.tm_mut().mk_re_star(range);
        let re = rw.tm_mut().mk_re_concat(ra, star);
        let abc = rw.tm_mut().mk_str_s("abc");
        let r = rw.mk_str_in_regexp(abc, re).term().unwrap();
        assert!(rw.tm().is_true(r));
        let abz = rw.tm_mut().mk_str_s("abz");
        let r = rw.mk_str_in_regexp(abz, re).term().unwrap();
        assert!(rw.tm().is_false(r));
    }

    #[test]
    fn test_contains_pattern() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let a = rw.tm_mut().mk_var("a", __string_sort);
        let sort = rw.tm().sorts.re_string_sort;
        let full = rw.tm_mut().mk_re_full(sort);
        let u = rw.tm_mut().mk_str_s("ab");
        let ru = rw.tm_mut().mk_to_re(u);
        let tail = rw.tm_mut().mk_re_concat(ru, full);
        let pat = rw.tm_mut().mk_re_concat(full, tail);
        let r = rw.mk_str_in_regexp(a, pat).term().unwrap();
        let expect = rw.tm_mut().mk_seq_contains(a, u);
        assert_eq!(r, expect);
    }

    #[test]
    fn test_prefix_suffix_patterns() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let a = rw.tm_mut().mk_var("a", __string_sort);
        let sort = rw.tm().sorts.re_string_sort;
        let full = rw.tm_mut().mk_re_full(sort);
        let u = rw.tm_mut().mk_str_s("ab");
        let ru = rw.tm_mut().mk_to_re(u);
        let pre = rw.tm_mut().mk_re_concat(ru, full);
        let r = rw.mk_str_in_regexp(a, pre).term().unwrap();
        let expect = rw.tm_mut().mk_seq_prefixof(u, a);
        assert_eq!(r, expect);
        let suf = rw.tm_mut().mk_re_concat(full, ru);
        let r = rw.mk_str_in_regexp(a, suf).term().unwrap();
        let expect = rw.tm_mut().mk_seq_suffixof(u, a);
        assert_eq!(r, expect);
    }

    #[test]
    fn test_empty_word_uses_nullability() {
        let mut rw = rw();
        let empty = rw.tm_mut().mk_str_s("");
        let s = rw.tm_mut().mk_str_s("a");
        let ra = rw.tm_mut().mk_to_re(s);
        let star = rw.tm_mut().mk_re_star(ra);
        let r = rw.mk_str_in_regexp(empty, star).term().unwrap();
        assert!(rw.tm().is_true(r));
    }

    #[test]
    fn test_membership_in_literal_regex_is_equality() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let a = rw.tm_mut().mk_str_s("a");
        let word = rw.tm_mut().mk_seq_concat(a, x);
        let sa = rw.tm_mut().mk_str_s("ab");
        let re = rw.tm_mut().mk_to_re(sa);
        // "a"·x ∈ to_re("ab") is the equation "a"·x = "ab", which reduces
        // to x = "b".
        let t = rw.tm_mut().mk_str_in_re(word, re);
        let r = rw.simplify(t);
        let b = rw.tm_mut().mk_str_s("b");
        let expect = rw.tm_mut().mk_eq(x, b);
        assert_eq!(r, expect);
    }

    #[test]
    fn test_head_peeling_on_symbolic_tail() {
        let mut rw = rw();
        let __string_sort = rw.tm().sorts.string_sort;
        let x = rw.tm_mut().mk_var("x", __string_sort);
        let a = rw.tm_mut().mk_str_s("a");
        let word = rw.tm_mut().mk_seq_concat(a, x);
        let sab = rw.tm_mut().mk_str_s("ab");
        let rab = rw.tm_mut().mk_to_re(sab);
        let star = rw.tm_mut().mk_re_star(rab);
        // "a"·x ∈ (to_re("ab"))* peels the head into a derivative.
        let r = rw.mk_str_in_regexp(word, star).term().unwrap();
        let b = rw.tm_mut().mk_str_s("b");
        let rb = rw.tm_mut().mk_to_re(b);
        let tail = rw.mk_regex_concat(rb, star);
        let expect = rw.tm_mut().mk_str_in_re(x, tail);
        assert_eq!(r, expect);
    }

    #[test]
    fn test_sample_literal_language() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("ab");
        let r = rw.tm_mut().mk_to_re(s);
        match rw.some_string_in_re(r) {
            Witness::Found(w) => assert_eq!(w, ZString::from("ab")),
            other => panic!("expected witness, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_empty_language() {
        let mut rw = rw();
        let sort = rw.tm().sorts.re_string_sort;
        let empty = rw.tm_mut().mk_re_empty(sort);
        assert_eq!(rw.some_string_in_re(empty), Witness::Empty);
        // a ∩ b with disjoint singletons is empty after normalization.
        let sa = rw.tm_mut().mk_str_s("a");
        let sb = rw.tm_mut().mk_str_s("b");
        let ra = rw.tm_mut().mk_to_re(sa);
        let rb = rw.tm_mut().mk_to_re(sb);
        let i = rw.mk_regex_inter_normalize(ra, rb);
        assert_eq!(rw.some_string_in_re(i), Witness::Empty);
    }

    #[test]
    fn test_sample_star_language() {
        let mut rw = rw();
        let s = rw.tm_mut().mk_str_s("a");
        let r0 = rw.tm_mut().mk_to_re(s);
        let star = rw.tm_mut().mk_re_star(r0);
        assert_eq!(rw.some_string_in_re(star), Witness::Found(ZString::from("")));
    }

    #[test]
    fn test_get_bounds() {
        let mut rw = rw();
        let __char_sort = rw.tm().sorts.char_sort;
        let e = rw.tm_mut().mk_var("e", __char_sort);
        let c10 = rw.tm_mut().mk_char(10);
        let c5 = rw.tm_mut().mk_char(5);
        let lo = rw.tm_mut().mk_char_le(c5, e);
        let hi = rw.tm_mut().mk_char_le(e, c10);
        let both = rw.tm_mut().mk_and2(lo, hi);
        assert_eq!(rw.get_bounds(both), Some((5, 10)));
        let eq = rw.tm_mut().mk_eq(e, c5);
        assert_eq!(rw.get_bounds(eq), Some((5, 5)));
    }
}
