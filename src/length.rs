//! Length and bound analysis for sequences and regexes.
//!
//! `min_length` returns a sound lower bound on the length of a sequence
//! term together with an exactness flag: when the flag is set the bound is
//! the length (minimum equals maximum). `max_length` returns an upper
//! bound with a boundedness flag. Almost every shrinking decision in the
//! rewriter consults one of these.

use num_traits::{Signed, ToPrimitive};

use crate::ast::{Lbool, TermId, TermKind, TermManager};

/// Lower length bound of one sequence term; `(exact, bound)`.
pub fn min_length1(tm: &TermManager, e: TermId) -> (bool, u64) {
    match tm.kind(e) {
        TermKind::SeqUnit(_) => (true, 1),
        TermKind::SeqEmpty(_) => (true, 0),
        TermKind::Str(s) => (true, s.len() as u64),
        TermKind::SeqConcat(a, b) => {
            let (a, b) = (*a, *b);
            let (xa, la) = min_length1(tm, a);
            let (xb, lb) = min_length1(tm, b);
            (xa && xb, la.saturating_add(lb))
        }
        TermKind::Ite(_, th, el) => {
            let (th, el) = (*th, *el);
            let (xt, lt) = min_length1(tm, th);
            let (xe, le) = min_length1(tm, el);
            (xt && xe && lt == le, u64::min(lt, le))
        }
        _ => (false, 0),
    }
}

/// Lower length bound of a concatenation given as atoms.
pub fn min_length(tm: &TermManager, es: &[TermId]) -> (bool, u64) {
    let mut exact = true;
    let mut len: u64 = 0;
    for &e in es {
        let (x, l) = min_length1(tm, e);
        exact &= x;
        len = len.saturating_add(l);
    }
    (exact, len)
}

/// Upper length bound of a sequence term; `(bounded, bound)`.
pub fn max_length(tm: &TermManager, e: TermId) -> (bool, u64) {
    let mut todo = vec![e];
    let mut len: u64 = 0;
    while let Some(e) = todo.pop() {
        match tm.kind(e) {
            TermKind::SeqUnit(_) | TermKind::SeqAt(..) => len = len.saturating_add(1),
            TermKind::Str(s) => len = len.saturating_add(s.len() as u64),
            TermKind::SeqEmpty(_) => {}
            TermKind::SeqExtract(_, _, l) => match tm.int_value(*l) {
                Some(n) if !n.is_negative() => match n.to_u64() {
                    Some(n) => len = len.saturating_add(n),
                    None => return (false, len),
                },
                _ => return (false, len),
            },
            TermKind::SeqConcat(a, b) => {
                todo.push(*a);
                todo.push(*b);
            }
            _ => return (false, len),
        }
    }
    (true, len)
}

/// Whether two sequence terms have provably equal length.
pub fn eq_length(tm: &TermManager, x: TermId, y: TermId) -> Lbool {
    let (bx, lx) = min_length1(tm, x);
    if !bx {
        return Lbool::Undef;
    }
    let (by, ly) = min_length1(tm, y);
    if !by {
        return Lbool::Undef;
    }
    if lx == ly {
        Lbool::True
    } else {
        Lbool::False
    }
}

/// Minimum word length of a regex; `u64::MAX` stands for "no finite
/// minimum" (the empty language). Sound as a lower bound.
pub fn re_min_length(tm: &TermManager, r: TermId) -> u64 {
    match tm.kind(r) {
        TermKind::ReEmpty(_) => u64::MAX,
        TermKind::ReFull(_) => 0,
        TermKind::ReAllChar(_) | TermKind::ReRange(..) | TermKind::ReOfPred(_) => 1,
        TermKind::ToRe(s) => min_length1(tm, *s).1,
        TermKind::ReConcat(a, b) => {
            let la = re_min_length(tm, *a);
            let lb = re_min_length(tm, *b);
            if la == u64::MAX || lb == u64::MAX {
                u64::MAX
            } else {
                la.saturating_add(lb)
            }
        }
        TermKind::ReUnion(a, b) | TermKind::ReAntimirovUnion(a, b) => {
            u64::min(re_min_length(tm, *a), re_min_length(tm, *b))
        }
        TermKind::ReInter(a, b) => u64::max(re_min_length(tm, *a), re_min_length(tm, *b)),
        TermKind::ReDiff(a, _) => re_min_length(tm, *a),
        TermKind::ReStar(_) | TermKind::ReOpt(_) => 0,
        TermKind::RePlus(a) => re_min_length(tm, *a),
        TermKind::ReLoop(a, lo, hi) => {
            if hi.is_some_and(|h| h < *lo) {
                return u64::MAX;
            }
            let la = re_min_length(tm, *a);
            if la == u64::MAX {
                if *lo == 0 {
                    0
                } else {
                    u64::MAX
                }
            } else {
                la.saturating_mul(*lo as u64)
            }
        }
        TermKind::RePower(a, n) => {
            let la = re_min_length(tm, *a);
            if la == u64::MAX && *n > 0 {
                u64::MAX
            } else if *n == 0 {
                0
            } else {
                la.saturating_mul(*n as u64)
            }
        }
        TermKind::ReReverse(a) => re_min_length(tm, *a),
        TermKind::Ite(_, a, b) => u64::min(re_min_length(tm, *a), re_min_length(tm, *b)),
        _ => 0,
    }
}

/// Maximum word length of a regex; `None` when unbounded.
pub fn re_max_length(tm: &TermManager, r: TermId) -> Option<u64> {
    match tm.kind(r) {
        TermKind::ReEmpty(_) => Some(0),
        TermKind::ReAllChar(_) | TermKind::ReRange(..) | TermKind::ReOfPred(_) => Some(1),
        TermKind::ToRe(s) => {
            let (bounded, l) = max_length(tm, *s);
            bounded.then_some(l)
        }
        TermKind::ReConcat(a, b) => {
            let la = re_max_length(tm, *a)?;
            let lb = re_max_length(tm, *b)?;
            Some(la.saturating_add(lb))
        }
        TermKind::ReUnion(a, b) | TermKind::ReAntimirovUnion(a, b) | TermKind::Ite(_, a, b) => {
            let la = re_max_length(tm, *a)?;
            let lb = re_max_length(tm, *b)?;
            Some(u64::max(la, lb))
        }
        TermKind::ReInter(a, b) => match (re_max_length(tm, *a), re_max_length(tm, *b)) {
            (Some(x), Some(y)) => Some(u64::min(x, y)),
            (Some(x), None) | (None, Some(x)) => Some(x),
            (None, None) => None,
        },
        TermKind::ReDiff(a, _) => re_max_length(tm, *a),
        TermKind::ReOpt(a) => re_max_length(tm, *a),
        TermKind::ReLoop(a, _, Some(hi)) => {
            re_max_length(tm, *a).map(|l| l.saturating_mul(*hi as u64))
        }
        TermKind::RePower(a, n) => re_max_length(tm, *a).map(|l| l.saturating_mul(*n as u64)),
        TermKind::ReReverse(a) => re_max_length(tm, *a),
        _ => None,
    }
}

fn and3(a: Lbool, b: Lbool) -> Lbool {
    match (a, b) {
        (Lbool::False, _) | (_, Lbool::False) => Lbool::False,
        (Lbool::True, Lbool::True) => Lbool::True,
        _ => Lbool::Undef,
    }
}

fn or3(a: Lbool, b: Lbool) -> Lbool {
    match (a, b) {
        (Lbool::True, _) | (_, Lbool::True) => Lbool::True,
        (Lbool::False, Lbool::False) => Lbool::False,
        _ => Lbool::Undef,
    }
}

fn not3(a: Lbool) -> Lbool {
    match a {
        Lbool::True => Lbool::False,
        Lbool::False => Lbool::True,
        Lbool::Undef => Lbool::Undef,
    }
}

/// Quick structural nullability verdict, without building a formula.
pub fn re_nullable_hint(tm: &TermManager, r: TermId) -> Lbool {
    match tm.kind(r) {
        TermKind::ReFull(_) | TermKind::ReStar(_) | TermKind::ReOpt(_) => Lbool::True,
        TermKind::ReEmpty(_) | TermKind::ReAllChar(_) | TermKind::ReRange(..)
        | TermKind::ReOfPred(_) => Lbool::False,
        TermKind::ToRe(s) => {
            if tm.is_seq_empty(*s) {
                Lbool::True
            } else if min_length1(tm, *s).1 > 0 {
                Lbool::False
            } else {
                Lbool::Undef
            }
        }
        TermKind::ReConcat(a, b) | TermKind::ReInter(a, b) => {
            and3(re_nullable_hint(tm, *a), re_nullable_hint(tm, *b))
        }
        TermKind::ReUnion(a, b) | TermKind::ReAntimirovUnion(a, b) => {
            or3(re_nullable_hint(tm, *a), re_nullable_hint(tm, *b))
        }
        TermKind::ReDiff(a, b) => {
            and3(re_nullable_hint(tm, *a), not3(re_nullable_hint(tm, *b)))
        }
        TermKind::ReComplement(a) => not3(re_nullable_hint(tm, *a)),
        TermKind::RePlus(a) | TermKind::ReReverse(a) => re_nullable_hint(tm, *a),
        TermKind::ReLoop(a, lo, hi) => {
            if hi.is_some_and(|h| h < *lo) {
                Lbool::False
            } else if *lo == 0 {
                Lbool::True
            } else {
                re_nullable_hint(tm, *a)
            }
        }
        TermKind::RePower(a, n) => {
            if *n == 0 {
                Lbool::True
            } else {
                re_nullable_hint(tm, *a)
            }
        }
        TermKind::Ite(_, a, b) => {
            let na = re_nullable_hint(tm, *a);
            let nb = re_nullable_hint(tm, *b);
            if na == nb {
                na
            } else {
                Lbool::Undef
            }
        }
        _ => Lbool::Undef,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;

    #[test]
    fn test_min_length_concat() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.string_sort);
        let s = tm.mk_str_s("abc");
        let c = tm.mk_seq_concat(s, x);
        assert_eq!(min_length1(&tm, c), (false, 3));
        let ch = tm.mk_char('a' as u32);
        let u = tm.mk_seq_unit(ch);
        let c2 = tm.mk_seq_concat(s, u);
        assert_eq!(min_length1(&tm, c2), (true, 4));
    }

    #[test]
    fn test_min_length_ite() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let a = tm.mk_str_s("ab");
        let b = tm.mk_str_s("cd");
        let i = tm.mk_ite(p, a, b);
        assert_eq!(min_length1(&tm, i), (true, 2));
        let c = tm.mk_str_s("xyz");
        let j = tm.mk_ite(p, a, c);
        assert_eq!(min_length1(&tm, j), (false, 2));
    }

    #[test]
    fn test_max_length_extract() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.string_sort);
        let zero = tm.mk_int_i64(0);
        let five = tm.mk_int_i64(5);
        let e = tm.mk_seq_extract(x, zero, five);
        assert_eq!(max_length(&tm, e), (true, 5));
        assert_eq!(max_length(&tm, x), (false, 0));
    }

    #[test]
    fn test_re_lengths() {
        let mut tm = TermManager::new();
        let res = tm.sorts.re_string_sort;
        let s = tm.mk_str_s("ab");
        let r = tm.mk_to_re(s);
        assert_eq!(re_min_length(&tm, r), 2);
        assert_eq!(re_max_length(&tm, r), Some(2));
        let star = tm.mk_re_star(r);
        assert_eq!(re_min_length(&tm, star), 0);
        assert_eq!(re_max_length(&tm, star), None);
        let empty = tm.mk_re_empty(res);
        assert_eq!(re_min_length(&tm, empty), u64::MAX);
    }

    #[test]
    fn test_nullable_hint() {
        let mut tm = TermManager::new();
        let s = tm.mk_str_s("ab");
        let r = tm.mk_to_re(s);
        assert_eq!(re_nullable_hint(&tm, r), Lbool::False);
        let star = tm.mk_re_star(r);
        assert_eq!(re_nullable_hint(&tm, star), Lbool::True);
        let x = tm.mk_var("x", tm.sorts.string_sort);
        let rx = tm.mk_to_re(x);
        assert_eq!(re_nullable_hint(&tm, rx), Lbool::Undef);
    }
}
