//! Property-based tests for the rewriter.
//!
//! These check the semantic laws the rewriter promises: derivative
//! correctness, nullability, membership agreement with the automaton
//! bridge, length-bound soundness, idempotence of the driver, and the
//! structural derivative normal form.

use proptest::prelude::*;
use strsmt::{Lbool, SeqRewriter, TermId, Witness, ZString};

/// Small description of a regex over the alphabet {a, b, c}, used to
/// build the same language both as a term and as an automaton.
#[derive(Debug, Clone)]
enum Re {
    Lit(String),
    Range(char, char),
    Star(Box<Re>),
    Plus(Box<Re>),
    Opt(Box<Re>),
    Union(Box<Re>, Box<Re>),
    Concat(Box<Re>, Box<Re>),
}

fn re_strategy() -> impl Strategy<Value = Re> {
    let leaf = prop_oneof![
        "[abc]{0,2}".prop_map(Re::Lit),
        (prop_oneof![Just('a'), Just('b')], prop_oneof![Just('b'), Just('c')])
            .prop_map(|(lo, hi)| Re::Range(lo, hi)),
    ];
    leaf.prop_recursive(3, 12, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|r| Re::Star(Box::new(r))),
            inner.clone().prop_map(|r| Re::Plus(Box::new(r))),
            inner.clone().prop_map(|r| Re::Opt(Box::new(r))),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Re::Union(Box::new(a), Box::new(b))),
            (inner.clone(), inner).prop_map(|(a, b)| Re::Concat(Box::new(a), Box::new(b))),
        ]
    })
}

fn word_strategy() -> impl Strategy<Value = String> {
    "[abc]{0,4}"
}

fn build_re(rw: &mut SeqRewriter, re: &Re) -> TermId {
    match re {
        Re::Lit(s) => {
            let lit = rw.tm_mut().mk_str_s(s);
            rw.tm_mut().mk_to_re(lit)
        }
        Re::Range(lo, hi) => {
            let lo = rw.tm_mut().mk_str_s(&lo.to_string());
            let hi = rw.tm_mut().mk_str_s(&hi.to_string());
            rw.tm_mut().mk_re_range(lo, hi)
        }
        Re::Star(r) => {
            let r = build_re(rw, r);
            rw.tm_mut().mk_re_star(r)
        }
        Re::Plus(r) => {
            let r = build_re(rw, r);
            rw.tm_mut().mk_re_plus(r)
        }
        Re::Opt(r) => {
            let r = build_re(rw, r);
            rw.tm_mut().mk_re_opt(r)
        }
        Re::Union(a, b) => {
            let a = build_re(rw, a);
            let b = build_re(rw, b);
            rw.tm_mut().mk_re_union(a, b)
        }
        Re::Concat(a, b) => {
            let a = build_re(rw, a);
            let b = build_re(rw, b);
            rw.tm_mut().mk_re_concat(a, b)
        }
    }
}

/// Reference membership on the description itself.
fn re_matches(re: &Re, w: &str) -> bool {
    match re {
        Re::Lit(s) => w == s,
        Re::Range(lo, hi) => {
            let mut cs = w.chars();
            match (cs.next(), cs.next()) {
                (Some(c), None) => *lo <= c && c <= *hi,
                _ => false,
            }
        }
        Re::Star(r) => {
            if w.is_empty() {
                return true;
            }
            (1..=w.len()).any(|i| re_matches(r, &w[..i]) && re_matches(re, &w[i..]))
        }
        Re::Plus(r) => {
            if w.is_empty() {
                return re_matches(r, "");
            }
            (1..=w.len())
                .any(|i| re_matches(r, &w[..i]) && (w[i..].is_empty() || re_matches(re, &w[i..])))
        }
        Re::Opt(r) => w.is_empty() || re_matches(r, w),
        Re::Union(a, b) => re_matches(a, w) || re_matches(b, w),
        Re::Concat(a, b) => {
            (0..=w.len()).any(|i| re_matches(a, &w[..i]) && re_matches(b, &w[i..]))
        }
    }
}

fn membership_verdict(rw: &mut SeqRewriter, w: &str, r: TermId) -> Option<bool> {
    let word = rw.tm_mut().mk_str_s(w);
    let mem = rw.tm_mut().mk_str_in_re(word, r);
    let v = rw.simplify(mem);
    rw.tm().bool_value(v)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Membership of a ground word agrees with the reference semantics.
    #[test]
    fn membership_matches_reference(re in re_strategy(), w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let got = membership_verdict(&mut rw, &w, r);
        prop_assert_eq!(got, Some(re_matches(&re, &w)));
    }

    /// `c · w ∈ L(R)  ⇔  w ∈ L(D(c, R))`.
    #[test]
    fn derivative_correctness(re in re_strategy(), c in prop_oneof![Just('a'), Just('b'), Just('c')], w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let ch = rw.tm_mut().mk_char(c as u32);
        let d = rw.mk_derivative(ch, r);
        let via_deriv = membership_verdict(&mut rw, &w, d);
        let full = format!("{}{}", c, w);
        prop_assert_eq!(via_deriv, Some(re_matches(&re, &full)));
    }

    /// `ε ∈ L(R)` iff the nullability formula is true.
    #[test]
    fn nullability_correctness(re in re_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let n = rw.is_nullable(r);
        let n = rw.simplify(n);
        prop_assert_eq!(rw.tm().bool_value(n), Some(re_matches(&re, "")));
    }

    /// The automaton bridge accepts exactly the same ground words.
    #[test]
    fn automaton_agrees_with_membership(re in re_strategy(), w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let aut = rw.re_to_aut(r).expect("supported shape");
        let chars: Vec<u32> = w.chars().map(|c| c as u32).collect();
        let alg = strsmt::CharAlgebra::default();
        let accepted = aut.accepts(rw.tm_mut(), &alg, &chars);
        let expected = if re_matches(&re, &w) { Lbool::True } else { Lbool::False };
        prop_assert_eq!(accepted, expected);
    }

    /// Length bounds are sound for every accepted word.
    #[test]
    fn length_bounds_sound(re in re_strategy(), w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        if !re_matches(&re, &w) {
            return Ok(());
        }
        let r = build_re(&mut rw, &re);
        let min = strsmt::length::re_min_length(rw.tm(), r);
        let max = strsmt::length::re_max_length(rw.tm(), r);
        prop_assert!(min <= w.len() as u64);
        if let Some(max) = max {
            prop_assert!(w.len() as u64 <= max);
        }
    }

    /// Derivatives are in normal form.
    #[test]
    fn derivative_normal_form(re in re_strategy(), c in prop_oneof![Just('a'), Just('z')]) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let ch = rw.tm_mut().mk_char(c as u32);
        let d = rw.mk_derivative(ch, r);
        prop_assert!(rw.check_deriv_normal_form(d));
        let d = rw.mk_derivative_elem(r);
        prop_assert!(rw.check_deriv_normal_form(d));
    }

    /// The driver is idempotent on membership terms.
    #[test]
    fn simplify_is_idempotent(re in re_strategy(), w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let word = rw.tm_mut().mk_str_s(&w);
        let mem = rw.tm_mut().mk_str_in_re(word, r);
        let once = rw.simplify(mem);
        let twice = rw.simplify(once);
        prop_assert_eq!(once, twice);
    }

    /// Cached and uncached computation agree.
    #[test]
    fn cache_transparency(re in re_strategy(), w in word_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        let first = membership_verdict(&mut rw, &w, r);
        rw.clear_caches();
        let second = membership_verdict(&mut rw, &w, r);
        prop_assert_eq!(first, second);
    }

    /// The sampler only produces accepted words, and never reports an
    /// empty language when the reference accepts something short.
    #[test]
    fn sampler_is_sound(re in re_strategy()) {
        let mut rw = SeqRewriter::default();
        let r = build_re(&mut rw, &re);
        match rw.some_string_in_re(r) {
            Witness::Found(s) => {
                let w: String = s
                    .code_points()
                    .iter()
                    .filter_map(|&c| char::from_u32(c))
                    .collect();
                prop_assert_eq!(w.chars().count(), s.len());
                prop_assert!(re_matches(&re, &w));
            }
            Witness::Empty => {
                for w in ["", "a", "b", "c", "ab", "abc"] {
                    prop_assert!(!re_matches(&re, w));
                }
            }
            Witness::Unknown => {}
        }
    }

    /// Literal folding of the string operations matches the value-level
    /// operations.
    #[test]
    fn literal_ops_fold(a in "[abc]{0,5}", b in "[abc]{0,2}", i in 0usize..6, l in 0usize..6) {
        let mut rw = SeqRewriter::default();
        let ta = rw.tm_mut().mk_str_s(&a);
        let tb = rw.tm_mut().mk_str_s(&b);

        let t = rw.tm_mut().mk_seq_contains(ta, tb);
        let v = rw.simplify(t);
        prop_assert_eq!(rw.tm().bool_value(v), Some(a.contains(&b)));

        let ti = rw.tm_mut().mk_int_i64(i as i64);
        let tl = rw.tm_mut().mk_int_i64(l as i64);
        let t = rw.tm_mut().mk_seq_extract(ta, ti, tl);
        let v = rw.simplify(t);
        let za = ZString::from(a.as_str());
        prop_assert_eq!(rw.tm().str_value(v), Some(&za.extract(i, l)));

        let t = rw.tm_mut().mk_seq_len(ta);
        let v = rw.simplify(t);
        let n = rw.tm().int_value(v).and_then(num_traits::ToPrimitive::to_usize);
        prop_assert_eq!(n, Some(a.chars().count()));
    }
}
