//! End-to-end rewriting scenarios driven through the fixed-point driver.

use num_bigint::BigInt;
use strsmt::{SeqRewriter, SeqRewriterConfig, TermKind, TermManager, ZString};

fn rw() -> SeqRewriter {
    SeqRewriter::new(TermManager::new(), SeqRewriterConfig::default())
}

#[test]
fn length_of_concat_with_variable() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let abc = rw.tm_mut().mk_str_s("abc");
    let de = rw.tm_mut().mk_str_s("de");
    let tail = rw.tm_mut().mk_seq_concat(x, de);
    let cat = rw.tm_mut().mk_seq_concat(abc, tail);
    let len = rw.tm_mut().mk_seq_len(cat);
    let r = rw.simplify(len);
    let len_x = rw.tm_mut().mk_seq_len(x);
    let five = rw.tm_mut().mk_int_i64(5);
    let expect = rw.tm_mut().mk_add(vec![len_x, five]);
    assert_eq!(r, expect);
}

#[test]
fn extract_inside_literal_prefix() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let lit = rw.tm_mut().mk_str_s("abcdef");
    let cat = rw.tm_mut().mk_seq_concat(lit, x);
    let one = rw.tm_mut().mk_int_i64(1);
    let three = rw.tm_mut().mk_int_i64(3);
    let ext = rw.tm_mut().mk_seq_extract(cat, one, three);
    let r = rw.simplify(ext);
    assert_eq!(rw.tm().str_value(r), Some(&ZString::from("bcd")));
}

#[test]
fn contains_literal_and_symbolic() {
    let mut rw = rw();
    let hello = rw.tm_mut().mk_str_s("hello world");
    let world = rw.tm_mut().mk_str_s("world");
    let c = rw.tm_mut().mk_seq_contains(hello, world);
    let r = rw.simplify(c);
    assert!(rw.tm().is_true(r));

    // contains("ab", x ++ "ab" ++ y) cannot be decided.
    let ab = rw.tm_mut().mk_str_s("ab");
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let __string_sort = rw.tm().sorts.string_sort;
    let y = rw.tm_mut().mk_var("y", __string_sort);
    let tail = rw.tm_mut().mk_seq_concat(ab, y);
    let mid = rw.tm_mut().mk_seq_concat(x, tail);
    let c = rw.tm_mut().mk_seq_contains(ab, mid);
    let r = rw.simplify(c);
    assert!(rw.tm().bool_value(r).is_none());
}

#[test]
fn membership_by_derivative_steps() {
    let mut rw = rw();
    let a = rw.tm_mut().mk_str_s("a");
    let ra = rw.tm_mut().mk_to_re(a);
    let lo = rw.tm_mut().mk_str_s("a");
    let hi = rw.tm_mut().mk_str_s("c");
    let range = rw.tm_mut().mk_re_range(lo, hi);
    let star = rw.tm_mut().mk_re_star(range);
    let re = rw.tm_mut().mk_re_concat(ra, star);
    let abc = rw.tm_mut().mk_str_s("abc");
    let mem = rw.tm_mut().mk_str_in_re(abc, re);
    let r = rw.simplify(mem);
    assert!(rw.tm().is_true(r));

    let xyz = rw.tm_mut().mk_str_s("xyz");
    let mem = rw.tm_mut().mk_str_in_re(xyz, re);
    let r = rw.simplify(mem);
    assert!(rw.tm().is_false(r));
}

#[test]
fn replace_all_literal_scan() {
    let mut rw = rw();
    let a = rw.tm_mut().mk_str_s("abababa");
    let b = rw.tm_mut().mk_str_s("aba");
    let c = rw.tm_mut().mk_str_s("X");
    let t = rw.tm_mut().mk_seq_replace_all(a, b, c);
    let r = rw.simplify(t);
    assert_eq!(rw.tm().str_value(r), Some(&ZString::from("XbX")));
}

#[test]
fn string_integer_conversions() {
    let mut rw = rw();
    // stoi("07") = 7: leading zeros are fine for stoi.
    let s07 = rw.tm_mut().mk_str_s("07");
    let t = rw.tm_mut().mk_str_stoi(s07);
    let r = rw.simplify(t);
    assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(7)));

    // stoi(itos(-3)) = -1 because itos(-3) = "".
    let m3 = rw.tm_mut().mk_int_i64(-3);
    let itos = rw.tm_mut().mk_str_itos(m3);
    let t = rw.tm_mut().mk_str_stoi(itos);
    let r = rw.simplify(t);
    assert_eq!(rw.tm().int_value(r), Some(&BigInt::from(-1)));

    // itos(stoi("a")) = "".
    let bad = rw.tm_mut().mk_str_s("a");
    let stoi = rw.tm_mut().mk_str_stoi(bad);
    let t = rw.tm_mut().mk_str_itos(stoi);
    let r = rw.simplify(t);
    assert!(rw.tm().is_seq_empty(r));
}

#[test]
fn two_sided_word_equation_survives() {
    let mut rw = rw();
    let a = rw.tm_mut().mk_char('a' as u32);
    let b = rw.tm_mut().mk_char('b' as u32);
    let ua = rw.tm_mut().mk_seq_unit(a);
    let ub = rw.tm_mut().mk_seq_unit(b);
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let __string_sort = rw.tm().sorts.string_sort;
    let y = rw.tm_mut().mk_var("y", __string_sort);
    let l = rw.tm_mut().mk_seq_concat(ua, x);
    let r0 = rw.tm_mut().mk_seq_concat(y, ub);
    let eq = rw.tm_mut().mk_eq(l, r0);
    let r = rw.simplify(eq);
    // The equation has solutions, so it must not become false.
    assert!(!rw.tm().is_false(r));
}

#[test]
fn boolean_level_membership_merge() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let s = rw.tm_mut().mk_var("s", __string_sort);
    let __re_string_sort = rw.tm().sorts.re_string_sort;
    let r1 = rw.tm_mut().mk_var("r1", __re_string_sort);
    let __re_string_sort = rw.tm().sorts.re_string_sort;
    let r2 = rw.tm_mut().mk_var("r2", __re_string_sort);
    let m1 = rw.tm_mut().mk_str_in_re(s, r1);
    let m2 = rw.tm_mut().mk_str_in_re(s, r2);
    let conj = rw.tm_mut().mk_and(vec![m1, m2]);
    let r = rw.simplify(conj);
    // The two memberships merge into one over the intersection.
    match *rw.tm().kind(r) {
        TermKind::StrInRe(subj, re) => {
            assert_eq!(subj, s);
            assert!(matches!(*rw.tm().kind(re), TermKind::ReInter(..)));
        }
        ref k => panic!("expected merged membership, got {:?}", k),
    }
}

#[test]
fn prefix_of_bounded_is_equality() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let c = rw.tm_mut().mk_char('c' as u32);
    let uc = rw.tm_mut().mk_seq_unit(c);
    // prefixof(x ++ 'c', "z") has |rhs| = 1 <= min |lhs|, so it becomes an
    // equality, which the reducer then refutes on lengths.
    let lhs = rw.tm_mut().mk_seq_concat(x, uc);
    let z = rw.tm_mut().mk_str_s("z");
    let p = rw.tm_mut().mk_seq_prefixof(lhs, z);
    let r = rw.simplify(p);
    // x ++ 'c' = "z" forces x = "" and 'c' = 'z', which is false.
    assert!(rw.tm().is_false(r));
}

#[test]
fn regex_union_canonicalization_is_order_insensitive() {
    let mut rw = rw();
    let mut lit = |rw: &mut SeqRewriter, s: &str| {
        let t = rw.tm_mut().mk_str_s(s);
        rw.tm_mut().mk_to_re(t)
    };
    let ra = lit(&mut rw, "a");
    let rb = lit(&mut rw, "b");
    let rc = lit(&mut rw, "c");
    let u1 = rw.tm_mut().mk_re_union(ra, rb);
    let u1 = rw.tm_mut().mk_re_union(u1, rc);
    let u2 = rw.tm_mut().mk_re_union(rc, ra);
    let u2 = rw.tm_mut().mk_re_union(rb, u2);
    let n1 = rw.simplify(u1);
    let n2 = rw.simplify(u2);
    assert_eq!(n1, n2);
}

#[test]
fn opt_membership_case_splits_on_length() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let ab = rw.tm_mut().mk_str_s("ab");
    let rab = rw.tm_mut().mk_to_re(ab);
    let opt = rw.tm_mut().mk_re_opt(rab);
    let mem = rw.tm_mut().mk_str_in_re(x, opt);
    let r = rw.simplify(mem);
    // Result is a case split mentioning the empty case; it must not be a
    // bare membership in the optional.
    assert!(rw.tm().bool_value(r).is_none());
    assert!(!matches!(*rw.tm().kind(r), TermKind::StrInRe(..)));
}

#[test]
fn sbv2s_expands_sign_test() {
    let mut rw = rw();
    let bv = rw.tm_mut().mk_bv(BigInt::from(250), 8);
    let t = rw.tm_mut().mk_str_from_sbv(bv);
    let r = rw.simplify(t);
    // 250 as a signed 8-bit value is -6.
    assert_eq!(rw.tm().str_value(r), Some(&ZString::from("-6")));
    let bv = rw.tm_mut().mk_bv(BigInt::from(17), 8);
    let t = rw.tm_mut().mk_str_from_ubv(bv);
    let r = rw.simplify(t);
    assert_eq!(rw.tm().str_value(r), Some(&ZString::from("17")));
}

#[test]
fn idempotence_on_mixed_terms() {
    let mut rw = rw();
    let __string_sort = rw.tm().sorts.string_sort;
    let x = rw.tm_mut().mk_var("x", __string_sort);
    let ab = rw.tm_mut().mk_str_s("ab");
    let cat = rw.tm_mut().mk_seq_concat(ab, x);
    let len = rw.tm_mut().mk_seq_len(cat);
    let zero = rw.tm_mut().mk_int_i64(0);
    let five = rw.tm_mut().mk_int_i64(5);
    let ext = rw.tm_mut().mk_seq_extract(cat, zero, five);
    let contains = rw.tm_mut().mk_seq_contains(cat, ab);
    for t in [len, ext, contains] {
        let once = rw.simplify(t);
        let twice = rw.simplify(once);
        assert_eq!(once, twice);
    }
}

#[test]
fn coalescing_disabled_keeps_units() {
    let mut tmcfg = SeqRewriterConfig::default();
    tmcfg.coalesce_chars = false;
    let mut rw = SeqRewriter::new(TermManager::new(), tmcfg);
    let a = rw.tm_mut().mk_char('a' as u32);
    let ua = rw.tm_mut().mk_seq_unit(a);
    let r = rw.simplify(ua);
    // unit('a') must stay a unit, not become the literal "a".
    assert!(matches!(*rw.tm().kind(r), TermKind::SeqUnit(_)));
    // And a literal expands into units.
    let ab = rw.tm_mut().mk_str_s("ab");
    let r = rw.simplify(ab);
    assert!(matches!(*rw.tm().kind(r), TermKind::SeqConcat(..)));
}
