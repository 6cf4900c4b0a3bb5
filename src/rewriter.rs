//! Rewriter core: configuration, statistics, statuses, and dispatch.
//!
//! [`SeqRewriter`] owns the term manager and the operation cache. One call
//! to [`SeqRewriter::apply`] performs a single dispatch on the top-level
//! operator; [`SeqRewriter::simplify`] drives dispatch bottom-up to a
//! fixed point. Rule cascades for the individual operator families live in
//! the sibling modules (`string_ops`, `regex_ops`, `derivative`,
//! `eq_reducer`, `membership`), all as `impl SeqRewriter` blocks.

use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::ast::{TermId, TermKind, TermManager};
use crate::automaton::{re_to_automaton, Automaton};
use crate::cache::OpCache;
use crate::charpred::{CharAlgebra, ExprSolver};
use crate::error::{Error, Result};

/// Outcome of a single rewrite dispatch.
///
/// `Failed` means no rule fired and the caller keeps the original term.
/// `Done` results need no further normalization. `Rewrite1`–`Rewrite3`
/// ask the driver to re-apply rewriting to the result up to that many
/// levels; `RewriteFull` asks for re-application to the fixed point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteResult {
    /// No rule fired.
    Failed,
    /// Fully simplified result.
    Done(TermId),
    /// Re-apply once.
    Rewrite1(TermId),
    /// Re-apply up to two levels.
    Rewrite2(TermId),
    /// Re-apply up to three levels.
    Rewrite3(TermId),
    /// Re-apply to the fixed point.
    RewriteFull(TermId),
}

impl RewriteResult {
    /// The produced term, unless the dispatch failed.
    pub fn term(&self) -> Option<TermId> {
        match self {
            RewriteResult::Failed => None,
            RewriteResult::Done(t)
            | RewriteResult::Rewrite1(t)
            | RewriteResult::Rewrite2(t)
            | RewriteResult::Rewrite3(t)
            | RewriteResult::RewriteFull(t) => Some(*t),
        }
    }

    /// True iff no rule fired.
    pub fn is_failed(&self) -> bool {
        matches!(self, RewriteResult::Failed)
    }
}

/// Rewriter configuration.
#[derive(Debug, Clone)]
pub struct SeqRewriterConfig {
    /// When true, adjacent literal strings and constant units fuse into
    /// longer string literals; when false, every unit stays distinct and
    /// string literals expand into units.
    pub coalesce_chars: bool,
}

impl Default for SeqRewriterConfig {
    fn default() -> Self {
        SeqRewriterConfig { coalesce_chars: true }
    }
}

/// Rewriting statistics.
#[derive(Debug, Clone, Default)]
pub struct SeqRewriterStats {
    /// Dispatches that fired a string/sequence rule.
    pub string_rewrites: u64,
    /// Dispatches that fired a regex rule.
    pub regex_rewrites: u64,
    /// Derivative computations.
    pub derivative_calls: u64,
    /// Membership rewrites.
    pub membership_rewrites: u64,
    /// Equation reductions.
    pub eq_reductions: u64,
    /// Ites lifted over an operator.
    pub ite_lifts: u64,
    /// Operation-cache hits.
    pub cache_hits: u64,
    /// Operation-cache misses.
    pub cache_misses: u64,
}

/// Fuel for the fixed-point driver; rewriting is terminating, the bound
/// only caps pathological ping-pong between host-constructed terms.
const SIMPLIFY_FUEL: u32 = 1 << 14;

/// The sequence/string/regex rewriter.
pub struct SeqRewriter {
    pub(crate) tm: TermManager,
    pub(crate) config: SeqRewriterConfig,
    pub(crate) stats: SeqRewriterStats,
    pub(crate) cache: OpCache,
    pub(crate) alg: CharAlgebra,
}

impl std::fmt::Debug for SeqRewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeqRewriter")
            .field("config", &self.config)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for SeqRewriter {
    fn default() -> Self {
        Self::new(TermManager::new(), SeqRewriterConfig::default())
    }
}

impl SeqRewriter {
    /// Rewriter over the given manager.
    pub fn new(tm: TermManager, config: SeqRewriterConfig) -> Self {
        SeqRewriter {
            tm,
            config,
            stats: SeqRewriterStats::default(),
            cache: OpCache::default(),
            alg: CharAlgebra::default(),
        }
    }

    /// Install a satisfiability capability for character predicates.
    pub fn set_solver(&mut self, solver: Box<dyn ExprSolver>) {
        self.alg = CharAlgebra::new(solver);
    }

    /// Shared term manager.
    pub fn tm(&self) -> &TermManager {
        &self.tm
    }

    /// Shared term manager, mutable.
    pub fn tm_mut(&mut self) -> &mut TermManager {
        &mut self.tm
    }

    /// Consume the rewriter, returning the manager.
    pub fn into_manager(self) -> TermManager {
        self.tm
    }

    /// Statistics so far.
    pub fn stats(&self) -> &SeqRewriterStats {
        &self.stats
    }

    /// Drop all cached results. Results are unchanged by this; only
    /// re-computation cost is affected.
    pub fn clear_caches(&mut self) {
        self.cache.clear();
    }

    /// Translate a regex term to an automaton, if the bridge supports its
    /// shape.
    pub fn re_to_aut(&mut self, r: TermId) -> Option<Automaton> {
        if !self.tm.sorts.is_re(self.tm.sort(r)) {
            return None;
        }
        re_to_automaton(&mut self.tm, &mut self.alg, r)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    /// One rewrite dispatch on the top operator of `t`.
    ///
    /// Errors only on host misuse: a term that is not an operator
    /// application, or an application over ill-sorted arguments.
    pub fn apply(&mut self, t: TermId) -> Result<RewriteResult> {
        match self.tm.kind(t) {
            TermKind::Var(..)
            | TermKind::IntConst(_)
            | TermKind::CharConst(_)
            | TermKind::BvConst(..)
            | TermKind::True
            | TermKind::False => Err(Error::NotAnApplication(format!("{:?}", self.tm.kind(t)))),
            _ => {
                self.validate_sorts(t)?;
                Ok(self.apply_core(t))
            }
        }
    }

    fn validate_sorts(&self, t: TermId) -> Result<()> {
        let seq_of = |x: TermId| self.tm.sorts.is_seq(self.tm.sort(x));
        let re_of = |x: TermId| self.tm.sorts.is_re(self.tm.sort(x));
        let mismatch = |expected: &'static str, found: TermId| {
            Err(Error::SortMismatch {
                expected,
                found: format!("{:?}", self.tm.sorts.kind(self.tm.sort(found))),
            })
        };
        match *self.tm.kind(t) {
            TermKind::StrInRe(a, r) => {
                if !seq_of(a) {
                    return mismatch("sequence", a);
                }
                if !re_of(r) {
                    return mismatch("regex", r);
                }
            }
            TermKind::SeqConcat(a, b) => {
                if self.tm.sort(a) != self.tm.sort(b) {
                    return mismatch("matching sequence sorts", b);
                }
            }
            TermKind::SeqExtract(a, b, c) => {
                if !seq_of(a) {
                    return mismatch("sequence", a);
                }
                if self.tm.sort(b) != self.tm.sorts.int_sort
                    || self.tm.sort(c) != self.tm.sorts.int_sort
                {
                    return mismatch("integer", b);
                }
            }
            TermKind::ReUnion(a, b)
            | TermKind::ReInter(a, b)
            | TermKind::ReDiff(a, b)
            | TermKind::ReConcat(a, b) => {
                if !re_of(a) || self.tm.sort(a) != self.tm.sort(b) {
                    return mismatch("matching regex sorts", b);
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Dispatch without the input check; constants and variables fail.
    pub(crate) fn apply_core(&mut self, t: TermId) -> RewriteResult {
        let kind = self.tm.kind(t).clone();
        let st = match &kind {
            TermKind::And(args) => self.mk_bool_app(true, args.clone()),
            TermKind::Or(args) => self.mk_bool_app(false, args.clone()),
            TermKind::Eq(a, b) => self.mk_eq_core(*a, *b),

            TermKind::SeqUnit(e) => self.mk_seq_unit_rw(*e),
            TermKind::Str(_) => {
                if self.config.coalesce_chars {
                    RewriteResult::Failed
                } else {
                    self.mk_str_units(t)
                }
            }
            TermKind::SeqConcat(a, b) => self.mk_seq_concat_core(*a, *b),
            TermKind::SeqLen(a) => self.mk_seq_length(*a),
            TermKind::SeqExtract(a, b, c) => self.mk_seq_extract(*a, *b, *c),
            TermKind::SeqAt(a, b) => self.mk_seq_at(*a, *b),
            TermKind::SeqNth(a, b) => self.mk_seq_nth(*a, *b),
            TermKind::SeqNthI(a, b) => self.mk_seq_nth_i(*a, *b),
            TermKind::SeqNthU(..) => RewriteResult::Failed,
            TermKind::SeqIndexOf(a, b, c) => self.mk_seq_index(*a, *b, *c),
            TermKind::SeqLastIndexOf(a, b) => self.mk_seq_last_index(*a, *b),
            TermKind::SeqContains(a, b) => self.mk_seq_contains(*a, *b),
            TermKind::SeqPrefixOf(a, b) => self.mk_seq_prefix(*a, *b),
            TermKind::SeqSuffixOf(a, b) => self.mk_seq_suffix(*a, *b),
            TermKind::SeqReplace(a, b, c) => self.mk_seq_replace(*a, *b, *c),
            TermKind::SeqReplaceAll(a, b, c) => self.mk_seq_replace_all(*a, *b, *c),
            TermKind::SeqMap(f, s) => self.mk_seq_map(*f, *s),
            TermKind::SeqMapi(f, i, s) => self.mk_seq_mapi(*f, *i, *s),
            TermKind::SeqFoldl(f, b, s) => self.mk_seq_foldl(*f, *b, *s),
            TermKind::SeqFoldli(f, i, b, s) => self.mk_seq_foldli(*f, *i, *b, *s),

            TermKind::StrItos(a) => self.mk_str_itos(*a),
            TermKind::StrStoi(a) => self.mk_str_stoi(*a),
            TermKind::StrFromUbv(a) => self.mk_str_ubv2s(*a),
            TermKind::StrFromSbv(a) => self.mk_str_sbv2s(*a),
            TermKind::StrToCode(a) => self.mk_str_to_code(*a),
            TermKind::StrFromCode(a) => self.mk_str_from_code(*a),
            TermKind::StrIsDigit(a) => self.mk_str_is_digit(*a),
            TermKind::StrLt(a, b) => self.mk_str_lt(*a, *b),
            TermKind::StrLe(a, b) => self.mk_str_le(*a, *b),
            TermKind::StrInRe(a, r) => self.mk_str_in_regexp(*a, *r),

            TermKind::ToRe(a) => self.mk_str_to_regexp(*a),
            TermKind::ReConcat(a, b) => self.mk_re_concat(*a, *b),
            TermKind::ReUnion(a, b) => self.mk_re_union(*a, *b),
            TermKind::ReInter(a, b) => self.mk_re_inter(*a, *b),
            TermKind::ReDiff(a, b) => self.mk_re_diff(*a, *b),
            TermKind::ReComplement(a) => self.mk_re_complement(*a),
            TermKind::ReStar(a) => self.mk_re_star(*a),
            TermKind::RePlus(a) => self.mk_re_plus(*a),
            TermKind::ReOpt(a) => self.mk_re_opt(*a),
            TermKind::ReLoop(a, lo, hi) => self.mk_re_loop(*a, *lo, *hi),
            TermKind::RePower(a, n) => self.mk_re_power(*a, *n),
            TermKind::ReRange(lo, hi) => self.mk_re_range(*lo, *hi),
            TermKind::ReReverse(a) => self.mk_re_reverse_rw(*a),
            TermKind::ReDerivative(e, r) => {
                let (e, r) = (*e, *r);
                let d = self.mk_derivative(e, r);
                RewriteResult::Done(d)
            }
            TermKind::ReAntimirovUnion(a, b) => {
                // Outside derivative construction an Antimirov union is a
                // plain union again.
                let u = self.tm.mk_re_union(*a, *b);
                RewriteResult::Rewrite1(u)
            }
            TermKind::ReEmpty(_) | TermKind::ReFull(_) | TermKind::ReAllChar(_)
            | TermKind::ReOfPred(_) | TermKind::SeqEmpty(_) => RewriteResult::Failed,
            _ => RewriteResult::Failed,
        };
        let st = if st.is_failed() { self.lift_ites_throttled(t, &kind) } else { st };
        if !st.is_failed() {
            use TermKind::*;
            match kind {
                SeqUnit(_) | Str(_) | SeqConcat(..) | SeqLen(_) | SeqExtract(..) | SeqAt(..)
                | SeqNth(..) | SeqNthI(..) | SeqIndexOf(..) | SeqLastIndexOf(..)
                | SeqContains(..) | SeqPrefixOf(..) | SeqSuffixOf(..) | SeqReplace(..)
                | SeqReplaceAll(..) | SeqMap(..) | SeqMapi(..) | SeqFoldl(..) | SeqFoldli(..)
                | StrItos(_) | StrStoi(_) | StrFromUbv(_) | StrFromSbv(_) | StrToCode(_)
                | StrFromCode(_) | StrIsDigit(_) | StrLt(..) | StrLe(..) => {
                    self.stats.string_rewrites += 1
                }
                ToRe(_) | ReConcat(..) | ReUnion(..) | ReInter(..) | ReDiff(..)
                | ReComplement(_) | ReStar(_) | RePlus(_) | ReOpt(_) | ReLoop(..)
                | RePower(..) | ReRange(..) | ReReverse(_) | ReAntimirovUnion(..) => {
                    self.stats.regex_rewrites += 1
                }
                StrInRe(..) => self.stats.membership_rewrites += 1,
                _ => {}
            }
            trace!(input = t.raw(), output = ?st.term().map(TermId::raw), "rewrite");
        }
        st
    }

    // ------------------------------------------------------------------
    // Boolean-level membership merging
    // ------------------------------------------------------------------

    /// Merge `s ∈ R₁` and `s ∈ R₂` atoms (possibly negated) occurring under
    /// one `and`/`or` into a single membership on the same subject `s`.
    fn mk_bool_app(&mut self, is_and: bool, args: Vec<TermId>) -> RewriteResult {
        let mut found = false;
        for &a in &args {
            let inner = self.tm.as_not(a).unwrap_or(a);
            if matches!(self.tm.kind(inner), TermKind::StrInRe(..)) {
                found = true;
                break;
            }
        }
        if !found {
            return RewriteResult::Failed;
        }

        let mut in_re: FxHashMap<TermId, TermId> = FxHashMap::default();
        let mut not_in_re: FxHashMap<TermId, TermId> = FxHashMap::default();
        let mut order: Vec<TermId> = Vec::new();
        let mut found_pair = false;
        let mut rest: Vec<TermId> = Vec::new();

        for &arg in &args {
            let (map_positive, atom) = match self.tm.as_not(arg) {
                Some(inner) => (false, inner),
                None => (true, arg),
            };
            let (x, y) = match self.tm.kind(atom) {
                TermKind::StrInRe(x, y) if !self.tm.is_seq_empty(*x) => (*x, *y),
                _ => {
                    rest.push(arg);
                    continue;
                }
            };
            let (this, other) = if map_positive {
                (&mut in_re, &not_in_re)
            } else {
                (&mut not_in_re, &in_re)
            };
            if let Some(&z) = this.get(&x) {
                // On the map of positive atoms `and` intersects and `or`
                // unions; the negated map is dual.
                let merged = if is_and == map_positive {
                    self.tm.mk_re_inter(z, y)
                } else {
                    self.tm.mk_re_union(z, y)
                };
                this.insert(x, merged);
                found_pair = true;
            } else {
                this.insert(x, y);
                found_pair |= other.contains_key(&x);
                if !order.contains(&x) {
                    order.push(x);
                }
            }
        }
        if !found_pair {
            return RewriteResult::Failed;
        }

        let mut new_args = rest;
        for x in order {
            match (in_re.get(&x).copied(), not_in_re.get(&x).copied()) {
                (Some(y), Some(z)) => {
                    let zc = self.tm.mk_re_complement(z);
                    let w = if is_and {
                        self.tm.mk_re_inter(y, zc)
                    } else {
                        self.tm.mk_re_union(y, zc)
                    };
                    let atom = self.tm.mk_str_in_re(x, w);
                    new_args.push(atom);
                }
                (Some(y), None) => {
                    let atom = self.tm.mk_str_in_re(x, y);
                    new_args.push(atom);
                }
                (None, Some(y)) => {
                    let yc = self.tm.mk_re_complement(y);
                    let atom = self.tm.mk_str_in_re(x, yc);
                    new_args.push(atom);
                }
                (None, None) => {}
            }
        }
        let result = if is_and { self.tm.mk_and(new_args) } else { self.tm.mk_or(new_args) };
        self.stats.membership_rewrites += 1;
        RewriteResult::RewriteFull(result)
    }

    // ------------------------------------------------------------------
    // Equality dispatch
    // ------------------------------------------------------------------

    /// Equality over sequences and regexes.
    pub(crate) fn mk_eq_core(&mut self, l: TermId, r: TermId) -> RewriteResult {
        let sort = self.tm.sort(l);
        if self.tm.sorts.is_re(sort) {
            return self.reduce_re_eq(l, r);
        }
        if !self.tm.sorts.is_seq(sort) {
            return RewriteResult::Failed;
        }
        if let Some(result) = self.reduce_eq_empty(l, r) {
            return RewriteResult::RewriteFull(result);
        }
        let mut changed = false;
        match self.reduce_eq_terms(l, r, &mut changed) {
            None => RewriteResult::Done(self.tm.mk_false()),
            Some(eqs) => {
                if !changed {
                    return RewriteResult::Failed;
                }
                self.stats.eq_reductions += 1;
                let conjuncts = eqs
                    .into_iter()
                    .map(|(a, b)| self.tm.mk_eq(a, b))
                    .collect::<Vec<_>>();
                let result = self.tm.mk_and(conjuncts);
                RewriteResult::Rewrite3(result)
            }
        }
    }

    /// `str.le`-shaped integer inequalities are not simplified here.
    pub fn mk_le_core(&mut self, _l: TermId, _r: TermId) -> RewriteResult {
        RewriteResult::Failed
    }

    // ------------------------------------------------------------------
    // Throttled ite lifting
    // ------------------------------------------------------------------

    /// Lift an `ite` argument over the operator when one of its branches is
    /// shallow, producing `ite(c, f(..t..), f(..e..))`.
    fn lift_ites_throttled(&mut self, t: TermId, kind: &TermKind) -> RewriteResult {
        // Only seq/re/string operator families participate.
        if !lift_ites_applicable(kind) {
            return RewriteResult::Failed;
        }
        let args = self.tm.children(t);
        for (i, &arg) in args.iter().enumerate() {
            let TermKind::Ite(c, th, el) = *self.tm.kind(arg) else { continue };
            if !self.lift_ites_filter(t, arg) {
                continue;
            }
            if self.tm.depth(th) > 2 && self.tm.depth(el) > 2 {
                continue;
            }
            let mut args_t = args.clone();
            args_t[i] = th;
            let mut args_e = args.clone();
            args_e[i] = el;
            let lhs = rebuild_with_children(&mut self.tm, kind, &args_t);
            let rhs = rebuild_with_children(&mut self.tm, kind, &args_e);
            let result = self.tm.mk_ite(c, lhs, rhs);
            self.stats.ite_lifts += 1;
            return RewriteResult::Rewrite2(result);
        }
        RewriteResult::Failed
    }

    /// Returns false iff the ite must not be lifted: never lift a sequence
    /// ite out of a regex-producing operator (`to_re(ite(..))` stays).
    fn lift_ites_filter(&self, t: TermId, ite: TermId) -> bool {
        !(self.tm.sorts.is_re(self.tm.sort(t)) && self.tm.sorts.is_seq(self.tm.sort(ite)))
    }

    // ------------------------------------------------------------------
    // Fixed-point driver
    // ------------------------------------------------------------------

    /// Rewrite `t` bottom-up to a fixed point.
    pub fn simplify(&mut self, t: TermId) -> TermId {
        let mut fuel = SIMPLIFY_FUEL;
        let mut memo = FxHashMap::default();
        self.simplify_rec(t, &mut fuel, &mut memo)
    }

    fn simplify_rec(
        &mut self,
        t: TermId,
        fuel: &mut u32,
        memo: &mut FxHashMap<TermId, TermId>,
    ) -> TermId {
        if let Some(&r) = memo.get(&t) {
            return r;
        }
        if *fuel == 0 {
            return t;
        }
        let kind = self.tm.kind(t).clone();
        let children = self.tm.children(t);
        let mut new_children = Vec::with_capacity(children.len());
        let mut changed = false;
        for &c in &children {
            let c2 = self.simplify_rec(c, fuel, memo);
            changed |= c2 != c;
            new_children.push(c2);
        }
        let t2 = if changed {
            rebuild_with_children(&mut self.tm, &kind, &new_children)
        } else {
            t
        };
        let result = match self.apply_core(t2) {
            RewriteResult::Failed => t2,
            RewriteResult::Done(r)
            | RewriteResult::Rewrite1(r)
            | RewriteResult::Rewrite2(r)
            | RewriteResult::Rewrite3(r)
            | RewriteResult::RewriteFull(r) => {
                if r == t2 {
                    r
                } else {
                    *fuel = fuel.saturating_sub(1);
                    self.simplify_rec(r, fuel, memo)
                }
            }
        };
        memo.insert(t, result);
        result
    }

    // ------------------------------------------------------------------
    // Small shared helpers
    // ------------------------------------------------------------------

    pub(crate) fn zero(&mut self) -> TermId {
        self.tm.mk_int_i64(0)
    }

    pub(crate) fn one(&mut self) -> TermId {
        self.tm.mk_int_i64(1)
    }

    pub(crate) fn minus_one(&mut self) -> TermId {
        self.tm.mk_int_i64(-1)
    }

    /// Subtract the constant `n`, folding through an existing top-level
    /// numeral offset.
    pub(crate) fn mk_sub_const(&mut self, a: TermId, n: i64) -> TermId {
        match self.tm.kind(a) {
            TermKind::Sub(a1, a2) => {
                let (a1, a2) = (*a1, *a2);
                if let Some(k) = self.tm.int_value(a2).cloned() {
                    let c = self.tm.mk_int(k + n);
                    return self.tm.mk_sub(a1, c);
                }
            }
            TermKind::Add(xs) => {
                let xs = xs.clone();
                if let Some((&last, init)) = xs.split_last() {
                    if let Some(k) = self.tm.int_value(last).cloned() {
                        let c = self.tm.mk_int(k - n);
                        let mut ys = init.to_vec();
                        ys.push(c);
                        return self.tm.mk_add(ys);
                    }
                }
            }
            _ => {}
        }
        let c = self.tm.mk_int(BigInt::from(n));
        self.tm.mk_sub(a, c)
    }
}

/// True iff ite lifting may apply over this operator kind.
fn lift_ites_applicable(kind: &TermKind) -> bool {
    use TermKind::*;
    matches!(
        kind,
        SeqConcat(..)
            | SeqLen(_)
            | SeqExtract(..)
            | SeqAt(..)
            | SeqNth(..)
            | SeqNthI(..)
            | SeqIndexOf(..)
            | SeqLastIndexOf(..)
            | SeqContains(..)
            | SeqPrefixOf(..)
            | SeqSuffixOf(..)
            | SeqReplace(..)
            | SeqReplaceAll(..)
            | StrItos(_)
            | StrStoi(_)
            | StrToCode(_)
            | StrFromCode(_)
            | StrIsDigit(_)
            | StrLt(..)
            | StrLe(..)
            | StrInRe(..)
            | ToRe(_)
    )
}

/// Rebuild a term of the given kind over replacement children, routing
/// through the folding constructors.
pub(crate) fn rebuild_with_children(
    tm: &mut TermManager,
    kind: &TermKind,
    cs: &[TermId],
) -> TermId {
    use TermKind::*;
    match kind {
        True => tm.mk_true(),
        False => tm.mk_false(),
        Var(..) | IntConst(_) | CharConst(_) | BvConst(..) | SeqEmpty(_) | Str(_)
        | ReEmpty(_) | ReFull(_) | ReAllChar(_) => {
            debug_assert!(cs.is_empty());
            // Leaves rebuild to themselves; the caller only passes leaves
            // through unchanged.
            match kind {
                Str(s) => tm.mk_str(s.clone()),
                SeqEmpty(s) => tm.mk_seq_empty(*s),
                ReEmpty(s) => tm.mk_re_empty(*s),
                ReFull(s) => tm.mk_re_full(*s),
                ReAllChar(s) => tm.mk_re_allchar(*s),
                IntConst(n) => tm.mk_int(n.clone()),
                CharConst(c) => tm.mk_char(*c),
                BvConst(v, w) => tm.mk_bv(v.clone(), *w),
                Var(name, sort) => {
                    let name = tm.name(*name).to_owned();
                    tm.mk_var(&name, *sort)
                }
                _ => tm.mk_true(),
            }
        }
        Not(_) => tm.mk_not(cs[0]),
        And(_) => tm.mk_and(cs.to_vec()),
        Or(_) => tm.mk_or(cs.to_vec()),
        Eq(..) => tm.mk_eq(cs[0], cs[1]),
        Ite(..) => tm.mk_ite(cs[0], cs[1], cs[2]),
        Select(_) => tm.mk_select(cs.to_vec()),
        Add(_) => tm.mk_add(cs.to_vec()),
        Sub(..) => tm.mk_sub(cs[0], cs[1]),
        Mul(..) => tm.mk_mul(cs[0], cs[1]),
        Le(..) => tm.mk_le(cs[0], cs[1]),
        Lt(..) => tm.mk_lt(cs[0], cs[1]),
        CharLe(..) => tm.mk_char_le(cs[0], cs[1]),
        BvSlt(..) => tm.mk_bv_slt(cs[0], cs[1]),
        BvNeg(_) => tm.mk_bv_neg(cs[0]),
        BvToInt(_) => tm.mk_bv2int(cs[0]),
        SeqUnit(_) => tm.mk_seq_unit(cs[0]),
        SeqConcat(..) => tm.mk_seq_concat(cs[0], cs[1]),
        SeqLen(_) => tm.mk_seq_len(cs[0]),
        SeqExtract(..) => tm.mk_seq_extract(cs[0], cs[1], cs[2]),
        SeqAt(..) => tm.mk_seq_at(cs[0], cs[1]),
        SeqNth(..) => tm.mk_seq_nth(cs[0], cs[1]),
        SeqNthI(..) => tm.mk_seq_nth_i(cs[0], cs[1]),
        SeqNthU(..) => tm.mk_seq_nth_u(cs[0], cs[1]),
        SeqIndexOf(..) => tm.mk_seq_indexof(cs[0], cs[1], cs[2]),
        SeqLastIndexOf(..) => tm.mk_seq_last_indexof(cs[0], cs[1]),
        SeqContains(..) => tm.mk_seq_contains(cs[0], cs[1]),
        SeqPrefixOf(..) => tm.mk_seq_prefixof(cs[0], cs[1]),
        SeqSuffixOf(..) => tm.mk_seq_suffixof(cs[0], cs[1]),
        SeqReplace(..) => tm.mk_seq_replace(cs[0], cs[1], cs[2]),
        SeqReplaceAll(..) => tm.mk_seq_replace_all(cs[0], cs[1], cs[2]),
        SeqMap(..) => tm.mk_seq_map(cs[0], cs[1]),
        SeqMapi(..) => tm.mk_seq_mapi(cs[0], cs[1], cs[2]),
        SeqFoldl(..) => tm.mk_seq_foldl(cs[0], cs[1], cs[2]),
        SeqFoldli(..) => tm.mk_seq_foldli(cs[0], cs[1], cs[2], cs[3]),
        StrItos(_) => tm.mk_str_itos(cs[0]),
        StrStoi(_) => tm.mk_str_stoi(cs[0]),
        StrFromUbv(_) => tm.mk_str_from_ubv(cs[0]),
        StrFromSbv(_) => tm.mk_str_from_sbv(cs[0]),
        StrToCode(_) => tm.mk_str_to_code(cs[0]),
        StrFromCode(_) => tm.mk_str_from_code(cs[0]),
        StrIsDigit(_) => tm.mk_str_is_digit(cs[0]),
        StrLt(..) => tm.mk_str_lt(cs[0], cs[1]),
        StrLe(..) => tm.mk_str_le(cs[0], cs[1]),
        StrInRe(..) => tm.mk_str_in_re(cs[0], cs[1]),
        ToRe(_) => tm.mk_to_re(cs[0]),
        ReRange(..) => tm.mk_re_range(cs[0], cs[1]),
        ReUnion(..) => tm.mk_re_union(cs[0], cs[1]),
        ReInter(..) => tm.mk_re_inter(cs[0], cs[1]),
        ReDiff(..) => tm.mk_re_diff(cs[0], cs[1]),
        ReConcat(..) => tm.mk_re_concat(cs[0], cs[1]),
        ReComplement(_) => tm.mk_re_complement(cs[0]),
        ReStar(_) => tm.mk_re_star(cs[0]),
        RePlus(_) => tm.mk_re_plus(cs[0]),
        ReOpt(_) => tm.mk_re_opt(cs[0]),
        ReLoop(_, lo, hi) => tm.mk_re_loop(cs[0], *lo, *hi),
        RePower(_, n) => tm.mk_re_power(cs[0], *n),
        ReReverse(_) => tm.mk_re_reverse(cs[0]),
        ReOfPred(_) => {
            // Reconstruct the regex sort from the predicate's domain sort.
            let sort = of_pred_re_sort(tm, cs[0]);
            tm.mk_re_of_pred(cs[0], sort)
        }
        ReDerivative(..) => tm.mk_re_derivative(cs[0], cs[1]),
        ReAntimirovUnion(..) => tm.mk_re_antimirov_union(cs[0], cs[1]),
    }
}

fn of_pred_re_sort(tm: &mut TermManager, p: TermId) -> crate::ast::SortId {
    if let crate::ast::SortKind::Array(domain, _) = tm.sorts.kind(tm.sort(p)).clone() {
        if let Some(&elem) = domain.first() {
            let seq = tm.sorts.mk_seq(elem);
            return tm.sorts.mk_re(seq);
        }
    }
    tm.sorts.re_string_sort
}
