//! Arena-allocated, hash-consed terms and sorts.
//!
//! [`TermManager`] owns every term: constructing the same term kind twice
//! yields the same [`TermId`], so equality of terms is equality of ids.
//! Boolean and arithmetic constructors perform light folding (constants,
//! units, annihilators, double negation); sequence and regex constructors
//! are structural, all their simplification lives in the rewriter.

use lasso::{Rodeo, Spur};
use num_bigint::BigInt;
use num_traits::{Signed, Zero};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::zstring::{ZString, MAX_CHAR};

/// Three-valued truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lbool {
    /// Definitely false.
    False,
    /// Unknown.
    Undef,
    /// Definitely true.
    True,
}

/// Sort identifier, valid within its [`TermManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SortId(u32);

impl SortId {
    /// Raw index of the sort.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Structure of a sort.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SortKind {
    /// Booleans.
    Bool,
    /// Unbounded integers.
    Int,
    /// Characters, integers in `[0, MAX_CHAR]`.
    Char,
    /// Fixed-width bit-vectors.
    BitVec(u32),
    /// Sequences over an element sort. Strings are `Seq(Char)`.
    Seq(SortId),
    /// Regular expressions over a sequence sort.
    Re(SortId),
    /// Function values used by map/fold, `domain -> range`.
    Array(Vec<SortId>, SortId),
    /// Uninterpreted sort.
    Uninterpreted(Spur),
}

/// Sort table with interning and the well-known sorts cached.
#[derive(Debug)]
pub struct SortTable {
    kinds: Vec<SortKind>,
    dedup: FxHashMap<SortKind, SortId>,
    /// The Boolean sort.
    pub bool_sort: SortId,
    /// The integer sort.
    pub int_sort: SortId,
    /// The character sort.
    pub char_sort: SortId,
    /// `Seq(Char)`.
    pub string_sort: SortId,
    /// `Re(Seq(Char))`.
    pub re_string_sort: SortId,
}

impl SortTable {
    fn new() -> Self {
        let mut t = SortTable {
            kinds: Vec::new(),
            dedup: FxHashMap::default(),
            bool_sort: SortId(0),
            int_sort: SortId(0),
            char_sort: SortId(0),
            string_sort: SortId(0),
            re_string_sort: SortId(0),
        };
        t.bool_sort = t.intern(SortKind::Bool);
        t.int_sort = t.intern(SortKind::Int);
        t.char_sort = t.intern(SortKind::Char);
        t.string_sort = t.intern(SortKind::Seq(t.char_sort));
        t.re_string_sort = t.intern(SortKind::Re(t.string_sort));
        t
    }

    fn intern(&mut self, kind: SortKind) -> SortId {
        if let Some(&id) = self.dedup.get(&kind) {
            return id;
        }
        let id = SortId(self.kinds.len() as u32);
        self.kinds.push(kind.clone());
        self.dedup.insert(kind, id);
        id
    }

    /// Structure of `s`.
    pub fn kind(&self, s: SortId) -> &SortKind {
        &self.kinds[s.0 as usize]
    }

    /// Sequence sort over `elem`.
    pub fn mk_seq(&mut self, elem: SortId) -> SortId {
        self.intern(SortKind::Seq(elem))
    }

    /// Regex sort over the sequence sort `seq`.
    pub fn mk_re(&mut self, seq: SortId) -> SortId {
        self.intern(SortKind::Re(seq))
    }

    /// Bit-vector sort of width `w`.
    pub fn mk_bitvec(&mut self, w: u32) -> SortId {
        self.intern(SortKind::BitVec(w))
    }

    /// Function sort `domain -> range`.
    pub fn mk_array(&mut self, domain: Vec<SortId>, range: SortId) -> SortId {
        self.intern(SortKind::Array(domain, range))
    }

    /// Element sort of a sequence sort.
    pub fn seq_elem(&self, seq: SortId) -> Option<SortId> {
        match self.kind(seq) {
            SortKind::Seq(e) => Some(*e),
            _ => None,
        }
    }

    /// Sequence sort underneath a regex sort.
    pub fn re_seq(&self, re: SortId) -> Option<SortId> {
        match self.kind(re) {
            SortKind::Re(s) => Some(*s),
            _ => None,
        }
    }

    /// Range sort of a function sort.
    pub fn array_range(&self, a: SortId) -> Option<SortId> {
        match self.kind(a) {
            SortKind::Array(_, r) => Some(*r),
            _ => None,
        }
    }

    /// True iff `s` is a sequence sort.
    pub fn is_seq(&self, s: SortId) -> bool {
        matches!(self.kind(s), SortKind::Seq(_))
    }

    /// True iff `s` is a regex sort.
    pub fn is_re(&self, s: SortId) -> bool {
        matches!(self.kind(s), SortKind::Re(_))
    }
}

/// Term identifier, valid within its [`TermManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TermId(u32);

impl TermId {
    /// Construct from a raw index. Only meaningful for ids handed out by a
    /// manager.
    pub fn new(raw: u32) -> Self {
        TermId(raw)
    }

    /// Raw index, also the stable ordering key used by the regex
    /// set-merging discipline.
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Structure of a term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TermKind {
    // -------- core --------
    /// Boolean constant true.
    True,
    /// Boolean constant false.
    False,
    /// Named variable of a sort.
    Var(Spur, SortId),
    /// Negation.
    Not(TermId),
    /// N-ary conjunction.
    And(Vec<TermId>),
    /// N-ary disjunction.
    Or(Vec<TermId>),
    /// Equality, arguments in canonical id order.
    Eq(TermId, TermId),
    /// If-then-else.
    Ite(TermId, TermId, TermId),
    /// Function-value application (array select); `args[0]` is the function.
    Select(Vec<TermId>),

    // -------- arithmetic --------
    /// Integer numeral.
    IntConst(BigInt),
    /// N-ary sum.
    Add(Vec<TermId>),
    /// Difference.
    Sub(TermId, TermId),
    /// Product.
    Mul(TermId, TermId),
    /// Integer `<=`.
    Le(TermId, TermId),
    /// Integer `<`.
    Lt(TermId, TermId),

    // -------- characters and bit-vectors --------
    /// Character constant in `[0, MAX_CHAR]`.
    CharConst(u32),
    /// Character `<=`.
    CharLe(TermId, TermId),
    /// Bit-vector numeral.
    BvConst(BigInt, u32),
    /// Signed bit-vector `<`.
    BvSlt(TermId, TermId),
    /// Two's-complement negation.
    BvNeg(TermId),
    /// Unsigned bit-vector to integer.
    BvToInt(TermId),

    // -------- sequences --------
    /// Empty sequence of a non-string sequence sort.
    SeqEmpty(SortId),
    /// Singleton sequence.
    SeqUnit(TermId),
    /// String literal (`Seq(Char)`); the empty literal doubles as the
    /// empty string.
    Str(ZString),
    /// Binary concatenation.
    SeqConcat(TermId, TermId),
    /// Sequence length.
    SeqLen(TermId),
    /// `extract(seq, offset, len)`.
    SeqExtract(TermId, TermId, TermId),
    /// `at(seq, i)`: length-one sequence or empty when out of range.
    SeqAt(TermId, TermId),
    /// Generic element access.
    SeqNth(TermId, TermId),
    /// In-bounds element access.
    SeqNthI(TermId, TermId),
    /// Out-of-bounds (uninterpreted) element access.
    SeqNthU(TermId, TermId),
    /// `indexof(seq, sub, start)`.
    SeqIndexOf(TermId, TermId, TermId),
    /// Index of the last occurrence.
    SeqLastIndexOf(TermId, TermId),
    /// Containment predicate.
    SeqContains(TermId, TermId),
    /// `prefixof(a, b)`: a is a prefix of b.
    SeqPrefixOf(TermId, TermId),
    /// `suffixof(a, b)`: a is a suffix of b.
    SeqSuffixOf(TermId, TermId),
    /// Replace first occurrence.
    SeqReplace(TermId, TermId, TermId),
    /// Replace all occurrences.
    SeqReplaceAll(TermId, TermId, TermId),
    /// `map(f, seq)`.
    SeqMap(TermId, TermId),
    /// `mapi(f, i0, seq)`.
    SeqMapi(TermId, TermId, TermId),
    /// `foldl(f, acc, seq)`.
    SeqFoldl(TermId, TermId, TermId),
    /// `foldli(f, i0, acc, seq)`.
    SeqFoldli(TermId, TermId, TermId, TermId),

    // -------- string conversions and orders --------
    /// Integer to decimal string.
    StrItos(TermId),
    /// Decimal string to integer (`-1` on malformed input).
    StrStoi(TermId),
    /// Unsigned bit-vector to decimal string.
    StrFromUbv(TermId),
    /// Signed bit-vector to decimal string.
    StrFromSbv(TermId),
    /// Code point of a length-one string, `-1` otherwise.
    StrToCode(TermId),
    /// Length-one string from a code point, `""` out of range.
    StrFromCode(TermId),
    /// Digit test on a length-one string.
    StrIsDigit(TermId),
    /// Strict lexicographic order.
    StrLt(TermId, TermId),
    /// Lexicographic order.
    StrLe(TermId, TermId),
    /// Regex membership.
    StrInRe(TermId, TermId),

    // -------- regexes --------
    /// Language `{s}` for the sequence `s`.
    ToRe(TermId),
    /// Empty language, of the given regex sort.
    ReEmpty(SortId),
    /// All sequences, of the given regex sort.
    ReFull(SortId),
    /// All length-one sequences, of the given regex sort.
    ReAllChar(SortId),
    /// Character range over length-one sequence bounds.
    ReRange(TermId, TermId),
    /// Union.
    ReUnion(TermId, TermId),
    /// Intersection.
    ReInter(TermId, TermId),
    /// Difference.
    ReDiff(TermId, TermId),
    /// Concatenation.
    ReConcat(TermId, TermId),
    /// Complement.
    ReComplement(TermId),
    /// Kleene star.
    ReStar(TermId),
    /// One or more repetitions.
    RePlus(TermId),
    /// Zero or one repetition.
    ReOpt(TermId),
    /// Bounded repetition; `hi = None` means "at least `lo`".
    ReLoop(TermId, u32, Option<u32>),
    /// Exactly-n repetition.
    RePower(TermId, u32),
    /// Language of reversed words.
    ReReverse(TermId),
    /// Language of length-one sequences whose element satisfies the
    /// function value.
    ReOfPred(TermId),
    /// Unevaluated symbolic derivative.
    ReDerivative(TermId, TermId),
    /// Internal: Antimirov union, only inside derivative normal form.
    ReAntimirovUnion(TermId, TermId),
}

/// A term: structure plus sort, with a cached depth for throttling.
#[derive(Debug, Clone)]
pub struct Term {
    /// Structure.
    pub kind: TermKind,
    /// Sort.
    pub sort: SortId,
    /// Height of the term DAG seen as a tree, leaves have depth 1.
    pub depth: u32,
}

/// Hash-consing term factory.
#[derive(Debug)]
pub struct TermManager {
    terms: Vec<Term>,
    dedup: FxHashMap<TermKind, TermId>,
    names: Rodeo,
    /// Sort table.
    pub sorts: SortTable,
}

impl Default for TermManager {
    fn default() -> Self {
        Self::new()
    }
}

impl TermManager {
    /// Create an empty manager.
    pub fn new() -> Self {
        TermManager {
            terms: Vec::new(),
            dedup: FxHashMap::default(),
            names: Rodeo::default(),
            sorts: SortTable::new(),
        }
    }

    /// Number of interned terms.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// True iff no terms have been interned.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// The term behind an id.
    pub fn get(&self, t: TermId) -> &Term {
        &self.terms[t.0 as usize]
    }

    /// Structure of a term.
    pub fn kind(&self, t: TermId) -> &TermKind {
        &self.get(t).kind
    }

    /// Sort of a term.
    pub fn sort(&self, t: TermId) -> SortId {
        self.get(t).sort
    }

    /// Tree depth of a term.
    pub fn depth(&self, t: TermId) -> u32 {
        self.get(t).depth
    }

    /// Resolve an interned name.
    pub fn name(&self, s: Spur) -> &str {
        self.names.resolve(&s)
    }

    fn intern(&mut self, kind: TermKind, sort: SortId) -> TermId {
        if let Some(&id) = self.dedup.get(&kind) {
            return id;
        }
        let depth = 1 + self.children_of(&kind).iter().map(|&c| self.get(c).depth).max().unwrap_or(0);
        let id = TermId(self.terms.len() as u32);
        self.terms.push(Term { kind: kind.clone(), sort, depth });
        self.dedup.insert(kind, id);
        id
    }

    /// Immediate children of a kind, in order.
    fn children_of(&self, kind: &TermKind) -> Vec<TermId> {
        use TermKind::*;
        match kind {
            True | False | Var(..) | IntConst(_) | CharConst(_) | BvConst(..) | SeqEmpty(_)
            | Str(_) | ReEmpty(_) | ReFull(_) | ReAllChar(_) => Vec::new(),
            Not(a) | SeqUnit(a) | SeqLen(a) | StrItos(a) | StrStoi(a) | StrFromUbv(a)
            | StrFromSbv(a) | StrToCode(a) | StrFromCode(a) | StrIsDigit(a) | ToRe(a)
            | ReComplement(a) | ReStar(a) | RePlus(a) | ReOpt(a) | ReReverse(a) | ReOfPred(a)
            | ReLoop(a, _, _) | RePower(a, _) | BvNeg(a) | BvToInt(a) => vec![*a],
            Eq(a, b) | Le(a, b) | Lt(a, b) | Sub(a, b) | Mul(a, b) | CharLe(a, b)
            | BvSlt(a, b) | SeqConcat(a, b) | SeqAt(a, b) | SeqNth(a, b) | SeqNthI(a, b)
            | SeqNthU(a, b) | SeqLastIndexOf(a, b) | SeqContains(a, b) | SeqPrefixOf(a, b)
            | SeqSuffixOf(a, b) | SeqMap(a, b) | StrLt(a, b) | StrLe(a, b) | StrInRe(a, b)
            | ReRange(a, b) | ReUnion(a, b) | ReInter(a, b) | ReDiff(a, b) | ReConcat(a, b)
            | ReDerivative(a, b) | ReAntimirovUnion(a, b) => vec![*a, *b],
            Ite(a, b, c) | SeqExtract(a, b, c) | SeqIndexOf(a, b, c) | SeqReplace(a, b, c)
            | SeqReplaceAll(a, b, c) | SeqMapi(a, b, c) | SeqFoldl(a, b, c) => vec![*a, *b, *c],
            SeqFoldli(a, b, c, d) => vec![*a, *b, *c, *d],
            And(xs) | Or(xs) | Add(xs) | Select(xs) => xs.clone(),
        }
    }

    /// Children of a term.
    pub fn children(&self, t: TermId) -> Vec<TermId> {
        let kind = self.kind(t).clone();
        self.children_of(&kind)
    }

    // ------------------------------------------------------------------
    // Booleans
    // ------------------------------------------------------------------

    /// Boolean constant.
    pub fn mk_bool(&mut self, b: bool) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(if b { TermKind::True } else { TermKind::False }, sort)
    }

    /// `true`.
    pub fn mk_true(&mut self) -> TermId {
        self.mk_bool(true)
    }

    /// `false`.
    pub fn mk_false(&mut self) -> TermId {
        self.mk_bool(false)
    }

    /// True iff `t` is the constant `true`.
    pub fn is_true(&self, t: TermId) -> bool {
        matches!(self.kind(t), TermKind::True)
    }

    /// True iff `t` is the constant `false`.
    pub fn is_false(&self, t: TermId) -> bool {
        matches!(self.kind(t), TermKind::False)
    }

    /// Constant truth value of a term, if any.
    pub fn bool_value(&self, t: TermId) -> Option<bool> {
        match self.kind(t) {
            TermKind::True => Some(true),
            TermKind::False => Some(false),
            _ => None,
        }
    }

    /// Named variable.
    pub fn mk_var(&mut self, name: &str, sort: SortId) -> TermId {
        let spur = self.names.get_or_intern(name);
        self.intern(TermKind::Var(spur, sort), sort)
    }

    /// The designated element variable of a sort, used when a derivative is
    /// taken with respect to "some element".
    pub fn element_var(&mut self, sort: SortId) -> TermId {
        self.mk_var(":elem", sort)
    }

    /// True iff `t` is the designated element variable of its sort.
    pub fn is_element_var(&self, t: TermId) -> bool {
        match self.kind(t) {
            TermKind::Var(name, _) => self.name(*name) == ":elem",
            _ => false,
        }
    }

    /// Negation with folding.
    pub fn mk_not(&mut self, t: TermId) -> TermId {
        match self.kind(t) {
            TermKind::True => self.mk_false(),
            TermKind::False => self.mk_true(),
            TermKind::Not(inner) => *inner,
            _ => {
                let sort = self.sorts.bool_sort;
                self.intern(TermKind::Not(t), sort)
            }
        }
    }

    /// Strip a negation; `None` if `t` is not a negation.
    pub fn as_not(&self, t: TermId) -> Option<TermId> {
        match self.kind(t) {
            TermKind::Not(a) => Some(*a),
            _ => None,
        }
    }

    /// Conjunction with folding: units dropped, annihilator, duplicate and
    /// complementary-literal detection.
    pub fn mk_and(&mut self, args: Vec<TermId>) -> TermId {
        let mut flat = Vec::with_capacity(args.len());
        let mut seen = FxHashSet::default();
        for a in args {
            match self.kind(a) {
                TermKind::True => continue,
                TermKind::False => return self.mk_false(),
                TermKind::And(xs) => {
                    for &x in xs.clone().iter() {
                        if self.is_false(x) {
                            return self.mk_false();
                        }
                        if !self.is_true(x) && seen.insert(x) {
                            flat.push(x);
                        }
                    }
                }
                _ => {
                    if seen.insert(a) {
                        flat.push(a);
                    }
                }
            }
        }
        for &a in &flat {
            if let Some(n) = self.as_not(a) {
                if seen.contains(&n) {
                    return self.mk_false();
                }
            }
        }
        match flat.len() {
            0 => self.mk_true(),
            1 => flat[0],
            _ => {
                let sort = self.sorts.bool_sort;
                self.intern(TermKind::And(flat), sort)
            }
        }
    }

    /// Binary conjunction.
    pub fn mk_and2(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_and(vec![a, b])
    }

    /// Disjunction with folding, dual to [`TermManager::mk_and`].
    pub fn mk_or(&mut self, args: Vec<TermId>) -> TermId {
        let mut flat = Vec::with_capacity(args.len());
        let mut seen = FxHashSet::default();
        for a in args {
            match self.kind(a) {
                TermKind::False => continue,
                TermKind::True => return self.mk_true(),
                TermKind::Or(xs) => {
                    for &x in xs.clone().iter() {
                        if self.is_true(x) {
                            return self.mk_true();
                        }
                        if !self.is_false(x) && seen.insert(x) {
                            flat.push(x);
                        }
                    }
                }
                _ => {
                    if seen.insert(a) {
                        flat.push(a);
                    }
                }
            }
        }
        for &a in &flat {
            if let Some(n) = self.as_not(a) {
                if seen.contains(&n) {
                    return self.mk_true();
                }
            }
        }
        match flat.len() {
            0 => self.mk_false(),
            1 => flat[0],
            _ => {
                let sort = self.sorts.bool_sort;
                self.intern(TermKind::Or(flat), sort)
            }
        }
    }

    /// Binary disjunction.
    pub fn mk_or2(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_or(vec![a, b])
    }

    /// Equality with folding and canonical argument order.
    pub fn mk_eq(&mut self, a: TermId, b: TermId) -> TermId {
        if a == b {
            return self.mk_true();
        }
        if self.are_distinct(a, b) {
            return self.mk_false();
        }
        let (a, b) = if a.raw() <= b.raw() { (a, b) } else { (b, a) };
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Eq(a, b), sort)
    }

    /// If-then-else with folding: constant or negated conditions, equal
    /// branches.
    pub fn mk_ite(&mut self, c: TermId, t: TermId, e: TermId) -> TermId {
        if self.is_true(c) {
            return t;
        }
        if self.is_false(c) {
            return e;
        }
        if t == e {
            return t;
        }
        if let Some(nc) = self.as_not(c) {
            return self.mk_ite(nc, e, t);
        }
        let sort = self.sort(t);
        self.intern(TermKind::Ite(c, t, e), sort)
    }

    /// Function-value application; `args[0]` is the function value.
    pub fn mk_select(&mut self, args: Vec<TermId>) -> TermId {
        debug_assert!(!args.is_empty());
        let sort = self
            .sorts
            .array_range(self.sort(args[0]))
            .unwrap_or(self.sorts.bool_sort);
        self.intern(TermKind::Select(args), sort)
    }

    // ------------------------------------------------------------------
    // Arithmetic
    // ------------------------------------------------------------------

    /// Integer numeral.
    pub fn mk_int(&mut self, n: BigInt) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::IntConst(n), sort)
    }

    /// Integer numeral from a machine integer.
    pub fn mk_int_i64(&mut self, n: i64) -> TermId {
        self.mk_int(BigInt::from(n))
    }

    /// Integer numeral from a machine size.
    pub fn mk_int_usize(&mut self, n: usize) -> TermId {
        self.mk_int(BigInt::from(n))
    }

    /// Numeral value of a term, if any.
    pub fn int_value(&self, t: TermId) -> Option<&BigInt> {
        match self.kind(t) {
            TermKind::IntConst(n) => Some(n),
            _ => None,
        }
    }

    /// Sum with numeral folding; numerals coalesce at the end.
    pub fn mk_add(&mut self, args: Vec<TermId>) -> TermId {
        let mut flat: Vec<TermId> = Vec::with_capacity(args.len());
        let mut acc = BigInt::from(0);
        for a in args {
            match self.kind(a) {
                TermKind::IntConst(n) => acc += n,
                TermKind::Add(xs) => {
                    for &x in xs.clone().iter() {
                        match self.kind(x) {
                            TermKind::IntConst(n) => acc += n,
                            _ => flat.push(x),
                        }
                    }
                }
                _ => flat.push(a),
            }
        }
        if flat.is_empty() {
            return self.mk_int(acc);
        }
        if !acc.is_zero() {
            let c = self.mk_int(acc);
            flat.push(c);
        }
        match flat.len() {
            1 => flat[0],
            _ => {
                let sort = self.sorts.int_sort;
                self.intern(TermKind::Add(flat), sort)
            }
        }
    }

    /// Binary sum.
    pub fn mk_add2(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_add(vec![a, b])
    }

    /// Difference with numeral folding.
    pub fn mk_sub(&mut self, a: TermId, b: TermId) -> TermId {
        if let (Some(x), Some(y)) = (self.int_value(a), self.int_value(b)) {
            let n = x - y;
            return self.mk_int(n);
        }
        if matches!(self.kind(b), TermKind::IntConst(n) if n.is_zero()) {
            return a;
        }
        let sort = self.sorts.int_sort;
        self.intern(TermKind::Sub(a, b), sort)
    }

    /// Product with numeral folding.
    pub fn mk_mul(&mut self, a: TermId, b: TermId) -> TermId {
        if let (Some(x), Some(y)) = (self.int_value(a), self.int_value(b)) {
            let n = x * y;
            return self.mk_int(n);
        }
        let sort = self.sorts.int_sort;
        self.intern(TermKind::Mul(a, b), sort)
    }

    /// Integer `<=` with numeral folding.
    pub fn mk_le(&mut self, a: TermId, b: TermId) -> TermId {
        if let (Some(x), Some(y)) = (self.int_value(a), self.int_value(b)) {
            let v = x <= y;
            return self.mk_bool(v);
        }
        if a == b {
            return self.mk_true();
        }
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Le(a, b), sort)
    }

    /// Integer `<` with numeral folding.
    pub fn mk_lt(&mut self, a: TermId, b: TermId) -> TermId {
        if let (Some(x), Some(y)) = (self.int_value(a), self.int_value(b)) {
            let v = x < y;
            return self.mk_bool(v);
        }
        if a == b {
            return self.mk_false();
        }
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::Lt(a, b), sort)
    }

    /// Integer `>=`.
    pub fn mk_ge(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_le(b, a)
    }

    /// Integer `>`.
    pub fn mk_gt(&mut self, a: TermId, b: TermId) -> TermId {
        self.mk_lt(b, a)
    }

    // ------------------------------------------------------------------
    // Characters and bit-vectors
    // ------------------------------------------------------------------

    /// Character constant.
    pub fn mk_char(&mut self, ch: u32) -> TermId {
        debug_assert!(ch <= MAX_CHAR);
        let sort = self.sorts.char_sort;
        self.intern(TermKind::CharConst(ch), sort)
    }

    /// Constant character value of a term, if any.
    pub fn char_value(&self, t: TermId) -> Option<u32> {
        match self.kind(t) {
            TermKind::CharConst(c) => Some(*c),
            _ => None,
        }
    }

    /// Character `<=` with constant folding.
    pub fn mk_char_le(&mut self, a: TermId, b: TermId) -> TermId {
        if let (Some(x), Some(y)) = (self.char_value(a), self.char_value(b)) {
            return self.mk_bool(x <= y);
        }
        if a == b {
            return self.mk_true();
        }
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::CharLe(a, b), sort)
    }

    /// Bit-vector numeral, value reduced modulo `2^width`.
    pub fn mk_bv(&mut self, value: BigInt, width: u32) -> TermId {
        let modulus = BigInt::from(1) << width;
        let mut v = value % &modulus;
        if v.is_negative() {
            v += &modulus;
        }
        let sort = self.sorts.mk_bitvec(width);
        self.intern(TermKind::BvConst(v, width), sort)
    }

    /// Bit-vector numeral value and width, if constant.
    pub fn bv_value(&self, t: TermId) -> Option<(&BigInt, u32)> {
        match self.kind(t) {
            TermKind::BvConst(v, w) => Some((v, *w)),
            _ => None,
        }
    }

    /// Signed bit-vector `<`.
    pub fn mk_bv_slt(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::BvSlt(a, b), sort)
    }

    /// Two's-complement negation.
    pub fn mk_bv_neg(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::BvNeg(a), sort)
    }

    /// Unsigned bit-vector to integer.
    pub fn mk_bv2int(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::BvToInt(a), sort)
    }

    // ------------------------------------------------------------------
    // Sequences
    // ------------------------------------------------------------------

    /// String literal.
    pub fn mk_str(&mut self, s: ZString) -> TermId {
        let sort = self.sorts.string_sort;
        self.intern(TermKind::Str(s), sort)
    }

    /// String literal from a Rust string.
    pub fn mk_str_s(&mut self, s: &str) -> TermId {
        self.mk_str(ZString::from(s))
    }

    /// Literal string value of a term, if any.
    pub fn str_value(&self, t: TermId) -> Option<&ZString> {
        match self.kind(t) {
            TermKind::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Empty sequence of the given sequence sort; for strings this is the
    /// empty literal.
    pub fn mk_seq_empty(&mut self, seq_sort: SortId) -> TermId {
        debug_assert!(self.sorts.is_seq(seq_sort));
        if seq_sort == self.sorts.string_sort {
            return self.mk_str(ZString::empty());
        }
        self.intern(TermKind::SeqEmpty(seq_sort), seq_sort)
    }

    /// True iff `t` is the empty sequence.
    pub fn is_seq_empty(&self, t: TermId) -> bool {
        match self.kind(t) {
            TermKind::SeqEmpty(_) => true,
            TermKind::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Singleton sequence.
    pub fn mk_seq_unit(&mut self, e: TermId) -> TermId {
        let elem = self.sort(e);
        let sort = self.sorts.mk_seq(elem);
        self.intern(TermKind::SeqUnit(e), sort)
    }

    /// Payload of a unit sequence, if any.
    pub fn as_seq_unit(&self, t: TermId) -> Option<TermId> {
        match self.kind(t) {
            TermKind::SeqUnit(e) => Some(*e),
            _ => None,
        }
    }

    /// Structural concatenation.
    pub fn mk_seq_concat(&mut self, a: TermId, b: TermId) -> TermId {
        debug_assert_eq!(self.sort(a), self.sort(b));
        let sort = self.sort(a);
        self.intern(TermKind::SeqConcat(a, b), sort)
    }

    /// Right-associated concatenation of a list of atoms.
    pub fn mk_concat_list(&mut self, es: &[TermId], seq_sort: SortId) -> TermId {
        match es.len() {
            0 => self.mk_seq_empty(seq_sort),
            1 => es[0],
            _ => {
                let mut result = es[es.len() - 1];
                for &e in es[..es.len() - 1].iter().rev() {
                    result = self.mk_seq_concat(e, result);
                }
                result
            }
        }
    }

    /// Sequence length.
    pub fn mk_seq_len(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::SeqLen(a), sort)
    }

    /// `a = ""` as a formula.
    pub fn mk_seq_is_empty(&mut self, a: TermId) -> TermId {
        let empty = self.mk_seq_empty(self.sort(a));
        self.mk_eq(a, empty)
    }

    /// `extract(a, offset, len)`.
    pub fn mk_seq_extract(&mut self, a: TermId, b: TermId, c: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::SeqExtract(a, b, c), sort)
    }

    /// `at(a, i)`.
    pub fn mk_seq_at(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::SeqAt(a, b), sort)
    }

    /// Generic element access.
    pub fn mk_seq_nth(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.seq_elem(self.sort(a)).unwrap_or_else(|| self.sort(a));
        self.intern(TermKind::SeqNth(a, b), sort)
    }

    /// In-bounds element access.
    pub fn mk_seq_nth_i(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.seq_elem(self.sort(a)).unwrap_or_else(|| self.sort(a));
        self.intern(TermKind::SeqNthI(a, b), sort)
    }

    /// Out-of-bounds element access.
    pub fn mk_seq_nth_u(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.seq_elem(self.sort(a)).unwrap_or_else(|| self.sort(a));
        self.intern(TermKind::SeqNthU(a, b), sort)
    }

    /// `indexof(a, b, start)`.
    pub fn mk_seq_indexof(&mut self, a: TermId, b: TermId, c: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::SeqIndexOf(a, b, c), sort)
    }

    /// Index of the last occurrence of `b` in `a`.
    pub fn mk_seq_last_indexof(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::SeqLastIndexOf(a, b), sort)
    }

    /// Containment predicate.
    pub fn mk_seq_contains(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::SeqContains(a, b), sort)
    }

    /// Prefix predicate.
    pub fn mk_seq_prefixof(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::SeqPrefixOf(a, b), sort)
    }

    /// Suffix predicate.
    pub fn mk_seq_suffixof(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::SeqSuffixOf(a, b), sort)
    }

    /// Replace first occurrence.
    pub fn mk_seq_replace(&mut self, a: TermId, b: TermId, c: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::SeqReplace(a, b, c), sort)
    }

    /// Replace all occurrences.
    pub fn mk_seq_replace_all(&mut self, a: TermId, b: TermId, c: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::SeqReplaceAll(a, b, c), sort)
    }

    /// `map(f, s)`.
    pub fn mk_seq_map(&mut self, f: TermId, s: TermId) -> TermId {
        let range = self.sorts.array_range(self.sort(f)).unwrap_or_else(|| self.sort(s));
        let sort = self.sorts.mk_seq(range);
        self.intern(TermKind::SeqMap(f, s), sort)
    }

    /// `mapi(f, i0, s)`.
    pub fn mk_seq_mapi(&mut self, f: TermId, i: TermId, s: TermId) -> TermId {
        let range = self.sorts.array_range(self.sort(f)).unwrap_or_else(|| self.sort(s));
        let sort = self.sorts.mk_seq(range);
        self.intern(TermKind::SeqMapi(f, i, s), sort)
    }

    /// `foldl(f, acc, s)`.
    pub fn mk_seq_foldl(&mut self, f: TermId, b: TermId, s: TermId) -> TermId {
        let sort = self.sort(b);
        self.intern(TermKind::SeqFoldl(f, b, s), sort)
    }

    /// `foldli(f, i0, acc, s)`.
    pub fn mk_seq_foldli(&mut self, f: TermId, i: TermId, b: TermId, s: TermId) -> TermId {
        let sort = self.sort(b);
        self.intern(TermKind::SeqFoldli(f, i, b, s), sort)
    }

    /// Integer to decimal string.
    pub fn mk_str_itos(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.string_sort;
        self.intern(TermKind::StrItos(a), sort)
    }

    /// Decimal string to integer.
    pub fn mk_str_stoi(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::StrStoi(a), sort)
    }

    /// Unsigned bit-vector to decimal string.
    pub fn mk_str_from_ubv(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.string_sort;
        self.intern(TermKind::StrFromUbv(a), sort)
    }

    /// Signed bit-vector to decimal string.
    pub fn mk_str_from_sbv(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.string_sort;
        self.intern(TermKind::StrFromSbv(a), sort)
    }

    /// Code point of a length-one string.
    pub fn mk_str_to_code(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.int_sort;
        self.intern(TermKind::StrToCode(a), sort)
    }

    /// Length-one string from a code point.
    pub fn mk_str_from_code(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.string_sort;
        self.intern(TermKind::StrFromCode(a), sort)
    }

    /// Digit test.
    pub fn mk_str_is_digit(&mut self, a: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrIsDigit(a), sort)
    }

    /// Strict lexicographic order.
    pub fn mk_str_lt(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrLt(a, b), sort)
    }

    /// Lexicographic order.
    pub fn mk_str_le(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrLe(a, b), sort)
    }

    /// Regex membership.
    pub fn mk_str_in_re(&mut self, a: TermId, r: TermId) -> TermId {
        let sort = self.sorts.bool_sort;
        self.intern(TermKind::StrInRe(a, r), sort)
    }

    // ------------------------------------------------------------------
    // Regexes
    // ------------------------------------------------------------------

    /// Regex sort over the sort of sequence `s`.
    pub fn re_sort_of_seq(&mut self, s: TermId) -> SortId {
        let seq = self.sort(s);
        self.sorts.mk_re(seq)
    }

    /// Language `{s}`.
    pub fn mk_to_re(&mut self, s: TermId) -> TermId {
        let sort = self.re_sort_of_seq(s);
        self.intern(TermKind::ToRe(s), sort)
    }

    /// Empty language of a regex sort.
    pub fn mk_re_empty(&mut self, re_sort: SortId) -> TermId {
        debug_assert!(self.sorts.is_re(re_sort));
        self.intern(TermKind::ReEmpty(re_sort), re_sort)
    }

    /// All sequences of a regex sort.
    pub fn mk_re_full(&mut self, re_sort: SortId) -> TermId {
        debug_assert!(self.sorts.is_re(re_sort));
        self.intern(TermKind::ReFull(re_sort), re_sort)
    }

    /// All length-one sequences of a regex sort.
    pub fn mk_re_allchar(&mut self, re_sort: SortId) -> TermId {
        debug_assert!(self.sorts.is_re(re_sort));
        self.intern(TermKind::ReAllChar(re_sort), re_sort)
    }

    /// `to_re("")` of the given sequence sort.
    pub fn mk_re_epsilon(&mut self, seq_sort: SortId) -> TermId {
        let e = self.mk_seq_empty(seq_sort);
        self.mk_to_re(e)
    }

    /// True iff `t` is `to_re("")`.
    pub fn is_re_epsilon(&self, t: TermId) -> bool {
        match self.kind(t) {
            TermKind::ToRe(s) => self.is_seq_empty(*s),
            _ => false,
        }
    }

    /// True iff `t` is `Σ+`, the language of non-empty sequences.
    pub fn is_re_dot_plus(&self, t: TermId) -> bool {
        match self.kind(t) {
            TermKind::RePlus(r) => matches!(self.kind(*r), TermKind::ReAllChar(_)),
            TermKind::ReConcat(a, b) => {
                (matches!(self.kind(*a), TermKind::ReAllChar(_))
                    && matches!(self.kind(*b), TermKind::ReFull(_)))
                    || (matches!(self.kind(*a), TermKind::ReFull(_))
                        && matches!(self.kind(*b), TermKind::ReAllChar(_)))
            }
            _ => false,
        }
    }

    /// Character range.
    pub fn mk_re_range(&mut self, lo: TermId, hi: TermId) -> TermId {
        let sort = self.re_sort_of_seq(lo);
        self.intern(TermKind::ReRange(lo, hi), sort)
    }

    /// Union.
    pub fn mk_re_union(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReUnion(a, b), sort)
    }

    /// Intersection.
    pub fn mk_re_inter(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReInter(a, b), sort)
    }

    /// Difference.
    pub fn mk_re_diff(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReDiff(a, b), sort)
    }

    /// Concatenation.
    pub fn mk_re_concat(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReConcat(a, b), sort)
    }

    /// Complement.
    pub fn mk_re_complement(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReComplement(a), sort)
    }

    /// Kleene star.
    pub fn mk_re_star(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReStar(a), sort)
    }

    /// One-or-more repetition.
    pub fn mk_re_plus(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::RePlus(a), sort)
    }

    /// Zero-or-one repetition.
    pub fn mk_re_opt(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReOpt(a), sort)
    }

    /// Bounded repetition.
    pub fn mk_re_loop(&mut self, a: TermId, lo: u32, hi: Option<u32>) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReLoop(a, lo, hi), sort)
    }

    /// Exactly-n repetition.
    pub fn mk_re_power(&mut self, a: TermId, n: u32) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::RePower(a, n), sort)
    }

    /// Reversal.
    pub fn mk_re_reverse(&mut self, a: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReReverse(a), sort)
    }

    /// Language of length-one sequences satisfying a predicate value.
    pub fn mk_re_of_pred(&mut self, p: TermId, re_sort: SortId) -> TermId {
        debug_assert!(self.sorts.is_re(re_sort));
        self.intern(TermKind::ReOfPred(p), re_sort)
    }

    /// Unevaluated symbolic derivative.
    pub fn mk_re_derivative(&mut self, e: TermId, r: TermId) -> TermId {
        let sort = self.sort(r);
        self.intern(TermKind::ReDerivative(e, r), sort)
    }

    /// Internal Antimirov union node.
    pub fn mk_re_antimirov_union(&mut self, a: TermId, b: TermId) -> TermId {
        let sort = self.sort(a);
        self.intern(TermKind::ReAntimirovUnion(a, b), sort)
    }

    // ------------------------------------------------------------------
    // Value reasoning
    // ------------------------------------------------------------------

    /// True iff `t` is an interpreted constant (recursively for sequences).
    pub fn is_value(&self, t: TermId) -> bool {
        match self.kind(t) {
            TermKind::True
            | TermKind::False
            | TermKind::IntConst(_)
            | TermKind::CharConst(_)
            | TermKind::BvConst(..)
            | TermKind::SeqEmpty(_)
            | TermKind::Str(_) => true,
            TermKind::SeqUnit(e) => self.is_value(*e),
            TermKind::SeqConcat(a, b) => self.is_value(*a) && self.is_value(*b),
            _ => false,
        }
    }

    /// Code points of a ground character-sequence value, if `t` is one.
    fn seq_value(&self, t: TermId) -> Option<Vec<u32>> {
        match self.kind(t) {
            TermKind::Str(s) => Some(s.code_points().to_vec()),
            TermKind::SeqEmpty(_) => Some(Vec::new()),
            TermKind::SeqUnit(e) => self.char_value(*e).map(|c| vec![c]),
            TermKind::SeqConcat(a, b) => {
                let mut v = self.seq_value(*a)?;
                v.extend(self.seq_value(*b)?);
                Some(v)
            }
            _ => None,
        }
    }

    /// True iff `a` and `b` denote provably different values.
    pub fn are_distinct(&self, a: TermId, b: TermId) -> bool {
        if a == b {
            return false;
        }
        match (self.kind(a), self.kind(b)) {
            (TermKind::True, TermKind::False) | (TermKind::False, TermKind::True) => true,
            (TermKind::IntConst(x), TermKind::IntConst(y)) => x != y,
            (TermKind::CharConst(x), TermKind::CharConst(y)) => x != y,
            (TermKind::BvConst(x, wx), TermKind::BvConst(y, wy)) => wx == wy && x != y,
            _ => match (self.seq_value(a), self.seq_value(b)) {
                (Some(x), Some(y)) => x != y,
                _ => false,
            },
        }
    }

    /// True iff `a` and `b` are the same term or the same value.
    pub fn are_equal(&self, a: TermId, b: TermId) -> bool {
        if a == b {
            return true;
        }
        match (self.seq_value(a), self.seq_value(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// True iff no variable or unevaluated derivative occurs in `t`.
    pub fn is_ground(&self, t: TermId) -> bool {
        let mut todo = vec![t];
        let mut seen = FxHashSet::default();
        while let Some(x) = todo.pop() {
            if !seen.insert(x) {
                continue;
            }
            match self.kind(x) {
                TermKind::Var(..) | TermKind::ReDerivative(..) | TermKind::Select(_) => {
                    return false
                }
                _ => todo.extend(self.children(x)),
            }
        }
        true
    }

    /// True iff `t` is a variable.
    pub fn is_var(&self, t: TermId) -> bool {
        matches!(self.kind(t), TermKind::Var(..))
    }

    // ------------------------------------------------------------------
    // Flattening and substitution
    // ------------------------------------------------------------------

    /// Flatten a concatenation tree into its atoms, left to right.
    pub fn get_concat(&self, t: TermId, out: &mut Vec<TermId>) {
        match self.kind(t) {
            TermKind::SeqConcat(a, b) => {
                let (a, b) = (*a, *b);
                self.get_concat(a, out);
                self.get_concat(b, out);
            }
            _ => out.push(t),
        }
    }

    /// Flatten a concatenation into atoms, expanding string literals into
    /// character units and dropping empty atoms.
    pub fn get_concat_units(&mut self, t: TermId, out: &mut Vec<TermId>) {
        let mut atoms = Vec::new();
        self.get_concat(t, &mut atoms);
        for a in atoms {
            match self.kind(a).clone() {
                TermKind::Str(s) => {
                    for &c in s.code_points() {
                        let ch = self.mk_char(c);
                        let u = self.mk_seq_unit(ch);
                        out.push(u);
                    }
                }
                TermKind::SeqEmpty(_) => {}
                _ => out.push(a),
            }
        }
    }

    /// Flatten a conjunction tree into its conjuncts.
    pub fn flatten_and(&self, t: TermId, out: &mut Vec<TermId>) {
        match self.kind(t) {
            TermKind::And(xs) => {
                for &x in xs.clone().iter() {
                    self.flatten_and(x, out);
                }
            }
            _ => out.push(t),
        }
    }

    /// Replace every occurrence of `from` by `to` in `t`, rebuilding with
    /// the folding constructors.
    pub fn substitute(&mut self, t: TermId, from: TermId, to: TermId) -> TermId {
        if t == from {
            return to;
        }
        let kind = self.kind(t).clone();
        use TermKind::*;
        match kind {
            Not(a) => {
                let a = self.substitute(a, from, to);
                self.mk_not(a)
            }
            And(xs) => {
                let ys = xs.iter().map(|&x| self.substitute(x, from, to)).collect();
                self.mk_and(ys)
            }
            Or(xs) => {
                let ys = xs.iter().map(|&x| self.substitute(x, from, to)).collect();
                self.mk_or(ys)
            }
            Eq(a, b) => {
                let a = self.substitute(a, from, to);
                let b = self.substitute(b, from, to);
                self.mk_eq(a, b)
            }
            Ite(c, x, y) => {
                let c = self.substitute(c, from, to);
                let x = self.substitute(x, from, to);
                let y = self.substitute(y, from, to);
                self.mk_ite(c, x, y)
            }
            CharLe(a, b) => {
                let a = self.substitute(a, from, to);
                let b = self.substitute(b, from, to);
                self.mk_char_le(a, b)
            }
            Le(a, b) => {
                let a = self.substitute(a, from, to);
                let b = self.substitute(b, from, to);
                self.mk_le(a, b)
            }
            Lt(a, b) => {
                let a = self.substitute(a, from, to);
                let b = self.substitute(b, from, to);
                self.mk_lt(a, b)
            }
            SeqLen(a) => {
                let a = self.substitute(a, from, to);
                self.mk_seq_len(a)
            }
            SeqNthI(a, b) => {
                let a = self.substitute(a, from, to);
                let b = self.substitute(b, from, to);
                self.mk_seq_nth_i(a, b)
            }
            Select(xs) => {
                let ys = xs.iter().map(|&x| self.substitute(x, from, to)).collect();
                self.mk_select(ys)
            }
            // Other kinds do not occur inside derivative path conditions.
            _ => t,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_is_stable() {
        let mut tm = TermManager::new();
        let a = tm.mk_int_i64(42);
        let b = tm.mk_int_i64(42);
        assert_eq!(a, b);
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let y = tm.mk_var("x", tm.sorts.int_sort);
        assert_eq!(x, y);
    }

    #[test]
    fn test_bool_folding() {
        let mut tm = TermManager::new();
        let t = tm.mk_true();
        let f = tm.mk_false();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        assert_eq!(tm.mk_and(vec![p, t]), p);
        assert_eq!(tm.mk_and(vec![p, f]), f);
        assert_eq!(tm.mk_or(vec![p, f]), p);
        assert_eq!(tm.mk_or(vec![p, t]), t);
        let np = tm.mk_not(p);
        assert_eq!(tm.mk_not(np), p);
        assert_eq!(tm.mk_and(vec![p, np]), f);
        assert_eq!(tm.mk_or(vec![p, np]), t);
    }

    #[test]
    fn test_ite_folding() {
        let mut tm = TermManager::new();
        let p = tm.mk_var("p", tm.sorts.bool_sort);
        let a = tm.mk_int_i64(1);
        let b = tm.mk_int_i64(2);
        let t = tm.mk_true();
        assert_eq!(tm.mk_ite(t, a, b), a);
        assert_eq!(tm.mk_ite(p, a, a), a);
        let np = tm.mk_not(p);
        assert_eq!(tm.mk_ite(np, a, b), tm.mk_ite(p, b, a));
    }

    #[test]
    fn test_arith_folding() {
        let mut tm = TermManager::new();
        let two = tm.mk_int_i64(2);
        let three = tm.mk_int_i64(3);
        let five = tm.mk_int_i64(5);
        assert_eq!(tm.mk_add(vec![two, three]), five);
        assert_eq!(tm.mk_le(two, three), tm.mk_true());
        assert_eq!(tm.mk_lt(three, two), tm.mk_false());
        let x = tm.mk_var("x", tm.sorts.int_sort);
        let zero = tm.mk_int_i64(0);
        assert_eq!(tm.mk_add(vec![x, zero]), x);
        assert_eq!(tm.mk_sub(x, zero), x);
    }

    #[test]
    fn test_distinct_values() {
        let mut tm = TermManager::new();
        let a = tm.mk_str_s("ab");
        let b = tm.mk_str_s("cd");
        assert!(tm.are_distinct(a, b));
        let c1 = tm.mk_char('a' as u32);
        let u = tm.mk_seq_unit(c1);
        let sa = tm.mk_str_s("a");
        assert!(tm.are_equal(u, sa));
        assert!(!tm.are_distinct(u, sa));
    }

    #[test]
    fn test_empty_string_is_empty_seq() {
        let mut tm = TermManager::new();
        let e = tm.mk_seq_empty(tm.sorts.string_sort);
        let s = tm.mk_str_s("");
        assert_eq!(e, s);
        assert!(tm.is_seq_empty(e));
    }

    #[test]
    fn test_concat_flatten() {
        let mut tm = TermManager::new();
        let x = tm.mk_var("x", tm.sorts.string_sort);
        let a = tm.mk_str_s("ab");
        let c1 = tm.mk_seq_concat(a, x);
        let c2 = tm.mk_seq_concat(c1, a);
        let mut atoms = Vec::new();
        tm.get_concat(c2, &mut atoms);
        assert_eq!(atoms, vec![a, x, a]);
        let mut units = Vec::new();
        tm.get_concat_units(c2, &mut units);
        assert_eq!(units.len(), 5);
    }
}
