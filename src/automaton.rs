//! Symbolic automaton bridge.
//!
//! Translates regex terms into ε-automata whose moves carry symbolic
//! character predicates. The translation is structural and partial:
//! shapes the bridge does not support yield `None`. The rewriter only
//! calls in here when it needs to inspect language structure (sampling,
//! host-triggered containment); nothing in the derivative engine depends
//! on automata.

use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;

use crate::ast::{Lbool, TermId, TermKind, TermManager};
use crate::charpred::{CharAlgebra, CharPred};

/// State identifier.
pub type StateId = u32;

/// A labeled move; `label = None` is an ε move.
#[derive(Debug, Clone)]
pub struct Move {
    /// Source state.
    pub src: StateId,
    /// Destination state.
    pub dst: StateId,
    /// Predicate on the consumed character, or `None` for ε.
    pub label: Option<CharPred>,
}

/// Nondeterministic symbolic automaton with ε moves.
#[derive(Debug, Clone)]
pub struct Automaton {
    init: StateId,
    finals: FxHashSet<StateId>,
    moves: Vec<Move>,
    num_states: StateId,
}

/// State cap for the determinization used by complement.
const MAX_DET_STATES: usize = 64;
/// Cap on distinct outgoing predicates per determinized state.
const MAX_MINTERM_PREDS: usize = 8;

impl Automaton {
    /// Automaton accepting nothing.
    pub fn mk_empty() -> Self {
        Automaton { init: 0, finals: FxHashSet::default(), moves: Vec::new(), num_states: 1 }
    }

    /// Automaton accepting exactly the empty word.
    pub fn mk_epsilon() -> Self {
        let mut finals = FxHashSet::default();
        finals.insert(0);
        Automaton { init: 0, finals, moves: Vec::new(), num_states: 1 }
    }

    /// Automaton accepting exactly the one-character words satisfying `p`.
    pub fn mk_pred(p: CharPred) -> Self {
        let mut finals = FxHashSet::default();
        finals.insert(1);
        Automaton {
            init: 0,
            finals,
            moves: vec![Move { src: 0, dst: 1, label: Some(p) }],
            num_states: 2,
        }
    }

    /// Single state with a self-loop on `p`; with `p` = true this is `Σ*`.
    pub fn mk_loop(p: CharPred) -> Self {
        let mut finals = FxHashSet::default();
        finals.insert(0);
        Automaton {
            init: 0,
            finals,
            moves: vec![Move { src: 0, dst: 0, label: Some(p) }],
            num_states: 1,
        }
    }

    /// Chain automaton for a fixed word of predicates.
    pub fn mk_seq(labels: Vec<CharPred>) -> Self {
        let n = labels.len() as StateId;
        let mut finals = FxHashSet::default();
        finals.insert(n);
        let moves = labels
            .into_iter()
            .enumerate()
            .map(|(k, p)| Move { src: k as StateId, dst: k as StateId + 1, label: Some(p) })
            .collect();
        Automaton { init: 0, finals, moves, num_states: n + 1 }
    }

    /// Initial state.
    pub fn init(&self) -> StateId {
        self.init
    }

    /// Final states.
    pub fn finals(&self) -> &FxHashSet<StateId> {
        &self.finals
    }

    /// All moves.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    /// Number of states.
    pub fn num_states(&self) -> StateId {
        self.num_states
    }

    fn shift(&self, offset: StateId) -> (Vec<Move>, FxHashSet<StateId>, StateId) {
        let moves = self
            .moves
            .iter()
            .map(|m| Move { src: m.src + offset, dst: m.dst + offset, label: m.label.clone() })
            .collect();
        let finals = self.finals.iter().map(|&f| f + offset).collect();
        (moves, finals, self.init + offset)
    }

    /// `L(a) · L(b)`.
    pub fn mk_concat(a: &Automaton, b: &Automaton) -> Automaton {
        let offset = a.num_states;
        let (mut moves, finals, b_init) = b.shift(offset);
        moves.extend(a.moves.iter().cloned());
        for &f in &a.finals {
            moves.push(Move { src: f, dst: b_init, label: None });
        }
        Automaton { init: a.init, finals, moves, num_states: a.num_states + b.num_states }
    }

    /// `L(a) ∪ L(b)`.
    pub fn mk_union(a: &Automaton, b: &Automaton) -> Automaton {
        let (mut moves, finals_a, a_init) = a.shift(1);
        let (moves_b, finals_b, b_init) = b.shift(1 + a.num_states);
        moves.extend(moves_b);
        moves.push(Move { src: 0, dst: a_init, label: None });
        moves.push(Move { src: 0, dst: b_init, label: None });
        let mut finals = finals_a;
        finals.extend(finals_b);
        Automaton { init: 0, finals, moves, num_states: 1 + a.num_states + b.num_states }
    }

    /// `L(a)?`: a fresh accepting initial state with an ε into `a`.
    pub fn mk_opt(a: &Automaton) -> Automaton {
        let (mut moves, mut finals, a_init) = a.shift(1);
        moves.push(Move { src: 0, dst: a_init, label: None });
        finals.insert(0);
        Automaton { init: 0, finals, moves, num_states: 1 + a.num_states }
    }

    /// Add ε moves from every final state back to the initial state
    /// (the `plus` closure).
    pub fn add_final_to_init_moves(&mut self) {
        let init = self.init;
        for &f in self.finals.clone().iter() {
            self.moves.push(Move { src: f, dst: init, label: None });
        }
    }

    /// Make the initial state accepting (completing the `star` closure).
    pub fn add_init_to_final_states(&mut self) {
        self.finals.insert(self.init);
    }

    fn epsilon_closure(&self, states: &FxHashSet<StateId>) -> FxHashSet<StateId> {
        let mut closure = states.clone();
        let mut queue: VecDeque<StateId> = states.iter().copied().collect();
        while let Some(s) = queue.pop_front() {
            for m in &self.moves {
                if m.src == s && m.label.is_none() && closure.insert(m.dst) {
                    queue.push_back(m.dst);
                }
            }
        }
        closure
    }

    /// Product automaton for `L(a) ∩ L(b)`, pruning moves whose conjoined
    /// label is unsatisfiable.
    pub fn mk_product(
        a: &Automaton,
        b: &Automaton,
        tm: &mut TermManager,
        alg: &mut CharAlgebra,
    ) -> Automaton {
        let mut state_of: FxHashMap<(StateId, StateId), StateId> = FxHashMap::default();
        let mut moves = Vec::new();
        let mut finals = FxHashSet::default();
        let mut queue = VecDeque::new();
        let mut next: StateId = 0;
        let mut intern = |p: (StateId, StateId),
                          state_of: &mut FxHashMap<(StateId, StateId), StateId>,
                          queue: &mut VecDeque<(StateId, StateId)>| {
            *state_of.entry(p).or_insert_with(|| {
                let id = next;
                next += 1;
                queue.push_back(p);
                id
            })
        };
        let init = intern((a.init, b.init), &mut state_of, &mut queue);
        while let Some((sa, sb)) = queue.pop_front() {
            let id = state_of[&(sa, sb)];
            let ca = a.epsilon_closure(&FxHashSet::from_iter([sa]));
            let cb = b.epsilon_closure(&FxHashSet::from_iter([sb]));
            if ca.iter().any(|s| a.finals.contains(s)) && cb.iter().any(|s| b.finals.contains(s)) {
                finals.insert(id);
            }
            for ma in a.moves.iter().filter(|m| ca.contains(&m.src)) {
                let Some(pa) = &ma.label else { continue };
                for mb in b.moves.iter().filter(|m| cb.contains(&m.src)) {
                    let Some(pb) = &mb.label else { continue };
                    let p = alg.mk_and(tm, pa, pb);
                    if alg.is_sat(tm, &p) == Lbool::False {
                        continue;
                    }
                    let dst = intern((ma.dst, mb.dst), &mut state_of, &mut queue);
                    moves.push(Move { src: id, dst, label: Some(p) });
                }
            }
        }
        Automaton { init, finals, moves, num_states: next.max(1) }
    }

    /// Complement via bounded minterm determinization; `None` when the
    /// construction would exceed its caps.
    pub fn mk_complement(
        &self,
        tm: &mut TermManager,
        alg: &mut CharAlgebra,
    ) -> Option<Automaton> {
        // Determinize over the minterms of each subset state's outgoing
        // predicates, with an explicit sink for the residual minterm.
        let mut det_of: FxHashMap<Vec<StateId>, StateId> = FxHashMap::default();
        let mut moves = Vec::new();
        let mut accepting_subset = Vec::new();
        let mut queue = VecDeque::new();

        let canon = |set: &FxHashSet<StateId>| {
            let mut v: Vec<StateId> = set.iter().copied().collect();
            v.sort_unstable();
            v
        };
        let init_closure = canon(&self.epsilon_closure(&FxHashSet::from_iter([self.init])));
        det_of.insert(init_closure.clone(), 1);
        queue.push_back(init_closure);
        let sink: StateId = 0;
        let mut next: StateId = 2;

        while let Some(subset) = queue.pop_front() {
            let id = det_of[&subset];
            accepting_subset.push((id, subset.iter().any(|s| self.finals.contains(s))));
            // Outgoing labeled moves from the closure of this subset.
            let closure = self.epsilon_closure(&subset.iter().copied().collect());
            let outgoing: Vec<&Move> = self
                .moves
                .iter()
                .filter(|m| m.label.is_some() && closure.contains(&m.src))
                .collect();
            let mut preds: Vec<CharPred> = Vec::new();
            for m in &outgoing {
                let Some(p) = m.label.clone() else { continue };
                if !preds.contains(&p) {
                    preds.push(p);
                }
            }
            if preds.len() > MAX_MINTERM_PREDS {
                return None;
            }
            for mask in 0u32..(1 << preds.len()) {
                let mut literals = Vec::with_capacity(preds.len());
                for (k, p) in preds.iter().enumerate() {
                    if mask & (1 << k) != 0 {
                        literals.push(p.clone());
                    } else {
                        literals.push(CharPred::negate(p));
                    }
                }
                let minterm = alg.mk_and_all(tm, &literals);
                if alg.is_sat(tm, &minterm) == Lbool::False {
                    continue;
                }
                let mut targets = FxHashSet::default();
                for m in &outgoing {
                    if let Some(p) = &m.label {
                        if let Some(k) = preds.iter().position(|q| q == p) {
                            if mask & (1 << k) != 0 {
                                targets.insert(m.dst);
                            }
                        }
                    }
                }
                if targets.is_empty() {
                    moves.push(Move { src: id, dst: sink, label: Some(minterm) });
                    continue;
                }
                let key = canon(&self.epsilon_closure(&targets));
                let dst = match det_of.get(&key) {
                    Some(&d) => d,
                    None => {
                        if det_of.len() >= MAX_DET_STATES {
                            return None;
                        }
                        let d = next;
                        next += 1;
                        det_of.insert(key.clone(), d);
                        queue.push_back(key);
                        d
                    }
                };
                moves.push(Move { src: id, dst, label: Some(minterm) });
            }
        }
        // Sink loops on everything and is accepting in the complement.
        let everything = alg.mk_true(tm);
        moves.push(Move { src: sink, dst: sink, label: Some(everything) });
        let mut finals = FxHashSet::default();
        finals.insert(sink);
        for (id, acc) in accepting_subset {
            if !acc {
                finals.insert(id);
            }
        }
        Some(Automaton { init: 1, finals, moves, num_states: next })
    }

    /// Run the automaton on a concrete word; `Undef` when a predicate on
    /// the path cannot be decided.
    pub fn accepts(&self, tm: &mut TermManager, alg: &CharAlgebra, word: &[u32]) -> Lbool {
        let mut current = self.epsilon_closure(&FxHashSet::from_iter([self.init]));
        let mut undef = false;
        for &ch in word {
            let mut step = FxHashSet::default();
            for m in &self.moves {
                if !current.contains(&m.src) {
                    continue;
                }
                if let Some(p) = &m.label {
                    match alg.accepts_char(tm, p, ch) {
                        Lbool::True => {
                            step.insert(m.dst);
                        }
                        Lbool::Undef => undef = true,
                        Lbool::False => {}
                    }
                }
            }
            current = self.epsilon_closure(&step);
            if current.is_empty() {
                return if undef { Lbool::Undef } else { Lbool::False };
            }
        }
        if current.iter().any(|s| self.finals.contains(s)) {
            Lbool::True
        } else if undef {
            Lbool::Undef
        } else {
            Lbool::False
        }
    }

    /// If the automaton denotes exactly one word of constant characters,
    /// return that word's elements.
    pub fn as_sequence(&self, tm: &TermManager) -> Option<Vec<TermId>> {
        let mut seq = Vec::new();
        let mut state = self.init;
        let mut visited = FxHashSet::default();
        loop {
            let closure = self.epsilon_closure(&FxHashSet::from_iter([state]));
            let is_final = closure.iter().any(|s| self.finals.contains(s));
            let out: Vec<&Move> = self
                .moves
                .iter()
                .filter(|m| m.label.is_some() && closure.contains(&m.src))
                .collect();
            if is_final {
                return out.is_empty().then_some(seq);
            }
            if out.len() != 1 || !visited.insert(state) {
                return None;
            }
            match out[0].label.as_ref() {
                Some(CharPred::Char(c)) if tm.char_value(*c).is_some() => seq.push(*c),
                _ => return None,
            }
            state = out[0].dst;
        }
    }
}

/// Structural regex-to-automaton translation.
pub fn re_to_automaton(
    tm: &mut TermManager,
    alg: &mut CharAlgebra,
    r: TermId,
) -> Option<Automaton> {
    let kind = tm.kind(r).clone();
    match kind {
        TermKind::ToRe(s) => seq_to_automaton(tm, s),
        TermKind::ReConcat(a, b) => {
            let a = re_to_automaton(tm, alg, a)?;
            let b = re_to_automaton(tm, alg, b)?;
            Some(Automaton::mk_concat(&a, &b))
        }
        TermKind::ReUnion(a, b) => {
            let a = re_to_automaton(tm, alg, a)?;
            let b = re_to_automaton(tm, alg, b)?;
            Some(Automaton::mk_union(&a, &b))
        }
        TermKind::ReStar(a) => {
            let mut a = re_to_automaton(tm, alg, a)?;
            a.add_final_to_init_moves();
            a.add_init_to_final_states();
            Some(a)
        }
        TermKind::RePlus(a) => {
            let mut a = re_to_automaton(tm, alg, a)?;
            a.add_final_to_init_moves();
            Some(a)
        }
        TermKind::ReOpt(a) => {
            let a = re_to_automaton(tm, alg, a)?;
            Some(Automaton::mk_opt(&a))
        }
        TermKind::ReRange(lo, hi) => {
            match (unit_char(tm, lo), unit_char(tm, hi)) {
                (Some(l), Some(h)) => Some(Automaton::mk_pred(CharPred::Range(l, h))),
                // A range with non-unit endpoints denotes the empty language.
                _ => Some(Automaton::mk_empty()),
            }
        }
        TermKind::ReReverse(_) | TermKind::ReDiff(..) => None,
        TermKind::ReComplement(a) => {
            let a = re_to_automaton(tm, alg, a)?;
            a.mk_complement(tm, alg)
        }
        TermKind::ReInter(a, b) => {
            let a = re_to_automaton(tm, alg, a)?;
            let b = re_to_automaton(tm, alg, b)?;
            Some(Automaton::mk_product(&a, &b, tm, alg))
        }
        TermKind::ReLoop(a, lo, hi) => {
            let a = re_to_automaton(tm, alg, a)?;
            let mut b = match hi {
                Some(hi) => {
                    if hi < lo {
                        return Some(Automaton::mk_empty());
                    }
                    let mut acc = Automaton::mk_epsilon();
                    for _ in lo..hi {
                        acc = Automaton::mk_union(
                            &Automaton::mk_epsilon(),
                            &Automaton::mk_concat(&a, &acc),
                        );
                    }
                    acc
                }
                None => {
                    let mut star = a.clone();
                    star.add_final_to_init_moves();
                    star.add_init_to_final_states();
                    star
                }
            };
            for _ in 0..lo {
                b = Automaton::mk_concat(&a, &b);
            }
            Some(b)
        }
        TermKind::RePower(a, n) => {
            let a = re_to_automaton(tm, alg, a)?;
            let mut b = Automaton::mk_epsilon();
            for _ in 0..n {
                b = Automaton::mk_concat(&a, &b);
            }
            Some(b)
        }
        TermKind::ReEmpty(_) => Some(Automaton::mk_empty()),
        TermKind::ReFull(_) => Some(Automaton::mk_loop(alg.mk_true(tm))),
        TermKind::ReAllChar(_) => Some(Automaton::mk_pred(alg.mk_true(tm))),
        TermKind::ReOfPred(p) => {
            let sort = tm.sorts.re_seq(tm.sort(r)).and_then(|s| tm.sorts.seq_elem(s))?;
            Some(Automaton::mk_pred(CharPred::Pred(p, sort)))
        }
        _ => None,
    }
}

fn seq_to_automaton(tm: &mut TermManager, s: TermId) -> Option<Automaton> {
    let kind = tm.kind(s).clone();
    match kind {
        TermKind::SeqConcat(a, b) => {
            let a = seq_to_automaton(tm, a)?;
            let b = seq_to_automaton(tm, b)?;
            Some(Automaton::mk_concat(&a, &b))
        }
        TermKind::SeqUnit(e) => Some(Automaton::mk_pred(CharPred::Char(e))),
        TermKind::SeqEmpty(_) => Some(Automaton::mk_epsilon()),
        TermKind::Str(z) => {
            let labels = z
                .code_points()
                .iter()
                .map(|&c| {
                    let ch = tm.mk_char(c);
                    CharPred::Char(ch)
                })
                .collect();
            Some(Automaton::mk_seq(labels))
        }
        _ => None,
    }
}

fn unit_char(tm: &mut TermManager, e: TermId) -> Option<TermId> {
    match tm.kind(e).clone() {
        TermKind::Str(s) if s.len() == 1 => Some(tm.mk_char(s.at(0))),
        TermKind::SeqUnit(c) => Some(c),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::TermManager;

    fn word(s: &str) -> Vec<u32> {
        s.chars().map(|c| c as u32).collect()
    }

    #[test]
    fn test_literal_automaton() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let s = tm.mk_str_s("ab");
        let r = tm.mk_to_re(s);
        let aut = re_to_automaton(&mut tm, &mut alg, r).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("ab")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("a")), Lbool::False);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("abc")), Lbool::False);
    }

    #[test]
    fn test_star_automaton() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let s = tm.mk_str_s("a");
        let r0 = tm.mk_to_re(s);
        let r = tm.mk_re_star(r0);
        let aut = re_to_automaton(&mut tm, &mut alg, r).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("aaa")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("ab")), Lbool::False);
    }

    #[test]
    fn test_union_and_product() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let sa = tm.mk_str_s("a");
        let sb = tm.mk_str_s("b");
        let ra = tm.mk_to_re(sa);
        let rb = tm.mk_to_re(sb);
        let u = tm.mk_re_union(ra, rb);
        let aut = re_to_automaton(&mut tm, &mut alg, u).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("a")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("b")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("c")), Lbool::False);

        let i = tm.mk_re_inter(u, ra);
        let aut = re_to_automaton(&mut tm, &mut alg, i).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("a")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("b")), Lbool::False);
    }

    #[test]
    fn test_complement_automaton() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let s = tm.mk_str_s("a");
        let r0 = tm.mk_to_re(s);
        let c = tm.mk_re_complement(r0);
        let aut = re_to_automaton(&mut tm, &mut alg, c).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("a")), Lbool::False);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("b")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("aa")), Lbool::True);
    }

    #[test]
    fn test_loop_automaton() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let s = tm.mk_str_s("a");
        let r0 = tm.mk_to_re(s);
        let l = tm.mk_re_loop(r0, 1, Some(2));
        let aut = re_to_automaton(&mut tm, &mut alg, l).unwrap();
        assert_eq!(aut.accepts(&mut tm, &alg, &word("")), Lbool::False);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("a")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("aa")), Lbool::True);
        assert_eq!(aut.accepts(&mut tm, &alg, &word("aaa")), Lbool::False);
    }

    #[test]
    fn test_as_sequence() {
        let mut tm = TermManager::new();
        let mut alg = CharAlgebra::default();
        let s = tm.mk_str_s("ab");
        let r = tm.mk_to_re(s);
        let aut = re_to_automaton(&mut tm, &mut alg, r).unwrap();
        let seq = aut.as_sequence(&tm).unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(tm.char_value(seq[0]), Some('a' as u32));
    }
}
