//! Reference matching oracle based on plain backtracking.
//!
//! - Substructure search enumerates every embedding of the query into the
//!   target (a monomorphism: query bonds must exist in the target, extra
//!   target bonds are allowed). Embeddings onto the same target atom set are
//!   collapsed into one.
//! - MCS search finds the largest *connected induced* common subgraph. Each
//!   query atom in turn is used as a seed; seed `i` never uses query atoms
//!   below `i`, so every common subgraph is discovered from exactly one seed.
//!   Growth then walks the query frontier, either mapping the next frontier
//!   atom or excluding it, pruned by a per-element upper bound.
//!
//! Only `bond_sensitive` is honoured. The remaining filter flags are accepted
//! and ignored. Both searches carry a step budget and return the best result
//! found so far when it runs out.

use std::collections::{HashMap, HashSet, VecDeque};

#[cfg(feature = "rayon")]
use rayon::prelude::*;
use smsd_common::{Atom, AtomIdx, Bond, ChemFilters, Molecule};
use tracing::{debug, warn};

use crate::{AtomMapping, MatchSet, MatchingOracle, OracleError, OracleMatch};

const DEFAULT_MATCH_LIMIT: usize = 64;
const DEFAULT_STEP_LIMIT: u64 = 2_000_000;

/// Backtracking implementation of [`MatchingOracle`].
#[derive(Clone, Debug)]
pub struct BacktrackOracle {
    /// Maximum number of mappings reported per call.
    match_limit: usize,
    /// Maximum number of search nodes expanded per search (per seed for MCS).
    step_limit: u64,
}

impl Default for BacktrackOracle {
    fn default() -> Self {
        Self {
            match_limit: DEFAULT_MATCH_LIMIT,
            step_limit: DEFAULT_STEP_LIMIT,
        }
    }
}

impl BacktrackOracle {
    /// Oracle with the default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Caps the number of mappings returned per call (at least one).
    #[must_use]
    pub fn with_match_limit(mut self, limit: usize) -> Self {
        self.match_limit = limit.max(1);
        self
    }

    /// Caps the number of search nodes expanded.
    #[must_use]
    pub const fn with_step_limit(mut self, steps: u64) -> Self {
        self.step_limit = steps;
        self
    }
}

impl MatchingOracle for BacktrackOracle {
    fn find_all_mcs_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        if query.is_empty() || target.is_empty() {
            return Ok(MatchSet::empty());
        }
        let pair = Pair {
            query,
            target,
            filters,
        };

        let seeds: Vec<AtomIdx> = query.atom_indices().collect();
        let search =
            |seed: AtomIdx| McsSearch::from_seed(pair, seed, self.match_limit, self.step_limit);

        // Inside a pool worker a nested parallel wait may steal unrelated
        // jobs of that pool, so seeds only fan out from outside one.
        #[cfg(feature = "rayon")]
        let outcomes: Vec<SeedOutcome> = if rayon::current_thread_index().is_none() {
            seeds.into_par_iter().map(search).collect()
        } else {
            seeds.into_iter().map(search).collect()
        };

        #[cfg(not(feature = "rayon"))]
        let outcomes: Vec<SeedOutcome> = seeds.into_iter().map(search).collect();

        let best = outcomes.iter().map(|o| o.best).max().unwrap_or(0);
        if outcomes.iter().any(|o| o.exhausted) {
            warn!(
                "MCS step budget exhausted ({} steps per seed); reporting best size found: {}",
                self.step_limit, best
            );
        }
        if best == 0 {
            return Ok(MatchSet::empty());
        }

        let mut seen: HashSet<(Vec<usize>, Vec<usize>)> = HashSet::new();
        let mappings: Vec<AtomMapping> = outcomes
            .into_iter()
            .filter(|o| o.best == best)
            .flat_map(|o| o.found)
            .filter(|m| seen.insert(full_signature(m)))
            .take(self.match_limit)
            .collect();

        debug!(
            "MCS of {} x {} atoms: size {}, {} distinct mappings",
            query.atom_count(),
            target.atom_count(),
            best,
            mappings.len()
        );
        Ok(scored(mappings, query, target, best))
    }

    fn find_all_substructure_matches(
        &self,
        query: &Molecule,
        target: &Molecule,
        filters: &ChemFilters,
    ) -> Result<MatchSet, OracleError> {
        if query.is_empty() || query.atom_count() > target.atom_count() {
            return Ok(MatchSet::empty());
        }
        let pair = Pair {
            query,
            target,
            filters,
        };

        let mut embedder = Embedder::new(pair, self.match_limit, self.step_limit);
        embedder.extend(0);
        if embedder.steps >= self.step_limit {
            warn!(
                "substructure step budget exhausted ({} steps); {} embeddings kept",
                self.step_limit,
                embedder.found.len()
            );
        }

        let mappings = embedder.found;
        debug!(
            "substructure search of {} in {} atoms: {} distinct embeddings",
            query.atom_count(),
            target.atom_count(),
            mappings.len()
        );
        let common = if mappings.is_empty() {
            0
        } else {
            query.atom_count()
        };
        Ok(scored(mappings, query, target, common))
    }
}

/// Attaches fragment sizes and atom-count similarity metrics.
fn scored(
    mappings: Vec<AtomMapping>,
    query: &Molecule,
    target: &Molecule,
    common: usize,
) -> MatchSet {
    let union = query.atom_count() + target.atom_count() - common;
    let tanimoto_similarity = (union > 0).then(|| common as f64 / union as f64);
    let euclidean_distance = Some(((union - common) as f64).sqrt());

    MatchSet {
        matches: mappings
            .into_iter()
            .map(|mapping| OracleMatch {
                fragment_size: Some(mapping.len()),
                stereo_score: None,
                mapping,
            })
            .collect(),
        stereo_mismatch: false,
        tanimoto_similarity,
        euclidean_distance,
    }
}

fn full_signature(mapping: &AtomMapping) -> (Vec<usize>, Vec<usize>) {
    let mut query: Vec<usize> = mapping.query_atoms().map(AtomIdx::as_usize).collect();
    query.sort_unstable();
    (query, mapping.signature())
}

fn atoms_compatible(q: &Atom, t: &Atom, filters: &ChemFilters) -> bool {
    q.symbol() == t.symbol() && (!filters.bond_sensitive || q.is_aromatic() == t.is_aromatic())
}

fn bonds_compatible(q: &Bond, t: &Bond, filters: &ChemFilters) -> bool {
    !filters.bond_sensitive || q.order() == t.order()
}

/// The two molecules of one oracle call.
#[derive(Clone, Copy)]
struct Pair<'a> {
    query: &'a Molecule,
    target: &'a Molecule,
    filters: &'a ChemFilters,
}

impl Pair<'_> {
    fn atom_ok(&self, q: AtomIdx, t: AtomIdx) -> bool {
        match (self.query.atom(q), self.target.atom(t)) {
            (Some(qa), Some(ta)) => atoms_compatible(qa, ta, self.filters),
            _ => false,
        }
    }
}

/// Query atoms in breadth-first order, component by component.
fn connected_order(mol: &Molecule) -> Vec<AtomIdx> {
    let mut seen = vec![false; mol.atom_count()];
    let mut order = Vec::with_capacity(mol.atom_count());

    for start in mol.atom_indices() {
        if seen[start.as_usize()] {
            continue;
        }
        seen[start.as_usize()] = true;
        let mut queue = VecDeque::from([start]);
        while let Some(atom) = queue.pop_front() {
            order.push(atom);
            for n in mol.neighbors(atom) {
                if !seen[n.as_usize()] {
                    seen[n.as_usize()] = true;
                    queue.push_back(n);
                }
            }
        }
    }
    order
}

// ##########################
// Substructure
// ##########################

struct Embedder<'a> {
    pair: Pair<'a>,
    order: Vec<AtomIdx>,
    q_to_t: Vec<Option<AtomIdx>>,
    t_used: Vec<bool>,
    seen: HashSet<Vec<usize>>,
    found: Vec<AtomMapping>,
    limit: usize,
    steps: u64,
    step_limit: u64,
}

impl<'a> Embedder<'a> {
    fn new(pair: Pair<'a>, limit: usize, step_limit: u64) -> Self {
        Self {
            order: connected_order(pair.query),
            q_to_t: vec![None; pair.query.atom_count()],
            t_used: vec![false; pair.target.atom_count()],
            seen: HashSet::new(),
            found: Vec::new(),
            pair,
            limit,
            steps: 0,
            step_limit,
        }
    }

    fn extend(&mut self, depth: usize) {
        if self.found.len() >= self.limit || self.steps >= self.step_limit {
            return;
        }
        self.steps += 1;

        // Base Case
        let Some(&q) = self.order.get(depth) else {
            self.record();
            return;
        };

        for t in self.candidates(q) {
            if !self.feasible(q, t) {
                continue;
            }
            self.q_to_t[q.as_usize()] = Some(t);
            self.t_used[t.as_usize()] = true;
            self.extend(depth + 1);
            self.q_to_t[q.as_usize()] = None;
            self.t_used[t.as_usize()] = false;
        }
    }

    fn candidates(&self, q: AtomIdx) -> Vec<AtomIdx> {
        let anchor = self
            .pair
            .query
            .neighbors(q)
            .find_map(|n| self.q_to_t[n.as_usize()]);
        match anchor {
            Some(t) => self.pair.target.neighbors(t).collect(),
            None => self.pair.target.atom_indices().collect(),
        }
    }

    fn feasible(&self, q: AtomIdx, t: AtomIdx) -> bool {
        if self.t_used[t.as_usize()] || !self.pair.atom_ok(q, t) {
            return false;
        }
        if self.pair.target.degree(t) < self.pair.query.degree(q) {
            return false;
        }
        self.pair.query.neighbors(q).all(|qn| {
            let Some(tn) = self.q_to_t[qn.as_usize()] else {
                return true;
            };
            match (
                self.pair.query.bond_between(q, qn),
                self.pair.target.bond_between(t, tn),
            ) {
                (Some(qb), Some(tb)) => bonds_compatible(qb, tb, self.pair.filters),
                _ => false,
            }
        })
    }

    fn record(&mut self) {
        let mapping: AtomMapping = self
            .q_to_t
            .iter()
            .enumerate()
            .filter_map(|(q, t)| t.map(|t| (AtomIdx::from(q), t)))
            .collect();
        if self.seen.insert(mapping.signature()) {
            self.found.push(mapping);
        }
    }
}

// ##########################
// Maximum common substructure
// ##########################

struct SeedOutcome {
    best: usize,
    found: Vec<AtomMapping>,
    exhausted: bool,
}

struct McsSearch<'a> {
    pair: Pair<'a>,
    q_to_t: Vec<Option<AtomIdx>>,
    t_to_q: Vec<Option<AtomIdx>>,
    excluded: Vec<bool>,
    mapped: usize,
    best: usize,
    seen: HashSet<(Vec<usize>, Vec<usize>)>,
    found: Vec<AtomMapping>,
    limit: usize,
    steps: u64,
    step_limit: u64,
}

impl<'a> McsSearch<'a> {
    fn from_seed(pair: Pair<'a>, seed: AtomIdx, limit: usize, step_limit: u64) -> SeedOutcome {
        let mut search = Self {
            q_to_t: vec![None; pair.query.atom_count()],
            t_to_q: vec![None; pair.target.atom_count()],
            // lower seeds were already explored
            excluded: (0..pair.query.atom_count())
                .map(|i| i < seed.as_usize())
                .collect(),
            mapped: 0,
            best: 0,
            seen: HashSet::new(),
            found: Vec::new(),
            pair,
            limit,
            steps: 0,
            step_limit,
        };

        for t in pair.target.atom_indices() {
            if search.steps >= search.step_limit {
                break;
            }
            if pair.atom_ok(seed, t) {
                search.assign(seed, t);
                search.grow();
                search.unassign(seed, t);
            }
        }

        SeedOutcome {
            best: search.best,
            exhausted: search.steps >= search.step_limit,
            found: search.found,
        }
    }

    fn assign(&mut self, q: AtomIdx, t: AtomIdx) {
        self.q_to_t[q.as_usize()] = Some(t);
        self.t_to_q[t.as_usize()] = Some(q);
        self.mapped += 1;
    }

    fn unassign(&mut self, q: AtomIdx, t: AtomIdx) {
        self.q_to_t[q.as_usize()] = None;
        self.t_to_q[t.as_usize()] = None;
        self.mapped -= 1;
    }

    fn grow(&mut self) {
        if self.steps >= self.step_limit {
            return;
        }
        self.steps += 1;

        let reachable = self.mapped + self.upper_bound();
        let saturated = self.found.len() >= self.limit;
        if reachable < self.best || (saturated && reachable <= self.best) {
            return;
        }

        // Base Case
        let Some(q) = self.next_frontier() else {
            self.record();
            return;
        };

        for t in self.candidates(q) {
            if self.feasible(q, t) {
                self.assign(q, t);
                self.grow();
                self.unassign(q, t);
            }
        }

        self.excluded[q.as_usize()] = true;
        self.grow();
        self.excluded[q.as_usize()] = false;
    }

    /// Lowest free query atom adjacent to the mapped region.
    fn next_frontier(&self) -> Option<AtomIdx> {
        self.pair.query.atom_indices().find(|&q| {
            self.q_to_t[q.as_usize()].is_none()
                && !self.excluded[q.as_usize()]
                && self
                    .pair
                    .query
                    .neighbors(q)
                    .any(|n| self.q_to_t[n.as_usize()].is_some())
        })
    }

    /// Per element: min(free query atoms, free target atoms).
    fn upper_bound(&self) -> usize {
        let mut counts: HashMap<&str, (usize, usize)> = HashMap::new();
        for (q, atom) in self.pair.query.atoms().iter().enumerate() {
            if self.q_to_t[q].is_none() && !self.excluded[q] {
                counts.entry(atom.symbol()).or_default().0 += 1;
            }
        }
        for (t, atom) in self.pair.target.atoms().iter().enumerate() {
            if self.t_to_q[t].is_none() {
                counts.entry(atom.symbol()).or_default().1 += 1;
            }
        }
        counts.values().map(|(q, t)| (*q).min(*t)).sum()
    }

    fn candidates(&self, q: AtomIdx) -> Vec<AtomIdx> {
        self.pair
            .query
            .neighbors(q)
            .find_map(|n| self.q_to_t[n.as_usize()])
            .map(|anchor| self.pair.target.neighbors(anchor).collect())
            .unwrap_or_default()
    }

    /// Induced consistency against every mapped atom.
    fn feasible(&self, q: AtomIdx, t: AtomIdx) -> bool {
        if self.t_to_q[t.as_usize()].is_some() || !self.pair.atom_ok(q, t) {
            return false;
        }
        self.q_to_t.iter().enumerate().all(|(m, image)| {
            let Some(tm) = *image else {
                return true;
            };
            match (
                self.pair.query.bond_between(q, AtomIdx::from(m)),
                self.pair.target.bond_between(t, tm),
            ) {
                (None, None) => true,
                (Some(qb), Some(tb)) => bonds_compatible(qb, tb, self.pair.filters),
                _ => false,
            }
        })
    }

    fn record(&mut self) {
        if self.mapped > self.best {
            self.best = self.mapped;
            self.found.clear();
            self.seen.clear();
        }
        if self.mapped < self.best || self.found.len() >= self.limit {
            return;
        }
        let mapping: AtomMapping = self
            .q_to_t
            .iter()
            .enumerate()
            .filter_map(|(q, t)| t.map(|t| (AtomIdx::from(q), t)))
            .collect();
        if self.seen.insert(full_signature(&mapping)) {
            self.found.push(mapping);
        }
    }
}

#[cfg(test)]
mod tests {
    use smsd_common::BondOrder;

    use super::*;

    fn chain(symbols: &[&str], order: BondOrder) -> Molecule {
        let mut mol = Molecule::new();
        let atoms: Vec<AtomIdx> = symbols.iter().map(|s| mol.add_atom(Atom::new(*s))).collect();
        for w in atoms.windows(2) {
            mol.add_bond(w[0], w[1], order).unwrap();
        }
        mol
    }

    fn ring(symbols: &[&str]) -> Molecule {
        let mut mol = chain(symbols, BondOrder::Single);
        let last = AtomIdx::from(symbols.len() - 1);
        mol.add_bond(last, AtomIdx::new(0), BondOrder::Single).unwrap();
        mol
    }

    #[test]
    fn test_identical_paths_match_completely() {
        let path = chain(&["C", "C", "C", "C", "C"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_mcs_matches(&path, &path, &ChemFilters::default())
            .unwrap();

        assert!(!result.is_empty());
        assert!(result.matches.iter().all(|m| m.mapping.len() == 5));
        assert_eq!(result.tanimoto_similarity, Some(1.0));
    }

    #[test]
    fn test_mcs_of_ethanol_and_propanol() {
        let ethanol = chain(&["C", "C", "O"], BondOrder::Single);
        let propanol = chain(&["C", "C", "C", "O"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_mcs_matches(&ethanol, &propanol, &ChemFilters::default())
            .unwrap();

        let best = &result.matches[0].mapping;
        assert_eq!(best.len(), 3);
        assert_eq!(best.target_of(AtomIdx::new(2)), Some(AtomIdx::new(3)));
    }

    #[test]
    fn test_mcs_is_connected_and_induced() {
        // A triangle vs. an open path: the induced MCS is an edge pair
        // (three atoms would need the closing bond on both sides).
        let triangle = ring(&["C", "C", "C"]);
        let path = chain(&["C", "C", "C"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_mcs_matches(&triangle, &path, &ChemFilters::default())
            .unwrap();

        assert!(result.matches.iter().all(|m| m.mapping.len() == 2));
    }

    #[test]
    fn test_bond_sensitivity() {
        let single = chain(&["C", "C"], BondOrder::Single);
        let double = chain(&["C", "C"], BondOrder::Double);

        let strict = BacktrackOracle::new()
            .find_all_mcs_matches(&single, &double, &ChemFilters::default())
            .unwrap();
        assert_eq!(strict.matches[0].mapping.len(), 1);

        let lax_filters = ChemFilters {
            bond_sensitive: false,
            ..ChemFilters::default()
        };
        let lax = BacktrackOracle::new()
            .find_all_mcs_matches(&single, &double, &lax_filters)
            .unwrap();
        assert_eq!(lax.matches[0].mapping.len(), 2);
    }

    #[test]
    fn test_no_common_element_gives_no_match() {
        let a = chain(&["C", "C"], BondOrder::Single);
        let b = chain(&["N", "N"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_mcs_matches(&a, &b, &ChemFilters::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_substructure_automorphisms_collapse() {
        let benzene_like = ring(&["C", "C", "C", "C", "C", "C"]);
        let result = BacktrackOracle::new()
            .find_all_substructure_matches(&benzene_like, &benzene_like, &ChemFilters::default())
            .unwrap();
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_substructure_counts_distinct_target_sets() {
        let co = chain(&["C", "O"], BondOrder::Single);
        // O-C-C-O has two distinct C-O bonds
        let glycol = chain(&["O", "C", "C", "O"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_substructure_matches(&co, &glycol, &ChemFilters::default())
            .unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_substructure_larger_query_has_no_match() {
        let small = chain(&["C", "C"], BondOrder::Single);
        let large = chain(&["C", "C", "C"], BondOrder::Single);
        let result = BacktrackOracle::new()
            .find_all_substructure_matches(&large, &small, &ChemFilters::default())
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_match_limit_is_respected() {
        let c = chain(&["C"], BondOrder::Single);
        let hexane = chain(&["C"; 6], BondOrder::Single);
        let result = BacktrackOracle::new()
            .with_match_limit(2)
            .find_all_substructure_matches(&c, &hexane, &ChemFilters::default())
            .unwrap();
        assert_eq!(result.len(), 2);
    }
}
