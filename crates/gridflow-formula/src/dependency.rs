use std::collections::{HashMap, HashSet, VecDeque};

use gridflow_core::CellCoord;

/// Tracks dependencies between cells for efficient recalculation
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Maps a cell to the cells it depends on (formula inputs)
    /// e.g., if A1 = B1 + C1, then precedents[A1] = {B1, C1}
    precedents: HashMap<CellCoord, HashSet<CellCoord>>,

    /// Maps a cell to the cells that depend on it (reverse lookup)
    /// e.g., if A1 = B1 + C1, then dependents[B1] contains A1
    dependents: HashMap<CellCoord, HashSet<CellCoord>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the incoming edges of `cell` after its formula was (re)evaluated.
    /// Edges recorded for the previous formula are retracted first.
    pub fn set_dependencies(&mut self, cell: CellCoord, deps: HashSet<CellCoord>) {
        if let Some(old_deps) = self.precedents.remove(&cell) {
            for dep in old_deps {
                if let Some(dependents) = self.dependents.get_mut(&dep) {
                    dependents.remove(&cell);
                    if dependents.is_empty() {
                        self.dependents.remove(&dep);
                    }
                }
            }
        }

        for dep in &deps {
            self.dependents.entry(*dep).or_default().insert(cell);
        }

        if !deps.is_empty() {
            self.precedents.insert(cell, deps);
        }
    }

    /// Remove all incoming edges of a cell (it no longer holds a formula)
    pub fn remove_cell(&mut self, cell: CellCoord) {
        self.set_dependencies(cell, HashSet::new());
    }

    /// Cells whose formulas reference `cell`, in row-major order
    pub fn dependents(&self, cell: CellCoord) -> Vec<CellCoord> {
        let mut out: Vec<CellCoord> = self
            .dependents
            .get(&cell)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort_unstable();
        out
    }

    /// Cells referenced by the formula at `cell`
    pub fn precedents(&self, cell: CellCoord) -> Option<&HashSet<CellCoord>> {
        self.precedents.get(&cell)
    }

    /// Every cell transitively dependent on `changed`, in breadth-first order.
    /// `changed` itself is not included unless it sits on a cycle.
    pub fn affected_by(&self, changed: CellCoord) -> Vec<CellCoord> {
        let mut order = Vec::new();
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        queue.extend(self.dependents(changed));

        while let Some(cell) = queue.pop_front() {
            if !visited.insert(cell) {
                continue;
            }
            order.push(cell);
            queue.extend(self.dependents(cell));
        }

        order
    }

    /// Number of precedent -> dependent edges
    pub fn edge_count(&self) -> usize {
        self.precedents.values().map(HashSet::len).sum()
    }

    /// Clear all dependencies
    pub fn clear(&mut self) {
        self.precedents.clear();
        self.dependents.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deps(cells: &[CellCoord]) -> HashSet<CellCoord> {
        cells.iter().copied().collect()
    }

    #[test]
    fn test_basic_dependency() {
        let mut graph = DependencyGraph::new();

        // A1 = B1 + C1
        let a1 = CellCoord::new(0, 0);
        let b1 = CellCoord::new(0, 1);
        let c1 = CellCoord::new(0, 2);

        graph.set_dependencies(a1, deps(&[b1, c1]));

        assert!(graph.precedents(a1).unwrap().contains(&b1));
        assert!(graph.precedents(a1).unwrap().contains(&c1));
        assert_eq!(graph.dependents(b1), vec![a1]);
        assert_eq!(graph.dependents(c1), vec![a1]);
        assert_eq!(graph.edge_count(), 2);
    }

    #[test]
    fn test_stale_edge_is_retracted() {
        let mut graph = DependencyGraph::new();
        let a1 = CellCoord::new(0, 0);
        let b1 = CellCoord::new(0, 1);
        let c1 = CellCoord::new(0, 2);

        // C1 = A1 + B1, then edited to C1 = B1
        graph.set_dependencies(c1, deps(&[a1, b1]));
        graph.set_dependencies(c1, deps(&[b1]));

        assert!(graph.dependents(a1).is_empty());
        assert!(!graph.dependents.contains_key(&a1));
        assert_eq!(graph.dependents(b1), vec![c1]);
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn test_remove_cell() {
        let mut graph = DependencyGraph::new();
        let a1 = CellCoord::new(0, 0);
        let b1 = CellCoord::new(0, 1);

        graph.set_dependencies(b1, deps(&[a1]));
        graph.remove_cell(b1);

        assert!(graph.precedents(b1).is_none());
        assert!(graph.dependents(a1).is_empty());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_affected_by_is_breadth_first() {
        let mut graph = DependencyGraph::new();

        // A1 = 10, B1 = A1 * 2, C1 = B1 + A1, D1 = C1
        let a1 = CellCoord::new(0, 0);
        let b1 = CellCoord::new(0, 1);
        let c1 = CellCoord::new(0, 2);
        let d1 = CellCoord::new(0, 3);

        graph.set_dependencies(b1, deps(&[a1]));
        graph.set_dependencies(c1, deps(&[b1, a1]));
        graph.set_dependencies(d1, deps(&[c1]));

        assert_eq!(graph.affected_by(a1), vec![b1, c1, d1]);
        assert_eq!(graph.affected_by(c1), vec![d1]);
        assert!(graph.affected_by(d1).is_empty());
    }

    #[test]
    fn test_affected_by_terminates_on_cycle() {
        let mut graph = DependencyGraph::new();
        let a1 = CellCoord::new(0, 0);
        let b1 = CellCoord::new(0, 1);

        // A1 = B1, B1 = A1
        graph.set_dependencies(a1, deps(&[b1]));
        graph.set_dependencies(b1, deps(&[a1]));

        let affected = graph.affected_by(a1);
        assert_eq!(affected, vec![b1, a1]);
    }

    #[test]
    fn test_clear() {
        let mut graph = DependencyGraph::new();
        graph.set_dependencies(CellCoord::new(1, 1), deps(&[CellCoord::new(0, 0)]));
        graph.clear();
        assert_eq!(graph.edge_count(), 0);
        assert!(graph.dependents(CellCoord::new(0, 0)).is_empty());
    }
}
