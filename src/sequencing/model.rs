//! Integer-program formulation of the mix as a Hamiltonian cycle through the
//! anchor, which is a Hamiltonian path over tracks with a free start and end.
//!
//! Variables: one binary `x[i][j]` per ordered pair of distinct nodes (upper
//! bound 0 inside a cluster) and one integer position `u[i]` per node.
//! Constraints: one outgoing and one incoming inter-cluster edge per cluster,
//! per-node flow conservation, and Miller-Tucker-Zemlin subtour elimination
//! over the non-anchor nodes.

use std::collections::HashSet;

use super::graph::DistanceMatrix;
use super::program::{Comparison, IntegerProgram, Sense, VarId};
use super::variants::{ANCHOR, VariantSet};

#[derive(Debug, Clone)]
pub struct PathModel {
    program: IntegerProgram,
    node_count: usize,
    /// `edge_vars[i * node_count + j]` is `x[i][j]`; `None` on the diagonal.
    edge_vars: Vec<Option<VarId>>,
    position_vars: Vec<VarId>,
}

impl PathModel {
    pub fn build(variants: &VariantSet, matrix: &DistanceMatrix) -> Self {
        let n = matrix.size();
        debug_assert_eq!(n, variants.len());
        let tracks = variants.track_count() as f64;
        let mut program = IntegerProgram::new(Sense::Minimize);

        let mut edge_vars = vec![None; n * n];
        for (i, j, cost) in matrix.edges() {
            let upper = i64::from(!variants.same_cluster(i, j));
            edge_vars[i * n + j] = Some(program.add_binary(upper, cost as f64));
        }
        let position_vars: Vec<VarId> = (0..n)
            .map(|_| program.add_integer(0, n as i64 - 1, 0.0))
            .collect();

        let mut model = Self {
            program,
            node_count: n,
            edge_vars,
            position_vars,
        };
        model.add_cluster_degree_constraints(variants);
        model.add_flow_conservation_constraints();
        model.add_subtour_elimination_constraints(tracks);
        let warm_start = model.greedy_assignment(variants, matrix);
        model.program.set_warm_start(warm_start);

        tracing::debug!(
            nodes = n,
            variables = model.program.variables().len(),
            constraints = model.program.constraints().len(),
            "built path model"
        );
        model
    }

    pub fn program(&self) -> &IntegerProgram {
        &self.program
    }

    pub fn edge_var(&self, from: usize, to: usize) -> Option<VarId> {
        self.edge_vars[from * self.node_count + to]
    }

    #[cfg(test)]
    pub fn position_var(&self, node: usize) -> VarId {
        self.position_vars[node]
    }

    fn add_cluster_degree_constraints(&mut self, variants: &VariantSet) {
        let n = self.node_count;
        for cluster in variants.clusters() {
            let name = match cluster.track_id {
                Some(id) => format!("track {id}"),
                None => "anchor".to_string(),
            };
            let members: HashSet<usize> = cluster.nodes.iter().copied().collect();
            let mut outgoing = Vec::new();
            let mut incoming = Vec::new();
            for &member in &cluster.nodes {
                for other in (0..n).filter(|other| !members.contains(other)) {
                    if let Some(var) = self.edge_var(member, other) {
                        outgoing.push((var, 1.0));
                    }
                    if let Some(var) = self.edge_var(other, member) {
                        incoming.push((var, 1.0));
                    }
                }
            }
            self.program.add_constraint(
                format!("{name} out-degree"),
                outgoing,
                Comparison::Equal,
                1.0,
            );
            self.program.add_constraint(
                format!("{name} in-degree"),
                incoming,
                Comparison::Equal,
                1.0,
            );
        }
    }

    fn add_flow_conservation_constraints(&mut self) {
        let n = self.node_count;
        for node in 0..n {
            let mut terms = Vec::with_capacity(2 * (n - 1));
            for other in (0..n).filter(|&other| other != node) {
                if let Some(var) = self.edge_var(node, other) {
                    terms.push((var, 1.0));
                }
                if let Some(var) = self.edge_var(other, node) {
                    terms.push((var, -1.0));
                }
            }
            self.program.add_constraint(
                format!("node {node} flow"),
                terms,
                Comparison::Equal,
                0.0,
            );
        }
    }

    /// `u[i] - u[j] + T * x[i][j] <= T - 1` for all non-anchor `i != j`.
    fn add_subtour_elimination_constraints(&mut self, tracks: f64) {
        let n = self.node_count;
        for i in (0..n).filter(|&i| i != ANCHOR) {
            for j in (0..n).filter(|&j| j != ANCHOR && j != i) {
                let Some(edge) = self.edge_var(i, j) else {
                    continue;
                };
                self.program.add_constraint(
                    format!("subtour {i}->{j}"),
                    vec![
                        (self.position_vars[i], 1.0),
                        (self.position_vars[j], -1.0),
                        (edge, tracks),
                    ],
                    Comparison::LessOrEqual,
                    tracks - 1.0,
                );
            }
        }
    }

    /// Nearest-neighbour tour from the anchor: repeatedly take the cheapest
    /// variant of a track not yet played, lowest node index on ties.
    pub fn greedy_tour(variants: &VariantSet, matrix: &DistanceMatrix) -> Vec<usize> {
        let mut tour = vec![ANCHOR];
        let mut played = vec![false; variants.clusters().len()];
        played[variants.cluster_index_of(ANCHOR)] = true;
        let mut current = ANCHOR;

        while tour.len() <= variants.track_count() {
            let next = (0..variants.len())
                .filter(|&node| !played[variants.cluster_index_of(node)])
                .min_by_key(|&node| (matrix.get(current, node), node));
            let Some(next) = next else {
                break;
            };
            played[variants.cluster_index_of(next)] = true;
            tour.push(next);
            current = next;
        }
        tour
    }

    /// Variable assignment describing the greedy tour.
    fn greedy_assignment(&self, variants: &VariantSet, matrix: &DistanceMatrix) -> Vec<f64> {
        let tour = Self::greedy_tour(variants, matrix);
        self.assignment_for_tour(&tour)
    }

    /// Encode a closed tour starting at the anchor as a full assignment.
    /// Track nodes get positions `0..T` in play order; unused nodes sit at 0.
    pub fn assignment_for_tour(&self, tour: &[usize]) -> Vec<f64> {
        let mut values = vec![0.0; self.program.variables().len()];
        for (&from, &to) in tour.iter().zip(tour.iter().cycle().skip(1)) {
            if let Some(var) = self.edge_var(from, to) {
                values[var.index()] = 1.0;
            }
        }
        for (position, &node) in tour.iter().skip(1).enumerate() {
            values[self.position_vars[node].index()] = position as f64;
        }
        values
    }

    /// Ordered pairs whose edge variable is set in `values`.
    pub fn selected_edges(&self, values: &[f64]) -> Vec<(usize, usize)> {
        let n = self.node_count;
        (0..n)
            .flat_map(|i| (0..n).map(move |j| (i, j)))
            .filter(|&(i, j)| {
                self.edge_var(i, j)
                    .and_then(|var| values.get(var.index()))
                    .is_some_and(|&value| value > 0.5)
            })
            .collect()
    }
}
