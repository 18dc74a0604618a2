use super::cost;
use super::variants::VariantSet;

/// Stored on the diagonal. Self-loops are never usable edges.
pub const FORBIDDEN: u64 = 10_000_000_000;

/// Dense, asymmetric `N x N` cost matrix over all variant nodes.
#[derive(Debug, Clone)]
pub struct DistanceMatrix {
    size: usize,
    costs: Vec<u64>,
}

impl DistanceMatrix {
    pub fn build(variants: &VariantSet) -> Self {
        let nodes = variants.nodes();
        let size = nodes.len();
        let mut costs = vec![FORBIDDEN; size * size];
        for (i, from) in nodes.iter().enumerate() {
            for (j, to) in nodes.iter().enumerate() {
                if i != j {
                    costs[i * size + j] = cost::cost(from, to);
                }
            }
        }
        tracing::debug!(size, "built distance matrix");
        Self { size, costs }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, from: usize, to: usize) -> u64 {
        self.costs[from * self.size + to]
    }

    pub fn is_forbidden(&self, from: usize, to: usize) -> bool {
        from == to
    }

    /// Every usable ordered pair with its cost, row-major.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, u64)> + '_ {
        (0..self.size)
            .flat_map(move |i| (0..self.size).map(move |j| (i, j)))
            .filter(|&(i, j)| !self.is_forbidden(i, j))
            .map(|(i, j)| (i, j, self.get(i, j)))
    }

    /// Sum of transition costs along `order`, closing back to its start.
    pub fn cycle_cost(&self, order: &[usize]) -> u64 {
        order
            .iter()
            .zip(order.iter().cycle().skip(1))
            .map(|(&from, &to)| self.get(from, to))
            .sum()
    }
}
