//! Rebuild the play order from the solved edge selection.

use std::collections::HashMap;

use super::variants::{ANCHOR, VariantSet};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("node {node} has no outgoing edge")]
    MissingSuccessor { node: usize },
    #[error("node {node} has more than one outgoing edge ({first} and {second})")]
    DuplicateSuccessor {
        node: usize,
        first: usize,
        second: usize,
    },
    #[error("walk from the anchor revisits node {node}")]
    Revisit { node: usize },
    #[error("{count} selected edges are not on the walk through the anchor")]
    UnusedEdges { count: usize },
    #[error("walk covers {visited} of {expected} tracks")]
    TrackCoverage { visited: usize, expected: usize },
}

fn successor_map(edges: &[(usize, usize)]) -> Result<HashMap<usize, usize>, DecodeError> {
    let mut next = HashMap::with_capacity(edges.len());
    for &(from, to) in edges {
        if let Some(&first) = next.get(&from) {
            return Err(DecodeError::DuplicateSuccessor {
                node: from,
                first,
                second: to,
            });
        }
        next.insert(from, to);
    }
    Ok(next)
}

fn walk(edges: &[(usize, usize)], variants: &VariantSet) -> Result<Vec<usize>, DecodeError> {
    let next = successor_map(edges)?;
    let mut order = Vec::with_capacity(variants.track_count());
    let mut cluster_seen = vec![false; variants.clusters().len()];
    cluster_seen[variants.cluster_index_of(ANCHOR)] = true;

    let mut current = ANCHOR;
    loop {
        let &to = next
            .get(&current)
            .ok_or(DecodeError::MissingSuccessor { node: current })?;
        if to == ANCHOR {
            break;
        }
        if to >= variants.len() {
            return Err(DecodeError::MissingSuccessor { node: to });
        }
        let cluster = variants.cluster_index_of(to);
        if cluster_seen[cluster] {
            return Err(DecodeError::Revisit { node: to });
        }
        cluster_seen[cluster] = true;
        order.push(to);
        current = to;
    }

    let used = order.len() + 1;
    if used != edges.len() {
        return Err(DecodeError::UnusedEdges {
            count: edges.len().saturating_sub(used),
        });
    }
    if order.len() != variants.track_count() {
        return Err(DecodeError::TrackCoverage {
            visited: order.len(),
            expected: variants.track_count(),
        });
    }
    Ok(order)
}

/// Follow successors from the anchor until the walk closes, and return the
/// visited variant nodes in play order without the anchor.
///
/// A valid selection is exactly one closed walk through the anchor that
/// touches every track once. Anything else is a broken solver result and is
/// logged with the full edge set.
pub fn decode_path(
    edges: &[(usize, usize)],
    variants: &VariantSet,
) -> Result<Vec<usize>, DecodeError> {
    walk(edges, variants).inspect_err(|err| {
        tracing::error!(error = %err, ?edges, "solved assignment does not decode to a single tour");
    })
}
