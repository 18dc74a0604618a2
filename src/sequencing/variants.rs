//! Key-shift expansion: every track becomes `2k + 1` variant nodes, one per
//! shift in `-k..=k`, behind a single anchor node at index 0.

use std::collections::BTreeMap;

use crate::types::{HarmonicKey, Track};

pub const ANCHOR: usize = 0;

/// Six fifths either way reach every wheel position; larger shifts only
/// revisit those keys at a higher penalty.
pub const MAX_USEFUL_SHIFT: i32 = 6;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("max shift must be non-negative, got {0}")]
    NegativeShift(i32),
    #[error("max shift {0} exceeds 6; larger shifts repeat wheel positions")]
    ShiftTooLarge(i32),
    #[error("catalog contains no tracks")]
    EmptyCatalog,
    #[error("track id {0} appears more than once in the catalog")]
    DuplicateTrackId(u32),
}

/// A track played transposed by `shift` fifths.
#[derive(Debug, Clone)]
pub struct Variant {
    pub track: Track,
    pub shift: i32,
    pub shifted_key: HarmonicKey,
}

#[derive(Debug, Clone)]
pub enum Node {
    Anchor,
    Variant(Variant),
}

impl Node {
    pub fn variant(&self) -> Option<&Variant> {
        match self {
            Self::Anchor => None,
            Self::Variant(variant) => Some(variant),
        }
    }

    /// Shift of a variant; the anchor counts as unshifted.
    pub fn shift(&self) -> i32 {
        self.variant().map_or(0, |v| v.shift)
    }
}

/// Node indices that belong to one track, or the anchor alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub track_id: Option<u32>,
    pub nodes: Vec<usize>,
}

#[derive(Debug, Clone)]
pub struct VariantSet {
    nodes: Vec<Node>,
    clusters: Vec<Cluster>,
    cluster_of: Vec<usize>,
    by_track_id: BTreeMap<u32, usize>,
}

impl VariantSet {
    /// Expand `tracks` into shift variants. Track order is preserved, so the
    /// variants of track `t` occupy a contiguous index range.
    pub fn expand(tracks: &[Track], max_shift: i32) -> Result<Self, ModelError> {
        if max_shift < 0 {
            return Err(ModelError::NegativeShift(max_shift));
        }
        if max_shift > MAX_USEFUL_SHIFT {
            return Err(ModelError::ShiftTooLarge(max_shift));
        }
        if tracks.is_empty() {
            return Err(ModelError::EmptyCatalog);
        }
        let per_track = (2 * max_shift + 1) as usize;
        let mut nodes = Vec::with_capacity(1 + tracks.len() * per_track);
        let mut clusters = Vec::with_capacity(tracks.len() + 1);
        let mut cluster_of = Vec::with_capacity(nodes.capacity());
        let mut by_track_id = BTreeMap::new();

        nodes.push(Node::Anchor);
        clusters.push(Cluster {
            track_id: None,
            nodes: vec![ANCHOR],
        });
        cluster_of.push(0);

        for track in tracks {
            let cluster_index = clusters.len();
            let mut members = Vec::with_capacity(per_track);
            for shift in -max_shift..=max_shift {
                members.push(nodes.len());
                cluster_of.push(cluster_index);
                nodes.push(Node::Variant(Variant {
                    track: track.clone(),
                    shift,
                    shifted_key: track.key.shifted(shift),
                }));
            }
            if by_track_id.insert(track.id, cluster_index).is_some() {
                return Err(ModelError::DuplicateTrackId(track.id));
            }
            clusters.push(Cluster {
                track_id: Some(track.id),
                nodes: members,
            });
        }

        tracing::debug!(
            tracks = tracks.len(),
            max_shift,
            nodes = nodes.len(),
            "expanded key-shift variants"
        );

        Ok(Self {
            nodes,
            clusters,
            cluster_of,
            by_track_id,
        })
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> &Node {
        &self.nodes[index]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn track_count(&self) -> usize {
        self.clusters.len() - 1
    }

    /// All clusters, anchor first.
    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn cluster_index_of(&self, node: usize) -> usize {
        self.cluster_of[node]
    }

    pub fn same_cluster(&self, a: usize, b: usize) -> bool {
        self.cluster_of[a] == self.cluster_of[b]
    }

    #[cfg(test)]
    pub fn cluster_for_track(&self, track_id: u32) -> Option<&Cluster> {
        self.by_track_id
            .get(&track_id)
            .map(|&index| &self.clusters[index])
    }
}
