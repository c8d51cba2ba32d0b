// THEORY:
// The `RegionClusterer` is the spatial grouping layer. It takes the flat list of
// skin-colored windows from the scanner and groups windows that sit close to each
// other into candidate faces.
//
// Algorithm (greedy star clustering):
// 1.  **Seeding**: Regions are visited in scan order. The first region that is not
//     yet part of a cluster becomes the seed of a new cluster.
// 2.  **Absorption**: Every later, still unassigned region whose top-left corner is
//     strictly closer than `threshold` to the *seed's* corner joins the cluster.
// 3.  **No chaining**: Distance is only ever measured against the seed, never
//     against members that joined later. A long diagonal run of skin windows is
//     therefore split into several clusters instead of one. This is weaker than
//     connected-component labelling and is kept that way on purpose, because it
//     decides which faces are reported.
// 4.  **Stateless Utility**: Like the other layers, it remembers nothing between
//     frames. Each region ends up in exactly one cluster and clusters come out in
//     the order their seeds were found.

use crate::core_modules::region::{Cluster, ScoredRegion};

pub mod region_clusterer {
    use super::*;

    /// Groups `regions` around seeds. Regions at a corner distance of exactly
    /// `threshold` from the seed are not absorbed.
    pub fn cluster(regions: &[ScoredRegion], threshold: f64) -> Vec<Cluster> {
        let mut clusters: Vec<Cluster> = Vec::new();
        let mut visited = vec![false; regions.len()];

        for (seed_index, seed) in regions.iter().enumerate() {
            if visited[seed_index] {
                continue;
            }
            visited[seed_index] = true;

            let mut members: Cluster = vec![*seed];
            for candidate_index in seed_index + 1..regions.len() {
                if visited[candidate_index] {
                    continue;
                }
                let candidate = &regions[candidate_index];
                if seed.corner_distance(candidate) < threshold {
                    visited[candidate_index] = true;
                    members.push(*candidate);
                }
            }

            clusters.push(members);
        }

        clusters
    }

    /// Linking distance for a scan grid: `multiplier` window sides.
    pub fn link_threshold(grid_size: u32, multiplier: f64) -> f64 {
        grid_size as f64 * multiplier
    }
}
