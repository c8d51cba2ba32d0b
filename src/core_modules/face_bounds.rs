// THEORY:
// The aggregator is the last stage of a detection pass. It reduces each cluster
// that is big enough to be believable to one `FaceBox`.
//
// - Clusters with fewer than `min_cluster_size` members are dropped without a
//   trace. A lone skin-colored patch (a hand, a wooden table) rarely produces more
//   than a couple of windows, so this is the main noise filter.
// - The box is the union of the member windows, so it always contains every one
//   of them.
// - Confidence is the plain mean of the member scores. Output order follows the
//   cluster order; nothing is sorted.

use crate::core_modules::region::{Cluster, FaceBox, ScoredRegion};
use log::trace;

/// Turns every qualifying cluster into a `FaceBox`, in cluster order.
pub fn aggregate(clusters: &[Cluster], min_cluster_size: usize) -> Vec<FaceBox> {
    clusters
        .iter()
        .filter(|cluster| {
            let qualifies = cluster.len() >= min_cluster_size;
            if !qualifies {
                trace!(
                    "dropping cluster of {} region(s), need {}",
                    cluster.len(),
                    min_cluster_size
                );
            }
            qualifies
        })
        .filter_map(|cluster| bounding_box(cluster))
        .collect()
}

/// The box enclosing every region of `cluster` and their mean score.
/// `None` for an empty cluster.
pub fn bounding_box(cluster: &[ScoredRegion]) -> Option<FaceBox> {
    if cluster.is_empty() {
        return None;
    }

    let mut min_x = u32::MAX;
    let mut min_y = u32::MAX;
    let mut max_x = 0u32;
    let mut max_y = 0u32;
    let mut total_score = 0.0;

    for region in cluster {
        min_x = min_x.min(region.x);
        min_y = min_y.min(region.y);
        max_x = max_x.max(region.right());
        max_y = max_y.max(region.bottom());
        total_score += region.score;
    }

    Some(FaceBox {
        x: min_x,
        y: min_y,
        width: max_x - min_x,
        height: max_y - min_y,
        confidence: total_score / cluster.len() as f64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_spans_all_members() {
        let cluster = vec![
            ScoredRegion::new(10, 20, 8, 0.4),
            ScoredRegion::new(14, 20, 8, 0.6),
            ScoredRegion::new(10, 24, 8, 0.8),
        ];
        let face = bounding_box(&cluster).expect("non-empty cluster");

        assert_eq!((face.x, face.y, face.width, face.height), (10, 20, 12, 12));
        assert!((face.confidence - 0.6).abs() < 1e-12);
        assert!(cluster.iter().all(|r| face.contains(r)));
        assert!(cluster.iter().all(|r| face.area() >= r.size as u64 * r.size as u64));
    }

    #[test]
    fn small_clusters_are_dropped() {
        let pair = vec![ScoredRegion::new(0, 0, 8, 1.0), ScoredRegion::new(4, 0, 8, 1.0)];
        let triple = vec![
            ScoredRegion::new(40, 40, 8, 1.0),
            ScoredRegion::new(44, 40, 8, 1.0),
            ScoredRegion::new(40, 44, 8, 1.0),
        ];
        let faces = aggregate(&[pair, triple], 3);

        assert_eq!(faces.len(), 1);
        assert_eq!(faces[0].x, 40);
    }

    #[test]
    fn order_follows_clusters() {
        let make = |x: u32, score: f64| -> Cluster { vec![ScoredRegion::new(x, 0, 8, score); 3] };
        let faces = aggregate(&[make(100, 0.4), make(0, 0.9)], 3);

        assert_eq!(faces.iter().map(|f| f.x).collect::<Vec<_>>(), vec![100, 0]);
    }

    #[test]
    fn empty_cluster_has_no_box() {
        assert!(bounding_box(&[]).is_none());
        assert!(aggregate(&[Vec::new()], 0).is_empty());
    }
}
