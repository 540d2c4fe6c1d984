use ndarray::{ArrayView1, ArrayView2};
use std::collections::BTreeSet;

use crate::error::VizError;

/// Projected points gathered for a list of clusters, grouped in request order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterSelection {
    points: Vec<(f64, f64)>,
    labels: Vec<i64>,
}

impl ClusterSelection {
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    pub fn labels(&self) -> &[i64] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Labels present in the selection, ascending. One palette color each.
    pub fn distinct_labels(&self) -> Vec<i64> {
        self.labels
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn palette_size(&self) -> usize {
        self.distinct_labels().len()
    }

    pub fn iter(&self) -> impl Iterator<Item = ((f64, f64), i64)> + '_ {
        self.points.iter().copied().zip(self.labels.iter().copied())
    }
}

/// Gather the rows of `projection` whose label is in `clusters`.
///
/// Rows are concatenated cluster by cluster in the order requested, keeping
/// their original relative order within a cluster. A requested label that
/// never occurs contributes nothing.
pub fn select_clusters(
    projection: ArrayView2<f64>,
    labels: ArrayView1<i64>,
    clusters: &[i64],
) -> Result<ClusterSelection, VizError> {
    if projection.nrows() != labels.len() {
        return Err(VizError::shape(
            "projection rows vs labels",
            labels.len(),
            projection.nrows(),
        ));
    }
    if projection.ncols() < 2 {
        return Err(VizError::shape("projection columns", 2, projection.ncols()));
    }

    let mut selection = ClusterSelection::default();
    for &cluster in clusters {
        let before = selection.len();
        for (row, &label) in projection.rows().into_iter().zip(labels.iter()) {
            if label == cluster {
                selection.points.push((row[0], row[1]));
                selection.labels.push(label);
            }
        }
        let found = selection.len() - before;
        if found == 0 {
            log::warn!("⚠️  Cluster {} has no points in the label array", cluster);
        } else {
            log::debug!("cluster {}: {} points", cluster, found);
        }
    }
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    fn fixture() -> (Array2<f64>, ndarray::Array1<i64>) {
        let projection = array![
            [0.0, 0.0],
            [1.0, 1.0],
            [2.0, 2.0],
            [3.0, 3.0],
            [4.0, 4.0],
            [5.0, 5.0],
        ];
        (projection, array![1i64, 1, 2, 3, 3, 3])
    }

    #[test]
    fn selects_requested_clusters_in_request_order() {
        let (projection, labels) = fixture();
        let selection = select_clusters(projection.view(), labels.view(), &[1, 3]).unwrap();

        assert_eq!(selection.len(), 5);
        assert_eq!(selection.labels(), &[1, 1, 3, 3, 3]);
        assert_eq!(
            selection.points(),
            &[(0.0, 0.0), (1.0, 1.0), (3.0, 3.0), (4.0, 4.0), (5.0, 5.0)]
        );
        assert_eq!(selection.palette_size(), 2);
    }

    #[test]
    fn request_order_is_not_sorted() {
        let (projection, labels) = fixture();
        let selection = select_clusters(projection.view(), labels.view(), &[3, 1]).unwrap();

        assert_eq!(selection.labels(), &[3, 3, 3, 1, 1]);
        assert_eq!(selection.distinct_labels(), vec![1, 3]);
    }

    #[test]
    fn absent_cluster_contributes_nothing() {
        let (projection, labels) = fixture();
        let selection = select_clusters(projection.view(), labels.view(), &[99]).unwrap();
        assert!(selection.is_empty());
        assert_eq!(selection.palette_size(), 0);

        let mixed = select_clusters(projection.view(), labels.view(), &[99, 2]).unwrap();
        assert_eq!(mixed.labels(), &[2]);
    }

    #[test]
    fn misaligned_arrays_are_rejected() {
        let (projection, _) = fixture();
        let labels = array![1i64, 2, 3];
        let result = select_clusters(projection.view(), labels.view(), &[1]);
        assert!(matches!(
            result,
            Err(VizError::ShapeMismatch {
                expected: 3,
                found: 6,
                ..
            })
        ));
    }
}
