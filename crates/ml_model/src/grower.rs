//! Leaf-wise growth of a single regression tree from gradient histograms.

use rayon::prelude::*;

use crate::binning::{BinnedMatrix, MISSING_BIN};
use crate::tree::{Node, Tree};

/// Constraints applied while growing one tree.
#[derive(Debug, Clone, Copy)]
pub struct GrowerParams {
    pub num_leaves: usize,
    pub min_samples_leaf: usize,
    pub min_hessian_leaf: f64,
    pub lambda_l2: f64,
    pub min_split_gain: f64,
    pub learning_rate: f64,
}

#[derive(Debug, Clone, Copy, Default)]
struct BinStats {
    grad: f64,
    hess: f64,
    count: usize,
}

impl BinStats {
    fn add(&mut self, grad: f64, hess: f64) {
        self.grad += grad;
        self.hess += hess;
        self.count += 1;
    }

    fn merge(self, other: Self) -> Self {
        Self {
            grad: self.grad + other.grad,
            hess: self.hess + other.hess,
            count: self.count + other.count,
        }
    }

    fn minus(self, other: Self) -> Self {
        Self {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count.saturating_sub(other.count),
        }
    }
}

/// Per-feature gradient histograms of one leaf, indexed like the sampled
/// feature list.
type Histogram = Vec<Vec<BinStats>>;

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    bin: u8,
    default_left: bool,
    gain: f64,
    left: BinStats,
    right: BinStats,
}

struct Leaf {
    node: usize,
    rows: Vec<u32>,
    totals: BinStats,
    histogram: Histogram,
    best: Option<SplitCandidate>,
}

pub struct TreeGrower<'a> {
    binned: &'a BinnedMatrix,
    gradients: &'a [f64],
    hessians: &'a [f64],
    features: &'a [usize],
    params: GrowerParams,
}

impl<'a> TreeGrower<'a> {
    pub const fn new(
        binned: &'a BinnedMatrix,
        gradients: &'a [f64],
        hessians: &'a [f64],
        features: &'a [usize],
        params: GrowerParams,
    ) -> Self {
        Self {
            binned,
            gradients,
            hessians,
            features,
            params,
        }
    }

    fn totals(&self, rows: &[u32]) -> BinStats {
        rows.iter().fold(BinStats::default(), |mut acc, &row| {
            acc.add(self.gradients[row as usize], self.hessians[row as usize]);
            acc
        })
    }

    fn histogram(&self, rows: &[u32]) -> Histogram {
        self.features
            .par_iter()
            .map(|&feature| {
                let bins = self.binned.column(feature);
                let mut stats = vec![BinStats::default(); self.binned.mapper(feature).n_bins()];
                for &row in rows {
                    let row = row as usize;
                    stats[usize::from(bins[row])].add(self.gradients[row], self.hessians[row]);
                }
                stats
            })
            .collect()
    }

    fn leaf_score(&self, stats: BinStats) -> f64 {
        stats.grad * stats.grad / (stats.hess + self.params.lambda_l2)
    }

    fn leaf_value(&self, stats: BinStats) -> f64 {
        let denominator = stats.hess + self.params.lambda_l2;
        if denominator <= 0.0 {
            return 0.0;
        }
        -self.params.learning_rate * stats.grad / denominator
    }

    fn admissible(&self, stats: BinStats) -> bool {
        stats.count >= self.params.min_samples_leaf && stats.hess >= self.params.min_hessian_leaf
    }

    /// Best split of one feature histogram, trying both directions for
    /// missing values.
    fn best_split_for_feature(
        &self,
        feature: usize,
        stats: &[BinStats],
        totals: BinStats,
    ) -> Option<SplitCandidate> {
        let missing = stats[usize::from(MISSING_BIN)];
        let parent_score = self.leaf_score(totals);
        let mut cumulative = BinStats::default();
        let mut best: Option<SplitCandidate> = None;

        // The last value bin cannot be a threshold: nothing would go right.
        let last_threshold = stats.len().saturating_sub(2);

        for bin in 1..=last_threshold {
            cumulative = cumulative.merge(stats[bin]);

            for default_left in [false, true] {
                if default_left && missing.count == 0 {
                    continue;
                }
                let left = if default_left {
                    cumulative.merge(missing)
                } else {
                    cumulative
                };
                let right = totals.minus(left);

                if !self.admissible(left) || !self.admissible(right) {
                    continue;
                }

                let gain = self.leaf_score(left) + self.leaf_score(right) - parent_score;
                if gain > self.params.min_split_gain && best.is_none_or(|b| gain > b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        bin: bin as u8,
                        default_left,
                        gain,
                        left,
                        right,
                    });
                }
            }
        }

        best
    }

    fn find_best_split(&self, histogram: &Histogram, totals: BinStats) -> Option<SplitCandidate> {
        if totals.count < 2 * self.params.min_samples_leaf {
            return None;
        }

        let candidates: Vec<Option<SplitCandidate>> = self
            .features
            .par_iter()
            .zip(histogram.par_iter())
            .map(|(&feature, stats)| self.best_split_for_feature(feature, stats, totals))
            .collect();

        // Sequential merge keeps the result independent of thread scheduling.
        candidates
            .into_iter()
            .flatten()
            .fold(None, |best: Option<SplitCandidate>, candidate| match best {
                Some(b) if b.gain >= candidate.gain => Some(b),
                _ => Some(candidate),
            })
    }

    fn make_leaf(&self, node: usize, rows: Vec<u32>, histogram: Histogram, totals: BinStats) -> Leaf {
        let best = self.find_best_split(&histogram, totals);
        Leaf {
            node,
            rows,
            totals,
            histogram,
            best,
        }
    }

    /// Grows a tree over `rows`, always splitting the leaf with the largest
    /// gain until `num_leaves` is reached or no admissible split remains.
    pub fn grow(&self, rows: Vec<u32>) -> Tree {
        let totals = self.totals(&rows);
        let histogram = self.histogram(&rows);

        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut leaves = vec![self.make_leaf(0, rows, histogram, totals)];

        while leaves.len() < self.params.num_leaves {
            let Some((position, split)) = leaves
                .iter()
                .enumerate()
                .filter_map(|(i, leaf)| leaf.best.map(|best| (i, best)))
                .fold(None, |best: Option<(usize, SplitCandidate)>, (i, candidate)| match best {
                    Some((_, b)) if b.gain >= candidate.gain => best,
                    _ => Some((i, candidate)),
                })
            else {
                break;
            };

            let parent = leaves.swap_remove(position);
            let bins = self.binned.column(split.feature);
            let (left_rows, right_rows): (Vec<u32>, Vec<u32>) =
                parent.rows.iter().partition(|&&row| {
                    let bin = bins[row as usize];
                    if bin == MISSING_BIN {
                        split.default_left
                    } else {
                        bin <= split.bin
                    }
                });

            // Build the smaller child directly and derive its sibling.
            let left_is_smaller = left_rows.len() <= right_rows.len();
            let small = self.histogram(if left_is_smaller { &left_rows } else { &right_rows });
            let large: Histogram = parent
                .histogram
                .iter()
                .zip(&small)
                .map(|(p, s)| p.iter().zip(s).map(|(&p, &s)| p.minus(s)).collect())
                .collect();
            let (left_hist, right_hist) = if left_is_smaller {
                (small, large)
            } else {
                (large, small)
            };

            let left_node = nodes.len();
            let right_node = left_node + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[parent.node] = Node::Split {
                feature: split.feature,
                threshold: self.binned.mapper(split.feature).upper_bound(split.bin),
                default_left: split.default_left,
                left: left_node,
                right: right_node,
            };

            let left = self.make_leaf(left_node, left_rows, left_hist, split.left);
            let right = self.make_leaf(right_node, right_rows, right_hist, split.right);
            leaves.push(left);
            leaves.push(right);
        }

        for leaf in &leaves {
            nodes[leaf.node] = Node::Leaf {
                value: self.leaf_value(leaf.totals),
            };
        }

        Tree::from_nodes(nodes)
    }
}
