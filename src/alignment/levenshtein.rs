use crate::alignment::cost::{substitution_cost, DELETION_COST, INSERTION_COST};
use crate::pipeline::traits::CharSimilarity;

/// Above this length difference only the first cheapest path is followed.
pub const FIRST_ONLY_LENGTH_GAP: usize = 10;
/// Upper bound on enumerated equal-cost paths.
pub const MAX_CHEAPEST_PATHS: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Match,
    Substitute,
    Insert,
    Delete,
    /// Reordering of a window of `n` tokens on each side.
    Transpose(usize),
}

impl OpKind {
    pub fn is_match(self) -> bool {
        self == Self::Match
    }

    pub fn is_transpose(self) -> bool {
        matches!(self, Self::Transpose(_))
    }
}

/// One step of an alignment path; ranges are half-open token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlignOp {
    pub kind: OpKind,
    pub src_start: usize,
    pub src_end: usize,
    pub tgt_start: usize,
    pub tgt_end: usize,
}

impl AlignOp {
    pub const fn new(
        kind: OpKind,
        src_start: usize,
        src_end: usize,
        tgt_start: usize,
        tgt_end: usize,
    ) -> Self {
        Self {
            kind,
            src_start,
            src_end,
            tgt_start,
            tgt_end,
        }
    }
}

/// Cost and back-pointer matrices of size `(n + 1) × (m + 1)`.
#[derive(Debug, Clone)]
pub struct CostTable {
    rows: usize,
    cols: usize,
    cost: Vec<f64>,
    ops: Vec<Vec<OpKind>>,
}

impl CostTable {
    fn idx(&self, i: usize, j: usize) -> usize {
        i * self.cols + j
    }

    pub fn cost_at(&self, i: usize, j: usize) -> f64 {
        self.cost[self.idx(i, j)]
    }

    pub fn ops_at(&self, i: usize, j: usize) -> &[OpKind] {
        &self.ops[self.idx(i, j)]
    }

    /// Cost of the cheapest full alignment.
    pub fn total_cost(&self) -> f64 {
        self.cost_at(self.rows - 1, self.cols - 1)
    }

    pub fn src_len(&self) -> usize {
        self.rows - 1
    }

    pub fn tgt_len(&self) -> usize {
        self.cols - 1
    }
}

/// Fill the DP tables. At a cell where the tokens differ every operation
/// reaching the minimum is kept, in the fixed order transposition,
/// substitution, insertion, deletion.
pub fn build_cost_table(
    src: &[&str],
    tgt: &[&str],
    similarity: &dyn CharSimilarity,
    threshold: f64,
) -> CostTable {
    let rows = src.len() + 1;
    let cols = tgt.len() + 1;
    let mut table = CostTable {
        rows,
        cols,
        cost: vec![0.0; rows * cols],
        ops: vec![Vec::new(); rows * cols],
    };

    for i in 1..rows {
        let (cur, prev) = (table.idx(i, 0), table.idx(i - 1, 0));
        table.cost[cur] = table.cost[prev] + DELETION_COST;
        table.ops[cur] = vec![OpKind::Delete];
    }
    for j in 1..cols {
        let (cur, prev) = (table.idx(0, j), table.idx(0, j - 1));
        table.cost[cur] = table.cost[prev] + INSERTION_COST;
        table.ops[cur] = vec![OpKind::Insert];
    }

    for i in 0..src.len() {
        for j in 0..tgt.len() {
            let cur = table.idx(i + 1, j + 1);
            if src[i] == tgt[j] {
                table.cost[cur] = table.cost_at(i, j);
                table.ops[cur] = vec![OpKind::Match];
                continue;
            }

            let del_cost = table.cost_at(i, j + 1) + DELETION_COST;
            let ins_cost = table.cost_at(i + 1, j) + INSERTION_COST;
            let sub_cost = table.cost_at(i, j) + substitution_cost(src[i], tgt[j], similarity, threshold);
            let (trans_cost, trans_width) = transposition_cost(&table, src, tgt, i, j);

            let candidates = [
                (trans_cost, OpKind::Transpose(trans_width)),
                (sub_cost, OpKind::Substitute),
                (ins_cost, OpKind::Insert),
                (del_cost, OpKind::Delete),
            ];
            let best = candidates
                .iter()
                .map(|&(c, _)| c)
                .fold(f64::INFINITY, f64::min);
            table.cost[cur] = best;
            table.ops[cur] = candidates
                .iter()
                .filter(|&&(c, _)| c == best)
                .map(|&(_, op)| op)
                .collect();
        }
    }

    table
}

/// Cheapest transposition ending at `(i, j)`: the smallest window
/// `src[i-k..=i]` / `tgt[j-k..=j]` holding the same tokens in another order,
/// searched while the diagonal keeps accumulating cost.
fn transposition_cost(
    table: &CostTable,
    src: &[&str],
    tgt: &[&str],
    i: usize,
    j: usize,
) -> (f64, usize) {
    let mut k = 1;
    while k <= i && k <= j && table.cost_at(i - k + 1, j - k + 1) - table.cost_at(i - k, j - k) > 0.0 {
        let mut a = src[i - k..=i].to_vec();
        let mut b = tgt[j - k..=j].to_vec();
        a.sort_unstable();
        b.sort_unstable();
        if a == b {
            return (table.cost_at(i - k, j - k) + k as f64, k + 1);
        }
        k += 1;
    }
    (f64::INFINITY, 0)
}

/// Enumerate cheapest paths from the full alignment back to the origin,
/// returned in forward order. With `first_only` a single path is produced.
pub fn cheapest_paths(table: &CostTable, first_only: bool, limit: usize) -> Vec<Vec<AlignOp>> {
    let n = table.src_len();
    let m = table.tgt_len();
    let first_only = first_only || n.abs_diff(m) > FIRST_ONLY_LENGTH_GAP;
    let limit = if first_only { 1 } else { limit.max(1) };

    let mut paths = Vec::new();
    let mut trail = Vec::with_capacity(n + m);
    walk(table, n, m, &mut trail, &mut paths, limit);

    if !first_only && paths.len() >= limit {
        tracing::debug!(
            src_len = n,
            tgt_len = m,
            limit,
            "alignment: cheapest path enumeration truncated"
        );
    }
    paths
}

fn walk(
    table: &CostTable,
    i: usize,
    j: usize,
    trail: &mut Vec<AlignOp>,
    paths: &mut Vec<Vec<AlignOp>>,
    limit: usize,
) {
    if paths.len() >= limit {
        return;
    }
    if i == 0 && j == 0 {
        paths.push(trail.iter().rev().copied().collect());
        return;
    }
    for &op in table.ops_at(i, j) {
        let step = match op {
            OpKind::Match | OpKind::Substitute => AlignOp::new(op, i - 1, i, j - 1, j),
            OpKind::Delete => AlignOp::new(op, i - 1, i, j, j),
            OpKind::Insert => AlignOp::new(op, i, i, j - 1, j),
            OpKind::Transpose(w) => AlignOp::new(op, i - w, i, j - w, j),
        };
        trail.push(step);
        walk(table, step.src_start, step.tgt_start, trail, paths, limit);
        trail.pop();
        if paths.len() >= limit {
            return;
        }
    }
}

/// Cost of one concrete path under the same model used to build the table.
pub fn path_cost(
    path: &[AlignOp],
    src: &[&str],
    tgt: &[&str],
    similarity: &dyn CharSimilarity,
    threshold: f64,
) -> f64 {
    path.iter()
        .map(|op| match op.kind {
            OpKind::Match => 0.0,
            OpKind::Substitute => {
                substitution_cost(src[op.src_start], tgt[op.tgt_start], similarity, threshold)
            }
            OpKind::Insert => INSERTION_COST,
            OpKind::Delete => DELETION_COST,
            OpKind::Transpose(w) => (w - 1) as f64,
        })
        .sum()
}
