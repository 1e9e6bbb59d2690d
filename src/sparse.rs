//! Sparse right-stochastic matrices in CSR form.
//!
//! Layout (same scheme as a CSR transition-probability table):
//! - `vals[row_start[i]..row_start[i+1]]` — transition probabilities out of
//!   state `i`
//! - `cols[row_start[i]..row_start[i+1]]` — destination states, ascending
//!
//! Two operations carry the whole engine: [`SparseMatrix::multiply`] composes
//! the per-table matrices of one kill into a single per-kill matrix, and
//! [`SparseMatrix::propagate`] pushes a state distribution forward one kill
//! (the row-vector form of matrix powering).

/// An `n × n` sparse matrix. Rows of transition matrices sum to 1; the
/// builders own that invariant, [`SparseMatrix::max_row_sum_deviation`]
/// checks it.
#[derive(Debug, Clone)]
pub struct SparseMatrix {
    n: usize,
    row_start: Vec<usize>,
    cols: Vec<u32>,
    vals: Vec<f64>,
}

impl SparseMatrix {
    /// Assemble from per-row entry lists. Entries must have ascending,
    /// in-range columns; exact zeros are dropped.
    pub fn from_rows(n: usize, rows: Vec<Vec<(u32, f64)>>) -> Self {
        debug_assert_eq!(rows.len(), n);
        let mut row_start = Vec::with_capacity(n + 1);
        let mut cols = Vec::new();
        let mut vals = Vec::new();

        row_start.push(0);
        for row in rows {
            debug_assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
            for (col, val) in row {
                debug_assert!((col as usize) < n);
                if val != 0.0 {
                    cols.push(col);
                    vals.push(val);
                }
            }
            row_start.push(cols.len());
        }

        Self {
            n,
            row_start,
            cols,
            vals,
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            n,
            row_start: (0..=n).collect(),
            cols: (0..n as u32).collect(),
            vals: vec![1.0; n],
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn nnz(&self) -> usize {
        self.vals.len()
    }

    /// Entries of row `i` as parallel (columns, values) slices.
    pub fn row(&self, i: usize) -> (&[u32], &[f64]) {
        let start = self.row_start[i];
        let end = self.row_start[i + 1];
        (&self.cols[start..end], &self.vals[start..end])
    }

    /// Sparse product `self · rhs`, row by row through a dense accumulator.
    ///
    /// Products of right-stochastic matrices are right-stochastic, so this
    /// is how independent sub-rolls within one kill compose into the
    /// per-kill matrix.
    pub fn multiply(&self, rhs: &SparseMatrix) -> SparseMatrix {
        assert_eq!(self.n, rhs.n, "matrix dimensions must agree");
        let n = self.n;

        let mut acc = vec![0.0f64; n];
        let mut marked = vec![false; n];
        let mut touched: Vec<u32> = Vec::new();
        let mut rows: Vec<Vec<(u32, f64)>> = Vec::with_capacity(n);

        for i in 0..n {
            let (a_cols, a_vals) = self.row(i);
            for (&k, &a) in a_cols.iter().zip(a_vals) {
                let (b_cols, b_vals) = rhs.row(k as usize);
                for (&j, &b) in b_cols.iter().zip(b_vals) {
                    if !marked[j as usize] {
                        marked[j as usize] = true;
                        touched.push(j);
                    }
                    acc[j as usize] += a * b;
                }
            }

            touched.sort_unstable();
            let row: Vec<(u32, f64)> = touched
                .iter()
                .map(|&j| (j, acc[j as usize]))
                .collect();
            for &j in &touched {
                acc[j as usize] = 0.0;
                marked[j as usize] = false;
            }
            touched.clear();
            rows.push(row);
        }

        SparseMatrix::from_rows(n, rows)
    }

    /// One step of the power iteration: `out = v · self`.
    ///
    /// Reading `(v·M^k)[absorbing]` with `v = e_start` is identical to
    /// maintaining the full matrix power and reading its (start, absorbing)
    /// entry, at O(nnz) per step instead of a matrix product.
    pub fn propagate(&self, v: &[f64], out: &mut [f64]) {
        debug_assert_eq!(v.len(), self.n);
        debug_assert_eq!(out.len(), self.n);
        out.fill(0.0);
        for i in 0..self.n {
            let p = v[i];
            if p == 0.0 {
                continue;
            }
            let (cols, vals) = self.row(i);
            for (&j, &w) in cols.iter().zip(vals) {
                out[j as usize] += p * w;
            }
        }
    }

    /// Largest |row sum − 1| across all rows.
    pub fn max_row_sum_deviation(&self) -> f64 {
        (0..self.n)
            .map(|i| {
                let (_, vals) = self.row(i);
                let sum: f64 = vals.iter().sum();
                (sum - 1.0).abs()
            })
            .fold(0.0, f64::max)
    }
}
