//! LDPC forward error correction
//!
//! The code is systematic with a staircase (dual-diagonal) parity section,
//! so encoding is a running XOR and decoding is iterative belief
//! propagation over the sparse parity-check matrix. The receiver treats the
//! decoder as a black box: it hands over one LLR per codeword bit and gets
//! back hard data bits, the iteration count, and how many parity checks the
//! result satisfies.

use crate::{FrameError, Result};
use tracing::debug;

/// Generic FEC encoder trait
pub trait FecEncoder {
    /// Encode data bits into a full systematic codeword (data then parity)
    fn encode(&self, data: &[u8]) -> Vec<u8>;

    /// Get the code rate (k/n where k is data bits, n is total bits)
    fn code_rate(&self) -> f64;
}

/// Generic soft-decision FEC decoder trait
pub trait FecDecoder {
    /// Decode one codeword worth of LLRs (positive means bit 0)
    fn decode(&self, llrs: &[f64]) -> DecodeOutcome;

    /// Number of parity-check equations in the code
    fn parity_checks(&self) -> usize;
}

/// Result of one decoder run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecodeOutcome {
    /// Hard decisions for the data section of the codeword
    pub data_bits: Vec<u8>,
    /// Iterations used
    pub iterations: usize,
    /// Parity checks satisfied by the final hard decision
    pub parity_checks_passed: usize,
}

/// Systematic LDPC code with staircase parity
#[derive(Debug, Clone)]
pub struct LdpcCode {
    data_bits: usize,
    parity_bits: usize,
    /// For each check node, the connected variable nodes
    check_to_var: Vec<Vec<usize>>,
    /// For each variable node, (check node, position within that check)
    var_to_check: Vec<Vec<(usize, usize)>>,
    max_iterations: usize,
}

const CONSTRUCTION_SEED: u32 = 0x5EED_1DC0;
/// Normalization applied to min-sum check messages
const MIN_SUM_SCALE: f64 = 0.8;

impl LdpcCode {
    /// Build a code with `column_weight` checks per data bit.
    ///
    /// The data section of the parity-check matrix is pseudo-random but
    /// deterministic, so both ends of a link construct the same code.
    pub fn new(
        data_bits: usize,
        parity_bits: usize,
        column_weight: usize,
        max_iterations: usize,
    ) -> Result<Self> {
        if data_bits == 0 || parity_bits == 0 {
            return Err(FrameError::InvalidFecParameters {
                msg: format!("Invalid LDPC size: data={}, parity={}", data_bits, parity_bits),
            });
        }

        if column_weight == 0 || column_weight > parity_bits {
            return Err(FrameError::InvalidFecParameters {
                msg: format!(
                    "Column weight {} must be between 1 and {} parity checks",
                    column_weight, parity_bits
                ),
            });
        }

        let mut check_to_var = vec![Vec::new(); parity_bits];
        let mut state = CONSTRUCTION_SEED;
        let mut rows = Vec::with_capacity(column_weight);

        for col in 0..data_bits {
            rows.clear();
            while rows.len() < column_weight {
                state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
                let row = ((state >> 8) as usize) % parity_bits;
                if !rows.contains(&row) {
                    rows.push(row);
                }
            }
            for &row in &rows {
                check_to_var[row].push(col);
            }
        }

        // Staircase: check i covers parity bits i-1 and i
        for (i, vars) in check_to_var.iter_mut().enumerate() {
            if i > 0 {
                vars.push(data_bits + i - 1);
            }
            vars.push(data_bits + i);
        }

        let mut var_to_check = vec![Vec::new(); data_bits + parity_bits];
        for (ci, vars) in check_to_var.iter().enumerate() {
            for (pos, &v) in vars.iter().enumerate() {
                var_to_check[v].push((ci, pos));
            }
        }

        Ok(Self {
            data_bits,
            parity_bits,
            check_to_var,
            var_to_check,
            max_iterations: max_iterations.max(1),
        })
    }

    pub fn data_bits(&self) -> usize {
        self.data_bits
    }

    pub fn parity_bits(&self) -> usize {
        self.parity_bits
    }

    pub fn coded_bits(&self) -> usize {
        self.data_bits + self.parity_bits
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Count satisfied parity checks for a hard-decision codeword
    pub fn satisfied_checks(&self, codeword: &[u8]) -> usize {
        self.check_to_var
            .iter()
            .filter(|vars| {
                vars.iter()
                    .fold(0u8, |acc, &v| acc ^ (codeword.get(v).copied().unwrap_or(0) & 1))
                    == 0
            })
            .count()
    }

    fn check_update(&self, incoming: &[f64], outgoing: &mut [f64]) {
        if incoming.len() < 2 {
            outgoing.iter_mut().for_each(|m| *m = 0.0);
            return;
        }

        let mut min1 = f64::MAX;
        let mut min2 = f64::MAX;
        let mut min_idx = 0;
        let mut negative = false;
        for (j, &x) in incoming.iter().enumerate() {
            if x < 0.0 {
                negative = !negative;
            }
            let a = x.abs();
            if a < min1 {
                min2 = min1;
                min1 = a;
                min_idx = j;
            } else if a < min2 {
                min2 = a;
            }
        }
        for (i, out) in outgoing.iter_mut().enumerate() {
            let magnitude = if i == min_idx { min2 } else { min1 };
            // remove this edge's own sign from the product
            let sign_negative = negative ^ (incoming[i] < 0.0);
            let signed = if sign_negative { -magnitude } else { magnitude };
            *out = signed * MIN_SUM_SCALE;
        }
    }
}

impl FecEncoder for LdpcCode {
    fn encode(&self, data: &[u8]) -> Vec<u8> {
        let mut codeword = vec![0u8; self.coded_bits()];
        let n = data.len().min(self.data_bits);
        for (c, &d) in codeword.iter_mut().zip(&data[..n]) {
            *c = d & 1;
        }

        let mut previous = 0u8;
        for (i, vars) in self.check_to_var.iter().enumerate() {
            let sum = vars
                .iter()
                .filter(|&&v| v < self.data_bits)
                .fold(0u8, |acc, &v| acc ^ codeword[v]);
            let parity = sum ^ previous;
            codeword[self.data_bits + i] = parity;
            previous = parity;
        }

        codeword
    }

    fn code_rate(&self) -> f64 {
        self.data_bits as f64 / self.coded_bits() as f64
    }
}

impl FecDecoder for LdpcCode {
    fn decode(&self, llrs: &[f64]) -> DecodeOutcome {
        let n = self.coded_bits();
        let channel = |v: usize| llrs.get(v).copied().unwrap_or(0.0);

        let mut v2c: Vec<Vec<f64>> = self
            .check_to_var
            .iter()
            .map(|vars| vars.iter().map(|&v| channel(v)).collect())
            .collect();
        let mut c2v: Vec<Vec<f64>> = self
            .check_to_var
            .iter()
            .map(|vars| vec![0.0; vars.len()])
            .collect();

        let mut total = vec![0.0f64; n];
        let mut hard = vec![0u8; n];
        let mut passed = 0;
        let mut iterations = 0;

        for iter in 0..self.max_iterations {
            iterations = iter + 1;

            for (ci, incoming) in v2c.iter().enumerate() {
                self.check_update(incoming, &mut c2v[ci]);
            }

            for (vi, edges) in self.var_to_check.iter().enumerate() {
                total[vi] = channel(vi) + edges.iter().map(|&(ci, pos)| c2v[ci][pos]).sum::<f64>();
            }

            for (ci, vars) in self.check_to_var.iter().enumerate() {
                for (pos, &vi) in vars.iter().enumerate() {
                    v2c[ci][pos] = total[vi] - c2v[ci][pos];
                }
            }

            for (h, &l) in hard.iter_mut().zip(&total) {
                *h = u8::from(l < 0.0);
            }
            passed = self.satisfied_checks(&hard);
            if passed == self.parity_bits {
                break;
            }
        }

        debug!(iterations, passed, checks = self.parity_bits, "ldpc decode");

        hard.truncate(self.data_bits);
        DecodeOutcome {
            data_bits: hard,
            iterations,
            parity_checks_passed: passed,
        }
    }

    fn parity_checks(&self) -> usize {
        self.parity_bits
    }
}
