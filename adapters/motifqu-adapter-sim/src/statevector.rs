//! Statevector simulation engine.

use num_complex::Complex64;
use rand::Rng;

use motifqu_ir::{Instruction, InstructionKind, StandardGate};

/// A statevector representing a quantum state.
///
/// Basis index bit `q` is the value of qubit `q`.
pub struct Statevector {
    /// The state amplitudes (2^n complex numbers).
    amplitudes: Vec<Complex64>,
    /// Number of qubits.
    num_qubits: usize,
}

impl Statevector {
    /// Create a new statevector initialized to |0...0⟩.
    pub fn new(num_qubits: usize) -> Self {
        let size = 1 << num_qubits;
        let mut amplitudes = vec![Complex64::new(0.0, 0.0); size];
        amplitudes[0] = Complex64::new(1.0, 0.0);
        Self {
            amplitudes,
            num_qubits,
        }
    }

    /// Get the number of qubits.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Get the amplitudes.
    pub fn amplitudes(&self) -> &[Complex64] {
        &self.amplitudes
    }

    /// Consume the state and return its amplitudes.
    pub fn into_amplitudes(self) -> Vec<Complex64> {
        self.amplitudes
    }

    /// Outcome probabilities `|a_i|^2`.
    pub fn probabilities(&self) -> Vec<f64> {
        self.amplitudes.iter().map(|a| a.norm_sqr()).collect()
    }

    /// Apply an instruction to the statevector.
    pub fn apply(&mut self, instruction: &Instruction) {
        match &instruction.kind {
            InstructionKind::Gate(gate) => {
                let qubits: Vec<_> = instruction.qubits.iter().map(|q| q.0 as usize).collect();
                self.apply_standard_gate(gate.kind, &qubits);
            }
            InstructionKind::Barrier => {}
        }
    }

    /// Multiply every amplitude by `e^{i·phase}`.
    pub fn apply_global_phase(&mut self, phase: f64) {
        if phase == 0.0 {
            return;
        }
        let factor = Complex64::from_polar(1.0, phase);
        for amp in &mut self.amplitudes {
            *amp *= factor;
        }
    }

    /// Apply a standard gate.
    fn apply_standard_gate(&mut self, gate: StandardGate, qubits: &[usize]) {
        match gate {
            StandardGate::X => self.apply_x(qubits[0]),
            StandardGate::H => self.apply_h(qubits[0]),
            StandardGate::MCZ(_) => self.apply_mcz(qubits),
        }
    }

    // =========================================================================
    // Single-qubit gate implementations
    // =========================================================================

    fn apply_x(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                self.amplitudes.swap(i, j);
            }
        }
    }

    fn apply_h(&mut self, qubit: usize) {
        let mask = 1 << qubit;
        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        for i in 0..(1 << self.num_qubits) {
            if i & mask == 0 {
                let j = i | mask;
                let a = self.amplitudes[i];
                let b = self.amplitudes[j];
                self.amplitudes[i] = sqrt2_inv * (a + b);
                self.amplitudes[j] = sqrt2_inv * (a - b);
            }
        }
    }

    // =========================================================================
    // Multi-qubit gate implementations
    // =========================================================================

    /// Negate every basis state in which all `qubits` are set.
    fn apply_mcz(&mut self, qubits: &[usize]) {
        let mask = qubits.iter().fold(0usize, |m, &q| m | (1 << q));
        for i in 0..(1 << self.num_qubits) {
            if i & mask == mask {
                self.amplitudes[i] = -self.amplitudes[i];
            }
        }
    }

    // =========================================================================
    // Sampling
    // =========================================================================

    /// Sample a single measurement outcome.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let r: f64 = rng.r#gen();

        let mut cumulative = 0.0;
        for (i, amp) in self.amplitudes.iter().enumerate() {
            cumulative += amp.norm_sqr();
            if r < cumulative {
                return i;
            }
        }

        // Rounding can leave the cumulative sum just below 1.
        self.amplitudes.len() - 1
    }

    /// Sample `shots` outcomes and return a histogram indexed by basis state.
    pub fn sample_histogram<R: Rng + ?Sized>(&self, rng: &mut R, shots: u32) -> Vec<u64> {
        let mut cumulative = Vec::with_capacity(self.amplitudes.len());
        let mut acc = 0.0;
        for amp in &self.amplitudes {
            acc += amp.norm_sqr();
            cumulative.push(acc);
        }

        let last = self.amplitudes.len() - 1;
        let mut histogram = vec![0u64; self.amplitudes.len()];
        for _ in 0..shots {
            let r: f64 = rng.r#gen::<f64>() * acc;
            let outcome = cumulative.partition_point(|&c| c <= r).min(last);
            histogram[outcome] += 1;
        }
        histogram
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use motifqu_ir::QubitId;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn approx_eq(a: Complex64, b: Complex64) -> bool {
        (a - b).norm() < 1e-10
    }

    #[test]
    fn test_initial_state() {
        let sv = Statevector::new(2);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(1.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(0.0, 0.0)));
        assert!(approx_eq(sv.amplitudes[3], Complex64::new(0.0, 0.0)));
    }

    #[test]
    fn test_hadamard() {
        let mut sv = Statevector::new(1);
        sv.apply_h(0);

        let sqrt2_inv = 1.0 / 2.0_f64.sqrt();
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(sqrt2_inv, 0.0)));
        assert!(approx_eq(sv.amplitudes[1], Complex64::new(sqrt2_inv, 0.0)));
    }

    #[test]
    fn test_x_gate_is_little_endian() {
        let mut sv = Statevector::new(3);
        sv.apply_x(1);
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(1.0, 0.0)));
    }

    #[test]
    fn test_mcz_flips_only_all_ones() {
        let mut sv = Statevector::new(3);
        for q in 0..3 {
            sv.apply_h(q);
        }
        sv.apply(&Instruction::mcz(&[QubitId(0), QubitId(1), QubitId(2)]));

        let amp = 1.0 / 8.0_f64.sqrt();
        for (i, a) in sv.amplitudes().iter().enumerate() {
            let expected = if i == 7 { -amp } else { amp };
            assert!(approx_eq(*a, Complex64::new(expected, 0.0)), "index {i}");
        }
    }

    #[test]
    fn test_single_operand_mcz_is_z() {
        let mut sv = Statevector::new(2);
        sv.apply_x(1);
        sv.apply(&Instruction::mcz(&[QubitId(1)]));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(-1.0, 0.0)));

        sv.apply(&Instruction::mcz(&[QubitId(0)]));
        assert!(approx_eq(sv.amplitudes[2], Complex64::new(-1.0, 0.0)));
    }

    #[test]
    fn test_global_phase_pi_negates() {
        let mut sv = Statevector::new(1);
        sv.apply_global_phase(std::f64::consts::PI);
        assert!(approx_eq(sv.amplitudes[0], Complex64::new(-1.0, 0.0)));
    }

    #[test]
    fn test_sample_deterministic() {
        let mut sv = Statevector::new(1);
        sv.apply_x(0);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(sv.sample(&mut rng), 1);
        }
        assert_eq!(sv.sample_histogram(&mut rng, 50), vec![0, 50]);
    }

    #[test]
    fn test_histogram_is_seed_reproducible() {
        let mut sv = Statevector::new(2);
        sv.apply_h(0);
        sv.apply_h(1);

        let a = sv.sample_histogram(&mut StdRng::seed_from_u64(42), 1000);
        let b = sv.sample_histogram(&mut StdRng::seed_from_u64(42), 1000);
        assert_eq!(a, b);
        assert_eq!(a.iter().sum::<u64>(), 1000);
        assert!(a.iter().all(|&c| c > 150));
    }
}
