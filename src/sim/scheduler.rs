//! Ping-pong scheduler - drives update passes over a buffer pair.

use super::{BufferPair, PingPong};

/// Non-fatal error surfaced by a single update pass.
///
/// Steady-state pass failures are reported and tolerated; the frame
/// proceeds. Failures that would corrupt state are fatal render errors and
/// never reach this type.
#[derive(Debug, Clone, thiserror::Error)]
#[error("update pass failed: {0}")]
pub struct StepError(pub String);

/// Per-pixel update rule applied by each pass.
///
/// Implementations read the whole source buffer and fully overwrite the
/// target (every cell visited exactly once); target contents on entry are
/// unspecified. `delta_ms` is the elapsed frame time in milliseconds. The
/// rule must be a pure function of (source, delta_ms), with no hidden state
/// carried between passes.
pub trait UpdateProgram<B> {
    /// Apply one pass, reading `source` and writing `target`.
    fn apply(&mut self, source: &B, target: &B, delta_ms: f32) -> Result<(), StepError>;
}

/// Drives update passes over an owned buffer pair.
///
/// The scheduler is the only writer of the pair. Each `step` selects roles
/// from the cursor, invokes the program once over the full surface, and
/// flips the cursor. Passes are strictly sequential: every pass reads what
/// the previous pass wrote, so invocation order is the ordering guarantee.
pub struct PingPongScheduler<B> {
    pair: BufferPair<B>,
}

impl<B> PingPongScheduler<B> {
    /// Take ownership of two identically seeded buffers.
    pub fn new(first: B, second: B) -> Self {
        Self {
            pair: BufferPair::new(first, second),
        }
    }

    /// Current role cursor.
    pub fn cursor(&self) -> PingPong {
        self.pair.cursor()
    }

    /// Buffer holding the freshest fully written state.
    pub fn latest(&self) -> &B {
        self.pair.latest()
    }

    /// Index of the buffer holding the freshest fully written state.
    pub fn latest_index(&self) -> usize {
        self.pair.latest_index()
    }

    /// Read-only access to one buffer by index, for diagnostics.
    pub fn buffer(&self, index: usize) -> &B {
        self.pair.buffer(index)
    }

    /// Run a single update pass.
    ///
    /// Write target is `buffers[cursor.target()]`, read source is
    /// `buffers[cursor.source()]`. The cursor flips even when the pass
    /// fails, so alternation stays in lockstep with the pass count; a failed
    /// pass leaves the target's contents unspecified for one round. Returns
    /// the new cursor.
    pub fn step<P>(&mut self, program: &mut P, delta_ms: f32) -> Result<PingPong, StepError>
    where
        P: UpdateProgram<B>,
    {
        let outcome = {
            let (source, target) = self.pair.roles();
            program.apply(source, target, delta_ms)
        };
        let cursor = self.pair.flip();
        outcome.map(|_| cursor)
    }

    /// Run exactly `substeps` sequential passes for one displayed frame.
    ///
    /// Transient pass errors are logged and do not halt the frame. Returns
    /// the index of the buffer holding the final state.
    pub fn run_frame<P>(&mut self, program: &mut P, delta_ms: f32, substeps: u32) -> usize
    where
        P: UpdateProgram<B>,
    {
        for _ in 0..substeps {
            if let Err(e) = self.step(program, delta_ms) {
                log::warn!("{}", e);
            }
        }
        self.pair.latest_index()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::RefCell;

    /// In-memory stand-in for a render target.
    #[derive(Debug)]
    struct CpuBuffer {
        id: usize,
        cells: RefCell<Vec<[f32; 4]>>,
    }

    fn seeded_scheduler(seed: &[[f32; 4]]) -> PingPongScheduler<CpuBuffer> {
        PingPongScheduler::new(
            CpuBuffer {
                id: 0,
                cells: RefCell::new(seed.to_vec()),
            },
            CpuBuffer {
                id: 1,
                cells: RefCell::new(seed.to_vec()),
            },
        )
    }

    fn varied_seed(n: usize) -> Vec<[f32; 4]> {
        (0..n)
            .map(|i| [i as f32, (i % 7) as f32 * 0.5, 1.0 - (i % 3) as f32, 1.0])
            .collect()
    }

    /// Counts invocations and remembers the last delta it was handed.
    #[derive(Default)]
    struct CountingProgram {
        calls: usize,
        last_delta: f32,
    }

    impl<B> UpdateProgram<B> for CountingProgram {
        fn apply(&mut self, _source: &B, _target: &B, delta_ms: f32) -> Result<(), StepError> {
            self.calls += 1;
            self.last_delta = delta_ms;
            Ok(())
        }
    }

    /// Records which buffer ids each pass read and wrote.
    #[derive(Default)]
    struct RecordingProgram {
        passes: Vec<(usize, usize)>,
    }

    impl UpdateProgram<CpuBuffer> for RecordingProgram {
        fn apply(
            &mut self,
            source: &CpuBuffer,
            target: &CpuBuffer,
            _delta_ms: f32,
        ) -> Result<(), StepError> {
            self.passes.push((source.id, target.id));
            Ok(())
        }
    }

    /// Pass-through rule: output equals input, delta ignored.
    struct CopyProgram;

    impl UpdateProgram<CpuBuffer> for CopyProgram {
        fn apply(
            &mut self,
            source: &CpuBuffer,
            target: &CpuBuffer,
            _delta_ms: f32,
        ) -> Result<(), StepError> {
            let src = source.cells.borrow();
            let mut dst = target.cells.borrow_mut();
            dst.clear();
            dst.extend_from_slice(&src);
            Ok(())
        }
    }

    /// Fails on one chosen call, succeeds otherwise.
    struct FlakyProgram {
        calls: usize,
        fail_on: usize,
    }

    impl<B> UpdateProgram<B> for FlakyProgram {
        fn apply(&mut self, _source: &B, _target: &B, _delta_ms: f32) -> Result<(), StepError> {
            self.calls += 1;
            if self.calls == self.fail_on {
                Err(StepError("transient pass failure".into()))
            } else {
                Ok(())
            }
        }
    }

    #[test]
    fn test_alternation_over_many_steps() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = CountingProgram::default();

        for k in 1..=9 {
            let cursor = scheduler.step(&mut program, 16.0).unwrap();
            assert_eq!(cursor.target(), k % 2, "target after {} steps", k);
            assert_eq!(
                scheduler.latest_index(),
                1 - k % 2,
                "latest buffer after {} steps",
                k
            );
        }
    }

    #[test]
    fn test_no_step_reads_its_own_target() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = RecordingProgram::default();

        for _ in 0..3 {
            scheduler.run_frame(&mut program, 16.0, 4);
        }

        assert_eq!(program.passes.len(), 12);
        for (k, (source, target)) in program.passes.iter().enumerate() {
            assert_ne!(source, target, "pass {} read its own write target", k);
        }
        // Roles strictly alternate from (read 1, write 0).
        for (k, (source, target)) in program.passes.iter().enumerate() {
            assert_eq!(*target, k % 2);
            assert_eq!(*source, 1 - k % 2);
        }
    }

    #[test]
    fn test_run_frame_invokes_exact_substep_count() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = CountingProgram::default();

        let final_index = scheduler.run_frame(&mut program, 21.5, 3);

        assert_eq!(program.calls, 3);
        assert_eq!(program.last_delta, 21.5);
        // Three passes: write 0, write 1, write 0. Final state is buffer 0.
        assert_eq!(final_index, 0);
        assert_eq!(scheduler.latest_index(), final_index);
    }

    #[test]
    fn test_run_frame_zero_substeps_is_a_no_op() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = CountingProgram::default();

        let final_index = scheduler.run_frame(&mut program, 16.0, 0);

        assert_eq!(program.calls, 0);
        assert_eq!(final_index, 1);
    }

    #[test]
    fn test_pass_through_preserves_seed() {
        let seed = varied_seed(64);
        let mut scheduler = seeded_scheduler(&seed);
        let mut program = CopyProgram;

        for substeps in [1, 2, 5] {
            scheduler.run_frame(&mut program, 16.0, substeps);
            assert_eq!(
                *scheduler.latest().cells.borrow(),
                seed,
                "state changed after {} pass-through sub-steps",
                substeps
            );
        }
    }

    #[test]
    fn test_transient_error_does_not_halt_frame() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = FlakyProgram { calls: 0, fail_on: 2 };

        let final_index = scheduler.run_frame(&mut program, 16.0, 4);

        // All four passes were attempted despite the failure.
        assert_eq!(program.calls, 4);
        assert_eq!(final_index, 1);
    }

    #[test]
    fn test_failed_step_still_flips() {
        let mut scheduler = seeded_scheduler(&varied_seed(4));
        let mut program = FlakyProgram { calls: 0, fail_on: 1 };

        let result = scheduler.step(&mut program, 16.0);

        assert!(result.is_err());
        assert_eq!(scheduler.cursor().target(), 1);
        assert_eq!(scheduler.latest_index(), 0);
    }

    proptest! {
        /// Property: over any frame sequence the cursor tracks the total
        /// pass count mod 2, and run_frame always reports the buffer the
        /// last pass wrote.
        #[test]
        fn prop_alternation_matches_pass_count(
            frame_substeps in proptest::collection::vec(0u32..6, 0..12)
        ) {
            let mut scheduler = seeded_scheduler(&varied_seed(4));
            let mut program = CountingProgram::default();
            let mut total = 0u32;

            for substeps in frame_substeps {
                let final_index = scheduler.run_frame(&mut program, 16.0, substeps);
                total += substeps;

                prop_assert_eq!(scheduler.cursor().target(), (total % 2) as usize);
                prop_assert_eq!(final_index, 1 - (total % 2) as usize);
                prop_assert_eq!(final_index, scheduler.latest_index());
            }

            prop_assert_eq!(program.calls, total as usize);
        }
    }
}
