//! Property-based tests for the lifecycle state machine and scheduler.

mod property_tests {
    use std::collections::BTreeSet;

    use crate::sched::StepResult;
    use crate::tests::helpers::{finite_work, rig, FinishLog};
    use crate::thread::{Thread, ThreadBuilder, ThreadState};

    /// Simple linear congruential generator for property testing.
    struct SimpleRng {
        state: u64,
    }

    impl SimpleRng {
        fn new(seed: u64) -> Self {
            Self { state: seed }
        }

        fn next_u64(&mut self) -> u64 {
            self.state = self
                .state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            self.state
        }

        fn gen_range(&mut self, min: u64, max: u64) -> u64 {
            min + (self.next_u64() % (max - min))
        }
    }

    #[test]
    fn property_lifecycle_follows_the_state_table() {
        for seed in [0x12345678u64, 0x9e3779b97f4a7c15, 0x2545f4914f6cdd1d] {
            let mut rng = SimpleRng::new(seed);
            let (_host, manager) = rig();

            let threads: Vec<Thread> = (0..8)
                .map(|_| Thread::create(&manager, || StepResult::Continue, |_| {}))
                .collect();
            let mut model = vec![ThreadState::New; threads.len()];

            // No pumping happens here, so states only change through the
            // lifecycle calls themselves.
            for _ in 0..400 {
                let pick = rng.gen_range(0, threads.len() as u64) as usize;
                let thread = &threads[pick];
                match rng.gen_range(0, 4) {
                    0 => {
                        thread.run();
                        model[pick] = ThreadState::Running;
                    }
                    1 => {
                        thread.pause();
                        if model[pick] == ThreadState::Running {
                            model[pick] = ThreadState::Paused;
                        }
                    }
                    2 => {
                        thread.resume();
                        if model[pick] == ThreadState::Paused {
                            model[pick] = ThreadState::Running;
                        }
                    }
                    _ => {
                        thread.kill();
                        if matches!(model[pick], ThreadState::Running | ThreadState::Paused) {
                            model[pick] = ThreadState::Killed;
                        }
                    }
                }

                for (thread, expected) in threads.iter().zip(&model) {
                    assert_eq!(thread.state(), *expected);
                    assert_eq!(
                        manager.exist(thread.record()),
                        *expected == ThreadState::Running
                    );
                }
                let running = model
                    .iter()
                    .filter(|state| **state == ThreadState::Running)
                    .count();
                assert_eq!(manager.count(), running);
            }
        }
    }

    #[test]
    fn property_finite_workers_terminate_in_completion_order() {
        for seed in [1u64, 7, 42] {
            let mut rng = SimpleRng::new(seed);
            let (host, manager) = rig();
            let log = FinishLog::new();

            let mut workers = Vec::new();
            for _ in 0..rng.gen_range(3, 11) {
                let steps = rng.gen_range(0, 21) as usize;
                let worker = ThreadBuilder::new()
                    .on_finish(log.callback())
                    .create(&manager, finite_work(steps));
                worker.run();
                workers.push((steps, worker));
            }

            host.run_until_idle();

            for (_, worker) in &workers {
                assert_eq!(worker.state(), ThreadState::Terminated);
                assert_eq!(log.count_for(worker.id()), 1);
            }
            assert_eq!(manager.count(), 0);

            // One step per sweep pass means completion order is step count
            // order, with creation order breaking ties.
            let mut expected: Vec<_> = workers
                .iter()
                .enumerate()
                .map(|(created, (steps, worker))| (*steps, created, worker.id()))
                .collect();
            expected.sort();
            let expected_ids: Vec<_> = expected.into_iter().map(|(_, _, id)| id).collect();
            assert_eq!(log.entries(), expected_ids);
        }
    }

    #[test]
    fn property_thread_ids_unique() {
        let (_host, manager) = rig();

        let threads: Vec<Thread> = (0..100)
            .map(|_| Thread::create(&manager, || StepResult::Done, |_| {}))
            .collect();

        let ids: BTreeSet<_> = threads.iter().map(|thread| thread.id()).collect();
        assert_eq!(ids.len(), threads.len());
    }

    #[test]
    fn property_priority_stored_verbatim() {
        let mut rng = SimpleRng::new(0xfeedface);
        let (_host, manager) = rig();
        let thread = Thread::create(&manager, || StepResult::Continue, |_| {});

        for _ in 0..100 {
            let value = rng.next_u64() as i32;
            thread.set_priority(value);
            assert_eq!(thread.priority(), value);
        }
    }
}
