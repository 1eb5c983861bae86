//! Unit tests for qn-core primitives.

#[cfg(test)]
mod ids {
    use crate::{CenterId, ClassId, JobId};

    #[test]
    fn index_roundtrip() {
        let id = CenterId(2);
        assert_eq!(id.index(), 2);
        assert_eq!(CenterId::try_from(2usize).unwrap(), id);
    }

    #[test]
    fn ordering() {
        assert!(JobId(0) < JobId(1));
        assert!(ClassId(2) > ClassId::FIRST);
    }

    #[test]
    fn class_next_steps_by_one() {
        assert_eq!(ClassId::FIRST.next(), ClassId(1));
        assert_eq!(ClassId(u8::MAX).next(), ClassId(u8::MAX));
    }

    #[test]
    fn display() {
        assert_eq!(JobId(7).to_string(), "JobId(7)");
    }
}

#[cfg(test)]
mod time {
    use crate::SampleGrid;

    #[test]
    fn grid_includes_zero_and_stop() {
        let grid = SampleGrid::new(60.0, 180.0);
        assert_eq!(grid.len(), 4);
        assert_eq!(grid.ticks(), vec![0.0, 60.0, 120.0, 180.0]);
    }

    #[test]
    fn grid_excludes_partial_last_step() {
        let grid = SampleGrid::new(60.0, 150.0);
        assert_eq!(grid.ticks(), vec![0.0, 60.0, 120.0]);
    }

    #[test]
    fn take_due_flushes_every_passed_tick() {
        let mut grid = SampleGrid::new(10.0, 100.0);
        let mut due = Vec::new();
        while let Some(t) = grid.take_due(35.0) {
            due.push(t);
        }
        assert_eq!(due, vec![0.0, 10.0, 20.0, 30.0]);
        assert_eq!(grid.peek(), Some(40.0));
        assert_eq!(grid.taken(), 4);
    }

    #[test]
    fn exhausted_grid_yields_nothing() {
        let mut grid = SampleGrid::new(10.0, 10.0);
        assert_eq!(grid.take_due(1e9), Some(0.0));
        assert_eq!(grid.take_due(1e9), Some(10.0));
        assert_eq!(grid.take_due(1e9), None);
    }

    #[test]
    fn non_positive_step_is_empty() {
        assert!(SampleGrid::new(0.0, 10.0).is_empty());
        assert_eq!(SampleGrid::new(0.0, 10.0).peek(), None);
    }
}

#[cfg(test)]
mod rng {
    use crate::{CoreError, MeanVariates, StreamId, StreamRng, VariateSource};

    #[test]
    fn same_seed_reproduces() {
        let mut a = StreamRng::new(99);
        let mut b = StreamRng::new(99);
        for _ in 0..50 {
            let x = a.sample_exponential(0.5, StreamId(1)).unwrap();
            let y = b.sample_exponential(0.5, StreamId(1)).unwrap();
            assert_eq!(x, y);
        }
    }

    #[test]
    fn streams_are_independent() {
        // Drawing extra values from stream 2 must not shift stream 1.
        let mut a = StreamRng::new(7);
        let mut b = StreamRng::new(7);
        let mut from_a = Vec::new();
        let mut from_b = Vec::new();
        for _ in 0..20 {
            from_a.push(a.uniform(StreamId(1)));
            b.uniform(StreamId(2));
            b.uniform(StreamId(2));
            from_b.push(b.uniform(StreamId(1)));
        }
        assert_eq!(from_a, from_b);
    }

    #[test]
    fn replication_partitions_differ() {
        let mut r0 = StreamRng::for_replication(12_345, 0);
        let mut r1 = StreamRng::for_replication(12_345, 1);
        assert_ne!(r0.seed(), r1.seed());
        assert_ne!(r0.uniform(StreamId(0)), r1.uniform(StreamId(0)));
        assert_eq!(
            StreamRng::for_replication(12_345, 3).seed(),
            StreamRng::for_replication(12_345, 3).seed()
        );
    }

    #[test]
    fn exponential_mean_is_close() {
        let mut rng = StreamRng::new(1);
        let n = 200_000;
        let sum: f64 = (0..n)
            .map(|_| rng.sample_exponential(0.4, StreamId(3)).unwrap())
            .sum();
        let mean = sum / n as f64;
        assert!((mean - 0.4).abs() < 0.01, "got {mean}");
    }

    #[test]
    fn samples_are_non_negative() {
        let mut rng = StreamRng::new(5);
        for _ in 0..10_000 {
            assert!(rng.sample_interarrival(1.2, StreamId(0)).unwrap() >= 0.0);
        }
    }

    #[test]
    fn invalid_parameters_rejected() {
        let mut rng = StreamRng::new(5);
        assert_eq!(
            rng.sample_exponential(0.0, StreamId(1)),
            Err(CoreError::InvalidMean { mean: 0.0, stream: StreamId(1) })
        );
        assert!(matches!(
            rng.sample_interarrival(-1.0, StreamId(0)),
            Err(CoreError::InvalidRate { .. })
        ));
        assert!(rng.sample_exponential(f64::NAN, StreamId(1)).is_err());
    }

    #[test]
    fn mean_variates_return_means() {
        let mut src = MeanVariates { interarrival: Some(3.0) };
        assert_eq!(src.sample_exponential(0.2, StreamId(1)).unwrap(), 0.2);
        assert_eq!(src.sample_interarrival(1.2, StreamId(0)).unwrap(), 3.0);
        assert!(src.sample_exponential(-0.2, StreamId(1)).is_err());
    }
}

#[cfg(test)]
mod config {
    use crate::{CENTER_A, CENTER_B, CENTER_P, CenterId, ClassId, NetworkConfig, Scenario};

    #[test]
    fn web_app_shape() {
        let cfg = NetworkConfig::web_app();
        assert_eq!(cfg.center_count(), 3);
        assert_eq!(cfg.class_count(), 3);
        assert_eq!(cfg.routes.len(), 5);
        assert_eq!(cfg.service_mean(CENTER_A, ClassId(1)), Some(0.4));
        assert_eq!(cfg.service_mean(CENTER_B, ClassId(1)), None);
        assert_eq!(cfg.service_mean(CenterId(9), ClassId(0)), None);
    }

    #[test]
    fn scenarios_patch_demands() {
        let two_fa = NetworkConfig::scenario(Scenario::TwoFa);
        assert_eq!(two_fa.service_mean(CENTER_A, ClassId(2)), Some(0.15));
        assert_eq!(two_fa.service_mean(CENTER_P, ClassId(1)), Some(0.7));

        let faster = NetworkConfig::scenario(Scenario::FasterB);
        assert_eq!(faster.service_mean(CENTER_B, ClassId(0)), Some(0.4));

        let heavy = NetworkConfig::scenario(Scenario::Heavy1Fa);
        assert!(heavy.arrival_rate > NetworkConfig::web_app().arrival_rate);
    }

    #[test]
    fn names_resolve() {
        let cfg = NetworkConfig::web_app();
        assert_eq!(cfg.center_id("P"), Some(CENTER_P));
        assert_eq!(cfg.center_id("Z"), None);
        assert_eq!(cfg.center_name(CENTER_B), "B");
        assert_eq!(cfg.class_name(ClassId(2)), "Class3");
    }
}
