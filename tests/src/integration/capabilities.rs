//! # Capability Mismatch
//!
//! A backend the capability table reports unavailable aborts activation
//! before a single subsystem is built, and leaves the world free.

#[cfg(test)]
mod tests {
    use at_compute::BackendId;
    use at_runtime::{ContextError, ErrorClass, World};

    use crate::fixtures::{registries, Harness, ACCELERATOR_ARGS, THREAD_ARGS};

    fn assert_aborted_cleanly(harness: &Harness, err: &ContextError) {
        assert_eq!(err.class(), ErrorClass::CapabilityMismatch, "{err}");
        assert!(harness.journal.constructed().is_empty());
        assert!(harness.journal.destroyed().is_empty());
        assert!(harness.screen.is_empty());
        assert!(!harness.world.is_claimed());
    }

    #[test]
    fn test_accelerator_unavailable() {
        let harness = Harness::with_registries(registries(&[
            BackendId::ThreadParallel,
            BackendId::DistributedRank,
        ]));
        let err = harness.build(ACCELERATOR_ARGS).unwrap_err();
        assert_aborted_cleanly(&harness, &err);
        assert!(matches!(
            err,
            ContextError::CapabilityMismatch {
                backend: BackendId::Accelerator,
                ..
            }
        ));
    }

    #[test]
    fn test_thread_parallel_unavailable() {
        let harness = Harness::with_registries(registries(&[BackendId::Accelerator]));
        let err = harness.build(THREAD_ARGS).unwrap_err();
        assert_aborted_cleanly(&harness, &err);
    }

    #[test]
    fn test_accelerator_suffix_unavailable() {
        let harness = Harness::with_registries(registries(&[]));
        let err = harness.build(&["-log", "none", "-sf", "kk"]).unwrap_err();
        assert_aborted_cleanly(&harness, &err);
    }

    #[test]
    fn test_distributed_world_unavailable() {
        let harness = Harness::with_registries(registries(&[BackendId::ThreadParallel]));
        let world = World::new(2, 0).unwrap();
        let err = harness
            .builder(&["-log", "none"])
            .world(world.clone())
            .build()
            .unwrap_err();
        assert_eq!(err.class(), ErrorClass::CapabilityMismatch);
        assert!(!world.is_claimed());
    }

    #[test]
    fn test_accelerator_suffix_without_accelerator_on_is_a_conflict() {
        let harness = Harness::new();
        let err = harness.build(&["-log", "none", "-sf", "kk"]).unwrap_err();
        assert!(matches!(err, ContextError::Conflict(_)));
        assert_eq!(err.class(), ErrorClass::Configuration);
        assert!(harness.journal.constructed().is_empty());
    }

    #[test]
    fn test_malformed_arguments_abort() {
        let harness = Harness::new();
        for args in [
            &["-bogus"][..],
            &["-echo", "loud"][..],
            &["-pk", "gpu", "1"][..],
            &["-k", "on", "t", "0"][..],
            &["-p", "0x2"][..],
            &["-p", "2x"][..],
            &["-p", "18446744073709551615x1"][..],
            &["-p", "18446744073709551615", "2"][..],
            &["-p", "2x1"][..],
        ] {
            let err = harness.build(args).unwrap_err();
            assert_eq!(err.class(), ErrorClass::Configuration, "{args:?}: {err}");
        }
        assert!(harness.journal.constructed().is_empty());
        assert!(!harness.world.is_claimed());
    }

    #[test]
    fn test_partitions_must_cover_the_world() {
        let harness = Harness::new();
        let world = World::new(4, 0).unwrap();
        for layout in [&["-p", "2x1"][..], &["-p", "3", "2"][..]] {
            let mut args = vec!["-log", "none"];
            args.extend_from_slice(layout);
            let err = harness
                .builder(&args)
                .world(world.clone())
                .build()
                .unwrap_err();
            assert!(matches!(err, ContextError::PartitionMismatch { world: 4, .. }), "{err}");
            assert_eq!(err.class(), ErrorClass::Configuration);
            assert!(!world.is_claimed());
        }

        let ctx = harness
            .builder(&["-log", "none", "-p", "2x2"])
            .world(world.clone())
            .build()
            .unwrap();
        assert_eq!(ctx.universe().unwrap().universe().nworlds(), 2);
    }
}
