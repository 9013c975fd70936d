//! # Lifecycle Ordering
//!
//! Construction follows the fixed slot order, every dependency exists before
//! its dependent, and teardown releases slots in exact reverse, including
//! after a construction failure halfway through the graph.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use at_runtime::output::SUMMARY_PREFIX;
    use at_runtime::{BuildScope, ContextError, LifecycleState};
    use shared_types::{DynSubsystem, SubsystemError, SubsystemKind};

    use crate::fixtures::{Harness, ProbeLog, ACCELERATOR_ARGS, PLAIN_ARGS, THREAD_ARGS};

    #[test]
    fn test_dependencies_built_first() {
        for args in [PLAIN_ARGS, THREAD_ARGS, ACCELERATOR_ARGS] {
            let harness = Harness::new();
            let _ctx = harness.build(args).unwrap();

            let seqs: HashMap<SubsystemKind, u64> =
                harness.journal.constructed().into_iter().collect();
            for (kind, seq) in &seqs {
                for dep in kind.dependencies() {
                    if let Some(dep_seq) = seqs.get(dep) {
                        assert!(dep_seq < seq, "{dep} must precede {kind}");
                    } else {
                        assert!(dep.is_optional(), "{kind} built without {dep}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_construction_follows_slot_order() {
        let harness = Harness::new();
        let ctx = harness.build(&["-log", "none"]).unwrap();

        let built: Vec<SubsystemKind> = harness
            .journal
            .constructed()
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        let expected: Vec<SubsystemKind> = SubsystemKind::CONSTRUCTION_ORDER
            .into_iter()
            .filter(|k| *k != SubsystemKind::Accelerator)
            .collect();
        assert_eq!(built, expected);
        assert_eq!(ctx.constructed(), expected);
    }

    #[test]
    fn test_teardown_exact_reverse() {
        let harness = Harness::new();
        let probes = ProbeLog::new();
        let ctx = probes.install(harness.builder(PLAIN_ARGS)).build().unwrap();
        assert!(ctx.is_operational());

        let built = probes.built();
        assert!(!built.iter().any(|(k, _)| *k == SubsystemKind::Citation));
        assert!(probes.dropped().is_empty());

        let report = ctx.close();

        let mut reversed = built.clone();
        reversed.reverse();
        assert_eq!(probes.dropped(), reversed);
        assert_eq!(
            report.destroyed,
            reversed.iter().map(|(k, _)| *k).collect::<Vec<_>>()
        );
        assert!(probes
            .dropped()
            .windows(2)
            .all(|pair| pair[0].1 > pair[1].1));
    }

    #[test]
    fn test_journal_records_reverse_destruction() {
        let harness = Harness::new();
        let ctx = harness.build(ACCELERATOR_ARGS).unwrap();
        ctx.close();

        let mut constructed = harness.journal.constructed();
        constructed.reverse();
        assert_eq!(harness.journal.destroyed(), constructed);
        assert_eq!(
            harness.journal.states(),
            vec![
                LifecycleState::Activating,
                LifecycleState::Constructed,
                LifecycleState::Operational,
                LifecycleState::TearingDown,
                LifecycleState::Destroyed,
            ]
        );
    }

    #[test]
    fn test_failed_construction_tears_down_partial_graph() {
        let harness = Harness::new();
        let probes = ProbeLog::new();
        let builder = probes.install(harness.builder(PLAIN_ARGS)).factory(
            SubsystemKind::Force,
            Box::new(
                |_scope: &BuildScope<'_>| -> Result<DynSubsystem, SubsystemError> {
                    Err(SubsystemError::initialization(
                        SubsystemKind::Force,
                        "pair coefficients unavailable",
                    ))
                },
            ),
        );

        let err = builder.build().unwrap_err();
        assert!(matches!(err, ContextError::Subsystem(_)), "{err}");

        let built = probes.built();
        assert_eq!(
            built.last().map(|(k, _)| *k),
            Some(SubsystemKind::Comm),
            "construction stops at the failing slot"
        );
        let mut reversed = built;
        reversed.reverse();
        assert_eq!(probes.dropped(), reversed);

        assert_eq!(
            harness.journal.states(),
            vec![LifecycleState::Activating, LifecycleState::Destroyed]
        );
        assert!(!harness.screen.contents().contains(SUMMARY_PREFIX));
        assert!(!harness.world.is_claimed());
    }

    #[test]
    fn test_factory_kind_mismatch_rejected() {
        let harness = Harness::new();
        let probes = ProbeLog::new();
        let builder = probes.install(harness.builder(PLAIN_ARGS));
        // Domain's slot handed a Timer
        let builder = builder.factory(
            SubsystemKind::Domain,
            Box::new(
                |_scope: &BuildScope<'_>| -> Result<DynSubsystem, SubsystemError> {
                    Ok(Box::new(at_runtime::subsystems::Timer::new()))
                },
            ),
        );
        assert!(builder.build().is_err());
        assert!(!probes
            .built()
            .iter()
            .any(|(k, _)| *k == SubsystemKind::Atom));
        assert_eq!(probes.dropped().len(), probes.built().len());
    }

    #[test]
    fn test_sequential_contexts_on_one_world() {
        let harness = Harness::new();
        for _ in 0..3 {
            let ctx = harness.build(PLAIN_ARGS).unwrap();
            assert!(harness.world.is_claimed());
            let report = ctx.close();
            assert!(report.summary_written);
            assert!(!harness.world.is_claimed());
        }
        assert_eq!(
            harness.screen.contents().matches(SUMMARY_PREFIX).count(),
            3
        );
    }

    #[test]
    fn test_concurrent_context_on_claimed_world() {
        let harness = Harness::new();
        let first = harness.build(PLAIN_ARGS).unwrap();

        let err = harness.build(PLAIN_ARGS).unwrap_err();
        assert!(matches!(err, ContextError::UniverseInUse));
        assert!(first.is_operational());
        assert!(harness.world.is_claimed());

        drop(first);
        assert!(!harness.world.is_claimed());
        assert!(harness.build(PLAIN_ARGS).is_ok());
    }

    #[test]
    fn test_drop_without_close_tears_down() {
        let harness = Harness::new();
        let probes = ProbeLog::new();
        let ctx = probes.install(harness.builder(PLAIN_ARGS)).build().unwrap();
        let built = probes.built().len();
        drop(ctx);

        assert_eq!(probes.dropped().len(), built);
        assert!(harness.screen.contents().contains(SUMMARY_PREFIX));
        assert_eq!(
            harness.journal.states().last(),
            Some(&LifecycleState::Destroyed)
        );
    }
}
