//! # Startup Fixtures
//!
//! The four startup configurations the engine is routinely launched with:
//!
//! 1. **Plain**: no backend, no citations
//! 2. **Thread-parallel**: `-pk omp 2 neigh yes -sf omp`
//! 3. **Accelerator**: `-k on t 2 -sf kk`
//! 4. **Help**: `-h`, nothing built

#[cfg(test)]
mod tests {
    use at_compute::{BackendId, ANNOUNCE_PREFIX};
    use at_runtime::output::{BANNER_PREFIX, HELP_HEADER, SUMMARY_PREFIX};
    use at_runtime::{InputSource, LifecycleState};
    use at_styles::{ACCELERATOR_MODULE, MOLECULE_MODULE, THREADS_MODULE};
    use shared_types::SubsystemKind;

    use crate::fixtures::{
        Harness, ACCELERATOR_ARGS, EXE, HELP_ARGS, PLAIN_ARGS, THREAD_ARGS,
    };

    // =========================================================================
    // PLAIN
    // =========================================================================

    #[test]
    fn test_plain_fixture() {
        let harness = Harness::new();
        let ctx = harness.build(PLAIN_ARGS).unwrap();

        assert_eq!(ctx.state(), LifecycleState::Operational);
        assert_eq!(ctx.exe_name(), EXE);
        assert_eq!(ctx.input_source(), &InputSource::Stdin);
        assert!(ctx.has_screen());
        assert!(!ctx.has_logfile());
        assert!(!ctx.suffix().is_enabled());
        assert_eq!(ctx.num_package(), 0);
        assert!(ctx.init_clock().is_some());

        assert!(ctx.memory().is_some());
        assert!(ctx.error().is_some());
        assert!(ctx.universe().is_some());
        assert!(ctx.input().is_some());
        assert!(ctx.domain().is_some());
        assert!(ctx.atom().is_some());
        assert!(ctx.neighbor().is_some());
        assert!(ctx.comm().is_some());
        assert!(ctx.force().is_some());
        assert!(ctx.update().is_some());
        assert!(ctx.modify().is_some());
        assert!(ctx.group().is_some());
        assert!(ctx.output().is_some());
        assert!(ctx.timer().is_some());
        assert!(ctx.python().is_some());

        assert!(ctx.citations().is_none());
        assert!(ctx.accelerator().is_none());
        assert!(ctx.memory_accel().is_none());
        assert!(ctx.atom_accel().is_none());

        assert!(harness.screen.contents().starts_with(BANNER_PREFIX));
        assert!(harness.console.is_empty());
    }

    #[test]
    fn test_plain_fixture_uses_unsuffixed_styles() {
        let harness = Harness::new();
        let ctx = harness.build(PLAIN_ARGS).unwrap();
        assert_eq!(ctx.atom().unwrap().style().name, "atomic");
        assert_eq!(ctx.update().unwrap().style(), "verlet");
        assert_eq!(ctx.comm().unwrap().style(), "brick");
        assert_eq!(ctx.force().unwrap().pair_style("lj/cut"), "lj/cut");
        assert!(!ctx.neighbor().unwrap().is_threaded());
    }

    #[test]
    fn test_plain_fixture_modules() {
        let harness = Harness::new();
        let ctx = harness.build(PLAIN_ARGS).unwrap();
        assert!(ctx.is_installed_module(THREADS_MODULE));
        assert!(ctx.is_installed_module(ACCELERATOR_MODULE));
        assert!(ctx.is_installed_module(MOLECULE_MODULE));
        assert!(!ctx.is_installed_module("DIPOLE"));
    }

    // =========================================================================
    // THREAD-PARALLEL
    // =========================================================================

    #[test]
    fn test_thread_fixture() {
        let harness = Harness::new();
        let ctx = harness.build(THREAD_ARGS).unwrap();

        assert!(ctx.is_operational());
        assert!(!ctx.has_logfile());
        assert_eq!(ctx.num_package(), 1);
        assert_eq!(ctx.suffix().primary(), Some("omp"));
        assert_eq!(ctx.suffix().secondary(), None);

        let engine = ctx.backends().threads.as_ref().unwrap();
        assert_eq!(engine.num_threads(), 2);
        assert!(ctx.backends().is_active(BackendId::ThreadParallel));
        assert!(!ctx.backends().is_active(BackendId::Accelerator));

        assert!(ctx.neighbor().unwrap().is_threaded());
        assert_eq!(ctx.force().unwrap().pair_style("lj/cut"), "lj/cut/omp");
        assert_eq!(ctx.force().unwrap().pair_style("tersoff"), "tersoff");
        assert_eq!(ctx.modify().unwrap().fix_style("nve"), "nve/omp");
        assert_eq!(ctx.update().unwrap().style(), "verlet");
        assert!(ctx.accelerator().is_none());

        let banner = harness.screen.contents();
        assert!(banner.starts_with(BANNER_PREFIX));
        assert!(banner.contains("2 thread-parallel worker(s)"));
        assert!(banner.contains("style suffix: omp"));
    }

    #[test]
    fn test_thread_suffix_alone_uses_environment_threads() {
        let harness = Harness::new();
        let ctx = harness.build(&["-log", "none", "-sf", "omp"]).unwrap();
        assert!(ctx.backends().is_active(BackendId::ThreadParallel));
        assert_eq!(ctx.num_package(), 0);
    }

    // =========================================================================
    // ACCELERATOR
    // =========================================================================

    #[test]
    fn test_accelerator_fixture() {
        let harness = Harness::new();
        let ctx = harness.build(ACCELERATOR_ARGS).unwrap();

        assert!(ctx.is_operational());
        assert_eq!(ctx.num_package(), 0);
        assert_eq!(ctx.suffix().primary(), Some("kk"));
        assert!(ctx.backends().is_active(BackendId::Accelerator));

        let accelerator = ctx.accelerator().unwrap();
        assert_eq!(accelerator.device().host_threads(), 2);
        assert!(ctx.memory_accel().is_some());
        assert!(ctx.atom_accel().is_some());
        assert_eq!(ctx.memory().unwrap().variant(), "memory/kk");
        assert_eq!(ctx.atom().unwrap().variant(), "atom/kk");
        assert!(ctx.atom().unwrap().style().accelerated);

        // citations were requested, so the accelerator registered one
        assert_eq!(ctx.citations().map(|c| c.len()), Some(1));

        assert!(harness.console.contents().starts_with(ANNOUNCE_PREFIX));
        assert!(harness
            .screen
            .contents()
            .contains("accelerator backend active"));
    }

    #[test]
    fn test_accelerator_slot_follows_timer() {
        let harness = Harness::new();
        let ctx = harness.build(ACCELERATOR_ARGS).unwrap();
        let built = ctx.constructed();
        let timer = built.iter().position(|k| *k == SubsystemKind::Timer).unwrap();
        let accel = built
            .iter()
            .position(|k| *k == SubsystemKind::Accelerator)
            .unwrap();
        assert_eq!(accel, timer + 1);
        assert_eq!(built.last(), Some(&SubsystemKind::Python));
    }

    // =========================================================================
    // HELP
    // =========================================================================

    #[test]
    fn test_help_fixture() {
        let harness = Harness::new();
        let ctx = harness.build(HELP_ARGS).unwrap();

        assert_eq!(ctx.state(), LifecycleState::Activating);
        assert!(ctx.domain().is_none());
        assert!(ctx.atom().is_none());
        assert!(ctx.force().is_none());
        assert!(ctx.constructed().is_empty());
        assert!(ctx.init_clock().is_none());

        let text = harness.screen.contents();
        assert!(text.starts_with(HELP_HEADER));
        assert!(!text.contains(BANNER_PREFIX));

        let report = ctx.close();
        assert!(report.destroyed.is_empty());
        assert!(!report.summary_written);
        assert!(!harness.screen.contents().contains(SUMMARY_PREFIX));
        assert_eq!(
            harness.journal.states(),
            vec![LifecycleState::Activating, LifecycleState::Destroyed]
        );
    }

    #[test]
    fn test_help_still_validates_backends() {
        let harness = Harness::with_registries(crate::fixtures::registries(&[]));
        assert!(harness.build(&["-h", "-k", "on"]).is_err());
    }
}
