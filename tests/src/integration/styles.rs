//! # Style Lookup Through a Live Context
//!
//! Registry ownership, suffix fallback and particle-kind instantiation as
//! seen by the subsystems of a running Context.

#[cfg(test)]
mod tests {
    use at_compute::BackendId;
    use at_runtime::{ErrorClass, Registries};
    use at_styles::{
        ModuleSet, StyleCategory, StyleError, StyleOwner, StyleRegistry, MOLECULE_MODULE,
    };
    use proptest::prelude::*;

    use crate::fixtures::{capabilities, Harness, ACCELERATOR_ARGS, PLAIN_ARGS, THREAD_ARGS};

    #[test]
    fn test_registry_owners() {
        let registry = StyleRegistry::standard();
        assert_eq!(
            registry.lookup(StyleCategory::Atom, "full"),
            StyleOwner::Module(MOLECULE_MODULE)
        );
        assert_eq!(
            registry.lookup(StyleCategory::Atom, "dipole"),
            StyleOwner::Module("DIPOLE")
        );
        assert_eq!(registry.lookup(StyleCategory::Atom, "atomic"), StyleOwner::BuiltIn);
        assert_eq!(
            registry.lookup(StyleCategory::Atom, "nonexistent-xyz"),
            StyleOwner::BuiltIn
        );
        // matching is case-sensitive
        assert_eq!(registry.lookup(StyleCategory::Atom, "FULL"), StyleOwner::BuiltIn);
    }

    #[test]
    fn test_particle_kinds_in_plain_context() {
        let harness = Harness::new();
        let ctx = harness.build(PLAIN_ARGS).unwrap();
        let atom = ctx.atom().unwrap();

        let full = atom.create_style("full").unwrap();
        assert!(full.molecular);
        assert!(!full.accelerated);

        assert!(matches!(
            atom.create_style("dipole"),
            Err(StyleError::ModuleNotInstalled { ref module, .. }) if module == "DIPOLE"
        ));
        assert!(matches!(
            atom.create_style("nonexistent-xyz"),
            Err(StyleError::Unresolvable { .. })
        ));
        assert!(atom.available_styles().any(|s| s == "sphere"));
    }

    #[test]
    fn test_accelerated_kinds_follow_suffix() {
        let harness = Harness::new();
        let ctx = harness.build(ACCELERATOR_ARGS).unwrap();
        let atom = ctx.atom().unwrap();

        assert_eq!(atom.create_style("full").unwrap().name, "full/kk");
        assert_eq!(atom.create_style("sphere").unwrap().name, "sphere/kk");
        // every "/kk" name belongs to the accelerator, so a kind without an
        // accelerated constructor is unresolvable rather than falling back
        assert!(matches!(
            atom.create_style("ellipsoid"),
            Err(StyleError::Unresolvable { ref name, .. }) if name == "ellipsoid/kk"
        ));
        assert_eq!(ctx.comm().unwrap().style(), "brick/kk");
    }

    #[test]
    fn test_explicit_accelerated_name_kept() {
        let harness = Harness::new();
        let ctx = harness.build(ACCELERATOR_ARGS).unwrap();
        let atom = ctx.atom().unwrap();
        assert_eq!(atom.create_style("full/kk").unwrap().name, "full/kk");
        assert_eq!(atom.create_style("sphere/kk").unwrap().name, "sphere/kk");
    }

    #[test]
    fn test_thread_suffix_leaves_atom_kinds_alone() {
        let harness = Harness::new();
        let ctx = harness.build(THREAD_ARGS).unwrap();
        assert_eq!(ctx.atom().unwrap().style().name, "atomic");
        assert_eq!(ctx.memory().unwrap().variant(), "memory");
        assert!(ctx.memory_accel().is_none());
    }

    #[test]
    fn test_molecule_module_missing() {
        let registries = Registries::new(
            capabilities(&BackendId::ALL),
            StyleRegistry::standard(),
        )
        .with_modules(ModuleSet::from_names(["OPENMP"]));
        let harness = Harness::with_registries(registries);
        let ctx = harness.build(PLAIN_ARGS).unwrap();
        assert!(!ctx.is_installed_module(MOLECULE_MODULE));

        let err = ctx.atom().unwrap().create_style("full").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unrecognized atom style 'full' is part of the MOLECULE module \
             which is not enabled in this build"
        );
    }

    #[test]
    fn test_default_kind_needs_its_module() {
        // accelerator capability present but its style module not installed:
        // the default kind resolves to "atomic/kk" and has no constructor
        let registries = Registries::new(
            capabilities(&BackendId::ALL),
            StyleRegistry::standard(),
        )
        .with_modules(ModuleSet::from_names(["OPENMP"]));
        let harness = Harness::with_registries(registries);
        let err = harness.build(ACCELERATOR_ARGS).unwrap_err();
        assert_eq!(err.class(), ErrorClass::UnresolvableStyle, "{err}");
        assert_eq!(
            harness.journal.destroyed().len(),
            harness.journal.constructed().len()
        );
    }

    proptest! {
        #[test]
        fn test_lookup_is_stable(name in "[a-z/]{1,16}") {
            let registry = StyleRegistry::bootstrap();
            let first = registry.lookup(StyleCategory::Pair, &name);
            prop_assert_eq!(first, registry.lookup(StyleCategory::Pair, &name));
        }
    }
}
