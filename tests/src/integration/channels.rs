//! # Input and Output Channels
//!
//! `-in`, `-log` and `-screen` against real files.

#[cfg(test)]
mod tests {
    use std::fs;
    use std::io::Write;

    use at_runtime::output::{BANNER_PREFIX, SUMMARY_PREFIX};
    use at_runtime::{BuildInfo, Context, ContextError, EchoMode, InputSource};
    use tempfile::{tempdir, NamedTempFile};

    use crate::fixtures::{Harness, EXE};

    fn melt_script() -> NamedTempFile {
        let mut script = NamedTempFile::new().unwrap();
        writeln!(script, "# melt").unwrap();
        writeln!(script, "units lj").unwrap();
        writeln!(script).unwrap();
        writeln!(script, "atom_style atomic   # default").unwrap();
        writeln!(script, "run 100").unwrap();
        script.flush().unwrap();
        script
    }

    fn drain(ctx: &Context) -> Vec<String> {
        let input = ctx.input().unwrap();
        let mut commands = Vec::new();
        while let Some(command) = input.next_command().unwrap() {
            commands.push(command);
        }
        commands
    }

    #[test]
    fn test_input_file_commands() {
        let script = melt_script();
        let path = script.path().to_str().unwrap().to_string();

        let harness = Harness::new();
        let ctx = harness
            .build(&["-log", "none", "-in", &path, "-echo", "both"])
            .unwrap();
        assert_eq!(ctx.input_source(), &InputSource::File(script.path().into()));
        assert_eq!(ctx.input().unwrap().echo(), EchoMode::Both);

        assert_eq!(drain(&ctx), ["units lj", "atom_style atomic", "run 100"]);
        assert!(harness
            .screen
            .contents()
            .contains("units lj\natom_style atomic\nrun 100\n"));
    }

    #[test]
    fn test_echo_selects_channels() {
        let script = melt_script();
        let path = script.path().to_str().unwrap().to_string();
        let dir = tempdir().unwrap();

        for (mode, on_screen, in_log) in [
            ("none", false, false),
            ("screen", true, false),
            ("log", false, true),
            ("both", true, true),
        ] {
            let log = dir.path().join(format!("log.{mode}"));
            let harness = Harness::new();
            let ctx = harness
                .build(&["-log", log.to_str().unwrap(), "-in", &path, "-echo", mode])
                .unwrap();
            drain(&ctx);
            ctx.close();

            let log_text = fs::read_to_string(&log).unwrap();
            assert_eq!(harness.screen.contents().contains("run 100\n"), on_screen, "{mode}");
            assert_eq!(log_text.contains("run 100\n"), in_log, "{mode}");
            assert!(log_text.starts_with(BANNER_PREFIX));
        }
    }

    #[test]
    fn test_missing_input_file() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("in.missing");
        let harness = Harness::new();

        let err = harness
            .build(&["-log", "none", "-in", missing.to_str().unwrap()])
            .unwrap_err();
        assert!(matches!(err, ContextError::Subsystem(_)));
        assert!(err.to_string().contains("Cannot open input script"));

        // Memory, Error and Universe were built before Input failed
        assert_eq!(harness.journal.constructed().len(), 3);
        assert_eq!(harness.journal.destroyed().len(), 3);
        assert!(!harness.world.is_claimed());
    }

    #[test]
    fn test_variables_reach_input_and_scripting() {
        let harness = Harness::new();
        let ctx = harness
            .build(&["-log", "none", "-var", "t", "300", "-var", "seeds", "1", "2"])
            .unwrap();
        let input = ctx.input().unwrap();
        assert_eq!(input.variable("t"), Some(&["300".to_string()][..]));
        assert_eq!(input.variable("seeds").map(<[String]>::len), Some(2));
        assert_eq!(ctx.python().unwrap().variables(), ["seeds", "t"]);
    }

    #[test]
    fn test_log_file_receives_banner_and_summary() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("log.run");
        let harness = Harness::new();

        let ctx = harness
            .build(&["-log", log.to_str().unwrap(), "-nocite"])
            .unwrap();
        assert!(ctx.has_logfile());
        assert!(ctx.output().unwrap().to_log());
        assert!(fs::read_to_string(&log).unwrap().starts_with(BANNER_PREFIX));
        ctx.close();

        let text = fs::read_to_string(&log).unwrap();
        assert!(text.starts_with(BANNER_PREFIX));
        assert!(text.lines().last().unwrap().starts_with(SUMMARY_PREFIX));
        // the injected screen saw the same lines
        assert_eq!(harness.screen.contents(), text);
    }

    #[test]
    fn test_unwritable_log_file() {
        let dir = tempdir().unwrap();
        let log = dir.path().join("no-such-dir").join("log.run");
        let harness = Harness::new();

        let err = harness.build(&["-log", log.to_str().unwrap()]).unwrap_err();
        assert!(matches!(err, ContextError::Io { what: "log file", .. }));
        assert!(harness.journal.constructed().is_empty());
        assert!(!harness.world.is_claimed());
    }

    #[test]
    fn test_screen_file() {
        let dir = tempdir().unwrap();
        let screen = dir.path().join("screen.out");
        let harness = Harness::new();

        // no injected screen, so the path is honoured
        let ctx = Context::builder([
            EXE,
            "-log",
            "none",
            "-screen",
            screen.to_str().unwrap(),
        ])
        .registries(harness.registries.clone())
        .world(harness.world.clone())
        .build_info(BuildInfo::without_git())
        .build()
        .unwrap();
        assert!(ctx.has_screen());
        ctx.close();

        let text = fs::read_to_string(&screen).unwrap();
        assert!(text.starts_with(BANNER_PREFIX));
        assert!(text.contains(SUMMARY_PREFIX));
    }

    #[test]
    fn test_screen_none() {
        let harness = Harness::new();
        let ctx = harness.build(&["-log", "none", "-screen", "none"]).unwrap();
        assert!(!ctx.has_screen());
        let output = ctx.output().unwrap();
        assert!(!output.to_screen());
        assert!(!output.to_log());
        let report = ctx.close();
        assert!(report.summary_written);
        assert!(harness.screen.is_empty());
    }
}
