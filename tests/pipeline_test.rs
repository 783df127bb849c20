//! Post-grouping steps run by the orchestrator.
//!
//! Steps are small shell scripts written into the temp dir, standing in for
//! the device-identity check and the CSV conversion.

#[cfg(unix)]
mod post_steps {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    use fitsession::model::{GroupingConfig, ToleranceWindow, ZonePolicy};
    use fitsession::pipeline::{PostStep, RunOptions, RunOutcome, SessionGrouper};
    use fitsession::relocate::RealFs;
    use tempfile::TempDir;

    const EXAMPLE: [&str; 4] = [
        "2025-06-17-14-50-00.fit",
        "2025-06-17-14-55-00.fit",
        "2025-06-17-15-00-02.fit",
        "2025-06-17-16-00-00.fit",
    ];

    fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn setup() -> (TempDir, TempDir) {
        let data = TempDir::new().unwrap();
        for name in EXAMPLE {
            fs::write(data.path().join(name), b"fit").unwrap();
        }
        let scripts = TempDir::new().unwrap();
        (data, scripts)
    }

    fn grouper() -> SessionGrouper<RealFs> {
        let config = GroupingConfig::new("fit", ToleranceWindow::default(), ZonePolicy::Utc);
        SessionGrouper::new(config, RealFs)
    }

    fn step(path: &Path, args: &str) -> PostStep {
        PostStep::parse(&format!("{} {args}", path.display())).unwrap()
    }

    #[test]
    fn steps_run_in_order_over_every_session() {
        let (data, scripts) = setup();
        let log = scripts.path().join("log");
        let check = write_script(
            scripts.path(),
            "check.sh",
            &format!("echo \"$1 $(basename \"$2\")\" >> {}", log.display()),
        );
        let convert = write_script(
            scripts.path(),
            "convert.sh",
            &format!("echo \"$1 $(basename \"$2\")\" >> {}", log.display()),
        );

        let mut grouper = grouper();
        let plan = grouper.plan(data.path()).unwrap();
        let opts = RunOptions {
            assume_yes: true,
            steps: vec![step(&check, "check"), step(&convert, "convert")],
            ..RunOptions::default()
        };

        let outcome = grouper.run(&plan, &opts, |_| Ok(false)).unwrap();

        match outcome {
            RunOutcome::Completed { steps_run, .. } => assert_eq!(steps_run.len(), 2),
            other => panic!("expected Completed, got {other:?}"),
        }
        let lines: Vec<String> = fs::read_to_string(&log)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect();
        assert_eq!(
            lines,
            vec![
                "check 2025-06-17-14-50-00",
                "check 2025-06-17-16-00-00",
                "convert 2025-06-17-14-50-00",
                "convert 2025-06-17-16-00-00",
            ]
        );
    }

    #[test]
    fn failing_step_stops_the_pipeline() {
        let (data, scripts) = setup();
        let marker = scripts.path().join("converted");
        let fail = write_script(scripts.path(), "fail.sh", "exit 3");
        let convert = write_script(
            scripts.path(),
            "convert.sh",
            &format!("touch {}", marker.display()),
        );

        let mut grouper = grouper();
        let plan = grouper.plan(data.path()).unwrap();
        let opts = RunOptions {
            assume_yes: true,
            steps: vec![step(&fail, ""), step(&convert, "")],
            ..RunOptions::default()
        };

        let err = grouper.run(&plan, &opts, |_| Ok(true)).unwrap_err();

        assert_eq!(err.error_type(), "step_failed");
        assert!(!marker.exists(), "conversion must not run after a failed check");
        // Grouping itself already happened, and the error says where.
        assert!(data.path().join("2025-06-17-14-50-00").is_dir());
        let kept = err.relocated_dirs();
        assert_eq!(
            kept,
            [
                data.path().join("2025-06-17-14-50-00"),
                data.path().join("2025-06-17-16-00-00"),
            ]
        );
    }
}
