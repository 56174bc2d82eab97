use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

// Helper function to create a temporary net file
fn create_test_file(content: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test.pn");
    fs::write(&file_path, content).expect("Failed to write test file");
    (temp_dir, file_path)
}

// Helper function to run the pnbound binary
fn run_pnbound(args: &[&str], files: &[PathBuf]) -> std::process::Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pnbound"));
    cmd.args(args);
    for file in files {
        cmd.arg(file);
    }
    cmd.output().expect("Failed to run pnbound")
}

fn sample(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("nets").join(name)
}

fn stdout(output: &std::process::Output) -> String {
    assert!(
        output.status.success(),
        "Command should succeed. stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[cfg(test)]
mod analyse_tests {
    use super::*;

    #[test]
    fn test_counter_is_unbounded() {
        let text = stdout(&run_pnbound(&["analyse"], &[sample("counter.pn")]));
        assert!(text.contains("Result: unbounded"));
        assert!(text.contains("m1: (1)"));
        assert!(text.contains("m2: (2)"));
        assert!(text.contains("[t] increment"));
    }

    #[test]
    fn test_buffer_is_bounded() {
        let text = stdout(&run_pnbound(&["analyse"], &[sample("buffer.pn")]));
        assert!(text.contains("Result: bounded"));
        assert!(text.contains("Reachability graph: 3 markings / 4 firings"));
    }

    #[test]
    fn test_mutex_is_bounded() {
        let text = stdout(&run_pnbound(&["analyse"], &[sample("mutex.pn")]));
        assert!(text.contains("Result: bounded"));
        assert!(text.contains("Reachability graph: 3 markings / 4 firings"));
    }

    #[test]
    fn test_report_and_dot_files() {
        let out_dir = TempDir::new().expect("Failed to create temp dir");
        let report = out_dir.path().join("pump.rpt");
        let dot = out_dir.path().join("pump.dot");

        let output = run_pnbound(
            &[
                "analyse",
                "--report",
                report.to_str().unwrap(),
                "--dot",
                dot.to_str().unwrap(),
            ],
            &[sample("pump.pn")],
        );
        stdout(&output);

        let report = fs::read_to_string(&report).expect("Failed to read report file");
        assert!(report.contains("m1: (1|0|0|1|0)"));
        assert!(report.contains("m2: (1|0|1|1|0)"));
        assert!(report.contains("Unbounded places: p3"));
        assert!(report.contains("Detection path (4 firings):"));

        let dot = fs::read_to_string(&dot).expect("Failed to read DOT file");
        assert!(dot.starts_with("digraph reachability {"));
        assert!(dot.contains("color=red"));
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let (_temp_dir, input) = create_test_file(r#"Place "p1" { tokens: many }"#);
        let output = run_pnbound(&["analyse"], &[input]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse"));
    }

    #[test]
    fn test_undefined_arc_endpoint_is_reported() {
        let (_temp_dir, input) = create_test_file(r#"Place "p1" Arc "a1" : "p1" -> "t1""#);
        let output = run_pnbound(&["analyse"], &[input]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown Element: t1"));
    }

    #[test]
    fn test_missing_file_is_reported() {
        let output = run_pnbound(&["analyse"], &[PathBuf::from("does/not/exist.pn")]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read"));
    }
}

#[cfg(test)]
mod batch_tests {
    use super::*;

    #[test]
    fn test_batch_rows_follow_input_order() {
        let files = [
            sample("mutex.pn"),
            sample("counter.pn"),
            sample("buffer.pn"),
            sample("pump.pn"),
        ];
        let text = stdout(&run_pnbound(&["batch", "--jobs", "2"], &files));

        let positions: Vec<usize> = ["mutex.pn", "counter.pn", "buffer.pn", "pump.pn"]
            .iter()
            .map(|name| text.find(name).expect("Every file should have a row"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));

        assert!(text.contains("1: (t); (1), (2)"));
        assert!(text.contains("4: (t1,t3,t2,t4); (1|0|0|1|0), (1|0|1|1|0)"));
    }

    #[test]
    fn test_batch_fails_on_bad_file() {
        let (_temp_dir, input) = create_test_file("Arc");
        let output = run_pnbound(&["batch"], &[sample("counter.pn"), input]);
        assert!(!output.status.success());
    }
}

#[cfg(test)]
mod show_tests {
    use super::*;

    #[test]
    fn test_fire_sequence() {
        let text = stdout(&run_pnbound(
            &["show", "--fire", "t", "--fire", "t"],
            &[sample("counter.pn")],
        ));
        assert!(text.contains("Marking: (3)"));
        assert!(!text.contains("Start marking modified"));
    }

    #[test]
    fn test_token_edits_rebaseline() {
        let text = stdout(&run_pnbound(
            &["show", "--add-token", "full", "--remove-token", "free"],
            &[sample("buffer.pn")],
        ));
        // empty, free, full, ready
        assert!(text.contains("Marking: (1|1|1|1)"));
        assert!(text.contains("Start marking modified: (1|1|1|1)"));
    }

    #[test]
    fn test_token_edits_run_before_firings() {
        // consume needs a token in full, added by the later --add-token
        let text = stdout(&run_pnbound(
            &["show", "--fire", "consume", "--add-token", "full"],
            &[sample("buffer.pn")],
        ));
        // empty, free, full, ready
        assert!(text.contains("Marking: (1|3|0|1)"));
    }

    #[test]
    fn test_help_documents_edit_order() {
        let text = stdout(&run_pnbound(&["show", "--help"], &[]));
        assert!(text.contains("all --add-token, then all --remove-token, then all --fire"));
    }

    #[test]
    fn test_disabled_transition_is_rejected() {
        let output = run_pnbound(&["show", "--fire", "consume"], &[sample("buffer.pn")]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("not enabled"));
    }

    #[test]
    fn test_underflow_is_rejected() {
        let output = run_pnbound(&["show", "--remove-token", "full"], &[sample("buffer.pn")]);
        assert!(!output.status.success());
        assert!(String::from_utf8_lossy(&output.stderr).contains("no token to remove"));
    }
}
