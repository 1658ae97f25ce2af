use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
    events: PathBuf,
}

impl CliTestEnv {
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        let events = base.join("events.jsonl");
        let source = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../chatpulse-core/tests/fixtures/week.jsonl");
        fs::copy(source, &events).expect("failed to copy event fixture");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
            events,
        }
    }

    fn events_arg(&self) -> String {
        self.events.to_string_lossy().into_owned()
    }

    fn write_config(&self, content: &str) {
        let dir = self.xdg_config.join("chatpulse");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), content).expect("failed to write config");
    }
}

fn run_report(env: &CliTestEnv, args: &[&str]) -> Output {
    let bin_path = PathBuf::from(assert_cmd::cargo::cargo_bin!("chatpulse-report"));

    Command::new(bin_path)
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute chatpulse-report: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "chatpulse-report {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

#[test]
fn export_csv_lists_each_active_day() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = [
        "export",
        events.as_str(),
        "--from",
        "2026-10-12",
        "--to",
        "2026-10-18",
        "--format",
        "csv",
    ];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let rows: Vec<&str> = stdout.lines().collect();
    assert_eq!(rows.len(), 3, "unexpected csv:\n{stdout}");
    assert!(rows[0].starts_with("date,totalSessions,totalMessages"));
    assert!(rows[1].starts_with("2026-10-17,"));
    assert!(rows[2].starts_with("2026-10-18,2,6,"));
}

#[test]
fn export_json_defaults_to_week_ending_on_latest_event() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = ["export", events.as_str(), "--format", "json"];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("export should print valid JSON");
    assert_eq!(value["period"]["start"], "2026-10-12");
    assert_eq!(value["period"]["end"], "2026-10-18");
    assert_eq!(value["summary"]["totalSessions"], 3);
    assert_eq!(value["summary"]["averageSatisfaction"], 4.5);
    assert_eq!(value["popularQuestions"][0]["count"], 2);
}

#[test]
fn dashboard_text_shows_trends() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = ["dashboard", events.as_str()];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Chat dashboard: 2026-10-18"), "got:\n{stdout}");
    assert!(stdout.contains("Sessions +100%"), "got:\n{stdout}");
    assert!(stdout.contains("Live sessions: 1"), "got:\n{stdout}");
    assert!(!stdout.contains("10.0.0."), "raw addresses must not be printed");
}

#[test]
fn insights_json_is_sorted_by_priority() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = ["insights", events.as_str(), "--days", "7", "--format", "json"];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("insights should print valid JSON");
    let insights = value.as_array().expect("insights should be an array");
    assert!(!insights.is_empty());
    assert_eq!(insights[0]["priority"], "high");
    assert_eq!(insights.last().unwrap()["priority"], "low");
}

#[test]
fn ask_answers_from_builtin_knowledge_base() {
    let env = CliTestEnv::new();
    let args = ["ask", "Скільки коштує абонемент?"];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("confidence 100%"), "got:\n{stdout}");
    assert!(stdout.contains("Вартість"), "got:\n{stdout}");
}

#[test]
fn ask_uses_knowledge_base_from_config() {
    let env = CliTestEnv::new();
    let kb_path = env.home.join("kb.toml");
    fs::write(
        &kb_path,
        "[[entries]]\nkeywords = [\"парковка\"]\nanswer = \"Безкоштовна парковка біля входу.\"\n",
    )
    .expect("failed to write knowledge base");
    env.write_config(&format!(
        "[faq]\nknowledge_base = {:?}\n",
        kb_path.to_string_lossy()
    ));

    let args = ["ask", "Чи є парковка?"];
    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Безкоштовна парковка"), "got:\n{stdout}");
}

#[test]
fn missing_event_log_fails_with_context() {
    let env = CliTestEnv::new();
    let missing = env.home.join("nope.jsonl");
    let missing = missing.to_string_lossy().into_owned();

    let output = run_report(&env, &["dashboard", missing.as_str()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read events"), "got:\n{stderr}");
}

#[test]
fn export_rejects_inverted_range() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let output = run_report(
        &env,
        &[
            "export",
            events.as_str(),
            "--from",
            "2026-10-18",
            "--to",
            "2026-10-01",
        ],
    );
    assert!(!output.status.success());
}

#[test]
fn insights_accept_windows_longer_than_the_calendar() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = [
        "insights",
        events.as_str(),
        "--days",
        "4000000000",
        "--format",
        "json",
    ];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("insights should print valid JSON");
    assert!(!value.as_array().expect("insights should be an array").is_empty());
}

#[test]
fn export_with_huge_day_window_covers_every_day() {
    let env = CliTestEnv::new();
    let events = env.events_arg();
    let args = ["export", events.as_str(), "--days", "4294967295", "--format", "csv"];

    let output = run_report(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 4, "unexpected csv:\n{stdout}");
}
