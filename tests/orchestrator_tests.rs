// Orchestrator tests against a scripted runner
// No brew, git, or network is touched; stages fail only when scripted to.


use tapcheck::tempdir::TempDirLocator;
use tapcheck::{ActionError, Orchestrator, ProcessResult, Stage};
use test_helpers::{ScriptedRunner, TestEnvironment};

fn orchestrator(env: &TestEnvironment, runner: ScriptedRunner) -> Orchestrator<ScriptedRunner> {
    Orchestrator::new(runner, env.config())
        .with_locator(TempDirLocator::new(vec![env.temp_root.clone()]))
}

#[tokio::test]
async fn test_full_run_succeeds() {
    let env = TestEnvironment::new();
    env.keep_tmp_dir("hello_world-build");
    env.keep_tmp_dir("hello_world-test");

    let mut orch = orchestrator(&env, env.runner());
    let report = orch.run().await.unwrap();

    assert_eq!(report.formula, "hello_world");
    assert!(report.validated);
    assert!(report.failures.is_empty());
    assert!(!report.error);
    assert!(report.clone().into_result().is_ok());

    for copy in env.staged_copies() {
        assert!(copy.is_file(), "missing {}", copy.display());
    }

    let outputs = env.outputs();
    assert!(outputs.contains("buildpath<<EOF\n"));
    assert!(outputs.contains("testpath<<EOF\n"));
    assert!(!outputs.contains("homebrew_core_branch"));
}

#[tokio::test]
async fn test_stage_order() {
    let env = TestEnvironment::new();
    let mut orch = orchestrator(&env, env.runner());
    orch.run().await.unwrap();

    let runner = orch.runner();
    let order = [
        runner.position(&["brew", "--version"]),
        runner.position(&["brew", "developer", "on"]),
        runner.position(&["brew", "tap-new"]),
        runner.position(&["brew", "update"]),
        runner.position(&["brew", "upgrade"]),
        runner.position(&["brew", "config"]),
        runner.position(&["brew", "doctor"]),
        runner.position(&["brew", "audit"]),
        runner.position(&["brew", "install"]),
        runner.position(&["brew", "test"]),
    ];
    let order: Vec<usize> = order.into_iter().map(|p| p.unwrap()).collect();
    let mut sorted = order.clone();
    sorted.sort();
    assert_eq!(order, sorted);
}

#[tokio::test]
async fn test_audit_failure_is_tracked_and_run_continues() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "audit"]);

    let mut orch = orchestrator(&env, runner);
    let report = orch.run().await.unwrap();

    assert_eq!(report.failures, vec![Stage::Audit]);
    assert!(report.error);
    assert!(!report.succeeded());
    assert!(orch.runner().was_called(&["brew", "install"]));
    assert!(orch.runner().was_called(&["brew", "test"]));

    match report.into_result().unwrap_err() {
        ActionError::ChecksFailed { failures } => assert_eq!(failures, vec![Stage::Audit]),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_all_tracked_stages_fail_in_order() {
    let env = TestEnvironment::new();
    let runner = env
        .runner()
        .fail(&["brew", "audit"])
        .fail(&["brew", "install"])
        .fail(&["brew", "test"]);

    let mut orch = orchestrator(&env, runner);
    let report = orch.run().await.unwrap();

    assert_eq!(
        report.failures,
        vec![Stage::Audit, Stage::Install, Stage::Test]
    );
    assert!(!report.succeeded());
}

#[tokio::test]
async fn test_missing_toolchain_is_fatal() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "--version"]);

    let mut orch = orchestrator(&env, runner);
    let err = orch.run().await.unwrap_err();

    assert!(matches!(err, ActionError::ToolchainMissing));
    assert!(orch.state().failures.is_empty());
    assert_eq!(orch.runner().calls().len(), 1);
    for copy in env.staged_copies() {
        assert!(!copy.exists());
    }
}

#[tokio::test]
async fn test_skip_validation_stages_only() {
    let env = TestEnvironment::new();
    let mut config = env.config();
    config.validate = false;

    let mut orch = Orchestrator::new(env.runner(), config);
    let report = orch.run().await.unwrap();

    assert!(!report.validated);
    assert!(report.succeeded());
    for stage in ["update", "upgrade", "config", "doctor", "audit", "install", "test"] {
        assert!(
            !orch.runner().was_called(&["brew", stage]),
            "brew {stage} should not run"
        );
    }
    for copy in env.staged_copies() {
        assert!(copy.is_file());
    }
}

#[tokio::test]
async fn test_update_failure_is_fatal() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "update"]);

    let mut orch = orchestrator(&env, runner);
    let err = orch.run().await.unwrap_err();

    assert!(matches!(err, ActionError::UpgradeFailed));
    assert!(!orch.runner().was_called(&["brew", "upgrade"]));
    assert!(!orch.runner().was_called(&["brew", "audit"]));
}

#[tokio::test]
async fn test_upgrade_failure_is_fatal() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "upgrade"]);

    let mut orch = orchestrator(&env, runner);
    let err = orch.run().await.unwrap_err();

    assert!(matches!(err, ActionError::UpgradeFailed));
    assert!(orch.state().failures.is_empty());
}

#[tokio::test]
async fn test_config_failure_is_fatal() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "config"]);

    let mut orch = orchestrator(&env, runner);
    let err = orch.run().await.unwrap_err();

    assert!(matches!(err, ActionError::DebugFailed));
    assert!(!orch.runner().was_called(&["brew", "audit"]));
}

#[tokio::test]
async fn test_doctor_failure_is_ignored() {
    let env = TestEnvironment::new();
    env.keep_tmp_dir("hello_world-a");
    env.keep_tmp_dir("hello_world-b");
    let runner = env.runner().fail(&["brew", "doctor"]);

    let mut orch = orchestrator(&env, runner);
    let report = orch.run().await.unwrap();

    assert!(report.succeeded());
    assert!(!report.error);
}

#[tokio::test]
async fn test_untracked_failure_fails_run_with_empty_failures() {
    let env = TestEnvironment::new();
    let runner = env.runner().fail(&["brew", "developer", "on"]);

    let mut orch = orchestrator(&env, runner);
    let report = orch.run().await.unwrap();

    assert!(report.failures.is_empty());
    assert!(report.error);
    assert!(!report.succeeded());
}

#[tokio::test]
async fn test_invalid_formula_is_fatal_without_side_effects() {
    let env = TestEnvironment::new();
    let readme = env.temp_dir.path().join("README.md");
    std::fs::write(&readme, "# readme").unwrap();
    let mut config = env.config();
    config.formula_file = readme;

    let mut orch = Orchestrator::new(env.runner(), config);
    let err = orch.run().await.unwrap_err();

    assert!(matches!(err, ActionError::NotRubyFile(_)));
    assert!(err.is_input_error());
    assert!(!orch.runner().was_called(&["brew", "developer"]));
    assert!(!env.workspace.join("homebrew-release-action").exists());
}

#[tokio::test]
async fn test_install_runs_without_dependents_check() {
    let env = TestEnvironment::new();
    let mut orch = orchestrator(&env, env.runner());
    orch.run().await.unwrap();

    let install = orch
        .runner()
        .calls()
        .into_iter()
        .find(|c| c.args.first().map(String::as_str) == Some("install"))
        .unwrap();
    assert!(
        install
            .env
            .contains(&("HOMEBREW_NO_INSTALLED_DEPENDENTS_CHECK".to_string(), "1".to_string()))
    );
    assert_eq!(
        install.args.last().map(String::as_str),
        Some("homebrew-release-action/homebrew-test/hello_world")
    );
}

#[tokio::test]
async fn test_build_and_test_paths_are_distinct() {
    let env = TestEnvironment::new();
    let first = env.keep_tmp_dir("hello_world-20241018-1-abc");
    let second = env.keep_tmp_dir("hello_world-20241018-2-def");

    let mut orch = orchestrator(&env, env.runner());
    orch.run().await.unwrap();

    let outputs = env.outputs();
    let build = format!("buildpath<<EOF\n{}\nEOF\n", first.display());
    let test = format!("testpath<<EOF\n{}\nEOF\n", second.display());
    assert!(outputs.contains(&build), "outputs: {outputs}");
    assert!(outputs.contains(&test), "outputs: {outputs}");
    assert_eq!(orch.state().temp_dirs.len(), 2);
}

#[tokio::test]
async fn test_missing_temp_dirs_do_not_fail_run() {
    let env = TestEnvironment::new();
    let mut orch = orchestrator(&env, env.runner());
    let report = orch.run().await.unwrap();

    assert!(report.succeeded());
    assert!(!env.outputs().contains("buildpath"));
    assert!(!env.outputs().contains("testpath"));
}

#[tokio::test]
async fn test_missing_brew_repository_skips_brew_tap_copy() {
    let env = TestEnvironment::new();
    let runner = ScriptedRunner::new().respond(
        &["brew", "--repository"],
        ProcessResult::failure(1),
    );

    let mut orch = orchestrator(&env, runner);
    let report = orch.run().await.unwrap();

    // `brew --repository` is ignorable
    assert!(!report.error);
    let copies = env.staged_copies();
    assert!(copies[0].is_file());
    assert!(copies[1].is_file());
    assert!(!copies[2].exists());
}

#[tokio::test]
async fn test_repeated_runs_do_not_share_state() {
    let env = TestEnvironment::new();

    let mut failing = orchestrator(&env, env.runner().fail(&["brew", "audit"]));
    assert!(!failing.run().await.unwrap().succeeded());

    let mut passing = orchestrator(&env, env.runner());
    let report = passing.run().await.unwrap();
    assert!(report.succeeded());
    assert!(report.failures.is_empty());
}
