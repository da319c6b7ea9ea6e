use super::*;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{anyhow, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use termsetup_core::{
    default_resources, ConfigResource, EscalationTool, PackageCommand, Packager, SetupContext,
    TERMINAL_PACKAGE,
};

use crate::fetch::sha256_hex;
use crate::fs_utils::copy_dir_recursive;

const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

static TEST_HOME_COUNTER: AtomicU64 = AtomicU64::new(0);

struct ScriptedHost {
    installed: bool,
    uninstall_answer: bool,
    fail_fetch_of: Option<String>,
    fail_package_commands: bool,
    commands: Vec<String>,
    fetched_urls: Vec<String>,
    prompts: Vec<String>,
    steps: Vec<String>,
}

impl ScriptedHost {
    fn new(installed: bool) -> Self {
        Self {
            installed,
            uninstall_answer: false,
            fail_fetch_of: None,
            fail_package_commands: false,
            commands: Vec::new(),
            fetched_urls: Vec::new(),
            prompts: Vec::new(),
            steps: Vec::new(),
        }
    }
}

impl SetupHost for ScriptedHost {
    fn package_installed(&mut self, _package: &str) -> bool {
        self.installed
    }

    fn run_package_command(
        &mut self,
        command: &PackageCommand,
        context_message: &str,
    ) -> Result<()> {
        self.commands.push(command.to_string());
        if self.fail_package_commands {
            return Err(anyhow!("{context_message}: status=exit status: 1"));
        }
        if command.args.iter().any(|arg| arg == "-S" || arg == "install") {
            self.installed = true;
        }
        if command.args.iter().any(|arg| arg == "-R" || arg == "remove") {
            self.installed = false;
        }
        Ok(())
    }

    fn fetch(&mut self, resource: &ConfigResource, destination: &Path) -> Result<FetchedResource> {
        self.fetched_urls.push(resource.url.clone());
        if self.fail_fetch_of.as_deref() == Some(resource.file_name.as_str()) {
            return Err(anyhow!("failed to request {}", resource.url));
        }
        let payload = format!("# fetched {}\n", resource.file_name);
        persist_resource(resource, destination, payload.as_bytes())
    }

    fn confirm_uninstall(&mut self, package: &str) -> Result<bool> {
        self.prompts.push(package.to_string());
        Ok(self.uninstall_answer)
    }

    fn step_started(&mut self, step: &PlannedStep) {
        self.steps.push(step.describe());
    }
}

fn build_test_home_path(nanos: u128) -> PathBuf {
    let mut path = std::env::temp_dir();
    let sequence = TEST_HOME_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.push(format!(
        "termsetup-installer-tests-{}-{}-{}",
        std::process::id(),
        nanos,
        sequence
    ));
    path
}

fn test_context() -> SetupContext {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("system time")
        .as_nanos();
    let home = build_test_home_path(nanos);
    fs::create_dir_all(home.join(".config")).expect("must create config home");
    SetupContext {
        home,
        packager: Packager::Pacman,
        escalation: EscalationTool::Program("sudo".to_string()),
        package: TERMINAL_PACKAGE.to_string(),
        resources: default_resources(),
    }
}

fn seed_live_config(context: &SetupContext) -> BTreeMap<PathBuf, Vec<u8>> {
    let live = context.layout().live_dir();
    fs::create_dir_all(live.join("themes")).expect("must create live dir");
    fs::write(live.join("alacritty.toml"), b"[font]\nsize = 11\n").expect("must write config");
    fs::write(live.join("themes/dark.toml"), b"[colors]\n").expect("must write theme");
    read_tree(&live)
}

fn read_tree(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    let mut files = BTreeMap::new();
    collect_tree(root, root, &mut files);
    files
}

fn collect_tree(root: &Path, dir: &Path, files: &mut BTreeMap<PathBuf, Vec<u8>>) {
    for entry in fs::read_dir(dir).expect("must read dir") {
        let path = entry.expect("must read entry").path();
        if path.is_dir() {
            collect_tree(root, &path, files);
        } else {
            let rel = path.strip_prefix(root).expect("under root").to_path_buf();
            files.insert(rel, fs::read(&path).expect("must read file"));
        }
    }
}

fn cleanup(context: &SetupContext) {
    let _ = fs::remove_dir_all(&context.home);
}

#[test]
fn build_test_home_path_disambiguates_same_timestamp_calls() {
    let first = build_test_home_path(42);
    let second = build_test_home_path(42);
    assert_ne!(
        first, second,
        "installer test homes must remain unique when timestamp granularity is coarse"
    );
}

#[test]
fn install_on_fresh_system_installs_package_and_fetches_exactly_two_files() {
    let context = test_context();
    let mut host = ScriptedHost::new(false);

    let outcome = install(&context, &mut host).expect("install must succeed");

    assert_eq!(
        host.commands,
        vec!["sudo pacman -S --needed --noconfirm alacritty"]
    );
    assert_eq!(outcome.package, PackageAction::Installed);
    assert_eq!(outcome.backup, BackupAction::NotNeeded);
    assert!(!context.layout().backup_dir().exists(), "no backup expected");

    let files = read_tree(&context.layout().live_dir());
    let names = files.keys().cloned().collect::<Vec<_>>();
    assert_eq!(
        names,
        vec![PathBuf::from("alacritty.toml"), PathBuf::from("nordic.toml")]
    );
    assert_eq!(outcome.fetched.len(), 2);
    assert_eq!(
        outcome.fetched[1].sha256,
        sha256_hex(b"# fetched nordic.toml\n")
    );

    cleanup(&context);
}

#[test]
fn install_backs_up_existing_config_byte_for_byte_before_overwriting() {
    let context = test_context();
    let original = seed_live_config(&context);
    let mut host = ScriptedHost::new(true);

    let outcome = install(&context, &mut host).expect("install must succeed");

    assert!(host.commands.is_empty(), "installed package must not be reinstalled");
    assert_eq!(
        outcome.backup,
        BackupAction::Created(context.layout().backup_dir())
    );
    assert_eq!(read_tree(&context.layout().backup_dir()), original);

    let live = read_tree(&context.layout().live_dir());
    assert_eq!(
        live.get(Path::new("alacritty.toml")).map(Vec::as_slice),
        Some(b"# fetched alacritty.toml\n".as_slice()),
        "fetched file must overwrite the old one"
    );
    assert!(
        live.contains_key(Path::new("themes/dark.toml")),
        "unrelated live files are left in place"
    );

    cleanup(&context);
}

#[test]
fn revert_restores_pre_run_config_and_removes_backup() {
    let context = test_context();
    let original = seed_live_config(&context);
    let mut host = ScriptedHost::new(false);
    install(&context, &mut host).expect("install must succeed");

    let outcome = revert(&context, &mut host).expect("revert must succeed");

    assert_eq!(
        outcome,
        RevertOutcome::Restored {
            live: context.layout().live_dir(),
            uninstall: UninstallDecision::Kept,
        }
    );
    assert_eq!(read_tree(&context.layout().live_dir()), original);
    assert!(!context.layout().backup_dir().exists());
    assert_eq!(host.prompts, vec!["alacritty"]);
    assert_eq!(host.commands.len(), 1, "declined prompt must not remove");

    cleanup(&context);
}

#[test]
fn revert_without_backup_changes_nothing() {
    let context = test_context();
    let original = seed_live_config(&context);
    let mut host = ScriptedHost::new(true);

    let outcome = revert(&context, &mut host).expect("revert must succeed");

    assert_eq!(
        outcome,
        RevertOutcome::NothingToRevert {
            backup: context.layout().backup_dir()
        }
    );
    assert_eq!(read_tree(&context.layout().live_dir()), original);
    assert!(host.prompts.is_empty(), "no prompt when nothing was reverted");
    assert!(host.commands.is_empty());
    assert_eq!(host.steps.len(), 1);
    assert!(host.steps[0].contains("nothing to revert"));

    cleanup(&context);
}

#[test]
fn revert_with_affirmative_answer_removes_package() {
    let context = test_context();
    seed_live_config(&context);
    let mut host = ScriptedHost::new(true);
    install(&context, &mut host).expect("install must succeed");
    host.uninstall_answer = true;

    let outcome = revert(&context, &mut host).expect("revert must succeed");

    assert_eq!(
        outcome,
        RevertOutcome::Restored {
            live: context.layout().live_dir(),
            uninstall: UninstallDecision::Removed,
        }
    );
    assert_eq!(host.commands, vec!["sudo pacman -R --noconfirm alacritty"]);
    assert!(!host.installed);

    cleanup(&context);
}

#[test]
fn revert_skips_prompt_when_package_is_absent() {
    let context = test_context();
    fs::create_dir_all(context.layout().backup_dir()).expect("must create backup");
    fs::write(context.layout().backup_dir().join("alacritty.toml"), b"old")
        .expect("must write backup file");
    let mut host = ScriptedHost::new(false);

    let outcome = revert(&context, &mut host).expect("revert must succeed");

    assert_eq!(
        outcome,
        RevertOutcome::Restored {
            live: context.layout().live_dir(),
            uninstall: UninstallDecision::NotInstalled,
        }
    );
    assert!(host.prompts.is_empty());
    assert_eq!(
        fs::read(context.layout().resource_path("alacritty.toml")).expect("restored file"),
        b"old"
    );

    cleanup(&context);
}

#[test]
fn second_run_skips_install_refetches_and_keeps_first_backup() {
    let context = test_context();
    let original = seed_live_config(&context);
    let mut host = ScriptedHost::new(false);
    install(&context, &mut host).expect("first run must succeed");

    let outcome = install(&context, &mut host).expect("second run must succeed");

    assert_eq!(outcome.package, PackageAction::AlreadyInstalled);
    assert_eq!(host.commands.len(), 1, "install runs only once");
    assert_eq!(
        outcome.backup,
        BackupAction::KeptExisting(context.layout().backup_dir())
    );
    assert_eq!(
        read_tree(&context.layout().backup_dir()),
        original,
        "existing backup must not mix with the current live config"
    );
    assert_eq!(host.fetched_urls.len(), 4, "config is fetched on every run");

    cleanup(&context);
}

#[test]
fn failed_package_install_aborts_before_touching_config() {
    let context = test_context();
    let original = seed_live_config(&context);
    let mut host = ScriptedHost::new(false);
    host.fail_package_commands = true;

    let err = install(&context, &mut host).expect_err("install must fail");

    assert!(err.to_string().contains("failed to install alacritty"), "{err}");
    assert!(!context.layout().backup_dir().exists());
    assert_eq!(read_tree(&context.layout().live_dir()), original);
    assert!(host.fetched_urls.is_empty());

    cleanup(&context);
}

#[test]
fn failed_fetch_aborts_and_leaves_earlier_files() {
    let context = test_context();
    let mut host = ScriptedHost::new(true);
    host.fail_fetch_of = Some("nordic.toml".to_string());

    let err = install(&context, &mut host).expect_err("install must fail");

    assert!(err.to_string().contains("nordic.toml"), "{err}");
    let names = read_tree(&context.layout().live_dir())
        .into_keys()
        .collect::<Vec<_>>();
    assert_eq!(names, vec![PathBuf::from("alacritty.toml")]);

    cleanup(&context);
}

#[test]
fn steps_are_announced_before_they_run() {
    let context = test_context();
    seed_live_config(&context);
    let mut host = ScriptedHost::new(false);

    install(&context, &mut host).expect("install must succeed");

    assert_eq!(host.steps.len(), 5);
    assert!(host.steps[0].starts_with("install alacritty: sudo pacman"));
    assert!(host.steps[1].starts_with("back up "));
    assert!(host.steps[2].starts_with("create "));
    assert!(host.steps[3].starts_with("fetch https://"));
    assert!(host.steps[4].contains("nordic.toml"));

    cleanup(&context);
}

#[test]
fn plan_install_follows_observed_state() {
    let context = test_context();
    let state = SetupState {
        package_installed: true,
        live_config_present: false,
        backup_present: true,
    };

    let steps = plan_install(&context, &state);

    assert_eq!(
        steps[0],
        PlannedStep::PackageAlreadyInstalled {
            package: "alacritty".to_string()
        }
    );
    assert_eq!(
        steps[1],
        PlannedStep::EnsureConfigDir {
            path: context.layout().live_dir()
        }
    );
    assert_eq!(steps.len(), 4, "no backup step without a live config");

    cleanup(&context);
}

#[test]
fn plan_revert_skips_removal_when_live_config_is_missing() {
    let context = test_context();
    let state = SetupState {
        package_installed: true,
        live_config_present: false,
        backup_present: true,
    };

    let steps = plan_revert(&context, &state);

    assert_eq!(steps.len(), 2);
    assert!(matches!(steps[0], PlannedStep::RestoreBackup { .. }));
    assert_eq!(
        steps[1].describe(),
        "offer to uninstall alacritty: sudo pacman -R --noconfirm alacritty"
    );

    cleanup(&context);
}

#[test]
fn inspect_state_reports_directories_and_package() {
    let context = test_context();
    seed_live_config(&context);
    let mut host = ScriptedHost::new(true);

    let state = inspect_state(&context, &mut host);

    assert_eq!(
        state,
        SetupState {
            package_installed: true,
            live_config_present: true,
            backup_present: false,
        }
    );

    cleanup(&context);
}

#[test]
fn persist_resource_replaces_destination_and_leaves_no_part_file() {
    let context = test_context();
    let live = context.layout().live_dir();
    fs::create_dir_all(&live).expect("must create live dir");
    let destination = live.join("alacritty.toml");
    fs::write(&destination, b"stale").expect("must seed destination");
    let resource = ConfigResource {
        file_name: "alacritty.toml".to_string(),
        url: "https://example.test/alacritty.toml".to_string(),
    };

    let fetched = persist_resource(&resource, &destination, b"").expect("must persist");

    assert_eq!(fetched.bytes, 0);
    assert_eq!(fetched.sha256, EMPTY_SHA256);
    assert_eq!(fs::read(&destination).expect("must read"), b"");
    assert!(!live.join("alacritty.toml.part").exists());

    cleanup(&context);
}

#[cfg(unix)]
#[test]
fn copy_dir_recursive_preserves_symlinks() {
    let context = test_context();
    let live = context.layout().live_dir();
    fs::create_dir_all(&live).expect("must create live dir");
    fs::write(live.join("base.toml"), b"base").expect("must write base");
    std::os::unix::fs::symlink("base.toml", live.join("current.toml")).expect("must link");

    let backup = context.layout().backup_dir();
    copy_dir_recursive(&live, &backup).expect("must copy");

    let link = fs::read_link(backup.join("current.toml")).expect("must stay a symlink");
    assert_eq!(link, Path::new("base.toml"));

    cleanup(&context);
}

#[test]
fn persist_resource_removes_part_file_when_rename_fails() {
    let context = test_context();
    let live = context.layout().live_dir();
    let destination = live.join("nordic.toml");
    fs::create_dir_all(destination.join("nested")).expect("must block destination with a dir");
    let resource = ConfigResource {
        file_name: "nordic.toml".to_string(),
        url: "https://example.test/nordic.toml".to_string(),
    };

    let err = persist_resource(&resource, &destination, b"data")
        .expect_err("rename over a directory must fail");

    assert!(
        err.to_string().contains("failed to move download into place"),
        "{err}"
    );
    assert!(!live.join("nordic.toml.part").exists());
    assert!(destination.is_dir());

    cleanup(&context);
}

#[test]
fn sha256_hex_is_lowercase_hex() {
    assert_eq!(sha256_hex(b""), EMPTY_SHA256);
    assert_eq!(
        sha256_hex(b"abc"),
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
}

fn start_one_shot_http_server(
    status_line: &'static str,
    payload: Vec<u8>,
) -> (String, std::thread::JoinHandle<()>) {
    let listener =
        std::net::TcpListener::bind("127.0.0.1:0").expect("must bind one-shot test server");
    let address = listener
        .local_addr()
        .expect("must read one-shot test server address");
    let url = format!("http://{address}/nordic.toml");
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().expect("must accept test client");
        let mut request_buffer = [0_u8; 1024];
        let _ = std::io::Read::read(&mut stream, &mut request_buffer);

        std::io::Write::write_all(
            &mut stream,
            format!(
                "HTTP/1.1 {status_line}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                payload.len()
            )
            .as_bytes(),
        )
        .expect("must write test response headers");
        std::io::Write::write_all(&mut stream, &payload)
            .expect("must write test response payload");
        std::io::Write::flush(&mut stream).expect("must flush test response payload");
    });

    (url, handle)
}

#[test]
fn http_fetcher_writes_body_and_reports_digest() {
    let context = test_context();
    let live = context.layout().live_dir();
    fs::create_dir_all(&live).expect("must create live dir");
    let destination = live.join("nordic.toml");
    let payload = b"[colors.primary]\nbackground = \"#242933\"\n".to_vec();
    let (url, server) = start_one_shot_http_server("200 OK", payload.clone());
    let resource = ConfigResource {
        file_name: "nordic.toml".to_string(),
        url,
    };

    let fetched = HttpFetcher::new()
        .expect("must build client")
        .fetch(&resource, &destination)
        .expect("must fetch from local server");
    server.join().expect("server thread must finish");

    assert_eq!(fetched.file_name, "nordic.toml");
    assert_eq!(fetched.path, destination);
    assert_eq!(fetched.bytes, payload.len() as u64);
    assert_eq!(fetched.sha256, sha256_hex(&payload));
    assert_eq!(fs::read(&destination).expect("must read fetched file"), payload);
    assert!(!live.join("nordic.toml.part").exists());

    cleanup(&context);
}

#[test]
fn http_fetcher_rejects_error_status_without_writing_files() {
    let context = test_context();
    let live = context.layout().live_dir();
    fs::create_dir_all(&live).expect("must create live dir");
    let destination = live.join("nordic.toml");
    let (url, server) = start_one_shot_http_server("404 Not Found", b"missing".to_vec());
    let resource = ConfigResource {
        file_name: "nordic.toml".to_string(),
        url,
    };

    let err = HttpFetcher::new()
        .expect("must build client")
        .fetch(&resource, &destination)
        .expect_err("404 must fail");
    server.join().expect("server thread must finish");

    let rendered = format!("{err:#}");
    assert!(rendered.contains("remote host rejected"), "{rendered}");
    assert!(rendered.contains("404"), "{rendered}");
    assert!(!destination.exists());
    assert!(!live.join("nordic.toml.part").exists());

    cleanup(&context);
}
