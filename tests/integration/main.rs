//! Integration tests for modcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    const APP_MANIFEST: &str = r#"{"name": "app", "dependencies": {"left-pad": "^1.0.0"}}"#;

    /// Command isolated from the user's environment and global config
    fn modcache(sandbox: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("modcache");
        cmd.env_remove("MODCACHE_BUCKET")
            .env_remove("MODCACHE_UPLOAD_BUCKET")
            .env_remove("MODCACHE_CONFIG")
            .arg("--config")
            .arg(sandbox.join("no-global-config.toml"));
        cmd
    }

    struct Project {
        dir: TempDir,
    }

    impl Project {
        fn new(manifest: &str) -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("app")).unwrap();
            fs::create_dir_all(dir.path().join("store")).unwrap();
            fs::write(dir.path().join("app/package.json"), manifest).unwrap();
            Self { dir }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn app(&self) -> PathBuf {
            self.dir.path().join("app")
        }

        fn store(&self) -> PathBuf {
            self.dir.path().join("store")
        }

        fn set_installer(&self, script: &str) {
            let config = format!(
                "[tools]\ninstall_command = [\"sh\", \"-c\", {:?}]\n",
                script
            );
            fs::write(self.app().join(".modcache.toml"), config).unwrap();
        }

        fn run(&self) -> Command {
            let mut cmd = modcache(self.root());
            cmd.arg("--bucket")
                .arg("ci-cache")
                .arg("--local-store")
                .arg(self.store())
                .arg(self.app());
            cmd
        }

        fn archives(&self) -> Vec<PathBuf> {
            let dir = self.store().join("ci-cache/node_modules");
            match fs::read_dir(dir) {
                Ok(entries) => entries.map(|e| e.unwrap().path()).collect(),
                Err(_) => Vec::new(),
            }
        }
    }

    #[test]
    fn help_displays() {
        let sandbox = TempDir::new().unwrap();
        modcache(sandbox.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("--bucket"))
            .stdout(predicate::str::contains("--path"));
    }

    #[test]
    fn version_displays() {
        let sandbox = TempDir::new().unwrap();
        modcache(sandbox.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("modcache"));
    }

    #[test]
    fn missing_bucket_fails() {
        let project = Project::new(APP_MANIFEST);
        modcache(project.root())
            .arg(project.app())
            .assert()
            .failure()
            .stderr(predicate::str::contains("missing required bucket"));
    }

    #[test]
    fn print_key() {
        let project = Project::new(APP_MANIFEST);
        modcache(project.root())
            .args(["--bucket", "ci-cache", "--print-key"])
            .arg(project.app())
            .assert()
            .success()
            .stdout(predicate::str::starts_with("node_modules/app-"))
            .stdout(predicate::str::ends_with(".tar.gz\n"));
    }

    #[test]
    fn print_key_needs_no_bucket() {
        let project = Project::new(APP_MANIFEST);
        modcache(project.root())
            .arg("--print-key")
            .arg(project.app())
            .assert()
            .success()
            .stdout(predicate::str::starts_with("node_modules/app-"));
    }

    #[test]
    fn print_key_uses_prefix() {
        let project = Project::new(APP_MANIFEST);
        modcache(project.root())
            .args(["--bucket", "ci-cache", "--path", "deps/web", "--print-key"])
            .arg(project.app())
            .assert()
            .success()
            .stdout(predicate::str::starts_with("deps/web/app-"));
    }

    #[test]
    fn malformed_manifest_fails() {
        let project = Project::new("{ nope");
        project
            .run()
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load manifest"));
    }

    #[cfg(unix)]
    #[test]
    fn miss_publishes_then_hit_restores() {
        let project = Project::new(APP_MANIFEST);
        project.set_installer(
            "mkdir -p node_modules/left-pad && echo 'module.exports = 1;' > node_modules/left-pad/index.js",
        );

        project.run().assert().success();

        let archives = project.archives();
        assert_eq!(archives.len(), 1);
        let name = archives[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("app-"));
        assert!(name.ends_with(".tar.gz"));

        // Second run must come from the cache: the installer now fails
        fs::remove_dir_all(project.app().join("node_modules")).unwrap();
        project.set_installer("exit 1");

        project.run().assert().success();

        let restored =
            fs::read_to_string(project.app().join("node_modules/left-pad/index.js")).unwrap();
        assert_eq!(restored.trim(), "module.exports = 1;");
    }

    #[cfg(unix)]
    #[test]
    fn installer_failure_aborts_without_upload() {
        let project = Project::new(APP_MANIFEST);
        project.set_installer("exit 7");

        project
            .run()
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to install modules"))
            .stderr(predicate::str::contains("exit code: 7"));

        assert!(project.archives().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn upload_bucket_flag_routes_upload() {
        let project = Project::new(APP_MANIFEST);
        project.set_installer("mkdir -p node_modules/left-pad");

        project
            .run()
            .args(["--upload-bucket", "ci-cache-write"])
            .assert()
            .success();

        assert!(project.archives().is_empty());
        let written = project.store().join("ci-cache-write/node_modules");
        assert_eq!(fs::read_dir(written).unwrap().count(), 1);
    }
}
