//! Integration tests for swcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use swcache::host::{CacheStorage, CacheStore, DiskCacheStorage, Request, Response};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn swcache() -> Command {
        cargo_bin_cmd!("swcache")
    }

    /// Write a config pointing at `scope` with storage inside `dir`
    fn write_config(dir: &Path, scope: &str) -> std::path::PathBuf {
        let path = dir.join("config.toml");
        let contents = format!(
            "[app]\nscope = \"{}\"\n\n[storage]\ncache_dir = \"{}\"\n\n[network]\ntimeout_secs = 5\n",
            scope,
            dir.join("caches").display()
        );
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Mount a fixed site on a mock server; unrouted paths answer 404
    async fn serve(routes: &[(&str, &str)]) -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in routes {
            Mock::given(method("GET"))
                .and(path(*route))
                .respond_with(ResponseTemplate::new(200).set_body_string(*body))
                .mount(&server)
                .await;
        }
        server
    }

    fn scope_of(server: &MockServer) -> String {
        format!("{}/", server.uri())
    }

    #[test]
    fn help_displays() {
        swcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline asset cache manager"));
    }

    #[test]
    fn version_displays() {
        swcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("swcache"));
    }

    #[test]
    fn config_show_defaults() {
        let temp = TempDir::new().unwrap();
        swcache()
            .args(["--config"])
            .arg(temp.path().join("missing.toml"))
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[app]"))
            .stdout(predicate::str::contains("fallback_version = \"0.72\""));
    }

    #[test]
    fn config_init_writes_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("swcache.toml");
        swcache()
            .arg("--config")
            .arg(&path)
            .args(["config", "init"])
            .assert()
            .success();
        assert!(path.exists());
    }

    #[test]
    fn list_empty() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "http://127.0.0.1:9/");
        swcache()
            .arg("--config")
            .arg(&config)
            .args(["list", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn fetch_offline_miss_fails() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "http://127.0.0.1:9/");
        swcache()
            .arg("--config")
            .arg(&config)
            .args(["fetch", "./index.html", "--offline"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("not cached in weight-converter-v0.72"));
    }

    #[tokio::test]
    async fn fetch_offline_serves_cached_entry() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "http://127.0.0.1:9/app/");

        let storage = DiskCacheStorage::new(temp.path().join("caches"));
        let store = storage.open("weight-converter-v0.72").await.unwrap();
        store
            .put(
                &Request::get("http://127.0.0.1:9/app/index.html"),
                Response::ok("<h1>cached</h1>"),
            )
            .await
            .unwrap();

        swcache()
            .arg("--config")
            .arg(&config)
            .args(["fetch", "./index.html", "--offline"])
            .assert()
            .success()
            .stdout("<h1>cached</h1>");
    }

    #[test]
    fn install_fails_when_assets_unreachable() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "http://127.0.0.1:9/");
        swcache()
            .arg("--config")
            .arg(&config)
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to populate cache weight-converter-v0.72"));
    }

    #[tokio::test]
    async fn install_and_activate_against_live_site() {
        let server = serve(&[
            ("/version.json", r#"{"version":"1.2"}"#),
            ("/index.html", "<html></html>"),
            ("/manifest.json", "{}"),
            ("/peter.jpeg", "jpeg"),
        ])
        .await;
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &scope_of(&server));

        let storage = DiskCacheStorage::new(temp.path().join("caches"));
        storage.open("weight-converter-v0.1").await.unwrap();

        swcache()
            .arg("--config")
            .arg(&config)
            .args(["install", "--activate"])
            .assert()
            .success()
            .stdout(predicate::str::contains("weight-converter-v1.2"));

        assert_eq!(
            storage.keys().await.unwrap(),
            vec!["weight-converter-v1.2"]
        );
        let store = storage.open("weight-converter-v1.2").await.unwrap();
        assert_eq!(store.requests().await.unwrap().len(), 4);
    }

    #[test]
    fn activate_dry_run_lists_stale() {
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), "http://127.0.0.1:9/");
        let caches = temp.path().join("caches");
        // Store directories are hex-encoded names
        std::fs::create_dir_all(caches.join(hex::encode("weight-converter-v0.1"))).unwrap();
        std::fs::create_dir_all(caches.join(hex::encode("weight-converter-v0.72"))).unwrap();

        swcache()
            .arg("--config")
            .arg(&config)
            .args(["activate", "--dry-run"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Would delete weight-converter-v0.1"))
            .stdout(predicate::str::contains("Would delete weight-converter-v0.72").not());

        assert!(caches.join(hex::encode("weight-converter-v0.1")).exists());
    }

    #[tokio::test]
    async fn fetch_mirrors_then_serves_offline() {
        let server = serve(&[("/app.js", "console.log('live')")]).await;
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &scope_of(&server));

        swcache()
            .arg("--config")
            .arg(&config)
            .args(["fetch", "./app.js"])
            .assert()
            .success()
            .stdout("console.log('live')");

        // Mirrored into the fallback-named store by the online fetch
        let storage = DiskCacheStorage::new(temp.path().join("caches"));
        assert_eq!(storage.keys().await.unwrap(), vec!["weight-converter-v0.72"]);

        swcache()
            .arg("--config")
            .arg(&config)
            .args(["fetch", "./app.js", "--offline"])
            .assert()
            .success()
            .stdout("console.log('live')");
    }

    #[tokio::test]
    async fn install_defaults_missing_version_field() {
        let server = serve(&[
            ("/version.json", "{}"),
            ("/index.html", "<html></html>"),
            ("/manifest.json", "{}"),
            ("/peter.jpeg", "jpeg"),
        ])
        .await;
        let temp = TempDir::new().unwrap();
        let config = write_config(temp.path(), &scope_of(&server));

        swcache()
            .arg("--config")
            .arg(&config)
            .arg("install")
            .assert()
            .success()
            .stdout(predicate::str::contains("weight-converter-v0.3"));
    }
}
