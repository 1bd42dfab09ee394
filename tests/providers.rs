//! Catalog clients against a local mock of the GitHub and HashiCorp APIs.
//!
//! The clients are blocking, so each test drives them from `spawn_blocking`
//! while the mock server runs on the async runtime.

use std::io::Write;

use jkl::config::{GithubConfig, HashicorpConfig};
use jkl::providers::{GithubRepo, HashicorpProduct, Provider};
use jkl::{Error, Jkl, JklConfig};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn github_config(server: &MockServer) -> GithubConfig {
    GithubConfig {
        api_host: server.uri(),
        token: None,
        ..GithubConfig::default()
    }
}

fn hashicorp_config(server: &MockServer) -> HashicorpConfig {
    HashicorpConfig {
        api_host: server.uri(),
        ..HashicorpConfig::default()
    }
}

fn tar_gz(name: &str, data: &[u8]) -> Vec<u8> {
    let mut builder = tar::Builder::new(Vec::new());
    let mut header = tar::Header::new_gnu();
    header.set_size(data.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder.append_data(&mut header, name, data).unwrap();
    let tar = builder.into_inner().unwrap();
    let mut gz = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    gz.write_all(&tar).unwrap();
    gz.finish().unwrap()
}

async fn mount_prme_repo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/repos/ivanfetch/prme"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"full_name": "ivanfetch/prme"})))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/ivanfetch/prme/releases"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "v0.0.7-rc1", "tag_name": "v0.0.7-rc1", "prerelease": true},
            {"name": "v0.0.6", "tag_name": "v0.0.6", "prerelease": false},
            {"name": "v0.0.5", "tag_name": "v0.0.5", "prerelease": false}
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/repos/ivanfetch/prme/releases/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"tag_name": "v0.0.6"})))
        .mount(server)
        .await;

    let asset_url = format!("{}/assets/prme", server.uri());
    let assets: Vec<_> = [
        "prme_0.0.6_Darwin_arm64.tar.gz",
        "prme_0.0.6_Darwin_x86_64.tar.gz",
        "prme_0.0.6_Linux_arm64.tar.gz",
        "prme_0.0.6_Linux_x86_64.tar.gz",
        "prme_0.0.6_Windows_x86_64.tar.gz",
    ]
    .iter()
    .map(|name| json!({"name": name, "url": asset_url}))
    .collect();
    Mock::given(method("GET"))
        .and(path("/repos/ivanfetch/prme/releases/tags/v0.0.6"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "assets": assets })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/assets/prme"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(tar_gz("prme", b"prme binary")))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread")]
async fn github_release_is_matched_and_downloaded() {
    let server = MockServer::start().await;
    mount_prme_repo(&server).await;
    let config = github_config(&server);

    let download = tokio::task::spawn_blocking(move || {
        let repo = GithubRepo::new("github.com/ivanfetch/prme", &config).unwrap();
        repo.download_release("0.0.6", "linux", "amd64")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(download.version, "v0.0.6");
    assert_eq!(download.tool_name, "prme");
    assert_eq!(
        download.path.file_name().unwrap().to_string_lossy(),
        "prme_0.0.6_Linux_x86_64.tar.gz"
    );
    assert!(download.path.starts_with(download.dir.path()));
}

#[tokio::test(flavor = "multi_thread")]
async fn github_versions_resolve_to_tags() {
    let server = MockServer::start().await;
    mount_prme_repo(&server).await;
    let config = github_config(&server);

    let (latest, partial, missing) = tokio::task::spawn_blocking(move || {
        let repo = GithubRepo::new("ivanfetch/prme", &config).unwrap();
        (
            repo.tag_for_version("latest").unwrap(),
            repo.tag_for_version("0.0").unwrap(),
            repo.tag_for_version("9.9.9"),
        )
    })
    .await
    .unwrap();

    assert_eq!(latest, "v0.0.6");
    assert_eq!(partial, "v0.0.6");
    assert!(matches!(missing, Err(Error::VersionNotFound { requested, .. }) if requested == "9.9.9"));
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_github_repository_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/nobody/nothing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let config = github_config(&server);

    let result = tokio::task::spawn_blocking(move || {
        let repo = GithubRepo::new("nobody/nothing", &config).unwrap();
        repo.download_release("", "linux", "amd64").map(|d| d.version)
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(Error::NoSuchSource { name, .. }) if name == "nobody/nothing"));
}

#[tokio::test(flavor = "multi_thread")]
async fn hashicorp_partial_version_walks_pages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["consul", "Terraform"])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/releases/terraform/1.2"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/releases/terraform"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"version": "1.3.1", "timestamp_created": "2022-10-01T00:00:00.000Z", "builds": []},
            {"version": "1.3.0", "timestamp_created": "2022-09-21T00:00:00.000Z", "builds": []}
        ])))
        .with_priority(5)
        .mount(&server)
        .await;
    let build_url = format!("{}/terraform/1.2.9/terraform_1.2.9_linux_amd64.zip", server.uri());
    Mock::given(method("GET"))
        .and(path("/v1/releases/terraform"))
        .and(query_param("after", "2022-09-21T00:00:00.000Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"version": "1.3.0-rc1", "timestamp_created": "2022-09-10T00:00:00.000Z", "is_prerelease": true, "builds": []},
            {"version": "1.2.9", "timestamp_created": "2022-09-07T00:00:00.000Z", "builds": [
                {"os": "darwin", "arch": "arm64", "url": "unused"},
                {"os": "linux", "arch": "amd64", "url": build_url}
            ]},
            {"version": "1.2.8", "timestamp_created": "2022-08-24T00:00:00.000Z", "builds": []}
        ])))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/terraform/1.2.9/terraform_1.2.9_linux_amd64.zip"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"not really a zip".to_vec()))
        .mount(&server)
        .await;
    let config = hashicorp_config(&server);

    let download = tokio::task::spawn_blocking(move || {
        let product = HashicorpProduct::new("terraform", &config).unwrap();
        product.download_release("1.2", "linux", "amd64")
    })
    .await
    .unwrap()
    .unwrap();

    assert_eq!(download.version, "1.2.9");
    assert_eq!(download.tool_name, "terraform");
    assert_eq!(
        download.path.file_name().unwrap().to_string_lossy(),
        "terraform_1.2.9_linux_amd64.zip"
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn hashicorp_latest_without_builds_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/releases/vault/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"version": "1.12.0", "builds": []})))
        .mount(&server)
        .await;
    let config = hashicorp_config(&server);

    let result = tokio::task::spawn_blocking(move || {
        HashicorpProduct::new("vault", &config)
            .unwrap()
            .release_for_version("")
            .map(|r| r.version)
    })
    .await
    .unwrap();

    assert!(matches!(result, Err(Error::Catalog(_))));
}

#[tokio::test(flavor = "multi_thread")]
async fn jkl_installs_github_tool_for_this_platform() {
    let server = MockServer::start().await;
    mount_prme_repo(&server).await;
    let home = tempfile::tempdir().unwrap();
    let executable = home.path().join("jkl");
    std::fs::write(&executable, "").unwrap();
    let mut config = JklConfig::load()
        .unwrap()
        .with_installs_dir(&home.path().join("installs").to_string_lossy())
        .unwrap()
        .with_shims_dir(&home.path().join("bin").to_string_lossy())
        .unwrap();
    config.executable = executable;
    config.github = github_config(&server);

    let (installed, listed) = tokio::task::spawn_blocking(move || {
        let jkl = Jkl::new(config);
        let installed = jkl.install("gh:ivanfetch/prme:0.0.6", None).unwrap();
        (installed, jkl.list_installed_versions("prme").unwrap())
    })
    .await
    .unwrap();

    assert_eq!(installed.tool, "prme");
    assert_eq!(installed.version, "v0.0.6");
    assert_eq!(std::fs::read(&installed.path).unwrap(), b"prme binary");
    assert_eq!(listed, vec!["v0.0.6"]);
}
