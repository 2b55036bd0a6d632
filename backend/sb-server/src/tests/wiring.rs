use crate::logger::log_file_path;
use crate::{attach_health_routes, instance_factory, registry_builder, shutdown};

use std::env;
use std::time::{Duration, Instant};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, none, ok, some};
use http::StatusCode;
use sb_config::Config;
use sb_core::{HandlerResponse, InstanceState, Orchestrator, Router, ServerType};
use serial_test::serial;
use tempfile::TempDir;

const TWO_HTTP_SERVERS: &str = r#"
    [servers.alpha]
    type = "http"
    bind_ip = "127.0.0.1"
    bind_port = 0

    [servers.beta]
    type = "http"
    bind_ip = "127.0.0.1"
    bind_port = 0
"#;

fn free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn slow_router(delay: Duration) -> Router {
    let mut router = Router::new();
    router
        .register_route("/slow", "GET", move |_| {
            std::thread::sleep(delay);
            HandlerResponse::text(StatusCode::OK, "done")
        })
        .unwrap();
    router
}

/// RAII guard for environment variables - automatically restores on drop
struct EnvGuard {
    key: &'static str,
    original: Option<String>,
}

impl EnvGuard {
    fn set(key: &'static str, value: &str) -> Self {
        unsafe {
            let original = env::var(key).ok();
            env::set_var(key, value);
            Self { key, original }
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        unsafe {
            match &self.original {
                Some(val) => env::set_var(self.key, val),
                None => env::remove_var(self.key),
            }
        }
    }
}

#[test]
fn given_binary_factory_when_inspected_then_http_supported() {
    assert_that!(instance_factory().supports(ServerType::Http), eq(true));
}

#[tokio::test]
async fn given_http_config_when_brought_up_with_health_routes_then_shutdown_stops_all() {
    // Given
    let config = Config::from_toml_str(TWO_HTTP_SERVERS).unwrap();
    let registry = registry_builder(&config).build(&config.servers).await.unwrap();
    let orchestrator = Orchestrator::new();

    // When
    let attached = attach_health_routes(&orchestrator, &registry).await;
    shutdown(&orchestrator, &registry, Some(Duration::from_secs(5))).await;

    // Then
    assert_that!(attached, ok(anything()));
    assert_that!(registry.len(), eq(2));
    for server in &registry {
        assert_that!(server.instance().state(), eq(InstanceState::Stopped));
    }
}

#[tokio::test]
async fn given_running_servers_when_shutdown_without_deadline_then_all_stopped() {
    // Given
    let config = Config::from_toml_str(TWO_HTTP_SERVERS).unwrap();
    let registry = registry_builder(&config).build(&config.servers).await.unwrap();
    let orchestrator = Orchestrator::new();
    orchestrator.run_all(&registry);

    // When
    shutdown(&orchestrator, &registry, None).await;

    // Then
    for server in &registry {
        assert_that!(server.is_running(), eq(false));
        assert_that!(server.instance().state().is_terminal(), eq(true));
    }
}

#[tokio::test]
async fn given_request_outlasting_deadline_when_shutdown_then_aborted_and_request_dropped() {
    // Given
    let port = free_port();
    let config = Config::from_toml_str(&format!(
        "[servers.alpha]\ntype = \"http\"\nbind_ip = \"127.0.0.1\"\nbind_port = {port}\n"
    ))
    .unwrap();
    let registry = registry_builder(&config).build(&config.servers).await.unwrap();
    let orchestrator = Orchestrator::new();
    orchestrator
        .attach_router(&registry, "alpha", slow_router(Duration::from_secs(2)))
        .await
        .unwrap();
    orchestrator.run_all(&registry);
    let request = tokio::spawn(async move {
        reqwest::get(format!("http://127.0.0.1:{port}/slow"))
            .await?
            .text()
            .await
    });
    tokio::time::sleep(Duration::from_millis(300)).await;

    // When
    let started = Instant::now();
    shutdown(&orchestrator, &registry, Some(Duration::from_millis(200))).await;
    let elapsed = started.elapsed();

    // Then
    assert_that!(elapsed < Duration::from_secs(1), eq(true));
    let alpha = registry.get("alpha").unwrap();
    assert_that!(alpha.instance().state(), eq(InstanceState::Aborted));
    let body = tokio::time::timeout(Duration::from_secs(1), request)
        .await
        .unwrap()
        .unwrap();
    assert_that!(body, err(anything()));
    let finished = tokio::time::timeout(Duration::from_secs(1), async {
        while alpha.is_running() {
            tokio::task::yield_now().await;
        }
    })
    .await;
    assert_that!(finished.is_ok(), eq(true));
}

#[test]
#[serial]
fn given_no_log_file_when_resolving_log_path_then_none() {
    let config = Config::default();

    assert_that!(log_file_path(&config).unwrap(), none());
}

#[test]
#[serial]
fn given_log_file_when_resolving_log_path_then_created_under_config_dir() {
    // Given
    let temp = TempDir::new().unwrap();
    let _guard = EnvGuard::set("SB_CONFIG_DIR", temp.path().to_str().unwrap());
    let mut config = Config::default();
    config.logging.file = Some("serverbox.log".to_string());
    config.logging.dir = "logs".to_string();

    // When
    let path = log_file_path(&config).unwrap();

    // Then
    let expected = temp.path().join("logs").join("serverbox.log");
    assert_that!(path, some(eq(&expected)));
    assert_that!(temp.path().join("logs").is_dir(), eq(true));
}
