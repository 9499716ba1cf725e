use std::process::{Child, Command, Stdio};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::StatusCode;

static SERVER: OnceLock<TestServer> = OnceLock::new();

/// Session secret shared between the spawned server and tokens forged in
/// tests. Keep in sync with `test_env`.
pub const TEST_SESSION_SECRET: &str = "integration-test-secret";

/// Admin address granted the admin flag at first login in tests
pub const TEST_ADMIN_EMAIL: &str = "admin@crm.test";

/// Unroutable analytics endpoint so proxy calls fail fast with a
/// connection error instead of hanging
pub const TEST_AI_SERVICE_URL: &str = "http://127.0.0.1:59999";

pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    #[allow(dead_code)]
    child: Child,
}

impl TestServer {
    fn spawn() -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Spawn the already-built binary to keep start fast during tests
        // Assumes debug profile; adjust if you run tests with --release
        let mut cmd = Command::new("target/debug/crm-api");
        cmd.env("PORT", port.to_string())
            .envs(test_env())
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());

        // Inherit environment so the server can see DATABASE_URL from .env
        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { port, base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                // Ready on any health answer; degraded still means serving
                if resp.status() == StatusCode::OK
                    || resp.status() == StatusCode::SERVICE_UNAVAILABLE
                {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!(
            "server did not become ready on {} within {:?}",
            self.base_url,
            timeout
        )
    }
}

/// Deterministic test configuration for the spawned server
pub fn test_env() -> Vec<(&'static str, &'static str)> {
    vec![
        ("SESSION_SECRET", TEST_SESSION_SECRET),
        ("GOOGLE_CLIENT_ID", "test-client-id"),
        ("GOOGLE_CLIENT_SECRET", "test-client-secret"),
        ("CRM_ADMIN_EMAILS", TEST_ADMIN_EMAIL),
        ("AI_SERVICE_URL", TEST_AI_SERVICE_URL),
    ]
}

pub async fn ensure_server() -> Result<&'static TestServer> {
    let server = SERVER.get_or_init(|| TestServer::spawn().expect("failed to spawn server binary"));
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that does not follow redirects, for asserting on 302 responses
pub fn no_redirect_client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client")
}
