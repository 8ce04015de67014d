use super::{CheckResult, Fix};
use crate::config::HiveConfig;
use crate::detect::Status;
use crate::probe::{Health, http_status, host_port, join_url, probe};
use crate::setup::steps::{HEARTBEAT_PATH, TAGS_PATH, daemon_pid};

/// Optional observability services: name and health URL.
pub const OBSERVABILITY: [(&str, &str); 3] = [
    ("Prometheus", "http://localhost:9090/-/healthy"),
    ("Grafana", "http://localhost:3000/api/health"),
    ("Loki", "http://localhost:3100/ready"),
];

const OBSERVABILITY_HINT: &str = "Optional: Deploy via hive-mcp observability stack";

pub fn emacs_check(pid: Option<&str>) -> CheckResult {
    let check = match pid.filter(|pid| !pid.is_empty() && *pid != "nil") {
        Some(pid) => CheckResult::new("Emacs Daemon", Status::Ok, format!("running (PID {pid})")),
        None => CheckResult::new("Emacs Daemon", Status::Error, "not running"),
    };
    check
        .with_hint("Start daemon: emacs --daemon")
        .with_fix(Fix::StartEmacsDaemon)
}

/// Maps a probe of a fixable HTTP service to a check.
pub fn http_service_check(name: &str, url: &str, health: Health) -> CheckResult {
    let addr = host_port(url).unwrap_or_else(|| url.to_string());
    let port = addr.rsplit_once(':').map_or("", |(_, port)| port);
    match health {
        Health::Healthy => CheckResult::new(name, Status::Ok, format!("healthy ({addr})")),
        Health::PortOpen => CheckResult::new(name, Status::Ok, format!("running on {addr}")),
        Health::Unhealthy(code) => {
            CheckResult::new(name, Status::Warning, format!("unhealthy (status {code})"))
        }
        Health::Down => CheckResult::new(name, Status::Error, format!("not running on port {port}")),
    }
}

pub fn check_services(config: &HiveConfig) -> Vec<CheckResult> {
    let chroma = join_url(&config.chroma_url, HEARTBEAT_PATH);
    let ollama = join_url(&config.ollama_url, TAGS_PATH);

    vec![
        emacs_check(daemon_pid().as_deref()),
        http_service_check("Chroma (Vector DB)", &chroma, probe(&chroma))
            .with_hint("Start Chroma: docker run -d -p 8000:8000 chromadb/chroma")
            .with_fix(Fix::StartChroma),
        http_service_check("Ollama (LLM)", &ollama, probe(&ollama))
            .with_hint("Start Ollama: ollama serve")
            .with_fix(Fix::StartOllama),
    ]
}

/// Maps an optional service's HTTP status to a check. Absence only warns.
pub fn observability_check(name: &str, url: &str, status: Option<u16>) -> CheckResult {
    let check = match status {
        Some(200) => {
            let addr = host_port(url).unwrap_or_else(|| url.to_string());
            CheckResult::new(name, Status::Ok, format!("healthy ({addr})"))
        }
        Some(_) => CheckResult::new(name, Status::Warning, "unhealthy"),
        None => CheckResult::new(name, Status::Warning, "not running (optional)"),
    };
    check.with_hint(OBSERVABILITY_HINT)
}

pub fn check_observability() -> Vec<CheckResult> {
    OBSERVABILITY
        .iter()
        .map(|(name, url)| observability_check(name, url, http_status(url).ok()))
        .collect()
}
