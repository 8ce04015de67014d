use serde::Serialize;

use super::Status;
use crate::config::HiveConfig;
use crate::probe::{Health, host_port, join_url, probe};
use crate::setup::steps::{HEARTBEAT_PATH, TAGS_PATH, daemon_pid};

/// Whether a background service answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCheck {
    pub status: Status,
    pub name: String,
    /// Address or PID the service was found at.
    pub endpoint: Option<String>,
    pub message: Option<String>,
}

/// Maps an HTTP/TCP probe to a service check.
pub fn service_from_health(name: &str, url: &str, health: Health) -> ServiceCheck {
    let endpoint = host_port(url);
    let (status, message) = match health {
        Health::Healthy | Health::PortOpen => (Status::Ok, None),
        Health::Unhealthy(code) => (Status::Warning, Some(format!("{name} returned status {code}"))),
        Health::Down => {
            let port = endpoint
                .as_deref()
                .and_then(|e| e.rsplit_once(':'))
                .map(|(_, port)| port.to_string())
                .unwrap_or_default();
            (Status::Missing, Some(format!("{name} not running on port {port}")))
        }
    };

    ServiceCheck {
        status,
        name: name.to_string(),
        endpoint,
        message,
    }
}

fn check_emacs_daemon() -> ServiceCheck {
    match daemon_pid().filter(|pid| pid != "nil") {
        Some(pid) => ServiceCheck {
            status: Status::Ok,
            name: "Emacs Daemon".to_string(),
            endpoint: Some(format!("PID {pid}")),
            message: None,
        },
        None => ServiceCheck {
            status: Status::Missing,
            name: "Emacs Daemon".to_string(),
            endpoint: None,
            message: Some("Emacs daemon not running".to_string()),
        },
    }
}

/// Checks the Emacs daemon, Chroma and Ollama.
pub fn check_services(config: &HiveConfig) -> Vec<ServiceCheck> {
    let chroma = join_url(&config.chroma_url, HEARTBEAT_PATH);
    let ollama = join_url(&config.ollama_url, TAGS_PATH);

    vec![
        check_emacs_daemon(),
        service_from_health("Chroma", &chroma, probe(&chroma)),
        service_from_health("Ollama", &ollama, probe(&ollama)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://localhost:8000/api/v2/heartbeat";

    #[test]
    fn test_healthy_service() {
        let check = service_from_health("Chroma", URL, Health::Healthy);
        assert_eq!(check.status, Status::Ok);
        assert_eq!(check.endpoint.as_deref(), Some("localhost:8000"));
        assert_eq!(check.message, None);
    }

    #[test]
    fn test_open_port_counts_as_running() {
        assert_eq!(service_from_health("Chroma", URL, Health::PortOpen).status, Status::Ok);
    }

    #[test]
    fn test_bad_status_is_warning() {
        let check = service_from_health("Chroma", URL, Health::Unhealthy(503));
        assert_eq!(check.status, Status::Warning);
        assert_eq!(check.message.as_deref(), Some("Chroma returned status 503"));
    }

    #[test]
    fn test_down_service_names_port() {
        let check = service_from_health("Ollama", "http://localhost:11434/api/tags", Health::Down);
        assert_eq!(check.status, Status::Missing);
        assert_eq!(
            check.message.as_deref(),
            Some("Ollama not running on port 11434")
        );
    }
}
