//! Startup argument construction for the standalone mock engine.

use crate::config::{mappings_root, Mock, Proxy};

/// Builds the engine argument vector for one instance.
///
/// Replay mode serves the recorded mappings under the instance root;
/// record mode additionally proxies all traffic to the upstream and
/// persists the observed exchanges as new mappings. Port and root
/// directory are always supplied.
pub fn startup_args(proxy: &Proxy, mock: &Mock, record: bool) -> Vec<String> {
    let root = mappings_root(proxy, mock);
    let mut args = vec!["--port".to_string(), proxy.proxy_port.to_string()];
    if record {
        args.push("--proxy-all".to_string());
        args.push(proxy.original_url.clone());
        args.push("--record-mappings".to_string());
    }
    args.push("--root-dir".to_string());
    args.push(root.display().to_string());
    args.push("--verbose".to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Proxy, Mock) {
        let proxy = Proxy::new("proxy-7", "https://api.example.com", 8080);
        let mock = Mock::new(&proxy, "mock-42");
        (proxy, mock)
    }

    #[test]
    fn test_replay_args() {
        let (proxy, mock) = fixture();
        assert_eq!(
            startup_args(&proxy, &mock, false),
            vec!["--port", "8080", "--root-dir", "proxy-7/mock-42", "--verbose"]
        );
    }

    #[test]
    fn test_record_args() {
        let (proxy, mock) = fixture();
        assert_eq!(
            startup_args(&proxy, &mock, true),
            vec![
                "--port",
                "8080",
                "--proxy-all",
                "https://api.example.com",
                "--record-mappings",
                "--root-dir",
                "proxy-7/mock-42",
                "--verbose"
            ]
        );
    }
}
