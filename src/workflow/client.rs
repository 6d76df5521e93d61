//! The CI provider's REST API.

use std::time::Duration;

use reqwest::{
    StatusCode,
    blocking::{Client, RequestBuilder, Response},
    header,
};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

#[cfg(test)]
use mockall::automock;

use crate::{
    env::ApiConfig,
    framework::State,
    workflow::{
        WorkflowRun, WorkflowRuns,
        artifact::{Artifact, Artifacts},
    },
};

/// The read-only endpoints of the CI provider used by the bootstrap.
#[cfg_attr(test, automock)]
pub trait CiClient {
    /// Lists the recent workflow runs of the repository.
    fn list_runs(&self) -> State<Vec<WorkflowRun>>;

    /// Lists the artifacts at a run's `artifacts_url`.
    fn list_artifacts(&self, url: &str) -> State<Vec<Artifact>>;

    /// Downloads the zip archive of an artifact.
    fn download(&self, url: &str) -> State<Vec<u8>>;
}

/// A [`CiClient`] for the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    runs_url: String,
    token: String,
}

impl GitHubClient {
    /// Creates a [`GitHubClient`] for the repository in `api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client can't be built.
    pub fn new(api: &ApiConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .user_agent(concat!("lief-ci/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            runs_url: format!(
                "{}/repos/{}/actions/runs",
                api.base_url.trim_end_matches('/'),
                api.repository
            ),
            token: api.token.clone(),
        })
    }

    /// Builds a request for GitHub REST API.
    fn request(&self, url: &str) -> RequestBuilder {
        self.client
            .get(url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .bearer_auth(&self.token)
            .header("X-GitHub-Api-Version", "2022-11-28")
    }

    fn send(&self, url: &str) -> State<Response> {
        match self.request(url).send() {
            Ok(response) if response.status().is_success() => State::Success(response),
            Ok(response) => {
                let status = response.status();
                let body = response.text().unwrap_or_default();
                match status {
                    StatusCode::GONE => {
                        error!("request to {url} failed: {status}, expired or removed: {body}");
                    }
                    status => error!("request to {url} failed: {status}: {body}"),
                }
                State::Retry
            }
            Err(err) => {
                error!("request to {url} failed: {err}");
                State::Retry
            }
        }
    }

    fn get_json<T>(&self, url: &str) -> State<T>
    where
        T: DeserializeOwned,
    {
        let response = crate::unwrap!(self.send(url));
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => {
                error!("failed to read response from {url}: {err}");
                return State::Retry;
            }
        };

        match serde_json::from_str(&body) {
            Ok(value) => State::Success(value),
            Err(err) => {
                error!("failed to parse data from {url}: {err}: {body}");
                State::Retry
            }
        }
    }
}

impl CiClient for GitHubClient {
    fn list_runs(&self) -> State<Vec<WorkflowRun>> {
        debug!("listing workflow runs at {}…", self.runs_url);
        self.get_json::<WorkflowRuns>(&self.runs_url)
            .map(|runs| runs.workflow_runs)
    }

    fn list_artifacts(&self, url: &str) -> State<Vec<Artifact>> {
        debug!("fetching artifacts from {url}…");
        self.get_json::<Artifacts>(url).map(|artifacts| {
            match artifacts.artifacts.len() {
                1 => info!("fetched 1 artifact from {url}"),
                count => info!("fetched {count} artifacts from {url}"),
            }
            artifacts.artifacts
        })
    }

    fn download(&self, url: &str) -> State<Vec<u8>> {
        debug!("requesting download from {url}…");
        let response = crate::unwrap!(self.send(url));
        match response.bytes() {
            Ok(bytes) => {
                info!("downloaded {} bytes from {url}", bytes.len());
                State::Success(bytes.to_vec())
            }
            Err(err) => {
                error!("failed to download {url}: {err}");
                State::Retry
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io::{Read as _, Write as _},
        net::TcpListener,
        thread::{self, JoinHandle},
    };

    use super::*;
    use crate::workflow::resolve_workflow;

    fn client_for(base_url: String) -> GitHubClient {
        GitHubClient::new(&ApiConfig {
            base_url,
            repository: "lief-project/lief".to_owned(),
            token: "secret".to_owned(),
            timeout_secs: 5,
        })
        .unwrap()
    }

    /// Answers a single request with `status` and `body`, returning the base URL and the received
    /// request head.
    fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0; 1024];
            while !request.windows(4).any(|window| window == b"\r\n\r\n") {
                let read = stream.read(&mut buf).unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..read]);
            }

            write!(
                stream,
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\n\
                 content-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            )
            .unwrap();
            String::from_utf8_lossy(&request).to_lowercase()
        });

        (base_url, handle)
    }

    #[test]
    fn lists_runs_with_api_headers() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"total_count":1,"workflow_runs":[{"id":42,"name":"Linux x86-64",
            "head_branch":"master","conclusion":"success","updated_at":"2024-05-01T10:00:00Z",
            "artifacts_url":"https://api.github.com/runs/42/artifacts"}]}"#,
        );

        let runs = client_for(base_url).list_runs().success().unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, 42);

        let request = server.join().unwrap();
        assert!(request.starts_with("get /repos/lief-project/lief/actions/runs http/1.1"));
        assert!(request.contains("accept: application/vnd.github+json"));
        assert!(request.contains("authorization: bearer secret"));
        assert!(request.contains("x-github-api-version: 2022-11-28"));
        assert!(request.contains("user-agent: lief-ci/"));
    }

    #[test]
    fn error_status_is_retried() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"message":"Not Found"}"#);

        assert!(matches!(client_for(base_url).list_runs(), State::Retry));
        server.join().unwrap();
    }

    #[test]
    fn error_status_resolves_no_run() {
        let (base_url, server) = serve_once("502 Bad Gateway", "upstream unavailable");

        let client = client_for(base_url);
        assert_eq!(resolve_workflow(&client, "master", "Linux x86-64"), None);
        server.join().unwrap();
    }

    #[test]
    fn unparsable_body_is_retried() {
        let (base_url, server) = serve_once("200 OK", "<html>rate limited</html>");

        assert!(matches!(client_for(base_url).list_runs(), State::Retry));
        server.join().unwrap();
    }

    #[test]
    fn expired_download_is_retried() {
        let (base_url, server) = serve_once("410 Gone", r#"{"message":"Artifact has expired"}"#);

        let client = client_for(base_url.clone());
        assert!(matches!(
            client.download(&format!("{base_url}/artifacts/11/zip")),
            State::Retry
        ));
        server.join().unwrap();
    }

    #[test]
    fn builds_runs_url() {
        let client = GitHubClient::new(&ApiConfig {
            base_url: "https://api.github.com/".to_owned(),
            repository: "lief-project/lief".to_owned(),
            token: "secret".to_owned(),
            timeout_secs: 5,
        })
        .unwrap();

        assert_eq!(
            client.runs_url,
            "https://api.github.com/repos/lief-project/lief/actions/runs"
        );
    }

    #[test]
    fn unreachable_api_is_retried() {
        let client = GitHubClient::new(&ApiConfig {
            base_url: "http://127.0.0.1:9".to_owned(),
            repository: "lief-project/lief".to_owned(),
            token: "secret".to_owned(),
            timeout_secs: 1,
        })
        .unwrap();

        assert!(matches!(client.list_runs(), State::Retry));
    }
}
