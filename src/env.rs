//! Defines the environment variables and command line arguments of both pipelines, and the
//! validated configurations built from them once at startup.

/// The environment variable holding the CI provider token.
pub const TOKEN_VAR: &str = "LIEF_CIRCLE_TOKEN";
/// The environment variable overriding the branch.
pub const BRANCH_VAR: &str = "LIEF_BRANCH";
/// The environment variable holding the hex key of the encrypted deploy key.
pub const DEPLOY_KEY_VAR: &str = "LIEF_AUTOMATIC_BUILDS_KEY";
/// The environment variable holding the hex IV of the encrypted deploy key.
pub const DEPLOY_IV_VAR: &str = "LIEF_AUTOMATIC_BUILDS_IV";

/// The branch whose artifacts are bootstrapped and whose documentation is published as `latest`.
pub const DEFAULT_BRANCH: &str = "master";

/// Rejects empty values, so that a variable set to nothing counts as missing.
fn non_empty(value: &str) -> Result<String, String> {
    if value.trim().is_empty() {
        Err("must not be empty".to_owned())
    } else {
        Ok(value.to_owned())
    }
}

#[cfg(feature = "bootstrap")]
pub use bootstrap::*;

#[cfg(feature = "bootstrap")]
mod bootstrap {
    use super::{BRANCH_VAR, DEFAULT_BRANCH, TOKEN_VAR, non_empty};

    use std::path::PathBuf;

    use clap::Parser;

    use crate::{
        Result,
        command::Shell,
        framework::{DEFAULT_RETRIES, RetryPolicy},
        python::PythonVersion,
        workflow::artifact::ArtifactNames,
    };

    /// Downloads and installs the SDK and Python wheel built by the latest successful CI run.
    #[derive(Debug, Clone, Parser)]
    #[command(name = "lief-bootstrap", version)]
    pub struct BootstrapArgs {
        /// The CI provider token.
        #[arg(long, env = TOKEN_VAR, hide_env_values = true, value_parser = non_empty)]
        pub token: String,

        /// The branch whose latest successful run is installed.
        #[arg(long, env = BRANCH_VAR, default_value = DEFAULT_BRANCH, value_parser = non_empty)]
        pub branch: String,

        /// The repository running the workflow, as `<owner>/<repo>`.
        #[arg(long, default_value = "lief-project/lief")]
        pub repository: String,

        /// The base URL of the CI provider's REST API.
        #[arg(long, default_value = "https://api.github.com")]
        pub api_url: String,

        /// The display name of the workflow producing the artifacts.
        #[arg(long, default_value = "Linux x86-64")]
        pub workflow: String,

        /// The platform prefix of the artifact names.
        #[arg(long, default_value = "linux-x86-64")]
        pub platform: String,

        /// The Python interpreter the wheel is installed into.
        #[arg(long, env = "LIEF_PYTHON", default_value = "python3")]
        pub python: PathBuf,

        /// The version of the interpreter, e.g. `3.11`. Asked to the interpreter if omitted.
        #[arg(long)]
        pub python_version: Option<PythonVersion>,

        /// Where the SDK is extracted.
        #[arg(long, default_value = ".")]
        pub output_dir: PathBuf,

        /// How many times a failed attempt is retried.
        #[arg(long, env = "MAX_RETRIES", default_value_t = DEFAULT_RETRIES)]
        pub retries: u8,

        /// The timeout of each HTTP request, in seconds.
        #[arg(long, default_value_t = 60)]
        pub http_timeout: u64,
    }

    /// Where and how to reach the CI provider.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct ApiConfig {
        /// The base URL of the REST API.
        pub base_url: String,
        /// The repository, as `<owner>/<repo>`.
        pub repository: String,
        /// The bearer token.
        pub token: String,
        /// The timeout of each request, in seconds.
        pub timeout_secs: u64,
    }

    /// The configuration of the bootstrap pipeline.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct BootstrapConfig {
        /// The CI provider.
        pub api: ApiConfig,
        /// The branch whose latest successful run is installed.
        pub branch: String,
        /// The display name of the workflow.
        pub workflow: String,
        /// The expected artifact names.
        pub artifacts: ArtifactNames,
        /// The interpreter the wheel is installed into.
        pub python: PathBuf,
        /// The version of [`Self::python`].
        pub python_version: PythonVersion,
        /// Where the SDK is extracted.
        pub output_dir: PathBuf,
        /// The retry limits.
        pub retry: RetryPolicy,
    }

    impl BootstrapArgs {
        /// Validates the arguments, asking the interpreter for its version if it was not given.
        ///
        /// # Errors
        ///
        /// Returns an error if the interpreter version can't be determined.
        pub fn into_config<S>(self, shell: &S) -> Result<BootstrapConfig>
        where
            S: Shell + ?Sized,
        {
            let python_version = match self.python_version {
                Some(version) => version,
                None => PythonVersion::detect(shell, &self.python)?,
            };

            Ok(BootstrapConfig {
                api: ApiConfig {
                    base_url: self.api_url,
                    repository: self.repository,
                    token: self.token,
                    timeout_secs: self.http_timeout,
                },
                branch: self.branch,
                workflow: self.workflow,
                artifacts: ArtifactNames::new(&self.platform, python_version),
                python: self.python,
                python_version,
                output_dir: self.output_dir,
                retry: RetryPolicy::new(self.retries),
            })
        }
    }
}

#[cfg(feature = "publish")]
pub use publish::*;

#[cfg(feature = "publish")]
mod publish {
    use super::{BRANCH_VAR, DEFAULT_BRANCH, DEPLOY_IV_VAR, DEPLOY_KEY_VAR, non_empty};

    use std::path::{Path, PathBuf};

    use anyhow::{Context as _, anyhow};
    use clap::Parser;

    use crate::{Result, publish::target_dir};

    /// Publishes the generated documentation to the website repository.
    #[derive(Debug, Clone, Parser)]
    #[command(name = "lief-deploy-docs", version)]
    pub struct PublishArgs {
        /// The hex key decrypting the deploy key.
        #[arg(long, env = DEPLOY_KEY_VAR, hide_env_values = true, value_parser = non_empty)]
        pub deploy_key: String,

        /// The hex initialization vector decrypting the deploy key.
        #[arg(long, env = DEPLOY_IV_VAR, hide_env_values = true, value_parser = non_empty)]
        pub deploy_iv: String,

        /// The branch the documentation was built from.
        #[arg(long, env = BRANCH_VAR, default_value = DEFAULT_BRANCH)]
        pub branch: String,

        /// The branch published as `latest`.
        #[arg(long, default_value = DEFAULT_BRANCH)]
        pub default_branch: String,

        /// The checkout of the project, where the website repository is cloned.
        #[arg(long, default_value = ".")]
        pub repo_dir: PathBuf,

        /// The directory containing the generated `doc/` directory. Defaults to `--repo-dir`.
        #[arg(long, env = "CIRCLE_WORKING_DIRECTORY")]
        pub docs_root: Option<PathBuf>,

        /// The website repository, cloned over HTTPS.
        #[arg(
            long,
            default_value = "https://github.com/lief-project/lief-project.github.io.git"
        )]
        pub website_repo: String,

        /// The website repository, pushed to over SSH.
        #[arg(
            long,
            default_value = "git@github.com:lief-project/lief-project.github.io.git"
        )]
        pub website_ssh_repo: String,

        /// The branch of the website repository.
        #[arg(long, default_value = "master")]
        pub website_branch: String,

        /// The encrypted deploy key, relative to `--repo-dir`.
        #[arg(long, default_value = ".github/deploy-key.enc")]
        pub encrypted_key: PathBuf,

        /// The name of the committer.
        #[arg(long, default_value = "lief-ci-doc")]
        pub git_user: String,

        /// The email of the committer. Defaults to `<git-user>@lief.re`.
        #[arg(long)]
        pub git_email: Option<String>,

        /// The SSH configuration directory. Defaults to `~/.ssh`.
        #[arg(long)]
        pub ssh_dir: Option<PathBuf>,

        /// The host whose key is trusted before pushing.
        #[arg(long, default_value = "github.com")]
        pub known_host: String,

        /// How many times the push is attempted.
        #[arg(long, default_value_t = 10)]
        pub push_attempts: u8,
    }

    /// The configuration of the documentation publisher.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct PublishConfig {
        /// The hex key decrypting the deploy key.
        pub deploy_key: String,
        /// The hex initialization vector decrypting the deploy key.
        pub deploy_iv: String,
        /// The checkout of the project.
        pub repo_dir: PathBuf,
        /// The generated documentation, whose content is published.
        pub docs_dir: PathBuf,
        /// The website repository, cloned over HTTPS.
        pub website_repo: String,
        /// The website repository, pushed to over SSH.
        pub website_ssh_repo: String,
        /// The branch of the website repository.
        pub website_branch: String,
        /// Where the website repository is cloned.
        pub website_dir: PathBuf,
        /// The directory under `doc/` receiving the documentation.
        pub target_dir: String,
        /// The encrypted deploy key.
        pub encrypted_key: PathBuf,
        /// The name of the committer.
        pub git_user: String,
        /// The email of the committer.
        pub git_email: String,
        /// The SSH configuration directory.
        pub ssh_dir: PathBuf,
        /// The host whose key is trusted before pushing.
        pub known_host: String,
        /// How many times the push is attempted.
        pub push_attempts: u8,
    }

    impl PublishConfig {
        /// Where the decrypted deploy key is written.
        pub fn deploy_key_path(&self) -> PathBuf {
            self.repo_dir.join(".git").join("deploy-key")
        }
    }

    /// The directory a repository is cloned into, e.g. `lief-project.github.io`.
    fn clone_dir_name(url: &str) -> Option<&str> {
        let name = url
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()?
            .trim_end_matches(".git");
        (!name.is_empty()).then_some(name)
    }

    impl PublishArgs {
        /// Resolves the paths of the arguments.
        ///
        /// # Errors
        ///
        /// Returns an error if a path can't be made absolute, or if `--ssh-dir` is omitted and
        /// `HOME` is not set.
        pub fn into_config(self) -> Result<PublishConfig> {
            let repo_dir = std::path::absolute(&self.repo_dir)
                .with_context(|| format!("invalid path {}", self.repo_dir.display()))?;
            let docs_dir = self
                .docs_root
                .as_deref()
                .unwrap_or(&repo_dir)
                .join("doc");
            let website_dir = repo_dir.join(
                clone_dir_name(&self.website_repo)
                    .ok_or_else(|| anyhow!("invalid repository {}", self.website_repo))?,
            );
            let ssh_dir = match self.ssh_dir {
                Some(ssh_dir) => ssh_dir,
                None => std::env::var_os("HOME")
                    .map(|home| Path::new(&home).join(".ssh"))
                    .ok_or_else(|| anyhow!("HOME not set, pass --ssh-dir"))?,
            };

            Ok(PublishConfig {
                deploy_key: self.deploy_key,
                deploy_iv: self.deploy_iv,
                target_dir: target_dir(&self.branch, &self.default_branch),
                encrypted_key: repo_dir.join(&self.encrypted_key),
                git_email: self
                    .git_email
                    .unwrap_or_else(|| format!("{}@lief.re", self.git_user)),
                git_user: self.git_user,
                repo_dir,
                docs_dir,
                website_repo: self.website_repo,
                website_ssh_repo: self.website_ssh_repo,
                website_branch: self.website_branch,
                website_dir,
                ssh_dir,
                known_host: self.known_host,
                push_attempts: self.push_attempts,
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn clone_dir_names() {
            assert_eq!(
                clone_dir_name("https://github.com/lief-project/lief-project.github.io.git"),
                Some("lief-project.github.io")
            );
            assert_eq!(clone_dir_name("git@example.com:site.git"), Some("site"));
            assert_eq!(clone_dir_name("https://example.com/"), Some("example.com"));
            assert_eq!(clone_dir_name(""), None);
        }

        #[test]
        fn resolves_publish_paths() {
            let config = PublishArgs::try_parse_from([
                "lief-deploy-docs",
                "--deploy-key",
                "00ff",
                "--deploy-iv",
                "ff00",
                "--branch",
                "feature/new_api",
                "--repo-dir",
                "/src/lief",
                "--docs-root",
                "/ci/work",
                "--ssh-dir",
                "/tmp/ssh",
            ])
            .unwrap()
            .into_config()
            .unwrap();

            assert_eq!(config.target_dir, "feature-new-api");
            assert_eq!(config.docs_dir, Path::new("/ci/work/doc"));
            assert_eq!(config.website_dir, Path::new("/src/lief/lief-project.github.io"));
            assert_eq!(config.encrypted_key, Path::new("/src/lief/.github/deploy-key.enc"));
            assert_eq!(config.deploy_key_path(), Path::new("/src/lief/.git/deploy-key"));
            assert_eq!(config.git_email, "lief-ci-doc@lief.re");
            assert_eq!(config.push_attempts, 10);
        }

        #[test]
        fn rejects_empty_deploy_key() {
            let err = PublishArgs::try_parse_from([
                "lief-deploy-docs",
                "--deploy-key",
                "",
                "--deploy-iv",
                "ff00",
            ])
            .unwrap_err();
            assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
        }
    }
}
