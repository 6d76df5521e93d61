use std::{
    fs::{self, OpenOptions},
    io::Write as _,
    os::unix::fs::{DirBuilderExt as _, PermissionsExt as _},
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use regex::Regex;
use tracing::info;

use crate::{
    Error, Result,
    command::{Invocation, Shell},
    env::PublishConfig,
    static_lazy_lock,
};

static_lazy_lock! {
    AGENT_OUTPUT: Regex = Regex::new(
        r"(?s)SSH_AUTH_SOCK=(?P<socket>[^;]+).*SSH_AGENT_PID=(?P<pid>\d+)"
    )
    .expect("valid ssh-agent output pattern");
}

/// A running `ssh-agent`, holding the deploy key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshAgent {
    /// The socket the agent listens on.
    pub socket: String,
    /// The process id of the agent.
    pub pid: u32,
}

impl SshAgent {
    /// Parses the environment printed by `ssh-agent`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AgentOutput`] if the output does not hold the socket and the process id.
    pub fn parse(output: &str) -> Result<Self> {
        let captures = AGENT_OUTPUT
            .captures(output)
            .ok_or_else(|| Error::AgentOutput(output.to_owned()))?;
        Ok(Self {
            socket: captures["socket"].to_owned(),
            pid: captures["pid"]
                .parse::<u32>()
                .map_err(|_| Error::AgentOutput(output.to_owned()))?,
        })
    }

    /// Starts an agent.
    ///
    /// # Errors
    ///
    /// Returns an error if `ssh-agent` fails or prints something unexpected.
    pub fn start<S>(shell: &S) -> Result<Self>
    where
        S: Shell + ?Sized,
    {
        let agent = Self::parse(&shell.output(&Invocation::new("ssh-agent"))?)?;
        info!("ssh agent data: socket {}, pid {}", agent.socket, agent.pid);
        Ok(agent)
    }

    /// The environment variables pointing subprocesses to this agent.
    pub fn envs(&self) -> [(&'static str, String); 2] {
        [
            ("SSH_AUTH_SOCK", self.socket.clone()),
            ("SSH_AGENT_PID", self.pid.to_string()),
        ]
    }
}

/// Decrypts the deploy key into the `.git` directory of the project, readable by the owner only.
///
/// # Errors
///
/// Returns an error if `openssl` fails.
pub fn decrypt_deploy_key<S>(config: &PublishConfig, shell: &S) -> Result<PathBuf>
where
    S: Shell + ?Sized,
{
    let key = config.deploy_key_path();
    let invocation = Invocation::new("openssl")
        .args([
            "aes-256-cbc",
            "-K",
            config.deploy_key.as_str(),
            "-iv",
            config.deploy_iv.as_str(),
            "-in",
        ])
        .arg(&config.encrypted_key)
        .arg("-out")
        .arg(&key)
        .arg("-d")
        .current_dir(&config.repo_dir)
        .quiet()
        .sensitive();
    shell.run(&invocation)?;

    fs::set_permissions(&key, fs::Permissions::from_mode(0o600))
        .with_context(|| format!("failed to restrict {}", key.display()))?;
    info!("decrypted deploy key to {}", key.display());
    Ok(key)
}

/// Trusts the keys of `host` for the user.
///
/// # Errors
///
/// Returns an error if `ssh-keyscan` fails or `known_hosts` can't be written.
pub fn trust_host<S>(ssh_dir: &Path, host: &str, shell: &S) -> Result<()>
where
    S: Shell + ?Sized,
{
    let keys = shell.output(&Invocation::new("ssh-keyscan").args(["-H", host]))?;
    let known_hosts = ssh_dir.join("known_hosts");
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&known_hosts)?;
    file.write_all(keys.as_bytes())?;
    info!("trusted {host} in {}", known_hosts.display());
    Ok(())
}

/// Decrypts the deploy key, loads it into a fresh agent and trusts the push host.
///
/// # Errors
///
/// Returns an error if any of the steps fails.
pub fn setup_ssh<S>(config: &PublishConfig, shell: &S) -> Result<SshAgent>
where
    S: Shell + ?Sized,
{
    if !config.ssh_dir.is_dir() {
        fs::DirBuilder::new()
            .recursive(true)
            .mode(0o700)
            .create(&config.ssh_dir)?;
    }

    let key = decrypt_deploy_key(config, shell)?;
    let agent = SshAgent::start(shell)?;
    // lists the identities already loaded, fails when there are none
    shell.status(&Invocation::new("ssh-add").arg("-L").envs(agent.envs()))?;
    shell.run(&Invocation::new("ssh-add").arg(&key).envs(agent.envs()))?;
    trust_host(&config.ssh_dir, &config.known_host, shell)?;
    Ok(agent)
}
