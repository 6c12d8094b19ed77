use {
    crate::factory::ConfirmationPolicy,
    alloy::signers::local::PrivateKeySigner,
    std::{
        fmt::{self, Display, Formatter},
        path::PathBuf,
        time::Duration,
    },
    url::Url,
};

#[derive(clap::Parser)]
pub struct Logging {
    #[clap(long, env, default_value = "warn,deployer=info,observe=info")]
    pub log_filter: String,

    /// Emit log events as JSON.
    #[clap(long, env)]
    pub log_json: bool,
}

impl Logging {
    pub fn config(&self) -> observe::Config {
        observe::Config::new(&self.log_filter, self.log_json)
    }
}

impl Display for Logging {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_json,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_json: {log_json}")?;
        Ok(())
    }
}

/// Deploys a compiled contract and prints its address.
#[derive(clap::Parser)]
pub struct Arguments {
    #[clap(flatten)]
    pub logging: Logging,

    /// Contract to deploy. Either the bare contract name or the fully
    /// qualified `<source>:<contract>` name if the bare one is ambiguous.
    #[clap(long, env, default_value = "DEX")]
    pub contract: String,

    /// Directory holding the compiled Hardhat artifacts.
    #[clap(long, env, default_value = "artifacts")]
    pub artifacts: PathBuf,

    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Hex encoded private key of the deploying account. When omitted the
    /// first unlocked account of the node deploys the contract.
    #[clap(long, env, hide_env_values = true)]
    pub private_key: Option<PrivateKeySigner>,

    /// How many blocks the creation transaction needs before the deployment
    /// counts as confirmed.
    #[clap(
        long,
        env,
        default_value = "1",
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub confirmations: u64,

    /// Give up waiting for the confirmation after this long (e.g. `5m`).
    /// Waits indefinitely by default.
    #[clap(long, env, value_parser = humantime::parse_duration)]
    pub confirmation_timeout: Option<Duration>,
}

impl Arguments {
    pub fn confirmation_policy(&self) -> ConfirmationPolicy {
        ConfirmationPolicy {
            confirmations: self.confirmations,
            timeout: self.confirmation_timeout,
        }
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            logging,
            contract,
            artifacts,
            node_url,
            private_key,
            confirmations,
            confirmation_timeout,
        } = self;

        write!(f, "{logging}")?;
        writeln!(f, "contract: {contract}")?;
        writeln!(f, "artifacts: {}", artifacts.display())?;
        writeln!(f, "node_url: {node_url}")?;
        writeln!(
            f,
            "private_key: {}",
            private_key.as_ref().map(|_| "SECRET").unwrap_or("None")
        )?;
        writeln!(f, "confirmations: {confirmations}")?;
        writeln!(f, "confirmation_timeout: {confirmation_timeout:?}")?;
        Ok(())
    }
}
