pub mod arguments;
pub mod artifact;
pub mod factory;
pub mod runner;

use {
    crate::{arguments::Arguments, artifact::Artifacts, factory::Node},
    clap::Parser,
    std::process::ExitCode,
};

/// Deploys the configured contract. Exits with `0` once the deployment is
/// confirmed and its address printed, with `1` on any failure, including
/// invalid configuration.
pub async fn start(args: impl Iterator<Item = String>) -> ExitCode {
    let args = match Arguments::try_parse_from(args) {
        Ok(args) => args,
        Err(err) => return report_arguments_error(&err),
    };
    observe::tracing::initialize(&args.logging.config());
    tracing::info!("running deployer with validated arguments:\n{}", args);

    let policy = args.confirmation_policy();
    let node = Node::new(
        args.node_url,
        args.private_key,
        Artifacts::new(args.artifacts),
        policy,
    );
    let result = runner::run(
        &node,
        &args.contract,
        &mut std::io::stdout(),
        &mut std::io::stderr(),
    )
    .await;

    match result {
        Ok(_) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

/// `--help` goes to stdout and succeeds, real argument errors go to stderr
/// and fail like any other deployment failure.
fn report_arguments_error(err: &clap::Error) -> ExitCode {
    // Nothing sensible is left to do if the terminal is gone.
    let _ = err.print();
    if err.use_stderr() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
