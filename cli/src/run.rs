//! Command dispatch.

use clap::Parser;
use dotenvy::dotenv;
use evm_pay_eip155::capability::ChainCapabilityResolver;
use evm_pay_eip155::fee::RpcFeeProvider;
use evm_pay_eip155::networks::KnownNetworkEip155;
use evm_pay_eip155::rpc::JsonRpcClient;
use evm_pay_orchestrator::{PayRequest, PaymentOrchestrator, PaymentOutcome};
use evm_pay_types::chain::{ChainDescriptor, ChainId, ChainRegistry};
use std::sync::Arc;
use url::Url;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::boundary::DryRunBoundary;
use crate::config::{CliArgs, Command, Config, PayArgs};
use crate::console::{ConsoleListener, ConsolePrompt, StaticSession};

#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error("Unknown chain {0}")]
    UnknownChain(String),
    #[error("Unknown token {symbol} on {chain}")]
    UnknownToken { symbol: String, chain: ChainId },
    #[error("Chain {0} has no RPC URL")]
    MissingRpcUrl(ChainId),
}

fn resolve_chain(chains: &ChainRegistry, reference: &str) -> Result<ChainDescriptor, CommandError> {
    chains
        .lookup(reference)
        .cloned()
        .ok_or_else(|| CommandError::UnknownChain(reference.to_string()))
}

/// RPC endpoint for lookups: the named chain, otherwise Ethereum.
fn lookup_rpc_url(chains: &ChainRegistry, reference: Option<&str>) -> Result<Url, CommandError> {
    let chain = match reference {
        Some(reference) => resolve_chain(chains, reference)?,
        None => {
            let ethereum = ChainId::ethereum();
            chains
                .by_chain_id(&ethereum)
                .cloned()
                .or_else(|| ChainRegistry::known().by_chain_id(&ethereum).cloned())
                .ok_or_else(|| CommandError::UnknownChain(ethereum.to_string()))?
        }
    };
    chain
        .rpc_url
        .ok_or(CommandError::MissingRpcUrl(chain.id))
}

/// Loads `.env`, installs logging, reads the configuration and runs the command.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();
    let config = Config::load(&args.config)?;
    let chains = config.payment().chain_registry();
    let rpc = JsonRpcClient::new().with_timeout(config.payment().rpc_timeout())?;
    let resolver =
        ChainCapabilityResolver::new(config.payment().eip1559().to_vec(), Arc::new(rpc.clone()));

    match args.command {
        Command::Chains => {
            for chain in chains.iter() {
                let rpc_url = chain.rpc_url.as_ref().map(|u| u.as_str()).unwrap_or("-");
                let eip1559 = resolver.supports_eip1559_by_default(chain);
                println!("{}\t{}\t{}\teip1559={}", chain.id, chain.name, rpc_url, eip1559);
            }
        }
        Command::Probe { chain } => {
            let chain = resolve_chain(&chains, &chain)?;
            let model = resolver.resolve(&chain).await?;
            println!("{} ({}): {}", chain.name, chain.id, model);
        }
        Command::Receipt { chain, tx } => {
            let rpc_url = lookup_rpc_url(&chains, chain.as_deref())?;
            match rpc.transaction_receipt(&rpc_url, tx).await? {
                Some(receipt) if receipt.is_confirmed() => println!("{tx}: confirmed"),
                Some(_) => println!("{tx}: failed or pending"),
                None => println!("{tx}: unknown"),
            }
        }
        Command::Transaction { chain, tx } => {
            let rpc_url = lookup_rpc_url(&chains, chain.as_deref())?;
            match rpc.transaction(&rpc_url, tx).await? {
                Some(transaction) => println!("{}", serde_json::to_string_pretty(&transaction)?),
                None => println!("{tx}: unknown"),
            }
        }
        Command::Pay(pay_args) => {
            pay(&config, &chains, rpc, resolver, pay_args).await?;
        }
    }

    Ok(())
}

async fn pay(
    config: &Config,
    chains: &ChainRegistry,
    rpc: JsonRpcClient,
    resolver: ChainCapabilityResolver,
    args: PayArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let chain = resolve_chain(chains, &args.chain)?;
    let tokens = config.payment().token_registry(chains)?;

    let boundary = Arc::new(DryRunBoundary::new(config.fees().clone(), args.request_id));
    let session = Arc::new(StaticSession::new(args.from.0, chain.clone()));
    let mut orchestrator = PaymentOrchestrator::new(
        session,
        Arc::new(ConsolePrompt::new(args.yes)),
        boundary,
        resolver,
    )
    .with_credentials(config.payment().credentials())
    .with_treasury(config.payment().treasury())
    .with_pending_order_ttl(config.payment().pending_order_ttl())
    .with_rpc_client(rpc.clone());
    if args.live_fees {
        orchestrator = orchestrator.with_fee_provider(Arc::new(RpcFeeProvider::new(rpc)));
    }
    let listener = Arc::new(ConsoleListener);
    orchestrator.set_pay_listener(listener.clone());

    let mut request = match &args.token {
        Some(symbol) => {
            let token = tokens.get(&chain.id, symbol).cloned().ok_or_else(|| {
                CommandError::UnknownToken {
                    symbol: symbol.clone(),
                    chain: chain.id.clone(),
                }
            })?;
            PayRequest::erc20(token, args.amount)
        }
        None => PayRequest::native(args.amount),
    }
    .with_order_title(args.title)
    .with_goods_description(args.description)
    .with_order_listener(listener);
    if let Some(to) = args.to {
        request = request.with_recipient(to);
    }

    let pending = orchestrator.pay(request)?;
    match pending.outcome().await {
        PaymentOutcome::Accepted(order) => {
            println!("{}", serde_json::to_string_pretty(&order)?);
        }
        PaymentOutcome::Rejected(kind) => {
            return Err(kind.into());
        }
        PaymentOutcome::UserCancelled => {
            println!("Payment cancelled");
        }
    }
    orchestrator.disconnect_wallet().await?;
    Ok(())
}
