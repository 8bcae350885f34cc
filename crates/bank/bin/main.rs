#[macro_use]
extern crate tracing;

use std::sync::Arc;

use alloy_provider::{Provider, ProviderBuilder};
use clap::Parser;
use eyre::{Result, WrapErr};
use ntc_bank::{RpcBinder, SessionController, SessionOptions};
use ntc_config::{Config, WalletKind};
use ntc_wallets::{BrowserWallet, LocalWallet, WalletProvider};
use url::Url;

mod args;
mod handler;
mod repl;

use args::BankArgs;

fn main() -> Result<()> {
    handler::install();
    subscriber();
    let args = BankArgs::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: BankArgs) -> Result<()> {
    let config = args.load_config()?;
    debug!(?config, "loaded config");

    let rpc_url: Url =
        config.rpc_url.parse().wrap_err_with(|| format!("invalid rpc url {}", config.rpc_url))?;
    let provider = ProviderBuilder::new().connect_http(rpc_url.clone()).erased();
    if let Some(expected) = config.chain_id {
        let chain_id = provider.get_chain_id().await.wrap_err("failed to get chain id")?;
        eyre::ensure!(
            chain_id == expected,
            "node at {rpc_url} is on chain {chain_id}, expected {expected}"
        );
    }

    let binder = RpcBinder::new(provider, config.contract)
        .with_confirmations(config.confirmations)
        .with_timeout(config.transaction_timeout());

    let (wallet, bridge) = open_wallet(&args, &config, rpc_url).await?;
    let controller = SessionController::new(wallet, Arc::new(binder), SessionOptions::from(&config));
    controller.mount().await;

    let result = repl::run(&controller).await;

    drop(controller);
    if let Some(bridge) = bridge {
        bridge.shutdown().await?;
    }
    result
}

/// Opens the configured wallet.
///
/// Returns `None` as wallet when the browser has no extension installed or the bridge page never
/// reported, along with the bridge server to shut down on exit.
async fn open_wallet(
    args: &BankArgs,
    config: &Config,
    rpc_url: Url,
) -> Result<(Option<Arc<dyn WalletProvider>>, Option<BrowserWallet>)> {
    match config.wallet {
        WalletKind::Local => {
            let wallet = LocalWallet::from_private_keys(&args.private_keys, rpc_url)?;
            Ok((Some(Arc::new(wallet)), None))
        }
        WalletKind::Browser => {
            let bridge = BrowserWallet::spawn(config.browser_port, config.wallet_timeout()).await?;
            repl::print_bridge_url(&bridge.url());
            let wallet = bridge.clone().detect(config.wallet_timeout()).await?;
            Ok((wallet.map(|wallet| Arc::new(wallet) as Arc<dyn WalletProvider>), Some(bridge)))
        }
    }
}

/// Initializes a tracing Subscriber for logging
fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
}
