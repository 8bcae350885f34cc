use clap::Parser;
use eyre::Result;
use ntc_bank::{SessionController, SessionError, units::format_ether};
use tokio::io::{AsyncBufReadExt, BufReader};
use yansi::Paint;

/// Commands understood at the prompt.
#[derive(Debug, Parser)]
#[command(multicall = true)]
enum Command {
    /// Connect the wallet.
    Connect,
    /// Deposit ether into the bank.
    Deposit { amount: String },
    /// Withdraw ether from the bank.
    Withdraw { amount: String },
    /// Show the balance of another address for a few seconds.
    #[command(visible_alias = "check")]
    Lookup { address: String },
    /// Transfer ether within the bank.
    Transfer { recipient: String, amount: String },
    /// Show or hide the own address.
    Toggle,
    /// Refresh the own balance.
    Refresh,
    /// Disconnect the wallet from this session.
    Disconnect,
    /// Show the pending form input.
    Status,
    /// Leave.
    #[command(visible_alias = "exit")]
    Quit,
}

pub fn print_bridge_url(url: &str) {
    anstream::println!("Open {} in a browser with MetaMask installed.", url.cyan().bold());
}

/// Reads commands from stdin until `quit`, EOF or Ctrl-C, re-rendering after every command and
/// whenever the session changes in the background.
pub async fn run(controller: &SessionController) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    render(controller);

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let words = line.split_whitespace().collect::<Vec<_>>();
                if words.is_empty() {
                    continue;
                }
                let command = match Command::try_parse_from(words) {
                    Ok(Command::Quit) => break,
                    Ok(command) => command,
                    Err(err) => {
                        let _ = err.print();
                        continue;
                    }
                };
                if let Err(err) = execute(controller, command).await {
                    anstream::eprintln!("{}: {err}", "Error".red().bold());
                }
                render(controller);
            }
            _ = controller.changed() => render(controller),
            _ = tokio::signal::ctrl_c() => break,
        }
    }
    Ok(())
}

async fn execute(controller: &SessionController, command: Command) -> Result<(), SessionError> {
    match command {
        Command::Connect => {
            let account = controller.connect().await?;
            anstream::println!("Account connected: {account}");
        }
        Command::Deposit { amount } => {
            controller.set_deposit_amount(amount);
            let hash = controller.deposit().await?;
            anstream::println!("Deposit confirmed: {hash}");
        }
        Command::Withdraw { amount } => {
            controller.set_withdraw_amount(amount);
            let hash = controller.withdraw().await?;
            anstream::println!("Withdrawal confirmed: {hash}");
        }
        Command::Lookup { address } => {
            controller.set_lookup_address(address);
            controller.check_balance().await?;
        }
        Command::Transfer { recipient, amount } => {
            controller.set_transfer_recipient(recipient);
            controller.set_transfer_amount(amount);
            let hash = controller.transfer().await?;
            anstream::println!("Transfer confirmed: {hash}");
        }
        Command::Toggle => {
            controller.toggle_address()?;
        }
        Command::Refresh => {
            let balance = controller.refresh_balance(None).await?;
            debug!(balance = %format_ether(balance), "refreshed");
        }
        Command::Disconnect => controller.disconnect(),
        Command::Status => {
            let forms = controller.forms();
            anstream::println!("{forms:#?}");
        }
        Command::Quit => {}
    }
    Ok(())
}

fn render(controller: &SessionController) {
    for notice in controller.take_notices() {
        anstream::println!("{}: {notice}", "Alert".yellow().bold());
    }
    anstream::println!("{}", "-".repeat(40).dim());
    anstream::println!("{}", controller.panel());
}
