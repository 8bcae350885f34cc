use alloy_primitives::U256;
use ntc_bank::Panel;
use ntc_config::Variant;
use similar_asserts::assert_eq;

use crate::utils::*;

#[test]
fn renders_bank_panels() {
    let panel = Panel::NotInstalled {
        variant: Variant::Bank,
        install_url: "https://metamask.io/download.html".to_string(),
    };
    assert_eq!(
        panel.to_string(),
        "MetaMask not installed!\nInstall MetaMask: https://metamask.io/download.html"
    );

    let panel = Panel::NotConnected { variant: Variant::Bank };
    assert_eq!(panel.to_string(), "Connect your MetaMask wallet\n[connect]");

    let panel = Panel::Connected {
        variant: Variant::Bank,
        account: ALICE,
        show_address: true,
        balance: Some(U256::from(ETHER * 3 / 2)),
        lookup: Some(ether(4)),
    };
    assert_eq!(
        panel.to_string(),
        "\
Welcome to NTC Bank!
Account: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266
Total Balance: 1.5 ETH
Total Balance: 4.0 ETH"
    );
}

#[test]
fn renders_atm_panels() {
    let panel = Panel::NotConnected { variant: Variant::Atm };
    assert_eq!(
        panel.to_string(),
        "Welcome to NTC Bank!\n[connect] Please connect your MetaMask wallet"
    );

    let mut panel = Panel::Connected {
        variant: Variant::Atm,
        account: ALICE,
        show_address: true,
        balance: Some(U256::ZERO),
        lookup: None,
    };
    assert_eq!(
        panel.to_string(),
        "\
Welcome to NTC Bank!
Your Account: 0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266 [hide]
Your Balance: 0.0 ETH"
    );

    if let Panel::Connected { show_address, balance, .. } = &mut panel {
        *show_address = false;
        *balance = None;
    }
    assert_eq!(
        panel.to_string(),
        "\
Welcome to NTC Bank!
Your Account: ******** [show]
Your Balance: - ETH"
    );
}

#[tokio::test]
async fn panel_follows_session() {
    let ledger = Ledger::with_balances([(ALICE, ether(10))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    assert_eq!(
        controller.panel(),
        Panel::Connected {
            variant: Variant::Bank,
            account: ALICE,
            show_address: true,
            balance: Some(ether(10)),
            lookup: None,
        }
    );
    assert!(controller.panel().to_string().contains("Total Balance: 10.0 ETH"));
}
