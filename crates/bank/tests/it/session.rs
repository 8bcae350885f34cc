use std::time::Duration;

use alloy_primitives::U256;
use ntc_bank::{AmountError, BankError, Notice, Panel, SessionError};
use ntc_config::Variant;

use crate::utils::*;

#[tokio::test]
async fn connect_without_wallet_shows_install_prompt() {
    let ledger = Ledger::new();
    let controller = controller(None, &ledger, Variant::Bank);
    controller.mount().await;

    for _ in 0..3 {
        assert!(matches!(controller.connect().await, Err(SessionError::NoWallet)));
    }
    assert_eq!(controller.account(), None);
    assert!(!controller.is_wallet_detected());
    assert_eq!(
        controller.panel(),
        Panel::NotInstalled {
            variant: Variant::Bank,
            install_url: "https://metamask.io/download.html".to_string(),
        }
    );
    assert_eq!(controller.take_notices(), vec![Notice::WalletRequired; 3]);

    // every other action is a no-op
    controller.set_deposit_amount("1");
    assert!(matches!(controller.deposit().await, Err(SessionError::NoWallet)));
    assert!(matches!(controller.refresh_balance(None).await, Err(SessionError::NoWallet)));
    assert!(matches!(controller.bind_contract(), Err(SessionError::NoWallet)));
    assert_eq!(ledger.balance(ALICE), U256::ZERO);
    assert_eq!(ledger.binds(), 0);
}

#[tokio::test]
async fn connect_binds_contract_and_loads_balance() {
    crate::init_tracing();
    let ledger = Ledger::with_balances([(ALICE, ether(2))]);
    let wallet = MockWallet::new(vec![ALICE, BOB]);
    let controller = controller(Some(wallet), &ledger, Variant::Bank);
    controller.mount().await;
    assert_eq!(controller.take_notices(), vec![Notice::ConnectWallet]);
    assert!(matches!(controller.panel(), Panel::NotConnected { .. }));

    assert_eq!(controller.connect().await.unwrap(), ALICE);
    assert_eq!(controller.account(), Some(ALICE));
    assert_eq!(controller.client().map(|client| client.account()), Some(ALICE));
    assert_eq!(controller.balance(), Some(ether(2)));
    assert_eq!(ledger.binds(), 1);
}

#[tokio::test]
async fn rejected_connect_stays_disconnected() {
    let ledger = Ledger::new();
    let wallet = MockWallet::new(vec![ALICE]);
    wallet.reject_requests();
    let controller = controller(Some(wallet), &ledger, Variant::Bank);
    controller.mount().await;

    let err = controller.connect().await.unwrap_err();
    assert!(err.is_rejection(), "{err}");
    assert_eq!(controller.account(), None);
    assert!(controller.client().is_none());
    assert!(matches!(controller.panel(), Panel::NotConnected { .. }));
}

#[tokio::test]
async fn empty_account_list_is_not_a_connection() {
    let ledger = Ledger::new();
    let controller = controller(Some(MockWallet::new(vec![])), &ledger, Variant::Atm);
    controller.mount().await;

    assert!(matches!(controller.connect().await, Err(SessionError::NoAccount)));
    assert_eq!(controller.account(), None);
    assert_eq!(ledger.binds(), 0);
}

#[tokio::test]
async fn deposit_adds_to_balance_and_clears_field() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();
    let before = controller.balance().unwrap();

    controller.set_deposit_amount("1.5");
    controller.deposit().await.unwrap();

    let deposited = U256::from(ETHER * 3 / 2);
    assert_eq!(controller.balance(), Some(before + deposited));
    assert_eq!(ledger.balance(ALICE), before + deposited);
    assert_eq!(controller.forms().deposit_amount, "");
}

#[tokio::test]
async fn withdraw_subtracts_from_balance() {
    let ledger = Ledger::with_balances([(ALICE, ether(3))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Atm);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_withdraw_amount("0.5");
    controller.withdraw().await.unwrap();

    assert_eq!(controller.balance(), Some(U256::from(ETHER * 5 / 2)));
    assert_eq!(controller.forms().withdraw_amount, "");
}

#[tokio::test]
async fn failed_calls_keep_input_and_balance() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    // reverted by the contract
    controller.set_withdraw_amount("2");
    assert!(matches!(
        controller.withdraw().await,
        Err(SessionError::Contract(BankError::Reverted(_)))
    ));
    assert_eq!(controller.forms().withdraw_amount, "2");
    assert_eq!(controller.balance(), Some(ether(1)));

    // declined in the wallet
    ledger.reject_next();
    controller.set_deposit_amount("1");
    let err = controller.deposit().await.unwrap_err();
    assert!(err.is_rejection(), "{err}");
    assert_eq!(controller.forms().deposit_amount, "1");
    assert_eq!(ledger.balance(ALICE), ether(1));
}

#[tokio::test]
async fn invalid_amounts_never_reach_the_contract() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_deposit_amount("");
    assert!(matches!(controller.deposit().await, Err(SessionError::EmptyInput("deposit amount"))));

    controller.set_deposit_amount("-1");
    assert!(matches!(
        controller.deposit().await,
        Err(SessionError::Amount(AmountError::Negative(_)))
    ));

    controller.set_withdraw_amount("one");
    assert!(matches!(
        controller.withdraw().await,
        Err(SessionError::Amount(AmountError::Invalid { .. }))
    ));
    assert_eq!(controller.forms().withdraw_amount, "one");
    assert_eq!(ledger.balance(ALICE), ether(1));
}

#[tokio::test]
async fn actions_need_a_connection() {
    let ledger = Ledger::new();
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.take_notices();

    controller.set_deposit_amount("1");
    assert!(matches!(controller.deposit().await, Err(SessionError::NotConnected)));
    assert!(matches!(controller.refresh_balance(None).await, Err(SessionError::NotConnected)));
    assert_eq!(controller.forms().deposit_amount, "1");

    assert!(matches!(controller.transfer().await, Err(SessionError::NotConnected)));
    assert_eq!(controller.take_notices(), vec![Notice::BankNotConnected]);
}

#[tokio::test]
async fn transfer_moves_funds_between_accounts() {
    let ledger = Ledger::with_balances([(ALICE, ether(3))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_transfer_recipient(BOB.to_string());
    controller.set_transfer_amount("1.25");
    controller.transfer().await.unwrap();

    assert_eq!(ledger.balance(ALICE), U256::from(ETHER * 7 / 4));
    assert_eq!(ledger.balance(BOB), U256::from(ETHER * 5 / 4));
    assert_eq!(controller.balance(), Some(U256::from(ETHER * 7 / 4)));
    let forms = controller.forms();
    assert_eq!(forms.transfer_amount, "");
    assert_eq!(forms.transfer_recipient, "");
}

#[tokio::test]
async fn transfer_validates_recipient() {
    let ledger = Ledger::with_balances([(ALICE, ether(3))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_transfer_amount("1");
    assert!(matches!(
        controller.transfer().await,
        Err(SessionError::EmptyInput("recipient address"))
    ));
    controller.set_transfer_recipient("0x1234");
    assert!(matches!(controller.transfer().await, Err(SessionError::InvalidAddress(_))));
    assert_eq!(ledger.balance(ALICE), ether(3));
}

#[tokio::test]
async fn atm_has_no_transfer() {
    let ledger = Ledger::with_balances([(ALICE, ether(3))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Atm);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_transfer_recipient(BOB.to_string());
    controller.set_transfer_amount("1");
    assert!(matches!(controller.transfer().await, Err(SessionError::Unsupported("transfer"))));
    assert_eq!(ledger.balance(BOB), U256::ZERO);
}

#[tokio::test(start_paused = true)]
async fn looked_up_balance_clears_after_window() {
    let ledger = Ledger::with_balances([(ALICE, ether(1)), (BOB, ether(4))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_lookup_address(BOB.to_string());
    assert_eq!(controller.check_balance().await.unwrap(), ether(4));
    assert_eq!(controller.lookup().map(|lookup| (lookup.address, lookup.value)), Some((BOB, ether(4))));
    assert_eq!(controller.forms().lookup_address, "");

    tokio::time::sleep(Duration::from_millis(4_900)).await;
    assert!(controller.lookup().is_some());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(controller.lookup().is_none());
    assert_eq!(controller.forms().lookup_address, "");
    // own balance is untouched
    assert_eq!(controller.balance(), Some(ether(1)));
}

#[tokio::test(start_paused = true)]
async fn newer_lookup_owns_the_display() {
    let ledger = Ledger::with_balances([(ALICE, ether(1)), (BOB, ether(4))]);
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Atm);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.refresh_balance(Some(BOB)).await.unwrap();
    tokio::time::sleep(Duration::from_secs(3)).await;
    controller.refresh_balance(Some(ALICE)).await.unwrap();

    // the first timer fires but must not clear the second lookup
    tokio::time::sleep(Duration::from_millis(2_500)).await;
    assert_eq!(controller.lookup().map(|lookup| lookup.address), Some(ALICE));

    tokio::time::sleep(Duration::from_millis(2_600)).await;
    assert!(controller.lookup().is_none());
}

#[tokio::test]
async fn failed_lookup_still_clears_field() {
    let ledger = Ledger::new();
    let controller = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();

    controller.set_lookup_address("not an address");
    assert!(matches!(controller.check_balance().await, Err(SessionError::InvalidAddress(_))));
    assert_eq!(controller.forms().lookup_address, "");
    assert!(controller.lookup().is_none());

    controller.set_lookup_address("  ");
    assert!(matches!(controller.check_balance().await, Err(SessionError::EmptyInput(_))));
}

#[tokio::test]
async fn disconnect_resets_session() {
    let ledger = Ledger::with_balances([(ALICE, ether(1)), (BOB, ether(4))]);
    let wallet = MockWallet::new(vec![ALICE]);
    let controller = controller(Some(wallet), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();
    controller.refresh_balance(Some(BOB)).await.unwrap();
    controller.set_deposit_amount("1");
    controller.set_withdraw_amount("2");
    controller.set_lookup_address("0xabc");
    controller.set_transfer_amount("3");
    controller.set_transfer_recipient(BOB.to_string());
    controller.take_notices();

    controller.disconnect();

    assert_eq!(controller.account(), None);
    assert!(controller.client().is_none());
    assert_eq!(controller.balance(), None);
    assert!(controller.lookup().is_none());
    assert!(controller.forms().is_empty());
    assert!(controller.is_wallet_detected());
    assert!(matches!(controller.panel(), Panel::NotConnected { variant: Variant::Bank }));
    assert_eq!(controller.take_notices(), vec![Notice::ConnectWallet]);

    // the wallet is still there to reconnect with
    assert_eq!(controller.connect().await.unwrap(), ALICE);
    assert_eq!(controller.balance(), Some(ether(1)));
}

#[tokio::test]
async fn empty_accounts_changed_disconnects() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let wallet = MockWallet::new(vec![ALICE]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();
    controller.set_deposit_amount("1");
    controller.take_notices();

    wallet.emit_accounts(vec![]);
    eventually(|| controller.account().is_none()).await;

    assert!(controller.client().is_none());
    assert_eq!(controller.balance(), None);
    assert!(controller.forms().is_empty());
    assert!(matches!(controller.panel(), Panel::NotConnected { .. }));
    assert_eq!(controller.take_notices(), vec![Notice::ConnectWallet]);
}

#[tokio::test]
async fn accounts_changed_switches_account() {
    let ledger = Ledger::with_balances([(ALICE, ether(1)), (BOB, ether(4))]);
    let wallet = MockWallet::new(vec![ALICE, BOB]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();
    let binds = ledger.binds();

    wallet.emit_accounts(vec![BOB, ALICE]);
    eventually(|| controller.balance() == Some(ether(4))).await;

    assert_eq!(controller.account(), Some(BOB));
    assert_eq!(controller.client().map(|client| client.account()), Some(BOB));
    assert_eq!(ledger.binds(), binds + 1);
}

#[tokio::test]
async fn chain_changed_refreshes_balance() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let wallet = MockWallet::new(vec![ALICE]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;
    controller.connect().await.unwrap();
    let binds = ledger.binds();

    // same account, other network
    ledger.set_balance(ALICE, ether(7));
    wallet.emit_chain(11155111);
    eventually(|| controller.balance() == Some(ether(7))).await;

    assert_eq!(controller.account(), Some(ALICE));
    assert_eq!(ledger.binds(), binds);
}

#[tokio::test]
async fn chain_changed_without_account_is_ignored() {
    let ledger = Ledger::with_balances([(ALICE, ether(1))]);
    let wallet = MockWallet::new(vec![ALICE]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;

    wallet.emit_chain(1);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(controller.account(), None);
    assert_eq!(controller.balance(), None);
    assert_eq!(ledger.binds(), 0);
}

#[tokio::test]
async fn accounts_changed_connects_without_prompt() {
    let ledger = Ledger::with_balances([(BOB, ether(4))]);
    let wallet = MockWallet::new(vec![]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Atm);
    controller.mount().await;
    assert_eq!(controller.account(), None);

    wallet.emit_accounts(vec![BOB]);
    eventually(|| controller.balance() == Some(ether(4))).await;
    assert_eq!(controller.account(), Some(BOB));
}

#[tokio::test]
async fn atm_adopts_authorized_account_on_mount() {
    let ledger = Ledger::with_balances([(ALICE, ether(2))]);
    let controller =
        controller(Some(MockWallet::authorized(vec![ALICE])), &ledger, Variant::Atm);
    controller.mount().await;

    assert_eq!(controller.account(), Some(ALICE));
    assert_eq!(controller.balance(), Some(ether(2)));
    assert!(controller.take_notices().is_empty());
}

#[tokio::test]
async fn bank_waits_for_connect_on_mount() {
    let ledger = Ledger::with_balances([(ALICE, ether(2))]);
    let controller =
        controller(Some(MockWallet::authorized(vec![ALICE])), &ledger, Variant::Bank);
    controller.mount().await;

    assert_eq!(controller.account(), None);
    assert_eq!(controller.take_notices(), vec![Notice::ConnectWallet]);
}

#[tokio::test]
async fn bind_contract_needs_an_account() {
    let ledger = Ledger::new();

    let bank = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    bank.mount().await;
    bank.take_notices();
    assert!(matches!(bank.bind_contract(), Err(SessionError::NotConnected)));
    assert_eq!(bank.take_notices(), vec![Notice::ConnectWallet]);

    let atm = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Atm);
    atm.mount().await;
    assert!(matches!(atm.bind_contract(), Err(SessionError::NotConnected)));
    assert!(atm.take_notices().is_empty());
    assert_eq!(ledger.binds(), 0);

    atm.connect().await.unwrap();
    atm.bind_contract().unwrap();
    assert_eq!(ledger.binds(), 2);
    assert_eq!(atm.account(), Some(ALICE));
}

#[tokio::test]
async fn masking_is_an_atm_feature() {
    let ledger = Ledger::new();

    let atm = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Atm);
    atm.mount().await;
    atm.connect().await.unwrap();
    assert!(!atm.toggle_address().unwrap());
    assert!(matches!(atm.panel(), Panel::Connected { show_address: false, .. }));
    assert!(atm.toggle_address().unwrap());
    assert!(matches!(atm.panel(), Panel::Connected { show_address: true, .. }));

    let bank = controller(Some(MockWallet::new(vec![ALICE])), &ledger, Variant::Bank);
    assert!(matches!(bank.toggle_address(), Err(SessionError::Unsupported(_))));
}

#[tokio::test]
async fn mounting_again_is_a_no_op() {
    let ledger = Ledger::with_balances([(ALICE, ether(1)), (BOB, ether(4))]);
    let wallet = MockWallet::new(vec![ALICE, BOB]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;
    controller.mount().await;

    assert_eq!(wallet.subscribers(), 1);
    assert_eq!(controller.take_notices(), vec![Notice::ConnectWallet]);

    controller.connect().await.unwrap();
    let binds = ledger.binds();
    wallet.emit_accounts(vec![BOB]);
    eventually(|| controller.balance() == Some(ether(4))).await;
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(ledger.binds(), binds + 1);
}

#[tokio::test]
async fn dropping_controller_stops_watching() {
    let ledger = Ledger::new();
    let wallet = MockWallet::new(vec![ALICE]);
    let controller = controller(Some(wallet.clone()), &ledger, Variant::Bank);
    controller.mount().await;
    assert_eq!(wallet.subscribers(), 1);

    drop(controller);
    eventually(|| wallet.subscribers() == 0).await;
}
