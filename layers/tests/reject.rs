//! Connection Reject and its wait time

mod support;

use std::time::Duration;

use interfaces::rrc_msg::DlCcchMessage;
use layers::rrc::RrcState;
use layers::StackConfig;
use support::*;

#[tokio::test(start_paused = true)]
async fn test_reject_holds_off_acquisition() {
    let h = Harness::new().await;
    h.acquire_cell().await;

    h.deliver_ccch(DlCcchMessage::ConnectionReject { wait_time: 5 }).await.unwrap();
    assert_eq!(h.state(), RrcState::Idle);
    assert!(h.stack.rrc().in_reject_backoff().await);

    // MIBs during the wait time are cached but do not restart acquisition
    tokio::time::advance(Duration::from_secs(4)).await;
    h.deliver_mib(mib()).await.unwrap();
    assert_eq!(h.state(), RrcState::Idle);
    assert!(h.stack.rrc().mib().await.is_some());

    tokio::time::advance(Duration::from_secs(1)).await;
    assert!(!h.stack.rrc().in_reject_backoff().await);
    h.deliver_mib(mib()).await.unwrap();
    assert_eq!(h.state(), RrcState::Sib1Search);

    // No request was sent besides the rejected one
    assert_eq!(h.rlc.sdus().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_reject_wait_time_can_be_ignored() {
    let mut config = StackConfig::default();
    config.rrc.honor_reject_wait_time = false;
    let h = Harness::with_config(config).await;
    h.acquire_cell().await;

    h.deliver_ccch(DlCcchMessage::ConnectionReject { wait_time: 16 }).await.unwrap();
    assert_eq!(h.state(), RrcState::Idle);
    assert!(!h.stack.rrc().in_reject_backoff().await);

    h.deliver_mib(mib()).await.unwrap();
    assert_eq!(h.state(), RrcState::Sib1Search);
}

#[tokio::test(start_paused = true)]
async fn test_reattach_after_reject() {
    let h = Harness::new().await;
    h.acquire_cell().await;
    h.deliver_ccch(DlCcchMessage::ConnectionReject { wait_time: 1 }).await.unwrap();

    tokio::time::advance(Duration::from_secs(1)).await;
    h.acquire_cell().await;
    assert_eq!(h.rlc.sdus().len(), 2);
    assert_eq!(h.mac.contention_ids(), vec![CONTENTION_ID, CONTENTION_ID]);

    h.deliver_ccch(connection_setup()).await.unwrap();
    assert_eq!(h.state(), RrcState::Connected);
}

#[tokio::test(start_paused = true)]
async fn test_reject_outside_wait_for_setup_is_ignored() {
    let h = Harness::new().await;
    h.phy.set_sync(true);
    h.deliver_mib(mib()).await.unwrap();

    h.deliver_ccch(DlCcchMessage::ConnectionReject { wait_time: 3 }).await.unwrap();
    assert_eq!(h.state(), RrcState::Sib1Search);
    assert!(!h.stack.rrc().in_reject_backoff().await);
}
