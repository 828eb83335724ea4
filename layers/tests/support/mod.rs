//! Recording lower layers and a scripted codec for the RRC/PDCP tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use common::{BitMessage, ByteBuffer, CellId, RadioBearerId};
use interfaces::rrc_msg::{
    BcchDlschMessage, ConnectionSetup, DlCcchMessage, Mib, RlcConfig, RrConfigDedicated,
    SchedulingInfo, Sib1, Sib2, SrbToAddMod, SystemInformationBlock, UlCcchMessage,
};
use interfaces::{
    GwInterfacePdcp, InterfaceError, LogicalChannelParams, MacInterfaceRrc, MacParam,
    PhyInterfaceRrc, PhyParam, RlcInterfacePdcp, RlcInterfaceRrc, RrcCodec,
};
use layers::pdcp::PdcpInterfaceRlc;
use layers::rrc::{Rrc, RrcInterfaceMac, RrcInterfaceRlc, RrcState};
use layers::{LayerError, StackConfig, UeStack};
use tokio::sync::watch;

/// Packed Connection Request the codec hands back, before byte alignment
pub const REQUEST_BYTES: [u8; 6] = [0x12, 0x34, 0x56, 0x78, 0x9a, 0xb8];
pub const REQUEST_BITS: usize = 45;
pub const CONTENTION_ID: u64 = 0x1234_5678_9ab8;

#[derive(Default)]
pub struct MockMac {
    pub params: Mutex<Vec<MacParam>>,
    pub lcids: Mutex<Vec<(RadioBearerId, LogicalChannelParams)>>,
    pub resets: AtomicUsize,
    pub tti: AtomicU32,
}

impl MockMac {
    pub fn params(&self) -> Vec<MacParam> {
        self.params.lock().unwrap().clone()
    }

    /// Every SI window start pushed so far, `None` for a stop
    pub fn window_starts(&self) -> Vec<Option<u32>> {
        self.params()
            .into_iter()
            .filter_map(|p| match p {
                MacParam::BcchSiWindowStart(start) => Some(start),
                _ => None,
            })
            .collect()
    }

    pub fn contention_ids(&self) -> Vec<u64> {
        self.params()
            .into_iter()
            .filter_map(|p| match p {
                MacParam::ContentionId(id) => Some(id),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl MacInterfaceRrc for MockMac {
    async fn set_param(&self, param: MacParam) {
        self.params.lock().unwrap().push(param);
    }

    async fn current_tti(&self) -> u32 {
        self.tti.load(Ordering::Relaxed)
    }

    async fn setup_lcid(&self, bearer: RadioBearerId, params: LogicalChannelParams) {
        self.lcids.lock().unwrap().push((bearer, params));
    }

    async fn reset(&self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }
}

pub struct MockPhy {
    pub params: Mutex<Vec<PhyParam>>,
    pub ul_commits: AtomicUsize,
    sync: watch::Sender<bool>,
}

impl Default for MockPhy {
    fn default() -> Self {
        let (sync, _) = watch::channel(false);
        Self {
            params: Mutex::new(Vec::new()),
            ul_commits: AtomicUsize::new(0),
            sync,
        }
    }
}

impl MockPhy {
    pub fn set_sync(&self, in_sync: bool) {
        self.sync.send_replace(in_sync);
    }

    pub fn params(&self) -> Vec<PhyParam> {
        self.params.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhyInterfaceRrc for MockPhy {
    async fn set_param(&self, param: PhyParam) {
        self.params.lock().unwrap().push(param);
    }

    async fn configure_ul_params(&self) {
        self.ul_commits.fetch_add(1, Ordering::Relaxed);
    }

    async fn wait_for_sync(&self) {
        let mut rx = self.sync.subscribe();
        let _ = rx.wait_for(|in_sync| *in_sync).await;
    }
}

/// Copies out and releases every SDU it is given
#[derive(Default)]
pub struct MockRlc {
    pub sdus: Mutex<Vec<(RadioBearerId, Bytes)>>,
    pub bearers: Mutex<Vec<(RadioBearerId, Option<RlcConfig>)>>,
    /// Reports max retransmissions to this RRC from inside the next `write_sdu`
    pub fail_link: Mutex<Option<Weak<Rrc>>>,
}

impl MockRlc {
    pub fn sdus(&self) -> Vec<(RadioBearerId, Bytes)> {
        self.sdus.lock().unwrap().clone()
    }

    pub fn bearers(&self) -> Vec<(RadioBearerId, Option<RlcConfig>)> {
        self.bearers.lock().unwrap().clone()
    }
}

#[async_trait]
impl RlcInterfacePdcp for MockRlc {
    async fn write_sdu(&self, bearer: RadioBearerId, sdu: ByteBuffer) -> Result<(), InterfaceError> {
        self.sdus.lock().unwrap().push((bearer, sdu.to_bytes()));
        sdu.release();

        let rrc = self.fail_link.lock().unwrap().take().and_then(|rrc| rrc.upgrade());
        if let Some(rrc) = rrc {
            rrc.max_retx_attempted().await;
        }
        Ok(())
    }
}

#[async_trait]
impl RlcInterfaceRrc for MockRlc {
    async fn add_bearer(&self, bearer: RadioBearerId, config: Option<RlcConfig>) -> Result<(), InterfaceError> {
        self.bearers.lock().unwrap().push((bearer, config));
        Ok(())
    }
}

#[derive(Default)]
pub struct MockGw {
    pub pdus: AtomicUsize,
}

#[async_trait]
impl GwInterfacePdcp for MockGw {
    async fn write_pdu(&self, _bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), InterfaceError> {
        self.pdus.fetch_add(1, Ordering::Relaxed);
        pdu.release();
        Ok(())
    }
}

/// Decodes whatever was queued for the channel, regardless of the bits
pub struct ScriptedCodec {
    bch: Mutex<VecDeque<Mib>>,
    dlsch: Mutex<VecDeque<BcchDlschMessage>>,
    ccch: Mutex<VecDeque<DlCcchMessage>>,
    pub requests: Mutex<Vec<UlCcchMessage>>,
    pub request_bits: AtomicUsize,
}

impl Default for ScriptedCodec {
    fn default() -> Self {
        Self {
            bch: Mutex::default(),
            dlsch: Mutex::default(),
            ccch: Mutex::default(),
            requests: Mutex::default(),
            request_bits: AtomicUsize::new(REQUEST_BITS),
        }
    }
}

impl ScriptedCodec {
    pub fn push_mib(&self, mib: Mib) {
        self.bch.lock().unwrap().push_back(mib);
    }

    pub fn push_sib(&self, sib: SystemInformationBlock) {
        self.dlsch.lock().unwrap().push_back(BcchDlschMessage { sibs: vec![sib] });
    }

    pub fn push_ccch(&self, msg: DlCcchMessage) {
        self.ccch.lock().unwrap().push_back(msg);
    }

    pub fn requests(&self) -> Vec<UlCcchMessage> {
        self.requests.lock().unwrap().clone()
    }
}

fn nothing_queued(channel: &str) -> InterfaceError {
    InterfaceError::Decode(format!("nothing queued on {}", channel))
}

impl RrcCodec for ScriptedCodec {
    fn unpack_bcch_bch(&self, _msg: &BitMessage) -> Result<Mib, InterfaceError> {
        self.bch.lock().unwrap().pop_front().ok_or_else(|| nothing_queued("BCCH-BCH"))
    }

    fn unpack_bcch_dlsch(&self, _msg: &BitMessage) -> Result<BcchDlschMessage, InterfaceError> {
        self.dlsch.lock().unwrap().pop_front().ok_or_else(|| nothing_queued("BCCH-DLSCH"))
    }

    fn unpack_dl_ccch(&self, _msg: &BitMessage) -> Result<DlCcchMessage, InterfaceError> {
        self.ccch.lock().unwrap().pop_front().ok_or_else(|| nothing_queued("DL-CCCH"))
    }

    fn pack_ul_ccch(&self, msg: &UlCcchMessage) -> Result<BitMessage, InterfaceError> {
        self.requests.lock().unwrap().push(msg.clone());
        let mut bits = BitMessage::from_bytes(&REQUEST_BYTES).bits().to_vec();
        bits.truncate(self.request_bits.load(Ordering::Relaxed));
        Ok(BitMessage::from_bits(bits))
    }
}

pub fn mib() -> Mib {
    Mib {
        dl_bandwidth: 2,
        phich_duration_extended: false,
        phich_resource: 1,
        sfn_div_4: 12,
    }
}

/// SIB1 scheduling SIB2 every 16 frames in a 15 ms window
pub fn sib1() -> SystemInformationBlock {
    SystemInformationBlock::Sib1(Box::new(Sib1 {
        cell_id: CellId(0x1a2d_0101),
        tracking_area_code: 7,
        sched_info: vec![SchedulingInfo { si_periodicity: 1, sib_mapping: vec![3] }],
        si_window_length: 4,
        ..Default::default()
    }))
}

pub fn sib2() -> SystemInformationBlock {
    let mut sib2 = Sib2::default();
    let rach = &mut sib2.rr_config_common.rach;
    rach.num_ra_preambles = 12;
    rach.preamble_init_rx_target_pwr = 6;
    rach.ra_resp_win_size = 7;
    rach.mac_con_res_timer = 7;
    rach.max_harq_msg3_tx = 4;
    SystemInformationBlock::Sib2(Box::new(sib2))
}

/// Connection Setup adding SRB1 with default RLC and logical channel config
pub fn connection_setup() -> DlCcchMessage {
    DlCcchMessage::ConnectionSetup(Box::new(ConnectionSetup {
        transaction_id: 0,
        rr_config: RrConfigDedicated {
            srb_to_add_mod: vec![SrbToAddMod { srb_id: 1, ..Default::default() }],
            ..Default::default()
        },
    }))
}

pub struct Harness {
    pub stack: UeStack,
    pub mac: Arc<MockMac>,
    pub phy: Arc<MockPhy>,
    pub rlc: Arc<MockRlc>,
    pub gw: Arc<MockGw>,
    pub codec: Arc<ScriptedCodec>,
}

impl Harness {
    pub async fn new() -> Self {
        Self::with_config(StackConfig::default()).await
    }

    pub async fn with_config(config: StackConfig) -> Self {
        common::logging::init_test_logging();

        let mac = Arc::new(MockMac::default());
        let phy = Arc::new(MockPhy::default());
        let rlc = Arc::new(MockRlc::default());
        let gw = Arc::new(MockGw::default());
        let codec = Arc::new(ScriptedCodec::default());

        let stack = UeStack::builder(config)
            .mac(mac.clone())
            .phy(phy.clone())
            .rlc(rlc.clone())
            .gw(gw.clone())
            .codec(codec.clone())
            .build()
            .unwrap();
        stack.start().await.unwrap();

        Self { stack, mac, phy, rlc, gw, codec }
    }

    pub fn state(&self) -> RrcState {
        self.stack.rrc().state()
    }

    fn pdu(&self) -> ByteBuffer {
        self.stack.pool().allocate_from(&[0xa5, 0x5a]).unwrap()
    }

    pub async fn deliver_mib(&self, mib: Mib) -> Result<(), LayerError> {
        self.codec.push_mib(mib);
        self.stack.rrc().write_pdu_bcch_bch(self.pdu()).await
    }

    pub async fn deliver_sib(&self, sib: SystemInformationBlock) -> Result<(), LayerError> {
        self.codec.push_sib(sib);
        self.stack.rrc().write_pdu_bcch_dlsch(self.pdu()).await
    }

    /// DL-CCCH message through the PDCP SRB0 entity, the way RLC delivers it
    pub async fn deliver_ccch(&self, msg: DlCcchMessage) -> Result<(), LayerError> {
        self.codec.push_ccch(msg);
        self.stack.pdcp().write_pdu(RadioBearerId::Srb0, self.pdu()).await
    }

    /// Run acquisition up to the point the Connection Request is out
    pub async fn acquire_cell(&self) {
        self.phy.set_sync(true);
        self.deliver_mib(mib()).await.unwrap();
        assert_eq!(self.state(), RrcState::Sib1Search);
        self.deliver_sib(sib1()).await.unwrap();
        assert_eq!(self.state(), RrcState::Sib2Search);
        self.deliver_sib(sib2()).await.unwrap();
        assert_eq!(self.state(), RrcState::WaitForConnSetup);
    }

    /// Have RLC signal a radio link failure while delivering the next SDU
    pub fn fail_link_on_next_sdu(&self) {
        *self.rlc.fail_link.lock().unwrap() = Some(Arc::downgrade(self.stack.rrc()));
    }

    pub async fn connect(&self) {
        self.acquire_cell().await;
        self.deliver_ccch(connection_setup()).await.unwrap();
        assert_eq!(self.state(), RrcState::Connected);
    }
}

/// Poll `cond` until it holds, letting spawned tasks and timers run
pub async fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    for _ in 0..200 {
        if cond() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    cond()
}
