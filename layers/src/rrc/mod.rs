//! Radio Resource Control (RRC) Layer Implementation
//!
//! UE side of 3GPP TS 36.331: cell acquisition through MIB, SIB1 and SIB2,
//! then RRC connection establishment on SRB0.

pub mod setup;
pub mod sib2;
pub mod sib_search;
pub mod state;
pub mod tables;

pub use sib_search::{sib_start_tti, SiSchedule};
pub use state::RrcState;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use common::{be_uint, BitMessage, BufferPool, ByteBuffer, RadioBearerId};
use interfaces::rrc_msg::{
    ConnectionSetup, DlCcchMessage, EstablishmentCause, Mib, Sib1, Sib2, SystemInformationBlock,
    UeIdentity, UlCcchMessage,
};
use interfaces::{
    InterfaceError, MacInterfaceRrc, MacParam, PhyInterfaceRrc, RlcInterfaceRrc, RrcCodec,
};
use tokio::sync::{watch, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use self::sib_search::SibSearch;
use crate::config::RrcConfig;
use crate::pdcp::PdcpInterfaceRrc;
use crate::{LayerError, ProtocolLayer};

/// Length of the contention resolution identity taken from the request
const CONTENTION_ID_BYTES: usize = 6;

/// RRC services used by PDCP
#[async_trait]
pub trait RrcInterfacePdcp: Send + Sync {
    async fn write_pdu(&self, bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError>;
}

/// RRC services used by MAC for the broadcast channels
#[async_trait]
pub trait RrcInterfaceMac: Send + Sync {
    async fn write_pdu_bcch_bch(&self, pdu: ByteBuffer) -> Result<(), LayerError>;

    async fn write_pdu_bcch_dlsch(&self, pdu: ByteBuffer) -> Result<(), LayerError>;
}

/// RRC services used by RLC
#[async_trait]
pub trait RrcInterfaceRlc: Send + Sync {
    /// Maximum number of AM retransmissions reached: radio link failure
    ///
    /// May be called from inside an RLC call the RRC itself made. The
    /// recovery then runs once the RRC event in progress has finished.
    async fn max_retx_attempted(&self);
}

/// Layers the RRC drives
#[derive(Clone)]
pub struct RrcBindings {
    pub mac: Arc<dyn MacInterfaceRrc>,
    pub phy: Arc<dyn PhyInterfaceRrc>,
    pub rlc: Arc<dyn RlcInterfaceRrc>,
    pub pdcp: Arc<dyn PdcpInterfaceRrc>,
    pub codec: Arc<dyn RrcCodec>,
}

#[derive(Default)]
struct RrcContext {
    mib: Option<Mib>,
    sib1: Option<Sib1>,
    sib2: Option<Sib2>,
    sib_search: Option<JoinHandle<()>>,
    /// Cell acquisition is held off until then after a Connection Reject
    reject_backoff_until: Option<Instant>,
}

/// UE RRC
///
/// Every event handler takes the context lock first, so transitions are
/// serialised. The state itself lives in a watch channel so the SI
/// acquisition task sees each change without touching the lock.
pub struct Rrc {
    bindings: RrcBindings,
    pool: BufferPool,
    config: RrcConfig,
    state: watch::Sender<RrcState>,
    sib2_schedule: watch::Sender<Option<SiSchedule>>,
    ctx: Mutex<RrcContext>,
    /// Radio link failure signalled while an event held `ctx`
    rlf_pending: AtomicBool,
}

impl Rrc {
    pub fn new(bindings: RrcBindings, pool: BufferPool, config: RrcConfig) -> Self {
        let (state, _) = watch::channel(RrcState::Idle);
        let (sib2_schedule, _) = watch::channel(None);
        Self {
            bindings,
            pool,
            config,
            state,
            sib2_schedule,
            ctx: Mutex::new(RrcContext::default()),
            rlf_pending: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> RrcState {
        *self.state.borrow()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<RrcState> {
        self.state.subscribe()
    }

    pub async fn mib(&self) -> Option<Mib> {
        self.ctx.lock().await.mib.clone()
    }

    pub async fn sib1(&self) -> Option<Sib1> {
        self.ctx.lock().await.sib1.clone()
    }

    pub async fn sib2(&self) -> Option<Sib2> {
        self.ctx.lock().await.sib2.clone()
    }

    /// True while a Connection Reject wait time is running
    pub async fn in_reject_backoff(&self) -> bool {
        self.ctx
            .lock()
            .await
            .reject_backoff_until
            .is_some_and(|until| Instant::now() < until)
    }

    fn set_state(&self, new_state: RrcState) {
        self.state.send_if_modified(|state| {
            if *state == new_state {
                return false;
            }
            info!("RRC state {} -> {}", state, new_state);
            *state = new_state;
            true
        });
    }

    fn start_sib_search(&self, ctx: &mut RrcContext) {
        if let Some(old) = ctx.sib_search.take() {
            old.abort();
        }
        let task = SibSearch {
            mac: self.bindings.mac.clone(),
            phy: self.bindings.phy.clone(),
            state: self.state.subscribe(),
            sib2_schedule: self.sib2_schedule.subscribe(),
            interval: Duration::from_millis(self.config.sib_search_interval_ms),
            settle: Duration::from_millis(self.config.sync_settle_ms),
        };
        ctx.sib_search = Some(task.spawn());
    }

    /// Release the context, then run a recovery signalled meanwhile
    async fn finish_event(&self, ctx: MutexGuard<'_, RrcContext>) {
        drop(ctx);
        if self.rlf_pending.load(Ordering::Acquire) {
            let mut ctx = self.ctx.lock().await;
            self.handle_pending_rlf(&mut ctx).await;
        }
    }

    async fn handle_pending_rlf(&self, ctx: &mut RrcContext) {
        if !self.rlf_pending.swap(false, Ordering::AcqRel) {
            return;
        }

        let state = self.state();
        if state == RrcState::Idle {
            warn!("Radio link failure signalled in {}, nothing to recover", state);
            return;
        }

        warn!("Radio link failure in state {}: max RLC retransmissions reached", state);
        self.set_state(RrcState::Idle);
        if let Some(task) = ctx.sib_search.take() {
            task.abort();
        }
        self.stop_si_window().await;
        self.bindings.mac.reset().await;
        self.bindings.pdcp.reset().await;

        ctx.sib1 = None;
        ctx.sib2 = None;
        self.sib2_schedule.send_replace(None);
    }

    async fn stop_si_window(&self) {
        self.bindings.mac.set_param(MacParam::BcchSiWindowStart(None)).await;
    }

    async fn handle_sib1(&self, ctx: &mut RrcContext, sib1: &Sib1) -> Result<(), LayerError> {
        let schedule = SiSchedule::sib2_from(sib1).map_err(|e| {
            error!("Dropping SIB1 in state {}: {}", self.state(), e);
            e
        })?;

        info!(
            "SIB1 received, CellID={}, si_window={}, sib2_period={}",
            sib1.cell_id.local_id(),
            schedule.window_length,
            schedule.period
        );
        ctx.sib1 = Some(sib1.clone());
        self.sib2_schedule.send_replace(Some(schedule));
        self.set_state(RrcState::Sib2Search);
        self.stop_si_window().await;
        Ok(())
    }

    async fn handle_sib2(&self, ctx: &mut RrcContext, sib2: &Sib2) -> Result<(), LayerError> {
        let state = self.state();
        let params = sib2::translate(sib2).map_err(|e| {
            error!("Dropping SIB2 in state {}: {}", state, e);
            e
        })?;
        let (request, contention_id) = self.build_con_request().map_err(|e| {
            error!("Cannot build Connection Request in state {}: {}", state, e);
            e
        })?;

        info!("SIB2 received");
        ctx.sib2 = Some(sib2.clone());
        self.set_state(RrcState::WaitForConnSetup);
        self.stop_si_window().await;

        info!(
            "Applying SIB2 common config: {} MAC and {} PHY parameters",
            params.mac.len(),
            params.phy.len()
        );
        for param in params.mac {
            self.bindings.mac.set_param(param).await;
        }
        for param in params.phy {
            self.bindings.phy.set_param(param).await;
        }
        self.bindings.phy.configure_ul_params().await;

        self.send_con_request(request, contention_id).await
    }

    /// Pack a Connection Request and derive the contention resolution identity
    fn build_con_request(&self) -> Result<(ByteBuffer, u64), LayerError> {
        let request = UlCcchMessage::ConnectionRequest {
            ue_identity: UeIdentity::RandomValue(rand::random::<u32>() as u64),
            cause: EstablishmentCause::MoSignalling,
        };

        let mut bits = self.bindings.codec.pack_ul_ccch(&request)?;
        bits.byte_align();
        let bytes = bits.to_bytes();

        let contention_id = be_uint(&bytes, CONTENTION_ID_BYTES).ok_or_else(|| {
            InterfaceError::Encode(format!(
                "Connection Request of {} bytes is shorter than the contention resolution identity",
                bytes.len()
            ))
        })?;

        Ok((self.pool.allocate_from(&bytes)?, contention_id))
    }

    async fn send_con_request(&self, request: ByteBuffer, contention_id: u64) -> Result<(), LayerError> {
        debug!("Setting UE contention resolution ID: {:#014x}", contention_id);
        self.bindings.mac.set_param(MacParam::ContentionId(contention_id)).await;

        info!("Sending RRC Connection Request on SRB0");
        self.bindings.pdcp.write_sdu(RadioBearerId::Srb0, request).await
    }

    async fn parse_dl_ccch(&self, pdu: ByteBuffer) -> Result<(), LayerError> {
        let msg = BitMessage::from_bytes(&pdu);
        pdu.release();

        let mut ctx = self.ctx.lock().await;
        let result = self.handle_dl_ccch(&mut ctx, &msg).await;
        self.finish_event(ctx).await;
        result
    }

    async fn handle_dl_ccch(&self, ctx: &mut RrcContext, msg: &BitMessage) -> Result<(), LayerError> {
        let state = self.state();
        let decoded = self.bindings.codec.unpack_dl_ccch(msg).map_err(|e| {
            error!("Failed to unpack DL-CCCH message on SRB0 in state {}: {}", state, e);
            e
        })?;

        match &decoded {
            DlCcchMessage::ConnectionReject { wait_time } if state == RrcState::WaitForConnSetup => {
                info!("Connection Reject received. Wait time: {} s", wait_time);
                if self.config.honor_reject_wait_time {
                    ctx.reject_backoff_until =
                        Some(Instant::now() + Duration::from_secs(*wait_time as u64));
                }
                self.set_state(RrcState::Idle);
                Ok(())
            }
            DlCcchMessage::ConnectionSetup(setup) if state == RrcState::WaitForConnSetup => {
                info!("Connection Setup received");
                self.handle_con_setup(setup).await
            }
            DlCcchMessage::ConnectionReject { .. } | DlCcchMessage::ConnectionSetup(_) => {
                warn!("Ignoring {} in state {}", decoded.name(), state);
                Ok(())
            }
            DlCcchMessage::ConnectionReestablishment | DlCcchMessage::ConnectionReestablishmentReject => {
                warn!("Not handling {} message (state {})", decoded.name(), state);
                Ok(())
            }
        }
    }

    async fn parse_dl_dcch(&self, bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError> {
        warn!(
            "DL-DCCH message on {} dropped in state {}: decoding not implemented ({} bytes)",
            bearer,
            self.state(),
            pdu.len()
        );
        pdu.release();
        Err(LayerError::NotSupported("DCCH message decoding"))
    }

    async fn handle_con_setup(&self, setup: &ConnectionSetup) -> Result<(), LayerError> {
        let actions = setup::translate(&setup.rr_config).map_err(|e| {
            error!("Dropping Connection Setup in state {}: {}", self.state(), e);
            e
        })?;

        for block in &actions.unsupported {
            warn!("{} not supported, ignored", block);
        }

        for param in &actions.phy {
            self.bindings.phy.set_param(*param).await;
        }
        for param in &actions.mac {
            self.bindings.mac.set_param(*param).await;
        }
        if actions.commit_ul_params {
            self.bindings.phy.configure_ul_params().await;
            info!("Set PHY config dedicated ({} parameters)", actions.phy.len());
        }

        for bearer in actions.bearers {
            self.bindings.pdcp.add_bearer(bearer.bearer).await?;
            self.bindings.rlc.add_bearer(bearer.bearer, bearer.rlc_config).await?;
            self.bindings.mac.setup_lcid(bearer.bearer, bearer.logical_channel).await;
            info!(
                "Set up {}: lcid={}, priority={}, group={}",
                bearer.bearer,
                bearer.logical_channel.lcid,
                bearer.logical_channel.priority,
                bearer.logical_channel.group
            );
        }

        self.set_state(RrcState::Connected);
        Ok(())
    }

    async fn handle_bcch_bch(&self, ctx: &mut RrcContext, msg: &BitMessage) -> Result<(), LayerError> {
        let state = self.state();
        let mib = self.bindings.codec.unpack_bcch_bch(msg).map_err(|e| {
            error!("Failed to unpack BCCH-BCH message in state {}: {}", state, e);
            e
        })?;
        ctx.mib = Some(mib.clone());

        if state != RrcState::Idle {
            debug!("MIB refreshed in state {}", state);
            return Ok(());
        }
        if let Some(until) = ctx.reject_backoff_until {
            if Instant::now() < until {
                info!("MIB ignored, Connection Reject wait time still running");
                return Ok(());
            }
            ctx.reject_backoff_until = None;
        }

        match (tables::dl_bandwidth_mhz(mib.dl_bandwidth), tables::dl_bandwidth_prb(mib.dl_bandwidth)) {
            (Ok(mhz), Ok(prb)) => {
                info!("MIB received, BW={} MHz ({} PRB), SFN/4={}", mhz, prb, mib.sfn_div_4)
            }
            (Err(e), _) | (_, Err(e)) => warn!("MIB received with {}", e),
        }

        self.sib2_schedule.send_replace(None);
        self.set_state(RrcState::Sib1Search);
        self.start_sib_search(ctx);
        Ok(())
    }

    async fn handle_bcch_dlsch(&self, ctx: &mut RrcContext, msg: &BitMessage) -> Result<(), LayerError> {
        let state = self.state();
        let decoded = self.bindings.codec.unpack_bcch_dlsch(msg).map_err(|e| {
            error!("Failed to unpack BCCH-DLSCH message in state {}: {}", state, e);
            e
        })?;

        match (decoded.sibs.first(), state) {
            (Some(SystemInformationBlock::Sib1(sib1)), RrcState::Sib1Search) => {
                self.handle_sib1(ctx, sib1).await
            }
            (Some(SystemInformationBlock::Sib2(sib2)), RrcState::Sib2Search) => {
                self.handle_sib2(ctx, sib2).await
            }
            (Some(sib), _) => {
                debug!("Ignoring SIB{} in state {}", sib.sib_type(), state);
                Ok(())
            }
            (None, _) => {
                debug!("BCCH-DLSCH message without SIBs");
                Ok(())
            }
        }
    }
}

#[async_trait]
impl RrcInterfaceMac for Rrc {
    async fn write_pdu_bcch_bch(&self, pdu: ByteBuffer) -> Result<(), LayerError> {
        let msg = BitMessage::from_bytes(&pdu);
        pdu.release();

        let mut ctx = self.ctx.lock().await;
        let result = self.handle_bcch_bch(&mut ctx, &msg).await;
        self.finish_event(ctx).await;
        result
    }

    async fn write_pdu_bcch_dlsch(&self, pdu: ByteBuffer) -> Result<(), LayerError> {
        debug!("BCCH DLSCH message received: {}", pdu.hex());
        let msg = BitMessage::from_bytes(&pdu);
        pdu.release();

        let mut ctx = self.ctx.lock().await;
        let result = self.handle_bcch_dlsch(&mut ctx, &msg).await;
        self.finish_event(ctx).await;
        result
    }
}

#[async_trait]
impl RrcInterfacePdcp for Rrc {
    async fn write_pdu(&self, bearer: RadioBearerId, pdu: ByteBuffer) -> Result<(), LayerError> {
        match bearer {
            RadioBearerId::Srb0 => self.parse_dl_ccch(pdu).await,
            RadioBearerId::Srb1 | RadioBearerId::Srb2 => self.parse_dl_dcch(bearer, pdu).await,
            RadioBearerId::Drb(_) => {
                error!("RRC PDU received on {} in state {}", bearer, self.state());
                pdu.release();
                Err(LayerError::InvalidBearer(bearer))
            }
        }
    }
}

#[async_trait]
impl RrcInterfaceRlc for Rrc {
    async fn max_retx_attempted(&self) {
        self.rlf_pending.store(true, Ordering::Release);
        // Busy means an event is running, possibly the one that called us;
        // its holder picks the failure up in finish_event
        if let Ok(mut ctx) = self.ctx.try_lock() {
            self.handle_pending_rlf(&mut ctx).await;
        } else {
            debug!("Radio link failure deferred until the current RRC event completes");
        }
    }
}

#[async_trait]
impl ProtocolLayer for Rrc {
    async fn initialize(&self) -> Result<(), LayerError> {
        info!("Initializing RRC layer");
        debug!(
            "RRC config: sib_search_interval={} ms, sync_settle={} ms, honor_reject_wait_time={}",
            self.config.sib_search_interval_ms,
            self.config.sync_settle_ms,
            self.config.honor_reject_wait_time
        );
        let mut ctx = self.ctx.lock().await;
        if let Some(task) = ctx.sib_search.take() {
            task.abort();
        }
        *ctx = RrcContext::default();
        self.rlf_pending.store(false, Ordering::Release);
        self.sib2_schedule.send_replace(None);
        self.set_state(RrcState::Idle);
        Ok(())
    }

    async fn shutdown(&self) -> Result<(), LayerError> {
        info!("Shutting down RRC layer");
        let mut ctx = self.ctx.lock().await;
        if let Some(task) = ctx.sib_search.take() {
            task.abort();
        }
        self.set_state(RrcState::Idle);
        Ok(())
    }
}

impl Drop for Rrc {
    fn drop(&mut self) {
        if let Some(task) = self.ctx.get_mut().sib_search.take() {
            task.abort();
        }
    }
}
