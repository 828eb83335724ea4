//! Parameter catalog pushed from RRC to MAC and PHY
//!
//! Each knob is its own variant, so adding or removing one is caught at
//! compile time by every `match`. Values are already translated from the
//! signalled table index into physical units.

use serde::{Deserialize, Serialize};

/// MAC configuration knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacParam {
    /// Start TTI of the next BCCH SI window; `None` stops the current window
    BcchSiWindowStart(Option<u32>),
    /// SI window length in TTIs
    BcchSiWindowLength(u32),
    /// 48-bit UE contention resolution identity
    ContentionId(u64),

    /// Number of random access preambles in group A
    RaNofGroupAPreambles(u32),
    /// Message size threshold for group A, in bits
    RaMessageSizeA(u32),
    /// Group B power offset in dB; `None` is minus infinity
    RaMessagePowerOffsetB(Option<i32>),
    RaNofPreambles(u32),
    /// Power ramping step in dB
    RaPowerRampingStep(u32),
    /// Initial received target power in dBm
    RaInitReceivedPower(i32),
    RaPreambleTransMax(u32),
    /// RA response window in subframes
    RaResponseWindow(u32),
    /// Contention resolution timer in subframes
    RaContentionTimer(u32),

    HarqMaxMsg3Tx(u32),
    HarqMaxTx(u32),
    /// Periodic BSR timer in subframes; `None` is infinity
    BsrTimerPeriodic(Option<u32>),
    /// Retransmission BSR timer in subframes
    BsrTimerRetx(u32),
    /// Periodic PHR timer in subframes; `None` is infinity
    PhrTimerPeriodic(Option<u32>),
    /// Prohibit PHR timer in subframes
    PhrTimerProhibit(u32),
    /// DL pathloss change in dB; `None` is infinity
    PhrDlPathlossChange(Option<u32>),

    SrTransMax(u32),
    SrPucchConfigured(bool),
}

/// PHY configuration knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhyParam {
    /// Reference signal power in dBm
    PdschRsPower(i32),
    PdschPb(u32),

    PuschEn64Qam(bool),
    PuschHoppingOffset(u32),
    PuschHoppingNSb(u32),
    PuschHoppingIntraSf(bool),
    DmrsGroupHoppingEn(bool),
    DmrsSequenceHoppingEn(bool),
    PuschRsCyclicShift(u32),
    PuschRsGroupAssignment(u32),

    PucchDeltaShift(u32),
    PucchCyclicShift(u32),
    PucchN1(u32),
    PucchNRb2(u32),

    PwrCtrlP0NominalPusch(i32),
    /// Path loss compensation factor scaled by 10
    PwrCtrlAlpha(u32),
    PwrCtrlP0NominalPucch(i32),
    PwrCtrlDeltaPucchF1(i32),
    PwrCtrlDeltaPucchF1b(i32),
    PwrCtrlDeltaPucchF2(i32),
    PwrCtrlDeltaPucchF2a(i32),
    PwrCtrlDeltaPucchF2b(i32),
    PwrCtrlDeltaMsg3(i32),

    PrachRootSeqIdx(u32),
    PrachHighSpeedFlag(bool),
    PrachFreqOffset(u32),
    PrachZcConfig(u32),
    PrachConfigIndex(u32),

    SrsCsBwCfg(u32),
    SrsCsSfCfg(u32),
    SrsCsAckNackSimul(bool),

    UciIOffsetAck(u32),
    UciIOffsetCqi(u32),
    UciIOffsetRi(u32),

    PwrCtrlP0UePusch(i32),
    PwrCtrlDeltaMcsEn(bool),
    PwrCtrlAccEn(bool),
    PwrCtrlP0UePucch(i32),
    PwrCtrlSrsOffset(u32),

    PucchNPucch2(u32),
    CqiPeriodicPmiIdx(u32),
    CqiPeriodicSimultAck(bool),
    CqiPeriodicFormatSubband(bool),
    CqiPeriodicFormatSubbandK(u32),
    CqiPeriodicConfigured(bool),

    /// Cell-specific cyclic shift read by the SRS sequence generator
    SrsUeCs(u32),
    SrsUeDuration(bool),
    SrsUeNrrc(u32),
    SrsUeBw(u32),
    SrsUeConfigIndex(u32),
    SrsUeHop(u32),
    SrsUeCyclicShift(u32),
    SrsUeTxComb(u32),
    SrsIsConfigured(bool),

    PucchNPucchSr(u32),
    SrConfigIndex(u32),
}

/// Logical channel setup pushed to MAC for one bearer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicalChannelParams {
    /// Logical channel id used on the MAC layer
    pub lcid: u32,
    /// Logical channel group for BSR reporting
    pub group: u8,
    /// Priority, 1 is highest
    pub priority: u8,
    /// Prioritised bit rate in kB/s; `None` is infinity
    pub prioritized_bit_rate: Option<u32>,
    /// Bucket size duration in ms; `None` when not configured
    pub bucket_size_duration: Option<u32>,
}
