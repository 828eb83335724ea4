//! Decoded RRC messages
//!
//! These are the structures exchanged with the RRC message codec. Fields
//! that the protocol signals as enumerated values keep the raw table index;
//! the RRC translates them into physical units before pushing them to
//! MAC/PHY. Optional blocks are `Option`s: absent means "keep the current
//! configuration".

use common::CellId;

// ---------------------------------------------------------------------------
// BCCH-BCH
// ---------------------------------------------------------------------------

/// Master Information Block
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Mib {
    /// Downlink bandwidth table index (n6..n100)
    pub dl_bandwidth: u8,
    pub phich_duration_extended: bool,
    /// PHICH resource table index (1/6, 1/2, 1, 2)
    pub phich_resource: u8,
    /// System frame number, 8 most significant bits
    pub sfn_div_4: u8,
}

// ---------------------------------------------------------------------------
// BCCH-DL-SCH
// ---------------------------------------------------------------------------

/// SI message scheduling entry of SIB1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulingInfo {
    /// SI periodicity table index (rf8..rf512)
    pub si_periodicity: u8,
    /// SIB types mapped onto this SI message (besides SIB2 for the first entry)
    pub sib_mapping: Vec<u8>,
}

/// System Information Block Type 1
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sib1 {
    pub cell_id: CellId,
    pub tracking_area_code: u16,
    pub cell_barred: bool,
    pub freq_band_indicator: u8,
    pub sched_info: Vec<SchedulingInfo>,
    /// SI window length table index (ms1..ms40)
    pub si_window_length: u8,
    pub system_info_value_tag: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PreamblesGroupAConfig {
    /// Number of group A preambles, table index
    pub size_of_ra: u8,
    /// Message size threshold, table index
    pub msg_size: u8,
    /// Group B power offset, table index
    pub msg_pwr_offset_group_b: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RachConfigCommon {
    pub num_ra_preambles: u8,
    pub preambles_group_a: Option<PreamblesGroupAConfig>,
    pub pwr_ramping_step: u8,
    pub preamble_init_rx_target_pwr: u8,
    pub preamble_trans_max: u8,
    pub ra_resp_win_size: u8,
    pub mac_con_res_timer: u8,
    /// Plain integer, 1..8
    pub max_harq_msg3_tx: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdschConfigCommon {
    /// Reference signal power in dBm (-60..50)
    pub rs_power: i8,
    pub p_b: u8,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HoppingMode {
    #[default]
    InterSubframe,
    IntraAndInterSubframe,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlReferenceSignalsPusch {
    pub group_hopping_enabled: bool,
    pub group_assignment_pusch: u8,
    pub sequence_hopping_enabled: bool,
    pub cyclic_shift: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuschConfigCommon {
    pub n_sb: u8,
    pub hopping_mode: HoppingMode,
    pub pusch_hopping_offset: u8,
    pub enable_64_qam: bool,
    pub ul_rs: UlReferenceSignalsPusch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PucchConfigCommon {
    /// Delta PUCCH shift, table index (ds1..ds3)
    pub delta_pucch_shift: u8,
    pub n_rb_cqi: u8,
    pub n_cs_an: u8,
    pub n1_pucch_an: u16,
}

/// Delta-F list for PUCCH formats, all table indices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeltaFListPucch {
    pub format_1: u8,
    pub format_1b: u8,
    pub format_2: u8,
    pub format_2a: u8,
    pub format_2b: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlPowerControlCommon {
    /// dBm (-126..24)
    pub p0_nominal_pusch: i8,
    /// Alpha, table index (al0..al1)
    pub alpha: u8,
    /// dBm (-127..-96)
    pub p0_nominal_pucch: i8,
    pub delta_flist_pucch: DeltaFListPucch,
    /// dB (-1..6)
    pub delta_preamble_msg3: i8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrachConfigInfo {
    pub prach_config_index: u8,
    pub high_speed_flag: bool,
    pub zero_correlation_zone_config: u8,
    pub prach_freq_offset: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrachConfigSib {
    pub root_sequence_index: u16,
    pub prach_cnfg_info: PrachConfigInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrsUlConfigCommon {
    pub bw_cnfg: u8,
    pub subfr_cnfg: u8,
    pub ack_nack_simul_tx: bool,
}

/// Common radio resource configuration carried in SIB2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RrConfigCommonSib {
    pub rach: RachConfigCommon,
    pub pdsch: PdschConfigCommon,
    pub pusch: PuschConfigCommon,
    pub pucch: PucchConfigCommon,
    /// `None` is the release choice
    pub srs_ul: Option<SrsUlConfigCommon>,
    pub ul_pwr_ctrl: UlPowerControlCommon,
    pub prach: PrachConfigSib,
}

/// System Information Block Type 2
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sib2 {
    pub rr_config_common: RrConfigCommonSib,
    /// Time alignment timer, table index
    pub time_alignment_timer: u8,
}

/// One system information block carried on BCCH-DL-SCH
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemInformationBlock {
    Sib1(Box<Sib1>),
    Sib2(Box<Sib2>),
    /// Any block type the UE does not interpret
    Other { sib_type: u8 },
}

impl SystemInformationBlock {
    /// SIB type number (1 for SIB1, 2 for SIB2, ...)
    pub fn sib_type(&self) -> u8 {
        match self {
            Self::Sib1(_) => 1,
            Self::Sib2(_) => 2,
            Self::Other { sib_type } => *sib_type,
        }
    }
}

/// BCCH-DL-SCH message: SIB1 or a System Information message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BcchDlschMessage {
    pub sibs: Vec<SystemInformationBlock>,
}

// ---------------------------------------------------------------------------
// DL-CCCH
// ---------------------------------------------------------------------------

/// RLC configuration, all timer and threshold fields as table indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RlcConfig {
    Am(RlcAmConfig),
    Um(RlcUmConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlcAmConfig {
    pub t_poll_retx: u8,
    pub poll_pdu: u8,
    pub poll_byte: u8,
    pub max_retx_thresh: u8,
    pub t_reordering: u8,
    pub t_status_prohibit: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlcUmConfig {
    /// 5 or 10
    pub sn_field_length: u8,
    pub t_reordering: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlSpecificParameters {
    /// 1..16, 1 is highest
    pub priority: u8,
    /// Prioritised bit rate, table index
    pub prioritized_bit_rate: u8,
    /// Bucket size duration, table index
    pub bucket_size_duration: u8,
    pub logical_channel_group: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogicalChannelConfig {
    pub ul_specific: Option<UlSpecificParameters>,
    pub sr_mask: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrbToAddMod {
    /// 1 or 2
    pub srb_id: u8,
    /// `None` selects the default RLC configuration
    pub rlc_config: Option<RlcConfig>,
    /// `None` selects the default logical channel configuration
    pub logical_channel_config: Option<LogicalChannelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrbToAddMod {
    pub eps_bearer_id: Option<u8>,
    /// 1..8 in this stack
    pub drb_id: u8,
    pub rlc_config: Option<RlcConfig>,
    /// Logical channel id; defaults to `drb_id + 2`
    pub lc_id: Option<u8>,
    pub logical_channel_config: Option<LogicalChannelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlschConfig {
    pub max_harq_tx: Option<u8>,
    pub periodic_bsr_timer: Option<u8>,
    pub retx_bsr_timer: u8,
    pub tti_bundling: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrxConfig {
    pub on_duration_timer: u8,
    pub drx_inactivity_timer: u8,
    pub drx_retransmission_timer: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhrConfig {
    pub periodic_phr_timer: u8,
    pub prohibit_phr_timer: u8,
    pub dl_pathloss_change: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacMainConfig {
    pub ulsch: Option<UlschConfig>,
    pub drx: Option<DrxConfig>,
    pub time_alignment_timer: u8,
    pub phr: Option<PhrConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MacMainConfigChoice {
    /// Keep the SIB2-derived defaults
    Default,
    Explicit(MacMainConfig),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdschConfigDedicated {
    pub p_a: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PucchConfigDedicated {
    pub ack_nack_repetition: bool,
    pub tdd_ack_nack_feedback_mode: Option<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PuschConfigDedicated {
    pub beta_offset_ack_idx: u8,
    pub beta_offset_ri_idx: u8,
    pub beta_offset_cqi_idx: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UlPowerControlDedicated {
    /// dB (-8..7)
    pub p0_ue_pusch: i8,
    pub delta_mcs_enabled: bool,
    pub accumulation_enabled: bool,
    /// dB (-8..7)
    pub p0_ue_pucch: i8,
    pub p_srs_offset: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TpcPdcchConfig {
    pub tpc_rnti: u16,
    pub tpc_index: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CqiFormatIndicatorPeriodic {
    WidebandCqi,
    SubbandCqi { k: u8 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CqiReportPeriodic {
    pub pucch_resource_idx: u16,
    pub pmi_cnfg_idx: u16,
    pub format_ind_periodic: CqiFormatIndicatorPeriodic,
    pub ri_cnfg_idx: Option<u16>,
    pub simult_ack_nack_and_cqi: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CqiReportConfig {
    pub report_mode_aperiodic: Option<u8>,
    pub nom_pdsch_rs_epre_offset: i8,
    /// `None` when periodic reporting is absent or released
    pub report_periodic: Option<CqiReportPeriodic>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SrsUlConfigDedicatedSetup {
    pub srs_bandwidth: u8,
    pub srs_hopping_bandwidth: u8,
    pub freq_domain_pos: u8,
    pub duration: bool,
    pub srs_cnfg_idx: u16,
    pub tx_comb: u8,
    pub cyclic_shift: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SrsUlConfigDedicated {
    Release,
    Setup(SrsUlConfigDedicatedSetup),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulingRequestSetup {
    pub sr_pucch_resource_idx: u16,
    pub sr_cnfg_idx: u8,
    /// dsr-TransMax, table index
    pub dsr_trans_max: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulingRequestConfig {
    Release,
    Setup(SchedulingRequestSetup),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AntennaInfoDedicated {
    pub transmission_mode: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalConfigDedicated {
    pub pdsch: Option<PdschConfigDedicated>,
    pub pucch: Option<PucchConfigDedicated>,
    pub pusch: Option<PuschConfigDedicated>,
    pub ul_pwr_ctrl: Option<UlPowerControlDedicated>,
    pub tpc_pdcch_pucch: Option<TpcPdcchConfig>,
    pub tpc_pdcch_pusch: Option<TpcPdcchConfig>,
    pub cqi_report: Option<CqiReportConfig>,
    pub srs_ul: Option<SrsUlConfigDedicated>,
    pub antenna_info: Option<AntennaInfoDedicated>,
    pub sched_request: Option<SchedulingRequestConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpsConfig {
    pub semi_persist_sched_c_rnti: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RlfTimersAndConstants {
    pub t301: u8,
    pub t310: u8,
    pub n310: u8,
    pub t311: u8,
    pub n311: u8,
}

/// Dedicated radio resource configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RrConfigDedicated {
    pub srb_to_add_mod: Vec<SrbToAddMod>,
    pub drb_to_add_mod: Vec<DrbToAddMod>,
    pub drb_to_release: Vec<u8>,
    pub mac_main_config: Option<MacMainConfigChoice>,
    pub sps_config: Option<SpsConfig>,
    pub phy_config_dedicated: Option<PhysicalConfigDedicated>,
    pub rlf_timers_and_constants: Option<RlfTimersAndConstants>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionSetup {
    pub transaction_id: u8,
    pub rr_config: RrConfigDedicated,
}

/// DL-CCCH message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DlCcchMessage {
    ConnectionReestablishment,
    ConnectionReestablishmentReject,
    /// Wait time in seconds (1..16)
    ConnectionReject { wait_time: u8 },
    ConnectionSetup(Box<ConnectionSetup>),
}

impl DlCcchMessage {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConnectionReestablishment => "RRCConnectionReestablishment",
            Self::ConnectionReestablishmentReject => "RRCConnectionReestablishmentReject",
            Self::ConnectionReject { .. } => "RRCConnectionReject",
            Self::ConnectionSetup(_) => "RRCConnectionSetup",
        }
    }
}

// ---------------------------------------------------------------------------
// UL-CCCH
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UeIdentity {
    STmsi { mmec: u8, m_tmsi: u32 },
    /// 40-bit random value
    RandomValue(u64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstablishmentCause {
    Emergency,
    HighPriorityAccess,
    MtAccess,
    MoSignalling,
    MoData,
    DelayTolerantAccess,
}

/// UL-CCCH message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UlCcchMessage {
    ConnectionRequest {
        ue_identity: UeIdentity,
        cause: EstablishmentCause,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sib_type_numbers() {
        let sibs = BcchDlschMessage {
            sibs: vec![
                SystemInformationBlock::Sib2(Box::default()),
                SystemInformationBlock::Other { sib_type: 3 },
            ],
        };
        let types: Vec<u8> = sibs.sibs.iter().map(|s| s.sib_type()).collect();
        assert_eq!(types, vec![2, 3]);
    }

    #[test]
    fn test_dl_ccch_names() {
        let reject = DlCcchMessage::ConnectionReject { wait_time: 4 };
        assert_eq!(reject.name(), "RRCConnectionReject");
        let setup = DlCcchMessage::ConnectionSetup(Box::default());
        assert_eq!(setup.name(), "RRCConnectionSetup");
    }
}
