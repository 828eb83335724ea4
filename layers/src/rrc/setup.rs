//! RRC Connection Setup: dedicated radio resource configuration
//!
//! [`translate`] turns the decoded configuration into the parameter pushes
//! and bearer setups the RRC performs. Nothing is applied when any block is
//! malformed.

use common::RadioBearerId;
use interfaces::rrc_msg::{
    CqiFormatIndicatorPeriodic, DrbToAddMod, LogicalChannelConfig, MacMainConfig, MacMainConfigChoice,
    PhysicalConfigDedicated, RlcConfig, RrConfigDedicated, SchedulingRequestConfig, SrbToAddMod,
    SrsUlConfigDedicated,
};
use interfaces::{LogicalChannelParams, MacParam, PhyParam};

use super::tables;
use crate::LayerError;

/// Default priority of SRB1; SRB2 is served after it
const SRB1_DEFAULT_PRIORITY: u8 = 1;
const SRB2_DEFAULT_PRIORITY: u8 = 3;

/// Bearer to create in PDCP, RLC and MAC
#[derive(Debug, Clone, PartialEq)]
pub struct BearerSetup {
    pub bearer: RadioBearerId,
    /// `None` selects the RLC default configuration
    pub rlc_config: Option<RlcConfig>,
    pub logical_channel: LogicalChannelParams,
}

/// Everything a Connection Setup asks for, in application order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupActions {
    pub phy: Vec<PhyParam>,
    pub mac: Vec<MacParam>,
    /// PHY dedicated config was present, so uplink params must be committed
    pub commit_ul_params: bool,
    pub bearers: Vec<BearerSetup>,
    /// Signalled blocks this UE does not act upon
    pub unsupported: Vec<&'static str>,
}

pub fn translate(cfg: &RrConfigDedicated) -> Result<SetupActions, LayerError> {
    let mut actions = SetupActions::default();

    if let Some(phy_cfg) = &cfg.phy_config_dedicated {
        phy_dedicated(phy_cfg, &mut actions)?;
        actions.commit_ul_params = true;
    }

    match &cfg.mac_main_config {
        Some(MacMainConfigChoice::Explicit(mac_cfg)) => mac_main(mac_cfg, &mut actions)?,
        Some(MacMainConfigChoice::Default) | None => {}
    }

    if cfg.sps_config.is_some() {
        actions.unsupported.push("SPS config");
    }
    if cfg.rlf_timers_and_constants.is_some() {
        actions.unsupported.push("RLF timers and constants");
    }
    if !cfg.drb_to_release.is_empty() {
        actions.unsupported.push("DRB release");
    }

    for srb in &cfg.srb_to_add_mod {
        actions.bearers.push(srb_setup(srb)?);
    }
    for drb in &cfg.drb_to_add_mod {
        actions.bearers.push(drb_setup(drb)?);
    }

    Ok(actions)
}

fn phy_dedicated(cfg: &PhysicalConfigDedicated, actions: &mut SetupActions) -> Result<(), LayerError> {
    let phy = &mut actions.phy;

    if cfg.pucch.is_some() {
        actions.unsupported.push("PUCCH config dedicated");
    }

    if let Some(pusch) = &cfg.pusch {
        phy.extend([
            PhyParam::UciIOffsetAck(pusch.beta_offset_ack_idx as u32),
            PhyParam::UciIOffsetCqi(pusch.beta_offset_cqi_idx as u32),
            PhyParam::UciIOffsetRi(pusch.beta_offset_ri_idx as u32),
        ]);
    }

    if let Some(pwr) = &cfg.ul_pwr_ctrl {
        phy.extend([
            PhyParam::PwrCtrlP0UePusch(pwr.p0_ue_pusch as i32),
            PhyParam::PwrCtrlDeltaMcsEn(pwr.delta_mcs_enabled),
            PhyParam::PwrCtrlAccEn(pwr.accumulation_enabled),
            PhyParam::PwrCtrlP0UePucch(pwr.p0_ue_pucch as i32),
            PhyParam::PwrCtrlSrsOffset(pwr.p_srs_offset as u32),
        ]);
    }

    if cfg.tpc_pdcch_pucch.is_some() {
        actions.unsupported.push("TPC-PDCCH config PUCCH");
    }
    if cfg.tpc_pdcch_pusch.is_some() {
        actions.unsupported.push("TPC-PDCCH config PUSCH");
    }

    if let Some(cqi) = &cfg.cqi_report {
        if cqi.report_mode_aperiodic.is_some() {
            actions.unsupported.push("aperiodic CQI reporting");
        }
        match &cqi.report_periodic {
            Some(periodic) => {
                phy.extend([
                    PhyParam::PucchNPucch2(periodic.pucch_resource_idx as u32),
                    PhyParam::CqiPeriodicPmiIdx(periodic.pmi_cnfg_idx as u32),
                    PhyParam::CqiPeriodicSimultAck(periodic.simult_ack_nack_and_cqi),
                ]);
                match periodic.format_ind_periodic {
                    CqiFormatIndicatorPeriodic::WidebandCqi => {
                        phy.push(PhyParam::CqiPeriodicFormatSubband(false));
                    }
                    CqiFormatIndicatorPeriodic::SubbandCqi { k } => {
                        phy.push(PhyParam::CqiPeriodicFormatSubband(true));
                        phy.push(PhyParam::CqiPeriodicFormatSubbandK(k as u32));
                    }
                }
                phy.push(PhyParam::CqiPeriodicConfigured(true));
            }
            None => phy.push(PhyParam::CqiPeriodicConfigured(false)),
        }
    }

    match &cfg.srs_ul {
        Some(SrsUlConfigDedicated::Setup(srs)) => phy.extend([
            PhyParam::SrsUeCs(srs.cyclic_shift as u32),
            PhyParam::SrsUeDuration(srs.duration),
            PhyParam::SrsUeNrrc(srs.freq_domain_pos as u32),
            PhyParam::SrsUeBw(srs.srs_bandwidth as u32),
            PhyParam::SrsUeConfigIndex(srs.srs_cnfg_idx as u32),
            PhyParam::SrsUeHop(srs.srs_hopping_bandwidth as u32),
            PhyParam::SrsUeCyclicShift(srs.cyclic_shift as u32),
            PhyParam::SrsUeTxComb(srs.tx_comb as u32),
            PhyParam::SrsIsConfigured(true),
        ]),
        Some(SrsUlConfigDedicated::Release) => phy.push(PhyParam::SrsIsConfigured(false)),
        None => {}
    }

    if cfg.antenna_info.is_some() {
        actions.unsupported.push("antenna info dedicated");
    }

    match &cfg.sched_request {
        Some(SchedulingRequestConfig::Setup(sr)) => {
            phy.extend([
                PhyParam::PucchNPucchSr(sr.sr_pucch_resource_idx as u32),
                PhyParam::SrConfigIndex(sr.sr_cnfg_idx as u32),
            ]);
            actions.mac.extend([
                MacParam::SrTransMax(tables::dsr_trans_max(sr.dsr_trans_max)?),
                MacParam::SrPucchConfigured(true),
            ]);
        }
        Some(SchedulingRequestConfig::Release) => actions.mac.push(MacParam::SrPucchConfigured(false)),
        None => {}
    }

    if cfg.pdsch.is_some() {
        actions.unsupported.push("PDSCH config dedicated");
    }

    Ok(())
}

fn mac_main(cfg: &MacMainConfig, actions: &mut SetupActions) -> Result<(), LayerError> {
    if let Some(ulsch) = &cfg.ulsch {
        if let Some(max_harq_tx) = ulsch.max_harq_tx {
            actions.mac.push(MacParam::HarqMaxTx(tables::max_harq_tx(max_harq_tx)?));
        }
        if let Some(periodic) = ulsch.periodic_bsr_timer {
            actions.mac.push(MacParam::BsrTimerPeriodic(tables::periodic_bsr_timer(periodic)?));
        }
        actions.mac.push(MacParam::BsrTimerRetx(tables::retx_bsr_timer(ulsch.retx_bsr_timer)?));
        if ulsch.tti_bundling {
            actions.unsupported.push("TTI bundling");
        }
    }

    if cfg.drx.is_some() {
        actions.unsupported.push("DRX config");
    }

    if let Some(phr) = &cfg.phr {
        actions.mac.extend([
            MacParam::PhrTimerPeriodic(tables::periodic_phr_timer(phr.periodic_phr_timer)?),
            MacParam::PhrTimerProhibit(tables::prohibit_phr_timer(phr.prohibit_phr_timer)?),
            MacParam::PhrDlPathlossChange(tables::dl_pathloss_change(phr.dl_pathloss_change)?),
        ]);
    }

    Ok(())
}

fn srb_setup(srb: &SrbToAddMod) -> Result<BearerSetup, LayerError> {
    let (bearer, default_priority) = match srb.srb_id {
        1 => (RadioBearerId::Srb1, SRB1_DEFAULT_PRIORITY),
        2 => (RadioBearerId::Srb2, SRB2_DEFAULT_PRIORITY),
        id => return Err(LayerError::InvalidPdu(format!("SRB id {} in SRB-ToAddMod", id))),
    };

    let mut logical_channel = LogicalChannelParams {
        lcid: bearer.lcid(),
        group: 0,
        priority: default_priority,
        prioritized_bit_rate: None,
        bucket_size_duration: None,
    };
    if let Some(lc_cfg) = &srb.logical_channel_config {
        apply_logical_channel_config(lc_cfg, &mut logical_channel)?;
    }

    Ok(BearerSetup {
        bearer,
        rlc_config: srb.rlc_config.clone(),
        logical_channel,
    })
}

fn drb_setup(drb: &DrbToAddMod) -> Result<BearerSetup, LayerError> {
    let bearer = RadioBearerId::drb(drb.drb_id)
        .ok_or_else(|| LayerError::InvalidPdu(format!("DRB id {} in DRB-ToAddMod", drb.drb_id)))?;

    let lcid = drb.lc_id.map(u32::from).unwrap_or_else(|| bearer.lcid());
    if RadioBearerId::from_lcid(lcid).map_or(true, |b| b.is_srb()) {
        return Err(LayerError::InvalidPdu(format!("logical channel {} for {}", lcid, bearer)));
    }

    // No default logical channel config exists for a data bearer
    let lc_cfg = drb
        .logical_channel_config
        .as_ref()
        .filter(|cfg| cfg.ul_specific.is_some())
        .ok_or_else(|| LayerError::InvalidPdu(format!("{} without uplink logical channel config", bearer)))?;

    let mut logical_channel = LogicalChannelParams {
        lcid,
        group: 0,
        priority: 0,
        prioritized_bit_rate: None,
        bucket_size_duration: None,
    };
    apply_logical_channel_config(lc_cfg, &mut logical_channel)?;

    Ok(BearerSetup {
        bearer,
        rlc_config: drb.rlc_config.clone(),
        logical_channel,
    })
}

fn apply_logical_channel_config(
    cfg: &LogicalChannelConfig,
    params: &mut LogicalChannelParams,
) -> Result<(), LayerError> {
    if let Some(ul) = &cfg.ul_specific {
        params.priority = ul.priority;
        params.prioritized_bit_rate = tables::prioritized_bit_rate(ul.prioritized_bit_rate)?;
        params.bucket_size_duration = Some(tables::bucket_size_duration(ul.bucket_size_duration)?);
        if let Some(group) = ul.logical_channel_group {
            params.group = group;
        }
    }
    Ok(())
}
