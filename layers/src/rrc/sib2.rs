//! SIB2 common radio resource configuration
//!
//! Translation is done up front so a bad table index rejects the whole SIB2
//! before any parameter reaches MAC or PHY.

use interfaces::rrc_msg::{HoppingMode, RachConfigCommon, Sib2};
use interfaces::{MacParam, PhyParam};

use super::tables;
use crate::LayerError;

/// Parameters derived from one SIB2, in the order they are pushed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sib2Params {
    pub mac: Vec<MacParam>,
    pub phy: Vec<PhyParam>,
}

pub fn translate(sib2: &Sib2) -> Result<Sib2Params, LayerError> {
    let common = &sib2.rr_config_common;
    let mac = rach_params(&common.rach)?;
    let mut phy = Vec::with_capacity(40);

    let pdsch = &common.pdsch;
    phy.extend([PhyParam::PdschRsPower(pdsch.rs_power as i32), PhyParam::PdschPb(pdsch.p_b as u32)]);

    let pusch = &common.pusch;
    phy.extend([
        PhyParam::PuschEn64Qam(pusch.enable_64_qam),
        PhyParam::PuschHoppingOffset(pusch.pusch_hopping_offset as u32),
        PhyParam::PuschHoppingNSb(pusch.n_sb as u32),
        PhyParam::PuschHoppingIntraSf(pusch.hopping_mode == HoppingMode::IntraAndInterSubframe),
        PhyParam::DmrsGroupHoppingEn(pusch.ul_rs.group_hopping_enabled),
        PhyParam::DmrsSequenceHoppingEn(pusch.ul_rs.sequence_hopping_enabled),
        PhyParam::PuschRsCyclicShift(pusch.ul_rs.cyclic_shift as u32),
        PhyParam::PuschRsGroupAssignment(pusch.ul_rs.group_assignment_pusch as u32),
    ]);

    let pucch = &common.pucch;
    phy.extend([
        PhyParam::PucchDeltaShift(tables::delta_pucch_shift(pucch.delta_pucch_shift)?),
        PhyParam::PucchCyclicShift(pucch.n_cs_an as u32),
        PhyParam::PucchN1(pucch.n1_pucch_an as u32),
        PhyParam::PucchNRb2(pucch.n_rb_cqi as u32),
    ]);

    let pwr = &common.ul_pwr_ctrl;
    let delta_f = &pwr.delta_flist_pucch;
    phy.extend([
        PhyParam::PwrCtrlP0NominalPusch(pwr.p0_nominal_pusch as i32),
        PhyParam::PwrCtrlAlpha(tables::alpha(pwr.alpha)?),
        PhyParam::PwrCtrlP0NominalPucch(pwr.p0_nominal_pucch as i32),
        PhyParam::PwrCtrlDeltaPucchF1(tables::delta_f_pucch_format_1(delta_f.format_1)?),
        PhyParam::PwrCtrlDeltaPucchF1b(tables::delta_f_pucch_format_1b(delta_f.format_1b)?),
        PhyParam::PwrCtrlDeltaPucchF2(tables::delta_f_pucch_format_2(delta_f.format_2)?),
        PhyParam::PwrCtrlDeltaPucchF2a(tables::delta_f_pucch_format_2a(delta_f.format_2a)?),
        PhyParam::PwrCtrlDeltaPucchF2b(tables::delta_f_pucch_format_2b(delta_f.format_2b)?),
        PhyParam::PwrCtrlDeltaMsg3(pwr.delta_preamble_msg3 as i32),
    ]);

    let prach = &common.prach;
    phy.extend([
        PhyParam::PrachRootSeqIdx(prach.root_sequence_index as u32),
        PhyParam::PrachHighSpeedFlag(prach.prach_cnfg_info.high_speed_flag),
        PhyParam::PrachFreqOffset(prach.prach_cnfg_info.prach_freq_offset as u32),
        PhyParam::PrachZcConfig(prach.prach_cnfg_info.zero_correlation_zone_config as u32),
        PhyParam::PrachConfigIndex(prach.prach_cnfg_info.prach_config_index as u32),
    ]);

    if let Some(srs) = &common.srs_ul {
        phy.extend([
            PhyParam::SrsCsBwCfg(srs.bw_cnfg as u32),
            PhyParam::SrsCsSfCfg(srs.subfr_cnfg as u32),
            PhyParam::SrsCsAckNackSimul(srs.ack_nack_simul_tx),
        ]);
    }

    Ok(Sib2Params { mac, phy })
}

fn rach_params(rach: &RachConfigCommon) -> Result<Vec<MacParam>, LayerError> {
    let mut mac = Vec::with_capacity(10);

    if let Some(group_a) = &rach.preambles_group_a {
        mac.extend([
            MacParam::RaNofGroupAPreambles(tables::size_of_ra_preambles_group_a(group_a.size_of_ra)?),
            MacParam::RaMessageSizeA(tables::message_size_group_a(group_a.msg_size)?),
            MacParam::RaMessagePowerOffsetB(tables::message_power_offset_group_b(
                group_a.msg_pwr_offset_group_b,
            )?),
        ]);
    }

    mac.extend([
        MacParam::RaNofPreambles(tables::num_ra_preambles(rach.num_ra_preambles)?),
        MacParam::RaPowerRampingStep(tables::power_ramping_step(rach.pwr_ramping_step)?),
        MacParam::RaInitReceivedPower(tables::preamble_init_rx_target_power(rach.preamble_init_rx_target_pwr)?),
        MacParam::RaPreambleTransMax(tables::preamble_trans_max(rach.preamble_trans_max)?),
        MacParam::RaResponseWindow(tables::ra_response_window_size(rach.ra_resp_win_size)?),
        MacParam::RaContentionTimer(tables::mac_contention_resolution_timer(rach.mac_con_res_timer)?),
        MacParam::HarqMaxMsg3Tx(rach.max_harq_msg3_tx as u32),
    ]);

    Ok(mac)
}
