//! System information acquisition
//!
//! SI message scheduling follows 3GPP TS 36.331 section 5.2.3: the window of
//! the next opportunity starts `offset` subframes into the first radio
//! frame of the next period.

use std::sync::Arc;
use std::time::Duration;

use common::{TTIS_PER_FRAME, TTI_HYPERFRAME};
use interfaces::rrc_msg::Sib1;
use interfaces::{MacInterfaceRrc, MacParam, PhyInterfaceRrc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::state::RrcState;
use super::tables;
use crate::LayerError;

/// Start TTI of the next SI window for `period` radio frames and `offset` subframes
pub fn sib_start_tti(tti: u32, period: u32, offset: u32) -> u32 {
    let period_ttis = period * TTIS_PER_FRAME;
    // The +1 selects the next opportunity, never the current one
    (period_ttis * (1 + tti / period_ttis) + offset) % TTI_HYPERFRAME
}

/// Where to look for one SI message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiSchedule {
    /// Periodicity in radio frames
    pub period: u32,
    /// Subframe offset inside the period
    pub offset: u32,
    /// Window length in subframes
    pub window_length: u32,
}

impl SiSchedule {
    /// SIB1 is sent in subframe 5 of every even frame
    pub const SIB1: SiSchedule = SiSchedule { period: 2, offset: 5, window_length: 1 };

    /// Schedule of the SI message carrying SIB2, as signalled in SIB1
    pub fn sib2_from(sib1: &Sib1) -> Result<Self, LayerError> {
        let first = sib1
            .sched_info
            .first()
            .ok_or_else(|| LayerError::InvalidPdu("SIB1 without scheduling info".to_string()))?;
        Ok(Self {
            period: tables::si_periodicity(first.si_periodicity)?,
            offset: 0,
            window_length: tables::si_window_length(sib1.si_window_length)?,
        })
    }

    pub fn window_start(&self, tti: u32) -> u32 {
        sib_start_tti(tti, self.period, self.offset)
    }
}

/// Background task that keeps MAC pointed at the next SI window
pub struct SibSearch {
    pub(crate) mac: Arc<dyn MacInterfaceRrc>,
    pub(crate) phy: Arc<dyn PhyInterfaceRrc>,
    pub(crate) state: watch::Receiver<RrcState>,
    pub(crate) sib2_schedule: watch::Receiver<Option<SiSchedule>>,
    pub(crate) interval: Duration,
    pub(crate) settle: Duration,
}

impl SibSearch {
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        loop {
            let state = *self.state.borrow_and_update();
            if !state.is_searching() {
                debug!("SIB search finished in state {}", state);
                return;
            }
            let schedule = match state {
                RrcState::Sib1Search => {
                    // Parked on PHY sync, woken early if the state moves on
                    tokio::select! {
                        _ = self.phy.wait_for_sync() => {}
                        changed = self.state.changed() => {
                            if changed.is_err() {
                                return;
                            }
                            continue;
                        }
                    }
                    Some(SiSchedule::SIB1)
                }
                _ => *self.sib2_schedule.borrow(),
            };

            sleep(self.settle).await;
            if *self.state.borrow() != state {
                continue;
            }

            match schedule {
                Some(schedule) => self.push_window(state, schedule).await,
                None => warn!("No SI schedule published for state {}", state),
            }

            tokio::select! {
                _ = sleep(self.interval) => {}
                changed = self.state.changed() => {
                    if changed.is_err() {
                        return;
                    }
                }
            }
        }
    }

    async fn push_window(&self, state: RrcState, schedule: SiSchedule) {
        let tti = self.mac.current_tti().await;
        let start = schedule.window_start(tti);
        self.mac.set_param(MacParam::BcchSiWindowStart(Some(start))).await;
        self.mac.set_param(MacParam::BcchSiWindowLength(schedule.window_length)).await;
        debug!(
            "Instructed MAC to search for {}, tti={}, win_start={}, win_len={}",
            if state == RrcState::Sib1Search { "SIB1" } else { "SIB2" },
            tti,
            start,
            schedule.window_length
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interfaces::rrc_msg::SchedulingInfo;

    #[test]
    fn test_sib1_window() {
        assert_eq!(sib_start_tti(0, 2, 5), 25);
        assert_eq!(sib_start_tti(19, 2, 5), 25);
        assert_eq!(sib_start_tti(20, 2, 5), 45);
        // Wraps at the end of the hyper-frame
        assert_eq!(sib_start_tti(10239, 2, 5), 5);
    }

    #[test]
    fn test_window_is_next_opportunity() {
        for &period in &[2u32, 8, 16, 64, 512] {
            for &offset in &[0u32, 5] {
                for tti in (0..TTI_HYPERFRAME).step_by(7) {
                    let start = sib_start_tti(tti, period, offset);
                    let period_ttis = period * TTIS_PER_FRAME;
                    assert_eq!(start % period_ttis, offset % period_ttis);

                    // Strictly ahead of tti, modulo the hyper-frame
                    let ahead = (start + TTI_HYPERFRAME - tti) % TTI_HYPERFRAME;
                    assert!(ahead > 0, "tti={} period={} start={}", tti, period, start);
                    assert!(ahead <= period_ttis + offset);
                }
            }
        }
    }

    #[test]
    fn test_sib2_schedule_from_sib1() {
        let sib1 = Sib1 {
            sched_info: vec![SchedulingInfo { si_periodicity: 1, sib_mapping: vec![] }],
            si_window_length: 4,
            ..Default::default()
        };
        let schedule = SiSchedule::sib2_from(&sib1).unwrap();
        assert_eq!(schedule, SiSchedule { period: 16, offset: 0, window_length: 15 });
        assert_eq!(schedule.window_start(100), 160);
    }

    #[test]
    fn test_sib1_without_scheduling_info() {
        assert!(matches!(
            SiSchedule::sib2_from(&Sib1::default()),
            Err(LayerError::InvalidPdu(_))
        ));
    }
}
