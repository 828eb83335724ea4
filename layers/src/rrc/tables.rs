//! Enumerated value tables of 3GPP TS 36.331
//!
//! RRC messages signal most parameters as an index into a fixed table.
//! Each lookup returns the physical value or `InvalidTableIndex`.
//! `None` stands for the infinity entries.

use crate::LayerError;

fn lookup<T: Copy>(table: &'static str, values: &[T], index: u8) -> Result<T, LayerError> {
    values
        .get(index as usize)
        .copied()
        .ok_or(LayerError::InvalidTableIndex { table, index: index as u32 })
}

// System information

/// Downlink bandwidth in resource blocks
pub fn dl_bandwidth_prb(index: u8) -> Result<u32, LayerError> {
    lookup("dl_bandwidth", &[6, 15, 25, 50, 75, 100], index)
}

/// Downlink bandwidth in MHz
pub fn dl_bandwidth_mhz(index: u8) -> Result<f32, LayerError> {
    lookup("dl_bandwidth", &[1.4, 3.0, 5.0, 10.0, 15.0, 20.0], index)
}

/// SI window length in ms (subframes)
pub fn si_window_length(index: u8) -> Result<u32, LayerError> {
    lookup("si_window_length", &[1, 2, 5, 10, 15, 20, 40], index)
}

/// SI periodicity in radio frames
pub fn si_periodicity(index: u8) -> Result<u32, LayerError> {
    lookup("si_periodicity", &[8, 16, 32, 64, 128, 256, 512], index)
}

// RACH

pub fn num_ra_preambles(index: u8) -> Result<u32, LayerError> {
    lookup(
        "num_ra_preambles",
        &[4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60, 64],
        index,
    )
}

/// Number of preambles in random access group A
pub fn size_of_ra_preambles_group_a(index: u8) -> Result<u32, LayerError> {
    lookup(
        "size_of_ra_preambles_group_a",
        &[4, 8, 12, 16, 20, 24, 28, 32, 36, 40, 44, 48, 52, 56, 60],
        index,
    )
}

/// Group A message size threshold in bits
pub fn message_size_group_a(index: u8) -> Result<u32, LayerError> {
    lookup("message_size_group_a", &[56, 144, 208, 256], index)
}

/// Group B power offset in dB
pub fn message_power_offset_group_b(index: u8) -> Result<Option<i32>, LayerError> {
    lookup(
        "message_power_offset_group_b",
        &[None, Some(0), Some(5), Some(8), Some(10), Some(12), Some(15), Some(18)],
        index,
    )
}

/// Power ramping step in dB
pub fn power_ramping_step(index: u8) -> Result<u32, LayerError> {
    lookup("power_ramping_step", &[0, 2, 4, 6], index)
}

/// Preamble initial received target power in dBm
pub fn preamble_init_rx_target_power(index: u8) -> Result<i32, LayerError> {
    lookup(
        "preamble_init_rx_target_power",
        &[-120, -118, -116, -114, -112, -110, -108, -106, -104, -102, -100, -98, -96, -94, -92, -90],
        index,
    )
}

pub fn preamble_trans_max(index: u8) -> Result<u32, LayerError> {
    lookup("preamble_trans_max", &[3, 4, 5, 6, 7, 8, 10, 20, 50, 100, 200], index)
}

/// RA response window in subframes
pub fn ra_response_window_size(index: u8) -> Result<u32, LayerError> {
    lookup("ra_response_window_size", &[2, 3, 4, 5, 6, 7, 8, 10], index)
}

/// MAC contention resolution timer in subframes
pub fn mac_contention_resolution_timer(index: u8) -> Result<u32, LayerError> {
    lookup("mac_contention_resolution_timer", &[8, 16, 24, 32, 40, 48, 56, 64], index)
}

// PUCCH and uplink power control

pub fn delta_pucch_shift(index: u8) -> Result<u32, LayerError> {
    lookup("delta_pucch_shift", &[1, 2, 3], index)
}

/// Path loss compensation factor, scaled by 10
pub fn alpha(index: u8) -> Result<u32, LayerError> {
    lookup("alpha", &[0, 4, 5, 6, 7, 8, 9, 10], index)
}

pub fn delta_f_pucch_format_1(index: u8) -> Result<i32, LayerError> {
    lookup("delta_f_pucch_format_1", &[-2, 0, 2], index)
}

pub fn delta_f_pucch_format_1b(index: u8) -> Result<i32, LayerError> {
    lookup("delta_f_pucch_format_1b", &[1, 3, 5], index)
}

pub fn delta_f_pucch_format_2(index: u8) -> Result<i32, LayerError> {
    lookup("delta_f_pucch_format_2", &[-2, 0, 1, 2], index)
}

pub fn delta_f_pucch_format_2a(index: u8) -> Result<i32, LayerError> {
    lookup("delta_f_pucch_format_2a", &[-2, 0, 2], index)
}

pub fn delta_f_pucch_format_2b(index: u8) -> Result<i32, LayerError> {
    lookup("delta_f_pucch_format_2b", &[-2, 0, 2], index)
}

// Scheduling request

pub fn dsr_trans_max(index: u8) -> Result<u32, LayerError> {
    lookup("dsr_trans_max", &[4, 8, 16, 32, 64], index)
}

// MAC main configuration

pub fn max_harq_tx(index: u8) -> Result<u32, LayerError> {
    lookup("max_harq_tx", &[1, 2, 3, 4, 5, 6, 7, 8, 10, 12, 16, 20, 24, 28], index)
}

/// Periodic BSR timer in subframes
pub fn periodic_bsr_timer(index: u8) -> Result<Option<u32>, LayerError> {
    lookup(
        "periodic_bsr_timer",
        &[
            Some(5),
            Some(10),
            Some(16),
            Some(20),
            Some(32),
            Some(40),
            Some(64),
            Some(80),
            Some(128),
            Some(160),
            Some(320),
            Some(640),
            Some(1280),
            Some(2560),
            None,
        ],
        index,
    )
}

/// Retransmission BSR timer in subframes
pub fn retx_bsr_timer(index: u8) -> Result<u32, LayerError> {
    lookup("retx_bsr_timer", &[320, 640, 1280, 2560, 5120, 10240], index)
}

/// Periodic PHR timer in subframes
pub fn periodic_phr_timer(index: u8) -> Result<Option<u32>, LayerError> {
    lookup(
        "periodic_phr_timer",
        &[Some(10), Some(20), Some(50), Some(100), Some(200), Some(500), Some(1000), None],
        index,
    )
}

/// Prohibit PHR timer in subframes
pub fn prohibit_phr_timer(index: u8) -> Result<u32, LayerError> {
    lookup("prohibit_phr_timer", &[0, 10, 20, 50, 100, 200, 500, 1000], index)
}

/// DL pathloss change threshold in dB
pub fn dl_pathloss_change(index: u8) -> Result<Option<u32>, LayerError> {
    lookup("dl_pathloss_change", &[Some(1), Some(3), Some(6), None], index)
}

// Logical channel configuration

/// Prioritised bit rate in kB/s
pub fn prioritized_bit_rate(index: u8) -> Result<Option<u32>, LayerError> {
    lookup(
        "prioritized_bit_rate",
        &[Some(0), Some(8), Some(16), Some(32), Some(64), Some(128), Some(256), None],
        index,
    )
}

/// Bucket size duration in ms
pub fn bucket_size_duration(index: u8) -> Result<u32, LayerError> {
    lookup("bucket_size_duration", &[50, 100, 150, 300, 500, 1000], index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_si_tables() {
        assert_eq!(si_window_length(0).unwrap(), 1);
        assert_eq!(si_window_length(6).unwrap(), 40);
        assert_eq!(si_periodicity(0).unwrap(), 8);
        assert_eq!(si_periodicity(6).unwrap(), 512);
    }

    #[test]
    fn test_out_of_range_index() {
        match si_window_length(7) {
            Err(LayerError::InvalidTableIndex { table, index }) => {
                assert_eq!(table, "si_window_length");
                assert_eq!(index, 7);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(max_harq_tx(14).is_err());
        assert!(delta_f_pucch_format_2(4).is_err());
    }

    #[test]
    fn test_infinity_entries() {
        assert_eq!(message_power_offset_group_b(0).unwrap(), None);
        assert_eq!(message_power_offset_group_b(7).unwrap(), Some(18));
        assert_eq!(periodic_bsr_timer(14).unwrap(), None);
        assert_eq!(periodic_phr_timer(7).unwrap(), None);
        assert_eq!(dl_pathloss_change(3).unwrap(), None);
        assert_eq!(prioritized_bit_rate(7).unwrap(), None);
    }

    #[test]
    fn test_rach_tables() {
        assert_eq!(num_ra_preambles(15).unwrap(), 64);
        // Group A has one entry fewer than the preamble count table
        assert_eq!(size_of_ra_preambles_group_a(14).unwrap(), 60);
        assert!(size_of_ra_preambles_group_a(15).is_err());
        assert_eq!(preamble_init_rx_target_power(0).unwrap(), -120);
        assert_eq!(preamble_init_rx_target_power(15).unwrap(), -90);
        assert_eq!(mac_contention_resolution_timer(7).unwrap(), 64);
    }

    #[test]
    fn test_bandwidth() {
        assert_eq!(dl_bandwidth_prb(2).unwrap(), 25);
        assert_eq!(dl_bandwidth_mhz(0).unwrap(), 1.4);
    }
}
