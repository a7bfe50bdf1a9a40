//! ZH-L16 compartment coefficient tables
//!
//! Seventeen compartments (1 and 1b are both present) with half-times and
//! Workman-style a/b coefficients for nitrogen and helium. The A variant is
//! Bühlmann's theoretical table; B and C substitute more conservative
//! nitrogen a-values for the middle compartments (B for printed tables, C
//! for dive computers).
//!
//! # References
//! - Bühlmann, A.A. (1995). "Tauchmedizin", 4th edition. Springer.

/// Coefficients for one tissue compartment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompartmentCoefficients {
    /// Nitrogen half-time (minutes)
    pub n2_half_time: f64,
    /// Nitrogen a coefficient (bar)
    pub n2_a: f64,
    /// Nitrogen b coefficient (dimensionless)
    pub n2_b: f64,
    /// Helium half-time (minutes)
    pub he_half_time: f64,
    /// Helium a coefficient (bar)
    pub he_a: f64,
    /// Helium b coefficient (dimensionless)
    pub he_b: f64,
}

const fn row(
    n2_half_time: f64,
    n2_a: f64,
    n2_b: f64,
    he_half_time: f64,
    he_a: f64,
    he_b: f64,
) -> CompartmentCoefficients {
    CompartmentCoefficients {
        n2_half_time,
        n2_a,
        n2_b,
        he_half_time,
        he_a,
        he_b,
    }
}

/// ZH-L16A: the original theoretical coefficients.
pub const ZH16A_TISSUES: [CompartmentCoefficients; 17] = [
    row(4.0, 1.2599, 0.5050, 1.51, 1.7424, 0.4245),
    row(5.0, 1.1696, 0.5578, 1.88, 1.6189, 0.4770),
    row(8.0, 1.0000, 0.6514, 3.02, 1.3830, 0.5747),
    row(12.5, 0.8618, 0.7222, 4.72, 1.1919, 0.6527),
    row(18.5, 0.7562, 0.7825, 6.99, 1.0458, 0.7223),
    row(27.0, 0.6667, 0.8126, 10.21, 0.9220, 0.7582),
    row(38.3, 0.5933, 0.8434, 14.48, 0.8205, 0.7957),
    row(54.3, 0.5282, 0.8693, 20.53, 0.7305, 0.8279),
    row(77.0, 0.4701, 0.8910, 29.11, 0.6502, 0.8553),
    row(109.0, 0.4187, 0.9092, 41.20, 0.5950, 0.8757),
    row(146.0, 0.3798, 0.9222, 55.19, 0.5545, 0.8903),
    row(187.0, 0.3497, 0.9319, 70.69, 0.5333, 0.8997),
    row(239.0, 0.3223, 0.9403, 90.34, 0.5189, 0.9073),
    row(305.0, 0.2971, 0.9477, 115.29, 0.5181, 0.9122),
    row(390.0, 0.2737, 0.9544, 147.42, 0.5176, 0.9171),
    row(498.0, 0.2523, 0.9602, 188.24, 0.5172, 0.9217),
    row(635.0, 0.2327, 0.9653, 240.03, 0.5119, 0.9267),
];

/// ZH-L16B: conservative nitrogen a-values for compartments 6-8 and 13.
pub const ZH16B_TISSUES: [CompartmentCoefficients; 17] = [
    row(4.0, 1.2599, 0.5050, 1.51, 1.7424, 0.4245),
    row(5.0, 1.1696, 0.5578, 1.88, 1.6189, 0.4770),
    row(8.0, 1.0000, 0.6514, 3.02, 1.3830, 0.5747),
    row(12.5, 0.8618, 0.7222, 4.72, 1.1919, 0.6527),
    row(18.5, 0.7562, 0.7825, 6.99, 1.0458, 0.7223),
    row(27.0, 0.6667, 0.8126, 10.21, 0.9220, 0.7582),
    row(38.3, 0.5600, 0.8434, 14.48, 0.8205, 0.7957),
    row(54.3, 0.4947, 0.8693, 20.53, 0.7305, 0.8279),
    row(77.0, 0.4500, 0.8910, 29.11, 0.6502, 0.8553),
    row(109.0, 0.4187, 0.9092, 41.20, 0.5950, 0.8757),
    row(146.0, 0.3798, 0.9222, 55.19, 0.5545, 0.8903),
    row(187.0, 0.3497, 0.9319, 70.69, 0.5333, 0.8997),
    row(239.0, 0.3223, 0.9403, 90.34, 0.5189, 0.9073),
    row(305.0, 0.2850, 0.9477, 115.29, 0.5181, 0.9122),
    row(390.0, 0.2737, 0.9544, 147.42, 0.5176, 0.9171),
    row(498.0, 0.2523, 0.9602, 188.24, 0.5172, 0.9217),
    row(635.0, 0.2327, 0.9653, 240.03, 0.5119, 0.9267),
];

/// ZH-L16C: conservative nitrogen a-values from compartment 6 onward.
pub const ZH16C_TISSUES: [CompartmentCoefficients; 17] = [
    row(4.0, 1.2599, 0.5050, 1.51, 1.7424, 0.4245),
    row(5.0, 1.1696, 0.5578, 1.88, 1.6189, 0.4770),
    row(8.0, 1.0000, 0.6514, 3.02, 1.3830, 0.5747),
    row(12.5, 0.8618, 0.7222, 4.72, 1.1919, 0.6527),
    row(18.5, 0.7562, 0.7825, 6.99, 1.0458, 0.7223),
    row(27.0, 0.6200, 0.8126, 10.21, 0.9220, 0.7582),
    row(38.3, 0.5043, 0.8434, 14.48, 0.8205, 0.7957),
    row(54.3, 0.4410, 0.8693, 20.53, 0.7305, 0.8279),
    row(77.0, 0.4000, 0.8910, 29.11, 0.6502, 0.8553),
    row(109.0, 0.3750, 0.9092, 41.20, 0.5950, 0.8757),
    row(146.0, 0.3500, 0.9222, 55.19, 0.5545, 0.8903),
    row(187.0, 0.3295, 0.9319, 70.69, 0.5333, 0.8997),
    row(239.0, 0.3065, 0.9403, 90.34, 0.5189, 0.9073),
    row(305.0, 0.2835, 0.9477, 115.29, 0.5181, 0.9122),
    row(390.0, 0.2610, 0.9544, 147.42, 0.5176, 0.9171),
    row(498.0, 0.2480, 0.9602, 188.24, 0.5172, 0.9217),
    row(635.0, 0.2327, 0.9653, 240.03, 0.5119, 0.9267),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_times_increase() {
        for table in [&ZH16A_TISSUES, &ZH16B_TISSUES, &ZH16C_TISSUES] {
            for pair in table.windows(2) {
                assert!(pair[0].n2_half_time < pair[1].n2_half_time);
                assert!(pair[0].he_half_time < pair[1].he_half_time);
            }
        }
    }

    #[test]
    fn test_helium_loads_faster_than_nitrogen() {
        for compartment in &ZH16C_TISSUES {
            assert!(compartment.he_half_time < compartment.n2_half_time);
        }
    }

    #[test]
    fn test_variants_share_everything_but_n2_a() {
        for i in 0..17 {
            let (a, b, c) = (&ZH16A_TISSUES[i], &ZH16B_TISSUES[i], &ZH16C_TISSUES[i]);
            assert_eq!(a.n2_half_time, b.n2_half_time);
            assert_eq!(a.n2_b, c.n2_b);
            assert_eq!(a.he_a, b.he_a);
            assert_eq!(b.he_b, c.he_b);
        }
    }

    #[test]
    fn test_conservatism_ordering() {
        // Lower a means a lower tolerated supersaturation: C <= B <= A.
        for i in 0..17 {
            assert!(ZH16C_TISSUES[i].n2_a <= ZH16B_TISSUES[i].n2_a);
            assert!(ZH16B_TISSUES[i].n2_a <= ZH16A_TISSUES[i].n2_a);
        }
    }

    #[test]
    fn test_theoretical_a_formula() {
        // ZH-L16A nitrogen a follows 2·t½^(-1/3) closely.
        for compartment in &ZH16A_TISSUES {
            let predicted = 2.0 * compartment.n2_half_time.powf(-1.0 / 3.0);
            assert!(
                (predicted - compartment.n2_a).abs() < 0.02,
                "a for t½={} deviates: table {} vs formula {}",
                compartment.n2_half_time,
                compartment.n2_a,
                predicted
            );
        }
    }
}
