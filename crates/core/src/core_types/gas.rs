//! Breathing gas mixes and their derived depth limits
//!
//! A [`GasMix`] is an oxygen/helium pair with the nitrogen balance derived
//! so the three fractions always close to 1. The depth queries follow
//! standard technical-diving definitions: MOD from a ppO₂ ceiling, END with
//! helium assigned a narcotic factor of zero, and EAD as the inverse
//! relation.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core_types::environment::Environment;
use crate::error::ConfigurationError;
use crate::physics::pressure::{depth_to_pressure, pressure_to_depth};

/// Tolerance for fraction-closure checks.
const FRACTION_SUM_TOLERANCE: f64 = 1e-6;

/// A breathing gas described by its oxygen, helium and nitrogen fractions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GasMix {
    fo2: f64,
    fhe: f64,
    fn2: f64,
}

impl GasMix {
    /// Create a mix from oxygen and helium fractions; nitrogen is the rest.
    pub fn new(fo2: f64, fhe: f64) -> Result<Self, ConfigurationError> {
        for fraction in [fo2, fhe] {
            if !(0.0..=1.0).contains(&fraction) || !fraction.is_finite() {
                return Err(ConfigurationError::GasFractionOutOfRange(fraction));
            }
        }
        let sum = fo2 + fhe;
        if sum > 1.0 + FRACTION_SUM_TOLERANCE {
            return Err(ConfigurationError::GasFractionsSum(sum));
        }
        Ok(GasMix {
            fo2,
            fhe,
            fn2: 1.0 - fo2 - fhe,
        })
    }

    /// Create a mix from all three fractions, which must sum to 1.
    pub fn from_fractions(fo2: f64, fn2: f64, fhe: f64) -> Result<Self, ConfigurationError> {
        for fraction in [fo2, fn2, fhe] {
            if !(0.0..=1.0).contains(&fraction) || !fraction.is_finite() {
                return Err(ConfigurationError::GasFractionOutOfRange(fraction));
            }
        }
        let sum = fo2 + fn2 + fhe;
        if (sum - 1.0).abs() > FRACTION_SUM_TOLERANCE {
            return Err(ConfigurationError::GasFractionsSum(sum));
        }
        Ok(GasMix { fo2, fhe, fn2 })
    }

    /// Atmospheric air, 21% oxygen.
    pub fn air() -> Self {
        GasMix {
            fo2: 0.21,
            fhe: 0.0,
            fn2: 0.79,
        }
    }

    /// Oxygen fraction
    #[inline]
    pub fn fo2(&self) -> f64 {
        self.fo2
    }

    /// Helium fraction
    #[inline]
    pub fn fhe(&self) -> f64 {
        self.fhe
    }

    /// Nitrogen fraction
    #[inline]
    pub fn fn2(&self) -> f64 {
        self.fn2
    }

    /// Maximum operating depth (m): the depth where ppO₂ reaches `max_ppo2`.
    pub fn mod_depth(&self, max_ppo2: f64, env: &Environment, fresh_water: bool) -> f64 {
        pressure_to_depth(max_ppo2 / self.fo2, env, fresh_water)
    }

    /// Equivalent narcotic depth (m) at `depth`.
    ///
    /// Helium has a narcotic factor of 0; oxygen and nitrogen count fully.
    pub fn end(&self, depth: f64, env: &Environment, fresh_water: bool) -> f64 {
        let narcotic_index = self.fo2 + self.fn2;
        let bars = depth_to_pressure(depth, env, fresh_water);
        pressure_to_depth(bars * narcotic_index, env, fresh_water)
    }

    /// Equivalent air depth (m) at `depth`: the inverse of [`GasMix::end`].
    pub fn ead(&self, depth: f64, env: &Environment, fresh_water: bool) -> f64 {
        let narcotic_index = self.fo2 + self.fn2;
        let bars = depth_to_pressure(depth, env, fresh_water);
        pressure_to_depth(bars / narcotic_index, env, fresh_water)
    }
}

impl fmt::Display for GasMix {
    /// Trimix notation: oxygen/helium percentages, e.g. "21/35".
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.0}/{:.0}",
            self.fo2 * 100.0,
            self.fhe * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_close_to_one() {
        for (fo2, fhe) in [(0.21, 0.0), (0.21, 0.35), (0.5, 0.0), (1.0, 0.0), (0.1, 0.7)] {
            let gas = GasMix::new(fo2, fhe).unwrap();
            let sum = gas.fo2() + gas.fhe() + gas.fn2();
            assert!((sum - 1.0).abs() < 1e-12, "{fo2}/{fhe} sums to {sum}");
        }
    }

    #[test]
    fn test_rejects_bad_fractions() {
        assert!(matches!(
            GasMix::new(1.5, 0.0),
            Err(ConfigurationError::GasFractionOutOfRange(_))
        ));
        assert!(matches!(
            GasMix::new(0.6, 0.5),
            Err(ConfigurationError::GasFractionsSum(_))
        ));
        assert!(matches!(
            GasMix::from_fractions(0.22, 0.44, 0.35),
            Err(ConfigurationError::GasFractionsSum(_))
        ));
    }

    #[test]
    fn test_mod_ean50() {
        // EAN50 at ppO₂ 1.6: 3.2 bar ambient ≈ 22 m in salt water.
        let env = Environment::default();
        let ean50 = GasMix::new(0.5, 0.0).unwrap();
        let mod_depth = ean50.mod_depth(1.6, &env, false);
        assert!(
            (mod_depth.round() - 22.0).abs() < 1e-9,
            "EAN50 MOD rounded should be 22 m, got {mod_depth}"
        );
    }

    #[test]
    fn test_mod_oxygen() {
        let env = Environment::default();
        let oxygen = GasMix::new(1.0, 0.0).unwrap();
        let mod_depth = oxygen.mod_depth(1.6, &env, false);
        assert!(
            (mod_depth.round() - 6.0).abs() < 1e-9,
            "O2 MOD rounded should be 6 m, got {mod_depth}"
        );
    }

    #[test]
    fn test_end_air_is_identity() {
        let env = Environment::default();
        let air = GasMix::air();
        let end = air.end(40.0, &env, false);
        assert!((end - 40.0).abs() < 1e-9, "air END must equal depth, got {end}");
    }

    #[test]
    fn test_end_trimix_reduces_narcosis() {
        let env = Environment::default();
        let trimix = GasMix::new(0.21, 0.35).unwrap();
        let end = trimix.end(50.0, &env, false);
        assert!(end < 40.0, "21/35 at 50 m should read like < 40 m, got {end}");
    }

    #[test]
    fn test_ead_inverts_end() {
        let env = Environment::default();
        let trimix = GasMix::new(0.18, 0.45).unwrap();
        let end = trimix.end(60.0, &env, false);
        let back = trimix.ead(end, &env, false);
        assert!((back - 60.0).abs() < 1e-9, "EAD(END(60)) gave {back}");
    }

    #[test]
    fn test_display_trimix_notation() {
        let gas = GasMix::new(0.21, 0.35).unwrap();
        assert_eq!(gas.to_string(), "21/35");
    }
}
