//! Freestream behaviour across a climb profile.

use am_atmosphere::{AtmosphereModel, Freestream, UsStandard1976};
use proptest::prelude::*;

#[test]
fn density_decreases_with_altitude() {
    let atm = UsStandard1976::new();
    let mut last = f64::INFINITY;
    for i in 0..=40 {
        let h = i as f64 * 2_000.0;
        let rho = atm.state(h).unwrap().density.value;
        assert!(rho < last, "density not decreasing at {h} m");
        last = rho;
    }
}

#[test]
fn freestream_tracks_atmosphere() {
    let atm = UsStandard1976::new();
    let fs = Freestream::at(&atm, 10_000.0, 200.0).unwrap();
    let air = atm.state(10_000.0).unwrap();
    assert_eq!(fs.density, air.density.value);
    assert_eq!(fs.temperature, air.temperature.value);
    assert!(fs.mach_number > 0.6 && fs.mach_number < 0.7);
}

proptest! {
    #[test]
    fn properties_stay_finite_and_positive(h in -10_000.0f64..150_000.0, v in 0.0f64..400.0) {
        let fs = Freestream::at(&UsStandard1976::new(), h, v).unwrap();
        prop_assert!(fs.density.is_finite() && fs.density > 0.0);
        prop_assert!(fs.pressure.is_finite() && fs.pressure > 0.0);
        prop_assert!(fs.speed_of_sound > 0.0);
    }
}
