mod common;

use common::nominal_input;
use mars_sizing::Topology;
use mars_sizing::solver::size;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn larger_reserve_never_lightens_the_fixed_wing(
        low in 0.05f64..0.30,
        extra in 0.01f64..0.10,
    ) {
        let mut light = nominal_input(Topology::FixedWing);
        light.battery.reserve_fraction = low;
        let mut heavy = light.clone();
        heavy.battery.reserve_fraction = low + extra;

        let light = size(light).unwrap();
        let heavy = size(heavy).unwrap();
        prop_assert!(heavy.mtow_kg >= light.mtow_kg * (1.0 - 1e-6));
        prop_assert!(heavy.battery_mass_kg >= light.battery_mass_kg * (1.0 - 1e-6));
    }

    #[test]
    fn converged_designs_satisfy_the_stall_bound(payload in 0.5f64..4.0) {
        let mut input = nominal_input(Topology::FixedWing);
        input.mission.payload_mass_kg = payload;
        let max_wing_loading = 0.5
            * input.environment.density_kg_m3
            * common::MIN_SPEED_M_S.powi(2)
            * input.aero.cl_max;
        let design = size(input).unwrap();
        prop_assert!(design.wing_loading_n_m2 <= max_wing_loading * (1.0 + 1e-9));
        prop_assert!(design.mtow_kg > payload);
    }
}
