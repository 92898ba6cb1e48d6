//! Battery recurrence invariants.

use am_energy::{BatteryPack, Cell, DischargeMap, OpenCircuitModel, ThermalModel};
use proptest::prelude::*;

fn pack() -> BatteryPack {
    BatteryPack::new(
        Cell::nmc_18650(),
        6,
        4,
        None,
        ThermalModel::Lumped { conductance: 0.5 },
    )
    .unwrap()
}

fn grid(n: usize, span: f64) -> Vec<f64> {
    (0..n).map(|i| span * i as f64 / (n - 1) as f64).collect()
}

#[test]
fn restart_reproduces_tail_exactly() {
    let pack = pack();
    let n = 12;
    let time = grid(n, 600.0);
    let power: Vec<f64> = (0..n).map(|i| 150.0 + 20.0 * i as f64).collect();
    let ambient = vec![295.0; n];
    let init = pack.initial_point(0.95, 300.0);

    let full = pack.march(init, &power, &time, &ambient).unwrap();
    for k in [1, 5, n - 1] {
        let restart = full.point(k).unwrap();
        let tail = pack
            .march(restart, &power[k..], &time[k..], &ambient[k..])
            .unwrap();
        assert_eq!(tail.energy, full.energy[k..].to_vec());
        assert_eq!(tail.temperature, full.temperature[k..].to_vec());
        assert_eq!(tail.charge_throughput, full.charge_throughput[k..].to_vec());
        assert_eq!(tail.voltage_under_load, full.voltage_under_load[k..].to_vec());
    }
}

#[test]
fn discharge_map_pack_tracks_map_temperature() {
    let map = DischargeMap::from_fn(
        vec![0.0, 5.0, 10.0],
        vec![250.0, 300.0, 350.0],
        vec![0.0, 0.5, 1.0],
        |i, t, s| (3.1 + 1.0 * s - 0.03 * i, t + 0.2 * i),
    )
    .unwrap();
    let mut cell = Cell::nmc_18650();
    cell.open_circuit = OpenCircuitModel::Map(map);
    let pack = BatteryPack::new(cell, 2, 1, None, ThermalModel::Tabulated).unwrap();
    let init = pack.initial_point(0.9, 300.0);
    let h = pack
        .march(init, &[20.0; 3], &[0.0, 1.0, 2.0], &[300.0; 3])
        .unwrap();
    assert!(h.current[0] > 0.0);
    assert!(h.temperature[1] > 300.0);
    assert!(h.voltage_under_load[0] < h.voltage_open_circuit[0]);
}

#[test]
fn discharge_map_round_trip_is_exact_at_nodes() {
    let map = DischargeMap::from_fn(
        vec![0.0, 2.5, 7.5, 15.0],
        vec![263.15, 298.15, 318.15],
        vec![0.0, 0.1, 0.45, 0.9, 1.0],
        |i, t, s| {
            (
                3.0 + 1.2 * s.powf(0.7) - 0.013 * i * (1.0 + 0.1 * (t / 300.0).ln()),
                t + 0.37 * i.sqrt(),
            )
        },
    )
    .unwrap();
    let path = std::env::temp_dir().join("am_energy_discharge_map_round_trip.json");
    map.save(&path).unwrap();
    let back = DischargeMap::load(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(back, map);
    let nt = map.temperature.len();
    let ns = map.state_of_charge.len();
    for (i, &current) in map.current.iter().enumerate() {
        for (j, &temperature) in map.temperature.iter().enumerate() {
            for (k, &soc) in map.state_of_charge.iter().enumerate() {
                let node = (i * nt + j) * ns + k;
                assert_eq!(
                    back.voltage_at(current, temperature, soc).unwrap().to_bits(),
                    map.voltage[node].to_bits(),
                    "voltage at node ({i}, {j}, {k})"
                );
                assert_eq!(
                    back.temperature_at(current, temperature, soc).unwrap().to_bits(),
                    map.cell_temperature[node].to_bits(),
                    "temperature at node ({i}, {j}, {k})"
                );
            }
        }
    }
}

#[test]
fn discharge_map_midpoint_interpolates_between_nodes() {
    let map = DischargeMap::from_fn(
        vec![0.0, 10.0],
        vec![280.0, 300.0],
        vec![0.0, 1.0],
        |i, t, s| (3.0 + s - 0.01 * i, t + i),
    )
    .unwrap();
    let v = map.voltage_at(5.0, 290.0, 0.5).unwrap();
    assert!((v - (3.0 + 0.5 - 0.05)).abs() < 1e-12);
    let t = map.temperature_at(5.0, 290.0, 0.5).unwrap();
    assert!((t - 295.0).abs() < 1e-12);
}

proptest! {
    #[test]
    fn soc_and_energy_stay_bounded(
        power in proptest::collection::vec(-2_000.0f64..4_000.0, 2..40),
        step in 0.5f64..120.0,
        soc0 in 0.0f64..1.0,
    ) {
        let pack = pack();
        let n = power.len();
        let time: Vec<f64> = (0..n).map(|i| step * i as f64).collect();
        let h = pack
            .march(pack.initial_point(soc0, 300.0), &power, &time, &vec![300.0; n])
            .unwrap();
        let e_max = pack.max_energy();
        for t in 0..n {
            prop_assert!((0.0..=1.0).contains(&h.state_of_charge[t]));
            prop_assert!(h.energy[t] >= 0.0 && h.energy[t] <= e_max);
            prop_assert!(h.temperature[t] >= pack.temperature_limits.min);
            prop_assert!(h.temperature[t] <= pack.temperature_limits.max);
        }
    }

    #[test]
    fn throughput_monotonic_under_discharge(
        power in proptest::collection::vec(0.0f64..3_000.0, 2..40),
        step in 0.5f64..60.0,
    ) {
        let pack = pack();
        let n = power.len();
        let time: Vec<f64> = (0..n).map(|i| step * i as f64).collect();
        let h = pack
            .march(pack.initial_point(1.0, 300.0), &power, &time, &vec![300.0; n])
            .unwrap();
        for w in h.charge_throughput.windows(2) {
            prop_assert!(w[1] >= w[0]);
        }
    }
}
