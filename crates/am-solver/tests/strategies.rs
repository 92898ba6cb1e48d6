use am_solver::*;
use nalgebra::DVector;
use proptest::prelude::*;

fn shifted_cubic(target: f64) -> impl FnMut(&DVector<f64>) -> SolverResult<DVector<f64>> {
    move |x: &DVector<f64>| {
        Ok(DVector::from_vec(vec![
            x[0] * x[0] * x[0] + x[0] - target,
            2.0 * x[1] - x[0],
        ]))
    }
}

#[test]
fn both_methods_agree() {
    let x0 = DVector::from_vec(vec![0.5, 0.0]);
    let mut newton_f = shifted_cubic(10.0);
    let mut broyden_f = shifted_cubic(10.0);
    let settings = SolveSettings::default();
    let a = Newton.solve(&mut newton_f, x0.clone(), &settings).unwrap();
    let b = Broyden.solve(&mut broyden_f, x0, &settings).unwrap();
    assert!(a.converged && b.converged);
    assert!((a.x[0] - 2.0).abs() < 1e-5);
    assert!((b.x[0] - 2.0).abs() < 1e-5);
    assert!((a.x[1] - 1.0).abs() < 1e-5);
}

#[test]
fn evaluation_count_respects_budget() {
    let mut f = shifted_cubic(10.0);
    let settings = SolveSettings::with_budget(5);
    let out = Newton
        .solve(&mut f, DVector::from_vec(vec![0.5, 0.0]), &settings)
        .unwrap();
    assert!(out.evaluations <= 5);
    assert!(!out.converged);
}

#[test]
fn settings_deserialize_with_defaults() {
    let s: SolveSettings = serde_json::from_str(r#"{"method":"broyden","max_evaluations":50}"#).unwrap();
    assert_eq!(s.method, SolverMethod::Broyden);
    assert_eq!(s.max_evaluations, 50);
    assert_eq!(s.tolerance, SolveSettings::default().tolerance);
}

proptest! {
    #[test]
    fn newton_finds_cube_roots(target in 0.5f64..50.0) {
        let mut f = move |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_element(1, x[0] * x[0] * x[0] - target))
        };
        let out = Newton.solve(&mut f, DVector::from_element(1, 2.0), &SolveSettings::default()).unwrap();
        prop_assert!(out.converged);
        prop_assert!((out.x[0] - target.cbrt()).abs() < 1e-5);
    }
}
