/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use rowland_rs::dtheta::{
    deviation, get_mesh, map_case_to_num, map_num_to_case, AcceptanceEvaluator, ApertureShape,
    Coefficients, DiffractorCase, DthetaError, LabelStyle, RockingWidth, ThresholdMode,
};
use rstest::rstest;
use std::f64::consts::PI;

#[rstest]
fn test_no_deviation_at_the_centre(
    #[values(
        DiffractorCase::Johann,
        DiffractorCase::Johansson,
        DiffractorCase::SphericalJohann,
        DiffractorCase::SphericalJohansson,
        DiffractorCase::Wittry,
        DiffractorCase::Johansson45Focus,
        DiffractorCase::JohanssonFocus,
        DiffractorCase::Berreman,
        DiffractorCase::JohannFocus,
        DiffractorCase::VonHamos
    )]
    case: DiffractorCase,
    #[values(1.0, 15.0, 45.0, 75.0, 89.9)] theta: f64,
) {
    let value = deviation(0.0, 0.0, theta, case).unwrap();
    assert_eq!(value, 0.0);
    assert!(!value.is_nan());
}

#[test]
fn test_johann_on_the_meridian() {
    // R1 = R1' = 1, theta = 45: A1 = A2 = 1/2 and the z terms vanish
    let x = 0.01;
    let expected = 0.5 * x * x + 0.5 * x * x * x;
    let value = deviation(x, 0.0, 45.0, DiffractorCase::Johann).unwrap();
    assert_relative_eq!(value, expected, epsilon = 1e-15);

    let c = Coefficients::new(DiffractorCase::Johann, 45.0).unwrap();
    assert_relative_eq!(c.a1, 0.5, epsilon = 1e-15);
    assert_relative_eq!(c.a2, 0.5, epsilon = 1e-15);
}

#[test]
fn test_unknown_case_label() {
    assert_eq!(
        "Rowland".parse::<DiffractorCase>(),
        Err(DthetaError::UnknownCase("Rowland".to_string()))
    );
    assert_eq!(map_case_to_num("Rowland"), 0);
}

#[rstest]
#[case(1, "Jn", "Johann")]
#[case(2, "Js", "Johansson")]
#[case(3, "SphJn", "Spherical Jn")]
#[case(4, "SphJs", "Spherical Johansson")]
#[case(5, "TorJs", "Toroidal Js")]
#[case(6, "Js45focus", "Js 45 deg focusing")]
#[case(7, "JsFocus", "Js focusing")]
#[case(8, "Berreman", "Berreman")]
#[case(9, "JnFocus", "Jn focusing")]
#[case(10, "VH", "Von Hamos")]
fn test_case_codes_roundtrip(#[case] code: u8, #[case] short: &str, #[case] long: &str) {
    assert_eq!(map_num_to_case(code, LabelStyle::Short), short);
    assert_eq!(map_num_to_case(code, LabelStyle::Long), long);
    assert_eq!(map_case_to_num(map_num_to_case(code, LabelStyle::Short)), code);
    assert_eq!(map_case_to_num(map_num_to_case(code, LabelStyle::Long)), code);
}

#[test]
fn test_circular_mesh_area() {
    let mesh = get_mesh(ApertureShape::Circular, 1000.0, 50.0, 50.0, 500).unwrap();
    let expected = PI * (50.0f64 / 1000.0).powi(2);
    let area = mesh.unmasked_area().unwrap();
    assert!((area - expected).abs() / expected < 0.02);
}

// extent 0.5 and 2^k + 1 points keep every sample exact
#[rstest]
#[case(5)]
#[case(17)]
#[case(129)]
fn test_circle_fits_in_square(#[case] resolution: usize) {
    let circ = get_mesh(ApertureShape::Circular, 1000.0, 500.0, 500.0, resolution).unwrap();
    let rect = get_mesh(ApertureShape::Rectangular, 1000.0, 500.0, 500.0, resolution).unwrap();
    assert_eq!(circ.x(), rect.x());
    assert_eq!(circ.z(), rect.z());
    for (&outside_circle, &outside_square) in circ.mask().iter().zip(rect.mask().iter()) {
        assert!(outside_circle || !outside_square);
    }
    assert_eq!(rect.unmasked_count(), resolution * resolution);
    // the corners are cut off by the circle
    assert!(circ.unmasked_count() < rect.unmasked_count());
}

#[test]
fn test_invalid_resolution() {
    assert!(matches!(
        get_mesh(ApertureShape::Rectangular, 1000.0, 50.0, 10.0, 1),
        Err(DthetaError::InvalidGrid(_))
    ));
}

#[rstest]
#[case(DiffractorCase::Johann, 35.0)]
#[case(DiffractorCase::SphericalJohann, 65.0)]
#[case(DiffractorCase::Berreman, 80.0)]
fn test_energy_resolution_grows_with_rocking_width(
    #[case] case: DiffractorCase,
    #[case] theta: f64,
) {
    let mesh = get_mesh(ApertureShape::Rectangular, 1000.0, 50.0, 10.0, 101).unwrap();
    let evaluator = AcceptanceEvaluator::new(&mesh);
    let mut last_eres = 0.0;
    let mut last_sa = 0.0;
    for wrc in [0.0, 1e-6, 1e-5, 1e-4, 1e-3, 1e-2] {
        let result = evaluator.evaluate(case, theta, wrc).unwrap();
        assert!(result.energy_resolution >= last_eres);
        assert!(result.solid_angle >= last_sa);
        last_eres = result.energy_resolution;
        last_sa = result.solid_angle;
    }
}

#[test]
fn test_spherical_johann_beats_johann_in_solid_angle() {
    let mesh = get_mesh(ApertureShape::Circular, 1000.0, 50.0, 50.0, 201).unwrap();
    let evaluator = AcceptanceEvaluator::new(&mesh);
    let johann = evaluator.evaluate(DiffractorCase::Johann, 75.0, 1.25e-4).unwrap();
    let spherical = evaluator
        .evaluate(DiffractorCase::SphericalJohann, 75.0, 1.25e-4)
        .unwrap();
    assert!(spherical.solid_angle > johann.solid_angle);
}

#[test]
fn test_parallel_sweep_matches_single_evaluations() {
    let mesh = get_mesh(ApertureShape::Circular, 1000.0, 50.0, 10.0, 151).unwrap();
    let evaluator = AcceptanceEvaluator::new(&mesh).with_mode(ThresholdMode::Absolute);
    let cases = [DiffractorCase::Wittry, DiffractorCase::JohannFocus];
    let angles = [65.0, 25.0, 45.0];
    let widths = RockingWidth::PerAngle(vec![2e-4, 1e-4, 3e-4]);
    let report = evaluator.sweep(&cases, &angles, &widths).unwrap();
    assert!(report.failures.is_empty());
    for (series, case) in report.series.iter().zip(cases) {
        assert_eq!(series.case, case);
        assert_eq!(series.theta, angles.to_vec());
        for (i, &theta) in angles.iter().enumerate() {
            let single = evaluator.evaluate(case, theta, widths.at(i).unwrap()).unwrap();
            assert_eq!(series.solid_angle[i], single.solid_angle);
            assert_eq!(series.energy_resolution[i], single.energy_resolution);
        }
    }
    assert_eq!(widths.display_bound(), 1e-4);
}

#[test]
fn test_sweep_skips_invalid_rocking_widths() {
    let mesh = get_mesh(ApertureShape::Rectangular, 1000.0, 50.0, 10.0, 101).unwrap();
    let evaluator = AcceptanceEvaluator::new(&mesh);
    let cases = [DiffractorCase::Johann, DiffractorCase::Wittry];
    let angles = [30.0, 45.0, 60.0];
    let widths = RockingWidth::PerAngle(vec![1e-4, f64::NAN, 2e-4]);
    let report = evaluator.sweep(&cases, &angles, &widths).unwrap();

    assert_eq!(report.failures.len(), cases.len());
    for (failure, case) in report.failures.iter().zip(cases) {
        assert_eq!(failure.case, case);
        assert_eq!(failure.theta, 45.0);
        assert!(matches!(failure.error, DthetaError::InvalidThreshold(_)));
    }
    for (series, case) in report.series.iter().zip(cases) {
        assert_eq!(series.case, case);
        assert_eq!(series.theta, vec![30.0, 60.0]);
        assert_eq!(series.wrc, vec![1e-4, 2e-4]);
    }

    // a negative shared width fails every point but not the sweep
    let report = evaluator
        .sweep(&cases, &angles, &RockingWidth::Uniform(-1e-4))
        .unwrap();
    assert_eq!(report.failures.len(), cases.len() * angles.len());
    assert!(report.series.iter().all(|s| s.is_empty()));
}
