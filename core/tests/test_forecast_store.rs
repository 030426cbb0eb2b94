use chrono::{NaiveDate, NaiveDateTime};
use dr_altimeter_core::{isa, AltimeterError, ForecastStore};

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2020, 2, day).unwrap().and_hms_opt(hour, 0, 0).unwrap()
}

#[test]
fn test_duplicate_timestamp_without_overwrite_fails() {
    let mut fc = ForecastStore::new();
    assert!(!fc.add(at(5, 6), 1010.0, false).unwrap());
    let err = fc.add(at(5, 6), 1011.0, false).unwrap_err();
    assert_eq!(err, AltimeterError::DuplicateTimestamp(at(5, 6)));
    assert_eq!(fc.len(), 1);
    assert_eq!(fc.get_pressure(at(5, 6)).unwrap(), 1010.0);
}

#[test]
fn test_duplicate_timestamp_with_overwrite_last_wins() {
    let mut fc = ForecastStore::new();
    assert!(!fc.add(at(5, 6), 1010.0, true).unwrap());
    assert!(fc.add(at(5, 6), 1011.5, true).unwrap());
    assert_eq!(fc.len(), 1);
    assert_eq!(fc.get_pressure(at(5, 6)).unwrap(), 1011.5);
}

#[test]
fn test_invalid_pressure_never_stored() {
    let mut fc = ForecastStore::new();
    let err = fc.add(at(5, 6), 1200.0, true).unwrap_err();
    assert_eq!(err, AltimeterError::PressureOutOfRange(1200.0));
    assert!(fc.is_empty());

    // heller ikke ved overskriving
    fc.add(at(5, 6), 1000.0, true).unwrap();
    assert!(fc.add(at(5, 6), 100.0, true).is_err());
    assert_eq!(fc.get_pressure(at(5, 6)).unwrap(), 1000.0);
}

#[test]
fn test_reorder_chronologically_interleaved_days() {
    let mut fc = ForecastStore::new();
    for hour in 0..24 {
        fc.add(at(5, hour), 990.0 + hour as f64, true).unwrap();
        fc.add(at(4, hour), 991.0 + hour as f64, true).unwrap();
    }
    // start/end gjelder før sortering også
    assert_eq!(fc.start(), Some(at(4, 0)));
    assert_eq!(fc.end(), Some(at(5, 23)));
    assert_eq!(fc.times()[0], at(5, 0));

    fc.reorder_chronologically();
    let times = fc.times();
    assert_eq!(times.len(), 48);
    assert!(times.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(fc.pressures()[0], 991.0);
    assert_eq!(fc.pressures()[47], 990.0 + 23.0);
}

#[test]
fn test_add_chronological_keeps_order() {
    let mut fc = ForecastStore::new();
    fc.add_chronological(at(5, 9), 1001.0, true).unwrap();
    fc.add_chronological(at(5, 7), 1003.0, true).unwrap();
    fc.add_chronological(at(5, 8), 1002.0, true).unwrap();
    assert_eq!(fc.times(), vec![at(5, 7), at(5, 8), at(5, 9)]);
}

#[test]
fn test_derived_series_are_aligned() {
    let mut fc = ForecastStore::new();
    fc.add(at(5, 6), 1012.0, true).unwrap();
    fc.add(at(5, 7), 1010.0, true).unwrap();
    fc.add(at(5, 8), 1008.0, true).unwrap();

    let p_ref = 1012.0;
    let alts = fc.altitudes().unwrap();
    let deltas = fc.delta_altitudes(p_ref).unwrap();
    assert_eq!(alts.len(), 3);
    assert_eq!(deltas[0], 0.0);
    for (i, p) in fc.pressures().iter().enumerate() {
        assert_eq!(alts[i], isa::altitude(*p).unwrap());
        assert!((deltas[i] - (alts[i] - alts[0])).abs() < 1e-9);
    }
    assert!(deltas[2] > deltas[1] && deltas[1] > 0.0);
}

#[test]
fn test_lookup_by_exact_timestamp() {
    let mut fc = ForecastStore::new();
    fc.add(at(5, 6), 1012.0, true).unwrap();
    fc.add(at(5, 7), 1010.0, true).unwrap();

    assert_eq!(fc.get_pressure(at(5, 7)).unwrap(), 1010.0);
    let d = fc.get_delta_altitude(at(5, 7), 1012.0).unwrap();
    assert!(d > 0.0);

    let missing = at(5, 6) + chrono::Duration::minutes(30);
    assert_eq!(fc.get_pressure(missing), Err(AltimeterError::NotFound(missing)));
    assert_eq!(fc.get_delta_altitude(missing, 1012.0), Err(AltimeterError::NotFound(missing)));

    assert_eq!(fc.time_of_pressure(1010.0), Some(at(5, 7)));
    assert_eq!(fc.time_of_pressure(999.0), None);
}

#[test]
fn test_empty_store() {
    let fc = ForecastStore::new();
    assert!(fc.is_empty());
    assert_eq!(fc.start(), None);
    assert_eq!(fc.end(), None);
    assert!(fc.delta_altitudes(1013.25).unwrap().is_empty());
}
