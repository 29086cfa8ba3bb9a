//! End-to-end pipeline over a recorded feed: provider → buffer → features →
//! classifier → gate → oracle, without the poll loop.

use std::io::Write;

use chrono::{NaiveDate, NaiveTime};
use spxwatch_core::components::{
    AdmissionGate, FixedRegime, RegimeClassifier, TrendStrengthClassifier,
};
use spxwatch_core::data::{CsvProvider, FetchRequest, FetchTarget, ObservationProvider};
use spxwatch_core::domain::{GateDecision, GateStage, RegimeLabel, TradeAction};
use spxwatch_core::oracle::{DecisionOracle, HeuristicOracle, OracleRequest};
use spxwatch_core::{FeatureConfig, FeatureEngine, TimeSeriesBuffer};

/// 2026-01-29 10:40:00 EST as epoch seconds.
const SESSION_START: i64 = 1_769_701_200;

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 1, 29).unwrap()
}

/// Write a one-minute recording; `price(i)` and `vix` per row.
fn recording(rows: usize, vix: f64, price: impl Fn(usize) -> f64) -> tempfile::NamedTempFile {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    writeln!(f, "dateTime,spx,spxExpectedMove,spxOTMBids,vix").unwrap();
    for i in 0..rows {
        writeln!(f, "{},{},40.0,6.0,{}", SESSION_START + i as i64 * 60, price(i), vix).unwrap();
    }
    f
}

fn latest_features(file: &tempfile::NamedTempFile, cutoff: &str) -> spxwatch_core::domain::FeatureVector {
    let provider = CsvProvider::new(file.path());
    let request = FetchRequest::new(1, FetchTarget::Date(day()))
        .with_cutoff(NaiveTime::parse_from_str(cutoff, "%H:%M:%S").ok());
    let observations = provider.fetch(&request).unwrap();

    let mut buffer = TimeSeriesBuffer::new(400);
    buffer.seed(observations);
    FeatureEngine::new(FeatureConfig::default())
        .latest(&buffer)
        .unwrap()
}

#[test]
fn flat_range_day_rejected_mid_band() {
    let file = recording(121, 18.0, |_| 6000.0);
    let fv = latest_features(&file, "12:40:00");

    assert_eq!(fv.minutes_to_close, 200);
    assert_eq!(fv.rsi, Some(50.0));
    assert_eq!(fv.band_position, Some(0.5));
    assert!(fv.is_warm());

    let regime = TrendStrengthClassifier::default().classify(&fv);
    assert_eq!(regime, RegimeLabel::RangeBound);

    match AdmissionGate::default().evaluate(&fv, &regime) {
        GateDecision::Reject { stage, reason } => {
            assert_eq!(stage, GateStage::RangeBound);
            assert!(reason.contains("middle of range"), "{reason}");
        }
        GateDecision::Admit => panic!("flat mid-band snapshot admitted"),
    }
}

#[test]
fn low_vix_rejected_globally() {
    let file = recording(121, 10.0, |_| 6000.0);
    let fv = latest_features(&file, "12:40:00");
    let decision = AdmissionGate::default().evaluate(&fv, &RegimeLabel::RangeBound);
    assert_eq!(
        decision,
        GateDecision::reject(GateStage::Global, "VIX 10.00 below floor 12.00: premiums too thin")
    );
}

#[test]
fn steady_climb_is_trending_and_not_exhausted() {
    let file = recording(121, 18.0, |i| 6000.0 + i as f64);
    let fv = latest_features(&file, "12:40:00");

    let regime = TrendStrengthClassifier::default().classify(&fv);
    assert_eq!(regime, RegimeLabel::Trending);

    let decision = AdmissionGate::default().evaluate(&fv, &regime);
    assert!(decision.rationale().contains("not exhausted"), "{}", decision.rationale());
}

#[test]
fn cutoff_limits_what_the_engine_sees() {
    let file = recording(121, 18.0, |i| 6000.0 + i as f64);
    let fv = latest_features(&file, "11:00:00");
    assert_eq!(fv.price, 6020.0);
    assert_eq!(fv.minutes_to_close, 300);
}

#[test]
fn stretched_range_snapshot_reaches_oracle() {
    // quiet drift, then a pop to the upper band on the last bars
    let file = recording(121, 18.0, |i| {
        let base = 6000.0 + ((i as f64) * 0.7).sin() * 2.0;
        if i >= 118 { base + 3.0 } else { base }
    });
    let fv = latest_features(&file, "12:40:00");
    let regime = FixedRegime::new(RegimeLabel::RangeBound).classify(&fv);

    let oracle = HeuristicOracle::default();
    let decision = oracle
        .decide(&OracleRequest::new(fv.clone(), regime))
        .unwrap();
    assert!(decision.validate().is_ok());
    if fv.band_position.is_some_and(|p| p >= 0.8) && fv.rsi.is_some_and(|r| r > 60.0) {
        assert_eq!(decision.trade, Some(TradeAction::SellCall));
    } else {
        assert_eq!(decision.trade, Some(TradeAction::NoTrade));
    }
}
