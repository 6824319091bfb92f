use hq_core::erlang::erlang_b;
use hq_core::Capacity;
use hq_experiments::runner::run_parallel_evaluations_with_progress;
use hq_experiments::{
    calculate_balance_scores, export_designs_to_csv, export_to_json, find_most_balanced_design,
    sample_random_designs, summarize_designs, BalanceWeights, DesignSpace, PeriodData,
    RegionData, Zone, ZoneDesign,
};
use tempfile::NamedTempFile;

fn ids(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}

/// Six atoms on a line, travel time one per step plus one, 100 time units
/// per period and unit service time.
fn line_region() -> RegionData {
    let n = 6;
    let matrix: Vec<Vec<f64>> = (0..n)
        .map(|i: usize| (0..n).map(|j: usize| i.abs_diff(j) as f64 + 1.0).collect())
        .collect();
    RegionData::new(
        ids(&["a", "b", "c", "d", "e", "f"]),
        matrix.clone(),
        matrix,
        1.0,
        100.0,
    )
    .unwrap()
}

fn uniform_period(calls: f64) -> PeriodData {
    ["a", "b", "c", "d", "e", "f"]
        .iter()
        .fold(PeriodData::new("2016"), |data, atom| {
            data.with_calls(*atom, calls)
        })
}

#[test]
fn single_atom_zones_match_erlang_b() {
    let design = ZoneDesign::new(
        "singletons",
        ids(&["a", "b", "c"])
            .into_iter()
            .map(|atom| Zone::new(atom.clone(), vec![atom]))
            .collect(),
    );
    let cases = DesignSpace::grid()
        .designs(vec![design])
        .periods(vec![uniform_period(50.0)])
        .generate();
    let region = line_region();
    let batch = run_parallel_evaluations_with_progress(cases, &region, Some(2), false).unwrap();

    assert_eq!(batch.results.len(), 3);
    for result in &batch.results {
        // 50 calls over 100 time units at unit service time
        assert!((result.total_arrival_rate - 0.5).abs() < 1e-12);
        assert!((result.all_busy_probability - erlang_b(1, 0.5)).abs() < 1e-12);
        assert!((result.mean_travel_time - 1.0).abs() < 1e-12);
    }
}

#[test]
fn contiguous_design_beats_scattered_on_travel_time() {
    let contiguous = ZoneDesign::new(
        "contiguous",
        vec![
            Zone::new("west", ids(&["a", "b", "c"])),
            Zone::new("east", ids(&["d", "e", "f"])),
        ],
    );
    let scattered = ZoneDesign::new(
        "scattered",
        vec![
            Zone::new("odd", ids(&["a", "c", "e"])),
            Zone::new("even", ids(&["b", "d", "f"])),
        ],
    );
    let cases = DesignSpace::grid()
        .designs(vec![contiguous, scattered])
        .periods(vec![uniform_period(40.0)])
        .generate();
    let region = line_region();
    let batch = run_parallel_evaluations_with_progress(cases, &region, None, false).unwrap();
    let designs = summarize_designs(&batch.results);

    assert_eq!(designs.len(), 2);
    let travel_time = |id: &str| {
        let design = designs.iter().find(|d| d.design_id == id).unwrap();
        design.mean_travel_time
    };
    assert!(travel_time("contiguous") < travel_time("scattered"));
}

#[test]
fn sampled_sweep_covers_every_case_and_exports() {
    let region = line_region();
    let designs = sample_random_designs(&region.atom_ids, 2, 5, 11);
    assert_eq!(designs.len(), 5);

    let cases = DesignSpace::grid()
        .designs(designs)
        .periods(vec![uniform_period(30.0)])
        .capacity(vec![Capacity::Zero, Capacity::Infinite])
        .max_iter(vec![10, 40])
        .generate();
    // 4 variations * 5 designs * 2 zones
    assert_eq!(cases.len(), 40);

    let batch = run_parallel_evaluations_with_progress(cases, &region, Some(4), false).unwrap();
    assert_eq!(batch.results.len(), 40);
    assert!(batch.failures.is_empty());
    for result in &batch.results {
        assert!((0.0..=1.0).contains(&result.all_busy_probability));
        match result.capacity {
            Capacity::Zero => assert_eq!(result.queue_delay_probability, 0.0),
            Capacity::Infinite => assert_eq!(result.blocking_probability, 0.0),
        }
    }

    let summaries = summarize_designs(&batch.results);
    assert_eq!(summaries.len(), 20);
    let scores = calculate_balance_scores(&summaries, &BalanceWeights::default());

    let csv_file = NamedTempFile::new().unwrap();
    export_designs_to_csv(&summaries, &scores, csv_file.path()).unwrap();
    let csv = std::fs::read_to_string(csv_file.path()).unwrap();
    assert_eq!(csv.lines().count(), 21);

    let json_file = NamedTempFile::new().unwrap();
    export_to_json(&batch.results, json_file.path()).unwrap();
    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(json_file.path()).unwrap()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 40);

    assert!(find_most_balanced_design(&batch.results, &BalanceWeights::default()).is_some());
}

#[test]
fn overloaded_infinite_zones_are_reported_as_failures() {
    let design = ZoneDesign::new("one", vec![Zone::new("all", ids(&["a", "b"]))]);
    // 150 calls per atom gives a load of 3 on two units
    let cases = DesignSpace::grid()
        .designs(vec![design])
        .periods(vec![uniform_period(150.0)])
        .capacity(vec![Capacity::Zero, Capacity::Infinite])
        .generate();
    let region = line_region();
    let batch = run_parallel_evaluations_with_progress(cases, &region, Some(1), false).unwrap();

    assert_eq!(batch.results.len(), 1);
    assert_eq!(batch.results[0].capacity, Capacity::Zero);
    assert_eq!(batch.failures.len(), 1);
    assert!(batch.failures[0].error.contains("unstable"));
}
