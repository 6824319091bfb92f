use hq_core::erlang::{erlang_b, erlang_c};
use hq_core::inputs::random_instance;
use hq_core::test_helpers::{assert_close, line_inputs, symmetric_two_atom_inputs};
use hq_core::{Capacity, HypercubeInputs, HypercubeModel, SolverParams, StateOrder};

fn converged(capacity: Capacity) -> SolverParams {
    SolverParams::default()
        .with_capacity(capacity)
        .with_max_iter(10_000)
        .with_tolerance(1e-13)
        .with_queue_len(500)
}

#[test]
fn probabilities_sum_to_one_for_random_instances() {
    for seed in 0..8 {
        for capacity in [Capacity::Zero, Capacity::Infinite] {
            let inputs = random_instance(5, seed);
            let model = HypercubeModel::solve(inputs, converged(capacity)).unwrap();
            assert_eq!(model.probabilities().len(), 32);
            assert_eq!(model.convergence().converged, Some(true));
            assert!(
                model.is_valid(1e-6),
                "seed {seed} {capacity}: total {}",
                model.total_probability()
            );
        }
    }
}

#[test]
fn single_atom_zero_capacity_is_erlang_b() {
    for rate in [0.1, 0.5, 1.0, 3.0] {
        let model = HypercubeModel::new(
            1,
            vec![rate],
            vec![vec![0.7]],
            vec![vec![0]],
            SolverParams::default(),
        )
        .unwrap();
        assert_close(model.all_busy_probability(), erlang_b(1, rate), 1e-15);
        assert_close(model.all_busy_probability(), rate / (1.0 + rate), 1e-15);
        assert_close(model.average_travel_times()[0], 0.7, 1e-15);
        assert_close(model.immediate_dispatch_fractions()[0][0], 1.0, 1e-12);
    }
}

#[test]
fn single_atom_infinite_capacity_is_mm1() {
    let rho = 0.6;
    let params = SolverParams::default()
        .with_capacity(Capacity::Infinite)
        .with_queue_len(400);
    let model = HypercubeModel::new(1, vec![rho], vec![vec![1.0]], vec![vec![0]], params).unwrap();

    assert_close(model.probabilities()[0], 1.0 - rho, 1e-15);
    assert_close(model.all_busy_probability(), rho * (1.0 - rho), 1e-15);
    assert_close(model.queue_delay_probability(), erlang_c(1, rho), 1e-12);
    assert!(model.is_valid(1e-12));
}

#[test]
fn two_atom_asymmetric_matches_hand_solution() {
    let inputs = HypercubeInputs::new(
        vec![1.0, 0.5],
        vec![vec![1.0, 3.0], vec![3.0, 1.0]],
        vec![vec![0, 1], vec![1, 0]],
    );
    let model = HypercubeModel::solve(inputs, SolverParams::default()).unwrap();
    let pi = model.probabilities();

    let denominator = 1.0 + 1.5 + 1.125;
    assert_close(pi[0b00], 1.0 / denominator, 1e-12);
    assert_close(pi[0b11], 1.125 / denominator, 1e-12);
    // unit 0 busy: entered from idle at atom 0's rate, left at 1.5 + 1
    assert_close(pi[0b01], (1.0 + 1.125) / denominator / 2.5, 1e-12);
    assert_close(pi[0b10], (0.5 + 1.125) / denominator / 2.5, 1e-12);
}

#[test]
fn symmetric_two_atoms_have_symmetric_fractions() {
    for capacity in [Capacity::Zero, Capacity::Infinite] {
        let mut inputs = symmetric_two_atom_inputs();
        inputs.arrival_rates = vec![0.7, 0.7];
        let model = HypercubeModel::solve(inputs, converged(capacity)).unwrap();
        let rho = model.immediate_dispatch_fractions();

        assert_close(rho[0][0], rho[1][1], 1e-12);
        assert_close(rho[0][1], rho[1][0], 1e-12);
        assert!(rho[0][0] > rho[0][1]);

        let tu = model.average_travel_times();
        assert_close(tu[0], tu[1], 1e-12);
    }
}

#[test]
fn all_busy_probability_grows_with_any_arrival_rate() {
    let base = line_inputs(4, 0.5);
    let baseline = HypercubeModel::solve(base.clone(), SolverParams::default())
        .unwrap()
        .all_busy_probability();

    for atom in 0..4 {
        let mut inputs = base.clone();
        inputs.arrival_rates[atom] += 0.3;
        let model = HypercubeModel::solve(inputs, SolverParams::default()).unwrap();
        assert!(model.all_busy_probability() >= baseline);
    }
}

#[test]
fn queue_delay_grows_with_any_arrival_rate() {
    let params = SolverParams::default().with_capacity(Capacity::Infinite);
    let base = line_inputs(4, 0.5);
    let baseline = HypercubeModel::solve(base.clone(), params)
        .unwrap()
        .queue_delay_probability();

    for atom in 0..4 {
        let mut inputs = base.clone();
        inputs.arrival_rates[atom] += 0.3;
        let model = HypercubeModel::solve(inputs, params).unwrap();
        assert!(model.queue_delay_probability() >= baseline);
    }
}

#[test]
fn dispatch_fractions_cover_every_call_once_converged() {
    for capacity in [Capacity::Zero, Capacity::Infinite] {
        let model = HypercubeModel::solve(line_inputs(5, 0.6), converged(capacity)).unwrap();
        let total: f64 = model.total_dispatch_fractions().iter().flatten().sum();
        assert_close(total, 1.0, 1e-6);
        assert_close(model.unit_workload().iter().sum(), 1.0, 1e-6);
    }
}

#[test]
fn delayed_fractions_are_zero_without_a_queue() {
    let model = HypercubeModel::solve(line_inputs(3, 0.8), SolverParams::default()).unwrap();
    let delayed = model.delayed_dispatch_fractions();
    assert!(delayed.iter().flatten().all(|&f| f == 0.0));
    assert!(model.queue_probabilities().is_empty());
    assert_eq!(model.queue_delay_probability(), 0.0);
}

#[test]
fn travel_times_stay_within_matrix_bounds() {
    for capacity in [Capacity::Zero, Capacity::Infinite] {
        let inputs = random_instance(4, 99);
        let entries: Vec<f64> = inputs.travel_times.iter().flatten().copied().collect();
        let min = entries.iter().copied().fold(f64::INFINITY, f64::min);
        let max = entries.iter().copied().fold(0.0, f64::max);
        let model = HypercubeModel::solve(inputs, converged(capacity)).unwrap();
        for &tu in model.average_travel_times() {
            assert!(tu >= min - 1e-12 && tu <= max + 1e-12, "{tu} outside [{min}, {max}]");
        }
    }
}

#[test]
fn state_order_does_not_change_results() {
    let inputs = random_instance(4, 3);
    let binary = HypercubeModel::solve(inputs.clone(), converged(Capacity::Zero)).unwrap();
    let tour = HypercubeModel::solve(
        inputs,
        converged(Capacity::Zero).with_state_order(StateOrder::Tour),
    )
    .unwrap();

    let space = tour.state_space();
    for index in 0..space.len() {
        let mask = space.state(index) as usize;
        assert_close(tour.probabilities()[index], binary.probabilities()[mask], 1e-10);
    }
    let tour_times = tour.average_travel_times();
    for (a, b) in tour_times.iter().zip(binary.average_travel_times()) {
        assert_close(*a, *b, 1e-10);
    }
}

#[test]
fn estimated_workload_charges_travel_and_service() {
    let model =
        HypercubeModel::solve(symmetric_two_atom_inputs(), SolverParams::default()).unwrap();
    let tu = model.average_travel_times()[0];
    // dispatch fractions sum to one, so every call costs tu + service time
    assert_close(model.estimated_workload(100.0, 0.5), 100.0 * (tu + 0.5), 1e-9);
}
