use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use julia_scheduler::core::actions::generate_iteration_grid::generate_iteration_grid;
use julia_scheduler::core::data::colour::Colour;
use julia_scheduler::core::data::frame_buffer::BACKGROUND;
use julia_scheduler::core::data::viewport::Viewport;
use julia_scheduler::core::fractals::julia::algorithm::JuliaAlgorithm;
use julia_scheduler::core::fractals::julia::palette::Palette;
use julia_scheduler::{
    Complex, FixedSurface, PolicyKind, RunController, RunError, RunObserver, RunRequest, RunRequestError, RunState,
    Surface,
};

const SCENARIO_ITERATIONS: [[u32; 4]; 4] = [
    [1, 1, 2, 2],
    [1, 3, 23, 4],
    [4, 23, 100, 23],
    [2, 4, 23, 3],
];

const ALL_POLICIES: [(PolicyKind, usize); 5] = [
    (PolicyKind::Sequential, 1),
    (PolicyKind::StaticPartition, 1),
    (PolicyKind::StaticPartition, 4),
    (PolicyKind::DynamicQueue, 1),
    (PolicyKind::DynamicQueue, 4),
];

fn scenario_request(policy: PolicyKind, parallelism: usize) -> RunRequest {
    RunRequest::new(policy, parallelism, 100, Complex::new(-0.8, 0.156), 1.0).unwrap()
}

fn controller(width: u32, height: u32) -> RunController {
    RunController::new(Arc::new(FixedSurface::new(width, height)))
}

fn render(controller: &mut RunController, request: RunRequest) -> Vec<Colour> {
    let handle = controller.start(request).unwrap();
    controller.wait_for_completion(&handle).unwrap();
    assert_eq!(controller.state(), RunState::Completed);

    controller.frame().unwrap().snapshot().unwrap().colours()
}

#[test]
fn test_scenario_grid_is_reproduced_by_every_policy() {
    let palette = Palette::spectrum();
    let expected: Vec<Colour> = SCENARIO_ITERATIONS
        .iter()
        .flatten()
        .map(|&count| palette.colour_for(count))
        .collect();

    for (policy, parallelism) in ALL_POLICIES {
        let mut controller = controller(4, 4);
        let handle = controller.start(scenario_request(policy, parallelism)).unwrap();
        let elapsed = controller.wait_for_completion(&handle).unwrap();

        assert!(elapsed >= Duration::ZERO);
        assert_eq!(
            controller.frame().unwrap().snapshot().unwrap().colours(),
            expected,
            "{} x{}",
            policy,
            parallelism
        );
    }
}

#[test]
fn test_reference_grid_matches_scenario() {
    let request = scenario_request(PolicyKind::Sequential, 1);
    let algorithm = JuliaAlgorithm::new(Viewport::new(4, 4).unwrap(), request.params());

    let grid = generate_iteration_grid(&algorithm);

    assert_eq!(grid, SCENARIO_ITERATIONS.concat());
}

#[test]
fn test_policies_agree_on_a_larger_frame() {
    let request = |policy, parallelism| {
        RunRequest::new(policy, parallelism, 300, Complex::new(-0.7, 0.27015), 1.3).unwrap()
    };
    let mut controller = controller(97, 53);

    let sequential = render(&mut controller, request(PolicyKind::Sequential, 1));
    let static_partition = render(&mut controller, request(PolicyKind::StaticPartition, 3));
    let dynamic_queue = render(&mut controller, request(PolicyKind::DynamicQueue, 4));

    assert_eq!(static_partition, sequential);
    assert_eq!(dynamic_queue, sequential);
    assert!(sequential.iter().all(|&colour| colour != BACKGROUND));
}

#[test]
fn test_non_escaping_pixel_wraps_palette() {
    let mut controller = controller(4, 4);
    let request = RunRequest::new(PolicyKind::DynamicQueue, 2, 300, Complex::new(0.0, 0.0), 1.0).unwrap();

    let colours = render(&mut controller, request);

    // Pixel (2, 2) starts at the origin, which never leaves it for C = 0.
    assert_eq!(colours[2 * 4 + 2], Palette::spectrum().colours()[300 % 256]);
}

#[derive(Default)]
struct CountingObserver {
    rows: Mutex<Vec<u32>>,
    finished: AtomicUsize,
}

impl RunObserver for CountingObserver {
    fn on_row_ready(&self, row: u32, colours: &[Colour]) {
        assert_eq!(colours.len(), 31);
        self.rows.lock().unwrap().push(row);
    }

    fn on_run_finished(&self, _generation: u64, _state: RunState, _elapsed: Duration) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

#[test]
fn test_every_row_committed_exactly_once() {
    for (policy, parallelism) in ALL_POLICIES {
        let observer = Arc::new(CountingObserver::default());
        let mut controller = RunController::with_observer(Arc::new(FixedSurface::new(31, 29)), observer.clone());

        let handle = controller.start(scenario_request(policy, parallelism)).unwrap();
        controller.wait_for_completion(&handle).unwrap();

        let mut rows = observer.rows.lock().unwrap().clone();
        rows.sort_unstable();
        assert_eq!(rows, (0..29).collect::<Vec<_>>(), "{} x{}", policy, parallelism);
        assert_eq!(controller.frame().unwrap().completed_rows(), 29);
        assert_eq!(observer.finished.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_abort_stops_every_unit_after_its_current_row() {
    for (policy, parallelism) in ALL_POLICIES {
        let mut controller = controller(400, 400);
        let request = RunRequest::new(policy, parallelism, 3000, Complex::new(-0.8, 0.156), 1.0).unwrap();

        let handle = controller.start(request).unwrap();
        let frame = controller.frame().unwrap();
        std::thread::sleep(Duration::from_millis(30));

        let aborted = match controller.abort(&handle) {
            Ok(()) => true,
            // The run may finish before the abort lands.
            Err(RunError::NotRunning { .. }) => false,
            Err(err) => panic!("unexpected abort error: {}", err),
        };
        let before = frame.completed_rows();
        controller.wait_for_completion(&handle).unwrap();
        let after = frame.completed_rows();

        let state = controller.state();
        assert!(matches!(state, RunState::Aborted | RunState::Completed), "{}", state);

        if aborted {
            // Each compute unit may still commit the row it was working on.
            assert!(
                after - before <= parallelism,
                "{} x{} committed {} rows after abort",
                policy,
                parallelism,
                after - before
            );
        }
    }
}

#[test]
fn test_aborted_frame_can_be_rerendered() {
    let mut controller = controller(200, 200);
    let request = RunRequest::new(PolicyKind::DynamicQueue, 4, 1000, Complex::new(-0.8, 0.156), 1.0).unwrap();

    let first = controller.start(request).unwrap();
    let _ = controller.abort(&first);
    controller.wait_for_completion(&first).unwrap();

    let second = controller.start(request).unwrap();
    controller.wait_for_completion(&second).unwrap();

    assert_eq!(controller.state(), RunState::Completed);
    assert_eq!(controller.frame().unwrap().completed_rows(), 200);
}

#[test]
fn test_invalid_requests_fail_before_start() {
    assert!(matches!(
        RunRequest::new(PolicyKind::Sequential, 2, 100, Complex::new(-0.8, 0.156), 1.0),
        Err(RunRequestError::Parallelism { .. })
    ));
    assert!(matches!(
        RunRequest::new(PolicyKind::DynamicQueue, 5, 100, Complex::new(-0.8, 0.156), 1.0),
        Err(RunRequestError::Parallelism { .. })
    ));
    assert!(matches!(
        RunRequest::new(PolicyKind::StaticPartition, 2, 100, Complex::new(-0.8, 0.156), 0.0),
        Err(RunRequestError::Julia(_))
    ));
    assert!(matches!(
        RunRequest::new(PolicyKind::StaticPartition, 2, 100, Complex::new(f64::NAN, 0.0), 1.0),
        Err(RunRequestError::Julia(_))
    ));
}

struct ResizableSurface {
    width: AtomicUsize,
}

impl Surface for ResizableSurface {
    fn width(&self) -> u32 {
        self.width.load(Ordering::SeqCst) as u32
    }

    fn height(&self) -> u32 {
        8
    }
}

#[test]
fn test_viewport_change_between_runs_is_rejected() {
    let surface = Arc::new(ResizableSurface {
        width: AtomicUsize::new(8),
    });
    let mut controller = RunController::new(surface.clone());

    let first = controller.start(scenario_request(PolicyKind::Sequential, 1)).unwrap();
    controller.wait_for_completion(&first).unwrap();

    surface.width.store(10, Ordering::SeqCst);
    let result = controller.start(scenario_request(PolicyKind::Sequential, 1));

    assert!(matches!(result, Err(RunError::ViewportChanged { .. })));
    assert_eq!(controller.state(), RunState::Completed);
    assert_eq!(controller.current_generation(), 1);
}

#[test]
fn test_second_start_while_running_is_rejected() {
    let mut controller = controller(300, 300);
    let request = RunRequest::new(PolicyKind::Sequential, 1, 3000, Complex::new(-0.8, 0.156), 1.0).unwrap();

    let handle = controller.start(request).unwrap();

    match controller.start(request) {
        Err(RunError::AlreadyRunning { generation }) => {
            assert_eq!(generation, 1);
            let _ = controller.abort(&handle);
            controller.wait_for_completion(&handle).unwrap();
        }
        // The first run already finished, so the second start is legal.
        Ok(second) => {
            controller.wait_for_completion(&second).unwrap();
        }
        Err(err) => panic!("unexpected start error: {}", err),
    }
}
