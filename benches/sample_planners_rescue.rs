use std::time::Duration;

use criterion::BenchmarkId;
use criterion::Criterion;
use criterion::criterion_group;
use criterion::criterion_main;
use hrsw::Stopwatch;
use human_duration::human_duration;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::SeedableRng;

use rescue::config::RescueConfig;
use rescue::heuristic::DistanceOracle;
use rescue::problems::rescue::RescueHeuristic;
use rescue::problems::rescue::RescuePlanner;
use rescue::problems::rescue::RescueScenario;
use rescue::problems::rescue::RescueSpace;

/// Maximum time willing to wait for a single benchmark instance.
/// Experiments are carried out at least 5s and at least 100 times, so running a
/// 1s instance takes 1m40s.
const MAX_INSTANCE_TIME: Duration = Duration::from_secs(1);

const NUM_INSTANCES: u64 = 5;
const VERTICES: [usize; 3] = [8, 16, 32];

fn plan(scenario: &RescueScenario, config: RescueConfig, planner: RescuePlanner) -> usize {
    let space = RescueSpace::new(&scenario.graph, config);
    let mut heuristic = RescueHeuristic::new(DistanceOracle::new(&scenario.graph), config);
    planner
        .plan(&space, &mut heuristic, &scenario.start)
        .expansions
}

fn compare_planners(c: &mut Criterion) {
    let mut group = c.benchmark_group("Rescue Planning");
    let config = RescueConfig::new(2, 1, 3).with_lookahead(20);

    for vertices in VERTICES {
        for i in 0..NUM_INSTANCES {
            let instance_name = format!("random[{vertices}]:{i}");
            let mut rng = ChaCha8Rng::seed_from_u64(i);
            let scenario =
                RescueScenario::randomize(&mut rng, vertices, vertices / 2, vertices / 4, 2);

            let mut astar_stopwatch = Stopwatch::new_started();
            let expansions = plan(&scenario, config, RescuePlanner::AStar);
            astar_stopwatch.stop();
            let astar_total_elapsed = astar_stopwatch.elapsed();
            println!("{instance_name}: A* took {expansions} expansions");
            if astar_total_elapsed > MAX_INSTANCE_TIME {
                log::warn!(
                    "Skipping {instance_name} as it takes too long with A* ({})",
                    human_duration(&astar_total_elapsed)
                );
                continue;
            }

            for planner in RescuePlanner::ALL {
                group.bench_with_input(
                    BenchmarkId::new(planner.to_string(), &instance_name),
                    &scenario,
                    |b, s| b.iter(|| plan(s, config, planner)),
                );
            }
        }
    }
    group.finish();
}

criterion_group!(benches, compare_planners);
criterion_main!(benches);
