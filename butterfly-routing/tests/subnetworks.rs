//! End-to-end subnetwork removal on small hand-built and random graphs

use butterfly_routing::{
    subnetwork_tags, AccessFilter, EdgeKeyTarjanScc, Graph, NodeTarjanScc, PrepareJob,
    PrepareSubnetworks, ProfileId, PruneConfig, RandomGraphConfig, RoadGraph, SubnetworkStorage,
    TurnCostFilter,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

fn connect(graph: &mut RoadGraph, profile: ProfileId, a: u32, b: u32) {
    let edge = graph.add_edge(a, b);
    graph.set_access(profile, edge, true, true);
}

/// A ring of 12 nodes with chords, a triangle and a single edge
fn islands() -> (RoadGraph, ProfileId) {
    let mut graph = RoadGraph::new(17);
    let car = graph.add_profile("car");
    for node in 0..12 {
        connect(&mut graph, car, node, (node + 1) % 12);
    }
    for node in 0..6 {
        connect(&mut graph, car, node, node + 6);
    }
    connect(&mut graph, car, 12, 13);
    connect(&mut graph, car, 13, 14);
    connect(&mut graph, car, 14, 12);
    connect(&mut graph, car, 15, 16);
    (graph, car)
}

#[test]
fn only_the_big_network_survives() {
    let (mut graph, car) = islands();
    let config = PruneConfig {
        min_network_size: 5,
        min_oneway_network_size: 0,
    };
    let report = PrepareSubnetworks::new(vec![PrepareJob::node_based("car")])
        .with_config(config)
        .do_work(&mut graph)
        .unwrap();

    assert_eq!(report.removed_edges, 4);
    assert_eq!(report.removed_nodes, 5);
    assert_eq!(report.profiles[0].subnetworks, 3);
    assert_eq!(report.profiles[0].removed_subnetworks, 2);

    let filter = AccessFilter::bidirectional(&graph, car);
    let components = NodeTarjanScc::find_components(&graph, &filter, true);
    assert_eq!(components.components().len(), 1);
    assert_eq!(components.biggest_component().len(), 12);
    for node in 12..17 {
        assert!(graph.is_node_removed(node));
    }
}

#[test]
fn pruning_twice_changes_nothing() {
    let jobs = [PrepareJob::node_based("car"), PrepareJob::edge_based("car")];
    for seed in 0..10u64 {
        for job in &jobs {
            let mut rng = StdRng::seed_from_u64(seed);
            let config = RandomGraphConfig {
                nodes: 400,
                mean_degree: 4.0,
                ..Default::default()
            };
            let mut graph = RoadGraph::random(&mut rng, "car", &config);
            let car = graph.profile("car").unwrap();
            let restrictions = graph.add_random_turn_restrictions(&mut rng, car, 0.3);
            assert!(restrictions > 0);

            let prepare = PrepareSubnetworks::new(vec![job.clone()]).with_config(PruneConfig {
                min_network_size: 10,
                min_oneway_network_size: 4,
            });
            let first = match prepare.do_work(&mut graph) {
                Ok(report) => report,
                Err(err) => panic!("seed {} {}: {}", seed, job, err),
            };
            assert!(first.profiles[0].removed_dead_end_edges > 0, "seed {} {}", seed, job);
            let open = graph.accessible_edge_count(car);
            let removed_nodes = graph.removed_node_count();

            let report = prepare.do_work(&mut graph).unwrap();
            assert_eq!(report.removed_edges, 0, "seed {} {}", seed, job);
            assert_eq!(report.removed_nodes, 0, "seed {} {}", seed, job);
            assert_eq!(graph.accessible_edge_count(car), open);
            assert_eq!(graph.removed_node_count(), removed_nodes);
        }
    }
}

#[test]
fn edge_based_pruning_keeps_strongly_connected_keys() {
    for seed in 0..5u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let config = RandomGraphConfig {
            nodes: 300,
            mean_degree: 4.0,
            p_both_directions: 1.0,
            ..Default::default()
        };
        let mut graph = RoadGraph::random(&mut rng, "car", &config);
        let car = graph.profile("car").unwrap();
        let prepare = PrepareSubnetworks::new(vec![PrepareJob::edge_based("car")]).with_config(
            PruneConfig {
                min_network_size: 3,
                min_oneway_network_size: 0,
            },
        );
        prepare.do_work(&mut graph).unwrap();

        let components = {
            let filter = AccessFilter::outgoing(&graph, car);
            let turns = TurnCostFilter::new(graph.turn_costs(car));
            EdgeKeyTarjanScc::find_components(&graph, &filter, &turns, true)
        };
        let open_keys: usize = (0..graph.edge_count() as u32 * 2)
            .filter(|&key| graph.access(car, key))
            .count();
        let kept: usize = components.components().iter().map(Vec::len).sum();
        // every open key belongs to a component that was big enough to keep
        assert_eq!(kept, open_keys, "seed {}", seed);
        for (idx, component) in components.components().iter().enumerate() {
            assert!(
                Some(idx) == components.biggest_index() || component.len() >= 6,
                "seed {}",
                seed
            );
        }

        let report = prepare.do_work(&mut graph).unwrap();
        assert_eq!(report.removed_edges, 0, "seed {}", seed);
    }
}

#[test]
fn pruning_too_much_is_an_error() {
    // a triangle and four separate pairs: 4 of 7 edges would go
    let mut graph = RoadGraph::new(11);
    let car = graph.add_profile("car");
    connect(&mut graph, car, 0, 1);
    connect(&mut graph, car, 1, 2);
    connect(&mut graph, car, 2, 0);
    for pair in 0..4 {
        connect(&mut graph, car, 3 + 2 * pair, 4 + 2 * pair);
    }
    let err = PrepareSubnetworks::new(vec![PrepareJob::node_based("car")])
        .with_config(PruneConfig {
            min_network_size: 3,
            min_oneway_network_size: 0,
        })
        .do_work(&mut graph)
        .unwrap_err();
    assert!(err.to_string().contains("too many edges were removed: 4 out of 7"));
}

#[test]
fn tags_survive_a_file_round_trip() {
    let (mut graph, car) = islands();
    PrepareSubnetworks::new(vec![PrepareJob::node_based("car")])
        .with_config(PruneConfig {
            min_network_size: 3,
            min_oneway_network_size: 0,
        })
        .do_work(&mut graph)
        .unwrap();

    let tags = subnetwork_tags(&graph, car, 3).unwrap();
    assert!((0..12).all(|node| tags.subnetwork(node) == 1));
    assert!((12..15).all(|node| tags.subnetwork(node) == 2));
    assert_eq!(tags.subnetwork(15), 0);
    assert_eq!(tags.subnetwork(16), 0);

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("subnetworks.bin");
    tags.write(&path).unwrap();
    let loaded = SubnetworkStorage::read(&path).unwrap();
    assert_eq!(loaded, tags);
    assert_eq!(loaded.same_subnetwork(0, 11), Some(true));
    assert_eq!(loaded.same_subnetwork(0, 12), Some(false));
}
