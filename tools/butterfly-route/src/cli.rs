//! CLI commands for butterfly-route

use anyhow::{bail, Context, Result};
use butterfly_routing::graph::Graph;
use butterfly_routing::{
    subnetwork_tags, AccessFilter, ConnectedComponents, EdgeKeyTarjanScc, NodeTarjanScc,
    PrepareJob, PrepareSubnetworks, RandomGraphConfig, RoadGraph, TurnCostFilter,
};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::ToolConfig;
use crate::graph_file::GraphFile;

#[derive(Parser)]
#[command(name = "butterfly-route")]
#[command(version)]
#[command(about = "Subnetwork preprocessing for road graphs", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Remove small subnetworks per profile and write the pruned graph
    Prune {
        /// Input graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output graph (JSON)
        #[arg(short, long)]
        output: PathBuf,

        /// TOML file with thresholds and profiles
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Profile to prune, `name` or `name:edge-based` (repeatable).
        /// Defaults to the config file, then to every profile of the graph.
        #[arg(short, long = "profile")]
        profiles: Vec<String>,

        /// Components with fewer nodes are removed (0 disables removal)
        #[arg(long)]
        min_network_size: Option<usize>,

        /// Directed components with fewer nodes are removed first
        #[arg(long)]
        min_oneway_network_size: Option<usize>,

        /// Also write subnetwork tags for the first profile
        #[arg(long)]
        subnetworks: Option<PathBuf>,

        /// Write the prune report as JSON
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Print strongly connected component statistics for one profile
    Components {
        /// Input graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        profile: String,

        /// Components over edge keys with turn restrictions applied
        #[arg(long)]
        edge_based: bool,

        /// Use the recursive search (small graphs only)
        #[arg(long)]
        recursive: bool,

        /// Number of component sizes to list
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Write the subnetwork tag file for one profile
    Tag {
        /// Input graph (JSON)
        #[arg(short, long)]
        input: PathBuf,

        #[arg(short, long)]
        profile: String,

        /// Output tag file
        #[arg(short, long)]
        output: PathBuf,

        /// Smallest component that gets a tag
        #[arg(long, default_value = "2")]
        min_size: usize,
    },

    /// Write a random road graph
    Generate {
        /// Output graph (JSON)
        #[arg(short, long)]
        output: PathBuf,

        #[arg(long, default_value = "1000")]
        nodes: usize,

        #[arg(long, default_value = "2.0")]
        mean_degree: f64,

        #[arg(long, default_value = "42")]
        seed: u64,

        /// Probability that an edge is open in both directions
        #[arg(long, default_value = "0.7")]
        p_both: f64,

        /// Probability that an edge is closed
        #[arg(long, default_value = "0.0")]
        p_blocked: f64,

        #[arg(long)]
        no_loops: bool,

        /// Probability of a turn restriction per turn at the selected junctions
        #[arg(long, default_value = "0.0")]
        turn_restrictions: f64,

        #[arg(long, default_value = "car")]
        profile: String,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Prune {
                input,
                output,
                config,
                profiles,
                min_network_size,
                min_oneway_network_size,
                subnetworks,
                report,
            } => {
                let tool_config = match &config {
                    Some(path) => ToolConfig::load(path)?,
                    None => ToolConfig::default(),
                };
                let prune_config =
                    tool_config.prune_config(min_network_size, min_oneway_network_size);

                let mut graph = load_graph(&input)?;
                let mut jobs = tool_config.jobs(&profiles)?;
                if jobs.is_empty() {
                    jobs = graph
                        .profiles()
                        .map(|(_, name)| PrepareJob::node_based(name))
                        .collect();
                }
                if jobs.is_empty() {
                    bail!("{} has no profiles to prune", input.display());
                }
                let first_profile = jobs[0].name.clone();

                println!(
                    "🦋 Pruning {} profile(s): min_network_size={}, min_oneway_network_size={}",
                    jobs.len(),
                    prune_config.min_network_size,
                    prune_config.min_oneway_network_size
                );
                let start = Instant::now();
                let prune_report = PrepareSubnetworks::new(jobs)
                    .with_config(prune_config)
                    .do_work(&mut graph)
                    .context("Subnetwork removal failed")?;

                for profile in &prune_report.profiles {
                    println!(
                        "  {} ({}): {} subnetworks, {} removed, {} dead-end edges + {} edges closed",
                        profile.name,
                        profile.traversal,
                        profile.subnetworks,
                        profile.removed_subnetworks,
                        profile.removed_dead_end_edges,
                        profile.removed_edges
                    );
                }
                println!(
                    "✓ Closed {} edges, removed {} nodes in {:.2}s",
                    prune_report.removed_edges,
                    prune_report.removed_nodes,
                    start.elapsed().as_secs_f64()
                );

                GraphFile::from_graph(&graph).save(&output)?;
                println!("✓ Wrote {}", output.display());

                if let Some(path) = subnetworks {
                    write_tags(&graph, &first_profile, 2, &path)?;
                }
                if let Some(path) = report {
                    let json = serde_json::to_string_pretty(&prune_report)?;
                    std::fs::write(&path, json)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    println!("✓ Wrote {}", path.display());
                }
            }

            Commands::Components {
                input,
                profile,
                edge_based,
                recursive,
                top,
            } => {
                let graph = load_graph(&input)?;
                let id = graph.profile(&profile)?;
                let start = Instant::now();
                let filter = AccessFilter::outgoing(&graph, id);
                let (components, unit) = if edge_based {
                    let turns = TurnCostFilter::new(graph.turn_costs(id));
                    let components = if recursive {
                        EdgeKeyTarjanScc::find_components_recursive(&graph, &filter, &turns, false)
                    } else {
                        EdgeKeyTarjanScc::find_components(&graph, &filter, &turns, false)
                    };
                    (components, "edge keys")
                } else {
                    let components = if recursive {
                        NodeTarjanScc::find_components_recursive(&graph, &filter, false)
                    } else {
                        NodeTarjanScc::find_components(&graph, &filter, false)
                    };
                    (components, "nodes")
                };
                print_components(&components, unit, top);
                println!("✓ Done in {:.3}s", start.elapsed().as_secs_f64());
            }

            Commands::Tag {
                input,
                profile,
                output,
                min_size,
            } => {
                let graph = load_graph(&input)?;
                write_tags(&graph, &profile, min_size, &output)?;
            }

            Commands::Generate {
                output,
                nodes,
                mean_degree,
                seed,
                p_both,
                p_blocked,
                no_loops,
                turn_restrictions,
                profile,
            } => {
                for (name, p) in [
                    ("p-both", p_both),
                    ("p-blocked", p_blocked),
                    ("turn-restrictions", turn_restrictions),
                ] {
                    if !(0.0..=1.0).contains(&p) {
                        bail!("--{} must be in 0..=1, got {}", name, p);
                    }
                }
                let config = RandomGraphConfig {
                    nodes,
                    mean_degree,
                    allow_loops: !no_loops,
                    p_both_directions: p_both,
                    p_blocked,
                };
                let mut rng = StdRng::seed_from_u64(seed);
                let mut graph = RoadGraph::random(&mut rng, &profile, &config);
                let restrictions = if turn_restrictions > 0.0 {
                    let id = graph.profile(&profile)?;
                    graph.add_random_turn_restrictions(&mut rng, id, turn_restrictions)
                } else {
                    0
                };
                GraphFile::from_graph(&graph).save(&output)?;
                println!(
                    "✓ Wrote {} nodes, {} edges, {} turn restrictions to {}",
                    graph.node_count(),
                    graph.edge_count(),
                    restrictions,
                    output.display()
                );
            }
        }

        Ok(())
    }
}

fn load_graph(path: &Path) -> Result<RoadGraph> {
    println!("Loading graph from {}...", path.display());
    let graph = GraphFile::load(path)?
        .to_graph()
        .with_context(|| format!("Invalid graph in {}", path.display()))?;
    println!(
        "  {} nodes, {} edges, {} profile(s)",
        graph.node_count(),
        graph.edge_count(),
        graph.profile_count()
    );
    Ok(graph)
}

fn write_tags(graph: &RoadGraph, profile: &str, min_size: usize, path: &Path) -> Result<()> {
    let id = graph.profile(profile)?;
    let tags = subnetwork_tags(graph, id, min_size)?;
    tags.write(path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    let counts = tags.tag_counts();
    let tagged = counts[1..].iter().filter(|&&count| count > 0).count();
    println!(
        "✓ Wrote subnetwork tags for '{}' to {} ({} subnetworks, {} nodes unassigned)",
        profile,
        path.display(),
        tagged,
        counts[0]
    );
    Ok(())
}

fn print_components(components: &ConnectedComponents, unit: &str, top: usize) {
    let singles = components.total_components() - components.components().len();
    println!(
        "{} components over {} {} ({} single)",
        components.total_components(),
        components.units(),
        unit,
        singles
    );
    println!("  biggest: {} {}", components.biggest_component().len(), unit);
    let mut sizes: Vec<usize> = components.components().iter().map(Vec::len).collect();
    sizes.sort_unstable_by(|a, b| b.cmp(a));
    if !sizes.is_empty() {
        let shown: Vec<String> = sizes.iter().take(top).map(ToString::to_string).collect();
        println!("  largest sizes: {}", shown.join(", "));
    }
}
