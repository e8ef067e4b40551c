//! Results persistence module

use anyhow::Result;
use crate::graph::algorithms::{connected_component_count, to_petgraph};
use crate::graph::CompressedGraph;
use crate::pipeline::Analysis;
use petgraph::dot::{Config as DotConfig, Dot};
use serde_json::{json, to_string_pretty};
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Save the results of one run to the specified directory
pub fn save_results(analysis: &Analysis, output_dir: &str) -> Result<()> {
    let k = analysis.result.k;
    log::info!(
        "Saving {} communities (k={}) to {}",
        analysis.result.communities.len(),
        k,
        output_dir
    );

    // Ensure output directory exists
    fs::create_dir_all(output_dir)?;

    save_summary(analysis, output_dir)?;
    save_nodes(analysis, output_dir)?;
    save_communities(analysis, output_dir)?;
    save_node_map(analysis, output_dir)?;

    log::info!("Results for k={} saved successfully", k);

    Ok(())
}

/// Save summary information
fn save_summary(analysis: &Analysis, output_dir: &str) -> Result<()> {
    let graph = &analysis.graph;
    let result = &analysis.result;
    let communities = &result.communities;

    let path = Path::new(output_dir).join(format!("summary_k{}.json", result.k));
    let mut file = File::create(path)?;

    let sizes: Vec<usize> = communities.iter().map(|c| c.size).collect();
    let count = if communities.is_empty() { 1.0 } else { communities.len() as f64 };
    let avg_degree = if graph.node_count == 0 {
        0.0
    } else {
        2.0 * graph.edge_count() as f64 / graph.node_count as f64
    };

    let summary = json!({
        "parameters": {
            "threshold": analysis.config.threshold,
            "k": result.k,
            "duplicate_policy": analysis.config.duplicate_policy,
            "min_community_size": analysis.config.min_community_size,
        },
        "graph_stats": {
            "node_count": graph.node_count,
            "edge_count": graph.edge_count(),
            "isolated_node_count": graph.isolated_count(),
            "connected_components": connected_component_count(graph),
            "avg_degree": avg_degree,
        },
        "community_stats": {
            "clique_count": result.clique_count,
            "community_count": communities.len(),
            "covered_node_count": result.covered_node_count(),
            "unassigned_node_count": result.assignment.unassigned_nodes().len(),
            "overlapping_node_count": result.assignment.overlapping_nodes().len(),
            "largest_community_size": sizes.iter().copied().max().unwrap_or(0),
            "smallest_community_size": sizes.iter().copied().min().unwrap_or(0),
            "avg_community_size": sizes.iter().sum::<usize>() as f64 / count,
            "avg_density": communities.iter().map(|c| c.density as f64).sum::<f64>() / count,
        },
        "communities": analysis.community_summaries(),
    });

    file.write_all(to_string_pretty(&summary)?.as_bytes())?;

    Ok(())
}

/// Save one record per node for rendering layers
fn save_nodes(analysis: &Analysis, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join(format!("nodes_k{}.json", analysis.result.k));
    let mut file = File::create(path)?;
    file.write_all(to_string_pretty(&analysis.node_summaries())?.as_bytes())?;
    Ok(())
}

/// Save community membership rows: community_id,label,member
fn save_communities(analysis: &Analysis, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join(format!("cpm_communities_k{}.csv", analysis.result.k));
    let mut file = File::create(path)?;

    writeln!(file, "community_id,label,member")?;
    for community in analysis.community_summaries() {
        for member in &community.members {
            writeln!(file, "{},{},{}", community.id, csv_field(&community.label), csv_field(member))?;
        }
    }

    Ok(())
}

/// Save node to community rows: node,communities,primary_community
fn save_node_map(analysis: &Analysis, output_dir: &str) -> Result<()> {
    let path = Path::new(output_dir).join(format!("node_community_map_k{}.csv", analysis.result.k));
    let mut file = File::create(path)?;

    writeln!(file, "node,communities,primary_community")?;
    for node in analysis.node_summaries() {
        let communities = node.communities.iter()
            .map(|c| c.to_string())
            .collect::<Vec<_>>()
            .join(";");
        let primary = node.primary_community.map(|c| c.to_string()).unwrap_or_default();
        writeln!(file, "{},{},{}", csv_field(&node.id), communities, primary)?;
    }

    Ok(())
}

/// Save the thresholded graph in DOT format
pub fn save_graph_dot(graph: &CompressedGraph, output_dir: &str) -> Result<()> {
    fs::create_dir_all(output_dir)?;
    let path = Path::new(output_dir).join("thresholded_graph.dot");

    let pg = to_petgraph(graph);
    let dot = Dot::with_attr_getters(
        &pg,
        &[DotConfig::EdgeNoLabel],
        &|_, edge| format!("weight={}", edge.weight()),
        &|_, _| String::new(),
    );
    fs::write(&path, format!("{:?}", dot))?;

    log::info!("Saved thresholded graph to {}", path.display());
    Ok(())
}

/// Quote a CSV field when it contains separators or quotes
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
