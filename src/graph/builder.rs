//! GraphBuilder: segmentation into discourse units and edge inference
//!
//! Segmentation is greedy and strictly sequential: each decision depends on
//! the unit built so far. Edge inference compares every non-adjacent pair and
//! the comparisons are independent, so they run on a bounded number of tasks.

use super::edge::{Edge, EdgeSet};
use super::DiscourseGraph;
use crate::cancel::{Cancelled, CancellationToken};
use crate::oracle::{CallPolicy, EdgeOracle, SegmentationOracle};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

/// Tunables for graph construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// A unit stops growing once its joined text reaches this many characters.
    /// Edge comparisons also truncate each unit to this length.
    pub max_discourse_length: usize,
    /// Edge comparisons in flight at once
    pub edge_concurrency: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_discourse_length: 2048,
            edge_concurrency: 1,
        }
    }
}

pub struct GraphBuilder {
    segmentation: Arc<dyn SegmentationOracle>,
    edges: Arc<dyn EdgeOracle>,
    policy: CallPolicy,
    config: GraphConfig,
}

impl GraphBuilder {
    pub fn new(
        segmentation: Arc<dyn SegmentationOracle>,
        edges: Arc<dyn EdgeOracle>,
        policy: CallPolicy,
        config: GraphConfig,
    ) -> Self {
        Self {
            segmentation,
            edges,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Segment `sentences` and infer the edges between the resulting units.
    pub async fn build(
        &self,
        sentences: &[String],
        cancel: &CancellationToken,
    ) -> Result<DiscourseGraph, Cancelled> {
        let segments = self.segment(sentences, cancel).await?;
        info!(sentences = sentences.len(), units = segments.len(), "segmented document");
        let edges = self.infer_edges(&segments, cancel).await?;
        info!(edges = edges.len(), "inferred dependency edges");
        Ok(DiscourseGraph::from_segments(segments, edges))
    }

    /// Partition `sentences` into units, preserving order without gaps.
    ///
    /// A unit grows while the oracle says the next sentence continues it and
    /// its joined length is below the cap. A failed oracle call closes the
    /// unit.
    pub async fn segment(
        &self,
        sentences: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<String>, Cancelled> {
        let max_len = self.config.max_discourse_length;
        let mut segments = Vec::new();
        let mut start = 0;

        while start < sentences.len() {
            let mut joined = sentences[start].clone();
            let mut joined_len = joined.chars().count();
            let mut end = start + 1;

            while end < sentences.len() && joined_len < max_len {
                cancel.check()?;
                let next = &sentences[end];
                let decision = self
                    .policy
                    .call("segmentation", || self.segmentation.continues_unit(&joined, next))
                    .await;
                match decision {
                    Ok(true) => {
                        joined.push(' ');
                        joined.push_str(next);
                        joined_len += 1 + next.chars().count();
                        end += 1;
                    }
                    Ok(false) => break,
                    Err(e) => {
                        warn!(sentence = end, error = %e, "segmentation oracle failed, closing unit");
                        break;
                    }
                }
            }

            debug!(first = start, last = end - 1, chars = joined_len, "closed unit");
            segments.push(joined);
            start = end;
        }

        Ok(segments)
    }

    /// Adjacency edges for every consecutive pair, plus long-range edges the
    /// oracle confirms. A failed comparison yields no edge.
    pub async fn infer_edges(
        &self,
        segments: &[String],
        cancel: &CancellationToken,
    ) -> Result<EdgeSet, Cancelled> {
        let n = segments.len();
        let mut edges = EdgeSet::chain(n);
        if n < 3 {
            return Ok(edges);
        }

        let max_len = self.config.max_discourse_length;
        let truncated: Vec<Arc<str>> = segments
            .iter()
            .map(|s| Arc::from(s.chars().take(max_len).collect::<String>()))
            .collect();

        let total = (n - 1) * (n - 2) / 2;
        info!(comparisons = total, concurrency = self.config.edge_concurrency, "comparing unit pairs");

        let semaphore = Arc::new(Semaphore::new(self.config.edge_concurrency.max(1)));
        let mut tasks = JoinSet::new();
        let mut failed = 0usize;

        for earlier in 0..n {
            for later in (earlier + 2)..n {
                if cancel.is_cancelled() {
                    tasks.abort_all();
                    return Err(Cancelled);
                }
                let Ok(permit) = semaphore.clone().acquire_owned().await else {
                    break;
                };
                let oracle = self.edges.clone();
                let policy = self.policy.clone();
                let a = truncated[earlier].clone();
                let b = truncated[later].clone();
                tasks.spawn(async move {
                    let _permit = permit;
                    let result = policy.call("edge", || oracle.depends_on(&a, &b)).await;
                    (earlier, later, result)
                });

                while let Some(joined) = tasks.try_join_next() {
                    collect(joined, &mut edges, &mut failed);
                }
            }
        }

        while let Some(joined) = tasks.join_next().await {
            collect(joined, &mut edges, &mut failed);
            if cancel.is_cancelled() {
                tasks.abort_all();
                return Err(Cancelled);
            }
        }

        if failed > 0 {
            warn!(failed, total, "edge comparisons failed and were skipped");
        }
        Ok(edges)
    }
}

type Comparison = (usize, usize, crate::oracle::OracleResult<bool>);

fn collect(
    joined: Result<Comparison, tokio::task::JoinError>,
    edges: &mut EdgeSet,
    failed: &mut usize,
) {
    match joined {
        Ok((earlier, later, Ok(true))) => {
            edges.insert(Edge::new(earlier, later));
        }
        Ok((_, _, Ok(false))) => {}
        Ok((earlier, later, Err(e))) => {
            debug!(earlier, later, error = %e, "edge comparison failed");
            *failed += 1;
        }
        Err(e) => {
            debug!(error = %e, "edge comparison task did not finish");
            *failed += 1;
        }
    }
}
