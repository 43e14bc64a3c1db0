//! The road network: a weighted undirected multigraph where some edges are
//! flooded.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use thiserror::Error;

use crate::cost::Time;

/// Vertices are numbered `1..=n`.
pub type VertexId = u32;
pub type EdgeId = u32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Edge {
    pub id: EdgeId,
    pub u: VertexId,
    pub v: VertexId,
    pub weight: Time,
    pub flooded: bool,
}

impl Edge {
    /// The endpoint opposite to `from`.
    #[inline(always)]
    pub fn other(&self, from: VertexId) -> VertexId {
        debug_assert!(from == self.u || from == self.v);
        if from == self.u { self.v } else { self.u }
    }

    #[inline(always)]
    pub fn connects(&self, a: VertexId, b: VertexId) -> bool {
        (self.u == a && self.v == b) || (self.u == b && self.v == a)
    }

    /// Time to cross under the real cost model, `None` if impassable.
    #[inline(always)]
    pub fn cost(&self, equipped: bool, speed_factor: Time) -> Option<Time> {
        if equipped {
            Some(self.weight.saturating_mul(speed_factor))
        } else if self.flooded {
            None
        } else {
            Some(self.weight)
        }
    }

    /// A lower bound on the time to cross, whatever the equipment.
    #[inline(always)]
    pub fn optimistic_cost(&self, speed_factor: Time) -> Time {
        std::cmp::min(self.weight, self.weight.saturating_mul(speed_factor))
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GraphError {
    #[error("Edge #{edge} references vertex {vertex} outside 1..={vertex_count}")]
    VertexOutOfRange {
        edge: EdgeId,
        vertex: VertexId,
        vertex_count: usize,
    },
    #[error("Edge #{0} is defined twice")]
    DuplicateEdge(EdgeId),
    #[error("Edge #{0} has zero weight")]
    ZeroWeight(EdgeId),
}

/// Static topology. Immutable once built.
#[derive(Clone)]
pub struct Graph {
    vertex_count: usize,
    /// Edges, sorted by id.
    edges: Vec<Edge>,
    /// Indices into `edges` of the edges touching each vertex, sorted by id.
    /// Slot 0 is unused.
    adjacency: Vec<SmallVec<[usize; 4]>>,
    by_id: FxHashMap<EdgeId, usize>,
}

impl Graph {
    pub fn builder(vertex_count: usize) -> GraphBuilder {
        GraphBuilder::new(vertex_count)
    }

    #[inline(always)]
    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + use<> {
        1..=(self.vertex_count as VertexId)
    }

    #[inline(always)]
    pub fn contains(&self, v: VertexId) -> bool {
        v >= 1 && (v as usize) <= self.vertex_count
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.by_id.get(&id).map(|&i| &self.edges[i])
    }

    /// Edges touching `u` with the vertex on their other side, by increasing
    /// edge id.
    pub fn neighbours(&self, u: VertexId) -> impl Iterator<Item = (VertexId, &Edge)> {
        let slots: &[usize] = match self.adjacency.get(u as usize) {
            Some(slots) => slots.as_slice(),
            None => &[],
        };
        slots.iter().map(move |&i| {
            let e = &self.edges[i];
            (e.other(u), e)
        })
    }

    /// The lowest-id edge joining `a` and `b`.
    pub fn edge_between(&self, a: VertexId, b: VertexId) -> Option<&Edge> {
        self.neighbours(a)
            .find(|(v, e)| *v == b && e.connects(a, b))
            .map(|(_, e)| e)
    }

    /// Builds a connected random graph.
    ///
    /// A random spanning tree keeps every vertex reachable when ignoring
    /// floods, then `extra_edges` more edges are sprinkled on top (parallel
    /// edges included). Weights are drawn from `1..=max_weight`.
    pub fn random<R: rand::Rng>(
        r: &mut R,
        vertex_count: usize,
        extra_edges: usize,
        max_weight: Time,
        flood_probability: f64,
    ) -> Graph {
        let mut builder = GraphBuilder::new(vertex_count);
        let max_weight = std::cmp::max(max_weight, 1);
        let mut next_id: EdgeId = 1;
        let mut add = |builder: &mut GraphBuilder, r: &mut R, u: VertexId, v: VertexId| {
            let weight = r.random_range(1..=max_weight);
            let flooded = r.random_bool(flood_probability);
            builder.edge(next_id, u, v, weight, flooded);
            next_id += 1;
        };

        for v in 2..=(vertex_count as VertexId) {
            let u = r.random_range(1..v);
            add(&mut builder, r, u, v);
        }
        if vertex_count >= 2 {
            for _ in 0..extra_edges {
                let u = r.random_range(1..=(vertex_count as VertexId));
                let mut v = r.random_range(1..=(vertex_count as VertexId));
                if u == v {
                    v = if v == 1 { 2 } else { v - 1 };
                }
                add(&mut builder, r, u, v);
            }
        }

        match builder.build() {
            Ok(g) => g,
            Err(e) => unreachable!("Random graphs are well-formed by construction: {e}"),
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "Graph{{({} vertices, {} edges)}}",
            self.vertex_count,
            self.edges.len()
        )
    }
}

impl std::fmt::Display for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "#N {}", self.vertex_count)?;
        for e in &self.edges {
            write!(f, "#E{} {} {} W{}", e.id, e.u, e.v, e.weight)?;
            if e.flooded {
                write!(f, " F")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Collects edges and validates them into a `Graph`.
#[derive(Clone, Debug)]
pub struct GraphBuilder {
    vertex_count: usize,
    edges: Vec<Edge>,
}

impl GraphBuilder {
    pub fn new(vertex_count: usize) -> Self {
        Self {
            vertex_count,
            edges: vec![],
        }
    }

    pub fn edge(
        &mut self,
        id: EdgeId,
        u: VertexId,
        v: VertexId,
        weight: Time,
        flooded: bool,
    ) -> &mut Self {
        self.edges.push(Edge {
            id,
            u,
            v,
            weight,
            flooded,
        });
        self
    }

    pub fn build(&self) -> Result<Graph, GraphError> {
        let vertex_count = self.vertex_count;
        let mut edges = self.edges.clone();
        edges.sort_by_key(|e| e.id);

        let mut by_id = FxHashMap::default();
        let mut adjacency = vec![SmallVec::<[usize; 4]>::new(); vertex_count + 1];
        for (i, e) in edges.iter().enumerate() {
            for vertex in [e.u, e.v] {
                if vertex == 0 || vertex as usize > vertex_count {
                    return Err(GraphError::VertexOutOfRange {
                        edge: e.id,
                        vertex,
                        vertex_count,
                    });
                }
            }
            if e.weight == 0 {
                return Err(GraphError::ZeroWeight(e.id));
            }
            if by_id.insert(e.id, i).is_some() {
                return Err(GraphError::DuplicateEdge(e.id));
            }
            adjacency[e.u as usize].push(i);
            if e.v != e.u {
                adjacency[e.v as usize].push(i);
            }
        }

        Ok(Graph {
            vertex_count,
            edges,
            adjacency,
            by_id,
        })
    }
}
