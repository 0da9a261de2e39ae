// SPDX-License-Identifier: BSD-3-Clause
//! Reference solution for cross-checking the worklist solver.
//!
//! The same constraints as Datalog rules over the points-to relation: loads
//! and stores join against every pair of facts on each round, like the
//! naive "iterate until nothing changes" solver, and no edges are derived.
//! Much slower than [`super::pointer`], and much easier to trust.

#[cfg(not(feature = "par"))]
use ascent::ascent_run;
#[cfg(feature = "par")]
use ascent::ascent_run_par as ascent_run;

use crate::{
    graph::{ConstraintGraph, EdgeClass, EdgeKind, NodeId},
    pts::PointsToStore,
};

#[allow(clippy::clone_on_copy)]
#[allow(clippy::type_complexity)]
pub fn analysis(graph: &ConstraintGraph) -> PointsToStore {
    let pairs = |class| -> Vec<(NodeId, NodeId)> {
        graph.edges(class).map(|e| (e.src, e.dst)).collect()
    };
    let addrs = pairs(EdgeClass::Addr);
    let copies = pairs(EdgeClass::Copy);
    let stores = pairs(EdgeClass::Store);
    let loads = pairs(EdgeClass::Load);
    let mut normal_geps: Vec<(NodeId, NodeId, u32)> = Vec::new();
    let mut variant_geps: Vec<(NodeId, NodeId)> = Vec::new();
    for e in graph.edges(EdgeClass::Gep) {
        match e.kind {
            EdgeKind::NormalGep(offset) => normal_geps.push((e.src, e.dst, offset)),
            EdgeKind::VariantGep => variant_geps.push((e.src, e.dst)),
            EdgeKind::Addr | EdgeKind::Copy | EdgeKind::Store | EdgeKind::Load => (),
        }
    }

    #[allow(unused_variables)]
    let outs = ascent_run! {
        relation copy_edge(NodeId, NodeId);
        copy_edge(src, dst) <-- for (src, dst) in copies.iter().copied();

        relation store_edge(NodeId, NodeId);
        store_edge(src, dst) <-- for (src, dst) in stores.iter().copied();

        relation load_edge(NodeId, NodeId);
        load_edge(src, dst) <-- for (src, dst) in loads.iter().copied();

        relation normal_gep(NodeId, NodeId, u32);
        normal_gep(src, dst, offset) <-- for (src, dst, offset) in normal_geps.iter().copied();

        relation variant_gep(NodeId, NodeId);
        variant_gep(src, dst) <-- for (src, dst) in variant_geps.iter().copied();

        relation points_to(NodeId, NodeId);

        // p = &o
        points_to(p, o) <-- for (o, p) in addrs.iter().copied();

        // x = p
        points_to(x, o) <-- copy_edge(p, x), points_to(p, o);

        // *p = q
        points_to(o, v) <-- store_edge(q, p), points_to(p, o), points_to(q, v);

        // r = *p
        points_to(r, v) <-- load_edge(p, r), points_to(p, o), points_to(o, v);

        // x = &p->f
        points_to(x, f) <--
          normal_gep(p, x, offset),
          points_to(p, o),
          let f = graph.field_object(o.clone(), offset.clone());

        // x = &p[i]
        points_to(x, o) <-- variant_gep(p, x), points_to(p, o);
    };

    outs.points_to.into_iter().collect()
}
