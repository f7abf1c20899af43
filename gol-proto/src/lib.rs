//! Generated gRPC client/server code for the broker and worker RPC surfaces.
//!
//! The `.proto` in `proto/gol.proto` is the single source of truth for the
//! wire schema described in the spec: `Board`, the broker's control surface
//! (`Init`/`Start`/`ProgressAll`/`Count`/`Fetch`/`Pause`/`Quit`/`Kill`) and
//! the worker's per-strip surface (same plus `Progress`/`Halo`).

tonic::include_proto!("gol.v1");
