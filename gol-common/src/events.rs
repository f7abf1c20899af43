//! Events the client emits toward its visualization adapter (an external
//! collaborator; see spec §6). The renderer itself is out of scope — this
//! module defines the contract a renderer would consume.

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunPhase {
    Quitting,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisualizationEvent {
    /// A single cell whose state differs from the previous observed
    /// snapshot, at `(x, y)`.
    CellFlipped { turn: u32, x: u32, y: u32 },
    /// Emitted once per observed snapshot, after its `CellFlipped` events.
    TurnComplete { turn: u32 },
    /// Emitted roughly every 2 seconds from the `Count` poll.
    AliveCellsCount { turn: u32, count: i64 },
    /// Emitted once at the end of a run.
    FinalTurnComplete { turn: u32, alive_cells: i64 },
    /// Emitted when the run transitions phase (currently: quitting).
    StateChange { turn: u32, phase: RunPhase },
}

/// A sink that consumes visualization events. The default implementation
/// just logs; a real terminal/graphical renderer would implement this
/// trait instead.
pub trait VisualizationSink: Send {
    fn emit(&mut self, event: VisualizationEvent);
}

/// Diffs two boards of identical dimensions and emits one `CellFlipped`
/// per differing cell, followed by `TurnComplete`.
pub fn emit_turn_diff(
    sink: &mut dyn VisualizationSink,
    previous: &crate::board::Board,
    current: &crate::board::Board,
    turn: u32,
) {
    debug_assert_eq!(previous.width, current.width);
    debug_assert_eq!(previous.height, current.height);
    for y in 0..current.height {
        for x in 0..current.width {
            if previous.get(y, x) != current.get(y, x) {
                sink.emit(VisualizationEvent::CellFlipped { turn, x, y });
            }
        }
    }
    sink.emit(VisualizationEvent::TurnComplete { turn });
}

/// A sink that logs every event via `tracing`, used when visualization is
/// suppressed (`--no-vis`) or as a baseline implementation.
pub struct LoggingSink;

impl VisualizationSink for LoggingSink {
    fn emit(&mut self, event: VisualizationEvent) {
        tracing::debug!(?event, "visualization event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Board, ALIVE};

    struct CollectingSink(Vec<VisualizationEvent>);
    impl VisualizationSink for CollectingSink {
        fn emit(&mut self, event: VisualizationEvent) {
            self.0.push(event);
        }
    }

    #[test]
    fn diff_emits_one_flip_per_changed_cell() {
        let mut before = Board::new_dead(3, 3);
        let mut after = Board::new_dead(3, 3);
        after.set(0, 0, ALIVE);
        before.set(2, 2, ALIVE);

        let mut sink = CollectingSink(Vec::new());
        emit_turn_diff(&mut sink, &before, &after, 4);

        let flips: Vec<_> = sink
            .0
            .iter()
            .filter(|e| matches!(e, VisualizationEvent::CellFlipped { .. }))
            .collect();
        assert_eq!(flips.len(), 2);
        assert!(matches!(
            sink.0.last(),
            Some(VisualizationEvent::TurnComplete { turn: 4 })
        ));
    }
}
