use super::super::{Simulation, StepState};
use crate::aggregation::{BackgroundSchool, Swarm};
use crate::grid::CellState;

impl Simulation {
    /// Move every school into its cell and refresh the forcing-driven
    /// aggregations of the occupied cells.
    pub(in crate::world) fn distribute_phase(&mut self, step: usize) -> StepState {
        let mut slots: Vec<Option<CellState>> = (0..self.grid.n_cells()).map(|_| None).collect();
        let mut outside = Vec::new();
        for school in self.population.take() {
            match school.cell {
                Some(cell) if school.alive && !self.grid.is_land(cell) => slots[cell]
                    .get_or_insert_with(|| CellState::new(cell))
                    .schools
                    .push(school),
                _ => outside.push(school),
            }
        }

        let forcing = self.forcing.as_ref();
        let table = &self.table;
        let cells: Vec<CellState> = slots
            .into_iter()
            .flatten()
            .map(|mut state| {
                state.background = table
                    .background
                    .iter()
                    .enumerate()
                    .map(|(idx, cfg)| {
                        BackgroundSchool::new(
                            idx,
                            cfg,
                            forcing.background_biomass(idx, state.cell, step),
                        )
                    })
                    .collect();
                state.swarms = table
                    .plankton
                    .iter()
                    .enumerate()
                    .map(|(idx, cfg)| {
                        Swarm::new(idx, cfg, forcing.plankton_biomass(idx, state.cell, step))
                    })
                    .collect();
                state
            })
            .collect();
        StepState { cells, outside }
    }
}
