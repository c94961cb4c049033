use crate::aggregation::{BackgroundSchool, Swarm};
use crate::config::GridConfig;
use crate::school::School;

/// Regular rectangular grid with a land mask. Cells are indexed row-major.
#[derive(Clone, Debug)]
pub struct Grid {
    nx: usize,
    ny: usize,
    land: Vec<bool>,
    ocean: Vec<usize>,
}

impl Grid {
    pub fn from_config(config: &GridConfig) -> Self {
        let ncell = config.nx * config.ny;
        let mut land = vec![false; ncell];
        for &cell in &config.land {
            if let Some(flag) = land.get_mut(cell) {
                *flag = true;
            }
        }
        let ocean = (0..ncell).filter(|&c| !land[c]).collect();
        Self {
            nx: config.nx,
            ny: config.ny,
            land,
            ocean,
        }
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn n_cells(&self) -> usize {
        self.land.len()
    }

    pub fn index(&self, i: usize, j: usize) -> usize {
        j * self.nx + i
    }

    pub fn coords(&self, cell: usize) -> (usize, usize) {
        (cell % self.nx, cell / self.nx)
    }

    /// Cells beyond the grid count as land.
    pub fn is_land(&self, cell: usize) -> bool {
        self.land.get(cell).copied().unwrap_or(true)
    }

    pub fn ocean_cells(&self) -> &[usize] {
        &self.ocean
    }
}

/// Everything located in one ocean cell during a time step. A cell is the unit
/// of mutation handed to a worker: no other worker touches its contents.
#[derive(Debug)]
pub struct CellState {
    pub cell: usize,
    pub schools: Vec<School>,
    pub background: Vec<BackgroundSchool>,
    pub swarms: Vec<Swarm>,
}

impl CellState {
    pub fn new(cell: usize) -> Self {
        Self {
            cell,
            schools: Vec::new(),
            background: Vec::new(),
            swarms: Vec::new(),
        }
    }

    /// Schools plus background schools.
    pub fn n_predators(&self) -> usize {
        self.schools.len() + self.background.len()
    }

    /// Every prey candidate: schools, then background schools, then swarms.
    pub fn pool_len(&self) -> usize {
        self.n_predators() + self.swarms.len()
    }
}
