use crate::school::School;

/// Every school of the run, stored contiguously in id order.
#[derive(Clone, Debug, Default)]
pub struct Population {
    schools: Vec<School>,
    next_id: u64,
}

impl Population {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next id that `add` will hand out.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    /// Insert a school, assigning it a fresh id. Returns that id.
    pub fn add(&mut self, mut school: School) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        school.id = id;
        self.schools.push(school);
        id
    }

    pub fn remove(&mut self, id: u64) -> Option<School> {
        let pos = self.schools.binary_search_by_key(&id, |s| s.id).ok()?;
        Some(self.schools.remove(pos))
    }

    /// Drop dead schools; returns how many were removed.
    pub fn remove_dead(&mut self) -> usize {
        let before = self.schools.len();
        self.schools.retain(|s| s.alive);
        before - self.schools.len()
    }

    pub fn len(&self) -> usize {
        self.schools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schools.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&School> {
        self.schools
            .binary_search_by_key(&id, |s| s.id)
            .ok()
            .map(|pos| &self.schools[pos])
    }

    pub fn iter(&self) -> impl Iterator<Item = &School> {
        self.schools.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut School> {
        self.schools.iter_mut()
    }

    pub fn alive(&self) -> impl Iterator<Item = &School> {
        self.schools.iter().filter(|s| s.alive)
    }

    pub fn in_domain(&self) -> impl Iterator<Item = &School> {
        self.alive().filter(|s| s.cell.is_some())
    }

    pub fn of_species(&self, species: usize) -> impl Iterator<Item = &School> {
        self.alive().filter(move |s| s.species == species)
    }

    /// Hand the schools over for a time step.
    pub(crate) fn take(&mut self) -> Vec<School> {
        std::mem::take(&mut self.schools)
    }

    /// Take schools back after a time step, restoring id order.
    pub(crate) fn restore(&mut self, mut schools: Vec<School>) {
        schools.sort_unstable_by_key(|s| s.id);
        self.schools = schools;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimConfig;
    use crate::species::SpeciesTable;

    fn school(species: usize, cell: Option<usize>) -> School {
        let table = SpeciesTable::from_config(&SimConfig::default());
        School::new(0, &table.species[species], 20, 10.0, 100.0, cell)
    }

    #[test]
    fn add_assigns_increasing_ids() {
        let mut population = Population::new();
        assert_eq!(population.add(school(0, Some(1))), 0);
        assert_eq!(population.add(school(1, Some(1))), 1);
        assert_eq!(population.next_id(), 2);
        assert_eq!(population.get(1).map(|s| s.species), Some(1));
    }

    #[test]
    fn filtered_views() {
        let mut population = Population::new();
        population.add(school(0, Some(1)));
        population.add(school(0, None));
        let dead = population.add(school(1, Some(2)));
        population.add(school(1, Some(3)));
        if let Some(s) = population.iter_mut().find(|s| s.id == dead) {
            s.kill();
        }
        assert_eq!(population.alive().count(), 3);
        assert_eq!(population.in_domain().count(), 2);
        assert_eq!(population.of_species(1).count(), 1);
        assert_eq!(population.remove_dead(), 1);
        assert_eq!(population.len(), 3);
        assert!(population.get(dead).is_none());
    }

    #[test]
    fn restore_sorts_by_id() {
        let mut population = Population::new();
        for _ in 0..4 {
            population.add(school(0, Some(0)));
        }
        let mut schools = population.take();
        assert!(population.is_empty());
        schools.reverse();
        population.restore(schools);
        let ids: Vec<u64> = population.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert!(population.remove(2).is_some());
        assert!(population.remove(2).is_none());
    }
}
