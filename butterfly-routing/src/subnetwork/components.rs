//! Result of one SCC computation

use bit_vec::BitVec;

/// Strongly connected components over nodes or edge keys ("units").
///
/// Components with more than one unit are listed explicitly. Single-unit
/// components are only flagged in [`single_unit_components`] when the search
/// was asked to keep them; they are always counted in the totals.
///
/// [`single_unit_components`]: ConnectedComponents::single_unit_components
#[derive(Debug, Clone, Default)]
pub struct ConnectedComponents {
    components: Vec<Vec<u32>>,
    single_unit_components: BitVec,
    biggest: Option<usize>,
    total_components: usize,
    units: usize,
}

impl ConnectedComponents {
    /// `unit_space` sizes the single-unit bit set, `None` when single-unit
    /// components are not recorded
    pub(crate) fn new(unit_space: Option<usize>) -> Self {
        Self {
            single_unit_components: BitVec::from_elem(unit_space.unwrap_or(0), false),
            ..Default::default()
        }
    }

    pub(crate) fn add_single_unit(&mut self, unit: u32, record: bool) {
        self.total_components += 1;
        self.units += 1;
        if record {
            self.single_unit_components.set(unit as usize, true);
        }
    }

    pub(crate) fn add_component(&mut self, component: Vec<u32>) {
        debug_assert!(component.len() > 1);
        self.total_components += 1;
        self.units += component.len();
        // ties keep the component found first
        if component.len() > self.biggest_component().len() {
            self.biggest = Some(self.components.len());
        }
        self.components.push(component);
    }

    /// Components with at least two units, in the order they were closed
    pub fn components(&self) -> &[Vec<u32>] {
        &self.components
    }

    /// Units forming their own component. Empty if single-unit components
    /// were excluded.
    pub fn single_unit_components(&self) -> &BitVec {
        &self.single_unit_components
    }

    pub fn is_single_unit(&self, unit: u32) -> bool {
        self.single_unit_components
            .get(unit as usize)
            .unwrap_or(false)
    }

    /// Iterate the flagged single units in ascending order
    pub fn single_units(&self) -> impl Iterator<Item = u32> + '_ {
        self.single_unit_components
            .iter()
            .enumerate()
            .filter(|(_, single)| *single)
            .map(|(unit, _)| unit as u32)
    }

    /// The largest listed component, or an empty slice if none was listed
    pub fn biggest_component(&self) -> &[u32] {
        match self.biggest {
            Some(idx) => &self.components[idx],
            None => &[],
        }
    }

    /// Position of the biggest component in [`components`](Self::components)
    pub fn biggest_index(&self) -> Option<usize> {
        self.biggest
    }

    /// All components, single-unit ones included
    pub fn total_components(&self) -> usize {
        self.total_components
    }

    /// Units covered by the search
    pub fn units(&self) -> usize {
        self.units
    }

    pub fn nodes(&self) -> usize {
        self.units
    }

    pub fn edge_keys(&self) -> usize {
        self.units
    }

    /// Index of the listed component containing `unit`
    pub fn find_component(&self, unit: u32) -> Option<usize> {
        self.components.iter().position(|c| c.contains(&unit))
    }

    /// Listed components with sorted units, sorted, for order-independent comparison
    pub fn sorted_components(&self) -> Vec<Vec<u32>> {
        let mut sorted: Vec<Vec<u32>> = self
            .components
            .iter()
            .map(|c| {
                let mut c = c.clone();
                c.sort_unstable();
                c
            })
            .collect();
        sorted.sort();
        sorted
    }
}
