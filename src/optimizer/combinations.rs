//! Lazy enumeration of candidate quartets. Orders are lexicographic over the
//! input pools, so the first hit of any scan is reproducible.

use crate::model::{Composition, Slot};
use crate::optimizer::eligibility::partition_by_gender;
use crate::optimizer::meet::Meet;

#[derive(Debug, Clone)]
enum Shape {
    /// Any four of one pool.
    Flat { pool: Vec<usize>, idx: [usize; 4] },
    /// Two of each pool.
    Paired {
        male: Vec<usize>,
        female: Vec<usize>,
        m: [usize; 2],
        f: [usize; 2],
    },
}

#[derive(Debug, Clone)]
pub struct Quartets {
    shape: Shape,
    done: bool,
}

impl Quartets {
    pub fn flat(pool: Vec<usize>) -> Self {
        let done = pool.len() < 4;
        Self {
            shape: Shape::Flat {
                pool,
                idx: [0, 1, 2, 3],
            },
            done,
        }
    }

    pub fn paired(male: Vec<usize>, female: Vec<usize>) -> Self {
        let done = male.len() < 2 || female.len() < 2;
        Self {
            shape: Shape::Paired {
                male,
                female,
                m: [0, 1],
                f: [0, 1],
            },
            done,
        }
    }

    /// Quartets shaped by the slot's composition: 2+2 for mixed slots.
    pub fn for_slot(meet: &Meet<'_>, slot: &Slot, pool: &[usize]) -> Self {
        match slot.composition {
            Composition::Mixed => {
                let (male, female) = partition_by_gender(meet, pool);
                Self::paired(male, female)
            }
            Composition::Male | Composition::Female => Self::flat(pool.to_vec()),
        }
    }
}

impl Iterator for Quartets {
    type Item = [usize; 4];

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match &mut self.shape {
            Shape::Flat { pool, idx } => {
                let item = idx.map(|i| pool[i]);
                self.done = !advance(idx, pool.len());
                Some(item)
            }
            Shape::Paired { male, female, m, f } => {
                let item = [male[m[0]], male[m[1]], female[f[0]], female[f[1]]];
                if !advance(f, female.len()) {
                    *f = [0, 1];
                    self.done = !advance(m, male.len());
                }
                Some(item)
            }
        }
    }
}

/// Steps `idx` to the next k-combination of `0..n`; false when exhausted.
fn advance(idx: &mut [usize], n: usize) -> bool {
    let k = idx.len();
    for i in (0..k).rev() {
        if idx[i] < n - k + i {
            idx[i] += 1;
            for j in i + 1..k {
                idx[j] = idx[j - 1] + 1;
            }
            return true;
        }
    }
    false
}
