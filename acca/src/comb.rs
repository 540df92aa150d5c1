//! Combinatorics.

pub fn count_combinations(n: usize, k: usize) -> u64 {
    if k > n {
        return 0;
    }
    let k = usize::min(k, n - k);
    let mut count = 1u128;
    for i in 0..k {
        count = count * (n - i) as u128 / (i + 1) as u128;
        if count > u64::MAX as u128 {
            return u64::MAX;
        }
    }
    count as u64
}

pub fn first(ordinals: &mut [usize]) {
    for (index, ordinal) in ordinals.iter_mut().enumerate() {
        *ordinal = index;
    }
}

pub fn advance(ordinals: &mut [usize], n: usize) -> bool {
    let k = ordinals.len();
    let mut index = k;
    while index > 0 {
        index -= 1;
        if ordinals[index] < n - k + index {
            ordinals[index] += 1;
            for next in index + 1..k {
                ordinals[next] = ordinals[next - 1] + 1;
            }
            return true;
        }
    }
    false
}

pub struct Combinator {
    n: usize,
    ordinals: Vec<usize>,
    started: bool,
    exhausted: bool,
}
impl Combinator {
    pub fn new(n: usize, k: usize) -> Self {
        let mut ordinals = vec![0; k];
        first(&mut ordinals);
        Self {
            n,
            ordinals,
            started: false,
            exhausted: k > n,
        }
    }

    pub fn advance(&mut self) -> Option<&[usize]> {
        if self.exhausted {
            return None;
        }
        if self.started {
            if !advance(&mut self.ordinals, self.n) {
                self.exhausted = true;
                return None;
            }
        } else {
            self.started = true;
        }
        Some(&self.ordinals)
    }
}

impl Iterator for Combinator {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().map(<[usize]>::to_vec)
    }
}

pub fn is_unique_quadratic<T: PartialEq>(elements: &[T]) -> bool {
    for (index, element) in elements.iter().enumerate() {
        for other in &elements[index + 1..] {
            if element == other {
                return false;
            }
        }
    }
    true
}
