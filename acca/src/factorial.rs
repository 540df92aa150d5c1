pub trait Factorial {
    fn get(&self, n: u8) -> u128;
}

/// Largest `n` whose factorial fits in a `u128`.
pub const MAX_N: u8 = 34;

const TABLE: [u128; MAX_N as usize + 1] = table();

const fn table() -> [u128; MAX_N as usize + 1] {
    let mut table = [1u128; MAX_N as usize + 1];
    let mut n = 2;
    while n <= MAX_N as usize {
        table[n] = n as u128 * table[n - 1];
        n += 1;
    }
    table
}

#[derive(Default, Clone, Copy)]
pub struct Calculator;

impl Factorial for Calculator {
    #[inline]
    fn get(&self, n: u8) -> u128 {
        assert!(n <= MAX_N, "{n}! overflows");
        (2..=n as u128).product()
    }
}

/// Reads from a table built at compile time.
#[derive(Default, Clone, Copy)]
pub struct Lookup;

impl Factorial for Lookup {
    #[inline]
    fn get(&self, n: u8) -> u128 {
        assert!(n <= MAX_N, "{n}! overflows");
        TABLE[n as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_values() {
        for f in [&Calculator as &dyn Factorial, &Lookup] {
            assert_eq!(1, f.get(0));
            assert_eq!(1, f.get(1));
            assert_eq!(24, f.get(4));
            assert_eq!(3_628_800, f.get(10));
            assert_eq!(295_232_799_039_604_140_847_618_609_643_520_000_000, f.get(MAX_N));
        }
    }

    #[test]
    fn table_agrees_with_calculator() {
        for n in 0..=MAX_N {
            assert_eq!(Calculator.get(n), Lookup.get(n), "n={n}");
        }
    }

    #[test]
    #[should_panic(expected = "35! overflows")]
    fn lookup_overflow() {
        Lookup.get(MAX_N + 1);
    }
}
