//! Strand-aware genotype comparison

/// Map a base onto its strand class. G and C collapse to C, T and A to A,
/// so a call reported from the opposite strand lands on the same value.
pub fn flip_base(base: char) -> char {
    match base {
        'G' => 'C',
        'T' => 'A',
        other => other,
    }
}

/// Apply [`flip_base`] to every base of a genotype value
pub fn flip(value: &str) -> String {
    value.chars().map(flip_base).collect()
}

fn flipped_sorted(value: &str) -> Vec<char> {
    let mut bases: Vec<char> = if value.chars().count() == 1 {
        value.chars().chain(value.chars()).collect()
    } else {
        value.chars().collect()
    };
    bases.iter_mut().for_each(|b| *b = flip_base(*b));
    bases.sort_unstable();
    bases
}

fn strand_class(bases: [char; 2]) -> [char; 2] {
    let mut class = bases.map(flip_base);
    class.sort_unstable();
    class
}

/// [`equivalent`] for a pair of bases already split out of a genotype
pub fn equivalent_bases(a: [char; 2], b: [char; 2]) -> bool {
    strand_class(a) == strand_class(b)
}

/// True when two genotype values describe the same unordered base pair,
/// allowing for a strand flip. Single-letter values are treated as
/// homozygous.
pub fn equivalent(a: &str, b: &str) -> bool {
    flipped_sorted(a) == flipped_sorted(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flip_base() {
        assert_eq!(flip_base('G'), 'C');
        assert_eq!(flip_base('T'), 'A');
        assert_eq!(flip_base('A'), 'A');
        assert_eq!(flip_base('C'), 'C');
        assert_eq!(flip("GT"), "CA");
    }

    #[test]
    fn test_identical_values() {
        assert!(equivalent("AG", "AG"));
        assert!(equivalent("AG", "GA"));
    }

    #[test]
    fn test_opposite_strand() {
        assert!(equivalent("AG", "TC"));
        assert!(equivalent("CC", "GG"));
        assert!(equivalent("AA", "TT"));
    }

    #[test]
    fn test_haploid_value() {
        assert!(equivalent("A", "AA"));
        assert!(equivalent("G", "CC"));
        assert!(!equivalent("A", "AG"));
    }

    #[test]
    fn test_equivalent_bases() {
        assert!(equivalent_bases(['A', 'G'], ['C', 'T']));
        assert!(equivalent_bases(['G', 'G'], ['C', 'C']));
        assert!(equivalent_bases(['-', '-'], ['-', '-']));
        assert!(!equivalent_bases(['A', 'G'], ['A', 'T']));
        assert!(!equivalent_bases(['-', '-'], ['A', 'A']));
        for (a, b) in [("AG", "TC"), ("AG", "AT"), ("CC", "AC"), ("DI", "ID")] {
            let split = |v: &str| -> [char; 2] {
                let mut chars = v.chars();
                [chars.next().unwrap(), chars.next().unwrap()]
            };
            assert_eq!(equivalent_bases(split(a), split(b)), equivalent(a, b));
        }
    }

    #[test]
    fn test_conflicting_values() {
        assert!(!equivalent("AG", "AT"));
        assert!(!equivalent("CC", "AC"));
    }
}
