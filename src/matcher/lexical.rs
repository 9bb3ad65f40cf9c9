//! Jaro and Jaro-Winkler string similarity over attribute names.

/// Jaro similarity in `[0, 1]`. Two empty strings are identical.
pub fn jaro(s1: &str, s2: &str) -> f64 {
    if s1.is_empty() && s2.is_empty() {
        return 1.0;
    }
    if s1.is_empty() || s2.is_empty() {
        return 0.0;
    }

    let a: Vec<char> = s1.chars().collect();
    let b: Vec<char> = s2.chars().collect();
    let window = (a.len().max(b.len()) / 2).saturating_sub(1);

    let mut a_matched = vec![false; a.len()];
    let mut b_matched = vec![false; b.len()];
    let mut matches = 0usize;

    for i in 0..a.len() {
        let start = i.saturating_sub(window);
        let end = (i + window + 1).min(b.len());
        for j in start..end {
            if b_matched[j] || a[i] != b[j] {
                continue;
            }
            a_matched[i] = true;
            b_matched[j] = true;
            matches += 1;
            break;
        }
    }

    if matches == 0 {
        return 0.0;
    }

    let mut transpositions = 0usize;
    let mut k = 0;
    for i in 0..a.len() {
        if !a_matched[i] {
            continue;
        }
        while !b_matched[k] {
            k += 1;
        }
        if a[i] != b[k] {
            transpositions += 1;
        }
        k += 1;
    }

    let m = matches as f64;
    let t = (transpositions / 2) as f64;
    (m / a.len() as f64 + m / b.len() as f64 + (m - t) / m) / 3.0
}

/// Jaro-Winkler similarity: Jaro plus a bonus for a common prefix of up to
/// four characters, with the standard scaling factor of 0.1.
pub fn jaro_winkler(s1: &str, s2: &str) -> f64 {
    const SCALING_FACTOR: f64 = 0.1;
    const MAX_PREFIX: usize = 4;

    let jaro = jaro(s1, s2);
    let prefix = s1
        .chars()
        .zip(s2.chars())
        .take(MAX_PREFIX)
        .take_while(|(a, b)| a == b)
        .count();
    jaro + prefix as f64 * SCALING_FACTOR * (1.0 - jaro)
}

/// Edit distance used by the matcher: `1 - jaro_winkler`.
pub fn edit_distance(s1: &str, s2: &str) -> f64 {
    (1.0 - jaro_winkler(s1, s2)).max(0.0)
}
