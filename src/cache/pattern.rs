//! Key Pattern Module
//!
//! Glob matching for bulk cache invalidation. Supports `*` (any sequence)
//! and `?` (any single character), which covers the structured
//! `prefix:identifier[:sub]` key scheme used by the ledger gateway.

// == Glob Match ==
/// Returns true if `text` matches the glob `pattern`.
///
/// Iterative two-pointer matcher with backtracking over the last `*`, so
/// matching is linear in practice and never recurses.
pub fn glob_match(pattern: &str, text: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    let mut pi = 0;
    let mut ti = 0;
    let mut star: Option<usize> = None;
    let mut mark = 0;

    while ti < t.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == t[ti]) {
            pi += 1;
            ti += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some(pi);
            mark = ti;
            pi += 1;
        } else if let Some(star_pos) = star {
            // Backtrack: let the last '*' absorb one more character
            pi = star_pos + 1;
            mark += 1;
            ti = mark;
        } else {
            return false;
        }
    }

    // Trailing stars match the empty suffix
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }

    pi == p.len()
}
