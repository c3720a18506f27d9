//! Output file naming: unique-name allocation and version numbers.
//!
//! Allocation is a plain check-then-write against the directory. Two callers
//! racing on the same base name can both observe the same free name; callers
//! that need stronger guarantees must serialize around it.

use std::path::Path;

use chrono::NaiveDate;

use crate::text::strip_diacritics;

/// `order-<orderNumber>.pdf`
pub fn order_file_name(order_number: i64) -> String {
    format!("order-{}.pdf", order_number)
}

/// `inventory-<username>-<YYYY-MM-DD>.pdf`, username reduced to safe characters.
pub fn inventory_file_name(username: &str, date: NaiveDate) -> String {
    format!("inventory-{}-{}.pdf", safe_component(username), date.format("%Y-%m-%d"))
}

fn safe_component(raw: &str) -> String {
    let cleaned: String = strip_diacritics(raw.trim())
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '.' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "user".to_string()
    } else {
        cleaned
    }
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

/// Returns `base` or the first `stem-N.ext` (N = 1, 2, ...) not present in `dir`.
pub fn allocate_file_name(dir: &Path, base: &str) -> String {
    if !dir.join(base).exists() {
        return base.to_string();
    }
    let (stem, ext) = split_extension(base);
    let mut n: u32 = 1;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if !dir.join(&candidate).exists() {
            return candidate;
        }
        n += 1;
    }
}

/// Version number implied by the name the allocator chose for `base`.
///
/// The unsuffixed name is version 1, `stem-N.ext` is version `N + 1`.
/// Matching is done against the known base stem, so a name ending in a date
/// like `...-2024-06-10.pdf` is not mistaken for a suffixed one.
pub fn document_version(base: &str, chosen: &str) -> u32 {
    let (base_stem, base_ext) = split_extension(base);
    let (chosen_stem, chosen_ext) = split_extension(chosen);
    if chosen_ext != base_ext {
        return 1;
    }
    chosen_stem
        .strip_prefix(base_stem)
        .and_then(|rest| rest.strip_prefix('-'))
        .and_then(|digits| digits.parse::<u32>().ok())
        .map(|n| n.saturating_add(1))
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_allocation_produces_increasing_suffixes() {
        let dir = tempfile::tempdir().unwrap();
        let mut chosen = Vec::new();
        for _ in 0..3 {
            let name = allocate_file_name(dir.path(), "order-5.pdf");
            fs::write(dir.path().join(&name), b"%PDF").unwrap();
            chosen.push(name);
        }
        assert_eq!(chosen, vec!["order-5.pdf", "order-5-1.pdf", "order-5-2.pdf"]);
    }

    #[test]
    fn test_allocation_fills_gaps() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("order-5.pdf"), b"").unwrap();
        fs::write(dir.path().join("order-5-2.pdf"), b"").unwrap();
        assert_eq!(allocate_file_name(dir.path(), "order-5.pdf"), "order-5-1.pdf");
    }

    #[test]
    fn test_allocation_is_check_then_write() {
        // Known gap: without creating the file in between, two callers get
        // the same answer. Nothing locks the name.
        let dir = tempfile::tempdir().unwrap();
        let first = allocate_file_name(dir.path(), "order-7.pdf");
        let second = allocate_file_name(dir.path(), "order-7.pdf");
        assert_eq!(first, second);
    }

    #[test]
    fn test_version_follows_suffix() {
        let base = "inventory-ana-2024-06-10.pdf";
        assert_eq!(document_version(base, "inventory-ana-2024-06-10.pdf"), 1);
        assert_eq!(document_version(base, "inventory-ana-2024-06-10-1.pdf"), 2);
        assert_eq!(document_version(base, "inventory-ana-2024-06-10-2.pdf"), 3);
    }

    #[test]
    fn test_version_ignores_unrelated_names() {
        assert_eq!(document_version("order-5.pdf", "order-5-x.pdf"), 1);
        assert_eq!(document_version("order-5.pdf", "order-5-1.txt"), 1);
    }

    #[test]
    fn test_file_names() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(order_file_name(42), "order-42.pdf");
        assert_eq!(inventory_file_name("ana", date), "inventory-ana-2024-06-10.pdf");
        assert_eq!(inventory_file_name("Ștefan M/x", date), "inventory-Stefan_M_x-2024-06-10.pdf");
        assert_eq!(inventory_file_name("  ", date), "inventory-user-2024-06-10.pdf");
    }
}
