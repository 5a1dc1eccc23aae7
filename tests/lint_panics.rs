//! Lint: library code must not panic on bad input.
//!
//! Every fallible path in the engine returns a `Result` or collapses to
//! `false`/`None` at the public boundary, so `.unwrap()` and `.expect(` are
//! only allowed inside `#[cfg(test)]` modules.
//!
//! This test scans every `.rs` file under `src/` and flags those calls in
//! the part of the file before its first `#[cfg(test)]`.

use std::fs;
use std::path::Path;

/// Scan source for panicking calls outside the test section.
fn find_panicking_calls(source: &str) -> Vec<(usize, String)> {
    let mut violations = Vec::new();

    for (line_num_0, line) in source.lines().enumerate() {
        let trimmed = line.trim();

        // Everything after the test module is exempt
        if trimmed.starts_with("#[cfg(test)]") {
            break;
        }

        // Skip comments
        if trimmed.starts_with("//") {
            continue;
        }

        if line.contains(".unwrap()") || line.contains(".expect(") {
            violations.push((line_num_0 + 1, trimmed.to_string()));
        }
    }

    violations
}

#[test]
fn no_unwrap_or_expect_in_library_code() {
    let src_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("src");
    let mut all_violations = Vec::new();

    visit_source_files(&src_dir, &mut all_violations);

    if !all_violations.is_empty() {
        let mut msg = String::from(
            "Found .unwrap()/.expect( outside #[cfg(test)].\n\
             Propagate the error with ? or map it to the caller's failure value.\n\n",
        );
        for (file, line_num, line) in &all_violations {
            msg.push_str(&format!("  {}:{}: {}\n", file, line_num, line));
        }
        panic!("{}", msg);
    }
}

fn visit_source_files(dir: &Path, violations: &mut Vec<(String, usize, String)>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            visit_source_files(&path, violations);
        } else if path.extension().is_some_and(|e| e == "rs") {
            let Ok(source) = fs::read_to_string(&path) else {
                continue;
            };
            let display_path = path.display().to_string();
            for (line_num, line) in find_panicking_calls(&source) {
                violations.push((display_path.clone(), line_num, line));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_unwrap() {
        let source = "let x = value.parse::<u64>().unwrap();";
        assert_eq!(find_panicking_calls(source).len(), 1);
    }

    #[test]
    fn detects_expect() {
        let source = r#"let x = map.get("k").expect("present");"#;
        assert_eq!(find_panicking_calls(source).len(), 1);
    }

    #[test]
    fn allows_unwrap_or_variants() {
        let source = "let x = a.unwrap_or(0);\nlet y = b.unwrap_or_default();";
        assert!(find_panicking_calls(source).is_empty());
    }

    #[test]
    fn ignores_test_section() {
        let source = "fn f() {}\n#[cfg(test)]\nmod tests { fn g() { x.unwrap(); } }";
        assert!(find_panicking_calls(source).is_empty());
    }

    #[test]
    fn ignores_comments() {
        let source = "// value.unwrap() is forbidden here";
        assert!(find_panicking_calls(source).is_empty());
    }
}
