// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_markdown_content(size: usize) -> String {
    let base = "# Title\n\n## Section\n\nParagraph with *some* `inline` content.\n\n- Bullet point\n  - Nested item\n- Another item\n\n1. First\n2. Second\n\n```rust\nfn example() {\n    println!(\"Hello\");\n}\n```\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\n";
    base.repeat(size)
}
